//! Fault-terrain CLI - fault-formation heightmap generator.
//!
//! Generates square terrain heightmaps and exports them as images, RAW
//! files and meshes.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use fault_terrain::export::{
    expected_file_size, export_heightmap_png, export_heightmap_raw, export_mesh_obj,
    PngExportOptions, RawFormat,
};
use fault_terrain::mesh::TriangleList;
use fault_terrain::pipeline::{Pipeline, StageConfig};
use fault_terrain::terrain::{FaultFormationConfig, Heightmap, SmoothingSchedule};

/// Fault-formation terrain generator.
#[derive(Parser)]
#[command(name = "fault-terrain")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new heightmap.
    Generate(GenerateArgs),

    /// Display memory and export size estimates for a terrain size.
    Info {
        /// Heightmap width and depth in cells.
        #[arg(short, long, default_value = "256")]
        size: u32,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// JSON configuration file. Flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Heightmap width and depth in cells.
    #[arg(short, long)]
    size: Option<u32>,

    /// Number of fault iterations.
    #[arg(short, long)]
    iterations: Option<u32>,

    /// Lowest output elevation.
    #[arg(long, allow_hyphen_values = true)]
    min_height: Option<f32>,

    /// Highest output elevation.
    #[arg(long, allow_hyphen_values = true)]
    max_height: Option<f32>,

    /// FIR smoothing coefficient in [0, 1).
    #[arg(short, long)]
    filter: Option<f32>,

    /// Random seed for reproducible generation. Random if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// When the smoothing pass runs within an iteration.
    #[arg(long)]
    schedule: Option<ScheduleArg>,

    /// Extra smoothing passes after fault formation.
    #[arg(long, default_value = "0")]
    extra_smoothing: u32,

    /// Output directory for generated files.
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Base name for output files.
    #[arg(short, long, default_value = "terrain")]
    name: String,

    /// Heightmap export format.
    #[arg(long, default_value = "png")]
    format: ExportFormat,

    /// Also export the triangle mesh as OBJ.
    #[arg(long)]
    mesh: bool,

    /// Horizontal distance between adjacent mesh vertices.
    #[arg(long, default_value = "1.0")]
    world_scale: f32,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScheduleArg {
    /// Smooth once per iteration, after all rows are raised.
    PerIteration,
    /// Smooth after every row (legacy output).
    PerRow,
}

impl From<ScheduleArg> for SmoothingSchedule {
    fn from(arg: ScheduleArg) -> Self {
        match arg {
            ScheduleArg::PerIteration => SmoothingSchedule::PerIteration,
            ScheduleArg::PerRow => SmoothingSchedule::PerRow,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// 16-bit PNG (universal compatibility).
    Png,
    /// 16-bit RAW little-endian (Unity).
    Raw,
    /// 32-bit float RAW (high precision).
    RawFloat,
}

fn main() {
    fault_terrain::logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Info { size } => run_info(size),
    }
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    log::error!("{}: {}", context, err);
    process::exit(1);
}

fn build_config(args: &GenerateArgs) -> FaultFormationConfig {
    let mut config = match &args.config {
        Some(path) => FaultFormationConfig::from_json_file(path)
            .unwrap_or_else(|e| fail(&format!("Error loading {}", path.display()), e)),
        None => FaultFormationConfig::default(),
    };

    if let Some(size) = args.size {
        config.size = size;
    }
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(min_height) = args.min_height {
        config.min_height = min_height;
    }
    if let Some(max_height) = args.max_height {
        config.max_height = max_height;
    }
    if let Some(filter) = args.filter {
        config.filter = filter;
    }
    if let Some(schedule) = args.schedule {
        config.schedule = schedule.into();
    }

    // An explicit seed wins; otherwise keep the file's seed or pick one.
    config.seed = match (args.seed, &args.config) {
        (Some(seed), _) => seed,
        (None, Some(_)) => config.seed,
        (None, None) => {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default()
        }
    };

    config
}

fn run_generate(args: GenerateArgs) {
    let config = build_config(&args);
    if let Err(e) = config.validate() {
        fail("Invalid parameters", e);
    }

    log::info!("Fault Terrain - Fault-Formation Heightmap Generator");
    log::info!("Size: {}x{}", config.size, config.size);
    log::info!("Iterations: {}", config.iterations);
    log::info!("Height range: [{}, {}]", config.min_height, config.max_height);
    log::info!("Filter: {} ({:?})", config.filter, config.schedule);
    log::info!("Seed: {}", config.seed);
    log::info!("Output: {}", args.output.display());

    let start = Instant::now();

    let mut heightmap = Heightmap::new(config.size);
    let pipeline = Pipeline::standard(StageConfig::with_terrain(config.clone()), args.extra_smoothing);

    pipeline
        .run_with_callbacks(
            &mut heightmap,
            |name, i, total| log::info!("  [{}/{}] Starting: {}", i + 1, total, name),
            |name, i, total| log::info!("  [{}/{}] Completed: {}", i + 1, total, name),
        )
        .unwrap_or_else(|e| fail("Error during generation", e));

    log::info!("Generation completed in {:.2?}", start.elapsed());

    let (min_h, max_h) = heightmap.height_range();
    log::info!("Height range: [{:.4}, {:.4}]", min_h, max_h);

    let export_start = Instant::now();
    std::fs::create_dir_all(&args.output)
        .unwrap_or_else(|e| fail("Error creating output directory", e));

    let name = &args.name;
    match args.format {
        ExportFormat::Png => {
            let path = args.output.join(format!("{}.png", name));
            let options = PngExportOptions {
                min_height: config.min_height,
                max_height: config.max_height,
                ..Default::default()
            };
            export_heightmap_png(&heightmap, &path, &options)
                .unwrap_or_else(|e| fail("Error exporting PNG", e));
            log::info!("Exported PNG: {}", path.display());
        }
        ExportFormat::Raw | ExportFormat::RawFloat => {
            let raw_format = match args.format {
                ExportFormat::RawFloat => RawFormat::R32Float,
                _ => RawFormat::R16LittleEndian,
            };
            let path = args.output.join(format!("{}.raw", name));
            export_heightmap_raw(&heightmap, &path, raw_format, config.min_height, config.max_height)
                .unwrap_or_else(|e| fail("Error exporting RAW", e));
            log::info!("Exported RAW ({:?}): {}", raw_format, path.display());
        }
    }

    if args.mesh {
        let mesh = TriangleList::from_heightmap(&heightmap, args.world_scale);
        let path = args.output.join(format!("{}.obj", name));
        export_mesh_obj(&mesh, &path).unwrap_or_else(|e| fail("Error exporting mesh", e));
        log::info!(
            "Exported mesh: {} ({} vertices, {} triangles)",
            path.display(),
            mesh.vertices.len(),
            mesh.triangle_count()
        );
    }

    log::info!("Export completed in {:.2?}", export_start.elapsed());
    log::info!("Total time: {:.2?}", start.elapsed());
}

fn run_info(size: u32) {
    let cells = (size as u64) * (size as u64);
    let quads = (size.saturating_sub(1) as u64).pow(2);

    let bytes_heights = cells * 4;
    let bytes_vertices = cells * 24; // position + normal
    let bytes_indices = quads * 6 * 4;
    let bytes_png = expected_file_size(size, RawFormat::R16LittleEndian);
    let bytes_raw_r16 = expected_file_size(size, RawFormat::R16LittleEndian);
    let bytes_raw_r32 = expected_file_size(size, RawFormat::R32Float);

    let mb = |bytes: u64| bytes as f64 / 1024.0 / 1024.0;

    println!("Fault Terrain - Configuration Info");
    println!("==================================");
    println!();
    println!("Size: {}x{}", size, size);
    println!("Cells:     {:>12}", cells);
    println!("Triangles: {:>12}", quads * 2);
    println!();
    println!("Memory usage (in-memory):");
    println!("  Heights:   {:>12} bytes ({:.2} MB)", bytes_heights, mb(bytes_heights));
    println!("  Vertices:  {:>12} bytes ({:.2} MB)", bytes_vertices, mb(bytes_vertices));
    println!("  Indices:   {:>12} bytes ({:.2} MB)", bytes_indices, mb(bytes_indices));
    println!();
    println!("Export file sizes:");
    println!("  PNG (16-bit, uncompressed): {:>10} bytes ({:.2} MB)", bytes_png, mb(bytes_png));
    println!("  RAW (R16):                  {:>10} bytes ({:.2} MB)", bytes_raw_r16, mb(bytes_raw_r16));
    println!("  RAW (R32):                  {:>10} bytes ({:.2} MB)", bytes_raw_r32, mb(bytes_raw_r32));
    println!();

    println!("Engine compatibility notes:");
    if is_power_of_two(size) {
        println!("  Unity:    OK (power of 2)");
    } else {
        println!("  Unity:    May require power-of-2 resolution");
    }
    if size > 1 && is_power_of_two(size - 1) {
        println!("  Unreal:   OK (power-of-2 + 1)");
    } else if let Some(recommended) = recommended_unreal_size(size) {
        println!("  Unreal:   Recommended size {} (power-of-2 + 1)", recommended);
    } else {
        println!("  Unreal:   Size exceeds the largest power-of-2 + 1 grid");
    }
}

fn is_power_of_two(n: u32) -> bool {
    n > 0 && (n & (n - 1)) == 0
}

/// Smallest power-of-2 + 1 size that holds `size` cells, if it fits in u32.
fn recommended_unreal_size(size: u32) -> Option<u32> {
    size.checked_next_power_of_two()?.checked_add(1)
}
