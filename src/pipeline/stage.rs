//! Generation stage trait and pipeline orchestration.

use std::collections::HashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::erosion::apply_fir_filter;
use crate::terrain::{accumulate_faults, FaultFormationConfig, Heightmap, TerrainError};

/// Unique identifier for generation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Random fault-plane accumulation.
    FaultFormation,
    /// Additional FIR smoothing passes.
    Erosion,
    /// Min-max rescaling into the configured height range.
    Normalize,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::FaultFormation => "fault_formation",
            StageId::Erosion => "erosion",
            StageId::Normalize => "normalize",
        }
    }
}

/// Configuration passed to each generation stage.
#[derive(Debug, Clone, Default)]
pub struct StageConfig {
    /// Fault-formation parameters shared by all stages.
    pub terrain: FaultFormationConfig,
    /// Additional stage-specific parameters.
    pub params: HashMap<String, f32>,
}

impl StageConfig {
    /// Creates a new configuration with the given terrain settings.
    pub fn with_terrain(terrain: FaultFormationConfig) -> Self {
        Self {
            terrain,
            params: HashMap::new(),
        }
    }

    /// Sets a stage parameter.
    pub fn set_param(&mut self, key: &str, value: f32) -> &mut Self {
        self.params.insert(key.to_string(), value);
        self
    }

    /// Gets a stage parameter, returning a default if not set.
    pub fn get_param(&self, key: &str, default: f32) -> f32 {
        self.params.get(key).copied().unwrap_or(default)
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{0}' failed: {1}")]
    StageFailed(String, String),
    #[error("Missing dependency: stage '{0}' requires '{1}'")]
    MissingDependency(String, String),
    #[error(transparent)]
    Terrain(#[from] TerrainError),
}

/// Trait for implementing generation stages.
///
/// Each stage transforms the heightmap in place, building upon previous
/// stages.
pub trait GenerationStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Returns the stage IDs that must be executed before this stage.
    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    /// Executes the generation stage, modifying the heightmap in place.
    fn execute(&self, heightmap: &mut Heightmap, config: &StageConfig) -> Result<(), PipelineError>;
}

/// Orchestrates multiple generation stages into a complete pipeline.
pub struct Pipeline {
    stages: Vec<Box<dyn GenerationStage>>,
    config: StageConfig,
}

impl Pipeline {
    /// Creates a new empty pipeline with the given configuration.
    pub fn new(config: StageConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Creates the standard fault formation, erosion, normalize pipeline.
    ///
    /// The erosion stage is only added when `extra_smoothing_passes > 0`.
    pub fn standard(config: StageConfig, extra_smoothing_passes: u32) -> Self {
        let mut pipeline = Self::new(config);
        pipeline.add_stage(FaultFormationStage);
        if extra_smoothing_passes > 0 {
            pipeline.add_stage(ErosionStage::new(extra_smoothing_passes));
        }
        pipeline.add_stage(NormalizeStage);
        pipeline
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: GenerationStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Executes all stages in order on the given heightmap.
    pub fn run(&self, heightmap: &mut Heightmap) -> Result<(), PipelineError> {
        self.run_with_callbacks(heightmap, |_, _, _| {}, |_, _, _| {})
    }

    /// Executes all stages with progress callbacks.
    ///
    /// # Arguments
    /// * `heightmap` - The heightmap to generate into
    /// * `on_stage_start` - Called when each stage begins
    /// * `on_stage_complete` - Called when each stage finishes
    pub fn run_with_callbacks<F1, F2>(
        &self,
        heightmap: &mut Heightmap,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<(), PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        let total = self.stages.len();
        let mut completed: Vec<StageId> = Vec::new();

        for (i, stage) in self.stages.iter().enumerate() {
            on_stage_start(stage.name(), i, total);

            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency(
                        stage.name().to_string(),
                        dep.name().to_string(),
                    ));
                }
            }

            stage.execute(heightmap, &self.config)?;
            completed.push(stage.id());

            on_stage_complete(stage.name(), i, total);
        }

        Ok(())
    }
}

/// Raw fault accumulation seeded from the terrain configuration.
pub struct FaultFormationStage;

impl GenerationStage for FaultFormationStage {
    fn id(&self) -> StageId {
        StageId::FaultFormation
    }

    fn name(&self) -> &str {
        "Fault Formation"
    }

    fn execute(&self, heightmap: &mut Heightmap, config: &StageConfig) -> Result<(), PipelineError> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.terrain.seed);
        accumulate_faults(heightmap, &config.terrain, &mut rng)?;
        Ok(())
    }
}

/// Extra FIR smoothing passes on top of the per-iteration smoothing.
///
/// Uses the `erosion_filter` parameter if set, otherwise the terrain filter.
pub struct ErosionStage {
    pub passes: u32,
}

impl ErosionStage {
    /// Creates an erosion stage running `passes` filter passes.
    pub fn new(passes: u32) -> Self {
        Self { passes }
    }
}

impl GenerationStage for ErosionStage {
    fn id(&self) -> StageId {
        StageId::Erosion
    }

    fn name(&self) -> &str {
        "Erosion Filter"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::FaultFormation]
    }

    fn execute(&self, heightmap: &mut Heightmap, config: &StageConfig) -> Result<(), PipelineError> {
        let filter = config.get_param("erosion_filter", config.terrain.filter);
        if !(0.0..1.0).contains(&filter) {
            return Err(PipelineError::StageFailed(
                self.name().to_string(),
                format!("filter {} outside [0, 1)", filter),
            ));
        }

        for _ in 0..self.passes {
            apply_fir_filter(heightmap, filter);
        }
        Ok(())
    }
}

/// Rescales heights into `[min_height, max_height]`.
pub struct NormalizeStage;

impl GenerationStage for NormalizeStage {
    fn id(&self) -> StageId {
        StageId::Normalize
    }

    fn name(&self) -> &str {
        "Normalize"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::FaultFormation]
    }

    fn execute(&self, heightmap: &mut Heightmap, config: &StageConfig) -> Result<(), PipelineError> {
        let terrain = &config.terrain;
        heightmap.normalize(terrain.min_height, terrain.max_height);
        Ok(())
    }
}
