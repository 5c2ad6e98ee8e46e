//! Smoothing passes that soften raw fault edges.

mod fir;

pub use fir::apply_fir_filter;
