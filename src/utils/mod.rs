//! Utility functions for the extraction pipeline.
//!
//! This module provides image loading and resizing helpers, the debug
//! artifact sink, and logging setup.

pub mod debug;
pub mod image;

pub use debug::{DebugSink, cell_artifact_name};
pub use self::image::{crop_gray, decode_gray_image, dynamic_to_gray, load_gray_image, soften, upscale_to};

/// Installs a `tracing` subscriber filtered by `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
