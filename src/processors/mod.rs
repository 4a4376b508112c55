//! Raster processing primitives shared by the pipeline stages.
//!
//! - [`threshold`]: adaptive mean/Gaussian binarization
//! - [`morphology`]: directional line openings used to isolate ruled strokes
//! - [`clustering`]: tolerance grouping of boundary coordinates
//! - [`geometry`]: the axis-aligned [`CellBox`]

pub mod clustering;
pub mod geometry;
pub mod morphology;
pub mod threshold;

pub use clustering::{BoundaryGroup, cluster_with_tolerance, group_with_tolerance};
pub use geometry::CellBox;
pub use morphology::{Axis, dilate_line, erode_line, open_line, subtract};
pub use threshold::{
    Polarity, adaptive_threshold_gaussian, adaptive_threshold_mean, invert, mean_intensity,
};
