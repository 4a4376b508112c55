//! Domain model of a roster grid: cells, zones and the fixed vocabularies
//! their text is normalized against.

pub mod cell;
pub mod normalize;
pub mod vocabulary;

pub use cell::{Cell, CellSet, GridCell, GridLayout, ZoneKind};
pub use normalize::{clean_recognized, normalize_body, normalize_header, normalize_name};
pub use vocabulary::{CANONICAL_BODY_CODES, NAME_COLUMN_LABEL};
