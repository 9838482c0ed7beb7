pub mod header;
pub mod normalize;
pub mod values;

pub use header::{
    detect_headers, detect_metadata, DetectOptions, DetectionStrategy, HeaderDetection,
};
pub use values::{normalize_amount, normalize_cell, DateOrder};
