pub mod engine;
pub mod skip;

pub use engine::{Classification, Classifier};
pub use skip::{skip_reason, SkipReason};
