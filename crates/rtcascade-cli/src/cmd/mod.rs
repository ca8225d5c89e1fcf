pub mod analyze;
pub mod estimate;
