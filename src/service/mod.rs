pub mod comparison;
pub mod reconciler;
pub mod report;

pub use comparison::ComparisonService;
pub use reconciler::{compare, compare_many};
