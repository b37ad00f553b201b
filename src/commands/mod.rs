pub mod analyze;
pub mod build;
