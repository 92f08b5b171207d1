pub mod dashboard;
pub mod types;
