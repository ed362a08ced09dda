// Yield-grid aggregation pipeline

pub mod aggregate;
pub mod colorize;
pub mod grid;
pub mod ingest;
pub mod orchestrator;
pub mod segments;
pub mod types;
