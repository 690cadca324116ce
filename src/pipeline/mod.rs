// Catalog pipeline: ingestion, processing, storage and the run orchestrator

pub mod ingestion;
pub mod processing;
pub mod runner;
pub mod storage;

pub use runner::{CleanedCatalog, Pipeline, PipelineResult};
