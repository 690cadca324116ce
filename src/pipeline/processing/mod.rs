// Pipeline processing: field parsing, normalization, enrichment, aggregation and summary

pub mod aggregate;
pub mod enrich;
pub mod normalize;
pub mod parser;
pub mod summary;
