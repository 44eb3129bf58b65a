// Pipelines — corpus ingestion (build phase) and post generation (per request).

pub mod compose;
pub mod ingest;
