// Post sources — where raw post texts come from before ingestion.
//
// Sources only hand back plain strings; classification and storage happen
// in the ingestion pipeline.

pub mod bluesky;
pub mod json;
