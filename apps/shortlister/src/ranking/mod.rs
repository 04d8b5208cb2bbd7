// Ranking API: multipart upload of a JD and CVs, scored by the pipeline,
// returned as JSON or CSV.

pub mod export;
pub mod handlers;
