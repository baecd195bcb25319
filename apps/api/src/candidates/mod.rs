//! Candidate pipeline: ingest, persistence, raw-document retention,
//! aggregate reporting and the HTTP handlers over them.

pub mod handlers;
pub mod ingest;
pub mod insights;
pub mod repository;
pub mod storage;
