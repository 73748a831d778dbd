//! # Ingestion
//!
//! Turns an invocation event into audit records.
//!
//! Responsibilities:
//! - Model the invocation event (`Records[].s3.bucket.name / object.key`)
//! - Object store implementations (local filesystem, in-memory)
//! - Fetch, gunzip and decode each log object into a list of records
//!
//! ```ignore
//! use ingestion::{BatchEvent, LogFetcher, LocalObjectStore};
//!
//! let fetcher = LogFetcher::new(Arc::new(LocalObjectStore::new("/var/lib/trail")));
//! for object in event.objects() {
//!     let records = fetcher.fetch(&object).await?;
//! }
//! ```

mod error;
mod event;
mod fetcher;
mod store;

pub use error::{IngestionError, Result};
pub use event::{BatchEvent, BucketEntity, EventRecord, ObjectEntity, ObjectRef, S3Entity};
pub use fetcher::{decode_log_document, LogFetcher};
pub use store::{gzip, LocalObjectStore, MemoryObjectStore};
