//! Log object fetch and decode
//!
//! Objects are gzip-compressed JSON documents of the form
//! `{"Records": [ {...}, ... ]}`. Uncompressed documents are accepted too,
//! detected by the absence of the gzip magic bytes.

use std::io::Read;
use std::sync::Arc;

use contracts::{ObjectStore, Record, Value};
use flate2::read::GzDecoder;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::error::{IngestionError, Result};
use crate::event::ObjectRef;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// `Records` wins when a document carries both spellings
#[derive(Deserialize)]
struct LogDocument {
    #[serde(rename = "Records")]
    upper: Option<Vec<Value>>,
    #[serde(rename = "records")]
    lower: Option<Vec<Value>>,
}

impl LogDocument {
    fn into_records(self) -> Vec<Value> {
        self.upper.or(self.lower).unwrap_or_default()
    }
}

/// Fetches log objects and decodes them into records
#[derive(Clone)]
pub struct LogFetcher {
    store: Arc<dyn ObjectStore>,
}

impl LogFetcher {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Fetch, decompress and decode one object
    ///
    /// # Errors
    /// `Fetch` when the store read fails, `Decode` when the payload is not
    /// a log document or a record is not an object.
    #[instrument(name = "fetch_object", skip(self), fields(object = %object))]
    pub async fn fetch(&self, object: &ObjectRef) -> Result<Vec<Record>> {
        let result = self.fetch_inner(object).await;
        match &result {
            Ok(records) => {
                debug!(records = records.len(), "Decoded log object");
                observability::record_object_fetched(true, records.len());
            }
            Err(e) => {
                error!(object = %object, error = %e, "Failed to load log object");
                observability::record_object_fetched(false, 0);
            }
        }
        result
    }

    async fn fetch_inner(&self, object: &ObjectRef) -> Result<Vec<Record>> {
        let raw = self
            .store
            .get_object(&object.bucket, &object.key)
            .await
            .map_err(|e| IngestionError::fetch(object.to_string(), e.to_string()))?;
        decode_log_document(&raw).map_err(|message| IngestionError::decode(object.to_string(), message))
    }
}

/// Decode raw object bytes into records
pub fn decode_log_document(raw: &[u8]) -> std::result::Result<Vec<Record>, String> {
    let text = if raw.starts_with(&GZIP_MAGIC) {
        let mut text = String::new();
        GzDecoder::new(raw)
            .read_to_string(&mut text)
            .map_err(|e| format!("gunzip failed: {e}"))?;
        text
    } else {
        String::from_utf8(raw.to_vec()).map_err(|e| format!("object is not UTF-8: {e}"))?
    };

    let document: LogDocument =
        serde_json::from_str(&text).map_err(|e| format!("invalid log document: {e}"))?;
    let records = document.into_records();

    for (idx, record) in records.iter().enumerate() {
        if !record.is_object() {
            return Err(format!(
                "record {idx} is a {}, expected an object",
                record.type_name()
            ));
        }
    }
    Ok(records)
}
