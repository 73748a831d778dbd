//! Invocation event model
//!
//! The event mirrors an object-created notification: a list of records,
//! each naming the bucket and key of one compressed log object.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, Result};

/// Address of one log object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse `bucket/key` (the key may contain further `/`)
    pub fn parse(location: &str) -> Result<Self> {
        let location = location.strip_prefix("s3://").unwrap_or(location);
        match location.split_once('/') {
            Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Ok(Self::new(bucket, key)),
            _ => Err(IngestionError::InvalidEvent(format!(
                "object location {location:?} is not of the form bucket/key"
            ))),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Batch invocation event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntity {
    pub key: String,
}

impl BatchEvent {
    /// Build an event from object references, in order
    pub fn from_objects(objects: impl IntoIterator<Item = ObjectRef>) -> Self {
        let records = objects
            .into_iter()
            .map(|o| EventRecord {
                s3: S3Entity {
                    bucket: BucketEntity { name: o.bucket },
                    object: ObjectEntity { key: o.key },
                },
            })
            .collect();
        Self { records }
    }

    /// Decode an event from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| IngestionError::InvalidEvent(e.to_string()))
    }

    /// Object references, in event order
    pub fn objects(&self) -> Vec<ObjectRef> {
        self.records
            .iter()
            .map(|r| ObjectRef::new(&r.s3.bucket.name, &r.s3.object.key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_ref() {
        let obj = ObjectRef::parse("trail-logs/AWSLogs/1/CloudTrail/a.json.gz").unwrap();
        assert_eq!(obj.bucket, "trail-logs");
        assert_eq!(obj.key, "AWSLogs/1/CloudTrail/a.json.gz");
        assert_eq!(ObjectRef::parse("s3://b/k").unwrap(), ObjectRef::new("b", "k"));
        assert!(ObjectRef::parse("no-key").is_err());
        assert!(ObjectRef::parse("/k").is_err());
    }

    #[test]
    fn test_decode_event() {
        let event = BatchEvent::from_json(
            r#"{"Records":[
                {"eventName":"ObjectCreated:Put","s3":{"bucket":{"name":"logs","arn":"x"},"object":{"key":"a.json.gz","size":10}}},
                {"s3":{"bucket":{"name":"logs"},"object":{"key":"b.json.gz"}}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            event.objects(),
            vec![ObjectRef::new("logs", "a.json.gz"), ObjectRef::new("logs", "b.json.gz")]
        );
    }

    #[test]
    fn test_from_objects_round_trips() {
        let objects = vec![ObjectRef::new("b", "k1"), ObjectRef::new("b", "k2")];
        let event = BatchEvent::from_objects(objects.clone());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.starts_with(r#"{"Records":"#));
        assert_eq!(BatchEvent::from_json(&json).unwrap().objects(), objects);
    }

    #[test]
    fn test_malformed_event() {
        assert!(matches!(
            BatchEvent::from_json(r#"{"Records":[{"s3":{}}]}"#),
            Err(IngestionError::InvalidEvent(_))
        ));
    }
}
