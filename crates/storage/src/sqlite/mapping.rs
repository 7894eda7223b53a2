use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::repository::StorageError;

pub(super) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(super) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Encode a payload into the JSON document column.
pub(super) fn encode<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(ser)
}

/// Decode a payload read back from a JSON document column.
pub(super) fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

/// Parse an id column stored as a UUID string.
pub(super) fn uuid_from_text(field: &'static str, raw: &str) -> Result<Uuid, StorageError> {
    raw.parse::<Uuid>()
        .map_err(|_| StorageError::Serialization(format!("invalid {field}: {raw}")))
}
