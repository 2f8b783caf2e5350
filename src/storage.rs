use crate::errors::AppError;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Durable key-value store for client-side state.
///
/// Each namespaced key maps to one file under the state directory. Values are
/// wrapped in a checksummed envelope on write and validated on read; a key
/// that is missing, unreadable, unparseable, or fails validation reads back
/// as absent. Callers fall back to their empty default in that case.
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Reads and validates the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        let raw = std::fs::read_to_string(self.path_for(key)).ok()?;
        ValidatedEntry::deserialize_and_validate(&raw)
    }

    /// Writes `value` under `key`, creating the state directory on first use.
    pub fn put(&self, key: &str, value: &str) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| AppError::Storage(format!("Failed to create state dir: {}", e)))?;
        let entry = ValidatedEntry::new(value.to_string());
        std::fs::write(self.path_for(key), entry.serialize())
            .map_err(|e| AppError::Storage(format!("Failed to write key '{}': {}", key, e)))
    }
}

/// Wrapper for a stored value with integrity validation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ValidatedEntry {
    /// The stored value (JSON string or plain token).
    pub data: String,
    /// SHA-256 checksum of the value (hex encoded).
    pub checksum: String,
}

impl ValidatedEntry {
    /// Creates a new entry with its checksum computed.
    pub fn new(data: String) -> Self {
        let checksum = Self::compute_checksum(&data);
        Self { data, checksum }
    }

    fn compute_checksum(data: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Returns true if the checksum matches the stored value.
    pub fn is_valid(&self) -> bool {
        Self::compute_checksum(&self.data) == self.checksum
    }

    /// Serializes the entry for storage.
    pub fn serialize(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Deserializes and validates a stored entry.
    ///
    /// Returns Some(value) if valid, None if corrupted or not an envelope.
    pub fn deserialize_and_validate(serialized: &str) -> Option<String> {
        let entry: ValidatedEntry = serde_json::from_str(serialized).ok()?;

        if entry.is_valid() {
            Some(entry.data)
        } else {
            tracing::warn!(
                "Stored entry failed validation: checksum mismatch, data length {}",
                entry.data.len()
            );
            None
        }
    }
}
