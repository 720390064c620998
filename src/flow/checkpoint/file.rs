// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{Checkpoint, CheckpointStore};
use crate::flow::error::StoreError;

const RECORD_EXT: &str = "json";
const TEMP_EXT: &str = "tmp";

/// Checkpoint store backed by one JSON file per session.
///
/// Writes land in a uniquely named temp file which is then renamed over the
/// record, so readers see either the previous checkpoint or the new one.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        log::debug!("Opened checkpoint store at {:?}", dir);
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, session_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", encode_session_id(session_id), RECORD_EXT))
    }

    fn temp_path(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!(
            "{}.{}.{}",
            encode_session_id(session_id),
            uuid::Uuid::new_v4().simple(),
            TEMP_EXT
        ))
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn put(&self, checkpoint: Checkpoint) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&checkpoint)?;
        let temp = self.temp_path(&checkpoint.session_id);
        let target = self.record_path(&checkpoint.session_id);

        fs::write(&temp, &bytes).await?;
        if let Err(e) = fs::rename(&temp, &target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<Checkpoint>, StoreError> {
        let bytes = match fs::read(self.record_path(session_id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let checkpoint: Checkpoint =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                session_id: session_id.to_string(),
                message: e.to_string(),
            })?;

        if checkpoint.session_id != session_id {
            return Err(StoreError::Corrupt {
                session_id: session_id.to_string(),
                message: format!("record belongs to session '{}'", checkpoint.session_id),
            });
        }
        Ok(Some(checkpoint))
    }

    async fn delete(&self, session_id: &str) -> Result<bool, StoreError> {
        match fs::remove_file(self.record_path(session_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn sessions(&self) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == RECORD_EXT) {
                if let Some(id) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(decode_session_id)
                {
                    ids.push(id);
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// File stem for the empty session id. Never produced for a non-empty id,
/// since `%` is always followed by two hex digits.
const EMPTY_SESSION_STEM: &str = "%";

/// Map a session id onto a portable file name: ASCII alphanumerics, `-` and
/// `_` pass through, every other byte becomes `%XX`.
fn encode_session_id(session_id: &str) -> String {
    if session_id.is_empty() {
        return EMPTY_SESSION_STEM.to_string();
    }
    let mut out = String::with_capacity(session_id.len());
    for byte in session_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

fn decode_session_id(name: &str) -> Option<String> {
    if name == EMPTY_SESSION_STEM {
        return Some(String::new());
    }
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
