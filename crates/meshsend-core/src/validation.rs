//! File size gate applied before any transport activity

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::chunking::EncodedPayload;
use crate::{MeshSendError, Result};

/// A file that passed the size check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub len: u64,
}

impl SelectedFile {
    /// Read the file and base64-encode its contents
    pub fn read_payload(&self) -> Result<EncodedPayload> {
        let data = fs::read(&self.path)?;
        debug!("Read {} bytes from {}", data.len(), self.path.display());
        Ok(EncodedPayload::encode(&data))
    }
}

/// Accept `path` if its size is at most `max_size` bytes
pub fn validate_file_size(path: &Path, max_size: u64) -> Result<SelectedFile> {
    let len = fs::metadata(path)?.len();

    if len > max_size {
        return Err(MeshSendError::FileTooLarge {
            path: path.to_path_buf(),
            size: len,
            max_size,
        });
    }

    Ok(SelectedFile {
        path: path.to_path_buf(),
        len,
    })
}
