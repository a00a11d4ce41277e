use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;

use crate::foundation::error::ParticleResult;
use crate::upload::UploadRecord;

/// Handle to an upload persisted in the working directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedUpload {
    /// Location of the written file.
    pub path: PathBuf,
    /// Media type declared at upload time.
    pub media_type: String,
    /// Bytes written.
    pub byte_len: u64,
}

/// Write `record` into `dir` as `upload_<millis>_<name>`.
///
/// The directory is created if missing. If another upload already claimed the same name, a
/// counter is inserted after the timestamp until a fresh name is found.
#[tracing::instrument(skip(record), fields(file = %record.file_name, bytes = record.bytes.len()))]
pub fn save_upload(record: &UploadRecord, dir: &Path, now: SystemTime) -> ParticleResult<SavedUpload> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create upload directory '{}'", dir.display()))?;

    let millis = unix_millis(now);
    let name = sanitize_file_name(&record.file_name);

    let mut attempt = 0u32;
    let (path, mut file) = loop {
        let candidate = if attempt == 0 {
            dir.join(format!("upload_{millis}_{name}"))
        } else {
            dir.join(format!("upload_{millis}_{attempt}_{name}"))
        };
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(f) => break (candidate, f),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("create upload file '{}'", candidate.display()))
                    .into());
            }
        }
    };

    file.write_all(&record.bytes)
        .with_context(|| format!("write upload file '{}'", path.display()))?;

    tracing::debug!(path = %path.display(), "saved upload");
    Ok(SavedUpload {
        path,
        media_type: record.media_type.clone(),
        byte_len: record.byte_len(),
    })
}

/// Milliseconds since the Unix epoch, 0 for clocks set before it.
pub(crate) fn unix_millis(now: SystemTime) -> u128 {
    now.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Reduce a client-supplied file name to a safe single path component.
pub fn sanitize_file_name(raw: &str) -> String {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/upload/store.rs"]
mod tests;
