//! Upload acceptance and persistence.
//!
//! Validation happens entirely in memory so a rejected upload never touches the filesystem.

mod store;

pub use store::{SavedUpload, save_upload, sanitize_file_name};
pub(crate) use store::unix_millis;

use crate::foundation::error::{ParticleError, ParticleResult};

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A user's source image as received, before it is written anywhere.
#[derive(Clone, Debug)]
pub struct UploadRecord {
    /// Original file name as declared by the client.
    pub file_name: String,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    /// Raw payload.
    pub bytes: Vec<u8>,
}

impl UploadRecord {
    /// Build a record from its parts.
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Payload size in bytes.
    pub fn byte_len(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Acceptance limits applied to every upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadLimits {
    /// Largest accepted payload, inclusive.
    pub max_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadLimits {
    /// Reject limits that would refuse every upload.
    pub fn validate(&self) -> ParticleResult<()> {
        if self.max_bytes == 0 {
            return Err(ParticleError::validation("upload max_bytes must be > 0"));
        }
        Ok(())
    }

    /// Check an upload, returning it unchanged when it is acceptable.
    pub fn check(&self, record: Option<UploadRecord>) -> ParticleResult<UploadRecord> {
        let Some(record) = record else {
            return Err(ParticleError::upload("No image file provided"));
        };
        if !is_image_media_type(&record.media_type) {
            return Err(ParticleError::upload("File must be an image"));
        }
        if record.byte_len() > self.max_bytes {
            return Err(ParticleError::upload(format!(
                "File size must be less than {}",
                human_size(self.max_bytes)
            )));
        }
        Ok(record)
    }
}

/// Return `true` when the media type starts with `image/` (case-insensitive, parameters ignored).
///
/// A bare `image/` with no subtype is accepted; decoding rejects it later if the bytes are not an image.
pub fn is_image_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or("").trim();
    essence
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

fn human_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes.is_multiple_of(MIB) {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/upload/limits.rs"]
mod tests;
