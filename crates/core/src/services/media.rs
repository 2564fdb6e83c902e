//! Story media validation and storage keys.

use chrono::{DateTime, Datelike, Utc};
use givehub_common::{AppError, AppResult};
use givehub_db::entities::story::MediaType;

/// Largest accepted image upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Largest accepted video upload.
pub const MAX_VIDEO_BYTES: usize = 50 * 1024 * 1024;

/// Display duration of an image story when none is given.
pub const DEFAULT_IMAGE_DURATION: i32 = 5;

/// Accepted display durations in seconds.
pub const DURATION_RANGE: std::ops::RangeInclusive<i32> = 1..=60;

/// Length of the random file name of stored media.
const MEDIA_NAME_LEN: usize = 32;

/// A file received from a multipart form.
#[derive(Debug, Clone, Default)]
pub struct MediaUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// An upload that passed type and size checks.
#[derive(Debug, Clone)]
pub struct ValidatedMedia {
    pub media_type: MediaType,
    /// Extension the file is stored with.
    pub extension: &'static str,
    pub data: Vec<u8>,
}

/// Classify a MIME type into media type and canonical extension.
fn from_mime_type(mime: &str) -> Option<(MediaType, &'static str)> {
    match mime.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some((MediaType::Image, "jpg")),
        "image/png" => Some((MediaType::Image, "png")),
        "image/gif" => Some((MediaType::Image, "gif")),
        "image/webp" => Some((MediaType::Image, "webp")),
        "video/mp4" => Some((MediaType::Video, "mp4")),
        "video/quicktime" => Some((MediaType::Video, "mov")),
        "video/webm" => Some((MediaType::Video, "webm")),
        _ => None,
    }
}

/// Classify a file extension into media type and canonical extension.
fn from_extension(ext: &str) -> Option<(MediaType, &'static str)> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some((MediaType::Image, "jpg")),
        "png" => Some((MediaType::Image, "png")),
        "gif" => Some((MediaType::Image, "gif")),
        "webp" => Some((MediaType::Image, "webp")),
        "mp4" => Some((MediaType::Video, "mp4")),
        "mov" | "qt" => Some((MediaType::Video, "mov")),
        "webm" => Some((MediaType::Video, "webm")),
        _ => None,
    }
}

/// Size limit for a media type.
#[must_use]
pub const fn max_bytes(media_type: MediaType) -> usize {
    match media_type {
        MediaType::Image => MAX_IMAGE_BYTES,
        MediaType::Video => MAX_VIDEO_BYTES,
    }
}

/// Check an upload's type and size.
///
/// The declared content type wins; the file extension is only consulted
/// when the client sent no specific type.
pub fn validate_media(upload: MediaUpload) -> AppResult<ValidatedMedia> {
    if upload.data.is_empty() {
        return Err(AppError::field("media", "The media file is required."));
    }

    let declared = upload
        .content_type
        .as_deref()
        .filter(|m| !m.is_empty() && *m != "application/octet-stream");
    let detected = match declared {
        Some(mime) => from_mime_type(mime),
        None => upload
            .file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .and_then(|(_, ext)| from_extension(ext)),
    };

    let Some((media_type, extension)) = detected else {
        return Err(AppError::field(
            "media",
            "The media must be a file of type: jpeg, png, jpg, gif, webp, mp4, mov, webm.",
        ));
    };

    let limit = max_bytes(media_type);
    if upload.data.len() > limit {
        return Err(AppError::field(
            "media",
            format!("The media may not be greater than {} megabytes.", limit / (1024 * 1024)),
        ));
    }

    Ok(ValidatedMedia {
        media_type,
        extension,
        data: upload.data,
    })
}

/// Resolve the display duration of a story.
///
/// Images default to [`DEFAULT_IMAGE_DURATION`]; videos must state theirs.
pub fn resolve_duration(media_type: MediaType, duration: Option<i32>) -> AppResult<i32> {
    let duration = match (duration, media_type) {
        (Some(d), _) => d,
        (None, MediaType::Image) => DEFAULT_IMAGE_DURATION,
        (None, MediaType::Video) => {
            return Err(AppError::field(
                "duration",
                "The duration field is required for videos.",
            ));
        }
    };

    if DURATION_RANGE.contains(&duration) {
        Ok(duration)
    } else {
        Err(AppError::field(
            "duration",
            "The duration must be between 1 and 60 seconds.",
        ))
    }
}

/// Storage key of story media: `stories/YYYY/MM/<name>.<ext>`.
#[must_use]
pub fn story_media_key(now: DateTime<Utc>, name: &str, extension: &str) -> String {
    format!(
        "stories/{:04}/{:02}/{name}.{extension}",
        now.year(),
        now.month()
    )
}

/// Random file name for stored media.
#[must_use]
pub fn random_media_name(id_gen: &givehub_common::IdGenerator) -> String {
    id_gen.random_string(MEDIA_NAME_LEN)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn upload(content_type: Option<&str>, name: Option<&str>, len: usize) -> MediaUpload {
        MediaUpload {
            file_name: name.map(String::from),
            content_type: content_type.map(String::from),
            data: vec![0; len],
        }
    }

    #[test]
    fn test_accepts_image_types() {
        for mime in ["image/jpeg", "image/png", "image/jpg", "image/gif", "image/webp"] {
            let media = validate_media(upload(Some(mime), None, 10)).unwrap();
            assert_eq!(media.media_type, MediaType::Image);
        }
    }

    #[test]
    fn test_quicktime_stored_as_mov() {
        let media = validate_media(upload(Some("video/quicktime"), None, 10)).unwrap();
        assert_eq!(media.media_type, MediaType::Video);
        assert_eq!(media.extension, "mov");
    }

    #[test]
    fn test_extension_fallback() {
        let media =
            validate_media(upload(Some("application/octet-stream"), Some("clip.WEBM"), 10))
                .unwrap();
        assert_eq!(media.media_type, MediaType::Video);
        assert_eq!(media.extension, "webm");
    }

    #[test]
    fn test_rejects_unsupported_type() {
        let err = validate_media(upload(Some("application/pdf"), Some("a.pdf"), 10)).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref fields, .. } if fields.contains_key("media")));
    }

    #[test]
    fn test_size_limits() {
        assert!(validate_media(upload(Some("image/png"), None, MAX_IMAGE_BYTES)).is_ok());
        assert!(validate_media(upload(Some("image/png"), None, MAX_IMAGE_BYTES + 1)).is_err());
        // A video may be far larger than an image.
        assert!(validate_media(upload(Some("video/mp4"), None, MAX_IMAGE_BYTES + 1)).is_ok());
        assert!(validate_media(upload(Some("video/mp4"), None, MAX_VIDEO_BYTES + 1)).is_err());
    }

    #[test]
    fn test_rejects_empty_file() {
        assert!(validate_media(upload(Some("image/png"), None, 0)).is_err());
    }

    #[test]
    fn test_resolve_duration() {
        assert_eq!(resolve_duration(MediaType::Image, None).unwrap(), 5);
        assert_eq!(resolve_duration(MediaType::Video, Some(60)).unwrap(), 60);
        assert!(resolve_duration(MediaType::Video, None).is_err());
        assert!(resolve_duration(MediaType::Image, Some(0)).is_err());
        assert!(resolve_duration(MediaType::Image, Some(61)).is_err());
    }

    #[test]
    fn test_story_media_key() {
        let now = Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(
            story_media_key(now, "abc123", "jpg"),
            "stories/2025/03/abc123.jpg"
        );
    }
}
