//! Path utilities for detecting media types by extension.
//!
//! File pickers usually report a MIME-like type for each file; when a file is
//! read straight from disk the type is derived from its extension instead.

use std::path::Path;

/// Fallback media type for unknown extensions.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Known video extensions and their media types.
const VIDEO_MEDIA_TYPES: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    ("ts", "video/mp2t"),
];

/// Media type for a file name, based on its extension.
///
/// # Examples
///
/// ```
/// use vidiform_common::paths::media_type_for_name;
///
/// assert_eq!(media_type_for_name("clip.MP4"), "video/mp4");
/// assert_eq!(media_type_for_name("notes.txt"), "application/octet-stream");
/// ```
pub fn media_type_for_name(name: &str) -> &'static str {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            let ext = ext.to_lowercase();
            VIDEO_MEDIA_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, media_type)| *media_type)
        })
        .unwrap_or(DEFAULT_MEDIA_TYPE)
}

/// Check if a path has a video file extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use vidiform_common::paths::is_video_file;
///
/// assert!(is_video_file(Path::new("movie.mkv")));
/// assert!(!is_video_file(Path::new("subtitle.srt")));
/// ```
pub fn is_video_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| media_type_for_name(name) != DEFAULT_MEDIA_TYPE)
        .unwrap_or(false)
}
