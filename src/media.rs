//! Media type detection and file-name helpers shared by walkers and matchers.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "apng", "avif", "bmp", "gif", "jpeg", "jpg", "png", "svg", "tif", "tiff", "webp",
];

pub const VIDEO_EXTENSIONS: &[&str] = &["m4v", "mp4", "ogg", "ogv", "webm"];

/// Lower-cased extension of the last path segment, ignoring any query string.
pub fn extension(path: &str) -> Option<String> {
    let segment = last_segment(path);
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn is_image(path: &str) -> bool {
    extension(path).is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

pub fn is_video(path: &str) -> bool {
    extension(path).is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.as_str()))
}

/// Whether the walker keeps this path.
pub fn is_media(path: &str) -> bool {
    is_image(path) || is_video(path)
}

/// Percent-decode a record path. Invalid UTF-8 is replaced, never rejected.
pub fn decode(path: &str) -> Cow<'_, str> {
    percent_decode_str(path).decode_utf8_lossy()
}

/// File name with extension: `a/b/Red%20Dragon.webp` → `Red Dragon.webp`.
pub fn file_name_with_ext(path: &str) -> String {
    last_segment(&decode(path)).to_string()
}

/// File name without extension: `a/b/Red_Dragon.01.webp` → `Red_Dragon.01`.
pub fn file_stem(path: &str) -> String {
    let name = file_name_with_ext(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}

fn last_segment(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
