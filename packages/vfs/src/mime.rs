//! MIME inference from file extensions.

use workbench_store::MimeType;

/// Extension to type table. Extensions are lower-case.
static TABLE: [(&str, MimeType); 24] = [
    ("js", MimeType::JAVASCRIPT),
    ("mjs", MimeType::JAVASCRIPT),
    ("ts", MimeType::TYPESCRIPT),
    ("tsx", MimeType::TYPESCRIPT),
    ("css", MimeType::CSS),
    ("html", MimeType::HTML),
    ("htm", MimeType::HTML),
    ("json", MimeType::JSON),
    ("xml", MimeType::XML),
    ("gif", MimeType::GIF),
    ("png", MimeType::PNG),
    ("jpg", MimeType::JPEG),
    ("jpeg", MimeType::JPEG),
    ("svg", MimeType::SVG),
    ("webp", MimeType::WEBP),
    ("ico", MimeType::ICON),
    ("mp3", MimeType::MPEG_AUDIO),
    ("wav", MimeType::WAV),
    ("ogg", MimeType::OGG),
    ("mp4", MimeType::MP4),
    ("webm", MimeType::WEBM),
    ("pdf", MimeType::PDF),
    ("txt", MimeType::PLAIN_TEXT),
    ("md", MimeType::MARKDOWN),
];

/// The extension of the last path segment, without the dot.
///
/// `None` when the segment has no dot. A leading dot (`.gitignore`) counts.
pub fn extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rfind('.').map(|i| &name[i + 1..])
}

/// Infer the MIME type of `path` from its extension, ignoring case.
///
/// Unknown or missing extensions give `None`, meaning the container picks.
pub fn infer(path: &str) -> Option<MimeType> {
    let ext = extension(path)?;
    TABLE
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|(_, mime)| mime.clone())
}
