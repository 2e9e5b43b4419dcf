//! Uploaded media and the scratch files that stage it for upload.

use axum::body::Bytes;
use std::io::{self, Write};
use std::path::Path;
use tempfile::TempPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
    Text,
}

impl MediaKind {
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
            MediaKind::Text => "text",
        }
    }

    /// Extensions the upload form accepts for this kind.
    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            MediaKind::Video => &["mp4", "mov", "avi"],
            MediaKind::Image => &["jpg", "jpeg", "png"],
            MediaKind::Text => &["txt"],
        }
    }

    /// Suffix used for the scratch file when the upload has no usable extension.
    pub fn default_suffix(self) -> &'static str {
        match self {
            MediaKind::Video => ".mp4",
            MediaKind::Image => ".png",
            MediaKind::Text => ".txt",
        }
    }

    pub fn mime_for_extension(self, ext: &str) -> &'static str {
        match ext {
            "mp4" => "video/mp4",
            "mov" => "video/quicktime",
            "avi" => "video/x-msvideo",
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "txt" => "text/plain",
            _ => match self {
                MediaKind::Video => "video/mp4",
                MediaKind::Image => "image/png",
                MediaKind::Text => "text/plain",
            },
        }
    }
}

/// Bytes a user submitted through one of the upload forms.
#[derive(Debug, Clone)]
pub struct UploadedMedia {
    pub kind: MediaKind,
    pub bytes: Bytes,
    /// Lowercased extension of the original filename, without the dot.
    pub extension: Option<String>,
}

impl UploadedMedia {
    pub fn new(kind: MediaKind, bytes: impl Into<Bytes>, filename: Option<&str>) -> Self {
        Self {
            kind,
            bytes: bytes.into(),
            extension: filename.and_then(extension_of),
        }
    }

    /// Whether the original filename (if any) carries an accepted extension.
    pub fn has_allowed_extension(&self) -> bool {
        match &self.extension {
            Some(ext) => self.kind.allowed_extensions().contains(&ext.as_str()),
            None => true,
        }
    }

    pub fn scratch_suffix(&self) -> String {
        match &self.extension {
            Some(ext) if self.has_allowed_extension() => format!(".{ext}"),
            _ => self.kind.default_suffix().to_string(),
        }
    }

    /// MIME type to declare to the staging service. Images are sniffed
    /// first; the extension decides when the bytes are not recognisable.
    pub fn mime_type(&self) -> &'static str {
        if self.kind == MediaKind::Image {
            if let Some(mime) = sniff_image_mime(&self.bytes) {
                return mime;
            }
        }
        self.kind
            .mime_for_extension(self.extension.as_deref().unwrap_or_default())
    }

    pub fn display_name(&self) -> String {
        format!("upload{}", self.scratch_suffix())
    }
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    use image::ImageFormat;

    match image::guess_format(bytes).ok()? {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// A temp-file copy of an upload. Removed by [`ScratchFile::close`] or, failing
/// that, when dropped.
#[derive(Debug)]
pub struct ScratchFile {
    path: TempPath,
}

impl ScratchFile {
    /// Write `media` into a fresh, uniquely named file under `dir`.
    pub async fn create(dir: &Path, media: &UploadedMedia) -> io::Result<Self> {
        let dir = dir.to_path_buf();
        let suffix = media.scratch_suffix();
        let bytes = media.bytes.clone();

        tokio::task::spawn_blocking(move || -> io::Result<Self> {
            let mut file = tempfile::Builder::new()
                .prefix("media-")
                .suffix(&suffix)
                .tempfile_in(&dir)?;
            file.write_all(&bytes)?;
            file.flush()?;
            Ok(Self {
                path: file.into_temp_path(),
            })
        })
        .await
        .map_err(io::Error::other)?
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file. A file that is already gone is not an error.
    pub fn close(self) -> io::Result<()> {
        match self.path.close() {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
