//! Attachment selection and the image-extension gate.

use bytes::Bytes;

/// Extensions accepted for bill attachments (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Alert shown when the selected file has another extension
pub const INVALID_EXTENSION_MESSAGE: &str =
    "Veuillez sélectionner un fichier au format jpg, jpeg ou png.";

/// A file picked by the user, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub content: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Lowercased substring after the last `.`, if any
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    /// Validate the extension, yielding an upload-ready attachment
    pub fn validate(self) -> Option<UploadedFile> {
        let extension = self.extension()?;
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return None;
        }
        Some(UploadedFile {
            name: self.name,
            extension,
            content: self.content,
        })
    }
}

/// An attachment whose extension passed the gate
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    /// Always one of [`ALLOWED_EXTENSIONS`]
    pub extension: String,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn mime_type(&self) -> &'static str {
        match self.extension.as_str() {
            "png" => "image/png",
            _ => "image/jpeg",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_images_in_any_case() {
        for name in ["image.jpg", "scan.JPEG", "receipt.Png", "a.b.c.jpg"] {
            let f = SelectedFile::new(name, &b"image"[..]);
            assert!(f.validate().is_some(), "{name} should be accepted");
        }
    }

    #[test]
    fn test_rejects_other_extensions() {
        for name in ["image.txt", "image.pdf", "image.jpg.exe", "image", "jpg", "image."] {
            let f = SelectedFile::new(name, &b"image"[..]);
            assert!(f.validate().is_none(), "{name} should be rejected");
        }
    }

    #[test]
    fn test_extension_uses_last_dot() {
        let f = SelectedFile::new("photo.backup.JPG", &b""[..]);
        assert_eq!(f.extension().as_deref(), Some("jpg"));
        let up = f.validate().unwrap();
        assert_eq!(up.name, "photo.backup.JPG");
        assert_eq!(up.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_png_mime() {
        let up = SelectedFile::new("x.png", &b""[..]).validate().unwrap();
        assert_eq!(up.mime_type(), "image/png");
    }
}
