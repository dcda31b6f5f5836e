//! Clipboard access for pasting images.
//!
//! Reading the clipboard is a capability the host environment may not grant
//! (insecure contexts, headless sessions, denied permissions), so every read
//! goes through [`Clipboard`] and reports a typed error instead of failing
//! silently.

use async_trait::async_trait;

/// Clipboard access errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardAccessError {
    /// The environment offers no clipboard read API
    #[error("Clipboard access is not supported in this environment")]
    Unsupported,
    /// The user or the platform refused the read
    #[error("Clipboard access denied: {0}")]
    Denied(String),
}

/// One item of clipboard data (or of a paste event's data transfer).
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardItem {
    /// MIME type reported for the item (e.g. `image/png`, `text/plain`)
    pub mime: String,
    /// File name, when the item came from a copied file
    pub name: Option<String>,
    pub data: Vec<u8>,
}

impl ClipboardItem {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            name: None,
            data,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether the item's type indicates an image.
    pub fn is_image(&self) -> bool {
        self.mime.to_ascii_lowercase().contains("image")
    }

    /// File name to stage the item under. Unnamed images become `image.<ext>`.
    pub fn file_name(&self) -> String {
        if let Some(ref name) = self.name {
            return name.clone();
        }
        let subtype = self
            .mime
            .split('/')
            .nth(1)
            .and_then(|s| s.split(['+', ';']).next())
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let ext = match subtype {
            Some("jpeg") => "jpg",
            Some(other) => other,
            None => "png",
        };
        format!("image.{}", ext)
    }
}

/// A readable clipboard.
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Read every item currently on the clipboard.
    async fn read(&self) -> Result<Vec<ClipboardItem>, ClipboardAccessError>;
}

/// Clipboard of an environment without clipboard support.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedClipboard;

#[async_trait]
impl Clipboard for UnsupportedClipboard {
    async fn read(&self) -> Result<Vec<ClipboardItem>, ClipboardAccessError> {
        Err(ClipboardAccessError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_type_detection() {
        assert!(ClipboardItem::new("image/png", vec![]).is_image());
        assert!(!ClipboardItem::new("text/plain", vec![]).is_image());
    }

    #[test]
    fn test_unnamed_items_get_extension_from_mime() {
        assert_eq!(ClipboardItem::new("image/jpeg", vec![]).file_name(), "image.jpg");
        assert_eq!(ClipboardItem::new("image/svg+xml", vec![]).file_name(), "image.svg");
        assert_eq!(
            ClipboardItem::new("image/png", vec![]).named("shot.png").file_name(),
            "shot.png"
        );
    }

    #[tokio::test]
    async fn test_unsupported_clipboard_reports_typed_error() {
        let result = UnsupportedClipboard.read().await;
        assert_eq!(result, Err(ClipboardAccessError::Unsupported));
    }
}
