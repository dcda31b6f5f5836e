//! Media capture widget: file picking, image pasting and live previews.
//!
//! A [`MediaCapture`] backs one file-bearing form field. It owns the staged
//! (not yet uploaded) files for that field and the thumbnails shown in the
//! field's preview area. Single-slot fields hold at most one staged file;
//! multi-slot fields only ever lose files through [`MediaCapture::remove`].

use crate::clipboard::{Clipboard, ClipboardAccessError, ClipboardItem};
use async_trait::async_trait;
use base64::Engine;
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Longest edge of a decoded preview thumbnail, in pixels.
pub const THUMBNAIL_EDGE: u32 = 256;

/// An in-memory file waiting to be submitted with its form.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedFile {
    pub name: String,
    pub mime: String,
    pub data: Vec<u8>,
}

impl StagedFile {
    /// Stage bytes under a file name; the MIME type is guessed from the name.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        let name = name.into();
        let mime = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self { name, mime, data }
    }

    pub fn with_mime(name: impl Into<String>, mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            data,
        }
    }

    /// Read a file from disk.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(name, data))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Identity used for de-duplication and removal.
    pub fn key(&self) -> FileKey {
        FileKey {
            name: self.name.clone(),
            size: self.size(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

impl From<ClipboardItem> for StagedFile {
    fn from(item: ClipboardItem) -> Self {
        let name = item.file_name();
        StagedFile::with_mime(name, item.mime, item.data)
    }
}

/// Best-effort file identity: name plus byte size.
///
/// Two distinct files sharing both cannot be told apart; removing one of
/// them removes whichever was staged first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileKey {
    pub name: String,
    pub size: u64,
}

/// What a thumbnail currently displays.
#[derive(Debug, Clone, PartialEq)]
pub enum ThumbnailSource {
    /// Staged file whose preview is still being decoded
    Pending,
    /// Decoded preview as a `data:` URL
    DataUrl(String),
    /// Image already stored by the backend
    Remote(String),
}

/// One entry of the preview area.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    /// Ticket matching asynchronous decode results to this entry
    pub ticket: u64,
    /// Backing staged file; `None` for previews of stored images
    pub key: Option<FileKey>,
    pub source: ThumbnailSource,
}

impl Thumbnail {
    /// Whether the preview offers a remove action.
    pub fn removable(&self) -> bool {
        self.key.is_some()
    }
}

/// A staged file whose preview still has to be decoded.
#[derive(Debug, Clone)]
pub struct PreviewJob {
    pub ticket: u64,
    pub file: StagedFile,
}

/// Why a selected file was not staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The file's type is not an image
    NotAnImage,
    /// An identical file (name and size) is already staged
    Duplicate,
    /// Single-slot field: only the first file is kept
    SlotTaken,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::NotAnImage => "not an image",
            RejectReason::Duplicate => "already staged",
            RejectReason::SlotTaken => "field accepts a single file",
        };
        f.write_str(text)
    }
}

/// Outcome of staging files into a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub accepted: usize,
    pub rejected: Vec<(String, RejectReason)>,
}

/// Callback invoked with the staged set whenever it changes.
pub type ChangeCallback = Box<dyn FnMut(&[StagedFile]) + Send>;

/// Widget configuration.
#[derive(Default)]
pub struct CaptureOptions {
    /// Allow more than one staged file
    pub multiple: bool,
    pub on_change: Option<ChangeCallback>,
}

impl CaptureOptions {
    pub fn single() -> Self {
        Self::default()
    }

    pub fn multiple() -> Self {
        Self {
            multiple: true,
            on_change: None,
        }
    }

    pub fn on_change(mut self, callback: impl FnMut(&[StagedFile]) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }
}

/// Source of user-chosen files (a platform file chooser, a CLI argument list).
#[async_trait]
pub trait FilePicker: Send + Sync {
    /// Let the user choose files. An empty result means the chooser was dismissed.
    async fn pick(&self, multiple: bool) -> std::io::Result<Vec<StagedFile>>;
}

/// Picker over a fixed list of paths.
#[derive(Debug, Clone, Default)]
pub struct PathPicker {
    pub paths: Vec<PathBuf>,
}

impl PathPicker {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }
}

#[async_trait]
impl FilePicker for PathPicker {
    async fn pick(&self, multiple: bool) -> std::io::Result<Vec<StagedFile>> {
        let take = if multiple { self.paths.len() } else { 1 };
        let mut files = Vec::new();
        for path in self.paths.iter().take(take) {
            files.push(StagedFile::from_path(path).await?);
        }
        Ok(files)
    }
}

/// Staged files and previews of one form field.
pub struct MediaCapture {
    multiple: bool,
    on_change: Option<ChangeCallback>,
    staged: Vec<StagedFile>,
    /// Thumbnail ticket of each staged file, index-aligned with `staged`
    staged_tickets: Vec<u64>,
    thumbnails: Vec<Thumbnail>,
    next_ticket: u64,
}

impl fmt::Debug for MediaCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaCapture")
            .field("multiple", &self.multiple)
            .field("staged", &self.staged.len())
            .field("thumbnails", &self.thumbnails.len())
            .finish()
    }
}

impl MediaCapture {
    pub fn new(options: CaptureOptions) -> Self {
        Self {
            multiple: options.multiple,
            on_change: options.on_change,
            staged: Vec::new(),
            staged_tickets: Vec::new(),
            thumbnails: Vec::new(),
            next_ticket: 0,
        }
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    pub fn staged(&self) -> &[StagedFile] {
        &self.staged
    }

    /// The staged file of a single-slot field.
    pub fn first(&self) -> Option<&StagedFile> {
        self.staged.first()
    }

    pub fn thumbnails(&self) -> &[Thumbnail] {
        &self.thumbnails
    }

    /// Stage files chosen through a picker.
    ///
    /// Only images are accepted. Single-slot fields replace their file with
    /// the first accepted one; multi-slot fields skip files already staged
    /// and append the rest.
    pub fn select(&mut self, files: Vec<StagedFile>) -> Selection {
        let mut selection = Selection::default();
        let mut accepted = Vec::new();

        for file in files {
            if !file.is_image() {
                tracing::warn!("Ignoring {} ({}): not an image", file.name, file.mime);
                selection.rejected.push((file.name, RejectReason::NotAnImage));
                continue;
            }
            if self.multiple {
                let key = file.key();
                let already = self.staged.iter().chain(accepted.iter()).any(|f| f.key() == key);
                if already {
                    tracing::debug!("Skipping {}: already staged", file.name);
                    selection.rejected.push((file.name, RejectReason::Duplicate));
                    continue;
                }
            } else if !accepted.is_empty() {
                selection.rejected.push((file.name, RejectReason::SlotTaken));
                continue;
            }
            accepted.push(file);
        }

        selection.accepted = accepted.len();
        if !accepted.is_empty() {
            self.stage(accepted);
        }
        selection
    }

    /// Open a picker and stage what the user chose.
    pub async fn select_via(&mut self, picker: &dyn FilePicker) -> std::io::Result<Selection> {
        let files = picker.pick(self.multiple).await?;
        if files.is_empty() {
            tracing::debug!("File chooser dismissed");
            return Ok(Selection::default());
        }
        Ok(self.select(files))
    }

    /// Stage the images of a paste event.
    ///
    /// Non-image items are ignored. Single-slot fields keep only the first
    /// image; multi-slot fields append every image. Returns how many files
    /// were staged.
    pub fn paste(&mut self, items: Vec<ClipboardItem>) -> usize {
        let mut images: Vec<StagedFile> = items
            .into_iter()
            .filter(ClipboardItem::is_image)
            .map(StagedFile::from)
            .collect();

        if images.is_empty() {
            tracing::debug!("Paste contained no image");
            return 0;
        }
        if !self.multiple {
            images.truncate(1);
        }

        let count = images.len();
        self.stage(images);
        count
    }

    /// Read the clipboard and stage its images.
    pub async fn paste_from(&mut self, clipboard: &dyn Clipboard) -> Result<usize, ClipboardAccessError> {
        let items = clipboard.read().await.map_err(|e| {
            tracing::warn!("Cannot read clipboard: {}", e);
            e
        })?;
        Ok(self.paste(items))
    }

    /// Remove the first staged file matching `name` and `size` together with
    /// its thumbnail. Returns whether anything was removed.
    pub fn remove(&mut self, name: &str, size: u64) -> bool {
        let Some(index) = self
            .staged
            .iter()
            .position(|f| f.name == name && f.size() == size)
        else {
            return false;
        };
        self.staged.remove(index);
        let ticket = self.staged_tickets.remove(index);
        self.thumbnails.retain(|t| t.ticket != ticket);
        tracing::debug!("Removed staged file {} ({} bytes)", name, size);
        self.notify();
        true
    }

    /// Drop every staged file and every preview (form reset, modal close).
    pub fn clear(&mut self) {
        let had_files = !self.staged.is_empty();
        self.staged.clear();
        self.staged_tickets.clear();
        self.thumbnails.clear();
        if had_files {
            self.notify();
        }
    }

    /// Preview an image the backend already stores, without staging anything.
    pub fn show_existing(&mut self, url: impl Into<String>) {
        if !self.multiple {
            self.thumbnails.clear();
        }
        let ticket = self.ticket();
        self.thumbnails.push(Thumbnail {
            ticket,
            key: None,
            source: ThumbnailSource::Remote(url.into()),
        });
    }

    /// Staged files whose previews have not been decoded yet.
    pub fn pending_previews(&self) -> Vec<PreviewJob> {
        let files: HashMap<u64, &StagedFile> = self
            .staged_tickets
            .iter()
            .copied()
            .zip(self.staged.iter())
            .collect();
        self.thumbnails
            .iter()
            .filter(|t| t.source == ThumbnailSource::Pending)
            .filter_map(|t| {
                files.get(&t.ticket).map(|file| PreviewJob {
                    ticket: t.ticket,
                    file: (*file).clone(),
                })
            })
            .collect()
    }

    /// Attach a decoded preview. Results for thumbnails that were removed or
    /// replaced in the meantime are dropped. Returns whether it was applied.
    pub fn apply_preview(&mut self, ticket: u64, data_url: String) -> bool {
        match self.thumbnails.iter_mut().find(|t| t.ticket == ticket) {
            Some(thumbnail) => {
                thumbnail.source = ThumbnailSource::DataUrl(data_url);
                true
            }
            None => {
                tracing::debug!("Dropping preview for discarded thumbnail {}", ticket);
                false
            }
        }
    }

    /// Decode every pending preview concurrently and apply results as they
    /// complete, in whatever order that is.
    pub async fn decode_pending(&mut self) {
        let mut decoding: FuturesUnordered<_> = self
            .pending_previews()
            .into_iter()
            .map(|job| async move {
                let ticket = job.ticket;
                let result = tokio::task::spawn_blocking(move || render_preview(&job.file)).await;
                (ticket, result)
            })
            .collect();

        while let Some((ticket, result)) = decoding.next().await {
            match result {
                Ok(data_url) => {
                    self.apply_preview(ticket, data_url);
                }
                Err(e) => tracing::warn!("Preview decoding task failed: {}", e),
            }
        }
    }

    fn stage(&mut self, files: Vec<StagedFile>) {
        if !self.multiple {
            self.staged.clear();
            self.staged_tickets.clear();
            self.thumbnails.clear();
        }
        for file in files {
            let ticket = self.ticket();
            self.thumbnails.push(Thumbnail {
                ticket,
                key: Some(file.key()),
                source: ThumbnailSource::Pending,
            });
            tracing::debug!("Staged {} ({} bytes)", file.name, file.size());
            self.staged.push(file);
            self.staged_tickets.push(ticket);
        }
        self.notify();
    }

    fn ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn notify(&mut self) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.staged);
        }
    }
}

/// Render a staged file as a displayable `data:` URL.
///
/// Decodable images are downscaled to a PNG thumbnail; anything else is
/// embedded as-is.
pub fn render_preview(file: &StagedFile) -> String {
    let engine = base64::engine::general_purpose::STANDARD;
    match image::load_from_memory(&file.data) {
        Ok(img) => {
            let thumb = img.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE);
            let mut png = Cursor::new(Vec::new());
            match thumb.write_to(&mut png, image::ImageFormat::Png) {
                Ok(()) => format!("data:image/png;base64,{}", engine.encode(png.into_inner())),
                Err(e) => {
                    tracing::warn!("Failed to encode thumbnail for {}: {}", file.name, e);
                    format!("data:{};base64,{}", file.mime, engine.encode(&file.data))
                }
            }
        }
        Err(_) => format!("data:{};base64,{}", file.mime, engine.encode(&file.data)),
    }
}

/// Identifies a file input and the preview area next to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub input: String,
    pub preview: String,
}

impl FieldRef {
    pub fn new(input: impl Into<String>, preview: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            preview: preview.into(),
        }
    }
}

/// Media capture widgets of one form, keyed by input.
#[derive(Debug, Default)]
pub struct CaptureRegistry {
    widgets: HashMap<String, (FieldRef, MediaCapture)>,
}

impl CaptureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a widget to a field. Binding an already bound field is a no-op
    /// that returns `false`.
    pub fn attach(&mut self, field: FieldRef, options: CaptureOptions) -> bool {
        if self.widgets.contains_key(&field.input) {
            tracing::debug!("Media capture already attached to {}", field.input);
            return false;
        }
        self.widgets
            .insert(field.input.clone(), (field, MediaCapture::new(options)));
        true
    }

    pub fn get(&self, input: &str) -> Option<&MediaCapture> {
        self.widgets.get(input).map(|(_, widget)| widget)
    }

    pub fn get_mut(&mut self, input: &str) -> Option<&mut MediaCapture> {
        self.widgets.get_mut(input).map(|(_, widget)| widget)
    }

    pub fn field(&self, input: &str) -> Option<&FieldRef> {
        self.widgets.get(input).map(|(field, _)| field)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Clear every widget.
    pub fn clear_all(&mut self) {
        for (_, widget) in self.widgets.values_mut() {
            widget.clear();
        }
    }

    /// Decode pending previews of every widget.
    pub async fn decode_all(&mut self) {
        for (_, widget) in self.widgets.values_mut() {
            widget.decode_pending().await;
        }
    }
}
