use super::{EntityForm, FormError, ImageUrls};
use crate::api::FormPayload;
use crate::media_capture::{CaptureOptions, MediaCapture};
use comicmaker_types::{EntityId, Style};

/// Fields of the style create/edit form.
#[derive(Debug)]
pub struct StyleForm {
    pub name: String,
    pub description: String,
    image_required: bool,
    image: MediaCapture,
}

impl Default for StyleForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            image_required: true,
            image: MediaCapture::new(CaptureOptions::single()),
        }
    }
}

impl StyleForm {
    pub fn image_required(&self) -> bool {
        self.image_required
    }

    pub fn image(&self) -> &MediaCapture {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut MediaCapture {
        &mut self.image
    }
}

impl EntityForm for StyleForm {
    type Entity = Style;

    const LABEL: &'static str = "style";

    fn entity_id(entity: &Style) -> EntityId {
        entity.id.clone()
    }

    fn clear(&mut self) {
        self.name.clear();
        self.description.clear();
        self.image.clear();
        self.image_required = true;
    }

    fn populate(&mut self, entity: &Style, image_urls: &ImageUrls<'_>) {
        self.name = entity.name.clone();
        self.description = entity.description.clone().unwrap_or_default();
        if let Some(ref path) = entity.image {
            self.image.show_existing(image_urls(path));
        }
        self.image_required = false;
    }

    fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingField("name"));
        }
        if self.image_required && self.image.first().is_none() {
            return Err(FormError::MissingField("image"));
        }
        Ok(())
    }

    fn to_payload(&self) -> FormPayload {
        let mut payload = FormPayload::new()
            .text("name", self.name.clone())
            .text("description", self.description.clone());
        if let Some(file) = self.image.first() {
            payload.push_file("image", file.clone());
        }
        payload
    }
}
