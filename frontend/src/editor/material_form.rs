use super::{EntityForm, FormError, ImageUrls};
use crate::api::FormPayload;
use crate::media_capture::{CaptureOptions, CaptureRegistry, FieldRef, MediaCapture, StagedFile};
use comicmaker_types::{EntityId, Material, MAX_AUX_IMAGES};

pub const MAIN_IMAGE: &str = "main_image";
pub const AUX_IMAGES: [&str; MAX_AUX_IMAGES] = ["aux1_image", "aux2_image"];

/// Fields of the material create/edit form.
#[derive(Debug)]
pub struct MaterialForm {
    pub name: String,
    pub description: String,
    main_image_required: bool,
    captures: CaptureRegistry,
}

impl Default for MaterialForm {
    fn default() -> Self {
        let mut captures = CaptureRegistry::new();
        for field in std::iter::once(MAIN_IMAGE).chain(AUX_IMAGES) {
            captures.attach(
                FieldRef::new(field, format!("{}_preview", field)),
                CaptureOptions::single(),
            );
        }
        Self {
            name: String::new(),
            description: String::new(),
            main_image_required: true,
            captures,
        }
    }
}

impl MaterialForm {
    pub fn main_image_required(&self) -> bool {
        self.main_image_required
    }

    /// Capture widget of a file field (`main_image`, `aux1_image`, `aux2_image`).
    pub fn capture(&self, field: &str) -> Option<&MediaCapture> {
        self.captures.get(field)
    }

    pub fn capture_mut(&mut self, field: &str) -> Option<&mut MediaCapture> {
        self.captures.get_mut(field)
    }

    /// Capture widget of an auxiliary slot (0 or 1).
    pub fn aux_image_mut(&mut self, slot: usize) -> Option<&mut MediaCapture> {
        let field = AUX_IMAGES.get(slot)?;
        self.captures.get_mut(field)
    }

    /// Whether every preview area is empty.
    pub fn previews_empty(&self) -> bool {
        std::iter::once(MAIN_IMAGE)
            .chain(AUX_IMAGES)
            .filter_map(|field| self.captures.get(field))
            .all(|capture| capture.thumbnails().is_empty())
    }

    /// Decode the previews of every staged image.
    pub async fn decode_previews(&mut self) {
        self.captures.decode_all().await;
    }

    fn staged(&self, field: &str) -> Option<&StagedFile> {
        self.captures.get(field).and_then(MediaCapture::first)
    }
}

impl EntityForm for MaterialForm {
    type Entity = Material;

    const LABEL: &'static str = "material";

    fn entity_id(entity: &Material) -> EntityId {
        entity.id.clone()
    }

    fn clear(&mut self) {
        self.name.clear();
        self.description.clear();
        self.captures.clear_all();
        self.main_image_required = true;
    }

    fn populate(&mut self, entity: &Material, image_urls: &ImageUrls<'_>) {
        self.name = entity.name.clone();
        self.description = entity.description.clone().unwrap_or_default();
        let main = self.captures.get_mut(MAIN_IMAGE);
        if let (Some(path), Some(capture)) = (entity.main_image.as_deref(), main) {
            capture.show_existing(image_urls(path));
        }
        for slot in 0..MAX_AUX_IMAGES {
            let aux = self.aux_image_mut(slot);
            if let (Some(path), Some(capture)) = (entity.aux_image(slot), aux) {
                capture.show_existing(image_urls(path));
            }
        }
        self.main_image_required = false;
    }

    fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingField("name"));
        }
        if self.main_image_required && self.staged(MAIN_IMAGE).is_none() {
            return Err(FormError::MissingField("main image"));
        }
        Ok(())
    }

    fn to_payload(&self) -> FormPayload {
        let mut payload = FormPayload::new()
            .text("name", self.name.clone())
            .text("description", self.description.clone());
        for field in std::iter::once(MAIN_IMAGE).chain(AUX_IMAGES) {
            if let Some(file) = self.staged(field) {
                payload.push_file(field, file.clone());
            }
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_includes_only_staged_slots() {
        let mut form = MaterialForm::default();
        form.name = "Castle".to_string();
        form.capture_mut(MAIN_IMAGE)
            .unwrap()
            .select(vec![StagedFile::new("castle.png", vec![1; 10])]);
        form.aux_image_mut(1)
            .unwrap()
            .select(vec![StagedFile::new("gate.jpg", vec![2; 20])]);

        let payload = form.to_payload();
        let names: Vec<&str> = payload.field_names().collect();
        assert_eq!(names, vec!["name", "description", "main_image", "aux2_image"]);
        assert_eq!(payload.text_value("description"), Some(""));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut form = MaterialForm::default();
        form.name = "   ".to_string();
        assert_eq!(form.validate(), Err(FormError::MissingField("name")));
    }

    #[test]
    fn test_aux_slots_out_of_range() {
        let mut form = MaterialForm::default();
        assert!(form.aux_image_mut(2).is_none());
        assert!(form.capture("cover_image").is_none());
    }
}
