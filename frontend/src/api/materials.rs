use super::*;
use comicmaker_types::{EntityId, Material, MaterialKind};

impl ApiClient {
    /// List the materials of one category.
    pub async fn list_materials(&self, kind: MaterialKind) -> ApiResult<Vec<Material>> {
        let endpoint = format!("/materials/{}", kind);
        let value = self.get(&endpoint).await?;
        let mut materials: Vec<Material> = self.envelope.unwrap_collection(value, "materials")?;
        for material in &mut materials {
            material.category.get_or_insert(kind);
        }
        tracing::debug!("Loaded {} {} materials", materials.len(), kind);
        Ok(materials)
    }

    /// Get a single material.
    pub async fn get_material(&self, kind: MaterialKind, id: &EntityId) -> ApiResult<Material> {
        let endpoint = format!("/materials/{}/{}", kind, segment(id.as_str()));
        let value = self.get(&endpoint).await?;
        let mut material: Material = self.envelope.unwrap_entity(value, "material")?;
        material.category.get_or_insert(kind);
        Ok(material)
    }

    /// Create a material from a multipart payload
    /// (`name`, `description`, `main_image`, `aux1_image`, `aux2_image`).
    pub async fn create_material(&self, kind: MaterialKind, form: FormPayload) -> ApiResult<Value> {
        tracing::info!("Creating {} material", kind);
        self.send_form(&format!("/materials/{}", kind), Method::POST, form)
            .await
    }

    /// Update a material. Every field of the payload is optional.
    pub async fn update_material(
        &self,
        kind: MaterialKind,
        id: &EntityId,
        form: FormPayload,
    ) -> ApiResult<Value> {
        tracing::info!("Updating {} material {}", kind, id);
        let endpoint = format!("/materials/{}/{}", kind, segment(id.as_str()));
        self.send_form(&endpoint, Method::PUT, form).await
    }

    /// Delete a material.
    pub async fn delete_material(&self, kind: MaterialKind, id: &EntityId) -> ApiResult<()> {
        tracing::info!("Deleting {} material {}", kind, id);
        let endpoint = format!("/materials/{}/{}", kind, segment(id.as_str()));
        self.delete(&endpoint).await?;
        Ok(())
    }

    /// URL of a stored material image with a cache-busting token.
    pub fn material_image_url(
        &self,
        kind: MaterialKind,
        id: &EntityId,
        image_path: &str,
        cache_bust: i64,
    ) -> String {
        let path = image_path
            .trim_start_matches('/')
            .split('/')
            .map(segment)
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/materials/{}/{}/image/{}?t={}",
            self.base_url,
            kind,
            segment(id.as_str()),
            path,
            cache_bust
        )
    }
}
