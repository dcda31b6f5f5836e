use super::*;
use comicmaker_types::api::{EpisodeRequest, WorkRequest};
use comicmaker_types::{EntityId, Episode, Style, Work};

impl ApiClient {
    // ------------------------------------------------------------------
    // Styles (multipart bodies)
    // ------------------------------------------------------------------

    /// List all styles.
    pub async fn list_styles(&self) -> ApiResult<Vec<Style>> {
        let value = self.get("/styles").await?;
        self.envelope.unwrap_collection(value, "styles")
    }

    /// Get a specific style.
    pub async fn get_style(&self, id: &EntityId) -> ApiResult<Style> {
        let value = self.get(&format!("/styles/{}", segment(id.as_str()))).await?;
        self.envelope.unwrap_entity(value, "style")
    }

    /// Create a style (`name`, `description`, `image`).
    pub async fn create_style(&self, form: FormPayload) -> ApiResult<Value> {
        tracing::info!("Creating style");
        self.send_form("/styles", Method::POST, form).await
    }

    /// Update a style.
    pub async fn update_style(&self, id: &EntityId, form: FormPayload) -> ApiResult<Value> {
        tracing::info!("Updating style {}", id);
        self.send_form(&format!("/styles/{}", segment(id.as_str())), Method::PUT, form)
            .await
    }

    /// Delete a style.
    pub async fn delete_style(&self, id: &EntityId) -> ApiResult<()> {
        tracing::info!("Deleting style {}", id);
        self.delete(&format!("/styles/{}", segment(id.as_str())))
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Works (JSON bodies)
    // ------------------------------------------------------------------

    /// List all works.
    pub async fn list_works(&self) -> ApiResult<Vec<Work>> {
        let value = self.get("/works").await?;
        self.envelope.unwrap_collection(value, "works")
    }

    /// Get a specific work.
    pub async fn get_work(&self, id: &EntityId) -> ApiResult<Work> {
        let value = self.get(&format!("/works/{}", segment(id.as_str()))).await?;
        self.envelope.unwrap_entity(value, "work")
    }

    /// Create a work.
    pub async fn create_work(&self, request: &WorkRequest) -> ApiResult<Value> {
        tracing::info!("Creating work '{}'", request.name);
        self.send_json("/works", Method::POST, to_json(request)?)
            .await
    }

    /// Update a work.
    pub async fn update_work(&self, id: &EntityId, request: &WorkRequest) -> ApiResult<Value> {
        tracing::info!("Updating work {}", id);
        self.send_json(
            &format!("/works/{}", segment(id.as_str())),
            Method::PUT,
            to_json(request)?,
        )
        .await
    }

    /// Delete a work.
    pub async fn delete_work(&self, id: &EntityId) -> ApiResult<()> {
        tracing::info!("Deleting work {}", id);
        self.delete(&format!("/works/{}", segment(id.as_str())))
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Episodes (JSON bodies)
    // ------------------------------------------------------------------

    /// List the episodes of a work.
    pub async fn list_episodes(&self, work_id: &EntityId) -> ApiResult<Vec<Episode>> {
        let value = self
            .get(&format!("/episodes?work_id={}", segment(work_id.as_str())))
            .await?;
        self.envelope.unwrap_collection(value, "episodes")
    }

    /// Get a specific episode.
    pub async fn get_episode(&self, id: &EntityId) -> ApiResult<Episode> {
        let value = self
            .get(&format!("/episodes/{}", segment(id.as_str())))
            .await?;
        self.envelope.unwrap_entity(value, "episode")
    }

    /// Create an episode.
    pub async fn create_episode(&self, request: &EpisodeRequest) -> ApiResult<Value> {
        tracing::info!("Creating episode '{}'", request.title);
        self.send_json("/episodes", Method::POST, to_json(request)?)
            .await
    }

    /// Update an episode.
    pub async fn update_episode(
        &self,
        id: &EntityId,
        request: &EpisodeRequest,
    ) -> ApiResult<Value> {
        tracing::info!("Updating episode {}", id);
        self.send_json(
            &format!("/episodes/{}", segment(id.as_str())),
            Method::PUT,
            to_json(request)?,
        )
        .await
    }

    /// Delete an episode.
    pub async fn delete_episode(&self, id: &EntityId) -> ApiResult<()> {
        tracing::info!("Deleting episode {}", id);
        self.delete(&format!("/episodes/{}", segment(id.as_str())))
            .await?;
        Ok(())
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
