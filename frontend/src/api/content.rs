use super::*;
use comicmaker_types::api::GenerateScriptRequest;
use comicmaker_types::{EntityId, Script, Shot, ShotPrompts, StoryboardFormat};

/// Which asset a shot generation request produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotAsset {
    Image,
    Video,
    Audio,
}

impl ShotAsset {
    fn endpoint_suffix(&self) -> &'static str {
        match self {
            ShotAsset::Image => "generate-image",
            ShotAsset::Video => "generate-video",
            ShotAsset::Audio => "generate-audio",
        }
    }
}

/// Path of an episode inside a work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRef {
    pub work_id: EntityId,
    pub episode_id: EntityId,
}

impl EpisodeRef {
    pub fn new(work_id: impl Into<EntityId>, episode_id: impl Into<EntityId>) -> Self {
        Self {
            work_id: work_id.into(),
            episode_id: episode_id.into(),
        }
    }

    fn path(&self) -> String {
        format!(
            "{}/{}",
            segment(self.work_id.as_str()),
            segment(self.episode_id.as_str())
        )
    }
}

impl ApiClient {
    /// Ask the backend to draft a script for an episode.
    pub async fn generate_script(&self, episode_id: &EntityId, prompt: &str) -> ApiResult<Value> {
        tracing::info!("Generating script for episode {}", episode_id);
        let body = GenerateScriptRequest {
            prompt: prompt.to_string(),
        };
        let body = serde_json::to_value(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.send_json(
            &format!("/episodes/{}/generate_script", segment(episode_id.as_str())),
            Method::POST,
            body,
        )
        .await
    }

    /// Get the script of an episode.
    pub async fn get_script(&self, episode: &EpisodeRef) -> ApiResult<Script> {
        let value = self
            .get(&format!("/episodes/{}/script", episode.path()))
            .await?;
        self.envelope.unwrap_entity(value, "script")
    }

    /// Save the script of an episode together with its timing targets.
    pub async fn save_script(
        &self,
        episode: &EpisodeRef,
        script: &str,
        expected_duration: f64,
        shot_duration: Option<f64>,
    ) -> ApiResult<Value> {
        let mut form = FormPayload::new()
            .text("script", script)
            .text("expected_duration", expected_duration.to_string());
        form.push_optional_text("shot_duration", shot_duration.map(|d| d.to_string()));
        self.send_form(
            &format!("/episodes/{}/script", episode.path()),
            Method::PUT,
            form,
        )
        .await
    }

    /// Get the storyboard of an episode, optionally in a specific representation.
    pub async fn get_storyboard(
        &self,
        episode: &EpisodeRef,
        format: Option<StoryboardFormat>,
    ) -> ApiResult<Value> {
        let mut endpoint = format!("/episodes/{}/storyboard", episode.path());
        if let Some(format) = format {
            endpoint.push_str("?format=");
            endpoint.push_str(format.as_str());
        }
        self.get(&endpoint).await
    }

    /// Replace the storyboard with free text.
    pub async fn save_storyboard_text(&self, episode: &EpisodeRef, text: &str) -> ApiResult<Value> {
        self.send_form(
            &format!("/episodes/{}/storyboard/text", episode.path()),
            Method::POST,
            FormPayload::new().text("text", text),
        )
        .await
    }

    /// Generate a storyboard from a script.
    pub async fn generate_storyboard(&self, episode: &EpisodeRef, script: &str) -> ApiResult<Value> {
        tracing::info!("Generating storyboard for episode {}", episode.episode_id);
        self.send_form(
            &format!("/content/{}/generate-storyboard", episode.path()),
            Method::POST,
            FormPayload::new().text("script", script),
        )
        .await
    }

    /// Confirm the storyboard so shots can be produced.
    pub async fn confirm_storyboard(&self, episode: &EpisodeRef) -> ApiResult<Value> {
        self.request(
            &format!("/content/{}/confirm-storyboard", episode.path()),
            Method::POST,
            HeaderMap::new(),
            RequestBody::Empty,
        )
        .await
    }

    /// Get a single shot.
    pub async fn get_shot(&self, episode: &EpisodeRef, shot_id: &EntityId) -> ApiResult<Shot> {
        let value = self
            .get(&format!(
                "/content/{}/{}",
                episode.path(),
                segment(shot_id.as_str())
            ))
            .await?;
        self.envelope.unwrap_entity(value, "shot")
    }

    /// Update arbitrary shot fields. Null fields are not sent.
    pub async fn update_shot(
        &self,
        episode: &EpisodeRef,
        shot_id: &EntityId,
        fields: &serde_json::Map<String, Value>,
    ) -> ApiResult<Value> {
        let mut form = FormPayload::new();
        for (key, value) in fields {
            match value {
                Value::Null => {}
                Value::String(text) => form.push_text(key.as_str(), text.as_str()),
                other => form.push_text(key.as_str(), other.to_string()),
            }
        }
        self.send_form(
            &format!("/content/{}/{}", episode.path(), segment(shot_id.as_str())),
            Method::PUT,
            form,
        )
        .await
    }

    /// Update the generation prompts of a shot. Only present prompts are sent.
    pub async fn update_prompts(
        &self,
        episode: &EpisodeRef,
        shot_id: &EntityId,
        prompts: &ShotPrompts,
    ) -> ApiResult<Value> {
        let mut form = FormPayload::new();
        form.push_optional_text("image_prompt", prompts.image.as_deref());
        form.push_optional_text("video_prompt", prompts.video.as_deref());
        form.push_optional_text("audio_prompt", prompts.audio.as_deref());
        self.send_form(
            &format!(
                "/content/{}/{}/prompts",
                episode.path(),
                segment(shot_id.as_str())
            ),
            Method::PUT,
            form,
        )
        .await
    }

    /// Generate an image, video or audio asset for a shot.
    pub async fn generate_shot_asset(
        &self,
        episode: &EpisodeRef,
        shot_id: &EntityId,
        asset: ShotAsset,
        prompt: &str,
    ) -> ApiResult<Value> {
        tracing::info!(
            "Requesting {} for shot {} of episode {}",
            asset.endpoint_suffix(),
            shot_id,
            episode.episode_id
        );
        self.send_form(
            &format!(
                "/content/{}/{}/{}",
                episode.path(),
                segment(shot_id.as_str()),
                asset.endpoint_suffix()
            ),
            Method::POST,
            FormPayload::new().text("prompt", prompt),
        )
        .await
    }

    /// Pick one of the generated candidate images for a shot.
    pub async fn select_image(
        &self,
        episode: &EpisodeRef,
        shot_id: &EntityId,
        image_path: &str,
    ) -> ApiResult<Value> {
        self.send_form(
            &format!(
                "/content/{}/{}/select-image",
                episode.path(),
                segment(shot_id.as_str())
            ),
            Method::POST,
            FormPayload::new().text("image_path", image_path),
        )
        .await
    }

    /// Download a generated video into the shot's storage.
    pub async fn download_video(
        &self,
        episode: &EpisodeRef,
        shot_id: &EntityId,
        video_url: &str,
    ) -> ApiResult<Value> {
        self.send_form(
            &format!(
                "/content/{}/{}/download-video",
                episode.path(),
                segment(shot_id.as_str())
            ),
            Method::POST,
            FormPayload::new().text("video_url", video_url),
        )
        .await
    }
}
