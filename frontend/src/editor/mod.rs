//! Create/edit modal shared by every entity editor.
//!
//! The modal is a small state machine: it is either closed or open in create
//! or edit mode. Each opening starts a new session with a fresh id. Submits
//! are split in two halves around the network call so that a response that
//! arrives after the user closed (or reopened) the modal cannot close or
//! otherwise touch the newer session.

mod material_form;
mod style_form;

pub use material_form::{MaterialForm, AUX_IMAGES, MAIN_IMAGE};
pub use style_form::StyleForm;

use crate::api::FormPayload;
use comicmaker_types::EntityId;

/// Resolves a stored image path to a displayable URL.
pub type ImageUrls<'a> = dyn Fn(&str) -> String + 'a;

/// Form validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("The editor is not open")]
    NotOpen,
}

/// A form backing an [`EditorModal`].
pub trait EntityForm {
    type Entity;

    /// Human-readable entity name used in titles ("material", "style").
    const LABEL: &'static str;

    fn entity_id(entity: &Self::Entity) -> EntityId;

    /// Reset every field and preview for a new entity.
    fn clear(&mut self);

    /// Fill the fields and previews from a stored entity.
    fn populate(&mut self, entity: &Self::Entity, image_urls: &ImageUrls<'_>);

    /// Check native field constraints (required fields).
    fn validate(&self) -> Result<(), FormError>;

    /// Assemble the multipart payload from text fields and staged files.
    fn to_payload(&self) -> FormPayload;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(EntityId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSession {
    pub id: u64,
    pub mode: EditorMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditorState {
    #[default]
    Closed,
    Open(EditorSession),
}

/// Everything needed to send one submit.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    /// Session the submit was started from
    pub session: u64,
    pub target: EditorMode,
    pub payload: FormPayload,
}

/// Generic create/edit modal.
#[derive(Debug)]
pub struct EditorModal<F: EntityForm> {
    form: F,
    state: EditorState,
    last_session: u64,
}

impl<F: EntityForm + Default> Default for EditorModal<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

impl<F: EntityForm> EditorModal<F> {
    pub fn new(form: F) -> Self {
        Self {
            form,
            state: EditorState::Closed,
            last_session: 0,
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, EditorState::Open(_))
    }

    pub fn session(&self) -> Option<&EditorSession> {
        match &self.state {
            EditorState::Open(session) => Some(session),
            EditorState::Closed => None,
        }
    }

    pub fn mode(&self) -> Option<&EditorMode> {
        self.session().map(|s| &s.mode)
    }

    /// Dialog title for the current mode.
    pub fn title(&self) -> String {
        match self.mode() {
            Some(EditorMode::Edit(_)) => format!("Edit {}", F::LABEL),
            _ => format!("Create {}", F::LABEL),
        }
    }

    /// Open the modal, replacing any session in progress.
    ///
    /// Without an entity the form is cleared for create; with one it is
    /// populated for edit. Returns the new session id.
    pub fn open(&mut self, entity: Option<&F::Entity>, image_urls: &ImageUrls<'_>) -> u64 {
        self.last_session += 1;
        let mode = match entity {
            Some(entity) => {
                let id = F::entity_id(entity);
                self.form.clear();
                self.form.populate(entity, image_urls);
                tracing::debug!("Opening {} editor for {}", F::LABEL, id);
                EditorMode::Edit(id)
            }
            None => {
                self.form.clear();
                tracing::debug!("Opening {} editor for a new entity", F::LABEL);
                EditorMode::Create
            }
        };
        self.state = EditorState::Open(EditorSession {
            id: self.last_session,
            mode,
        });
        self.last_session
    }

    /// Close the modal. Closing a closed modal does nothing.
    pub fn close(&mut self) {
        if let EditorState::Open(session) = std::mem::take(&mut self.state) {
            tracing::debug!("Closing {} editor session {}", F::LABEL, session.id);
            self.form.clear();
        }
    }

    /// Validate the form and assemble the request to send.
    pub fn begin_submit(&self) -> Result<SubmitRequest, FormError> {
        let session = self.session().ok_or(FormError::NotOpen)?;
        self.form.validate()?;
        Ok(SubmitRequest {
            session: session.id,
            target: session.mode.clone(),
            payload: self.form.to_payload(),
        })
    }

    /// Apply the outcome of a submit started from `session`.
    ///
    /// A successful submit closes the modal; a failed one leaves it open.
    /// Outcomes for sessions that are no longer current are ignored. Returns
    /// whether the session was still current.
    pub fn finish_submit(&mut self, session: u64, succeeded: bool) -> bool {
        let current = self.session().is_some_and(|s| s.id == session);
        if !current {
            tracing::debug!(
                "Ignoring {} submit result for stale session {}",
                F::LABEL,
                session
            );
            return false;
        }
        if succeeded {
            self.close();
        }
        true
    }
}
