//! Materials page: category list, cards and the material editor.
//!
//! [`MaterialsPage`] is the page controller. It owns every piece of page
//! state and exposes plain async operations that return once the page state
//! is consistent again; a UI adapter renders [`MaterialsPage::view`] and
//! shows queued notifications.

use crate::actions::{ActionKind, PageAction};
use crate::api::{ApiClient, ApiError, ApiResult};
use crate::editor::{EditorModal, EditorMode, MaterialForm};
use crate::notify::{ConfirmTone, Dialogs, Notification, Notifications};
use comicmaker_types::{EntityId, Material, MaterialKind};

/// Shown instead of cards when a category has no materials.
pub const EMPTY_MESSAGE: &str = "No materials yet. Click \"Create material\" to add one.";

/// Inline graphic shown when a card image fails to load.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml,%3Csvg xmlns=%22http://www.w3.org/2000/svg%22 width=%22200%22 height=%22200%22%3E%3Crect fill=%22%23ddd%22 width=%22200%22 height=%22200%22/%3E%3Ctext x=%2250%25%22 y=%2250%25%22 text-anchor=%22middle%22 dy=%22.3em%22 fill=%22%23999%22%3ENo image%3C/text%3E%3C/svg%3E";

/// One rendered material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialCard {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    /// Main image URL, absent when the material has no main image
    pub image_url: Option<String>,
    /// Image to show when `image_url` fails to load
    pub placeholder: &'static str,
    pub edit: PageAction,
    pub delete: PageAction,
}

impl MaterialCard {
    /// Image to display, falling back to the placeholder.
    pub fn image_or_placeholder(&self) -> &str {
        self.image_url.as_deref().unwrap_or(self.placeholder)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Empty(String),
    Cards(Vec<MaterialCard>),
}

impl Default for ListView {
    fn default() -> Self {
        ListView::Empty(EMPTY_MESSAGE.to_string())
    }
}

/// A list load in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub category: MaterialKind,
    pub cache_bust: i64,
}

/// Page controller of the materials page.
pub struct MaterialsPage {
    api: ApiClient,
    category: MaterialKind,
    cache_bust: i64,
    items: Vec<Material>,
    view: ListView,
    editor: EditorModal<MaterialForm>,
    notifications: Notifications,
    load_generation: u64,
}

impl MaterialsPage {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            category: MaterialKind::Characters,
            cache_bust: current_time_millis(),
            items: Vec::new(),
            view: ListView::default(),
            editor: EditorModal::default(),
            notifications: Notifications::default(),
            load_generation: 0,
        }
    }

    /// Start on another category without loading it.
    pub fn with_category(mut self, category: MaterialKind) -> Self {
        self.category = category;
        self
    }

    pub fn category(&self) -> MaterialKind {
        self.category
    }

    /// Visible section title for the active category.
    pub fn section_title(&self) -> &'static str {
        self.category.title()
    }

    pub fn items(&self) -> &[Material] {
        &self.items
    }

    pub fn view(&self) -> &ListView {
        &self.view
    }

    pub fn cache_bust(&self) -> i64 {
        self.cache_bust
    }

    pub fn editor(&self) -> &EditorModal<MaterialForm> {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditorModal<MaterialForm> {
        &mut self.editor
    }

    /// Take every queued notification.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    /// Reload the active category. Returns whether the list was refreshed.
    pub async fn load(&mut self) -> bool {
        let ticket = self.begin_load();
        let result = self.api.list_materials(ticket.category).await;
        self.finish_load(ticket, result)
    }

    /// Start a load cycle: bumps the generation and takes a fresh
    /// cache-busting token for every image URL of this cycle.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        self.cache_bust = current_time_millis();
        tracing::debug!(
            "Loading {} materials (generation {})",
            self.category,
            self.load_generation
        );
        LoadTicket {
            generation: self.load_generation,
            category: self.category,
            cache_bust: self.cache_bust,
        }
    }

    /// Apply the result of a load. Results of superseded loads are dropped.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: ApiResult<Vec<Material>>) -> bool {
        if ticket.generation != self.load_generation {
            tracing::debug!(
                "Dropping {} materials of superseded load {}",
                ticket.category,
                ticket.generation
            );
            return false;
        }
        match result {
            Ok(items) => {
                tracing::info!("Loaded {} {} materials", items.len(), ticket.category);
                self.view = render(&self.api, ticket.category, &items, ticket.cache_bust);
                self.items = items;
                true
            }
            Err(e) => {
                tracing::error!("Failed to load materials: {}", e);
                self.fail("Failed to load materials", &e);
                false
            }
        }
    }

    /// Make `category` the active one and load it.
    pub async fn switch_category(&mut self, category: MaterialKind) -> bool {
        tracing::info!("Switching to {}", category);
        self.category = category;
        self.load().await
    }

    /// Open the editor for a new material.
    pub fn open_create(&mut self) -> u64 {
        self.editor.open(None, &|path: &str| path.to_string())
    }

    /// Fetch a material and open the editor for it.
    pub async fn edit(&mut self, id: &EntityId) -> bool {
        match self.api.get_material(self.category, id).await {
            Ok(material) => {
                let (api, category, cache_bust) = (&self.api, self.category, self.cache_bust);
                self.editor.open(Some(&material), &|path: &str| {
                    api.material_image_url(category, &material.id, path, cache_bust)
                });
                true
            }
            Err(e) => {
                tracing::error!("Failed to load material {}: {}", id, e);
                self.fail("Failed to load material", &e);
                false
            }
        }
    }

    /// Submit the editor: create or update, then close it and reload on
    /// success. Failures keep the editor open.
    pub async fn submit(&mut self) -> bool {
        let request = match self.editor.begin_submit() {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Material form is incomplete: {}", e);
                self.notifications
                    .push(Notification::error("Save failed", e.to_string()));
                return false;
            }
        };

        let result = match request.target {
            EditorMode::Create => {
                self.api
                    .create_material(self.category, request.payload)
                    .await
            }
            EditorMode::Edit(ref id) => {
                self.api
                    .update_material(self.category, id, request.payload)
                    .await
            }
        };

        self.editor.finish_submit(request.session, result.is_ok());
        match result {
            Ok(_) => {
                self.load().await;
                self.notifications
                    .push(Notification::success("Saved", "Material saved"));
                true
            }
            Err(e) => {
                tracing::error!("Failed to save material: {}", e);
                self.fail("Save failed", &e);
                false
            }
        }
    }

    /// Delete a material after the user confirms. Declining sends nothing.
    pub async fn delete(&mut self, id: &EntityId, dialogs: &dyn Dialogs) -> bool {
        let confirmed = dialogs
            .confirm(
                "Are you sure you want to delete this material?",
                "Confirm delete",
                ConfirmTone::Danger,
            )
            .await;
        if !confirmed {
            tracing::debug!("Deletion of material {} cancelled", id);
            self.notifications
                .push(Notification::info("Cancelled", "Material was not deleted"));
            return false;
        }

        match self.api.delete_material(self.category, id).await {
            Ok(()) => {
                self.load().await;
                self.notifications
                    .push(Notification::success("Deleted", "Material deleted"));
                true
            }
            Err(e) => {
                tracing::error!("Failed to delete material {}: {}", id, e);
                self.fail("Delete failed", &e);
                false
            }
        }
    }

    /// Run a card action.
    pub async fn dispatch(&mut self, action: &PageAction, dialogs: &dyn Dialogs) -> bool {
        match action.kind {
            ActionKind::Edit => self.edit(&action.id).await,
            ActionKind::Delete => self.delete(&action.id, dialogs).await,
        }
    }

    fn fail(&mut self, title: &str, error: &ApiError) {
        self.notifications
            .push(Notification::error(title, error.message()));
    }
}

/// Render loaded materials as cards, or the empty state.
pub fn render(
    api: &ApiClient,
    category: MaterialKind,
    items: &[Material],
    cache_bust: i64,
) -> ListView {
    if items.is_empty() {
        return ListView::default();
    }
    let cards = items
        .iter()
        .map(|material| MaterialCard {
            id: material.id.clone(),
            title: material.name.clone(),
            description: material.description.clone().unwrap_or_default(),
            image_url: material
                .main_image
                .as_deref()
                .filter(|path| !path.is_empty())
                .map(|path| api.material_image_url(category, &material.id, path, cache_bust)),
            placeholder: PLACEHOLDER_IMAGE,
            edit: PageAction::edit(material.id.clone()),
            delete: PageAction::delete(material.id.clone()),
        })
        .collect();
    ListView::Cards(cards)
}

fn current_time_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
