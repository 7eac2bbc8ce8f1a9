//! The form-to-API synchronization controller.
//!
//! One controller instance serves one open editor. The host forwards UI
//! events (field input, submit, add/delete clicks) to the operations below;
//! the controller turns them into sections API calls and pushes the
//! resulting UI effects back through [`EditorSurface`].

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::client::{ApiError, SectionsClient};
use crate::config::BuilderConfig;
use crate::debounce::Debounce;
use crate::form::FormSnapshot;
use crate::models::{CreateSection, CvMetaUpdate, Section, SectionType, UpdateSection};
use crate::surface::{EditorSurface, FormDocument, SaveStatus};

/// Display order assigned to entries created through the add actions. The
/// backend sorts on read, so new entries land at the end of their list.
const NEW_ENTRY_DISPLAY_ORDER: i64 = 999;

pub struct FormSyncController {
    client: SectionsClient,
    config: BuilderConfig,
    form: Arc<dyn FormDocument>,
    surface: Arc<dyn EditorSurface>,
    preview_debounce: Debounce,
    autosave_debounce: Debounce,
    status: Mutex<SaveStatus>,
    /// Ephemeral copy of the multi-instance sections, kept so add and delete
    /// can patch state and re-render one list instead of reloading the view.
    entries: Mutex<Vec<Section>>,
    /// Self-handle for the debounce timer tasks. Weak so pending timers
    /// never keep a torn-down controller alive.
    weak: Weak<FormSyncController>,
}

impl FormSyncController {
    pub fn new(
        config: BuilderConfig,
        form: Arc<dyn FormDocument>,
        surface: Arc<dyn EditorSurface>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| FormSyncController {
            client: SectionsClient::new(&config.base_url, &config.csrf_token),
            preview_debounce: Debounce::new(Duration::from_millis(config.preview_debounce_ms)),
            autosave_debounce: Debounce::new(Duration::from_millis(config.autosave_debounce_ms)),
            config,
            form,
            surface,
            // No indicator update is issued here; the page keeps whatever
            // the server rendered until the first transition.
            status: Mutex::new(SaveStatus::Saved),
            entries: Mutex::new(Vec::new()),
            weak: weak.clone(),
        })
    }

    /// Builds a controller from ambient configuration and performs the
    /// initial section load. Returns `None` when the CV id or anti-forgery
    /// token is absent, in which case the editor runs without sync.
    pub async fn initialize(
        form: Arc<dyn FormDocument>,
        surface: Arc<dyn EditorSurface>,
    ) -> anyhow::Result<Option<Arc<Self>>> {
        let config = match BuilderConfig::from_env()? {
            Some(config) => config,
            None => return Ok(None),
        };
        let controller = Self::new(config, form, surface);
        controller.load_sections().await;
        Ok(Some(controller))
    }

    pub fn status(&self) -> SaveStatus {
        *self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_status(&self, status: SaveStatus) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = status;
        self.surface.set_save_status(status);
    }

    /// Field-change hook. Marks the form dirty and restarts both debounce
    /// timers; each restart cancels the pending firing of its kind.
    pub fn on_form_change(&self) {
        self.set_status(SaveStatus::Unsaved);

        if let Some(controller) = self.weak.upgrade() {
            self.preview_debounce.schedule(async move {
                controller.refresh_preview();
            });
        }
        if let Some(controller) = self.weak.upgrade() {
            self.autosave_debounce.schedule(async move {
                controller.auto_save().await;
            });
        }
    }

    /// Explicit save, from submit or a manual trigger.
    pub async fn save(&self) {
        self.set_status(SaveStatus::Saving);
        let snapshot = FormSnapshot::collect(&self.form.fields());

        match self.persist(&snapshot).await {
            Ok(()) => {
                self.set_status(SaveStatus::Saved);
                self.refresh_preview();
            }
            Err(e) => {
                error!("Save failed: {e}");
                self.surface.show_error("Failed to save CV. Please try again.");
                self.set_status(SaveStatus::Unsaved);
            }
        }
    }

    /// Debounce-triggered save. Failure is logged and leaves the form marked
    /// unsaved; a background save never raises a blocking error.
    pub async fn auto_save(&self) {
        debug!("Auto-saving");
        let snapshot = FormSnapshot::collect(&self.form.fields());

        match self.persist(&snapshot).await {
            Ok(()) => self.set_status(SaveStatus::Saved),
            Err(e) => {
                warn!("Auto-save failed: {e}");
                self.set_status(SaveStatus::Unsaved);
            }
        }
    }

    /// Pushes one snapshot to the backend: find-or-create for the singleton
    /// section types, update-by-id for multi-instance entries. Entries still
    /// carrying the `new` sentinel are skipped; they only come into being
    /// through the explicit add actions. Empty singleton payloads issue no
    /// call at all.
    pub async fn persist(&self, snapshot: &FormSnapshot) -> Result<(), ApiError> {
        if !snapshot.personal.is_empty() {
            self.upsert_singleton(SectionType::Personal, json!(snapshot.personal))
                .await?;
        }
        if !snapshot.summary.is_empty() {
            self.upsert_singleton(SectionType::Summary, json!({ "text": snapshot.summary }))
                .await?;
        }
        if !snapshot.skills.is_empty() {
            self.upsert_singleton(SectionType::Skills, json!(snapshot.skills))
                .await?;
        }

        for entry in &snapshot.experience {
            if entry.is_new() {
                debug!("Skipping unsaved experience entry");
                continue;
            }
            self.client
                .update_section(
                    &self.config.cv_id,
                    &entry.id,
                    &UpdateSection::content(entry.content_json()),
                )
                .await?;
        }

        for entry in &snapshot.education {
            if entry.is_new() {
                debug!("Skipping unsaved education entry");
                continue;
            }
            self.client
                .update_section(
                    &self.config.cv_id,
                    &entry.id,
                    &UpdateSection::content(entry.content_json()),
                )
                .await?;
        }

        Ok(())
    }

    async fn upsert_singleton(&self, kind: SectionType, content: Value) -> Result<(), ApiError> {
        let existing = self
            .sections_or_empty()
            .await
            .into_iter()
            .find(|s| s.section_type == kind);

        match existing {
            Some(section) => {
                self.client
                    .update_section(
                        &self.config.cv_id,
                        &section.id,
                        &UpdateSection::content(content),
                    )
                    .await?;
            }
            None => {
                self.client
                    .create_section(&self.config.cv_id, &CreateSection::new(kind, content))
                    .await?;
            }
        }
        Ok(())
    }

    /// Current sections, degrading to an empty list when the fetch fails so
    /// the find-or-create path falls back to create.
    async fn sections_or_empty(&self) -> Vec<Section> {
        match self.client.list_sections(&self.config.cv_id).await {
            Ok(sections) => sections,
            Err(e) => {
                warn!("Failed to list sections: {e}");
                Vec::new()
            }
        }
    }

    /// Initial fetch: seeds the entry cache and renders both entry lists.
    pub async fn load_sections(&self) {
        let sections = self.sections_or_empty().await;
        info!(count = sections.len(), "Sections loaded");

        {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            *entries = sections
                .into_iter()
                .filter(|s| !s.section_type.is_singleton())
                .collect();
        }

        self.render_entries(SectionType::Experience);
        self.render_entries(SectionType::Education);
    }

    fn render_entries(&self, kind: SectionType) {
        let mut sections: Vec<Section> = {
            let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries
                .iter()
                .filter(|s| s.section_type == kind)
                .cloned()
                .collect()
        };
        sections.sort_by_key(|s| s.display_order);
        self.surface.render_entries(kind, &sections);
    }

    pub async fn add_experience(&self) {
        self.add_entry(
            SectionType::Experience,
            json!({
                "title": "",
                "company": "",
                "start_date": "",
                "end_date": "Present",
                "location": "",
                "description": ""
            }),
        )
        .await;
    }

    pub async fn add_education(&self) {
        self.add_entry(
            SectionType::Education,
            json!({
                "degree": "",
                "field": "",
                "institution": "",
                "year": "",
                "gpa": ""
            }),
        )
        .await;
    }

    /// Creates a blank multi-instance section, then patches the created
    /// Section into the cache and re-renders just the affected list.
    async fn add_entry(&self, kind: SectionType, content: Value) {
        let body = CreateSection {
            section_type: kind,
            content,
            label: None,
            display_order: Some(NEW_ENTRY_DISPLAY_ORDER),
        };

        match self.client.create_section(&self.config.cv_id, &body).await {
            Ok(envelope) if envelope.success => {
                debug!(id = %envelope.section.id, kind = kind.as_str(), "Entry created");
                self.entries
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(envelope.section);
                self.render_entries(kind);
            }
            Ok(_) => warn!(kind = kind.as_str(), "Backend refused to create entry"),
            Err(e) => {
                error!("Failed to add {} entry: {e}", kind.as_str());
                self.surface
                    .show_error(&format!("Failed to add entry: {e}"));
            }
        }
    }

    /// Confirmed delete of one multi-instance entry. On success the section
    /// leaves the cache and only its list is re-rendered.
    pub async fn delete_entry(&self, section_id: &str) {
        if !self.surface.confirm_delete("Delete this entry?").await {
            return;
        }

        match self.client.delete_section(&self.config.cv_id, section_id).await {
            Ok(_) => {
                let kind = {
                    let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
                    let kind = entries
                        .iter()
                        .find(|s| s.id == section_id)
                        .map(|s| s.section_type);
                    entries.retain(|s| s.id != section_id);
                    kind
                };
                if let Some(kind) = kind {
                    self.render_entries(kind);
                }
            }
            Err(e) => {
                error!("Delete failed: {e}");
                self.surface.show_error(&format!("Failed to delete: {e}"));
            }
        }
    }

    /// Points the preview surface at a freshly rendered document. The
    /// timestamp query defeats the frame's cache.
    pub fn refresh_preview(&self) {
        let url = format!(
            "{}/cv/{}/preview?t={}",
            self.config.base_url,
            self.config.cv_id,
            Utc::now().timestamp_millis()
        );
        self.surface.load_preview(&url);
    }

    /// Pushes CV-level settings (title, template, colors) through the meta
    /// endpoint, with the same status transitions as an explicit save.
    pub async fn update_meta(&self, meta: &CvMetaUpdate) {
        self.set_status(SaveStatus::Saving);

        match self.client.update_meta(&self.config.cv_id, meta).await {
            Ok(_) => {
                self.set_status(SaveStatus::Saved);
                self.refresh_preview();
            }
            Err(e) => {
                error!("Meta update failed: {e}");
                self.surface
                    .show_error("Failed to save CV settings. Please try again.");
                self.set_status(SaveStatus::Unsaved);
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
