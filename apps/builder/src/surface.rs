//! Trait seams between the sync engine and the host UI.
//!
//! The controller never reaches for globals; the host hands it a
//! [`FormDocument`] to read field values from and an [`EditorSurface`] to
//! push UI effects through, and keeps the event wiring on its side.

use async_trait::async_trait;

use crate::form::FormField;
use crate::models::{Section, SectionType};

/// Save state shown by the editor's status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Unsaved,
    Saving,
}

impl SaveStatus {
    /// Indicator text used by the editor chrome.
    pub fn message(&self) -> &'static str {
        match self {
            SaveStatus::Saved => "All changes saved",
            SaveStatus::Unsaved => "Unsaved changes",
            SaveStatus::Saving => "Saving...",
        }
    }
}

/// Read-only view of the live form.
pub trait FormDocument: Send + Sync {
    /// Current values of every bound input field.
    fn fields(&self) -> Vec<FormField>;
}

/// The host UI as seen by the controller.
#[async_trait]
pub trait EditorSurface: Send + Sync {
    /// Updates the save-status indicator.
    fn set_save_status(&self, status: SaveStatus);

    /// Navigates the preview surface to a freshly rendered document.
    fn load_preview(&self, url: &str);

    /// Replaces the rendered list for one multi-instance section kind.
    fn render_entries(&self, kind: SectionType, sections: &[Section]);

    /// Asks the user to confirm a destructive action.
    async fn confirm_delete(&self, message: &str) -> bool;

    /// Blocking error display.
    fn show_error(&self, message: &str);
}
