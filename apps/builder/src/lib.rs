//! Client-side synchronization engine for the CV builder editor.
//!
//! The engine sits between a rendered CV form and the backend sections API.
//! It snapshots field values into a [`FormSnapshot`], debounces preview
//! refresh and autosave, and translates each snapshot into find-or-create
//! and update calls against the sections resource, reflecting progress in a
//! save-status indicator.
//!
//! Event wiring and rendering stay with the host: it implements
//! [`FormDocument`] and [`EditorSurface`], constructs a
//! [`FormSyncController`] (usually via [`FormSyncController::initialize`]),
//! and forwards UI events to the controller's operations.

pub mod client;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod form;
pub mod models;
pub mod surface;

pub use client::{ApiError, SectionsClient};
pub use config::BuilderConfig;
pub use controller::FormSyncController;
pub use debounce::Debounce;
pub use form::{FormField, FormSnapshot, NEW_ENTRY_ID};
pub use models::{CvMetaUpdate, Section, SectionType, UpdateSection};
pub use surface::{EditorSurface, FormDocument, SaveStatus};
