use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The section taxonomy used by the backend.
///
/// `personal`, `summary` and `skills` exist at most once per CV and are
/// addressed by type; `experience` and `education` are multi-instance and
/// addressed by section id only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Personal,
    Summary,
    Skills,
    Experience,
    Education,
}

impl SectionType {
    pub fn is_singleton(&self) -> bool {
        matches!(
            self,
            SectionType::Personal | SectionType::Summary | SectionType::Skills
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Personal => "personal",
            SectionType::Summary => "summary",
            SectionType::Skills => "skills",
            SectionType::Experience => "experience",
            SectionType::Education => "education",
        }
    }
}

/// A CV section as serialized by the backend. The backend owns the durable
/// copy; the engine only holds these as short-lived snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub section_type: SectionType,
    #[serde(default)]
    pub label: Option<String>,
    pub content: Value,
    #[serde(default)]
    pub display_order: i64,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

fn default_visible() -> bool {
    true
}

/// `GET .../sections` response body.
#[derive(Debug, Deserialize)]
pub struct SectionList {
    pub sections: Vec<Section>,
}

/// Envelope returned by section create and update calls.
#[derive(Debug, Deserialize)]
pub struct SectionEnvelope {
    pub success: bool,
    pub section: Section,
}

/// Envelope returned by section delete calls.
#[derive(Debug, Deserialize)]
pub struct DeleteEnvelope {
    pub success: bool,
}

/// Envelope returned by the CV meta endpoint.
#[derive(Debug, Deserialize)]
pub struct MetaEnvelope {
    pub success: bool,
    pub cv: Value,
}

/// `POST .../sections` request body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSection {
    pub section_type: SectionType,
    pub content: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
}

impl CreateSection {
    pub fn new(section_type: SectionType, content: Value) -> Self {
        CreateSection {
            section_type,
            content,
            label: None,
            display_order: None,
        }
    }
}

/// `PUT .../sections/{id}` request body. The backend applies only the fields
/// present, so everything is optional and absent fields stay off the wire.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
}

impl UpdateSection {
    /// The common case: replace the section content, touch nothing else.
    pub fn content(content: Value) -> Self {
        UpdateSection {
            content: Some(content),
            ..Default::default()
        }
    }
}

/// `PUT .../meta` request body: CV-level settings edited outside the
/// sections form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CvMetaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_pair: Option<String>,
}
