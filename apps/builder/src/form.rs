//! Snapshot collection over live form field values.
//!
//! [`FormSnapshot::collect`] is pure: it reads nothing but the field list it
//! is given and can be called on every change event. Grouping rules:
//!
//! - `personal.<key>` and `skills.<key>` strip their prefix into the
//!   respective map
//! - `summary` fills the summary text
//! - `exp_<key>` and `edu_<key>` group by the field's section id; fields
//!   sharing an id merge into one entry, fields without an id are ignored

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::trace;

/// Sentinel id rendered for an entry that exists in the form but not yet on
/// the backend. Such entries are never persisted through the generic save
/// path; they are created only by the explicit add actions.
pub const NEW_ENTRY_ID: &str = "new";

/// One input field as read from the live form.
#[derive(Debug, Clone)]
pub struct FormField {
    /// The field's `name` attribute, e.g. `personal.email` or `exp_title`.
    pub name: String,
    /// The section id carried by the field's group attribute, if any.
    pub section_id: Option<String>,
    pub value: String,
}

impl FormField {
    pub fn new(name: &str, value: &str) -> Self {
        FormField {
            name: name.to_string(),
            section_id: None,
            value: value.to_string(),
        }
    }

    pub fn grouped(name: &str, section_id: &str, value: &str) -> Self {
        FormField {
            name: name.to_string(),
            section_id: Some(section_id.to_string()),
            value: value.to_string(),
        }
    }
}

/// Experience section content in its wire shape. Fields never filled in the
/// form stay `None` and are omitted from the serialized body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExperienceContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(rename = "start_date", skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(rename = "end_date", skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExperienceEntry {
    pub id: String,
    pub content: ExperienceContent,
}

impl ExperienceEntry {
    fn new(id: &str) -> Self {
        ExperienceEntry {
            id: id.to_string(),
            content: ExperienceContent::default(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id == NEW_ENTRY_ID
    }

    pub fn content_json(&self) -> Value {
        serde_json::to_value(&self.content).unwrap_or_default()
    }

    fn set(&mut self, key: &str, value: &str) {
        let value = Some(value.to_string());
        match key {
            "title" => self.content.title = value,
            "company" => self.content.company = value,
            "start" => self.content.start = value,
            "end" => self.content.end = value,
            "location" => self.content.location = value,
            "description" => self.content.description = value,
            other => trace!(field = other, "Ignoring unknown experience field"),
        }
    }
}

/// Education section content in its wire shape.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EducationContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EducationEntry {
    pub id: String,
    pub content: EducationContent,
}

impl EducationEntry {
    fn new(id: &str) -> Self {
        EducationEntry {
            id: id.to_string(),
            content: EducationContent::default(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id == NEW_ENTRY_ID
    }

    pub fn content_json(&self) -> Value {
        serde_json::to_value(&self.content).unwrap_or_default()
    }

    fn set(&mut self, key: &str, value: &str) {
        let value = Some(value.to_string());
        match key {
            "degree" => self.content.degree = value,
            "field" => self.content.field = value,
            "institution" => self.content.institution = value,
            "year" => self.content.year = value,
            "gpa" => self.content.gpa = value,
            other => trace!(field = other, "Ignoring unknown education field"),
        }
    }
}

/// Everything the form says right now, rebuilt from scratch on every
/// collection. Entry order follows first appearance in the field list.
#[derive(Debug, Clone, Default)]
pub struct FormSnapshot {
    pub personal: BTreeMap<String, String>,
    pub summary: String,
    pub skills: BTreeMap<String, String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
}

impl FormSnapshot {
    pub fn collect(fields: &[FormField]) -> Self {
        let mut snapshot = FormSnapshot::default();

        for field in fields {
            if let Some(key) = field.name.strip_prefix("personal.") {
                snapshot.personal.insert(key.to_string(), field.value.clone());
            } else if field.name == "summary" {
                snapshot.summary = field.value.clone();
            } else if let Some(key) = field.name.strip_prefix("skills.") {
                snapshot.skills.insert(key.to_string(), field.value.clone());
            } else if let Some(key) = field.name.strip_prefix("exp_") {
                let Some(id) = field.section_id.as_deref() else {
                    continue;
                };
                experience_entry(&mut snapshot.experience, id).set(key, &field.value);
            } else if let Some(key) = field.name.strip_prefix("edu_") {
                let Some(id) = field.section_id.as_deref() else {
                    continue;
                };
                education_entry(&mut snapshot.education, id).set(key, &field.value);
            }
            // Anything else on the form is not section data.
        }

        snapshot
    }
}

fn experience_entry<'a>(entries: &'a mut Vec<ExperienceEntry>, id: &str) -> &'a mut ExperienceEntry {
    let pos = match entries.iter().position(|e| e.id == id) {
        Some(pos) => pos,
        None => {
            entries.push(ExperienceEntry::new(id));
            entries.len() - 1
        }
    };
    &mut entries[pos]
}

fn education_entry<'a>(entries: &'a mut Vec<EducationEntry>, id: &str) -> &'a mut EducationEntry {
    let pos = match entries.iter().position(|e| e.id == id) {
        Some(pos) => pos,
        None => {
            entries.push(EducationEntry::new(id));
            entries.len() - 1
        }
    };
    &mut entries[pos]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_personal_and_skills_prefixes_strip_into_maps() {
        let fields = vec![
            FormField::new("personal.name", "Ada Lovelace"),
            FormField::new("personal.email", "ada@example.com"),
            FormField::new("skills.languages", "Rust, Python"),
        ];
        let snapshot = FormSnapshot::collect(&fields);
        assert_eq!(snapshot.personal.get("name").unwrap(), "Ada Lovelace");
        assert_eq!(snapshot.personal.get("email").unwrap(), "ada@example.com");
        assert_eq!(snapshot.skills.get("languages").unwrap(), "Rust, Python");
        assert!(snapshot.summary.is_empty());
    }

    #[test]
    fn test_summary_field_fills_summary() {
        let fields = vec![FormField::new("summary", "Engineer of engines")];
        let snapshot = FormSnapshot::collect(&fields);
        assert_eq!(snapshot.summary, "Engineer of engines");
    }

    #[test]
    fn test_fields_sharing_section_id_merge_into_one_entry() {
        let fields = vec![
            FormField::grouped("exp_title", "7", "Engineer"),
            FormField::grouped("exp_company", "7", "Analytical Engines Ltd"),
        ];
        let snapshot = FormSnapshot::collect(&fields);
        assert_eq!(snapshot.experience.len(), 1);
        let entry = &snapshot.experience[0];
        assert_eq!(entry.id, "7");
        assert_eq!(entry.content.title.as_deref(), Some("Engineer"));
        assert_eq!(entry.content.company.as_deref(), Some("Analytical Engines Ltd"));
    }

    #[test]
    fn test_distinct_section_ids_never_merge() {
        let fields = vec![
            FormField::grouped("exp_title", "7", "Engineer"),
            FormField::grouped("exp_title", "8", "Consultant"),
        ];
        let snapshot = FormSnapshot::collect(&fields);
        assert_eq!(snapshot.experience.len(), 2);
        assert_eq!(snapshot.experience[0].id, "7");
        assert_eq!(snapshot.experience[1].id, "8");
    }

    #[test]
    fn test_entry_order_follows_first_appearance() {
        let fields = vec![
            FormField::grouped("edu_degree", "b", "MSc"),
            FormField::grouped("edu_degree", "a", "BSc"),
            FormField::grouped("edu_year", "b", "1842"),
        ];
        let snapshot = FormSnapshot::collect(&fields);
        assert_eq!(snapshot.education.len(), 2);
        assert_eq!(snapshot.education[0].id, "b");
        assert_eq!(snapshot.education[1].id, "a");
        assert_eq!(snapshot.education[0].content.year.as_deref(), Some("1842"));
    }

    #[test]
    fn test_entry_fields_without_section_id_are_ignored() {
        let fields = vec![FormField::new("exp_title", "Orphan")];
        let snapshot = FormSnapshot::collect(&fields);
        assert!(snapshot.experience.is_empty());
    }

    #[test]
    fn test_unknown_entry_suffix_is_ignored() {
        let fields = vec![
            FormField::grouped("exp_title", "7", "Engineer"),
            FormField::grouped("exp_badge", "7", "unused"),
        ];
        let snapshot = FormSnapshot::collect(&fields);
        assert_eq!(
            snapshot.experience[0].content_json(),
            json!({"title": "Engineer"})
        );
    }

    #[test]
    fn test_content_json_renames_dates_and_drops_absent_fields() {
        let fields = vec![
            FormField::grouped("exp_title", "7", "Engineer"),
            FormField::grouped("exp_start", "7", "1833"),
            FormField::grouped("exp_end", "7", "Present"),
        ];
        let snapshot = FormSnapshot::collect(&fields);
        assert_eq!(
            snapshot.experience[0].content_json(),
            json!({"title": "Engineer", "start_date": "1833", "end_date": "Present"})
        );
    }

    #[test]
    fn test_sentinel_entry_is_collected_but_flagged_new() {
        let fields = vec![FormField::grouped("edu_degree", NEW_ENTRY_ID, "BSc")];
        let snapshot = FormSnapshot::collect(&fields);
        assert_eq!(snapshot.education.len(), 1);
        assert!(snapshot.education[0].is_new());
    }
}
