use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::models::quote::Quote;
use crate::store::Fields;

/// Categories offered by the project form. Stored values are free strings.
pub const CATEGORIES: &[&str] = &["Commercial", "Industrial", "Residential", "Renovation"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    InProgress,
    Completed,
    OnHold,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Planning,
        ProjectStatus::InProgress,
        ProjectStatus::Completed,
        ProjectStatus::OnHold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on-hold",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "Planning",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::OnHold => "On Hold",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }
}

/// Everything an admin can set on a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectFields {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub area: String,
    pub capacity: Option<String>,
    pub image: String,
    pub images: Vec<String>,
    pub key_features: Vec<String>,
    pub technical_specs: Vec<String>,
    pub completion_date: Option<String>,
    pub estimated_completion: Option<String>,
    pub progress: u8,
    pub status: ProjectStatus,
    pub is_portfolio: bool,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub current_phase: Option<String>,
    pub next_phase: Option<String>,
}

impl ProjectFields {
    /// Apply the record invariants: progress stays within 0..=100 and a
    /// portfolio project never references a customer.
    pub fn normalize(&mut self) {
        self.progress = self.progress.min(100);
        if self.customer_id.as_deref().is_some_and(|c| c.trim().is_empty()) {
            self.customer_id = None;
        }
        if self.is_portfolio {
            self.customer_id = None;
        }
    }

    /// Default draft for turning a quote into a customer project.
    pub fn from_quote(quote: &Quote) -> Self {
        let full_name = quote.full_name();
        ProjectFields {
            title: format!("{} – {}", quote.project_type, full_name),
            description: quote.description.clone(),
            category: quote.project_type.clone(),
            is_portfolio: false,
            customer_id: quote.user_id.clone(),
            customer_name: Some(full_name),
            status: ProjectStatus::Planning,
            progress: 0,
            ..Default::default()
        }
    }
}

/// A stored project.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: String,
    pub fields: ProjectFields,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deref for Project {
    type Target = ProjectFields;

    fn deref(&self) -> &ProjectFields {
        &self.fields
    }
}

impl Project {
    pub fn status_label(&self) -> &'static str {
        self.status.label()
    }

    pub fn status_class(&self) -> &'static str {
        self.status.as_str()
    }

    pub fn created_on(&self) -> String {
        self.created_at.format("%b %d, %Y").to_string()
    }

    pub fn customer_label(&self) -> &str {
        self.customer_name.as_deref().unwrap_or("—")
    }

    pub fn capacity_text(&self) -> &str {
        self.capacity.as_deref().unwrap_or("")
    }

    pub fn completion_text(&self) -> &str {
        self.completion_date
            .as_deref()
            .or(self.estimated_completion.as_deref())
            .unwrap_or("TBD")
    }

    pub fn current_phase_text(&self) -> &str {
        self.current_phase.as_deref().unwrap_or("")
    }

    pub fn next_phase_text(&self) -> &str {
        self.next_phase.as_deref().unwrap_or("")
    }

    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }

    /// First sentence-ish slice of the description for cards.
    pub fn summary(&self) -> String {
        const MAX: usize = 160;
        if self.description.chars().count() <= MAX {
            self.description.clone()
        } else {
            let cut: String = self.description.chars().take(MAX).collect();
            format!("{}…", cut.trim_end())
        }
    }

    pub fn is_owned_by(&self, uid: &str) -> bool {
        self.customer_id.as_deref() == Some(uid)
    }
}

/// A partial update. Only the keys that were set are merged into the record.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    fields: Fields,
}

impl ProjectPatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn title(self, title: &str) -> Self {
        self.set("title", json!(title))
    }

    pub fn description(self, description: &str) -> Self {
        self.set("description", json!(description))
    }

    pub fn status(self, status: ProjectStatus) -> Self {
        self.set("status", json!(status))
    }

    pub fn progress(self, progress: u8) -> Self {
        self.set("progress", json!(progress.min(100)))
    }

    pub fn phases(self, current: Option<&str>, next: Option<&str>) -> Self {
        self.set("currentPhase", json!(current))
            .set("nextPhase", json!(next))
    }

    /// Marking a project as portfolio clears its customer.
    pub fn portfolio(self, is_portfolio: bool) -> Self {
        let patch = self.set("isPortfolio", json!(is_portfolio));
        if is_portfolio {
            patch.set("customerId", Value::Null)
        } else {
            patch
        }
    }

    pub fn customer(self, customer_id: Option<&str>, customer_name: Option<&str>) -> Self {
        self.set("customerId", json!(customer_id))
            .set("customerName", json!(customer_name))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Sets a customer without saying whether the project is portfolio, so
    /// the stored flag decides.
    pub fn assigns_customer(&self) -> bool {
        !self.fields.contains_key("isPortfolio")
            && self.fields.get("customerId").is_some_and(|c| !c.is_null())
    }

    /// Fields to merge. Re-applies the portfolio rule in case `customer` was
    /// set after `portfolio(true)`.
    pub fn into_fields(mut self) -> Fields {
        if self.fields.get("isPortfolio") == Some(&Value::Bool(true)) {
            self.fields.insert("customerId".to_string(), Value::Null);
        }
        self.fields
    }
}

impl From<ProjectFields> for ProjectPatch {
    /// A patch that replaces every editable field.
    fn from(mut fields: ProjectFields) -> Self {
        fields.normalize();
        let map = crate::store::to_fields(&fields).unwrap_or_default();
        ProjectPatch { fields: map }
    }
}
