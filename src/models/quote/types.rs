use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Converted,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 4] = [
        QuoteStatus::Pending,
        QuoteStatus::Approved,
        QuoteStatus::Rejected,
        QuoteStatus::Converted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Converted => "converted",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "Pending",
            QuoteStatus::Approved => "Approved",
            QuoteStatus::Rejected => "Rejected",
            QuoteStatus::Converted => "Converted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }
}

/// Project types offered by the quote forms, as (value, label).
pub const PROJECT_TYPES: &[(&str, &str)] = &[
    ("residential", "Residential"),
    ("commercial", "Commercial"),
    ("industrial", "Industrial"),
    ("renovation", "Renovation"),
    ("other", "Other"),
];

pub const TIMELINES: &[(&str, &str)] = &[
    ("asap", "ASAP"),
    ("1-3months", "1-3 Months"),
    ("3-6months", "3-6 Months"),
    ("6-12months", "6-12 Months"),
    ("over-year", "Over 1 Year"),
];

/// Origin tag recorded on every quote.
pub mod source {
    pub const HOMEPAGE: &str = "homepage";
    pub const CONTACT: &str = "contact";
    pub const CUSTOMER_DASHBOARD: &str = "customer-dashboard";

    pub fn project(project_id: &str) -> String {
        format!("project-{project_id}")
    }

    /// Tags the public quote endpoint accepts.
    pub fn is_public(source: &str) -> bool {
        source == HOMEPAGE || source == CONTACT || project_id(source).is_some()
    }

    fn project_id(source: &str) -> Option<&str> {
        source
            .strip_prefix("project-")
            .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()))
    }

    /// Page a visitor returns to after submitting from `source`.
    pub fn return_path(source: &str) -> String {
        match source {
            HOMEPAGE => "/#quote".to_string(),
            CONTACT => "/contact".to_string(),
            CUSTOMER_DASHBOARD => "/customer-dashboard?tab=quotes".to_string(),
            other => match project_id(other) {
                Some(id) => format!("/projects/{id}"),
                None => "/".to_string(),
            },
        }
    }
}

/// What a visitor fills in on any quote form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub project_type: String,
    pub timeline: String,
    pub description: String,
    pub budget: Option<String>,
}

impl QuoteRequest {
    /// Required-field checks run before submission.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];
        errors.extend(validate::validate_required(&self.first_name, "First name", 100));
        errors.extend(validate::validate_required(&self.last_name, "Last name", 100));
        errors.extend(validate::validate_email(&self.email));
        errors.extend(validate::validate_required(&self.phone, "Phone", 40));
        errors.extend(validate::validate_required(&self.project_type, "Project type", 100));
        errors.extend(validate::validate_optional(&self.timeline, "Timeline", 100));
        errors.extend(validate::validate_required(&self.description, "Project description", 5000));
        if let Some(budget) = &self.budget {
            errors.extend(validate::validate_optional(budget, "Budget", 100));
        }
        errors
    }

    pub fn trimmed(&self) -> Self {
        let t = |s: &str| s.trim().to_string();
        QuoteRequest {
            first_name: t(&self.first_name),
            last_name: t(&self.last_name),
            email: self.email.trim().to_lowercase(),
            phone: t(&self.phone),
            project_type: t(&self.project_type),
            timeline: t(&self.timeline),
            description: self.description.trim().to_string(),
            budget: self
                .budget
                .as_deref()
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(String::from),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// A stored quote.
#[derive(Debug, Clone)]
pub struct Quote {
    pub id: String,
    pub request: QuoteRequest,
    pub status: QuoteStatus,
    pub user_id: Option<String>,
    pub source: String,
    pub admin_notes: Option<String>,
    pub project_id: Option<String>,
    /// Project id reserved by a conversion that has not finished.
    pub pending_project_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Deref for Quote {
    type Target = QuoteRequest;

    fn deref(&self) -> &QuoteRequest {
        &self.request
    }
}

impl Quote {
    pub fn status_label(&self) -> &'static str {
        self.status.label()
    }

    pub fn status_class(&self) -> &'static str {
        self.status.as_str()
    }

    pub fn has_status(&self, status: &str) -> bool {
        self.status.as_str() == status
    }

    /// A project was recorded for this quote. A quote set to `converted` by
    /// hand has none and can still be converted.
    pub fn has_project(&self) -> bool {
        self.project_id.is_some()
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    pub fn created_on(&self) -> String {
        self.created_at.format("%b %d, %Y").to_string()
    }

    pub fn notes_text(&self) -> &str {
        self.admin_notes.as_deref().unwrap_or("")
    }

    pub fn budget_text(&self) -> &str {
        self.budget.as_deref().unwrap_or("")
    }

    pub fn project_link(&self) -> String {
        self.project_id
            .as_deref()
            .map(|id| format!("/projects/{id}"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_path_follows_source() {
        assert_eq!(source::return_path("homepage"), "/#quote");
        assert_eq!(source::return_path(&source::project("ab12")), "/projects/ab12");
        assert_eq!(source::return_path("project-../x"), "/");
        assert_eq!(source::return_path("elsewhere"), "/");
        assert!(source::is_public("contact"));
        assert!(!source::is_public(source::CUSTOMER_DASHBOARD));
    }

    #[test]
    fn validate_flags_missing_required_fields() {
        let req = QuoteRequest {
            first_name: "Ann".into(),
            email: "not-an-email".into(),
            ..Default::default()
        };
        let errors = req.validate();
        assert!(errors.iter().any(|e| e.starts_with("Last name")));
        assert!(errors.iter().any(|e| e.contains("valid email")));
        assert!(errors.iter().any(|e| e.starts_with("Project description")));
        assert!(!errors.iter().any(|e| e.starts_with("Timeline")));
    }
}
