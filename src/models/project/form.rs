use serde::Deserialize;

use crate::auth::validate;
use crate::models::user::UserProfile;
use super::types::{ProjectFields, ProjectStatus};

/// The admin project form as posted. List fields hold one entry per line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectForm {
    pub csrf_token: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub area: String,
    pub capacity: String,
    pub image: String,
    pub images: String,
    pub key_features: String,
    pub technical_specs: String,
    pub completion_date: String,
    pub estimated_completion: String,
    pub progress: String,
    pub status: String,
    /// Checkbox: present when ticked.
    pub is_portfolio: Option<String>,
    pub customer_id: String,
    pub customer_name: String,
    pub current_phase: String,
    pub next_phase: String,
}

fn lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

fn optional(text: &str) -> Option<String> {
    let t = text.trim();
    (!t.is_empty()).then(|| t.to_string())
}

impl ProjectForm {
    /// Pre-fill from stored or drafted fields.
    pub fn from_fields(fields: &ProjectFields) -> Self {
        let text = |o: &Option<String>| o.clone().unwrap_or_default();
        ProjectForm {
            csrf_token: String::new(),
            title: fields.title.clone(),
            description: fields.description.clone(),
            category: fields.category.clone(),
            location: fields.location.clone(),
            area: fields.area.clone(),
            capacity: text(&fields.capacity),
            image: fields.image.clone(),
            images: fields.images.join("\n"),
            key_features: fields.key_features.join("\n"),
            technical_specs: fields.technical_specs.join("\n"),
            completion_date: text(&fields.completion_date),
            estimated_completion: text(&fields.estimated_completion),
            progress: fields.progress.to_string(),
            status: fields.status.as_str().to_string(),
            is_portfolio: fields.is_portfolio.then(|| "on".to_string()),
            customer_id: text(&fields.customer_id),
            customer_name: text(&fields.customer_name),
            current_phase: text(&fields.current_phase),
            next_phase: text(&fields.next_phase),
        }
    }

    pub fn portfolio_checked(&self) -> bool {
        self.is_portfolio.is_some()
    }

    /// Check the form and build the record. `customers` resolves the
    /// selected customer's display name.
    pub fn to_fields(&self, customers: &[UserProfile]) -> Result<ProjectFields, Vec<String>> {
        let mut errors = vec![];
        errors.extend(validate::validate_required(&self.title, "Title", 200));
        errors.extend(validate::validate_required(&self.description, "Description", 5000));
        errors.extend(validate::validate_required(&self.category, "Category", 100));
        errors.extend(validate::validate_optional(&self.location, "Location", 200));

        let progress = if self.progress.trim().is_empty() {
            0
        } else {
            match validate::validate_progress(&self.progress) {
                Ok(p) => p,
                Err(e) => {
                    errors.push(e);
                    0
                }
            }
        };
        let status = match ProjectStatus::parse(self.status.trim()) {
            Some(s) => s,
            None => {
                errors.push("Please choose a valid status".to_string());
                ProjectStatus::default()
            }
        };

        let is_portfolio = self.portfolio_checked();
        let customer = optional(&self.customer_id)
            .filter(|_| !is_portfolio)
            .map(|id| (customers.iter().find(|c| c.uid == id), id));
        let (customer_id, customer_name) = match customer {
            Some((Some(profile), id)) => (Some(id), Some(profile.full_name())),
            Some((None, _)) => {
                errors.push("Selected customer does not exist".to_string());
                (None, None)
            }
            None => (None, optional(&self.customer_name).filter(|_| !is_portfolio)),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ProjectFields {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            location: self.location.trim().to_string(),
            area: self.area.trim().to_string(),
            capacity: optional(&self.capacity),
            image: self.image.trim().to_string(),
            images: lines(&self.images),
            key_features: lines(&self.key_features),
            technical_specs: lines(&self.technical_specs),
            completion_date: optional(&self.completion_date),
            estimated_completion: optional(&self.estimated_completion),
            progress,
            status,
            is_portfolio,
            customer_id,
            customer_name,
            current_phase: optional(&self.current_phase),
            next_phase: optional(&self.next_phase),
        })
    }
}
