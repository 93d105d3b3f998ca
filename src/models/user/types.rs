use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Customer,
    /// Any other stored value.
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
            Role::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Customer => "Customer",
            Role::Unknown => "Unknown",
        }
    }

    /// Only the two real roles can be assigned.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }

    /// Where a freshly signed-in user of this role lands.
    pub fn dashboard_path(&self) -> Option<&'static str> {
        match self {
            Role::Admin => Some("/admin-dashboard"),
            Role::Customer => Some("/customer-dashboard"),
            Role::Unknown => None,
        }
    }
}

/// Profile record in the `users` collection, keyed by the principal's uid.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub role: Role,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// First name, falling back to the email address.
    pub fn greeting_name(&self) -> &str {
        if self.first_name.is_empty() {
            &self.email
        } else {
            &self.first_name
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn role_class(&self) -> &'static str {
        self.role.as_str()
    }

    pub fn company_text(&self) -> &str {
        self.company.as_deref().unwrap_or("")
    }

    pub fn created_on(&self) -> String {
        self.created_at.format("%b %d, %Y").to_string()
    }
}

/// Stored shape of a profile, also used to create one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub role: Role,
    pub created_by: Option<String>,
}

/// The admin "Create User" form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserForm {
    pub csrf_token: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub password: String,
    pub role: String,
}

impl UserForm {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];
        errors.extend(validate::validate_required(&self.first_name, "First name", 100));
        errors.extend(validate::validate_required(&self.last_name, "Last name", 100));
        errors.extend(validate::validate_optional(&self.phone, "Phone", 40));
        errors.extend(validate::validate_optional(&self.company, "Company", 200));
        if Role::parse(&self.role).is_none() {
            errors.push("Please choose a role".to_string());
        }
        errors
    }
}
