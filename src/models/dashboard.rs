use crate::db::Db;
use crate::errors::AppError;
use crate::models::project::{self, Project, ProjectStatus};
use crate::models::quote::{self, Quote, QuoteStatus};
use crate::models::user;

// ---------- Types ----------

/// Headline counts for the admin overview tab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminOverview {
    pub total_projects: usize,
    pub active_projects: usize,
    pub total_quotes: usize,
    pub pending_quotes: usize,
    pub total_users: usize,
}

/// Counts for the customer overview tab, over the customer's own records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerOverview {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub total_quotes: usize,
    pub pending_quotes: usize,
}

// ---------- Queries ----------

pub async fn admin_overview(db: &Db) -> Result<AdminOverview, AppError> {
    Ok(AdminOverview {
        total_projects: project::count(db).await?,
        active_projects: project::count_by_status(db, ProjectStatus::InProgress).await?,
        total_quotes: quote::count(db).await?,
        pending_quotes: quote::count_by_status(db, QuoteStatus::Pending).await?,
        total_users: user::count(db).await?,
    })
}

/// Summarise lists the customer dashboard has already loaded.
pub fn customer_overview(projects: &[Project], quotes: &[Quote]) -> CustomerOverview {
    let with_status = |s: ProjectStatus| projects.iter().filter(|p| p.status == s).count();
    CustomerOverview {
        total_projects: projects.len(),
        active_projects: with_status(ProjectStatus::InProgress),
        completed_projects: with_status(ProjectStatus::Completed),
        total_quotes: quotes.len(),
        pending_quotes: quotes
            .iter()
            .filter(|q| q.status == QuoteStatus::Pending)
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::project::ProjectFields;

    fn project(status: ProjectStatus) -> Project {
        Project {
            id: "p".into(),
            fields: ProjectFields {
                status,
                ..Default::default()
            },
            created_by: "admin".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn customer_overview_counts_by_status() {
        let projects = vec![
            project(ProjectStatus::InProgress),
            project(ProjectStatus::Completed),
            project(ProjectStatus::InProgress),
            project(ProjectStatus::Planning),
        ];
        let overview = customer_overview(&projects, &[]);
        assert_eq!(overview.total_projects, 4);
        assert_eq!(overview.active_projects, 2);
        assert_eq!(overview.completed_projects, 1);
        assert_eq!(overview.pending_quotes, 0);
    }
}
