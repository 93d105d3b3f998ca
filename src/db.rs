use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::auth::identity::{self, SignUp};
use crate::errors::AppError;
use crate::models::account;
use crate::models::project::{self, ProjectFields, ProjectStatus};
use crate::models::user::Role;
use crate::store::strategy::QueryPlanner;
use crate::store::{Document, DocumentStore, MemoryStore, PgStore, Query, StoreError};

/// Shared handle to the document store, cloned into every worker.
#[derive(Clone)]
pub struct Db {
    store: Arc<dyn DocumentStore>,
    planner: Arc<QueryPlanner>,
}

impl Db {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            planner: Arc::new(QueryPlanner::new()),
        }
    }

    /// Fresh in-memory store.
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::new(Arc::new(PgStore::new(pool)))
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Run a listing query, falling back to an in-memory sort when the
    /// store lacks the index for it.
    pub async fn fetch(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.planner.fetch(self.store(), collection, query).await
    }
}

pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(8)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Create the bootstrap admin unless an account with that email exists.
pub async fn seed_admin(db: &Db, email: &str, password: &str) -> Result<(), AppError> {
    if account::find_by_email(db, email).await?.is_some() {
        return Ok(());
    }
    let input = SignUp {
        email: email.to_string(),
        password: password.to_string(),
        first_name: "Site".to_string(),
        last_name: "Administrator".to_string(),
        role: Role::Admin,
        ..Default::default()
    };
    let uid = identity::sign_up(db, &input, None).await?;
    log::info!("Seeded admin account {email} ({uid})");
    Ok(())
}

struct DemoProject {
    title: &'static str,
    category: &'static str,
    location: &'static str,
    image: &'static str,
    description: &'static str,
}

const DEMO_PORTFOLIO: &[DemoProject] = &[
    DemoProject {
        title: "LACAS School Network",
        category: "Commercial",
        location: "Johar Town, Lahore",
        image: "/static/images/proj1.png",
        description: "A state-of-the-art educational facility featuring modern design and sustainable construction.",
    },
    DemoProject {
        title: "Shalimar Paper Mill",
        category: "Industrial",
        location: "Lahore",
        image: "/static/images/proj2.png",
        description: "Large-scale industrial facility designed for maximum efficiency and operational excellence.",
    },
    DemoProject {
        title: "Government House",
        category: "Residential",
        location: "Murree",
        image: "/static/images/proj3.png",
        description: "Prestigious residential complex featuring luxury finishes and premium amenities.",
    },
    DemoProject {
        title: "Nadia Textiles",
        category: "Industrial",
        location: "Lahore",
        image: "/static/images/proj4.png",
        description: "Modern textile manufacturing facility with advanced infrastructure and technology integration.",
    },
    DemoProject {
        title: "Shabbir Town",
        category: "Commercial",
        location: "Lahore",
        image: "/static/images/proj5.png",
        description: "Mixed-use commercial development featuring retail spaces and modern office facilities.",
    },
    DemoProject {
        title: "Government Boys School",
        category: "Commercial",
        location: "Bagh, AJK",
        image: "/static/images/proj6.png",
        description: "Educational facility designed for an optimal learning environment and student safety.",
    },
];

/// Load the demo portfolio when no portfolio project exists yet.
/// Returns how many projects were created.
pub async fn seed_demo_portfolio(db: &Db, created_by: &str) -> Result<usize, AppError> {
    if !project::find_portfolio(db).await?.is_empty() {
        return Ok(0);
    }
    for demo in DEMO_PORTFOLIO {
        let fields = ProjectFields {
            title: demo.title.to_string(),
            description: demo.description.to_string(),
            category: demo.category.to_string(),
            location: demo.location.to_string(),
            image: demo.image.to_string(),
            progress: 100,
            status: ProjectStatus::Completed,
            is_portfolio: true,
            ..Default::default()
        };
        project::create(db, &fields, created_by).await?;
    }
    log::info!("Seeded {} demo portfolio projects", DEMO_PORTFOLIO.len());
    Ok(DEMO_PORTFOLIO.len())
}
