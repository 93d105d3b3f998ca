use askama::Template;

use crate::models::dashboard::CustomerOverview;
use crate::models::project::Project;
use crate::models::quote::Quote;
use super::{PageContext, QuoteFormView, Tab};

#[derive(Template)]
#[template(path = "customer/dashboard.html")]
pub struct CustomerDashboardTemplate {
    pub ctx: PageContext,
    pub tabs: Vec<Tab>,
    pub tab: String,
    pub overview: CustomerOverview,
    pub projects: Vec<Project>,
    pub quotes: Vec<Quote>,
    pub form: QuoteFormView,
    pub errors: Vec<String>,
}

impl CustomerDashboardTemplate {
    pub fn is_tab(&self, key: &str) -> bool {
        self.tab == key
    }
}
