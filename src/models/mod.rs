pub mod account;
pub mod dashboard;
pub mod project;
pub mod quote;
pub mod user;
