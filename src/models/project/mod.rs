mod form;
mod queries;
mod types;

pub use form::ProjectForm;
pub use queries::*;
pub use types::*;
