mod conversion;
mod queries;
mod types;

pub use conversion::convert_to_project;
pub use queries::*;
pub use types::*;
