mod models;
mod scope;
mod validation;

pub use models::*;
pub use scope::Scopes;
pub use validation::Validate;
