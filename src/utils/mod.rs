pub mod path_validator;
pub mod privilege;

pub use path_validator::PathValidator;
