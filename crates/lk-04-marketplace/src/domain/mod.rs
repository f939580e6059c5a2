pub mod errors;
pub mod selection;
