pub mod errors;
pub mod hashing;
pub mod state;
pub mod validators;
