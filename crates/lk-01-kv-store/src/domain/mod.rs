pub mod errors;
pub mod staged;
pub mod write_set;
