pub mod backlog;
pub mod entities;
pub mod errors;
pub mod keys;
