//! Pure codec and signature logic, no I/O.

pub mod ecdsa;
pub mod envelope;
pub mod errors;
pub mod message;
pub mod transaction;
