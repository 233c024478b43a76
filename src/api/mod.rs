//! HTTP API layer.
//!
//! Thin handlers over the booking coordinator (write side) and the query
//! service (read side). Transport concerns only; every rule lives below.

pub mod appointments;
pub mod error;
pub mod slots;

pub use error::ApiError;
