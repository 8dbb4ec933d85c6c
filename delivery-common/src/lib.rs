//! Common types and errors for the delivery-route toolkit

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Algorithm, Coordinate, NodeId};
