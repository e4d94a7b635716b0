//! bloodbank/crates/domains/src/lib.rs
//!
//! Entities, ports and the error taxonomy shared by every other crate.

pub mod error;
pub mod models;
pub mod patches;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use patches::*;
pub use ports::*;
