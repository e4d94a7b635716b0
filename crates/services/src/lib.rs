//! # services
//!
//! The matching and allocation engine: eligibility, the match ledger, the
//! fulfillment cascade and the inventory lifecycle, plus the [`BloodBank`] facade
//! that callers drive.

pub mod bank;
pub mod eligibility;
pub mod fulfillment;
pub mod inventory;
pub mod match_ledger;
pub mod queries;
pub mod store;

pub use bank::{BloodBank, EngineOptions};
pub use eligibility::{find_candidates, Candidates};
pub use fulfillment::{CascadeEffect, CascadePlan, StateChanges};
pub use inventory::{InventoryAlerts, InventoryStats};
pub use queries::DashboardSummary;
pub use store::EntityStore;
