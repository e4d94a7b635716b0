//! Typed view over a [`CollectionStore`].
//!
//! Records cross the port as `serde_json::Value`; this is the single place where
//! they are turned back into entities.

use std::sync::Arc;

use domains::{
    BankState, BloodRequest, BloodUnit, Collection, CollectionStore, DomainError, Donor, Match,
    Result,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Clone)]
pub struct EntityStore {
    backend: Arc<dyn CollectionStore>,
}

impl EntityStore {
    pub fn new(backend: Arc<dyn CollectionStore>) -> Self {
        Self { backend }
    }

    pub fn donors(&self) -> Result<Vec<Donor>> {
        self.load_typed(Collection::Donors)
    }

    pub fn requests(&self) -> Result<Vec<BloodRequest>> {
        self.load_typed(Collection::Requests)
    }

    pub fn units(&self) -> Result<Vec<BloodUnit>> {
        self.load_typed(Collection::Units)
    }

    pub fn matches(&self) -> Result<Vec<Match>> {
        self.load_typed(Collection::Matches)
    }

    /// Reads all four collections.
    pub fn snapshot(&self) -> Result<BankState> {
        Ok(BankState {
            donors: self.donors()?,
            requests: self.requests()?,
            units: self.units()?,
            matches: self.matches()?,
        })
    }

    pub fn save_donors(&self, donors: &[Donor]) -> Result<()> {
        self.save_typed(Collection::Donors, donors)
    }

    pub fn save_requests(&self, requests: &[BloodRequest]) -> Result<()> {
        self.save_typed(Collection::Requests, requests)
    }

    pub fn save_units(&self, units: &[BloodUnit]) -> Result<()> {
        self.save_typed(Collection::Units, units)
    }

    pub fn save_matches(&self, matches: &[Match]) -> Result<()> {
        self.save_typed(Collection::Matches, matches)
    }

    fn load_typed<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        self.backend
            .load(collection)?
            .into_iter()
            .map(|record| {
                serde_json::from_value(record).map_err(|e| {
                    DomainError::Persistence(format!("corrupt record in '{collection}': {e}"))
                })
            })
            .collect()
    }

    fn save_typed<T: Serialize>(&self, collection: Collection, records: &[T]) -> Result<()> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.backend.save(collection, &values)
    }
}
