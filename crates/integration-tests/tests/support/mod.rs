#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use domains::{
    BloodGroup, BloodRequest, CollectionStore, Donor, ManualClock, NewDonor, NewRequest, Urgency,
};
use services::{BloodBank, EngineOptions};
use storage_adapters::MemoryStore;

/// Fixed "now" shared by every test: 2024-06-01 10:00 UTC.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> NaiveDate {
    (t0() - Duration::days(days)).date_naive()
}

pub struct Harness {
    pub bank: BloodBank,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn strict() -> Self {
        Self::with_options(EngineOptions {
            strict_references: true,
        })
    }

    pub fn with_options(options: EngineOptions) -> Self {
        let store = Arc::new(MemoryStore::new("it"));
        let clock = Arc::new(ManualClock::new(t0()));
        let backend: Arc<dyn CollectionStore> = store.clone();
        let bank = BloodBank::new(backend, clock.clone(), options);
        Self { bank, store, clock }
    }

    pub fn donor(&self, group: BloodGroup, city: &str, last_donation: Option<NaiveDate>) -> Donor {
        self.bank
            .register_donor(NewDonor {
                name: format!("{group} donor in {city}"),
                phone: "9000000001".into(),
                blood_group: group,
                city: city.into(),
                area: "Central".into(),
                last_donation,
            })
            .unwrap()
    }

    pub fn request(&self, group: BloodGroup, city: &str, urgency: Urgency) -> BloodRequest {
        self.bank
            .post_request(NewRequest {
                patient_name: format!("{group} patient"),
                hospital: Some("City Hospital".into()),
                blood_group: group,
                units_needed: 1,
                city: city.into(),
                area: "Central".into(),
                urgency,
                contact_phone: "9000000002".into(),
            })
            .unwrap()
    }
}
