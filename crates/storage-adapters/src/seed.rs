//! First-run demonstration data.
//!
//! Five donors in five cities, two pending requests and four units, one of them
//! already expired and one expiring within five days. Only empty collections are
//! filled unless seeding is forced.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use domains::{
    BloodGroup, BloodRequest, BloodUnit, Collection, CollectionStore, Donor, RequestStatus,
    Result, UnitStatus, Urgency, SHELF_LIFE_DAYS,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Which collections a seeding pass wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub donors: bool,
    pub requests: bool,
    pub units: bool,
}

impl SeedReport {
    pub fn wrote_anything(&self) -> bool {
        self.donors || self.requests || self.units
    }
}

pub fn seed_if_empty(store: &dyn CollectionStore, now: DateTime<Utc>) -> Result<SeedReport> {
    seed(store, now, false)
}

/// Overwrites donors, requests and units with the demonstration set and clears matches.
pub fn reseed(store: &dyn CollectionStore, now: DateTime<Utc>) -> Result<SeedReport> {
    store.save(Collection::Matches, &[])?;
    seed(store, now, true)
}

fn seed(store: &dyn CollectionStore, now: DateTime<Utc>, force: bool) -> Result<SeedReport> {
    let report = SeedReport {
        donors: fill(store, Collection::Donors, &demo_donors(now), force)?,
        requests: fill(store, Collection::Requests, &demo_requests(now), force)?,
        units: fill(store, Collection::Units, &demo_units(now), force)?,
    };
    if report.wrote_anything() {
        info!(?report, "demonstration data seeded");
    }
    Ok(report)
}

fn fill<T: Serialize>(
    store: &dyn CollectionStore,
    collection: Collection,
    records: &[T],
    force: bool,
) -> Result<bool> {
    if !force && !store.load(collection)?.is_empty() {
        return Ok(false);
    }
    let values = records
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    store.save(collection, &values)?;
    Ok(true)
}

type DonorRow = (&'static str, &'static str, BloodGroup, &'static str, &'static str);

const DEMO_DONORS: [(DonorRow, Option<(i32, u32, u32)>); 5] = [
    (
        ("Aarav Sharma", "9876543210", BloodGroup::OPositive, "Mumbai", "Andheri"),
        Some((2023, 11, 15)),
    ),
    (
        ("Priya Patel", "8877665544", BloodGroup::ANegative, "Ahmedabad", "Satellite"),
        Some((2024, 1, 20)),
    ),
    (
        ("Vikram Singh", "7766554433", BloodGroup::BPositive, "Delhi", "Rohini"),
        Some((2023, 12, 5)),
    ),
    (
        ("Ananya Iyer", "9988776655", BloodGroup::AbPositive, "Chennai", "Adyar"),
        None,
    ),
    (
        ("Rahul Deshmukh", "9123456789", BloodGroup::ONegative, "Pune", "Kothrud"),
        Some((2023, 8, 10)),
    ),
];

fn demo_donors(now: DateTime<Utc>) -> Vec<Donor> {
    DEMO_DONORS
        .iter()
        .map(|&((name, phone, blood_group, city, area), last)| Donor {
            id: Uuid::now_v7(),
            name: name.to_string(),
            phone: phone.to_string(),
            blood_group,
            city: city.to_string(),
            area: area.to_string(),
            last_donation: last.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            is_active: true,
            created_at: now,
        })
        .collect()
}

fn demo_requests(now: DateTime<Utc>) -> Vec<BloodRequest> {
    vec![
        BloodRequest {
            id: Uuid::now_v7(),
            patient_name: "Rajesh Kumar".into(),
            hospital: Some("Apollo Hospital".into()),
            blood_group: BloodGroup::OPositive,
            units_needed: 2,
            city: "Mumbai".into(),
            area: "Bandra".into(),
            urgency: Urgency::High,
            contact_phone: "9898989898".into(),
            status: RequestStatus::Pending,
            created_at: now,
        },
        BloodRequest {
            id: Uuid::now_v7(),
            patient_name: "Sita Devi".into(),
            hospital: Some("AIIMS".into()),
            blood_group: BloodGroup::ONegative,
            units_needed: 1,
            city: "Delhi".into(),
            area: "Saket".into(),
            urgency: Urgency::Medium,
            contact_phone: "8787878787".into(),
            status: RequestStatus::Pending,
            created_at: now,
        },
    ]
}

fn demo_units(now: DateTime<Utc>) -> Vec<BloodUnit> {
    // Collection dates are back-dated so every unit keeps the 42-day shelf life.
    let unit = |code: &str, group, volume_ml, expires_in_days: i64, location: &str| {
        let expires_at = now + Duration::days(expires_in_days);
        BloodUnit {
            id: Uuid::now_v7(),
            unit_code: code.to_string(),
            blood_group: group,
            donor_id: None,
            volume_ml,
            collected_at: expires_at - Duration::days(SHELF_LIFE_DAYS),
            expires_at,
            storage_location: location.to_string(),
            status: UnitStatus::Available,
            reserved_for_request_id: None,
            created_at: now,
        }
    };
    vec![
        unit("BLD-IND-0001", BloodGroup::OPositive, 450, 42, "Fridge A / Shelf 1"),
        unit("BLD-IND-0002", BloodGroup::OPositive, 450, 42, "Fridge A / Shelf 1"),
        unit("BLD-IND-0003", BloodGroup::ANegative, 350, 5, "Fridge B / Shelf 2"),
        unit("BLD-IND-0004", BloodGroup::BPositive, 450, -2, "Fridge C / Shelf 1"),
    ]
}
