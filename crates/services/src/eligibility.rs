//! # Eligibility Filter
//!
//! Pure functions deciding which donors and which inventory units can serve a
//! request. Output sets are unordered; presentation order belongs to the caller.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use domains::{BloodRequest, BloodUnit, Donor, UnitStatus, DONATION_COOLDOWN_DAYS};
use serde::Serialize;

/// Everything a request can currently draw on.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidates {
    pub donors: Vec<Donor>,
    /// Same group, `available`, not yet expired.
    pub available_units: Vec<BloodUnit>,
    /// Units already held for this request.
    pub reserved_units: Vec<BloodUnit>,
}

/// A date-only donation counts from 00:00 UTC of that day.
pub fn donation_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// True when the donor never donated or the last donation is strictly more than
/// the cooldown ago.
pub fn cooldown_elapsed(donor: &Donor, now: DateTime<Utc>) -> bool {
    match donor.last_donation {
        None => true,
        Some(date) => now - donation_instant(date) > Duration::days(DONATION_COOLDOWN_DAYS),
    }
}

pub fn same_city(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

pub fn is_donor_eligible(request: &BloodRequest, donor: &Donor, now: DateTime<Utc>) -> bool {
    donor.blood_group == request.blood_group
        && donor.is_active
        && same_city(&donor.city, &request.city)
        && cooldown_elapsed(donor, now)
}

pub fn is_unit_available_for(request: &BloodRequest, unit: &BloodUnit, now: DateTime<Utc>) -> bool {
    unit.blood_group == request.blood_group
        && unit.status == UnitStatus::Available
        && unit.expires_at > now
}

pub fn is_unit_reserved_for(request: &BloodRequest, unit: &BloodUnit) -> bool {
    unit.status == UnitStatus::Reserved && unit.reserved_for_request_id == Some(request.id)
}

pub fn find_candidates(
    request: &BloodRequest,
    donors: &[Donor],
    units: &[BloodUnit],
    now: DateTime<Utc>,
) -> Candidates {
    Candidates {
        donors: donors
            .iter()
            .filter(|d| is_donor_eligible(request, d, now))
            .cloned()
            .collect(),
        available_units: units
            .iter()
            .filter(|u| is_unit_available_for(request, u, now))
            .cloned()
            .collect(),
        reserved_units: units
            .iter()
            .filter(|u| is_unit_reserved_for(request, u))
            .cloned()
            .collect(),
    }
}
