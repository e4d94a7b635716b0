//! # Inventory Lifecycle
//!
//! Stored status moves along `available -> reserved -> used`, with `discarded` as
//! the exit from anything not yet discarded. Expiry is never stored: `expired` and
//! `expiring soon` are recomputed from `expires_at` on every read.

use chrono::{DateTime, Duration, Utc};
use domains::{
    default_expiry, BloodGroup, BloodUnit, DomainError, Donor, NewUnit, Result, UnitPatch,
    UnitStatus, DEFAULT_STORAGE_LOCATION, DONATION_VOLUME_ML, EXPIRY_WARNING_DAYS,
};
use serde::Serialize;
use uuid::Uuid;

const UNIT_CODE_PREFIX: &str = "BLD-IND-";

/// Past expiry and not yet thrown away.
pub fn is_expired(unit: &BloodUnit, now: DateTime<Utc>) -> bool {
    unit.expires_at < now && unit.status != UnitStatus::Discarded
}

/// Still on the shelf with less than a week to go.
pub fn is_expiring_soon(unit: &BloodUnit, now: DateTime<Utc>) -> bool {
    let remaining = unit.expires_at - now;
    unit.status == UnitStatus::Available
        && remaining > Duration::zero()
        && remaining < Duration::days(EXPIRY_WARNING_DAYS)
}

/// Next `BLD-IND-NNNN` code: one past the highest numeric suffix in use.
///
/// Fails once a caller-supplied code has taken the largest suffix.
pub fn next_unit_code(units: &[BloodUnit]) -> Result<String> {
    let highest = units
        .iter()
        .filter_map(|u| u.unit_code.strip_prefix(UNIT_CODE_PREFIX))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    let next = highest.checked_add(1).ok_or_else(|| {
        DomainError::Validation(format!(
            "no unit code left after {UNIT_CODE_PREFIX}{highest}; supply one explicitly"
        ))
    })?;
    Ok(format!("{UNIT_CODE_PREFIX}{next:04}"))
}

/// Rejects `code` when a unit other than `owner` already carries it.
pub fn ensure_code_free(units: &[BloodUnit], code: &str, owner: Option<Uuid>) -> Result<()> {
    if units
        .iter()
        .any(|u| u.unit_code == code && Some(u.id) != owner)
    {
        return Err(DomainError::Validation(format!(
            "unit code '{code}' already in use"
        )));
    }
    Ok(())
}

/// Builds a new `available` unit from caller data, filling defaults.
pub fn build_unit(input: NewUnit, existing: &[BloodUnit], now: DateTime<Utc>) -> Result<BloodUnit> {
    let unit_code = match input.unit_code {
        Some(code) if code.trim().is_empty() => {
            return Err(DomainError::Validation("unit code must not be empty".into()))
        }
        Some(code) => code.trim().to_string(),
        None => next_unit_code(existing)?,
    };
    ensure_code_free(existing, &unit_code, None)?;

    let volume_ml = input.volume_ml.unwrap_or(DONATION_VOLUME_ML);
    let collected_at = input.collected_at.unwrap_or(now);
    let expires_at = input.expires_at.unwrap_or_else(|| default_expiry(collected_at));

    let unit = BloodUnit {
        id: Uuid::now_v7(),
        unit_code,
        blood_group: input.blood_group,
        donor_id: input.donor_id,
        volume_ml,
        collected_at,
        expires_at,
        storage_location: input
            .storage_location
            .unwrap_or_else(|| DEFAULT_STORAGE_LOCATION.to_string()),
        status: UnitStatus::Available,
        reserved_for_request_id: None,
        created_at: now,
    };
    validate(&unit)?;
    Ok(unit)
}

/// The unit produced by a recorded donation: 450 mL, collected now, default shelf.
pub fn unit_from_donation(
    donor: &Donor,
    existing: &[BloodUnit],
    now: DateTime<Utc>,
) -> Result<BloodUnit> {
    Ok(BloodUnit {
        id: Uuid::now_v7(),
        unit_code: next_unit_code(existing)?,
        blood_group: donor.blood_group,
        donor_id: Some(donor.id),
        volume_ml: DONATION_VOLUME_ML,
        collected_at: now,
        expires_at: default_expiry(now),
        storage_location: DEFAULT_STORAGE_LOCATION.to_string(),
        status: UnitStatus::Available,
        reserved_for_request_id: None,
        created_at: now,
    })
}

fn validate(unit: &BloodUnit) -> Result<()> {
    if unit.volume_ml == 0 {
        return Err(DomainError::Validation("volume must be positive".into()));
    }
    if unit.unit_code.trim().is_empty() {
        return Err(DomainError::Validation("unit code must not be empty".into()));
    }
    if unit.expires_at <= unit.collected_at {
        return Err(DomainError::Validation(format!(
            "unit {} expires before it was collected",
            unit.unit_code
        )));
    }
    Ok(())
}

/// Moves a unit along one lifecycle edge.
///
/// `request_id` is only read when entering `reserved`. Re-applying the current
/// status is a no-op, except that a reserved unit cannot be re-pointed at a
/// different request without being released first. A used unit keeps its
/// request reference, also once discarded.
pub fn transition(
    unit: &mut BloodUnit,
    to: UnitStatus,
    request_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<()> {
    let from = unit.status;

    if from == to {
        if to == UnitStatus::Reserved
            && request_id.is_some()
            && request_id != unit.reserved_for_request_id
        {
            return Err(DomainError::State(format!(
                "unit {} is already reserved; release it before reserving again",
                unit.unit_code
            )));
        }
        return Ok(());
    }

    if !from.can_transition_to(to) {
        return Err(DomainError::State(format!(
            "unit {}: {from} -> {to} is not allowed",
            unit.unit_code
        )));
    }

    match (from, to) {
        (UnitStatus::Available, UnitStatus::Reserved) => {
            if unit.expires_at <= now {
                return Err(DomainError::State(format!(
                    "unit {} expired at {} and cannot be reserved",
                    unit.unit_code, unit.expires_at
                )));
            }
            unit.reserved_for_request_id = request_id;
        }
        (UnitStatus::Reserved, UnitStatus::Available)
        | (UnitStatus::Reserved, UnitStatus::Discarded) => {
            unit.reserved_for_request_id = None;
        }
        _ => {}
    }

    unit.status = to;
    Ok(())
}

/// Applies a caller patch. Descriptive fields are copied; a new `collected_at`
/// without an explicit `expires_at` re-derives the expiry; status changes go
/// through [`transition`].
pub fn apply_patch(unit: &mut BloodUnit, patch: UnitPatch, now: DateTime<Utc>) -> Result<()> {
    let mut next = unit.clone();
    patch.apply_descriptive(&mut next);
    if patch.collected_at.is_some() && patch.expires_at.is_none() {
        next.expires_at = default_expiry(next.collected_at);
    }
    validate(&next)?;

    match (patch.status, patch.reserved_for_request_id) {
        (Some(status), reservation) => {
            transition(&mut next, status, reservation.flatten(), now)?;
        }
        (None, Some(reservation)) if reservation != next.reserved_for_request_id => {
            return Err(DomainError::State(format!(
                "unit {}: reservations change only through reserve or release",
                next.unit_code
            )));
        }
        (None, _) => {}
    }

    *unit = next;
    Ok(())
}

/// The four headline numbers of the inventory page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total: usize,
    /// `available` and not expired
    pub available: usize,
    pub expiring_soon: usize,
    pub expired: usize,
}

pub fn inventory_stats(units: &[BloodUnit], now: DateTime<Utc>) -> InventoryStats {
    InventoryStats {
        total: units.len(),
        available: units
            .iter()
            .filter(|u| u.status == UnitStatus::Available && !is_expired(u, now))
            .count(),
        expiring_soon: units.iter().filter(|u| is_expiring_soon(u, now)).count(),
        expired: units.iter().filter(|u| is_expired(u, now)).count(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAlerts {
    pub expired: Vec<BloodUnit>,
    pub expiring_soon: Vec<BloodUnit>,
}

/// Units needing attention, soonest expiry first.
pub fn alerts(units: &[BloodUnit], now: DateTime<Utc>) -> InventoryAlerts {
    let mut expired: Vec<_> = units.iter().filter(|u| is_expired(u, now)).cloned().collect();
    let mut expiring_soon: Vec<_> = units
        .iter()
        .filter(|u| is_expiring_soon(u, now))
        .cloned()
        .collect();
    expired.sort_by_key(|u| u.expires_at);
    expiring_soon.sort_by_key(|u| u.expires_at);
    InventoryAlerts {
        expired,
        expiring_soon,
    }
}

/// Case-insensitive match on unit code or storage location, optionally narrowed
/// by group and stored status. Ordered by ascending expiry.
pub fn search_units(
    units: &[BloodUnit],
    query: &str,
    group: Option<BloodGroup>,
    status: Option<UnitStatus>,
) -> Vec<BloodUnit> {
    let needle = query.trim().to_lowercase();
    let mut found: Vec<_> = units
        .iter()
        .filter(|u| {
            needle.is_empty()
                || u.unit_code.to_lowercase().contains(&needle)
                || u.storage_location.to_lowercase().contains(&needle)
        })
        .filter(|u| group.map_or(true, |g| u.blood_group == g))
        .filter(|u| status.map_or(true, |s| u.status == s))
        .cloned()
        .collect();
    found.sort_by_key(|u| u.expires_at);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn unit_expiring_in(days: i64) -> BloodUnit {
        let input = NewUnit {
            expires_at: Some(now() + Duration::days(days)),
            collected_at: Some(now() + Duration::days(days) - Duration::days(42)),
            ..NewUnit::of_group(BloodGroup::APositive)
        };
        build_unit(input, &[], now()).unwrap()
    }

    #[test]
    fn defaults_fill_new_unit() {
        let unit = build_unit(NewUnit::of_group(BloodGroup::BPositive), &[], now()).unwrap();
        assert_eq!(unit.unit_code, "BLD-IND-0001");
        assert_eq!(unit.volume_ml, 450);
        assert_eq!(unit.expires_at, now() + Duration::days(42));
        assert_eq!(unit.storage_location, DEFAULT_STORAGE_LOCATION);
        assert_eq!(unit.status, UnitStatus::Available);
    }

    #[test]
    fn codes_continue_after_highest_suffix() {
        let mut a = unit_expiring_in(10);
        a.unit_code = "BLD-IND-0007".into();
        let mut b = unit_expiring_in(10);
        b.unit_code = "LAB-2024-9999".into();
        assert_eq!(next_unit_code(&[a, b]).unwrap(), "BLD-IND-0008");
    }

    #[test]
    fn exhausted_code_space_is_a_validation_error() {
        let mut last = unit_expiring_in(10);
        last.unit_code = format!("BLD-IND-{}", u32::MAX);
        let units = [last];

        assert!(matches!(next_unit_code(&units), Err(DomainError::Validation(_))));
        assert!(build_unit(NewUnit::of_group(BloodGroup::APositive), &units, now()).is_err());

        let explicit = NewUnit {
            unit_code: Some("LAB-0001".into()),
            ..NewUnit::of_group(BloodGroup::APositive)
        };
        assert!(build_unit(explicit, &units, now()).is_ok());
    }

    #[test]
    fn code_owner_may_keep_its_own_code() {
        let unit = unit_expiring_in(10);
        let units = [unit.clone()];
        assert!(ensure_code_free(&units, &unit.unit_code, Some(unit.id)).is_ok());
        assert!(ensure_code_free(&units, &unit.unit_code, Some(Uuid::now_v7())).is_err());
    }

    #[test]
    fn duplicate_or_blank_codes_rejected() {
        let existing = unit_expiring_in(10);
        let dup = NewUnit {
            unit_code: Some(existing.unit_code.clone()),
            ..NewUnit::of_group(BloodGroup::APositive)
        };
        assert!(matches!(build_unit(dup, &[existing], now()), Err(DomainError::Validation(_))));

        let blank = NewUnit {
            unit_code: Some("  ".into()),
            ..NewUnit::of_group(BloodGroup::APositive)
        };
        assert!(build_unit(blank, &[], now()).is_err());
    }

    #[test]
    fn reserved_units_are_not_expiring_soon() {
        let mut unit = unit_expiring_in(3);
        transition(&mut unit, UnitStatus::Reserved, Some(Uuid::now_v7()), now()).unwrap();
        assert!(!is_expiring_soon(&unit, now()));
    }

    #[test]
    fn reserve_then_release_clears_reference() {
        let request = Uuid::now_v7();
        let mut unit = unit_expiring_in(20);

        transition(&mut unit, UnitStatus::Reserved, Some(request), now()).unwrap();
        assert_eq!(unit.reserved_for_request_id, Some(request));

        transition(&mut unit, UnitStatus::Available, None, now()).unwrap();
        assert_eq!(unit.status, UnitStatus::Available);
        assert_eq!(unit.reserved_for_request_id, None);
    }

    #[test]
    fn expired_unit_cannot_be_reserved() {
        let mut unit = unit_expiring_in(10);
        unit.expires_at = now() - Duration::hours(1);
        let err = transition(&mut unit, UnitStatus::Reserved, Some(Uuid::now_v7()), now());
        assert!(matches!(err, Err(DomainError::State(_))));
        assert_eq!(unit.status, UnitStatus::Available);
    }

    #[test]
    fn illegal_edges_rejected() {
        let mut unit = unit_expiring_in(10);
        assert!(transition(&mut unit, UnitStatus::Used, None, now()).is_err());

        transition(&mut unit, UnitStatus::Discarded, None, now()).unwrap();
        assert!(transition(&mut unit, UnitStatus::Available, None, now()).is_err());
    }

    #[test]
    fn discarding_a_used_unit_keeps_its_request() {
        let request = Uuid::now_v7();
        let mut unit = unit_expiring_in(10);
        transition(&mut unit, UnitStatus::Reserved, Some(request), now()).unwrap();
        transition(&mut unit, UnitStatus::Used, None, now()).unwrap();
        transition(&mut unit, UnitStatus::Discarded, None, now()).unwrap();
        assert_eq!(unit.reserved_for_request_id, Some(request));
    }

    #[test]
    fn re_reserving_for_other_request_requires_release() {
        let mut unit = unit_expiring_in(10);
        let first = Uuid::now_v7();
        transition(&mut unit, UnitStatus::Reserved, Some(first), now()).unwrap();
        assert!(transition(&mut unit, UnitStatus::Reserved, Some(first), now()).is_ok());
        assert!(transition(&mut unit, UnitStatus::Reserved, Some(Uuid::now_v7()), now()).is_err());
    }

    #[test]
    fn patch_recomputes_expiry_from_new_collection_date() {
        let mut unit = unit_expiring_in(10);
        let collected = now() - Duration::days(1);
        let patch = UnitPatch {
            collected_at: Some(collected),
            ..UnitPatch::default()
        };
        apply_patch(&mut unit, patch, now()).unwrap();
        assert_eq!(unit.expires_at, collected + Duration::days(42));
    }

    #[test]
    fn patch_rejects_bare_reservation_change() {
        let mut unit = unit_expiring_in(10);
        let before = unit.clone();
        let patch = UnitPatch {
            reserved_for_request_id: Some(Some(Uuid::now_v7())),
            storage_location: Some("Fridge B".into()),
            ..UnitPatch::default()
        };
        assert!(apply_patch(&mut unit, patch, now()).is_err());
        assert_eq!(unit, before);
    }

    #[test]
    fn stats_and_alerts_agree() {
        let fresh = unit_expiring_in(30);
        let soon = unit_expiring_in(2);
        let mut gone = unit_expiring_in(10);
        gone.expires_at = now() - Duration::days(2);
        let units = vec![fresh, soon.clone(), gone.clone()];

        let stats = inventory_stats(&units, now());
        assert_eq!(
            stats,
            InventoryStats {
                total: 3,
                available: 2,
                expiring_soon: 1,
                expired: 1
            }
        );

        let alerts = alerts(&units, now());
        assert_eq!(alerts.expired, vec![gone]);
        assert_eq!(alerts.expiring_soon, vec![soon]);
    }

    #[test]
    fn search_orders_by_expiry() {
        let later = unit_expiring_in(30);
        let mut sooner = unit_expiring_in(3);
        sooner.storage_location = "Fridge C / Shelf 1".into();

        let all = search_units(&[later.clone(), sooner.clone()], "", None, None);
        assert_eq!(all, vec![sooner.clone(), later]);

        let fridge_c = search_units(&all, "fridge c", Some(BloodGroup::APositive), None);
        assert_eq!(fridge_c, vec![sooner]);
    }
}
