mod support;

use chrono::Duration;
use domains::{
    BloodGroup, DomainError, MatchStatus, NewUnit, RequestPatch, RequestStatus, UnitStatus,
    Urgency, DONATION_VOLUME_ML,
};
use services::CascadeEffect;
use support::{t0, Harness};
use uuid::Uuid;

#[test]
fn donation_completes_request_and_stocks_a_unit() {
    let h = Harness::new();
    let donor = h.donor(BloodGroup::OPositive, "Mumbai", None);
    let request = h.request(BloodGroup::OPositive, "Mumbai", Urgency::High);

    let effects = h
        .bank
        .record_match(request.id, donor.id, MatchStatus::Donated)
        .unwrap();
    assert_eq!(effects.len(), 3);

    let state = h.bank.state().unwrap();
    assert_eq!(state.request(request.id).unwrap().status, RequestStatus::Completed);
    assert_eq!(
        state.donor(donor.id).unwrap().last_donation,
        Some(t0().date_naive())
    );

    assert_eq!(state.units.len(), 1);
    let unit = &state.units[0];
    assert_eq!(unit.blood_group, BloodGroup::OPositive);
    assert_eq!(unit.volume_ml, DONATION_VOLUME_ML);
    assert_eq!(unit.donor_id, Some(donor.id));
    assert_eq!(unit.status, UnitStatus::Available);
    assert_eq!(unit.expires_at, t0() + Duration::days(42));
    assert_eq!(unit.unit_code, "BLD-IND-0001");

    assert_eq!(state.matches.len(), 1);
    assert_eq!(state.matches[0].status, MatchStatus::Donated);
}

#[test]
fn contact_moves_pending_request_to_matched_only() {
    let h = Harness::new();
    let donor = h.donor(BloodGroup::OPositive, "Mumbai", None);
    let request = h.request(BloodGroup::OPositive, "Mumbai", Urgency::High);

    let effects = h
        .bank
        .record_match(request.id, donor.id, MatchStatus::Contacted)
        .unwrap();
    assert_eq!(
        effects,
        vec![CascadeEffect::RequestAdvanced {
            request_id: request.id,
            from: RequestStatus::Pending,
            to: RequestStatus::Matched,
        }]
    );

    let state = h.bank.state().unwrap();
    assert_eq!(state.request(request.id).unwrap().status, RequestStatus::Matched);
    assert_eq!(state.donor(donor.id).unwrap().last_donation, None);
    assert!(state.units.is_empty());
}

#[test]
fn contacted_then_donated_walks_the_request_forward() {
    let h = Harness::new();
    let donor = h.donor(BloodGroup::BPositive, "Delhi", None);
    let request = h.request(BloodGroup::BPositive, "Delhi", Urgency::Medium);

    h.bank
        .record_match(request.id, donor.id, MatchStatus::Contacted)
        .unwrap();
    h.clock.advance(Duration::hours(3));
    h.bank
        .record_match(request.id, donor.id, MatchStatus::Donated)
        .unwrap();

    let state = h.bank.state().unwrap();
    assert_eq!(state.request(request.id).unwrap().status, RequestStatus::Completed);
    assert_eq!(state.matches.len(), 1, "the same pair keeps one match record");
    assert_eq!(state.units.len(), 1);
}

#[test]
fn repeating_donated_a_day_later_changes_nothing() {
    let h = Harness::new();
    let donor = h.donor(BloodGroup::ANegative, "Ahmedabad", None);
    let request = h.request(BloodGroup::ANegative, "Ahmedabad", Urgency::Low);

    h.bank
        .record_match(request.id, donor.id, MatchStatus::Donated)
        .unwrap();
    let before = h.bank.state().unwrap();

    h.clock.advance(Duration::days(1));
    let again = h
        .bank
        .record_match(request.id, donor.id, MatchStatus::Donated)
        .unwrap();
    assert!(again.is_empty());

    let after = h.bank.state().unwrap();
    assert_eq!(after, before);
    assert_eq!(
        after.donor(donor.id).unwrap().last_donation,
        Some(t0().date_naive())
    );
    assert_eq!(after.units.len(), 1);
    assert_eq!(after.request(request.id).unwrap().status, RequestStatus::Completed);
    assert_eq!(after.matches.len(), 1);
    assert_eq!(after.matches[0].status, MatchStatus::Donated);
}

#[test]
fn decline_touches_nothing_but_the_match() {
    let h = Harness::new();
    let donor = h.donor(BloodGroup::OPositive, "Mumbai", None);
    let request = h.request(BloodGroup::OPositive, "Mumbai", Urgency::High);

    let effects = h
        .bank
        .record_match(request.id, donor.id, MatchStatus::Declined)
        .unwrap();
    assert!(effects.is_empty());

    let state = h.bank.state().unwrap();
    assert_eq!(state.request(request.id).unwrap().status, RequestStatus::Pending);
    assert_eq!(state.matches[0].status, MatchStatus::Declined);
}

#[test]
fn declined_match_cannot_become_donated() {
    let h = Harness::new();
    let donor = h.donor(BloodGroup::OPositive, "Mumbai", None);
    let request = h.request(BloodGroup::OPositive, "Mumbai", Urgency::High);
    h.bank
        .record_match(request.id, donor.id, MatchStatus::Declined)
        .unwrap();

    let err = h
        .bank
        .record_match(request.id, donor.id, MatchStatus::Donated)
        .unwrap_err();
    assert!(matches!(err, DomainError::State(_)));
    assert!(h.bank.list_units().unwrap().is_empty());
}

#[test]
fn completed_request_stays_completed_when_another_donor_is_contacted() {
    let h = Harness::new();
    let first = h.donor(BloodGroup::OPositive, "Mumbai", None);
    let second = h.donor(BloodGroup::OPositive, "Mumbai", None);
    let request = h.request(BloodGroup::OPositive, "Mumbai", Urgency::High);

    h.bank
        .record_match(request.id, first.id, MatchStatus::Donated)
        .unwrap();
    h.bank
        .record_match(request.id, second.id, MatchStatus::Contacted)
        .unwrap();

    let state = h.bank.state().unwrap();
    assert_eq!(state.request(request.id).unwrap().status, RequestStatus::Completed);
    assert_eq!(state.matches.len(), 2);
}

#[test]
fn lenient_mode_records_match_and_reports_missing_donor() {
    let h = Harness::new();
    let request = h.request(BloodGroup::OPositive, "Mumbai", Urgency::High);
    let ghost = Uuid::now_v7();

    let effects = h
        .bank
        .record_match(request.id, ghost, MatchStatus::Donated)
        .unwrap();
    assert!(effects.contains(&CascadeEffect::DonorMissing { donor_id: ghost }));

    let state = h.bank.state().unwrap();
    assert!(state.units.is_empty());
    assert_eq!(state.request(request.id).unwrap().status, RequestStatus::Completed);
    assert_eq!(state.matches.len(), 1);
}

#[test]
fn strict_mode_rejects_unknown_references_before_writing() {
    let h = Harness::strict();
    let donor = h.donor(BloodGroup::OPositive, "Mumbai", None);

    let err = h
        .bank
        .record_match(Uuid::now_v7(), donor.id, MatchStatus::Contacted)
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(h.bank.list_matches().unwrap().is_empty());
}

#[test]
fn request_status_cannot_move_backwards() {
    let h = Harness::new();
    let donor = h.donor(BloodGroup::OPositive, "Mumbai", None);
    let request = h.request(BloodGroup::OPositive, "Mumbai", Urgency::High);
    h.bank
        .record_match(request.id, donor.id, MatchStatus::Donated)
        .unwrap();

    let err = h
        .bank
        .update_request(
            request.id,
            RequestPatch {
                status: Some(RequestStatus::Pending),
                ..RequestPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::State(_)));
}

#[test]
fn donation_with_no_unit_code_left_writes_nothing() {
    let h = Harness::new();
    let donor = h.donor(BloodGroup::OPositive, "Mumbai", None);
    let request = h.request(BloodGroup::OPositive, "Mumbai", Urgency::High);
    h.bank
        .add_inventory_unit(NewUnit {
            unit_code: Some(format!("BLD-IND-{}", u32::MAX)),
            ..NewUnit::of_group(BloodGroup::OPositive)
        })
        .unwrap();
    let before = h.bank.state().unwrap();

    let err = h
        .bank
        .record_match(request.id, donor.id, MatchStatus::Donated)
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
    assert_eq!(h.bank.state().unwrap(), before);
    assert!(h.bank.list_matches().unwrap().is_empty());
}
