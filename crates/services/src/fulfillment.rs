//! # Fulfillment Orchestrator
//!
//! Turns one match status change into the full set of next-state collections
//! ([`plan_cascade`]) and then writes them ([`commit`]).
//!
//! Planning is pure and happens entirely in memory. Commit writes in a fixed order
//! (donors, units, requests, then matches last) so that a failed write never leaves a
//! `donated` match recorded without its donor update. The store has no
//! multi-collection transaction: a failure after the first write still leaves the
//! earlier collections updated.

use chrono::{DateTime, NaiveDate, Utc};
use domains::{
    BankState, BloodRequest, BloodUnit, DomainError, Donor, Match, MatchStatus, RequestStatus,
    Result,
};
use serde::Serialize;
use uuid::Uuid;

use crate::inventory;
use crate::match_ledger;
use crate::store::EntityStore;

/// One observable consequence of a cascade.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CascadeEffect {
    #[serde(rename_all = "camelCase")]
    RequestAdvanced {
        request_id: Uuid,
        from: RequestStatus,
        to: RequestStatus,
    },
    #[serde(rename_all = "camelCase")]
    DonationRecorded { donor_id: Uuid, on: NaiveDate },
    #[serde(rename_all = "camelCase")]
    UnitSynthesized { unit_id: Uuid, unit_code: String },
    /// The match points at a donor that does not exist; donor and inventory effects skipped.
    #[serde(rename_all = "camelCase")]
    DonorMissing { donor_id: Uuid },
    /// The match points at a request that does not exist; request effect skipped.
    #[serde(rename_all = "camelCase")]
    RequestMissing { request_id: Uuid },
}

/// Next state of every collection the cascade touches. `None` means unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateChanges {
    pub donors: Option<Vec<Donor>>,
    pub requests: Option<Vec<BloodRequest>>,
    pub units: Option<Vec<BloodUnit>>,
    pub matches: Option<Vec<Match>>,
}

impl StateChanges {
    pub fn is_empty(&self) -> bool {
        self.donors.is_none()
            && self.requests.is_none()
            && self.units.is_none()
            && self.matches.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CascadePlan {
    pub request_id: Uuid,
    pub donor_id: Uuid,
    /// The ledger record this plan writes, existing or new.
    pub match_id: Uuid,
    pub status: MatchStatus,
    pub previous: Option<MatchStatus>,
    pub effects: Vec<CascadeEffect>,
    pub changes: StateChanges,
}

impl CascadePlan {
    /// The requested status was already current; nothing will be written.
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Computes the cascade for setting the (request, donor) match to `status`.
///
/// * `contacted`: a `pending` request becomes `matched`.
/// * `donated`: the donor's last donation becomes today, a 450 mL unit is added
///   to inventory, and the request becomes `completed` whatever it was before.
/// * `declined`: only the match changes.
///
/// The prior status is checked before anything else, so repeating the current
/// status yields an empty plan instead of a second unit. With `strict`, unknown
/// donor or request ids fail with `NotFound`; otherwise the affected effects are
/// skipped and reported.
pub fn plan_cascade(
    state: &BankState,
    request_id: Uuid,
    donor_id: Uuid,
    status: MatchStatus,
    now: DateTime<Utc>,
    strict: bool,
) -> Result<CascadePlan> {
    let request_known = state.request(request_id).is_some();
    let donor_known = state.donor(donor_id).is_some();
    if strict && !request_known {
        return Err(DomainError::not_found("BloodRequest", request_id));
    }
    if strict && !donor_known {
        return Err(DomainError::not_found("Donor", donor_id));
    }

    let ledger = match_ledger::record_match(&state.matches, request_id, donor_id, status, now);
    let mut plan = CascadePlan {
        request_id,
        donor_id,
        match_id: ledger.match_id,
        status,
        previous: ledger.previous,
        effects: Vec::new(),
        changes: StateChanges::default(),
    };

    if ledger.is_unchanged(status) {
        return Ok(plan);
    }
    if let Some(current) = ledger.previous {
        if !current.can_advance_to(status) {
            return Err(DomainError::State(format!(
                "match for request {request_id} and donor {donor_id}: \
                 {current} -> {status} is not allowed"
            )));
        }
    }

    match status {
        MatchStatus::Contacted => {
            plan_request_advance(state, &mut plan, RequestStatus::Matched, |s| {
                s == RequestStatus::Pending
            });
        }
        MatchStatus::Donated => {
            plan_donation(state, &mut plan, now)?;
            plan_request_advance(state, &mut plan, RequestStatus::Completed, |s| {
                s != RequestStatus::Completed
            });
        }
        MatchStatus::Declined => {}
    }

    plan.changes.matches = Some(ledger.matches);
    Ok(plan)
}

fn plan_donation(state: &BankState, plan: &mut CascadePlan, now: DateTime<Utc>) -> Result<()> {
    let Some(donor) = state.donor(plan.donor_id) else {
        plan.effects.push(CascadeEffect::DonorMissing {
            donor_id: plan.donor_id,
        });
        return Ok(());
    };
    let unit = inventory::unit_from_donation(donor, &state.units, now)?;

    let today = now.date_naive();
    let donors = state
        .donors
        .iter()
        .map(|d| {
            let mut d = d.clone();
            if d.id == donor.id {
                d.last_donation = Some(today);
            }
            d
        })
        .collect();
    plan.effects.push(CascadeEffect::DonationRecorded {
        donor_id: donor.id,
        on: today,
    });
    plan.changes.donors = Some(donors);

    plan.effects.push(CascadeEffect::UnitSynthesized {
        unit_id: unit.id,
        unit_code: unit.unit_code.clone(),
    });
    let mut units = state.units.clone();
    units.push(unit);
    plan.changes.units = Some(units);
    Ok(())
}

fn plan_request_advance(
    state: &BankState,
    plan: &mut CascadePlan,
    to: RequestStatus,
    applies: impl Fn(RequestStatus) -> bool,
) {
    let Some(request) = state.request(plan.request_id) else {
        plan.effects.push(CascadeEffect::RequestMissing {
            request_id: plan.request_id,
        });
        return;
    };
    if !applies(request.status) {
        return;
    }

    let from = request.status;
    let requests = state
        .requests
        .iter()
        .map(|r| {
            let mut r = r.clone();
            if r.id == plan.request_id {
                r.status = to;
            }
            r
        })
        .collect();
    plan.effects.push(CascadeEffect::RequestAdvanced {
        request_id: plan.request_id,
        from,
        to,
    });
    plan.changes.requests = Some(requests);
}

/// Writes a plan: donors, units, requests, then matches.
///
/// Stops at the first failure. Because matches are written last, a failed cascade
/// never advances the match status.
pub fn commit(store: &EntityStore, changes: &StateChanges) -> Result<()> {
    if let Some(donors) = &changes.donors {
        store.save_donors(donors)?;
    }
    if let Some(units) = &changes.units {
        store.save_units(units)?;
    }
    if let Some(requests) = &changes.requests {
        store.save_requests(requests)?;
    }
    if let Some(matches) = &changes.matches {
        store.save_matches(matches)?;
    }
    Ok(())
}
