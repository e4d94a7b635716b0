//! Derived read-side queries. Nothing here is ever stored.

use std::cmp::Reverse;

use domains::{
    BankState, BloodGroup, BloodRequest, Donor, MatchStatus, RequestStatus, UnitStatus,
};
use serde::Serialize;

/// How many pending requests the dashboard surfaces.
pub const URGENT_REQUEST_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount {
    pub blood_group: BloodGroup,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: UnitStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_donors: usize,
    pub total_units: usize,
    /// Matches that ended in a donation.
    pub lives_saved: usize,
    pub pending_requests: usize,
    pub urgent_requests: Vec<BloodRequest>,
    pub stock_by_group: Vec<GroupCount>,
    pub units_by_status: Vec<StatusCount>,
}

pub fn dashboard(state: &BankState) -> DashboardSummary {
    DashboardSummary {
        total_donors: state.donors.len(),
        total_units: state.units.len(),
        lives_saved: state
            .matches
            .iter()
            .filter(|m| m.status == MatchStatus::Donated)
            .count(),
        pending_requests: state
            .requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count(),
        urgent_requests: urgent_requests(&state.requests, URGENT_REQUEST_LIMIT),
        stock_by_group: stock_by_group(state),
        units_by_status: units_by_status(state),
    }
}

/// Pending requests, highest urgency first, newest first within a level.
pub fn urgent_requests(requests: &[BloodRequest], limit: usize) -> Vec<BloodRequest> {
    let mut pending: Vec<_> = requests
        .iter()
        .filter(|r| r.status == RequestStatus::Pending)
        .cloned()
        .collect();
    pending.sort_by_key(|r| (Reverse(r.urgency), Reverse(r.created_at)));
    pending.truncate(limit);
    pending
}

/// `available` units per group, zero-filled in A+ .. O- order.
pub fn stock_by_group(state: &BankState) -> Vec<GroupCount> {
    BloodGroup::ALL
        .into_iter()
        .map(|group| GroupCount {
            blood_group: group,
            count: state
                .units
                .iter()
                .filter(|u| u.status == UnitStatus::Available && u.blood_group == group)
                .count(),
        })
        .collect()
}

/// Units per stored status, omitting statuses with no units.
pub fn units_by_status(state: &BankState) -> Vec<StatusCount> {
    UnitStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: state.units.iter().filter(|u| u.status == status).count(),
        })
        .filter(|c| c.count > 0)
        .collect()
}

/// Case-insensitive match on name, city or area, optionally narrowed by group.
pub fn search_donors(donors: &[Donor], query: &str, group: Option<BloodGroup>) -> Vec<Donor> {
    let needle = query.trim().to_lowercase();
    donors
        .iter()
        .filter(|d| {
            needle.is_empty()
                || d.name.to_lowercase().contains(&needle)
                || d.city.to_lowercase().contains(&needle)
                || d.area.to_lowercase().contains(&needle)
        })
        .filter(|d| group.map_or(true, |g| d.blood_group == g))
        .cloned()
        .collect()
}

/// Requests not yet completed, newest first, optionally filtered by patient,
/// hospital or city.
pub fn active_requests(requests: &[BloodRequest], query: &str) -> Vec<BloodRequest> {
    let needle = query.trim().to_lowercase();
    let mut active: Vec<_> = requests
        .iter()
        .filter(|r| r.status != RequestStatus::Completed)
        .filter(|r| {
            needle.is_empty()
                || r.patient_name.to_lowercase().contains(&needle)
                || r.city.to_lowercase().contains(&needle)
                || r
                    .hospital
                    .as_deref()
                    .is_some_and(|h| h.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect();
    active.sort_by_key(|r| Reverse(r.created_at));
    active
}
