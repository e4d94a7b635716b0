//! # Match Ledger
//!
//! Upserts the single interaction record kept per (request, donor) pair.

use chrono::{DateTime, Utc};
use domains::{Match, MatchStatus};
use uuid::Uuid;

/// Result of an upsert: the whole new collection plus what the pair looked like before.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerUpdate {
    pub matches: Vec<Match>,
    pub match_id: Uuid,
    /// `None` when the pair had no record yet.
    pub previous: Option<MatchStatus>,
}

impl LedgerUpdate {
    /// The stored status did not change.
    pub fn is_unchanged(&self, status: MatchStatus) -> bool {
        self.previous == Some(status)
    }
}

/// Replaces only `status` on an existing record; otherwise appends a fresh one.
///
/// Identity, both references and `created_at` are never rewritten. References are
/// not checked here: a dangling id just produces a record nobody will look up.
pub fn record_match(
    existing: &[Match],
    request_id: Uuid,
    donor_id: Uuid,
    status: MatchStatus,
    now: DateTime<Utc>,
) -> LedgerUpdate {
    let mut matches = existing.to_vec();

    if let Some(found) = matches
        .iter_mut()
        .find(|m| m.request_id == request_id && m.donor_id == donor_id)
    {
        let previous = found.status;
        let match_id = found.id;
        found.status = status;
        return LedgerUpdate {
            matches,
            match_id,
            previous: Some(previous),
        };
    }

    let created = Match {
        id: Uuid::now_v7(),
        request_id,
        donor_id,
        status,
        created_at: now,
    };
    let match_id = created.id;
    matches.push(created);

    LedgerUpdate {
        matches,
        match_id,
        previous: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn first_interaction_appends() {
        let (req, donor) = (Uuid::now_v7(), Uuid::now_v7());
        let update = record_match(&[], req, donor, MatchStatus::Contacted, now());

        assert_eq!(update.previous, None);
        assert_eq!(update.matches.len(), 1);
        assert_eq!(update.matches[0].id, update.match_id);
        assert_eq!(update.matches[0].created_at, now());
    }

    #[test]
    fn repeat_interaction_updates_in_place() {
        let (req, donor) = (Uuid::now_v7(), Uuid::now_v7());
        let first = record_match(&[], req, donor, MatchStatus::Contacted, now());
        let later = now() + chrono::Duration::hours(3);
        let second = record_match(&first.matches, req, donor, MatchStatus::Donated, later);

        assert_eq!(second.matches.len(), 1);
        assert_eq!(second.previous, Some(MatchStatus::Contacted));
        assert_eq!(second.match_id, first.match_id);
        assert_eq!(second.matches[0].status, MatchStatus::Donated);
        assert_eq!(second.matches[0].created_at, now());
    }

    #[test]
    fn other_pairs_are_left_alone() {
        let req = Uuid::now_v7();
        let a = record_match(&[], req, Uuid::now_v7(), MatchStatus::Declined, now());
        let b = record_match(&a.matches, req, Uuid::now_v7(), MatchStatus::Contacted, now());

        assert_eq!(b.matches.len(), 2);
        assert_eq!(b.matches[0], a.matches[0]);
        assert!(!b.is_unchanged(MatchStatus::Contacted));
    }
}
