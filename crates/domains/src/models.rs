//! # Domain Models
//!
//! These structs represent the core entities of the blood bank.
//! We use UUID v7 for time-ordered, globally unique identification and
//! camelCase JSON field names so stored collections stay readable by other tooling.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Fixed validity window of a collected unit.
pub const SHELF_LIFE_DAYS: i64 = 42;

/// Minimum interval between two donations by the same donor.
pub const DONATION_COOLDOWN_DAYS: i64 = 90;

/// Units closer than this to expiry are flagged as expiring soon.
pub const EXPIRY_WARNING_DAYS: i64 = 7;

/// Volume of a unit synthesized from a recorded donation.
pub const DONATION_VOLUME_ML: u32 = 450;

pub const DEFAULT_STORAGE_LOCATION: &str = "Fridge A / Shelf 1";

/// `collected_at + SHELF_LIFE_DAYS`
pub fn default_expiry(collected_at: DateTime<Utc>) -> DateTime<Utc> {
    collected_at + Duration::days(SHELF_LIFE_DAYS)
}

// ── Enumerations ─────────────────────────────────────────────────────────────

/// One of the 8 ABO/Rh combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = DomainError;

    /// Accepts `"O+"`, `"ab-"` and the typographic minus (`"A−"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('\u{2212}', "-");
        BloodGroup::ALL
            .into_iter()
            .find(|group| group.as_str() == normalized)
            .ok_or_else(|| DomainError::Validation(format!("unknown blood group '{s}'")))
    }
}

/// Ordered so that `High` sorts above `Medium` above `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl FromStr for Urgency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            other => Err(DomainError::Validation(format!("unknown urgency '{other}'"))),
        }
    }
}

/// Request lifecycle. Declaration order is the only allowed direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Matched,
    Completed,
}

impl RequestStatus {
    /// Staying put counts as advancing; moving backwards never does.
    pub fn can_advance_to(self, next: RequestStatus) -> bool {
        next >= self
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Matched => "matched",
            RequestStatus::Completed => "completed",
        })
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "matched" => Ok(RequestStatus::Matched),
            "completed" => Ok(RequestStatus::Completed),
            other => Err(DomainError::Validation(format!("unknown request status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Contacted,
    Donated,
    Declined,
}

impl MatchStatus {
    /// `contacted` is the entry state; `donated` and `declined` are terminal.
    pub fn can_advance_to(self, next: MatchStatus) -> bool {
        !self.is_terminal() && next.is_terminal()
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, MatchStatus::Contacted)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchStatus::Contacted => "contacted",
            MatchStatus::Donated => "donated",
            MatchStatus::Declined => "declined",
        })
    }
}

impl FromStr for MatchStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contacted" => Ok(MatchStatus::Contacted),
            "donated" => Ok(MatchStatus::Donated),
            "declined" => Ok(MatchStatus::Declined),
            other => Err(DomainError::Validation(format!("unknown match status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    Available,
    Reserved,
    Used,
    Discarded,
}

impl UnitStatus {
    pub const ALL: [UnitStatus; 4] = [
        UnitStatus::Available,
        UnitStatus::Reserved,
        UnitStatus::Used,
        UnitStatus::Discarded,
    ];

    /// Allowed edges:
    /// available -> reserved, reserved -> available, reserved -> used,
    /// and anything not yet discarded -> discarded.
    pub fn can_transition_to(self, next: UnitStatus) -> bool {
        matches!(
            (self, next),
            (UnitStatus::Available, UnitStatus::Reserved)
                | (UnitStatus::Reserved, UnitStatus::Available)
                | (UnitStatus::Reserved, UnitStatus::Used)
                | (UnitStatus::Available, UnitStatus::Discarded)
                | (UnitStatus::Reserved, UnitStatus::Discarded)
                | (UnitStatus::Used, UnitStatus::Discarded)
        )
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnitStatus::Available => "available",
            UnitStatus::Reserved => "reserved",
            UnitStatus::Used => "used",
            UnitStatus::Discarded => "discarded",
        })
    }
}

impl FromStr for UnitStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(UnitStatus::Available),
            "reserved" => Ok(UnitStatus::Reserved),
            "used" => Ok(UnitStatus::Used),
            "discarded" => Ok(UnitStatus::Discarded),
            other => Err(DomainError::Validation(format!("unknown unit status '{other}'"))),
        }
    }
}

// ── Entities ─────────────────────────────────────────────────────────────────

/// A registered donor. Only active donors are ever offered as candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub blood_group: BloodGroup,
    pub city: String,
    pub area: String,
    /// Date-only; the donor is treated as having donated at 00:00 UTC that day.
    #[serde(default)]
    pub last_donation: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A patient's request for blood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequest {
    pub id: Uuid,
    pub patient_name: String,
    #[serde(default)]
    pub hospital: Option<String>,
    pub blood_group: BloodGroup,
    pub units_needed: u32,
    pub city: String,
    pub area: String,
    pub urgency: Urgency,
    pub contact_phone: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// One donated unit held in cold storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodUnit {
    pub id: Uuid,
    /// Human-readable label (e.g. "BLD-IND-0042")
    pub unit_code: String,
    pub blood_group: BloodGroup,
    /// Weak reference to the producing donor; lookup only.
    #[serde(default)]
    pub donor_id: Option<Uuid>,
    pub volume_ml: u32,
    pub collected_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub storage_location: String,
    pub status: UnitStatus,
    /// Weak reference to the request holding the reservation.
    #[serde(default)]
    pub reserved_for_request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Join record between a request and a donor. At most one per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: Uuid,
    pub request_id: Uuid,
    pub donor_id: Uuid,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
}

/// The four collections read together as one consistent view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankState {
    pub donors: Vec<Donor>,
    pub requests: Vec<BloodRequest>,
    pub units: Vec<BloodUnit>,
    pub matches: Vec<Match>,
}

impl BankState {
    pub fn donor(&self, id: Uuid) -> Option<&Donor> {
        self.donors.iter().find(|d| d.id == id)
    }

    pub fn request(&self, id: Uuid) -> Option<&BloodRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn unit(&self, id: Uuid) -> Option<&BloodUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn find_match(&self, request_id: Uuid, donor_id: Uuid) -> Option<&Match> {
        self.matches
            .iter()
            .find(|m| m.request_id == request_id && m.donor_id == donor_id)
    }
}

// ── Creation inputs ──────────────────────────────────────────────────────────

/// Caller-supplied data for `register_donor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonor {
    pub name: String,
    pub phone: String,
    pub blood_group: BloodGroup,
    pub city: String,
    pub area: String,
    #[serde(default)]
    pub last_donation: Option<NaiveDate>,
}

/// Caller-supplied data for `post_request`. New requests always start `pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequest {
    pub patient_name: String,
    #[serde(default)]
    pub hospital: Option<String>,
    pub blood_group: BloodGroup,
    pub units_needed: u32,
    pub city: String,
    pub area: String,
    pub urgency: Urgency,
    pub contact_phone: String,
}

/// Caller-supplied data for `add_inventory_unit`. Every `None` falls back to a default:
/// generated code, 450 mL, collected now, shelf-life expiry, default shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUnit {
    #[serde(default)]
    pub unit_code: Option<String>,
    pub blood_group: BloodGroup,
    #[serde(default)]
    pub donor_id: Option<Uuid>,
    #[serde(default)]
    pub volume_ml: Option<u32>,
    #[serde(default)]
    pub collected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub storage_location: Option<String>,
}

impl NewUnit {
    pub fn of_group(blood_group: BloodGroup) -> Self {
        Self {
            unit_code: None,
            blood_group,
            donor_id: None,
            volume_ml: None,
            collected_at: None,
            expires_at: None,
            storage_location: None,
        }
    }
}
