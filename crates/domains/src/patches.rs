//! # Partial Updates
//!
//! `updateDonor` / `updateRequest` / `updateInventoryUnit` take a patch where every
//! `None` means "leave unchanged". Nullable fields use `Option<Option<T>>` so a
//! caller can clear them (`Some(None)`).
//!
//! Patches only know how to copy fields. Status edges are guarded by the services
//! layer before `apply` is called.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{
    BloodGroup, BloodRequest, BloodUnit, Donor, RequestStatus, UnitStatus, Urgency,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonorPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub last_donation: Option<Option<NaiveDate>>,
    pub is_active: Option<bool>,
}

impl DonorPatch {
    pub fn apply(self, donor: &mut Donor) {
        if let Some(name) = self.name {
            donor.name = name;
        }
        if let Some(phone) = self.phone {
            donor.phone = phone;
        }
        if let Some(group) = self.blood_group {
            donor.blood_group = group;
        }
        if let Some(city) = self.city {
            donor.city = city;
        }
        if let Some(area) = self.area {
            donor.area = area;
        }
        if let Some(last) = self.last_donation {
            donor.last_donation = last;
        }
        if let Some(active) = self.is_active {
            donor.is_active = active;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestPatch {
    pub patient_name: Option<String>,
    pub hospital: Option<Option<String>>,
    pub blood_group: Option<BloodGroup>,
    pub units_needed: Option<u32>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub urgency: Option<Urgency>,
    pub contact_phone: Option<String>,
    pub status: Option<RequestStatus>,
}

impl RequestPatch {
    pub fn apply(self, request: &mut BloodRequest) {
        if let Some(name) = self.patient_name {
            request.patient_name = name;
        }
        if let Some(hospital) = self.hospital {
            request.hospital = hospital;
        }
        if let Some(group) = self.blood_group {
            request.blood_group = group;
        }
        if let Some(units) = self.units_needed {
            request.units_needed = units;
        }
        if let Some(city) = self.city {
            request.city = city;
        }
        if let Some(area) = self.area {
            request.area = area;
        }
        if let Some(urgency) = self.urgency {
            request.urgency = urgency;
        }
        if let Some(phone) = self.contact_phone {
            request.contact_phone = phone;
        }
        if let Some(status) = self.status {
            request.status = status;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitPatch {
    pub unit_code: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub donor_id: Option<Option<Uuid>>,
    pub volume_ml: Option<u32>,
    pub collected_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub storage_location: Option<String>,
    pub status: Option<UnitStatus>,
    pub reserved_for_request_id: Option<Option<Uuid>>,
}

impl UnitPatch {
    /// Copies every field except `status` and `reserved_for_request_id`,
    /// which move together through the inventory lifecycle.
    pub fn apply_descriptive(&self, unit: &mut BloodUnit) {
        if let Some(code) = &self.unit_code {
            unit.unit_code = code.clone();
        }
        if let Some(group) = self.blood_group {
            unit.blood_group = group;
        }
        if let Some(donor) = self.donor_id {
            unit.donor_id = donor;
        }
        if let Some(volume) = self.volume_ml {
            unit.volume_ml = volume;
        }
        if let Some(collected) = self.collected_at {
            unit.collected_at = collected;
        }
        if let Some(expires) = self.expires_at {
            unit.expires_at = expires;
        }
        if let Some(location) = &self.storage_location {
            unit.storage_location = location.clone();
        }
    }
}
