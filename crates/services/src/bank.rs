//! # BloodBank
//!
//! The caller-facing operations. Each one reads the collections it needs, computes
//! the next state in memory and writes whole collections back. Calls are expected
//! to arrive one at a time from a single caller.

use std::sync::Arc;

use domains::{
    BankState, BloodGroup, BloodRequest, BloodUnit, Clock, CollectionStore, DomainError, Donor,
    DonorPatch, Match, MatchStatus, NewDonor, NewRequest, NewUnit, RequestPatch, RequestStatus,
    Result, UnitPatch, UnitStatus,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::eligibility::{self, Candidates};
use crate::fulfillment::{self, CascadeEffect};
use crate::inventory::{self, InventoryAlerts, InventoryStats};
use crate::queries::{self, DashboardSummary};
use crate::store::EntityStore;

/// Engine switches read from settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Reject match and reservation calls that reference unknown donors or requests.
    pub strict_references: bool,
}

pub struct BloodBank {
    store: EntityStore,
    clock: Arc<dyn Clock>,
    options: EngineOptions,
}

impl BloodBank {
    pub fn new(
        backend: Arc<dyn CollectionStore>,
        clock: Arc<dyn Clock>,
        options: EngineOptions,
    ) -> Self {
        Self {
            store: EntityStore::new(backend),
            clock,
            options,
        }
    }

    // ── Donors ───────────────────────────────────────────────────────────────

    #[instrument(skip(self, data), fields(blood_group = %data.blood_group, city = %data.city))]
    pub fn register_donor(&self, data: NewDonor) -> Result<Donor> {
        require_text("donor name", &data.name)?;
        let mut donors = self.store.donors()?;
        let donor = Donor {
            id: Uuid::now_v7(),
            name: data.name,
            phone: data.phone,
            blood_group: data.blood_group,
            city: data.city,
            area: data.area,
            last_donation: data.last_donation,
            is_active: true,
            created_at: self.clock.now(),
        };
        donors.push(donor.clone());
        self.store.save_donors(&donors)?;
        info!(donor_id = %donor.id, "donor registered");
        Ok(donor)
    }

    #[instrument(skip(self, patch))]
    pub fn update_donor(&self, id: Uuid, patch: DonorPatch) -> Result<()> {
        if let Some(name) = &patch.name {
            require_text("donor name", name)?;
        }
        let mut donors = self.store.donors()?;
        let donor = donors
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| DomainError::not_found("Donor", id))?;
        patch.apply(donor);
        self.store.save_donors(&donors)
    }

    pub fn set_donor_active(&self, id: Uuid, active: bool) -> Result<()> {
        self.update_donor(
            id,
            DonorPatch {
                is_active: Some(active),
                ..DonorPatch::default()
            },
        )
    }

    pub fn list_donors(&self) -> Result<Vec<Donor>> {
        self.store.donors()
    }

    pub fn search_donors(&self, query: &str, group: Option<BloodGroup>) -> Result<Vec<Donor>> {
        Ok(queries::search_donors(&self.store.donors()?, query, group))
    }

    // ── Requests ─────────────────────────────────────────────────────────────

    #[instrument(
        skip(self, data),
        fields(blood_group = %data.blood_group, urgency = ?data.urgency)
    )]
    pub fn post_request(&self, data: NewRequest) -> Result<BloodRequest> {
        require_text("patient name", &data.patient_name)?;
        require_units(data.units_needed)?;
        let mut requests = self.store.requests()?;
        let request = BloodRequest {
            id: Uuid::now_v7(),
            patient_name: data.patient_name,
            hospital: data.hospital,
            blood_group: data.blood_group,
            units_needed: data.units_needed,
            city: data.city,
            area: data.area,
            urgency: data.urgency,
            contact_phone: data.contact_phone,
            status: RequestStatus::Pending,
            created_at: self.clock.now(),
        };
        requests.push(request.clone());
        self.store.save_requests(&requests)?;
        info!(request_id = %request.id, "request posted");
        Ok(request)
    }

    /// Status may only move forward; a completed request stays completed.
    #[instrument(skip(self, patch))]
    pub fn update_request(&self, id: Uuid, patch: RequestPatch) -> Result<()> {
        if let Some(name) = &patch.patient_name {
            require_text("patient name", name)?;
        }
        if let Some(units) = patch.units_needed {
            require_units(units)?;
        }
        let mut requests = self.store.requests()?;
        let request = requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DomainError::not_found("BloodRequest", id))?;
        if let Some(next) = patch.status {
            if !request.status.can_advance_to(next) {
                return Err(DomainError::State(format!(
                    "request {id}: {} -> {next} is not allowed",
                    request.status
                )));
            }
        }
        patch.apply(request);
        self.store.save_requests(&requests)
    }

    pub fn list_requests(&self) -> Result<Vec<BloodRequest>> {
        self.store.requests()
    }

    pub fn active_requests(&self, query: &str) -> Result<Vec<BloodRequest>> {
        Ok(queries::active_requests(&self.store.requests()?, query))
    }

    // ── Matching ─────────────────────────────────────────────────────────────

    pub fn find_candidates(&self, request_id: Uuid) -> Result<Candidates> {
        let requests = self.store.requests()?;
        let request = requests
            .iter()
            .find(|r| r.id == request_id)
            .ok_or_else(|| DomainError::not_found("BloodRequest", request_id))?;
        let donors = self.store.donors()?;
        let units = self.store.units()?;
        Ok(eligibility::find_candidates(
            request,
            &donors,
            &units,
            self.clock.now(),
        ))
    }

    /// Records the interaction and runs its cascade. Returns the effects applied;
    /// an empty list means the status was already current.
    #[instrument(skip(self))]
    pub fn record_match(
        &self,
        request_id: Uuid,
        donor_id: Uuid,
        status: MatchStatus,
    ) -> Result<Vec<CascadeEffect>> {
        let state = self.store.snapshot()?;
        let plan = fulfillment::plan_cascade(
            &state,
            request_id,
            donor_id,
            status,
            self.clock.now(),
            self.options.strict_references,
        )?;

        if plan.is_noop() {
            debug!(%status, "match status already current, cascade skipped");
            return Ok(Vec::new());
        }
        for effect in &plan.effects {
            if matches!(
                effect,
                CascadeEffect::DonorMissing { .. } | CascadeEffect::RequestMissing { .. }
            ) {
                warn!(?effect, "cascade effect skipped on dangling reference");
            }
        }

        fulfillment::commit(&self.store, &plan.changes)?;
        info!(
            match_id = %plan.match_id,
            previous = ?plan.previous,
            %status,
            effects = plan.effects.len(),
            "match recorded"
        );
        Ok(plan.effects)
    }

    pub fn list_matches(&self) -> Result<Vec<Match>> {
        self.store.matches()
    }

    // ── Inventory ────────────────────────────────────────────────────────────

    #[instrument(skip(self, data), fields(blood_group = %data.blood_group))]
    pub fn add_inventory_unit(&self, data: NewUnit) -> Result<BloodUnit> {
        let mut units = self.store.units()?;
        let unit = inventory::build_unit(data, &units, self.clock.now())?;
        units.push(unit.clone());
        self.store.save_units(&units)?;
        info!(unit_id = %unit.id, unit_code = %unit.unit_code, "unit logged");
        Ok(unit)
    }

    #[instrument(skip(self, patch))]
    pub fn update_inventory_unit(&self, id: Uuid, mut patch: UnitPatch) -> Result<()> {
        let mut units = self.store.units()?;
        if let Some(code) = patch.unit_code.as_mut() {
            *code = code.trim().to_string();
            inventory::ensure_code_free(&units, code, Some(id))?;
        }
        let unit = units
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DomainError::not_found("BloodUnit", id))?;
        inventory::apply_patch(unit, patch, self.clock.now())?;
        self.store.save_units(&units)
    }

    /// available -> reserved, held for `request_id`.
    #[instrument(skip(self))]
    pub fn reserve_unit(&self, unit_id: Uuid, request_id: Uuid) -> Result<()> {
        let request = self.store.requests()?.into_iter().find(|r| r.id == request_id);
        if request.is_none() && self.options.strict_references {
            return Err(DomainError::not_found("BloodRequest", request_id));
        }

        self.transition_unit(unit_id, UnitStatus::Reserved, Some(request_id), |unit| {
            match &request {
                Some(r) if r.blood_group != unit.blood_group => Err(DomainError::Validation(
                    format!(
                        "unit {} is {} but request {} needs {}",
                        unit.unit_code, unit.blood_group, r.id, r.blood_group
                    ),
                )),
                _ => Ok(()),
            }
        })
    }

    /// reserved -> available, reservation cleared.
    pub fn release_unit(&self, unit_id: Uuid) -> Result<()> {
        self.transition_unit(unit_id, UnitStatus::Available, None, |_| Ok(()))
    }

    /// reserved -> used.
    pub fn consume_unit(&self, unit_id: Uuid) -> Result<()> {
        self.transition_unit(unit_id, UnitStatus::Used, None, |_| Ok(()))
    }

    pub fn discard_unit(&self, unit_id: Uuid) -> Result<()> {
        self.transition_unit(unit_id, UnitStatus::Discarded, None, |_| Ok(()))
    }

    fn transition_unit(
        &self,
        unit_id: Uuid,
        to: UnitStatus,
        request_id: Option<Uuid>,
        check: impl FnOnce(&BloodUnit) -> Result<()>,
    ) -> Result<()> {
        let mut units = self.store.units()?;
        let unit = units
            .iter_mut()
            .find(|u| u.id == unit_id)
            .ok_or_else(|| DomainError::not_found("BloodUnit", unit_id))?;
        check(unit)?;
        let from = unit.status;
        inventory::transition(unit, to, request_id, self.clock.now())?;
        self.store.save_units(&units)?;
        info!(%unit_id, %from, %to, "unit status changed");
        Ok(())
    }

    pub fn list_units(&self) -> Result<Vec<BloodUnit>> {
        self.store.units()
    }

    pub fn search_units(
        &self,
        query: &str,
        group: Option<BloodGroup>,
        status: Option<UnitStatus>,
    ) -> Result<Vec<BloodUnit>> {
        Ok(inventory::search_units(&self.store.units()?, query, group, status))
    }

    pub fn inventory_alerts(&self) -> Result<InventoryAlerts> {
        Ok(inventory::alerts(&self.store.units()?, self.clock.now()))
    }

    pub fn inventory_stats(&self) -> Result<InventoryStats> {
        Ok(inventory::inventory_stats(&self.store.units()?, self.clock.now()))
    }

    // ── Overview ─────────────────────────────────────────────────────────────

    pub fn state(&self) -> Result<BankState> {
        self.store.snapshot()
    }

    pub fn dashboard(&self) -> Result<DashboardSummary> {
        Ok(queries::dashboard(&self.store.snapshot()?))
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_units(units: u32) -> Result<()> {
    if units == 0 {
        return Err(DomainError::Validation("units needed must be positive".into()));
    }
    Ok(())
}
