//! Command tree for the `bloodbank` binary. Every command prints its result as
//! pretty JSON on stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{builder::BoolishValueParser, Args, Parser, Subcommand};
use domains::{
    BloodGroup, MatchStatus, NewDonor, NewRequest, NewUnit, RequestPatch, RequestStatus,
    UnitStatus, Urgency,
};
use serde::Serialize;
use serde_json::json;
use services::BloodBank;
use uuid::Uuid;

// =============================================================================
// Entry + global options
// =============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "bloodbank",
    version,
    about = "Blood bank donor matching and inventory",
    infer_subcommands = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Settings file (default: $BLOODBANK_CONFIG or ./bloodbank.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dashboard totals, urgent requests and stock by group.
    Summary,

    /// Expired and soon-to-expire units.
    Alerts,

    /// Unit counts by shelf state.
    Stats,

    /// Register a new donor.
    RegisterDonor(DonorArgs),

    /// Activate or deactivate a donor.
    SetDonorActive {
        id: Uuid,
        #[arg(value_parser = BoolishValueParser::new())]
        active: bool,
    },

    /// List donors, optionally filtered.
    #[command(alias = "donors")]
    ListDonors(SearchArgs),

    /// Post a new blood request.
    PostRequest(RequestArgs),

    /// Change urgency, units needed or status of a request.
    UpdateRequest(UpdateRequestArgs),

    /// List requests; hides completed ones unless `--all`.
    #[command(alias = "requests")]
    ListRequests {
        #[arg(default_value = "")]
        query: String,
        #[arg(long)]
        all: bool,
    },

    /// Eligible donors and usable units for a request.
    Candidates { request_id: Uuid },

    /// Record a donor interaction and apply its effects.
    Match {
        request_id: Uuid,
        donor_id: Uuid,
        status: MatchStatus,
    },

    /// List recorded matches.
    ListMatches,

    /// Add a unit to inventory.
    AddUnit(UnitArgs),

    /// List units, optionally filtered.
    #[command(alias = "units")]
    ListUnits {
        #[arg(default_value = "")]
        query: String,
        #[arg(long)]
        group: Option<BloodGroup>,
        #[arg(long)]
        status: Option<UnitStatus>,
    },

    /// Reserve an available unit for a request.
    Reserve { unit_id: Uuid, request_id: Uuid },

    /// Return a reserved unit to stock.
    Release { unit_id: Uuid },

    /// Mark a reserved unit as transfused.
    Consume { unit_id: Uuid },

    /// Remove a unit from circulation.
    Discard { unit_id: Uuid },
}

#[derive(Args, Debug)]
pub struct DonorArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub group: BloodGroup,
    #[arg(long)]
    pub city: String,
    #[arg(long, default_value = "")]
    pub area: String,
    /// YYYY-MM-DD
    #[arg(long, value_name = "DATE")]
    pub last_donation: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    #[arg(default_value = "")]
    pub query: String,
    #[arg(long)]
    pub group: Option<BloodGroup>,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    #[arg(long)]
    pub patient: String,
    #[arg(long)]
    pub hospital: Option<String>,
    #[arg(long)]
    pub group: BloodGroup,
    #[arg(long, default_value_t = 1)]
    pub units: u32,
    #[arg(long)]
    pub city: String,
    #[arg(long, default_value = "")]
    pub area: String,
    #[arg(long, default_value = "medium")]
    pub urgency: Urgency,
    #[arg(long)]
    pub contact: String,
}

#[derive(Args, Debug)]
pub struct UpdateRequestArgs {
    pub id: Uuid,
    #[arg(long)]
    pub urgency: Option<Urgency>,
    #[arg(long)]
    pub units: Option<u32>,
    #[arg(long)]
    pub status: Option<RequestStatus>,
}

#[derive(Args, Debug)]
pub struct UnitArgs {
    #[arg(long)]
    pub group: BloodGroup,
    /// Defaults to the next BLD-IND code.
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub donor: Option<Uuid>,
    #[arg(long, value_name = "ML")]
    pub volume: Option<u32>,
    /// RFC 3339 timestamp.
    #[arg(long, value_name = "TIMESTAMP")]
    pub collected_at: Option<DateTime<Utc>>,
    /// RFC 3339 timestamp.
    #[arg(long, value_name = "TIMESTAMP")]
    pub expires_at: Option<DateTime<Utc>>,
    #[arg(long)]
    pub location: Option<String>,
}

// =============================================================================
// Dispatch
// =============================================================================

pub fn run(bank: &BloodBank, command: Commands) -> Result<()> {
    match command {
        Commands::Summary => emit(&bank.dashboard()?),
        Commands::Alerts => emit(&bank.inventory_alerts()?),
        Commands::Stats => emit(&bank.inventory_stats()?),
        Commands::RegisterDonor(args) => {
            let donor = bank.register_donor(NewDonor {
                name: args.name,
                phone: args.phone,
                blood_group: args.group,
                city: args.city,
                area: args.area,
                last_donation: args.last_donation,
            })?;
            emit(&donor)
        }
        Commands::SetDonorActive { id, active } => {
            bank.set_donor_active(id, active)
                .with_context(|| format!("updating donor {id}"))?;
            emit(&json!({ "id": id, "isActive": active }))
        }
        Commands::ListDonors(args) => emit(&bank.search_donors(&args.query, args.group)?),
        Commands::PostRequest(args) => {
            let request = bank.post_request(NewRequest {
                patient_name: args.patient,
                hospital: args.hospital,
                blood_group: args.group,
                units_needed: args.units,
                city: args.city,
                area: args.area,
                urgency: args.urgency,
                contact_phone: args.contact,
            })?;
            emit(&request)
        }
        Commands::UpdateRequest(args) => {
            let patch = RequestPatch {
                urgency: args.urgency,
                units_needed: args.units,
                status: args.status,
                ..RequestPatch::default()
            };
            bank.update_request(args.id, patch)
                .with_context(|| format!("updating request {}", args.id))?;
            emit(&json!({ "id": args.id, "updated": true }))
        }
        Commands::ListRequests { query, all } => {
            if all {
                emit(&bank.list_requests()?)
            } else {
                emit(&bank.active_requests(&query)?)
            }
        }
        Commands::Candidates { request_id } => emit(&bank.find_candidates(request_id)?),
        Commands::Match {
            request_id,
            donor_id,
            status,
        } => {
            let effects = bank
                .record_match(request_id, donor_id, status)
                .with_context(|| format!("recording {status} for donor {donor_id}"))?;
            emit(&json!({ "status": status, "effects": effects }))
        }
        Commands::ListMatches => emit(&bank.list_matches()?),
        Commands::AddUnit(args) => {
            let unit = bank.add_inventory_unit(NewUnit {
                unit_code: args.code,
                blood_group: args.group,
                donor_id: args.donor,
                volume_ml: args.volume,
                collected_at: args.collected_at,
                expires_at: args.expires_at,
                storage_location: args.location,
            })?;
            emit(&unit)
        }
        Commands::ListUnits {
            query,
            group,
            status,
        } => emit(&bank.search_units(&query, group, status)?),
        Commands::Reserve {
            unit_id,
            request_id,
        } => {
            bank.reserve_unit(unit_id, request_id)?;
            emit(&unit_status(unit_id, UnitStatus::Reserved))
        }
        Commands::Release { unit_id } => {
            bank.release_unit(unit_id)?;
            emit(&unit_status(unit_id, UnitStatus::Available))
        }
        Commands::Consume { unit_id } => {
            bank.consume_unit(unit_id)?;
            emit(&unit_status(unit_id, UnitStatus::Used))
        }
        Commands::Discard { unit_id } => {
            bank.discard_unit(unit_id)?;
            emit(&unit_status(unit_id, UnitStatus::Discarded))
        }
    }
}

fn unit_status(id: Uuid, status: UnitStatus) -> serde_json::Value {
    json!({ "id": id, "status": status })
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("rendering output")?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_match_command() {
        let request = Uuid::now_v7();
        let donor = Uuid::now_v7();
        let cli = Cli::try_parse_from([
            "bloodbank",
            "match",
            &request.to_string(),
            &donor.to_string(),
            "donated",
        ])
        .unwrap();
        match cli.command {
            Commands::Match { status, .. } => assert_eq!(status, MatchStatus::Donated),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_blood_group_and_defaults() {
        let cli = Cli::try_parse_from([
            "bloodbank",
            "post-request",
            "--patient",
            "Asha",
            "--group",
            "ab-",
            "--city",
            "Pune",
            "--contact",
            "9000000000",
        ])
        .unwrap();
        let Commands::PostRequest(args) = cli.command else {
            panic!("expected post-request");
        };
        assert_eq!(args.group, BloodGroup::AbNegative);
        assert_eq!(args.units, 1);
        assert_eq!(args.urgency, Urgency::Medium);
    }

    #[test]
    fn rejects_unknown_status() {
        let id = Uuid::now_v7().to_string();
        assert!(Cli::try_parse_from(["bloodbank", "match", &id, &id, "maybe"]).is_err());
    }
}
