// Core types for the visit document

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::visit::stages::StageId;

/// Decimal places kept for latitude and longitude
pub const COORDINATE_PRECISION: i32 = 6;

/// Kind of party a visit is made to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartyType {
    Customer,
    Lead,
    #[serde(rename = "CRM Deal")]
    CrmDeal,
}

impl fmt::Display for PartyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartyType::Customer => f.write_str("Customer"),
            PartyType::Lead => f.write_str("Lead"),
            PartyType::CrmDeal => f.write_str("CRM Deal"),
        }
    }
}

impl std::str::FromStr for PartyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(PartyType::Customer),
            "lead" => Ok(PartyType::Lead),
            "crm deal" | "crm_deal" | "crm-deal" | "deal" => Ok(PartyType::CrmDeal),
            other => Err(format!("unknown party type '{other}'")),
        }
    }
}

/// Document lifecycle as seen by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocStatus {
    #[default]
    Draft,
    Submitted,
    Cancelled,
}

/// Latitude/longitude pair rounded to six decimal places
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Returns `None` for values that are not finite or fall outside the
    /// valid ranges.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self {
            latitude: round_coordinate(latitude),
            longitude: round_coordinate(longitude),
        })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

fn round_coordinate(value: f64) -> f64 {
    let scale = 10f64.powi(COORDINATE_PRECISION);
    (value * scale).round() / scale
}

/// Timestamp and optional geotag recorded when a stage completes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub at: Option<NaiveDateTime>,
    pub location: Option<Coordinates>,
}

impl StageRecord {
    pub fn is_stamped(&self) -> bool {
        self.at.is_some()
    }
}

/// The visit document advanced through the workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Visit {
    /// Document name, assigned by the store on first save
    pub name: Option<String>,
    pub party_type: Option<PartyType>,
    pub party_reference: Option<String>,
    pub party_name: Option<String>,
    pub employee: Option<String>,
    pub purpose: Option<String>,
    pub outcome: Option<String>,
    pub visit_date: Option<NaiveDate>,
    pub run_sheet: Option<String>,
    pub check_in: StageRecord,
    pub waiting_end: StageRecord,
    pub meeting_start: StageRecord,
    pub meeting_end: StageRecord,
    pub check_out: StageRecord,
    pub status: DocStatus,
}

impl Visit {
    pub fn for_party(party_reference: impl Into<String>) -> Self {
        Self {
            party_reference: Some(party_reference.into()),
            ..Default::default()
        }
    }

    pub fn stage(&self, id: StageId) -> &StageRecord {
        match id {
            StageId::CheckIn => &self.check_in,
            StageId::WaitingEnd => &self.waiting_end,
            StageId::MeetingStart => &self.meeting_start,
            StageId::MeetingEnd => &self.meeting_end,
            StageId::CheckOut => &self.check_out,
        }
    }

    pub fn stage_mut(&mut self, id: StageId) -> &mut StageRecord {
        match id {
            StageId::CheckIn => &mut self.check_in,
            StageId::WaitingEnd => &mut self.waiting_end,
            StageId::MeetingStart => &mut self.meeting_start,
            StageId::MeetingEnd => &mut self.meeting_end,
            StageId::CheckOut => &mut self.check_out,
        }
    }

    /// Party identifier shown to users: the reference, else the name
    pub fn party_display(&self) -> Option<&str> {
        [self.party_reference.as_deref(), self.party_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty())
    }
}
