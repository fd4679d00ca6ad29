//! Event, vendor and dashboard statistics records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lenient_f64;

/// An organizer event as returned by the inventory endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,

    #[serde(default)]
    pub event_name: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub event_slug: Option<String>,

    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub end_date: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub participant_fee: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub event_fee: Option<f64>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub capacity: Option<serde_json::Value>,

    #[serde(default)]
    pub is_free: Option<bool>,

    #[serde(default, rename = "eventInstructions")]
    pub event_instructions: Option<String>,

    #[serde(default, rename = "termsAndConditions")]
    pub terms_and_conditions: Option<String>,

    #[serde(default)]
    pub registered_merchants: Vec<Vendor>,

    #[serde(default)]
    pub registration_stats: Option<RegistrationStats>,

    #[serde(default)]
    pub registration_count: Option<u64>,
}

impl Event {
    /// Event title; older endpoints send `name` instead of `event_name`.
    pub fn title(&self) -> &str {
        self.event_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.name.as_deref())
            .unwrap_or("")
    }

    /// Participation fee, whichever field the endpoint used.
    pub fn fee(&self) -> Option<f64> {
        self.event_fee
            .filter(|f| *f != 0.0)
            .or(self.participant_fee)
    }

    /// Fee times registrations, when both are known and the fee is non-zero.
    pub fn revenue(&self) -> Option<f64> {
        let fee = self.fee().filter(|f| *f != 0.0)?;
        let count = self.registration_count.filter(|c| *c > 0)?;
        Some(fee * count as f64)
    }
}

/// Registration totals attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationStats {
    pub total_registered: u64,
}

/// A page of organizer events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPage {
    pub results: Vec<Event>,
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

/// A merchant registered for an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount_paid: Option<f64>,
}

/// Organizer dashboard statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub events: EventCounts,
    pub registrations: RegistrationCounts,
    pub revenue: RevenueSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCounts {
    pub total: u64,
    pub active: u64,
    pub upcoming: u64,
    pub past: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationCounts {
    pub total: u64,
    pub successful: u64,
    pub pending: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub total: String,
    pub total_orders: u64,
    pub total_customers: u64,
}

/// Body for creating or fully replacing an event.
#[derive(Debug, Clone, Serialize)]
pub struct EventPayload {
    pub organizer: serde_json::Value,
    pub event_name: String,
    pub location: String,
    pub description: String,
    pub capacity: String,
    pub start_date: String,
    pub end_date: String,
    pub participant_fee: f64,
    #[serde(rename = "eventInstructions", skip_serializing_if = "Option::is_none")]
    pub event_instructions: Option<String>,
}

/// Time window for a vendor export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPeriod {
    All,
    ThisMonth,
    LastMonth,
    #[serde(rename = "last_30_days")]
    Last30Days,
    #[serde(rename = "last_90_days")]
    Last90Days,
    Custom,
}

/// Body for exporting registered vendors.
#[derive(Debug, Clone, Serialize)]
pub struct ExportPayload {
    pub export_fields: Vec<String>,
    pub period: ExportPeriod,
    pub activity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}
