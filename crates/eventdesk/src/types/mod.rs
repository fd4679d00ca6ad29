//! Validated configuration types and backend records.

mod account;
mod base_url;
mod discount;
mod events;
mod location;
mod profile;

pub use account::{PasswordReset, Registration};
pub use base_url::BaseUrl;
pub use discount::{DiscountCode, DiscountCodePayload, DiscountCodeUpdate, DiscountStatus};
pub use events::{
    DashboardStats, Event, EventCounts, EventPage, EventPayload, ExportPayload, ExportPeriod,
    RegistrationCounts, RegistrationStats, RevenueSummary, Vendor,
};
pub use location::{Location, LocationForm, LocationStatus, LocationUpdate};
pub use profile::UserProfile;

use serde::{Deserialize, Deserializer};

/// Decode a decimal the backend may send as a number or as a string.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
