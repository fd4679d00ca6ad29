//! Typed queries and mutations over the authenticated pipeline.
//!
//! [`Query`] and [`Mutation`] are the generic building blocks; the feature
//! modules wrap them for each backend resource. None of them handle
//! credentials: that is the pipeline's job.

mod account;
mod discount_codes;
mod events;
mod locations;
mod mutation;
mod query;

pub use account::AccountApi;
pub use discount_codes::DiscountCodesApi;
pub use events::EventsApi;
pub use locations::LocationsApi;
pub use mutation::Mutation;
pub use query::{Query, QueryCache, QueryKey, RefetchOnMount, select_data};

/// Endpoint paths and cache keys.
pub mod paths {
    pub use super::account::{
        CHANGE_PASSWORD, PROFILE_KEY, REQUEST_RESET_TOKEN, RESEND_VERIFICATION_CODE,
        RESET_PASSWORD, SIGNUP, VERIFY_EMAIL,
    };
    pub use super::discount_codes::{CODE_ACTIVATION, DISCOUNT_CODES};
    pub use super::events::{
        DASHBOARD_STATS, DASHBOARD_STATS_KEY, EVENT_FLIER_FIELD, ORGANIZER_EVENTS,
        ORGANIZER_EVENTS_KEY, PUBLIC_EVENTS, PUBLIC_EVENTS_KEY,
    };
    pub use super::locations::LOCATIONS;
}
