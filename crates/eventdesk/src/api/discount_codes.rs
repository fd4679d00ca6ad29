//! Discount code endpoints.

use reqwest::Method;
use serde_json::{Value, json};

use super::query::Query;
use crate::Result;
use crate::client::ApiClient;
use crate::types::{DiscountCode, DiscountCodePayload, DiscountCodeUpdate};

/// POST /inventory/organizer/discount-codes/
pub const DISCOUNT_CODES: &str = "/inventory/organizer/discount-codes/";

/// POST /inventory/organizer/organizer/code-activation/
pub const CODE_ACTIVATION: &str = "/inventory/organizer/organizer/code-activation/";

/// Discount code operations of a client.
#[derive(Debug, Clone, Copy)]
pub struct DiscountCodesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DiscountCodesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Codes attached to an event. Nothing is fetched while `enabled` is false.
    pub fn for_event(&self, event_id: u64, enabled: bool) -> Query<Vec<DiscountCode>> {
        self.client
            .query(self.path(&format!(
                "/inventory/organizer/discount-codes/event/{}/",
                event_id
            )))
            .key(event_key(event_id))
            .enabled(enabled)
            .select_data(true)
    }

    pub async fn create(&self, code: &DiscountCodePayload) -> Result<Value> {
        self.client
            .mutation(Method::POST, self.path(DISCOUNT_CODES))
            .invalidates(event_key(code.event))
            .send(code)
            .await
    }

    pub async fn update(&self, id: u64, changes: &DiscountCodeUpdate) -> Result<Value> {
        self.client
            .mutation(
                Method::PATCH,
                self.path(&format!("/inventory/organizer/discount-codes/{}/", id)),
            )
            .send(changes)
            .await
    }

    /// Stop a code from being redeemed.
    pub async fn deactivate(&self, id: u64) -> Result<Value> {
        self.client
            .mutation(Method::POST, self.path(CODE_ACTIVATION))
            .send(&json!({ "code": id }))
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<Value> {
        self.client
            .mutation(
                Method::DELETE,
                self.path(&format!("/inventory/organizer/code-activation/{}/", id)),
            )
            .send_empty()
            .await
    }

    fn path(&self, path: &str) -> String {
        self.client.resource_path(path)
    }
}

fn event_key(event_id: u64) -> String {
    format!("eventDiscountCodes_{}", event_id)
}
