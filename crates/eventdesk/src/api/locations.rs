//! Store location endpoints.

use reqwest::Method;
use serde_json::Value;

use super::query::Query;
use crate::Result;
use crate::client::ApiClient;
use crate::types::{Location, LocationForm, LocationUpdate};

/// GET/POST /stores/locations/
pub const LOCATIONS: &str = "/stores/locations/";

/// Location operations of a client.
#[derive(Debug, Clone, Copy)]
pub struct LocationsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> LocationsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// All locations, cached under the endpoint path.
    pub fn list(&self) -> Query<Vec<Location>> {
        self.client.query(self.base()).select_data(true)
    }

    pub async fn create(&self, location: &LocationForm) -> Result<Value> {
        self.client
            .mutation(Method::POST, self.base())
            .invalidates(self.base())
            .send(location)
            .await
    }

    pub async fn update(&self, id: &str, changes: &LocationUpdate) -> Result<Value> {
        self.client
            .mutation(Method::PATCH, self.item(id))
            .invalidates(self.base())
            .send(changes)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Value> {
        self.client
            .mutation(Method::DELETE, self.item(id))
            .invalidates(self.base())
            .send_empty()
            .await
    }

    fn base(&self) -> String {
        self.client.resource_path(LOCATIONS)
    }

    fn item(&self, id: &str) -> String {
        self.client
            .resource_path(&format!("{}{}/", LOCATIONS, id))
    }
}
