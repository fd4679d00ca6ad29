//! Organizer and public event endpoints.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::query::{Query, RefetchOnMount};
use crate::Result;
use crate::client::ApiClient;
use crate::http::{FilePart, MultipartForm, Params};
use crate::types::{DashboardStats, Event, EventPage, EventPayload, ExportPayload};

/// GET/POST /inventory/organizer/events/
pub const ORGANIZER_EVENTS: &str = "/inventory/organizer/events/";

/// GET /inventory/organizer/public-events/
pub const PUBLIC_EVENTS: &str = "/inventory/organizer/public-events/";

/// GET /inventory/organizer/events/statistics/
pub const DASHBOARD_STATS: &str = "/inventory/organizer/events/statistics/";

/// Form field the event flier image is uploaded under.
pub const EVENT_FLIER_FIELD: &str = "event_flier";

pub const ORGANIZER_EVENTS_KEY: &str = "organizerEvents";
pub const PUBLIC_EVENTS_KEY: &str = "organizerEventsPublic";
pub const DASHBOARD_STATS_KEY: &str = "eventStats";

/// Event operations of a client.
#[derive(Debug, Clone, Copy)]
pub struct EventsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> EventsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// The organizer's events, one page per parameter set.
    pub fn organizer_events(&self, params: Params) -> Query<EventPage> {
        self.client
            .query(self.path(ORGANIZER_EVENTS))
            .key(ORGANIZER_EVENTS_KEY)
            .params(params)
            .select_data(true)
    }

    /// Events visible to the public.
    pub fn public_events(&self, params: Params) -> Query<Vec<Event>> {
        self.client
            .query(self.path(PUBLIC_EVENTS))
            .key(PUBLIC_EVENTS_KEY)
            .params(params)
    }

    /// Totals across all of the organizer's events.
    pub fn dashboard_stats(&self) -> Query<DashboardStats> {
        self.client
            .query(self.path(DASHBOARD_STATS))
            .key(DASHBOARD_STATS_KEY)
    }

    /// One event with its registered vendors.
    pub fn details(&self, id: u64) -> Query<Event> {
        self.client
            .query(self.path(&format!("/inventory/organizer/events/{}/details/", id)))
            .key(format!("eventDetails_{}", id))
            .refetch_on_mount(RefetchOnMount::Always)
    }

    /// One event as the public sees it.
    pub fn public_event(&self, id: u64) -> Query<Event> {
        self.client
            .query(self.path(&format!("/inventory/public/events/{}/", id)))
            .key(format!("publicEventById_{}", id))
            .select_data(true)
            .refetch_on_mount(RefetchOnMount::Always)
    }

    /// Statistics of a single event.
    pub fn event_stats(&self, id: u64) -> Query<DashboardStats> {
        self.client
            .query(self.path(&format!("/inventory/organizer/events/{}/statistics/", id)))
            .key(format!("eventSingleStats_{}", id))
            .refetch_on_mount(RefetchOnMount::Always)
    }

    pub async fn create(&self, event: &EventPayload) -> Result<Value> {
        self.client
            .mutation(Method::POST, self.path(ORGANIZER_EVENTS))
            .invalidates(ORGANIZER_EVENTS_KEY)
            .invalidates(DASHBOARD_STATS_KEY)
            .send(event)
            .await
    }

    /// Patch an event. `changes` may hold any subset of the event fields.
    pub async fn update<B: Serialize + ?Sized>(&self, id: u64, changes: &B) -> Result<Value> {
        self.client
            .mutation(
                Method::PATCH,
                self.path(&format!("/inventory/organizer/events/{}/", id)),
            )
            .invalidates(ORGANIZER_EVENTS_KEY)
            .invalidates(format!("eventDetails_{}", id))
            .send(changes)
            .await
    }

    /// Create an event with a flier image, sent as `multipart/form-data`.
    pub async fn create_with_image(&self, event: &EventPayload, flier: FilePart) -> Result<Value> {
        let form = MultipartForm::from_fields(event)?.file(EVENT_FLIER_FIELD, flier);
        self.client
            .mutation(Method::POST, self.path(ORGANIZER_EVENTS))
            .invalidates(ORGANIZER_EVENTS_KEY)
            .invalidates(DASHBOARD_STATS_KEY)
            .send_form(form)
            .await
    }

    /// Patch an event and replace its flier image.
    pub async fn update_with_image<B: Serialize + ?Sized>(
        &self,
        id: u64,
        changes: &B,
        flier: FilePart,
    ) -> Result<Value> {
        let form = MultipartForm::from_fields(changes)?.file(EVENT_FLIER_FIELD, flier);
        self.client
            .mutation(
                Method::PATCH,
                self.path(&format!("/inventory/organizer/events/{}/", id)),
            )
            .invalidates(ORGANIZER_EVENTS_KEY)
            .invalidates(format!("eventDetails_{}", id))
            .send_form(form)
            .await
    }

    /// Request an export of the vendors registered for an event.
    pub async fn export_registered_vendors(&self, id: u64, export: &ExportPayload) -> Result<Value> {
        self.client
            .mutation(
                Method::POST,
                self.path(&format!("/inventory/organizer/events/{}/export/", id)),
            )
            .send(export)
            .await
    }

    fn path(&self, path: &str) -> String {
        self.client.resource_path(path)
    }
}
