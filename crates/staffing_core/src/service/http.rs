//! REST adapter for the assignment service and employee directory.
//!
//! # Responsibility
//! - Translate contract calls into the HTTP endpoints of the backend.
//! - Decode error envelopes so the classifier sees the server text.
//!
//! # Invariants
//! - Transport failures and timeouts map to `ServiceError::Network`.
//! - Non-2xx responses map to `ServiceError::Rejected`; an undecodable error
//!   body falls back to the raw text as `message`.
//! - Log lines carry ids, counts and durations only.

use crate::config::ServiceConfig;
use crate::model::assignment::{AssignedStaff, AssignmentSet};
use crate::model::employee::Employee;
use crate::model::event::EventId;
use crate::service::wire::{AssignmentRequest, ErrorBody, Page, PageRequest};
use crate::service::{AssignmentService, EmployeeDirectory, ServiceError, ServiceResult};
use async_trait::async_trait;
use log::{error, info};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

/// HTTP client for `/events/.../staffs` and `/employees`.
#[derive(Debug, Clone)]
pub struct HttpStaffingClient {
    client: Client,
    base_url: String,
}

impl HttpStaffingClient {
    /// Builds a client from service configuration.
    pub fn new(config: &ServiceConfig) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| ServiceError::Network(err.to_string()))?;
        Ok(Self::with_client(client, config.base_url.as_str()))
    }

    /// Wraps an existing `reqwest` client.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_assignments(
        &self,
        method: Method,
        path: String,
        op: &'static str,
        event_id: EventId,
        set: &AssignmentSet,
    ) -> ServiceResult<()> {
        if set.event_id() != event_id {
            return Err(ServiceError::InvalidRequest(format!(
                "assignment set belongs to event {}, not {event_id}",
                set.event_id()
            )));
        }
        let body = AssignmentRequest::from_set(set);
        let request = self.client.request(method, self.url(&path)).json(&body);
        let response = send(request, op).await?;
        ensure_success(response, op).await?;
        info!(
            "event={op} module=http status=ok event_id={} staff_count={}",
            set.event_id(),
            set.len()
        );
        Ok(())
    }
}

#[async_trait]
impl AssignmentService for HttpStaffingClient {
    async fn create(&self, event_id: EventId, set: &AssignmentSet) -> ServiceResult<()> {
        self.send_assignments(
            Method::POST,
            "/events/staffs".to_string(),
            "assignment_create",
            event_id,
            set,
        )
        .await
    }

    async fn replace(&self, event_id: EventId, set: &AssignmentSet) -> ServiceResult<()> {
        self.send_assignments(
            Method::PUT,
            event_staffs_path(event_id),
            "assignment_replace",
            event_id,
            set,
        )
        .await
    }

    async fn fetch_current(&self, event_id: EventId) -> ServiceResult<Vec<AssignedStaff>> {
        let request = self.client.get(self.url(&event_staffs_path(event_id)));
        let response = send(request, "assignment_fetch").await?;
        decode_json(response, "assignment_fetch").await
    }
}

#[async_trait]
impl EmployeeDirectory for HttpStaffingClient {
    async fn list_page(&self, request: &PageRequest) -> ServiceResult<Page<Employee>> {
        let http_request = self
            .client
            .get(self.url("/employees"))
            .query(&request.query_pairs());
        let response = send(http_request, "directory_list").await?;
        decode_json(response, "directory_list").await
    }
}

/// Path of the per-event staffing resource.
pub fn event_staffs_path(event_id: EventId) -> String {
    format!("/events/{event_id}/staffs")
}

async fn send(request: RequestBuilder, op: &'static str) -> ServiceResult<Response> {
    let started_at = Instant::now();
    match request.send().await {
        Ok(response) => Ok(response),
        Err(err) => {
            let error_code = if err.is_timeout() { "timeout" } else { "transport" };
            error!(
                "event={op} module=http status=error duration_ms={} error_code={error_code}",
                started_at.elapsed().as_millis()
            );
            Err(ServiceError::Network(err.to_string()))
        }
    }
}

async fn ensure_success(response: Response, op: &'static str) -> ServiceResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response
        .text()
        .await
        .map_err(|err| ServiceError::Network(err.to_string()))?;
    let body = parse_error_body(&text, status.canonical_reason().unwrap_or("request failed"));
    error!(
        "event={op} module=http status=error http_status={} error_code=rejected",
        status.as_u16()
    );
    Err(ServiceError::rejected(status.as_u16(), body))
}

async fn decode_json<T: DeserializeOwned>(response: Response, op: &'static str) -> ServiceResult<T> {
    let response = ensure_success(response, op).await?;
    let text = response
        .text()
        .await
        .map_err(|err| ServiceError::Network(err.to_string()))?;
    serde_json::from_str(&text).map_err(|err| {
        error!("event={op} module=http status=error error_code=decode_failed");
        ServiceError::Decode(err.to_string())
    })
}

/// Decodes an error envelope, keeping raw text when it is not JSON.
pub fn parse_error_body(text: &str, fallback: &str) -> ErrorBody {
    if let Ok(body) = serde_json::from_str::<ErrorBody>(text) {
        return body;
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        ErrorBody::new(fallback)
    } else {
        ErrorBody::new(trimmed)
    }
}
