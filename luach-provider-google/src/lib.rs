//! Google Calendar provider for luach.
//!
//! Implements the core `CalendarService` seam directly against the Calendar
//! v3 REST API. The raw HTTP client (instead of a generated API binding)
//! keeps response status codes first-class, which is what the engine's
//! failure classification runs on.

mod types;

use luach_core::service::{
    CalendarService, EventPatch, EventPayload, RemoteCalendar, ServiceError,
};
use serde_json::json;

use crate::types::{CalendarList, CreatedCalendar, CreatedEvent};

const BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar v3 client. Stateless apart from the connection pool; the
/// access token is passed per call.
#[derive(Debug, Clone)]
pub struct GoogleCalendar {
    http: reqwest::Client,
    base_url: String,
}

impl Default for GoogleCalendar {
    fn default() -> Self {
        GoogleCalendar::new()
    }
}

impl GoogleCalendar {
    pub fn new() -> Self {
        GoogleCalendar {
            http: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different base URL (test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        GoogleCalendar {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Percent-escape a value used as a path segment. Calendar ids contain `@`
/// (fine in a path) but user-supplied ids must not be able to smuggle in
/// separators.
fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'@' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// Turn a non-success response into a `ServiceError` carrying the status.
async fn status_error(response: reqwest::Response) -> ServiceError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let mut message = body.trim().to_string();
    // Raw API payloads are for the log, not the caller; keep them short.
    if message.len() > 200 {
        message.truncate(200);
    }
    if message.is_empty() {
        message = format!("HTTP {}", status);
    }
    ServiceError {
        status: Some(status),
        message: format!("HTTP {}: {}", status, message),
    }
}

fn transport(err: reqwest::Error) -> ServiceError {
    ServiceError::transport(err.to_string())
}

/// Request body for an all-day occurrence entry.
fn event_body(payload: &EventPayload) -> serde_json::Value {
    json!({
        "summary": payload.summary,
        "description": payload.description,
        "start": { "date": payload.start.format("%Y-%m-%d").to_string() },
        "end": { "date": payload.end.format("%Y-%m-%d").to_string() },
        // Anniversaries never block time.
        "transparency": "transparent",
        "extendedProperties": { "private": payload.private_properties },
    })
}

/// Request body for a partial update; absent fields stay untouched.
fn patch_body(patch: &EventPatch) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    if let Some(summary) = &patch.summary {
        body.insert("summary".to_string(), json!(summary));
    }
    if let Some(description) = &patch.description {
        body.insert("description".to_string(), json!(description));
    }
    serde_json::Value::Object(body)
}

impl CalendarService for GoogleCalendar {
    async fn list_calendars(&self, token: &str) -> Result<Vec<RemoteCalendar>, ServiceError> {
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(self.url("/users/me/calendarList"))
                .bearer_auth(token)
                .query(&[("maxResults", "250")]);
            if let Some(page) = &page_token {
                request = request.query(&[("pageToken", page.as_str())]);
            }

            let response = request.send().await.map_err(transport)?;
            if !response.status().is_success() {
                return Err(status_error(response).await);
            }
            let page: CalendarList = response.json().await.map_err(transport)?;

            calendars.extend(
                page.items
                    .into_iter()
                    .filter(|entry| !entry.id.is_empty())
                    .map(|entry| RemoteCalendar {
                        id: entry.id,
                        summary: entry.summary,
                    }),
            );

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => return Ok(calendars),
            }
        }
    }

    async fn create_calendar(&self, token: &str, summary: &str) -> Result<String, ServiceError> {
        let response = self
            .http
            .post(self.url("/calendars"))
            .bearer_auth(token)
            .json(&json!({ "summary": summary }))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let created: CreatedCalendar = response.json().await.map_err(transport)?;
        Ok(created.id)
    }

    async fn calendar_exists(
        &self,
        token: &str,
        calendar_id: &str,
    ) -> Result<bool, ServiceError> {
        let response = self
            .http
            .get(self.url(&format!("/calendars/{}", encode_segment(calendar_id))))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        match response.status().as_u16() {
            200 => Ok(true),
            404 | 410 => Ok(false),
            _ => Err(status_error(response).await),
        }
    }

    async fn insert_event(
        &self,
        token: &str,
        calendar_id: &str,
        payload: &EventPayload,
    ) -> Result<String, ServiceError> {
        let response = self
            .http
            .post(self.url(&format!(
                "/calendars/{}/events",
                encode_segment(calendar_id)
            )))
            .bearer_auth(token)
            .json(&event_body(payload))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let created: CreatedEvent = response.json().await.map_err(transport)?;
        Ok(created.id)
    }

    async fn patch_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
        patch: &EventPatch,
    ) -> Result<(), ServiceError> {
        let response = self
            .http
            .patch(self.url(&format!(
                "/calendars/{}/events/{}",
                encode_segment(calendar_id),
                encode_segment(event_id)
            )))
            .bearer_auth(token)
            .json(&patch_body(patch))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }

    async fn delete_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), ServiceError> {
        let response = self
            .http
            .delete(self.url(&format!(
                "/calendars/{}/events/{}",
                encode_segment(calendar_id),
                encode_segment(event_id)
            )))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }
}
