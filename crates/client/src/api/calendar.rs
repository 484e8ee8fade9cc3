//! Weekplan and homework fetching via the EasyIQ widget host
//!
//! One widget endpoint serves both scheduled classes and homework for a
//! child, discriminated by the numeric `itemType`. The widget host does its
//! own authorization: requests carry a short-lived bearer token minted by
//! the portal plus a set of `x-*` identity headers naming the child, the
//! guardian's full child filter, and the login.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, Duration, Utc};
use reqwest::Method;
use skoleport_domain::{
    constants, CalendarEvent, ChildIdentity, ClientConfig, ClientError, EventKind, HomeworkBundle,
    Result, WeekplanBundle,
};
use tracing::debug;

use super::wire::RawCalendarEvent;
use crate::auth::WidgetTokenCache;
use crate::http::HttpClient;

pub struct CalendarFetcher {
    http: Arc<HttpClient>,
    config: Arc<ClientConfig>,
    tokens: Arc<WidgetTokenCache>,
}

impl CalendarFetcher {
    pub fn new(
        http: Arc<HttpClient>,
        config: Arc<ClientConfig>,
        tokens: Arc<WidgetTokenCache>,
    ) -> Self {
        Self { http, config, tokens }
    }

    /// Fetch the configured week window for one child and split it into
    /// weekplan and homework bundles.
    ///
    /// Duplicates are dropped on the `(start, course)` signature within this
    /// child's fetch only; the dedup state never crosses children.
    pub async fn fetch(
        &self,
        api_url: &str,
        child: &ChildIdentity,
        all_children: &[ChildIdentity],
    ) -> Result<(WeekplanBundle, HomeworkBundle)> {
        let token =
            self.tokens.bearer_token(api_url, constants::WEEKPLAN_WIDGET_ID).await?;
        let child_filter: String = all_children
            .iter()
            .map(|c| c.internal_id.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut events = Vec::new();
        let mut assignments = Vec::new();

        let now = Utc::now();
        for offset in 0..=self.config.fetch.weeks_ahead {
            // The widget host expects a full ISO datetime with a Z suffix,
            // not a bare date.
            let date =
                (now + Duration::weeks(i64::from(offset))).format("%Y-%m-%dT%H:%M:%SZ").to_string();
            let raw = self.fetch_week(&token, child, &child_filter, &date).await?;

            for item in raw {
                let event = CalendarEvent {
                    start: item.start,
                    end: item.end,
                    course: item.courses,
                    activity: item.activities,
                    description: item.description,
                    kind: EventKind::from_item_type(item.item_type),
                };
                if !seen.insert(event.signature()) {
                    continue;
                }
                match event.kind {
                    EventKind::Weekplan => events.push(event),
                    EventKind::Homework => assignments.push(event),
                    EventKind::Other(item_type) => {
                        debug!(item_type, child = %child.external_id, "skipping unclassified calendar item");
                    }
                }
            }
        }

        let week = week_label();
        debug!(
            child = %child.external_id,
            events = events.len(),
            assignments = assignments.len(),
            "calendar fetched"
        );
        Ok((
            WeekplanBundle { week: week.clone(), events },
            HomeworkBundle { week, assignments },
        ))
    }

    async fn fetch_week(
        &self,
        token: &str,
        child: &ChildIdentity,
        child_filter: &str,
        date: &str,
    ) -> Result<Vec<RawCalendarEvent>> {
        let url = format!(
            "{}/Calendar/CalendarGetWeekplanEvents",
            self.config.endpoints.widget_base
        );
        let response = self
            .http
            .send(
                self.http
                    .request(Method::GET, &url)
                    .query(&[
                        ("date", date),
                        ("activityFilter", ""),
                        ("courseFilter", "-1"),
                        ("textFilter", ""),
                        ("ownWeekPlan", "false"),
                    ])
                    .header("authorization", token)
                    .header("x-child", &child.internal_id)
                    .header("x-childfilter", child_filter)
                    .header("x-login", &self.config.credentials.username)
                    .header("x-userprofile", "guardian"),
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Network(format!(
                "weekplan endpoint returned status {status} for child {}",
                child.external_id
            )));
        }

        response
            .json()
            .await
            .map_err(|err| ClientError::Parse(format!("weekplan payload invalid: {err}")))
    }
}

/// ISO week label for the current window start, e.g. `2026-W35`
fn week_label() -> String {
    let week = Utc::now().iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}
