// src/grid/host.rs
//! Hosting page state fed by grid payloads: the last viewed listing and the
//! row selected for the details panel, kept per conversation.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::action::{GridAction, RowRecord};
use super::bridge::EventSink;
use crate::app_log;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastViewed {
    pub job_id: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedRow {
    pub row: RowRecord,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HostSnapshot {
    pub last_viewed: Option<LastViewed>,
    pub selected_row: Option<SelectedRow>,
    pub events_observed: u64,
}

#[derive(Debug, Default)]
struct HostState {
    snapshot: HostSnapshot,
    last_payload: Option<GridAction>,
}

/// Page key used when a request carries no conversation id
pub const ANONYMOUS_PAGE: &str = "anonymous";

/// Result of feeding one payload to a page
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// `false` when the payload equals the page's previous one
    pub changed: bool,
    pub snapshot: HostSnapshot,
}

/// Observer of grid payloads. Each conversation id gets its own page state.
#[derive(Debug, Default)]
pub struct JobGridHost {
    pages: Mutex<HashMap<String, HostState>>,
}

fn page_key(page: Option<&str>) -> &str {
    page.filter(|id| !id.trim().is_empty())
        .unwrap_or(ANONYMOUS_PAGE)
}

impl JobGridHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, HostState>> {
        self.pages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply a payload to one page and return that page's state as of this payload.
    pub fn observe(&self, page: Option<&str>, action: GridAction) -> Observation {
        let mut pages = self.lock();
        let state = pages.entry(page_key(page).to_string()).or_default();

        if state.last_payload.as_ref() == Some(&action) {
            app_log!(debug, "Ignoring repeated {} payload", action.kind());
            return Observation {
                changed: false,
                snapshot: state.snapshot.clone(),
            };
        }

        match &action {
            GridAction::Navigate { job_id, timestamp } => {
                app_log!(info, "Listing viewed: {}", job_id);
                state.snapshot.last_viewed = Some(LastViewed {
                    job_id: job_id.clone(),
                    timestamp: *timestamp,
                });
            }
            GridAction::ShowDetails { row, timestamp } => {
                app_log!(info, "Details requested for job: {}", row.job_id());
                state.snapshot.selected_row = Some(SelectedRow {
                    row: row.clone(),
                    timestamp: *timestamp,
                });
            }
        }

        state.snapshot.events_observed += 1;
        state.last_payload = Some(action);
        Observation {
            changed: true,
            snapshot: state.snapshot.clone(),
        }
    }

    /// State of one page; a page that never saw a payload is empty
    pub fn snapshot(&self, page: Option<&str>) -> HostSnapshot {
        self.lock()
            .get(page_key(page))
            .map(|state| state.snapshot.clone())
            .unwrap_or_default()
    }

    /// Close the details panel of one page.
    pub fn clear_selection(&self, page: Option<&str>) {
        if let Some(state) = self.lock().get_mut(page_key(page)) {
            state.snapshot.selected_row = None;
        }
    }
}

impl EventSink for JobGridHost {
    fn emit(&self, action: GridAction) {
        self.observe(None, action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::bridge::{ControlId, ControlSet, GridActionBridge, PendingNavigation};

    #[test]
    fn navigate_updates_last_viewed() {
        let host = JobGridHost::new();
        let observation = host.observe(
            None,
            GridAction::Navigate {
                job_id: "12345".to_string(),
                timestamp: 10,
            },
        );

        assert!(observation.changed);
        assert_eq!(
            observation.snapshot.last_viewed,
            Some(LastViewed {
                job_id: "12345".to_string(),
                timestamp: 10
            })
        );
        assert!(observation.snapshot.selected_row.is_none());
        assert_eq!(host.snapshot(None), observation.snapshot);
    }

    #[test]
    fn identical_payload_is_not_a_change_but_new_timestamp_is() {
        let host = JobGridHost::new();
        let row = RowRecord::new().with("Job Id", "1");
        let first = GridAction::ShowDetails {
            row: row.clone(),
            timestamp: 100,
        };

        assert!(host.observe(None, first.clone()).changed);
        assert!(!host.observe(None, first).changed);
        assert!(
            host.observe(None, GridAction::ShowDetails { row, timestamp: 101 })
                .changed
        );
        assert_eq!(host.snapshot(None).events_observed, 2);
    }

    #[test]
    fn conversations_keep_separate_pages() {
        let host = JobGridHost::new();
        let details = GridAction::ShowDetails {
            row: RowRecord::new().with("Job Id", "999"),
            timestamp: 5,
        };

        host.observe(Some("tab-a"), details.clone());
        let tab_b = host.observe(
            Some("tab-b"),
            GridAction::Navigate {
                job_id: "12345".to_string(),
                timestamp: 6,
            },
        );

        assert!(tab_b.snapshot.selected_row.is_none());
        assert_eq!(tab_b.snapshot.events_observed, 1);
        // the same payload on another page is still a change there
        assert!(host.observe(Some("tab-b"), details).changed);
        assert!(host.snapshot(Some("tab-a")).last_viewed.is_none());
        assert_eq!(host.snapshot(Some("tab-c")), HostSnapshot::default());

        host.clear_selection(Some("tab-a"));
        assert!(host.snapshot(Some("tab-a")).selected_row.is_none());
        assert!(host.snapshot(Some("tab-b")).selected_row.is_some());
    }

    #[test]
    fn blank_conversation_id_is_the_anonymous_page() {
        let host = JobGridHost::new();
        host.observe(
            Some("  "),
            GridAction::Navigate {
                job_id: "7".to_string(),
                timestamp: 1,
            },
        );
        assert_eq!(host.snapshot(Some(ANONYMOUS_PAGE)).events_observed, 1);
        assert_eq!(host.snapshot(None).events_observed, 1);
    }

    #[test]
    fn host_receives_bridge_emissions() {
        let host = JobGridHost::new();
        let bridge = GridActionBridge::new(ControlSet::Combined, PendingNavigation::new());
        let row = RowRecord::new()
            .with("Job Id", "999")
            .with("Title", "Engineer");

        bridge.activate(ControlId::ShowDetails, &row, &host);
        bridge.activate(ControlId::OpenListing, &row, &host);

        let snapshot = host.snapshot(None);
        assert_eq!(snapshot.selected_row.map(|s| s.row), Some(row));
        assert!(snapshot.last_viewed.is_none());
        assert_eq!(snapshot.events_observed, 1);

        host.clear_selection(None);
        assert!(host.snapshot(None).selected_row.is_none());
    }
}
