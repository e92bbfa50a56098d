// src/grid/bridge.rs
//! Per-row cell controls and the relay of their activations to the host.
//!
//! The bridge never talks to a concrete host: it emits through an
//! [`EventSink`] supplied by the caller and opens listings through a
//! [`Navigator`]. Activations run synchronously to completion and carry no
//! state between calls.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Mutex;

use super::action::{GridAction, RowRecord};
use crate::app_log;

/// External job-board listing URL prefix; the job id is appended verbatim.
pub const SEEK_JOB_URL_BASE: &str = "https://www.seek.com.au/job/";

/// Listing URL for a job id. An empty id yields a URL with no job segment.
pub fn listing_url(job_id: &str) -> String {
    format!("{}{}", SEEK_JOB_URL_BASE, job_id)
}

/// Data-emission capability injected by the host.
pub trait EventSink {
    fn emit(&self, action: GridAction);
}

impl<F> EventSink for F
where
    F: Fn(GridAction),
{
    fn emit(&self, action: GridAction) {
        self(action)
    }
}

impl EventSink for Sender<GridAction> {
    fn emit(&self, action: GridAction) {
        if let Err(e) = self.send(action) {
            app_log!(debug, "Grid host is gone, dropping {} payload", e.0.kind());
        }
    }
}

/// Opens a new browsing context. Fire-and-forget.
pub trait Navigator {
    fn open(&self, url: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str),
{
    fn open(&self, url: &str) {
        self(url)
    }
}

/// Navigator for server-side activations: remembers the URL so the response
/// can ask the browser to open it.
#[derive(Debug, Default)]
pub struct PendingNavigation {
    url: Mutex<Option<String>>,
}

impl PendingNavigation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Option<String> {
        self.url
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

impl Navigator for PendingNavigation {
    fn open(&self, url: &str) {
        *self
            .url
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(url.to_string());
    }
}

/// Source of activation timestamps in milliseconds.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Wall clock that never goes backwards, even if the system clock does.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let previous = self.last.fetch_max(now, Ordering::SeqCst);
        previous.max(now)
    }
}

/// Which controls a cell renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlSet {
    /// A single control that opens the listing and reports it as viewed.
    NavigateOnly,
    /// A single details-request control.
    DetailsOnly,
    /// Details request and listing link side by side.
    #[default]
    Combined,
}

impl ControlSet {
    /// Wire name, as serialized
    pub fn slug(self) -> &'static str {
        match self {
            ControlSet::NavigateOnly => "navigate-only",
            ControlSet::DetailsOnly => "details-only",
            ControlSet::Combined => "combined",
        }
    }

    pub fn controls(self) -> &'static [ControlId] {
        match self {
            ControlSet::NavigateOnly => &[ControlId::ViewListing],
            ControlSet::DetailsOnly => &[ControlId::ShowDetails],
            ControlSet::Combined => &[ControlId::ShowDetails, ControlId::OpenListing],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlId {
    /// Standalone navigate control: opens the listing and emits `Navigate`.
    ViewListing,
    /// Emits `ShowDetails` with the full row; no navigation.
    ShowDetails,
    /// Navigate control of the combined set: opens the listing only.
    OpenListing,
}

impl ControlId {
    pub fn slug(self) -> &'static str {
        match self {
            ControlId::ViewListing => "view-listing",
            ControlId::ShowDetails => "show-details",
            ControlId::OpenListing => "open-listing",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ControlId::ViewListing => "View on Seek",
            ControlId::ShowDetails => "Details",
            ControlId::OpenListing => "Open",
        }
    }

    pub fn navigates(self) -> bool {
        matches!(self, ControlId::ViewListing | ControlId::OpenListing)
    }

    pub fn emits(self) -> bool {
        matches!(self, ControlId::ViewListing | ControlId::ShowDetails)
    }
}

/// One clickable control rendered inside a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedControl {
    pub id: ControlId,
    pub label: &'static str,
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// Cell renderer for the job grid's action column.
pub struct GridActionBridge<N, C = SystemClock> {
    set: ControlSet,
    navigator: N,
    clock: C,
}

impl<N: Navigator> GridActionBridge<N, SystemClock> {
    pub fn new(set: ControlSet, navigator: N) -> Self {
        Self::with_clock(set, navigator, SystemClock::new())
    }
}

impl<N: Navigator, C: Clock> GridActionBridge<N, C> {
    pub fn with_clock(set: ControlSet, navigator: N, clock: C) -> Self {
        Self {
            set,
            navigator,
            clock,
        }
    }

    pub fn control_set(&self) -> ControlSet {
        self.set
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Controls for one row, in display order.
    pub fn render(&self, row: &RowRecord) -> Vec<RenderedControl> {
        let job_id = row.job_id();
        self.set
            .controls()
            .iter()
            .map(|&id| RenderedControl {
                id,
                label: id.label(),
                job_id: job_id.clone(),
                href: id.navigates().then(|| listing_url(&job_id)),
            })
            .collect()
    }

    /// Run one control's activation. Returns `false`, doing nothing, when the
    /// control is not part of this bridge's set.
    pub fn activate<S>(&self, control: ControlId, row: &RowRecord, sink: &S) -> bool
    where
        S: EventSink + ?Sized,
    {
        if !self.set.controls().contains(&control) {
            return false;
        }

        match control {
            ControlId::ViewListing => {
                let job_id = row.job_id();
                self.navigator.open(&listing_url(&job_id));
                sink.emit(GridAction::Navigate {
                    job_id,
                    timestamp: self.clock.now_millis(),
                });
            }
            ControlId::ShowDetails => {
                sink.emit(GridAction::ShowDetails {
                    row: row.clone(),
                    timestamp: self.clock.now_millis(),
                });
            }
            ControlId::OpenListing => {
                self.navigator.open(&listing_url(&row.job_id()));
            }
        }

        true
    }
}
