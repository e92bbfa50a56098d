// src/grid/mod.rs
//! Job grid action column: cell controls, their payloads and the host state
//! that observes them.

pub mod action;
pub mod bridge;
pub mod host;

pub use action::{GridAction, RowRecord, DETAILS_COLUMN, JOB_ID_FIELD};
pub use bridge::{
    listing_url, Clock, ControlId, ControlSet, EventSink, GridActionBridge, Navigator,
    PendingNavigation, RenderedControl, SystemClock, SEEK_JOB_URL_BASE,
};
pub use host::{HostSnapshot, JobGridHost, LastViewed, Observation, SelectedRow, ANONYMOUS_PAGE};
