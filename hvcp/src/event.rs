//! Events published by the monitor task

use hvcp_types::{ExecutionResult, VersionInfo};

/// Sensor lifecycle and detection events
///
/// Results move into the event by value; nothing is shared with the
/// driver after emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Emitted once per link bring-up, after the version probe succeeds
    Initialized(VersionInfo),

    /// Emitted when an execution detected at least one body or face.
    /// Hand counts are carried in the result but do not trigger the event.
    Detection(ExecutionResult),
}
