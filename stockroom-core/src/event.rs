//! Change events for the analytical store.

use crate::{Good, GoodId, ProjectId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Current wire version of [`ChangeEvent`].
pub const CHANGE_EVENT_VERSION: u16 = 1;

/// An immutable record of one good mutation.
///
/// Carries a copy of the entity's fields plus a server-assigned event
/// timestamp. Events are ordered only by arrival into the writer's buffer,
/// not by mutation order across concurrent requests. Once flushed, ownership
/// transfers to the analytical store; an event buffered but not yet flushed
/// is lost if the process crashes.
///
/// The schema is explicitly versioned so listener and writer can evolve
/// independently of the entity's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Schema version for the analytical record.
    pub version: u16,
    pub id: GoodId,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub priority: i32,
    pub removed: bool,
    /// Assigned by the server at buffering time, not by the store.
    pub event_time: Timestamp,
}

impl ChangeEvent {
    /// Snapshot a good into an analytical event, stamping `event_time` now.
    pub fn from_good(good: &Good) -> Self {
        Self {
            version: CHANGE_EVENT_VERSION,
            id: good.id,
            project_id: good.project_id,
            name: good.name.clone(),
            description: good.description.clone(),
            priority: good.priority,
            removed: good.removed,
            event_time: Utc::now(),
        }
    }
}

impl From<&Good> for ChangeEvent {
    fn from(good: &Good) -> Self {
        Self::from_good(good)
    }
}
