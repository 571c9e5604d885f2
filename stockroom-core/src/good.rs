//! Good entity and the paginated list page built from it.

use crate::{GoodId, ProjectId, Timestamp};
use serde::{Deserialize, Serialize};

/// A good owned by a project.
///
/// Rows are soft-deleted: `removed` flips to true but the row is never
/// physically deleted, and `priority` values are never reused or renumbered.
/// `(id, project_id)` is the key for every mutating operation; an id under
/// the wrong project is treated as not-found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Good {
    pub id: GoodId,
    pub project_id: ProjectId,
    pub name: String,
    /// May be empty. An empty description in an update request means
    /// "leave unchanged", not "clear the field".
    #[serde(default)]
    pub description: String,
    /// Assigned as `max(existing priorities) + 1` at creation time.
    pub priority: i32,
    pub removed: bool,
    pub created_at: Timestamp,
}

/// Pagination metadata for a [`GoodPage`].
///
/// `total` and `removed` are page-local: they count the rows returned by
/// this read, not the whole dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub total: usize,
    pub removed: usize,
    pub limit: i64,
    pub offset: i64,
}

/// A materialized page of goods ordered by id ascending.
///
/// This is a derived, cacheable artifact, not a source of truth: it is
/// rebuilt wholesale from the store on cache miss and invalidated wholesale
/// on any mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodPage {
    pub meta: Meta,
    pub goods: Vec<Good>,
}

impl GoodPage {
    /// Build a page from rows already ordered by id, computing page-local
    /// counts.
    pub fn from_rows(goods: Vec<Good>, limit: i64, offset: i64) -> Self {
        let meta = Meta {
            total: goods.len(),
            removed: goods.iter().filter(|g| g.removed).count(),
            limit,
            offset,
        };
        Self { meta, goods }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn good(id: GoodId, removed: bool) -> Good {
        Good {
            id,
            project_id: 1,
            name: format!("good-{id}"),
            description: String::new(),
            priority: id,
            removed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn page_counts_are_page_local() {
        let page = GoodPage::from_rows(vec![good(1, false), good(2, true), good(3, true)], 10, 0);
        assert_eq!(page.meta.total, 3);
        assert_eq!(page.meta.removed, 2);
        assert_eq!(page.meta.limit, 10);
        assert_eq!(page.meta.offset, 0);
    }

    #[test]
    fn good_serializes_camel_case() {
        let json = serde_json::to_value(good(7, false)).unwrap();
        assert!(json.get("projectId").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("project_id").is_none());
    }

    #[test]
    fn good_roundtrips_through_json() {
        let original = good(42, true);
        let bytes = serde_json::to_vec(&original).unwrap();
        let parsed: Good = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, original);
    }
}
