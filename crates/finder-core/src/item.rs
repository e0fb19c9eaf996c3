//! # Items
//!
//! Reported lost/found objects and the status lifecycle the client exposes.
//!
//! ```text
//! LOST ──┬──► CLAIMED   (terminal)
//! FOUND ─┴──► RETURNED  (terminal)
//!
//! REUNITED: receivable and renderable, never produced by this client
//! ```

use crate::identifiers::{CategoryId, DepartmentId, ItemId, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Item status as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    /// Owner reported the item lost
    Lost,
    /// Finder reported the item found
    Found,
    /// An administrator marked the item claimed
    Claimed,
    /// An administrator marked the item returned
    Returned,
    /// Reunited with its owner (statistics only)
    Reunited,
    /// Any status this client does not know yet
    #[serde(other)]
    Unknown,
}

impl ItemStatus {
    /// Statuses a reporter may choose when filing a report.
    pub const REPORTABLE: [ItemStatus; 2] = [ItemStatus::Lost, ItemStatus::Found];

    /// Statuses an administrator may set.
    pub const ADMIN_TARGETS: [ItemStatus; 2] = [ItemStatus::Claimed, ItemStatus::Returned];

    /// Still awaiting its owner (LOST or FOUND).
    pub fn is_open(self) -> bool {
        matches!(self, Self::Lost | Self::Found)
    }

    /// No transition leaves this status in this client.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Claimed | Self::Returned | Self::Reunited)
    }

    /// Whether the client offers a transition from `self` to `target`.
    ///
    /// Only `LOST|FOUND → CLAIMED|RETURNED` is exposed. Everything else,
    /// including any path back to LOST/FOUND and any path to REUNITED, is
    /// refused.
    pub fn can_transition_to(self, target: ItemStatus) -> bool {
        self.is_open() && Self::ADMIN_TARGETS.contains(&target)
    }

    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lost => "LOST",
            Self::Found => "FOUND",
            Self::Claimed => "CLAIMED",
            Self::Returned => "RETURNED",
            Self::Reunited => "REUNITED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Lower-case word used in user-facing sentences.
    pub fn label(self) -> &'static str {
        match self {
            Self::Lost => "lost",
            Self::Found => "found",
            Self::Claimed => "claimed",
            Self::Returned => "returned",
            Self::Reunited => "reunited",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reported item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Backend identifier
    pub item_id: ItemId,
    /// Short name
    #[serde(rename = "itemTitle")]
    pub title: String,
    /// Free-text description
    #[serde(default, rename = "itemDesc", deserialize_with = "null_as_empty")]
    pub description: String,
    /// Display name of the department/campus where it was lost or found
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    /// Lifecycle status
    pub status: ItemStatus,
    /// Date the item was lost or found. Accepts `2025-01-10` as well as
    /// `2025-01-10T00:00:00`.
    #[serde(default, deserialize_with = "date_or_datetime")]
    pub date_report: Option<NaiveDate>,
    /// Server-side image reference
    #[serde(default)]
    pub image_url: Option<String>,
    /// Reporting user
    #[serde(default, rename = "userId")]
    pub reporter_id: Option<UserId>,
    /// Category key
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Department key
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    /// Category display name
    #[serde(default)]
    pub category_name: Option<String>,
    /// Department display name
    #[serde(default, rename = "depName", alias = "departmentName")]
    pub department_name: Option<String>,
}

impl Item {
    /// True when `user` reported this item.
    pub fn is_reported_by(&self, user: UserId) -> bool {
        self.reporter_id == Some(user)
    }

    /// Case-insensitive substring match against title, description,
    /// location and category name. `needle` must already be lower-case.
    pub fn matches_text(&self, needle: &str) -> bool {
        let fields = [
            Some(self.title.as_str()),
            Some(self.description.as_str()),
            Some(self.location.as_str()),
            self.category_name.as_deref(),
        ];
        fields
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn date_or_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| serde::de::Error::custom(format!("invalid report date {raw:?}: {e}")))
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStats {
    /// LOST + FOUND
    #[serde(default)]
    pub active: u64,
    /// LOST items
    #[serde(default)]
    pub lost: u64,
    /// FOUND items
    #[serde(default)]
    pub found: u64,
    /// REUNITED items
    #[serde(default)]
    pub reunited: u64,
}

impl ItemStats {
    /// Derive counters from a full item listing.
    pub fn from_items(items: &[Item]) -> Self {
        let count = |status: ItemStatus| items.iter().filter(|i| i.status == status).count() as u64;
        let lost = count(ItemStatus::Lost);
        let found = count(ItemStatus::Found);
        Self {
            active: lost + found,
            lost,
            found,
            reunited: count(ItemStatus::Reunited),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exposed_transitions() {
        for open in ItemStatus::REPORTABLE {
            assert!(open.can_transition_to(ItemStatus::Claimed));
            assert!(open.can_transition_to(ItemStatus::Returned));
            assert!(!open.can_transition_to(ItemStatus::Reunited));
            assert!(!open.can_transition_to(ItemStatus::Lost));
        }
        for terminal in [ItemStatus::Claimed, ItemStatus::Returned, ItemStatus::Reunited] {
            assert!(terminal.is_terminal());
            for target in [ItemStatus::Lost, ItemStatus::Found, ItemStatus::Claimed, ItemStatus::Returned] {
                assert!(!terminal.can_transition_to(target));
            }
        }
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let status: ItemStatus = serde_json::from_str("\"ARCHIVED\"").unwrap();
        assert_eq!(status, ItemStatus::Unknown);
        let status: ItemStatus = serde_json::from_str("\"REUNITED\"").unwrap();
        assert_eq!(status, ItemStatus::Reunited);
    }

    #[test]
    fn test_decodes_item_dto() {
        let json = r#"{"itemId":3,"itemTitle":"Blue Backpack","itemDesc":"Navy","location":"Main Campus",
            "status":"FOUND","dateReport":"2025-01-10","imageUrl":null,"userId":1,"categoryId":2,
            "departmentId":4,"categoryName":"Bags","depName":"Main Campus"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.title, "Blue Backpack");
        assert_eq!(item.date_report, NaiveDate::from_ymd_opt(2025, 1, 10));
        assert!(item.is_reported_by(UserId(1)));
        assert!(item.matches_text("bags"));
        assert!(item.matches_text("main"));
        assert!(!item.matches_text("wallet"));
    }

    #[test]
    fn test_decodes_backend_entity_listing() {
        let body = r#"[{
            "itemId": 3,
            "itemTitle": "Blue Backpack",
            "itemDesc": null,
            "dateReport": "2025-01-10T00:00:00",
            "location": "Main Campus",
            "imageUrl": null,
            "status": "FOUND",
            "userId": 2,
            "categoryName": "Bags",
            "departmentName": "Main Campus"
        }]"#;
        let items: Vec<Item> = serde_json::from_str(body).unwrap();
        let item = &items[0];
        assert_eq!(item.date_report, NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(item.department_name.as_deref(), Some("Main Campus"));
        assert_eq!(item.description, "");
        assert_eq!(item.reporter_id, Some(UserId(2)));
        assert_eq!(item.status, ItemStatus::Found);
    }

    #[test]
    fn test_plain_dates_still_decode() {
        let body = r#"{"itemId":1,"itemTitle":"Umbrella","status":"LOST","dateReport":"2025-02-01","depName":"Banilad Campus"}"#;
        let item: Item = serde_json::from_str(body).unwrap();
        assert_eq!(item.date_report, NaiveDate::from_ymd_opt(2025, 2, 1));
        assert_eq!(item.department_name.as_deref(), Some("Banilad Campus"));
        assert!(serde_json::from_str::<Item>(
            r#"{"itemId":1,"itemTitle":"x","status":"LOST","dateReport":"yesterday"}"#
        )
        .is_err());
    }
}
