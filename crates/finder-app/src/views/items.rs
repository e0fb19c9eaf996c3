//! # Item view state
//!
//! Listing filters, the caller's own reports, dashboard counters, reference
//! data for the report form, and lost-item match suggestions. Everything here
//! is local state; the workflows in `workflows::items` keep it in sync with
//! the server.

use finder_core::{
    Category, CategoryId, Department, DepartmentId, Item, ItemId, ItemStats, ItemStatus, UserId,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Listing filters
// ============================================================================

/// Status tab of the public listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemFilter {
    /// Every item
    #[default]
    All,
    /// LOST items
    Lost,
    /// FOUND items
    Found,
    /// Items whose story has ended: REUNITED or CLAIMED
    Reunited,
}

impl ItemFilter {
    /// Whether an item with `status` belongs to this tab.
    pub fn matches(self, status: ItemStatus) -> bool {
        match self {
            Self::All => true,
            Self::Lost => status == ItemStatus::Lost,
            Self::Found => status == ItemStatus::Found,
            Self::Reunited => matches!(status, ItemStatus::Reunited | ItemStatus::Claimed),
        }
    }
}

impl FromStr for ItemFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "lost" => Ok(Self::Lost),
            "found" => Ok(Self::Found),
            "reunited" | "claimed" => Ok(Self::Reunited),
            other => Err(format!("unknown item filter: {other}")),
        }
    }
}

/// Status tab plus optional free-text search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    /// Status tab
    pub filter: ItemFilter,
    /// Case-insensitive text matched against title, description, location
    /// and category name; blank means no text constraint
    pub text: Option<String>,
}

impl ItemQuery {
    /// Query with a status tab and no text.
    pub fn status(filter: ItemFilter) -> Self {
        Self { filter, text: None }
    }

    /// Add a text constraint.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Items matching `query`, in their original relative order.
pub fn filter_items<'a>(items: &'a [Item], query: &ItemQuery) -> Vec<&'a Item> {
    let needle = query
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);
    items
        .iter()
        .filter(|item| query.filter.matches(item.status))
        .filter(|item| needle.as_deref().map_or(true, |n| item.matches_text(n)))
        .collect()
}

/// Exact-status filter of the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AdminItemFilter {
    /// No constraint
    #[default]
    All,
    /// Only this status
    Status(ItemStatus),
}

/// Items matching the admin filter, in their original order.
pub fn admin_filter(items: &[Item], filter: AdminItemFilter) -> Vec<&Item> {
    items
        .iter()
        .filter(|item| match filter {
            AdminItemFilter::All => true,
            AdminItemFilter::Status(status) => item.status == status,
        })
        .collect()
}

// ============================================================================
// Match suggestions
// ============================================================================

/// Why a found item was suggested for a lost one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchReason {
    /// Same category name
    Category,
    /// Found location contains the lost location
    Location,
    /// Found title contains the lost title
    Title,
}

/// A found item that may be one of the user's lost items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSuggestion {
    /// The user's LOST item
    pub lost: ItemId,
    /// Another user's FOUND item
    pub found: ItemId,
    /// Every criterion that matched
    pub reasons: Vec<MatchReason>,
}

/// Match the user's LOST items against other users' FOUND items.
///
/// Output follows the order of `mine`, then the order of `all`.
pub fn match_suggestions(mine: &[Item], all: &[Item], user: UserId) -> Vec<MatchSuggestion> {
    let mut suggestions = Vec::new();
    for lost in mine.iter().filter(|i| i.status == ItemStatus::Lost) {
        for candidate in all
            .iter()
            .filter(|i| i.status == ItemStatus::Found && !i.is_reported_by(user))
        {
            let reasons = match_reasons(lost, candidate);
            if !reasons.is_empty() {
                suggestions.push(MatchSuggestion {
                    lost: lost.item_id,
                    found: candidate.item_id,
                    reasons,
                });
            }
        }
    }
    suggestions
}

fn match_reasons(lost: &Item, found: &Item) -> Vec<MatchReason> {
    fn present(value: Option<&str>) -> Option<String> {
        value.filter(|v| !v.is_empty()).map(str::to_lowercase)
    }

    let mut reasons = Vec::new();
    if let (Some(a), Some(b)) = (
        present(found.category_name.as_deref()),
        present(lost.category_name.as_deref()),
    ) {
        if a == b {
            reasons.push(MatchReason::Category);
        }
    }
    if let (Some(a), Some(b)) = (present(Some(&found.location)), present(Some(&lost.location))) {
        if a.contains(&b) {
            reasons.push(MatchReason::Location);
        }
    }
    if let (Some(a), Some(b)) = (present(Some(&found.title)), present(Some(&lost.title))) {
        if a.contains(&b) {
            reasons.push(MatchReason::Title);
        }
    }
    reasons
}

// ============================================================================
// Reference data
// ============================================================================

/// Categories and departments for the report form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceData {
    /// Item categories
    pub categories: Vec<Category>,
    /// Departments / campuses
    pub departments: Vec<Department>,
}

impl ReferenceData {
    /// Both lists have been loaded.
    pub fn is_loaded(&self) -> bool {
        !self.categories.is_empty() && !self.departments.is_empty()
    }

    /// Look up a category.
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.category_id == id)
    }

    /// Look up a department.
    pub fn department(&self, id: DepartmentId) -> Option<&Department> {
        self.departments.iter().find(|d| d.department_id == id)
    }
}

// ============================================================================
// Items state
// ============================================================================

/// Item lists held by the client.
#[derive(Debug, Clone, Default)]
pub struct ItemsState {
    all: Vec<Item>,
    mine: Vec<Item>,
    stats: Option<ItemStats>,
    reference: ReferenceData,
}

impl ItemsState {
    /// Every item, as last fetched.
    pub fn all(&self) -> &[Item] {
        &self.all
    }

    /// The current user's reports, newest first after a local report.
    pub fn mine(&self) -> &[Item] {
        &self.mine
    }

    /// Dashboard counters, once loaded.
    pub fn stats(&self) -> Option<ItemStats> {
        self.stats
    }

    /// Form reference data.
    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Replace the full listing.
    pub fn set_all(&mut self, items: Vec<Item>) {
        self.all = items;
    }

    /// Replace the user's reports.
    pub fn set_mine(&mut self, items: Vec<Item>) {
        self.mine = items;
    }

    /// Store counters.
    pub fn set_stats(&mut self, stats: ItemStats) {
        self.stats = Some(stats);
    }

    /// Store reference data.
    pub fn set_reference(&mut self, reference: ReferenceData) {
        self.reference = reference;
    }

    /// Find an item in either list.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.all
            .iter()
            .chain(self.mine.iter())
            .find(|i| i.item_id == id)
    }

    /// Put a freshly reported item at the head of the user's list.
    pub fn prepend_mine(&mut self, item: Item) {
        self.mine.retain(|i| i.item_id != item.item_id);
        self.mine.insert(0, item);
    }

    /// Replace an item wherever it appears.
    pub fn replace(&mut self, item: &Item) -> bool {
        let mut found = false;
        for slot in self.all.iter_mut().chain(self.mine.iter_mut()) {
            if slot.item_id == item.item_id {
                *slot = item.clone();
                found = true;
            }
        }
        found
    }

    /// Drop an item from both lists.
    pub fn remove(&mut self, id: ItemId) -> bool {
        let before = self.all.len() + self.mine.len();
        self.all.retain(|i| i.item_id != id);
        self.mine.retain(|i| i.item_id != id);
        before != self.all.len() + self.mine.len()
    }

    /// Filtered public listing.
    pub fn list(&self, query: &ItemQuery) -> Vec<&Item> {
        filter_items(&self.all, query)
    }

    /// The user's reports still open (LOST or FOUND).
    pub fn active_reports(&self) -> Vec<&Item> {
        self.mine.iter().filter(|i| i.status.is_open()).collect()
    }

    /// Number of reports filed by `user` in the full listing.
    pub fn report_count(&self, user: UserId) -> usize {
        self.all.iter().filter(|i| i.is_reported_by(user)).count()
    }

    /// Clear everything tied to a signed-in user.
    pub fn clear_personal(&mut self) {
        self.mine.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    pub(crate) fn item(id: i64, status: ItemStatus, title: &str, reporter: i64) -> Item {
        Item {
            item_id: ItemId(id),
            title: title.to_string(),
            description: String::new(),
            location: "Main Campus".to_string(),
            status,
            date_report: None,
            image_url: None,
            reporter_id: Some(UserId(reporter)),
            category_id: None,
            department_id: None,
            category_name: Some("Bags".to_string()),
            department_name: None,
        }
    }

    #[test]
    fn test_lost_filter_preserves_order() {
        let items = vec![
            item(1, ItemStatus::Lost, "Wallet", 1),
            item(2, ItemStatus::Found, "Phone", 1),
            item(3, ItemStatus::Lost, "Umbrella", 1),
            item(4, ItemStatus::Returned, "Keys", 1),
        ];
        let lost = filter_items(&items, &ItemQuery::status(ItemFilter::Lost));
        let ids: Vec<_> = lost.iter().map(|i| i.item_id).collect();
        assert_eq!(ids, vec![ItemId(1), ItemId(3)]);
    }

    #[test]
    fn test_reunited_tab_includes_claimed() {
        let items = vec![
            item(1, ItemStatus::Reunited, "a", 1),
            item(2, ItemStatus::Claimed, "b", 1),
            item(3, ItemStatus::Returned, "c", 1),
        ];
        assert_eq!(
            filter_items(&items, &ItemQuery::status(ItemFilter::Reunited)).len(),
            2
        );
    }

    #[test]
    fn test_text_query_is_case_insensitive() {
        let items = vec![
            item(1, ItemStatus::Found, "Blue Backpack", 1),
            item(2, ItemStatus::Found, "Calculator", 1),
        ];
        let hits = filter_items(&items, &ItemQuery::default().with_text("  BACKPACK "));
        assert_eq!(hits.len(), 1);
        let blank = filter_items(&items, &ItemQuery::default().with_text("   "));
        assert_eq!(blank.len(), 2);
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("Lost".parse::<ItemFilter>(), Ok(ItemFilter::Lost));
        assert_eq!("claimed".parse::<ItemFilter>(), Ok(ItemFilter::Reunited));
        assert!("archived".parse::<ItemFilter>().is_err());
    }

    #[test]
    fn test_admin_filter_is_exact() {
        let items = vec![
            item(1, ItemStatus::Claimed, "a", 1),
            item(2, ItemStatus::Reunited, "b", 1),
        ];
        let hits = admin_filter(&items, AdminItemFilter::Status(ItemStatus::Claimed));
        assert_eq!(hits.len(), 1);
        assert_eq!(admin_filter(&items, AdminItemFilter::All).len(), 2);
    }

    #[test]
    fn test_match_suggestions() {
        let mut lost = item(1, ItemStatus::Lost, "Backpack", 7);
        lost.category_name = Some("bags".into());
        lost.location = "Library".into();
        let mut by_title = item(2, ItemStatus::Found, "Blue Backpack", 8);
        by_title.category_name = Some("Clothing".into());
        by_title.location = "Gym".into();
        let by_category = item(3, ItemStatus::Found, "Tote", 8);
        let own_found = item(4, ItemStatus::Found, "Backpack", 7);
        let claimed = item(5, ItemStatus::Claimed, "Backpack", 8);
        let all = vec![by_title, by_category, own_found, claimed];

        let suggestions = match_suggestions(&[lost], &all, UserId(7));
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].found, ItemId(2));
        assert_eq!(suggestions[0].reasons, vec![MatchReason::Title]);
        assert_eq!(suggestions[1].found, ItemId(3));
        assert_eq!(suggestions[1].reasons, vec![MatchReason::Category]);
    }

    #[test]
    fn test_state_mutations() {
        let mut state = ItemsState::default();
        state.set_all(vec![item(1, ItemStatus::Lost, "a", 1)]);
        state.set_mine(vec![item(1, ItemStatus::Lost, "a", 1)]);
        state.prepend_mine(item(2, ItemStatus::Found, "b", 1));
        assert_eq!(state.mine()[0].item_id, ItemId(2));

        let mut updated = item(1, ItemStatus::Claimed, "a", 1);
        updated.title = "renamed".into();
        assert!(state.replace(&updated));
        assert_eq!(state.item(ItemId(1)).map(|i| i.status), Some(ItemStatus::Claimed));
        assert_eq!(state.active_reports().len(), 1);

        assert!(state.remove(ItemId(1)));
        assert!(!state.remove(ItemId(1)));
        assert_eq!(state.report_count(UserId(1)), 0);
    }

    fn status_strategy() -> impl Strategy<Value = ItemStatus> {
        prop::sample::select(vec![
            ItemStatus::Lost,
            ItemStatus::Found,
            ItemStatus::Claimed,
            ItemStatus::Returned,
            ItemStatus::Reunited,
        ])
    }

    proptest! {
        #[test]
        fn prop_filter_is_an_ordered_subsequence(
            statuses in prop::collection::vec(status_strategy(), 0..30),
            filter in prop::sample::select(vec![
                ItemFilter::All, ItemFilter::Lost, ItemFilter::Found, ItemFilter::Reunited,
            ]),
        ) {
            let items: Vec<Item> = statuses
                .iter()
                .enumerate()
                .map(|(i, s)| item(i as i64, *s, "x", 1))
                .collect();
            let hits = filter_items(&items, &ItemQuery::status(filter));
            let expected: Vec<ItemId> = items
                .iter()
                .filter(|i| filter.matches(i.status))
                .map(|i| i.item_id)
                .collect();
            let got: Vec<ItemId> = hits.iter().map(|i| i.item_id).collect();
            prop_assert_eq!(got, expected);
        }
    }
}
