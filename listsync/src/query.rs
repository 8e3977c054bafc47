//! Filter and sort state for list queries
//!
//! This module provides the types that describe which slice of a collection
//! a controller is currently looking at: free-form filter keys, the reserved
//! sort directives, and the debounced search text.
//!
//! # Example
//!
//! ```rust
//! use listsync::query::{FilterPatch, FilterState, SortOrder};
//!
//! let mut filters = FilterState::default();
//! filters.apply(
//!     &FilterPatch::new()
//!         .set("isActive", true)
//!         .sort("name", SortOrder::Ascending),
//! );
//!
//! let pairs = filters.query_pairs(1, 20);
//! assert!(pairs.contains(&("isActive".to_string(), "true".to_string())));
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Sort in ascending order (A-Z, 0-9)
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    #[default]
    Descending,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// A value a custom filter key can carry
///
/// Unset is modeled by the absence of the key in [`FilterState`], never by an
/// empty string. Empty text values are treated as unset when building the
/// outgoing query, so the server never sees an explicit empty filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Free-form text value
    Text(String),
    /// Boolean flag (tri-state together with the absent key)
    Flag(bool),
    /// Integer value
    Number(i64),
}

impl FilterValue {
    /// Wire representation, or `None` when the value amounts to unset
    pub fn wire_value(&self) -> Option<String> {
        match self {
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Self::Flag(b) => Some(b.to_string()),
            Self::Number(n) => Some(n.to_string()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Number(i64::from(n))
    }
}

/// Reserved wire keys; custom filters must not collide with these.
const RESERVED_KEYS: &[&str] = &["sortBy", "sortOrder", "search", "page", "limit"];

/// The current set of active query constraints plus sort directives
///
/// Custom filter keys live in an ordered map so outgoing queries are
/// deterministic. The reserved keys (`sortBy`, `sortOrder`, `search`) are
/// struct fields, which keeps them from colliding with custom filters.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    filters: BTreeMap<String, FilterValue>,
    /// Field the server should sort by
    pub sort_by: String,
    /// Sort direction
    pub sort_order: SortOrder,
    /// Debounced search text; `None` means no search constraint
    pub search: Option<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            filters: BTreeMap::new(),
            sort_by: "createdAt".to_string(),
            sort_order: SortOrder::Descending,
            search: None,
        }
    }
}

impl FilterState {
    /// Look up a custom filter value
    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.filters.get(key)
    }

    /// Number of set custom filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether no custom filters are set
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Shallow-merge a patch into this state
    ///
    /// Keys the patch does not mention are left untouched. Setting a key to
    /// a cleared entry removes it entirely.
    pub fn apply(&mut self, patch: &FilterPatch) {
        for (key, value) in &patch.entries {
            match value {
                Some(v) => {
                    self.filters.insert(key.clone(), v.clone());
                }
                None => {
                    self.filters.remove(key);
                }
            }
        }
        if let Some((field, order)) = &patch.sort {
            self.sort_by = field.clone();
            self.sort_order = *order;
        }
        if let Some(search) = &patch.search {
            self.search = normalize_search(search.as_deref());
        }
    }

    /// Replace the search text directly (used by the debounced search path)
    pub fn set_search(&mut self, text: &str) {
        self.search = normalize_search(Some(text));
    }

    /// Serialize the state into outgoing query pairs
    ///
    /// Unset filters and empty text values are omitted entirely. Reserved
    /// keys come last in a fixed order: `search`, `sortBy`, `sortOrder`,
    /// `page`, `limit`.
    pub fn query_pairs(&self, page: u64, limit: u64) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 5);
        for (key, value) in &self.filters {
            if let Some(wire) = value.wire_value() {
                pairs.push((key.clone(), wire));
            }
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs.push(("sortBy".to_string(), self.sort_by.clone()));
        pairs.push(("sortOrder".to_string(), self.sort_order.to_string()));
        pairs.push(("page".to_string(), page.to_string()));
        pairs.push(("limit".to_string(), limit.to_string()));
        pairs
    }
}

fn normalize_search(text: Option<&str>) -> Option<String> {
    match text {
        Some(t) => {
            let trimmed = t.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        None => None,
    }
}

/// A shallow merge to apply to a [`FilterState`]
///
/// # Example
///
/// ```rust
/// use listsync::query::{FilterPatch, SortOrder};
///
/// let patch = FilterPatch::new()
///     .set("status", "active")
///     .clear("role")
///     .sort("updatedAt", SortOrder::Descending);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    entries: Vec<(String, Option<FilterValue>)>,
    sort: Option<(String, SortOrder)>,
    search: Option<Option<String>>,
}

impl FilterPatch {
    /// Create an empty patch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom filter key
    ///
    /// # Panics
    ///
    /// Panics if `key` is one of the reserved wire keys (`sortBy`,
    /// `sortOrder`, `search`, `page`, `limit`); those are set through the
    /// dedicated builders and controller operations.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        let key = key.into();
        assert!(
            !RESERVED_KEYS.contains(&key.as_str()),
            "filter key `{key}` is reserved"
        );
        self.entries.push((key, Some(value.into())));
        self
    }

    /// Clear (unset) a custom filter key
    #[must_use]
    pub fn clear(mut self, key: impl Into<String>) -> Self {
        self.entries.push((key.into(), None));
        self
    }

    /// Set the sort field and direction
    #[must_use]
    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    /// Set the search text; empty text clears the search constraint
    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(Some(text.into()));
        self
    }

    /// Clear the search constraint
    #[must_use]
    pub fn clear_search(mut self) -> Self {
        self.search = Some(None);
        self
    }

    /// Whether the patch carries no changes
    pub fn is_noop(&self) -> bool {
        self.entries.is_empty() && self.sort.is_none() && self.search.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_display() {
        assert_eq!(format!("{}", SortOrder::Ascending), "asc");
        assert_eq!(format!("{}", SortOrder::Descending), "desc");
    }

    #[test]
    fn test_default_state() {
        let state = FilterState::default();
        assert_eq!(state.sort_by, "createdAt");
        assert_eq!(state.sort_order, SortOrder::Descending);
        assert!(state.search.is_none());
        assert!(state.is_empty());
    }

    #[test]
    fn test_filter_value_conversions() {
        assert_eq!(
            FilterValue::from("active"),
            FilterValue::Text("active".to_string())
        );
        assert_eq!(FilterValue::from(true), FilterValue::Flag(true));
        assert_eq!(FilterValue::from(42_i64), FilterValue::Number(42));
        assert_eq!(FilterValue::from(7_i32), FilterValue::Number(7));
    }

    #[test]
    fn test_empty_text_is_unset_on_wire() {
        assert_eq!(FilterValue::Text(String::new()).wire_value(), None);
        assert_eq!(FilterValue::Text("  ".to_string()).wire_value(), None);
        assert_eq!(
            FilterValue::Text("x".to_string()).wire_value(),
            Some("x".to_string())
        );
    }

    #[test]
    fn test_apply_merges_shallowly() {
        let mut state = FilterState::default();
        state.apply(&FilterPatch::new().set("isActive", true).set("role", "admin"));
        state.apply(&FilterPatch::new().set("role", "member"));

        assert_eq!(state.get("isActive"), Some(&FilterValue::Flag(true)));
        assert_eq!(
            state.get("role"),
            Some(&FilterValue::Text("member".to_string()))
        );
    }

    #[test]
    fn test_clear_removes_key() {
        let mut state = FilterState::default();
        state.apply(&FilterPatch::new().set("role", "admin"));
        state.apply(&FilterPatch::new().clear("role"));
        assert!(state.get("role").is_none());
    }

    #[test]
    fn test_query_pairs_omit_unset_and_empty() {
        let mut state = FilterState::default();
        state.apply(&FilterPatch::new().set("isActive", true).set("note", ""));

        let pairs = state.query_pairs(2, 10);
        assert!(pairs.contains(&("isActive".to_string(), "true".to_string())));
        assert!(!pairs.iter().any(|(k, _)| k == "note"));
        assert!(!pairs.iter().any(|(k, _)| k == "search"));
        assert!(pairs.contains(&("page".to_string(), "2".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "10".to_string())));
    }

    #[test]
    fn test_query_pairs_include_sort_directives() {
        let mut state = FilterState::default();
        state.apply(&FilterPatch::new().sort("name", SortOrder::Ascending));

        let pairs = state.query_pairs(1, 20);
        assert!(pairs.contains(&("sortBy".to_string(), "name".to_string())));
        assert!(pairs.contains(&("sortOrder".to_string(), "asc".to_string())));
    }

    #[test]
    fn test_search_normalization() {
        let mut state = FilterState::default();
        state.set_search("  widgets  ");
        assert_eq!(state.search.as_deref(), Some("widgets"));

        state.set_search("");
        assert!(state.search.is_none());
    }

    #[test]
    fn test_patch_search_empty_clears() {
        let mut state = FilterState::default();
        state.set_search("widgets");
        state.apply(&FilterPatch::new().search(""));
        assert!(state.search.is_none());
    }

    #[test]
    #[should_panic(expected = "reserved")]
    fn test_reserved_key_rejected() {
        let _ = FilterPatch::new().set("sortBy", "sneaky");
    }

    #[test]
    fn test_noop_patch() {
        assert!(FilterPatch::new().is_noop());
        assert!(!FilterPatch::new().clear("x").is_noop());
    }
}
