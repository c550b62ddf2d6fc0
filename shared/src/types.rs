//! Common types used across the platform

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Largest page size a caller may request
pub const MAX_PER_PAGE: u32 = 500;

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    #[serde(alias = "per_page", alias = "limit")]
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 100,
        }
    }
}

impl Pagination {
    /// Clamp to a 1-based page and a per-page size within `1..=MAX_PER_PAGE`
    pub fn normalized(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> u64 {
        let p = self.normalized();
        u64::from(p.page - 1) * u64::from(p.per_page)
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: u64) -> Self {
        let p = pagination.normalized();
        let total_pages = total_items.div_ceil(u64::from(p.per_page));
        Self {
            page: p.page,
            per_page: p.per_page,
            total_items,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }
}

/// Sort direction for listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Inclusive date range for queries and exports
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(alias = "start_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(alias = "end_date")]
    pub end_date: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| date >= start)
            && self.end_date.map_or(true, |end| date <= end)
    }
}

/// Deserializer for update fields that may be explicitly cleared.
///
/// Pair with `#[serde(default)]`: an absent field is `None`, `null` is
/// `Some(None)` and a value is `Some(Some(value))`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Apply a clearable update to the current value
pub fn apply_nullable<T>(update: Option<Option<T>>, current: Option<T>) -> Option<T> {
    match update {
        Some(value) => value,
        None => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offset() {
        let p = Pagination { page: 3, per_page: 20 };
        assert_eq!(p.offset(), 40);
        let zero = Pagination { page: 0, per_page: 0 };
        assert_eq!(zero.normalized().page, 1);
        assert_eq!(zero.normalized().per_page, 1);
        assert_eq!(zero.offset(), 0);
    }

    #[test]
    fn test_pagination_meta_rounds_up() {
        let p = Pagination { page: 1, per_page: 20 };
        assert_eq!(PaginationMeta::new(&p, 41).total_pages, 3);
        assert_eq!(PaginationMeta::new(&p, 40).total_pages, 2);
        assert_eq!(PaginationMeta::new(&p, 0).total_pages, 0);
    }

    #[test]
    fn test_per_page_is_capped() {
        let p = Pagination { page: 1, per_page: 10_000 };
        assert_eq!(p.normalized().per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let range = DateRange {
            start_date: Some(d(1)),
            end_date: Some(d(31)),
        };
        assert!(range.contains(d(1)));
        assert!(range.contains(d(31)));
        assert!(!DateRange { start_date: Some(d(2)), end_date: None }.contains(d(1)));
        assert!(DateRange::default().contains(d(15)));
    }

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        notes: Option<Option<String>>,
    }

    #[test]
    fn test_nullable_distinguishes_absent_and_null() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.notes, None);

        let cleared: Patch = serde_json::from_str(r#"{"notes": null}"#).unwrap();
        assert_eq!(cleared.notes, Some(None));

        let set: Patch = serde_json::from_str(r#"{"notes": "row 3"}"#).unwrap();
        assert_eq!(set.notes, Some(Some("row 3".to_string())));
    }

    #[test]
    fn test_apply_nullable() {
        let current = Some("old".to_string());
        assert_eq!(apply_nullable(None, current.clone()), current);
        assert_eq!(apply_nullable(Some(None), current.clone()), None);
        assert_eq!(
            apply_nullable(Some(Some("new".to_string())), current),
            Some("new".to_string())
        );
    }
}
