/// List-query building shared by the task and user collections
///
/// Every list endpoint goes through the same steps: reject query keys
/// outside the resource's allow-list, drop empty values, parse page/limit
/// with defaults, and compute the page window. The count query and the page
/// query for a listing are always built from the same filter fragment, so
/// `total_pages` and the returned slice agree on the predicate.
///
/// # Example
///
/// ```
/// use taskboard_shared::query::{PageParams, RawParams};
/// use std::collections::HashMap;
///
/// let mut raw = HashMap::new();
/// raw.insert("page".to_string(), "3".to_string());
///
/// let params = RawParams::new(&raw, &["page", "limit"]).unwrap();
/// let page = PageParams::from_params(&params).unwrap();
/// assert_eq!(page.page, 3);
/// assert_eq!(page.limit, 10);
/// assert_eq!(page.offset(), 20);
/// ```

use serde::Serialize;
use std::collections::HashMap;

/// Default page number when the parameter is absent
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size when the parameter is absent
pub const DEFAULT_LIMIT: i64 = 10;

/// Error type for list-parameter parsing
///
/// Each variant renders the exact message surfaced to the caller; the
/// offending key or field is always named.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// A query key outside the resource's allow-list
    #[error("Query key [{0}] is not allowed")]
    UnknownKey(String),

    /// A page/limit value that is not a positive integer
    #[error("{field} value must be a number larger than 0")]
    NotPositive { field: &'static str },

    /// An enum-valued parameter outside its allow-list
    #[error("{field} value must belong to one of these values: [{allowed}].")]
    NotInAllowList {
        field: &'static str,
        allowed: &'static str,
    },
}

/// Raw query parameters, checked against a resource allow-list
///
/// Construction fails on the first unrecognized key, before anything is
/// parsed or any query runs. Empty-string values are treated as absent.
#[derive(Debug, Clone, Copy)]
pub struct RawParams<'a> {
    map: &'a HashMap<String, String>,
}

impl<'a> RawParams<'a> {
    /// Checks every key against the allow-list
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownKey`] naming the first key outside the
    /// allow-list.
    pub fn new(
        map: &'a HashMap<String, String>,
        allowed: &[&str],
    ) -> Result<Self, QueryError> {
        for key in map.keys() {
            if !allowed.contains(&key.as_str()) {
                return Err(QueryError::UnknownKey(key.clone()));
            }
        }
        Ok(Self { map })
    }

    /// Gets a parameter value, treating empty strings as absent
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.map
            .get(key)
            .map(|value| value.as_str())
            .filter(|value| !value.is_empty())
    }

    /// Parses a positive-integer parameter
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotPositive`] when the value is present but is
    /// not an integer >= 1.
    pub fn positive(
        &self,
        key: &str,
        field: &'static str,
    ) -> Result<Option<i64>, QueryError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => match raw.parse::<i64>() {
                Ok(value) if value >= 1 => Ok(Some(value)),
                _ => Err(QueryError::NotPositive { field }),
            },
        }
    }
}

/// Pagination window for a list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// 1-based page number
    pub page: i64,

    /// Maximum items per page
    pub limit: i64,
}

impl PageParams {
    /// Parses `page` and `limit` with defaults 1 and 10
    pub fn from_params(params: &RawParams<'_>) -> Result<Self, QueryError> {
        let page = params.positive("page", "Page")?.unwrap_or(DEFAULT_PAGE);
        let limit = params.positive("limit", "Limit")?.unwrap_or(DEFAULT_LIMIT);
        Ok(Self { page, limit })
    }

    /// Number of rows to skip: `limit * (page - 1)`
    pub fn offset(&self) -> i64 {
        self.limit * (self.page - 1)
    }

    /// Total page count for a matching-row count: `ceil(matching / limit)`
    pub fn total_pages(&self, matching: i64) -> i64 {
        (matching + self.limit - 1) / self.limit
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Sort direction for an ordered listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending
    Asc,

    /// Descending (the default everywhere)
    #[default]
    Desc,
}

impl SortOrder {
    /// Parses an `order_by` value
    ///
    /// The direction only has meaning alongside a sort field; an absent or
    /// unrecognized value falls back to descending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    /// SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// One page of a filtered listing
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// The `[offset, offset + limit)` slice of the matching rows
    pub items: Vec<T>,

    /// The requested 1-based page number
    pub page: i64,

    /// Total page count for the same filter predicate
    pub total_pages: i64,
}

/// Normalizes a free-text search value: trim, then lowercase
///
/// Tokenization and matching are delegated to the database's full-text
/// index.
pub fn normalize_search(raw: &str) -> String {
    raw.trim().to_lowercase()
}
