//! Listing parameters

use serde::Deserialize;

use crate::feature::{FeatureError, FeatureResult};
use crate::store::ListQuery;

/// Page size when none is requested
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Largest page size accepted unless configured otherwise
pub const DEFAULT_MAX_LIST_LIMIT: usize = 1000;

/// Filter and page for a listing
///
/// `skip` is the external name of the offset; `offset` is accepted too,
/// but not both at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub skip: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ListParams {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Apply defaults and reject a limit above `max_limit`
    ///
    /// A blank name filter is the same as no filter.
    pub fn resolve(&self, max_limit: usize) -> FeatureResult<ListQuery> {
        let limit = self.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        if limit > max_limit {
            return Err(FeatureError::LimitExceeded(limit, max_limit));
        }

        let offset = match (self.skip, self.offset) {
            (Some(_), Some(_)) => {
                return Err(FeatureError::invalid_field(
                    "offset",
                    "give either skip or offset, not both",
                ))
            }
            (skip, offset) => skip.or(offset).unwrap_or(0),
        };

        let name_contains = self
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .map(str::to_string);

        Ok(ListQuery {
            name_contains,
            offset,
            limit,
        })
    }
}
