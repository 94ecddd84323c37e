use crate::error::{CatalogError, CatalogResult};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Offset pagination over a sorted result. Both fields are always >= 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT }
    }
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> CatalogResult<Self> {
        if page < 1 {
            return Err(CatalogError::invalid(format!("page must be >= 1, got {page}")));
        }
        if limit < 1 {
            return Err(CatalogError::invalid(format!("limit must be >= 1, got {limit}")));
        }
        // OFFSET is bound as a signed 64-bit integer.
        (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| CatalogError::invalid("page * limit overflows"))?;
        Ok(Self { page: page as u64, limit: limit as u64 })
    }

    /// Parses raw query-string values; absent values take the defaults.
    pub fn parse(page: Option<&str>, limit: Option<&str>, default_limit: u64) -> CatalogResult<Self> {
        let page = match page {
            Some(raw) => parse_int("page", raw)?,
            None => DEFAULT_PAGE as i64,
        };
        let limit = match limit {
            Some(raw) => parse_int("limit", raw)?,
            None => i64::try_from(default_limit.max(1)).unwrap_or(i64::MAX),
        };
        Self::new(page, limit)
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

/// Parses a non-negative record offset such as the message feed's `skip`.
pub fn parse_offset(raw: Option<&str>) -> CatalogResult<u64> {
    match raw {
        None => Ok(0),
        Some(raw) => {
            let value = parse_int("skip", raw)?;
            u64::try_from(value)
                .map_err(|_| CatalogError::invalid(format!("skip must be >= 0, got {value}")))
        },
    }
}

fn parse_int(field: &str, raw: &str) -> CatalogResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| CatalogError::invalid(format!("{field} must be an integer, got {raw:?}")))
}
