//! Pagination for post listings.

use crate::error::DomainError;

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// A validated `page`/`limit` pair. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Parse raw query values. Missing values take defaults, anything that is
    /// not a positive integer is rejected, and `limit` is clamped to [`MAX_LIMIT`].
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, DomainError> {
        let page = match page {
            Some(raw) => parse_positive("page", raw)?,
            None => 1,
        };
        let limit = match limit {
            Some(raw) => parse_positive("limit", raw)?.min(MAX_LIMIT),
            None => DEFAULT_LIMIT,
        };
        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<u64, DomainError> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(DomainError::validation(format!(
            "Query parameter '{name}' must be a positive integer"
        ))),
        Ok(value) => Ok(value),
    }
}
