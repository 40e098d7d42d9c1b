use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Raw query string of the paginated listing. Values are parsed by hand so a bad
/// number produces the JSON failure envelope rather than a plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub nama_usaha: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
    pub business_filter: Option<String>,
}

impl TryFrom<PageParams> for PageRequest {
    type Error = AppError;

    fn try_from(params: PageParams) -> Result<Self> {
        let limit = parse_param("limit", params.limit, DEFAULT_PAGE_LIMIT)?;
        let offset = parse_param("offset", params.offset, 0)?;

        if limit < 1 {
            return Err(AppError::Validation("limit must be at least 1".into()));
        }
        if offset < 0 {
            return Err(AppError::Validation("offset must not be negative".into()));
        }

        let business_filter = params
            .nama_usaha
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            limit,
            offset,
            business_filter,
        })
    }
}

fn parse_param(name: &str, raw: Option<String>, default: i64) -> Result<i64> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| AppError::Validation(format!("{name} must be an integer"))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(limit: i64, offset: i64, total: i64) -> Self {
        Self {
            limit,
            offset,
            total,
            has_more: offset.saturating_add(limit) < total,
        }
    }
}
