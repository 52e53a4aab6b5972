use serde::Serialize;
use utoipa::ToSchema;

/// Pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Total number of matches across all pages
    #[schema(example = 42)]
    pub total: i64,

    /// Current page number (1-based)
    #[schema(example = 1)]
    pub page: i64,

    #[schema(example = 10)]
    pub limit: i64,

    #[schema(example = 5)]
    pub total_pages: i64,
}

impl PageMeta {
    /// `limit` must be positive; request validation guarantees it.
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if total <= 0 || limit <= 0 {
            0
        } else {
            total / limit + i64::from(total % limit != 0)
        };

        Self {
            total,
            page,
            limit,
            total_pages,
        }
    }

    /// Rows to skip for this page, saturating for pages far past the end.
    pub fn offset(page: i64, limit: i64) -> i64 {
        (page - 1).max(0).saturating_mul(limit.max(0))
    }
}

/// A page of items with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}
