use serde::Serialize;

/// Page window arithmetic for list responses.
///
/// A zero limit yields an empty page: zero total pages and no next page,
/// whatever the total count.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PageInfo {
    pub limit: u64,
    pub offset: u64,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PageInfo {
    pub fn compute(limit: u64, offset: u64, total_count: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total_count.div_ceil(limit)
        };
        Self {
            limit,
            offset,
            total_count,
            total_pages,
            has_next_page: limit > 0 && offset + limit < total_count,
            has_previous_page: offset > 0,
        }
    }
}
