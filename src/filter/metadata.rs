use serde::Serialize;

/// Position of one page within the full result set of a list query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

/// Build page metadata from the windowed row count of a list query.
///
/// An empty result yields all-zero metadata. A page past the end is reported
/// as requested, next to the real `last_page`.
pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records <= 0 {
        return Metadata::default();
    }

    let last_page = if page_size > 0 {
        (total_records as u64).div_ceil(page_size as u64) as i64
    } else {
        1
    };

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page,
        total_records,
    }
}
