use center_dedup_service::dto::{CenterFilters, CenterRecord};
use center_dedup_service::error::ServiceError;
use csv::Reader;

const REQUIRED_COLUMNS: &str = "id, isActive, createdAt, modifiedAt";

/// Parses a center export. Columns follow the camelCase field names of `CenterRecord`.
pub fn parse_center_file(bytes: &[u8]) -> Result<Vec<CenterRecord>, ServiceError> {
    let mut reader = Reader::from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(ServiceError::internal_server_error)?
        .clone();
    reader
        .records()
        .enumerate()
        .map(|(row, record)| match record {
            Ok(rec) => rec.deserialize(Some(&headers)).map_err(|err| {
                ServiceError::internal_server_error(format!(
                    "center export row {} must contain columns {}",
                    row + 1,
                    REQUIRED_COLUMNS
                ))
                .with_details(err)
            }),
            Err(err) => Err(ServiceError::internal_server_error(err)),
        })
        .collect()
}

#[inline]
fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

///
/// Keeps active centers matching the optional state/LGA substring filters,
/// ordered oldest first.
///
pub fn select_active_centers(
    centers: Vec<CenterRecord>,
    filters: &CenterFilters,
) -> Vec<CenterRecord> {
    let mut selected: Vec<CenterRecord> = centers
        .into_iter()
        .filter(|center| center.is_active)
        .filter(|center| contains_ignore_case(&center.state, filters.state.as_deref()))
        .filter(|center| contains_ignore_case(&center.lga, filters.lga.as_deref()))
        .collect();
    selected.sort_by_key(|center| center.created_at);
    selected
}
