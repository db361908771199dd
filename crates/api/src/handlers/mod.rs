pub mod executions;
pub mod health;
pub mod workflows;

use crate::error::AppError;

/// Validate `skip`/`limit` query values, applying `default_limit`.
pub(crate) fn pagination(
    skip: Option<i64>,
    limit: Option<i64>,
    default_limit: u32,
    max_limit: u32,
) -> Result<(u32, u32), AppError> {
    let skip = skip.unwrap_or(0);
    let limit = limit.unwrap_or(i64::from(default_limit));

    let skip = u32::try_from(skip)
        .map_err(|_| AppError::BadRequest("skip must be a non-negative integer".into()))?;
    if !(1..=i64::from(max_limit)).contains(&limit) {
        return Err(AppError::BadRequest(format!("limit must be between 1 and {max_limit}")));
    }

    Ok((skip, limit as u32))
}
