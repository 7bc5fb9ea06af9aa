use axum::{extract::Query, routing::get, Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SumParams {
    pub a: Option<i64>,
    pub b: Option<i64>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/calc/sum", get(sum_numbers))
}

pub async fn sum_numbers(
    Query(params): Query<SumParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(a), Some(b)) = (params.a, params.b) else {
        return Err(ApiError::BadRequest(
            "Both 'a' and 'b' query params are required".into(),
        ));
    };
    let result = a
        .checked_add(b)
        .ok_or_else(|| ApiError::BadRequest("Sum is out of range".into()))?;
    Ok(Json(json!({ "result": result })))
}
