//! Query echo endpoint.

use std::collections::BTreeMap;

use axum::{extract::Query, Json};

/// `GET /echo?name=...&age=...` answers with the query as a JSON object.
/// Repeated keys keep their last value.
pub async fn echo(Query(params): Query<Vec<(String, String)>>) -> Json<BTreeMap<String, String>> {
    Json(params.into_iter().collect())
}
