use axum::{
    Json,
    extract::{Query as QueryParams, State},
};
use std::sync::Arc;

use crate::data_models::Query;
use crate::error::GatewayError;
use crate::gateway::QueryGateway;

use super::models::QueryResponse;

pub async fn query_handler(
    State(gateway): State<Arc<QueryGateway>>,
    QueryParams(params): QueryParams<Vec<(String, String)>>,
) -> Result<Json<QueryResponse>, GatewayError> {
    // Decoding into pairs accepts repeated keys, so only the gateway decides the response.
    let query = Query::from_pairs(params);
    let links = gateway.handle(query.as_str()).await?;
    Ok(Json(QueryResponse { links }))
}
