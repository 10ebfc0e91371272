use serde::{Deserialize, Serialize};

use crate::data_models::LinkResult;

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub links: LinkResult,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
