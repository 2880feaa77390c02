use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::connection::Credentials;

#[derive(Debug, Serialize)]
pub struct Request<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<&'a Credentials>,
    pub transaction: Vec<Entry>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Entry {
    Query {
        query: String,
        values: Map<String, JsonValue>,
    },
    Statement {
        statement: String,
        values: Map<String, JsonValue>,
    },
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
pub struct QueryResult {
    #[serde(default = "succeeded")]
    pub success: bool,
    #[serde(rename = "resultSet", default)]
    pub result_set: Option<Vec<Map<String, JsonValue>>>,
}

#[derive(Debug, Deserialize)]
pub struct StatementResponse {
    pub results: Vec<StatementResult>,
}

#[derive(Debug, Deserialize)]
pub struct StatementResult {
    #[serde(default = "succeeded")]
    pub success: bool,
    #[serde(rename = "rowsUpdated", default)]
    pub rows_updated: i64,
}

fn succeeded() -> bool {
    true
}
