use serde_json::{Map, Value as JsonValue};

use crate::{
    connection::Credentials,
    wire::{self, Entry, Request},
    Decoder, SqlGateError, Statement, Value,
};

/// Serializes a single read into the request body.
pub(crate) fn build_query_request(
    credentials: Option<&Credentials>,
    sql: &str,
    params: &[Value],
) -> Result<String, SqlGateError> {
    let entry = Entry::Query {
        query: sql.to_owned(),
        values: encode_values(params)?,
    };
    serialize(&Request {
        credentials,
        transaction: vec![entry],
    })
}

/// Serializes an ordered batch of statements into one transaction body.
pub(crate) fn build_transaction_request(
    credentials: Option<&Credentials>,
    statements: &[Statement],
) -> Result<String, SqlGateError> {
    let transaction = statements
        .iter()
        .map(|statement| {
            Ok(Entry::Statement {
                statement: statement.sql.clone(),
                values: encode_values(&statement.params)?,
            })
        })
        .collect::<Result<Vec<_>, SqlGateError>>()?;
    serialize(&Request {
        credentials,
        transaction,
    })
}

/// Decodes every row of the sole result set, keeping server order.
pub(crate) fn parse_query_response<T: 'static>(
    body: &str,
    decoder: &Decoder<T>,
) -> Result<Vec<T>, SqlGateError> {
    let response: wire::QueryResponse = parse(body)?;
    let count = response.results.len();
    let mut results = response.results.into_iter();
    let result = match (results.next(), results.next()) {
        (Some(result), None) => result,
        _ => {
            return Err(SqlGateError::Protocol(format!(
                "result count mismatch: expected 1, got {count}"
            )))
        }
    };
    if !result.success {
        return Err(SqlGateError::StatementFailed { index: 0 });
    }
    let rows = result.result_set.unwrap_or_default();
    Ok(decoder.decode_rows(&rows)?)
}

/// Extracts `rowsUpdated` for each entry, in submitted order.
pub(crate) fn parse_statement_response(body: &str) -> Result<Vec<i64>, SqlGateError> {
    let response: wire::StatementResponse = parse(body)?;
    response
        .results
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            if result.success {
                Ok(result.rows_updated)
            } else {
                Err(SqlGateError::StatementFailed { index })
            }
        })
        .collect()
}

fn encode_values(params: &[Value]) -> Result<Map<String, JsonValue>, SqlGateError> {
    let mut values = Map::new();
    for param in params {
        let name = param.placeholder()?;
        let encoded = param.payload.encode()?;
        if values.insert(name.to_owned(), encoded).is_some() {
            return Err(SqlGateError::InvalidParameter(format!(
                "parameter '{name}' is bound more than once"
            )));
        }
    }
    Ok(values)
}

fn serialize(request: &Request<'_>) -> Result<String, SqlGateError> {
    serde_json::to_string(request)
        .map_err(|err| SqlGateError::Protocol(format!("could not serialize request: {err}")))
}

fn parse<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, SqlGateError> {
    serde_json::from_str(body).map_err(|err| {
        SqlGateError::Protocol(format!("invalid response JSON: {err}; body: {body}"))
    })
}
