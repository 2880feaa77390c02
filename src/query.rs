use crate::{Decoder, Value};

/// Parameterized read paired with the decoder applied to each returned row.
#[derive(Clone, Debug)]
pub struct Query<T> {
    /// SQL text with `:name` placeholders.
    pub sql: String,
    /// Values bound to the placeholders.
    pub params: Vec<Value>,
    /// Row decoder.
    pub decoder: Decoder<T>,
}

impl<T> Query<T> {
    pub fn new<P>(sql: impl Into<String>, params: P, decoder: Decoder<T>) -> Self
    where
        P: IntoIterator<Item = Value>,
    {
        Self {
            sql: sql.into(),
            params: params.into_iter().collect(),
            decoder,
        }
    }
}

/// Parameterized write or DDL statement; yields an affected-row count.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    /// SQL text with `:name` placeholders.
    pub sql: String,
    /// Values bound to the placeholders.
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new<P>(sql: impl Into<String>, params: P) -> Self
    where
        P: IntoIterator<Item = Value>,
    {
        Self {
            sql: sql.into(),
            params: params.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{decoder, Query, Statement, Value};

    #[test]
    fn statement_collects_params_in_order() {
        let statement = Statement::new(
            "INSERT INTO users (id, name) VALUES (:id, :name)",
            [Value::int("id", 1), Value::string("name", "Kit")],
        );
        assert_eq!(statement.params.len(), 2);
        assert_eq!(statement.params[0].key, "id");
        assert_eq!(statement.params[1].key, "name");
    }

    #[test]
    fn query_accepts_empty_params() {
        let query = Query::new("SELECT 1 AS one", Vec::new(), decoder::int("one"));
        assert!(query.params.is_empty());
        assert_eq!(query.sql, "SELECT 1 AS one");
    }
}
