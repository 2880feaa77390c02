//! Composable row decoders.
//!
//! A [`Decoder<T>`] is a pure description of how to pull a `T` out of one
//! result row. Decoders are built from named fields ([`field`], [`int`],
//! [`string`], ...) and combined with [`Decoder::map`], [`Decoder::and_then`]
//! and the fixed-arity helpers [`get2`] through [`get8`].
//!
//! ```
//! use sqlgate_http::decoder::{self, Decoder};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! let users: Decoder<User> =
//!     decoder::get2(decoder::int("id"), decoder::string("name"), |id, name| User { id, name });
//!
//! let row = serde_json::json!({ "name": "Kit", "id": 1 });
//! let row = row.as_object().unwrap();
//! assert_eq!(
//!     users.decode_row(row).unwrap(),
//!     User { id: 1, name: "Kit".to_owned() }
//! );
//! ```

use std::{fmt, sync::Arc};

use serde_json::{Map, Value as JsonValue};

use crate::DecodeError;

/// One JSON object returned by the gateway for one result tuple.
pub type Row = Map<String, JsonValue>;

/// Scalar decoding rule applied to the value of one field.
pub struct Primitive<T> {
    decode: Arc<dyn Fn(&JsonValue) -> Result<T, String> + Send + Sync>,
}

impl<T> Clone for Primitive<T> {
    fn clone(&self) -> Self {
        Self {
            decode: Arc::clone(&self.decode),
        }
    }
}

impl<T> fmt::Debug for Primitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Primitive")
    }
}

impl<T: 'static> Primitive<T> {
    /// Wraps a custom scalar rule. The error string becomes the decode message.
    pub fn new<F>(decode: F) -> Self
    where
        F: Fn(&JsonValue) -> Result<T, String> + Send + Sync + 'static,
    {
        Self {
            decode: Arc::new(decode),
        }
    }
}

impl<T> Primitive<T> {
    pub fn decode(&self, value: &JsonValue) -> Result<T, String> {
        (self.decode)(value)
    }
}

/// Built-in scalar kinds.
pub mod kind {
    use chrono::{DateTime, Utc};
    use serde_json::Value as JsonValue;

    use super::Primitive;

    pub fn int() -> Primitive<i64> {
        Primitive::new(|value| match value {
            JsonValue::Number(number) => number
                .as_i64()
                .ok_or_else(|| format!("expected integer, got {number}")),
            other => Err(format!("expected integer, got {}", json_type(other))),
        })
    }

    /// Accepts any JSON number, integers included.
    pub fn float() -> Primitive<f64> {
        Primitive::new(|value| match value {
            JsonValue::Number(number) => number
                .as_f64()
                .ok_or_else(|| format!("expected float, got {number}")),
            other => Err(format!("expected float, got {}", json_type(other))),
        })
    }

    pub fn string() -> Primitive<String> {
        Primitive::new(|value| match value {
            JsonValue::String(text) => Ok(text.clone()),
            other => Err(format!("expected string, got {}", json_type(other))),
        })
    }

    /// Booleans arrive either as `0`/`1` or as `"FALSE"`/`"TRUE"`.
    pub fn bool() -> Primitive<bool> {
        Primitive::new(|value| match value {
            JsonValue::Number(number) => match number.as_i64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                Some(_) => Err("unexpected integer in boolean field".to_owned()),
                None if number.is_u64() => Err("unexpected integer in boolean field".to_owned()),
                None => Err(format!("expected boolean, got {number}")),
            },
            JsonValue::String(text) => match text.as_str() {
                "TRUE" => Ok(true),
                "FALSE" => Ok(false),
                _ => Err("unexpected string in boolean field".to_owned()),
            },
            other => Err(format!("expected boolean, got {}", json_type(other))),
        })
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp() -> Primitive<DateTime<Utc>> {
        Primitive::new(|value| match value {
            JsonValue::Number(number) => {
                let millis = number
                    .as_i64()
                    .ok_or_else(|| format!("expected timestamp millis, got {number}"))?;
                DateTime::from_timestamp_millis(millis)
                    .ok_or_else(|| format!("timestamp {millis} is out of range"))
            }
            other => Err(format!("expected timestamp millis, got {}", json_type(other))),
        })
    }

    /// JSON `null` decodes to `None`; anything else goes through `inner`.
    pub fn nullable<T: 'static>(inner: Primitive<T>) -> Primitive<Option<T>> {
        Primitive::new(move |value| match value {
            JsonValue::Null => Ok(None),
            other => inner.decode(other).map(Some),
        })
    }

    /// Raw field value, unchecked.
    pub fn json() -> Primitive<JsonValue> {
        Primitive::new(|value| Ok(value.clone()))
    }

    fn json_type(value: &JsonValue) -> &'static str {
        match value {
            JsonValue::Null => "null",
            JsonValue::Bool(_) => "boolean",
            JsonValue::Number(_) => "number",
            JsonValue::String(_) => "string",
            JsonValue::Array(_) => "array",
            JsonValue::Object(_) => "object",
        }
    }
}

/// Description of how to extract a `T` from one [`Row`].
pub struct Decoder<T>(Node<T>);

enum Node<T> {
    Field { name: Arc<str>, kind: Primitive<T> },
    Pure(Arc<dyn Fn() -> T + Send + Sync>),
    Fail(Arc<str>),
    Map(Arc<dyn Step<T>>),
    AndThen(Arc<dyn Step<T>>),
}

// Hides the intermediate type of `Map` and `AndThen` nodes.
trait Step<T>: Send + Sync {
    fn run(&self, row: &Row) -> Result<T, DecodeError>;
}

struct MapStep<A, T> {
    inner: Decoder<A>,
    f: Arc<dyn Fn(A) -> T + Send + Sync>,
}

impl<A, T> Step<T> for MapStep<A, T> {
    fn run(&self, row: &Row) -> Result<T, DecodeError> {
        evaluate(&self.inner, row).map(|value| (self.f)(value))
    }
}

struct AndThenStep<A, T> {
    inner: Decoder<A>,
    f: Arc<dyn Fn(A) -> Decoder<T> + Send + Sync>,
}

impl<A, T> Step<T> for AndThenStep<A, T> {
    fn run(&self, row: &Row) -> Result<T, DecodeError> {
        let value = evaluate(&self.inner, row)?;
        evaluate(&(self.f)(value), row)
    }
}

fn evaluate<T>(decoder: &Decoder<T>, row: &Row) -> Result<T, DecodeError> {
    match &decoder.0 {
        Node::Field { name, kind } => {
            let value = row
                .get(&**name)
                .ok_or_else(|| DecodeError::new(format!("missing field `{name}`")))?;
            kind.decode(value)
                .map_err(|message| DecodeError::new(format!("field `{name}`: {message}")))
        }
        Node::Pure(value) => Ok(value()),
        Node::Fail(message) => Err(DecodeError::new(&**message)),
        Node::Map(step) | Node::AndThen(step) => step.run(row),
    }
}

impl<T> Clone for Decoder<T> {
    fn clone(&self) -> Self {
        Self(match &self.0 {
            Node::Field { name, kind } => Node::Field {
                name: Arc::clone(name),
                kind: kind.clone(),
            },
            Node::Pure(value) => Node::Pure(Arc::clone(value)),
            Node::Fail(message) => Node::Fail(Arc::clone(message)),
            Node::Map(step) => Node::Map(Arc::clone(step)),
            Node::AndThen(step) => Node::AndThen(Arc::clone(step)),
        })
    }
}

impl<T> fmt::Debug for Decoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Node::Field { name, .. } => f.debug_tuple("Field").field(&&**name).finish(),
            Node::Pure(_) => f.write_str("Pure"),
            Node::Fail(message) => f.debug_tuple("Fail").field(&&**message).finish(),
            Node::Map(_) => f.write_str("Map"),
            Node::AndThen(_) => f.write_str("AndThen"),
        }
    }
}

impl<T: 'static> Decoder<T> {
    /// Reads field `name` and decodes it with `kind`.
    pub fn field(name: impl Into<String>, kind: Primitive<T>) -> Self {
        let name: String = name.into();
        Self(Node::Field {
            name: Arc::from(name),
            kind,
        })
    }

    /// Ignores the row and yields `value`.
    pub fn succeed(value: T) -> Self
    where
        T: Clone + Send + Sync,
    {
        Self(Node::Pure(Arc::new(move || value.clone())))
    }

    /// Always fails with `message`.
    pub fn fail(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self(Node::Fail(Arc::from(message)))
    }

    pub fn map<B, F>(self, f: F) -> Decoder<B>
    where
        B: 'static,
        F: Fn(T) -> B + Send + Sync + 'static,
    {
        Decoder(Node::Map(Arc::new(MapStep {
            inner: self,
            f: Arc::new(f),
        })))
    }

    /// Picks the next decoder from the value decoded so far.
    ///
    /// Returning [`Decoder::fail`] rejects the row, which is how decode-time
    /// validation is expressed.
    pub fn and_then<B, F>(self, f: F) -> Decoder<B>
    where
        B: 'static,
        F: Fn(T) -> Decoder<B> + Send + Sync + 'static,
    {
        Decoder(Node::AndThen(Arc::new(AndThenStep {
            inner: self,
            f: Arc::new(f),
        })))
    }

    pub fn decode_row(&self, row: &Row) -> Result<T, DecodeError> {
        evaluate(self, row)
    }

    /// Decodes every row in order; the first failure is tagged with its row index.
    pub fn decode_rows(&self, rows: &[Row]) -> Result<Vec<T>, DecodeError> {
        rows.iter()
            .enumerate()
            .map(|(index, row)| evaluate(self, row).map_err(|err| err.at_row(index)))
            .collect()
    }
}

pub fn field<T: 'static>(name: impl Into<String>, kind: Primitive<T>) -> Decoder<T> {
    Decoder::field(name, kind)
}

pub fn int(name: impl Into<String>) -> Decoder<i64> {
    Decoder::field(name, kind::int())
}

pub fn float(name: impl Into<String>) -> Decoder<f64> {
    Decoder::field(name, kind::float())
}

pub fn string(name: impl Into<String>) -> Decoder<String> {
    Decoder::field(name, kind::string())
}

pub fn bool(name: impl Into<String>) -> Decoder<bool> {
    Decoder::field(name, kind::bool())
}

pub fn timestamp(name: impl Into<String>) -> Decoder<chrono::DateTime<chrono::Utc>> {
    Decoder::field(name, kind::timestamp())
}

pub fn nullable<T: 'static>(name: impl Into<String>, inner: Primitive<T>) -> Decoder<Option<T>> {
    Decoder::field(name, kind::nullable(inner))
}

pub fn json(name: impl Into<String>) -> Decoder<JsonValue> {
    Decoder::field(name, kind::json())
}

/// Decodes `a` then `b` from the same row and combines them with `f`.
pub fn get2<A, B, R, F>(a: Decoder<A>, b: Decoder<B>, f: F) -> Decoder<R>
where
    A: Clone + Send + Sync + 'static,
    B: 'static,
    R: 'static,
    F: Fn(A, B) -> R + Send + Sync + 'static,
{
    let f = Arc::new(f);
    a.and_then(move |a| {
        let f = Arc::clone(&f);
        b.clone().map(move |b| f(a.clone(), b))
    })
}

pub fn get3<A, B, C, R, F>(a: Decoder<A>, b: Decoder<B>, c: Decoder<C>, f: F) -> Decoder<R>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: 'static,
    R: 'static,
    F: Fn(A, B, C) -> R + Send + Sync + 'static,
{
    get2(get2(a, b, |a, b| (a, b)), c, move |(a, b), c| f(a, b, c))
}

pub fn get4<A, B, C, D, R, F>(
    a: Decoder<A>,
    b: Decoder<B>,
    c: Decoder<C>,
    d: Decoder<D>,
    f: F,
) -> Decoder<R>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    D: 'static,
    R: 'static,
    F: Fn(A, B, C, D) -> R + Send + Sync + 'static,
{
    get2(
        get3(a, b, c, |a, b, c| (a, b, c)),
        d,
        move |(a, b, c), d| f(a, b, c, d),
    )
}

pub fn get5<A, B, C, D, E, R, F>(
    a: Decoder<A>,
    b: Decoder<B>,
    c: Decoder<C>,
    d: Decoder<D>,
    e: Decoder<E>,
    f: F,
) -> Decoder<R>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
    E: 'static,
    R: 'static,
    F: Fn(A, B, C, D, E) -> R + Send + Sync + 'static,
{
    get2(
        get4(a, b, c, d, |a, b, c, d| (a, b, c, d)),
        e,
        move |(a, b, c, d), e| f(a, b, c, d, e),
    )
}

pub fn get6<A, B, C, D, E, G, R, F>(
    a: Decoder<A>,
    b: Decoder<B>,
    c: Decoder<C>,
    d: Decoder<D>,
    e: Decoder<E>,
    g: Decoder<G>,
    f: F,
) -> Decoder<R>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    G: 'static,
    R: 'static,
    F: Fn(A, B, C, D, E, G) -> R + Send + Sync + 'static,
{
    get2(
        get5(a, b, c, d, e, |a, b, c, d, e| (a, b, c, d, e)),
        g,
        move |(a, b, c, d, e), g| f(a, b, c, d, e, g),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn get7<A, B, C, D, E, G, H, R, F>(
    a: Decoder<A>,
    b: Decoder<B>,
    c: Decoder<C>,
    d: Decoder<D>,
    e: Decoder<E>,
    g: Decoder<G>,
    h: Decoder<H>,
    f: F,
) -> Decoder<R>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    G: Clone + Send + Sync + 'static,
    H: 'static,
    R: 'static,
    F: Fn(A, B, C, D, E, G, H) -> R + Send + Sync + 'static,
{
    get2(
        get6(a, b, c, d, e, g, |a, b, c, d, e, g| (a, b, c, d, e, g)),
        h,
        move |(a, b, c, d, e, g), h| f(a, b, c, d, e, g, h),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn get8<A, B, C, D, E, G, H, I, R, F>(
    a: Decoder<A>,
    b: Decoder<B>,
    c: Decoder<C>,
    d: Decoder<D>,
    e: Decoder<E>,
    g: Decoder<G>,
    h: Decoder<H>,
    i: Decoder<I>,
    f: F,
) -> Decoder<R>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    G: Clone + Send + Sync + 'static,
    H: Clone + Send + Sync + 'static,
    I: 'static,
    R: 'static,
    F: Fn(A, B, C, D, E, G, H, I) -> R + Send + Sync + 'static,
{
    get2(
        get7(a, b, c, d, e, g, h, |a, b, c, d, e, g, h| {
            (a, b, c, d, e, g, h)
        }),
        i,
        move |(a, b, c, d, e, g, h), i| f(a, b, c, d, e, g, h, i),
    )
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use rstest::rstest;
    use serde_json::{json, Value as JsonValue};

    use super::{kind, Decoder, Row};
    use crate::decoder;

    fn row(value: JsonValue) -> Row {
        match value {
            JsonValue::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[rstest]
    #[case(json!(0), false)]
    #[case(json!(1), true)]
    #[case(json!("TRUE"), true)]
    #[case(json!("FALSE"), false)]
    fn bool_accepts_integer_and_string_forms(#[case] input: JsonValue, #[case] expected: bool) {
        assert_eq!(kind::bool().decode(&input), Ok(expected));
    }

    #[rstest]
    #[case(json!(2), "unexpected integer in boolean field")]
    #[case(json!(-1), "unexpected integer in boolean field")]
    #[case(json!(u64::MAX), "unexpected integer in boolean field")]
    #[case(json!(1.0), "expected boolean, got 1.0")]
    #[case(json!("maybe"), "unexpected string in boolean field")]
    #[case(json!(true), "expected boolean, got boolean")]
    fn bool_rejects_other_values(#[case] input: JsonValue, #[case] message: &str) {
        assert_eq!(kind::bool().decode(&input), Err(message.to_owned()));
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = decoder::int("id").decode_row(&row(json!({}))).expect_err("must fail");
        assert_eq!(err.message(), "missing field `id`");
    }

    #[test]
    fn wrong_shape_uses_kind_message() {
        let err = decoder::bool("active")
            .decode_row(&row(json!({ "active": 7 })))
            .expect_err("must fail");
        assert_eq!(
            err.message(),
            "field `active`: unexpected integer in boolean field"
        );
    }

    #[test]
    fn float_accepts_integers() {
        let value = decoder::float("x").decode_row(&row(json!({ "x": 3 })));
        assert_eq!(value, Ok(3.0));
    }

    #[test]
    fn nullable_maps_null_to_none() {
        let name = decoder::nullable("name", kind::string());
        assert_eq!(name.decode_row(&row(json!({ "name": null }))), Ok(None));
        assert_eq!(
            name.decode_row(&row(json!({ "name": "Kit" }))),
            Ok(Some("Kit".to_owned()))
        );
        assert!(name.decode_row(&row(json!({ "name": 5 }))).is_err());
    }

    #[test]
    fn timestamp_decodes_epoch_millis() {
        let at = decoder::timestamp("at")
            .decode_row(&row(json!({ "at": 123 })))
            .expect("must decode");
        assert_eq!(at, DateTime::from_timestamp_millis(123).unwrap());
        assert_eq!(at.timestamp_millis(), 123);
    }

    #[test]
    fn get_n_is_independent_of_key_order() {
        let decoder = decoder::get3(
            decoder::int("id"),
            decoder::string("name"),
            decoder::bool("active"),
            |id, name, active| (id, name, active),
        );
        let a = row(json!({ "id": 1, "name": "Kit", "active": 1 }));
        let b = row(json!({ "active": "TRUE", "name": "Kit", "id": 1 }));
        assert_eq!(decoder.decode_row(&a), decoder.decode_row(&b));
        assert_eq!(decoder.decode_row(&a), Ok((1, "Kit".to_owned(), true)));
    }

    #[test]
    fn get_n_short_circuits_on_first_failure() {
        let decoder = decoder::get2(decoder::int("a"), decoder::int("b"), |a, b| a + b);
        let err = decoder
            .decode_row(&row(json!({ "a": "x", "b": "y" })))
            .expect_err("must fail");
        assert!(err.message().starts_with("field `a`"));
    }

    #[test]
    fn get8_applies_all_fields_in_order() {
        let decoder = decoder::get8(
            decoder::int("a"),
            decoder::int("b"),
            decoder::int("c"),
            decoder::int("d"),
            decoder::int("e"),
            decoder::int("f"),
            decoder::int("g"),
            decoder::int("h"),
            |a, b, c, d, e, f, g, h| vec![a, b, c, d, e, f, g, h],
        );
        let value = decoder
            .decode_row(&row(json!({
                "h": 8, "g": 7, "f": 6, "e": 5, "d": 4, "c": 3, "b": 2, "a": 1
            })))
            .expect("must decode");
        assert_eq!(value, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn and_then_can_reject_rows() {
        let positive = decoder::int("qty").and_then(|qty| {
            if qty > 0 {
                Decoder::succeed(qty)
            } else {
                Decoder::fail(format!("quantity must be positive, got {qty}"))
            }
        });
        assert_eq!(positive.decode_row(&row(json!({ "qty": 2 }))), Ok(2));
        let err = positive
            .decode_row(&row(json!({ "qty": 0 })))
            .expect_err("must fail");
        assert_eq!(err.message(), "quantity must be positive, got 0");
    }

    #[test]
    fn succeed_ignores_the_row() {
        let decoder = Decoder::succeed("fixed".to_owned());
        assert_eq!(decoder.decode_row(&Row::new()), Ok("fixed".to_owned()));
    }

    #[test]
    fn evaluation_is_repeatable() {
        let decoder = decoder::int("n").map(|n| n * 2);
        let input = row(json!({ "n": 21 }));
        assert_eq!(decoder.decode_row(&input), decoder.decode_row(&input));
        assert_eq!(decoder.decode_row(&input), Ok(42));
    }

    #[test]
    fn decode_rows_tags_failing_row() {
        let rows = vec![row(json!({ "n": 1 })), row(json!({ "n": "two" }))];
        let err = decoder::int("n").decode_rows(&rows).expect_err("must fail");
        assert_eq!(err.row(), Some(1));
    }
}
