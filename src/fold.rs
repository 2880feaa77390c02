use crate::SqlGateError;

/// Requires exactly one item.
pub(crate) fn exactly_one<T>(items: Vec<T>) -> Result<T, SqlGateError> {
    let count = items.len();
    let mut items = items.into_iter();
    match (items.next(), count) {
        (Some(item), 1) => Ok(item),
        (None, _) => Err(SqlGateError::NoResult),
        (Some(_), count) => Err(SqlGateError::MultipleResults(count)),
    }
}

/// `Some` only when there is exactly one item; zero and many both give `None`.
pub(crate) fn maybe_one<T>(items: Vec<T>) -> Option<T> {
    exactly_one(items).ok()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{exactly_one, maybe_one};
    use crate::SqlGateError;

    #[test]
    fn exactly_one_returns_the_item() {
        assert_eq!(exactly_one(vec!["a"]).unwrap(), "a");
    }

    #[test]
    fn exactly_one_rejects_empty() {
        let err = exactly_one(Vec::<i32>::new()).expect_err("must fail");
        assert!(matches!(err, SqlGateError::NoResult));
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(10)]
    fn exactly_one_reports_exact_count(#[case] count: usize) {
        let err = exactly_one(vec![0; count]).expect_err("must fail");
        assert!(matches!(err, SqlGateError::MultipleResults(n) if n == count));
    }

    #[rstest]
    #[case(0, None)]
    #[case(1, Some(0))]
    #[case(2, None)]
    #[case(5, None)]
    fn maybe_one_collapses_many_into_none(#[case] count: usize, #[case] expected: Option<i32>) {
        assert_eq!(maybe_one(vec![0; count]), expected);
    }
}
