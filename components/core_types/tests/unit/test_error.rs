//! Unit tests for JsError and ErrorKind

use core_types::{ErrorKind, JsError, Value};

#[cfg(test)]
mod error_kind_tests {
    use super::*;

    #[test]
    fn test_error_kind_type_error() {
        let kind = ErrorKind::TypeError;
        assert!(matches!(kind, ErrorKind::TypeError));
    }

    #[test]
    fn test_error_kind_copy() {
        let kind1 = ErrorKind::RangeError;
        let kind2 = kind1;
        assert_eq!(kind1, kind2);
    }

    #[test]
    fn test_error_kind_display_matches_constructor_name() {
        assert_eq!(ErrorKind::Error.to_string(), "Error");
        assert_eq!(ErrorKind::RangeError.to_string(), "RangeError");
        assert_eq!(ErrorKind::AggregateError.to_string(), "AggregateError");
    }
}

#[cfg(test)]
mod js_error_tests {
    use super::*;

    #[test]
    fn test_js_error_display() {
        let error = JsError::error("boom");
        assert_eq!(error.to_string(), "Error: boom");
    }

    #[test]
    fn test_js_error_is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&JsError::type_error("x"));
    }

    #[test]
    fn test_aggregate_without_reasons() {
        let error = JsError::aggregate(vec![]);
        assert_eq!(error.kind, ErrorKind::AggregateError);
        assert!(error.errors.is_empty());
        assert_eq!(error.message, "All promises were rejected");
    }

    #[test]
    fn test_aggregate_compares_reasons() {
        let a = JsError::aggregate(vec![Value::from("a")]);
        let b = JsError::aggregate(vec![Value::from("a")]);
        let c = JsError::aggregate(vec![Value::from("c")]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_js_error_into_value() {
        let value: Value = JsError::range_error("limit").into();
        let error = value.as_error().unwrap();
        assert_eq!(error.kind, ErrorKind::RangeError);
        assert_eq!(error.message, "limit");
    }
}
