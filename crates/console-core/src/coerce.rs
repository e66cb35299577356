//! Argument coercion
//!
//! Converts raw text tokens into [`ArgValue`]s. Parsing is locale-invariant;
//! malformed input is returned as [`ConsoleError::ArgumentParseFailure`].

use crate::errors::{ConsoleError, Result};
use crate::kind::{ArgValue, ParamKind};

/// Coerce a single token into `kind`.
///
/// String kind always succeeds and returns the token unchanged.
pub fn coerce(token: &str, kind: ParamKind) -> Result<ArgValue> {
    let fail = |reason: &dyn ToString| ConsoleError::parse_failure(token, kind, reason.to_string());

    let value = match kind {
        ParamKind::String => ArgValue::Str(token.to_string()),
        ParamKind::Bool => ArgValue::Bool(parse_bool(token).ok_or_else(|| {
            fail(&"String was not recognized as a valid Boolean")
        })?),
        ParamKind::Char => ArgValue::Char(parse_char(token).ok_or_else(|| {
            fail(&"String must be exactly one character long")
        })?),
        ParamKind::I8 => ArgValue::I8(token.parse().map_err(|e| fail(&e))?),
        ParamKind::I16 => ArgValue::I16(token.parse().map_err(|e| fail(&e))?),
        ParamKind::I32 => ArgValue::I32(token.parse().map_err(|e| fail(&e))?),
        ParamKind::I64 => ArgValue::I64(token.parse().map_err(|e| fail(&e))?),
        ParamKind::U8 => ArgValue::U8(token.parse().map_err(|e| fail(&e))?),
        ParamKind::U16 => ArgValue::U16(token.parse().map_err(|e| fail(&e))?),
        ParamKind::U32 => ArgValue::U32(token.parse().map_err(|e| fail(&e))?),
        ParamKind::U64 => ArgValue::U64(token.parse().map_err(|e| fail(&e))?),
        ParamKind::F32 => ArgValue::F32(token.parse().map_err(|e| fail(&e))?),
        ParamKind::F64 => ArgValue::F64(token.parse().map_err(|e| fail(&e))?),
    };

    Ok(value)
}

/// Coerce `tokens` positionally against `kinds`.
///
/// Stops at the first failure; callers must check the lengths match first.
pub fn coerce_all<S: AsRef<str>>(tokens: &[S], kinds: &[ParamKind]) -> Result<Vec<ArgValue>> {
    tokens
        .iter()
        .zip(kinds)
        .map(|(token, kind)| coerce(token.as_ref(), *kind))
        .collect()
}

fn parse_bool(token: &str) -> Option<bool> {
    let token = token.trim();
    if token.eq_ignore_ascii_case("true") {
        Some(true)
    } else if token.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_char(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_integer_parse() {
        assert_eq!(coerce("42", ParamKind::I32).unwrap(), ArgValue::I32(42));
        assert_eq!(coerce("-7", ParamKind::I64).unwrap(), ArgValue::I64(-7));
        assert_eq!(coerce("+5", ParamKind::U16).unwrap(), ArgValue::U16(5));
    }

    #[test]
    fn test_integer_parse_failures() {
        assert_matches!(
            coerce("not_a_number", ParamKind::I32),
            Err(ConsoleError::ArgumentParseFailure { ref token, kind: ParamKind::I32, .. })
                if token == "not_a_number"
        );
        // Out of range
        assert!(coerce("256", ParamKind::U8).is_err());
        assert!(coerce("-1", ParamKind::U32).is_err());
        assert!(coerce("1.5", ParamKind::I32).is_err());
    }

    #[test]
    fn test_float_parse_is_locale_invariant() {
        assert_eq!(coerce("1.5", ParamKind::F32).unwrap(), ArgValue::F32(1.5));
        assert_eq!(coerce("-0.25", ParamKind::F64).unwrap(), ArgValue::F64(-0.25));
        assert!(coerce("1,5", ParamKind::F32).is_err());
    }

    #[test]
    fn test_bool_parse() {
        assert_eq!(coerce("true", ParamKind::Bool).unwrap(), ArgValue::Bool(true));
        assert_eq!(coerce("False", ParamKind::Bool).unwrap(), ArgValue::Bool(false));
        assert_eq!(coerce("TRUE", ParamKind::Bool).unwrap(), ArgValue::Bool(true));
        assert!(coerce("yes", ParamKind::Bool).is_err());
        assert!(coerce("1", ParamKind::Bool).is_err());
    }

    #[test]
    fn test_char_parse() {
        assert_eq!(coerce("x", ParamKind::Char).unwrap(), ArgValue::Char('x'));
        assert_eq!(coerce("é", ParamKind::Char).unwrap(), ArgValue::Char('é'));
        assert!(coerce("xy", ParamKind::Char).is_err());
        assert!(coerce("", ParamKind::Char).is_err());
    }

    #[test]
    fn test_string_is_pass_through() {
        assert_eq!(
            coerce("anything goes", ParamKind::String).unwrap(),
            ArgValue::Str("anything goes".to_string())
        );
        assert_eq!(coerce("", ParamKind::String).unwrap(), ArgValue::Str(String::new()));
    }

    #[test]
    fn test_coerce_all_stops_at_first_failure() {
        let kinds = [ParamKind::I32, ParamKind::String, ParamKind::F32];
        let values = coerce_all(&["3", "hi", "0.5"], &kinds).unwrap();
        assert_eq!(
            values,
            vec![
                ArgValue::I32(3),
                ArgValue::Str("hi".to_string()),
                ArgValue::F32(0.5)
            ]
        );

        let err = coerce_all(&["3", "hi", "half"], &kinds).unwrap_err();
        assert_matches!(err, ConsoleError::ArgumentParseFailure { kind: ParamKind::F32, .. });
    }
}
