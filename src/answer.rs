//! Stateless answer checking.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnswerError {
  #[error("expected (answer) and selected required")]
  Missing,
  #[error("answer and selected must be integers")]
  NotInteger,
}

#[derive(Debug, PartialEq, Eq)]
pub struct AnswerCheck {
  pub is_correct: bool,
  pub expected: i64,
  pub selected: i64,
}

pub fn check_answer(expected: Option<&Value>, selected: Option<&Value>) -> Result<AnswerCheck, AnswerError> {
  let (expected, selected) = match (present(expected), present(selected)) {
    (Some(e), Some(s)) => (e, s),
    _ => return Err(AnswerError::Missing),
  };
  let expected = coerce_index(expected).ok_or(AnswerError::NotInteger)?;
  let selected = coerce_index(selected).ok_or(AnswerError::NotInteger)?;
  Ok(AnswerCheck { is_correct: expected == selected, expected, selected })
}

fn present(v: Option<&Value>) -> Option<&Value> {
  v.filter(|v| !v.is_null())
}

/// JSON integers, finite floats (truncated toward zero) and integer strings.
/// Anything outside the i64 range is rejected rather than saturated.
fn coerce_index(v: &Value) -> Option<i64> {
  match v {
    Value::Number(n) if n.is_u64() => n.as_u64().and_then(|u| i64::try_from(u).ok()),
    Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(float_index)),
    Value::String(s) => s.trim().parse::<i64>().ok(),
    _ => None,
  }
}

// i64::MIN and i64::MAX + 1 are both exact in f64.
fn float_index(f: f64) -> Option<i64> {
  (f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64).then(|| f.trunc() as i64)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn check(expected: Value, selected: Value) -> Result<AnswerCheck, AnswerError> {
    check_answer(Some(&expected), Some(&selected))
  }

  #[test]
  fn string_selection_matches_integer_answer() {
    assert_eq!(check(json!(2), json!("2")), Ok(AnswerCheck { is_correct: true, expected: 2, selected: 2 }));
  }

  #[test]
  fn different_index_is_incorrect() {
    assert_eq!(check(json!(2), json!(1)), Ok(AnswerCheck { is_correct: false, expected: 2, selected: 1 }));
  }

  #[test]
  fn floats_truncate_and_padded_strings_parse() {
    assert_eq!(check(json!(1.9), json!(" 1 ")).map(|c| c.is_correct), Ok(true));
  }

  #[test]
  fn absent_or_null_inputs_are_missing() {
    assert_eq!(check_answer(None, Some(&json!(1))), Err(AnswerError::Missing));
    assert_eq!(check_answer(Some(&json!(1)), Some(&Value::Null)), Err(AnswerError::Missing));
  }

  #[test]
  fn non_integer_inputs_are_rejected() {
    for bad in [json!("two"), json!("1.5"), json!(true), json!([1]), json!({"i": 1})] {
      assert_eq!(check(json!(1), bad.clone()), Err(AnswerError::NotInteger), "{bad}");
    }
  }

  #[test]
  fn out_of_range_numbers_are_rejected_not_clamped() {
    assert_eq!(check(json!(i64::MAX), json!(1e19)), Err(AnswerError::NotInteger));
    assert_eq!(check(json!(u64::MAX), json!(i64::MAX)), Err(AnswerError::NotInteger));
    assert_eq!(check(json!(-1e19), json!(i64::MIN)), Err(AnswerError::NotInteger));
    assert_eq!(check(json!(i64::MAX), json!(i64::MAX)).map(|c| c.is_correct), Ok(true));
    assert_eq!(check(json!(3), json!(3u64)).map(|c| c.selected), Ok(3));
  }
}
