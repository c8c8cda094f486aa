//! Turning free-form model text into a validated `RawModelQuestion`.
//!
//! The model is told to reply with bare JSON but often wraps it in prose or fences, so we
//! decode the span between the first `{` and the last `}`. The decoded object is then held
//! to the question schema; nothing is coerced, and a failure never yields a partial question.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::RawModelQuestion;

#[derive(Debug, Error)]
pub enum ParseFailure {
  #[error("could not parse JSON from model output")]
  NoJson,
  #[error("model returned invalid structure: `{field}` {reason}")]
  Invalid { field: &'static str, reason: String, parsed: Value },
}

pub fn parse_question(raw: &str) -> Result<RawModelQuestion, ParseFailure> {
  let obj = extract_object(raw).ok_or(ParseFailure::NoJson)?;
  validate(obj)
}

/// Decode the first-`{`..last-`}` span as a JSON object.
fn extract_object(raw: &str) -> Option<Map<String, Value>> {
  let start = raw.find('{')?;
  let end = raw.rfind('}')?;
  if end <= start {
    return None;
  }
  match serde_json::from_str::<Value>(&raw[start..=end]).ok()? {
    Value::Object(map) => Some(map),
    _ => None,
  }
}

fn validate(obj: Map<String, Value>) -> Result<RawModelQuestion, ParseFailure> {
  let invalid = |field: &'static str, reason: &str, obj: &Map<String, Value>| ParseFailure::Invalid {
    field,
    reason: reason.to_string(),
    parsed: Value::Object(obj.clone()),
  };

  let question = match obj.get("question") {
    Some(Value::String(q)) if !q.trim().is_empty() => q.clone(),
    Some(Value::String(_)) => return Err(invalid("question", "must not be empty", &obj)),
    Some(_) => return Err(invalid("question", "must be a string", &obj)),
    None => return Err(invalid("question", "is missing", &obj)),
  };

  let choices: [String; 4] = match obj.get("choices") {
    Some(Value::Array(items)) if items.len() == 4 => {
      let mut out: [String; 4] = Default::default();
      for (slot, item) in out.iter_mut().zip(items) {
        match item {
          Value::String(s) => *slot = s.clone(),
          _ => return Err(invalid("choices", "must contain only strings", &obj)),
        }
      }
      out
    }
    Some(Value::Array(items)) => {
      return Err(invalid("choices", &format!("must have exactly 4 entries, got {}", items.len()), &obj))
    }
    Some(_) => return Err(invalid("choices", "must be an array", &obj)),
    None => return Err(invalid("choices", "is missing", &obj)),
  };

  let answer = match obj.get("answer") {
    Some(Value::Number(n)) => match n.as_i64() {
      Some(i) if (0..=3).contains(&i) => i as usize,
      Some(i) => return Err(invalid("answer", &format!("must be in 0..=3, got {}", i), &obj)),
      None => return Err(invalid("answer", "must be an integer", &obj)),
    },
    Some(_) => return Err(invalid("answer", "must be an integer", &obj)),
    None => return Err(invalid("answer", "is missing", &obj)),
  };

  let optional_text = |key: &str| match obj.get(key) {
    Some(Value::String(s)) => Some(s.clone()),
    _ => None,
  };

  Ok(RawModelQuestion {
    question,
    choices: choices.map(|c| strip_choice_label(&c)),
    answer,
    rationale: optional_text("rationale"),
    source_span: optional_text("source_span"),
  })
}

/// Drop a leading "A)", "b.", "C:", "(d)" or "10." style label.
pub fn strip_choice_label(choice: &str) -> String {
  let cleaned = choice.trim();
  let chars: Vec<char> = cleaned.chars().collect();
  let is_sep = |c: char| matches!(c, ')' | '.' | ':');
  if chars.len() > 2 && is_sep(chars[1]) {
    chars[2..].iter().collect::<String>().trim().to_string()
  } else if chars.len() > 3 && is_sep(chars[2]) {
    chars[3..].iter().collect::<String>().trim().to_string()
  } else {
    cleaned.to_string()
  }
}
