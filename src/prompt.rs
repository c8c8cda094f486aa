//! Authoring prompt assembly. Pure: same window + difficulty always yields the same text.

use crate::config::Prompts;
use crate::domain::{Difficulty, PassageWindow};
use crate::util::fill_template;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptPair {
  pub system: String,
  pub user: String,
}

/// System/user messages asking for one JSON-encoded question about `window`.
pub fn build_author_prompt(prompts: &Prompts, window: &PassageWindow, difficulty: Difficulty) -> PromptPair {
  // Passage goes last so braces inside the corpus are never treated as placeholders.
  let user = fill_template(
    &prompts.author_user_template,
    &[("difficulty_hint", prompts.difficulty_hint(difficulty)), ("passage", &window.text)],
  );
  PromptPair { system: prompts.author_system.clone(), user }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn window(text: &str) -> PassageWindow {
    PassageWindow { text: text.into(), offset: 0, source_len: text.chars().count() }
  }

  #[test]
  fn embeds_passage_verbatim_between_fences() {
    let p = build_author_prompt(&Prompts::default(), &window("Neurons fire {sometimes}."), Difficulty::Medium);
    assert!(p.user.contains("```\nNeurons fire {sometimes}.\n```"));
    assert!(p.user.contains("ONLY ON THE INFORMATION IN THE PASSAGE"));
  }

  #[test]
  fn system_message_demands_single_json_object_with_four_choices() {
    let p = build_author_prompt(&Prompts::default(), &window("x"), Difficulty::Easy);
    assert!(p.system.contains("single JSON object"));
    assert!(p.system.contains("exactly FOUR"));
    assert!(p.system.contains("up to 200 chars"));
  }

  #[test]
  fn appends_guidance_for_each_difficulty() {
    let prompts = Prompts::default();
    let w = window("passage");
    let easy = build_author_prompt(&prompts, &w, Difficulty::Easy);
    let medium = build_author_prompt(&prompts, &w, Difficulty::Medium);
    let hard = build_author_prompt(&prompts, &w, Difficulty::Hard);
    assert!(easy.user.ends_with(&format!("Difficulty guidance: {}", prompts.hint_easy)));
    assert!(medium.user.contains("modest multi-step reasoning"));
    assert!(hard.user.contains("multi-step inference"));
    assert_ne!(easy.user, hard.user);
  }

  #[test]
  fn passage_placeholders_are_not_expanded() {
    let p = build_author_prompt(&Prompts::default(), &window("see {difficulty_hint}"), Difficulty::Hard);
    assert!(p.user.contains("see {difficulty_hint}"));
  }

  #[test]
  fn is_deterministic() {
    let w = window("same");
    assert_eq!(
      build_author_prompt(&Prompts::default(), &w, Difficulty::Hard),
      build_author_prompt(&Prompts::default(), &w, Difficulty::Hard)
    );
  }
}
