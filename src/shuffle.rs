//! Answer-choice randomization.
//!
//! Invariant: `shuffled[new_index] == choices[correct]`, for every draw.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{FinalizedQuestion, RawModelQuestion};

/// Reorder `choices` by a uniform permutation and report where `correct` landed.
///
/// `correct` must be below 4 (the parser only yields such answers); larger values panic
/// like any out-of-bounds index. `perm[i]` is the original index placed at position `i`,
/// so the new answer is `inverse[correct]`, not `perm[correct]`.
pub fn shuffle_choices<R: Rng + ?Sized>(choices: [String; 4], correct: usize, rng: &mut R) -> ([String; 4], usize) {
  let mut perm = [0usize, 1, 2, 3];
  perm.shuffle(rng);

  let mut inverse = [0usize; 4];
  for (pos, &orig) in perm.iter().enumerate() {
    inverse[orig] = pos;
  }
  let new_index = inverse[correct];
  let shuffled = perm.map(|i| choices[i].clone());
  (shuffled, new_index)
}

pub fn finalize<R: Rng + ?Sized>(raw: RawModelQuestion, rng: &mut R) -> FinalizedQuestion {
  let (choices, answer) = shuffle_choices(raw.choices, raw.answer, rng);
  FinalizedQuestion {
    question: raw.question,
    choices,
    answer,
    rationale: raw.rationale,
    source_span: raw.source_span,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;
  use rand::{rngs::StdRng, SeedableRng};

  fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
  }

  #[test]
  fn paris_stays_correct_for_every_seed() {
    let choices: [String; 4] = ["Paris", "Rome", "Berlin", "Madrid"].map(String::from);
    let mut positions = [0usize; 4];
    for seed in 0..200u64 {
      let mut rng = StdRng::seed_from_u64(seed);
      let (shuffled, idx) = shuffle_choices(choices.clone(), 0, &mut rng);
      assert_eq!(shuffled[idx], "Paris");
      positions[idx] += 1;
    }
    // 200 draws over 4 slots: every slot should have been used.
    assert!(positions.iter().all(|&n| n > 0), "{positions:?}");
  }

  #[test]
  #[should_panic]
  fn answer_outside_the_four_choices_is_not_remapped() {
    let mut rng = StdRng::seed_from_u64(7);
    shuffle_choices(["a", "b", "c", "d"].map(String::from), 4, &mut rng);
  }

  #[test]
  fn finalize_keeps_text_fields() {
    let raw = RawModelQuestion {
      question: "Q".into(),
      choices: ["a", "b", "c", "d"].map(String::from),
      answer: 3,
      rationale: Some("r".into()),
      source_span: Some("s".into()),
    };
    let mut rng = StdRng::seed_from_u64(1);
    let q = finalize(raw, &mut rng);
    assert_eq!(q.question, "Q");
    assert_eq!(q.choices[q.answer], "d");
    assert_eq!(q.rationale.as_deref(), Some("r"));
    assert_eq!(q.source_span.as_deref(), Some("s"));
  }

  proptest! {
    #[test]
    fn correct_choice_follows_the_shuffle(
      choices in proptest::array::uniform4(".{0,12}"),
      correct in 0usize..4,
      seed in any::<u64>(),
    ) {
      let mut rng = StdRng::seed_from_u64(seed);
      let (shuffled, idx) = shuffle_choices(choices.clone(), correct, &mut rng);
      prop_assert!(idx < 4);
      prop_assert_eq!(&shuffled[idx], &choices[correct]);
      prop_assert_eq!(sorted(shuffled.to_vec()), sorted(choices.to_vec()));
    }

    #[test]
    fn duplicate_choices_still_track_the_answer(correct in 0usize..4, seed in any::<u64>()) {
      let choices: [String; 4] = ["same", "same", "other", "same"].map(String::from);
      let mut rng = StdRng::seed_from_u64(seed);
      let (shuffled, idx) = shuffle_choices(choices.clone(), correct, &mut rng);
      prop_assert_eq!(&shuffled[idx], &choices[correct]);
    }
  }
}
