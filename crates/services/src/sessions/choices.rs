use rand::Rng;
use rand::rng;
use rand::seq::SliceRandom;

use quiz_core::model::Question;

/// Answer choices for one render of `question`, in random order.
///
/// Each render reshuffles. Scoring compares the chosen string, so the order
/// shown at submission time does not matter.
#[must_use]
pub fn shuffled_choices(question: &Question) -> Vec<String> {
    shuffled_choices_with(question, &mut rng())
}

/// Same as `shuffled_choices` with a caller-provided RNG.
#[must_use]
pub fn shuffled_choices_with<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Vec<String> {
    let mut choices: Vec<String> = question
        .all_answers()
        .into_iter()
        .map(str::to_owned)
        .collect();
    choices.shuffle(rng);
    choices
}
