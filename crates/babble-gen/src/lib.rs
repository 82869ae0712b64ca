//! Text generation over an [`NGramModel`]: Laplace-smoothed next-word
//! prediction and the sequence-generation walk.
//!
//! This crate implements the inference half of the model:
//!
//! 1. **Distribution**: for an observed context, spread the follower counts
//!    over the *entire* vocabulary with additive smoothing, so every known
//!    word keeps a nonzero chance (for `alpha > 0`) of being produced.
//! 2. **Prediction**: sample one word from that distribution, or fall back to
//!    a uniform vocabulary draw when the context was never observed.
//! 3. **Generation**: seed a starting window (random starting context, or a
//!    caller-supplied prefix padded/truncated to the model order), then
//!    repeatedly predict and append until the length bound is reached.
//!
//! All randomness flows through a caller-supplied [`Rng`], so seeded runs are
//! fully reproducible: the vocabulary iterates in first-seen order and the
//! weighted draw is a cumulative scan over that order.

use markov_model::{Context, NGramModel};
use rand::Rng;
use thiserror::Error;
use token_dict::TokenId;

/// Reasons sequence generation can fail before producing any output.
///
/// Both variants describe cold-start states; once a sequence is under way,
/// generation always terminates normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The model has no recorded transitions at all.
    #[error("model has no recorded transitions")]
    NotTrained,
    /// Transitions exist but no starting context is available for seeding.
    #[error("model has no starting context to seed from")]
    NoStartingContext,
}

/// Compute the smoothed next-word distribution for a context window.
///
/// The distribution covers every vocabulary token in first-seen order, with
/// `P(w) = (count(w) + alpha) / (total + alpha * vocab_size)`. Tokens that
/// never followed the context get the `alpha`-floor probability; with
/// `alpha = 0` they get exactly zero.
///
/// Returns `None` when the window contains an unknown word or was never
/// observed as a context, which is the caller's cue to fall back.
pub fn smoothed_distribution<S: AsRef<str>>(
    model: &NGramModel,
    window: &[S],
    alpha: f64,
) -> Option<Vec<(TokenId, f64)>> {
    let context = model.context_of(window)?;
    let counts = model.followers(&context)?;

    let total: u32 = counts.values().sum();
    let denominator = total as f64 + alpha * model.dictionary().len() as f64;

    let distribution = model
        .dictionary()
        .iter()
        .map(|(id, _)| {
            let count = counts.get(&id).copied().unwrap_or(0);
            (id, (count as f64 + alpha) / denominator)
        })
        .collect();

    Some(distribution)
}

/// Predict the next word after a context window.
///
/// Observed contexts sample from [`smoothed_distribution`]. Unobserved ones
/// (including windows containing unknown words) fall back, in order, to a
/// uniformly random vocabulary token, then to the last token of a random
/// starting context. Returns `None` only when the model is completely empty.
pub fn predict_next<S, R>(
    model: &NGramModel,
    window: &[S],
    alpha: f64,
    rng: &mut R,
) -> Option<String>
where
    S: AsRef<str>,
    R: Rng,
{
    if let Some(distribution) = smoothed_distribution(model, window, alpha)
        && let Some(id) = sample_weighted(&distribution, rng)
    {
        return Some(model.dictionary().resolve(id).to_string());
    }

    fallback_token(model, rng).map(|id| model.dictionary().resolve(id).to_string())
}

/// Generate a word sequence of at most `max_length` tokens.
///
/// Seeding follows the order in the crate docs: with no `start_words`, one
/// uniformly random starting context opens the sequence whole; a supplied
/// prefix shorter than the model order (the empty prefix included) is padded
/// position by position from freshly drawn random starting contexts; a
/// longer prefix is truncated to its last `order` words. The sequence then
/// extends one predicted word at a time until `max_length`, or until
/// prediction comes up empty.
pub fn generate_sequence<S, R>(
    model: &NGramModel,
    alpha: f64,
    start_words: Option<&[S]>,
    max_length: usize,
    rng: &mut R,
) -> Result<Vec<String>, GenerateError>
where
    S: AsRef<str>,
    R: Rng,
{
    if !model.is_trained() {
        return Err(GenerateError::NotTrained);
    }

    let order = model.order();

    let mut sentence: Vec<String> = match start_words {
        None => {
            let start = random_start(model, rng)?;
            resolve_context(model, start)
        }
        Some(seed) if seed.len() < order => {
            let mut sentence: Vec<String> =
                seed.iter().map(|word| word.as_ref().to_string()).collect();
            // Each missing position borrows from a fresh random starting context.
            for position in sentence.len()..order {
                let start = random_start(model, rng)?;
                let id = start.ids()[position];
                sentence.push(model.dictionary().resolve(id).to_string());
            }
            sentence
        }
        Some(seed) => seed[seed.len() - order..]
            .iter()
            .map(|word| word.as_ref().to_string())
            .collect(),
    };

    while sentence.len() < max_length {
        let from = sentence.len() - order;
        match predict_next(model, &sentence[from..], alpha, rng) {
            Some(word) => sentence.push(word),
            None => break,
        }
    }

    Ok(sentence)
}

/// Draw one token from a weighted distribution by cumulative scan.
///
/// Entries with non-positive weight are skipped and can never be drawn.
/// Floating-point rounding can leave the draw just past the final cumulative
/// weight; the scan then settles on the last positive-weight entry.
fn sample_weighted<R: Rng>(distribution: &[(TokenId, f64)], rng: &mut R) -> Option<TokenId> {
    let mut remaining: f64 = rng.random();
    let mut chosen = None;

    for &(id, weight) in distribution {
        if weight <= 0.0 {
            continue;
        }
        chosen = Some(id);
        if remaining < weight {
            break;
        }
        remaining -= weight;
    }

    chosen
}

/// Fallback for an unobserved context: a uniformly random vocabulary token,
/// else the last token of a random starting context, else nothing.
fn fallback_token<R: Rng>(model: &NGramModel, rng: &mut R) -> Option<TokenId> {
    let dict = model.dictionary();
    if !dict.is_empty() {
        let index = rng.random_range(0..dict.len());
        return Some(TokenId::from_usize(index));
    }

    let starts = model.starting_contexts();
    if !starts.is_empty() {
        let index = rng.random_range(0..starts.len());
        return starts[index].last();
    }

    None
}

/// Pick a uniformly random starting context.
fn random_start<'m, R: Rng>(
    model: &'m NGramModel,
    rng: &mut R,
) -> Result<&'m Context, GenerateError> {
    let starts = model.starting_contexts();
    if starts.is_empty() {
        return Err(GenerateError::NoStartingContext);
    }
    Ok(&starts[rng.random_range(0..starts.len())])
}

/// Resolve a context's token IDs back to owned words.
fn resolve_context(model: &NGramModel, context: &Context) -> Vec<String> {
    context
        .ids()
        .iter()
        .map(|&id| model.dictionary().resolve(id).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    // --- Test infrastructure ---

    fn trained_model(order: usize, sentences: &[&[&str]]) -> NGramModel {
        let mut model = NGramModel::new(order);
        for sentence in sentences {
            let tokens: Vec<String> = sentence.iter().map(|w| w.to_string()).collect();
            model.learn(&tokens);
        }
        model
    }

    fn cat_model() -> NGramModel {
        trained_model(2, &[&["the", "cat", "sat", "the", "cat", "ran"]])
    }

    fn make_rng(s: u64) -> SmallRng {
        SmallRng::seed_from_u64(s)
    }

    fn by_word(model: &NGramModel, distribution: &[(TokenId, f64)]) -> HashMap<String, f64> {
        distribution
            .iter()
            .map(|&(id, p)| (model.dictionary().resolve(id).to_string(), p))
            .collect()
    }

    // --- smoothed_distribution tests ---

    #[test]
    fn distribution_covers_entire_vocabulary() {
        let model = cat_model();
        let dist = smoothed_distribution(&model, &["the", "cat"], 1.0).unwrap();
        assert_eq!(dist.len(), model.dictionary().len());
    }

    #[test]
    fn distribution_sums_to_one() {
        let model = cat_model();
        let dist = smoothed_distribution(&model, &["the", "cat"], 1.0).unwrap();
        let sum: f64 = dist.iter().map(|&(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-9, "probabilities summed to {sum}");
    }

    #[test]
    fn laplace_probabilities_match_hand_computation() {
        // After "the cat": sat and ran observed once each, total 2, vocab 4.
        // Smoothed with alpha = 1: (1+1)/(2+4) for followers, (0+1)/(2+4) else.
        let model = cat_model();
        let dist = by_word(
            &model,
            &smoothed_distribution(&model, &["the", "cat"], 1.0).unwrap(),
        );

        assert!((dist["sat"] - 1.0 / 3.0).abs() < 1e-9);
        assert!((dist["ran"] - 1.0 / 3.0).abs() < 1e-9);
        assert!((dist["the"] - 1.0 / 6.0).abs() < 1e-9);
        assert!((dist["cat"] - 1.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn alpha_zero_keeps_raw_frequencies() {
        let model = cat_model();
        let dist = by_word(
            &model,
            &smoothed_distribution(&model, &["the", "cat"], 0.0).unwrap(),
        );

        assert!((dist["sat"] - 0.5).abs() < 1e-9);
        assert!((dist["ran"] - 0.5).abs() < 1e-9);
        assert_eq!(dist["the"], 0.0);
        assert_eq!(dist["cat"], 0.0);
    }

    #[test]
    fn positive_alpha_floors_every_token() {
        let model = cat_model();
        let dist = smoothed_distribution(&model, &["the", "cat"], 0.5).unwrap();
        assert!(dist.iter().all(|&(_, p)| p > 0.0));
    }

    #[test]
    fn unobserved_context_has_no_distribution() {
        let model = cat_model();
        // Both words are known but "cat the" never occurred as a window.
        assert!(smoothed_distribution(&model, &["cat", "the"], 1.0).is_none());
    }

    #[test]
    fn unknown_word_has_no_distribution() {
        let model = cat_model();
        assert!(smoothed_distribution(&model, &["the", "dog"], 1.0).is_none());
    }

    #[test]
    fn trailing_window_is_not_a_dead_end() {
        let model = cat_model();
        // "cat ran" closes the corpus with no follower, so it is absent from
        // the table and prediction falls back to a vocabulary draw.
        assert!(smoothed_distribution(&model, &["cat", "ran"], 1.0).is_none());

        let mut rng = make_rng(5);
        let word = predict_next(&model, &["cat", "ran"], 1.0, &mut rng).unwrap();
        assert!(model.dictionary().find(&word).is_some());
    }

    // --- predict_next tests ---

    #[test]
    fn observed_context_yields_observed_follower_when_unsmoothed() {
        let model = cat_model();
        let mut rng = make_rng(7);

        // With alpha = 0 only the two observed followers carry weight.
        for _ in 0..50 {
            let word = predict_next(&model, &["the", "cat"], 0.0, &mut rng).unwrap();
            assert!(word == "sat" || word == "ran", "unexpected word {word}");
        }
    }

    #[test]
    fn unobserved_context_falls_back_to_vocabulary() {
        let model = cat_model();
        let mut rng = make_rng(7);

        let word = predict_next(&model, &["cat", "the"], 1.0, &mut rng).unwrap();
        assert!(model.dictionary().find(&word).is_some());
    }

    #[test]
    fn unknown_word_falls_back_to_vocabulary() {
        let model = cat_model();
        let mut rng = make_rng(7);

        let word = predict_next(&model, &["purple", "cat"], 1.0, &mut rng).unwrap();
        assert!(model.dictionary().find(&word).is_some());
    }

    #[test]
    fn empty_model_predicts_nothing() {
        let model = NGramModel::new(2);
        let mut rng = make_rng(7);
        assert!(predict_next(&model, &["a", "b"], 1.0, &mut rng).is_none());
    }

    #[test]
    fn vocabulary_without_transitions_still_predicts() {
        // A too-short training call fills the vocabulary but not the table;
        // prediction must still produce something from the vocabulary.
        let mut model = NGramModel::new(2);
        model.learn(&["lonely".to_string()]);
        let mut rng = make_rng(7);

        let word = predict_next(&model, &["lonely", "word"], 1.0, &mut rng).unwrap();
        assert_eq!(word, "lonely");
    }

    #[test]
    fn prediction_is_deterministic_under_a_seed() {
        let model = cat_model();
        let run = |seed| {
            let mut rng = make_rng(seed);
            predict_next(&model, &["the", "cat"], 1.0, &mut rng)
        };
        assert_eq!(run(42), run(42));
    }

    // --- sample_weighted tests ---

    #[test]
    fn sampling_skips_zero_weight_entries() {
        let dist = vec![(TokenId(0), 0.0), (TokenId(1), 1.0), (TokenId(2), 0.0)];
        let mut rng = make_rng(3);
        for _ in 0..20 {
            assert_eq!(sample_weighted(&dist, &mut rng), Some(TokenId(1)));
        }
    }

    #[test]
    fn sampling_empty_distribution_is_none() {
        let mut rng = make_rng(3);
        assert_eq!(sample_weighted(&[], &mut rng), None);
    }

    #[test]
    fn sampling_all_zero_weights_is_none() {
        let dist = vec![(TokenId(0), 0.0), (TokenId(1), 0.0)];
        let mut rng = make_rng(3);
        assert_eq!(sample_weighted(&dist, &mut rng), None);
    }

    // --- generate_sequence tests ---

    #[test]
    fn untrained_model_cannot_generate() {
        let model = NGramModel::new(2);
        let mut rng = make_rng(11);
        let result = generate_sequence::<&str, _>(&model, 1.0, None, 25, &mut rng);
        assert_eq!(result.unwrap_err(), GenerateError::NotTrained);
    }

    #[test]
    fn vocabulary_only_model_cannot_generate() {
        let mut model = NGramModel::new(2);
        model.learn(&["just".to_string(), "two".to_string()]);
        let mut rng = make_rng(11);
        let result = generate_sequence::<&str, _>(&model, 1.0, None, 25, &mut rng);
        assert_eq!(result.unwrap_err(), GenerateError::NotTrained);
    }

    #[test]
    fn unseeded_generation_opens_with_a_starting_context() {
        let model = trained_model(2, &[&["the", "cat", "sat"]]);
        let mut rng = make_rng(11);
        let sentence = generate_sequence::<&str, _>(&model, 1.0, None, 10, &mut rng).unwrap();
        assert_eq!(&sentence[..2], &["the", "cat"]);
    }

    #[test]
    fn empty_seed_pads_every_position_from_fresh_starts() {
        // An empty seed borrows each position from an independently drawn
        // starting context, so with two starts the opening can interleave
        // them. The unseeded path instead keeps one whole starting context.
        let model = trained_model(2, &[&["the", "cat", "sat"], &["a", "dog", "ran"]]);
        let empty: &[&str] = &[];

        let mut interleaved = false;
        for seed in 0..200 {
            let mut rng = make_rng(seed);
            let opening = generate_sequence(&model, 1.0, Some(empty), 2, &mut rng).unwrap();
            if opening == ["the", "dog"] || opening == ["a", "cat"] {
                interleaved = true;
            }

            let mut rng = make_rng(seed);
            let unseeded = generate_sequence::<&str, _>(&model, 1.0, None, 2, &mut rng).unwrap();
            assert!(
                unseeded == ["the", "cat"] || unseeded == ["a", "dog"],
                "unseeded opening mixed starting contexts: {unseeded:?}"
            );
        }
        assert!(interleaved, "empty seed never interleaved the starting contexts");
    }

    #[test]
    fn generation_fills_to_max_length() {
        let model = cat_model();
        let mut rng = make_rng(11);
        let sentence = generate_sequence::<&str, _>(&model, 1.0, None, 12, &mut rng).unwrap();
        assert_eq!(sentence.len(), 12);
    }

    #[test]
    fn short_seed_is_padded_from_starting_contexts() {
        let model = trained_model(2, &[&["the", "cat", "sat"]]);
        let mut rng = make_rng(11);
        let sentence =
            generate_sequence(&model, 1.0, Some(&["the"]), 8, &mut rng).unwrap();
        // The single starting context is "the cat", so position 1 pads to "cat".
        assert_eq!(&sentence[..2], &["the", "cat"]);
    }

    #[test]
    fn long_seed_is_truncated_to_model_order() {
        let model = cat_model();
        let mut rng = make_rng(11);
        let sentence =
            generate_sequence(&model, 1.0, Some(&["a", "b", "the", "cat"]), 8, &mut rng)
                .unwrap();
        assert_eq!(&sentence[..2], &["the", "cat"]);
    }

    #[test]
    fn unknown_seed_words_are_kept_verbatim() {
        let model = cat_model();
        let mut rng = make_rng(11);
        let sentence =
            generate_sequence(&model, 1.0, Some(&["purple", "monkey"]), 6, &mut rng).unwrap();
        assert_eq!(&sentence[..2], &["purple", "monkey"]);
        // Fallback keeps the sequence growing past the unknown prefix.
        assert_eq!(sentence.len(), 6);
    }

    #[test]
    fn max_length_below_order_returns_seed_window() {
        let model = cat_model();
        let mut rng = make_rng(11);
        let sentence = generate_sequence::<&str, _>(&model, 1.0, None, 1, &mut rng).unwrap();
        assert_eq!(sentence.len(), 2);
    }

    #[test]
    fn generation_is_deterministic_under_a_seed() {
        let model = trained_model(
            2,
            &[
                &["the", "cat", "sat", "on", "the", "mat"],
                &["the", "dog", "ran", "in", "the", "park"],
            ],
        );
        let run = |seed| {
            let mut rng = make_rng(seed);
            generate_sequence::<&str, _>(&model, 1.0, None, 15, &mut rng).unwrap()
        };
        assert_eq!(run(9), run(9));
    }
}
