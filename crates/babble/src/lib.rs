//! Word-level Markov text generator with Laplace smoothing.
//!
//! This is the facade crate that wires together the lower-level components:
//! - [`babble_tokenizer`]: word extraction and case folding
//! - [`token_dict`]: interning vocabulary
//! - [`markov_model`]: transition table and starting contexts
//! - [`babble_gen`]: smoothed prediction and sequence generation
//!
//! # Quick Start
//!
//! ```
//! use babble::{Babble, DEFAULT_MAX_LENGTH};
//! use rand::rngs::SmallRng;
//! use rand::SeedableRng;
//!
//! let mut babble = Babble::new(2, 1.0, SmallRng::seed_from_u64(42)).unwrap();
//! babble.train("The cat sat on the mat. The cat ran up the hill.");
//! let sentence = babble.generate_sentence(DEFAULT_MAX_LENGTH);
//! println!("{sentence}");
//! ```

use babble_gen::{GenerateError, generate_sequence, predict_next, smoothed_distribution};
use babble_tokenizer::tokenize;
use rand::Rng;
use thiserror::Error;

// Re-export model types reachable through the inspection API.
pub use markov_model::{Context, NGramModel};
pub use token_dict::{TokenDict, TokenId};

/// Default bound on generated sentence length, in words.
pub const DEFAULT_MAX_LENGTH: usize = 25;

/// Errors surfaced by the [`Babble`] facade.
///
/// All of these are contract violations by the caller. Expected conditions
/// (an unseen context, an untrained model) are not errors: prediction reports
/// them as `Ok(None)` and generation as a fixed sentence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BabbleError {
    /// The context length must be at least 1.
    #[error("model order must be at least 1")]
    InvalidOrder,
    /// The smoothing strength must be finite and non-negative.
    #[error("smoothing alpha must be finite and non-negative, got {0}")]
    InvalidAlpha(f64),
    /// Prediction needs at least `order` context words to form a window.
    #[error("context needs at least {needed} words, got {got}")]
    ContextTooShort { needed: usize, got: usize },
}

/// A trainable sentence generator.
///
/// Owns one [`NGramModel`] plus the smoothing strength and the PRNG. Generic
/// over the PRNG type `R` for testability; seed a `SmallRng` for reproducible
/// output.
///
/// The context length and smoothing strength are fixed at construction. Train
/// as many times as you like; counts accumulate across calls.
pub struct Babble<R: Rng> {
    /// The n-gram model holding transitions, starting contexts, and vocabulary.
    model: NGramModel,
    /// Additive smoothing strength applied at prediction time.
    alpha: f64,
    /// Random number generator.
    rng: R,
}

impl<R: Rng> Babble<R> {
    /// Create a new generator with the given context length, smoothing
    /// strength, and PRNG.
    ///
    /// Rejects a zero `order` and a NaN, infinite, or negative `alpha`.
    pub fn new(order: usize, alpha: f64, rng: R) -> Result<Self, BabbleError> {
        if order == 0 {
            return Err(BabbleError::InvalidOrder);
        }
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(BabbleError::InvalidAlpha(alpha));
        }
        Ok(Babble {
            model: NGramModel::new(order),
            alpha,
            rng,
        })
    }

    /// Train on a block of raw text.
    ///
    /// The text is lowercased and split into words, then fed to the model as
    /// one sequence. Text with fewer than `order + 1` words still grows the
    /// vocabulary but records no transitions (a warning is logged).
    pub fn train(&mut self, text: &str) {
        let tokens = tokenize(text);
        self.model.learn(&tokens);
    }

    /// Sample the next word after `context`.
    ///
    /// The context must supply at least `order` words; extra leading words
    /// are ignored. Words are matched verbatim against the vocabulary, so
    /// callers should pass them lowercase the way training stored them.
    ///
    /// `Ok(None)` means no prediction is possible at all, which only happens
    /// while the model is completely empty. An unseen context instead falls
    /// back to a uniformly random vocabulary word.
    pub fn predict_next_word<T: AsRef<str>>(
        &mut self,
        context: &[T],
    ) -> Result<Option<String>, BabbleError> {
        let window = self.check_window(context)?;
        Ok(predict_next(&self.model, window, self.alpha, &mut self.rng))
    }

    /// The full smoothed next-word distribution after an observed context.
    ///
    /// Returns one `(word, probability)` pair per vocabulary entry, in
    /// first-seen order. `Ok(None)` means the context was never observed
    /// (prediction would fall back). Same length rule as
    /// [`predict_next_word`](Self::predict_next_word).
    pub fn next_word_distribution<T: AsRef<str>>(
        &self,
        context: &[T],
    ) -> Result<Option<Vec<(String, f64)>>, BabbleError> {
        let window = self.check_window(context)?;
        Ok(smoothed_distribution(&self.model, window, self.alpha).map(|dist| {
            dist.into_iter()
                .map(|(id, p)| (self.model.dictionary().resolve(id).to_string(), p))
                .collect()
        }))
    }

    /// Generate a sentence of at most `max_length` words from a random
    /// starting context.
    ///
    /// Always returns a sentence. Before any transition has been recorded
    /// the fixed reply is `"Model not trained yet."`; if seeding fails with
    /// a trained model it is `"Model not trained properly."`.
    pub fn generate_sentence(&mut self, max_length: usize) -> String {
        render(generate_sequence::<&str, _>(
            &self.model,
            self.alpha,
            None,
            max_length,
            &mut self.rng,
        ))
    }

    /// Generate a sentence growing out of the given starting words.
    ///
    /// A prefix shorter than `order` is padded with one fresh random
    /// starting-context draw per missing position; a longer one contributes
    /// only its last `order` words. An empty slice is padded at every
    /// position, so unlike [`generate_sentence`](Self::generate_sentence)
    /// its opening may interleave tokens from different starting contexts.
    pub fn generate_sentence_from<T: AsRef<str>>(
        &mut self,
        start_words: &[T],
        max_length: usize,
    ) -> String {
        render(generate_sequence(
            &self.model,
            self.alpha,
            Some(start_words),
            max_length,
            &mut self.rng,
        ))
    }

    /// The context length this generator was built with.
    pub fn order(&self) -> usize {
        self.model.order()
    }

    /// The smoothing strength this generator was built with.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The underlying model (for inspection/testing).
    pub fn model(&self) -> &NGramModel {
        &self.model
    }

    /// Apply the context length rule: reject short windows, keep the last
    /// `order` words of long ones.
    fn check_window<'c, T: AsRef<str>>(&self, context: &'c [T]) -> Result<&'c [T], BabbleError> {
        let order = self.model.order();
        if context.len() < order {
            return Err(BabbleError::ContextTooShort {
                needed: order,
                got: context.len(),
            });
        }
        Ok(&context[context.len() - order..])
    }
}

/// Join generated words, or map the cold-start failures to their fixed
/// sentences.
fn render(result: Result<Vec<String>, GenerateError>) -> String {
    match result {
        Ok(words) => words.join(" "),
        Err(GenerateError::NotTrained) => "Model not trained yet.".to_string(),
        Err(GenerateError::NoStartingContext) => "Model not trained properly.".to_string(),
    }
}
