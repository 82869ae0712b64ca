//! Word-level n-gram Markov model: transition counts, starting contexts, and
//! the vocabulary they are defined over.
//!
//! This crate provides [`NGramModel`], which combines a transition-count table,
//! the list of observed sentence-starting contexts, and an interning
//! [`TokenDict`] into one trainable model. The [`Context`] type is the
//! canonical fixed-length window of token IDs used as the table key.
//!
//! Learning mutates the model; every read path borrows it immutably. Repeated
//! calls to [`NGramModel::learn`] accumulate counts rather than resetting them,
//! so a model can be trained document by document.

use std::collections::HashMap;

use token_dict::{TokenDict, TokenId};
use tracing::warn;

/// A fixed-length window of consecutive token IDs, used as the key into the
/// transition table.
///
/// Contexts are immutable once formed and compare positionally: two contexts
/// are equal iff they have the same length and every slot matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Context(Box<[TokenId]>);

impl Context {
    /// Create a context from a window of token IDs.
    pub fn new(ids: &[TokenId]) -> Self {
        Context(ids.into())
    }

    /// The token IDs in this context, oldest first.
    #[inline]
    pub fn ids(&self) -> &[TokenId] {
        &self.0
    }

    /// The most recent token ID in the window.
    #[inline]
    pub fn last(&self) -> Option<TokenId> {
        self.0.last().copied()
    }

    /// Number of token IDs in the window.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the window holds no token IDs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A word-level Markov model of fixed order `n`.
///
/// Three structures grow together during training:
/// - `transitions`: maps each observed n-token [`Context`] to the frequency
///   table of the tokens that followed it. Every stored count is at least 1;
///   absent pairs are read back as zero.
/// - `starts`: the first context of every training call that was long enough
///   to record transitions, kept (duplicates included) as generation seeds.
/// - `dictionary`: every distinct token ever seen, in first-seen order.
///
/// The order is fixed at construction; one model never mixes context lengths.
#[derive(Debug)]
pub struct NGramModel {
    order: usize,
    transitions: HashMap<Context, HashMap<TokenId, u32>>,
    starts: Vec<Context>,
    dictionary: TokenDict,
}

impl NGramModel {
    /// Create a new empty model with the given context length.
    ///
    /// # Panics
    /// Panics if `order` is zero.
    pub fn new(order: usize) -> Self {
        assert!(order >= 1, "model order must be at least 1");
        NGramModel {
            order,
            transitions: HashMap::new(),
            starts: Vec::new(),
            dictionary: TokenDict::new(),
        }
    }

    /// Learn from one token sequence.
    ///
    /// Every token is interned into the vocabulary first, even when the
    /// sequence is too short to form a single transition. Sequences shorter
    /// than `order + 1` tokens stop there, with a warning: no transition and
    /// no starting context is recorded.
    ///
    /// For longer sequences, the first `order` tokens are recorded as a new
    /// starting context, then a window of length `order` slides over the
    /// sequence and the count for (window, following token) is incremented
    /// for each position that has a follower.
    pub fn learn<S: AsRef<str>>(&mut self, tokens: &[S]) {
        let ids: Vec<TokenId> = tokens
            .iter()
            .map(|token| self.dictionary.intern(token.as_ref()))
            .collect();

        if ids.len() <= self.order {
            warn!(
                tokens = ids.len(),
                order = self.order,
                "training text too short to record any transition"
            );
            return;
        }

        self.starts.push(Context::new(&ids[..self.order]));

        for (i, window) in ids.windows(self.order).enumerate() {
            if let Some(&next) = ids.get(i + self.order) {
                *self
                    .transitions
                    .entry(Context::new(window))
                    .or_default()
                    .entry(next)
                    .or_insert(0) += 1;
            }
        }
    }

    /// The fixed context length of this model.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// The vocabulary of every token seen during training.
    #[inline]
    pub fn dictionary(&self) -> &TokenDict {
        &self.dictionary
    }

    /// Every starting context recorded so far, in training order.
    #[inline]
    pub fn starting_contexts(&self) -> &[Context] {
        &self.starts
    }

    /// Whether at least one transition has been recorded.
    #[inline]
    pub fn is_trained(&self) -> bool {
        !self.transitions.is_empty()
    }

    /// Number of distinct contexts in the transition table.
    #[inline]
    pub fn context_count(&self) -> usize {
        self.transitions.len()
    }

    /// The follower frequency table for a context, or `None` if the context
    /// was never observed.
    pub fn followers(&self, context: &Context) -> Option<&HashMap<TokenId, u32>> {
        self.transitions.get(context)
    }

    /// Observed count for a (context, follower) pair. Absent contexts and
    /// absent followers both read as zero.
    pub fn transition_count(&self, context: &Context, next: TokenId) -> u32 {
        self.transitions
            .get(context)
            .and_then(|table| table.get(&next))
            .copied()
            .unwrap_or(0)
    }

    /// Build the canonical context key for a window of words.
    ///
    /// Returns `None` if any word has never been seen, which callers treat
    /// the same as an unobserved context.
    pub fn context_of<S: AsRef<str>>(&self, words: &[S]) -> Option<Context> {
        let mut ids = Vec::with_capacity(words.len());
        for word in words {
            ids.push(self.dictionary.find(word.as_ref())?);
        }
        Some(Context::new(&ids))
    }
}
