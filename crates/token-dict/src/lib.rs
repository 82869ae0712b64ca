//! Interning dictionary mapping word tokens to compact [`TokenId`] identifiers.
//!
//! The dictionary maintains two parallel structures:
//! - `entries`: tokens in insertion order (index = TokenId)
//! - `sorted_index`: TokenIds sorted by the token they reference, for O(log n) lookup
//!
//! Insertion order doubles as the model's canonical vocabulary order: iterating
//! the dictionary yields tokens first-seen first, independent of hashing, which
//! keeps vocabulary-wide sampling reproducible under a seeded RNG.

/// Compact identifier assigned to a token by a [`TokenDict`].
///
/// Uses `u32` storage, enough for any vocabulary this model is meant for.
/// IDs are dense: they double as indices into the dictionary's entry list.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TokenId(pub u32);

impl TokenId {
    /// Create a TokenId from a usize index.
    ///
    /// # Panics
    /// Panics if `index` exceeds `u32::MAX`.
    #[inline]
    pub fn from_usize(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "TokenId overflow: {index}");
        TokenId(index as u32)
    }

    /// Convert to usize for indexing.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// An interning dictionary that maps word tokens to compact [`TokenId`] values.
///
/// Tokens are assigned sequential IDs starting from 0, in first-seen order.
/// Lookup is O(log n) via binary search over a sorted index. Insertion is
/// O(n) in the worst case (due to index shifting), but amortized O(log n)
/// for the search component.
#[derive(Debug, Default)]
pub struct TokenDict {
    /// Tokens in insertion order. `entries[id.as_usize()]` returns the token for `id`.
    entries: Vec<String>,
    /// Indices into `entries`, kept sorted by the token they reference.
    /// Used for O(log n) binary search during lookup/insertion.
    sorted_index: Vec<TokenId>,
}

impl TokenDict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        TokenDict {
            entries: Vec::new(),
            sorted_index: Vec::new(),
        }
    }

    /// Insert a token into the dictionary if not already present, returning its ID.
    ///
    /// If the token already exists, returns the existing ID without duplicating.
    /// New tokens are assigned the next sequential ID.
    pub fn intern(&mut self, token: &str) -> TokenId {
        // Binary search the sorted index for this token.
        let search_result = self
            .sorted_index
            .binary_search_by(|&id| self.entries[id.as_usize()].as_str().cmp(token));

        match search_result {
            Ok(idx) => {
                // Already interned, return the existing ID.
                self.sorted_index[idx]
            }
            Err(insert_pos) => {
                // New token, assign the next ID.
                let new_id = TokenId::from_usize(self.entries.len());
                self.entries.push(token.to_string());
                self.sorted_index.insert(insert_pos, new_id);
                new_id
            }
        }
    }

    /// Look up a token without inserting. Returns `None` if absent.
    pub fn find(&self, token: &str) -> Option<TokenId> {
        self.sorted_index
            .binary_search_by(|&id| self.entries[id.as_usize()].as_str().cmp(token))
            .ok()
            .map(|idx| self.sorted_index[idx])
    }

    /// Resolve a TokenId back to the token it represents.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this dictionary.
    #[inline]
    pub fn resolve(&self, id: TokenId) -> &str {
        &self.entries[id.as_usize()]
    }

    /// Number of distinct tokens in the dictionary.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary contains no tokens.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(id, token)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &str)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, token)| (TokenId::from_usize(index), token.as_str()))
    }
}
