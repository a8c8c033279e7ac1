//! Fixed-width bitset of command preconditions.
//!
//! Each bit of a [`CommandFlag`] is one named boolean predicate over the
//! application state ("a track is selected", "playback is stopped"). Bit
//! indices are handed out by
//! [`CommandFlagRegistry::register`](super::CommandFlagRegistry::register) in
//! registration order, so the hot recomputation path never looks anything up
//! by name.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use static_assertions::const_assert_eq;

/// Number of distinct flags a process can register.
pub const COMMAND_FLAG_CAPACITY: usize = 128;

const WORD_BITS: usize = u64::BITS as usize;
const WORDS: usize = COMMAND_FLAG_CAPACITY / WORD_BITS;

const_assert_eq!(COMMAND_FLAG_CAPACITY % WORD_BITS, 0);

/// A set of command preconditions.
///
/// Used both for "what currently holds" (the result of
/// [`MenuManager::get_update_flags`](crate::MenuManager::get_update_flags)) and
/// for "what a command requires".
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CommandFlag {
    words: [u64; WORDS],
}

/// The requirement of commands that are always enabled.
pub const ALWAYS_ENABLED_FLAG: CommandFlag = CommandFlag::empty();

impl CommandFlag {
    /// The empty set.
    pub const fn empty() -> Self {
        Self { words: [0; WORDS] }
    }

    /// A set containing only the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= COMMAND_FLAG_CAPACITY`.
    pub fn single(index: usize) -> Self {
        let mut flag = Self::empty();
        flag.set(index, true);
        flag
    }

    /// Set or clear the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= COMMAND_FLAG_CAPACITY`.
    pub fn set(&mut self, index: usize, value: bool) {
        assert!(index < COMMAND_FLAG_CAPACITY, "command flag index {index} out of range");
        let mask = 1u64 << (index % WORD_BITS);
        if value {
            self.words[index / WORD_BITS] |= mask;
        } else {
            self.words[index / WORD_BITS] &= !mask;
        }
    }

    /// Test the bit at `index`. Out-of-range indices read as unset.
    pub fn test(&self, index: usize) -> bool {
        index < COMMAND_FLAG_CAPACITY && self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    /// True when no bit is set.
    pub fn none(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    /// True when at least one bit is set.
    pub fn any(&self) -> bool {
        !self.none()
    }

    /// True when every bit of `required` is also set in `self`.
    pub fn contains(&self, required: CommandFlag) -> bool {
        (*self & required) == required
    }

    /// True when `self` and `other` share at least one bit.
    pub fn intersects(&self, other: CommandFlag) -> bool {
        (*self & other).any()
    }

    /// The bits of `self` that are not in `got`.
    pub fn missing_from(&self, got: CommandFlag) -> CommandFlag {
        *self & !got
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Indices of the set bits, ascending.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..COMMAND_FLAG_CAPACITY).filter(move |&index| self.test(index))
    }
}

impl BitAnd for CommandFlag {
    type Output = Self;

    fn bitand(mut self, rhs: Self) -> Self {
        self &= rhs;
        self
    }
}

impl BitAndAssign for CommandFlag {
    fn bitand_assign(&mut self, rhs: Self) {
        for (word, other) in self.words.iter_mut().zip(rhs.words) {
            *word &= other;
        }
    }
}

impl BitOr for CommandFlag {
    type Output = Self;

    fn bitor(mut self, rhs: Self) -> Self {
        self |= rhs;
        self
    }
}

impl BitOrAssign for CommandFlag {
    fn bitor_assign(&mut self, rhs: Self) {
        for (word, other) in self.words.iter_mut().zip(rhs.words) {
            *word |= other;
        }
    }
}

impl Not for CommandFlag {
    type Output = Self;

    fn not(mut self) -> Self {
        for word in &mut self.words {
            *word = !*word;
        }
        self
    }
}

impl FromIterator<usize> for CommandFlag {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut flag = Self::empty();
        for index in iter {
            flag.set(index, true);
        }
        flag
    }
}

impl fmt::Debug for CommandFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
