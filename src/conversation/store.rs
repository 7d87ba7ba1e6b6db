//! Per-session transcript storage

use super::turn::{Role, Turn};
use std::collections::vec_deque;
use std::collections::VecDeque;

/// Default number of turns a session retains
pub const DEFAULT_MAX_TURNS: usize = 200;

/// Smallest cap that still holds one full exchange
const MIN_MAX_TURNS: usize = 2;

/// Ordered transcript for one session
///
/// Only grows by `append` and only shrinks by `clear`, or by evicting the
/// oldest exchanges once a retention cap is exceeded.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    turns: VecDeque<Turn>,
    max_turns: Option<usize>,
}

impl ConversationStore {
    /// Store that keeps at most `max_turns` turns; `0` means unbounded.
    /// Caps below one exchange are raised to two turns.
    pub fn with_max_turns(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            max_turns: (max_turns > 0).then_some(max_turns.max(MIN_MAX_TURNS)),
        }
    }

    /// Append a turn, evicting from the front if the cap is exceeded
    ///
    /// Eviction never leaves a reply at the front without the user turn it
    /// answered; such orphaned replies go with their question.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        let Some(max) = self.max_turns else {
            return;
        };
        if self.turns.len() <= max {
            return;
        }

        let mut evicted = 0;
        while self.turns.len() > max {
            self.turns.pop_front();
            evicted += 1;
        }
        while self.turns.front().is_some_and(|t| t.role() == Role::Assistant) {
            self.turns.pop_front();
            evicted += 1;
        }
        tracing::debug!(evicted, max_turns = max, "Transcript cap reached");
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Turns in insertion order
    ///
    /// The iterator is `Clone`, so callers can walk it more than once.
    pub fn all(&self) -> Turns<'_> {
        Turns {
            inner: self.turns.iter(),
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }
}

/// Read-only view over a transcript
#[derive(Debug, Clone)]
pub struct Turns<'a> {
    inner: vec_deque::Iter<'a, Turn>,
}

impl<'a> Iterator for Turns<'a> {
    type Item = &'a Turn;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Turns<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for Turns<'_> {}
