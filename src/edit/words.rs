//! Completion word ring.
//!
//! Dynamic words live in a fixed arena of nodes linked into one circle by
//! index. The node at the insertion point always has no word; walking
//! `next` from it visits the newest word first and the oldest last, and the
//! first empty node after that ends the dynamic section. Static words (the
//! interpreter's command names) follow in insertion order and are never
//! evicted.

use crate::error::{Result, try_to_vec};

#[derive(Clone, Debug)]
struct Node {
    word: Option<Vec<u8>>,
    prev: usize,
    next: usize,
    unique: bool,
}

/// Position in the combined dynamic/static sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordCursor {
    /// Index into the node arena.
    Dynamic(usize),
    /// Index into the static word list.
    Static(usize),
}

/// Most-recently-used ring of completion candidates.
#[derive(Clone, Debug)]
pub struct WordRing {
    nodes: Vec<Node>,
    insert_at: usize,
    statics: Vec<Vec<u8>>,
}

impl WordRing {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let n = capacity.max(2);
        let nodes = (0..n)
            .map(|i| Node {
                word: None,
                prev: (i + n - 1) % n,
                next: (i + 1) % n,
                unique: false,
            })
            .collect();
        Self {
            nodes,
            insert_at: 0,
            statics: Vec::new(),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// The empty slot the next word goes into.
    #[must_use]
    pub fn start(&self) -> WordCursor {
        WordCursor::Dynamic(self.insert_at)
    }

    /// Add a static word.
    pub fn add_static(&mut self, word: &[u8]) -> Result<()> {
        self.statics.try_reserve(1)?;
        self.statics.push(try_to_vec(word)?);
        Ok(())
    }

    #[must_use]
    pub fn static_words(&self) -> &[Vec<u8>] {
        &self.statics
    }

    /// Unlink node `i` and relink it just before the insertion point,
    /// making it the next slot to be reused.
    fn demote(&mut self, i: usize) {
        let (prev, next) = (self.nodes[i].prev, self.nodes[i].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;

        let at = self.insert_at;
        let before = self.nodes[at].prev;
        self.nodes[i].prev = before;
        self.nodes[i].next = at;
        self.nodes[before].next = i;
        self.nodes[at].prev = i;
    }

    /// Store `word` as the newest entry. Returns the word evicted to make
    /// room for the next insertion, if any.
    pub fn put(&mut self, word: &[u8]) -> Result<Option<Vec<u8>>> {
        let copy = try_to_vec(word)?;
        let at = self.insert_at;
        self.nodes[at].word = Some(copy);
        self.nodes[at].unique = false;

        let r = self.nodes[at].prev;
        self.demote(r);
        self.insert_at = r;
        Ok(self.nodes[r].word.take())
    }

    /// Word at `cursor`; `None` on the empty insertion slot.
    #[must_use]
    pub fn get(&self, cursor: WordCursor) -> Option<&[u8]> {
        match cursor {
            WordCursor::Dynamic(i) => self.nodes.get(i).and_then(|n| n.word.as_deref()),
            WordCursor::Static(k) => self.statics.get(k).map(Vec::as_slice),
        }
    }

    /// Step to the following candidate: newer to older through the ring,
    /// then the static words, then back to the insertion slot.
    #[must_use]
    pub fn next(&self, cursor: WordCursor) -> WordCursor {
        match cursor {
            WordCursor::Static(k) => self.after_static(k + 1),
            WordCursor::Dynamic(i) => {
                let n = self.nodes[i].next;
                if n == self.insert_at || self.nodes[n].word.is_none() {
                    self.after_static(0)
                } else {
                    WordCursor::Dynamic(n)
                }
            }
        }
    }

    fn after_static(&self, k: usize) -> WordCursor {
        if k < self.statics.len() {
            WordCursor::Static(k)
        } else {
            WordCursor::Dynamic(self.insert_at)
        }
    }

    /// Number of steps in one full cycle of [`next`](Self::next).
    #[must_use]
    pub fn cycle_len(&self) -> usize {
        self.nodes.len() + self.statics.len()
    }

    /// Drop later copies of the dynamic word at `cursor`.
    ///
    /// The word is flagged unique first. Copies further along the ring are
    /// freed and moved to the reuse end, passing their flag on; the sweep
    /// stops at a copy that was already unique, since everything past it
    /// was swept before. Static words and already-unique words are left
    /// alone. Returns the number of copies removed.
    pub fn remove_duplicates(&mut self, cursor: WordCursor) -> usize {
        let WordCursor::Dynamic(keep) = cursor else {
            return 0;
        };
        if self.nodes[keep].unique || self.nodes[keep].word.is_none() {
            return 0;
        }
        self.nodes[keep].unique = true;

        let mut removed = 0;
        let mut k = self.nodes[keep].next;
        while k != keep && self.nodes[k].word.is_some() {
            let following = self.nodes[k].next;
            if self.nodes[k].word == self.nodes[keep].word {
                self.demote(k);
                self.nodes[k].word = None;
                removed += 1;
                if std::mem::take(&mut self.nodes[k].unique) {
                    break;
                }
            }
            k = following;
        }
        removed
    }

    /// Dynamic words, oldest first.
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = &[u8]> {
        let mut i = self.insert_at;
        let mut steps = 0;
        std::iter::from_fn(move || {
            while steps < self.nodes.len() {
                i = self.nodes[i].prev;
                steps += 1;
                if let Some(word) = self.nodes[i].word.as_deref() {
                    return Some(word);
                }
            }
            None
        })
    }
}
