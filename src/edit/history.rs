//! Fixed-size ring of submitted lines with an independent recall cursor.

use crate::error::{Result, try_to_vec};

/// Direction of a history recall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recall {
    /// Towards older entries.
    Older,
    /// Towards newer entries.
    Newer,
}

/// Outcome of one step of a prefix search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchHit {
    /// Slot holding an entry that starts with the root.
    Entry(usize),
    /// The search came back around; restore the root text.
    Root,
}

/// State of a repeated prefix search through history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineSearch {
    current: usize,
    first: usize,
    root_len: usize,
}

impl LineSearch {
    /// Length of the prefix being searched for.
    #[must_use]
    pub fn root_len(&self) -> usize {
        self.root_len
    }
}

/// Circular history log.
///
/// `write` is the slot the next submitted line goes to; `pick` is the slot
/// currently shown by recall and is reset to `write` after every submit.
#[derive(Clone, Debug)]
pub struct HistoryRing {
    slots: Vec<Option<Vec<u8>>>,
    write: usize,
    pick: usize,
}

impl HistoryRing {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(2)],
            write: 0,
            pick: 0,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&[u8]> {
        self.slots.get(slot).and_then(|s| s.as_deref())
    }

    /// Slot the next line will be stored in.
    #[must_use]
    pub fn write_slot(&self) -> usize {
        self.write
    }

    /// Slot recall is positioned on.
    #[must_use]
    pub fn pick_slot(&self) -> usize {
        self.pick
    }

    fn older(&self, slot: usize) -> usize {
        if slot == 0 {
            self.slots.len() - 1
        } else {
            slot - 1
        }
    }

    fn newer(&self, slot: usize) -> usize {
        (slot + 1) % self.slots.len()
    }

    /// Most recently stored entry.
    #[must_use]
    pub fn newest(&self) -> Option<&[u8]> {
        self.get(self.older(self.write))
    }

    /// Store `line` at the write slot, replacing its previous owner, and
    /// advance. Returns the line evicted, if any.
    pub fn put(&mut self, line: &[u8]) -> Result<Option<Vec<u8>>> {
        let copy = try_to_vec(line)?;
        let evicted = self.slots[self.write].replace(copy);
        self.write = self.newer(self.write);
        Ok(evicted)
    }

    /// Point recall back at the write slot.
    pub fn reset_pick(&mut self) {
        self.pick = self.write;
    }

    /// Step recall one slot and return the text to show.
    ///
    /// `current` is the buffer being left; it replaces the stored text of
    /// the slot being vacated when the two differ, so edits made while
    /// browsing are kept. Nothing changes when the target slot is empty.
    pub fn recall(&mut self, direction: Recall, current: &[u8]) -> Result<Option<Vec<u8>>> {
        let target = match direction {
            Recall::Older => self.older(self.pick),
            Recall::Newer => self.newer(self.pick),
        };
        let Some(text) = self.get(target) else {
            return Ok(None);
        };
        let text = try_to_vec(text)?;

        if self.get(self.pick) != Some(current) {
            self.slots[self.pick] = Some(try_to_vec(current)?);
        }
        self.pick = target;
        Ok(Some(text))
    }

    /// Begin a prefix search anchored at the write slot.
    #[must_use]
    pub fn start_search(&self, root_len: usize) -> LineSearch {
        LineSearch {
            current: self.write,
            first: self.write,
            root_len,
        }
    }

    /// Find the nearest entry older than the last hit that starts with
    /// `root`. Arriving back at the anchor yields [`SearchHit::Root`].
    pub fn search_back(&self, search: &mut LineSearch, root: &[u8]) -> Option<SearchHit> {
        let mut slot = search.current;
        for _ in 1..self.slots.len() {
            slot = self.older(slot);
            if slot == search.first {
                search.current = slot;
                return Some(SearchHit::Root);
            }
            if self.get(slot).is_some_and(|text| text.starts_with(root)) {
                search.current = slot;
                return Some(SearchHit::Entry(slot));
            }
        }
        None
    }

    /// Stored lines, oldest first.
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = &[u8]> {
        let n = self.slots.len();
        (0..n).filter_map(move |k| self.get((self.write + k) % n))
    }
}
