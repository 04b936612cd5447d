
use bitvec::prelude::*;

use crate::Outcome;
use crate::history::*;
use crate::predictor::*;

/// Compute the index into the tagged component `table_id`.
///
/// The program counter (without its two low-order bits) is mixed with the
/// component number, so that components do not alias in the same way, and
/// with `history_len` bits of global history folded into `index_bits`.
pub fn tage_index(pc: u32, history: &BitSlice, history_len: usize,
    table_id: usize, index_bits: usize) -> usize
{
    let mask = (1 << index_bits) - 1;
    let pc_bits = ((pc as usize) >> 2) ^ table_id;
    let hist_bits = fold(history, history_len, index_bits);
    (pc_bits ^ hist_bits) & mask
}

/// Compute the tag for the tagged component `table_id`.
///
/// This uses the program counter bits directly above the ones consumed by
/// [`tage_index`], and folds history into `tag_bits` instead.
pub fn tage_tag(pc: u32, history: &BitSlice, history_len: usize,
    table_id: usize, index_bits: usize, tag_bits: usize) -> u32
{
    let mask = (1usize << tag_bits) - 1;
    let pc_bits = ((pc as usize) >> (2 + index_bits)) ^ table_id;
    let hist_bits = fold(history, history_len, tag_bits);
    ((pc_bits ^ hist_bits) & mask) as u32
}

/// A base component in the TAGE predictor, indexed only by program counter.
#[derive(Clone, Debug)]
pub struct TageBaseComponent {
    pub cfg: TageBaseConfig,

    /// A table of saturating counters
    pub(crate) data: Table<Counter2>,
}
impl TageBaseComponent {
    pub fn get_index(&self, pc: u32) -> usize {
        (pc as usize) >> 2
    }

    /// Return the counter used for the branch at `pc`.
    pub fn get(&self, pc: u32) -> Counter2 {
        *self.data.get_entry(self.get_index(pc))
    }

    pub fn predict(&self, pc: u32) -> Outcome {
        self.get(pc).decode()
    }

    pub fn update(&mut self, pc: u32, outcome: Outcome) {
        let idx = self.get_index(pc);
        let entry = self.data.get_entry_mut(idx);
        *entry = entry.train(outcome);
    }
}

/// An entry in some [`TageComponent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TageEntry {
    /// Tag associated with this entry
    pub tag: u32,

    /// State machine tracking a branch outcome
    pub ctr: Counter3,

    /// The 'useful' counter, used to determine when the entry is
    /// eligible to be replaced
    pub useful: Usefulness,
}
impl TageEntry {
    /// Create a freshly allocated entry which weakly predicts `outcome`.
    pub fn allocate(tag: u32, outcome: Outcome) -> Self {
        Self {
            tag,
            ctr: Counter3::weakest(outcome),
            useful: Usefulness::U0,
        }
    }

    /// Get the current predicted outcome.
    pub fn predict(&self) -> Outcome {
        self.ctr.decode()
    }

    /// Returns true if the provided tag matches this entry.
    pub fn tag_matches(&self, tag: u32) -> bool {
        self.tag == tag
    }

    /// Increment the 'useful' counter.
    pub fn increment_useful(&mut self) {
        self.useful = self.useful.increment();
    }

    /// Decrement the 'useful' counter.
    pub fn decrement_useful(&mut self) {
        self.useful = self.useful.decrement();
    }
}

/// A tagged component in the TAGE predictor.
#[derive(Clone, Debug)]
pub struct TageComponent {
    pub cfg: TageComponentConfig,

    /// Position of this component (0 has the shortest history)
    pub id: usize,

    /// Table of entries
    pub(crate) data: Table<TageEntry>,
}
impl TageComponent {
    pub fn get_index(&self, pc: u32, ghr: &HistoryRegister) -> usize {
        tage_index(pc, ghr.data(), self.cfg.history_len, self.id,
            self.cfg.index_bits)
    }

    pub fn get_tag(&self, pc: u32, ghr: &HistoryRegister) -> u32 {
        tage_tag(pc, ghr.data(), self.cfg.history_len, self.id,
            self.cfg.index_bits, self.cfg.tag_bits)
    }

    pub fn get_entry(&self, idx: usize) -> &TageEntry {
        self.data.get_entry(idx)
    }

    pub fn get_entry_mut(&mut self, idx: usize) -> &mut TageEntry {
        self.data.get_entry_mut(idx)
    }

    /// Return the entry for `pc` if its tag matches.
    pub fn lookup(&self, pc: u32, ghr: &HistoryRegister) -> Option<&TageEntry> {
        let entry = self.get_entry(self.get_index(pc, ghr));
        if entry.tag_matches(self.get_tag(pc, ghr)) {
            Some(entry)
        } else {
            None
        }
    }

    pub fn num_useful_entries(&self) -> usize {
        self.data.iter().filter(|e| !e.useful.is_zero()).count()
    }

    /// Halve the 'useful' counter for all entries in this component.
    pub fn age_useful_bits(&mut self) {
        for entry in self.data.iter_mut() {
            entry.useful = entry.useful.halve();
        }
    }
}
