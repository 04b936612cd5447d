//! Helpers for collecting statistics.

use std::collections::*;
use crate::branch::*;
use bitvec::prelude::*;
use itertools::*;

/// Number of conditional branches in one MPKB sample.
pub const MPKB_WINDOW: usize = 1000;

/// Container for recording simple statistics while evaluating some model.
#[derive(Clone, Debug, Default)]
pub struct BranchStats {
    /// Per-branch statistics (indexed by program counter value).
    pub data: BTreeMap<u32, BranchData>,

    /// Number of correct predictions
    pub global_hits: usize,

    /// Number of times any conditional branch instruction was executed
    pub global_brns: usize,

    /// Number of mispredictions in each completed window of
    /// [`MPKB_WINDOW`] branches
    pub mpkb_samples: Vec<usize>,

    /// Mispredictions in the current (incomplete) window
    mpkb_window: usize,
}
impl BranchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the global hit rate.
    pub fn hit_rate(&self) -> f64 {
        if self.global_brns == 0 {
            return 0.0;
        }
        self.global_hits as f64 / self.global_brns as f64
    }

    /// Return the global hit count.
    pub fn global_hits(&self) -> usize { self.global_hits }

    /// Return the global miss count.
    pub fn global_miss(&self) -> usize { self.global_brns - self.global_hits }

    /// Return the total branch count.
    pub fn global_brns(&self) -> usize { self.global_brns }

    /// Return the number of mispredictions per 1000 branches.
    pub fn mpkb(&self) -> f64 {
        if self.global_brns == 0 {
            return 0.0;
        }
        (self.global_miss() * MPKB_WINDOW) as f64 / self.global_brns as f64
    }

    /// Record the prediction made for a conditional branch.
    pub fn record(&mut self, record: &BranchRecord, predicted: Outcome) {
        self.update_global(record, predicted);
        self.update_per_branch(record, predicted);
    }

    /// Update global statistics.
    pub fn update_global(&mut self, record: &BranchRecord, predicted: Outcome) {
        let hit = predicted == record.outcome();
        self.global_brns += 1;
        if hit {
            self.global_hits += 1;
        } else {
            self.mpkb_window += 1;
        }
        if self.global_brns % MPKB_WINDOW == 0 {
            self.mpkb_samples.push(self.mpkb_window);
            self.mpkb_window = 0;
        }
    }

    /// Update per-branch statistics.
    pub fn update_per_branch(&mut self,
        record: &BranchRecord, predicted: Outcome)
    {
        let hit = predicted == record.outcome();
        let data = self.get_mut(record.pc);
        data.occ += 1;
        data.pat.push(record.outcome().into());
        if hit { data.hits += 1; }
    }

    /// Returns a reference to data collected for a particular branch.
    pub fn get(&self, pc: u32) -> Option<&BranchData> {
        self.data.get(&pc)
    }

    /// Returns a mutable reference to data collected for a particular branch.
    /// Creates a new entry if one doesn't already exist.
    pub fn get_mut(&mut self, pc: u32) -> &mut BranchData {
        self.data.entry(pc).or_default()
    }

    /// Returns the number of unique observed branch instructions.
    pub fn num_unique_branches(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of branches that only occur once.
    pub fn num_single_occurrence(&self) -> usize {
        self.data.values().filter(|entry| entry.occ == 1).count()
    }

    /// Returns the number of branches that are always taken
    pub fn num_always_taken(&self) -> usize {
        self.data.values().filter(|entry| entry.is_always_taken()).count()
    }

    /// Returns the number of branches that are never taken
    pub fn num_never_taken(&self) -> usize {
        self.data.values().filter(|entry| entry.is_never_taken()).count()
    }

    /// Return the `n` most frequently executed branches.
    pub fn get_common_branches(&self, n: usize) -> Vec<(u32, &BranchData)> {
        self.data.iter()
            .sorted_by_key(|(_, s)| s.occ)
            .rev()
            .take(n)
            .map(|(pc, s)| (*pc, s))
            .collect()
    }

    /// Return the `n` branches with the lowest hit rate, ignoring branches
    /// that were executed fewer than `min_occ` times.
    pub fn get_low_rate_branches(&self, n: usize, min_occ: usize)
        -> Vec<(u32, &BranchData)>
    {
        self.data.iter()
            .filter(|(_, s)| s.occ >= min_occ)
            .sorted_by(|x, y| {
                x.1.hit_rate().total_cmp(&y.1.hit_rate())
                    .then(y.1.occ.cmp(&x.1.occ))
            })
            .take(n)
            .map(|(pc, s)| (*pc, s))
            .collect()
    }
}

/// Container for per-branch statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BranchData {
    /// Number of times this branch was encountered.
    pub occ: usize,

    /// Number of correct predictions for this branch.
    pub hits: usize,

    /// Record of all observed outcomes for this branch.
    pub pat: BitVec,
}
impl BranchData {
    /// Return the hit rate for this branch.
    pub fn hit_rate(&self) -> f64 {
        if self.occ == 0 {
            return 0.0;
        }
        self.hits as f64 / self.occ as f64
    }

    pub fn is_always_taken(&self) -> bool {
        self.pat.count_ones() == self.pat.len()
    }

    pub fn is_never_taken(&self) -> bool {
        self.pat.count_zeros() == self.pat.len()
    }

    pub fn times_taken(&self) -> usize {
        self.pat.count_ones()
    }

    /// Render the first `n` observed outcomes (oldest first).
    pub fn pattern(&self, n: usize) -> String {
        let n = n.min(self.pat.len());
        Outcome::vec_from_bitslice(&self.pat[..n]).iter()
            .map(|o| format!("{:?}", o))
            .collect()
    }

    // NOTE: Remember that this isn't too useful apart from telling you
    // whether some sequence of outcomes is mixed or uniform.
    pub fn shannon_entropy(&self) -> f64 {
        let n   = self.pat.len() as f64;
        let n_t = self.pat.count_ones();
        let n_f = self.pat.count_zeros();

        let p_t = (n_t as f64) / n;
        let p_f = (n_f as f64) / n;

        let res = -(p_t * p_t.log2() + p_f * p_f.log2());
        if res.is_nan() { 0.0 } else { res }
    }
}
