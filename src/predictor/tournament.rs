//! Implementation of a "tournament" predictor.
//!
//! A local predictor (per-branch history selecting a 3-bit counter) and a
//! global predictor (global history selecting a 2-bit counter) compete for
//! each branch. A third table of 2-bit "chooser" counters, indexed by the
//! program counter XOR'ed with global history, selects the winner.
//!
//! See "The Alpha 21264 Microprocessor" (Kessler, 1999).

use crate::Outcome;
use crate::error::ConfigError;
use crate::history::*;
use crate::predictor::*;

/// Configuration for a [`TournamentPredictor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TournamentConfig {
    /// Number of global history bits. The global table and the chooser
    /// table both have `1 << global_bits` entries.
    pub global_bits: usize,

    /// Number of program counter bits used to select a local history
    /// register.
    pub local_index_bits: usize,

    /// Width of each local history register. The local table has
    /// `1 << local_history_bits` entries.
    pub local_history_bits: usize,
}
impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            global_bits: 13,
            local_index_bits: 11,
            local_history_bits: 11,
        }
    }
}

impl PredictorConfig for TournamentConfig {
    type Output = TournamentPredictor;

    fn validate(&self) -> Result<(), ConfigError> {
        check_width("tournament global history", self.global_bits,
            MAX_INDEX_BITS)?;
        check_width("tournament local index", self.local_index_bits,
            MAX_INDEX_BITS)?;
        check_width("tournament local history", self.local_history_bits,
            MAX_INDEX_BITS)
    }

    fn storage_bits(&self) -> usize {
        let global  = Counter2::BITS << self.global_bits;
        let chooser = Counter2::BITS << self.global_bits;
        let local   = Counter3::BITS << self.local_history_bits;
        let lht     = self.local_history_bits << self.local_index_bits;
        global + chooser + local + lht + self.global_bits
    }

    fn build(self) -> Result<TournamentPredictor, ConfigError> {
        self.validate()?;
        Ok(TournamentPredictor {
            lht: LocalHistoryTable::new(
                1 << self.local_index_bits,
                self.local_history_bits
            ),
            local: Table::new(self.local_history_bits, Counter3::N0),
            global: Table::new(self.global_bits, Counter2::WeakNotTaken),
            chooser: Table::new(self.global_bits, Counter2::WeakNotTaken),
            ghr: HistoryRegister::new(self.global_bits),
            cfg: self,
        })
    }
}

/// Container for output from [`TournamentPredictor::predict`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TournamentPrediction {
    /// The selected direction
    pub outcome: Outcome,

    /// Direction predicted by the local component
    pub local: Outcome,

    /// Direction predicted by the global component
    pub global: Outcome,
}
impl From<TournamentPrediction> for Outcome {
    fn from(p: TournamentPrediction) -> Outcome { p.outcome }
}

/// The hybrid local/global predictor.
#[derive(Clone, Debug)]
pub struct TournamentPredictor {
    pub cfg: TournamentConfig,

    /// Per-branch history registers
    lht: LocalHistoryTable,

    /// Counters indexed by local history
    local: Table<Counter3>,

    /// Counters indexed by global history
    global: Table<Counter2>,

    /// Counters indexed by global history and the program counter.
    /// A taken prediction selects the local component.
    chooser: Table<Counter2>,

    /// Global history register
    ghr: HistoryRegister,
}
impl TournamentPredictor {
    fn local_index(&self, pc: u32) -> usize {
        self.lht.get(pc as usize)
    }

    fn global_index(&self) -> usize {
        self.ghr.low_bits(self.cfg.global_bits)
    }

    fn chooser_index(&self, pc: u32) -> usize {
        (pc as usize) ^ self.global_index()
    }

    /// Return the chooser counter used for the branch at `pc`.
    pub fn chooser_entry(&self, pc: u32) -> Counter2 {
        *self.chooser.get_entry(self.chooser_index(pc))
    }

    /// Return the local history register used for the branch at `pc`.
    pub fn local_history(&self, pc: u32) -> usize {
        self.local_index(pc)
    }

    pub fn ghr(&self) -> &HistoryRegister { &self.ghr }
}

impl Predictor for TournamentPredictor {
    type Prediction = TournamentPrediction;

    fn name(&self) -> &'static str { "Tournament" }

    fn predict(&self, pc: u32, _tgt: u32, _is_direct: bool)
        -> TournamentPrediction
    {
        let local  = self.local.get_entry(self.local_index(pc)).decode();
        let global = self.global.get_entry(self.global_index()).decode();
        let choice = self.chooser.get_entry(self.chooser_index(pc)).decode();
        let outcome = match choice {
            Outcome::T => local,
            Outcome::N => global,
        };
        TournamentPrediction { outcome, local, global }
    }

    fn update(&mut self,
        pc: u32,
        outcome: Outcome,
        prediction: TournamentPrediction
    )
    {
        let local_idx   = self.local_index(pc);
        let global_idx  = self.global_index();
        let chooser_idx = self.chooser_index(pc);

        let entry = self.local.get_entry_mut(local_idx);
        *entry = entry.train(outcome);
        let entry = self.global.get_entry_mut(global_idx);
        *entry = entry.train(outcome);

        // The chooser only moves when exactly one component was correct
        let local_hit  = prediction.local == outcome;
        let global_hit = prediction.global == outcome;
        let choice = self.chooser.get_entry_mut(chooser_idx);
        match (local_hit, global_hit) {
            (true, false) => *choice = choice.increment(),
            (false, true) => *choice = choice.decrement(),
            _ => {},
        }

        self.ghr.push(outcome);
        self.lht.push(pc as usize, outcome);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    fn small() -> TournamentPredictor {
        TournamentConfig {
            global_bits: 4,
            local_index_bits: 4,
            local_history_bits: 4,
        }.build().unwrap()
    }

    #[test]
    fn starts_with_global_component() {
        let p = small();
        let pred = p.predict(0x10, 0, true);
        assert_eq!(pred.local, Outcome::N);
        assert_eq!(pred.global, Outcome::N);
        assert_eq!(p.chooser_entry(0x10), Counter2::WeakNotTaken);
    }

    #[rstest]
    #[case(Outcome::N, Outcome::T, Outcome::T, Counter2::WeakTaken)]
    #[case(Outcome::T, Outcome::N, Outcome::T, Counter2::StrongNotTaken)]
    #[case(Outcome::T, Outcome::T, Outcome::T, Counter2::WeakNotTaken)]
    #[case(Outcome::N, Outcome::N, Outcome::T, Counter2::WeakNotTaken)]
    #[case(Outcome::T, Outcome::N, Outcome::N, Counter2::WeakTaken)]
    fn chooser_moves_only_on_disagreement(
        #[case] global: Outcome,
        #[case] local: Outcome,
        #[case] outcome: Outcome,
        #[case] expected: Counter2,
    ) {
        let mut p = small();
        let pc = 0x3;
        let before = p.chooser_index(pc);
        let receipt = TournamentPrediction { outcome: global, local, global };
        p.update(pc, outcome, receipt);
        assert_eq!(*p.chooser.get_entry(before), expected);
    }

    #[test]
    fn predict_does_not_change_state() {
        let mut p = small();
        for i in 0..40u32 {
            let pc = (i % 5) << 2;
            let pred = p.predict(pc, 0, true);
            p.update(pc, Outcome::from(i % 3 != 0), pred);
        }
        let ghr = p.ghr().low_bits(4);
        let local = p.local_history(0x8);
        let mut q = p.clone();

        let a = p.predict(0x8, 0, true);
        for _ in 0..3 {
            assert_eq!(p.predict(0x8, 0, true), a);
        }
        assert_eq!(p.ghr().low_bits(4), ghr);
        assert_eq!(p.local_history(0x8), local);

        // Repeated predictions leave nothing behind for the next update
        p.update(0x8, Outcome::T, a);
        let b = q.predict(0x8, 0, true);
        q.update(0x8, Outcome::T, b);
        for pc in (0..64u32).step_by(4) {
            assert_eq!(p.predict(pc, 0, true), q.predict(pc, 0, true));
            assert_eq!(p.chooser_entry(pc), q.chooser_entry(pc));
        }
    }

    #[test]
    fn histories_are_truncated() {
        let mut p = small();
        for _ in 0..20 {
            let pred = p.predict(0x5, 0, true);
            p.update(0x5, Outcome::T, pred);
        }
        assert_eq!(p.ghr().low_bits(64), 0b1111);
        assert_eq!(p.local_history(0x5), 0b1111);
        assert_eq!(p.local_history(0x6), 0);
    }

    #[test]
    fn learns_a_local_pattern() {
        // A branch with period 3 (T, T, N) is invisible to a single counter
        // but fully determined by 4 bits of local history.
        let mut p = small();
        let pattern = [Outcome::T, Outcome::T, Outcome::N];
        let mut hits = 0;
        for i in 0..300 {
            let outcome = pattern[i % 3];
            let pred = p.predict(0x40, 0, true);
            if i >= 240 && pred.local == outcome {
                hits += 1;
            }
            p.update(0x40, outcome, pred);
        }
        assert_eq!(hits, 60);
    }
}
