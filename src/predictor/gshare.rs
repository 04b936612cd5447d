//! Implementation of the "gshare" predictor.
//!
//! See "Combining Branch Predictors" (McFarling, 1993).

use crate::Outcome;
use crate::error::ConfigError;
use crate::history::*;
use crate::predictor::*;

/// Configuration for a [`GsharePredictor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GshareConfig {
    /// Number of global history bits. This is also the number of bits used
    /// to index into the table of counters.
    pub history_bits: usize,
}
impl Default for GshareConfig {
    fn default() -> Self {
        Self { history_bits: 15 }
    }
}

impl PredictorConfig for GshareConfig {
    type Output = GsharePredictor;

    fn validate(&self) -> Result<(), ConfigError> {
        check_width("gshare history", self.history_bits, MAX_INDEX_BITS)
    }

    fn storage_bits(&self) -> usize {
        (Counter2::BITS << self.history_bits) + self.history_bits
    }

    fn build(self) -> Result<GsharePredictor, ConfigError> {
        self.validate()?;
        Ok(GsharePredictor {
            pht: Table::new(self.history_bits, Counter2::WeakNotTaken),
            ghr: HistoryRegister::new(self.history_bits),
            cfg: self,
        })
    }
}

/// A single table of 2-bit counters, indexed by the program counter XOR'ed
/// with global history.
#[derive(Clone, Debug)]
pub struct GsharePredictor {
    pub cfg: GshareConfig,

    /// Pattern history table
    pht: Table<Counter2>,

    /// Global history register
    ghr: HistoryRegister,
}
impl GsharePredictor {
    fn index(&self, pc: u32) -> usize {
        let bits = self.cfg.history_bits;
        (pc as usize) ^ self.ghr.low_bits(bits)
    }

    pub fn pht(&self) -> &Table<Counter2> { &self.pht }
    pub fn ghr(&self) -> &HistoryRegister { &self.ghr }
}

impl Predictor for GsharePredictor {
    type Prediction = Outcome;

    fn name(&self) -> &'static str { "Gshare" }

    fn predict(&self, pc: u32, _tgt: u32, _is_direct: bool) -> Outcome {
        self.pht.get_entry(self.index(pc)).decode()
    }

    fn update(&mut self, pc: u32, outcome: Outcome, _prediction: Outcome) {
        let idx = self.index(pc);
        let entry = self.pht.get_entry_mut(idx);
        *entry = entry.train(outcome);
        self.ghr.push(outcome);
    }
}
