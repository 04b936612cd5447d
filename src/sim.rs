//! Replaying a trace through a predictor.

use std::time::Instant;
use tracing::{ debug, info };

use crate::branch::*;
use crate::predictor::*;
use crate::stats::*;

/// Drives a single [`Predictor`] over a stream of branch records.
///
/// Every record is presented to the predictor, but only conditional
/// branches train it and count towards the statistics.
pub struct Simulator<P: Predictor> {
    predictor: P,
    stats: BranchStats,

    /// Number of records seen (including unconditional branches)
    records: usize,
}
impl<P: Predictor> Simulator<P> {
    pub fn new(predictor: P) -> Self {
        Self {
            predictor,
            stats: BranchStats::new(),
            records: 0,
        }
    }

    pub fn predictor(&self) -> &P { &self.predictor }
    pub fn stats(&self) -> &BranchStats { &self.stats }
    pub fn num_records(&self) -> usize { self.records }

    /// Predict and then resolve a single branch.
    ///
    /// Returns the predicted direction for conditional branches.
    pub fn step(&mut self, record: &BranchRecord) -> Option<Outcome> {
        self.records += 1;
        let prediction = self.predictor.predict_record(record);
        if !record.is_conditional() {
            return None;
        }
        let predicted: Outcome = prediction.into();
        self.stats.record(record, predicted);
        if predicted != record.outcome() {
            debug!("mispredicted {:#010x} ({:?})", record.pc, record.outcome());
        }
        self.predictor.train(record, prediction);
        Some(predicted)
    }

    /// Replay every record from some trace.
    pub fn run<'a>(&mut self, trace: impl IntoIterator<Item = &'a BranchRecord>) {
        let start = Instant::now();
        let before = self.stats.global_brns();
        for record in trace {
            self.step(record);
        }
        info!("{}: simulated {} conditional branches in {:.3?}",
            self.predictor.name(),
            self.stats.global_brns() - before,
            start.elapsed()
        );
    }

    pub fn into_parts(self) -> (P, BranchStats) {
        (self.predictor, self.stats)
    }
}

/// Replay a trace through some predictor and return the statistics.
pub fn simulate<P: Predictor>(predictor: P, trace: &[BranchRecord])
    -> (P, BranchStats)
{
    let mut sim = Simulator::new(predictor);
    sim.run(trace);
    sim.into_parts()
}
