//! Implementation of a "TAgged GEometric history length" (TAGE) predictor.

pub mod component;
pub mod stat;
pub mod config;

pub use component::*;
pub use stat::*;
pub use config::*;

use tracing::{ debug, warn };

use crate::history::*;
use crate::Outcome;
use crate::predictor::*;

/// Identifies a particular component in a [`TagePredictor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TageProvider {
    /// The base component
    Base,

    /// A tagged component
    Tagged(usize),
}

/// Container for output from [`TagePredictor::predict`], including the
/// predicted outcome and the components that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagePrediction {
    /// A predicted direction
    pub outcome: Outcome,

    /// The component providing the prediction
    pub provider: TageProvider,

    /// The component that would have provided the prediction if the
    /// provider had missed
    pub alt_provider: TageProvider,

    /// Predicted direction from the alternate component
    pub alt_outcome: Outcome,
}
impl From<TagePrediction> for Outcome {
    fn from(p: TagePrediction) -> Outcome { p.outcome }
}

/// The "TAgged GEometric history length" predictor.
///
/// See the following:
///  - "A case for (partially) TAgged GEometric history length branch
///  prediction" (Seznec, 2006).
///
/// NOTE: Tagged components are stored from the shortest history length
/// (id 0) to the longest, so "longer history" always means "larger id".
#[derive(Clone, Debug)]
pub struct TagePredictor {
    /// The configuration used to create this object
    pub cfg: TageConfig,

    pub stat: TageStats,

    /// Base component
    pub(crate) base: TageBaseComponent,

    /// Tagged components
    pub(crate) comp: Vec<TageComponent>,

    /// Global history register
    pub(crate) ghr: HistoryRegister,

    /// Number of updates since all 'useful' counters were last halved
    pub(crate) train_count: usize,
}

impl TagePredictor {
    /// Resolve a provider from some receipt. A tagged provider that does not
    /// exist in this predictor is treated as the base component.
    fn checked_provider(&self, provider: TageProvider) -> TageProvider {
        match provider {
            TageProvider::Tagged(id) if id >= self.comp.len() => {
                warn!("no tagged component {id}, using the base component");
                TageProvider::Base
            },
            p => p,
        }
    }

    /// Return the direction currently predicted by some component for the
    /// branch at `pc`. For a tagged component, this is the entry at the
    /// index for `pc` whether or not its tag matches.
    fn provider_outcome(&self, pc: u32, provider: TageProvider) -> Outcome {
        match provider {
            TageProvider::Base => self.base.predict(pc),
            TageProvider::Tagged(id) => {
                let c = &self.comp[id];
                c.get_entry(c.get_index(pc, &self.ghr)).predict()
            },
        }
    }

    /// Given the provider of an incorrect prediction, select the tagged
    /// component that will be used to allocate a new entry: the one with
    /// the longest history whose entry for `pc` is not useful.
    ///
    /// Returns [None] if every candidate is useful.
    fn alloc(&self, pc: u32, provider: TageProvider) -> Option<usize> {
        let first = match provider {
            TageProvider::Base => 0,
            TageProvider::Tagged(id) => id + 1,
        };
        (first..self.comp.len()).rev().find(|&id| {
            let c = &self.comp[id];
            c.get_entry(c.get_index(pc, &self.ghr)).useful.is_zero()
        })
    }

    /// Update the predictor to account for a misprediction by trying to
    /// allocate an entry in some component with a longer history.
    fn update_incorrect(&mut self,
        pc: u32,
        provider: TageProvider,
        outcome: Outcome
    )
    {
        if let Some(id) = self.alloc(pc, provider) {
            let c = &mut self.comp[id];
            let idx = c.get_index(pc, &self.ghr);
            let tag = c.get_tag(pc, &self.ghr);
            *c.get_entry_mut(idx) = TageEntry::allocate(tag, outcome);
            self.stat.alcs += 1;
            debug!("allocated {pc:#010x} in component {id} (idx={idx:#x}, tag={tag:#x})");
        }
        else {
            // Every longer component is useful here: make them all a bit
            // less useful so that some entry can be replaced later.
            let first = match provider {
                TageProvider::Base => 0,
                TageProvider::Tagged(id) => id + 1,
            };
            for c in self.comp[first..].iter_mut() {
                let idx = c.get_index(pc, &self.ghr);
                c.get_entry_mut(idx).decrement_useful();
            }
            self.stat.failed_alcs += 1;
            debug!("failed to allocate {pc:#010x}");
        }
    }

    /// Halve the 'useful' counter in every tagged component.
    fn age(&mut self) {
        for c in self.comp.iter_mut() {
            c.age_useful_bits();
        }
        self.stat.agings += 1;
        debug!("aged all useful counters (clk={})", self.stat.clk);
    }
}

/// The public interface to a [`TagePredictor`].
impl TagePredictor {
    /// Return the number of tagged components.
    pub fn num_tagged_components(&self) -> usize {
        self.comp.len()
    }

    pub fn base(&self) -> &TageBaseComponent { &self.base }

    pub fn component(&self, id: usize) -> Option<&TageComponent> {
        self.comp.get(id)
    }

    pub fn components(&self) -> &[TageComponent] { &self.comp }

    pub fn ghr(&self) -> &HistoryRegister { &self.ghr }

    /// Return the number of updates since the last aging event.
    pub fn train_count(&self) -> usize { self.train_count }
}

impl Predictor for TagePredictor {
    type Prediction = TagePrediction;

    fn name(&self) -> &'static str { "TAGE" }

    fn predict(&self, pc: u32, _tgt: u32, _is_direct: bool) -> TagePrediction {
        let base_outcome = self.base.predict(pc);
        let mut result = TagePrediction {
            outcome: base_outcome,
            provider: TageProvider::Base,
            alt_provider: TageProvider::Base,
            alt_outcome: base_outcome,
        };

        // The first hit (from the longest history) provides the prediction,
        // and the next hit provides the alternate prediction.
        let mut hits = self.comp.iter().rev()
            .filter_map(|c| c.lookup(pc, &self.ghr).map(|e| (c.id, e)));
        if let Some((id, entry)) = hits.next() {
            result.provider = TageProvider::Tagged(id);
            result.outcome = entry.predict();
            if let Some((alt_id, alt_entry)) = hits.next() {
                result.alt_provider = TageProvider::Tagged(alt_id);
                result.alt_outcome = alt_entry.predict();
            }
        }
        result
    }

    fn update(&mut self, pc: u32, outcome: Outcome, prediction: TagePrediction) {
        let provider = self.checked_provider(prediction.provider);
        let alt_provider = self.checked_provider(prediction.alt_provider);

        // Both predictions are read before any state changes
        let main_pred = self.provider_outcome(pc, provider);
        let alt_pred = self.provider_outcome(pc, alt_provider);

        match provider {
            TageProvider::Base => {
                self.base.update(pc, outcome);
                if main_pred == outcome {
                    self.stat.base_hits += 1;
                } else {
                    self.stat.base_miss += 1;
                }
            },
            TageProvider::Tagged(id) => {
                let c = &mut self.comp[id];
                let idx = c.get_index(pc, &self.ghr);
                let entry = c.get_entry_mut(idx);
                entry.ctr = entry.ctr.train(outcome);

                // The entry is only useful when it disagrees with the
                // alternate prediction
                match (main_pred == outcome, alt_pred == outcome) {
                    (true, false) => entry.increment_useful(),
                    (false, true) => entry.decrement_useful(),
                    _ => {},
                }
                if main_pred == outcome {
                    self.stat.comp_hits[id] += 1;
                } else {
                    self.stat.comp_miss[id] += 1;
                }
            },
        }

        if main_pred != outcome {
            self.update_incorrect(pc, provider, outcome);
        }

        self.stat.clk += 1;
        self.train_count += 1;
        if self.train_count == self.cfg.aging_interval {
            self.train_count = 0;
            self.age();
        }

        self.ghr.push(outcome);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    const PC: u32 = 0x0010_0000;

    fn tage() -> TagePredictor {
        TageConfig::default().build().unwrap()
    }

    fn step(p: &mut TagePredictor, pc: u32, outcome: Outcome) -> TagePrediction {
        let pred = p.predict(pc, 0, true);
        p.update(pc, outcome, pred);
        pred
    }

    fn tags(p: &TagePredictor) -> Vec<Vec<u32>> {
        p.comp.iter().map(|c| c.data.iter().map(|e| e.tag).collect())
            .collect()
    }

    #[test]
    fn starts_with_base_prediction() {
        let p = tage();
        let pred = p.predict(PC, 0, true);
        assert_eq!(pred.provider, TageProvider::Base);
        assert_eq!(pred.alt_provider, TageProvider::Base);
        assert_eq!(pred.outcome, Outcome::N);
        assert_eq!(p.predict(PC, 0, true), pred);
    }

    #[test]
    fn misprediction_allocates_in_longest_component() {
        let mut p = tage();
        // With no history, the index for PC in component 'id' is just 'id'
        step(&mut p, PC, Outcome::T);
        assert_eq!(p.stat.alcs, 1);
        let entry = p.component(5).unwrap().get_entry(5);
        assert_eq!(entry.tag, 0x205);
        assert_eq!(entry.ctr, Counter3::T0);
        assert_eq!(entry.useful, Usefulness::U0);
        for id in 0..5 {
            assert_eq!(p.component(id).unwrap().get_entry(id).tag, 0);
        }
        assert_eq!(p.ghr().low_bits(1), 1);
    }

    #[test]
    fn allocated_entry_provides_while_its_tag_matches() {
        let mut p = tage();
        // Make the base component wrong about a not-taken branch. The
        // history stays all-zero, so indices and tags never move.
        let idx = p.base.get_index(PC);
        *p.base.data.get_entry_mut(idx) = Counter2::WeakTaken;

        let pred = step(&mut p, PC, Outcome::N);
        assert_eq!(pred.provider, TageProvider::Base);
        assert_eq!(pred.outcome, Outcome::T);
        assert_eq!(p.stat.base_miss, 1);
        assert_eq!(p.stat.alcs, 1);
        assert_eq!(p.comp[5].get_entry(5).tag, 0x205);
        assert_eq!(p.comp[5].get_entry(5).ctr, Counter3::N0);

        for _ in 0..2 {
            let pred = step(&mut p, PC, Outcome::N);
            assert_eq!(pred.provider, TageProvider::Tagged(5));
            assert_eq!(pred.alt_provider, TageProvider::Base);
            assert_eq!(pred.outcome, Outcome::N);
        }
        assert_eq!(p.stat.comp_hits[5], 2);
        assert_eq!(p.stat.alcs, 1);
        assert_eq!(p.comp[5].get_entry(5).ctr, Counter3::N2);
        // The alternate agreed both times
        assert_eq!(p.comp[5].get_entry(5).useful, Usefulness::U0);
        assert_eq!(p.base().get(PC), Counter2::WeakNotTaken);

        let pred = p.predict(PC, 0, true);
        assert_eq!(pred.provider, TageProvider::Tagged(5));
        assert_eq!(pred.outcome, Outcome::N);

        // Same index in every component, different tag
        let other = PC + 0x800;
        assert_eq!(p.comp[5].get_index(other, p.ghr()), 5);
        assert_eq!(p.comp[5].get_tag(other, p.ghr()), 0x204);
        assert_eq!(p.predict(other, 0, true).provider, TageProvider::Base);
    }

    #[test]
    fn allocation_skips_shorter_components() {
        let mut p = tage();
        *p.comp[2].get_entry_mut(2) = TageEntry::allocate(0x202, Outcome::T);
        let pred = p.predict(PC, 0, true);
        assert_eq!(pred.provider, TageProvider::Tagged(2));
        assert_eq!(pred.outcome, Outcome::T);

        p.update(PC, Outcome::N, pred);
        assert_eq!(p.comp[2].get_entry(2).ctr, Counter3::N0);
        assert_eq!(p.comp[5].get_entry(5).tag, 0x205);
        assert_eq!(p.comp[5].get_entry(5).ctr, Counter3::N0);
        assert_eq!(p.comp[4].get_entry(4).tag, 0);
        assert_eq!(p.comp[3].get_entry(3).tag, 0);
        assert_eq!(p.stat.comp_miss[2], 1);
    }

    #[test]
    fn failed_allocation_decrements_longer_components() {
        let mut p = tage();
        *p.comp[2].get_entry_mut(2) = TageEntry::allocate(0x202, Outcome::T);
        for id in 3..6 {
            p.comp[id].get_entry_mut(id).useful = Usefulness::U1;
        }
        p.comp[1].get_entry_mut(1).useful = Usefulness::U1;

        let pred = p.predict(PC, 0, true);
        p.update(PC, Outcome::N, pred);
        assert_eq!(p.stat.alcs, 0);
        assert_eq!(p.stat.failed_alcs, 1);
        for id in 3..6 {
            assert_eq!(p.comp[id].get_entry(id).useful, Usefulness::U0);
            assert_eq!(p.comp[id].get_entry(id).tag, 0);
        }
        assert_eq!(p.comp[1].get_entry(1).useful, Usefulness::U1);
    }

    #[test]
    fn usefulness_follows_alternate_disagreement() {
        let mut p = tage();
        // Provider in component 4 predicts taken, alternate (component 1)
        // predicts not-taken.
        *p.comp[4].get_entry_mut(4) = TageEntry::allocate(0x204, Outcome::T);
        *p.comp[1].get_entry_mut(1) = TageEntry::allocate(0x201, Outcome::N);
        let pred = p.predict(PC, 0, true);
        assert_eq!(pred.provider, TageProvider::Tagged(4));
        assert_eq!(pred.alt_provider, TageProvider::Tagged(1));
        assert_eq!(pred.alt_outcome, Outcome::N);

        p.update(PC, Outcome::T, pred);
        assert_eq!(p.comp[4].get_entry(4).useful, Usefulness::U1);
        assert_eq!(p.comp[4].get_entry(4).ctr, Counter3::T1);
        assert_eq!(p.comp[1].get_entry(1).ctr, Counter3::N0);
        assert_eq!(p.stat.comp_hits[4], 1);
        assert_eq!(p.stat.alcs, 0);
    }

    #[test]
    fn invalid_receipt_uses_base_component() {
        let mut p = tage();
        let receipt = TagePrediction {
            outcome: Outcome::N,
            provider: TageProvider::Tagged(17),
            alt_provider: TageProvider::Base,
            alt_outcome: Outcome::N,
        };
        p.update(PC, Outcome::N, receipt);
        assert_eq!(p.base().get(PC), Counter2::StrongNotTaken);
        assert_eq!(p.stat.base_hits, 1);
    }

    #[test]
    fn aging_halves_useful_counters() {
        let mut p = tage();
        p.comp[0].get_entry_mut(5).useful = Usefulness::U3;
        p.comp[3].get_entry_mut(100).useful = Usefulness::U2;
        p.comp[5].get_entry_mut(511).useful = Usefulness::U1;

        // An always-not-taken branch is always predicted correctly by the
        // base component, so nothing is ever allocated.
        for _ in 0..255_999 {
            step(&mut p, PC, Outcome::N);
        }
        assert_eq!(p.train_count(), 255_999);
        assert_eq!(p.stat.agings, 0);
        assert_eq!(p.comp[0].get_entry(5).useful, Usefulness::U3);
        assert_eq!(p.comp[3].get_entry(100).useful, Usefulness::U2);
        assert_eq!(p.comp[5].get_entry(511).useful, Usefulness::U1);

        step(&mut p, PC, Outcome::N);
        assert_eq!(p.train_count(), 0);
        assert_eq!(p.stat.agings, 1);
        assert_eq!(p.comp[0].get_entry(5).useful, Usefulness::U1);
        assert_eq!(p.comp[3].get_entry(100).useful, Usefulness::U1);
        assert_eq!(p.comp[5].get_entry(511).useful, Usefulness::U0);
        assert_eq!(p.stat.alcs, 0);
    }

    #[test]
    fn aging_interval_is_configurable() {
        let mut cfg = TageConfig::default();
        cfg.aging_interval = 3;
        let mut p = cfg.build().unwrap();
        p.comp[2].get_entry_mut(9).useful = Usefulness::U2;
        for _ in 0..6 {
            step(&mut p, PC, Outcome::N);
        }
        assert_eq!(p.stat.agings, 2);
        assert_eq!(p.comp[2].get_entry(9).useful, Usefulness::U0);
    }

    #[test]
    fn learns_an_alternating_branch() {
        let mut p = tage();
        for i in 0..200 {
            let outcome = Outcome::from(i % 2 == 0);
            let pred = step(&mut p, PC, outcome);
            if i >= 150 {
                assert_eq!(pred.outcome, outcome, "iteration {i}");
                assert!(matches!(pred.provider, TageProvider::Tagged(_)));
            }
        }
        assert!(p.stat.alcs > 0);
    }

    proptest! {
        #[test]
        fn allocation_only_replaces_longer_components(
            warmup in prop::collection::vec((0u32..64, any::<bool>()), 0..200),
            pc in 0u32..64,
            taken in any::<bool>(),
        ) {
            let mut p = TageConfig::with_history_lengths(4, 4, 6, &[1, 2, 4, 8])
                .build().unwrap();
            for (pc, taken) in warmup {
                step(&mut p, pc << 2, Outcome::from(taken));
            }
            let before = tags(&p);
            let pred = step(&mut p, pc << 2, Outcome::from(taken));
            let after = tags(&p);

            let first = match pred.provider {
                TageProvider::Base => 0,
                TageProvider::Tagged(id) => id + 1,
            };
            for id in 0..first {
                prop_assert_eq!(&before[id], &after[id]);
            }
            for c in p.comp.iter() {
                prop_assert!(c.data.iter().all(|e| e.useful.bits() <= 3));
            }
        }
    }
}
