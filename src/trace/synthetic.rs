//! Generating small synthetic traces.
//!
//! A [`SyntheticTrace`] is a set of conditional branches which are executed
//! in order, over and over, like the body of a loop. Each branch follows
//! some [`Behavior`]. Unconditional branches can be mixed in at random.
//! The output only depends on the seed.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::branch::*;

/// Address of the first generated branch.
const BASE_PC: u32 = 0x0040_0000;

/// Distance between generated branches.
const PC_STRIDE: u32 = 0x24;

/// Clamp some value into a probability. NaN is treated as zero.
fn probability(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

/// How a synthetic conditional branch resolves.
#[derive(Clone, Debug, PartialEq)]
pub enum Behavior {
    /// Taken with some fixed probability
    Biased { taken: f64 },

    /// The back-edge of a loop: taken `trip_count - 1` times, then not-taken
    Loop { trip_count: usize },

    /// Alternate between taken and not-taken
    Alternating,

    /// Repeat a fixed sequence of outcomes
    Pattern(Vec<Outcome>),

    /// Resolve the same way as the most recent execution of another branch
    Correlated { source: usize },
}

#[derive(Clone, Debug)]
struct SyntheticBranch {
    pc: u32,
    behavior: Behavior,
    /// Number of times this branch has been executed
    count: usize,
    last: Outcome,
}

/// A deterministic generator of branch records.
#[derive(Clone, Debug)]
pub struct SyntheticTrace {
    rng: StdRng,
    branches: Vec<SyntheticBranch>,

    /// Probability of an unconditional branch before each conditional one
    unconditional_rate: f64,
}
impl SyntheticTrace {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            branches: Vec::new(),
            unconditional_rate: 0.0,
        }
    }

    /// Add a conditional branch with some behavior.
    pub fn branch(mut self, behavior: Behavior) -> Self {
        let pc = BASE_PC + (self.branches.len() as u32) * PC_STRIDE;
        self.branches.push(SyntheticBranch {
            pc, behavior, count: 0, last: Outcome::N
        });
        self
    }

    /// Insert unconditional calls, returns, and jumps with the given
    /// probability.
    pub fn unconditional_rate(mut self, rate: f64) -> Self {
        self.unconditional_rate = probability(rate);
        self
    }

    /// Return the program counter of the branch at `idx`.
    pub fn pc(&self, idx: usize) -> Option<u32> {
        self.branches.get(idx).map(|b| b.pc)
    }

    fn resolve(&mut self, idx: usize) -> Outcome {
        let count = self.branches[idx].count;
        let outcome = match &self.branches[idx].behavior {
            Behavior::Biased { taken } => {
                Outcome::from(self.rng.gen_bool(probability(*taken)))
            },
            Behavior::Loop { trip_count } => {
                Outcome::from((count + 1) % (*trip_count).max(1) != 0)
            },
            Behavior::Alternating => Outcome::from(count % 2 == 0),
            Behavior::Pattern(pat) if pat.is_empty() => Outcome::N,
            Behavior::Pattern(pat) => pat[count % pat.len()],
            Behavior::Correlated { source } => {
                self.branches.get(*source).map_or(Outcome::N, |b| b.last)
            },
        };
        let b = &mut self.branches[idx];
        b.count += 1;
        b.last = outcome;
        outcome
    }

    fn random_unconditional(&mut self, pc: u32) -> BranchRecord {
        let kind = match self.rng.gen_range(0..4) {
            0 => BranchKind::DirectJump,
            1 => BranchKind::DirectCall,
            2 => BranchKind::IndirectCall,
            _ => BranchKind::Return,
        };
        let tgt = self.rng.gen::<u32>() & !0b11;
        BranchRecord::new(pc - 4, tgt, kind, Outcome::T)
    }

    /// Generate records until `num_conditional` conditional branches have
    /// been emitted.
    pub fn generate(&mut self, num_conditional: usize) -> Vec<BranchRecord> {
        let mut res = Vec::with_capacity(num_conditional);
        if self.branches.is_empty() {
            return res;
        }
        for i in 0..num_conditional {
            let idx = i % self.branches.len();
            let pc = self.branches[idx].pc;
            if self.unconditional_rate > 0.0
                && self.rng.gen_bool(self.unconditional_rate)
            {
                let r = self.random_unconditional(pc);
                res.push(r);
            }
            let outcome = self.resolve(idx);
            res.push(BranchRecord::conditional(pc, pc + 0x40, outcome));
        }
        res
    }
}
