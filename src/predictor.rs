//! Implementations of different branch predictors.

pub mod table;
pub mod simple;
pub mod counter;
pub mod gshare;
pub mod tournament;
pub mod tage;
pub mod strategy;

pub use table::*;
pub use simple::*;
pub use counter::*;
pub use gshare::*;
pub use tournament::*;
pub use tage::*;
pub use strategy::*;

use crate::branch::*;
use crate::error::ConfigError;

/// Interface to a conditional branch direction predictor.
///
/// A prediction is made with [`Predictor::predict`] before the outcome of
/// a branch is known. The value returned by `predict` is a receipt: it must
/// be handed back to the matching call to [`Predictor::update`] (or
/// [`Predictor::train`]) once the branch resolves, and no other branch may
/// be predicted or trained in between.
pub trait Predictor {
    /// The receipt produced by [`Predictor::predict`].
    type Prediction: Copy + std::fmt::Debug + Into<Outcome>;

    fn name(&self) -> &'static str;

    /// Predict the direction of the branch at `pc`.
    ///
    /// This is called for every branch, including unconditional ones.
    fn predict(&self, pc: u32, tgt: u32, is_direct: bool) -> Self::Prediction;

    /// Update the internal state of the predictor with the resolved outcome
    /// of a conditional branch.
    fn update(&mut self, pc: u32, outcome: Outcome, prediction: Self::Prediction);

    /// Predict the direction of the branch described by some record.
    fn predict_record(&self, record: &BranchRecord) -> Self::Prediction {
        self.predict(record.pc, record.tgt, record.is_direct())
    }

    /// Train the predictor on a resolved branch. Only conditional branches
    /// change the state of the predictor.
    fn train(&mut self, record: &BranchRecord, prediction: Self::Prediction) {
        if record.is_conditional() {
            self.update(record.pc, record.outcome(), prediction);
        }
    }
}

/// Interface to the configuration of some [`Predictor`].
pub trait PredictorConfig: Clone + std::fmt::Debug {
    type Output: Predictor;

    /// Check that every parameter is in range.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get the [approximate] number of storage bits.
    fn storage_bits(&self) -> usize;

    /// Use this configuration to create a new predictor.
    fn build(self) -> Result<Self::Output, ConfigError>;
}

/// Check that some table index or tag width is usable.
pub(crate) fn check_width(knob: &'static str, bits: usize, max: usize)
    -> Result<(), ConfigError>
{
    if bits == 0 || bits > max {
        return Err(ConfigError::WidthOutOfRange { knob, bits, max });
    }
    Ok(())
}

/// Largest supported table index/tag width.
pub const MAX_INDEX_BITS: usize = 24;

/// Largest supported history register width.
pub const MAX_HISTORY_BITS: usize = 64;
