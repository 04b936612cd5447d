
use crate::Outcome;
use crate::error::ConfigError;
use crate::predictor::*;

/// A simple predictor with no state: always predict the same direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaticPredictor {
    direction: Outcome,
}
impl StaticPredictor {
    pub fn new(direction: Outcome) -> Self {
        Self { direction }
    }
}
impl Default for StaticPredictor {
    fn default() -> Self { Self::new(Outcome::T) }
}

impl Predictor for StaticPredictor {
    type Prediction = Outcome;
    fn name(&self) -> &'static str { "Static" }
    fn predict(&self, _pc: u32, _tgt: u32, _is_direct: bool) -> Outcome {
        self.direction
    }
    fn update(&mut self, _pc: u32, _outcome: Outcome, _prediction: Outcome) {}
}

/// Configuration for a [`StaticPredictor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaticConfig {
    pub direction: Outcome,
}
impl Default for StaticConfig {
    fn default() -> Self { Self { direction: Outcome::T } }
}
impl PredictorConfig for StaticConfig {
    type Output = StaticPredictor;
    fn validate(&self) -> Result<(), ConfigError> { Ok(()) }
    fn storage_bits(&self) -> usize { 0 }
    fn build(self) -> Result<StaticPredictor, ConfigError> {
        Ok(StaticPredictor::new(self.direction))
    }
}
