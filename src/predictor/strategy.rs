//! Selecting one predictor for a whole simulation.

use clap::ValueEnum;
use tracing::warn;

use crate::Outcome;
use crate::error::ConfigError;
use crate::predictor::*;

/// The set of available prediction strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Strategy {
    /// Always predict taken
    Static,
    /// Global history XOR'ed with the program counter
    Gshare,
    /// Local/global hybrid with a chooser
    Tournament,
    /// Tagged geometric history lengths
    Tage,
}
impl Strategy {
    /// Return the default configuration for this strategy.
    pub fn default_config(self) -> AnyConfig {
        match self {
            Self::Static => AnyConfig::Static(StaticConfig::default()),
            Self::Gshare => AnyConfig::Gshare(GshareConfig::default()),
            Self::Tournament => {
                AnyConfig::Tournament(TournamentConfig::default())
            },
            Self::Tage => AnyConfig::Tage(TageConfig::default()),
        }
    }
}

/// Configuration for exactly one of the available predictors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnyConfig {
    Static(StaticConfig),
    Gshare(GshareConfig),
    Tournament(TournamentConfig),
    Tage(TageConfig),
}
impl AnyConfig {
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Static(_) => Strategy::Static,
            Self::Gshare(_) => Strategy::Gshare,
            Self::Tournament(_) => Strategy::Tournament,
            Self::Tage(_) => Strategy::Tage,
        }
    }
}

impl PredictorConfig for AnyConfig {
    type Output = AnyPredictor;

    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Static(c) => c.validate(),
            Self::Gshare(c) => c.validate(),
            Self::Tournament(c) => c.validate(),
            Self::Tage(c) => c.validate(),
        }
    }

    fn storage_bits(&self) -> usize {
        match self {
            Self::Static(c) => c.storage_bits(),
            Self::Gshare(c) => c.storage_bits(),
            Self::Tournament(c) => c.storage_bits(),
            Self::Tage(c) => c.storage_bits(),
        }
    }

    fn build(self) -> Result<AnyPredictor, ConfigError> {
        Ok(match self {
            Self::Static(c) => AnyPredictor::Static(c.build()?),
            Self::Gshare(c) => AnyPredictor::Gshare(c.build()?),
            Self::Tournament(c) => AnyPredictor::Tournament(c.build()?),
            Self::Tage(c) => AnyPredictor::Tage(Box::new(c.build()?)),
        })
    }
}

/// A receipt produced by [`AnyPredictor::predict`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnyPrediction {
    Static(Outcome),
    Gshare(Outcome),
    Tournament(TournamentPrediction),
    Tage(TagePrediction),
}
impl From<AnyPrediction> for Outcome {
    fn from(p: AnyPrediction) -> Outcome {
        match p {
            AnyPrediction::Static(o) | AnyPrediction::Gshare(o) => o,
            AnyPrediction::Tournament(p) => p.into(),
            AnyPrediction::Tage(p) => p.into(),
        }
    }
}

/// Exactly one predictor, chosen when the simulation starts.
#[derive(Clone, Debug)]
pub enum AnyPredictor {
    Static(StaticPredictor),
    Gshare(GsharePredictor),
    Tournament(TournamentPredictor),
    Tage(Box<TagePredictor>),
}
impl AnyPredictor {
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Static(_) => Strategy::Static,
            Self::Gshare(_) => Strategy::Gshare,
            Self::Tournament(_) => Strategy::Tournament,
            Self::Tage(_) => Strategy::Tage,
        }
    }

    /// Return the TAGE predictor, if that is the active strategy.
    pub fn as_tage(&self) -> Option<&TagePredictor> {
        match self {
            Self::Tage(p) => Some(p.as_ref()),
            _ => None,
        }
    }
}

impl Predictor for AnyPredictor {
    type Prediction = AnyPrediction;

    fn name(&self) -> &'static str {
        match self {
            Self::Static(p) => p.name(),
            Self::Gshare(p) => p.name(),
            Self::Tournament(p) => p.name(),
            Self::Tage(p) => p.name(),
        }
    }

    fn predict(&self, pc: u32, tgt: u32, is_direct: bool) -> AnyPrediction {
        match self {
            Self::Static(p) => {
                AnyPrediction::Static(p.predict(pc, tgt, is_direct))
            },
            Self::Gshare(p) => {
                AnyPrediction::Gshare(p.predict(pc, tgt, is_direct))
            },
            Self::Tournament(p) => {
                AnyPrediction::Tournament(p.predict(pc, tgt, is_direct))
            },
            Self::Tage(p) => {
                AnyPrediction::Tage(p.predict(pc, tgt, is_direct))
            },
        }
    }

    fn update(&mut self, pc: u32, outcome: Outcome, prediction: AnyPrediction) {
        match (self, prediction) {
            (Self::Static(p), AnyPrediction::Static(r)) => {
                p.update(pc, outcome, r)
            },
            (Self::Gshare(p), AnyPrediction::Gshare(r)) => {
                p.update(pc, outcome, r)
            },
            (Self::Tournament(p), AnyPrediction::Tournament(r)) => {
                p.update(pc, outcome, r)
            },
            (Self::Tage(p), AnyPrediction::Tage(r)) => {
                p.update(pc, outcome, r)
            },
            (p, r) => {
                warn!("{} predictor ignored a receipt from another strategy ({r:?})",
                    p.name());
            },
        }
    }
}
