//! Implementations of saturating counters.
//!
//! Every counter is a closed set of states with two total transition
//! functions and a decode function. Nothing here can fail: transitions
//! clamp at the ends of the range, and raw encodings that fall outside of
//! the range are replaced with the weak not-taken state.

use crate::Outcome;
use tracing::warn;

/// Interface to a saturating counter used to follow the behavior of a branch.
pub trait SaturatingCounter: Copy + Eq + std::fmt::Debug {
    /// Number of storage bits for one counter.
    const BITS: usize;

    /// Move one step toward "strongly taken", saturating at the end.
    fn increment(self) -> Self;

    /// Move one step toward "strongly not-taken", saturating at the end.
    fn decrement(self) -> Self;

    /// Return the predicted direction (the high-order bit of the state).
    fn decode(self) -> Outcome;

    /// Return the weakest state which predicts `outcome`.
    fn weakest(outcome: Outcome) -> Self;

    /// Return the raw encoding of this state.
    fn bits(self) -> u8;

    /// Build a counter from a raw encoding.
    fn from_bits(bits: u8) -> Self;

    /// Move toward the resolved outcome.
    fn train(self, outcome: Outcome) -> Self {
        match outcome {
            Outcome::T => self.increment(),
            Outcome::N => self.decrement(),
        }
    }
}

/// A 2-bit saturating counter.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Counter2 {
    StrongNotTaken = 0,
    #[default]
    WeakNotTaken = 1,
    WeakTaken = 2,
    StrongTaken = 3,
}

impl SaturatingCounter for Counter2 {
    const BITS: usize = 2;

    fn increment(self) -> Self {
        match self {
            Self::StrongNotTaken => Self::WeakNotTaken,
            Self::WeakNotTaken => Self::WeakTaken,
            Self::WeakTaken | Self::StrongTaken => Self::StrongTaken,
        }
    }

    fn decrement(self) -> Self {
        match self {
            Self::StrongNotTaken | Self::WeakNotTaken => Self::StrongNotTaken,
            Self::WeakTaken => Self::WeakNotTaken,
            Self::StrongTaken => Self::WeakTaken,
        }
    }

    fn decode(self) -> Outcome {
        Outcome::from(self.bits() & 0b10 != 0)
    }

    fn weakest(outcome: Outcome) -> Self {
        match outcome {
            Outcome::T => Self::WeakTaken,
            Outcome::N => Self::WeakNotTaken,
        }
    }

    fn bits(self) -> u8 { self as u8 }

    fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Self::StrongNotTaken,
            1 => Self::WeakNotTaken,
            2 => Self::WeakTaken,
            3 => Self::StrongTaken,
            _ => {
                warn!("invalid 2-bit counter state {bits}, using weak not-taken");
                Self::WeakNotTaken
            },
        }
    }
}

/// A 3-bit saturating counter.
///
/// `N3` is the strongest not-taken state and `N0` the weakest; likewise
/// `T0` is the weakest taken state and `T3` the strongest.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Counter3 {
    N3 = 0,
    N2 = 1,
    N1 = 2,
    #[default]
    N0 = 3,
    T0 = 4,
    T1 = 5,
    T2 = 6,
    T3 = 7,
}

impl SaturatingCounter for Counter3 {
    const BITS: usize = 3;

    fn increment(self) -> Self {
        match self {
            Self::N3 => Self::N2,
            Self::N2 => Self::N1,
            Self::N1 => Self::N0,
            Self::N0 => Self::T0,
            Self::T0 => Self::T1,
            Self::T1 => Self::T2,
            Self::T2 | Self::T3 => Self::T3,
        }
    }

    fn decrement(self) -> Self {
        match self {
            Self::N3 | Self::N2 => Self::N3,
            Self::N1 => Self::N2,
            Self::N0 => Self::N1,
            Self::T0 => Self::N0,
            Self::T1 => Self::T0,
            Self::T2 => Self::T1,
            Self::T3 => Self::T2,
        }
    }

    fn decode(self) -> Outcome {
        Outcome::from(self.bits() & 0b100 != 0)
    }

    fn weakest(outcome: Outcome) -> Self {
        match outcome {
            Outcome::T => Self::T0,
            Outcome::N => Self::N0,
        }
    }

    fn bits(self) -> u8 { self as u8 }

    fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Self::N3,
            1 => Self::N2,
            2 => Self::N1,
            3 => Self::N0,
            4 => Self::T0,
            5 => Self::T1,
            6 => Self::T2,
            7 => Self::T3,
            _ => {
                warn!("invalid 3-bit counter state {bits}, using weak not-taken");
                Self::N0
            },
        }
    }
}

/// The 2-bit 'useful' counter attached to each tagged TAGE entry.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Usefulness {
    #[default]
    U0 = 0,
    U1 = 1,
    U2 = 2,
    U3 = 3,
}
impl Usefulness {
    pub const BITS: usize = 2;

    pub fn increment(self) -> Self {
        match self {
            Self::U0 => Self::U1,
            Self::U1 => Self::U2,
            Self::U2 | Self::U3 => Self::U3,
        }
    }

    pub fn decrement(self) -> Self {
        match self {
            Self::U0 | Self::U1 => Self::U0,
            Self::U2 => Self::U1,
            Self::U3 => Self::U2,
        }
    }

    /// Halve the counter (shift right by one bit).
    pub fn halve(self) -> Self {
        Self::from_bits(self.bits() >> 1)
    }

    /// Returns 'true' when the entry may be replaced.
    pub fn is_zero(self) -> bool {
        self == Self::U0
    }

    pub fn bits(self) -> u8 { self as u8 }

    pub fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Self::U0,
            1 => Self::U1,
            2 => Self::U2,
            3 => Self::U3,
            _ => {
                warn!("invalid usefulness counter state {bits}, using zero");
                Self::U0
            },
        }
    }
}
