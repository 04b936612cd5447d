//! Types for representing branches and branch outcomes.

use bitvec::prelude::*;

/// A branch outcome.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    /// Not taken
    N = 0,
    /// Taken
    T = 1
}

impl Outcome {
    pub fn vec_from_bitslice(bits: &BitSlice) -> Vec<Self> {
        bits.iter().by_vals().map(Self::from).collect()
    }

    /// Returns 'true' if the branch was taken.
    pub fn is_taken(self) -> bool {
        matches!(self, Self::T)
    }

    /// Returns the outcome as a single history bit.
    pub fn bit(self) -> usize {
        self as usize
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self {
        match x {
            true => Self::T,
            false => Self::N
        }
    }
}

impl From<Outcome> for bool {
    fn from(x: Outcome) -> Self {
        x.is_taken()
    }
}

/// Representing different kinds of branch/control-flow instructions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BranchKind {
    /// A conditional branch instruction.
    Conditional,

    /// A direct unconditional jump instruction.
    DirectJump,

    /// An indirect unconditional jump instruction.
    IndirectJump,

    /// A direct procedure call instruction.
    DirectCall,

    /// An indirect procedure call instruction.
    IndirectCall,

    /// A return instruction.
    Return,
}

/// Packed flags describing a single [`BranchRecord`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchFlags(pub u32);
impl BranchFlags {
    const BRN_FLAG: u32   = 1 << 0;
    const CALL_FLAG: u32  = 1 << 1;
    const RET_FLAG: u32   = 1 << 2;
    const IND_FLAG: u32   = 1 << 3;
    const TAKEN_FLAG: u32 = 1 << 4;

    /// Pack the fields reported by a trace into a set of flags.
    pub fn from_parts(conditional: bool, call: bool, ret: bool,
        direct: bool, outcome: Outcome) -> Self
    {
        let mut bits = 0;
        if conditional { bits |= Self::BRN_FLAG; }
        if call { bits |= Self::CALL_FLAG; }
        if ret { bits |= Self::RET_FLAG; }
        if !direct { bits |= Self::IND_FLAG; }
        if outcome.is_taken() { bits |= Self::TAKEN_FLAG; }
        Self(bits)
    }

    pub fn new(kind: BranchKind, outcome: Outcome) -> Self {
        let (conditional, call, ret, direct) = match kind {
            BranchKind::Conditional  => (true, false, false, true),
            BranchKind::DirectJump   => (false, false, false, true),
            BranchKind::IndirectJump => (false, false, false, false),
            BranchKind::DirectCall   => (false, true, false, true),
            BranchKind::IndirectCall => (false, true, false, false),
            BranchKind::Return       => (false, false, true, false),
        };
        Self::from_parts(conditional, call, ret, direct, outcome)
    }

    pub fn is_brn(&self) -> bool { self.0 & Self::BRN_FLAG != 0 }
    pub fn is_call(&self) -> bool { self.0 & Self::CALL_FLAG != 0 }
    pub fn is_ret(&self) -> bool { self.0 & Self::RET_FLAG != 0 }
    pub fn is_direct(&self) -> bool { self.0 & Self::IND_FLAG == 0 }
    pub fn is_indirect(&self) -> bool { self.0 & Self::IND_FLAG != 0 }
    pub fn is_taken(&self) -> bool { self.0 & Self::TAKEN_FLAG != 0 }

    pub fn kind(&self) -> BranchKind {
        if self.is_brn() {
            BranchKind::Conditional
        } else if self.is_call() {
            if self.is_direct() {
                BranchKind::DirectCall
            } else {
                BranchKind::IndirectCall
            }
        } else if self.is_ret() {
            BranchKind::Return
        } else if self.is_direct() {
            BranchKind::DirectJump
        } else {
            BranchKind::IndirectJump
        }
    }
}

/// A record of branch execution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchRecord {
    /// The program counter value for this branch
    pub pc: u32,

    /// The target address evaluated for this branch
    pub tgt: u32,

    pub flags: BranchFlags,
}
impl BranchRecord {
    pub fn new(pc: u32, tgt: u32, kind: BranchKind, outcome: Outcome)
        -> Self
    {
        Self { pc, tgt, flags: BranchFlags::new(kind, outcome) }
    }

    /// Shorthand for a direct conditional branch.
    pub fn conditional(pc: u32, tgt: u32, outcome: Outcome) -> Self {
        Self::new(pc, tgt, BranchKind::Conditional, outcome)
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from(self.flags.is_taken())
    }
    pub fn kind(&self) -> BranchKind {
        self.flags.kind()
    }

    /// Returns 'true' if this is a conditional instruction.
    pub fn is_conditional(&self) -> bool {
        self.flags.is_brn()
    }

    /// Returns 'true' if this is an unconditional instruction.
    pub fn is_unconditional(&self) -> bool {
        !self.flags.is_brn()
    }

    /// Returns 'true' if this instruction directly specifies the target.
    pub fn is_direct(&self) -> bool {
        self.flags.is_direct()
    }

    /// Returns 'true' if this is a "call" instruction.
    pub fn is_call(&self) -> bool {
        self.flags.is_call()
    }

    /// Returns 'true' if this is a "return" instruction.
    pub fn is_return(&self) -> bool {
        self.flags.is_ret()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kind_survives_packing() {
        let kinds = [
            BranchKind::Conditional,
            BranchKind::DirectJump,
            BranchKind::IndirectJump,
            BranchKind::DirectCall,
            BranchKind::IndirectCall,
            BranchKind::Return,
        ];
        for kind in kinds {
            let r = BranchRecord::new(0x1000, 0x2000, kind, Outcome::T);
            assert_eq!(r.kind(), kind);
            assert_eq!(r.outcome(), Outcome::T);
        }
    }

    #[test]
    fn flags_from_trace_fields() {
        let f = BranchFlags::from_parts(true, false, false, false, Outcome::N);
        assert!(f.is_brn());
        assert!(f.is_indirect());
        assert!(!f.is_taken());
        assert_eq!(f.kind(), BranchKind::Conditional);

        let f = BranchFlags::from_parts(false, false, true, true, Outcome::T);
        assert_eq!(f.kind(), BranchKind::Return);
        assert!(f.is_direct());
    }

    #[test]
    fn outcome_conversions() {
        assert_eq!(Outcome::from(true), Outcome::T);
        assert!(!bool::from(Outcome::N));
        assert_eq!(!Outcome::N, Outcome::T);
        assert_eq!(Outcome::T.bit(), 1);
        assert_eq!(format!("{:?}", Outcome::T), "t");
    }
}
