//! History registers and the folding hash used to compress them.

use bitvec::prelude::*;
use crate::branch::Outcome;

/// Fold [with XOR] some history into `output_bits`.
///
/// Windows of `output_bits` start at every multiple of `output_bits` below
/// `total_bits` (beginning with the most recent bit at index 0), and all of
/// them are XOR'ed together. Each window is always `output_bits` wide, so
/// it may read history older than `total_bits`. Only the end of the
/// register can cut a window short.
pub fn fold(history: &BitSlice, total_bits: usize, output_bits: usize)
    -> usize
{
    assert!(output_bits > 0 && output_bits <= usize::BITS as usize);
    let total_bits = total_bits.min(history.len());
    let output_mask = usize::MAX >> (usize::BITS as usize - output_bits);
    let res = (0..total_bits).step_by(output_bits)
        .map(|lo| &history[lo..(lo + output_bits).min(history.len())])
        .fold(0, |res, x| res ^ x.load::<usize>());
    res & output_mask
}

/// A shift register of recent branch outcomes.
///
/// Bit 0 is the most recent outcome. The register never holds more than
/// `len` bits: older outcomes fall off the end when new ones are shifted in.
#[derive(Clone, Debug)]
pub struct HistoryRegister {
    data: BitVec<usize, Lsb0>,
    len: usize,
}

// NOTE: This *reverses* the all of the bits and presents them in a format
// where the leftmost bit is the most-significant (index n) and the rightmost
// bit is the least-significant (index 0).
impl std::fmt::Display for HistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let x: String = self.data.as_bitslice().iter().by_vals()
            .map(|b| if b { '1' } else { '0' })
            .rev()
            .collect();
        write!(f, "{}", x)
    }
}

impl HistoryRegister {
    /// Create a register with the specified length in bits.
    /// All bits in the register are initialized to zero.
    pub fn new(len: usize) -> Self {
        assert!(len > 0);
        Self {
            data: bitvec![usize, Lsb0; 0; len],
            len,
        }
    }

    pub fn len(&self) -> usize { self.len }
    pub fn data(&self) -> &BitSlice { self.data.as_bitslice() }

    /// Shift the register by 'n' bits.
    /// The bottom 'n' bits become zero, and the top 'n' bits are discarded.
    pub fn shift_by(&mut self, n: usize) {
        self.data.shift_end(n);
    }

    /// Shift a new outcome into the register.
    pub fn push(&mut self, outcome: Outcome) {
        self.shift_by(1);
        self.data.set(0, outcome.is_taken());
    }

    /// Return the most recent `n` bits as an integer.
    pub fn low_bits(&self, n: usize) -> usize {
        let n = n.min(self.len).min(usize::BITS as usize);
        if n == 0 {
            return 0;
        }
        self.data[..n].load::<usize>()
    }

    /// Fold the most recent `total_bits` of history into `output_bits`.
    pub fn fold(&self, total_bits: usize, output_bits: usize) -> usize {
        fold(&self.data, total_bits, output_bits)
    }
}

/// A table of per-branch history registers, each `width` bits wide.
///
/// All registers live in one flat [`BitVec`]; register `i` occupies the bits
/// `[i * width, (i + 1) * width)`.
#[derive(Clone, Debug)]
pub struct LocalHistoryTable {
    data: BitVec<usize, Lsb0>,
    width: usize,
    size: usize,
}
impl LocalHistoryTable {
    pub fn new(size: usize, width: usize) -> Self {
        assert!(size.is_power_of_two());
        assert!(width > 0 && width <= usize::BITS as usize);
        Self {
            data: bitvec![usize, Lsb0; 0; size * width],
            width,
            size,
        }
    }

    pub fn index_mask(&self) -> usize {
        self.size - 1
    }

    fn register(&self, idx: usize) -> &BitSlice {
        let lo = (idx & self.index_mask()) * self.width;
        &self.data[lo..lo + self.width]
    }

    /// Read the history register selected by `idx` as an integer.
    pub fn get(&self, idx: usize) -> usize {
        self.register(idx).load::<usize>()
    }

    /// Shift a new outcome into the history register selected by `idx`.
    pub fn push(&mut self, idx: usize, outcome: Outcome) {
        let lo = (idx & self.index_mask()) * self.width;
        let reg = &mut self.data[lo..lo + self.width];
        reg.shift_end(1);
        reg.set(0, outcome.is_taken());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn history_from(value: u64, len: usize) -> HistoryRegister {
        let mut ghr = HistoryRegister::new(len);
        for i in (0..len).rev() {
            ghr.push(Outcome::from((value >> i) & 1 == 1));
        }
        ghr
    }

    #[test]
    fn push_shifts_toward_older_bits() {
        let mut ghr = HistoryRegister::new(4);
        ghr.push(Outcome::T);
        ghr.push(Outcome::N);
        ghr.push(Outcome::T);
        assert_eq!(ghr.low_bits(4), 0b101);
        assert_eq!(format!("{}", ghr), "0101");
    }

    #[test]
    fn register_truncates_to_width() {
        let mut ghr = HistoryRegister::new(3);
        for _ in 0..10 {
            ghr.push(Outcome::T);
        }
        assert_eq!(ghr.low_bits(64), 0b111);
        ghr.push(Outcome::N);
        assert_eq!(ghr.low_bits(3), 0b110);
    }

    #[test]
    fn fold_xors_windows() {
        let ghr = history_from(0b1011_0110_1100, 12);
        // 1100 ^ 0110 ^ 1011
        assert_eq!(ghr.fold(12, 4), 0b0001);
        // Only the windows starting below bit 8: 1100 ^ 0110
        assert_eq!(ghr.fold(8, 4), 0b1010);
        // The window at bit 8 is read in full: 1100 ^ 0110 ^ 1011
        assert_eq!(ghr.fold(10, 4), 0b0001);
        // The end of the register cuts the last window short:
        // 01100 ^ 11011 ^ 10
        assert_eq!(ghr.fold(12, 5), 0b10101);
    }

    #[test]
    fn short_history_reads_a_full_window() {
        let ghr = history_from(0b10_1110_1101, 10);
        assert_eq!(ghr.fold(1, 9), 0b0_1110_1101);
        assert_eq!(ghr.fold(4, 9), 0b0_1110_1101);
        assert_eq!(ghr.fold(1, 13), 0b10_1110_1101);
        // 0_1110_1101 ^ 1
        assert_eq!(ghr.fold(16, 9), 0b0_1110_1100);
    }

    #[test]
    fn fold_of_empty_history_is_zero() {
        let ghr = history_from(0b1111, 4);
        assert_eq!(ghr.fold(0, 3), 0);
    }

    #[test]
    fn local_histories_are_independent() {
        let mut lht = LocalHistoryTable::new(4, 3);
        lht.push(1, Outcome::T);
        lht.push(1, Outcome::T);
        lht.push(2, Outcome::T);
        assert_eq!(lht.get(0), 0);
        assert_eq!(lht.get(1), 0b11);
        assert_eq!(lht.get(2), 0b1);
        // Indices are masked to the table size
        assert_eq!(lht.get(5), 0b11);

        for _ in 0..5 {
            lht.push(1, Outcome::T);
        }
        assert_eq!(lht.get(1), 0b111);
        assert_eq!(lht.get(2), 0b1);
    }
}
