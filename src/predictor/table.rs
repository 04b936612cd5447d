//! Types for implementing a table of predictors.

/// Interface to a table of predictors.
pub trait PredictorTable {
    /// The type of entry in the table.
    type Entry;

    /// Returns the number of entries in the table.
    fn size(&self) -> usize;

    /// Returns a reference to an entry in the table.
    fn get_entry(&self, idx: usize) -> &Self::Entry;

    /// Returns a mutable reference to an entry in the table.
    fn get_entry_mut(&mut self, idx: usize) -> &mut Self::Entry;

    /// Returns a bitmask corresponding to the number of entries in the table.
    fn index_mask(&self) -> usize {
        debug_assert!(self.size().is_power_of_two());
        self.size() - 1
    }
}

/// A flat table with `1 << index_bits` entries.
///
/// The table is allocated once and never resized. Every index is masked
/// to the table size before it is used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table<E> {
    data: Vec<E>,
}
impl<E: Clone> Table<E> {
    /// Create a table with `1 << index_bits` copies of `init`.
    pub fn new(index_bits: usize, init: E) -> Self {
        assert!(index_bits < usize::BITS as usize);
        Self {
            data: vec![init; 1 << index_bits],
        }
    }
}
impl<E> Table<E> {
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, E> {
        self.data.iter_mut()
    }
}

impl<E> PredictorTable for Table<E> {
    type Entry = E;

    fn size(&self) -> usize { self.data.len() }

    fn get_entry(&self, idx: usize) -> &E {
        let index = idx & self.index_mask();
        &self.data[index]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut E {
        let index = idx & self.index_mask();
        &mut self.data[index]
    }
}
