
use crate::error::ConfigError;
use crate::history::HistoryRegister;
use crate::predictor::*;

/// Largest supported number of tagged components.
pub const MAX_TAGGED_COMPONENTS: usize = 16;

/// Largest supported tag width.
pub const MAX_TAG_BITS: usize = 32;

/// Configuration for a [`TageBaseComponent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TageBaseConfig {
    /// Number of index bits (the table has `1 << index_bits` entries)
    pub index_bits: usize,
}
impl TageBaseConfig {
    /// Get the [approximate] number of storage bits.
    pub fn storage_bits(&self) -> usize {
        Counter2::BITS << self.index_bits
    }

    /// Use this configuration to create a new [`TageBaseComponent`].
    pub fn build(self) -> TageBaseComponent {
        TageBaseComponent {
            data: Table::new(self.index_bits, Counter2::WeakNotTaken),
            cfg: self,
        }
    }
}

/// Configuration for a [`TageComponent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TageComponentConfig {
    /// Number of index bits (the table has `1 << index_bits` entries)
    pub index_bits: usize,

    /// Number of tag bits
    pub tag_bits: usize,

    /// Number of global history bits folded into the index and tag
    pub history_len: usize,
}
impl TageComponentConfig {
    /// Get the [approximate] number of storage bits.
    pub fn storage_bits(&self) -> usize {
        let entry_size = Counter3::BITS + Usefulness::BITS + self.tag_bits;
        entry_size << self.index_bits
    }

    /// Use this configuration to create a new [`TageComponent`].
    pub fn build(self, id: usize) -> TageComponent {
        TageComponent {
            data: Table::new(self.index_bits, TageEntry::default()),
            cfg: self,
            id,
        }
    }
}

/// Configuration for a [`TagePredictor`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TageConfig {
    /// Base component configuration
    pub base: TageBaseConfig,

    /// Tagged component configurations, ordered from the shortest to the
    /// longest history length
    pub comp: Vec<TageComponentConfig>,

    /// Length of the global history register
    pub history_bits: usize,

    /// Number of updates between halving all 'useful' counters
    pub aging_interval: usize,
}
impl TageConfig {
    pub fn new(base: TageBaseConfig, history_bits: usize) -> Self {
        Self {
            base,
            comp: Vec::new(),
            history_bits,
            aging_interval: 256_000,
        }
    }

    /// Build a configuration where every tagged component has the same
    /// index and tag width.
    pub fn with_history_lengths(base_index_bits: usize, index_bits: usize,
        tag_bits: usize, lengths: &[usize]) -> Self
    {
        let history_bits = lengths.iter().copied().max().unwrap_or(1);
        let mut cfg = Self::new(
            TageBaseConfig { index_bits: base_index_bits },
            history_bits
        );
        for &history_len in lengths {
            cfg.add_component(TageComponentConfig {
                index_bits, tag_bits, history_len
            });
        }
        cfg
    }

    /// Add a tagged component to the predictor.
    pub fn add_component(&mut self, c: TageComponentConfig) {
        self.comp.push(c);
        self.comp.sort_by_key(|c| c.history_len);
    }

    /// Returns the history length of each tagged component.
    pub fn history_lengths(&self) -> Vec<usize> {
        self.comp.iter().map(|c| c.history_len).collect()
    }

    pub fn total_entries(&self) -> usize {
        let c: usize = self.comp.iter().map(|c| 1 << c.index_bits).sum();
        (1 << self.base.index_bits) + c
    }
}

impl Default for TageConfig {
    fn default() -> Self {
        Self::with_history_lengths(12, 9, 13, &[1, 2, 4, 8, 16, 32])
    }
}

impl PredictorConfig for TageConfig {
    type Output = TagePredictor;

    fn validate(&self) -> Result<(), ConfigError> {
        check_width("tage base index", self.base.index_bits, MAX_INDEX_BITS)?;
        check_width("tage global history", self.history_bits,
            MAX_HISTORY_BITS)?;
        if self.comp.is_empty() || self.comp.len() > MAX_TAGGED_COMPONENTS {
            return Err(ConfigError::ComponentCount {
                got: self.comp.len(),
                max: MAX_TAGGED_COMPONENTS,
            });
        }
        for c in self.comp.iter() {
            check_width("tage index", c.index_bits, MAX_INDEX_BITS)?;
            check_width("tage tag", c.tag_bits, MAX_TAG_BITS)?;
            if c.history_len == 0 || c.history_len > self.history_bits {
                return Err(ConfigError::HistoryTooLong {
                    len: c.history_len,
                    max: self.history_bits,
                });
            }
        }
        let lengths = self.history_lengths();
        if lengths.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::HistoryNotIncreasing { lengths });
        }
        if self.aging_interval == 0 {
            return Err(ConfigError::ZeroAgingInterval);
        }
        Ok(())
    }

    /// Get the [approximate] number of storage bits.
    fn storage_bits(&self) -> usize {
        let c: usize = self.comp.iter().map(|c| c.storage_bits()).sum();
        c + self.base.storage_bits() + self.history_bits
    }

    /// Use this configuration to create a new [`TagePredictor`].
    fn build(self) -> Result<TagePredictor, ConfigError> {
        self.validate()?;
        let comp = self.comp.iter().enumerate()
            .map(|(id, c)| c.build(id))
            .collect::<Vec<TageComponent>>();
        Ok(TagePredictor {
            base: self.base.build(),
            stat: TageStats::new(comp.len()),
            ghr: HistoryRegister::new(self.history_bits),
            comp,
            train_count: 0,
            cfg: self,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_matches_reference_budget() {
        let cfg = TageConfig::default();
        assert_eq!(cfg.history_lengths(), vec![1, 2, 4, 8, 16, 32]);
        assert_eq!(cfg.history_bits, 32);
        assert_eq!(cfg.aging_interval, 256_000);
        assert_eq!(cfg.total_entries(), 4096 + 6 * 512);
        // 4096 x 2b base, 6 x 512 x (3b + 2b + 13b) tagged, 32b history
        assert_eq!(cfg.storage_bits(), 8192 + 6 * 512 * 18 + 32);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn components_are_sorted_by_history() {
        let cfg = TageConfig::with_history_lengths(4, 4, 8, &[16, 2, 8]);
        assert_eq!(cfg.history_lengths(), vec![2, 8, 16]);
        assert_eq!(cfg.history_bits, 16);
    }

    #[test]
    fn rejects_invalid_configurations() {
        let mut cfg = TageConfig::default();
        cfg.aging_interval = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroAgingInterval));

        let mut cfg = TageConfig::default();
        cfg.history_bits = 16;
        assert_eq!(cfg.validate(),
            Err(ConfigError::HistoryTooLong { len: 32, max: 16 }));

        let mut cfg = TageConfig::default();
        cfg.comp[1].history_len = 1;
        assert!(matches!(cfg.validate(),
            Err(ConfigError::HistoryNotIncreasing { .. })));

        let mut cfg = TageConfig::default();
        cfg.comp.clear();
        assert!(matches!(cfg.clone().build(),
            Err(ConfigError::ComponentCount { got: 0, .. })));

        let mut cfg = TageConfig::default();
        cfg.comp[0].tag_bits = 33;
        assert!(matches!(cfg.validate(),
            Err(ConfigError::WidthOutOfRange { bits: 33, .. })));
    }
}
