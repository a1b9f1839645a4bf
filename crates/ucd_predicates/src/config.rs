use thiserror::Error;

/// Parameters of predicate synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Bits per bitmask and per bitmask table entry. One of 8, 16, 32, 64.
    pub word_size: u32,

    /// Maximum number of values and ranges tested by a compound OR before a node prefers
    /// subdivision.
    pub compound_boolean_limit: usize,

    /// Maximum depth of subdivision, 0 means unlimited.
    pub depth_limit: u32,

    pub bitmask_expressions: bool,

    pub bitmask_tables: bool,

    /// Fold children of a dispatch that are always true or always false into a bitmask test on
    /// the child index. Requires `bitmask_expressions`.
    pub hoist_constant_children: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported word size {0} (expected 8, 16, 32 or 64)")]
    UnsupportedWordSize(u32),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            word_size: 64,
            compound_boolean_limit: 3,
            depth_limit: 0,
            bitmask_expressions: true,
            bitmask_tables: true,
            hoist_constant_children: true,
        }
    }
}

impl Config {
    /// Config that only generates comparisons, used for reference output.
    pub fn naive() -> Self {
        Config {
            bitmask_expressions: false,
            bitmask_tables: false,
            hoist_constant_children: false,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.word_size {
            8 | 16 | 32 | 64 => Ok(()),
            other => Err(ConfigError::UnsupportedWordSize(other)),
        }
    }

    /// Size of each child span when subdividing a span of `span_size` values.
    pub fn child_size(&self, span_size: u64) -> u64 {
        let word_size = u64::from(self.word_size);
        if span_size <= word_size {
            span_size
        } else if span_size <= word_size * word_size {
            word_size
        } else {
            (span_size + word_size - 1) / word_size
        }
    }

    pub(crate) fn hoisting(&self) -> bool {
        self.bitmask_expressions && self.hoist_constant_children
    }
}

#[test]
fn child_sizes() {
    let config = Config::default();
    assert_eq!(config.child_size(40), 40);
    assert_eq!(config.child_size(301), 64);
    assert_eq!(config.child_size(4096), 64);
    assert_eq!(config.child_size(4097), 65);
    assert_eq!(config.child_size(0x110000), 17408);
}

#[test]
fn word_sizes() {
    for word_size in [8, 16, 32, 64] {
        let config = Config {
            word_size,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    let config = Config {
        word_size: 128,
        ..Default::default()
    };
    assert_eq!(
        config.validate(),
        Err(ConfigError::UnsupportedWordSize(128))
    );
}
