use core::fmt;

/// Rejected table configuration, returned by the strict `try_*`
/// constructors.
///
/// The plain constructors never fail; they correct out-of-range parameters
/// instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// The initial capacity was zero.
    ZeroCapacity,
    /// The hopscotch neighborhood was outside `1..=64`.
    MaxDist(usize),
    /// The robin hood load factor was below
    /// [`MIN_LOAD_FACTOR`](crate::robin_hood::MIN_LOAD_FACTOR), above `1.0`, or
    /// not a number.
    LoadFactor(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCapacity => f.write_str("initial capacity must be non-zero"),
            ConfigError::MaxDist(max_dist) => {
                write!(f, "neighborhood size {max_dist} is outside 1..=64")
            }
            ConfigError::LoadFactor(load_factor) => {
                write!(
                    f,
                    "load factor {load_factor} is outside [{}, 1]",
                    crate::robin_hood::MIN_LOAD_FACTOR
                )
            }
        }
    }
}

impl core::error::Error for ConfigError {}
