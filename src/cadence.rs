use std::num::NonZeroUsize;

/// Requested number of output points after downsampling.
///
/// Always positive.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash, Debug)]
pub struct Cadence(NonZeroUsize);

impl Cadence {
    /// Returns the cadence as a plain integer.
    #[must_use]
    pub fn get(self) -> usize {
        self.0.get()
    }

    /// Number of readings per bucket for a series of `len` readings.
    ///
    /// Never less than 1.
    #[must_use]
    pub fn items_per_group(self, len: usize) -> usize {
        (len / self.get()).max(1)
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NonZeroUsize> for Cadence {
    fn from(value: NonZeroUsize) -> Self {
        Self(value)
    }
}

impl TryFrom<i64> for Cadence {
    type Error = crate::Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or_else(|| {
                crate::Error::invalid_argument("cadence", format!("must be positive, got {value}"))
            })
    }
}

impl TryFrom<usize> for Cadence {
    type Error = crate::Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        NonZeroUsize::new(value)
            .map(Self)
            .ok_or_else(|| crate::Error::invalid_argument("cadence", "must be positive, got 0"))
    }
}
