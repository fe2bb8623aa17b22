mod avg;
mod count;
mod geometric;
mod harmonic;
mod max;
mod median;
mod min;
mod mode;
mod range;
mod stream;
mod sum;
mod variance;

use crate::Value;
use stream::Aggregation;

/// Statistic used to reduce the values of a bucket to one value.
///
/// The discriminants are stable request codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash)]
pub enum Method {
    /// Arithmetic mean
    Average = 1,

    /// Middle value, or mean of the two middle values for even counts
    Median = 2,

    /// Most frequent value, the smallest one on tied counts
    Mode = 3,

    /// Smallest value
    Min = 4,

    /// Largest value
    Max = 5,

    /// Population standard deviation
    StandardDeviation = 6,

    /// Population variance
    Variance = 7,

    /// `MAX - MIN`
    Range = 8,

    /// Sum of all values
    Sum = 9,

    /// Number of values
    Count = 10,

    /// `product ^ (1/n)`
    GeometricMean = 11,

    /// `n / sum(1/x)`, fails if any value is zero
    HarmonicMean = 12,
}

impl Method {
    /// All methods, ordered by code.
    pub const ALL: [Self; 12] = [
        Self::Average,
        Self::Median,
        Self::Mode,
        Self::Min,
        Self::Max,
        Self::StandardDeviation,
        Self::Variance,
        Self::Range,
        Self::Sum,
        Self::Count,
        Self::GeometricMean,
        Self::HarmonicMean,
    ];

    /// Returns the request code of this method.
    #[must_use]
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Returns the name of this method.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Average => avg::Avg::NAME,
            Self::Median => median::Median::NAME,
            Self::Mode => mode::Mode::NAME,
            Self::Min => min::Min::NAME,
            Self::Max => max::Max::NAME,
            Self::StandardDeviation => variance::StdDev::NAME,
            Self::Variance => variance::Variance::NAME,
            Self::Range => range::Range::NAME,
            Self::Sum => sum::Sum::NAME,
            Self::Count => count::Count::NAME,
            Self::GeometricMean => geometric::GeometricMean::NAME,
            Self::HarmonicMean => harmonic::HarmonicMean::NAME,
        }
    }

    /// Reduces a non-empty list of values to one value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `values` is empty, and `Domain` if the
    /// method is undefined for the values (harmonic mean of a zero).
    pub fn reduce(self, values: &[Value]) -> crate::Result<Value> {
        match self {
            Self::Average => avg::Avg::aggregate(values),
            Self::Median => median::Median::aggregate(values),
            Self::Mode => mode::Mode::aggregate(values),
            Self::Min => min::Min::aggregate(values),
            Self::Max => max::Max::aggregate(values),
            Self::StandardDeviation => variance::StdDev::aggregate(values),
            Self::Variance => variance::Variance::aggregate(values),
            Self::Range => range::Range::aggregate(values),
            Self::Sum => sum::Sum::aggregate(values),
            Self::Count => count::Count::aggregate(values),
            Self::GeometricMean => geometric::GeometricMean::aggregate(values),
            Self::HarmonicMean => harmonic::HarmonicMean::aggregate(values),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<i64> for Method {
    type Error = crate::Error;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|method| method.code() == code)
            .ok_or_else(|| {
                crate::Error::invalid_argument("method", format!("unknown statistical method {code}"))
            })
    }
}

/// Reduces a non-empty list of values to one value using `method`.
///
/// # Errors
///
/// See [`Method::reduce`].
pub fn reduce(values: &[Value], method: Method) -> crate::Result<Value> {
    method.reduce(values)
}
