use super::stream::{len, Aggregation};
use crate::Value;

/// `n / sum(1/x)`, undefined if any value is zero
pub struct HarmonicMean;

impl Aggregation for HarmonicMean {
    const NAME: &'static str = "HARMONIC_MEAN";

    fn init(value: Value) -> Value {
        1.0 / value
    }

    fn transform(accu: Value, x: Value) -> Value {
        accu + 1.0 / x
    }

    fn finish(sum_inverse: Value, values: &[Value]) -> crate::Result<Value> {
        if values.iter().any(|&x| x == 0.0) {
            return Err(crate::Error::Domain {
                method: Self::NAME,
                reason: "value of zero has no reciprocal",
            });
        }

        Ok(len(values) / sum_inverse)
    }
}
