use crate::Value;

/// Defines a reduction over the values of a bucket.
///
/// Most reductions are a left fold over the values in reading order:
///
/// - `init` seeds the accumulator with the first value (default: Identity)
///
/// - `transform` folds each further value into it (default: Add)
///
/// - `finish` can transform the result value (default: Identity)
///
/// Reductions that need the whole bucket at once override `aggregate`.
pub trait Aggregation {
    /// Name of the reduction, used in error messages
    const NAME: &'static str;

    fn init(value: Value) -> Value {
        value
    }

    fn transform(accu: Value, x: Value) -> Value {
        accu + x
    }

    fn finish(accu: Value, _values: &[Value]) -> crate::Result<Value> {
        Ok(accu)
    }

    /// Reduces a non-empty list of values to one value.
    fn aggregate(values: &[Value]) -> crate::Result<Value> {
        let Some((&first, rest)) = values.split_first() else {
            return Err(empty::<Self>());
        };

        let accu = rest
            .iter()
            .fold(Self::init(first), |accu, &x| Self::transform(accu, x));

        Self::finish(accu, values)
    }
}

/// Kahan-compensated sum of `values`, in reading order.
///
/// If compensation breaks down into NaN while the plain sum overflowed,
/// the plain sum is returned.
pub(crate) fn compensated_sum(values: &[Value]) -> Value {
    let mut sum = 0.0;
    let mut compensation = 0.0;
    let mut simple_sum = 0.0;

    for &x in values {
        simple_sum += x;

        let y = x - compensation;
        let t = sum + y;
        compensation = (t - sum) - y;
        sum = t;
    }

    let total: Value = sum - compensation;

    if total.is_nan() && simple_sum.is_infinite() {
        simple_sum
    } else {
        total
    }
}

pub(crate) fn empty<A: Aggregation + ?Sized>() -> crate::Error {
    crate::Error::invalid_argument("values", format!("{} of an empty bucket", A::NAME))
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn len(values: &[Value]) -> Value {
    values.len() as Value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn compensated_sum_is_exact_on_decimals() {
        assert_eq!(0.6, compensated_sum(&[0.1, 0.2, 0.3]));
        assert_eq!(1.0, compensated_sum(&[0.1; 10]));
        assert_eq!(0.0, compensated_sum(&[1e100, 1.0, -1e100]));
    }

    #[test_log::test]
    fn compensated_sum_overflow_falls_back() {
        assert_eq!(Value::INFINITY, compensated_sum(&[Value::MAX, Value::MAX]));
        assert_eq!(
            Value::NEG_INFINITY,
            compensated_sum(&[Value::MIN, Value::MIN, 1.0])
        );
    }

    #[test_log::test]
    fn compensated_sum_nan_stays_nan() {
        assert!(compensated_sum(&[1.0, Value::NAN]).is_nan());
    }
}
