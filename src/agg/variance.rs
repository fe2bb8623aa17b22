use super::{
    avg::Avg,
    stream::{len, Aggregation},
};
use crate::Value;

/// Population variance
pub struct Variance;

impl Aggregation for Variance {
    const NAME: &'static str = "VARIANCE";

    fn aggregate(values: &[Value]) -> crate::Result<Value> {
        let mean = Avg::aggregate(values)?;

        let squared_deviations = values
            .iter()
            .fold(0.0, |accu, &x| accu + (mean - x) * (mean - x));

        Ok(squared_deviations / len(values))
    }
}

/// Population standard deviation
pub struct StdDev;

impl Aggregation for StdDev {
    const NAME: &'static str = "STANDARD_DEVIATION";

    fn aggregate(values: &[Value]) -> crate::Result<Value> {
        Variance::aggregate(values).map(Value::sqrt)
    }
}
