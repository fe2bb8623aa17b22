use super::stream::{len, Aggregation};
use crate::Value;

pub struct GeometricMean;

impl Aggregation for GeometricMean {
    const NAME: &'static str = "GEOMETRIC_MEAN";

    fn transform(accu: Value, x: Value) -> Value {
        accu * x
    }

    fn finish(product: Value, values: &[Value]) -> crate::Result<Value> {
        Ok(product.powf(1.0 / len(values)))
    }
}
