use super::stream::{compensated_sum, empty, len, Aggregation};
use crate::Value;

/// Compensated sum divided by the number of values
pub struct Avg;

impl Aggregation for Avg {
    const NAME: &'static str = "AVERAGE";

    fn aggregate(values: &[Value]) -> crate::Result<Value> {
        if values.is_empty() {
            return Err(empty::<Self>());
        }
        Ok(compensated_sum(values) / len(values))
    }
}
