use super::stream::{empty, Aggregation};
use crate::Value;

pub struct Median;

impl Aggregation for Median {
    const NAME: &'static str = "MEDIAN";

    fn aggregate(values: &[Value]) -> crate::Result<Value> {
        let mut sorted = values.to_vec();
        sorted.sort_by(Value::total_cmp);

        let middle = sorted.len() / 2;

        if sorted.len() % 2 == 0 {
            match (sorted.get(middle.wrapping_sub(1)), sorted.get(middle)) {
                (Some(lo), Some(hi)) => Ok((lo + hi) / 2.0),
                _ => Err(empty::<Self>()),
            }
        } else {
            sorted.get(middle).copied().ok_or_else(empty::<Self>)
        }
    }
}
