use super::{max::Max, min::Min, stream::Aggregation};
use crate::Value;

pub struct Range;

impl Aggregation for Range {
    const NAME: &'static str = "RANGE";

    fn aggregate(values: &[Value]) -> crate::Result<Value> {
        Ok(Max::aggregate(values)? - Min::aggregate(values)?)
    }
}
