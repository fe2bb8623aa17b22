pub struct Min;

impl super::stream::Aggregation for Min {
    const NAME: &'static str = "MIN";

    fn transform(accu: crate::Value, x: crate::Value) -> crate::Value {
        if x.total_cmp(&accu).is_lt() {
            x
        } else {
            accu
        }
    }
}
