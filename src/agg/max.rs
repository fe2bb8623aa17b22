pub struct Max;

impl super::stream::Aggregation for Max {
    const NAME: &'static str = "MAX";

    fn transform(accu: crate::Value, x: crate::Value) -> crate::Value {
        if x.total_cmp(&accu).is_gt() {
            x
        } else {
            accu
        }
    }
}
