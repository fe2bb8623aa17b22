use super::stream::{compensated_sum, empty, Aggregation};
use crate::Value;

/// Compensated sum of all values
pub struct Sum;

impl Aggregation for Sum {
    const NAME: &'static str = "SUM";

    fn aggregate(values: &[Value]) -> crate::Result<Value> {
        if values.is_empty() {
            return Err(empty::<Self>());
        }
        Ok(compensated_sum(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn sum_in_reading_order() -> crate::Result<()> {
        assert_eq!(10.0, Sum::aggregate(&[1.0, 2.0, 3.0, 4.0])?);
        assert_eq!(-2.5, Sum::aggregate(&[-2.5])?);
        Ok(())
    }

    #[test_log::test]
    fn sum_compensates_rounding() -> crate::Result<()> {
        // A plain fold yields 0.6000000000000001
        assert_eq!(0.6, Sum::aggregate(&[0.1, 0.2, 0.3])?);
        Ok(())
    }

    #[test_log::test]
    fn sum_empty() {
        assert!(matches!(
            Sum::aggregate(&[]),
            Err(crate::Error::InvalidArgument { param: "values", .. })
        ));
    }
}
