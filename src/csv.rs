use crate::Reading;
use std::{borrow::Cow, io::Write};

/// Wraps a field in double quotes if it contains a comma.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains(',') {
        Cow::Owned(format!("\"{field}\""))
    } else {
        Cow::Borrowed(field)
    }
}

/// Writes readings as CSV, one line per reading, without header.
///
/// Columns: `id, tag_id, value, measured_at, measured_at_device, deactivated,
/// device_id, tag_label`.
///
/// Floats always carry a fractional part and use plain decimal notation
/// between `1e-4` and `1e16`, so `1.7e9` is written as `1700000000.0`.
/// Outside of that range they switch to a lowercase exponent (`1e16`).
///
/// # Errors
///
/// Returns error if writing fails.
pub fn write_csv<'a, I, W>(readings: I, mut writer: W) -> crate::Result<()>
where
    I: IntoIterator<Item = &'a Reading>,
    W: Write,
{
    for reading in readings {
        writeln!(
            writer,
            "{},{},{:?},{},{:?},{},{},{}",
            escape(&reading.id),
            escape(&reading.tag_id),
            reading.value,
            reading.measured_at,
            reading.measured_at_device,
            reading.deactivated,
            escape(&reading.device_id),
            escape(&reading.tag_label),
        )?;
    }

    Ok(())
}

/// Renders readings as CSV, see [`write_csv`].
#[must_use]
pub fn to_csv<'a, I>(readings: I) -> String
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut buf = Vec::new();

    // NOTE: Writing into a Vec cannot fail
    if write_csv(readings, &mut buf).is_err() {
        return String::new();
    }

    String::from_utf8(buf).unwrap_or_default()
}
