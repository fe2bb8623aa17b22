//! Binary layout of stored records.
//!
//! Reading keys are `len(tag_id):u16 | tag_id | measured_at:u64 | reading id`,
//! with the timestamp's sign bit flipped so that keys of one tag sort by time.
//! All integers are big-endian, strings are length-prefixed UTF-8.

use crate::{Reading, Tag, Timestamp};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

const SIGN_BIT: u64 = 1 << 63;

fn order_preserving(ts: Timestamp) -> u64 {
    u64::from_be_bytes(ts.to_be_bytes()) ^ SIGN_BIT
}

fn from_order_preserving(raw: u64) -> Timestamp {
    Timestamp::from_be_bytes((raw ^ SIGN_BIT).to_be_bytes())
}

fn write_str<W: Write>(writer: &mut W, s: &str) -> crate::Result<()> {
    let len = u32::try_from(s.len()).map_err(|_| {
        crate::Error::invalid_argument("value", "string longer than 4 GiB cannot be stored")
    })?;
    writer.write_u32::<BigEndian>(len)?;
    writer.write_all(s.as_bytes())?;
    Ok(())
}

fn read_str<R: Read>(reader: &mut R) -> crate::Result<String> {
    let len = reader.read_u32::<BigEndian>()?;
    let mut buf = vec![0; len as usize];
    reader.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|_| crate::Error::Corrupt("string is not UTF-8"))
}

fn write_bool<W: Write>(writer: &mut W, value: bool) -> crate::Result<()> {
    writer.write_u8(u8::from(value))?;
    Ok(())
}

fn read_bool<R: Read>(reader: &mut R) -> crate::Result<bool> {
    match reader.read_u8()? {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(crate::Error::Corrupt("invalid boolean")),
    }
}

/// Key prefix shared by all readings of a tag.
pub fn reading_prefix(tag_id: &str) -> crate::Result<Vec<u8>> {
    let len = u16::try_from(tag_id.len())
        .map_err(|_| crate::Error::invalid_argument("tag_id", "longer than 65535 bytes"))?;

    let mut key = Vec::with_capacity(2 + tag_id.len() + 8);
    key.write_u16::<BigEndian>(len)?;
    key.extend_from_slice(tag_id.as_bytes());
    Ok(key)
}

/// Smallest key of a tag's readings at or after `ts`.
pub fn reading_lower_bound(tag_id: &str, ts: Timestamp) -> crate::Result<Vec<u8>> {
    let mut key = reading_prefix(tag_id)?;
    key.write_u64::<BigEndian>(order_preserving(ts))?;
    Ok(key)
}

pub fn reading_key(reading: &Reading) -> crate::Result<Vec<u8>> {
    let mut key = reading_lower_bound(&reading.tag_id, reading.measured_at)?;
    key.extend_from_slice(reading.id.as_bytes());
    Ok(key)
}

pub fn reading_value(reading: &Reading) -> crate::Result<Vec<u8>> {
    let mut value =
        Vec::with_capacity(8 + 8 + 1 + 8 + reading.device_id.len() + reading.tag_label.len());
    value.write_f64::<BigEndian>(reading.value)?;
    value.write_f64::<BigEndian>(reading.measured_at_device)?;
    write_bool(&mut value, reading.deactivated)?;
    write_str(&mut value, &reading.device_id)?;
    write_str(&mut value, &reading.tag_label)?;
    Ok(value)
}

/// Returns the `measured_at` encoded in a key that starts with `prefix`.
pub fn reading_key_timestamp(key: &[u8], prefix: &[u8]) -> crate::Result<Timestamp> {
    let mut reader = key
        .get(prefix.len()..)
        .ok_or(crate::Error::Corrupt("reading key too short"))?;
    Ok(from_order_preserving(reader.read_u64::<BigEndian>()?))
}

pub fn decode_reading(key: &[u8], value: &[u8]) -> crate::Result<Reading> {
    let mut reader = key;

    let tag_len = usize::from(reader.read_u16::<BigEndian>()?);
    let tag_id = reader
        .get(..tag_len)
        .ok_or(crate::Error::Corrupt("reading key too short"))?;
    let mut rest = reader
        .get(tag_len..)
        .ok_or(crate::Error::Corrupt("reading key too short"))?;

    let measured_at = from_order_preserving(rest.read_u64::<BigEndian>()?);

    let tag_id =
        std::str::from_utf8(tag_id).map_err(|_| crate::Error::Corrupt("tag id is not UTF-8"))?;
    let id =
        std::str::from_utf8(rest).map_err(|_| crate::Error::Corrupt("reading id is not UTF-8"))?;

    let mut reader = value;

    Ok(Reading {
        id: id.to_owned(),
        tag_id: tag_id.to_owned(),
        value: reader.read_f64::<BigEndian>()?,
        measured_at,
        measured_at_device: reader.read_f64::<BigEndian>()?,
        deactivated: read_bool(&mut reader)?,
        device_id: read_str(&mut reader)?,
        tag_label: read_str(&mut reader)?,
    })
}

pub fn tag_value(tag: &Tag) -> crate::Result<Vec<u8>> {
    let mut value = Vec::new();
    write_str(&mut value, &tag.name)?;
    write_str(&mut value, &tag.unit)?;
    value.write_u32::<BigEndian>(tag.decimal_precision)?;
    write_str(&mut value, &tag.tag_label)?;
    value.write_i64::<BigEndian>(tag.created_at)?;
    write_bool(&mut value, tag.deactivated)?;
    Ok(value)
}

pub fn decode_tag(key: &[u8], value: &[u8]) -> crate::Result<Tag> {
    let id = std::str::from_utf8(key).map_err(|_| crate::Error::Corrupt("tag id is not UTF-8"))?;

    let mut reader = value;

    Ok(Tag {
        id: id.to_owned(),
        name: read_str(&mut reader)?,
        unit: read_str(&mut reader)?,
        decimal_precision: reader.read_u32::<BigEndian>()?,
        tag_label: read_str(&mut reader)?,
        created_at: reader.read_i64::<BigEndian>()?,
        deactivated: read_bool(&mut reader)?,
    })
}
