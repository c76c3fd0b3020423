//! User-data (`usd1`) blocks
//!
//! Entries carry a name, a typed payload (string, ints, floats), and a
//! 12-byte record of offsets relative to that record's own position. Where
//! the name string lands is the format's one asymmetry: internal type 1
//! places it in the data area right after the entry's payload, internal
//! type 2 collects it into a trailing name block after all payloads. The
//! choice is not recorded on the wire; encoders pick it per block via
//! [`UsdMode`].

use tracing::trace;

use crate::bytes::{ByteReader, ByteWriter};
use crate::enums::UsdDataType;
use crate::{Error, Result};

/// Payload of a user-data entry.
#[derive(Debug, Clone, PartialEq)]
pub enum UsdValue {
    String(String),
    Ints(Vec<i32>),
    Floats(Vec<f32>),
}

impl UsdValue {
    pub fn data_type(&self) -> UsdDataType {
        match self {
            Self::String(_) => UsdDataType::String,
            Self::Ints(_) => UsdDataType::Ints,
            Self::Floats(_) => UsdDataType::Floats,
        }
    }
}

/// One user-data entry.
#[derive(Debug, Clone, PartialEq)]
pub struct UsdEntry {
    pub name: String,
    pub value: UsdValue,
}

/// Name placement rule for an encoded `usd1` block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UsdMode {
    /// Internal type 1 for every entry: name adjacent to its payload.
    #[default]
    Adjacent,
    /// Internal type 2 for every entry: names in a trailing block.
    Trailing,
    /// Per-entry: `IsAreaRect` and `LayoutIndex` trail, the rest adjoin.
    /// Used for sub-pages tagged "info".
    Auto,
}

impl UsdMode {
    fn internal_type(self, entry_name: &str) -> u8 {
        match self {
            Self::Adjacent => 1,
            Self::Trailing => 2,
            Self::Auto => {
                if entry_name == "IsAreaRect" || entry_name == "LayoutIndex" {
                    2
                } else {
                    1
                }
            }
        }
    }
}

/// Read the entries of a `usd1` payload; `r` is anchored at the payload.
pub fn read_entries(r: &mut ByteReader<'_>) -> Result<Vec<UsdEntry>> {
    let count = r.read_u32()? as usize;
    let mut entries = Vec::with_capacity(count);

    for _ in 0..count {
        let record_start = r.abs_pos();
        let name_off = r.read_u32()? as usize;
        let data_off = r.read_u32()? as usize;
        let setting = r.read_u16()? as usize;
        let data_type = UsdDataType::from_raw(u32::from(r.read_u8()?))?;
        r.skip(1);

        let name_bytes = r.abs_cstring(record_start + name_off)?;
        let name = String::from_utf8(name_bytes.to_vec())
            .map_err(|_| Error::BadString("user data entry name"))?;

        let data_at = record_start + data_off;
        let value = match data_type {
            UsdDataType::String => {
                let raw = r.abs_bytes(data_at, setting)?;
                let trimmed = raw.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
                UsdValue::String(
                    String::from_utf8(raw[..trimmed].to_vec())
                        .map_err(|_| Error::BadString("user data string value"))?,
                )
            }
            UsdDataType::Ints => {
                let mut ints = Vec::with_capacity(setting);
                for i in 0..setting {
                    ints.push(r.abs_i32(data_at + i * 4)?);
                }
                UsdValue::Ints(ints)
            }
            UsdDataType::Floats => {
                let mut floats = Vec::with_capacity(setting);
                for i in 0..setting {
                    floats.push(r.abs_f32(data_at + i * 4)?);
                }
                UsdValue::Floats(floats)
            }
        };

        trace!("usd entry {:?}: {:?}", name, value);
        entries.push(UsdEntry { name, value });
    }
    Ok(entries)
}

struct Record {
    name_off: u32,
    data_off: u32,
    setting: u16,
    data_type: UsdDataType,
    internal_type: u8,
}

/// Write a complete `usd1` section (magic and size included).
pub fn write_section(w: &mut ByteWriter, entries: &[UsdEntry], mode: UsdMode) {
    let count = entries.len();
    let mut records: Vec<Record> = Vec::with_capacity(count);
    let mut data = ByteWriter::new();

    // Offsets in each record are relative to the record itself; `delta` is
    // the distance from the current record to the start of the data area.
    let mut delta = 12 * count;
    for entry in entries {
        let internal_type = mode.internal_type(&entry.name);
        let mut name_off = 0usize;

        let (setting, data_off) = match &entry.value {
            UsdValue::String(s) => {
                let data_off = data.len();
                data.write_bytes(s.as_bytes());
                data.write_u8(0);
                (s.len(), data_off)
            }
            UsdValue::Ints(ints) => {
                data.pad_to(4);
                let data_off = data.len();
                for &v in ints {
                    data.write_i32(v);
                }
                (ints.len(), data_off)
            }
            UsdValue::Floats(floats) => {
                data.pad_to(4);
                let data_off = data.len();
                for &v in floats {
                    data.write_f32(v);
                }
                (floats.len(), data_off)
            }
        };
        if internal_type == 1 {
            name_off = data.len() + delta;
            data.write_bytes(entry.name.as_bytes());
            data.write_u8(0);
        }

        records.push(Record {
            name_off: name_off as u32,
            data_off: (data_off + delta) as u32,
            setting: setting as u16,
            data_type: entry.value.data_type(),
            internal_type,
        });
        delta -= 12;
    }

    // Trailing name block for internal type 2 entries.
    let mut delta = 12 * count;
    for (record, entry) in records.iter_mut().zip(entries) {
        if record.internal_type == 2 {
            record.name_off = (data.len() + delta) as u32;
            data.write_bytes(entry.name.as_bytes());
            data.write_u8(0);
        }
        delta -= 12;
    }
    data.pad_to(4);

    w.write_bytes(b"usd1");
    w.write_u32((8 + 4 + 12 * count + data.len()) as u32);
    w.write_u32(count as u32);
    for record in &records {
        w.write_u32(record.name_off);
        w.write_u32(record.data_off);
        w.write_u16(record.setting);
        w.write_u8(record.data_type.raw() as u8);
        w.write_u8(0);
    }
    w.write_bytes(data.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_entry(name: &str, value: &str) -> UsdEntry {
        UsdEntry {
            name: name.into(),
            value: UsdValue::String(value.into()),
        }
    }

    fn decode_section(bytes: &[u8]) -> Vec<UsdEntry> {
        // Skip the 8-byte section header.
        let mut r = ByteReader::new(bytes).section(8);
        read_entries(&mut r).unwrap()
    }

    #[test]
    fn test_adjacent_string_layout() {
        let entries = [string_entry("Hello", "World")];
        let mut w = ByteWriter::new();
        write_section(&mut w, &entries, UsdMode::Adjacent);
        let bytes = w.into_bytes();

        // Record: nameOff = dataOff + 6, dataOff = 12, setting = 5, type 0.
        assert_eq!(&bytes[0..4], b"usd1");
        assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), 18);
        assert_eq!(u32::from_le_bytes(bytes[16..20].try_into().unwrap()), 12);
        assert_eq!(u16::from_le_bytes(bytes[20..22].try_into().unwrap()), 5);
        assert_eq!(bytes[22], 0);

        // Data area: payload then the adjacent name.
        assert_eq!(&bytes[24..36], b"World\0Hello\0");
        assert_eq!(decode_section(&bytes), entries);
    }

    #[test]
    fn test_trailing_string_layout() {
        let entries = [string_entry("Hello", "World")];
        let mut w = ByteWriter::new();
        write_section(&mut w, &entries, UsdMode::Trailing);
        let bytes = w.into_bytes();

        // Same data area content, but the name block follows the payload
        // sweep, so nameOff still lands at payload end.
        assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), 18);
        assert_eq!(&bytes[24..36], b"World\0Hello\0");
        assert_eq!(decode_section(&bytes), entries);
    }

    #[test]
    fn test_auto_mode_selects_by_name() {
        let entries = [
            string_entry("IsAreaRect", "1"),
            UsdEntry {
                name: "Other".into(),
                value: UsdValue::Ints(vec![3, -4]),
            },
        ];
        let mut w = ByteWriter::new();
        write_section(&mut w, &entries, UsdMode::Auto);
        let bytes = w.into_bytes();
        assert_eq!(decode_section(&bytes), entries);

        // "Other" carries its name adjacent (before the trailing block for
        // "IsAreaRect"), so "IsAreaRect" must appear after "Other".
        let area = bytes.windows(10).position(|win| win == &b"IsAreaRect"[..]);
        let other = bytes.windows(5).position(|win| win == &b"Other"[..]);
        assert!(other.unwrap() < area.unwrap());
    }

    #[test]
    fn test_int_and_float_alignment() {
        let entries = [
            string_entry("s", "abc"),
            UsdEntry {
                name: "ints".into(),
                value: UsdValue::Ints(vec![1, 2, 3]),
            },
            UsdEntry {
                name: "floats".into(),
                value: UsdValue::Floats(vec![1.5, -2.25]),
            },
        ];
        for mode in [UsdMode::Adjacent, UsdMode::Trailing, UsdMode::Auto] {
            let mut w = ByteWriter::new();
            write_section(&mut w, &entries, mode);
            let bytes = w.into_bytes();
            assert_eq!(bytes.len() % 4, 0);
            assert_eq!(decode_section(&bytes), entries);
        }
    }

    #[test]
    fn test_empty_block() {
        let mut w = ByteWriter::new();
        write_section(&mut w, &[], UsdMode::Adjacent);
        let bytes = w.into_bytes();
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 12);
        assert!(decode_section(&bytes).is_empty());
    }
}
