//! DARC archive parsing
//!
//! A DARC is a header, a flat entry table encoding a linearised directory
//! tree, a UTF-16LE name pool, and a data blob. Folder entries flag the high
//! byte of their name offset and store the exclusive index of their last
//! descendant in the size field; files point straight into the data blob.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;
use tracing::{debug, trace};

use crate::{Error, Result};

/// Archive magic bytes
pub const DARC_MAGIC: [u8; 4] = *b"darc";
/// Fixed header length
pub const HEADER_LEN: u32 = 0x1C;
/// The only supported format version
pub const VERSION: u32 = 0x0100_0000;
/// High-byte marker distinguishing folder entries in the table
pub const FOLDER_FLAG: u32 = 0x0100_0000;

/// Bytes per table entry: name offset, data offset, size.
const ENTRY_LEN: usize = 12;

/// One file inside an archive.
///
/// `path` is canonical: components joined with `/`, no leading separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DarcFile {
    pub path: String,
    pub data: Vec<u8>,
}

/// A parsed (or to-be-written) DARC archive: files in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Darc {
    pub files: Vec<DarcFile>,
}

struct TableEntry {
    name_off: u32,
    data_off: u32,
    size: u32,
}

impl Darc {
    /// Look up a file by its canonical path.
    pub fn file(&self, path: &str) -> Option<&DarcFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Add a file, keeping insertion order.
    pub fn push(&mut self, path: impl Into<String>, data: Vec<u8>) {
        self.files.push(DarcFile {
            path: path.into(),
            data,
        });
    }

    /// Parse an archive from a complete in-memory buffer.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);

        let mut magic = [0u8; 4];
        std::io::Read::read_exact(&mut cursor, &mut magic)?;
        if magic != DARC_MAGIC {
            return Err(Error::BadMagic(magic));
        }

        let bom = cursor.read_u16::<LittleEndian>()?;
        if bom != 0xFEFF {
            return Err(Error::BadHeaderField {
                field: "byte order mark",
                value: u32::from(bom),
            });
        }
        let header_len = cursor.read_u16::<LittleEndian>()?;
        if u32::from(header_len) != HEADER_LEN {
            return Err(Error::BadHeaderField {
                field: "header length",
                value: u32::from(header_len),
            });
        }
        let version = cursor.read_u32::<LittleEndian>()?;
        if version != VERSION {
            return Err(Error::BadHeaderField {
                field: "version",
                value: version,
            });
        }

        let file_len = cursor.read_u32::<LittleEndian>()? as usize;
        if file_len != data.len() {
            return Err(Error::SizeMismatch {
                declared: file_len,
                actual: data.len(),
            });
        }
        let table_off = cursor.read_u32::<LittleEndian>()?;
        if table_off != HEADER_LEN {
            return Err(Error::BadHeaderField {
                field: "table offset",
                value: table_off,
            });
        }
        let table_len = cursor.read_u32::<LittleEndian>()? as usize;
        let _data_off = cursor.read_u32::<LittleEndian>()?;

        // The root entry's size field is the total entry count.
        let table_start = table_off as usize;
        let root = read_entry(data, table_start)?;
        let entry_count = root.size as usize;

        // The entry table must fit inside the declared table+names length.
        if entry_count * ENTRY_LEN > table_len {
            return Err(Error::SizeMismatch {
                declared: table_len,
                actual: entry_count * ENTRY_LEN,
            });
        }

        let table_end = table_start + entry_count * ENTRY_LEN;
        if table_end > data.len() {
            return Err(Error::SizeMismatch {
                declared: table_end,
                actual: data.len(),
            });
        }
        let mut entries = Vec::with_capacity(entry_count);
        for i in 0..entry_count {
            entries.push(read_entry(data, table_start + i * ENTRY_LEN)?);
        }
        let names_start = table_end;

        debug!("DARC: {} table entries, names at {:#x}", entry_count, names_start);

        let mut archive = Darc::default();
        collect_entries(
            data,
            &entries,
            names_start,
            2,
            entries.len(),
            "",
            &mut archive,
        )?;
        Ok(archive)
    }
}

fn read_entry(data: &[u8], at: usize) -> Result<TableEntry> {
    let mut cursor = Cursor::new(data.get(at..at + ENTRY_LEN).ok_or(Error::SizeMismatch {
        declared: at + ENTRY_LEN,
        actual: data.len(),
    })?);
    Ok(TableEntry {
        name_off: cursor.read_u32::<LittleEndian>()?,
        data_off: cursor.read_u32::<LittleEndian>()?,
        size: cursor.read_u32::<LittleEndian>()?,
    })
}

/// Recursive descent over the half-open entry range `[lo, hi)`.
fn collect_entries(
    data: &[u8],
    entries: &[TableEntry],
    names_start: usize,
    lo: usize,
    hi: usize,
    path_root: &str,
    out: &mut Darc,
) -> Result<()> {
    let mut idx = lo;
    while idx < hi {
        let entry = &entries[idx];
        let name = read_utf16_name(data, names_start + (entry.name_off & 0x00FF_FFFF) as usize)?;

        if entry.name_off & FOLDER_FLAG != 0 {
            let descend_end = entry.size as usize;
            if descend_end > entries.len() {
                return Err(Error::TreeShape(format!(
                    "folder {name:?} claims descendants up to entry {descend_end} of {}",
                    entries.len()
                )));
            }
            let sub_root = join_path(path_root, &name);
            trace!("folder {:?}: entries {}..{}", sub_root, idx + 1, descend_end);
            collect_entries(data, entries, names_start, idx + 1, descend_end, &sub_root, out)?;
            idx = descend_end;
        } else {
            let start = entry.data_off as usize;
            let end = start + entry.size as usize;
            let path = join_path(path_root, &name);
            let bytes = data.get(start..end).ok_or_else(|| Error::EntryOutOfBounds {
                name: path.clone(),
                start,
                end,
                limit: data.len(),
            })?;
            trace!("file {:?}: {} bytes at {:#x}", path, entry.size, start);
            out.push(path, bytes.to_vec());
            idx += 1;
        }
    }
    Ok(())
}

fn join_path(root: &str, name: &str) -> String {
    if root.is_empty() {
        name.to_owned()
    } else {
        format!("{root}/{name}")
    }
}

/// Read a NUL-terminated UTF-16LE string starting at `at`.
fn read_utf16_name(data: &[u8], at: usize) -> Result<String> {
    let mut units = Vec::new();
    let mut pos = at;
    loop {
        let pair = data.get(pos..pos + 2).ok_or(Error::BadName(at))?;
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        if unit == 0 {
            break;
        }
        units.push(unit);
        pos += 2;
    }
    String::from_utf16(&units).map_err(|_| Error::BadName(at))
}

/// Append `name` to a pool as UTF-16LE with a NUL terminator.
pub(crate) fn push_utf16_name(pool: &mut Vec<u8>, name: &str) -> usize {
    let mut written = 0;
    for unit in name.encode_utf16() {
        pool.extend_from_slice(&unit.to_le_bytes());
        written += 2;
    }
    pool.extend_from_slice(&[0, 0]);
    written + 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_name_roundtrip() {
        let mut pool = Vec::new();
        let len = push_utf16_name(&mut pool, "blyt");
        assert_eq!(len, 10);
        assert_eq!(read_utf16_name(&pool, 0).unwrap(), "blyt");
    }

    #[test]
    fn test_unterminated_name() {
        let pool = [0x41, 0x00, 0x42];
        assert!(matches!(read_utf16_name(&pool, 0), Err(Error::BadName(0))));
    }

    #[test]
    fn test_bad_magic() {
        let data = b"xarc\xff\xfe\x1c\x00".repeat(4);
        assert!(matches!(Darc::parse(&data), Err(Error::BadMagic(_))));
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "a.bin"), "a.bin");
        assert_eq!(join_path("blyt", "a.bin"), "blyt/a.bin");
    }
}
