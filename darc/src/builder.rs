//! DARC archive writing
//!
//! Emits the header, entry table, name pool, and data blob for a tree of at
//! most one folder level, with the alignment conventions of the console
//! encoder: a configurable name-pool boundary, per-file data alignment with
//! the final payload left unpadded, and (by default) the reference encoder's
//! asymmetric header length fields.

use tracing::debug;

use crate::archive::{Darc, FOLDER_FLAG, HEADER_LEN, VERSION, push_utf16_name};
use crate::{Error, Result};

/// Alignment and compatibility knobs for [`Darc::build`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Alignment of the end of the name pool.
    pub names_padding: u32,
    /// Alignment of each file payload's start. The final payload is never
    /// padded after.
    pub file_padding: u32,
    /// Write the "table+names length" and "data offset" header fields the
    /// way the console-accepted reference encoder does: the first excludes
    /// the name-pool padding, the second subtracts it and re-adds the
    /// unpadded length modulo 4. When false, both fields are inclusive of
    /// the padding.
    pub compat_header_math: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            names_padding: 4,
            file_padding: 16,
            compat_header_math: true,
        }
    }
}

impl BuildOptions {
    /// Options with the given alignments and reference header math.
    pub fn aligned(names_padding: u32, file_padding: u32) -> Self {
        Self {
            names_padding,
            file_padding,
            ..Self::default()
        }
    }
}

struct PendingEntry {
    name_off: u32,
    data_off: u32,
    size: u32,
}

impl Darc {
    /// Serialize the archive with default alignments.
    pub fn build_default(&self) -> Result<Vec<u8>> {
        self.build(&BuildOptions::default())
    }

    /// Serialize the archive.
    pub fn build(&self, options: &BuildOptions) -> Result<Vec<u8>> {
        let mut folders: Vec<&str> = Vec::new();
        for file in &self.files {
            match file.path.rsplit_once('/') {
                None => {}
                Some((dir, _)) if dir.contains('/') => {
                    return Err(Error::TreeShape(format!(
                        "path {:?} nests more than one folder deep",
                        file.path
                    )));
                }
                Some((dir, _)) => {
                    if !folders.contains(&dir) {
                        folders.push(dir);
                    }
                }
            }
        }
        if folders.len() > 1 {
            return Err(Error::TreeShape(format!(
                "archive holds {} folders, the format carries at most one",
                folders.len()
            )));
        }

        let entry_count = (folders.len() + self.files.len() + 2) as u32;
        let entries_size = entry_count as usize * 12;
        let table_start = HEADER_LEN as usize;

        // Name pool opens with the empty name and "." for the root pair.
        let mut names: Vec<u8> = vec![0x00, 0x00, 0x2E, 0x00, 0x00, 0x00];
        let mut entries = vec![
            PendingEntry {
                name_off: FOLDER_FLAG,
                data_off: 0,
                size: entry_count,
            },
            PendingEntry {
                name_off: FOLDER_FLAG | 2,
                data_off: 0,
                size: entry_count,
            },
        ];

        for folder in &folders {
            let name_off = names.len() as u32;
            push_utf16_name(&mut names, folder);
            entries.push(PendingEntry {
                name_off: FOLDER_FLAG | name_off,
                // The reference encoder stores 1 here; consoles accept it.
                data_off: 1,
                size: entry_count,
            });
        }

        let first_file_entry = entries.len();
        for file in &self.files {
            let basename = file.path.rsplit('/').next().unwrap_or(&file.path);
            let name_off = names.len() as u32;
            push_utf16_name(&mut names, basename);
            entries.push(PendingEntry {
                name_off,
                data_off: 0,
                size: file.data.len() as u32,
            });
        }

        let names_align = options.names_padding.max(1) as usize;
        let names_end = table_start + entries_size + names.len();
        let names_extra = match names_end % names_align {
            0 => 0,
            rem => names_align - rem,
        };
        names.resize(names.len() + names_extra, 0);
        let data_start = table_start + entries_size + names.len();

        let file_align = options.file_padding.max(1) as usize;
        let mut file_data: Vec<u8> = Vec::new();
        for (i, file) in self.files.iter().enumerate() {
            entries[first_file_entry + i].data_off = (file_data.len() + data_start) as u32;
            file_data.extend_from_slice(&file.data);
            let rem = file_data.len() % file_align;
            if rem != 0 && i + 1 != self.files.len() {
                file_data.resize(file_data.len() + (file_align - rem), 0);
            }
        }

        let file_len = table_start + entries_size + names.len() + file_data.len();
        let (table_names_len, data_off_field) = if options.compat_header_math {
            (
                entries_size + names.len() - names_extra,
                data_start - names_extra + (names_end & 3),
            )
        } else {
            (entries_size + names.len(), data_start)
        };

        let mut out = Vec::with_capacity(file_len);
        out.extend_from_slice(b"darc");
        out.extend_from_slice(&0xFEFFu16.to_le_bytes());
        out.extend_from_slice(&(HEADER_LEN as u16).to_le_bytes());
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&(file_len as u32).to_le_bytes());
        out.extend_from_slice(&(table_start as u32).to_le_bytes());
        out.extend_from_slice(&(table_names_len as u32).to_le_bytes());
        out.extend_from_slice(&(data_off_field as u32).to_le_bytes());
        for entry in &entries {
            out.extend_from_slice(&entry.name_off.to_le_bytes());
            out.extend_from_slice(&entry.data_off.to_le_bytes());
            out.extend_from_slice(&entry.size.to_le_bytes());
        }
        out.extend_from_slice(&names);
        out.extend_from_slice(&file_data);

        debug!(
            "DARC built: {} files, {} folder(s), {} bytes",
            self.files.len(),
            folders.len(),
            out.len()
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_folders_rejected() {
        let mut archive = Darc::default();
        archive.push("blyt/a.bclyt", vec![1]);
        archive.push("timg/b.bclim", vec![2]);
        assert!(matches!(
            archive.build_default(),
            Err(Error::TreeShape(_))
        ));
    }

    #[test]
    fn test_nested_folder_rejected() {
        let mut archive = Darc::default();
        archive.push("a/b/c.bin", vec![1]);
        assert!(matches!(
            archive.build_default(),
            Err(Error::TreeShape(_))
        ));
    }

    #[test]
    fn test_root_pair_and_folder_entry() {
        let mut archive = Darc::default();
        archive.push("blyt/A.bclyt", vec![1, 2, 3, 4]);
        let bytes = archive.build_default().unwrap();

        // Entries at 0x1C: root, root-dup, folder, file.
        let entry = |i: usize| {
            let at = 0x1C + i * 12;
            (
                u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap()),
                u32::from_le_bytes(bytes[at + 4..at + 8].try_into().unwrap()),
                u32::from_le_bytes(bytes[at + 8..at + 12].try_into().unwrap()),
            )
        };
        assert_eq!(entry(0), (0x0100_0000, 0, 4));
        assert_eq!(entry(1), (0x0100_0002, 0, 4));
        assert_eq!(entry(2), (0x0100_0006, 1, 4));
        let (file_name_off, _, file_size) = entry(3);
        assert_eq!(file_name_off, 6 + 10); // after "" "." and "blyt\0"
        assert_eq!(file_size, 4);
    }

    #[test]
    fn test_name_pool_seed() {
        let mut archive = Darc::default();
        archive.push("blyt/A.bclyt", vec![0xAA]);
        let bytes = archive.build_default().unwrap();
        let names_start = 0x1C + 4 * 12;
        assert_eq!(
            &bytes[names_start..names_start + 6],
            &[0x00, 0x00, 0x2E, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_last_file_not_padded() {
        let mut archive = Darc::default();
        archive.push("a.bin", vec![1, 2, 3]);
        let bytes = archive.build_default().unwrap();
        // Data blob is the trailing 3 bytes, no alignment tail.
        assert_eq!(&bytes[bytes.len() - 3..], &[1, 2, 3]);
    }
}
