//! CLIM texture footer probe
//!
//! Textures move through the toolchain as opaque blobs; this probe only
//! reads the 0x28-byte footer at the end of a BCLIM file (magic, BOM-driven
//! endianness, and the `imag` block's dimensions and texel format) for
//! inspection and logging.

use clyt::bytes::ByteReader;

use crate::{Error, Result};

/// 3DS texel formats a CLIM may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    L8 = 0x00,
    A8 = 0x01,
    La4 = 0x02,
    La8 = 0x03,
    Hilo8 = 0x04,
    Rgb565 = 0x05,
    Rgb8 = 0x06,
    Rgb5a1 = 0x07,
    Rgba4 = 0x08,
    Rgba8 = 0x09,
    Etc1 = 0x0A,
    Etc1A4 = 0x0B,
    L4 = 0x0C,
    A4 = 0x0D,
}

impl ImageFormat {
    pub fn from_raw(raw: u32) -> Result<Self> {
        use ImageFormat::*;
        const ALL: [ImageFormat; 14] = [
            L8, A8, La4, La8, Hilo8, Rgb565, Rgb8, Rgb5a1, Rgba4, Rgba8, Etc1, Etc1A4, L4, A4,
        ];
        ALL.into_iter()
            .find(|f| *f as u32 == raw)
            .ok_or_else(|| Error::BadClim(format!("unknown image format {raw:#x}")))
    }
}

/// Parsed CLIM footer metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClimInfo {
    pub width: u16,
    pub height: u16,
    pub format: ImageFormat,
    pub big_endian: bool,
}

impl ClimInfo {
    /// Probe the footer of a complete BCLIM buffer.
    pub fn probe(data: &[u8]) -> Result<Self> {
        let footer_at = data
            .len()
            .checked_sub(0x28)
            .ok_or_else(|| Error::BadClim(format!("file of {} bytes has no footer", data.len())))?;
        let mut r = ByteReader::new(data).section(footer_at);

        let magic = r.read_bytes(4).map_err(|_| short_footer())?;
        if magic != b"CLIM" {
            return Err(Error::BadClim(format!("bad magic {magic:?}")));
        }

        // A swapped BOM flips every later read to big-endian.
        let bom = r.read_u16().map_err(|_| short_footer())?;
        let big_endian = match bom {
            0xFEFF => false,
            0xFFFE => true,
            other => return Err(Error::BadClim(format!("bad byte order mark {other:#06x}"))),
        };
        let read_u16 = |r: &mut ByteReader<'_>| {
            if big_endian { r.read_u16_be() } else { r.read_u16() }
        };
        let read_u32 = |r: &mut ByteReader<'_>| {
            if big_endian { r.read_u32_be() } else { r.read_u32() }
        };

        let header_len = read_u16(&mut r).map_err(|_| short_footer())?;
        if header_len != 0x14 {
            return Err(Error::BadClim(format!("bad header length {header_len:#x}")));
        }
        let _revision = read_u32(&mut r).map_err(|_| short_footer())?;
        let _file_size = read_u32(&mut r).map_err(|_| short_footer())?;
        let _data_blocks = read_u16(&mut r).map_err(|_| short_footer())?;
        r.skip(2);

        let block_magic = r.read_bytes(4).map_err(|_| short_footer())?;
        if block_magic != b"imag" {
            return Err(Error::BadClim(format!("bad image block magic {block_magic:?}")));
        }
        let _block_len = read_u32(&mut r).map_err(|_| short_footer())?;
        let width = read_u16(&mut r).map_err(|_| short_footer())?;
        let height = read_u16(&mut r).map_err(|_| short_footer())?;
        let format = ImageFormat::from_raw(read_u32(&mut r).map_err(|_| short_footer())?)?;

        Ok(Self {
            width,
            height,
            format,
            big_endian,
        })
    }
}

fn short_footer() -> Error {
    Error::BadClim("truncated footer".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footer(width: u16, height: u16, format: u32) -> Vec<u8> {
        let mut out = vec![0xEE; 8]; // stand-in pixel data
        out.extend_from_slice(b"CLIM");
        out.extend_from_slice(&0xFEFFu16.to_le_bytes());
        out.extend_from_slice(&0x14u16.to_le_bytes());
        out.extend_from_slice(&0x0202_0000u32.to_le_bytes());
        out.extend_from_slice(&(8 + 0x28u32).to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(b"imag");
        out.extend_from_slice(&0x10u32.to_le_bytes());
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&format.to_le_bytes());
        // Trailing pixel-data length closes the 0x28-byte footer.
        out.extend_from_slice(&8u32.to_le_bytes());
        out
    }

    #[test]
    fn test_probe_little_endian() {
        let info = ClimInfo::probe(&footer(64, 128, 0x0A)).unwrap();
        assert_eq!(info.width, 64);
        assert_eq!(info.height, 128);
        assert_eq!(info.format, ImageFormat::Etc1);
        assert!(!info.big_endian);
    }

    #[test]
    fn test_probe_rejects_bad_magic() {
        let mut data = footer(4, 4, 0);
        let at = data.len() - 0x28;
        data[at..at + 4].copy_from_slice(b"MILC");
        assert!(ClimInfo::probe(&data).is_err());
    }

    #[test]
    fn test_probe_rejects_short_buffer() {
        assert!(ClimInfo::probe(&[0; 16]).is_err());
    }

    #[test]
    fn test_probe_unknown_format() {
        assert!(ClimInfo::probe(&footer(4, 4, 0x20)).is_err());
    }
}
