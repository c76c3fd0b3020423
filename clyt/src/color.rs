//! The per-layout colour table
//!
//! The wire format stores colours inline as RGBA words; the editable
//! document stores each distinct colour once and references it by an opaque
//! string key. The table lives on the layout being processed: decode
//! interns every colour it meets, encode resolves keys back to words.
//! Resolver state is never shared across layouts.

use crate::bytes::{ByteReader, ByteWriter};
use crate::{Error, Result};

/// Key of a colour table entry, opaque to the codec.
pub type ColorRef = String;

/// An RGBA quad, one byte per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        let b = r.read_bytes(4)?;
        Ok(Self::new(b[0], b[1], b[2], b[3]))
    }

    pub fn write(self, w: &mut ByteWriter) {
        w.write_bytes(&[self.r, self.g, self.b, self.a]);
    }
}

/// Ordered, deduplicated colour table keyed by opaque strings.
///
/// Interning assigns decimal keys in first-seen order; loading a document
/// inserts whatever keys the document carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorTable {
    entries: Vec<(ColorRef, Rgba)>,
}

impl ColorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Rgba)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }

    /// Insert-if-absent by value; returns the key of the entry.
    pub fn intern(&mut self, color: Rgba) -> ColorRef {
        if let Some((key, _)) = self.entries.iter().find(|(_, c)| *c == color) {
            return key.clone();
        }
        let key = self.entries.len().to_string();
        self.entries.push((key.clone(), color));
        key
    }

    /// Insert under an explicit key (document load). Later duplicates of a
    /// key shadow earlier ones, matching last-write-wins map semantics.
    pub fn insert(&mut self, key: ColorRef, color: Rgba) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = color;
        } else {
            self.entries.push((key, color));
        }
    }

    /// Resolve a key to its colour.
    pub fn resolve(&self, key: &str) -> Result<Rgba> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, c)| *c)
            .ok_or_else(|| Error::UnknownColorKey(key.to_owned()))
    }

    /// Read an inline colour word and intern it.
    pub fn read_ref(&mut self, r: &mut ByteReader<'_>) -> Result<ColorRef> {
        Ok(self.intern(Rgba::read(r)?))
    }

    /// Resolve a key and write its colour word.
    pub fn write_ref(&self, key: &str, w: &mut ByteWriter) -> Result<()> {
        self.resolve(key)?.write(w);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedups_by_value() {
        let mut table = ColorTable::new();
        let white = Rgba::new(255, 255, 255, 255);
        let black = Rgba::new(0, 0, 0, 255);
        assert_eq!(table.intern(white), "0");
        assert_eq!(table.intern(black), "1");
        assert_eq!(table.intern(white), "0");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_resolve_unknown_key() {
        let table = ColorTable::new();
        assert!(matches!(
            table.resolve("7"),
            Err(Error::UnknownColorKey(_))
        ));
    }

    #[test]
    fn test_wire_roundtrip_little_endian_word() {
        // r is the lowest byte of the on-disk u32.
        let mut w = ByteWriter::new();
        Rgba::new(1, 2, 3, 4).write(&mut w);
        assert_eq!(w.as_bytes(), &[1, 2, 3, 4]);

        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        assert_eq!(Rgba::read(&mut r).unwrap(), Rgba::new(1, 2, 3, 4));
    }

    #[test]
    fn test_document_keys_are_opaque() {
        let mut table = ColorTable::new();
        table.insert("accent".into(), Rgba::new(9, 9, 9, 9));
        assert_eq!(table.resolve("accent").unwrap(), Rgba::new(9, 9, 9, 9));
    }
}
