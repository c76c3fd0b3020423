//! Vector types shared across sections

use crate::bytes::{ByteReader, ByteWriter};
use crate::Result;

/// Two-component float vector (sizes, scales, UV coordinates).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            x: r.read_f32()?,
            y: r.read_f32()?,
        })
    }

    pub fn write(self, w: &mut ByteWriter) {
        w.write_f32(self.x);
        w.write_f32(self.y);
    }
}

/// Three-component float vector (translations, rotations).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            x: r.read_f32()?,
            y: r.read_f32()?,
            z: r.read_f32()?,
        })
    }

    pub fn write(self, w: &mut ByteWriter) {
        w.write_f32(self.x);
        w.write_f32(self.y);
        w.write_f32(self.z);
    }
}
