//! RGB colors for default geometry, flat markers and trail segments.

use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized color `{0}`")]
pub struct ParseColorError(pub String);

const NAMED: &[(&str, Color)] = &[
    ("black", Color::rgb(0x00, 0x00, 0x00)),
    ("silver", Color::rgb(0xc0, 0xc0, 0xc0)),
    ("gray", Color::rgb(0x80, 0x80, 0x80)),
    ("grey", Color::rgb(0x80, 0x80, 0x80)),
    ("white", Color::rgb(0xff, 0xff, 0xff)),
    ("maroon", Color::rgb(0x80, 0x00, 0x00)),
    ("red", Color::rgb(0xff, 0x00, 0x00)),
    ("purple", Color::rgb(0x80, 0x00, 0x80)),
    ("fuchsia", Color::rgb(0xff, 0x00, 0xff)),
    ("magenta", Color::rgb(0xff, 0x00, 0xff)),
    ("green", Color::rgb(0x00, 0x80, 0x00)),
    ("lime", Color::rgb(0x00, 0xff, 0x00)),
    ("olive", Color::rgb(0x80, 0x80, 0x00)),
    ("yellow", Color::rgb(0xff, 0xff, 0x00)),
    ("orange", Color::rgb(0xff, 0xa5, 0x00)),
    ("navy", Color::rgb(0x00, 0x00, 0x80)),
    ("blue", Color::rgb(0x00, 0x00, 0xff)),
    ("teal", Color::rgb(0x00, 0x80, 0x80)),
    ("aqua", Color::rgb(0x00, 0xff, 0xff)),
    ("cyan", Color::rgb(0x00, 0xff, 0xff)),
];

impl Color {
    /// Color of the default geometry used for unknown categories.
    pub const GREEN: Color = Color::rgb(0x00, 0x80, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The identifying color of a tracked object: its id's first six
    /// characters read as a hex triplet. Ids that are not hex get a stable
    /// color hashed from the whole id.
    pub fn from_id(id: &str) -> Self {
        let prefix: String = id.chars().take(6).collect();
        match parse_hex(&prefix) {
            Some(color) => color,
            None => {
                // FNV-1a
                let hash = id.bytes().fold(0x811c9dc5u32, |hash, byte| {
                    (hash ^ byte as u32).wrapping_mul(0x01000193)
                });
                let [r, g, b, _] = hash.to_le_bytes();
                Self { r, g, b }
            }
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn parse_hex(digits: &str) -> Option<Color> {
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        6 => Some(Color {
            r: channel(&digits[0..2])?,
            g: channel(&digits[2..4])?,
            b: channel(&digits[4..6])?,
        }),
        3 => {
            let double = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
            Some(Color {
                r: double(0)?,
                g: double(1)?,
                b: double(2)?,
            })
        }
        _ => None,
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(digits) = trimmed.strip_prefix('#') {
            return parse_hex(digits).ok_or_else(|| ParseColorError(s.to_string()));
        }
        let lower = trimmed.to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, color)| *color)
            .ok_or_else(|| ParseColorError(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
