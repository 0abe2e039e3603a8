use crate::foundation::error::{LyricError, LyricResult};

/// Straight (non-premultiplied) sRGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

const NAMED: &[(&str, Rgb8)] = &[
    ("white", Rgb8::new(255, 255, 255)),
    ("black", Rgb8::new(0, 0, 0)),
    ("red", Rgb8::new(255, 0, 0)),
    ("orange", Rgb8::new(255, 165, 0)),
    ("yellow", Rgb8::new(255, 255, 0)),
    ("green", Rgb8::new(0, 128, 0)),
    ("blue", Rgb8::new(0, 0, 255)),
    ("purple", Rgb8::new(128, 0, 128)),
    ("cyan", Rgb8::new(0, 255, 255)),
    ("magenta", Rgb8::new(255, 0, 255)),
    ("gray", Rgb8::new(128, 128, 128)),
    ("grey", Rgb8::new(128, 128, 128)),
];

impl Rgb8 {
    /// `#FFFFFF`.
    pub const WHITE: Rgb8 = Rgb8::new(255, 255, 255);

    /// Colour from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `#RGB` (leading `#` optional) or a basic colour name.
    pub fn parse(s: &str) -> LyricResult<Self> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if let Some((_, c)) = NAMED.iter().find(|(name, _)| *name == lower) {
            return Ok(*c);
        }

        let hex = lower.strip_prefix('#').unwrap_or(&lower);
        let bad = || LyricError::effect(format!("invalid colour '{trimmed}'"));
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(bad());
        }
        match hex.len() {
            6 => {
                let ch = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
                Ok(Self::new(ch(0)?, ch(2)?, ch(4)?))
            }
            3 => {
                let ch = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| bad())
                };
                Ok(Self::new(ch(0)?, ch(1)?, ch(2)?))
            }
            _ => Err(bad()),
        }
    }

    /// Per-channel `255 - c`.
    pub const fn complement(self) -> Self {
        Self::new(255 - self.r, 255 - self.g, 255 - self.b)
    }

    /// HSV to RGB with channels truncated (not rounded) to 0..=255.
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let (r, g, b) = if s <= 0.0 {
            (v, v, v)
        } else {
            let h6 = h.rem_euclid(1.0) * 6.0;
            let i = h6.floor();
            let f = h6 - i;
            let p = v * (1.0 - s);
            let q = v * (1.0 - s * f);
            let t = v * (1.0 - s * (1.0 - f));
            match (i as u32) % 6 {
                0 => (v, t, p),
                1 => (q, v, p),
                2 => (p, v, t),
                3 => (p, q, v),
                4 => (t, p, v),
                _ => (v, p, q),
            }
        };
        let ch = |x: f64| (x.clamp(0.0, 1.0) * 255.0) as u8;
        Self::new(ch(r), ch(g), ch(b))
    }

    /// `#RRGGBB`, uppercase.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb8 {
    type Error = LyricError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Rgb8> for String {
    fn from(value: Rgb8) -> Self {
        value.to_hex()
    }
}

impl std::fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
