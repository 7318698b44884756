use crate::foundation::error::{ExportError, ExportResult};

pub use kurbo::{Point, Rect, Size, Vec2};

/// Absolute 0-based frame index counted from the start of an export.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Integral frames-per-second of an export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FrameRate(u32);

impl FrameRate {
    /// Create a validated frame rate.
    pub fn new(fps: u32) -> ExportResult<Self> {
        if fps == 0 {
            return Err(ExportError::validation("fps must be > 0"));
        }
        Ok(Self(fps))
    }

    /// Frames per second.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    /// Presentation timestamp of frame `idx` in microseconds (`idx * 1_000_000 / fps`).
    pub fn timestamp_us(self, idx: FrameIndex) -> u64 {
        let us = u128::from(idx.0) * 1_000_000 / u128::from(self.0);
        us as u64
    }

    /// Convert whole seconds to a frame count.
    pub fn secs_to_frames(self, secs: u32) -> u64 {
        u64::from(secs) * u64::from(self.0)
    }

    /// Convert a frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) / self.as_f64()
    }
}

/// Target video bitrate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Bitrate {
    bps: u64,
}

impl Bitrate {
    /// Create a bitrate from megabits per second.
    pub fn from_mbps(mbps: u32) -> ExportResult<Self> {
        if mbps == 0 {
            return Err(ExportError::validation("bitrate must be > 0"));
        }
        Ok(Self {
            bps: u64::from(mbps) * 1_000_000,
        })
    }

    /// Bits per second.
    pub fn bps(self) -> u64 {
        self.bps
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas description.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Return `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Byte length of a tightly packed RGBA8 frame of this size.
    pub fn rgba_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    /// Canvas extent as a rectangle anchored at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Straight-alpha RGBA8 colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Colour with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent black.
    pub const fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0)
    }

    /// Return `true` when the colour has no coverage.
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Alpha as a `0.0..=1.0` opacity.
    pub fn opacity(self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// `#rrggbb` ignoring alpha.
    pub fn hex_rgb(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse a CSS-style colour.
    ///
    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)` (alpha in
    /// `0..=1`) and `transparent`.
    pub fn parse(s: &str) -> ExportResult<Self> {
        parse_css_color(s).map_err(ExportError::validation)
    }

    /// Canonical CSS text: `#rrggbb` when opaque, `rgba(...)` otherwise.
    pub fn to_css(self) -> String {
        if self.a == 255 {
            return self.hex_rgb();
        }
        let alpha = format!("{:.3}", f64::from(self.a) / 255.0);
        let alpha = alpha.trim_end_matches('0').trim_end_matches('.');
        format!("rgba({}, {}, {}, {alpha})", self.r, self.g, self.b)
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Css(String),
            Obj {
                r: u8,
                g: u8,
                b: u8,
                #[serde(default = "opaque")]
                a: u8,
            },
            Arr(Vec<u8>),
        }

        fn opaque() -> u8 {
            255
        }

        match Repr::deserialize(deserializer)? {
            Repr::Css(s) => parse_css_color(&s).map_err(serde::de::Error::custom),
            Repr::Obj { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
                [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "colour array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

fn parse_css_color(s: &str) -> Result<Rgba8, String> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("transparent") {
        return Ok(Rgba8::transparent());
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = s.to_ascii_lowercase();
    let (body, want_alpha) = if let Some(rest) = lower.strip_prefix("rgba(") {
        (rest, true)
    } else if let Some(rest) = lower.strip_prefix("rgb(") {
        (rest, false)
    } else {
        return Err(format!("unsupported colour \"{s}\""));
    };
    let body = body
        .strip_suffix(')')
        .ok_or_else(|| format!("unterminated colour function \"{s}\""))?;

    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let channel = |p: &str| -> Result<u8, String> {
        let v: f64 = p
            .parse()
            .map_err(|_| format!("invalid colour channel \"{p}\""))?;
        Ok(v.round().clamp(0.0, 255.0) as u8)
    };

    match (parts.as_slice(), want_alpha) {
        ([r, g, b], false) => Ok(Rgba8::rgb(channel(r)?, channel(g)?, channel(b)?)),
        ([r, g, b, a], true) => {
            let alpha: f64 = a
                .parse()
                .map_err(|_| format!("invalid alpha \"{a}\""))?;
            let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
            Ok(Rgba8::rgba(channel(r)?, channel(g)?, channel(b)?, alpha))
        }
        _ => Err(format!("wrong number of colour components in \"{s}\"")),
    }
}

fn parse_hex(s: &str) -> Result<Rgba8, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err("hex colour must be ASCII".to_owned());
    }

    match s.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in s.chars().enumerate() {
                let nibble = c
                    .to_digit(16)
                    .ok_or_else(|| format!("invalid hex digit '{c}'"))?;
                out[i] = (nibble * 17) as u8;
            }
            Ok(Rgba8::rgb(out[0], out[1], out[2]))
        }
        6 => Ok(Rgba8::rgb(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        8 => Ok(Rgba8::rgba(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => Err("hex colour must be #RGB, #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
