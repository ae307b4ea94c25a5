use crate::error::{GlyphGridError, GridResult};

pub use kurbo::{Point, Rect, Vec2};

/// Pixel extent of the drawing surface. A zero extent is a valid, empty
/// surface (nothing is drawn, nothing errors).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn bounds(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Straight (non-premultiplied) RGBA8 color.
///
/// Serialized as a `#rrggbb` / `#rrggbbaa` hex string, the form the engine's
/// options take colors in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn from_hex_str(s: &str) -> GridResult<Self> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| GlyphGridError::config(format!("color '{s}' must start with '#'")))?;
        if !matches!(hex.len(), 6 | 8) {
            return Err(GlyphGridError::config(format!(
                "color '{s}' must be #rrggbb or #rrggbbaa"
            )));
        }

        let byte = |i: usize| -> GridResult<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| GlyphGridError::config(format!("color '{s}' has invalid hex digits")))
        };

        Ok(Self {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a: if hex.len() == 8 { byte(6)? } else { 255 },
        })
    }

    pub fn to_hex_string(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Premultiplied RGBA8 bytes for direct pixel writes.
    pub fn to_premul(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::from_hex_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip_rgb_and_rgba() {
        let c = Rgba8::from_hex_str("#00d9ff").unwrap();
        assert_eq!(c, Rgba8::rgb(0x00, 0xd9, 0xff));
        assert_eq!(c.to_hex_string(), "#00d9ff");

        let c = Rgba8::from_hex_str("#11223380").unwrap();
        assert_eq!(c.a, 0x80);
        assert_eq!(c.to_hex_string(), "#11223380");
    }

    #[test]
    fn hex_rejects_malformed_input() {
        assert!(Rgba8::from_hex_str("00ff00").is_err());
        assert!(Rgba8::from_hex_str("#00ff0").is_err());
        assert!(Rgba8::from_hex_str("#zzzzzz").is_err());
    }

    #[test]
    fn premul_scales_channels_by_alpha() {
        assert_eq!(Rgba8::rgb(255, 0, 10).to_premul(), [255, 0, 10, 255]);
        let half = Rgba8 {
            r: 255,
            g: 255,
            b: 255,
            a: 128,
        };
        assert_eq!(half.to_premul(), [128, 128, 128, 128]);
    }

    #[test]
    fn zero_extent_surface_is_empty() {
        assert!(SurfaceSize::new(0, 10).is_empty());
        assert!(SurfaceSize::new(10, 0).is_empty());
        assert!(!SurfaceSize::new(1, 1).is_empty());
    }
}
