//! sRGB colors parsed from CSS-style strings, and palettes to pick from.

use std::str::FromStr;

use rand::Rng;

use crate::error::{CoreError, CoreResult};

/// RGB color with channels in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

const NAMED: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("orange", [255, 165, 0]),
    ("pink", [255, 192, 203]),
    ("purple", [128, 0, 128]),
    ("mediumpurple", [147, 112, 219]),
    ("plum", [221, 160, 221]),
    ("violet", [238, 130, 238]),
    ("orchid", [218, 112, 214]),
    ("indigo", [75, 0, 130]),
    ("lavender", [230, 230, 250]),
    ("thistle", [216, 191, 216]),
    ("skyblue", [135, 206, 235]),
    ("gold", [255, 215, 0]),
];

impl Rgb {
    pub const fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Parse `#rgb`, `#rrggbb` or a CSS color name (case-insensitive).
    pub fn parse(s: &str) -> CoreResult<Self> {
        let trimmed = s.trim();
        let invalid = || CoreError::InvalidColor(s.to_string());

        if let Some(hex) = trimmed.strip_prefix('#') {
            if !hex.is_ascii() {
                return Err(invalid());
            }
            let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|_| invalid());
            return match hex.len() {
                3 => {
                    let mut c = [0u8; 3];
                    for (i, slot) in c.iter_mut().enumerate() {
                        let v = channel(&hex[i..i + 1])?;
                        *slot = v * 17;
                    }
                    Ok(Self::from_u8(c[0], c[1], c[2]))
                }
                6 => Ok(Self::from_u8(
                    channel(&hex[0..2])?,
                    channel(&hex[2..4])?,
                    channel(&hex[4..6])?,
                )),
                _ => Err(invalid()),
            };
        }

        let lower = trimmed.to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, [r, g, b])| Self::from_u8(*r, *g, *b))
            .ok_or_else(invalid)
    }
}

impl FromStr for Rgb {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Non-empty set of colors particles are tinted with.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> CoreResult<Self> {
        if colors.is_empty() {
            return Err(CoreError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    /// Parse a comma-separated list such as `purple,#93f,plum`.
    pub fn parse_list(list: &str) -> CoreResult<Self> {
        let colors = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Rgb::parse)
            .collect::<CoreResult<Vec<_>>>()?;
        Self::new(colors)
    }

    /// Purple, medium purple and plum.
    pub fn purples() -> Self {
        Self {
            colors: vec![
                Rgb::from_u8(128, 0, 128),
                Rgb::from_u8(147, 112, 219),
                Rgb::from_u8(221, 160, 221),
            ],
        }
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgb {
        self.colors[rng.random_range(0..self.colors.len())]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::purples()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Rgb::parse("#ff0000").unwrap(), Rgb::from_u8(255, 0, 0));
        assert_eq!(Rgb::parse("#0f0").unwrap(), Rgb::from_u8(0, 255, 0));
        assert!(Rgb::parse("#12345").is_err());
        assert!(Rgb::parse("#zzzzzz").is_err());
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(
            Rgb::parse(" MediumPurple ").unwrap(),
            Rgb::from_u8(147, 112, 219)
        );
        assert_eq!(
            Rgb::parse("chartreuse-ish"),
            Err(CoreError::InvalidColor("chartreuse-ish".into()))
        );
    }

    #[test]
    fn palette_list_rejects_empty_and_bad_entries() {
        assert_eq!(Palette::parse_list(" , "), Err(CoreError::EmptyPalette));
        assert!(Palette::parse_list("purple,nope").is_err());
        let p = Palette::parse_list("purple, #fff").unwrap();
        assert_eq!(p.colors().len(), 2);
    }

    #[test]
    fn pick_stays_in_palette() {
        let palette = Palette::purples();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let c = palette.pick(&mut rng);
            assert!(palette.colors().contains(&c));
        }
    }
}
