// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Colors, palettes, and the arithmetic between them.
//!
//! A palette is a ring of colors.  The renderer turns an escape count
//! into an index and takes it modulo the length of the ring, so the
//! gradient repeats as the iteration counts climb.  The gradients are
//! built from a handful of key colors by walking from each key to the
//! next, one step per unit of the largest channel difference, and
//! finally from the last key back around to the first.

use error::Error;
use image::Rgba;
use std::str::FromStr;

/// An 8-bit RGBA color.
pub type Color = Rgba<u8>;

/// The key colors the schemes are built from.
#[allow(missing_docs)]
pub mod named {
    use super::Color;
    use image::Rgba;

    pub const ORANGE_RED: Color = Rgba([0xFF, 0x45, 0x00, 0xFF]);
    pub const ORANGE: Color = Rgba([0xFF, 0xA5, 0x00, 0xFF]);
    pub const GOLD: Color = Rgba([0xFF, 0xD7, 0x00, 0xFF]);
    pub const DARK_YELLOW: Color = Rgba([0xEE, 0xEE, 0x9E, 0xFF]);
    pub const DARK_GREEN: Color = Rgba([0x44, 0x88, 0x44, 0xFF]);
    pub const PALE_GREY_BLUE: Color = Rgba([0x49, 0x93, 0xDD, 0xFF]);
    pub const PURPLE: Color = Rgba([0xA0, 0x20, 0xF0, 0xFF]);
    pub const CYAN: Color = Rgba([0x00, 0xFF, 0xFF, 0xFF]);
    pub const RED: Color = Rgba([0xFF, 0x00, 0x00, 0xFF]);
    pub const GREEN: Color = Rgba([0x00, 0xFF, 0x00, 0xFF]);
    pub const BLUE: Color = Rgba([0x00, 0x00, 0xFF, 0xFF]);
    pub const WHITE: Color = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);
    pub const BLACK: Color = Rgba([0x00, 0x00, 0x00, 0xFF]);
    pub const MISTY_ROSE: Color = Rgba([0xFF, 0xE4, 0xE1, 0xFF]);
}

use self::named::*;

/// A non-empty, cyclic table of colors.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette(Vec<Color>);

impl Palette {
    /// Wraps an existing table.  Empty tables are refused; the
    /// renderer indexes palettes modulo their length.
    pub fn from_colors(colors: Vec<Color>) -> Result<Palette, Error> {
        if colors.is_empty() {
            return Err(Error::NoColors);
        }
        Ok(Palette(colors))
    }

    /// Builds a closed gradient through `keys`, as described in the
    /// module documentation.
    pub fn cyclic(keys: &[Color]) -> Result<Palette, Error> {
        if keys.is_empty() {
            return Err(Error::NoColors);
        }
        let mut colors = Vec::with_capacity(256 * keys.len());
        for (i, from) in keys.iter().enumerate() {
            let to = &keys[(i + 1) % keys.len()];
            let steps = distance(from, to);
            if steps == 0 {
                colors.push(*from);
                continue;
            }
            colors.extend((0..steps).map(|k| interpolate(from, to, k as f64 / steps as f64)));
        }
        Ok(Palette(colors))
    }

    /// Number of entries in the ring.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the ring has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The color at `index`, wrapping around the ring.
    #[inline]
    pub fn get(&self, index: u64) -> Color {
        self.0[(index % self.0.len() as u64) as usize]
    }

    /// The table itself.
    pub fn colors(&self) -> &[Color] {
        &self.0
    }
}

/// Channel-wise average of `colors`, with each quotient truncated.
pub fn mean(colors: &[Color]) -> Result<Color, Error> {
    if colors.is_empty() {
        return Err(Error::NoColors);
    }
    Ok(mean_of(colors))
}

// Callers guarantee at least one color.
pub(crate) fn mean_of(colors: &[Color]) -> Color {
    let mut sums = [0u32; 4];
    for color in colors {
        for (sum, channel) in sums.iter_mut().zip(color.0.iter()) {
            *sum += u32::from(*channel);
        }
    }
    let count = colors.len() as u32;
    Rgba([
        (sums[0] / count) as u8,
        (sums[1] / count) as u8,
        (sums[2] / count) as u8,
        (sums[3] / count) as u8,
    ])
}

/// The largest per-channel difference between two colors.
fn distance(c1: &Color, c2: &Color) -> u32 {
    c1.0
        .iter()
        .zip(c2.0.iter())
        .map(|(a, b)| (i32::from(*a) - i32::from(*b)).abs() as u32)
        .max()
        .unwrap_or(0)
}

/// Linear interpolation from `c1` at f = 0 toward `c2` at f = 1.
fn interpolate(c1: &Color, c2: &Color, f: f64) -> Color {
    // Equal channels are returned as-is so float noise cannot round
    // them down by one.
    let mix = |a: u8, b: u8| {
        if a == b {
            a
        } else {
            (f64::from(a) * (1.0 - f) + f64::from(b) * f) as u8
        }
    };
    Rgba([
        mix(c1.0[0], c2.0[0]),
        mix(c1.0[1], c2.0[1]),
        mix(c1.0[2], c2.0[2]),
        mix(c1.0[3], c2.0[3]),
    ])
}

/// The key color sets the explorer ships with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scheme {
    /// Orange, white, orange-red and red.
    Sunset,
    /// Black to white.
    Grayscale,
    /// Blues through cyan to white.
    Ocean,
    /// Greens into gold.
    Forest,
    /// Purple, rose and gold.
    Orchid,
}

impl Scheme {
    /// Every scheme, in the order they are listed to users.
    pub const ALL: [Scheme; 5] = [
        Scheme::Sunset,
        Scheme::Grayscale,
        Scheme::Ocean,
        Scheme::Forest,
        Scheme::Orchid,
    ];

    /// The name the scheme is parsed from.
    pub fn name(self) -> &'static str {
        match self {
            Scheme::Sunset => "sunset",
            Scheme::Grayscale => "grayscale",
            Scheme::Ocean => "ocean",
            Scheme::Forest => "forest",
            Scheme::Orchid => "orchid",
        }
    }

    /// The key colors the gradient passes through.
    pub fn key_colors(self) -> Vec<Color> {
        match self {
            Scheme::Sunset => vec![ORANGE, WHITE, ORANGE_RED, RED],
            Scheme::Grayscale => vec![BLACK, WHITE],
            Scheme::Ocean => vec![BLUE, PALE_GREY_BLUE, CYAN, WHITE],
            Scheme::Forest => vec![DARK_GREEN, DARK_YELLOW, GOLD],
            Scheme::Orchid => vec![PURPLE, MISTY_ROSE, GOLD],
        }
    }

    /// The cyclic palette for this scheme.
    pub fn palette(self) -> Palette {
        Palette::cyclic(&self.key_colors()).expect("every scheme has key colors")
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scheme::ALL
            .iter()
            .find(|scheme| scheme.name() == s)
            .cloned()
            .ok_or_else(|| format!("Unknown palette '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::named::*;
    use super::*;

    #[test]
    fn black_and_white_make_a_closed_loop() {
        let palette = Palette::cyclic(&[BLACK, WHITE]).unwrap();
        assert_eq!(palette.len(), 510);
        let colors = palette.colors();
        assert_eq!(colors[0], BLACK);
        assert!(colors[1].0[0] <= 1);
        assert!(colors[254].0[0] >= 253);
        assert_eq!(colors[255], WHITE);
        assert!(colors[509].0[0] <= 1);
        // One more step around the ring lands back on black.
        assert_eq!(palette.get(510), BLACK);
    }

    #[test]
    fn first_half_rises_second_half_falls() {
        let palette = Palette::cyclic(&[BLACK, WHITE]).unwrap();
        let reds: Vec<u8> = palette.colors().iter().map(|c| c.0[0]).collect();
        assert!(reds[..255].windows(2).all(|w| w[0] <= w[1]));
        assert!(reds[255..].windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn segment_length_is_the_largest_channel_difference() {
        let a = Rgba([10, 0, 0, 255]);
        let b = Rgba([20, 40, 0, 255]);
        let palette = Palette::cyclic(&[a, b]).unwrap();
        assert_eq!(palette.len(), 80);
        assert_eq!(palette.colors()[0], a);
        assert_eq!(palette.colors()[40], b);
    }

    #[test]
    fn alpha_counts_toward_distance() {
        let a = Rgba([0, 0, 0, 0]);
        let b = Rgba([0, 0, 0, 100]);
        assert_eq!(Palette::cyclic(&[a, b]).unwrap().len(), 200);
    }

    #[test]
    fn identical_neighbors_contribute_one_entry() {
        let palette = Palette::cyclic(&[RED, RED, BLUE]).unwrap();
        // RED->RED is one entry, RED->BLUE and BLUE->RED are 255 each.
        assert_eq!(palette.len(), 1 + 255 + 255);
        assert_eq!(palette.colors()[0], RED);
        assert_eq!(palette.colors()[1], RED);
    }

    #[test]
    fn single_key_color_is_a_one_entry_palette() {
        let palette = Palette::cyclic(&[GOLD]).unwrap();
        assert_eq!(palette.colors(), &[GOLD][..]);
    }

    #[test]
    fn empty_inputs_are_refused() {
        assert!(Palette::cyclic(&[]).is_err());
        assert!(Palette::from_colors(vec![]).is_err());
        assert!(mean(&[]).is_err());
    }

    #[test]
    fn get_wraps_around() {
        let palette = Palette::from_colors(vec![RED, GREEN, BLUE]).unwrap();
        assert_eq!(palette.get(0), RED);
        assert_eq!(palette.get(4), GREEN);
        assert_eq!(palette.get(3_000_000_002), BLUE);
    }

    #[test]
    fn mean_truncates() {
        assert_eq!(mean(&[BLACK, WHITE]).unwrap(), Rgba([127, 127, 127, 255]));
        assert_eq!(
            mean(&[Rgba([1, 2, 3, 4]), Rgba([2, 2, 2, 2]), Rgba([2, 2, 2, 2])]).unwrap(),
            Rgba([1, 2, 2, 2])
        );
    }

    #[test]
    fn mean_of_one_is_itself() {
        assert_eq!(mean(&[PURPLE]).unwrap(), PURPLE);
    }

    #[test]
    fn schemes_parse_by_name() {
        for scheme in Scheme::ALL.iter() {
            assert_eq!(scheme.name().parse::<Scheme>(), Ok(*scheme));
            assert!(scheme.palette().len() > 1);
        }
        assert!("plaid".parse::<Scheme>().is_err());
    }
}
