// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time kernel.  Both fractals iterate z = z² + c; they
//! differ only in which of z₀ and c the sampled point supplies.

use num::Complex;
use palette::{Color, Palette};

/// Which set is being drawn.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Kind {
    /// z₀ = 0 and c is the sampled point.
    Mandelbrot,
    /// z₀ is the sampled point and c is this constant.
    Julia(Complex<f64>),
}

impl Kind {
    /// The starting value and the constant for a sampled point.
    #[inline]
    pub fn seed(&self, point: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        match *self {
            Kind::Mandelbrot => (Complex::new(0.0, 0.0), point),
            Kind::Julia(c) => (point, c),
        }
    }
}

/// The outcome of iterating one point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Escape {
    /// The orbit stayed inside the bailout radius for every iteration.
    Bounded,
    /// The orbit left after `iterations` applications of the map,
    /// reaching a squared magnitude of `norm_sqr`.
    Escaped {
        /// Applications of the map before the bailout test failed.
        iterations: u64,
        /// |z|² at that point.
        norm_sqr: f64,
    },
}

/// Iterates `point` until |z|² reaches `bailout` or `limit`
/// iterations have run.  The bailout is compared against the squared
/// magnitude, so a bailout of 4 is the usual radius of 2.
pub fn escape_time(kind: &Kind, point: Complex<f64>, limit: u64, bailout: f64) -> Escape {
    let (mut z, c) = kind.seed(point);
    let mut n = 0;
    let mut norm_sqr = z.norm_sqr();
    while n < limit && norm_sqr < bailout {
        z = z * z + c;
        norm_sqr = z.norm_sqr();
        n += 1;
    }
    if n == limit {
        Escape::Bounded
    } else {
        Escape::Escaped {
            iterations: n,
            norm_sqr,
        }
    }
}

/// How escape counts become palette indices.
#[derive(Copy, Clone, Debug)]
pub struct Coloring<'a> {
    /// Smooth, fractional counts when true; whole counts otherwise.
    pub normalize: bool,
    /// Multiplier applied to the count before indexing.
    pub frequency: f64,
    /// Color of points that never escape.
    pub escape_color: Color,
    /// The ring of colors indexed by the scaled count.
    pub palette: &'a Palette,
}

impl<'a> Coloring<'a> {
    /// The palette index for an escaped orbit.
    pub fn index(&self, iterations: u64, norm_sqr: f64) -> u64 {
        if self.normalize {
            let modulus = norm_sqr.sqrt();
            let correction = modulus.log10().log10() / 2f64.log10();
            // NaN and negatives saturate to 0.
            ((iterations as f64 - correction) * self.frequency) as u64
        } else {
            iterations.wrapping_mul(self.frequency as u64)
        }
    }

    /// The color for an escape result.
    pub fn color(&self, escape: Escape) -> Color {
        match escape {
            Escape::Bounded => self.escape_color,
            Escape::Escaped {
                iterations,
                norm_sqr,
            } => self.palette.get(self.index(iterations, norm_sqr)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::named::*;

    #[test]
    fn origin_never_escapes_the_mandelbrot() {
        for &limit in &[1, 10, 1000] {
            for &bailout in &[0.5, 4.0, 400.0] {
                assert_eq!(
                    escape_time(&Kind::Mandelbrot, Complex::new(0.0, 0.0), limit, bailout),
                    Escape::Bounded
                );
            }
        }
    }

    #[test]
    fn far_points_escape_after_one_step() {
        let escape = escape_time(&Kind::Mandelbrot, Complex::new(2.0, 2.0), 100, 4.0);
        assert_eq!(
            escape,
            Escape::Escaped {
                iterations: 1,
                norm_sqr: 8.0
            }
        );
    }

    #[test]
    fn julia_starts_from_the_point() {
        let kind = Kind::Julia(Complex::new(0.0, 0.0));
        // With c = 0 the orbit of 3 is 3, 9, ...; it is already out.
        assert_eq!(
            escape_time(&kind, Complex::new(3.0, 0.0), 100, 4.0),
            Escape::Escaped {
                iterations: 0,
                norm_sqr: 9.0
            }
        );
        // And the unit disc interior stays put.
        assert_eq!(
            escape_time(&kind, Complex::new(0.5, 0.0), 100, 4.0),
            Escape::Bounded
        );
    }

    #[test]
    fn seeds_swap_between_kinds() {
        let p = Complex::new(0.25, -0.5);
        let c = Complex::new(-0.7, 0.3);
        assert_eq!(Kind::Mandelbrot.seed(p), (Complex::new(0.0, 0.0), p));
        assert_eq!(Kind::Julia(c).seed(p), (p, c));
    }

    #[test]
    fn bounded_points_take_the_escape_color() {
        let palette = Palette::cyclic(&[RED, BLUE]).unwrap();
        let coloring = Coloring {
            normalize: true,
            frequency: 20.0,
            escape_color: MISTY_ROSE,
            palette: &palette,
        };
        assert_eq!(coloring.color(Escape::Bounded), MISTY_ROSE);
    }

    #[test]
    fn stepped_coloring_truncates_the_frequency() {
        let palette = Palette::from_colors(vec![RED, GREEN, BLUE, WHITE, BLACK]).unwrap();
        let coloring = Coloring {
            normalize: false,
            frequency: 2.9,
            escape_color: BLACK,
            palette: &palette,
        };
        assert_eq!(coloring.index(3, 100.0), 6);
        assert_eq!(coloring.color(Escape::Escaped { iterations: 3, norm_sqr: 100.0 }), GREEN);
    }

    #[test]
    fn normalized_coloring_subtracts_the_log_log_correction() {
        let palette = Palette::from_colors(vec![BLACK]).unwrap();
        let coloring = Coloring {
            normalize: true,
            frequency: 10.0,
            escape_color: WHITE,
            palette: &palette,
        };
        // |z| = 100: log10(log10(100)) / log10(2) = 1.
        assert_eq!(coloring.index(5, 10_000.0), 40);
        // |z| < 10 makes the correction negative, raising the index.
        assert!(coloring.index(5, 16.0) > 50);
    }

    #[test]
    fn normalized_coloring_saturates_nonsense_at_zero() {
        let palette = Palette::from_colors(vec![BLACK, WHITE]).unwrap();
        let coloring = Coloring {
            normalize: true,
            frequency: 1.0,
            escape_color: RED,
            palette: &palette,
        };
        // |z| below 1 has no log-log; the index falls back to 0.
        assert_eq!(coloring.index(0, 0.25), 0);
    }
}
