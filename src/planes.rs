// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Viewport, a rectangle on the complex plane, and the
//! CoordinateScaler, which relates a rectangle on the integral plane
//! with an origin at 0,0 (the image) to the Viewport.  The scaler is
//! a snapshot: it is rebuilt for every render from whatever bounds
//! the Viewport holds at that moment.

use error::Error;
use num::Complex;

/// The width and height of the integral plane.  It is assumed to
/// start at 0,0 and all values are assumed to be non-negative.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Pixels per row.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl ImageSize {
    /// Constructor.
    pub fn new(width: usize, height: usize) -> ImageSize {
        ImageSize { width, height }
    }

    /// The total number of pixels in the image.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Describes that the integral plane has no size.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The column and row of a pixel on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pixel(pub usize, pub usize);

/// A point on the integral plane that is allowed to fall outside the
/// image, as a pointer can when the user clicks near an edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Point(pub isize, pub isize);

/// The rectangle of the complex plane currently mapped onto the
/// image.  The real part runs along x, the imaginary part along y.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Left edge.
    pub x_min: f64,
    /// Top edge, in image orientation.
    pub y_min: f64,
    /// Right edge.
    pub x_max: f64,
    /// Bottom edge, in image orientation.
    pub y_max: f64,
}

impl Viewport {
    /// Constructor.  Refuses rectangles whose minimum corner is not
    /// strictly below and to the left of the maximum corner.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<Viewport, Error> {
        let viewport = Viewport {
            x_min,
            y_min,
            x_max,
            y_max,
        };
        if viewport.is_proper() {
            Ok(viewport)
        } else {
            Err(Error::BadViewport(x_min, y_min, x_max, y_max))
        }
    }

    /// The classic framing of the whole Mandelbrot set.
    pub fn mandelbrot() -> Viewport {
        Viewport {
            x_min: -2.5,
            y_min: -1.5,
            x_max: 1.0,
            y_max: 1.5,
        }
    }

    /// A framing that holds most connected Julia sets.
    pub fn julia() -> Viewport {
        Viewport {
            x_min: -1.7,
            y_min: -1.0,
            x_max: 1.7,
            y_max: 1.0,
        }
    }

    fn is_proper(&self) -> bool {
        // Written so that NaN bounds fail too.
        self.x_min < self.x_max && self.y_min < self.y_max
    }

    /// The viewport covered right now by a box of `magnify` pixels
    /// centered on `point`, on an image of `image` pixels.  Half of the
    /// box is taken with integer division, so odd sizes lose a pixel.
    pub fn magnified(
        &self,
        image: ImageSize,
        magnify: ImageSize,
        point: Point,
    ) -> Result<Viewport, Error> {
        let scaler = CoordinateScaler::new(image, self)?;
        let half_width = (magnify.width / 2) as isize;
        let half_height = (magnify.height / 2) as isize;
        if half_width == 0 || half_height == 0 {
            return Err(Error::DegenerateZoom(magnify.width, magnify.height));
        }
        let Point(x, y) = point;
        match (
            x.checked_sub(half_width),
            y.checked_sub(half_height),
            x.checked_add(half_width),
            y.checked_add(half_height),
        ) {
            (Some(left), Some(top), Some(right), Some(bottom)) => Viewport::new(
                scaler.re(left as f64),
                scaler.im(top as f64),
                scaler.re(right as f64),
                scaler.im(bottom as f64),
            ),
            _ => Err(Error::ZoomOutOfRange(x, y)),
        }
    }

    /// Every bound multiplied by `ratio`.  This scales absolute
    /// coordinates about the origin of the complex plane, not about
    /// the center of the viewport.
    pub fn scaled(&self, ratio: f64) -> Result<Viewport, Error> {
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(Error::BadRatio(ratio));
        }
        Viewport::new(
            self.x_min * ratio,
            self.y_min * ratio,
            self.x_max * ratio,
            self.y_max * ratio,
        )
    }
}

/// Maps pixels on the integral plane to points on the complex plane.
/// Both directions are pure linear functions of the viewport and the
/// image size captured at construction.
#[derive(Copy, Clone, Debug)]
pub struct CoordinateScaler {
    /// The size of the integral plane.
    pub image: ImageSize,
    origin: Complex<f64>,
    // The width and height, respectively, of one pixel on the
    // complex plane.
    pixel_extent: (f64, f64),
}

impl CoordinateScaler {
    /// Captures the current bounds of `viewport` for an image of the
    /// given size.
    pub fn new(image: ImageSize, viewport: &Viewport) -> Result<CoordinateScaler, Error> {
        if image.is_empty() {
            return Err(Error::EmptyImage(image.width, image.height));
        }
        if !viewport.is_proper() {
            return Err(Error::BadViewport(
                viewport.x_min,
                viewport.y_min,
                viewport.x_max,
                viewport.y_max,
            ));
        }
        Ok(CoordinateScaler {
            image,
            origin: Complex::new(viewport.x_min, viewport.y_min),
            pixel_extent: (
                (viewport.x_max - viewport.x_min) / (image.width as f64),
                (viewport.y_max - viewport.y_min) / (image.height as f64),
            ),
        })
    }

    /// The real coordinate of a column.
    #[inline]
    pub fn re(&self, col: f64) -> f64 {
        self.origin.re + col * self.pixel_extent.0
    }

    /// The imaginary coordinate of a row.
    #[inline]
    pub fn im(&self, row: f64) -> f64 {
        self.origin.im + row * self.pixel_extent.1
    }

    /// Given a pixel on the integral plane, the point at its upper left
    /// corner on the complex plane.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(self.re(pixel.0 as f64), self.im(pixel.1 as f64))
    }

    /// The width and height one pixel covers on the complex plane.
    pub fn pixel_extent(&self) -> (f64, f64) {
        self.pixel_extent
    }
}
