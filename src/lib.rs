#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time fractal explorer
//!
//! The Mandelbrot and Julia sets are both drawn by taking a point on
//! the complex plane, repeatedly squaring and adding, and counting
//! how many rounds it takes the result to fly off past some bailout
//! radius.  Points that never fly off belong to the set and get a
//! color of their own; every other point is colored by its count,
//! looked up in a cyclic palette so that the bands repeat as the
//! counts grow.
//!
//! A `Fractal` holds the rectangle of the plane being looked at and
//! can be zoomed.  Rendering it spreads the rows of the image over a
//! pool of worker threads and hands back a `PixelStream`, which yields
//! every pixel of the image exactly once while the fractal reports
//! how far along the render is.
//!
//! ```no_run
//! use fractal_explorer::{Fractal, ImageSize, RenderSettings, Scheme};
//!
//! let fractal = Fractal::mandelbrot();
//! let settings = RenderSettings::new(ImageSize::new(640, 480), Scheme::Sunset.palette());
//! let image = fractal.render(settings).unwrap().into_image();
//! image.save("mandelbrot.png").unwrap();
//! ```

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod error;
pub mod escape;
pub mod fractal;
pub mod palette;
pub mod planes;
pub mod progress;
pub mod render;

pub use error::Error;
pub use escape::Kind;
pub use fractal::Fractal;
pub use palette::{mean, Color, Palette, Scheme};
pub use planes::{CoordinateScaler, ImageSize, Pixel, Point, Viewport};
pub use render::{ColoredPixel, PixelStream, Received, RenderSettings};
