// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can be refused before a render starts.  Every
//! variant here describes a bad request rather than a bad outcome; a
//! render that ends short is reported by `Fractal::is_abandoned`.

use std::io;

/// The ways a request to the explorer can be malformed.
#[derive(Debug, Fail)]
pub enum Error {
    /// The image has no pixels in one or both directions.
    #[fail(display = "image size must be non-zero, got {}x{}", _0, _1)]
    EmptyImage(usize, usize),

    /// A viewport whose corners are not strictly ordered.
    #[fail(
        display = "viewport ({}, {})-({}, {}) is not a proper rectangle",
        _0, _1, _2, _3
    )]
    BadViewport(f64, f64, f64, f64),

    /// The magnify box collapses to a line or a point.
    #[fail(display = "magnify box {}x{} is too small to zoom into", _0, _1)]
    DegenerateZoom(usize, usize),

    /// The magnify box reaches past the range of pixel coordinates.
    #[fail(display = "magnify box around ({}, {}) is out of range", _0, _1)]
    ZoomOutOfRange(isize, isize),

    /// Demagnify ratios must be finite and positive.
    #[fail(display = "demagnify ratio must be finite and positive, got {}", _0)]
    BadRatio(f64),

    /// Zero iterations cannot classify anything.
    #[fail(display = "iteration limit must be positive")]
    NoIterations,

    /// Bailout radii must be finite and positive.
    #[fail(display = "bailout radius must be finite and positive, got {}", _0)]
    BadBailout(f64),

    /// Supersampling takes at least one sample per pixel.
    #[fail(display = "sample ratio must be at least 1, got {}", _0)]
    BadSampleRatio(usize),

    /// Color frequencies must be finite and positive.
    #[fail(display = "color frequency must be finite and positive, got {}", _0)]
    BadFrequency(f64),

    /// The worker pool needs at least one thread.
    #[fail(display = "thread count must be at least 1")]
    NoThreads,

    /// Palettes, key color sets, and mean inputs cannot be empty.
    #[fail(display = "at least one color is required")]
    NoColors,

    /// The operating system refused to start the render thread.
    #[fail(display = "could not start render thread: {}", _0)]
    Spawn(#[cause] io::Error),
}
