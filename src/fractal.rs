// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Fractal: a viewport, the kind of set it looks at, and the
//! progress of its latest render, shared by everyone who holds a
//! handle.
//!
//! At most one render or viewport change is in flight at a time.  The
//! viewport lives behind a mutex alongside a rendering flag; a render
//! raises the flag for as long as its workers run, and every other
//! operation waits on a condition variable until the flag is lowered.
//! Zooming during a render therefore blocks until the render has
//! closed its stream.  Progress has a lock of its own and can be read
//! at any time.

use error::Error;
use escape::Kind;
use num::Complex;
use planes::{CoordinateScaler, ImageSize, Point, Viewport};
use progress::Progress;
use render::{self, Job, PixelStream, RenderSettings};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

#[derive(Debug)]
struct Canvas {
    viewport: Viewport,
    kind: Kind,
    rendering: bool,
}

#[derive(Debug)]
pub(crate) struct Shared {
    canvas: Mutex<Canvas>,
    idle: Condvar,
    pub(crate) progress: Progress,
}

impl Shared {
    // The canvas is only ever written whole, so a poisoned lock still
    // holds a consistent viewport.
    fn canvas(&self) -> MutexGuard<Canvas> {
        self.canvas.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The canvas, once no render holds it.
    fn idle_canvas(&self) -> MutexGuard<Canvas> {
        let mut canvas = self.canvas();
        while canvas.rendering {
            canvas = self.idle.wait(canvas).unwrap_or_else(|e| e.into_inner());
        }
        canvas
    }

    pub(crate) fn finish_render(&self) {
        self.canvas().rendering = false;
        self.idle.notify_all();
    }
}

/// A handle on one explorable fractal.  Clones share the same
/// viewport, lock, and progress.
#[derive(Clone, Debug)]
pub struct Fractal {
    shared: Arc<Shared>,
}

impl Fractal {
    /// A fractal of `kind` looking at `viewport`.
    pub fn new(kind: Kind, viewport: Viewport) -> Fractal {
        Fractal {
            shared: Arc::new(Shared {
                canvas: Mutex::new(Canvas {
                    viewport,
                    kind,
                    rendering: false,
                }),
                idle: Condvar::new(),
                progress: Progress::new(),
            }),
        }
    }

    /// The Mandelbrot set, framed whole.
    pub fn mandelbrot() -> Fractal {
        Fractal::new(Kind::Mandelbrot, Viewport::mandelbrot())
    }

    /// The Julia set for `c`, framed whole.
    pub fn julia(c: Complex<f64>) -> Fractal {
        Fractal::new(Kind::Julia(c), Viewport::julia())
    }

    /// Which set this is.
    pub fn kind(&self) -> Kind {
        self.shared.canvas().kind
    }

    /// The current viewport.  During a render this is the viewport
    /// being rendered.
    pub fn viewport(&self) -> Viewport {
        self.shared.canvas().viewport
    }

    /// Whether a render currently holds the fractal.
    pub fn is_rendering(&self) -> bool {
        self.shared.canvas().rendering
    }

    /// Zooms into the box of `magnify` pixels centered on `point`, as
    /// seen on an image of `image` pixels.  Waits for any render in
    /// flight to finish first.
    pub fn magnify(&self, image: ImageSize, magnify: ImageSize, point: Point) -> Result<(), Error> {
        let mut canvas = self.shared.idle_canvas();
        canvas.viewport = canvas.viewport.magnified(image, magnify, point)?;
        debug!("magnified to {:?}", canvas.viewport);
        Ok(())
    }

    /// Multiplies every bound of the viewport by `ratio`.  Waits for
    /// any render in flight to finish first.
    pub fn demagnify(&self, ratio: f64) -> Result<(), Error> {
        let mut canvas = self.shared.idle_canvas();
        canvas.viewport = canvas.viewport.scaled(ratio)?;
        debug!("demagnified by {} to {:?}", ratio, canvas.viewport);
        Ok(())
    }

    /// Starts rendering the current viewport and returns the stream of
    /// pixels.  Bad settings are refused before anything starts.
    ///
    /// The fractal stays locked until every pixel has been pushed into
    /// the stream, so the caller must drain (or drop) the stream before
    /// it can zoom or render again from the same thread.
    pub fn render(&self, settings: RenderSettings) -> Result<PixelStream, Error> {
        settings.validate()?;
        let mut canvas = self.shared.idle_canvas();
        let scaler = CoordinateScaler::new(settings.size, &canvas.viewport)?;
        let job = Job::new(canvas.kind, scaler, settings);
        canvas.rendering = true;
        self.shared.progress.new_request(job.len());
        info!("rendering {:?} over {:?}", canvas.kind, canvas.viewport);
        drop(canvas);

        render::start(self.shared.clone(), job).map_err(|e| {
            self.shared.progress.abandon();
            self.shared.finish_render();
            e
        })
    }

    /// Whether the latest render is over: every pixel was delivered,
    /// or the render was abandoned.
    pub fn is_finished(&self) -> bool {
        self.shared.progress.is_finished()
    }

    /// Whether the latest render stopped before delivering every
    /// pixel, because its stream was dropped or a worker failed.
    pub fn is_abandoned(&self) -> bool {
        self.shared.progress.is_abandoned()
    }

    /// The delivered fraction of the latest render, from 0 to 1.
    pub fn progress(&self) -> f64 {
        self.shared.progress.fraction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::named::*;
    use palette::Palette;

    fn settings(width: usize, height: usize) -> RenderSettings {
        RenderSettings::new(
            ImageSize::new(width, height),
            Palette::cyclic(&[BLACK, WHITE]).unwrap(),
        )
    }

    #[test]
    fn new_fractals_are_idle_and_finished() {
        let fractal = Fractal::mandelbrot();
        assert!(!fractal.is_rendering());
        assert!(fractal.is_finished());
        assert_eq!(fractal.progress(), 1.0);
        assert_eq!(fractal.kind(), Kind::Mandelbrot);
        assert_eq!(fractal.viewport(), Viewport::mandelbrot());
    }

    #[test]
    fn julia_fractals_keep_their_constant() {
        let c = Complex::new(-0.7, 0.3);
        let fractal = Fractal::julia(c);
        assert_eq!(fractal.kind(), Kind::Julia(c));
        assert_eq!(fractal.viewport(), Viewport::julia());
    }

    #[test]
    fn magnify_replaces_the_viewport() {
        let fractal = Fractal::new(Kind::Mandelbrot, Viewport::new(-2.0, -2.0, 2.0, 2.0).unwrap());
        fractal
            .magnify(ImageSize::new(4, 4), ImageSize::new(2, 2), Point(2, 2))
            .unwrap();
        assert_eq!(fractal.viewport(), Viewport::new(-1.0, -1.0, 1.0, 1.0).unwrap());
    }

    #[test]
    fn failed_zooms_leave_the_viewport_alone() {
        let fractal = Fractal::mandelbrot();
        assert!(fractal.demagnify(-1.0).is_err());
        assert!(fractal
            .magnify(ImageSize::new(4, 4), ImageSize::new(0, 0), Point(2, 2))
            .is_err());
        assert_eq!(fractal.viewport(), Viewport::mandelbrot());
    }

    #[test]
    fn demagnify_scales_about_the_origin() {
        let fractal = Fractal::new(Kind::Mandelbrot, Viewport::new(1.0, 1.0, 2.0, 3.0).unwrap());
        fractal.demagnify(2.0).unwrap();
        assert_eq!(fractal.viewport(), Viewport::new(2.0, 2.0, 4.0, 6.0).unwrap());
    }

    #[test]
    fn bad_settings_never_start_a_render() {
        let fractal = Fractal::mandelbrot();
        let mut s = settings(4, 4);
        s.sample_ratio = 0;
        assert!(fractal.render(s).is_err());
        assert!(!fractal.is_rendering());
        assert!(fractal.is_finished());
    }

    #[test]
    fn rendering_holds_the_fractal_until_drained() {
        let fractal = Fractal::mandelbrot();
        let stream = fractal.render(settings(8, 8)).unwrap();
        assert!(fractal.is_rendering());
        assert!(!fractal.is_finished());
        assert_eq!(stream.count(), 64);
        // The stream closes just before the flag is lowered.
        fractal.demagnify(1.0).unwrap();
        assert!(!fractal.is_rendering());
        assert!(fractal.is_finished());
        assert!(!fractal.is_abandoned());
    }
}
