// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The render engine.  A render is a coordinator thread that owns a
//! crossbeam scope of row workers.  The workers pull row indices
//! from a shared queue, color every pixel of the row left to right,
//! and push the results down a channel bounded to one row of pixels.
//! The consumer reads that channel through a `PixelStream`; when the
//! last row is done the channel closes and the fractal is released.

use crossbeam;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use error::Error;
use escape::{escape_time, Coloring, Kind};
use fractal::Shared;
use image::RgbaImage;
use itertools::iproduct;
use num::Complex;
use num_cpus;
use palette::{mean_of, named, Color, Palette};
use planes::{CoordinateScaler, ImageSize, Pixel};
use progress::Progress;
use std::cmp;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Everything a render needs besides the viewport.  Fixed for the
/// duration of one render.
#[derive(Clone, Debug)]
pub struct RenderSettings {
    /// Output image size.
    pub size: ImageSize,
    /// Iterations after which a point is considered bounded.
    pub max_iterations: u64,
    /// Compared against |z|², not |z|.
    pub bailout_radius: f64,
    /// Smooth coloring when true, banded when false.
    pub normalize: bool,
    /// Samples per pixel along each axis; 1 disables supersampling.
    pub sample_ratio: usize,
    /// Color of points that never escape.
    pub escape_color: Color,
    /// Colors indexed by escape count.
    pub palette: Palette,
    /// Scales escape counts before they index the palette.
    pub color_frequency: f64,
    /// Upper bound on worker threads.
    pub threads: usize,
}

impl RenderSettings {
    /// Settings for an image of `size`, with the explorer's defaults:
    /// 300 iterations, a bailout of 20, smooth coloring without
    /// supersampling, black for the set itself, a color frequency of
    /// 20, and one worker per CPU.
    pub fn new(size: ImageSize, palette: Palette) -> RenderSettings {
        RenderSettings {
            size,
            max_iterations: 300,
            bailout_radius: 20.0,
            normalize: true,
            sample_ratio: 1,
            escape_color: named::BLACK,
            palette,
            color_frequency: 20.0,
            threads: num_cpus::get(),
        }
    }

    /// Checks everything that can be checked before the viewport is
    /// known.
    pub fn validate(&self) -> Result<(), Error> {
        if self.size.is_empty() {
            return Err(Error::EmptyImage(self.size.width, self.size.height));
        }
        if self.max_iterations == 0 {
            return Err(Error::NoIterations);
        }
        if !(self.bailout_radius.is_finite() && self.bailout_radius > 0.0) {
            return Err(Error::BadBailout(self.bailout_radius));
        }
        if self.sample_ratio < 1 {
            return Err(Error::BadSampleRatio(self.sample_ratio));
        }
        if !(self.color_frequency.is_finite() && self.color_frequency > 0.0) {
            return Err(Error::BadFrequency(self.color_frequency));
        }
        if self.threads < 1 {
            return Err(Error::NoThreads);
        }
        if self.palette.is_empty() {
            return Err(Error::NoColors);
        }
        Ok(())
    }
}

/// One rendered pixel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColoredPixel {
    /// Where it goes.
    pub pixel: Pixel,
    /// What it is.
    pub color: Color,
}

/// What a timed wait on a `PixelStream` produced.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Received {
    /// A pixel arrived.
    Pixel(ColoredPixel),
    /// Nothing arrived in time; the render is still running.
    Pending,
    /// The render is over.  Every pixel has been delivered unless the
    /// fractal reports the render as abandoned.
    Closed,
}

/// The output of a render.  Yields each pixel of the image exactly
/// once, in no particular order across rows, then ends.  Dropping the
/// stream early abandons the render, and so does a worker panic, in
/// which case the stream ends short.  `Fractal::is_abandoned` tells
/// the two endings apart.
#[derive(Debug)]
pub struct PixelStream {
    receiver: Receiver<ColoredPixel>,
    size: ImageSize,
}

impl PixelStream {
    /// The size of the image being rendered.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Waits at most `timeout` for the next pixel.
    pub fn recv_timeout(&self, timeout: Duration) -> Received {
        match self.receiver.recv_timeout(timeout) {
            Ok(pixel) => Received::Pixel(pixel),
            Err(RecvTimeoutError::Timeout) => Received::Pending,
            Err(RecvTimeoutError::Disconnected) => Received::Closed,
        }
    }

    /// Drains the stream into a raster.
    pub fn into_image(self) -> RgbaImage {
        let mut image = RgbaImage::new(self.size.width as u32, self.size.height as u32);
        for colored in self {
            image.put_pixel(colored.pixel.0 as u32, colored.pixel.1 as u32, colored.color);
        }
        image
    }
}

impl Iterator for PixelStream {
    type Item = ColoredPixel;

    fn next(&mut self) -> Option<ColoredPixel> {
        self.receiver.recv().ok()
    }
}

/// A render that has been accepted: the settings, the kind, and the
/// scaler built from the viewport as it stood when the render began.
#[derive(Debug)]
pub(crate) struct Job {
    kind: Kind,
    scaler: CoordinateScaler,
    settings: RenderSettings,
}

impl Job {
    pub(crate) fn new(kind: Kind, scaler: CoordinateScaler, settings: RenderSettings) -> Job {
        Job {
            kind,
            scaler,
            settings,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.scaler.image.len()
    }

    fn coloring(&self) -> Coloring {
        Coloring {
            normalize: self.settings.normalize,
            frequency: self.settings.color_frequency,
            escape_color: self.settings.escape_color,
            palette: &self.settings.palette,
        }
    }

    fn color_point(&self, coloring: &Coloring, point: Complex<f64>) -> Color {
        coloring.color(escape_time(
            &self.kind,
            point,
            self.settings.max_iterations,
            self.settings.bailout_radius,
        ))
    }

    /// The color of one pixel.  With supersampling, the pixel's
    /// footprint is split into a ratio × ratio grid shifted back by
    /// half a pixel, and the samples are averaged.
    fn color_pixel(&self, coloring: &Coloring, pixel: &Pixel) -> Color {
        let point = self.scaler.pixel_to_point(pixel);
        let ratio = self.settings.sample_ratio;
        if ratio == 1 {
            return self.color_point(coloring, point);
        }
        let (width, height) = self.scaler.pixel_extent();
        let offset = |extent: f64, k: usize| extent * k as f64 / ratio as f64 - extent / 2.0;
        let samples: Vec<Color> = iproduct!(0..ratio, 0..ratio)
            .map(|(i, j)| {
                let re = point.re + offset(width, i);
                let im = point.im + offset(height, j);
                self.color_point(coloring, Complex::new(re, im))
            })
            .collect();
        mean_of(&samples)
    }

    /// Renders one row, column by column.  Returns false if the
    /// consumer has gone away.
    fn render_row(&self, row: usize, sender: &Sender<ColoredPixel>, progress: &Progress) -> bool {
        let coloring = self.coloring();
        for column in 0..self.scaler.image.width {
            let pixel = Pixel(column, row);
            let color = self.color_pixel(&coloring, &pixel);
            if sender.send(ColoredPixel { pixel, color }).is_err() {
                return false;
            }
            progress.element_finished();
        }
        true
    }

    /// Runs every row to completion on a pool of `workers` threads.
    fn run(&self, workers: usize, sender: &Sender<ColoredPixel>, progress: &Progress) {
        let rows = Arc::new(Mutex::new(0..self.scaler.image.height));
        let outcome = crossbeam::scope(|spawner| {
            for _ in 0..workers {
                let rows = rows.clone();
                spawner.spawn(move |_| loop {
                    let row = { rows.lock().unwrap_or_else(|e| e.into_inner()).next() };
                    match row {
                        Some(row) => {
                            if !self.render_row(row, sender, progress) {
                                trace!("consumer went away during row {}", row);
                                break;
                            }
                        }
                        None => {
                            break;
                        }
                    }
                });
            }
        });
        if outcome.is_err() {
            error!("a render worker panicked; the image is incomplete");
        }
    }
}

/// Starts `job` on its own coordinator thread and hands back the
/// stream it feeds.  Once the workers are done, a request that came up
/// short is marked abandoned, then the stream closes and the fractal's
/// render state is released.
pub(crate) fn start(shared: Arc<Shared>, job: Job) -> Result<PixelStream, Error> {
    let size = job.scaler.image;
    let (sender, receiver) = channel::bounded(size.width);
    let workers = cmp::min(job.settings.threads, size.height);
    debug!("rendering {}x{} on {} workers", size.width, size.height, workers);

    thread::Builder::new()
        .name("render".to_string())
        .spawn(move || {
            let started = Instant::now();
            job.run(workers, &sender, &shared.progress);
            if shared.progress.abandon() {
                warn!(
                    "abandoned {}x{} render at {:.1}%",
                    size.width,
                    size.height,
                    shared.progress.fraction() * 100.0
                );
            }
            drop(sender);
            shared.finish_render();
            info!(
                "rendered {}x{} in {:?}",
                size.width,
                size.height,
                started.elapsed()
            );
        })
        .map_err(Error::Spawn)?;

    Ok(PixelStream { receiver, size })
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::named::*;
    use planes::Viewport;

    fn settings(width: usize, height: usize) -> RenderSettings {
        RenderSettings::new(
            ImageSize::new(width, height),
            Palette::cyclic(&[RED, BLUE]).unwrap(),
        )
    }

    fn job(kind: Kind, viewport: Viewport, settings: RenderSettings) -> Job {
        let scaler = CoordinateScaler::new(settings.size, &viewport).unwrap();
        Job::new(kind, scaler, settings)
    }

    #[test]
    fn defaults_validate() {
        assert!(settings(4, 4).validate().is_ok());
    }

    #[test]
    fn validation_rejects_each_bad_field() {
        let mut s = settings(0, 4);
        assert!(s.validate().is_err());
        s = settings(4, 4);
        s.max_iterations = 0;
        assert!(s.validate().is_err());
        s = settings(4, 4);
        s.bailout_radius = 0.0;
        assert!(s.validate().is_err());
        s = settings(4, 4);
        s.bailout_radius = std::f64::NAN;
        assert!(s.validate().is_err());
        s = settings(4, 4);
        s.sample_ratio = 0;
        assert!(s.validate().is_err());
        s = settings(4, 4);
        s.color_frequency = -1.0;
        assert!(s.validate().is_err());
        s = settings(4, 4);
        s.threads = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn the_set_takes_the_escape_color() {
        // Pixel (2, 2) of this 4x4 image sits on the origin.
        let mut s = settings(4, 4);
        s.escape_color = GOLD;
        let job = job(Kind::Mandelbrot, Viewport::new(-2.0, -2.0, 2.0, 2.0).unwrap(), s);
        assert_eq!(job.color_pixel(&job.coloring(), &Pixel(2, 2)), GOLD);
    }

    #[test]
    fn points_outside_take_palette_colors() {
        let mut s = settings(4, 4);
        s.escape_color = GOLD;
        s.bailout_radius = 4.0;
        let job = job(Kind::Mandelbrot, Viewport::new(0.0, 0.0, 4.0, 4.0).unwrap(), s);
        let color = job.color_pixel(&job.coloring(), &Pixel(2, 2));
        assert!(color != GOLD);
        assert!(job.settings.palette.colors().contains(&color));
    }

    #[test]
    fn supersampling_averages_uniform_regions_to_themselves() {
        let mut s = settings(4, 4);
        s.escape_color = PURPLE;
        s.sample_ratio = 3;
        // A tiny window around the origin is entirely inside the set.
        let job = job(Kind::Mandelbrot, Viewport::new(-0.01, -0.01, 0.01, 0.01).unwrap(), s);
        for column in 0..4 {
            assert_eq!(job.color_pixel(&job.coloring(), &Pixel(column, 1)), PURPLE);
        }
    }

    #[test]
    fn supersampling_blends_across_the_boundary() {
        let palette = Palette::from_colors(vec![WHITE]).unwrap();
        let mut s = RenderSettings::new(ImageSize::new(1, 1), palette);
        s.escape_color = BLACK;
        s.sample_ratio = 2;
        s.bailout_radius = 4.0;
        // One pixel spanning [0, 4) on the Julia plane for c = 0.  Its
        // samples sit at -2, 0 along each axis: three escape, and the
        // one at the origin does not.
        let job = job(
            Kind::Julia(Complex::new(0.0, 0.0)),
            Viewport::new(0.0, 0.0, 4.0, 4.0).unwrap(),
            s,
        );
        let color = job.color_pixel(&job.coloring(), &Pixel(0, 0));
        assert_eq!(color, mean_of(&[WHITE, WHITE, WHITE, BLACK]));
    }
}
