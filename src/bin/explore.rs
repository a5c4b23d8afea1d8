extern crate clap;
extern crate env_logger;
extern crate fractal_explorer;
extern crate image;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use fractal_explorer::{
    Fractal, ImageSize, PixelStream, Point, Received, RenderSettings, Scheme,
};
use num::Complex;
use std::process;
use std::str::FromStr;
use std::time::Duration;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const JULIA: &str = "julia";
const ITERATIONS: &str = "iterations";
const BAILOUT: &str = "bailout";
const STEPPED: &str = "stepped";
const SAMPLES: &str = "samples";
const FREQUENCY: &str = "frequency";
const PALETTE: &str = "palette";
const ZOOM: &str = "zoom";
const DEMAGNIFY: &str = "demagnify";
const THREADS: &str = "threads";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();
    let palettes: Vec<&str> = Scheme::ALL.iter().map(|s| s.name()).collect();

    App::new("explore")
        .version("0.1.0")
        .about("Escape-time fractal renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output PNG file"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(JULIA)
                .long(JULIA)
                .short("j")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse Julia constant"))
                .help("Render the Julia set for this constant instead of the Mandelbrot set"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("300")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u64,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Iterations before a point is considered inside the set"),
        )
        .arg(
            Arg::with_name(BAILOUT)
                .long(BAILOUT)
                .short("b")
                .takes_value(true)
                .default_value("20")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse bailout radius",
                        "Bailout radius must be positive",
                    )
                })
                .help("Squared magnitude past which a point has escaped"),
        )
        .arg(
            Arg::with_name(STEPPED)
                .long(STEPPED)
                .help("Color by whole escape counts instead of smoothed ones"),
        )
        .arg(
            Arg::with_name(SAMPLES)
                .long(SAMPLES)
                .short("m")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        16,
                        "Could not parse sample ratio",
                        "Sample ratio must be between 1 and 16",
                    )
                })
                .help("Samples per pixel along each axis"),
        )
        .arg(
            Arg::with_name(FREQUENCY)
                .long(FREQUENCY)
                .short("f")
                .takes_value(true)
                .default_value("20")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse color frequency",
                        "Color frequency must be positive",
                    )
                })
                .help("How quickly the palette cycles with escape count"),
        )
        .arg(
            Arg::with_name(PALETTE)
                .long(PALETTE)
                .short("p")
                .takes_value(true)
                .default_value("sunset")
                .possible_values(&palettes)
                .help("Color scheme"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<isize>(&s, ',', "Could not parse zoom point"))
                .help("Zoom into a box a tenth of the image centered on this pixel; repeatable"),
        )
        .arg(
            Arg::with_name(DEMAGNIFY)
                .long(DEMAGNIFY)
                .short("d")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse demagnify ratio",
                        "Demagnify ratio must be positive",
                    )
                })
                .help("Multiply the viewport bounds by this ratio after zooming"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of worker threads [default: CPU count]"),
        )
        .get_matches()
}

/// Drains the stream the way an interactive viewer would: in short
/// bursts, reporting progress between them.
fn collect(fractal: &Fractal, stream: PixelStream) -> image::RgbaImage {
    let size = stream.size();
    let mut image = image::RgbaImage::new(size.width as u32, size.height as u32);
    let mut reported = 0;
    loop {
        match stream.recv_timeout(Duration::from_millis(100)) {
            Received::Pixel(p) => image.put_pixel(p.pixel.0 as u32, p.pixel.1 as u32, p.color),
            Received::Pending => {}
            Received::Closed => break,
        }
        let percent = (fractal.progress() * 100.0) as u32;
        if percent >= reported + 10 {
            reported = percent - percent % 10;
            debug!("{}%", reported);
        }
    }
    image
}

fn run(matches: &ArgMatches) -> Result<(), String> {
    // The validators have already vetted every value below.
    let (width, height) = parse_pair::<usize>(matches.value_of(SIZE).unwrap_or("800x600"), 'x')
        .ok_or("Error parsing image dimensions")?;
    let size = ImageSize::new(width, height);

    let fractal = match matches.value_of(JULIA).and_then(parse_complex) {
        Some(c) => Fractal::julia(c),
        None => Fractal::mandelbrot(),
    };

    if let Some(points) = matches.values_of(ZOOM) {
        let box_size = ImageSize::new(width / 10, height / 10);
        for point in points {
            let (x, y) = parse_pair::<isize>(point, ',').ok_or("Error parsing zoom point")?;
            fractal
                .magnify(size, box_size, Point(x, y))
                .map_err(|e| e.to_string())?;
        }
    }
    if let Some(ratio) = matches.value_of(DEMAGNIFY) {
        let ratio = f64::from_str(ratio).map_err(|e| e.to_string())?;
        fractal.demagnify(ratio).map_err(|e| e.to_string())?;
    }

    let scheme = Scheme::from_str(matches.value_of(PALETTE).unwrap_or("sunset"))?;
    let mut settings = RenderSettings::new(size, scheme.palette());
    settings.normalize = !matches.is_present(STEPPED);
    if let Some(v) = matches.value_of(ITERATIONS) {
        settings.max_iterations = v.parse().map_err(|_| "Could not parse iteration count")?;
    }
    if let Some(v) = matches.value_of(BAILOUT) {
        settings.bailout_radius = v.parse().map_err(|_| "Could not parse bailout radius")?;
    }
    if let Some(v) = matches.value_of(SAMPLES) {
        settings.sample_ratio = v.parse().map_err(|_| "Could not parse sample ratio")?;
    }
    if let Some(v) = matches.value_of(FREQUENCY) {
        settings.color_frequency = v.parse().map_err(|_| "Could not parse color frequency")?;
    }
    if let Some(v) = matches.value_of(THREADS) {
        settings.threads = v.parse().map_err(|_| "Could not parse thread count")?;
    }

    info!("{:?} at {:?}", fractal.kind(), fractal.viewport());
    let stream = fractal.render(settings).map_err(|e| e.to_string())?;
    let image = collect(&fractal, stream);
    if fractal.is_abandoned() {
        return Err("render stopped before every pixel was delivered".to_string());
    }

    let output = matches.value_of(OUTPUT).ok_or("No output file given")?;
    image
        .save(output)
        .map_err(|e| format!("Could not write {}: {}", output, e))
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        process::exit(1);
    }
}
