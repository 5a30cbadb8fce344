use crate::{
    average::average_color,
    config::{AnalysisConfig, DecodeFailurePolicy},
    error::Error,
    kmeans::KMeans,
    namer::name_color,
    palette::Palette,
    Result,
};
use image::{ImageBuffer, RgbImage};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The labels computed for one image.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisResult {
    filename: String,
    avg_name: String,
    avg_rgb: (u8, u8, u8),
    dom_name: String,
    dom_rgb: (u8, u8, u8),
}

/// An image that was skipped because it could not be decoded.
#[derive(Debug)]
pub struct ImageFailure {
    pub path: PathBuf,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// One result per analyzed image, in input order
    pub results: Vec<AnalysisResult>,
    /// Images skipped under [`DecodeFailurePolicy::Skip`], in input order
    pub failures: Vec<ImageFailure>,
}

/// Produces the pixels of an image from its path.
pub trait ImageSource: Send + Sync {
    fn decode(&self, path: &Path) -> Result<RgbImage>;
}

/// Decodes image files from disk with the `image` crate, detecting the format from the file contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDecoder;

impl ImageSource for FileDecoder {
    fn decode(&self, path: &Path) -> Result<RgbImage> {
        let decode_error = |source| Error::ImageDecode {
            path: path.to_path_buf(),
            source,
        };

        let reader = image::io::Reader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| decode_error(image::ImageError::IoError(e)))?;

        Ok(reader.decode().map_err(decode_error)?.to_rgb8())
    }
}

/// Computes the average and dominant color of images and names both against a palette.
///
/// The analyzer keeps no state between images; the palette is only ever read.
pub struct Analyzer<'p, S = FileDecoder> {
    palette: &'p Palette,
    config: AnalysisConfig,
    source: S,
}

impl AnalysisResult {
    pub fn new(
        filename: impl Into<String>,
        (avg_name, avg_rgb): (impl Into<String>, (u8, u8, u8)),
        (dom_name, dom_rgb): (impl Into<String>, (u8, u8, u8)),
    ) -> Self {
        Self {
            filename: filename.into(),
            avg_name: avg_name.into(),
            avg_rgb,
            dom_name: dom_name.into(),
            dom_rgb,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn avg_name(&self) -> &str {
        &self.avg_name
    }

    pub fn avg_rgb(&self) -> (u8, u8, u8) {
        self.avg_rgb
    }

    pub fn dom_name(&self) -> &str {
        &self.dom_name
    }

    pub fn dom_rgb(&self) -> (u8, u8, u8) {
        self.dom_rgb
    }
}

impl<'p> Analyzer<'p> {
    /// Validate `config` and `palette` up front, so a bad parameter fails before any image is read.
    pub fn new(palette: &'p Palette, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;

        if palette.is_empty() {
            return Err(Error::EmptyPalette);
        }

        Ok(Self {
            palette,
            config,
            source: FileDecoder,
        })
    }
}

impl<'p, S> Analyzer<'p, S>
where
    S: ImageSource,
{
    pub fn with_source<T>(self, source: T) -> Analyzer<'p, T>
    where
        T: ImageSource,
    {
        Analyzer {
            palette: self.palette,
            config: self.config,
            source,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Label one image's pixels, drawing k-means initializations from `rng`.
    pub fn analyze_pixels<R>(&self, filename: &str, pixels: &[(u8, u8, u8)], rng: &mut R) -> Result<AnalysisResult>
    where
        R: Rng + ?Sized,
    {
        let avg_rgb = average_color(pixels)?;
        let dom_rgb = self.kmeans().dominant_color(pixels, rng)?;

        let avg_name = name_color(avg_rgb, self.palette)?;
        let dom_name = name_color(dom_rgb, self.palette)?;

        info!(file = filename, avg = ?avg_rgb, avg_name, "average color");
        info!(file = filename, dom = ?dom_rgb, dom_name, "dominant color");

        Ok(AnalysisResult::new(filename, (avg_name, avg_rgb), (dom_name, dom_rgb)))
    }

    /// Label an already decoded image with a freshly seeded random source.
    pub fn analyze_image<P>(&self, filename: &str, image: &ImageBuffer<P, Vec<u8>>) -> Result<AnalysisResult>
    where
        P: image::Pixel<Subpixel = u8>,
    {
        let pixels = image.pixels().map(pixel_to_rgb).collect::<Vec<_>>();

        self.analyze_pixels(filename, &pixels, &mut self.rng())
            .map_err(|e| e.context(filename))
    }

    /// Decode the image at `path` and label it. The result is named after the file's base name.
    pub fn analyze_file(&self, path: &Path) -> Result<AnalysisResult> {
        let filename = file_name(path);
        info!(file = %path.display(), "Processing");

        // the decoded image only lives for the duration of this call
        let image = self.source.decode(path)?;
        self.analyze_image(&filename, &image)
    }

    /// Label every image in `paths`, handing each result to `sink` in input order.
    ///
    /// Sequential runs call `sink` as soon as an image is done. With more than one thread, images are analyzed on a
    /// bounded pool and the results are passed to `sink` in input order once all of them are done.
    pub fn run<F>(&self, paths: &[PathBuf], mut sink: F) -> Result<BatchReport>
    where
        F: FnMut(&AnalysisResult) -> Result<()>,
    {
        let mut report = BatchReport::default();

        if self.config.threads <= 1 {
            for path in paths {
                self.record(path, self.analyze_file(path), &mut report, &mut sink)?;
            }
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.threads)
                .build()
                .map_err(|e| Error::invalid_parameter("threads", e))?;

            let outcomes = pool.install(|| {
                paths
                    .par_iter()
                    .map(|path| self.analyze_file(path))
                    .collect::<Vec<_>>()
            });

            for (path, outcome) in paths.iter().zip(outcomes) {
                self.record(path, outcome, &mut report, &mut sink)?;
            }
        }

        Ok(report)
    }

    fn record<F>(
        &self,
        path: &Path,
        outcome: Result<AnalysisResult>,
        report: &mut BatchReport,
        sink: &mut F,
    ) -> Result<()>
    where
        F: FnMut(&AnalysisResult) -> Result<()>,
    {
        match outcome {
            Ok(result) => {
                sink(&result)?;
                report.results.push(result);
            }
            Err(error)
                if self.config.on_decode_error == DecodeFailurePolicy::Skip
                    && matches!(error.root(), Error::ImageDecode { .. }) =>
            {
                warn!(file = %path.display(), %error, "Skipping undecodable image");
                report.failures.push(ImageFailure {
                    path: path.to_path_buf(),
                    error,
                });
            }
            Err(error) => return Err(error),
        }

        Ok(())
    }

    fn kmeans(&self) -> KMeans {
        self.config.kmeans()
    }

    // every image gets its own generator so results don't depend on processing order
    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn pixel_to_rgb<P>(pixel: &P) -> (u8, u8, u8)
where
    P: image::Pixel<Subpixel = u8>,
{
    let rgb = pixel.to_rgb();
    (rgb.0[0], rgb.0[1], rgb.0[2])
}
