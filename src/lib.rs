// Copyright 2022 Spanfile
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A library to label images with the names of their average and dominant colors.
//!
//! For every image, two colors are computed:
//!
//! - the average color, the per-channel arithmetic mean of all pixels truncated to whole values, and
//! - the dominant color, the centroid of the largest cluster found by k-means clustering.
//!
//! Both are then named after the closest entry of a reference [`Palette`], measured by Euclidean distance in RGB
//! space. The result is one [`AnalysisResult`] per image, which [`RecordWriter`] writes out as a CSV row.
//!
//! ```no_run
//! use color_labeler::{AnalysisConfig, Analyzer, Palette};
//!
//! let palette = Palette::parse("red 255 0 0\nblue 0 0 255")?;
//! let analyzer = Analyzer::new(&palette, AnalysisConfig::new(2))?;
//!
//! let image = color_labeler::image::open("swatch.png").unwrap().to_rgb8();
//! let result = analyzer.analyze_image("swatch.png", &image)?;
//! println!("{} / {}", result.avg_name(), result.dom_name());
//! # Ok::<(), color_labeler::Error>(())
//! ```

mod analysis;
mod average;
mod color;
mod config;
mod error;
mod filter;
mod kmeans;
mod namer;
mod output;
mod palette;

pub use crate::{
    analysis::{AnalysisResult, Analyzer, BatchReport, FileDecoder, ImageFailure, ImageSource},
    average::average_color,
    color::Color,
    config::{AnalysisConfig, DecodeFailurePolicy},
    error::{Error, Result},
    filter::{gather_images, ExtensionFilter, Filter, DEFAULT_EXTENSIONS},
    kmeans::{dominant_color, Clustering, KMeans, DEFAULT_ATTEMPTS, DEFAULT_EPSILON, DEFAULT_MAX_ITERATIONS},
    namer::{name_color, nearest_color},
    output::{RecordWriter, HEADER},
    palette::Palette,
};
pub use image;

use std::path::Path;

/// Label every image in `directory` whose name ends with one of the configured extensions, writing one CSV row per
/// image to `output` as soon as it is done.
///
/// Images are processed in sorted path order. The palette is loaded and the config validated before any image is
/// read, so a malformed palette or an invalid cluster count fails without touching the output.
pub fn label_directory(directory: &Path, palette: &Path, output: &Path, config: AnalysisConfig) -> Result<BatchReport> {
    let palette = Palette::from_file(palette)?;
    let analyzer = Analyzer::new(&palette, config)?;

    let filter = ExtensionFilter::new(analyzer.config().extensions.iter().cloned());
    let images = gather_images(directory, &filter)?;

    tracing::info!(
        directory = %directory.display(),
        images = images.len(),
        colors = palette.len(),
        "Labeling images"
    );

    let mut writer = RecordWriter::create(output)?;
    analyzer.run(&images, |result| writer.write(result))
}
