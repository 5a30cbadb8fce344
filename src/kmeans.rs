use crate::{error::Error, Result};
use rand::{
    distributions::{Distribution, WeightedIndex},
    Rng,
};
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_ATTEMPTS: usize = 10;
pub const DEFAULT_MAX_ITERATIONS: usize = 200;
pub const DEFAULT_EPSILON: f64 = 0.1;

/// K-means clustering over RGB samples, seeded with k-means++.
///
/// Each attempt iterates until no centroid moves by `epsilon` or more, or until `max_iterations` is reached. Of all the
/// attempts, the one with the lowest total within-cluster squared distance is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeans {
    clusters: usize,
    attempts: usize,
    max_iterations: usize,
    epsilon: f64,
}

/// The outcome of a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    centroids: Vec<[f64; 3]>,
    counts: Vec<u64>,
    compactness: f64,
}

impl KMeans {
    pub fn new(clusters: usize) -> Self {
        Self {
            clusters,
            attempts: DEFAULT_ATTEMPTS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            epsilon: DEFAULT_EPSILON,
        }
    }

    pub fn attempts(self, attempts: usize) -> Self {
        Self { attempts, ..self }
    }

    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self { max_iterations, ..self }
    }

    pub fn epsilon(self, epsilon: f64) -> Self {
        Self { epsilon, ..self }
    }

    pub fn clusters(&self) -> usize {
        self.clusters
    }

    /// Check the parameters that don't depend on the image.
    pub fn validate(&self) -> Result<()> {
        if self.clusters < 1 {
            return Err(Error::InvalidClusterCount {
                requested: self.clusters,
                distinct: 0,
            });
        }

        if self.attempts < 1 {
            return Err(Error::invalid_parameter("attempts", self.attempts));
        }

        if self.max_iterations < 1 {
            return Err(Error::invalid_parameter("max_iterations", self.max_iterations));
        }

        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(Error::invalid_parameter("epsilon", self.epsilon));
        }

        Ok(())
    }

    /// Cluster `pixels`, drawing every initialization from `rng`.
    pub fn run<R>(&self, pixels: &[(u8, u8, u8)], rng: &mut R) -> Result<Clustering>
    where
        R: Rng + ?Sized,
    {
        if pixels.is_empty() {
            return Err(Error::EmptyImage);
        }

        self.validate()?;

        // cluster the distinct colors weighted by how often they occur, which is equivalent to clustering every pixel
        let colors = histogram(pixels);

        if self.clusters > colors.len() {
            return Err(Error::InvalidClusterCount {
                requested: self.clusters,
                distinct: colors.len(),
            });
        }

        let mut best: Option<Clustering> = None;

        for attempt in 0..self.attempts {
            let (clustering, iterations) = self.attempt(&colors, rng);

            debug!(
                attempt,
                iterations,
                compactness = clustering.compactness,
                "k-means attempt finished"
            );

            // strictly lower, so the earliest attempt wins a tie
            if best
                .as_ref()
                .map_or(true, |best| clustering.compactness < best.compactness)
            {
                best = Some(clustering);
            }
        }

        best.ok_or_else(|| Error::invalid_parameter("attempts", self.attempts))
    }

    /// The centroid of the most populous cluster of `pixels`, rounded to whole channel values.
    pub fn dominant_color<R>(&self, pixels: &[(u8, u8, u8)], rng: &mut R) -> Result<(u8, u8, u8)>
    where
        R: Rng + ?Sized,
    {
        Ok(self.run(pixels, rng)?.dominant_color())
    }

    fn attempt<R>(&self, colors: &[([f64; 3], u64)], rng: &mut R) -> (Clustering, usize)
    where
        R: Rng + ?Sized,
    {
        let mut centroids = seed_centroids(colors, self.clusters, rng);
        let mut labels = vec![0; colors.len()];
        let mut iterations = 0;

        while iterations < self.max_iterations {
            iterations += 1;

            assign_labels(colors, &centroids, &mut labels);
            let updated = update_centroids(colors, &labels, &centroids);

            let max_shift = centroids
                .iter()
                .zip(&updated)
                .map(|(old, new)| distance_squared(old, new).sqrt())
                .fold(0.0, f64::max);

            centroids = updated;

            if max_shift < self.epsilon {
                break;
            }
        }

        // the reported counts and compactness always refer to the final centroids
        assign_labels(colors, &centroids, &mut labels);

        let mut counts = vec![0; centroids.len()];
        let mut compactness = 0.0;

        for ((point, count), &label) in colors.iter().zip(&labels) {
            counts[label] += count;
            compactness += *count as f64 * distance_squared(point, &centroids[label]);
        }

        (
            Clustering {
                centroids,
                counts,
                compactness,
            },
            iterations,
        )
    }
}

impl Clustering {
    pub fn centroids(&self) -> &[[f64; 3]] {
        &self.centroids
    }

    /// Number of pixels assigned to each cluster. Sums to the number of clustered pixels.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Total squared distance of every pixel to its cluster's centroid.
    pub fn compactness(&self) -> f64 {
        self.compactness
    }

    /// Index of the cluster with the most members; the lowest index wins a tie.
    pub fn dominant_index(&self) -> usize {
        let mut dominant = 0;

        for (index, &count) in self.counts.iter().enumerate() {
            if count > self.counts[dominant] {
                dominant = index;
            }
        }

        dominant
    }

    pub fn dominant_color(&self) -> (u8, u8, u8) {
        let [r, g, b] = self.centroids[self.dominant_index()];
        (round_channel(r), round_channel(g), round_channel(b))
    }
}

/// Dominant color of `pixels` with `k` clusters and the default attempt, iteration and epsilon settings.
pub fn dominant_color<R>(pixels: &[(u8, u8, u8)], k: usize, rng: &mut R) -> Result<(u8, u8, u8)>
where
    R: Rng + ?Sized,
{
    KMeans::new(k).dominant_color(pixels, rng)
}

fn histogram(pixels: &[(u8, u8, u8)]) -> Vec<([f64; 3], u64)> {
    let mut hist = HashMap::new();
    for &pixel in pixels {
        *hist.entry(pixel).or_insert(0) += 1;
    }

    // order the colors so a seeded run doesn't depend on hash map iteration order. red is the most significant channel
    let mut colors = hist.into_iter().collect::<Vec<_>>();
    colors.sort_by_key(|&((r, g, b), _)| ((r as u32) << 16) | ((g as u32) << 8) | b as u32);

    colors
        .into_iter()
        .map(|((r, g, b), count)| ([r as f64, g as f64, b as f64], count))
        .collect()
}

// k-means++: the first centroid is a uniformly random pixel, every following one is a pixel picked with probability
// proportional to its squared distance to the nearest centroid picked so far
fn seed_centroids<R>(colors: &[([f64; 3], u64)], clusters: usize, rng: &mut R) -> Vec<[f64; 3]>
where
    R: Rng + ?Sized,
{
    let mut centroids = Vec::with_capacity(clusters);

    let first = pick_weighted(colors.iter().map(|(_, count)| *count as f64), colors.len(), rng);
    centroids.push(colors[first].0);

    let mut nearest = colors
        .iter()
        .map(|(point, _)| distance_squared(point, &colors[first].0))
        .collect::<Vec<_>>();

    while centroids.len() < clusters {
        let weights = colors
            .iter()
            .zip(&nearest)
            .map(|((_, count), distance)| *count as f64 * distance);
        let next = colors[pick_weighted(weights, colors.len(), rng)].0;

        for ((point, _), distance) in colors.iter().zip(nearest.iter_mut()) {
            *distance = distance.min(distance_squared(point, &next));
        }

        centroids.push(next);
    }

    centroids
}

fn pick_weighted<I, R>(weights: I, len: usize, rng: &mut R) -> usize
where
    I: IntoIterator<Item = f64>,
    R: Rng + ?Sized,
{
    match WeightedIndex::<f64>::new(weights) {
        Ok(distribution) => distribution.sample(rng),
        // every weight is zero; only reachable when asking for more centroids than there are distinct colors
        Err(_) => rng.gen_range(0..len),
    }
}

fn assign_labels(colors: &[([f64; 3], u64)], centroids: &[[f64; 3]], labels: &mut [usize]) {
    for ((point, _), label) in colors.iter().zip(labels.iter_mut()) {
        *label = nearest_centroid(point, centroids);
    }
}

fn nearest_centroid(point: &[f64; 3], centroids: &[[f64; 3]]) -> usize {
    let mut nearest = 0;
    let mut nearest_distance = f64::INFINITY;

    for (index, centroid) in centroids.iter().enumerate() {
        let distance = distance_squared(point, centroid);

        if distance < nearest_distance {
            nearest = index;
            nearest_distance = distance;
        }
    }

    nearest
}

fn update_centroids(colors: &[([f64; 3], u64)], labels: &[usize], previous: &[[f64; 3]]) -> Vec<[f64; 3]> {
    let mut sums = vec![[0.0; 3]; previous.len()];
    let mut populations = vec![0.0; previous.len()];

    for ((point, count), &label) in colors.iter().zip(labels) {
        let weight = *count as f64;

        for channel in 0..3 {
            sums[label][channel] += point[channel] * weight;
        }

        populations[label] += weight;
    }

    // a cluster that lost all its members stays where it was
    sums.into_iter()
        .zip(populations)
        .zip(previous)
        .map(|((sum, population), previous)| {
            if population > 0.0 {
                [sum[0] / population, sum[1] / population, sum[2] / population]
            } else {
                *previous
            }
        })
        .collect()
}

fn distance_squared(lhs: &[f64; 3], rhs: &[f64; 3]) -> f64 {
    let dr = lhs[0] - rhs[0];
    let dg = lhs[1] - rhs[1];
    let db = lhs[2] - rhs[2];

    dr * dr + dg * dg + db * db
}

fn round_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
