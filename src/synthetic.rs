//! Synthetic route recordings for benchmarking and demos.
//!
//! Generates vehicle drives inside the square world region, including the
//! idle jitter at the start and end of a recording that preprocessing is
//! meant to remove.
//!
//! Feature-gated behind `synthetic`, not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use routesync::synthetic::SyntheticScenario;
//!
//! let scenario = SyntheticScenario {
//!     route_count: 5,
//!     seed: 7,
//!     ..SyntheticScenario::default()
//! };
//! let dataset = scenario.generate();
//! assert_eq!(dataset.records.len(), 5);
//! ```

use crate::{RouteRecord, Sample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

// ============================================================================
// Types
// ============================================================================

/// Scenario configuration for generating synthetic recordings.
#[derive(Debug, Clone)]
pub struct SyntheticScenario {
    /// Map name written into every record.
    pub map: String,
    /// Number of routes to generate.
    pub route_count: usize,
    /// Side of the square world region.
    pub world_size: f64,
    /// Moving samples per route (excluding idle samples).
    pub moving_samples: usize,
    /// Idle samples recorded at each end of a route.
    pub idle_samples: usize,
    /// Radius of the idle jitter around the start/end positions.
    pub idle_jitter: f64,
    /// Time between consecutive samples in milliseconds.
    pub sample_interval_ms: f64,
    /// Distance travelled between moving samples in world units.
    pub step_length: f64,
    /// Categories assigned round-robin.
    pub categories: Vec<String>,
    /// Vehicles assigned round-robin.
    pub vehicles: Vec<String>,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl Default for SyntheticScenario {
    fn default() -> Self {
        Self {
            map: "Synthetic".to_string(),
            route_count: 10,
            world_size: 4096.0,
            moving_samples: 200,
            idle_samples: 20,
            idle_jitter: 5.0,
            sample_interval_ms: 500.0,
            step_length: 12.0,
            categories: vec!["assault".to_string(), "logistics".to_string()],
            vehicles: vec!["truck".to_string(), "apc".to_string(), "jeep".to_string()],
            seed: 42,
        }
    }
}

/// Metadata about a generated dataset.
#[derive(Debug, Clone)]
pub struct DatasetMetadata {
    /// Total samples across all records.
    pub total_samples: usize,
    /// Samples generated as idle jitter.
    pub idle_samples: usize,
}

/// A complete synthetic dataset.
pub struct SyntheticDataset {
    pub records: Vec<RouteRecord>,
    pub metadata: DatasetMetadata,
}

// ============================================================================
// Generation
// ============================================================================

impl SyntheticScenario {
    /// Generate the dataset. The same seed always yields the same records.
    pub fn generate(&self) -> SyntheticDataset {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut records = Vec::with_capacity(self.route_count);
        let mut total_samples = 0;

        for i in 0..self.route_count {
            let samples = self.generate_drive(&mut rng);
            total_samples += samples.len();
            records.push(RouteRecord {
                id: format!("synthetic-{i}"),
                name: format!("Synthetic route {i}"),
                path: Some(samples),
                category: pick(&self.categories, i),
                vehicle: pick(&self.vehicles, i),
                map: self.map.clone(),
                time_offset_ms: 0.0,
            });
        }

        SyntheticDataset {
            records,
            metadata: DatasetMetadata {
                total_samples,
                idle_samples: self.idle_samples * 2 * self.route_count,
            },
        }
    }

    /// One drive: idle at the start, a random walk, idle at the end.
    fn generate_drive(&self, rng: &mut StdRng) -> Vec<Sample> {
        let margin = self.world_size * 0.1;
        let mut x = rng.gen_range(margin..self.world_size - margin);
        let mut y = rng.gen_range(margin..self.world_size - margin);
        let mut heading = rng.gen_range(0.0..2.0 * PI);
        let mut time = rng.gen_range(0.0..5_000.0_f64).round();

        let mut samples = Vec::with_capacity(self.moving_samples + self.idle_samples * 2);

        let start = (x, y);
        for _ in 0..self.idle_samples {
            samples.push(self.jittered(start, time, rng));
            time += self.sample_interval_ms;
        }

        for _ in 0..self.moving_samples {
            heading += rng.gen_range(-0.3..0.3);
            x += self.step_length * heading.cos();
            y += self.step_length * heading.sin();

            // Turn around at the world edges
            if x < margin || x > self.world_size - margin {
                heading = PI - heading;
                x = x.clamp(margin, self.world_size - margin);
            }
            if y < margin || y > self.world_size - margin {
                heading = -heading;
                y = y.clamp(margin, self.world_size - margin);
            }

            samples.push(Sample::new(x, y, time));
            time += self.sample_interval_ms;
        }

        let end = (x, y);
        for _ in 0..self.idle_samples {
            samples.push(self.jittered(end, time, rng));
            time += self.sample_interval_ms;
        }

        samples
    }

    fn jittered(&self, center: (f64, f64), time: f64, rng: &mut StdRng) -> Sample {
        let angle = rng.gen_range(0.0..2.0 * PI);
        let radius = rng.gen_range(0.0..=self.idle_jitter);
        Sample::new(
            center.0 + radius * angle.cos(),
            center.1 + radius * angle.sin(),
            time,
        )
    }
}

fn pick(values: &[String], i: usize) -> String {
    if values.is_empty() {
        String::new()
    } else {
        values[i % values.len()].clone()
    }
}
