//! Where snapshots come from.
//!
//! The monitor pulls one snapshot per tick from a [`SnapshotSource`]. The
//! simulated shoe draws readings from fixed healthy ranges; the replay source
//! plays back a scripted list, which is how scenarios are driven in tests.

use std::collections::VecDeque;
use std::path::Path;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use vitals::status::DeviceStatus;
use vitals::BiometricSnapshot;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read replay file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse replay file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Producer of biometric snapshots and step counts.
pub trait SnapshotSource: Send {
    /// Next snapshot stamped at `at`, or `None` once the source is exhausted.
    fn next_snapshot(&mut self, at: DateTime<Utc>) -> Option<BiometricSnapshot>;

    /// Steps walked since the previous step update.
    fn step_increment(&mut self) -> u32 {
        0
    }

    /// Connection, battery and signal state of the device behind the source.
    fn device_status(&self) -> DeviceStatus {
        DeviceStatus::default()
    }
}

/// Random readings from a simulated smart shoe.
pub struct SimulatedShoe {
    rng: StdRng,
}

impl SimulatedShoe {
    /// Deterministic shoe: the same seed yields the same readings.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl SnapshotSource for SimulatedShoe {
    fn next_snapshot(&mut self, at: DateTime<Utc>) -> Option<BiometricSnapshot> {
        Some(BiometricSnapshot::new(
            85.0 + self.rng.gen_range(0.0..30.0),
            65.0 + self.rng.gen_range(0.0..20.0),
            110.0 + self.rng.gen_range(0.0..20.0),
            70.0 + self.rng.gen_range(0.0..15.0),
            98.2 + self.rng.gen_range(0.0..0.8),
            at,
        ))
    }

    fn step_increment(&mut self) -> u32 {
        self.rng.gen_range(0..50)
    }
}

/// Plays back a fixed list of snapshots, restamped with the tick time.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    snapshots: VecDeque<BiometricSnapshot>,
    steps_per_update: u32,
    device: DeviceStatus,
}

impl ReplaySource {
    #[must_use]
    pub fn new(snapshots: impl IntoIterator<Item = BiometricSnapshot>) -> Self {
        Self {
            snapshots: snapshots.into_iter().collect(),
            steps_per_update: 0,
            device: DeviceStatus::default(),
        }
    }

    /// Load a JSON array of snapshots.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let snapshots: Vec<BiometricSnapshot> =
            serde_json::from_str(&content).map_err(|source| SourceError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self::new(snapshots))
    }

    /// Report a fixed number of steps on every step update.
    #[must_use]
    pub fn with_steps(mut self, steps_per_update: u32) -> Self {
        self.steps_per_update = steps_per_update;
        self
    }

    /// Report this device state instead of the default healthy one.
    #[must_use]
    pub fn with_device(mut self, device: DeviceStatus) -> Self {
        self.device = device;
        self
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.snapshots.len()
    }
}

impl SnapshotSource for ReplaySource {
    fn next_snapshot(&mut self, at: DateTime<Utc>) -> Option<BiometricSnapshot> {
        self.snapshots.pop_front().map(|snapshot| BiometricSnapshot {
            captured_at: at,
            ..snapshot
        })
    }

    fn step_increment(&mut self) -> u32 {
        self.steps_per_update
    }

    fn device_status(&self) -> DeviceStatus {
        self.device
    }
}
