use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

/// Ocean surf generator: low-passed noise swept by a slow swell envelope
/// so waves appear to roll in and recede every few seconds.
pub struct OceanSurf {
    sample_rate: u32,
    smoothed: f32,
    swell_phase: f32,
    rng: StdRng,
}

const SWELL_HZ: f32 = 0.09;

impl OceanSurf {
    pub fn new() -> Self {
        Self {
            sample_rate: 44100,
            smoothed: 0.0,
            swell_phase: 0.0,
            rng: StdRng::from_entropy(),
        }
    }
}

impl Iterator for OceanSurf {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let white: f32 = self.rng.gen_range(-1.0..1.0);

        // One-pole low-pass keeps the hiss dark and water-like.
        self.smoothed += 0.04 * (white - self.smoothed);

        // Swell between a faint wash and a full wave; never fully silent.
        self.swell_phase += 2.0 * PI * SWELL_HZ / self.sample_rate as f32;
        if self.swell_phase > 2.0 * PI {
            self.swell_phase -= 2.0 * PI;
        }
        let swell = 0.55 + 0.45 * self.swell_phase.sin();

        Some(self.smoothed * swell * 0.8)
    }
}

impl Source for OceanSurf {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
