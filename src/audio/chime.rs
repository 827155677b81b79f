use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

const CHIME_SECS: f32 = 2.5;
const FUNDAMENTAL_HZ: f32 = 660.0;

/// Session-complete bell: a struck tone with a second partial, decaying
/// to silence over a couple of seconds. Finite, unlike the ambient
/// sources.
pub struct Chime {
    sample_rate: u32,
    num_sample: usize,
    total_samples: usize,
}

impl Chime {
    pub fn new() -> Self {
        let sample_rate = 44100;
        Self {
            sample_rate,
            num_sample: 0,
            total_samples: (sample_rate as f32 * CHIME_SECS) as usize,
        }
    }
}

impl Iterator for Chime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }
        self.num_sample += 1;
        let t = self.num_sample as f32 / self.sample_rate as f32;

        let envelope = (-3.0 * t).exp();
        let strike = (2.0 * PI * FUNDAMENTAL_HZ * t).sin()
            + 0.4 * (2.0 * PI * FUNDAMENTAL_HZ * 2.76 * t).sin();

        Some(strike * envelope * 0.25)
    }
}

impl Source for Chime {
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
        Some(Duration::from_secs_f32(CHIME_SECS))
    }
}
