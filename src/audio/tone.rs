use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

/// Calm drone: a low sine with a slow tremolo, pitched well below
/// anything fatiguing for long sessions.
pub struct CalmTone {
    sample_rate: u32,
    num_sample: usize,
}

const TONE_HZ: f32 = 174.0;
const TREMOLO_HZ: f32 = 0.25;

impl CalmTone {
    pub fn new() -> Self {
        Self {
            sample_rate: 44100,
            num_sample: 0,
        }
    }
}

impl Iterator for CalmTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        self.num_sample = self.num_sample.wrapping_add(1);
        let t = self.num_sample as f32 / self.sample_rate as f32;

        let carrier = (2.0 * PI * TONE_HZ * t).sin();
        let tremolo = 0.85 + 0.15 * (2.0 * PI * TREMOLO_HZ * t).sin();

        Some(carrier * tremolo * 0.2)
    }
}

impl Source for CalmTone {
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
