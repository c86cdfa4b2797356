use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Saw,
}

pub fn waveform_sample(wave: Waveform, phase: f32) -> f32 {
    match wave {
        Waveform::Sine => phase.sin(),
        Waveform::Triangle => (2.0 / std::f32::consts::PI) * phase.sin().asin(),
        Waveform::Square => {
            if phase.sin() >= 0.0 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Saw => 2.0 * (phase / TAU) - 1.0,
    }
}

/// A bounded, fire-and-forget tone request.
///
/// Games emit these instead of sleeping on the synth: playback belongs to the
/// host and must never stall the tick or key path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TonePlan {
    pub freq_hz: f32,
    pub duration_ms: u32,
    pub volume: f32,
    pub waveform: Waveform,
}

impl TonePlan {
    pub fn new(freq_hz: f32, duration_ms: u32, volume: f32) -> Self {
        Self {
            freq_hz: freq_hz.max(0.0),
            duration_ms,
            volume: volume.clamp(0.0, 1.0),
            waveform: Waveform::Sine,
        }
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }
}

/// Finite mono sample stream for one [`TonePlan`].
///
/// A short linear attack/release envelope keeps the tone edges click-free.
#[derive(Debug, Clone)]
pub struct ToneVoice {
    plan: TonePlan,
    sample_rate: u32,
    len_samples: u64,
    attack_samples: u64,
    release_samples: u64,
    cursor: u64,
    phase: f32,
}

impl ToneVoice {
    pub const ATTACK_MS: u32 = 5;
    pub const RELEASE_MS: u32 = 15;

    pub fn new(plan: TonePlan, sample_rate: u32) -> Self {
        let sample_rate = sample_rate.max(1);
        let len_samples = sample_rate as u64 * plan.duration_ms as u64 / 1000;
        let attack_samples =
            (sample_rate as u64 * Self::ATTACK_MS as u64 / 1000).min(len_samples / 2);
        let release_samples =
            (sample_rate as u64 * Self::RELEASE_MS as u64 / 1000).min(len_samples / 2);
        Self {
            plan,
            sample_rate,
            len_samples,
            attack_samples,
            release_samples,
            cursor: 0,
            phase: 0.0,
        }
    }

    pub fn plan(&self) -> TonePlan {
        self.plan
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        1
    }

    pub fn len_samples(&self) -> u64 {
        self.len_samples
    }

    pub fn remaining_samples(&self) -> u64 {
        self.len_samples - self.cursor
    }

    fn envelope(&self) -> f32 {
        if self.attack_samples > 0 && self.cursor < self.attack_samples {
            return self.cursor as f32 / self.attack_samples as f32;
        }
        let release_start = self.len_samples - self.release_samples;
        if self.release_samples > 0 && self.cursor >= release_start {
            return (self.len_samples - self.cursor) as f32 / self.release_samples as f32;
        }
        1.0
    }
}

impl Iterator for ToneVoice {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.cursor >= self.len_samples {
            return None;
        }

        let env = self.envelope();
        let phase_delta = TAU * self.plan.freq_hz / self.sample_rate as f32;
        self.phase = (self.phase + phase_delta) % TAU;

        let sample = waveform_sample(self.plan.waveform, self.phase) * self.plan.volume * env;
        self.cursor += 1;
        Some(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_length_matches_duration() {
        let voice = ToneVoice::new(TonePlan::new(440.0, 90, 0.5), 48_000);
        assert_eq!(voice.len_samples(), 48_000 * 90 / 1000);
        assert_eq!(voice.count() as u64, 48_000 * 90 / 1000);
    }

    #[test]
    fn voice_ends_and_stays_ended() {
        let mut voice = ToneVoice::new(TonePlan::new(220.0, 1, 1.0), 1_000);
        assert_eq!(voice.len_samples(), 1);
        assert!(voice.next().is_some());
        assert!(voice.next().is_none());
        assert!(voice.next().is_none());
    }

    #[test]
    fn zero_duration_yields_no_samples() {
        let mut voice = ToneVoice::new(TonePlan::new(440.0, 0, 1.0), 48_000);
        assert!(voice.next().is_none());
    }

    #[test]
    fn samples_stay_within_volume_bounds() {
        let volume = 0.3;
        for sample in ToneVoice::new(
            TonePlan::new(440.0, 50, volume).with_waveform(Waveform::Square),
            48_000,
        ) {
            assert!(sample.abs() <= volume + 1e-6);
        }
    }

    #[test]
    fn envelope_ramps_in_and_out() {
        let voice = ToneVoice::new(TonePlan::new(100.0, 100, 1.0), 48_000);
        let samples: Vec<f32> = voice.collect();

        // First sample sits at the very start of the attack ramp, the last
        // at the very end of the release ramp.
        assert!(samples.first().unwrap().abs() < 0.05);
        assert!(samples.last().unwrap().abs() < 0.05);
        assert!(samples.iter().any(|s| s.abs() > 0.5));
    }

    #[test]
    fn plan_clamps_volume() {
        assert_eq!(TonePlan::new(440.0, 10, 2.0).volume, 1.0);
        assert_eq!(TonePlan::new(440.0, 10, -1.0).volume, 0.0);
    }
}
