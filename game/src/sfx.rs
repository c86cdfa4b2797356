//! Tone requests for the pad speaker.

use engine::audio::{TonePlan, Waveform};

/// Chirp on a successful defusal.
pub const SUCCESS_TONE_HZ: f32 = 440.0;
pub const SUCCESS_TONE_MS: u32 = 90;
pub const SUCCESS_SFX_VOLUME: f32 = 0.25;

/// Buzz on a wrong key or an expired bomb. Louder and longer than success.
pub const FAILURE_TONE_HZ: f32 = 220.0;
pub const FAILURE_TONE_MS: u32 = 500;
pub const FAILURE_SFX_VOLUME: f32 = 0.40;

/// Low tick when a bomb is planted. Quiet enough to read as ambience.
pub const PLANT_TONE_HZ: f32 = 110.0;
pub const PLANT_TONE_MS: u32 = 40;
pub const PLANT_SFX_VOLUME: f32 = 0.08;

pub fn success_tone() -> TonePlan {
    TonePlan::new(SUCCESS_TONE_HZ, SUCCESS_TONE_MS, SUCCESS_SFX_VOLUME)
}

pub fn failure_tone() -> TonePlan {
    TonePlan::new(FAILURE_TONE_HZ, FAILURE_TONE_MS, FAILURE_SFX_VOLUME)
}

pub fn plant_tone() -> TonePlan {
    TonePlan::new(PLANT_TONE_HZ, PLANT_TONE_MS, PLANT_SFX_VOLUME).with_waveform(Waveform::Triangle)
}
