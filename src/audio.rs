use fundsp::prelude::*;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink, StreamError};
use std::collections::HashMap;
use tracing::warn;

const SAMPLE_RATE: u32 = 44100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sound {
    Jump,
    Point,
    Hit,
    Die,
    Swoosh,
}

impl Sound {
    pub const ALL: [Sound; 5] = [
        Sound::Jump,
        Sound::Point,
        Sound::Hit,
        Sound::Die,
        Sound::Swoosh,
    ];
}

/// Fire-and-forget playback. `volume` is a gain from 0 to 1.
pub trait AudioSink {
    fn play(&mut self, sound: Sound, volume: f32);
}

/// Used when no output device is available.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _sound: Sound, _volume: f32) {}
}

// ── Synthesis ───────────────────────────────────────────────────────────────

fn render(mut unit: impl AudioUnit, seconds: f32) -> Vec<f32> {
    unit.set_sample_rate(SAMPLE_RATE as f64);
    let len = (SAMPLE_RATE as f32 * seconds) as usize;
    (0..len).map(|_| unit.get_mono()).collect()
}

/// Renders `sound` into mono samples at 44.1 kHz.
pub fn synthesize(sound: Sound) -> Vec<f32> {
    match sound {
        Sound::Jump => {
            let freq = lfo(|t: f32| lerp(300.0, 620.0, (t / 0.08).min(1.0)));
            let gain = lfo(|t: f32| lerp(0.12, 0.0, (t / 0.12).min(1.0)));
            render((freq >> square()) * gain, 0.12)
        }
        Sound::Point => {
            let freq = lfo(|t: f32| if t < 0.08 { 880.0 } else { 1320.0 });
            let gain = lfo(|t: f32| lerp(0.2, 0.0, (t / 0.3).min(1.0)));
            render((freq >> sine::<f32>()) * gain, 0.3)
        }
        Sound::Hit => {
            let gain = lfo(|t: f32| lerp(0.3, 0.0, (t / 0.12).min(1.0)));
            render((noise() >> lowpass_hz(900.0, 1.0)) * gain, 0.15)
        }
        // Frequency 400Hz to 80Hz over 0.4s, gain 0.15 to 0 over 0.5s.
        Sound::Die => {
            let freq = lfo(|t: f32| lerp(400.0, 80.0, (t / 0.4).min(1.0)));
            let gain = lfo(|t: f32| lerp(0.15, 0.0, (t / 0.5).min(1.0)));
            render((freq >> saw()) * gain, 0.5)
        }
        Sound::Swoosh => {
            let gain = lfo(|t: f32| 0.12 * (t / 0.3 * std::f32::consts::PI).sin().max(0.0));
            render((noise() >> lowpass_hz(2400.0, 0.7)) * gain, 0.3)
        }
    }
}

// ── Output ──────────────────────────────────────────────────────────────────

/// Plays pre-rendered clips on the default output device.
pub struct Synth {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    clips: HashMap<Sound, Vec<f32>>,
}

impl Synth {
    pub fn try_new() -> Result<Self, StreamError> {
        let (stream, handle) = OutputStream::try_default()?;
        let clips = Sound::ALL.into_iter().map(|s| (s, synthesize(s))).collect();
        Ok(Self {
            _stream: stream,
            handle,
            clips,
        })
    }
}

impl AudioSink for Synth {
    fn play(&mut self, sound: Sound, volume: f32) {
        let Some(clip) = self.clips.get(&sound) else {
            return;
        };
        match Sink::try_new(&self.handle) {
            Ok(sink) => {
                sink.set_volume(volume.clamp(0.0, 1.0));
                sink.append(SamplesBuffer::new(1, SAMPLE_RATE, clip.clone()));
                sink.detach();
            }
            Err(e) => warn!(?sound, error = %e, "cannot open audio sink"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clips_have_expected_length_and_fade_out() {
        let die = synthesize(Sound::Die);
        assert_eq!(die.len(), 22050);
        for sound in Sound::ALL {
            let clip = synthesize(sound);
            assert!(!clip.is_empty());
            assert!(clip.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
        }
        let tail = &die[die.len() - 100..];
        assert!(tail.iter().all(|s| s.abs() < 0.01));
    }
}
