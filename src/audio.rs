//! Sound cues and the audio sinks that play them
//!
//! The simulation only names a cue. Each cue is a short list of synthesized
//! tones, so the browser build needs no sound files. Native builds log cues
//! instead of playing them.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player fires
    Shoot,
    /// Enemy fires
    EnemyShoot,
    /// Player takes damage
    Hurt,
    /// Pickup collected
    Powerup,
    /// Enemy destroyed
    EnemyDeath,
    GameOver,
    /// Level cleared
    LevelUp,
    /// Final level cleared
    GameWin,
    /// TNT charge dropped
    TntPlace,
    /// Manual detonation trigger
    TntDetonate,
    /// A charge went off
    Explosion,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One synthesized note of a cue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq: f32,
    /// Exponential pitch slide target
    pub slide_to: Option<f32>,
    /// Seconds
    pub duration: f32,
    /// Seconds after the cue starts
    pub delay: f32,
    pub wave: Wave,
    /// Relative gain before master/sfx volume
    pub gain: f32,
}

const fn tone(freq: f32, duration: f32, delay: f32, wave: Wave, gain: f32) -> Tone {
    Tone {
        freq,
        slide_to: None,
        duration,
        delay,
        wave,
        gain,
    }
}

const fn slide(freq: f32, to: f32, duration: f32, wave: Wave, gain: f32) -> Tone {
    Tone {
        freq,
        slide_to: Some(to),
        duration,
        delay: 0.0,
        wave,
        gain,
    }
}

const SHOOT: &[Tone] = &[
    tone(800.0, 0.1, 0.0, Wave::Square, 0.2),
    tone(400.0, 0.15, 0.0, Wave::Sawtooth, 0.1),
];
const ENEMY_SHOOT: &[Tone] = &[
    tone(600.0, 0.12, 0.0, Wave::Square, 0.15),
    tone(300.0, 0.18, 0.0, Wave::Sawtooth, 0.08),
];
const HURT: &[Tone] = &[slide(200.0, 100.0, 0.3, Wave::Sawtooth, 0.3)];
const POWERUP: &[Tone] = &[
    tone(523.0, 0.2, 0.0, Wave::Sine, 0.2),
    tone(659.0, 0.2, 0.1, Wave::Sine, 0.2),
    tone(784.0, 0.2, 0.2, Wave::Sine, 0.2),
    tone(1047.0, 0.2, 0.3, Wave::Sine, 0.2),
];
const ENEMY_DEATH: &[Tone] = &[slide(150.0, 50.0, 0.5, Wave::Square, 0.2)];
const GAME_OVER: &[Tone] = &[
    tone(233.0, 0.8, 0.0, Wave::Triangle, 0.3),
    tone(220.0, 0.8, 0.3, Wave::Triangle, 0.3),
    tone(207.0, 0.8, 0.6, Wave::Triangle, 0.3),
    tone(196.0, 0.8, 0.9, Wave::Triangle, 0.3),
];
const LEVEL_UP: &[Tone] = &[
    tone(523.0, 0.3, 0.0, Wave::Sine, 0.25),
    tone(659.0, 0.3, 0.15, Wave::Sine, 0.25),
    tone(784.0, 0.3, 0.3, Wave::Sine, 0.25),
    tone(1047.0, 0.3, 0.45, Wave::Sine, 0.25),
    tone(1319.0, 0.3, 0.6, Wave::Sine, 0.25),
];
const GAME_WIN: &[Tone] = &[
    tone(523.0, 0.4, 0.0, Wave::Triangle, 0.3),
    tone(523.0, 0.4, 0.2, Wave::Triangle, 0.3),
    tone(523.0, 0.4, 0.4, Wave::Triangle, 0.3),
    tone(659.0, 0.4, 0.6, Wave::Triangle, 0.3),
    tone(784.0, 0.4, 0.8, Wave::Triangle, 0.3),
    tone(784.0, 0.4, 1.0, Wave::Triangle, 0.3),
    tone(1047.0, 0.4, 1.2, Wave::Triangle, 0.3),
];
const TNT_PLACE: &[Tone] = &[tone(200.0, 0.1, 0.0, Wave::Square, 0.1)];
const TNT_DETONATE: &[Tone] = &[
    tone(300.0, 0.2, 0.0, Wave::Sawtooth, 0.1),
    tone(250.0, 0.1, 0.05, Wave::Square, 0.1),
];
const EXPLOSION: &[Tone] = &[
    tone(80.0, 0.5, 0.0, Wave::Sawtooth, 0.1),
    tone(60.0, 0.3, 0.1, Wave::Square, 0.1),
    tone(40.0, 0.2, 0.2, Wave::Triangle, 0.1),
];

impl SoundEffect {
    /// Notes that make up this cue
    pub fn tones(self) -> &'static [Tone] {
        match self {
            SoundEffect::Shoot => SHOOT,
            SoundEffect::EnemyShoot => ENEMY_SHOOT,
            SoundEffect::Hurt => HURT,
            SoundEffect::Powerup => POWERUP,
            SoundEffect::EnemyDeath => ENEMY_DEATH,
            SoundEffect::GameOver => GAME_OVER,
            SoundEffect::LevelUp => LEVEL_UP,
            SoundEffect::GameWin => GAME_WIN,
            SoundEffect::TntPlace => TNT_PLACE,
            SoundEffect::TntDetonate => TNT_DETONATE,
            SoundEffect::Explosion => EXPLOSION,
        }
    }

    /// Total length in seconds
    pub fn length(self) -> f32 {
        self.tones()
            .iter()
            .map(|t| t.delay + t.duration)
            .fold(0.0, f32::max)
    }
}

/// Something that can play cues. Never blocks and never reports failure.
pub trait AudioSink {
    /// `volume` is the already-mixed level in (0, 1]
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Discards every cue
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Writes cues to the log (headless runs)
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::debug!("sfx {:?} at {:.2}", effect, volume);
    }
}

/// Audio manager for the game: volume and mute gating in front of a sink.
/// Without a sink every cue is dropped.
pub struct AudioManager {
    sink: Option<Box<dyn AudioSink>>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::silent()
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink: Some(sink),
            master_volume: 0.7,
            sfx_volume: 0.8,
            muted: false,
        }
    }

    /// No output device
    pub fn silent() -> Self {
        Self {
            sink: None,
            master_volume: 0.7,
            sfx_volume: 0.8,
            muted: false,
        }
    }

    /// Platform default: Web Audio in the browser, log output natively
    pub fn for_platform() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            match web::WebAudio::new() {
                Some(sink) => Self::new(Box::new(sink)),
                None => Self::silent(),
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::new(Box::new(LogAudio))
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect. Returns false if it was gated or there is no sink.
    pub fn play(&mut self, effect: SoundEffect) -> bool {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return false;
        }
        let Some(sink) = self.sink.as_mut() else {
            return false;
        };
        sink.play(effect, vol);
        true
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect, Tone, Wave};

    /// Web Audio oscillator synth
    pub struct WebAudio {
        ctx: AudioContext,
    }

    impl WebAudio {
        /// None if the context cannot be created (e.g. insecure context)
        pub fn new() -> Option<Self> {
            match AudioContext::new() {
                Ok(ctx) => Some(Self { ctx }),
                Err(_) => {
                    log::warn!("Failed to create AudioContext - audio disabled");
                    None
                }
            }
        }

        fn create_osc(&self, freq: f32, wave: Wave) -> Option<(OscillatorNode, GainNode)> {
            let osc = self.ctx.create_oscillator().ok()?;
            let gain = self.ctx.create_gain().ok()?;

            osc.set_type(match wave {
                Wave::Sine => OscillatorType::Sine,
                Wave::Square => OscillatorType::Square,
                Wave::Sawtooth => OscillatorType::Sawtooth,
                Wave::Triangle => OscillatorType::Triangle,
            });
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&self.ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_tone(&self, tone: &Tone, vol: f32) {
            let Some((osc, gain)) = self.create_osc(tone.freq, tone.wave) else {
                return;
            };
            let start = self.ctx.current_time() + tone.delay as f64;
            let end = start + tone.duration as f64;

            gain.gain().set_value_at_time(0.0, start).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(tone.gain * vol, start + 0.01)
                .ok();
            gain.gain().exponential_ramp_to_value_at_time(0.001, end).ok();
            if let Some(to) = tone.slide_to {
                osc.frequency().set_value_at_time(tone.freq, start).ok();
                osc.frequency().exponential_ramp_to_value_at_time(to, end).ok();
            }

            osc.start_with_when(start).ok();
            osc.stop_with_when(end).ok();
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, effect: SoundEffect, volume: f32) {
            // Browsers suspend the context until a user gesture
            if self.ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = self.ctx.resume();
            }
            for tone in effect.tones() {
                self.play_tone(tone, volume);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(SoundEffect, f32)>>>);

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect, volume: f32) {
            self.0.lock().unwrap().push((effect, volume));
        }
    }

    #[test]
    fn test_every_cue_has_tones() {
        let all = [
            SoundEffect::Shoot,
            SoundEffect::EnemyShoot,
            SoundEffect::Hurt,
            SoundEffect::Powerup,
            SoundEffect::EnemyDeath,
            SoundEffect::GameOver,
            SoundEffect::LevelUp,
            SoundEffect::GameWin,
            SoundEffect::TntPlace,
            SoundEffect::TntDetonate,
            SoundEffect::Explosion,
        ];
        for effect in all {
            assert!(!effect.tones().is_empty(), "{:?}", effect);
            assert!(effect.length() > 0.0);
        }
        assert!((SoundEffect::GameWin.length() - 1.6).abs() < 1e-4);
    }

    #[test]
    fn test_volume_is_mixed() {
        let recorder = Recorder::default();
        let mut audio = AudioManager::new(Box::new(recorder.clone()));
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(0.5);
        assert!(audio.play(SoundEffect::Shoot));

        let played = recorder.0.lock().unwrap();
        assert_eq!(played.as_slice(), &[(SoundEffect::Shoot, 0.25)]);
    }

    #[test]
    fn test_mute_and_zero_volume_gate_cues() {
        let recorder = Recorder::default();
        let mut audio = AudioManager::new(Box::new(recorder.clone()));
        audio.set_muted(true);
        assert!(!audio.play(SoundEffect::Hurt));
        audio.set_muted(false);
        audio.set_master_volume(-3.0);
        assert!(!audio.play(SoundEffect::Hurt));
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_silent_manager_drops_cues() {
        let mut audio = AudioManager::silent();
        assert!(!audio.play(SoundEffect::Explosion));
    }
}
