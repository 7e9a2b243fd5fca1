//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects and looping backing tracks, so no
//! asset files are loaded.

use web_sys::{AudioContext, AudioNode, GainNode, OscillatorNode, OscillatorType};

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player fired
    Laser,
    /// Enemy shot down
    Explosion,
    /// Last life lost
    GameOver,
}

impl SoundEffect {
    /// The sound a simulation signal makes, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Laser => Some(Self::Laser),
            GameEvent::Explosion { .. } => Some(Self::Explosion),
            GameEvent::SessionEnded { .. } => Some(Self::GameOver),
            _ => None,
        }
    }
}

/// Peak gain of sound effects
const SFX_VOLUME: f32 = 0.8;
/// Peak gain of the backing track, kept under the effects
const MUSIC_VOLUME: f32 = 0.25;
/// How far ahead of the audio clock music notes are queued (seconds)
const MUSIC_LOOKAHEAD: f64 = 0.2;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    muted: bool,
    music: Option<MusicVoice>,
}

/// The backing track currently looping
struct MusicVoice {
    track: usize,
    /// Every note of the track feeds this node, so stopping it silences
    /// notes already queued
    bus: GainNode,
    /// Audio clock time of the next unscheduled note
    next_note: f64,
    step: usize,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            muted: false,
            music: None,
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.stop_music();
        }
    }

    pub fn play(&self, effect: SoundEffect) {
        if self.muted {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        wake(ctx);

        let tones: &[Tone] = match effect {
            SoundEffect::Laser => &LASER,
            SoundEffect::Explosion => &EXPLOSION,
            SoundEffect::GameOver => &GAME_OVER,
        };
        let destination = ctx.destination();
        let now = ctx.current_time();
        for tone in tones {
            schedule_tone(ctx, &destination, tone, now, SFX_VOLUME);
        }
    }

    /// Play whatever sounds a batch of signals calls for
    pub fn play_events(&self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }

    /// Switch the looping backing track; `None` silences it.
    ///
    /// Asking for the track that is already playing changes nothing.
    pub fn set_music(&mut self, track: Option<usize>) {
        let track = track.filter(|_| !self.muted);
        if self.music.as_ref().map(|m| m.track) == track {
            return;
        }
        self.stop_music();
        let (Some(track), Some(ctx)) = (track, &self.ctx) else {
            return;
        };
        wake(ctx);

        let Ok(bus) = ctx.create_gain() else { return };
        bus.gain().set_value(MUSIC_VOLUME);
        if bus.connect_with_audio_node(&ctx.destination()).is_err() {
            log::warn!("Failed to connect music bus");
            return;
        }
        log::debug!("Music track {} started", track);
        self.music = Some(MusicVoice {
            track,
            bus,
            next_note: ctx.current_time(),
            step: 0,
        });
    }

    /// Queue the notes of the current track that fall inside the lookahead
    /// window. Call once per animation frame.
    pub fn update_music(&mut self) {
        let (Some(ctx), Some(music)) = (&self.ctx, &mut self.music) else {
            return;
        };
        let pattern = &MUSIC[music.track % MUSIC.len()];
        let now = ctx.current_time();
        // A throttled tab can fall behind; skip what was missed
        if music.next_note < now {
            music.next_note = now;
        }

        while music.next_note < now + MUSIC_LOOKAHEAD {
            let freq = pattern.notes[music.step % pattern.notes.len()];
            if freq > 0.0 {
                let note = Tone::new(freq, pattern.wave, 1.0, pattern.beat * 0.9);
                schedule_tone(ctx, &music.bus, &note, music.next_note, 1.0);
            }
            music.next_note += pattern.beat;
            music.step = (music.step + 1) % pattern.notes.len();
        }
    }

    fn stop_music(&mut self) {
        if let Some(music) = self.music.take() {
            music.bus.gain().set_value(0.0);
            music.bus.disconnect().ok();
            log::debug!("Music track {} stopped", music.track);
        }
    }
}

/// Browsers keep the context suspended until a user gesture
fn wake(ctx: &AudioContext) {
    if ctx.state() == web_sys::AudioContextState::Suspended {
        let _ = ctx.resume();
    }
}

/// Schedule one enveloped tone at `start` (plus its delay), optionally
/// sweeping its pitch
fn schedule_tone(ctx: &AudioContext, out: &AudioNode, tone: &Tone, start: f64, vol: f32) {
    let Some((osc, gain)) = connect_osc(ctx, out, tone.freq, tone.wave) else {
        return;
    };
    let t = start + tone.delay;
    let end = t + tone.duration;

    gain.gain().set_value_at_time(vol * tone.level, t).ok();
    gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();
    if let Some(to) = tone.sweep_to {
        osc.frequency().set_value_at_time(tone.freq, t).ok();
        osc.frequency().exponential_ramp_to_value_at_time(to, end).ok();
    }

    osc.start_with_when(t).ok();
    osc.stop_with_when(end + 0.05).ok();
}

/// One oscillator voice of an effect
struct Tone {
    freq: f32,
    wave: OscillatorType,
    /// Peak gain relative to the voice volume
    level: f32,
    /// Seconds after the scheduled start
    delay: f64,
    /// Seconds until the envelope has decayed
    duration: f64,
    sweep_to: Option<f32>,
}

impl Tone {
    const fn new(freq: f32, wave: OscillatorType, level: f32, duration: f64) -> Self {
        Self {
            freq,
            wave,
            level,
            delay: 0.0,
            duration,
            sweep_to: None,
        }
    }

    const fn sweep(mut self, to: f32) -> Self {
        self.sweep_to = Some(to);
        self
    }

    const fn after(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }
}

/// Oscillator wired through its own gain node into `out`
fn connect_osc(
    ctx: &AudioContext,
    out: &AudioNode,
    freq: f32,
    wave: OscillatorType,
) -> Option<(OscillatorNode, GainNode)> {
    let osc = ctx.create_oscillator().ok()?;
    let gain = ctx.create_gain().ok()?;

    osc.set_type(wave);
    osc.frequency().set_value(freq);
    osc.connect_with_audio_node(&gain).ok()?;
    gain.connect_with_audio_node(out).ok()?;

    Some((osc, gain))
}

/// Falling square zap
const LASER: [Tone; 1] = [Tone::new(1400.0, OscillatorType::Square, 0.15, 0.12).sweep(300.0)];

/// Sawtooth boom with a short crack on top
const EXPLOSION: [Tone; 2] = [
    Tone::new(100.0, OscillatorType::Sawtooth, 0.5, 0.4).sweep(30.0),
    Tone::new(1500.0, OscillatorType::Square, 0.2, 0.1),
];

/// Four descending notes
const GAME_OVER: [Tone; 4] = [
    Tone::new(400.0, OscillatorType::Sine, 0.3, 0.3),
    Tone::new(350.0, OscillatorType::Sine, 0.3, 0.3).after(0.2),
    Tone::new(300.0, OscillatorType::Sine, 0.3, 0.3).after(0.4),
    Tone::new(200.0, OscillatorType::Sine, 0.3, 0.3).after(0.6),
];

/// A looping note sequence; a frequency of 0 is a rest
struct Pattern {
    wave: OscillatorType,
    /// Seconds per note
    beat: f64,
    notes: &'static [f32],
}

/// One pattern per entry of `settings::MUSIC_TRACKS`, in the same order
const MUSIC: [Pattern; 3] = [
    // Steady minor arpeggio
    Pattern {
        wave: OscillatorType::Triangle,
        beat: 0.2,
        notes: &[
            220.0, 261.6, 329.6, 261.6, 220.0, 261.6, 329.6, 392.0,
            174.6, 220.0, 261.6, 220.0, 196.0, 246.9, 293.7, 246.9,
        ],
    },
    // Marching square lead
    Pattern {
        wave: OscillatorType::Square,
        beat: 0.25,
        notes: &[
            293.7, 293.7, 440.0, 0.0, 392.0, 349.2, 329.6, 0.0,
            293.7, 349.2, 440.0, 587.3, 523.3, 440.0, 392.0, 0.0,
        ],
    },
    // Bouncy off-beat bass
    Pattern {
        wave: OscillatorType::Sawtooth,
        beat: 0.18,
        notes: &[
            110.0, 0.0, 220.0, 0.0, 130.8, 0.0, 261.6, 0.0,
            98.0, 0.0, 196.0, 0.0, 146.8, 0.0, 293.7, 220.0,
        ],
    },
];
