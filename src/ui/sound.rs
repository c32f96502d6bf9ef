/// Sound engine: procedural chip-style effects via rodio.
///
/// Every effect is synthesized into an in-memory WAV buffer at startup
/// and played fire-and-forget through a detached Sink. Build without
/// the "sound" feature (or run with no audio device) and the engine
/// degrades to silent stubs; the simulation never notices.

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_collect: Arc<Vec<u8>>,
        sfx_moisten: Arc<Vec<u8>>,
        sfx_fold: Arc<Vec<u8>>,
        sfx_unlock: Arc<Vec<u8>>,
        sfx_danger: Arc<Vec<u8>>,
        sfx_rescue: Arc<Vec<u8>>,
        sfx_victory: Arc<Vec<u8>>,
        sfx_defeat: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_collect: Arc::new(make_wav(&gen_collect())),
                sfx_moisten: Arc::new(make_wav(&gen_moisten())),
                sfx_fold: Arc::new(make_wav(&gen_fold())),
                sfx_unlock: Arc::new(make_wav(&gen_unlock())),
                sfx_danger: Arc::new(make_wav(&gen_danger())),
                sfx_rescue: Arc::new(make_wav(&gen_rescue())),
                sfx_victory: Arc::new(make_wav(&gen_victory())),
                sfx_defeat: Arc::new(make_wav(&gen_defeat())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_collect(&self) { self.play(&self.sfx_collect); }
        pub fn play_moisten(&self) { self.play(&self.sfx_moisten); }
        pub fn play_fold(&self) { self.play(&self.sfx_fold); }
        pub fn play_unlock(&self) { self.play(&self.sfx_unlock); }
        pub fn play_danger(&self) { self.play(&self.sfx_danger); }
        pub fn play_rescue(&self) { self.play(&self.sfx_rescue); }
        pub fn play_victory(&self) { self.play(&self.sfx_victory); }
        pub fn play_defeat(&self) { self.play(&self.sfx_defeat); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// One note with a decaying envelope and a soft second harmonic.
    fn note(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - i as f32 / n as f32).powf(0.7);
                let wave = (t * freq * TAU).sin() * 0.8 + (t * freq * 2.0 * TAU).sin() * 0.2;
                wave * env * volume
            })
            .collect()
    }

    fn melody(notes: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let mut out = Vec::new();
        for &(freq, dur) in notes {
            out.extend(note(freq, dur, volume));
        }
        out
    }

    /// Dew pickup: bright upward sparkle E6 -> B6.
    fn gen_collect() -> Vec<f32> {
        melody(&[(1319.0, 0.05), (1976.0, 0.09)], 0.25)
    }

    /// Moisten: low filtered noise splash with a sinking tone.
    fn gen_moisten() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.18) as usize;
        let mut lcg: u32 = 0x2545_F491;
        let mut last = 0.0f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                lcg = lcg.wrapping_mul(1664525).wrapping_add(1013904223);
                let white = (lcg >> 8) as f32 / (1 << 24) as f32 * 2.0 - 1.0;
                // One-pole lowpass makes the noise "wet" rather than hissy.
                last += 0.18 * (white - last);
                let tone = (ti * (420.0 - t * 180.0) * TAU).sin();
                (last * 0.7 + tone * 0.3) * (1.0 - t) * 0.3
            })
            .collect()
    }

    /// Fold: two soft descending notes, leaf closing.
    fn gen_fold() -> Vec<f32> {
        melody(&[(880.0, 0.07), (659.0, 0.12)], 0.22)
    }

    /// Gate unlock: rising fourth, held.
    fn gen_unlock() -> Vec<f32> {
        melody(&[(587.0, 0.09), (784.0, 0.2)], 0.3)
    }

    /// Danger: harsh alternating two-tone alarm.
    fn gen_danger() -> Vec<f32> {
        let mut out = Vec::new();
        for cycle in 0..3 {
            let freq = if cycle % 2 == 0 { 740.0 } else { 554.0 };
            let n = (SAMPLE_RATE as f32 * 0.09) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                // Square-ish: saturated sine.
                let wave = (t * freq * TAU).sin() * 3.0;
                out.push(wave.clamp(-1.0, 1.0) * 0.2);
            }
        }
        out
    }

    /// Rescue: quick major triad up.
    fn gen_rescue() -> Vec<f32> {
        melody(&[(523.0, 0.06), (659.0, 0.06), (784.0, 0.14)], 0.28)
    }

    /// Victory: full fanfare with a sustained top note.
    fn gen_victory() -> Vec<f32> {
        melody(
            &[(523.0, 0.11), (659.0, 0.11), (784.0, 0.11), (1047.0, 0.32)],
            0.3,
        )
    }

    /// Defeat: slow minor fall.
    fn gen_defeat() -> Vec<f32> {
        melody(&[(494.0, 0.14), (415.0, 0.14), (330.0, 0.3)], 0.28)
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — 16-bit mono PCM
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let data_size = samples.len() as u32 * 2;
        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&1u16.to_le_bytes()); // mono
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes()); // byte rate
        buf.extend_from_slice(&2u16.to_le_bytes()); // block align
        buf.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_collect(&self) {}
    pub fn play_moisten(&self) {}
    pub fn play_fold(&self) {}
    pub fn play_unlock(&self) {}
    pub fn play_danger(&self) {}
    pub fn play_rescue(&self) {}
    pub fn play_victory(&self) {}
    pub fn play_defeat(&self) {}
}
