//! Host audio backend
//!
//! A sample thread that pulls the latest [`SoundState`] published by the
//! emulation loop and renders fixed-size stereo buffers at the output rate.
//! Only silence is rendered; the decoded state is consumed so the channel
//! between the two threads is exercised end to end.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use gb_core::apu::SoundState;

/// Output sample rate in Hz
pub const SAMPLE_RATE: u32 = 44_100;
/// Frames per buffer
pub const BUFFER_FRAMES: usize = 512;
/// Interleaved left/right
pub const CHANNELS: usize = 2;

/// Signed 8-bit silence
pub const SILENCE: i8 = 0;

/// Render one buffer of interleaved samples for `state`
pub fn render(_state: &SoundState, buffer: &mut [i8]) {
    // No generator produces a waveform yet, so every state mixes to silence.
    buffer.fill(SILENCE);
}

/// Open audio output; closed exactly once by [`AudioDevice::close`] or on drop
pub struct AudioDevice {
    shared: Arc<Mutex<SoundState>>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<u64>>,
}

impl AudioDevice {
    /// Start the sample thread
    pub fn open() -> Result<Self> {
        let shared = Arc::new(Mutex::new(SoundState::default()));
        let stop = Arc::new(AtomicBool::new(false));

        let worker = {
            let shared = Arc::clone(&shared);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("audio".into())
                .spawn(move || sample_loop(&shared, &stop))
                .context("failed to start the audio thread")?
        };

        log::info!(
            "audio opened: {} Hz, {} frames x {} channels, s8",
            SAMPLE_RATE,
            BUFFER_FRAMES,
            CHANNELS
        );
        Ok(Self {
            shared,
            stop,
            worker: Some(worker),
        })
    }

    /// Hand a new snapshot to the sample thread
    pub fn publish(&self, state: SoundState) {
        let mut shared = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        *shared = state;
    }

    /// Stop the sample thread and return how many buffers it rendered.
    /// Later calls return 0.
    pub fn close(&mut self) -> u64 {
        let Some(worker) = self.worker.take() else {
            return 0;
        };
        self.stop.store(true, Ordering::Release);
        match worker.join() {
            Ok(buffers) => {
                log::info!("audio closed after {} buffers", buffers);
                buffers
            }
            Err(_) => {
                log::error!("audio thread panicked");
                0
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        if self.is_open() {
            self.close();
        }
    }
}

fn sample_loop(shared: &Mutex<SoundState>, stop: &AtomicBool) -> u64 {
    let period = Duration::from_secs_f64(BUFFER_FRAMES as f64 / SAMPLE_RATE as f64);
    let mut buffer = vec![0i8; BUFFER_FRAMES * CHANNELS];
    let mut rendered = 0u64;
    let mut last = SoundState::default();

    while !stop.load(Ordering::Acquire) {
        let state = *shared.lock().unwrap_or_else(PoisonError::into_inner);
        if state != last {
            log::trace!("audio state changed: {:?}", state);
            last = state;
        }
        render(&state, &mut buffer);
        rendered += 1;
        thread::sleep(period);
    }
    rendered
}
