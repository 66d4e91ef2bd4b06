//! Back-to-back cue playback.
//!
//! The sequencer keeps a FIFO of pending cues and at most one scheduled
//! continuation. Each drain step plays the head cue and schedules the next
//! step after the cue's estimated length at the playback rate, so cues never
//! pile on top of each other. The estimate does not stop the voice; a little
//! overlap is tolerated.

pub mod timer;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use crate::audio::SharedOutput;
use crate::cue::Cue;

pub use timer::{Continuation, ManualScheduler, Scheduler, TimerToken, TokioScheduler};

/// Delay before the step after a cue of `duration_ms` played at `rate`.
pub fn step_delay(duration_ms: u64, rate: f32) -> Duration {
    if !rate.is_finite() || rate <= 0.0 {
        return Duration::from_millis(duration_ms);
    }
    Duration::from_millis((duration_ms as f64 / rate as f64).round() as u64)
}

#[derive(Default)]
struct SequencerState {
    queue: VecDeque<Cue>,
    playing: bool,
    pending: Option<TimerToken>,
    released: bool,
}

struct Inner {
    state: Mutex<SequencerState>,
    output: SharedOutput,
    scheduler: Arc<dyn Scheduler>,
    rate: f32,
}

pub struct Sequencer {
    inner: Arc<Inner>,
}

impl Sequencer {
    pub fn new(output: SharedOutput, scheduler: Arc<dyn Scheduler>, rate: f32) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SequencerState::default()),
                output,
                scheduler,
                rate,
            }),
        }
    }

    /// Queues `cue` and starts draining if nothing is playing.
    pub fn enqueue(&self, cue: Cue) {
        let mut state = self.inner.state.lock().unwrap();
        if state.released {
            tracing::debug!("Ignoring cue {:?}: sequencer released", cue.sound);
            return;
        }
        state.queue.push_back(cue);
        if !state.playing {
            step(&self.inner, &mut state);
        }
    }

    /// Cancels the pending step, drops queued cues and releases the output.
    /// Terminal: later `enqueue` calls are ignored.
    pub fn release(&self) {
        let mut state = self.inner.state.lock().unwrap();
        if state.released {
            return;
        }
        if let Some(token) = state.pending.take() {
            token.cancel();
        }
        let dropped = state.queue.len();
        state.queue.clear();
        state.playing = false;
        state.released = true;
        self.inner.output.lock().unwrap().release();
        tracing::info!("Sequencer released ({} queued cues dropped)", dropped);
    }

    pub fn is_playing(&self) -> bool {
        self.inner.state.lock().unwrap().playing
    }

    pub fn queued(&self) -> usize {
        self.inner.state.lock().unwrap().queue.len()
    }

    pub fn is_released(&self) -> bool {
        self.inner.state.lock().unwrap().released
    }

    pub fn rate(&self) -> f32 {
        self.inner.rate
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        // Continuations only hold a Weak, but a live token would still wake a task
        if let Ok(mut state) = self.inner.state.lock() {
            if let Some(token) = state.pending.take() {
                token.cancel();
            }
        }
    }
}

fn resume(inner: &Weak<Inner>) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut state = inner.state.lock().unwrap();
    state.pending = None;
    if state.released {
        return;
    }
    step(&inner, &mut state);
}

/// One drain step. Runs with the state lock held so no second drain can start.
fn step(inner: &Arc<Inner>, state: &mut SequencerState) {
    let Some(cue) = state.queue.pop_front() else {
        state.playing = false;
        tracing::debug!("Cue queue drained");
        return;
    };
    state.playing = true;

    if let Err(e) = inner.output.lock().unwrap().play(cue.sound, inner.rate, 1.0) {
        tracing::warn!("Failed to play cue {:?}: {}", cue.sound, e);
    }

    let delay = step_delay(cue.duration_ms, inner.rate);
    tracing::debug!("Playing {:?}, next step in {:?} ({} queued)", cue.sound, delay, state.queue.len());

    let weak = Arc::downgrade(inner);
    let token = inner.scheduler.schedule(delay, Box::new(move || resume(&weak)));
    state.pending = Some(token);
}
