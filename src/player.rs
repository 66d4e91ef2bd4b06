use std::sync::{Arc, Mutex, atomic::{AtomicBool, Ordering}};

use crate::audio::{MediaProbe, SharedOutput, PLAYBACK_RATE};
use crate::cue::{CueKey, CueLibrary, Operator};
use crate::resources::ResourceResolver;
use crate::sequencer::{Scheduler, Sequencer};

/// Keypad-facing entry point.
///
/// Every trigger is safe to call at any time: before `initialize` there are
/// no cues, after `release` nothing plays. Nothing here returns an error;
/// missing cues and bad input are ignored.
pub struct CuePlayer {
    library: Mutex<Option<Arc<CueLibrary>>>,
    sequencer: Sequencer,
    output: SharedOutput,
    enabled: AtomicBool,
}

impl CuePlayer {
    pub fn new(output: SharedOutput, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            library: Mutex::new(None),
            sequencer: Sequencer::new(Arc::clone(&output), scheduler, PLAYBACK_RATE),
            output,
            enabled: AtomicBool::new(true),
        }
    }

    /// Loads every available cue and makes it playable. Returns how many loaded.
    pub fn initialize(&self, resolver: &ResourceResolver, probe: &dyn MediaProbe) -> usize {
        if self.sequencer.is_released() {
            tracing::warn!("Cannot initialize cues: player released");
            return 0;
        }

        let library = {
            let mut output = self.output.lock().unwrap();
            CueLibrary::initialize(resolver, &mut **output, probe, self.sequencer.rate())
        };
        let loaded = library.len();

        let mut slot = self.library.lock().unwrap();
        // release() may have run while cues were loading
        if self.sequencer.is_released() {
            return 0;
        }
        *slot = Some(Arc::new(library));
        loaded
    }

    pub fn play_number(&self, digit: i32) {
        match CueKey::digit(digit) {
            Some(key) => self.trigger(key),
            None => tracing::debug!("Ignoring out-of-range digit {}", digit),
        }
    }

    pub fn play_operator(&self, symbol: &str) {
        match Operator::from_symbol(symbol) {
            Some(op) => self.trigger(CueKey::Operator(op)),
            None => tracing::debug!("Ignoring unknown operator '{}'", symbol),
        }
    }

    pub fn play_dot(&self) {
        self.trigger(CueKey::Dot);
    }

    pub fn play_equals(&self) {
        self.trigger(CueKey::Equals);
    }

    /// Stops sequencing, releases the output and drops all cues. Terminal.
    pub fn release(&self) {
        self.sequencer.release();
        self.library.lock().unwrap().take();
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn is_initialized(&self) -> bool {
        self.library.lock().unwrap().is_some()
    }

    pub fn is_released(&self) -> bool {
        self.sequencer.is_released()
    }

    pub fn available_cues(&self) -> usize {
        self.library.lock().unwrap().as_ref().map_or(0, |lib| lib.len())
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    fn trigger(&self, key: CueKey) {
        if !self.is_enabled() {
            return;
        }
        let library = self.library.lock().unwrap().clone();
        let Some(cue) = library.and_then(|lib| lib.lookup(key)) else {
            return;
        };
        self.sequencer.enqueue(cue);
    }
}
