//! Coalescing of layout requests
//!
//! Layout is lazy. Requests only mark work; a pass starts when the view asks
//! for positions. While one pass is in flight no second pass starts, and a
//! rerun is queued only if the graph generation moved on in the meantime.

/// Handle for a pass in flight.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "hand the pass back to LayoutScheduler::complete"]
pub struct LayoutPass {
    generation: u64,
}

impl LayoutPass {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct LayoutScheduler {
    /// Generation whose positions are current
    completed: Option<u64>,
    /// Generation being laid out right now
    running: Option<u64>,
    /// Latest generation asked for and not yet started
    pending: Option<u64>,
    passes: u64,
}

impl LayoutScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for positions of `generation`.
    ///
    /// Returns true when this request queued new work.
    pub fn request(&mut self, generation: u64) -> bool {
        if self.pending == Some(generation) {
            return false;
        }
        match self.running {
            Some(running) if running == generation => false,
            Some(_) => {
                self.pending = Some(generation);
                true
            }
            None if self.completed == Some(generation) => false,
            None => {
                self.pending = Some(generation);
                true
            }
        }
    }

    /// Start the pending pass, if any and if nothing is running.
    pub fn begin(&mut self) -> Option<LayoutPass> {
        if self.running.is_some() {
            return None;
        }
        let generation = self.pending.take()?;
        self.running = Some(generation);
        Some(LayoutPass { generation })
    }

    /// Finish a pass started by [`begin`](Self::begin).
    pub fn complete(&mut self, pass: LayoutPass) {
        if self.running != Some(pass.generation) {
            tracing::warn!(
                generation = pass.generation,
                "completing a layout pass that is not running"
            );
        }
        self.running = None;
        self.completed = Some(pass.generation);
        self.passes += 1;
        if self.pending == Some(pass.generation) {
            self.pending = None;
        }
    }

    /// Forget everything, e.g. when the session resets.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn completed_generation(&self) -> Option<u64> {
        self.completed
    }

    /// Number of passes completed since the last reset
    pub fn passes(&self) -> u64 {
        self.passes
    }
}
