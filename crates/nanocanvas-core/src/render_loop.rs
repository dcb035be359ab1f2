//! Continuous re-render loop for animated media surfaces.

/// Tracks whether the host should keep scheduling animation frames.
///
/// Starting is idempotent and cancelling is synchronous. A frame that was
/// already scheduled may still arrive after [`RenderLoop::cancel`]; it must
/// observe `is_running() == false` and do nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderLoop {
    running: bool,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the loop was already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    pub fn cancel(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Record a frame. Returns whether another frame should be scheduled.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.frames += 1;
        true
    }

    /// Frames rendered since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_is_idempotent() {
        let mut lp = RenderLoop::new();
        assert!(lp.start());
        assert!(!lp.start());
        assert!(lp.tick());
        assert_eq!(lp.frames(), 1);
    }

    #[test]
    fn test_tick_after_cancel_is_noop() {
        let mut lp = RenderLoop::new();
        lp.start();
        lp.cancel();
        assert!(!lp.tick());
        assert_eq!(lp.frames(), 0);
    }
}
