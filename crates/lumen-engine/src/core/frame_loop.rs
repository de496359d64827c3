use crate::error::ViewerError;
use crate::time::{FrameTime, TickSource};

use super::LoopControl;

/// Per-tick callback. `C` is the state the loop drives (the viewer's scene,
/// camera and renderer).
pub type TickCallback<C> = Box<dyn FnMut(&mut C, FrameTime) -> Result<LoopControl, ViewerError>>;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Result of one [`FrameLoop::tick`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TickOutcome {
    /// The loop is stopped; the callback was not invoked.
    Idle,
    /// The callback ran and the loop keeps running.
    Ran(FrameTime),
    /// The callback ran and asked to stop; the loop is now stopped.
    Finished(FrameTime),
}

/// Cooperative, single-threaded render loop.
///
/// The host calls [`tick`](Self::tick) once per display refresh. Each tick runs
/// the callback to completion before returning, so invocations never overlap.
/// An error escaping the callback stops the loop and is handed back to the
/// caller of `tick`; nothing is retried.
pub struct FrameLoop<C> {
    state: LoopState,
    source: Box<dyn TickSource>,
    callback: Option<TickCallback<C>>,
    ticks_run: u64,
}

impl<C> FrameLoop<C> {
    pub fn new(source: Box<dyn TickSource>) -> Self {
        Self {
            state: LoopState::Stopped,
            source,
            callback: None,
            ticks_run: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Number of callback invocations since the loop was created.
    #[inline]
    pub fn ticks_run(&self) -> u64 {
        self.ticks_run
    }

    /// Stopped -> Running with `callback` registered for every following tick.
    ///
    /// Starting a running loop replaces its callback.
    pub fn start<F>(&mut self, callback: F)
    where
        F: FnMut(&mut C, FrameTime) -> Result<LoopControl, ViewerError> + 'static,
    {
        match self.state {
            LoopState::Running => log::debug!("frame loop already running; callback replaced"),
            LoopState::Stopped => {
                self.source.reset();
                log::debug!("frame loop started");
            }
        }
        self.callback = Some(Box::new(callback));
        self.state = LoopState::Running;
    }

    /// Running -> Stopped. Future ticks are no-ops until the next `start`.
    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            log::debug!("frame loop stopped after {} ticks", self.ticks_run);
        }
        self.state = LoopState::Stopped;
        self.callback = None;
    }

    /// Runs one tick against `ctx`.
    pub fn tick(&mut self, ctx: &mut C) -> Result<TickOutcome, ViewerError> {
        if self.state == LoopState::Stopped {
            return Ok(TickOutcome::Idle);
        }
        let Some(mut callback) = self.callback.take() else {
            self.state = LoopState::Stopped;
            return Ok(TickOutcome::Idle);
        };

        let time = self.source.next_tick();
        let result = callback(ctx, time);
        self.ticks_run += 1;

        match result {
            Ok(LoopControl::Continue) => {
                self.callback = Some(callback);
                Ok(TickOutcome::Ran(time))
            }
            Ok(LoopControl::Stop) => {
                self.state = LoopState::Stopped;
                log::debug!("frame loop finished at tick {}", time.frame_index);
                Ok(TickOutcome::Finished(time))
            }
            Err(err) => {
                self.state = LoopState::Stopped;
                log::error!("frame loop stopped by error: {err}");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedStep;

    fn new_loop() -> FrameLoop<Vec<u64>> {
        FrameLoop::new(Box::new(FixedStep::sixty_hz()))
    }

    fn record(log: &mut Vec<u64>, t: FrameTime) -> Result<LoopControl, ViewerError> {
        log.push(t.frame_index);
        Ok(LoopControl::Continue)
    }

    // ── state machine ─────────────────────────────────────────────────────

    #[test]
    fn stopped_loop_never_invokes_callback() {
        let mut lp = new_loop();
        let mut seen = Vec::new();
        for _ in 0..3 {
            assert_eq!(lp.tick(&mut seen).unwrap(), TickOutcome::Idle);
        }
        assert!(seen.is_empty());
        assert_eq!(lp.ticks_run(), 0);
    }

    #[test]
    fn start_stop_start_skips_stopped_interval() {
        let mut lp = new_loop();
        let mut seen = Vec::new();

        lp.start(record);
        lp.tick(&mut seen).unwrap();
        lp.tick(&mut seen).unwrap();
        lp.stop();
        assert_eq!(lp.state(), LoopState::Stopped);

        for _ in 0..5 {
            assert_eq!(lp.tick(&mut seen).unwrap(), TickOutcome::Idle);
        }
        assert_eq!(seen.len(), 2);

        lp.start(record);
        assert!(matches!(lp.tick(&mut seen).unwrap(), TickOutcome::Ran(_)));
        // The source was not advanced while stopped.
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(lp.ticks_run(), 3);
    }

    #[test]
    fn start_while_running_replaces_callback() {
        let mut lp = new_loop();
        let mut seen = Vec::new();
        lp.start(record);
        lp.start(|log: &mut Vec<u64>, _| {
            log.push(99);
            Ok(LoopControl::Continue)
        });
        lp.tick(&mut seen).unwrap();
        assert_eq!(seen, vec![99]);
    }

    // ── callback results ──────────────────────────────────────────────────

    #[test]
    fn stop_request_completes_the_tick() {
        let mut lp = new_loop();
        let mut seen = Vec::new();
        lp.start(|log: &mut Vec<u64>, t: FrameTime| {
            log.push(t.frame_index);
            Ok(if log.len() == 2 { LoopControl::Stop } else { LoopControl::Continue })
        });

        assert!(matches!(lp.tick(&mut seen).unwrap(), TickOutcome::Ran(_)));
        assert!(matches!(lp.tick(&mut seen).unwrap(), TickOutcome::Finished(_)));
        assert_eq!(lp.tick(&mut seen).unwrap(), TickOutcome::Idle);
        assert_eq!(seen, vec![0, 1]);
    }

    #[test]
    fn callback_error_stops_loop_and_surfaces() {
        let mut lp = new_loop();
        let mut seen = Vec::new();
        lp.start(|log: &mut Vec<u64>, _| {
            log.push(0);
            Err(ViewerError::surface("gone"))
        });

        let err = lp.tick(&mut seen).unwrap_err();
        assert!(err.is_fatal());
        assert!(!lp.is_running());
        assert_eq!(lp.tick(&mut seen).unwrap(), TickOutcome::Idle);
        assert_eq!(seen.len(), 1);
    }
}
