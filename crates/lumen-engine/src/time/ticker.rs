use super::FrameTime;

/// Supplies the timestamp for each frame-loop tick.
///
/// The host decides *when* a tick happens (display refresh, redraw request,
/// a test loop); the source only decides what time it reports.
pub trait TickSource {
    fn next_tick(&mut self) -> FrameTime;

    /// Called when a stopped loop starts again.
    fn reset(&mut self) {}
}

/// Deterministic tick source: every tick advances by exactly `dt` seconds.
///
/// Used for tests and off-screen runs where wall-clock jitter is unwanted.
#[derive(Debug, Clone)]
pub struct FixedStep {
    dt: f32,
    elapsed: f64,
    frame_index: u64,
}

impl FixedStep {
    pub fn new(dt: f32) -> Self {
        Self { dt, elapsed: 0.0, frame_index: 0 }
    }

    /// 60 ticks per second.
    pub fn sixty_hz() -> Self {
        Self::new(1.0 / 60.0)
    }

    /// Number of ticks produced so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.frame_index
    }
}

impl TickSource for FixedStep {
    fn next_tick(&mut self) -> FrameTime {
        self.elapsed += self.dt as f64;
        let ft = FrameTime {
            dt: self.dt,
            elapsed: self.elapsed,
            frame_index: self.frame_index,
        };
        self.frame_index += 1;
        ft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_step_is_exact() {
        let mut src = FixedStep::new(0.5);
        let a = src.next_tick();
        let b = src.next_tick();
        assert_eq!(a, FrameTime { dt: 0.5, elapsed: 0.5, frame_index: 0 });
        assert_eq!(b, FrameTime { dt: 0.5, elapsed: 1.0, frame_index: 1 });
        assert_eq!(src.ticks(), 2);
    }

    #[test]
    fn reset_keeps_fixed_step_running() {
        let mut src = FixedStep::sixty_hz();
        src.next_tick();
        src.reset();
        assert_eq!(src.next_tick().frame_index, 1);
    }
}
