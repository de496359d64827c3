/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured with its current size (outdated, or lost for
    /// the first time); this frame is dropped.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// The surface stayed lost after a reconfigure, or the device ran out of
    /// memory; rendering cannot continue.
    Fatal,
}
