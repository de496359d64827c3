use std::fmt;

use crate::scene::NodeId;

/// Errors produced by the viewer core.
///
/// None of these are retried internally. `InvalidViewport` and
/// `InvalidProjection` are caller mistakes; `SurfaceUnavailable` means the
/// output surface is gone for good; `UnsupportedMaterial` is reported per node
/// and never aborts a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerError {
    /// A drawable size with a zero dimension or a non-positive pixel ratio.
    InvalidViewport { width: u32, height: u32 },

    /// Camera projection parameters out of range.
    InvalidProjection { reason: &'static str },

    /// The renderer's output surface cannot be acquired.
    SurfaceUnavailable { reason: String },

    /// A node references a material variant the renderer cannot draw.
    UnsupportedMaterial { node: NodeId, kind: &'static str },
}

impl ViewerError {
    pub(crate) fn surface(reason: impl Into<String>) -> Self {
        Self::SurfaceUnavailable { reason: reason.into() }
    }

    /// Returns `true` for errors that must stop the frame loop.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SurfaceUnavailable { .. })
    }
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidViewport { width, height } => {
                write!(f, "invalid viewport {width}x{height}: dimensions must be non-zero")
            }
            Self::InvalidProjection { reason } => write!(f, "invalid camera projection: {reason}"),
            Self::SurfaceUnavailable { reason } => write!(f, "output surface unavailable: {reason}"),
            Self::UnsupportedMaterial { node, kind } => {
                write!(f, "node {node} uses unsupported material `{kind}`")
            }
        }
    }
}

impl std::error::Error for ViewerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_surface_loss_is_fatal() {
        assert!(ViewerError::surface("lost").is_fatal());
        assert!(!ViewerError::InvalidViewport { width: 0, height: 1 }.is_fatal());
        assert!(!ViewerError::InvalidProjection { reason: "near" }.is_fatal());
    }

    #[test]
    fn display_names_the_viewport() {
        let msg = ViewerError::InvalidViewport { width: 640, height: 0 }.to_string();
        assert!(msg.contains("640x0"), "{msg}");
    }
}
