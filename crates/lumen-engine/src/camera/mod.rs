//! Camera model.
//!
//! Only perspective projection exists; multi-camera setups are out of scope.

mod perspective;

pub use perspective::PerspectiveCamera;
