//! Lumen engine crate.
//!
//! A minimal real-time 3D viewer core: a scene of meshes and lights, a
//! perspective camera, a frame loop that animates and draws, and resize
//! handling that keeps viewport, camera and renderer in step. Ships a wgpu
//! renderer and a winit window runtime to host it.

pub mod camera;
pub mod coords;
pub mod core;
pub mod device;
pub mod error;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod time;
pub mod viewer;
pub mod window;

pub use error::ViewerError;
