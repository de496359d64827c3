//! Viewport resize handling.
//!
//! Hosts publish [`ResizeEvent`]s on a [`ResizeBus`]; each subscribed viewer
//! applies them through [`apply_resize`], which keeps the viewport, the camera
//! aspect ratio and the renderer output in step.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::coords::ViewportState;
use crate::error::ViewerError;
use crate::render::Renderer;

use super::ViewerState;

/// New drawable size reported by the host, in physical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResizeEvent {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl ResizeEvent {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self { width, height, pixel_ratio }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

/// Receiving end handed to one subscriber.
#[derive(Debug)]
pub struct ResizeSubscription {
    id: SubscriptionId,
    rx: Receiver<ResizeEvent>,
}

impl ResizeSubscription {
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Drains everything pending and returns the newest event.
    ///
    /// Only the final size matters, so intermediate events are coalesced.
    pub fn latest(&self) -> Option<ResizeEvent> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(ev) => latest = Some(ev),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return latest,
            }
        }
    }
}

/// Registry of resize listeners.
///
/// Delivery is queued: `publish` never calls into a subscriber, it only enqueues.
/// Subscribers apply pending events when they pump.
#[derive(Debug, Default)]
pub struct ResizeBus {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Sender<ResizeEvent>)>,
}

impl ResizeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> ResizeSubscription {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let (tx, rx) = mpsc::channel();
        self.listeners.push((id, tx));
        ResizeSubscription { id, rx }
    }

    /// Removes the listener. Events published afterwards are not delivered.
    pub fn unsubscribe(&mut self, subscription: ResizeSubscription) {
        self.listeners.retain(|(id, _)| *id != subscription.id);
    }

    /// Queues `event` for every live subscriber and returns how many received it.
    ///
    /// Listeners whose subscription was dropped without unsubscribing are pruned.
    pub fn publish(&mut self, event: ResizeEvent) -> usize {
        self.listeners.retain(|(_, tx)| tx.send(event).is_ok());
        self.listeners.len()
    }

    #[inline]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

/// Applies a new drawable size to the renderer, then commits the camera aspect
/// and the viewport.
///
/// Invalid sizes are rejected before anything is mutated, and a renderer that
/// refuses the size leaves viewport and camera as they were. Re-applying the
/// current size is a no-op once the renderer matches it.
pub fn apply_resize<R: Renderer>(
    state: &mut ViewerState<R>,
    event: ResizeEvent,
) -> Result<(), ViewerError> {
    let viewport = ViewportState::new(event.width, event.height, event.pixel_ratio)?;

    if viewport == state.viewport && state.renderer.output_size() == Some(viewport.size()) {
        return Ok(());
    }

    state.renderer.configure(&viewport)?;
    state.camera.set_aspect_ratio(viewport.width(), viewport.height())?;
    state.viewport = viewport;

    log::debug!(
        "viewport resized to {}x{} @ {}",
        viewport.width(),
        viewport.height(),
        viewport.pixel_ratio()
    );
    Ok(())
}
