//! The drawable face surface.

use std::sync::{Arc, Mutex};

use glance_core::Icon;
use glance_types::WeatherSnapshot;

/// Everything a face needs to paint one frame.
///
/// The engine assembles a frame from the cached snapshot and the current
/// render flags on every redraw; the face itself keeps no sync state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceFrame {
    /// The merged weather snapshot to display.
    pub snapshot: WeatherSnapshot,
    /// Icon matching the snapshot's condition code, if any maps.
    pub icon: Option<Icon>,
    /// Whether the display is in ambient mode.
    pub ambient: bool,
    /// Whether this paint should use anti-aliasing.
    pub antialias: bool,
    /// Whether the cosmetic alternate background is in effect.
    pub background_alternate: bool,
}

/// A paintable face surface.
pub trait Face: Send {
    /// Paint one frame. Called from the engine's event loop only; never
    /// concurrently.
    fn draw(&mut self, frame: &FaceFrame);
}

/// Face double that records every frame it is asked to paint.
///
/// Clones share the frame log, so a test can keep one clone and hand the
/// other to the engine.
#[derive(Clone, Default)]
pub struct RecordingFace {
    frames: Arc<Mutex<Vec<FaceFrame>>>,
}

impl RecordingFace {
    /// Create a face with an empty frame log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All frames painted so far.
    pub fn frames(&self) -> Vec<FaceFrame> {
        self.frames.lock().expect("frame log lock poisoned").clone()
    }

    /// The most recent frame, if any.
    pub fn last_frame(&self) -> Option<FaceFrame> {
        self.frames
            .lock()
            .expect("frame log lock poisoned")
            .last()
            .cloned()
    }

    /// Number of frames painted so far.
    pub fn draw_count(&self) -> usize {
        self.frames.lock().expect("frame log lock poisoned").len()
    }
}

impl Face for RecordingFace {
    fn draw(&mut self, frame: &FaceFrame) {
        self.frames
            .lock()
            .expect("frame log lock poisoned")
            .push(frame.clone());
    }
}
