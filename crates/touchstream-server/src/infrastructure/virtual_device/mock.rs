//! Mock touchscreen backend for tests.
//!
//! The real backend writes to `/dev/uinput`, which needs Linux, elevated
//! permissions, and a way to observe injected events — none of which a unit
//! test has.  `MockTouchscreen` records every primitive into a shared
//! `Mutex<Vec<Primitive>>` instead, so assertions can check exactly what was
//! emitted and in what order.
//!
//! The `failure_switch` flips every subsequent write into an I/O error,
//! which exercises the per-event error recovery paths of callers.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use crate::application::inject_input::{InjectError, TouchscreenBackend};

/// One recorded device primitive, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    SelectSlot(i32),
    TrackingId(i32),
    TouchPosition(i32, i32),
    PointerPosition(i32, i32),
    TouchButton(bool),
    Key(u16, bool),
    Sync,
}

/// A backend that records all primitives without touching the kernel.
#[derive(Default)]
pub struct MockTouchscreen {
    log: Arc<Mutex<Vec<Primitive>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MockTouchscreen {
    /// Creates a mock with an empty log and failures disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the primitive log; clone it before moving the
    /// mock into an injector.
    pub fn log(&self) -> Arc<Mutex<Vec<Primitive>>> {
        Arc::clone(&self.log)
    }

    /// Returns the shared failure switch; while `true`, every write returns
    /// an I/O error.
    pub fn failure_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail_writes)
    }

    fn record(&self, primitive: Primitive) -> Result<(), InjectError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(InjectError::DeviceWrite(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock write failure",
            )));
        }
        self.log.lock().unwrap().push(primitive);
        Ok(())
    }
}

impl TouchscreenBackend for MockTouchscreen {
    fn select_slot(&mut self, slot: i32) -> Result<(), InjectError> {
        self.record(Primitive::SelectSlot(slot))
    }

    fn set_tracking_id(&mut self, id: i32) -> Result<(), InjectError> {
        self.record(Primitive::TrackingId(id))
    }

    fn set_touch_position(&mut self, x: i32, y: i32) -> Result<(), InjectError> {
        self.record(Primitive::TouchPosition(x, y))
    }

    fn set_pointer_position(&mut self, x: i32, y: i32) -> Result<(), InjectError> {
        self.record(Primitive::PointerPosition(x, y))
    }

    fn set_touch_button(&mut self, pressed: bool) -> Result<(), InjectError> {
        self.record(Primitive::TouchButton(pressed))
    }

    fn set_key(&mut self, code: u16, pressed: bool) -> Result<(), InjectError> {
        self.record(Primitive::Key(code, pressed))
    }

    fn sync(&mut self) -> Result<(), InjectError> {
        self.record(Primitive::Sync)
    }
}
