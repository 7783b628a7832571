//! InputInjector: converts decoded wire events into ordered device
//! micro-sequences.
//!
//! The injector sits at the application layer and delegates to a
//! [`TouchscreenBackend`] trait object for the actual device writes.  The
//! kernel-backed implementation lives in the infrastructure layer; tests use
//! a recording mock.
//!
//! # State machine
//!
//! Each of the ten multi-touch slots is either inactive or active.  The
//! digitizer button (the "any finger touching" bit) is a derived state: it
//! must flip exactly at the 0↔1 active-count boundary.  Emitting it per-event
//! would desynchronize multi-finger gestures — a second finger lifting would
//! spuriously clear "touching".
//!
//! Every emitted micro-sequence ends with a synchronization barrier so a
//! reader never observes a half-applied event.

use thiserror::Error;
use tracing::debug;

use touchstream_core::{keymap, EventKind, InputEvent, MAX_TOUCH_SLOTS};

/// Error type for device write operations.
#[derive(Debug, Error)]
pub enum InjectError {
    /// The kernel device handle rejected a write.  Recovered per-event by
    /// the caller; never terminates the receive loop.
    #[error("device write failed: {0}")]
    DeviceWrite(#[from] std::io::Error),
}

/// Device primitive seam between the injector and the kernel handle.
///
/// One method per uinput primitive the state machine emits.  Implementations
/// may buffer primitives and flush them on [`sync`](Self::sync), as long as a
/// barrier makes every primitive since the previous barrier observable
/// atomically.
pub trait TouchscreenBackend: Send {
    /// Selects the multi-touch slot subsequent primitives apply to.
    fn select_slot(&mut self, slot: i32) -> Result<(), InjectError>;

    /// Asserts (`>= 0`) or clears (`-1`) the selected slot's tracking id.
    fn set_tracking_id(&mut self, id: i32) -> Result<(), InjectError>;

    /// Writes the selected slot's absolute contact position.
    fn set_touch_position(&mut self, x: i32, y: i32) -> Result<(), InjectError>;

    /// Mirrors a position onto the single-touch axes for non-multitouch
    /// consumers.
    fn set_pointer_position(&mut self, x: i32, y: i32) -> Result<(), InjectError>;

    /// Sets the digitizer touch button edge (press = any finger down).
    fn set_touch_button(&mut self, pressed: bool) -> Result<(), InjectError>;

    /// Emits a keyboard key edge.
    fn set_key(&mut self, code: u16, pressed: bool) -> Result<(), InjectError>;

    /// Synchronization barrier; always the last primitive of a sequence.
    fn sync(&mut self) -> Result<(), InjectError>;
}

/// The injector: sole owner of the device handle and the per-slot state.
///
/// All transports serialize their [`apply`](Self::apply) calls through one
/// exclusion mechanism (the server wraps the injector in a
/// `tokio::sync::Mutex`) because edge correctness depends on a globally
/// consistent view of the active-slot count.
pub struct InputInjector {
    backend: Box<dyn TouchscreenBackend>,
    /// Per-slot active flags; never exposed for external mutation.
    active: [bool; MAX_TOUCH_SLOTS as usize],
    width: i32,
    height: i32,
}

/// Slot 0 is always the mirrored primary pointer, preserving legacy
/// single-touch sender behavior.
const PRIMARY_SLOT: usize = 0;

impl InputInjector {
    /// Creates an injector over `backend` with all slots inactive.
    ///
    /// `width`/`height` bound the coordinate clamp; they must match the axis
    /// ranges the backend's device descriptor declared.  Non-positive
    /// dimensions are pinned to one pixel so the clamp bounds stay ordered;
    /// the config layer rejects such geometry before an injector is built.
    pub fn new(backend: Box<dyn TouchscreenBackend>, width: i32, height: i32) -> Self {
        Self {
            backend,
            active: [false; MAX_TOUCH_SLOTS as usize],
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Number of currently active touch slots.
    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    /// Applies one decoded event to the device.
    ///
    /// Events with an unknown kind, and key events outside the registered
    /// key set, are dropped silently (soft-logged).  Out-of-range
    /// coordinates and slots are clamped, never rejected: the injector is a
    /// pure function of the incoming event stream and only fails on device
    /// write errors.
    ///
    /// # Errors
    ///
    /// Returns [`InjectError::DeviceWrite`] if the device handle rejects a
    /// write; slot state is updated regardless so a later flush stays
    /// consistent.
    pub fn apply(&mut self, event: &InputEvent) -> Result<(), InjectError> {
        let kind = match event.kind() {
            Ok(kind) => kind,
            Err(raw) => {
                debug!(kind = raw, "dropping event with unknown kind");
                return Ok(());
            }
        };

        match kind {
            EventKind::TouchMove => self.apply_move(event),
            EventKind::TouchDown => self.apply_down(event),
            EventKind::TouchUp => self.apply_up(event),
            EventKind::KeyDown => self.apply_key(event, true),
            EventKind::KeyUp => self.apply_key(event, false),
        }
    }

    /// Forces every active slot inactive and, if any were active, emits the
    /// release edge — the synthetic all-fingers-up sequence run on session
    /// cancellation so a disconnect mid-gesture never leaves a finger down.
    ///
    /// # Errors
    ///
    /// Returns [`InjectError::DeviceWrite`] if a device write fails.
    pub fn flush(&mut self) -> Result<(), InjectError> {
        if self.active_count() == 0 {
            return Ok(());
        }
        for slot in 0..self.active.len() {
            if self.active[slot] {
                self.active[slot] = false;
                self.backend.select_slot(slot as i32)?;
                self.backend.set_tracking_id(-1)?;
            }
        }
        self.backend.set_touch_button(false)?;
        self.backend.sync()
    }

    // ── Transitions ───────────────────────────────────────────────────────────

    fn apply_move(&mut self, event: &InputEvent) -> Result<(), InjectError> {
        let slot = clamp_slot(event.arg3);
        let (x, y) = self.clamp_position(event.arg1, event.arg2);

        // Applied regardless of the slot's recorded state: position is
        // absolute, so a repeated or stray MOVE is idempotent.
        self.backend.select_slot(slot as i32)?;
        self.backend.set_touch_position(x, y)?;
        if slot == PRIMARY_SLOT {
            self.backend.set_pointer_position(x, y)?;
        }
        self.backend.sync()
    }

    fn apply_down(&mut self, event: &InputEvent) -> Result<(), InjectError> {
        let slot = clamp_slot(event.arg3);
        let (x, y) = self.clamp_position(event.arg1, event.arg2);

        // A DOWN on an already-active slot overwrites its tracking state
        // (no stacking), so the press edge fires only on the 0→1 transition.
        let was_pressed = self.active_count() > 0;
        self.active[slot] = true;

        self.backend.select_slot(slot as i32)?;
        self.backend.set_tracking_id(slot as i32)?;
        self.backend.set_touch_position(x, y)?;
        if slot == PRIMARY_SLOT {
            self.backend.set_pointer_position(x, y)?;
        }
        if !was_pressed {
            self.backend.set_touch_button(true)?;
        }
        self.backend.sync()
    }

    fn apply_up(&mut self, event: &InputEvent) -> Result<(), InjectError> {
        let slot = clamp_slot(event.arg3);

        let was_active = self.active[slot];
        self.active[slot] = false;

        self.backend.select_slot(slot as i32)?;
        self.backend.set_tracking_id(-1)?;
        // Release edge only on the 1→0 transition; an UP on a never-active
        // slot is accepted and applied idempotently.
        if was_active && self.active_count() == 0 {
            self.backend.set_touch_button(false)?;
        }
        self.backend.sync()
    }

    fn apply_key(&mut self, event: &InputEvent, pressed: bool) -> Result<(), InjectError> {
        if event.arg1 <= 0 {
            debug!(code = event.arg1, "dropping key event with invalid code");
            return Ok(());
        }
        let code = event.arg1 as u16;
        if !keymap::is_keyboard_key(code) {
            debug!(code, "dropping key event outside registered key set");
            return Ok(());
        }
        self.backend.set_key(code, pressed)?;
        self.backend.sync()
    }

    fn clamp_position(&self, x: i16, y: i16) -> (i32, i32) {
        (
            i32::from(x).clamp(0, self.width - 1),
            i32::from(y).clamp(0, self.height - 1),
        )
    }
}

/// Enforces the slot allocator contract: `slot = max(0, min(9, arg3))`.
fn clamp_slot(raw: i16) -> usize {
    raw.clamp(0, MAX_TOUCH_SLOTS - 1) as usize
}

// ── Tests ─────────────────────────────────────────────────────────────────────
