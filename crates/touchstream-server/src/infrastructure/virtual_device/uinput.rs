//! Linux uinput backend.
//!
//! Registers the virtual touchscreen with the kernel through `/dev/uinput`
//! (via the `evdev` crate) and implements [`TouchscreenBackend`] on top of
//! the resulting device handle.
//!
//! Primitives are buffered and written as one batch per synchronization
//! barrier: `VirtualDevice::emit` appends the `SYN_REPORT` itself, so one
//! `emit` call per [`sync`](TouchscreenBackend::sync) yields exactly one
//! barrier and an atomically observable report.
//!
//! Creation requires write access to `/dev/uinput` (root or membership in
//! the `input` group); failure here is fatal at startup.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{
    AbsInfo, AbsoluteAxisType, AttributeSet, BusType, EventType, InputEvent, InputId, Key,
    PropType, UinputAbsSetup,
};
use tracing::info;

use crate::application::inject_input::{InjectError, TouchscreenBackend};
use crate::infrastructure::virtual_device::descriptor::TouchscreenDescriptor;

/// The kernel-backed virtual touchscreen.
pub struct UinputTouchscreen {
    device: VirtualDevice,
    /// Primitives accumulated since the last barrier.
    pending: Vec<InputEvent>,
}

impl UinputTouchscreen {
    /// Registers the capability set from `descriptor` and opens the device.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when `/dev/uinput` is missing or not
    /// writable, or when the kernel rejects the capability registration.
    pub fn create(descriptor: &TouchscreenDescriptor) -> std::io::Result<Self> {
        let mut keys = AttributeSet::<Key>::new();
        keys.insert(Key::BTN_TOUCH);
        for code in descriptor.keyboard_keys {
            keys.insert(Key::new(*code));
        }

        let mut properties = AttributeSet::<PropType>::new();
        // Touchscreen, not trackpad: coordinates map directly to the display.
        properties.insert(PropType::DIRECT);

        let axis = |max: i32| AbsInfo::new(0, 0, max, 0, 0, 0);
        let tracking = AbsInfo::new(
            0,
            descriptor.tracking_id_min(),
            descriptor.tracking_id_max(),
            0,
            0,
            0,
        );

        let device = VirtualDeviceBuilder::new()?
            .name(descriptor.name.as_str())
            .input_id(InputId::new(
                BusType::BUS_VIRTUAL,
                descriptor.vendor,
                descriptor.product,
                1,
            ))
            .with_keys(&keys)?
            .with_absolute_axis(&UinputAbsSetup::new(
                AbsoluteAxisType::ABS_X,
                axis(descriptor.x_max),
            ))?
            .with_absolute_axis(&UinputAbsSetup::new(
                AbsoluteAxisType::ABS_Y,
                axis(descriptor.y_max),
            ))?
            .with_absolute_axis(&UinputAbsSetup::new(
                AbsoluteAxisType::ABS_MT_SLOT,
                axis(descriptor.slot_max),
            ))?
            .with_absolute_axis(&UinputAbsSetup::new(
                AbsoluteAxisType::ABS_MT_TRACKING_ID,
                tracking,
            ))?
            .with_absolute_axis(&UinputAbsSetup::new(
                AbsoluteAxisType::ABS_MT_POSITION_X,
                axis(descriptor.x_max),
            ))?
            .with_absolute_axis(&UinputAbsSetup::new(
                AbsoluteAxisType::ABS_MT_POSITION_Y,
                axis(descriptor.y_max),
            ))?
            .with_properties(&properties)?
            .build()?;

        info!(name = %descriptor.name, "created virtual touchscreen");

        Ok(Self {
            device,
            pending: Vec::with_capacity(8),
        })
    }

    fn push_abs(&mut self, axis: AbsoluteAxisType, value: i32) {
        self.pending
            .push(InputEvent::new(EventType::ABSOLUTE, axis.0, value));
    }
}

impl TouchscreenBackend for UinputTouchscreen {
    fn select_slot(&mut self, slot: i32) -> Result<(), InjectError> {
        self.push_abs(AbsoluteAxisType::ABS_MT_SLOT, slot);
        Ok(())
    }

    fn set_tracking_id(&mut self, id: i32) -> Result<(), InjectError> {
        self.push_abs(AbsoluteAxisType::ABS_MT_TRACKING_ID, id);
        Ok(())
    }

    fn set_touch_position(&mut self, x: i32, y: i32) -> Result<(), InjectError> {
        self.push_abs(AbsoluteAxisType::ABS_MT_POSITION_X, x);
        self.push_abs(AbsoluteAxisType::ABS_MT_POSITION_Y, y);
        Ok(())
    }

    fn set_pointer_position(&mut self, x: i32, y: i32) -> Result<(), InjectError> {
        self.push_abs(AbsoluteAxisType::ABS_X, x);
        self.push_abs(AbsoluteAxisType::ABS_Y, y);
        Ok(())
    }

    fn set_touch_button(&mut self, pressed: bool) -> Result<(), InjectError> {
        self.pending.push(InputEvent::new(
            EventType::KEY,
            Key::BTN_TOUCH.code(),
            i32::from(pressed),
        ));
        Ok(())
    }

    fn set_key(&mut self, code: u16, pressed: bool) -> Result<(), InjectError> {
        self.pending
            .push(InputEvent::new(EventType::KEY, code, i32::from(pressed)));
        Ok(())
    }

    fn sync(&mut self) -> Result<(), InjectError> {
        // One emit per barrier; the kernel appends SYN_REPORT.
        let result = self.device.emit(&self.pending);
        self.pending.clear();
        result.map_err(InjectError::from)
    }
}
