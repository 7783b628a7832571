//! Keyboard keycode tables shared by the device descriptor and the key-event
//! validation path.
//!
//! Key events carry a Linux evdev keycode in `arg1`.  The virtual device only
//! registers the fixed set below (standard alphanumeric, editing, navigation,
//! and function keys), so the injector drops key events whose code falls
//! outside it rather than attempting a write the kernel would reject.
//!
//! The constant values are the canonical codes from the kernel's
//! `input-event-codes.h`; they are duplicated here so this crate stays free
//! of OS dependencies and so senders on any platform can use the same table.

/// Named evdev keycodes for the supported key set.
pub mod key {
    pub const KEY_ESC: u16 = 1;
    pub const KEY_1: u16 = 2;
    pub const KEY_2: u16 = 3;
    pub const KEY_3: u16 = 4;
    pub const KEY_4: u16 = 5;
    pub const KEY_5: u16 = 6;
    pub const KEY_6: u16 = 7;
    pub const KEY_7: u16 = 8;
    pub const KEY_8: u16 = 9;
    pub const KEY_9: u16 = 10;
    pub const KEY_0: u16 = 11;
    pub const KEY_MINUS: u16 = 12;
    pub const KEY_EQUAL: u16 = 13;
    pub const KEY_BACKSPACE: u16 = 14;
    pub const KEY_TAB: u16 = 15;
    pub const KEY_Q: u16 = 16;
    pub const KEY_W: u16 = 17;
    pub const KEY_E: u16 = 18;
    pub const KEY_R: u16 = 19;
    pub const KEY_T: u16 = 20;
    pub const KEY_Y: u16 = 21;
    pub const KEY_U: u16 = 22;
    pub const KEY_I: u16 = 23;
    pub const KEY_O: u16 = 24;
    pub const KEY_P: u16 = 25;
    pub const KEY_LEFTBRACE: u16 = 26;
    pub const KEY_RIGHTBRACE: u16 = 27;
    pub const KEY_ENTER: u16 = 28;
    pub const KEY_LEFTCTRL: u16 = 29;
    pub const KEY_A: u16 = 30;
    pub const KEY_S: u16 = 31;
    pub const KEY_D: u16 = 32;
    pub const KEY_F: u16 = 33;
    pub const KEY_G: u16 = 34;
    pub const KEY_H: u16 = 35;
    pub const KEY_J: u16 = 36;
    pub const KEY_K: u16 = 37;
    pub const KEY_L: u16 = 38;
    pub const KEY_SEMICOLON: u16 = 39;
    pub const KEY_APOSTROPHE: u16 = 40;
    pub const KEY_GRAVE: u16 = 41;
    pub const KEY_LEFTSHIFT: u16 = 42;
    pub const KEY_BACKSLASH: u16 = 43;
    pub const KEY_Z: u16 = 44;
    pub const KEY_X: u16 = 45;
    pub const KEY_C: u16 = 46;
    pub const KEY_V: u16 = 47;
    pub const KEY_B: u16 = 48;
    pub const KEY_N: u16 = 49;
    pub const KEY_M: u16 = 50;
    pub const KEY_COMMA: u16 = 51;
    pub const KEY_DOT: u16 = 52;
    pub const KEY_SLASH: u16 = 53;
    pub const KEY_RIGHTSHIFT: u16 = 54;
    pub const KEY_LEFTALT: u16 = 56;
    pub const KEY_SPACE: u16 = 57;
    pub const KEY_F1: u16 = 59;
    pub const KEY_F2: u16 = 60;
    pub const KEY_F3: u16 = 61;
    pub const KEY_F4: u16 = 62;
    pub const KEY_F5: u16 = 63;
    pub const KEY_F6: u16 = 64;
    pub const KEY_F7: u16 = 65;
    pub const KEY_F8: u16 = 66;
    pub const KEY_F9: u16 = 67;
    pub const KEY_F10: u16 = 68;
    pub const KEY_F11: u16 = 87;
    pub const KEY_F12: u16 = 88;
    pub const KEY_RIGHTCTRL: u16 = 97;
    pub const KEY_RIGHTALT: u16 = 100;
    pub const KEY_HOME: u16 = 102;
    pub const KEY_UP: u16 = 103;
    pub const KEY_PAGEUP: u16 = 104;
    pub const KEY_LEFT: u16 = 105;
    pub const KEY_RIGHT: u16 = 106;
    pub const KEY_END: u16 = 107;
    pub const KEY_DOWN: u16 = 108;
    pub const KEY_PAGEDOWN: u16 = 109;
    pub const KEY_DELETE: u16 = 111;
}

use key::*;

/// Every keyboard key the virtual device registers, in descriptor order.
pub const KEYBOARD_KEYS: &[u16] = &[
    KEY_ESC, KEY_1, KEY_2, KEY_3, KEY_4, KEY_5, KEY_6, KEY_7, KEY_8, KEY_9,
    KEY_0, KEY_MINUS, KEY_EQUAL, KEY_BACKSPACE, KEY_TAB, KEY_Q, KEY_W, KEY_E,
    KEY_R, KEY_T, KEY_Y, KEY_U, KEY_I, KEY_O, KEY_P, KEY_LEFTBRACE,
    KEY_RIGHTBRACE, KEY_ENTER, KEY_LEFTCTRL, KEY_A, KEY_S, KEY_D, KEY_F,
    KEY_G, KEY_H, KEY_J, KEY_K, KEY_L, KEY_SEMICOLON, KEY_APOSTROPHE,
    KEY_GRAVE, KEY_LEFTSHIFT, KEY_BACKSLASH, KEY_Z, KEY_X, KEY_C, KEY_V,
    KEY_B, KEY_N, KEY_M, KEY_COMMA, KEY_DOT, KEY_SLASH, KEY_RIGHTSHIFT,
    KEY_LEFTALT, KEY_SPACE, KEY_RIGHTCTRL, KEY_RIGHTALT, KEY_UP, KEY_DOWN,
    KEY_LEFT, KEY_RIGHT, KEY_DELETE, KEY_HOME, KEY_END, KEY_PAGEUP,
    KEY_PAGEDOWN, KEY_F1, KEY_F2, KEY_F3, KEY_F4, KEY_F5, KEY_F6, KEY_F7,
    KEY_F8, KEY_F9, KEY_F10, KEY_F11, KEY_F12,
];

/// Returns `true` when `code` is in the registered key set.
pub fn is_keyboard_key(code: u16) -> bool {
    KEYBOARD_KEYS.contains(&code)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_set_has_79_entries() {
        assert_eq!(KEYBOARD_KEYS.len(), 79);
    }

    #[test]
    fn test_key_set_has_no_duplicates() {
        let mut codes = KEYBOARD_KEYS.to_vec();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), KEYBOARD_KEYS.len());
    }

    #[test]
    fn test_is_keyboard_key_accepts_registered_codes() {
        assert!(is_keyboard_key(key::KEY_A));
        assert!(is_keyboard_key(key::KEY_SPACE));
        assert!(is_keyboard_key(key::KEY_F12));
        assert!(is_keyboard_key(key::KEY_PAGEDOWN));
    }

    #[test]
    fn test_is_keyboard_key_rejects_unregistered_codes() {
        assert!(!is_keyboard_key(0)); // KEY_RESERVED
        assert!(!is_keyboard_key(58)); // KEY_CAPSLOCK, deliberately absent
        assert!(!is_keyboard_key(272)); // BTN_LEFT
        assert!(!is_keyboard_key(u16::MAX));
    }

    #[test]
    fn test_function_key_codes_match_kernel_values() {
        // F1-F10 are contiguous; F11/F12 are not.
        assert_eq!(key::KEY_F1, 59);
        assert_eq!(key::KEY_F10, 68);
        assert_eq!(key::KEY_F11, 87);
        assert_eq!(key::KEY_F12, 88);
    }
}
