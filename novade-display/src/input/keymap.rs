//! Keymaps: from evdev key codes to characters.
//!
//! The bridge only needs two things from a keymap: the UTF-32 value a key
//! produces in the current modifier state, and a way to feed that state.
//! [`KeySymbolResolver`] captures exactly that; [`XkbKeymap`] implements it
//! on top of xkbcommon for keymaps sent by the compositor.

use thiserror::Error;

/// Modifier masks as the compositor reports them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierMasks {
    pub depressed: u32,
    pub latched: u32,
    pub locked: u32,
    pub group: u32,
}

pub trait KeySymbolResolver {
    /// UTF-32 value of the key with evdev code `code`; 0 when it produces none.
    fn key_utf32(&self, code: u32) -> u32;

    /// Keeps dead-key and compose state in step with the compositor.
    fn update_modifiers(&mut self, masks: ModifierMasks);
}

#[derive(Debug, Error)]
pub enum KeymapError {
    #[error("Keymap format {0} is not xkb v1 text")]
    UnsupportedFormat(u32),

    #[error("Failed to map keymap blob: {0}")]
    Io(#[from] std::io::Error),

    #[error("Keymap blob is not valid UTF-8")]
    Encoding,

    #[error("xkbcommon rejected the keymap")]
    Compile,
}

#[cfg(feature = "wayland")]
pub use self::xkb_keymap::XkbKeymap;

#[cfg(feature = "wayland")]
mod xkb_keymap {
    use super::{KeySymbolResolver, KeymapError, ModifierMasks};
    use crate::input::codes::XKB_KEYCODE_OFFSET;
    use memmap2::MmapOptions;
    use std::fs::File;
    use std::os::fd::OwnedFd;
    use xkbcommon::xkb;

    /// Compiled xkb keymap plus its lookup state.
    pub struct XkbKeymap {
        // declared first so it is released before the keymap
        state: xkb::State,
        _keymap: xkb::Keymap,
    }

    impl XkbKeymap {
        pub fn from_text(context: &xkb::Context, text: &str) -> Result<Self, KeymapError> {
            let keymap = xkb::Keymap::new_from_string(
                context,
                text.to_owned(),
                xkb::KEYMAP_FORMAT_TEXT_V1,
                xkb::KEYMAP_COMPILE_NO_FLAGS,
            )
            .ok_or(KeymapError::Compile)?;
            let state = xkb::State::new(&keymap);
            Ok(Self {
                state,
                _keymap: keymap,
            })
        }

        /// Compiles the keymap shared through `fd`. The mapping is released
        /// and the descriptor closed before this returns.
        pub fn from_fd(context: &xkb::Context, fd: OwnedFd, size: u32) -> Result<Self, KeymapError> {
            let file = File::from(fd);
            // SAFETY: the compositor hands out a read-only keymap it never truncates.
            let blob = unsafe { MmapOptions::new().len(size as usize).map(&file)? };
            let text_len = blob.iter().position(|b| *b == 0).unwrap_or(blob.len());
            let text = std::str::from_utf8(&blob[..text_len]).map_err(|_| KeymapError::Encoding)?;
            let keymap = Self::from_text(context, text);
            tracing::debug!(size, compiled = keymap.is_ok(), "Processed keymap blob");
            keymap
        }
    }

    impl KeySymbolResolver for XkbKeymap {
        fn key_utf32(&self, code: u32) -> u32 {
            self.state
                .key_get_utf32(xkb::Keycode::from(code + XKB_KEYCODE_OFFSET))
        }

        fn update_modifiers(&mut self, masks: ModifierMasks) {
            self.state
                .update_mask(masks.depressed, masks.latched, masks.locked, 0, 0, masks.group);
        }
    }

}
