use crate::events::KeyModifiers;

/// Pointer and modifier state mutated by every native input event.
///
/// Only the dispatch thread touches it, so there is no locking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub last_x: i32,
    pub last_y: i32,
    /// Press latch: a recognised pointer button is held.
    pub pressed: bool,
    pub modifiers: KeyModifiers,
}

impl InputState {
    pub fn position(&self) -> (i32, i32) {
        (self.last_x, self.last_y)
    }

    /// Surface-local coordinates truncate toward zero, like `wl_fixed_to_int`.
    pub(crate) fn move_to(&mut self, x: f64, y: f64) {
        self.last_x = x as i32;
        self.last_y = y as i32;
    }

    pub(crate) fn set_modifier(&mut self, modifier: KeyModifiers, held: bool) {
        self.modifiers.set(modifier, held);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_truncates_toward_zero() {
        let mut state = InputState::default();
        state.move_to(10.9, -3.7);
        assert_eq!(state.position(), (10, -3));
    }

    #[test]
    fn modifiers_accumulate() {
        let mut state = InputState::default();
        state.set_modifier(KeyModifiers::SHIFT, true);
        state.set_modifier(KeyModifiers::CTRL, true);
        state.set_modifier(KeyModifiers::SHIFT, false);
        assert_eq!(state.modifiers, KeyModifiers::CTRL);
    }
}
