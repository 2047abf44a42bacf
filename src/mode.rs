//! Ruthless mode: one UI-wide boolean.
//!
//! A [`ModeProvider`] owns the value for a UI scope. Consumers are built
//! from the provider and receive a [`RuthlessMode`] handle, so there is no
//! way to construct a consumer without one. A handle read after its
//! provider is gone panics: that is a wiring bug, not a recoverable state.

use std::cell::Cell;
use std::rc::{Rc, Weak};

/// Owner of the mode value for one UI scope.
#[derive(Debug, Default)]
pub struct ModeProvider {
    enabled: Rc<Cell<bool>>,
}

impl ModeProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Rc::new(Cell::new(enabled)),
        }
    }

    /// Hand out a handle for a consumer in this scope.
    pub fn handle(&self) -> RuthlessMode {
        RuthlessMode {
            enabled: Rc::downgrade(&self.enabled),
        }
    }
}

/// A consumer's view of the mode. Clones observe the same value.
#[derive(Debug, Clone)]
pub struct RuthlessMode {
    enabled: Weak<Cell<bool>>,
}

impl RuthlessMode {
    fn cell(&self) -> Rc<Cell<bool>> {
        self.enabled
            .upgrade()
            .unwrap_or_else(|| panic!("RuthlessMode used outside of its ModeProvider scope"))
    }

    pub fn is_enabled(&self) -> bool {
        self.cell().get()
    }

    /// Flip the mode. Returns the new value.
    pub fn toggle(&self) -> bool {
        let cell = self.cell();
        let enabled = !cell.get();
        cell.set(enabled);
        log::debug!("Ruthless mode {}", if enabled { "on" } else { "off" });
        enabled
    }

    pub fn set(&self, enabled: bool) {
        self.cell().set(enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::ModeProvider;

    #[test]
    fn starts_with_provided_value() {
        assert!(!ModeProvider::default().handle().is_enabled());
        assert!(ModeProvider::new(true).handle().is_enabled());
    }

    #[test]
    fn handles_share_one_value() {
        let provider = ModeProvider::new(false);
        let nav = provider.handle();
        let card = provider.handle();

        assert!(nav.toggle());
        assert!(card.is_enabled());
        assert!(!card.toggle());
        assert!(!nav.is_enabled());

        nav.set(true);
        assert!(card.clone().is_enabled());
    }

    #[test]
    #[should_panic(expected = "outside of its ModeProvider scope")]
    fn reading_after_scope_ends_panics() {
        let provider = ModeProvider::new(true);
        let handle = provider.handle();
        drop(provider);
        handle.is_enabled();
    }
}
