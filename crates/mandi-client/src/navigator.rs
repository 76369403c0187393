//! # Navigation
//!
//! The client decides *when* the user should move (a 401 means "go log
//! in", a placed order means "go to your orders"); the presentation layer
//! decides *how*. [`Navigator`] is the seam between the two.

use std::sync::{Mutex, PoisonError};

/// Places the client can send the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// The login page. Sent on 401/403 and forced logout.
    Login,
    /// The order list. Sent after a successful checkout.
    Orders,
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::Login => write!(f, "/login"),
            Destination::Orders => write!(f, "/orders"),
        }
    }
}

/// Implemented by the presentation layer.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: Destination);
}

/// Navigator that ignores every request.
pub struct NoOpNavigator;

impl Navigator for NoOpNavigator {
    fn navigate(&self, _destination: Destination) {}
}

/// Navigator that remembers where it was sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<Destination>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every destination so far, oldest first.
    pub fn visits(&self) -> Vec<Destination> {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<Destination> {
        self.visits().last().copied()
    }

    pub fn was_sent_to(&self, destination: Destination) -> bool {
        self.visits().contains(&destination)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, destination: Destination) {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(destination);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_navigator() {
        let nav = RecordingNavigator::new();
        assert_eq!(nav.last(), None);

        nav.navigate(Destination::Login);
        nav.navigate(Destination::Orders);

        assert_eq!(nav.visits(), vec![Destination::Login, Destination::Orders]);
        assert!(nav.was_sent_to(Destination::Login));
        assert_eq!(Destination::Orders.to_string(), "/orders");
    }
}
