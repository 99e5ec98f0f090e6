use crate::models::AuthState;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

pub type AuthCallback = Rc<dyn Fn(&AuthState)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchToken(u64);

#[derive(Default)]
struct WatcherInner {
    state: RefCell<Option<AuthState>>,
    next_token: Cell<u64>,
    observers: RefCell<BTreeMap<u64, AuthCallback>>,
}

/// Collapses identity-provider notifications into a two-state signal.
///
/// Observers get the current state immediately on `observe`, then one event
/// per real transition. Re-publishing the state already held is a no-op, so
/// a provider that repeats "signed in as U" never fans out duplicates.
#[derive(Clone, Default)]
pub struct SessionWatcher {
    inner: Rc<WatcherInner>,
}

impl SessionWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unauthenticated until the provider reports otherwise, including when
    /// the provider never initializes.
    pub fn current(&self) -> AuthState {
        self.inner
            .state
            .borrow()
            .clone()
            .unwrap_or(AuthState::Unauthenticated)
    }

    pub fn observe(&self, callback: AuthCallback) -> WatchToken {
        let token = self.inner.next_token.get() + 1;
        self.inner.next_token.set(token);
        self.inner
            .observers
            .borrow_mut()
            .insert(token, callback.clone());

        callback(&self.current());
        WatchToken(token)
    }

    pub fn unobserve(&self, token: WatchToken) {
        self.inner.observers.borrow_mut().remove(&token.0);
    }

    /// Returns whether observers were notified.
    pub fn publish(&self, next: AuthState) -> bool {
        if self.current() == next {
            // The very first report still counts as initialization.
            self.inner.state.borrow_mut().get_or_insert(next);
            return false;
        }

        log::debug!(
            "identity transition: {}",
            match &next {
                AuthState::Authenticated(identity) => identity.uid.as_str(),
                AuthState::Unauthenticated => "<signed out>",
            }
        );
        *self.inner.state.borrow_mut() = Some(next.clone());

        let observers: Vec<AuthCallback> =
            self.inner.observers.borrow().values().cloned().collect();
        for cb in observers {
            cb(&next);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;

    fn recorder(w: &SessionWatcher) -> (WatchToken, Rc<RefCell<Vec<AuthState>>>) {
        let seen = Rc::new(RefCell::new(vec![]));
        let seen2 = seen.clone();
        let token = w.observe(Rc::new(move |s: &AuthState| {
            seen2.borrow_mut().push(s.clone())
        }));
        (token, seen)
    }

    #[test]
    fn test_observe_delivers_initial_state() {
        let w = SessionWatcher::new();
        let (_t, seen) = recorder(&w);
        assert_eq!(seen.borrow().as_slice(), &[AuthState::Unauthenticated]);
    }

    #[test]
    fn test_duplicate_publish_is_suppressed() {
        let w = SessionWatcher::new();
        let (_t, seen) = recorder(&w);
        let u = AuthState::Authenticated(Identity::new("u1"));

        assert!(w.publish(u.clone()));
        assert!(!w.publish(u.clone()));
        assert!(w.publish(AuthState::Unauthenticated));
        assert!(!w.publish(AuthState::Unauthenticated));

        assert_eq!(
            seen.borrow().as_slice(),
            &[AuthState::Unauthenticated, u, AuthState::Unauthenticated]
        );
    }

    #[test]
    fn test_initial_unauthenticated_report_is_not_a_transition() {
        let w = SessionWatcher::new();
        let (_t, seen) = recorder(&w);
        assert!(!w.publish(AuthState::Unauthenticated));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_late_observer_sees_current_identity() {
        let w = SessionWatcher::new();
        let u = AuthState::Authenticated(Identity::new("u1"));
        w.publish(u.clone());
        let (_t, seen) = recorder(&w);
        assert_eq!(seen.borrow().as_slice(), &[u]);
    }

    #[test]
    fn test_unobserve_stops_events() {
        let w = SessionWatcher::new();
        let (t, seen) = recorder(&w);
        w.unobserve(t);
        w.publish(AuthState::Authenticated(Identity::new("u1")));
        assert_eq!(seen.borrow().len(), 1);
    }
}
