//! Keyboard listener registry with scoped key-down hooks.
//!
//! [`KeyListeners`] is the session-wide event target: the front end turns
//! each key press into a [`KeyEvent`] and dispatches it there. A
//! [`KeyDownHook`] registers one listener for one key. Swapping its handler
//! with `rebind` does not re-register, and dropping the hook removes the
//! listener.

use std::sync::{Arc, Mutex};

use tracing::debug;

use tarjeta_core::keys::KeyBindings;
use tarjeta_core::types::NavAction;

/// A key press, named DOM-style (`"ArrowRight"`, `"f"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    key: String,
    default_prevented: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default_prevented: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Mark the event as handled so the front end skips its own default action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

type Listener = Arc<Mutex<dyn FnMut(&mut KeyEvent) + Send>>;
type Handler = Box<dyn FnMut(&KeyEvent) + Send>;
/// Empty only while the handler is running.
type HandlerSlot = Arc<Mutex<Option<Handler>>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Cloneable handle to the listener registry.
#[derive(Clone, Default)]
pub struct KeyListeners {
    inner: Arc<Mutex<Registry>>,
}

impl KeyListeners {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&self, listener: impl FnMut(&mut KeyEvent) + Send + 'static) -> u64 {
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        let listener: Listener = Arc::new(Mutex::new(listener));
        registry.listeners.push((id, listener));
        id
    }

    fn remove(&self, id: u64) {
        self.lock().listeners.retain(|(other, _)| *other != id);
    }

    /// Run every listener on `event`. Returns whether one prevented the default.
    pub fn dispatch(&self, event: &mut KeyEvent) -> bool {
        // Snapshot so listeners may add or drop hooks while running.
        let listeners: Vec<Listener> = self
            .lock()
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            if let Ok(mut guard) = listener.lock() {
                let listener = &mut *guard;
                listener(&mut *event);
            }
        }
        event.default_prevented()
    }

    pub fn len(&self) -> usize {
        self.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// One registered key-down listener. Removed from the registry on drop.
pub struct KeyDownHook {
    listeners: KeyListeners,
    id: u64,
    handler: HandlerSlot,
}

impl KeyDownHook {
    /// Listen for `key`: on a match, prevent the default and call `handler`.
    pub fn register(
        listeners: &KeyListeners,
        key: impl Into<String>,
        handler: impl FnMut(&KeyEvent) + Send + 'static,
    ) -> Self {
        let key = key.into();
        let handler: Handler = Box::new(handler);
        let handler: HandlerSlot = Arc::new(Mutex::new(Some(handler)));
        let slot = handler.clone();

        debug!("keys: listening for {key}");
        let id = listeners.add(move |event: &mut KeyEvent| {
            if event.key() != key {
                return;
            }
            event.prevent_default();
            // Run unlocked so the handler may rebind its own hook.
            let taken = slot.lock().ok().and_then(|mut guard| guard.take());
            if let Some(mut handler) = taken {
                handler(&*event);
                if let Ok(mut guard) = slot.lock() {
                    // A rebind during the call wins over the old handler.
                    guard.get_or_insert(handler);
                }
            }
        });

        Self {
            listeners: listeners.clone(),
            id,
            handler,
        }
    }

    /// Replace the handler. The registered listener stays the same.
    /// Safe to call from inside the handler being replaced.
    pub fn rebind(&self, handler: impl FnMut(&KeyEvent) + Send + 'static) {
        if let Ok(mut slot) = self.handler.lock() {
            *slot = Some(Box::new(handler));
        }
    }
}

impl Drop for KeyDownHook {
    fn drop(&mut self) {
        self.listeners.remove(self.id);
    }
}

/// Navigator key hooks: retreat and advance keys from [`KeyBindings`].
pub struct NavigationKeys {
    hooks: Vec<(NavAction, KeyDownHook)>,
}

impl NavigationKeys {
    pub fn register(
        listeners: &KeyListeners,
        bindings: &KeyBindings,
        on_action: impl Fn(NavAction) + Send + Clone + 'static,
    ) -> Self {
        let hooks = bindings
            .pairs()
            .into_iter()
            .map(|(key, action)| {
                let on_action = on_action.clone();
                let hook = KeyDownHook::register(listeners, key, move |_| on_action(action));
                (action, hook)
            })
            .collect();
        Self { hooks }
    }

    /// Point both keys at a new callback without re-registering.
    pub fn rebind(&self, on_action: impl Fn(NavAction) + Send + Clone + 'static) {
        for (action, hook) in &self.hooks {
            let action = *action;
            let on_action = on_action.clone();
            hook.rebind(move |_| on_action(action));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StudySession;
    use tarjeta_core::navigator::DeckNavigator;

    fn recorder() -> (Arc<Mutex<Vec<NavAction>>>, impl Fn(NavAction) + Send + Clone + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |action| sink.lock().unwrap().push(action))
    }

    #[test]
    fn matching_key_runs_handler_and_prevents_default() {
        let listeners = KeyListeners::new();
        let (seen, on_action) = recorder();
        let _keys = NavigationKeys::register(&listeners, &KeyBindings::default(), on_action);

        let mut event = KeyEvent::new("ArrowRight");
        assert!(listeners.dispatch(&mut event));
        let mut event = KeyEvent::new("ArrowLeft");
        assert!(listeners.dispatch(&mut event));

        assert_eq!(*seen.lock().unwrap(), vec![NavAction::Advance, NavAction::Retreat]);
    }

    #[test]
    fn other_keys_pass_through() {
        let listeners = KeyListeners::new();
        let (seen, on_action) = recorder();
        let _keys = NavigationKeys::register(&listeners, &KeyBindings::default(), on_action);

        let mut event = KeyEvent::new("Enter");
        assert!(!listeners.dispatch(&mut event));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn rebind_swaps_handler_without_reregistering() {
        let listeners = KeyListeners::new();
        let (first, on_first) = recorder();
        let (second, on_second) = recorder();
        let keys = NavigationKeys::register(&listeners, &KeyBindings::default(), on_first);
        assert_eq!(listeners.len(), 2);

        keys.rebind(on_second.clone());
        keys.rebind(on_second);
        assert_eq!(listeners.len(), 2);

        listeners.dispatch(&mut KeyEvent::new("ArrowRight"));
        assert!(first.lock().unwrap().is_empty());
        assert_eq!(*second.lock().unwrap(), vec![NavAction::Advance]);
    }

    #[test]
    fn dropping_hooks_removes_listeners() {
        let listeners = KeyListeners::new();
        let (seen, on_action) = recorder();
        let keys = NavigationKeys::register(&listeners, &KeyBindings::default(), on_action);
        drop(keys);

        assert!(listeners.is_empty());
        let mut event = KeyEvent::new("ArrowRight");
        assert!(!listeners.dispatch(&mut event));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn next_key_before_deck_loads_is_a_noop() {
        let session: Arc<Mutex<StudySession>> =
            Arc::new(Mutex::new(StudySession::new(DeckNavigator::seeded(1))));
        let listeners = KeyListeners::new();
        let target = session.clone();
        let _keys = NavigationKeys::register(&listeners, &KeyBindings::default(), move |action| {
            assert!(target.lock().unwrap().apply(action).is_none());
        });

        assert!(listeners.dispatch(&mut KeyEvent::new("ArrowRight")));
        let session = session.lock().unwrap();
        assert!(session.view().is_none());
        assert_eq!(session.navigator().history_len(), 0);
    }

    #[test]
    fn hook_can_be_dropped_from_inside_a_listener() {
        let listeners = KeyListeners::new();
        let holder: Arc<Mutex<Option<KeyDownHook>>> = Arc::new(Mutex::new(None));
        let slot = holder.clone();
        let hook = KeyDownHook::register(&listeners, "q", move |_| {
            slot.lock().unwrap().take();
        });
        *holder.lock().unwrap() = Some(hook);

        listeners.dispatch(&mut KeyEvent::new("q"));
        assert!(listeners.is_empty());
    }

    #[test]
    fn handler_can_rebind_its_own_hook() {
        let listeners = KeyListeners::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let holder: Arc<Mutex<Option<KeyDownHook>>> = Arc::new(Mutex::new(None));

        let (slot, first_seen) = (holder.clone(), seen.clone());
        let hook = KeyDownHook::register(&listeners, "f", move |_| {
            first_seen.lock().unwrap().push("first");
            let second_seen = first_seen.clone();
            if let Some(hook) = slot.lock().unwrap().as_ref() {
                hook.rebind(move |_| second_seen.lock().unwrap().push("second"));
            }
        });
        *holder.lock().unwrap() = Some(hook);

        listeners.dispatch(&mut KeyEvent::new("f"));
        listeners.dispatch(&mut KeyEvent::new("f"));
        listeners.dispatch(&mut KeyEvent::new("f"));

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "second"]);
        assert_eq!(listeners.len(), 1);
    }
}
