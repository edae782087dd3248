use std::sync::mpsc::{Receiver, TryRecvError};

use crate::session::{UserLookup, UserProfile};

/// Resolution state for one reference node. A slot fires exactly one
/// lookup per identifier: resolved profiles are cached for the slot's
/// lifetime, a failed or empty lookup parks the slot in `Raw` for good
/// (no retry, no error surfaced), and only an identifier change re-fetches.
pub enum RefState {
    Pending(Receiver<Option<UserProfile>>),
    Resolved(UserProfile),
    Raw,
}

pub struct ReferenceSlot {
    ident: String,
    state: RefState,
}

impl ReferenceSlot {
    pub fn new(ident: impl Into<String>, lookup: &dyn UserLookup) -> Self {
        let ident = ident.into();
        let state = RefState::Pending(lookup.lookup(ident.as_str()));
        Self { ident, state }
    }

    pub fn ident(&self) -> &str {
        self.ident.as_str()
    }

    /// Re-fetches if the identifier changed; otherwise leaves the slot
    /// (and its cached profile) alone.
    pub fn refresh(&mut self, ident: &str, lookup: &dyn UserLookup) {
        if self.ident == ident {
            return;
        }
        *self = Self::new(ident, lookup);
    }

    /// Drains the pending lookup, if any. Returns true when the visible
    /// state changed.
    pub fn poll(&mut self) -> bool {
        let RefState::Pending(receiver) = &self.state else {
            return false;
        };
        match receiver.try_recv() {
            Ok(Some(profile)) => {
                self.state = RefState::Resolved(profile);
                true
            }
            Ok(None) | Err(TryRecvError::Disconnected) => {
                self.state = RefState::Raw;
                true
            }
            Err(TryRecvError::Empty) => false,
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match &self.state {
            RefState::Resolved(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, RefState::Resolved(_))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::mpsc::{Receiver, Sender, channel};

    use super::ReferenceSlot;
    use crate::session::{UserLookup, UserProfile};

    /// Lookup whose answers are delivered by hand from the test body.
    struct ManualLookup {
        senders: Mutex<HashMap<String, Vec<Sender<Option<UserProfile>>>>>,
    }

    impl ManualLookup {
        fn new() -> Self {
            Self {
                senders: Mutex::new(HashMap::new()),
            }
        }

        fn resolve(&self, id: &str, profile: Option<UserProfile>) {
            let mut senders = self.senders.lock().expect("lock");
            if let Some(list) = senders.get_mut(id) {
                for sender in list.drain(..) {
                    let _ = sender.send(profile.clone());
                }
            }
        }

        fn drop_pending(&self, id: &str) {
            self.senders.lock().expect("lock").remove(id);
        }
    }

    impl UserLookup for ManualLookup {
        fn lookup(&self, id: &str) -> Receiver<Option<UserProfile>> {
            let (sender, receiver) = channel();
            self.senders
                .lock()
                .expect("lock")
                .entry(id.to_string())
                .or_default()
                .push(sender);
            receiver
        }
    }

    #[test]
    fn resolution_upgrades_once_and_caches() {
        let lookup = ManualLookup::new();
        let mut slot = ReferenceSlot::new("u1", &lookup);
        assert!(!slot.poll());
        assert!(slot.profile().is_none());

        lookup.resolve("u1", Some(UserProfile::new("u1", "human")));
        assert!(slot.poll());
        assert_eq!(slot.profile().map(|p| p.kind.as_str()), Some("human"));
        // settled; nothing more to drain
        assert!(!slot.poll());
    }

    #[test]
    fn dropped_lookup_degrades_to_raw_forever() {
        let lookup = ManualLookup::new();
        let mut slot = ReferenceSlot::new("u2", &lookup);
        lookup.drop_pending("u2");
        assert!(slot.poll());
        assert!(!slot.is_resolved());
        assert!(!slot.poll());
    }

    #[test]
    fn identifier_change_refetches() {
        let lookup = ManualLookup::new();
        let mut slot = ReferenceSlot::new("u1", &lookup);
        lookup.resolve("u1", Some(UserProfile::new("u1", "human")));
        slot.poll();

        slot.refresh("u1", &lookup);
        assert!(slot.is_resolved());

        slot.refresh("u9", &lookup);
        assert!(!slot.is_resolved());
        lookup.resolve("u9", Some(UserProfile::new("u9", "bot")));
        assert!(slot.poll());
        assert_eq!(slot.profile().map(|p| p.id.as_str()), Some("u9"));
    }
}
