//! The dispatch registry: event kind to interested triggers.

use std::{collections::HashMap, sync::Arc};

use config::Trigger;
use parking_lot::Mutex;
use tracing::trace;
use winwatch_protocol::EventKind;
use winwatch_world::{EntityRef, EventSink};

/// Receiver of matched triggers. The production implementation is the
/// script launcher; tests substitute a recorder.
pub trait TriggerHandler: Send + Sync {
    /// Invoked once per `(trigger, entity)` match.
    fn on_match(&self, trigger: &Trigger, entity: &EntityRef);
}

/// Routes published events to triggers registered for their kind whose
/// match name equals the firing entity's current display name exactly.
pub struct EventBus {
    handler: Arc<dyn TriggerHandler>,
    triggers: Mutex<HashMap<EventKind, Vec<Trigger>>>,
}

impl EventBus {
    /// Create a bus dispatching matches to `handler`.
    pub fn new(handler: Arc<dyn TriggerHandler>) -> Self {
        Self {
            handler,
            triggers: Mutex::new(HashMap::new()),
        }
    }

    /// Register one trigger under its event kind.
    pub fn add_trigger(&self, trigger: Trigger) {
        self.triggers
            .lock()
            .entry(trigger.event)
            .or_default()
            .push(trigger);
    }

    /// Unregister everything and re-register from scratch. Used when the
    /// user edits the trigger list live.
    pub fn reset_associations(&self, triggers: Vec<Trigger>) {
        let mut map = self.triggers.lock();
        map.clear();
        for trigger in triggers {
            map.entry(trigger.event).or_default().push(trigger);
        }
    }

    /// Snapshot of all registered triggers, for the persistence round-trip.
    pub fn triggers(&self) -> Vec<Trigger> {
        self.triggers.lock().values().flatten().cloned().collect()
    }
}

impl EventSink for EventBus {
    fn wants(&self, kind: EventKind) -> bool {
        self.triggers.lock().get(&kind).is_some_and(|v| !v.is_empty())
    }

    fn publish(&self, entity: EntityRef, kind: EventKind) {
        // Clone the matches out so handlers run without holding the lock;
        // a handler may add or reset triggers.
        let matched: Vec<Trigger> = {
            let map = self.triggers.lock();
            match map.get(&kind) {
                Some(triggers) => triggers
                    .iter()
                    .filter(|t| t.match_name == entity.name())
                    .cloned()
                    .collect(),
                None => Vec::new(),
            }
        };
        if matched.is_empty() {
            return;
        }
        trace!(kind = %kind, name = %entity.name(), matches = matched.len(), "dispatching event");
        for trigger in &matched {
            self.handler.on_match(trigger, &entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use winwatch_world::{ProcessState, WindowSummary};

    use super::*;

    #[derive(Default)]
    struct Recorder {
        matches: Mutex<Vec<(String, EventKind, String)>>,
    }

    impl TriggerHandler for Recorder {
        fn on_match(&self, trigger: &Trigger, entity: &EntityRef) {
            self.matches.lock().push((
                trigger.script.display().to_string(),
                trigger.event,
                entity.name().to_string(),
            ));
        }
    }

    fn window(title: &str) -> EntityRef {
        EntityRef::Window(WindowSummary {
            handle: winwatch_world::WindowHandle(1),
            title: title.to_string(),
        })
    }

    #[test]
    fn publish_matches_by_exact_name() {
        let recorder = Arc::new(Recorder::default());
        let bus = EventBus::new(recorder.clone());
        bus.add_trigger(Trigger::new(
            "/s/a.exe",
            "Notepad",
            EventKind::WindowOpen,
        ));

        bus.publish(window("Notepad"), EventKind::WindowOpen);
        bus.publish(window("notepad"), EventKind::WindowOpen); // case matters
        bus.publish(window("Notepad"), EventKind::WindowClose); // wrong kind

        let matches = recorder.matches.lock();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].2, "Notepad");
    }

    #[test]
    fn multiple_triggers_share_a_kind() {
        let recorder = Arc::new(Recorder::default());
        let bus = EventBus::new(recorder.clone());
        bus.add_trigger(Trigger::new("/s/a.exe", "calc", EventKind::ProcessStart));
        bus.add_trigger(Trigger::new("/s/b.exe", "calc", EventKind::ProcessStart));
        bus.add_trigger(Trigger::new("/s/c.exe", "other", EventKind::ProcessStart));

        bus.publish(
            EntityRef::Process(ProcessState {
                pid: 1,
                name: "calc".to_string(),
            }),
            EventKind::ProcessStart,
        );

        let matches = recorder.matches.lock();
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn wants_reflects_registered_kinds() {
        let bus = EventBus::new(Arc::new(Recorder::default()));
        assert!(!bus.wants(EventKind::WindowOpen));
        bus.add_trigger(Trigger::new("/s/a.exe", "x", EventKind::WindowOpen));
        assert!(bus.wants(EventKind::WindowOpen));
        assert!(!bus.wants(EventKind::WindowClose));
    }

    #[test]
    fn reset_associations_replaces_everything() {
        let recorder = Arc::new(Recorder::default());
        let bus = EventBus::new(recorder.clone());
        bus.add_trigger(Trigger::new("/s/a.exe", "x", EventKind::WindowOpen));
        bus.reset_associations(vec![Trigger::new(
            "/s/b.exe",
            "x",
            EventKind::WindowClose,
        )]);

        assert!(!bus.wants(EventKind::WindowOpen));
        bus.publish(window("x"), EventKind::WindowOpen);
        bus.publish(window("x"), EventKind::WindowClose);

        let matches = recorder.matches.lock();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].1, EventKind::WindowClose);

        let snapshot = bus.triggers();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].script.display().to_string(), "/s/b.exe");
    }
}
