//! Event handler registration and dispatch.
//!
//! The registry owns two keyed tables, command-name handlers and reply-code
//! handlers, and invokes at most one handler per dispatched event.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::event::{Event, EventKind};

/// A registered event handler.
pub type HandlerFn = Box<dyn Fn(&Event) + Send + Sync>;

/// Keyed dispatch tables for decoded events.
///
/// Registration may overlap with an active dispatch loop; the tables sit
/// behind read-write locks. A handler must not register handlers from
/// within its own invocation (the read lock is held across the call).
#[derive(Default)]
pub struct HandlerRegistry {
    commands: RwLock<HashMap<String, HandlerFn>>,
    replies: RwLock<HashMap<i32, HandlerFn>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a named command, replacing any previous one.
    pub fn on_command<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.commands
            .write()
            .expect("command handler table poisoned")
            .insert(name.into(), Box::new(handler));
    }

    /// Register a handler for a numeric reply code, replacing any previous
    /// one.
    pub fn on_reply<F>(&self, code: i32, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.replies
            .write()
            .expect("reply handler table poisoned")
            .insert(code, Box::new(handler));
    }

    /// Invoke the handler registered for this event, if any.
    ///
    /// Returns whether a handler ran.
    pub fn dispatch(&self, event: &Event) -> bool {
        match &event.kind {
            EventKind::Command(name) => {
                let table = self.commands.read().expect("command handler table poisoned");
                match table.get(name) {
                    Some(handler) => {
                        handler(event);
                        true
                    }
                    None => false,
                }
            }
            EventKind::Reply(code) => {
                let table = self.replies.read().expect("reply handler table poisoned");
                match table.get(code) {
                    Some(handler) => {
                        handler(event);
                        true
                    }
                    None => false,
                }
            }
        }
    }
}
