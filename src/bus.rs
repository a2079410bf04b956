//! Typed publish/subscribe channel between the interceptor and its consumers.
//!
//! Messages are a closed tagged set; dispatch is synchronous and runs
//! subscribers in registration order. There is no cancellation and no error
//! isolation between subscribers - a panicking subscriber aborts the rest of
//! the dispatch, which is acceptable for in-process diagnostic tooling.
//!
//! Publishing runs under the shared [`InterceptGuard`](crate::guard::InterceptGuard):
//! subscribers routinely touch the host (the report renderer manipulates the
//! document) and must not be re-instrumented while they do.

use crate::analyzers::Warning;
use crate::guard::InterceptGuard;
use crate::record::CallRecord;
use std::cell::RefCell;
use std::collections::HashMap;

/// A message delivered over the bus.
#[derive(Debug, Clone)]
pub enum Message {
    /// An element lookup completed.
    SelectorObserved(CallRecord),
    /// An event-handler binding completed.
    BindingObserved(CallRecord),
    /// An analyzer produced a finding.
    Warning(Warning),
}

impl Message {
    pub fn topic(&self) -> Topic {
        match self {
            Message::SelectorObserved(_) => Topic::SelectorObserved,
            Message::BindingObserved(_) => Topic::BindingObserved,
            Message::Warning(_) => Topic::Warning,
        }
    }
}

/// Subscription key; one per message variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    SelectorObserved,
    BindingObserved,
    Warning,
}

type Subscriber = Box<dyn Fn(&Message)>;

/// Minimal synchronous pub/sub bus.
///
/// Subscription is append-only and expected to happen at setup time;
/// subscribing from inside a running dispatch is not supported.
pub struct EventBus {
    subscribers: RefCell<HashMap<Topic, Vec<Subscriber>>>,
    guard: InterceptGuard,
}

impl EventBus {
    pub fn new(guard: InterceptGuard) -> Self {
        Self {
            subscribers: RefCell::new(HashMap::new()),
            guard,
        }
    }

    /// Register `handler` for `topic`, after any existing subscribers.
    pub fn subscribe(&self, topic: Topic, handler: impl Fn(&Message) + 'static) {
        self.subscribers
            .borrow_mut()
            .entry(topic)
            .or_default()
            .push(Box::new(handler));
    }

    /// Invoke every subscriber for the message's topic, in registration
    /// order, with interception paused for the whole dispatch.
    pub fn publish(&self, message: &Message) {
        let _pause = self.guard.pause();
        let subscribers = self.subscribers.borrow();
        if let Some(list) = subscribers.get(&message.topic()) {
            for subscriber in list {
                subscriber(message);
            }
        }
    }
}
