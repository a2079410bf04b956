//! Wraps the three host primitives with timed, instrumented replacements.
//!
//! Calling a wrapped op is behaviorally identical to calling the original -
//! same arguments, same return value, same side effects - except that a
//! [`CallRecord`] is published on the bus afterwards. Recording is skipped
//! entirely when:
//!
//! - the guard is paused (an analyzer or subscriber is running);
//! - a lookup carries an explicit context argument (scoped lookups are not
//!   analyzed; known limitation);
//! - the selector matches the report overlay's own namespace, so the overlay
//!   never analyzes itself.

use crate::bus::{EventBus, Message};
use crate::clock::Clock;
use crate::config::Config;
use crate::guard::InterceptGuard;
use crate::host::{Handler, HostOps, Matches};
use crate::record::CallRecord;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Identity-keyed map from an original handler to the timed wrapper that was
/// actually attached to the host. Unbinding by original reference must locate
/// the same wrapper instance, so the mapping is one-to-one and memoized.
#[derive(Default)]
struct HandlerWrappers {
    map: RefCell<HashMap<usize, Handler>>,
}

impl HandlerWrappers {
    /// The wrapper for `handler`, creating and memoizing it on first use.
    fn wrapper_for(
        &self,
        handler: &Handler,
        clock: Rc<dyn Clock>,
        slow_handler_ms: u64,
    ) -> Handler {
        if let Some(wrapper) = self.map.borrow().get(&handler.key()) {
            return wrapper.clone();
        }

        let original = handler.clone();
        let wrapper = Handler::new(move |event| {
            let started = clock.now_millis();
            original.call(event);
            let elapsed = clock.now_millis().saturating_sub(started);
            if elapsed > slow_handler_ms {
                eprintln!(
                    "query-perf: `{}` handler ran for {}ms",
                    event.event_type, elapsed
                );
            }
        });

        self.map
            .borrow_mut()
            .insert(handler.key(), wrapper.clone());
        wrapper
    }

    /// Look up an existing wrapper without creating one.
    fn existing(&self, handler: &Handler) -> Option<Handler> {
        self.map.borrow().get(&handler.key()).cloned()
    }
}

/// Builds instrumented replacements for a validated host op table.
pub struct Interceptor {
    guard: InterceptGuard,
    bus: Rc<EventBus>,
    clock: Rc<dyn Clock>,
    namespace: String,
    slow_handler_ms: u64,
}

impl Interceptor {
    pub fn new(guard: InterceptGuard, bus: Rc<EventBus>, clock: Rc<dyn Clock>, config: &Config) -> Self {
        Self {
            guard,
            bus,
            clock,
            namespace: config.report.namespace.clone(),
            slow_handler_ms: config.thresholds.slow_handler_ms,
        }
    }

    /// Wrap `originals`, returning the instrumented table the caller should
    /// substitute into the host. The originals are untouched and remain the
    /// restore point.
    pub fn wrap(&self, originals: &HostOps) -> HostOps {
        let wrappers = Rc::new(HandlerWrappers::default());

        HostOps {
            find: self.wrap_find(originals.find.clone()),
            bind: self.wrap_bind(originals.bind.clone(), Rc::clone(&wrappers)),
            unbind: self.wrap_unbind(originals.unbind.clone(), wrappers),
        }
    }

    fn wrap_find(&self, orig: crate::host::FindFn) -> crate::host::FindFn {
        let guard = self.guard.clone();
        let bus = Rc::clone(&self.bus);
        let clock = Rc::clone(&self.clock);
        let namespace = self.namespace.clone();

        Rc::new(move |selector: &str, context| {
            if guard.is_paused() || context.is_some() || selector.contains(namespace.as_str()) {
                return orig(selector, context);
            }

            let started = clock.now_millis();
            let result = orig(selector, context);
            let elapsed = clock.now_millis().saturating_sub(started);

            // publish() pauses the guard for the whole dispatch, so analyzers
            // may call host ops without recursing into instrumentation.
            bus.publish(&Message::SelectorObserved(CallRecord::selection(
                selector,
                result.len(),
                elapsed,
            )));

            result
        })
    }

    fn wrap_bind(
        &self,
        orig: crate::host::BindFn,
        wrappers: Rc<HandlerWrappers>,
    ) -> crate::host::BindFn {
        let guard = self.guard.clone();
        let bus = Rc::clone(&self.bus);
        let clock = Rc::clone(&self.clock);
        let namespace = self.namespace.clone();
        let slow_handler_ms = self.slow_handler_ms;

        Rc::new(move |target: &Matches, event_type: &str, handler: &Handler| {
            if guard.is_paused() || target.selector.contains(namespace.as_str()) {
                return orig(target, event_type, handler);
            }

            let wrapper = wrappers.wrapper_for(handler, Rc::clone(&clock), slow_handler_ms);

            let started = clock.now_millis();
            let result = orig(target, event_type, &wrapper);
            let elapsed = clock.now_millis().saturating_sub(started);

            bus.publish(&Message::BindingObserved(CallRecord::bind(
                target.selector.clone(),
                event_type,
                result.len(),
                elapsed,
            )));

            result
        })
    }

    fn wrap_unbind(
        &self,
        orig: crate::host::UnbindFn,
        wrappers: Rc<HandlerWrappers>,
    ) -> crate::host::UnbindFn {
        let guard = self.guard.clone();

        Rc::new(move |target: &Matches, event_type: &str, handler: Option<&Handler>| {
            if guard.is_paused() {
                return orig(target, event_type, handler);
            }

            // Translate the original reference to the wrapper that was
            // attached; a handler that was never wrapped passes through.
            match handler.and_then(|h| wrappers.existing(h)) {
                Some(wrapper) => orig(target, event_type, Some(&wrapper)),
                None => orig(target, event_type, handler),
            }
        })
    }
}
