//! Process-wide instrumentation lifecycle.
//!
//! One [`InstrumentationContext`] owns the guard, the bus, the analyzer
//! registry, the aggregator, and the warning sink, and hands out the
//! instrumented op table the caller substitutes into the host. `shutdown`
//! returns the original unwrapped ops, which are the restore point.

use crate::aggregate::{AggregateRow, Aggregator, SortKey};
use crate::analyzers::{AnalyzerRegistry, Warning};
use crate::bus::{EventBus, Message, Topic};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::guard::InterceptGuard;
use crate::host::{HostHooks, HostOps};
use crate::interceptor::Interceptor;
use crate::reporter::Report;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub struct InstrumentationContext {
    ops: HostOps,
    originals: HostOps,
    guard: InterceptGuard,
    registry: Rc<RefCell<AnalyzerRegistry>>,
    aggregator: Rc<RefCell<Aggregator>>,
    warnings: Rc<RefCell<Vec<Warning>>>,
    bus: Rc<EventBus>,
    top_n: usize,
    dom_pass_done: Cell<bool>,
}

impl InstrumentationContext {
    /// Set up instrumentation over the caller-supplied host primitives.
    ///
    /// Fails with [`Error::MissingOperation`](crate::Error::MissingOperation)
    /// if any primitive is absent.
    pub fn init(hooks: HostHooks, config: Config) -> Result<Self> {
        Self::init_with_clock(hooks, config, Rc::new(SystemClock::new()))
    }

    /// Like [`init`](Self::init) with an explicit clock; replay and tests
    /// supply a manual one.
    pub fn init_with_clock(
        hooks: HostHooks,
        config: Config,
        clock: Rc<dyn Clock>,
    ) -> Result<Self> {
        let originals = hooks.into_ops()?;

        let guard = InterceptGuard::new();
        let bus = Rc::new(EventBus::new(guard.clone()));
        let registry = Rc::new(RefCell::new(AnalyzerRegistry::with_defaults(&config)));
        let aggregator = Rc::new(RefCell::new(Aggregator::new()));
        let warnings = Rc::new(RefCell::new(Vec::new()));

        // Observed calls fan out to the registry; its findings come back over
        // the bus as Warning messages. Weak reference, or the bus would own a
        // subscriber that owns the bus.
        let registry_sub = Rc::clone(&registry);
        let bus_weak = Rc::downgrade(&bus);
        let dispatch = move |message: &Message| {
            let record = match message {
                Message::SelectorObserved(record) | Message::BindingObserved(record) => record,
                Message::Warning(_) => return,
            };
            let findings = registry_sub.borrow_mut().dispatch(record);
            if let Some(bus) = bus_weak.upgrade() {
                for warning in findings {
                    bus.publish(&Message::Warning(warning));
                }
            }
        };
        bus.subscribe(Topic::SelectorObserved, dispatch.clone());
        bus.subscribe(Topic::BindingObserved, dispatch);

        // Observed calls also fold into the aggregate tables.
        let aggregator_sub = Rc::clone(&aggregator);
        let fold = move |message: &Message| match message {
            Message::SelectorObserved(record) => aggregator_sub
                .borrow_mut()
                .record_selector(&record.selector, record.duration_ms),
            Message::BindingObserved(record) => {
                let event_type = record.event_type.as_deref().unwrap_or("");
                aggregator_sub.borrow_mut().record_binding(
                    &record.selector,
                    event_type,
                    record.duration_ms,
                )
            }
            Message::Warning(_) => {}
        };
        bus.subscribe(Topic::SelectorObserved, fold.clone());
        bus.subscribe(Topic::BindingObserved, fold);

        // Warning sink for the report.
        let warnings_sub = Rc::clone(&warnings);
        bus.subscribe(Topic::Warning, move |message| {
            if let Message::Warning(warning) = message {
                warnings_sub.borrow_mut().push(warning.clone());
            }
        });

        let interceptor = Interceptor::new(guard.clone(), Rc::clone(&bus), clock, &config);
        let ops = interceptor.wrap(&originals);

        Ok(Self {
            ops,
            originals,
            guard,
            registry,
            aggregator,
            warnings,
            bus,
            top_n: config.report.top_n,
            dom_pass_done: Cell::new(false),
        })
    }

    /// The instrumented op table to substitute into the host.
    pub fn ops(&self) -> &HostOps {
        &self.ops
    }

    /// Subscribe an external consumer (the report renderer) to a topic.
    pub fn subscribe(&self, topic: Topic, handler: impl Fn(&Message) + 'static) {
        self.bus.subscribe(topic, handler);
    }

    /// Register an extra analyzer beyond the built-ins. Append-only.
    pub fn registry(&self) -> &Rc<RefCell<AnalyzerRegistry>> {
        &self.registry
    }

    /// Run the one-shot DOM analyzers. Call once, after the document is
    /// fully loaded; later calls are no-ops.
    pub fn run_dom_analysis(&self) {
        if self.dom_pass_done.replace(true) {
            return;
        }

        // DOM analyzers query the document through the original ops, with
        // interception paused for the whole pass.
        let _pause = self.guard.pause();
        let findings = self
            .registry
            .borrow_mut()
            .run_dom_analyzers(&self.originals);
        for warning in findings {
            self.bus.publish(&Message::Warning(warning));
        }
    }

    /// Change the selector table's sort column; renderer column clicks land
    /// here. Re-selecting the active column reverses the order.
    pub fn sort_selectors_by(&self, key: SortKey) {
        self.aggregator.borrow_mut().sort_selectors_by(key);
    }

    /// Change the handler table's sort column.
    pub fn sort_handlers_by(&self, key: SortKey) {
        self.aggregator.borrow_mut().sort_handlers_by(key);
    }

    /// All warnings produced so far.
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.borrow().clone()
    }

    /// Top rows of the selector ranking at the configured depth.
    pub fn top_selectors(&self) -> Vec<AggregateRow> {
        self.aggregator.borrow().top_selectors(self.top_n)
    }

    /// Top rows of the handler ranking at the configured depth.
    pub fn top_handlers(&self) -> Vec<AggregateRow> {
        self.aggregator.borrow().top_handlers(self.top_n)
    }

    /// Snapshot warnings and both ranked tables.
    pub fn report(&self) -> Report {
        Report {
            warnings: self.warnings(),
            selectors: self.top_selectors(),
            handlers: self.top_handlers(),
        }
    }

    /// Tear down instrumentation, returning the original unwrapped ops so
    /// the caller can restore them in the host.
    pub fn shutdown(self) -> HostOps {
        self.originals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::host::Matches;

    fn static_hooks(matched: usize) -> HostHooks {
        HostHooks {
            find: Some(Rc::new(move |selector: &str, _| {
                Matches::new(selector, (0..matched as u64).collect())
            })),
            bind: Some(Rc::new(|target: &Matches, _, _| target.clone())),
            unbind: Some(Rc::new(|target: &Matches, _, _| target.clone())),
        }
    }

    #[test]
    fn test_init_requires_all_ops() {
        let mut hooks = static_hooks(0);
        hooks.bind = None;
        assert!(InstrumentationContext::init(hooks, Config::default()).is_err());
    }

    #[test]
    fn test_lookup_flows_to_warnings_and_aggregates() {
        let ctx = InstrumentationContext::init_with_clock(
            static_hooks(4),
            Config::default(),
            Rc::new(ManualClock::new()),
        )
        .unwrap();

        ctx.ops().find("#bar .baz", None);

        let warnings = ctx.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("#bar"));
        assert!(warnings[0].message.contains(".baz"));

        let rows = ctx.top_selectors();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "#bar .baz");
        assert_eq!(rows[0].calls, 1);
    }

    #[test]
    fn test_dom_analysis_runs_once() {
        let hooks = static_hooks(1); // submit-control query matches
        let ctx = InstrumentationContext::init_with_clock(
            hooks,
            Config::default(),
            Rc::new(ManualClock::new()),
        )
        .unwrap();

        ctx.run_dom_analysis();
        ctx.run_dom_analysis();

        let dom_warnings: Vec<_> = ctx
            .warnings()
            .into_iter()
            .filter(|w| w.kind == crate::analyzers::WarningKind::Dom)
            .collect();
        assert_eq!(dom_warnings.len(), 1);

        // The DOM pass itself must not pollute the aggregates.
        assert!(ctx.top_selectors().is_empty());
    }

    #[test]
    fn test_shutdown_returns_unwrapped_ops() {
        let ctx = InstrumentationContext::init_with_clock(
            static_hooks(3),
            Config::default(),
            Rc::new(ManualClock::new()),
        )
        .unwrap();
        ctx.ops().find(".foo", None);
        assert_eq!(ctx.top_selectors().len(), 1);

        let restored = ctx.shutdown();
        // The restored table is the bare host: calling it is side-effect free
        // as far as instrumentation goes.
        let result = restored.find(".foo", None);
        assert_eq!(result.len(), 3);
    }
}
