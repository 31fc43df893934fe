//! Hook dispatch
//!
//! Resolves a list of hook references against the registry and runs them in
//! list order. A reference that does not resolve is reported and skipped;
//! the next reference still runs. What happens when a resolved hook fails is
//! governed by [`FailurePolicy`].

use super::registry::HookRegistry;
use crate::report;
use velcro_config::Settings;
use velcro_core::{Error, Result};

/// What to do when a hook body or task body fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failing hook and skip everything after it,
    /// including post-hooks when the task body fails
    #[default]
    FailFast,
    /// Report failing hooks and keep going; post-hooks run even when the
    /// task body fails
    BestEffort,
}

/// Outcome of one dispatch call
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// References that were invoked and returned successfully, in order
    pub invoked: Vec<String>,
    /// Reported failures, in order
    pub failures: Vec<Error>,
}

impl DispatchReport {
    /// Check if every reference ran successfully
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs hook lists against a registry
#[derive(Debug, Clone, Copy)]
pub struct HookDispatcher<'a> {
    registry: &'a HookRegistry,
    policy: FailurePolicy,
}

impl<'a> HookDispatcher<'a> {
    /// Create a fail-fast dispatcher
    pub fn new(registry: &'a HookRegistry) -> Self {
        Self {
            registry,
            policy: FailurePolicy::FailFast,
        }
    }

    /// Set the failure policy
    #[must_use]
    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run hooks in order
    ///
    /// Resolution failures never escape. Under [`FailurePolicy::FailFast`]
    /// an error returned by a hook body is returned unchanged and the rest
    /// of the list is skipped.
    pub fn dispatch<S: AsRef<str>>(&self, settings: &Settings, references: &[S]) -> Result<DispatchReport> {
        let mut outcome = DispatchReport::default();

        for reference in references {
            let reference = reference.as_ref().trim();
            if reference.is_empty() {
                continue;
            }

            let hook = match self.registry.resolve(reference) {
                Ok(hook) => hook,
                Err(e) if e.is_hook_resolution() => {
                    tracing::debug!(hook = %reference, "Skipping unresolved hook");
                    report::error(&e);
                    outcome.failures.push(e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            report::hook(reference);
            match hook(settings) {
                Ok(()) => outcome.invoked.push(reference.to_string()),
                Err(e) => match self.policy {
                    FailurePolicy::FailFast => {
                        tracing::debug!(hook = %reference, error = %e, "Hook failed");
                        return Err(e);
                    }
                    FailurePolicy::BestEffort => {
                        let e = Error::HookFailed {
                            reference: reference.to_string(),
                            message: e.to_string(),
                        };
                        tracing::debug!(hook = %reference, "Hook failed but continuing");
                        report::error(&e);
                        outcome.failures.push(e);
                    }
                },
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use velcro_config::OverrideStore;

    type CallLog = Rc<RefCell<Vec<&'static str>>>;

    fn recording(registry: &mut HookRegistry, reference: &str, label: &'static str, log: &CallLog) {
        let log = Rc::clone(log);
        registry
            .register(reference, move |_| {
                log.borrow_mut().push(label);
                Ok(())
            })
            .unwrap();
    }

    fn failing(registry: &mut HookRegistry, reference: &str) {
        registry
            .register(reference, |_| Err(Error::Message("boom".to_string())))
            .unwrap();
    }

    fn settings() -> Settings {
        Settings::new(OverrideStore::new())
    }

    #[test]
    fn test_missing_function_does_not_stop_dispatch() {
        let log = CallLog::default();
        let mut registry = HookRegistry::new();
        recording(&mut registry, "pkg.a:f", "a.f", &log);
        recording(&mut registry, "pkg.b:other", "b.other", &log);

        let report = HookDispatcher::new(&registry)
            .dispatch(&settings(), &["pkg.a:f", "pkg.b:missing"])
            .unwrap();

        assert_eq!(*log.borrow(), vec!["a.f"]);
        assert_eq!(report.invoked, vec!["pkg.a:f"]);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            &report.failures[0],
            Error::HookResolution { reference, .. } if reference == "pkg.b:missing"
        ));
    }

    #[test]
    fn test_hooks_run_in_list_order() {
        let log = CallLog::default();
        let mut registry = HookRegistry::new();
        recording(&mut registry, "m.one", "one", &log);
        recording(&mut registry, "m.two", "two", &log);
        recording(&mut registry, "m.three", "three", &log);

        HookDispatcher::new(&registry)
            .dispatch(&settings(), &["m.three", "m.one", "m.two", "m.one"])
            .unwrap();

        assert_eq!(*log.borrow(), vec!["three", "one", "two", "one"]);
    }

    #[test]
    fn test_unresolvable_references_all_reported() {
        let log = CallLog::default();
        let mut registry = HookRegistry::new();
        recording(&mut registry, "m.ok", "ok", &log);
        registry.register_value("m.CONST", 3).unwrap();

        let report = HookDispatcher::new(&registry)
            .dispatch(&settings(), &["bad", "x.y", "m.CONST", "m.ok"])
            .unwrap();

        assert_eq!(*log.borrow(), vec!["ok"]);
        assert_eq!(report.failures.len(), 3);
        assert!(matches!(report.failures[2], Error::HookNotCallable { .. }));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_fail_fast_stops_at_failing_hook() {
        let log = CallLog::default();
        let mut registry = HookRegistry::new();
        failing(&mut registry, "m.fail");
        recording(&mut registry, "m.after", "after", &log);

        let result = HookDispatcher::new(&registry).dispatch(&settings(), &["m.fail", "m.after"]);

        assert!(matches!(result, Err(Error::Message(ref m)) if m == "boom"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_fail_fast_keeps_configuration_errors_classifiable() {
        let mut registry = HookRegistry::new();
        registry
            .register("m.needs_target", |s| s.resolve("target").map(|_| ()))
            .unwrap();

        let err = HookDispatcher::new(&registry)
            .dispatch(&settings(), &["m.needs_target"])
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_best_effort_continues_after_failure() {
        let log = CallLog::default();
        let mut registry = HookRegistry::new();
        failing(&mut registry, "m.fail");
        recording(&mut registry, "m.after", "after", &log);

        let report = HookDispatcher::new(&registry)
            .policy(FailurePolicy::BestEffort)
            .dispatch(&settings(), &["m.fail", "m.after"])
            .unwrap();

        assert_eq!(*log.borrow(), vec!["after"]);
        assert_eq!(report.invoked, vec!["m.after"]);
        assert!(matches!(
            &report.failures[0],
            Error::HookFailed { reference, message } if reference == "m.fail" && message == "boom"
        ));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_reported_failures_stay_out_of_info_log() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let mut registry = HookRegistry::new();
        failing(&mut registry, "m.fail");

        tracing::subscriber::with_default(subscriber, || {
            let settings = settings();
            let report = HookDispatcher::new(&registry)
                .policy(FailurePolicy::BestEffort)
                .dispatch(&settings, &["pkg.b:missing", "m.fail"])
                .unwrap();
            assert_eq!(report.failures.len(), 2);
            assert!(report.failures[0].is_hook_resolution());
            assert!(!report.failures[1].is_hook_resolution());
            assert!(
                HookDispatcher::new(&registry)
                    .dispatch(&settings, &["m.fail"])
                    .is_err()
            );
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.is_empty(), "unexpected log output: {output}");
    }

    #[test]
    fn test_empty_references_are_skipped() {
        let registry = HookRegistry::new();
        let report = HookDispatcher::new(&registry)
            .dispatch(&settings(), &["", "  "])
            .unwrap();
        assert!(report.invoked.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_hooks_see_settings() {
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        let mut registry = HookRegistry::new();
        registry
            .register("m.read", move |s| {
                *sink.borrow_mut() = Some(s.string("target")?);
                Ok(())
            })
            .unwrap();

        let settings = settings();
        settings.set("target", "stage");
        HookDispatcher::new(&registry)
            .dispatch(&settings, &["m.read"])
            .unwrap();
        assert_eq!(seen.borrow().as_deref(), Some("stage"));
    }
}
