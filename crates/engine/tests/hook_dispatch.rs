//! End-to-end hook dispatch through the engine

#![allow(clippy::unwrap_used, clippy::panic)]

use std::cell::Cell;
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;
use velcro_config::{OverrideStore, Settings, keys};
use velcro_engine::{Engine, Error, FailurePolicy, HookDispatcher, HookedTask, TaskCall};

fn counter_hook(engine: &mut Engine, reference: &str) -> Rc<Cell<usize>> {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    engine
        .hooks_mut()
        .register(reference, move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        })
        .unwrap();
    calls
}

fn engine_from_file(content: &str) -> (TempDir, Engine) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(".velcro.yml");
    fs::write(&path, content).unwrap();
    let engine = Engine::new(Settings::load(&path).unwrap()).unwrap();
    (temp, engine)
}

#[test]
fn test_missing_hook_does_not_stop_the_list() {
    let mut engine = Engine::new(Settings::new(OverrideStore::new())).unwrap();
    let calls = counter_hook(&mut engine, "pkg.a:f");
    engine.hooks_mut().register("pkg.b.other", |_| Ok(())).unwrap();

    let report = HookDispatcher::new(engine.hooks())
        .dispatch(engine.settings(), &["pkg.a:f", "pkg.b:missing"])
        .unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0],
        Error::HookResolution { reference, .. } if reference == "pkg.b:missing"
    ));
}

#[test]
fn test_post_hook_skipped_when_body_fails() {
    let mut engine = Engine::new(Settings::new(OverrideStore::new())).unwrap();
    let calls = counter_hook(&mut engine, "pkg.c:g");
    engine.tasks_mut().register(
        HookedTask::new("migrate", |_, _| Err(Error::Message("migration failed".to_string())))
            .with_post_hooks(["pkg.c:g"]),
    );

    let err = engine.run_task("migrate", &TaskCall::new()).unwrap_err();

    assert_eq!(err.to_string(), "migration failed");
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_post_hook_runs_under_best_effort() {
    let mut engine = Engine::new(Settings::new(OverrideStore::new())).unwrap();
    let calls = counter_hook(&mut engine, "pkg.c:g");
    engine.tasks_mut().register(
        HookedTask::new("migrate", |_, _| Err(Error::Message("migration failed".to_string())))
            .with_post_hooks(["pkg.c:g"]),
    );

    let result =
        engine.run_task_with_policy("migrate", &TaskCall::new(), FailurePolicy::BestEffort);

    assert!(result.is_err());
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_override_file_drives_target_paths() {
    let (_temp, engine) = engine_from_file(
        "root:\n  path: /srv/www\nclient:\n  name: unused\nproject:\n  name: unused\n",
    );
    // Groups flatten to `{group}_{key}`; plain settings come from runtime overrides
    engine.settings().set(keys::CLIENT, "acme");
    engine.settings().set(keys::PROJECT, "shop");
    engine.select_target("live").unwrap();

    assert_eq!(
        engine.settings().string(keys::BASE_PATH).unwrap(),
        "/srv/www/acme/shop/shop_live"
    );
    assert_eq!(
        engine.settings().resolve("client_name").unwrap(),
        serde_json::json!("unused")
    );
}

#[test]
fn test_hooks_observe_selected_target() {
    let (_temp, mut engine) = engine_from_file("root:\n  path: /srv/www\n");
    engine.settings().set(keys::CLIENT, "acme");
    engine.settings().set(keys::PROJECT, "shop");

    let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    engine
        .hooks_mut()
        .register("shop.hooks.record", move |settings| {
            sink.borrow_mut().push(settings.string(keys::TARGET)?);
            Ok(())
        })
        .unwrap();

    for target in ["stage", "live"] {
        engine.select_target(target).unwrap();
        engine
            .run_task("print_config_path", &TaskCall::new().post("shop.hooks.record"))
            .unwrap()
            .unwrap();
    }

    assert_eq!(*seen.borrow(), vec!["stage", "live"]);
}

#[test]
fn test_missing_configuration_reported_from_hook() {
    let engine = Engine::new(Settings::new(OverrideStore::new())).unwrap();

    let outcome = engine
        .run_task(
            "show_settings",
            &TaskCall::new().pre("velcro.utils.print_config_path"),
        )
        .unwrap();

    assert!(outcome.is_none());
}
