//! 集成测试 - 会话、模块缓存、调用桥和转换的端到端测试

mod common;

use std::collections::BTreeMap;

use common::{overlay_registry, serial, start_session, Probe};
use embridge::runtime::Runtime;
use embridge::{args, Arg, BridgeError, Session, SessionConfig, ValueList, ValueMap};

// ==================== 会话生命周期 ====================

#[test]
fn test_call_before_start_is_not_ready() {
    let _serial = serial();
    let session = Session::with_registry(SessionConfig::default(), overlay_registry(&Probe::default()));
    assert_eq!(
        session.call_with_spec("x", "y", "", &[]).unwrap_err(),
        BridgeError::NotReady
    );
    assert_eq!(session.call("x", "y", &[]).unwrap_err(), BridgeError::NotReady);
    assert_eq!(session.from_value_list(None).unwrap_err(), BridgeError::NotReady);
}

#[test]
fn test_stop_twice_is_noop() {
    let _serial = serial();
    let probe = Probe::default();
    let mut session = start_session(&probe);
    session.call("overlay.config", "count_calls", &[]).unwrap();
    assert_eq!(session.cached_modules(), vec!["overlay.config".to_string()]);

    session.stop();
    session.stop();
    assert!(!session.is_running());
    assert!(session.cached_modules().is_empty());
    assert!(!Runtime::is_active());
}

#[test]
fn test_restart_after_stop() {
    let _serial = serial();
    let probe = Probe::default();
    let mut session = start_session(&probe);
    session.stop();
    session.start().unwrap();
    session.call("overlay.config", "count_calls", &[]).unwrap();
    assert_eq!(probe.calls(), 1);
}

#[test]
fn test_only_one_runtime_per_process() {
    let _serial = serial();
    let probe = Probe::default();
    let _running = start_session(&probe);
    let mut second = Session::new(SessionConfig::default());
    assert_eq!(second.start().unwrap_err(), BridgeError::SessionConflict);
}

#[test]
fn test_second_thread_conflicts_while_running() {
    let _serial = serial();
    let probe = Probe::default();
    let mut session = start_session(&probe);

    let contender = || {
        std::thread::spawn(|| {
            let mut other = Session::with_registry(
                SessionConfig::default(),
                overlay_registry(&Probe::default()),
            );
            other.start()
        })
        .join()
        .unwrap()
    };

    assert_eq!(contender(), Err(BridgeError::SessionConflict));
    session.call("overlay.config", "count_calls", &[]).unwrap();
    assert_eq!(probe.calls(), 1);

    session.stop();
    assert_eq!(contender(), Ok(()));
    assert!(!Runtime::is_active());
}

#[test]
fn test_preload_failure_does_not_abort_start() {
    let _serial = serial();
    let config = SessionConfig::default()
        .with_preload("overlay.broken")
        .with_preload("overlay.api");
    let mut session = Session::with_registry(config, overlay_registry(&Probe::default()));
    session.start().unwrap();

    assert!(session.is_running());
    assert_eq!(session.cached_modules(), vec!["overlay.api".to_string()]);
    assert_eq!(session.import_count("overlay.broken"), 1);
}

// ==================== 模块缓存 ====================

#[test]
fn test_second_call_hits_cache() {
    let _serial = serial();
    let probe = Probe::default();
    let session = start_session(&probe);

    session.call("overlay.config", "count_calls", &[]).unwrap();
    session.call("overlay.config", "count_calls", &args!["x"]).unwrap();

    assert_eq!(session.import_count("overlay.config"), 1);
    assert_eq!(probe.calls(), 2);
}

#[test]
fn test_missing_module_reported_twice() {
    let _serial = serial();
    let probe = Probe::default();
    let session = start_session(&probe);

    for _ in 0..2 {
        match session.call_with_spec("missing_module", "f", "", &[]) {
            Err(BridgeError::ModuleNotFound { module, exception }) => {
                assert_eq!(module, "missing_module");
                assert_eq!(exception.message, "No module named 'missing_module'");
            }
            other => panic!("expected ModuleNotFound, got {:?}", other),
        }
    }
    assert!(session.cached_modules().is_empty());
}

#[test]
fn test_failing_initializer_is_module_not_found() {
    let _serial = serial();
    let probe = Probe::default();
    let session = start_session(&probe);
    let err = session.call("overlay.broken", "anything", &[]).unwrap_err();
    assert_eq!(err.kind(), "ModuleNotFound");
    assert_eq!(
        err.exception().map(|e| e.message.as_str()),
        Some("package failed to initialize")
    );
}

// ==================== 参数描述串 ====================

#[test]
fn test_unknown_spec_char_never_invokes() {
    let _serial = serial();
    let probe = Probe::default();
    let session = start_session(&probe);

    for spec in ["q", "sQ", "(s, x)", "s%"] {
        let err = session
            .call_with_spec("overlay.config", "count_calls", spec, &args!["a", "b"])
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidArgumentSpec", "spec {:?}", spec);
    }
    assert_eq!(probe.calls(), 0);
}

#[test]
fn test_spec_mismatch_never_invokes() {
    let _serial = serial();
    let probe = Probe::default();
    let session = start_session(&probe);

    let err = session
        .call_with_spec("overlay.config", "count_calls", "si", &args!["a", "b"])
        .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidArgumentSpec { .. }));

    let err = session
        .call_with_spec("overlay.config", "count_calls", "s", &args!["a", "b"])
        .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidArgumentSpec { .. }));

    assert_eq!(probe.calls(), 0);
    assert_eq!(session.import_count("overlay.config"), 0);
}

#[test]
fn test_valid_spec_invokes() {
    let _serial = serial();
    let probe = Probe::default();
    let session = start_session(&probe);
    let list = ValueList::with_len(2);
    let map = ValueMap::new();
    let missing: Option<&str> = None;

    session
        .call_with_spec(
            "overlay.config",
            "count_calls",
            "(s, z, i, b, l, m, O)",
            &[
                Arg::from("a"),
                Arg::from(missing),
                Arg::from(7),
                Arg::from(true),
                Arg::from(&list),
                Arg::from(&map),
                Arg::None,
            ],
        )
        .unwrap();
    assert_eq!(probe.calls(), 1);
}

// ==================== 调用错误 ====================

#[test]
fn test_callable_not_found() {
    let _serial = serial();
    let probe = Probe::default();
    let session = start_session(&probe);
    let err = session.call("overlay.config", "no_such_fn", &[]).unwrap_err();
    assert_eq!(
        err,
        BridgeError::CallableNotFound {
            owner: "module 'overlay.config'".into(),
            callable: "no_such_fn".into()
        }
    );
    let report = err.to_report();
    assert_eq!(report.callable.as_deref(), Some("no_such_fn"));
}

#[test]
fn test_invocation_failed_report() {
    let _serial = serial();
    let probe = Probe::default();
    let session = start_session(&probe);
    let err = session
        .call("overlay.config", "BareConfig", &args!["not a dict"])
        .unwrap_err();
    assert_eq!(err.kind(), "InvocationFailed");

    let json = err.to_report().to_json().unwrap();
    assert!(json.contains(r#""kind":"TypeError""#), "{}", json);
    assert!(json.contains("overlay.config.BareConfig"), "{}", json);
}

// ==================== 转换 ====================

#[test]
fn test_list_scenario_abc() {
    let _serial = serial();
    let probe = Probe::default();
    let session = start_session(&probe);

    let list: ValueList = ["a", "b", "c"].into_iter().collect();
    let handle = session.from_value_list(Some(&list)).unwrap();
    let back = handle.to_value_list().unwrap();

    assert_eq!(back.len(), 3);
    assert_eq!(back.iter().collect::<Vec<_>>(), vec![Some("a"), Some("b"), Some("c")]);
    assert_eq!(back.to_string(), r#""a", "b", "c""#);
}

#[test]
fn test_list_round_trip_law() {
    let _serial = serial();
    let probe = Probe::default();
    let session = start_session(&probe);

    let samples: Vec<ValueList> = vec![
        ValueList::default(),
        ValueList::with_len(4),
        ["only"].into_iter().collect(),
        ["", "héllo", "with space", "\"quoted\""].into_iter().collect(),
        (0..100).map(|i| format!("item-{}", i)).collect(),
    ];

    for list in samples {
        let handle = session.from_value_list(Some(&list)).unwrap();
        assert_eq!(handle.to_value_list().unwrap(), list);
    }
}

#[test]
fn test_map_round_trip_law() {
    let _serial = serial();
    let probe = Probe::default();
    let session = start_session(&probe);

    let samples: Vec<ValueMap> = vec![
        ValueMap::new(),
        [("k", "v")].into_iter().collect(),
        (0..50)
            .map(|i| (format!("key{}", i), format!("value{}", i)))
            .collect(),
    ];

    for map in samples {
        let handle = session.from_value_map(Some(&map)).unwrap();
        let back = handle.to_value_map().unwrap();
        let expected: BTreeMap<_, _> = map.iter().collect();
        let actual: BTreeMap<_, _> = back.iter().collect();
        assert_eq!(actual, expected);
    }
}

#[test]
fn test_composite_mismatch() {
    let _serial = serial();
    let probe = Probe::default();
    let session = start_session(&probe);

    let api = common_api(&session);
    let counts = api.call_method("get_info_counts", &[]).unwrap();
    assert_eq!(counts.to_value_map().unwrap_err().kind(), "TypeMismatch");
    assert_eq!(counts.to_value_list().unwrap_err().kind(), "TypeMismatch");
}

#[test]
fn test_ambiguous_truthiness_is_conversion_error() {
    let _serial = serial();
    let probe = Probe::default();
    let session = start_session(&probe);
    let api = common_api(&session);

    let status = api.call_method("sync", &args!["gentoo", 0]).unwrap();
    assert!(status.is_truthy().unwrap());

    let status = api.call_method("sync", &args!["unknown-repo", 0]).unwrap();
    assert!(!status.is_truthy().unwrap());

    let status = api.call_method("sync", &args!["flaky", 0]).unwrap();
    assert!(matches!(
        status.is_truthy(),
        Err(BridgeError::ConversionError(_))
    ));
}

// ==================== 引用计数 ====================

#[test]
fn test_handles_release_on_drop() {
    let _serial = serial();
    let probe = Probe::default();
    let session = start_session(&probe);

    let list: ValueList = ["a"].into_iter().collect();
    let handle = session.from_value_list(Some(&list)).unwrap();
    assert_eq!(handle.ref_count(), Some(1));
    {
        let clones: Vec<_> = (0..5).map(|_| handle.clone()).collect();
        assert_eq!(handle.ref_count(), Some(6));
        assert!(clones.iter().all(|c| c.is_same(&handle)));
    }
    assert_eq!(handle.ref_count(), Some(1));

    // 失败路径同样释放参数引用
    let _ = session.call_with_spec("missing_module", "f", "O", &args![&handle]);
    let _ = session.call("overlay.config", "BareConfig", &args![&handle]);
    assert_eq!(handle.ref_count(), Some(1));
}

fn common_api(session: &Session) -> embridge::Handle<'_> {
    let config = session
        .call("overlay.config", "BareConfig", &[Arg::None])
        .unwrap();
    session
        .call("overlay.api", "LayAPI", &args![&config, true, 0])
        .unwrap()
}
