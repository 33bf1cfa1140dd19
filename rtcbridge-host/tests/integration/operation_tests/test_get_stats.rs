use rtcbridge_core::StatsReport;
use rtcbridge_host::BridgeError;
use std::cell::RefCell;
use std::rc::Rc;

use crate::integration::{create_test_connection, init_tracing};

fn report(kind: &str) -> StatsReport {
    StatsReport::from([
        ("type".to_string(), kind.to_string()),
        ("id".to_string(), format!("{kind}_1")),
    ])
}

#[test]
fn test_stats_callback_runs_once_on_dispatch() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    connection
        .get_stats(move |stats| sink.borrow_mut().push(stats.clone()))
        .expect("getStats failed synchronously");

    engine
        .connection(0)
        .complete_stats(vec![(1000.0, report("transport")), (1250.5, report("candidate-pair"))]);
    assert!(seen.borrow().is_empty());

    connection.dispatch_pending();
    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["timestamp"], 1250.5);

    let result = seen[0]["result"].as_array().expect("result should be an array");
    assert_eq!(result.len(), 2);
    assert_eq!(result[0]["type"], "transport");
    assert_eq!(result[1]["type"], "candidate-pair");
}

#[test]
fn test_abandoned_stats_request_releases_callback() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    let called = Rc::new(RefCell::new(false));
    let flag = called.clone();
    connection
        .get_stats(move |_| *flag.borrow_mut() = true)
        .expect("getStats failed synchronously");

    // The engine drops the observer without completing it.
    engine.connection(0).abandon_all();
    assert_eq!(connection.dispatch_pending(), 1);

    assert!(!*called.borrow());
    // The callback and everything it captured are gone.
    assert_eq!(Rc::strong_count(&called), 1);
}

#[test]
fn test_refused_stats_request_is_an_error() {
    init_tracing();

    let (engine, _factory, connection) = create_test_connection();
    engine.connection(0).refuse_stats();

    let result = connection.get_stats(|_| {});
    assert!(matches!(result, Err(BridgeError::Engine(_))));
}
