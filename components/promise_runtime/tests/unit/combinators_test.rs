//! Unit tests for all / all_settled / any / race

use core_types::{ErrorKind, Value};
use promise_runtime::{EventLoop, Promise, PromiseState, SettledOutcome};

#[test]
fn all_empty_fulfills_with_empty_array() {
    let mut event_loop = EventLoop::new();
    let all = Promise::all(event_loop.jobs(), &[]);
    event_loop.run_until_done().unwrap();
    assert_eq!(all.value(), Some(Value::Array(vec![])));
}

#[test]
fn all_collects_values_in_order() {
    let mut event_loop = EventLoop::new();
    let jobs = event_loop.jobs().clone();
    let all = Promise::all(&jobs, &[Promise::resolve(&jobs, 1), Promise::resolve(&jobs, 2)]);
    event_loop.run_until_done().unwrap();
    assert_eq!(all.value(), Some(Value::Array(vec![Value::Smi(1), Value::Smi(2)])));
}

#[test]
fn all_rejects_with_first_failure() {
    let mut event_loop = EventLoop::new();
    let jobs = event_loop.jobs().clone();
    let all = Promise::all(&jobs, &[Promise::resolve(&jobs, 1), Promise::reject(&jobs, "e")]);
    event_loop.run_until_done().unwrap();
    assert_eq!(all.state(), PromiseState::Rejected);
    assert_eq!(all.value(), Some(Value::from("e")));
}

#[test]
fn all_rejection_ignores_later_failures() {
    let mut event_loop = EventLoop::new();
    let jobs = event_loop.jobs().clone();
    let (slow, _, reject_slow) = Promise::with_resolvers(&jobs);
    let all = Promise::all(&jobs, &[slow, Promise::reject(&jobs, "fast")]);
    event_loop.run_until_done().unwrap();
    reject_slow.call("slow");
    event_loop.run_until_done().unwrap();
    assert_eq!(all.value(), Some(Value::from("fast")));
}

#[test]
fn all_settled_empty_fulfills_with_empty_array() {
    let mut event_loop = EventLoop::new();
    let settled = Promise::all_settled(event_loop.jobs(), &[]);
    event_loop.run_until_done().unwrap();
    assert_eq!(settled.value(), Some(Value::Array(vec![])));
}

#[test]
fn all_settled_reports_each_outcome() {
    let mut event_loop = EventLoop::new();
    let jobs = event_loop.jobs().clone();
    let settled = Promise::all_settled(
        &jobs,
        &[Promise::resolve(&jobs, 1), Promise::reject(&jobs, "e")],
    );
    event_loop.run_until_done().unwrap();

    assert_eq!(settled.state(), PromiseState::Fulfilled);
    let expected = Value::Array(vec![
        Value::object([("status", Value::from("fulfilled")), ("value", Value::Smi(1))]),
        Value::object([("status", Value::from("rejected")), ("reason", Value::from("e"))]),
    ]);
    assert_eq!(settled.value(), Some(expected));
}

#[test]
fn all_settled_records_parse_back() {
    let mut event_loop = EventLoop::new();
    let jobs = event_loop.jobs().clone();
    let settled = Promise::all_settled(&jobs, &[Promise::reject(&jobs, "x"), Promise::resolve(&jobs, 2)]);
    event_loop.run_until_done().unwrap();

    let Some(Value::Array(records)) = settled.value() else {
        panic!("allSettled should fulfill with an array");
    };
    let outcomes: Vec<SettledOutcome> = records
        .iter()
        .map(|record| SettledOutcome::from_value(record).unwrap())
        .collect();
    assert_eq!(
        outcomes,
        vec![
            SettledOutcome::Rejected(Value::from("x")),
            SettledOutcome::Fulfilled(Value::Smi(2)),
        ]
    );
}

#[test]
fn race_empty_never_settles() {
    let mut event_loop = EventLoop::new();
    let race = Promise::race(event_loop.jobs(), &[]);
    event_loop.run_until_done().unwrap();
    assert_eq!(race.state(), PromiseState::Pending);
}

#[test]
fn race_tie_goes_to_first_input() {
    let mut event_loop = EventLoop::new();
    let jobs = event_loop.jobs().clone();
    let race = Promise::race(&jobs, &[Promise::resolve(&jobs, "a"), Promise::resolve(&jobs, "b")]);
    event_loop.run_until_done().unwrap();
    assert_eq!(race.value(), Some(Value::from("a")));
}

#[test]
fn race_first_to_settle_wins_even_if_rejection() {
    let mut event_loop = EventLoop::new();
    let jobs = event_loop.jobs().clone();
    let (pending, resolve_pending, _) = Promise::with_resolvers(&jobs);
    let race = Promise::race(&jobs, &[pending, Promise::reject(&jobs, "lost")]);
    event_loop.run_until_done().unwrap();
    resolve_pending.call(1);
    event_loop.run_until_done().unwrap();
    assert_eq!(race.state(), PromiseState::Rejected);
    assert_eq!(race.value(), Some(Value::from("lost")));
}

#[test]
fn race_settles_with_later_input_once_it_settles() {
    let mut event_loop = EventLoop::new();
    let jobs = event_loop.jobs().clone();
    let (a, _, _) = Promise::with_resolvers(&jobs);
    let (b, resolve_b, _) = Promise::with_resolvers(&jobs);
    let race = Promise::race(&jobs, &[a, b]);
    resolve_b.call("b wins");
    event_loop.run_until_done().unwrap();
    assert_eq!(race.value(), Some(Value::from("b wins")));
}

#[test]
fn any_empty_rejects_with_empty_aggregate() {
    let mut event_loop = EventLoop::new();
    let any = Promise::any(event_loop.jobs(), &[]);
    event_loop.run_until_done().unwrap();
    assert_eq!(any.state(), PromiseState::Rejected);
    let reason = any.value().unwrap();
    let error = reason.as_error().unwrap();
    assert_eq!(error.kind, ErrorKind::AggregateError);
    assert!(error.errors.is_empty());
}

#[test]
fn any_fulfills_with_first_success() {
    let mut event_loop = EventLoop::new();
    let jobs = event_loop.jobs().clone();
    let any = Promise::any(&jobs, &[Promise::reject(&jobs, "a"), Promise::resolve(&jobs, 2)]);
    event_loop.run_until_done().unwrap();
    assert_eq!(any.value(), Some(Value::Smi(2)));
}

#[test]
fn any_aggregates_all_reasons_in_input_order() {
    let mut event_loop = EventLoop::new();
    let jobs = event_loop.jobs().clone();
    let any = Promise::any(
        &jobs,
        &[Promise::reject(&jobs, "a"), Promise::reject(&jobs, "b"), Promise::reject(&jobs, "c")],
    );
    event_loop.run_until_done().unwrap();
    let reason = any.value().unwrap();
    let error = reason.as_error().unwrap();
    assert_eq!(error.kind, ErrorKind::AggregateError);
    assert_eq!(error.errors, vec![Value::from("a"), Value::from("b"), Value::from("c")]);
}

#[test]
fn combinators_flatten_nested_adoption() {
    let mut event_loop = EventLoop::new();
    let jobs = event_loop.jobs().clone();
    let (inner, resolve_inner, _) = Promise::with_resolvers(&jobs);
    let wrapped = Promise::resolve(&jobs, &inner);
    let all = Promise::all(&jobs, &[wrapped, Promise::resolve(&jobs, "x")]);
    event_loop.run_until_done().unwrap();
    assert_eq!(all.state(), PromiseState::Pending);

    resolve_inner.call("y");
    event_loop.run_until_done().unwrap();
    assert_eq!(all.value(), Some(Value::Array(vec![Value::from("y"), Value::from("x")])));
}
