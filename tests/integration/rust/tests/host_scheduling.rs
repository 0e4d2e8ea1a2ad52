//! Host scheduling tests: promises settled from tasks, ordering across
//! task boundaries, and logging through a real subscriber.

use core_types::Value;
use integration_tests::settle_later;
use promise_runtime::{EventLoop, Handler, Promise, PromiseState, Task};
use std::cell::RefCell;
use std::rc::Rc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("promise_runtime=trace"))
        .with_test_writer()
        .try_init();
}

#[test]
fn race_between_host_operations_follows_task_order() {
    init_tracing();
    let mut event_loop = EventLoop::new();
    let slow = settle_later(&mut event_loop, 5, Ok(Value::from("slow")));
    let fast = settle_later(&mut event_loop, 1, Ok(Value::from("fast")));
    let winner = Promise::race(event_loop.jobs(), &[slow, fast]);

    event_loop.run_until_done().unwrap();
    // The slow task runs first, but finishes its hops within its own checkpoint.
    assert_eq!(winner.value(), Some(Value::from("slow")));
}

#[test]
fn race_within_one_checkpoint_favours_fewer_hops() {
    init_tracing();
    let mut event_loop = EventLoop::new();
    let jobs = event_loop.jobs().clone();
    let (gate, open_gate, _) = Promise::with_resolvers(&jobs);

    let hops = |n: usize, label: &'static str| {
        let mut p = gate.clone();
        for _ in 0..n {
            p = p.map(Ok);
        }
        p.map(move |_| Ok(Value::from(label)))
    };
    let slow = hops(4, "slow");
    let fast = hops(1, "fast");
    let winner = Promise::race(&jobs, &[slow, fast]);

    event_loop.enqueue_task(Task::new(move || {
        open_gate.call(Value::Undefined);
        Ok(())
    }));
    event_loop.run_until_done().unwrap();
    assert_eq!(winner.value(), Some(Value::from("fast")));
}

#[test]
fn code_after_settlement_runs_before_reactions() {
    init_tracing();
    let mut event_loop = EventLoop::new();
    let log = Rc::new(RefCell::new(vec![]));
    let (promise, resolve, _) = Promise::with_resolvers(event_loop.jobs());

    let l = log.clone();
    promise.map(move |v| {
        l.borrow_mut().push("reaction");
        Ok(v)
    });

    let l = log.clone();
    event_loop.enqueue_task(Task::new(move || {
        resolve.call(1);
        l.borrow_mut().push("after resolve");
        Ok(())
    }));
    event_loop.run_until_done().unwrap();

    assert_eq!(*log.borrow(), vec!["after resolve", "reaction"]);
}

#[test]
fn all_waits_for_every_host_operation() {
    init_tracing();
    let mut event_loop = EventLoop::new();
    let inputs: Vec<Promise> = (0..4)
        .map(|i| settle_later(&mut event_loop, 3 - i as usize, Ok(Value::Smi(i))))
        .collect();
    let all = Promise::all(event_loop.jobs(), &inputs);

    event_loop.run_until_done().unwrap();
    assert_eq!(
        all.value(),
        Some(Value::Array((0..4).map(Value::Smi).collect()))
    );
    assert_eq!(event_loop.stats().tasks_run, 4);
}

#[test]
fn rejection_from_host_is_recovered_downstream() {
    init_tracing();
    let mut event_loop = EventLoop::new();
    let failed = settle_later(&mut event_loop, 2, Err(Value::from("io error")));
    let recovered = failed
        .then(Some(Handler::new(|_| Ok(Value::from("unreachable")))), None)
        .catch(Handler::new(|reason| Ok(Value::from(format!("recovered from {reason}")))));

    let state = event_loop.run_until_settled(&recovered).unwrap();
    assert_eq!(state, PromiseState::Fulfilled);
    assert_eq!(recovered.value(), Some(Value::from("recovered from io error")));
}
