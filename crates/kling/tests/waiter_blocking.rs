//! Blocking waiter behavior with closure accessors and short real intervals.

use std::cell::Cell;
use std::thread;
use std::time::{Duration, Instant};

use kling::{ErrorKind, KlingError, Result, Task, TaskStatus, WaitOptions, wait_blocking};

fn options(interval_ms: u64, timeout_ms: u64) -> WaitOptions {
    WaitOptions::new(
        Duration::from_millis(interval_ms),
        Some(Duration::from_millis(timeout_ms)),
    )
    .unwrap()
}

/// Accessor answering from `statuses` by call index; the last entry repeats.
fn scripted(statuses: &[TaskStatus], calls: &Cell<usize>) -> impl Fn(&str) -> Result<Task> {
    let statuses = statuses.to_vec();
    move |id: &str| {
        let n = calls.get();
        calls.set(n + 1);
        let status = statuses[n.min(statuses.len() - 1)];
        Ok(Task::new(id, status))
    }
}

#[test]
fn running_twice_then_succeeded() {
    let calls = Cell::new(0);
    let accessor = scripted(
        &[TaskStatus::Running, TaskStatus::Running, TaskStatus::Succeeded],
        &calls,
    );
    let started = Instant::now();

    let task = wait_blocking(&accessor, "t-1", &options(20, 2_000)).unwrap();

    assert_eq!(task.status(), TaskStatus::Succeeded);
    assert_eq!(calls.get(), 3);
    assert!(started.elapsed() >= Duration::from_millis(40));
}

#[test]
fn never_finishing_task_times_out() {
    let calls = Cell::new(0);
    let accessor = scripted(&[TaskStatus::Submitted], &calls);
    let started = Instant::now();

    let err = wait_blocking(&accessor, "t-1", &options(20, 100)).unwrap_err();

    let elapsed = started.elapsed();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(err.is_retryable());
    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed < Duration::from_millis(100 + 20 + 500), "{elapsed:?}");
    assert!((3..=7).contains(&calls.get()), "{} calls", calls.get());
}

#[test]
fn transport_error_on_second_call_is_returned_as_is() {
    let calls = Cell::new(0);
    let accessor = |id: &str| -> Result<Task> {
        let n = calls.get();
        calls.set(n + 1);
        match n {
            0 => Ok(Task::new(id, TaskStatus::Running)),
            1 => Err(KlingError::transport(std::io::Error::other("dns failure"))),
            _ => Ok(Task::new(id, TaskStatus::Succeeded)),
        }
    };

    let err = wait_blocking(&accessor, "t-1", &options(10, 1_000)).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(calls.get(), 2);
}

#[test]
fn failed_first_fetch_is_task_failed() {
    let calls = Cell::new(0);
    let accessor = |id: &str| -> Result<Task> {
        calls.set(calls.get() + 1);
        Ok(Task::new(id, TaskStatus::Failed).with_status_message("content policy violation"))
    };

    let err = wait_blocking(&accessor, "t-1", &options(10, 1_000)).unwrap_err();

    match err {
        KlingError::TaskFailed { task_id, message } => {
            assert_eq!(task_id, "t-1");
            assert_eq!(message, "content policy violation");
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }
    assert_eq!(calls.get(), 1);
}

#[test]
fn succeeded_first_fetch_returns_immediately() {
    let calls = Cell::new(0);
    let accessor = scripted(&[TaskStatus::Succeeded], &calls);
    let started = Instant::now();

    wait_blocking(&accessor, "t-1", &options(5_000, 60_000)).unwrap();

    assert_eq!(calls.get(), 1);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn waits_on_separate_threads_do_not_interfere() {
    let handles: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .enumerate()
        .map(|(i, id)| {
            thread::spawn(move || {
                let calls = Cell::new(0);
                let mut statuses = vec![TaskStatus::Running; i + 1];
                statuses.push(TaskStatus::Succeeded);
                let accessor = scripted(&statuses, &calls);
                let task = wait_blocking(&accessor, id, &options(10, 5_000)).unwrap();
                (task.id().to_string(), calls.get())
            })
        })
        .collect();

    let results: Vec<(String, usize)> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(
        results,
        vec![("a".to_string(), 2), ("b".to_string(), 3), ("c".to_string(), 4)]
    );
}
