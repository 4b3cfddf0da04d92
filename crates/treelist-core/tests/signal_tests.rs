//! Integration tests for signal delivery across threads and guards.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use treelist_core::{Signal, SignalError};

#[test]
fn emit_from_multiple_threads() {
    let signal = Arc::new(Signal::<usize>::new());
    let total = Arc::new(AtomicUsize::new(0));

    let total_clone = total.clone();
    signal.connect(move |&n| {
        total_clone.fetch_add(n, Ordering::SeqCst);
    });

    let handles: Vec<_> = (1..=4)
        .map(|n| {
            let signal = signal.clone();
            thread::spawn(move || signal.emit(n))
        })
        .collect();
    for handle in handles {
        handle.join().expect("emitter thread panicked");
    }

    assert_eq!(total.load(Ordering::SeqCst), 10);
    assert_eq!(signal.emission_count(), 4);
}

#[test]
fn connect_from_other_thread_is_delivered_on_emitter() {
    let signal = Arc::new(Signal::<&'static str>::new());
    let received = Arc::new(Mutex::new(Vec::new()));

    let signal_clone = signal.clone();
    let received_clone = received.clone();
    thread::spawn(move || {
        signal_clone.connect(move |&s| received_clone.lock().push(s));
    })
    .join()
    .expect("connect thread panicked");

    signal.emit("hello");
    assert_eq!(*received.lock(), vec!["hello"]);
}

#[test]
fn guard_dropped_on_other_thread_disconnects() {
    let signal = Signal::<()>::new();
    let guard = signal.connect_scoped(|_| {});
    assert_eq!(signal.connection_count(), 1);

    thread::spawn(move || drop(guard))
        .join()
        .expect("drop thread panicked");

    assert_eq!(signal.connection_count(), 0);
}

#[test]
fn try_disconnect_reports_stale_ids() {
    let signal = Signal::<()>::new();
    let id = signal.connect(|_| {});
    assert_eq!(signal.try_disconnect(id), Ok(()));
    assert_eq!(signal.try_disconnect(id), Err(SignalError::InvalidConnection));
}

#[test]
fn tracing_subscriber_does_not_change_delivery() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();

    let signal = Signal::<u8>::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_clone = hits.clone();
    signal.connect(move |_| {
        hits_clone.fetch_add(1, Ordering::SeqCst);
    });
    signal.emit(7);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
