//! Concurrency guarantees of the registry store

use std::sync::{Arc, Barrier};
use std::thread;

use vernier::{MeterFilter, MeterRegistry, Tag, new_registry};

fn spawn_all<T: Send + 'static>(
    count: usize,
    registry: &Arc<MeterRegistry>,
    barrier: &Arc<Barrier>,
    work: impl Fn(Arc<MeterRegistry>) -> T + Send + Sync + Clone + 'static,
) -> Vec<T> {
    let handles: Vec<_> = (0..count)
        .map(|_| {
            let registry = Arc::clone(registry);
            let barrier = Arc::clone(barrier);
            let work = work.clone();
            thread::spawn(move || {
                barrier.wait();
                work(registry)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn concurrent_requests_for_one_name_share_one_instance() {
    const THREADS: usize = 16;

    let registry = Arc::new(new_registry());
    let barrier = Arc::new(Barrier::new(THREADS));

    let counters = spawn_all(THREADS, &registry, &barrier, |registry| {
        registry.counter("same.name", []).unwrap()
    });

    let first = &counters[0];
    for counter in &counters {
        assert_eq!(counter, first);
    }
    assert_eq!(registry.meters().len(), 1);

    // Every clone records into the one stored handle.
    for counter in &counters {
        counter.increment();
    }
    assert_eq!(first.count(), THREADS as f64);
}

#[test]
fn unrelated_ids_register_independently() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 50;

    let registry = Arc::new(new_registry());
    let barrier = Arc::new(Barrier::new(THREADS));

    let results: Vec<Vec<String>> = (0..THREADS)
        .map(|thread_index| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..PER_THREAD)
                    .map(|i| {
                        let name = format!("meter.{thread_index}.{i}");
                        registry.counter(name.clone(), []).unwrap();
                        name
                    })
                    .collect()
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    assert_eq!(registry.meters().len(), THREADS * PER_THREAD);
    for names in results {
        for name in names {
            assert!(registry.find(name).counter().is_some());
        }
    }
}

#[test]
fn concurrent_register_and_remove_converge() {
    const THREADS: usize = 8;

    let registry = Arc::new(new_registry());
    let barrier = Arc::new(Barrier::new(THREADS));

    // Half the threads register, half remove whatever they find.
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..200 {
                    if i % 2 == 0 {
                        registry.counter("contended", []).unwrap();
                    } else if let Some(meter) = registry.find("contended").meter() {
                        registry.remove(&meter);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // At most one instance can remain, and repeated removal stays
    // idempotent.
    assert!(registry.meters().len() <= 1);
    if let Some(meter) = registry.find("contended").meter() {
        assert!(registry.remove(&meter).is_some());
        assert!(registry.remove(&meter).is_none());
    }
}

#[test]
fn filters_can_be_appended_while_registrations_run() {
    const WRITERS: usize = 4;

    let registry = Arc::new(new_registry());
    let barrier = Arc::new(Barrier::new(WRITERS + 1));

    let registrars: Vec<_> = (0..WRITERS)
        .map(|thread_index| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..100 {
                    registry
                        .counter(
                            format!("app.meter.{thread_index}.{i}"),
                            [Tag::new("thread", thread_index.to_string())],
                        )
                        .unwrap();
                }
            })
        })
        .collect();

    let appender = {
        let registry = Arc::clone(&registry);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for i in 0..50 {
                registry.add_filter(MeterFilter::deny_fn(move |id| {
                    id.name() == format!("never.{i}")
                }));
            }
        })
    };

    for handle in registrars {
        handle.join().unwrap();
    }
    appender.join().unwrap();

    // Appended filters deny nothing the registrars requested.
    assert_eq!(registry.meters().len(), WRITERS * 100);
}

#[test]
fn synthetic_removal_is_atomic_under_concurrent_observers() {
    let registry = Arc::new(new_registry());
    let timer = vernier::Timer::builder("observed.timer")
        .publish_percentiles([0.5, 0.95])
        .register(&registry)
        .unwrap();
    assert_eq!(registry.meters().len(), 3);

    let observer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            // Observers must only ever see the whole group or nothing.
            loop {
                let size = registry.meters().len();
                assert!(size == 3 || size == 0, "saw partial group of {size}");
                if size == 0 {
                    return;
                }
            }
        })
    };

    registry.remove(&timer.into());
    observer.join().unwrap();
}
