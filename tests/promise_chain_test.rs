#[cfg(test)]
mod tests {
    use promise_chain::{all, result, CancelSignal, Error, Promise, ResultExt};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::{thread, time::Duration, time::Instant};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_pipeline_across_threads() {
        init_tracing();
        let cancel = CancelSignal::with_timeout(Duration::from_secs(2));
        let promise = Promise::<i32>::new();
        let producer = promise.clone();

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            producer.resolve(&CancelSignal::never(), 42);
        });

        let out = promise
            .then(&cancel, |_, x| Ok(x + 1))
            .then(&cancel, |_, x| Ok(format!("got {x}")));
        assert_eq!(out.wait_with_cancellation(&cancel).unwrap(), "got 43");
    }

    #[test]
    fn test_all_of_chained_promises() {
        init_tracing();
        let cancel = CancelSignal::with_timeout(Duration::from_secs(2));
        let inputs: Vec<Promise<i32>> = (1..=3)
            .map(|i| {
                Promise::resolved(i).then(&cancel, move |_, x| {
                    if x == 2 {
                        Err(Error::msg("two"))
                    } else {
                        thread::sleep(Duration::from_millis(10 * (4 - i) as u64));
                        Ok(x * 100)
                    }
                })
            })
            .collect();

        let outcomes = all(&cancel, &inputs).wait_with_cancellation(&cancel).unwrap();
        assert_eq!(outcomes.len(), 3);
        let (values, errors) = result::fan_out(outcomes);
        assert_eq!(values, vec![100, 300]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "two");
    }

    #[test]
    fn test_deadline_cuts_whole_pipeline() {
        init_tracing();
        let cancel = CancelSignal::with_timeout(Duration::from_millis(30));
        let start = Instant::now();
        let out = Promise::resolved(1)
            .then(&cancel, |_, x| {
                thread::sleep(Duration::from_secs(1));
                Ok(x)
            })
            .then(&cancel, |_, x| Ok(x * 2));
        let err = out.wait().unwrap_err();
        assert!(err.is_timeout());
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_parent_cancel_reaches_child_stage() {
        init_tracing();
        let parent = CancelSignal::new();
        let stage = parent.child();
        let gate = Promise::<()>::new();
        let waiter = gate.clone();
        let task1 = thread::spawn(move || waiter.wait_with_cancellation(&stage));
        thread::sleep(Duration::from_millis(10));
        parent.cancel();
        let result = task1.join().expect("The task1 thread has panicked");
        assert!(result.unwrap_err().is_timeout());
        assert!(!gate.is_ready());
    }

    #[test]
    fn test_catch_on_rejected_stage() {
        init_tracing();
        let cancel = CancelSignal::with_timeout(Duration::from_secs(1));
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        Promise::resolved(1)
            .then(&cancel, |_, _: i32| Err::<i32, _>(Error::msg("bad")))
            .catch(move |err| {
                assert_eq!(err.to_string(), "bad");
                seen.fetch_add(1, Ordering::SeqCst);
            });
        let start = Instant::now();
        while calls.load(Ordering::SeqCst) == 0 && start.elapsed() < Duration::from_secs(1) {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = Promise::resolved(5).wait();
        assert_eq!(ok.or_fallback(0), 5);
        let bad = Promise::<i32>::rejected("nope").wait();
        assert_eq!(bad.message(), "nope");
        assert_eq!(bad.or_fallback_with(|| -1), -1);
    }
}
