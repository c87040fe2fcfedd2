use parking_lot::Mutex;
use spatia::common::{Executor, ThreadPoolExecutor};
use spatia::errors::{ErrorKind, SpatiaError, SpatiaResult};
use spatia_int_test::test_util::{PlacesSchema, TestContext};
use spatia_sqlite::SqliteModule;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_database_opens_lazily_and_once() {
    let ctx = TestContext::new();
    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "places.db")
        .unwrap()
        .load_module(SqliteModule::new())
        .build()
        .unwrap();
    assert!(!db.is_open());

    let handles = (0..4)
        .map(|_| {
            let db = db.clone();
            thread::spawn(move || db.connection().map(|_| ()))
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let first = db.connection().unwrap();
    let second = db.connection().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(db.is_open());
    assert!(ctx.database_path("places.db").exists());
}

#[test]
fn test_closed_database_rejects_access() {
    let ctx = TestContext::new();
    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "places.db")
        .unwrap()
        .load_module(SqliteModule::new())
        .build()
        .unwrap();
    db.connection().unwrap();
    db.close().unwrap();
    db.close().unwrap();

    assert!(db.is_closed());
    assert!(!db.is_open());
    let err = db.connection().err().unwrap();
    assert_eq!(err.kind(), &ErrorKind::DatabaseClosed);
}

#[test]
fn test_main_thread_access_requires_opt_in() {
    let ctx = TestContext::new();
    let context = ctx.context().with_main_thread_detector(|| true);

    let guarded = spatia::database_builder(context.clone(), PlacesSchema::new(1), "guarded.db")
        .unwrap()
        .load_module(SqliteModule::new())
        .build()
        .unwrap();
    let err = guarded.connection().err().unwrap();
    assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    let err = guarded.run_in_transaction(|_conn| Ok(())).err().unwrap();
    assert_eq!(err.kind(), &ErrorKind::InvalidOperation);

    let allowed = spatia::database_builder(context, PlacesSchema::new(1), "allowed.db")
        .unwrap()
        .load_module(SqliteModule::new())
        .allow_main_thread_queries()
        .build()
        .unwrap();
    assert!(allowed.connection().is_ok());
}

#[test]
fn test_failed_transaction_rolls_back() {
    let ctx = TestContext::new();
    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "places.db")
        .unwrap()
        .load_module(SqliteModule::new())
        .build()
        .unwrap();

    let result: SpatiaResult<()> = db.run_in_transaction(|conn| {
        conn.execute_batch("INSERT INTO place (name) VALUES ('kept only on commit');")?;
        Err(SpatiaError::new("abort", ErrorKind::InternalError))
    });
    assert_eq!(result.err().unwrap().message(), "abort");

    db.run_in_transaction(|conn| conn.execute_batch("INSERT INTO place (name) VALUES ('committed');"))
        .unwrap();
    db.close().unwrap();

    assert_eq!(ctx.count_rows("places.db", "place"), 1);
}

#[test]
fn test_transactions_run_one_at_a_time_in_order() {
    let ctx = TestContext::new();
    let pool: Arc<dyn Executor> = Arc::new(ThreadPoolExecutor::new("transactions", 4));
    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "places.db")
        .unwrap()
        .load_module(SqliteModule::new())
        .transaction_executor(pool)
        .build()
        .unwrap();

    let order = Arc::new(Mutex::new(Vec::new()));
    let running = Arc::new(AtomicUsize::new(0));
    let overlapped = Arc::new(AtomicUsize::new(0));
    let executor = db.transaction_executor();

    for index in 0..10 {
        let db = db.clone();
        let order = order.clone();
        let running = running.clone();
        let overlapped = overlapped.clone();
        executor
            .execute(Box::new(move || {
                if running.fetch_add(1, Ordering::SeqCst) > 0 {
                    overlapped.fetch_add(1, Ordering::SeqCst);
                }
                let inserted = db.run_in_transaction(|conn| {
                    conn.execute_batch(&format!("INSERT INTO place (name) VALUES ('task {}');", index))
                });
                thread::sleep(Duration::from_millis(5));
                if inserted.is_ok() {
                    order.lock().push(index);
                }
                running.fetch_sub(1, Ordering::SeqCst);
            }))
            .unwrap();
    }

    awaitility::at_most(Duration::from_secs(10)).until(|| order.lock().len() == 10);
    assert_eq!(*order.lock(), (0..10).collect::<Vec<_>>());
    assert_eq!(overlapped.load(Ordering::SeqCst), 0);

    db.close().unwrap();
    assert_eq!(ctx.count_rows("places.db", "place"), 10);
}
