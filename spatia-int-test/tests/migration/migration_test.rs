use parking_lot::Mutex;
use spatia::database::Database;
use spatia::errors::{ErrorKind, SpatiaError};
use spatia::migration::Migration;
use spatia_int_test::test_util::{events, PlacesSchema, RecordingCallback, TestContext};
use spatia_sqlite::SqliteModule;
use std::sync::Arc;

const DB_NAME: &str = "places.db";

fn open_at(ctx: &TestContext, version: u32) -> Database<PlacesSchema> {
    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(version), DB_NAME)
        .unwrap()
        .load_module(SqliteModule::new())
        .build()
        .unwrap();
    db.connection().unwrap();
    db
}

fn seed_places(db: &Database<PlacesSchema>, count: usize) {
    db.run_in_transaction(|conn| {
        for index in 0..count {
            conn.execute_batch(&format!("INSERT INTO place (name) VALUES ('place {}');", index))?;
        }
        Ok(())
    })
    .unwrap();
}

fn tracked(start: u32, end: u32, applied: &Arc<Mutex<Vec<(u32, u32)>>>, sql: &'static str) -> Migration {
    let applied = applied.clone();
    Migration::new(start, end, move |conn| {
        applied.lock().push((start, end));
        conn.execute_batch(sql)
    })
}

#[test]
fn test_fresh_database_runs_create_then_open_callbacks() {
    let ctx = TestContext::new();
    let log = events();

    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(2), DB_NAME)
        .unwrap()
        .load_module(SqliteModule::new())
        .add_callback(RecordingCallback::new("first", log.clone()))
        .add_callback(RecordingCallback::new("second", log.clone()))
        .build()
        .unwrap();
    db.connection().unwrap();
    db.close().unwrap();

    assert_eq!(
        *log.lock(),
        vec!["first:create", "second:create", "first:open", "second:open"]
    );
    assert_eq!(ctx.user_version(DB_NAME), 2);
    assert!(ctx.has_column(DB_NAME, "place", "rating"));
}

#[test]
fn test_upgrade_prefers_the_widest_jump_and_keeps_data() {
    let ctx = TestContext::new();
    let db = open_at(&ctx, 1);
    seed_places(&db, 3);
    db.close().unwrap();

    let applied = Arc::new(Mutex::new(Vec::new()));
    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(3), DB_NAME)
        .unwrap()
        .load_module(SqliteModule::new())
        .add_migration(tracked(1, 2, &applied, "ALTER TABLE place ADD COLUMN rating INTEGER;"))
        .add_migration(tracked(2, 3, &applied, "UPDATE place SET rating = 0;"))
        .add_migration(tracked(
            1,
            3,
            &applied,
            "ALTER TABLE place ADD COLUMN rating INTEGER; UPDATE place SET rating = 0;",
        ))
        .build()
        .unwrap();
    db.connection().unwrap();
    db.close().unwrap();

    assert_eq!(*applied.lock(), vec![(1, 3)]);
    assert_eq!(ctx.user_version(DB_NAME), 3);
    assert_eq!(ctx.count_rows(DB_NAME, "place"), 3);
    assert!(ctx.has_column(DB_NAME, "place", "rating"));
}

#[test]
fn test_missing_path_fails_and_leaves_database_untouched() {
    let ctx = TestContext::new();
    let db = open_at(&ctx, 1);
    seed_places(&db, 2);
    db.close().unwrap();

    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(3), DB_NAME)
        .unwrap()
        .load_module(SqliteModule::new())
        .add_migration(Migration::new(1, 2, |conn| {
            conn.execute_batch("ALTER TABLE place ADD COLUMN rating INTEGER;")
        }))
        .build()
        .unwrap();
    let err = db.connection().err().unwrap();
    db.close().unwrap();

    assert_eq!(err.kind(), &ErrorKind::NoMigrationPath);
    assert!(err.message().contains("from 1 to 3"));
    assert_eq!(ctx.user_version(DB_NAME), 1);
    assert_eq!(ctx.count_rows(DB_NAME, "place"), 2);
}

#[test]
fn test_failed_step_keeps_last_committed_version_and_retry_resumes() {
    let ctx = TestContext::new();
    open_at(&ctx, 1).close().unwrap();

    let applied = Arc::new(Mutex::new(Vec::new()));
    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(3), DB_NAME)
        .unwrap()
        .load_module(SqliteModule::new())
        .add_migration(tracked(1, 2, &applied, "ALTER TABLE place ADD COLUMN rating INTEGER;"))
        .add_migration(tracked(2, 3, &applied, "INSERT INTO missing_table VALUES (1);"))
        .build()
        .unwrap();

    let err = db.connection().err().unwrap();
    assert_eq!(err.kind(), &ErrorKind::MigrationStepFailure);
    assert_eq!(err.cause().unwrap().kind(), &ErrorKind::EngineError);
    assert!(!db.is_open());
    db.close().unwrap();
    assert_eq!(ctx.user_version(DB_NAME), 2);

    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(3), DB_NAME)
        .unwrap()
        .load_module(SqliteModule::new())
        .add_migration(tracked(1, 2, &applied, "ALTER TABLE place ADD COLUMN rating INTEGER;"))
        .add_migration(tracked(2, 3, &applied, "UPDATE place SET rating = 1;"))
        .build()
        .unwrap();
    db.connection().unwrap();
    db.close().unwrap();

    assert_eq!(*applied.lock(), vec![(1, 2), (2, 3), (2, 3)]);
    assert_eq!(ctx.user_version(DB_NAME), 3);
}

#[test]
fn test_downgrade_with_fallback_recreates_database() {
    let ctx = TestContext::new();
    let db = open_at(&ctx, 3);
    seed_places(&db, 4);
    db.close().unwrap();

    let log = events();
    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(2), DB_NAME)
        .unwrap()
        .load_module(SqliteModule::new())
        .fallback_to_destructive_migration_on_downgrade()
        .add_callback(RecordingCallback::new("app", log.clone()))
        .build()
        .unwrap();
    db.connection().unwrap();
    db.close().unwrap();

    assert_eq!(*log.lock(), vec!["app:destructive", "app:open"]);
    assert_eq!(ctx.user_version(DB_NAME), 2);
    assert_eq!(ctx.count_rows(DB_NAME, "place"), 0);
}

#[test]
fn test_downgrade_only_fallback_does_not_cover_upgrades() {
    let ctx = TestContext::new();
    open_at(&ctx, 1).close().unwrap();

    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(2), DB_NAME)
        .unwrap()
        .load_module(SqliteModule::new())
        .fallback_to_destructive_migration_on_downgrade()
        .build()
        .unwrap();
    let err = db.connection().err().unwrap();
    db.close().unwrap();

    assert_eq!(err.kind(), &ErrorKind::NoMigrationPath);
    assert_eq!(ctx.user_version(DB_NAME), 1);
}

#[test]
fn test_fallback_from_listed_start_version() {
    let ctx = TestContext::new();
    let db = open_at(&ctx, 1);
    seed_places(&db, 2);
    db.close().unwrap();

    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(3), DB_NAME)
        .unwrap()
        .load_module(SqliteModule::new())
        .add_migration(Migration::new(2, 3, |_conn| Ok(())))
        .fallback_to_destructive_migration_from([1])
        .build()
        .unwrap();
    db.connection().unwrap();
    db.close().unwrap();

    assert_eq!(ctx.user_version(DB_NAME), 3);
    assert_eq!(ctx.count_rows(DB_NAME, "place"), 0);
    assert!(ctx.has_column(DB_NAME, "place", "rating"));
}

#[test]
fn test_validation_failure_after_migration() {
    let ctx = TestContext::new();
    open_at(&ctx, 1).close().unwrap();

    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(2), DB_NAME)
        .unwrap()
        .load_module(SqliteModule::new())
        .add_migration(Migration::new(1, 2, |conn| conn.execute_batch("DROP TABLE place;")))
        .build()
        .unwrap();
    let err = db.connection().err().unwrap();
    db.close().unwrap();

    assert_eq!(err.kind(), &ErrorKind::SchemaValidationFailed);
    assert_eq!(ctx.user_version(DB_NAME), 2);
}

#[test]
fn test_fatal_callback_aborts_open() {
    struct Refuse;

    impl spatia::common::DatabaseCallback for Refuse {
        fn on_open(&self, _connection: &mut dyn spatia::open_helper::Connection) -> spatia::errors::SpatiaResult<()> {
            Err(SpatiaError::new("refusing to open", ErrorKind::FatalCallback))
        }
    }

    let ctx = TestContext::new();
    let log = events();
    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(1), DB_NAME)
        .unwrap()
        .load_module(SqliteModule::new())
        .add_callback(Refuse)
        .add_callback(RecordingCallback::new("after", log.clone()))
        .build()
        .unwrap();

    let err = db.connection().err().unwrap();
    assert_eq!(err.kind(), &ErrorKind::FatalCallback);
    assert!(!db.is_open());
    assert_eq!(*log.lock(), vec!["after:create"]);
}
