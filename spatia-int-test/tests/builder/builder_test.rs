use spatia::common::{Executor, JournalMode, ThreadPoolExecutor};
use spatia::errors::ErrorKind;
use spatia::migration::Migration;
use spatia::open_helper::memory::InMemoryOpenHelperFactory;
use spatia::open_helper::OpenHelperFactory;
use spatia_int_test::test_util::{PlacesSchema, TestContext};
use spatia_sqlite::SqliteModule;
use std::sync::Arc;

fn noop(start: u32, end: u32) -> Migration {
    Migration::new(start, end, |_connection| Ok(()))
}

#[test]
fn test_blank_name_fails_before_other_rules() {
    let ctx = TestContext::new();
    let err = spatia::database_builder(ctx.context(), PlacesSchema::new(0), "   ")
        .err()
        .unwrap();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
    assert!(err.message().contains("in_memory_database_builder"));
}

#[test]
fn test_schema_version_zero_is_rejected() {
    let ctx = TestContext::new();
    let err = spatia::database_builder(ctx.context(), PlacesSchema::new(0), "places.db")
        .unwrap()
        .build()
        .err()
        .unwrap();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
}

#[test]
fn test_fallback_start_version_overlapping_migration_is_rejected() {
    let ctx = TestContext::new();
    let err = spatia::database_builder(ctx.context(), PlacesSchema::new(3), "places.db")
        .unwrap()
        .add_migration(noop(1, 2))
        .add_migration(noop(2, 3))
        .fallback_to_destructive_migration_from([2])
        .build()
        .err()
        .unwrap();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
    assert!(err.message().ends_with("Start version: 2"));
}

#[test]
fn test_duplicate_migrations_are_rejected() {
    let ctx = TestContext::new();
    let err = spatia::database_builder(ctx.context(), PlacesSchema::new(2), "places.db")
        .unwrap()
        .add_migrations(vec![noop(1, 2), noop(1, 2)])
        .build()
        .err()
        .unwrap();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
    assert!(err.message().contains("1 -> 2"));
}

#[test]
fn test_engine_module_and_explicit_factory_conflict() {
    let ctx = TestContext::new();
    let err = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "places.db")
        .unwrap()
        .load_module(SqliteModule::new())
        .open_helper_factory(OpenHelperFactory::new(InMemoryOpenHelperFactory::new()))
        .build()
        .err()
        .unwrap();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
    assert!(err.message().contains("sqlite"));
}

#[test]
fn test_asset_for_in_memory_database_is_rejected() {
    let ctx = TestContext::new();
    let err = spatia::in_memory_database_builder(ctx.context(), PlacesSchema::new(1))
        .create_from_asset("databases/places.db")
        .build()
        .err()
        .unwrap();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
}

#[test]
fn test_first_captured_error_wins() {
    let ctx = TestContext::new();
    let err = spatia::database_builder(ctx.context(), PlacesSchema::new(0), "places.db")
        .unwrap()
        .fallback_to_destructive_migration_from([0])
        .create_from_asset("  ")
        .build()
        .err()
        .unwrap();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
    assert!(err.message().contains("start versions must be at least 1"));
}

#[test]
fn test_default_executor_is_shared() {
    let ctx = TestContext::new();
    let first = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "first.db")
        .unwrap()
        .build()
        .unwrap();
    let second = spatia::in_memory_database_builder(ctx.context(), PlacesSchema::new(1))
        .build()
        .unwrap();

    let config = first.configuration();
    assert!(Arc::ptr_eq(config.query_executor(), config.transaction_executor()));
    assert!(Arc::ptr_eq(
        config.query_executor(),
        second.configuration().query_executor()
    ));
}

#[test]
fn test_single_executor_serves_both_roles() {
    let ctx = TestContext::new();
    let pool: Arc<dyn Executor> = Arc::new(ThreadPoolExecutor::new("queries", 2));

    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "places.db")
        .unwrap()
        .query_executor(pool.clone())
        .build()
        .unwrap();
    let config = db.configuration();
    assert!(Arc::ptr_eq(config.query_executor(), &pool));
    assert!(Arc::ptr_eq(config.transaction_executor(), &pool));

    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "other.db")
        .unwrap()
        .transaction_executor(pool.clone())
        .build()
        .unwrap();
    assert!(Arc::ptr_eq(db.configuration().query_executor(), &pool));
}

#[test]
fn test_journal_mode_resolution() {
    let ctx = TestContext::new();
    let file = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "places.db")
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(file.configuration().journal_mode(), JournalMode::WriteAheadLogging);

    let memory = spatia::in_memory_database_builder(ctx.context(), PlacesSchema::new(1))
        .journal_mode(JournalMode::WriteAheadLogging)
        .build()
        .unwrap();
    assert_eq!(memory.configuration().journal_mode(), JournalMode::Truncate);
}

#[test]
fn test_multi_instance_invalidation_ignored_in_memory() {
    let ctx = TestContext::new();
    let memory = spatia::in_memory_database_builder(ctx.context(), PlacesSchema::new(1))
        .enable_multi_instance_invalidation()
        .build()
        .unwrap();
    assert!(!memory.configuration().is_multi_instance_invalidation());

    let file = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "places.db")
        .unwrap()
        .enable_multi_instance_invalidation()
        .build()
        .unwrap();
    assert!(file.configuration().is_multi_instance_invalidation());
}

#[test]
fn test_build_performs_no_io() {
    let ctx = TestContext::new();
    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "places.db")
        .unwrap()
        .load_module(SqliteModule::new())
        .build()
        .unwrap();

    assert!(!ctx.database_path("places.db").exists());
    assert!(!db.is_open());
    assert_eq!(db.configuration().path(), Some(ctx.database_path("places.db").as_path()));
}
