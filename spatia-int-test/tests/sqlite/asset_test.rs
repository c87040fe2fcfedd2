use spatia::errors::ErrorKind;
use spatia::migration::Migration;
use spatia_int_test::test_util::{events, PlacesSchema, RecordingCallback, TestContext};
use spatia_sqlite::SqliteModule;
use std::fs;

fn write_asset(ctx: &TestContext, relative: &str, version: u32, rows: usize) {
    let path = ctx.dir().join("assets").join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();

    let connection = rusqlite::Connection::open(&path).unwrap();
    connection
        .execute_batch("CREATE TABLE place (id INTEGER PRIMARY KEY, name TEXT NOT NULL);")
        .unwrap();
    for index in 0..rows {
        connection
            .execute("INSERT INTO place (name) VALUES (?1)", [format!("seeded {}", index)])
            .unwrap();
    }
    connection.pragma_update(None, "user_version", version).unwrap();
}

#[test]
fn test_database_seeded_from_asset() {
    let ctx = TestContext::new();
    write_asset(&ctx, "databases/places.db", 1, 2);
    let log = events();

    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "places.db")
        .unwrap()
        .load_module(SqliteModule::new())
        .create_from_asset("databases/places.db")
        .add_callback(RecordingCallback::new("app", log.clone()))
        .build()
        .unwrap();
    assert!(!ctx.database_path("places.db").exists());

    db.connection().unwrap();
    db.close().unwrap();

    assert_eq!(*log.lock(), vec!["app:open"]);
    assert_eq!(ctx.count_rows("places.db", "place"), 2);
    assert!(!ctx.database_path("places.asset-tmp").exists());
}

#[test]
fn test_seeded_database_goes_through_migrations() {
    let ctx = TestContext::new();
    write_asset(&ctx, "seed.db", 1, 3);

    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(2), "places.db")
        .unwrap()
        .load_module(SqliteModule::new())
        .create_from_asset("seed.db")
        .add_migration(Migration::new(1, 2, |conn| {
            conn.execute_batch("ALTER TABLE place ADD COLUMN rating INTEGER;")
        }))
        .build()
        .unwrap();
    db.connection().unwrap();
    db.close().unwrap();

    assert_eq!(ctx.user_version("places.db"), 2);
    assert_eq!(ctx.count_rows("places.db", "place"), 3);
    assert!(ctx.has_column("places.db", "place", "rating"));
}

#[test]
fn test_existing_database_is_not_overwritten() {
    let ctx = TestContext::new();
    write_asset(&ctx, "seed.db", 1, 5);

    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "places.db")
        .unwrap()
        .load_module(SqliteModule::new())
        .build()
        .unwrap();
    db.connection().unwrap();
    db.close().unwrap();

    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "places.db")
        .unwrap()
        .load_module(SqliteModule::new())
        .create_from_asset("seed.db")
        .build()
        .unwrap();
    db.connection().unwrap();
    db.close().unwrap();

    assert_eq!(ctx.count_rows("places.db", "place"), 0);
}

#[test]
fn test_missing_asset_fails_with_io_error() {
    let ctx = TestContext::new();
    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "places.db")
        .unwrap()
        .load_module(SqliteModule::new())
        .create_from_asset("databases/missing.db")
        .build()
        .unwrap();

    let err = db.connection().err().unwrap();
    assert_eq!(err.kind(), &ErrorKind::IOError);
    assert_eq!(err.cause().unwrap().kind(), &ErrorKind::FileNotFound);
    assert!(!ctx.database_path("places.db").exists());
}
