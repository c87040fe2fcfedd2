use spatia::errors::ErrorKind;
use spatia::open_helper::memory::InMemoryOpenHelperFactory;
use spatia::open_helper::OpenHelperFactory;
use spatia_int_test::test_util::{events, PlacesSchema, RecordingCallback, TestContext};
use spatia_spatial::{SpatialMetadataMode, SpatialModule, DEFAULT_SPATIAL_LIBRARY};
use spatia_sqlite::SqliteModule;

#[test]
fn test_spatial_builder_layers_extension_under_engine() {
    let ctx = TestContext::new();
    let memory = InMemoryOpenHelperFactory::new();
    let log = events();

    let db = spatia_spatial::database_builder(ctx.context(), PlacesSchema::new(1), "geo.db")
        .unwrap()
        .open_helper_factory(OpenHelperFactory::new(memory.clone()))
        .add_callback(RecordingCallback::new("app", log.clone()))
        .build()
        .unwrap();
    db.connection().unwrap();
    db.close().unwrap();

    let state = memory.snapshot("geo.db").unwrap();
    assert_eq!(state.extensions, vec![DEFAULT_SPATIAL_LIBRARY.to_string()]);
    assert_eq!(state.count_statements("InitSpatialMetaData(1)"), 1);
    assert!(state.has_table("place"));
    assert_eq!(state.version, 1);
    assert_eq!(*log.lock(), vec!["app:create", "app:open"]);

    // metadata statement precedes the managed tables
    let init = state
        .statements
        .iter()
        .position(|s| s.contains("InitSpatialMetaData"))
        .unwrap();
    let create = state
        .statements
        .iter()
        .position(|s| s.contains("CREATE TABLE"))
        .unwrap();
    assert!(init < create);
}

#[test]
fn test_wgs84_metadata_mode() {
    let ctx = TestContext::new();
    let memory = InMemoryOpenHelperFactory::new();

    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "geo.db")
        .unwrap()
        .open_helper_factory(OpenHelperFactory::new(memory.clone()))
        .load_module(
            SpatialModule::with_config()
                .metadata_mode(SpatialMetadataMode::Wgs84Only)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    db.connection().unwrap();

    let state = memory.snapshot("geo.db").unwrap();
    assert_eq!(state.count_statements("'WGS84_ONLY'"), 1);
}

#[test]
fn test_missing_extension_library_aborts_open() {
    let ctx = TestContext::new();
    let log = events();

    let db = spatia::database_builder(ctx.context(), PlacesSchema::new(1), "geo.db")
        .unwrap()
        .load_module(SqliteModule::new())
        .load_module(
            SpatialModule::with_config()
                .library("/nonexistent/spatia/mod_missing")
                .build()
                .unwrap(),
        )
        .add_callback(RecordingCallback::new("app", log.clone()))
        .build()
        .unwrap();

    let err = db.connection().err().unwrap();
    assert_eq!(err.kind(), &ErrorKind::Extension("spatial".to_string()));
    assert!(err.message().contains("/nonexistent/spatia/mod_missing"));
    assert!(err.cause().is_some());
    assert!(!db.is_open());
    assert!(log.lock().is_empty());
}

#[test]
fn test_extension_loaded_again_after_reopen() {
    let ctx = TestContext::new();
    let memory = InMemoryOpenHelperFactory::new();

    for _ in 0..2 {
        let db = spatia_spatial::database_builder(ctx.context(), PlacesSchema::new(1), "geo.db")
            .unwrap()
            .open_helper_factory(OpenHelperFactory::new(memory.clone()))
            .build()
            .unwrap();
        db.connection().unwrap();
        db.close().unwrap();
    }

    let state = memory.snapshot("geo.db").unwrap();
    assert_eq!(state.extensions.len(), 2);
    assert_eq!(state.count_statements("CREATE TABLE"), 1);
}
