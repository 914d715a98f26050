// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Integration tests for the foreign server and foreign table registries

#[path = "testutils/mod.rs"]
mod testutils;

use fsi_catalog::store::is_open;
use fsi_catalog::store::redb::CATALOG_FILE_NAME;
use fsi_catalog::{
    Catalog, CatalogConfig, CatalogError, DataWrapperKind, ForeignOptions, StorageType,
};
use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;
use testutils::{int_column, CatalogFixture, OWNER};

#[test]
fn test_server_drop_blocked_by_foreign_table() {
    let fixture = CatalogFixture::new();
    let catalog = fixture.open(true);
    let servers = catalog.foreign_servers().unwrap();
    let foreign_tables = catalog.foreign_tables().unwrap();

    servers
        .create(
            "test_server",
            "omnisci_csv",
            OWNER,
            ForeignOptions::new().with("storage_type", "LOCAL_FILE"),
        )
        .unwrap();
    foreign_tables
        .create("t1", "test_server", int_column(), ForeignOptions::new(), OWNER)
        .unwrap();
    foreign_tables
        .create("t2", "test_server", int_column(), ForeignOptions::new(), OWNER)
        .unwrap();

    let err = servers.drop("test_server").unwrap_err();
    match &err {
        CatalogError::ReferentialViolation { server, tables } => {
            assert_eq!(server, "test_server");
            assert_eq!(tables, &vec!["t1".to_string(), "t2".to_string()]);
        }
        other => panic!("expected referential violation, got {:?}", other),
    }
    assert!(err.to_string().contains("t1, t2"));
    // Nothing changed and the catalog stays usable
    assert!(servers.get("test_server").is_some());
    assert!(!err.is_fatal());

    foreign_tables.drop("t1").unwrap();
    foreign_tables.drop("t2").unwrap();
    servers.drop("test_server").unwrap();
    assert!(servers.get("test_server").is_none());
    assert!(servers.get_skip_cache("test_server").unwrap().is_none());
}

#[test]
fn test_server_options_are_validated() {
    let fixture = CatalogFixture::new();
    let catalog = fixture.open(true);
    let servers = catalog.foreign_servers().unwrap();

    assert!(matches!(
        servers.create("s", "omnisci_avro", OWNER, ForeignOptions::new()),
        Err(CatalogError::UnknownWrapper(name)) if name == "omnisci_avro"
    ));
    assert!(matches!(
        servers.create(
            "s",
            "OMNISCI_PARQUET",
            OWNER,
            ForeignOptions::new().with("compression", "zstd"),
        ),
        Err(CatalogError::UnsupportedOption { option, .. }) if option == "COMPRESSION"
    ));
    assert!(matches!(
        servers.create("omnisci_local_csv", "omnisci_csv", OWNER, ForeignOptions::new()),
        Err(CatalogError::DuplicateName { kind: "Foreign server", .. })
    ));

    let server = servers
        .create("s", "parquet", 42, ForeignOptions::new().with("base_path", "/data"))
        .unwrap();
    assert_eq!(server.data_wrapper, DataWrapperKind::Parquet);
    assert_eq!(server.owner_id, 42);
    assert_eq!(server.options.get("BASE_PATH"), Some("/data"));
}

#[test]
fn test_servers_and_tables_persist_across_reopen() {
    let fixture = CatalogFixture::new();
    let (server_id, table_id) = {
        let catalog = fixture.open(true);
        let server = catalog
            .foreign_servers()
            .unwrap()
            .create("archive", "omnisci_parquet", OWNER, ForeignOptions::new())
            .unwrap();
        let table = catalog
            .foreign_tables()
            .unwrap()
            .create(
                "events",
                "archive",
                int_column(),
                ForeignOptions::new().with("fragment_size", "1000"),
                OWNER,
            )
            .unwrap();
        (server.id, table.table_id)
    };

    let catalog = fixture.open(true);
    let server = catalog.foreign_servers().unwrap().get("archive").unwrap();
    assert_eq!(server.id, server_id);
    assert_eq!(catalog.foreign_servers().unwrap().list().len(), 3);

    let table = catalog.foreign_tables().unwrap().get("events").unwrap();
    assert_eq!(table.table_id, table_id);
    assert_eq!(table.server_id, server_id);
    assert_eq!(table.columns, int_column());
    assert_eq!(table.options.get("fragment_size"), Some("1000"));
}

#[test]
fn test_foreign_table_shares_table_namespace() {
    let fixture = CatalogFixture::new();
    let catalog = fixture.open(true);
    catalog
        .tables()
        .unwrap()
        .create_view("v", "SELECT 1;", OWNER)
        .unwrap();

    assert!(matches!(
        catalog.foreign_tables().unwrap().create(
            "v",
            "omnisci_local_csv",
            int_column(),
            ForeignOptions::new(),
            OWNER,
        ),
        Err(CatalogError::DuplicateName { kind: "View", .. })
    ));
    assert!(matches!(
        catalog.tables().unwrap().drop_table("missing"),
        Err(CatalogError::NotFound { .. })
    ));
}

#[test]
fn test_get_skip_cache_sees_other_instance() {
    let fixture = CatalogFixture::new();
    let writer = fixture.open(true);
    let reader = fixture.open(true);

    writer
        .foreign_servers()
        .unwrap()
        .create("late", "omnisci_csv", OWNER, ForeignOptions::new())
        .unwrap();

    let servers = reader.foreign_servers().unwrap();
    assert!(servers.get("late").is_none());
    let fetched = servers.get_skip_cache("late").unwrap().unwrap();
    assert_eq!(fetched.name, "late");
    assert!(servers.get("late").is_some());

    writer.foreign_servers().unwrap().drop("late").unwrap();
    assert!(servers.get_skip_cache("late").unwrap().is_none());
    assert!(servers.get("late").is_none());
}

#[test]
fn test_concurrent_opens_bootstrap_once() {
    let fixture = CatalogFixture::new();
    let config = fixture.config(true);
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let config = config.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let mut catalog = Catalog::new();
                catalog.open_with_config(&config).unwrap();
                assert_eq!(catalog.foreign_servers().unwrap().list().len(), 2);
                catalog
            })
        })
        .collect();

    let catalogs: Vec<Catalog> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    drop(catalogs);

    let catalog = fixture.open(true);
    let ids: Vec<u32> = catalog
        .foreign_servers()
        .unwrap()
        .list()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_store_handle_released_after_close() {
    let fixture = CatalogFixture::new();
    assert!(!is_open(fixture.path(), StorageType::Redb));

    let mut first = fixture.open(true);
    let second = fixture.open(true);
    assert!(is_open(fixture.path(), StorageType::Redb));

    first.close();
    assert!(is_open(fixture.path(), StorageType::Redb));
    drop(second);
    assert!(!is_open(fixture.path(), StorageType::Redb));

    // The file can be opened again by a new catalog
    let mut reopened = Catalog::new();
    reopened.open(fixture.path(), OWNER, false).unwrap();
    reopened.close();
}

#[test]
fn test_directory_and_file_paths_share_store() {
    let fixture = CatalogFixture::new();
    let by_dir = fixture.open(true);

    let file_config = CatalogConfig::new(fixture.path().join(CATALOG_FILE_NAME))
        .with_storage_type(StorageType::Redb)
        .with_fsi(true);
    let mut by_file = Catalog::new();
    by_file.open_with_config(&file_config).unwrap();

    by_dir
        .foreign_servers()
        .unwrap()
        .create("shared", "omnisci_csv", OWNER, ForeignOptions::new())
        .unwrap();
    let servers = by_file.foreign_servers().unwrap();
    assert!(servers.get_skip_cache("shared").unwrap().is_some());
    assert_eq!(servers.list().len(), 3);
}

#[test]
fn test_relative_path_with_missing_parents_shares_store() {
    let temp_dir = tempfile::TempDir::new_in(".").unwrap();
    let relative = PathBuf::from(temp_dir.path().file_name().unwrap())
        .join("nested")
        .join("catalog");
    assert!(relative.is_relative());

    let mut first = Catalog::new();
    first.open(&relative, OWNER, true).unwrap();

    // The directories now exist; the same spelling must still join the open store
    let mut second = Catalog::new();
    second.open(&relative, OWNER, true).unwrap();

    let absolute = temp_dir
        .path()
        .canonicalize()
        .unwrap()
        .join("nested")
        .join("catalog");
    let mut third = Catalog::new();
    third.open(&absolute, OWNER, true).unwrap();

    assert!(is_open(&relative, StorageType::Redb));
    assert_eq!(third.foreign_servers().unwrap().list().len(), 2);

    first.close();
    second.close();
    third.close();
    assert!(!is_open(&absolute, StorageType::Redb));
}
