//! Integration tests against real PostgreSQL.
//!
//! These tests verify that:
//! 1. The rendered DDL is accepted by the server
//! 2. Catalog reads resolve the schema name and version
//! 3. Drift and concurrent use behave the same as against the fake catalog
//!
//! Run with: cargo nextest run -p pgdecl --features test-postgres --test postgres_integration
//!
//! Note: Requires Docker to be running.

#![cfg(feature = "test-postgres")]

use std::sync::Arc;

use pgdecl::{
    Capabilities, CatalogLocks, ErrorKind, Extension, ExtensionResource, Feature, PgCatalog,
    Resource,
};
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::testcontainers::ContainerAsync;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use tokio_postgres::{Client, NoTls};

async fn setup_postgres() -> (ContainerAsync<Postgres>, Client) {
    let container = Postgres::default()
        .start()
        .await
        .expect("failed to start postgres container");
    let host = container.get_host().await.expect("container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("postgres port not available");

    let conn_str =
        format!("host={host} port={port} user=postgres password=postgres dbname=postgres");
    let (client, connection) = tokio_postgres::connect(&conn_str, NoTls)
        .await
        .expect("failed to connect to postgres");

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("connection error: {}", e);
        }
    });

    (container, client)
}

async fn extensions(client: Client) -> ExtensionResource<PgCatalog<Client>> {
    let capabilities = Capabilities::detect(&client).await.unwrap();
    assert!(capabilities.supports(Feature::Extension));
    let locks = CatalogLocks::new();
    ExtensionResource::new(
        PgCatalog::new(client),
        capabilities,
        locks.for_database("postgres"),
    )
}

#[tokio::test]
async fn test_lifecycle_against_postgres() {
    let (_container, client) = setup_postgres().await;
    client.execute("CREATE SCHEMA app", &[]).await.unwrap();
    let ext = extensions(client).await;

    let created = ext
        .create(&Extension::new("hstore"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.name, "hstore");
    assert_eq!(created.schema, "public");
    assert!(!created.version.is_empty());

    // IF NOT EXISTS makes the second create a no-op
    let again = ext.create(&Extension::new("hstore")).await.unwrap();
    assert_eq!(again.as_ref(), Some(&created));

    let desired = Extension::new("hstore").schema("app");
    let moved = ext
        .update("hstore", &created, &desired)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.schema, "app");
    assert_eq!(moved.version, created.version);

    ext.delete("hstore").await.unwrap();
    assert!(!ext.exists("hstore").await.unwrap());
    assert_eq!(ext.read("hstore").await.unwrap(), None);
}

#[tokio::test]
async fn test_drift_against_postgres() {
    let (_container, client) = setup_postgres().await;
    let ext = extensions(client).await;

    ext.create(&Extension::new("citext")).await.unwrap();
    ext.catalog()
        .connection()
        .execute("DROP EXTENSION citext", &[])
        .await
        .unwrap();

    assert_eq!(ext.read("citext").await.unwrap(), None);
    assert_eq!(ext.import("citext").await.unwrap(), None);
}

#[tokio::test]
async fn test_server_errors_are_wrapped() {
    let (_container, client) = setup_postgres().await;
    let ext = extensions(client).await;

    let err = ext
        .create(&Extension::new("no_such_extension"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Execution);
    assert!(err.to_string().starts_with("error creating extension: "));

    ext.create(&Extension::new("pgcrypto")).await.unwrap();
    let installed = ext.read("pgcrypto").await.unwrap().unwrap();
    let err = ext
        .update(
            "pgcrypto",
            &installed,
            &Extension::new("pgcrypto").schema("missing"),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("error updating extension schema: "));
}

#[tokio::test]
async fn test_concurrent_creates_converge() {
    let (_container, client) = setup_postgres().await;
    let ext = Arc::new(extensions(client).await);

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let ext = Arc::clone(&ext);
        tasks.push(tokio::spawn(async move {
            ext.create(&Extension::new("pgcrypto")).await
        }));
    }
    let mut seen = Vec::new();
    for task in tasks {
        seen.push(task.await.unwrap().unwrap().unwrap());
    }
    assert!(seen.windows(2).all(|w| w[0] == w[1]));
}
