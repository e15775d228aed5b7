//! End-to-end reconciliation scenarios against the in-memory backend.

use smarter_broker::{
    BrokerContext, BrokerError, BrokerRequest, BrokerStores, GetQuery, SqlConnectionBroker,
    ResourceBroker,
};
use smarter_core::{AccountNumber, ManifestKind, UserProfile, UserRole};
use smarter_db_memory::{InMemoryRecordStore, InMemorySecretStore};
use smarter_manifest::{LoaderError, ManifestLoader};
use std::sync::Arc;

const MYSQL_MANIFEST: &str = r#"apiVersion: smarter.sh/v1
kind: SqlConnection
metadata:
  name: sales-replica
  description: Sales reporting replica.
  version: 0.1.0
spec:
  dbEngine: django.db.backends.mysql
  hostname: mysql.example.com
  port: 3306
  username: smarter
  password:
    name: sales-replica-password
    value: hunter2
  database: sales
  poolSize: 15
"#;

fn stores() -> BrokerStores {
    BrokerStores {
        records: Arc::new(InMemoryRecordStore::new()),
        secrets: Arc::new(InMemorySecretStore::ephemeral()),
    }
}

fn context() -> BrokerContext {
    BrokerContext::new(
        AccountNumber::new("3141-5926-5358").unwrap(),
        UserProfile::new("alice", UserRole::Customer),
    )
}

async fn connection_broker(stores: BrokerStores, request: BrokerRequest) -> SqlConnectionBroker {
    SqlConnectionBroker::new(context(), stores, request)
        .await
        .expect("broker construction")
}

// Scenario A: apply a MySQL manifest and find identical field values plus a
// computed isValid on the resulting record.
#[tokio::test]
async fn apply_mysql_manifest_persists_field_values() {
    let shared = stores();
    let mut broker =
        connection_broker(shared.clone(), BrokerRequest::with_manifest(MYSQL_MANIFEST)).await;
    let response = broker.apply().await.unwrap();
    assert_eq!(
        response.message,
        "SqlConnection sales-replica applied successfully"
    );

    let data = response.data.unwrap();
    assert_eq!(data["spec"]["dbEngine"], "django.db.backends.mysql");
    assert_eq!(data["spec"]["port"], 3306);
    assert_eq!(data["spec"]["poolSize"], 15);
    assert_eq!(data["status"]["isValid"], true);

    use smarter_store::RecordStore;
    let record = shared
        .records
        .get(&context().account, ManifestKind::SqlConnection, "sales-replica")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.field_str("db_engine"), Some("django.db.backends.mysql"));
    assert_eq!(record.field("port").unwrap(), 3306);
    assert_eq!(record.field("pool_size").unwrap(), 15);
}

// Scenario B: an invalid engine is rejected with the valid set enumerated,
// before anything is persisted.
#[tokio::test]
async fn apply_invalid_engine_is_a_validation_error() {
    let shared = stores();
    let text = MYSQL_MANIFEST.replace("django.db.backends.mysql", "invalid_engine");
    let mut broker = connection_broker(shared.clone(), BrokerRequest::with_manifest(text)).await;
    let err = broker.apply().await.unwrap_err();
    let BrokerError::Validation(validation) = &err else {
        panic!("expected validation error, got {err}");
    };
    let message = validation.to_string();
    assert!(message.contains("spec.dbEngine"));
    assert!(message.contains("invalid_engine"));
    assert!(message.contains("django.db.backends.postgresql"));

    use smarter_store::RecordStore;
    let leftovers = shared
        .records
        .filter(
            &context().account,
            ManifestKind::SqlConnection,
            &smarter_store::RecordFilter::default(),
        )
        .await
        .unwrap();
    assert!(leftovers.is_empty(), "nothing may persist on validation failure");
}

// Scenario C: get for a nonexistent name yields a successful empty result.
#[tokio::test]
async fn get_nonexistent_returns_count_zero() {
    let broker = connection_broker(stores(), BrokerRequest::empty()).await;
    let response = broker.get(&GetQuery::by_name("nonexistent")).await.unwrap();
    assert!(response.is_success());
    assert_eq!(response.metadata.count, Some(0));
    let data = response.data.unwrap();
    assert_eq!(data["metadata"]["count"], 0);
    assert_eq!(data["items"].as_array().unwrap().len(), 0);
    assert!(!data["titles"].as_array().unwrap().is_empty());
}

// Scenario D: a second apply with a changed description updates the existing
// record in place instead of creating a duplicate.
#[tokio::test]
async fn second_apply_updates_in_place() {
    let shared = stores();
    let mut broker =
        connection_broker(shared.clone(), BrokerRequest::with_manifest(MYSQL_MANIFEST)).await;
    let first = broker.apply().await.unwrap();
    let first_data = first.data.unwrap();

    let changed = MYSQL_MANIFEST.replace("Sales reporting replica.", "Renamed replica.");
    let mut broker = connection_broker(shared.clone(), BrokerRequest::with_manifest(changed)).await;
    let second = broker.apply().await.unwrap();
    let second_data = second.data.unwrap();

    assert_eq!(
        second_data["metadata"]["description"],
        "Renamed replica."
    );
    assert_eq!(
        first_data["status"]["created"],
        second_data["status"]["created"]
    );

    use smarter_store::RecordStore;
    let all = shared
        .records
        .filter(
            &context().account,
            ManifestKind::SqlConnection,
            &smarter_store::RecordFilter::default(),
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 1, "apply must upsert, not duplicate");
}

// Scenario E: deleting a connection that was never created is a readiness
// failure, not a not-found.
#[tokio::test]
async fn delete_never_created_is_not_ready() {
    let mut broker = connection_broker(stores(), BrokerRequest::named("never-created")).await;
    let err = broker.delete().await.unwrap_err();
    assert!(matches!(err, BrokerError::NotReady { .. }));
    assert_eq!(err.status(), 400);
    assert_eq!(err.error_class(), "BrokerErrorNotReady");
}

// Idempotent apply: same manifest twice, one record, value-equal responses
// aside from status timestamps.
#[tokio::test]
async fn idempotent_apply() {
    let shared = stores();
    let mut broker =
        connection_broker(shared.clone(), BrokerRequest::with_manifest(MYSQL_MANIFEST)).await;
    let mut first = broker.apply().await.unwrap().data.unwrap();

    let mut broker =
        connection_broker(shared.clone(), BrokerRequest::with_manifest(MYSQL_MANIFEST)).await;
    let mut second = broker.apply().await.unwrap().data.unwrap();

    first.as_object_mut().unwrap().remove("status");
    second.as_object_mut().unwrap().remove("status");
    assert_eq!(first, second);

    use smarter_store::RecordStore;
    let all = shared
        .records
        .filter(
            &context().account,
            ManifestKind::SqlConnection,
            &smarter_store::RecordFilter::default(),
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}

// Secret never leaks: neither the persisted record nor any describe/get
// response contains the plaintext.
#[tokio::test]
async fn secret_never_leaks() {
    let shared = stores();
    let mut broker =
        connection_broker(shared.clone(), BrokerRequest::with_manifest(MYSQL_MANIFEST)).await;
    let applied = broker.apply().await.unwrap();
    assert!(!serde_json::to_string(&applied).unwrap().contains("hunter2"));

    use smarter_store::RecordStore;
    let record = shared
        .records
        .get(&context().account, ManifestKind::SqlConnection, "sales-replica")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.field_str("password"), Some("sales-replica-password"));
    assert!(!serde_json::to_string(&record).unwrap().contains("hunter2"));

    let reader =
        connection_broker(shared.clone(), BrokerRequest::named("sales-replica")).await;
    let described = reader.describe().await.unwrap();
    assert!(!serde_json::to_string(&described).unwrap().contains("hunter2"));
    let got = reader.get(&GetQuery::by_name("sales-replica")).await.unwrap();
    assert!(!serde_json::to_string(&got).unwrap().contains("hunter2"));

    // the plaintext is still recoverable through the secret store
    use smarter_store::SecretStore;
    let secret = shared
        .secrets
        .get(&context().account, "sales-replica-password")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(shared.secrets.reveal(&secret).await.unwrap(), "hunter2");
}

// Unknown kind is rejected at load time, before any persistence access.
#[tokio::test]
async fn unknown_kind_rejected_before_persistence() {
    let text = MYSQL_MANIFEST.replace("kind: SqlConnection", "kind: Widget");
    let err = ManifestLoader::from_text(&text).unwrap_err();
    assert!(matches!(err, LoaderError::UnknownKind(_)));

    let shared = stores();
    let err = SqlConnectionBroker::new(
        context(),
        shared.clone(),
        BrokerRequest::with_manifest(text),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, BrokerError::Loader(LoaderError::UnknownKind(_))));

    use smarter_store::RecordStore;
    let all = shared
        .records
        .filter(
            &context().account,
            ManifestKind::SqlConnection,
            &smarter_store::RecordFilter::default(),
        )
        .await
        .unwrap();
    assert!(all.is_empty());
}

// Not-ready before not-found: describe with no loader and no locatable
// record is NotReady, never NotFound or a panic.
#[tokio::test]
async fn describe_unlocatable_is_not_ready() {
    let broker = connection_broker(stores(), BrokerRequest::named("ghost")).await;
    let err = broker.describe().await.unwrap_err();
    assert!(matches!(err, BrokerError::NotReady { .. }));
    assert_ne!(err.error_class(), "BrokerErrorNotFound");
}

// Round-trip: loader -> document -> JSON -> document is identity, status aside.
#[tokio::test]
async fn document_roundtrip_for_every_kind() {
    use smarter_manifest::ManifestDocument;
    for kind in ManifestKind::ALL {
        let text = ManifestDocument::example_text(kind);
        let document = ManifestLoader::from_text(text).unwrap().document().unwrap();
        let reparsed =
            ManifestDocument::from_value(document.to_value().unwrap()).unwrap();
        assert_eq!(document, reparsed, "{kind} round-trip");
    }
}

// Applying through the loaded-then-projected path: what describe renders is
// the applied manifest's content.
#[tokio::test]
async fn describe_after_apply_reflects_manifest() {
    let shared = stores();
    let mut broker =
        connection_broker(shared.clone(), BrokerRequest::with_manifest(MYSQL_MANIFEST)).await;
    broker.apply().await.unwrap();

    let reader = connection_broker(shared, BrokerRequest::named("sales-replica")).await;
    let described = reader.describe().await.unwrap().data.unwrap();
    assert_eq!(described["kind"], "SqlConnection");
    assert_eq!(described["metadata"]["name"], "sales-replica");
    assert_eq!(described["spec"]["hostname"], "mysql.example.com");
    assert_eq!(described["spec"]["password"], "sales-replica-password");
    assert!(described["status"]["created"].is_string());
}
