#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use auth_records::{
    AuthRecordsConfig, AuthRecordsLocalClient, AuthRecordsModule, InMemoryAuthRecordBackend,
    ModuleDeps, Service,
};
use auth_records_sdk::{
    AuthRecord, AuthRecordBackendV1, AuthRecordsClientV1, AuthRecordsError, ConfigurationStatus,
    ReadinessStatus,
};
use signature_patch::{LoadedModule, ModuleRegistry, SignatureVerifier, VerifyError};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Get(String),
    Set(String),
    Delete(String),
    GetAll,
}

/// Wraps the in-memory store and records every call made against it.
#[derive(Default)]
struct RecordingBackend {
    inner: InMemoryAuthRecordBackend,
    calls: Mutex<Vec<Call>>,
    fail_deletes_of: Option<String>,
    fail_everything: bool,
    ready: Option<bool>,
}

impl RecordingBackend {
    fn with_records(records: impl IntoIterator<Item = AuthRecord>) -> Self {
        Self {
            inner: InMemoryAuthRecordBackend::with_records(records),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), AuthRecordsError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_everything {
            return Err(AuthRecordsError::backend("store offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthRecordBackendV1 for RecordingBackend {
    async fn get(&self, api_url: &str) -> Result<Option<AuthRecord>, AuthRecordsError> {
        self.record(Call::Get(api_url.to_owned()))?;
        self.inner.get(api_url).await
    }

    async fn set(&self, record: AuthRecord) -> Result<(), AuthRecordsError> {
        self.record(Call::Set(record.api_url.clone()))?;
        self.inner.set(record).await
    }

    async fn delete(&self, api_url: &str) -> Result<(), AuthRecordsError> {
        self.record(Call::Delete(api_url.to_owned()))?;
        if self.fail_deletes_of.as_deref() == Some(api_url) {
            return Err(AuthRecordsError::NotFound);
        }
        self.inner.delete(api_url).await
    }

    async fn get_all(&self) -> Result<Vec<AuthRecord>, AuthRecordsError> {
        self.record(Call::GetAll)?;
        self.inner.get_all().await
    }

    async fn readiness_probe(&self) -> Result<Option<ReadinessStatus>, AuthRecordsError> {
        Ok(self.ready.map(|ready| ReadinessStatus { ready }))
    }
}

/// Counts WARN events seen by the thread-local subscriber.
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn record(url: &str) -> AuthRecord {
    AuthRecord::new("app-1", url, "token-1", r#"{"keys":[]}"#)
}

fn client(backend: &Arc<RecordingBackend>) -> AuthRecordsLocalClient {
    AuthRecordsLocalClient::new(Arc::new(Service::new(backend.clone())))
}

#[tokio::test]
async fn test_read_canonical_hit_queries_once() {
    let backend = Arc::new(RecordingBackend::with_records([record("https://x/graphql/")]));

    let found = client(&backend).get("http://x/graphql/").await.unwrap().unwrap();

    assert_eq!(found.api_url, "https://x/graphql/");
    assert_eq!(backend.calls(), [Call::Get("https://x/graphql/".into())]);
}

#[tokio::test]
async fn test_read_insecure_hit_queries_twice_and_canonicalizes() {
    let backend = Arc::new(RecordingBackend::with_records([record("http://x/graphql/")]));

    let found = client(&backend).get("http://x/graphql/").await.unwrap().unwrap();

    assert_eq!(found.api_url, "https://x/graphql/");
    assert_eq!(found.token, "token-1");
    assert_eq!(
        backend.calls(),
        [
            Call::Get("https://x/graphql/".into()),
            Call::Get("http://x/graphql/".into()),
        ]
    );
}

#[tokio::test]
async fn test_read_https_request_finds_http_registration() {
    let backend = Arc::new(RecordingBackend::with_records([record("http://x/graphql/")]));

    let found = client(&backend).get("https://x/graphql/").await.unwrap().unwrap();

    assert_eq!(found.api_url, "https://x/graphql/");
    assert_eq!(backend.calls().len(), 2);
}

#[tokio::test]
async fn test_read_schemeless_identity_unchanged() {
    let backend = Arc::new(RecordingBackend::with_records([record("x/graphql/")]));

    let found = client(&backend).get("x/graphql/").await.unwrap().unwrap();

    // Schemeless identities have no canonical rewrite.
    assert_eq!(found.api_url, "x/graphql/");
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn test_read_miss_queries_three_times_and_warns_once() {
    let warnings = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let backend = Arc::new(RecordingBackend::default());
    let found = client(&backend).get("http://x/graphql/").await.unwrap();

    assert!(found.is_none());
    assert_eq!(
        backend.calls(),
        [
            Call::Get("https://x/graphql/".into()),
            Call::Get("http://x/graphql/".into()),
            Call::Get("http://x/graphql/".into()),
        ]
    );
    assert_eq!(warnings.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_read_propagates_backend_failure() {
    let backend = Arc::new(RecordingBackend {
        fail_everything: true,
        ..RecordingBackend::default()
    });

    let err = client(&backend).get("https://x/graphql/").await.unwrap_err();

    assert!(matches!(err, AuthRecordsError::Backend(ref m) if m == "store offline"));
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn test_write_stores_canonical_and_reads_back() {
    let backend = Arc::new(RecordingBackend::default());
    let client = client(&backend);
    let original = record("http://x/graphql/");

    client.set(original.clone()).await.unwrap();
    let read = client.get("http://x/graphql/").await.unwrap().unwrap();

    assert_eq!(backend.inner.stored_urls(), ["https://x/graphql/"]);
    assert_eq!(
        read,
        AuthRecord {
            api_url: "https://x/graphql/".into(),
            ..original
        }
    );
    assert_eq!(backend.calls()[0], Call::Set("https://x/graphql/".into()));
}

#[tokio::test]
async fn test_delete_issues_two_calls_and_tolerates_missing_targets() {
    let backend = Arc::new(RecordingBackend {
        inner: InMemoryAuthRecordBackend::with_records([record("http://x/graphql/")]),
        fail_deletes_of: Some("https://x/graphql/".into()),
        ..RecordingBackend::default()
    });

    client(&backend).delete("http://x/graphql/").await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.contains(&Call::Delete("https://x/graphql/".into())));
    assert!(calls.contains(&Call::Delete("http://x/graphql/".into())));
    assert_eq!(backend.inner.count(), 0);
}

#[tokio::test]
async fn test_delete_completes_when_both_targets_fail() {
    let backend = Arc::new(RecordingBackend {
        fail_everything: true,
        ..RecordingBackend::default()
    });

    client(&backend).delete("https://x/graphql/").await.unwrap();

    assert_eq!(backend.calls().len(), 2);
}

#[tokio::test]
async fn test_enumerate_canonicalizes_and_keeps_order() {
    let backend = Arc::new(RecordingBackend::with_records([
        record("http://b/graphql/"),
        record("https://a/graphql/"),
        record("http://c/graphql/"),
    ]));

    let all = client(&backend).get_all().await.unwrap();

    let urls: Vec<_> = all.iter().map(|r| r.api_url.as_str()).collect();
    assert_eq!(urls, ["https://b/graphql/", "https://a/graphql/", "https://c/graphql/"]);
    assert_eq!(backend.calls(), [Call::GetAll]);
}

#[tokio::test]
async fn test_probes_forward_or_default() {
    let backend = Arc::new(RecordingBackend {
        ready: Some(false),
        ..RecordingBackend::default()
    });
    let client = client(&backend);

    assert_eq!(client.is_ready().await.unwrap(), ReadinessStatus { ready: false });
    // No configuration probe on this backend.
    assert_eq!(
        client.is_configured().await.unwrap(),
        ConfigurationStatus::CONFIGURED
    );

    let plain = AuthRecordsLocalClient::new(Arc::new(Service::new(Arc::new(
        InMemoryAuthRecordBackend::new(),
    ))));
    assert_eq!(plain.is_ready().await.unwrap(), ReadinessStatus::READY);
}

#[tokio::test]
async fn test_store_scenarios() {
    let empty = Arc::new(RecordingBackend::default());
    assert!(client(&empty).get("http://x/graphql/").await.unwrap().is_none());

    let seeded = Arc::new(RecordingBackend::with_records([record("http://x/graphql/")]));
    let found = client(&seeded).get("http://x/graphql/").await.unwrap().unwrap();
    assert_eq!(found.api_url, "https://x/graphql/");
}

struct RejectingVerifier;

#[async_trait]
impl SignatureVerifier for RejectingVerifier {
    async fn verify(
        &self,
        _jwks: &str,
        _signature: &str,
        _raw_body: &[u8],
    ) -> Result<(), VerifyError> {
        Err(VerifyError::Rejected("bad signature".into()))
    }
}

#[tokio::test]
async fn test_module_init_wires_client_and_patcher() {
    let registry = Arc::new(ModuleRegistry::new());
    let verify_module = registry
        .register(
            LoadedModule::new("node_modules/app-sdk/dist/verify-signature.js")
                .with_export("verifySignatureWithJwks", Arc::new(RejectingVerifier)),
        )
        .unwrap();

    let module = AuthRecordsModule::new();
    let deps = ModuleDeps {
        backend: Arc::new(InMemoryAuthRecordBackend::new()),
        module_registry: Some(registry.clone()),
    };
    let client = module.init(&AuthRecordsConfig::default(), deps).await.unwrap();

    client.set(record("http://x/graphql/")).await.unwrap();
    assert!(client.get("https://x/graphql/").await.unwrap().is_some());

    let verifier = verify_module.resolve("verifySignatureWithJwks").unwrap().unwrap();
    assert!(verifier.verify("{}", "sig", b"payload").await.is_ok());
    assert_eq!(module.patcher().unwrap().patched_targets().len(), 1);

    let again = ModuleDeps {
        backend: Arc::new(InMemoryAuthRecordBackend::new()),
        module_registry: None,
    };
    assert!(module.init(&AuthRecordsConfig::default(), again).await.is_err());
}

#[tokio::test]
async fn test_module_init_without_registry_skips_patcher() {
    let module = AuthRecordsModule::new();
    let deps = ModuleDeps {
        backend: Arc::new(InMemoryAuthRecordBackend::new()),
        module_registry: None,
    };
    module.init(&AuthRecordsConfig::default(), deps).await.unwrap();
    assert!(module.patcher().is_none());
}
