//! Ledger reads over fixture ledgers: windows, verification, shaping, and
//! multi-identity batches.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};

use notary::core::{token, ChainError};
use notary::store::{
    InsertResult, LedgerSnapshot, MemoryStore, StatementStore, StoreError, StoredStatement,
    TimeRange,
};
use notary::{
    IdentityRequest, InputError, LedgerError, LedgerReader, ReadOptions, ReaderConfig, Token,
};
use notary_testkit::{book, rated_ledgers, LedgerFixture};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// alice: rate Dune, rate Emma, clear Dune, rate Dune (newest).
async fn alice() -> (Arc<MemoryStore>, LedgerFixture, Vec<Token>) {
    let mut ledger = LedgerFixture::new("alice");
    let ids = vec![
        ledger.rate(book("Dune")),
        ledger.rate(book("Emma")),
        ledger.clear(book("Dune")),
        ledger.rate(book("Dune")),
    ];
    let store = Arc::new(MemoryStore::new());
    ledger.load_into(store.as_ref()).await.unwrap();
    (store, ledger, ids)
}

fn reader(store: &Arc<MemoryStore>) -> LedgerReader<MemoryStore> {
    LedgerReader::with_shared_store(Arc::clone(store), ReaderConfig::default())
}

fn ids(records: &[Value]) -> Vec<String> {
    records
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

fn tokens(ids: &[&Token]) -> Vec<String> {
    ids.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn test_full_read_is_newest_first() {
    let (store, ledger, ids_) = alice().await;
    let out = reader(&store)
        .read_ledger(&ledger.identity, &ReadOptions::default().include_id().check_previous())
        .await
        .unwrap();
    assert_eq!(ids(&out), tokens(&[&ids_[3], &ids_[2], &ids_[1], &ids_[0]]));
}

#[tokio::test]
async fn test_unknown_revoke_at_is_empty() {
    init_tracing();
    let (store, ledger, _) = alice().await;
    let options = ReadOptions::default().revoke_at("nonexistent-token");
    let out = reader(&store).read_ledger(&ledger.identity, &options).await.unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_empty_revoke_at_reads_full_ledger() {
    let (store, ledger, ids_) = alice().await;
    let options: ReadOptions =
        serde_json::from_value(json!({"revokeAt": "", "includeId": true})).unwrap();
    let out = reader(&store).read_ledger(&ledger.identity, &options).await.unwrap();
    assert_eq!(ids(&out), tokens(&[&ids_[3], &ids_[2], &ids_[1], &ids_[0]]));

    let built = ReadOptions::default().include_id().revoke_at("");
    let out = reader(&store).read_ledger(&ledger.identity, &built).await.unwrap();
    assert_eq!(out.len(), 4);
}

#[tokio::test]
async fn test_revoke_at_is_inclusive() {
    let (store, ledger, ids_) = alice().await;
    let options = ReadOptions::default()
        .include_id()
        .check_previous()
        .revoke_at(ids_[1].clone());
    let out = reader(&store).read_ledger(&ledger.identity, &options).await.unwrap();
    assert_eq!(ids(&out), tokens(&[&ids_[1], &ids_[0]]));
}

#[tokio::test]
async fn test_after_is_exclusive_and_skips_genesis_check() {
    let (store, ledger, ids_) = alice().await;
    let cutoff = ledger.parsed()[2].time(); // time of ids_[1]
    let options = ReadOptions::default().include_id().check_previous().after(cutoff);
    let out = reader(&store).read_ledger(&ledger.identity, &options).await.unwrap();
    assert_eq!(ids(&out), tokens(&[&ids_[3], &ids_[2]]));
}

#[tokio::test]
async fn test_distinct_over_window() {
    let (store, ledger, ids_) = alice().await;
    let reader = reader(&store);

    // Newest rate of Dune comes after the clear, so it survives.
    let full = reader
        .read_ledger(&ledger.identity, &ReadOptions::default().include_id().distinct())
        .await
        .unwrap();
    assert_eq!(ids(&full), tokens(&[&ids_[3], &ids_[1]]));

    // As of the clear, Dune is revoked.
    let as_of_clear = ReadOptions::default()
        .include_id()
        .distinct()
        .revoke_at(ids_[2].clone());
    let revoked = reader.read_ledger(&ledger.identity, &as_of_clear).await.unwrap();
    assert_eq!(ids(&revoked), tokens(&[&ids_[1]]));
}

#[tokio::test]
async fn test_omit_does_not_change_distinct_keys() {
    let (store, ledger, _) = alice().await;
    let options = ReadOptions::default()
        .distinct()
        .omit(["rate", "clear", "I", "signature", "previous"]);
    let out = reader(&store).read_ledger(&ledger.identity, &options).await.unwrap();
    assert_eq!(out.len(), 2);
    for record in &out {
        let keys: Vec<_> = record.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["statement", "time"]);
    }
}

#[tokio::test]
async fn test_unordered_output_keeps_stored_layout() {
    let (store, ledger, _) = alice().await;
    let out = reader(&store)
        .read_ledger(&ledger.identity, &ReadOptions::default().unordered())
        .await
        .unwrap();
    let stored = &ledger.newest_first()[0];
    let keys: Vec<_> = out[0].as_object().unwrap().keys().cloned().collect();
    let stored_keys: Vec<_> = stored.fields.keys().cloned().collect();
    assert_eq!(keys, stored_keys);
}

#[tokio::test]
async fn test_input_errors() {
    let (store, ledger, ids_) = alice().await;
    let reader = reader(&store);

    let no_id = ReadOptions::default().check_previous();
    assert!(matches!(
        reader.read_ledger(&ledger.identity, &no_id).await,
        Err(LedgerError::Input(InputError::CheckPreviousWithoutId))
    ));

    let both = ReadOptions::default()
        .revoke_at(ids_[0].clone())
        .after(ledger.parsed()[3].time());
    assert!(matches!(
        reader.read_ledger(&ledger.identity, &both).await,
        Err(LedgerError::Input(InputError::RevokeAtWithAfter))
    ));
}

#[tokio::test]
async fn test_broken_link_is_chain_integrity_error() {
    init_tracing();
    let (store, ledger, _) = alice().await;

    // A newer statement whose `previous` skips the head.
    let forged = json!({
        "statement": "org.nerdster",
        "time": "2030-01-01T00:00:00Z",
        "I": ledger.key,
        "rate": book("Forged"),
        "previous": "0000000000000000000000000000000000000000",
        "signature": "00",
    });
    let id = token(&forged).unwrap();
    let appended = store
        .append(
            &ledger.identity,
            StoredStatement::new(id, forged.as_object().unwrap().clone()),
        )
        .await
        .unwrap();
    assert_eq!(appended, InsertResult::Inserted);

    let options = ReadOptions::default().include_id().check_previous();
    let result = reader(&store).read_ledger(&ledger.identity, &options).await;
    assert!(matches!(
        result,
        Err(LedgerError::ChainIntegrity {
            source: ChainError::PreviousMismatch { .. },
            ..
        })
    ));
}

#[tokio::test]
async fn test_truncated_ledger_fails_genesis_check() {
    let (store, ledger, _) = alice().await;
    let mut newest = ledger.newest_first();
    newest.pop();
    let truncated = Token::new("truncated");
    store
        .restore(&truncated, LedgerSnapshot::new(newest))
        .await
        .unwrap();

    let options = ReadOptions::default().include_id().check_previous();
    let strict = reader(&store).read_ledger(&truncated, &options).await;
    assert!(matches!(
        strict,
        Err(LedgerError::ChainIntegrity {
            source: ChainError::MissingGenesis { .. },
            ..
        })
    ));

    let lenient = LedgerReader::with_shared_store(
        Arc::clone(&store),
        ReaderConfig {
            require_genesis: false,
            ..ReaderConfig::default()
        },
    );
    assert_eq!(lenient.read_ledger(&truncated, &options).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_snapshot_file_round_trip() {
    let (store, ledger, _) = alice().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alice.json");
    store.snapshot(&ledger.identity).await.unwrap().save(&path).unwrap();

    let restored = MemoryStore::new();
    restored
        .restore(&ledger.identity, LedgerSnapshot::load(&path).unwrap())
        .await
        .unwrap();
    let options = ReadOptions::default().include_id().check_previous();
    let a = reader(&store).read_ledger(&ledger.identity, &options).await.unwrap();
    let b = LedgerReader::new(restored, ReaderConfig::default())
        .read_ledger(&ledger.identity, &options)
        .await
        .unwrap();
    assert_eq!(ids(&a), ids(&b));
}

#[tokio::test]
async fn test_batch_partial_success() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let ledgers = rated_ledgers(&["bob", "carol"], 3);
    for ledger in &ledgers {
        ledger.load_into(store.as_ref()).await.unwrap();
    }

    // dave's ledger is missing its genesis statement.
    let mut dave = LedgerFixture::new("dave");
    dave.rate(book("a"));
    dave.rate(book("b"));
    let mut broken = dave.newest_first();
    broken.pop();
    store
        .restore(&dave.identity, LedgerSnapshot::new(broken))
        .await
        .unwrap();

    let requests = vec![
        IdentityRequest::new(ledgers[0].identity.clone()),
        IdentityRequest::new(dave.identity.clone()),
        IdentityRequest::revoked_at(ledgers[1].identity.clone(), "unknown-marker"),
        IdentityRequest::new(ledgers[1].identity.clone()),
    ];
    let options = ReadOptions::default().include_id().check_previous();
    let entries = reader(&store).read_batch(&requests, &options).await;

    assert_eq!(entries.len(), 4);
    let indexes: Vec<_> = entries.iter().map(|e| e.index).collect();
    assert_eq!(indexes, vec![0, 1, 2, 3]);

    assert_eq!(entries[0].identity, ledgers[0].identity);
    assert_eq!(entries[0].result.as_ref().unwrap().len(), 3);
    assert!(matches!(
        entries[1].result,
        Err(LedgerError::ChainIntegrity { .. })
    ));
    assert!(entries[2].result.as_ref().unwrap().is_empty());
    assert_eq!(entries[3].result.as_ref().unwrap().len(), 3);
}

#[tokio::test]
async fn test_batch_request_revoke_at_overrides_options() {
    let (store, ledger, ids_) = alice().await;
    let requests = vec![IdentityRequest::revoked_at(
        ledger.identity.clone(),
        ids_[0].clone(),
    )];
    let options = ReadOptions::default()
        .include_id()
        .revoke_at(ids_[3].clone());
    let entries = reader(&store).read_batch(&requests, &options).await;
    assert_eq!(
        ids(entries[0].result.as_ref().unwrap()),
        tokens(&[&ids_[0]])
    );
}

#[tokio::test]
async fn test_batch_stream_yields_every_entry() {
    let store = Arc::new(MemoryStore::new());
    let ledgers = rated_ledgers(&["a", "b", "c", "d", "e"], 2);
    for ledger in &ledgers {
        ledger.load_into(store.as_ref()).await.unwrap();
    }
    let requests: Vec<_> = ledgers
        .iter()
        .map(|l| IdentityRequest::new(l.identity.clone()))
        .collect();

    let reader = LedgerReader::with_shared_store(
        Arc::clone(&store),
        ReaderConfig {
            batch_concurrency: 2,
            ..ReaderConfig::default()
        },
    );
    let options = ReadOptions::default();
    let mut seen: Vec<usize> = reader
        .read_batch_stream(&requests, &options)
        .map(|entry| {
            assert_eq!(entry.result.unwrap().len(), 2);
            entry.index
        })
        .collect()
        .await;
    seen.sort();
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
}

/// A store whose reads for one identity never finish in time.
struct SlowStore {
    inner: MemoryStore,
    slow: Token,
}

#[async_trait]
impl StatementStore for SlowStore {
    async fn get(&self, identity: &Token, id: &Token) -> Result<Option<StoredStatement>, StoreError> {
        self.inner.get(identity, id).await
    }

    async fn query(&self, identity: &Token, range: TimeRange) -> Result<Vec<StoredStatement>, StoreError> {
        if *identity == self.slow {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        self.inner.query(identity, range).await
    }

    async fn append(&self, identity: &Token, statement: StoredStatement) -> Result<InsertResult, StoreError> {
        self.inner.append(identity, statement).await
    }

    async fn snapshot(&self, identity: &Token) -> Result<LedgerSnapshot, StoreError> {
        self.inner.snapshot(identity).await
    }

    async fn restore(&self, identity: &Token, snapshot: LedgerSnapshot) -> Result<usize, StoreError> {
        self.inner.restore(identity, snapshot).await
    }

    async fn identities(&self) -> Result<Vec<Token>, StoreError> {
        self.inner.identities().await
    }
}

#[tokio::test]
async fn test_batch_timeout_is_per_identity() {
    let ledgers = rated_ledgers(&["fast", "slow"], 1);
    let store = SlowStore {
        inner: MemoryStore::new(),
        slow: ledgers[1].identity.clone(),
    };
    for ledger in &ledgers {
        ledger.load_into(&store).await.unwrap();
    }

    let reader = LedgerReader::new(
        store,
        ReaderConfig {
            read_timeout: Some(Duration::from_millis(50)),
            ..ReaderConfig::default()
        },
    );
    let requests: Vec<_> = ledgers
        .iter()
        .map(|l| IdentityRequest::new(l.identity.clone()))
        .collect();
    let entries = reader.read_batch(&requests, &ReadOptions::default()).await;

    assert_eq!(entries[0].result.as_ref().unwrap().len(), 1);
    assert!(matches!(entries[1].result, Err(LedgerError::Timeout { .. })));
}
