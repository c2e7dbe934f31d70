//! Test fixtures and helpers.
//!
//! [`LedgerFixture`] writes well-formed ledgers: every statement carries an
//! identity key, a strictly later time than the one before it, a `previous`
//! link to its predecessor's token, and a stand-in signature.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Map, Value};

use notary_core::{token, Sha1Digest, Statement, Timestamp, Token, Verb};
use notary_store::{LedgerSnapshot, StatementStore, StoreError, StoredStatement};

/// Builds one identity's ledger, oldest statement first.
pub struct LedgerFixture {
    /// The identity key (`I`) every statement is made with.
    pub key: Value,
    /// Token of the identity key: the ledger's name in a store.
    pub identity: Token,
    domain: String,
    start: DateTime<Utc>,
    step: Duration,
    statements: Vec<StoredStatement>,
}

impl LedgerFixture {
    /// A ledger for a deterministic key derived from `name`.
    pub fn new(name: &str) -> Self {
        let key = json!({
            "crv": "Ed25519",
            "kty": "OKP",
            "x": hex::encode(name.as_bytes()),
        });
        let identity = token(&key).expect("identity key is plain JSON");
        Self {
            key,
            identity,
            domain: "org.nerdster".to_string(),
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            step: Duration::minutes(1),
            statements: Vec::new(),
        }
    }

    /// Use `domain` for the `statement` field of later statements.
    pub fn domain(mut self, domain: &str) -> Self {
        self.domain = domain.to_string();
        self
    }

    /// Time of the next statement.
    pub fn next_time(&self) -> Timestamp {
        Timestamp::from_datetime(self.start + self.step * self.statements.len() as i32)
    }

    /// Append a statement; returns its token.
    pub fn push(&mut self, verb: Verb, subject: Value, with: Option<Value>) -> Token {
        let mut record = Map::new();
        record.insert("statement".into(), Value::String(self.domain.clone()));
        record.insert("time".into(), Value::String(self.next_time().to_string()));
        record.insert("I".into(), self.key.clone());
        record.insert(verb.as_str().into(), subject);
        if let Some(with) = with {
            record.insert("with".into(), with);
        }
        if let Some(previous) = self.head() {
            record.insert("previous".into(), Value::String(previous.to_string()));
        }
        let stand_in = Sha1Digest::hash(format!("{}:{}", self.identity, self.len()).as_bytes());
        record.insert("signature".into(), Value::String(stand_in.to_hex()));

        let record = Value::Object(record);
        let id = token(&record).expect("fixture statement is plain JSON");
        let fields = match record {
            Value::Object(fields) => fields,
            _ => unreachable!(),
        };
        self.statements.push(StoredStatement::new(id.clone(), fields));
        id
    }

    pub fn rate(&mut self, subject: Value) -> Token {
        self.push(Verb::Rate, subject, None)
    }

    pub fn clear(&mut self, subject: Value) -> Token {
        self.push(Verb::Clear, subject, None)
    }

    pub fn trust(&mut self, key: Value, moniker: &str) -> Token {
        self.push(Verb::Trust, key, Some(json!({ "moniker": moniker })))
    }

    pub fn relate(&mut self, subject: Value, other: Value) -> Token {
        self.push(Verb::Relate, subject, Some(json!({ "otherSubject": other })))
    }

    /// Token of the newest statement.
    pub fn head(&self) -> Option<&Token> {
        self.statements.last().map(|s| &s.id)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Stored records, newest first.
    pub fn newest_first(&self) -> Vec<StoredStatement> {
        self.statements.iter().rev().cloned().collect()
    }

    /// Parsed statements with ids, newest first.
    pub fn parsed(&self) -> Vec<Statement> {
        self.newest_first()
            .into_iter()
            .map(|s| s.into_statement().expect("fixture statements parse"))
            .collect()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::new(self.newest_first())
    }

    /// Replace this identity's ledger in `store` with the fixture.
    pub async fn load_into<S: StatementStore + ?Sized>(&self, store: &S) -> Result<usize, StoreError> {
        store.restore(&self.identity, self.snapshot()).await
    }
}

/// A book subject.
pub fn book(title: &str) -> Value {
    json!({ "contentType": "book", "title": title })
}

/// A ledger per name, each with `count` rated books.
pub fn rated_ledgers(names: &[&str], count: usize) -> Vec<LedgerFixture> {
    names
        .iter()
        .map(|name| {
            let mut ledger = LedgerFixture::new(name);
            for i in 0..count {
                ledger.rate(book(&format!("{} {}", name, i)));
            }
            ledger
        })
        .collect()
}
