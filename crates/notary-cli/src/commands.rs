//! Subcommand implementations.
//!
//! Ledgers are loaded from snapshot files into an in-memory store, one per
//! `IDENTITY=SNAPSHOT` argument, and read through the library reader.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::{json, Value};

use notary::core::CanonicalEncoder;
use notary::store::{LedgerSnapshot, MemoryStore, StatementStore};
use notary::{IdentityRequest, LedgerReader, ReadOptions, ReaderConfig, Timestamp, Token};

/// A ledger snapshot file and the identity it belongs to.
#[derive(Debug, Clone)]
pub struct LedgerSource {
    pub identity: Token,
    pub path: PathBuf,
}

impl FromStr for LedgerSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((identity, path)) if !identity.is_empty() && !path.is_empty() => Ok(Self {
                identity: Token::new(identity),
                path: PathBuf::from(path),
            }),
            _ => Err(format!("expected IDENTITY=SNAPSHOT, got '{}'", s)),
        }
    }
}

/// Reader settings shared by `verify` and `export`.
#[derive(Debug, Clone, Args)]
pub struct ReaderArgs {
    /// Accept verified windows that stop short of the genesis statement
    #[arg(long)]
    pub no_genesis: bool,

    /// Recompute every statement token and compare it with the stored id
    #[arg(long)]
    pub verify_ids: bool,

    /// Ledgers read at once
    #[arg(long, default_value = "8")]
    pub concurrency: usize,

    /// Per-ledger read deadline in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl ReaderArgs {
    pub fn config(&self) -> ReaderConfig {
        ReaderConfig {
            require_genesis: !self.no_genesis,
            verify_ids: self.verify_ids,
            batch_concurrency: self.concurrency,
            read_timeout: self.timeout_ms.map(Duration::from_millis),
            ..ReaderConfig::default()
        }
    }
}

/// Export flags, mirroring [`ReadOptions`].
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// One identity: a bare token, a JSON string, or {"token": "revokeAt"}
    #[arg(long, conflicts_with = "tokens", required_unless_present = "tokens")]
    pub token: Option<String>,

    /// Several identities as a JSON array of the `--token` forms
    #[arg(long)]
    pub tokens: Option<String>,

    /// Only statements strictly newer than this RFC 3339 time
    #[arg(long)]
    pub after: Option<Timestamp>,

    /// Verify the chain of the selected window (needs --include-id)
    #[arg(long)]
    pub check_previous: bool,

    /// Keep only the latest effective statement per subject
    #[arg(long)]
    pub distinct: bool,

    /// Emit each statement's token as "id"
    #[arg(long)]
    pub include_id: bool,

    /// JSON array of keys to drop from the output
    #[arg(long)]
    pub omit: Option<String>,

    /// Keep stored key order instead of canonical order
    #[arg(long)]
    pub no_order: bool,
}

impl ExportArgs {
    pub fn read_options(&self) -> Result<ReadOptions> {
        let mut options = ReadOptions::default();
        if let Some(after) = self.after {
            options = options.after(after);
        }
        if self.check_previous {
            options = options.check_previous();
        }
        if self.distinct {
            options = options.distinct();
        }
        if self.include_id {
            options = options.include_id();
        }
        if let Some(omit) = &self.omit {
            let keys: Vec<String> = serde_json::from_str(omit)
                .with_context(|| format!("--omit must be a JSON array of strings, got {}", omit))?;
            options = options.omit(keys);
        }
        if self.no_order {
            options = options.unordered();
        }
        options.validate()?;
        Ok(options)
    }
}

/// Parse JSON from a file, or from stdin when no file is given.
pub fn read_json(path: Option<&Path>) -> Result<Value> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("input is not valid JSON")
}

pub fn token(value: &Value) -> Result<String> {
    Ok(notary::token(value)?.into_string())
}

pub fn canonicalize(value: &Value) -> Result<String> {
    Ok(CanonicalEncoder::default().canonical_text(value)?)
}

/// Load every snapshot into one in-memory store.
pub async fn load_store(sources: &[LedgerSource]) -> Result<MemoryStore> {
    let store = MemoryStore::new();
    for source in sources {
        let snapshot = LedgerSnapshot::load(&source.path)
            .with_context(|| format!("failed to load snapshot {}", source.path.display()))?;
        let count = store.restore(&source.identity, snapshot).await?;
        tracing::info!(
            identity = %source.identity,
            path = %source.path.display(),
            statements = count,
            "loaded ledger"
        );
    }
    Ok(store)
}

/// Verify each ledger in full. Returns one report line per ledger and the
/// number that failed.
pub async fn verify(sources: &[LedgerSource], args: &ReaderArgs) -> Result<(Vec<String>, usize)> {
    let store = load_store(sources).await?;
    let mut config = args.config();
    config.verify_ids = true;
    let reader = LedgerReader::new(store, config);

    let options = ReadOptions::default().include_id().check_previous();
    let mut report = Vec::with_capacity(sources.len());
    let mut failed = 0;
    for source in sources {
        match reader.read_ledger(&source.identity, &options).await {
            Ok(statements) => {
                report.push(format!("{}: ok ({} statements)", source.identity, statements.len()))
            }
            Err(e) => {
                failed += 1;
                report.push(format!("{}: FAILED: {}", source.identity, e));
            }
        }
    }
    Ok((report, failed))
}

/// Run the reader over the loaded ledgers.
///
/// `--token` yields the statements of one ledger. `--tokens` yields one slot
/// per requested identity: its statements, or an object naming the error.
pub async fn export(sources: &[LedgerSource], reader_args: &ReaderArgs, args: &ExportArgs) -> Result<Value> {
    let options = args.read_options()?;
    let reader = LedgerReader::new(load_store(sources).await?, reader_args.config());

    if let Some(spec) = &args.token {
        let requests = IdentityRequest::parse(spec)?;
        let request = match requests.as_slice() {
            [request] => request,
            _ => bail!("--token names {} identities; use --tokens for several", requests.len()),
        };
        return Ok(Value::Array(reader.read_request(request, &options).await?));
    }

    let spec = args.tokens.as_deref().unwrap_or_default();
    let requests = IdentityRequest::parse(spec)?;
    let results = reader
        .read_batch(&requests, &options)
        .await
        .into_iter()
        .map(|entry| match entry.result {
            Ok(statements) => Value::Array(statements),
            Err(e) => json!({
                "identity": entry.identity.as_str(),
                "error": e.to_string(),
            }),
        })
        .collect();
    Ok(Value::Array(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notary_testkit::{book, LedgerFixture};

    fn reader_args() -> ReaderArgs {
        ReaderArgs {
            no_genesis: false,
            verify_ids: false,
            concurrency: 4,
            timeout_ms: None,
        }
    }

    fn export_args(token: &str) -> ExportArgs {
        ExportArgs {
            token: Some(token.to_string()),
            tokens: None,
            after: None,
            check_previous: false,
            distinct: false,
            include_id: false,
            omit: None,
            no_order: false,
        }
    }

    fn saved_ledger(dir: &Path, name: &str) -> (LedgerFixture, LedgerSource) {
        let mut ledger = LedgerFixture::new(name);
        ledger.rate(book("Dune"));
        ledger.rate(book("Emma"));
        ledger.clear(book("Dune"));
        let path = dir.join(format!("{}.json", name));
        ledger.snapshot().save(&path).unwrap();
        let source = LedgerSource {
            identity: ledger.identity.clone(),
            path,
        };
        (ledger, source)
    }

    #[test]
    fn test_ledger_source_parsing() {
        let source: LedgerSource = "abc=ledgers/abc.json".parse().unwrap();
        assert_eq!(source.identity.as_str(), "abc");
        assert_eq!(source.path, PathBuf::from("ledgers/abc.json"));

        assert!("abc".parse::<LedgerSource>().is_err());
        assert!("=file.json".parse::<LedgerSource>().is_err());
        assert!("abc=".parse::<LedgerSource>().is_err());
    }

    #[test]
    fn test_read_options_from_flags() {
        let mut args = export_args("abc");
        args.include_id = true;
        args.check_previous = true;
        args.omit = Some(r#"["signature", "I"]"#.to_string());
        let options = args.read_options().unwrap();
        assert!(options.include_id && options.check_previous);
        assert_eq!(options.omit, vec!["signature", "I"]);
        assert!(options.order_statements);

        let mut unchecked = export_args("abc");
        unchecked.check_previous = true;
        assert!(unchecked.read_options().is_err());

        let mut bad_omit = export_args("abc");
        bad_omit.omit = Some("signature".to_string());
        assert!(bad_omit.read_options().is_err());
    }

    #[test]
    fn test_token_and_canonicalize() {
        let value = json!({"signature": "s", "b": 1, "statement": "x"});
        assert_eq!(
            canonicalize(&value).unwrap(),
            "{\n  \"statement\": \"x\",\n  \"b\": 1,\n  \"signature\": \"s\"\n}"
        );
        assert_eq!(token(&json!("abc")).unwrap(), "abc");
        assert_eq!(token(&value).unwrap().len(), 40);
    }

    #[tokio::test]
    async fn test_verify_reports_each_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let (_, good) = saved_ledger(dir.path(), "alice");

        let (ledger, _) = saved_ledger(dir.path(), "bob");
        let mut truncated = ledger.newest_first();
        truncated.pop();
        let broken_path = dir.path().join("bob-truncated.json");
        LedgerSnapshot::new(truncated).save(&broken_path).unwrap();
        let broken = LedgerSource {
            identity: ledger.identity.clone(),
            path: broken_path,
        };

        let (report, failed) = verify(&[good, broken], &reader_args()).await.unwrap();
        assert_eq!(failed, 1);
        assert!(report[0].ends_with("ok (3 statements)"));
        assert!(report[1].contains("FAILED"));
    }

    #[tokio::test]
    async fn test_export_single_and_batch() {
        let dir = tempfile::tempdir().unwrap();
        let (alice, alice_source) = saved_ledger(dir.path(), "alice");
        let (bob, bob_source) = saved_ledger(dir.path(), "bob");
        let sources = [alice_source, bob_source];

        let mut single = export_args(alice.identity.as_str());
        single.distinct = true;
        let out = export(&sources, &reader_args(), &single).await.unwrap();
        assert_eq!(out.as_array().unwrap().len(), 1);
        assert_eq!(out[0]["rate"]["title"], "Emma");

        let mut batch = export_args("");
        batch.token = None;
        batch.tokens = Some(format!(r#"["{}", "{}", "unknown"]"#, alice.identity, bob.identity));
        let out = export(&sources, &reader_args(), &batch).await.unwrap();
        let slots = out.as_array().unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].as_array().unwrap().len(), 3);
        assert_eq!(slots[1].as_array().unwrap().len(), 3);
        assert_eq!(slots[2], json!([]));
    }

    #[tokio::test]
    async fn test_export_token_must_name_one_identity() {
        let args = export_args(r#"["a", "b"]"#);
        assert!(export(&[], &reader_args(), &args).await.is_err());
    }
}
