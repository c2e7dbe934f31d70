//! Chain verification over newest-first windows of a ledger.
//!
//! A ledger is a single-writer hash chain: each statement names the token of
//! the statement before it in `previous`, and times strictly decrease walking
//! back. These checks fail on the first violation and never repair.

use crate::address::ContentAddresser;
use crate::error::ChainError;
use crate::statement::Statement;
use crate::types::Token;

/// Verify adjacent links of a newest-first window.
///
/// For every pair (newer, older): `older.id == newer.previous` and
/// `older.time < newer.time`. Every statement must carry its id. Empty and
/// single-statement windows pass.
pub fn verify_chain(statements: &[Statement]) -> Result<(), ChainError> {
    let ids = statements
        .iter()
        .map(require_id)
        .collect::<Result<Vec<_>, _>>()?;

    for (pair, pair_ids) in statements.windows(2).zip(ids.windows(2)) {
        let (newer, older) = (&pair[0], &pair[1]);
        let (newer_id, older_id) = (pair_ids[0], pair_ids[1]);

        if newer.previous() != Some(older_id) {
            return Err(ChainError::PreviousMismatch {
                newer: newer_id.clone(),
                expected: newer.previous().cloned(),
                found: older_id.clone(),
            });
        }

        if older.time() >= newer.time() {
            return Err(ChainError::NotDescending {
                newer: newer_id.clone(),
                newer_time: newer.time(),
                older: older_id.clone(),
                older_time: older.time(),
            });
        }
    }

    Ok(())
}

/// Verify a window that must reach the start of the ledger.
///
/// Same as [`verify_chain`], and the oldest statement must be the genesis
/// statement (no `previous`).
pub fn verify_chain_from_genesis(statements: &[Statement]) -> Result<(), ChainError> {
    verify_chain(statements)?;

    if let Some(oldest) = statements.last() {
        if let Some(previous) = oldest.previous() {
            return Err(ChainError::MissingGenesis {
                oldest: require_id(oldest)?.clone(),
                previous: previous.clone(),
            });
        }
    }

    Ok(())
}

/// Check that each statement's id is the token of its stored fields.
pub fn verify_ids(
    addresser: &ContentAddresser,
    statements: &[Statement],
) -> Result<(), ChainError> {
    for statement in statements {
        let claimed = require_id(statement)?;
        let computed = statement.compute_token(addresser)?;
        if *claimed != computed {
            return Err(ChainError::IdMismatch {
                claimed: claimed.clone(),
                computed,
            });
        }
    }
    Ok(())
}

fn require_id(statement: &Statement) -> Result<&Token, ChainError> {
    statement.id().ok_or(ChainError::MissingId {
        time: statement.time(),
    })
}
