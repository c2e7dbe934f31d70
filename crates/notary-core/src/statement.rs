//! Statement: one timestamped assertion in an identity's ledger.
//!
//! Raw records are parsed once, at the boundary, into a typed view (verb,
//! subject, paired subject, time, previous). The raw field map is kept
//! untouched for output, so dropping fields from the output never changes
//! how the statement is verified or reduced.

use serde_json::{Map, Value};

use crate::address::ContentAddresser;
use crate::error::{CoreError, StatementError};
use crate::types::{Timestamp, Token};
use crate::verb::Verb;

/// Output key carrying a statement's id.
pub const ID_FIELD: &str = "id";

const TIME: &str = "time";
const PREVIOUS: &str = "previous";
const WITH: &str = "with";
const OTHER_SUBJECT: &str = "otherSubject";

/// A parsed statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    id: Option<Token>,
    time: Timestamp,
    verb: Verb,
    subject: Value,
    other_subject: Option<Value>,
    previous: Option<Token>,
    fields: Map<String, Value>,
}

impl Statement {
    /// Parse a raw record.
    pub fn from_record(id: Option<Token>, record: Value) -> Result<Self, StatementError> {
        match record {
            Value::Object(fields) => Self::from_fields(id, fields),
            _ => Err(StatementError::NotAnObject),
        }
    }

    /// Parse a raw field map.
    pub fn from_fields(id: Option<Token>, fields: Map<String, Value>) -> Result<Self, StatementError> {
        let time = parse_time(&fields)?;
        let (verb, subject) = parse_verb(&fields)?;

        let other_subject = fields
            .get(WITH)
            .and_then(Value::as_object)
            .and_then(|with| with.get(OTHER_SUBJECT))
            .filter(|v| !v.is_null())
            .cloned();

        let previous = match fields.get(PREVIOUS) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(Token::new(s.as_str())),
            Some(other) => {
                return Err(StatementError::InvalidField {
                    field: PREVIOUS,
                    reason: format!("expected a token string, got {}", other),
                })
            }
        };

        Ok(Self {
            id,
            time,
            verb,
            subject,
            other_subject,
            previous,
            fields,
        })
    }

    pub fn id(&self) -> Option<&Token> {
        self.id.as_ref()
    }

    pub fn set_id(&mut self, id: Option<Token>) {
        self.id = id;
    }

    pub fn time(&self) -> Timestamp {
        self.time
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The value of the verb field.
    pub fn subject(&self) -> &Value {
        &self.subject
    }

    /// `with.otherSubject`, for relational statements.
    pub fn other_subject(&self) -> Option<&Value> {
        self.other_subject.as_ref()
    }

    /// Token of the preceding statement; `None` for the genesis statement.
    pub fn previous(&self) -> Option<&Token> {
        self.previous.as_ref()
    }

    pub fn is_genesis(&self) -> bool {
        self.previous.is_none()
    }

    /// The raw fields as stored.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Remove keys from the output record. Omitting `"id"` drops the id.
    pub fn omit<S: AsRef<str>>(&mut self, keys: &[S]) {
        if keys.iter().any(|k| k.as_ref() == ID_FIELD) {
            self.id = None;
        }
        self.fields
            .retain(|key, _| !keys.iter().any(|k| k.as_ref() == key.as_str()));
    }

    /// Token of the stored fields: what this statement's id must be.
    pub fn compute_token(&self, addresser: &ContentAddresser) -> Result<Token, CoreError> {
        addresser.token(&Value::Object(self.fields.clone()))
    }

    /// Output record, with `"id"` first when the statement carries one.
    pub fn to_record(&self) -> Value {
        let mut record = Map::with_capacity(self.fields.len() + 1);
        if let Some(id) = &self.id {
            record.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        }
        for (key, value) in &self.fields {
            record.insert(key.clone(), value.clone());
        }
        Value::Object(record)
    }
}

fn parse_time(fields: &Map<String, Value>) -> Result<Timestamp, StatementError> {
    let raw = match fields.get(TIME) {
        None | Some(Value::Null) => return Err(StatementError::MissingField(TIME)),
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(StatementError::InvalidField {
                field: TIME,
                reason: format!("expected an RFC 3339 string, got {}", other),
            })
        }
    };
    Timestamp::parse(raw).map_err(|e| StatementError::InvalidTime {
        value: raw.clone(),
        reason: e.to_string(),
    })
}

fn parse_verb(fields: &Map<String, Value>) -> Result<(Verb, Value), StatementError> {
    let mut present = Verb::ALL.into_iter().filter_map(|verb| {
        fields
            .get(verb.as_str())
            .filter(|v| !v.is_null())
            .map(|subject| (verb, subject))
    });

    let (verb, subject) = present.next().ok_or(StatementError::MissingVerb)?;
    if let Some((second, _)) = present.next() {
        return Err(StatementError::AmbiguousVerb {
            first: verb,
            second,
        });
    }
    Ok((verb, subject.clone()))
}
