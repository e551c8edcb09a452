//! Union schemas.

use super::{BoxFuture, Issue, Schema, SchemaError, SharedSchema};
use serde_json::Value;
use std::sync::Arc;

/// Accepts a value if any member schema accepts it.
///
/// Members are tried in order and the first success wins, so its coerced
/// value is the output. When every member fails, the error carries one
/// `invalid_union` issue followed by each member's issues.
#[derive(Clone)]
pub struct UnionSchema {
    members: Vec<SharedSchema>,
}

impl UnionSchema {
    /// Creates a union of two schemas.
    #[must_use]
    pub fn of(first: impl Schema, second: impl Schema) -> Self {
        Self {
            members: vec![Arc::new(first), Arc::new(second)],
        }
    }

    /// Adds another member.
    #[must_use]
    pub fn or(mut self, schema: impl Schema) -> Self {
        self.members.push(Arc::new(schema));
        self
    }

    /// Adds an already shared member.
    #[must_use]
    pub fn or_shared(mut self, schema: SharedSchema) -> Self {
        self.members.push(schema);
        self
    }
}

impl std::fmt::Debug for UnionSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnionSchema")
            .field("members", &self.members.len())
            .finish()
    }
}

impl Schema for UnionSchema {
    fn validate<'a>(&'a self, value: &'a Value) -> BoxFuture<'a, Result<Value, SchemaError>> {
        Box::pin(async move {
            let mut issues = vec![Issue::new("invalid_union", "Invalid input")];
            for member in &self.members {
                match member.validate(value).await {
                    Ok(coerced) => return Ok(coerced),
                    Err(err) => issues.extend(err.issues),
                }
            }
            Err(SchemaError::new(issues))
        })
    }
}
