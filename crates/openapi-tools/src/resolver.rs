//! Local `$ref` resolution.
//!
//! `openapiv3` models references as `ReferenceOr<T>` but never follows them. Uploaded specs are
//! self-contained text, so only same-document references (`#/...`) are followed; anything that
//! points at another file or URL is rejected as a schema violation.

use crate::error::{OpenApiToolsError, Result};
use openapiv3::ReferenceOr;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy)]
pub(crate) struct LocalRefResolver<'a> {
    root: &'a Value,
}

impl<'a> LocalRefResolver<'a> {
    pub(crate) fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// Follow a chain of references until a concrete item is reached.
    pub(crate) fn resolve<T>(&self, r: &ReferenceOr<T>) -> Result<T>
    where
        T: Clone + DeserializeOwned,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut cur: ReferenceOr<T> = r.clone();

        loop {
            match cur {
                ReferenceOr::Item(item) => return Ok(item),
                ReferenceOr::Reference { reference } => {
                    if !seen.insert(reference.clone()) {
                        return Err(OpenApiToolsError::SchemaViolation(format!(
                            "cyclic $ref detected while resolving '{reference}'"
                        )));
                    }
                    let value = self.lookup(&reference)?;
                    cur = serde_json::from_value(value.clone()).map_err(|e| {
                        OpenApiToolsError::SchemaViolation(format!(
                            "$ref '{reference}' does not point at the expected kind of object: {e}"
                        ))
                    })?;
                }
            }
        }
    }

    fn lookup(&self, reference: &str) -> Result<&'a Value> {
        let Some(fragment) = reference.strip_prefix('#') else {
            return Err(OpenApiToolsError::SchemaViolation(format!(
                "external $ref '{reference}' is not supported; only '#/...' references are"
            )));
        };
        if !fragment.is_empty() && !fragment.starts_with('/') {
            return Err(OpenApiToolsError::SchemaViolation(format!(
                "unsupported $ref fragment (expected JSON pointer starting with '/'): {reference}"
            )));
        }
        self.root.pointer(fragment).ok_or_else(|| {
            OpenApiToolsError::SchemaViolation(format!("unresolved $ref '{reference}'"))
        })
    }
}
