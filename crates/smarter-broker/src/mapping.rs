//! Declarative field mapping between document and record representations.
//!
//! Each kind declares one table listing every spec field: its camelCase wire
//! name, its snake_case record name, a display type for tabular rendering,
//! and whether the field is a secret reference. A single generic projector
//! consumes the table in both directions, so no broker hand-writes per-field
//! conversion code.
//!
//! The name transform applies to record field names; nested JSON values are
//! column payloads and cross the boundary verbatim, which is what keeps
//! free-form spec data (e.g. a static plugin's payload) round-trip safe.

use serde_json::{Map, Value, json};
use smarter_core::camel_to_snake;

/// One spec field crossing the document/record boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// camelCase name in the manifest spec.
    pub wire: &'static str,
    /// snake_case name in the persisted record.
    pub record: &'static str,
    /// JSON type label used by `titles` for tabular rendering.
    pub ty: &'static str,
    /// Secret reference: the record holds a Secret name, never plaintext.
    pub secret: bool,
}

impl FieldSpec {
    pub const fn new(wire: &'static str, record: &'static str, ty: &'static str) -> Self {
        Self {
            wire,
            record,
            ty,
            secret: false,
        }
    }

    pub const fn secret(wire: &'static str, record: &'static str) -> Self {
        Self {
            wire,
            record,
            ty: "string",
            secret: true,
        }
    }
}

/// The per-kind mapping table.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    pub fields: &'static [FieldSpec],
}

impl FieldMap {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    /// The secret-marked entries.
    pub fn secret_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.secret)
    }

    /// Project a wire-form spec object into record fields.
    ///
    /// Only declared fields are carried. Secret fields must already hold
    /// their name-only form (the broker substitutes them before projection).
    pub fn spec_to_record(&self, spec: &Value) -> Map<String, Value> {
        let mut fields = Map::new();
        let Some(spec) = spec.as_object() else {
            return fields;
        };
        for field in self.fields {
            if let Some(value) = spec.get(field.wire) {
                if value.is_null() {
                    continue;
                }
                fields.insert(field.record.to_string(), value.clone());
            }
        }
        fields
    }

    /// Project record fields back into a wire-form spec object.
    pub fn record_to_spec(&self, fields: &Map<String, Value>) -> Value {
        let mut spec = Map::new();
        for field in self.fields {
            if let Some(value) = fields.get(field.record) {
                if value.is_null() {
                    continue;
                }
                spec.insert(field.wire.to_string(), value.clone());
            }
        }
        Value::Object(spec)
    }

    /// Every entry's record name must be the deterministic snake_case form
    /// of its wire name. Broker tests assert this per kind.
    pub fn is_consistent(&self) -> bool {
        self.fields
            .iter()
            .all(|field| field.record == camel_to_snake(field.wire))
    }

    /// Field name/type pairs for tabular rendering of `get` results.
    ///
    /// The fixed identity and timestamp columns bracket the spec fields.
    pub fn titles(&self) -> Vec<Value> {
        let mut titles = vec![
            json!({"name": "name", "type": "string"}),
            json!({"name": "description", "type": "string"}),
            json!({"name": "version", "type": "string"}),
        ];
        for field in self.fields {
            titles.push(json!({"name": field.wire, "type": field.ty}));
        }
        titles.push(json!({"name": "created", "type": "string"}));
        titles.push(json!({"name": "modified", "type": "string"}));
        titles
    }
}
