//! Embedded JSON Schema handling for catalog inputs.
//!
//! Both the item catalog and the filter configuration are checked against a
//! schema before decoding. The schemas live under `schema/` and are compiled
//! into the binary, so validation does not depend on the working directory.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;

const ITEMS_SCHEMA: &str = include_str!("../schema/items.schema.json");
const FILTER_CONFIG_SCHEMA: &str = include_str!("../schema/filter_config.schema.json");

/// Which embedded schema to validate against.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CatalogSchema {
    Items,
    FilterConfig,
}

impl CatalogSchema {
    fn source(self) -> &'static str {
        match self {
            CatalogSchema::Items => ITEMS_SCHEMA,
            CatalogSchema::FilterConfig => FILTER_CONFIG_SCHEMA,
        }
    }

    fn label(self) -> &'static str {
        match self {
            CatalogSchema::Items => "items",
            CatalogSchema::FilterConfig => "filter config",
        }
    }
}

/// Result of loading and compiling an embedded schema.
pub(crate) struct SchemaLoadResult {
    pub schema_title: String,
    pub compiled: JSONSchema,
}

pub(crate) fn load_json_schema(kind: CatalogSchema) -> Result<SchemaLoadResult> {
    let raw: Value = serde_json::from_str(kind.source())
        .with_context(|| format!("parsing embedded {} schema", kind.label()))?;
    let schema_title = raw
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let compiled = JSONSchema::compile(&raw)
        .map_err(|err| anyhow!("compiling embedded {} schema: {err}", kind.label()))?;
    Ok(SchemaLoadResult {
        schema_title,
        compiled,
    })
}

/// Validate `instance`, collecting every violation into one error.
pub(crate) fn validate_value(kind: CatalogSchema, instance: &Value) -> Result<()> {
    let schema = load_json_schema(kind)?;
    if let Err(errors) = schema.compiled.validate(instance) {
        let details = errors
            .map(|err| {
                let path = err.instance_path.to_string();
                if path.is_empty() {
                    err.to_string()
                } else {
                    format!("{path}: {err}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        bail!(
            "{} failed validation against {}:\n{}",
            kind.label(),
            schema.schema_title,
            details
        );
    }
    Ok(())
}
