//! Output validation and error recovery for model replies
//!
//! The parser hands over a JSON object of unknown quality. This module coerces it
//! into the typed output using the type's JSON schema: missing required fields get
//! defaults, scalar mismatches ("8" for 8, a lone object where a list belongs) are
//! converted, and nulls in non-nullable fields are replaced.

use anyhow::{Result, anyhow};
use schemars::JsonSchema;
use schemars::schema_for;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::log_debug;

/// Validation result with recovery information
#[derive(Debug)]
pub struct ValidationResult<T> {
    pub value: T,
    /// Non-fatal issues fixed during recovery
    pub warnings: Vec<String>,
    pub recovered: bool,
}

impl<T> ValidationResult<T> {
    fn success(value: T) -> Self {
        Self {
            value,
            warnings: vec![],
            recovered: false,
        }
    }

    fn recovered(value: T, warnings: Vec<String>) -> Self {
        Self {
            value,
            warnings,
            recovered: true,
        }
    }
}

/// Deserialize `json_value` as `T`, repairing it against `T`'s schema if needed
pub fn validate_and_parse<T>(json_value: Value) -> Result<ValidationResult<T>>
where
    T: JsonSchema + DeserializeOwned,
{
    let mut warnings = Vec::new();

    match serde_json::from_value::<T>(json_value.clone()) {
        Ok(value) => {
            log_debug!("Validator: {} parsed directly", std::any::type_name::<T>());
            return Ok(ValidationResult::success(value));
        }
        Err(e) => {
            log_debug!("Validator: initial parse failed: {}", e);
            warnings.push(format!("Initial parse failed: {e}"));
        }
    }

    let mut json_value = json_value;
    let schema = schema_for!(T);
    let schema_value = serde_json::to_value(&schema).unwrap_or(Value::Null);

    if let Some(obj) = json_value.as_object_mut() {
        recover_object(obj, &schema_value, &schema_value, &mut warnings);
    }

    match serde_json::from_value::<T>(json_value.clone()) {
        Ok(value) => {
            log_debug!("Validator: recovery successful, {} warnings", warnings.len());
            Ok(ValidationResult::recovered(value, warnings))
        }
        Err(e) => {
            let final_value = extract_required_fields(&json_value, &schema_value);
            match serde_json::from_value::<T>(final_value) {
                Ok(value) => {
                    warnings.push(format!("Extracted required fields only: {e}"));
                    Ok(ValidationResult::recovered(value, warnings))
                }
                Err(final_e) => Err(anyhow!(
                    "Failed to parse JSON even after recovery attempts: {}",
                    final_e
                )),
            }
        }
    }
}

/// Apply every recovery to `obj`, then descend into nested objects and lists of objects
fn recover_object(
    obj: &mut Map<String, Value>,
    schema: &Value,
    root: &Value,
    warnings: &mut Vec<String>,
) {
    let schema = resolve_ref(schema, root);
    recover_missing_fields(obj, schema, warnings);
    recover_type_mismatches(obj, schema, warnings);
    recover_null_to_defaults(obj, schema, warnings);

    let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) else {
        return;
    };

    for (field_name, prop_schema) in properties {
        match obj.get_mut(field_name) {
            Some(Value::Array(items)) => {
                if let Some(item_schema) = prop_schema.get("items") {
                    for item in items.iter_mut().filter_map(Value::as_object_mut) {
                        recover_object(item, item_schema, root, warnings);
                    }
                }
            }
            Some(Value::Object(inner)) => recover_object(inner, prop_schema, root, warnings),
            _ => {}
        }
    }
}

/// Follow a `#/$defs/Name` reference against the root schema
fn resolve_ref<'a>(schema: &'a Value, root: &'a Value) -> &'a Value {
    if let Some(name) = schema
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix("#/$defs/"))
        && let Some(definition) = root.get("$defs").and_then(|defs| defs.get(name))
    {
        return definition;
    }
    schema
}

/// Recover missing required fields by adding defaults
fn recover_missing_fields(
    obj: &mut Map<String, Value>,
    schema: &Value,
    warnings: &mut Vec<String>,
) {
    let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) else {
        return;
    };

    let required = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect::<Vec<_>>())
        .unwrap_or_default();

    for field_name in required {
        if !obj.contains_key(field_name)
            && let Some(prop_schema) = properties.get(field_name)
        {
            warnings.push(format!(
                "Added missing required field '{field_name}' with default value"
            ));
            obj.insert(field_name.to_string(), get_default_for_type(prop_schema));
        }
    }
}

/// Recover type mismatches by attempting conversion
fn recover_type_mismatches(
    obj: &mut Map<String, Value>,
    schema: &Value,
    warnings: &mut Vec<String>,
) {
    let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) else {
        return;
    };

    for (field_name, prop_schema) in properties {
        if let Some(current_value) = obj.get(field_name).cloned() {
            let converted = match schema_type(prop_schema) {
                Some("string") => convert_to_string(&current_value),
                Some("array") => Some(convert_to_array(&current_value)),
                Some("integer") => convert_to_integer(&current_value),
                Some("number") => convert_to_number(&current_value),
                _ => None,
            };

            if let Some(new_value) = converted
                && new_value != current_value
            {
                warnings.push(format!(
                    "Converted field '{}' from {} to {}",
                    field_name,
                    type_name(&current_value),
                    schema_type(prop_schema).unwrap_or("any")
                ));
                obj.insert(field_name.clone(), new_value);
            }
        }
    }
}

/// Recover null values by replacing with appropriate defaults
fn recover_null_to_defaults(
    obj: &mut Map<String, Value>,
    schema: &Value,
    warnings: &mut Vec<String>,
) {
    let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) else {
        return;
    };

    for (field_name, prop_schema) in properties {
        if let Some(Value::Null) = obj.get(field_name)
            && !is_nullable(prop_schema)
        {
            warnings.push(format!(
                "Replaced null value in non-nullable field '{field_name}' with default"
            ));
            obj.insert(field_name.clone(), get_default_for_type(prop_schema));
        }
    }
}

/// Extract only required fields from a JSON value
fn extract_required_fields(value: &Value, schema: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return value.clone();
    };

    let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) else {
        return value.clone();
    };

    let required: Vec<&str> = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    let mut result = Map::new();

    for field_name in required {
        if let Some(field_value) = obj.get(field_name) {
            result.insert(field_name.to_string(), field_value.clone());
        } else if let Some(prop_schema) = properties.get(field_name) {
            result.insert(field_name.to_string(), get_default_for_type(prop_schema));
        }
    }

    // Optional fields only survive when they already have the right shape
    for (field_name, field_value) in obj {
        if !result.contains_key(field_name)
            && let Some(prop_schema) = properties.get(field_name)
            && matches_schema_type(field_value, prop_schema)
        {
            result.insert(field_name.clone(), field_value.clone());
        }
    }

    Value::Object(result)
}

/// The declared JSON type of a property.
///
/// Handles both `"type": "string"` and the `"type": ["string", "null"]` form.
fn schema_type(schema: &Value) -> Option<&str> {
    match schema.get("type") {
        Some(Value::String(t)) => Some(t.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

fn is_nullable(schema: &Value) -> bool {
    let in_type_list = schema
        .get("type")
        .and_then(Value::as_array)
        .is_some_and(|types| types.iter().any(|t| t == "null"));
    let in_any_of = schema
        .get("anyOf")
        .and_then(Value::as_array)
        .is_some_and(|arr| arr.iter().any(|v| v.get("type") == Some(&Value::from("null"))));
    in_type_list || in_any_of
}

fn matches_schema_type(value: &Value, schema: &Value) -> bool {
    match schema_type(schema) {
        Some("string") => value.is_string(),
        Some("array") => value.is_array(),
        Some("object") => value.is_object(),
        Some("boolean") => value.is_boolean(),
        Some("integer") => value.is_u64() || value.is_i64(),
        Some("number") => value.is_number(),
        _ => true,
    }
}

/// Get a sensible default value for a JSON schema type
fn get_default_for_type(schema: &Value) -> Value {
    if let Some(default) = schema.get("default") {
        return default.clone();
    }

    if is_nullable(schema) {
        return Value::Null;
    }

    if let Some(first) = schema
        .get("anyOf")
        .and_then(|a| a.as_array())
        .and_then(|a| a.first())
    {
        return get_default_for_type(first);
    }

    match schema_type(schema) {
        Some("string") => Value::String(String::new()),
        Some("array") => Value::Array(vec![]),
        Some("object") => Value::Object(Map::new()),
        Some("boolean") => Value::Bool(false),
        Some("integer" | "number") => Value::Number(0.into()),
        _ => Value::Null,
    }
}

fn convert_to_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(n) => Some(Value::String(n.to_string())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        Value::Null => Some(Value::String(String::new())),
        Value::Array(arr) => {
            let strings: Vec<String> = arr
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect();
            Some(Value::String(strings.join(", ")))
        }
        Value::Object(_) => None,
    }
}

fn convert_to_array(value: &Value) -> Value {
    match value {
        Value::Array(_) => value.clone(),
        Value::Null => Value::Array(vec![]),
        other => Value::Array(vec![other.clone()]),
    }
}

/// Scores come back as "7", 7.0, "7/10" or 7.5; all become whole numbers
fn convert_to_integer(value: &Value) -> Option<Value> {
    let float = match value {
        Value::Number(n) if n.is_u64() || n.is_i64() => return Some(value.clone()),
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let leading = s.trim().split('/').next().unwrap_or_default().trim();
            leading.parse::<f64>().ok()?
        }
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };

    if !float.is_finite() || float < 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = float.round() as u64;
    Some(Value::Number(rounded.into()))
}

fn convert_to_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            if let Ok(i) = s.trim().parse::<i64>() {
                return Some(Value::Number(i.into()));
            }
            s.trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
        }
        Value::Bool(b) => Some(Value::Number(i32::from(*b).into())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
