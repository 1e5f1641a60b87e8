#![forbid(unsafe_code)]

use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub(crate) enum ArgError {
    #[error("arguments must be an object")]
    NotObject,
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{0} must be a string")]
    NotString(&'static str),
    #[error("{0} must be an array of strings")]
    NotStringArray(&'static str),
    #[error("{0} must be an object")]
    NotMap(&'static str),
}

pub(crate) fn args_object(args: &Value) -> Result<&Map<String, Value>, ArgError> {
    args.as_object().ok_or(ArgError::NotObject)
}

pub(crate) fn require_string(
    args: &Map<String, Value>,
    key: &'static str,
) -> Result<String, ArgError> {
    optional_string(args, key)?.ok_or(ArgError::Missing(key))
}

pub(crate) fn optional_string(
    args: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, ArgError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(v)) => Ok(Some(v.to_string())),
        Some(_) => Err(ArgError::NotString(key)),
    }
}

/// Optional string where blank counts as absent (`npc_id: ""`).
pub(crate) fn optional_nonblank_string(
    args: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, ArgError> {
    Ok(optional_string(args, key)?.filter(|v| !v.trim().is_empty()))
}

pub(crate) fn require_string_array(
    args: &Map<String, Value>,
    key: &'static str,
) -> Result<Vec<String>, ArgError> {
    optional_string_array(args, key)?.ok_or(ArgError::Missing(key))
}

pub(crate) fn optional_string_array(
    args: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<Vec<String>>, ArgError> {
    let arr = match args.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(arr)) => arr,
        Some(_) => return Err(ArgError::NotStringArray(key)),
    };
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        let Some(s) = item.as_str() else {
            return Err(ArgError::NotStringArray(key));
        };
        out.push(s.to_string());
    }
    Ok(Some(out))
}

pub(crate) fn optional_object(
    args: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<Map<String, Value>>, ArgError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(obj)) => Ok(Some(obj.clone())),
        Some(_) => Err(ArgError::NotMap(key)),
    }
}
