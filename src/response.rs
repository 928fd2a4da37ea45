use serde_json::{Map, Value};

use crate::rpc::RpcResult;
use crate::{Result, ScalarisError};

/// The classified result of a store response: the success payload, if any.
pub type Outcome = Result<Option<Value>>;

/// Maps a decoded response onto success or one of the error kinds.
///
/// Total over every JSON object; shapes it does not recognise are
/// [`ScalarisError::Unknown`].
pub fn classify(result: &RpcResult) -> Outcome {
    let map = result.as_map();
    if let Some(error) = map.get("error").filter(|e| !e.is_null()) {
        return Err(ScalarisError::Unknown(format!("rpc error: {}", error)));
    }
    classify_map(map)
}

fn classify_map(map: &Map<String, Value>) -> Outcome {
    if let Some(status) = map.get("status") {
        return classify_status(status, map);
    }
    if map.contains_key("failure") || map.get("ok").is_some_and(Value::is_u64) {
        return classify_delete(map);
    }
    if let Some(Value::Array(results)) = map.get("results") {
        return classify_results(results);
    }
    match map.get("result") {
        Some(Value::Object(inner)) => classify_map(inner),
        _ => Err(ScalarisError::Unknown("response without status".to_owned())),
    }
}

fn classify_status(status: &Value, map: &Map<String, Value>) -> Outcome {
    match status.as_str() {
        Some("ok") => Ok(map.get("value").or_else(|| map.get("result")).cloned()),
        Some("fail") => Err(reason_to_error(map.get("reason").and_then(Value::as_str))),
        Some(other) => Err(ScalarisError::Unknown(format!("status {:?}", other))),
        None => Err(ScalarisError::Unknown(format!("status {}", status))),
    }
}

fn reason_to_error(reason: Option<&str>) -> ScalarisError {
    match reason {
        Some("not_found") => ScalarisError::NotFound,
        Some("abort") => ScalarisError::Abort,
        Some("key_changed") => ScalarisError::KeyChanged,
        Some("node_not_found") => ScalarisError::NodeNotFound,
        Some("not_a_list") => ScalarisError::NotAList,
        Some("not_a_number") => ScalarisError::NotANumber,
        Some("timeout") => ScalarisError::Timeout,
        Some(other) => ScalarisError::Unknown(format!("reason {:?}", other)),
        None => ScalarisError::Unknown("failure without reason".to_owned()),
    }
}

/// Answers of a transaction, one per operation.
fn classify_results(results: &[Value]) -> Outcome {
    for entry in results {
        match entry {
            Value::Object(inner) => {
                classify_map(inner)?;
            }
            other => {
                return Err(ScalarisError::Unknown(format!(
                    "unexpected transaction result {}",
                    other
                )))
            }
        }
    }
    Ok(Some(Value::Array(results.to_vec())))
}

/// Delete answers: `{"ok": n, "results": [...]}`, plus `"failure"` when the
/// delete did not finish. `undef` entries only mean a replica held no value.
fn classify_delete(map: &Map<String, Value>) -> Outcome {
    match map.get("failure") {
        None | Some(Value::Null) => Ok(map.get("ok").cloned()),
        Some(failure) if failure.as_str() == Some("timeout") => Err(ScalarisError::Timeout),
        Some(failure) => Err(ScalarisError::Unknown(format!("delete failure {}", failure))),
    }
}
