/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Structural predicates over decoded artifact values.
 *
 * `validator::type_guards` checks *input* documents before compilation.
 * These guards check the other end: a value a consumer has already decoded
 * from MessagePack bytes of unknown provenance, before trusting its shape
 * matches `Expression`/`Rule`/`Artifact`. They never panic and never throw -
 * a malformed value simply returns `false`.
 */

use serde_json::Value;

fn as_tag(value: &Value) -> Option<u64> {
    value.as_array()?.first()?.as_u64()
}

/// Structural check for a compiled expression: `[tag, ...]` with a tag in
/// `0..=4` and well-formed operands for that tag. `Func` (tag 4) is accepted
/// structurally even though no grammar production constructs one today.
#[must_use]
pub fn is_expression(value: &Value) -> bool {
    let Some(arr) = value.as_array() else {
        return false;
    };

    match as_tag(value) {
        Some(0) => {
            arr.len() == 4
                && arr[1].is_u64()
                && is_expression(&arr[2])
                && is_expression(&arr[3])
        }
        Some(1) => {
            arr.len() == 4
                && arr[1].is_u64()
                && is_expression(&arr[2])
                && (arr[3].is_null() || is_expression(&arr[3]))
        }
        Some(2) => arr.len() == 2 && arr[1].is_u64(),
        Some(3) => arr.len() == 2,
        Some(4) => {
            arr.len() == 3
                && arr[1].is_u64()
                && arr[2]
                    .as_array()
                    .is_some_and(|args| args.iter().all(is_expression))
        }
        _ => false,
    }
}

/// Structural check for a single weighted variation: `[var_index, percentage]`
/// with `percentage` in `0..=100`.
#[must_use]
pub fn is_variation(value: &Value) -> bool {
    let Some(arr) = value.as_array() else {
        return false;
    };
    arr.len() == 2
        && arr[0].is_u64()
        && arr[1].as_u64().is_some_and(|p| p <= 100)
}

/// Structural check for a compiled rule: `[tag, when, payload]` with tag in
/// `0..=2`, `when` either `null` or a well-formed expression, and a payload
/// shape matching the tag (string index for `SERVE`, variation array for
/// `VARIATIONS`, `[value_index, percentage]` for `ROLLOUT`).
#[must_use]
pub fn is_rule(value: &Value) -> bool {
    let Some(arr) = value.as_array() else {
        return false;
    };
    if arr.len() != 3 {
        return false;
    }

    let when_ok = arr[1].is_null() || is_expression(&arr[1]);
    if !when_ok {
        return false;
    }

    match as_tag(value) {
        Some(0) => arr[2].is_u64(),
        Some(1) => arr[2]
            .as_array()
            .is_some_and(|variations| !variations.is_empty() && variations.iter().all(is_variation)),
        Some(2) => arr[2]
            .as_array()
            .is_some_and(|payload| payload.len() == 2 && payload[0].is_u64() && payload[1].is_u64()),
        _ => false,
    }
}

/// Structural check for a decoded artifact map: has the five required keys
/// (`v`, `env`, `strs`, `flags`, `flagNames`) with the right element shapes,
/// and well-formed `segments`/`sig` if present.
#[must_use]
pub fn is_artifact(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };

    let Some(strs) = obj.get("strs").and_then(Value::as_array) else {
        return false;
    };

    let version_ok = obj.get("v").is_some_and(Value::is_string);
    let environment_ok = obj.get("env").is_some_and(Value::is_string);
    let strings_ok = strs.iter().all(Value::is_string);

    let flags_ok = obj.get("flags").and_then(Value::as_array).is_some_and(|flags| {
        flags
            .iter()
            .all(|rules| rules.as_array().is_some_and(|r| r.iter().all(is_rule)))
    });

    let flag_names_ok = obj
        .get("flagNames")
        .and_then(Value::as_array)
        .is_some_and(|names| names.iter().all(Value::is_u64));

    let segments_ok = match obj.get("segments") {
        None => true,
        Some(v) => v.as_array().is_some_and(|segments| {
            segments.iter().all(|s| {
                s.as_array()
                    .is_some_and(|pair| pair.len() == 2 && pair[0].is_u64() && is_expression(&pair[1]))
            })
        }),
    };

    let signature_ok = match obj.get("sig") {
        None => true,
        Some(v) => v.is_array() || v.is_string(),
    };

    version_ok
        && environment_ok
        && strings_ok
        && flags_ok
        && flag_names_ok
        && segments_ok
        && signature_ok
}
