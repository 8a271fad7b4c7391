/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Parser for deployments from YAML/JSON strings.
 */

use crate::parser::error::ParseError;
use crate::parser::utils::parse_yaml_or_json;
use serde_json::Value;

/// Parse deployment from a YAML/JSON string.
///
/// Supports both YAML and JSON formats. The input can be YAML or JSON.
///
/// # Arguments
///
/// * `content` - The YAML or JSON content as a string
///
/// # Returns
///
/// Returns the parsed deployment as `serde_json::Value`, or a `ParseError` if parsing fails.
///
/// # Errors
///
/// Returns `ParseError` if:
/// - The content is invalid YAML/JSON
/// - The content is not an object
/// - The "environment" field is missing or not a string
/// - The "rules" field is missing or not an object
pub fn parse_deployment(content: &str) -> Result<Value, ParseError> {
    parse_deployment_from_string(content, None)
}

/// Parse deployment from a string with optional file path for error messages.
///
/// Supports both YAML and JSON formats.
///
/// # Arguments
///
/// * `content` - The YAML or JSON content as a string
/// * `file_path` - Optional file path (for error messages and format detection)
///
/// # Returns
///
/// Returns the parsed deployment as `serde_json::Value`, or a `ParseError` if parsing fails.
///
/// # Errors
///
/// Returns `ParseError` if:
/// - The content is invalid YAML/JSON
/// - The content is not an object
/// - The "environment" field is missing or not a string
/// - The "rules" field is missing or not an object
///
/// # Panics
///
/// Panics if the parsed data is not an object (this should not happen after validation).
pub fn parse_deployment_from_string(
    content: &str,
    file_path: Option<&str>,
) -> Result<Value, ParseError> {
    let parsed_data = parse_yaml_or_json(content, file_path)?;

    // Check if it's an object (not array or primitive)
    if !parsed_data.is_object() {
        return Err(ParseError::InvalidFieldType(
            "Invalid deployment: expected an object".to_string(),
        ));
    }

    let deployment_obj = parsed_data.as_object().unwrap();

    // Check for required "environment" field
    if !deployment_obj.contains_key("environment") {
        return Err(ParseError::MissingField(
            "Invalid deployment: missing required field \"environment\"".to_string(),
        ));
    }

    // Check that "environment" is a string
    let environment_value = &deployment_obj["environment"];
    if !environment_value.is_string() {
        return Err(ParseError::InvalidFieldType(
            "Invalid deployment: \"environment\" must be a string".to_string(),
        ));
    }

    // Check for required "rules" field
    if !deployment_obj.contains_key("rules") {
        return Err(ParseError::MissingField(
            "Invalid deployment: missing required field \"rules\"".to_string(),
        ));
    }

    // Check that "rules" is an object (not array or primitive)
    let rules_value = &deployment_obj["rules"];
    if !rules_value.is_object() {
        return Err(ParseError::InvalidFieldType(
            "Invalid deployment: \"rules\" must be an object".to_string(),
        ));
    }

    // Return the parsed object (full validation should be done by schema validator)
    Ok(parsed_data)
}
