//! Flagc Compiler Library
//!
//! Copyright 2025 Release Workshop Ltd
//! Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
//! See the LICENSE file in the project root for details.
//!
//! This library compiles flag definitions and deployment YAML/JSON documents into
//! compact AST artifacts. It is designed to be WASM-compatible and works only with
//! in-memory data (no file I/O).
//!
//! # Example
//!
//! ```rust,no_run
//! use flagc_compiler::{parse_definitions, parse_deployment, compile, serialize};
//!
//! let definitions_yaml = r#"
//! flags:
//!   - name: my_flag
//!     type: boolean
//!     defaultValue: false
//! "#;
//!
//! let deployment_yaml = r#"
//! environment: production
//! rules:
//!   my_flag:
//!     rules:
//!       - serve: true
//! "#;
//!
//! let definitions = parse_definitions(definitions_yaml)?;
//! let deployment = parse_deployment(deployment_yaml)?;
//! let artifact = compile(&deployment, &definitions)?;
//! let bytes = serialize(&artifact);
//! # Ok::<(), flagc_compiler::CompilerError>(())
//! ```

pub mod ast;
pub mod compiler;
pub mod error;
pub mod parser;
pub mod schemas;
pub mod validator;

use ast::Artifact;

// Re-export error types for public API
pub use error::CompilerError;

/// Parse flag definitions from YAML/JSON string
/// 
/// This function works on in-memory strings only (no file I/O).
/// The input can be YAML or JSON format.
/// 
/// # Errors
/// 
/// Returns `ParseError` if the input is invalid YAML/JSON or missing required fields.
pub fn parse_definitions(content: &str) -> Result<serde_json::Value, CompilerError> {
    parser::parse_definitions(content)
        .map_err(|e| CompilerError::Parse(e.into()))
}

/// Parse deployment from YAML/JSON string
/// 
/// This function works on in-memory strings only (no file I/O).
/// The input can be YAML or JSON format.
/// 
/// # Errors
/// 
/// Returns `ParseError` if the input is invalid YAML/JSON or missing required fields.
pub fn parse_deployment(content: &str) -> Result<serde_json::Value, CompilerError> {
    parser::parse_deployment(content)
        .map_err(|e| CompilerError::Parse(e.into()))
}

/// Validate flag definitions against JSON schema
/// 
/// # Errors
/// 
/// Returns `ValidationError` if validation fails.
pub fn validate_definitions(definitions: &serde_json::Value) -> Result<(), CompilerError> {
    let validator = validator::Validator::new();
    let result = validator.validate_definitions("<input>", definitions);
    
    if result.valid {
        Ok(())
    } else {
        // Convert ValidationResult to ValidationError
        let error_messages: Vec<String> = result
            .errors
            .iter()
            .map(|e| e.message.clone())
            .collect();
        Err(CompilerError::Validation(
            error::ValidationError::SchemaValidation(error_messages.join("; ")),
        ))
    }
}

/// Validate deployment against JSON schema
/// 
/// # Errors
/// 
/// Returns `ValidationError` if validation fails.
pub fn validate_deployment(deployment: &serde_json::Value) -> Result<(), CompilerError> {
    let validator = validator::Validator::new();
    let result = validator.validate_deployment("<input>", deployment);
    
    if result.valid {
        Ok(())
    } else {
        // Convert ValidationResult to ValidationError
        let error_messages: Vec<String> = result
            .errors
            .iter()
            .map(|e| e.message.clone())
            .collect();
        Err(CompilerError::Validation(
            error::ValidationError::SchemaValidation(error_messages.join("; ")),
        ))
    }
}

/// Compile deployment and definitions into an AST artifact
/// 
/// # Errors
/// 
/// Returns `CompilationError` if compilation fails.
pub fn compile(
    deployment: &serde_json::Value,
    definitions: &serde_json::Value,
) -> Result<Artifact, CompilerError> {
    compiler::compile(deployment, definitions)
}

/// Serialize AST artifact to MessagePack bytes
/// 
/// This function serializes the artifact to MessagePack format using `rmp-serde`.
/// The output should match the TypeScript implementation byte-for-byte.
/// 
/// # Arguments
/// 
/// * `artifact` - The compiled AST artifact to serialize
/// 
/// # Returns
/// 
/// MessagePack-encoded bytes as a `Vec<u8>`, or a `SerializationError` if serialization fails.
/// 
/// # Errors
/// 
/// Returns `SerializationError` if MessagePack serialization fails. This should be rare
/// and typically indicates an invalid artifact structure.
/// 
/// # Example
/// 
/// ```rust,no_run
/// use flagc_compiler::{parse_deployment, parse_definitions, compile, serialize};
///
/// let definitions = parse_definitions("flags: []")?;
/// let deployment = parse_deployment("environment: test\nrules: {}")?;
/// let artifact = compile(&deployment, &definitions)?;
/// let bytes = serialize(&artifact)?;
/// # Ok::<(), flagc_compiler::CompilerError>(())
/// ```
pub fn serialize(artifact: &Artifact) -> Result<Vec<u8>, CompilerError> {
    rmp_serde::to_vec(artifact)
        .map_err(|e| CompilerError::Serialization(
            error::SerializationError::MessagePack(e.to_string())
        ))
}

/// Compile deployment and definitions, then serialize the result in one call.
///
/// A convenience wrapper around [`compile`] followed by [`serialize`] for
/// callers that never need the intermediate `Artifact` value.
///
/// # Errors
///
/// Returns `CompilationError` if compilation fails, or `SerializationError` if
/// MessagePack encoding fails.
pub fn compile_and_serialize(
    deployment: &serde_json::Value,
    definitions: &serde_json::Value,
) -> Result<Vec<u8>, CompilerError> {
    let artifact = compile(deployment, definitions)?;
    serialize(&artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expression, Rule, ServePayload, Variation, BinaryOp};

    #[test]
    fn test_parse_definitions() {
        let result = parse_definitions("flags: []");
        assert!(result.is_ok());
        let value = result.unwrap();
        assert!(value["flags"].is_array());
    }

    #[test]
    fn test_parse_deployment() {
        let result = parse_deployment("environment: test\nrules: {}");
        assert!(result.is_ok());
        let value = result.unwrap();
        assert_eq!(value["environment"], "test");
        assert!(value["rules"].is_object());
    }

    #[test]
    fn test_serialize_simple_artifact() {
        let artifact = Artifact {
            version: "1.0".to_string(),
            environment: "production".to_string(),
            string_table: vec!["ON".to_string(), "OFF".to_string()],
            flags: vec![vec![Rule::ServeWithoutWhen(ServePayload::Number(0))]],
            flag_names: vec![0],
            segments: None,
            signature: None,
        };

        let bytes = serialize(&artifact).expect("Serialization should succeed");

        assert!(!bytes.is_empty());
        assert!(bytes.len() > 0);
    }

    #[test]
    fn test_serialize_deserialize_round_trip() {
        let artifact = Artifact {
            version: "1.0".to_string(),
            environment: "production".to_string(),
            string_table: vec!["ON".to_string(), "OFF".to_string(), "user.role".to_string(), "admin".to_string()],
            flags: vec![vec![
                Rule::ServeWithWhen(
                    Expression::BinaryOp {
                        op_code: BinaryOp::Eq as u8,
                        left: Box::new(Expression::Property { prop_index: 2 }),
                        right: Box::new(Expression::Literal { value: serde_json::Value::Number(3.into()) }),
                    },
                    ServePayload::Number(0),
                ),
            ]],
            flag_names: vec![0],
            segments: None,
            signature: None,
        };

        let bytes = serialize(&artifact).expect("Serialization should succeed");
        let deserialized: Artifact = rmp_serde::from_slice(&bytes)
            .expect("Failed to deserialize artifact");

        assert_eq!(deserialized.version, "1.0");
        assert_eq!(deserialized.environment, "production");
        assert_eq!(deserialized.string_table, vec!["ON", "OFF", "user.role", "admin"]);
        assert_eq!(deserialized.flags.len(), 1);
        assert_eq!(deserialized.flag_names, vec![0]);
    }

    #[test]
    fn test_serialize_artifact_with_variations() {
        let artifact = Artifact {
            version: "1.0".to_string(),
            environment: "production".to_string(),
            string_table: vec!["var1".to_string(), "var2".to_string()],
            flags: vec![vec![
                Rule::VariationsWithoutWhen(vec![
                    Variation { var_index: 0, percentage: 50 },
                    Variation { var_index: 1, percentage: 50 },
                ]),
            ]],
            flag_names: vec![0],
            segments: None,
            signature: None,
        };

        let bytes = serialize(&artifact).expect("Serialization should succeed");
        let deserialized: Artifact = rmp_serde::from_slice(&bytes)
            .expect("Failed to deserialize artifact");

        assert_eq!(deserialized.string_table, vec!["var1", "var2"]);
        assert_eq!(deserialized.flags.len(), 1);
        assert_eq!(deserialized.flags[0].len(), 1);
    }

    #[test]
    fn test_serialize_artifact_with_segments() {
        let artifact = Artifact {
            version: "1.0".to_string(),
            environment: "production".to_string(),
            string_table: vec!["premium_users".to_string(), "user.plan".to_string(), "premium".to_string()],
            flags: vec![vec![]],
            flag_names: vec![0],
            segments: Some(vec![
                (0, Expression::BinaryOp {
                    op_code: BinaryOp::Eq as u8,
                    left: Box::new(Expression::Property { prop_index: 1 }),
                    right: Box::new(Expression::Literal { value: serde_json::Value::Number(2.into()) }),
                }),
            ]),
            signature: None,
        };

        let bytes = serialize(&artifact).expect("Serialization should succeed");
        let deserialized: Artifact = rmp_serde::from_slice(&bytes)
            .expect("Failed to deserialize artifact");

        assert!(deserialized.segments.is_some());
        let segments = deserialized.segments.unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].0, 0);
    }

    #[test]
    fn test_serialize_artifact_with_signature() {
        // Ed25519 signatures are 64 bytes
        let signature: Vec<u8> = (1..=64).collect();
        let artifact = Artifact {
            version: "1.0".to_string(),
            environment: "production".to_string(),
            string_table: vec!["ON".to_string()],
            flags: vec![vec![]],
            flag_names: vec![0],
            segments: None,
            signature: Some(signature.clone()),
        };

        let bytes = serialize(&artifact).expect("Serialization should succeed");
        assert!(!bytes.is_empty());

        let deserialized: Artifact = rmp_serde::from_slice(&bytes)
            .expect("Failed to deserialize artifact");

        assert!(deserialized.segments.is_none());
        assert!(deserialized.signature.is_some());
        let deserialized_sig = deserialized.signature.unwrap();
        assert_eq!(deserialized_sig.len(), 64);
        assert_eq!(deserialized_sig, signature);
    }

    #[test]
    fn test_serialize_artifact_without_optional_fields() {
        // Test that optional fields (segments, signature) are omitted when None
        let artifact = Artifact {
            version: "1.0".to_string(),
            environment: "production".to_string(),
            string_table: vec!["ON".to_string()],
            flags: vec![vec![]],
            flag_names: vec![0],
            segments: None,
            signature: None,
        };

        let bytes = serialize(&artifact).expect("Serialization should succeed");
        let deserialized: Artifact = rmp_serde::from_slice(&bytes)
            .expect("Failed to deserialize artifact");

        assert!(deserialized.segments.is_none());
        assert!(deserialized.signature.is_none());
    }
}

