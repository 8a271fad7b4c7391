//! String table builder for AST compilation.
//!
//! Collects all strings used in the artifact and provides index-based access.
//! Processes expressions to convert string literals and property paths to string table indices.

use crate::ast::Expression;
use crate::compiler::expressions::IntermediateExpression;

/// String table builder for AST compilation.
/// Collects all strings used in the artifact and provides index-based access.
pub struct StringTable {
    strings: Vec<String>,
    index_map: std::collections::HashMap<String, u32>,
}

impl StringTable {
    /// Create a new empty string table.
    pub fn new() -> Self {
        Self {
            strings: Vec::new(),
            index_map: std::collections::HashMap::new(),
        }
    }

    /// Add a string to the table and return its index.
    /// If the string already exists, returns the existing index.
    ///
    /// # Errors
    ///
    /// Returns an error if the string table exceeds the maximum size (`u32::MAX` strings).
    pub fn add(&mut self, str: &str) -> Result<u32, crate::error::CompilerError> {
        if let Some(&index) = self.index_map.get(str) {
            return Ok(index);
        }

        let index = self.strings.len();
        let index = u32::try_from(index).map_err(|_| {
            crate::error::CompilerError::Compilation(crate::error::CompilationError::InvalidRule(
                "String table index exceeds u32::MAX".to_string(),
            ))
        })?;
        self.strings.push(str.to_string());
        self.index_map.insert(str.to_string(), index);
        Ok(index)
    }

    /// Get the string at the given index.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    /// Get all strings as a vector (for the artifact).
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.strings.clone()
    }

    /// Get the current size of the string table.
    #[must_use]
    pub fn size(&self) -> usize {
        self.strings.len()
    }

    /// Extract all strings from an expression and add them to the table.
    /// Returns a new expression with string references replaced by indices.
    ///
    /// # Errors
    ///
    /// Returns an error if the string table exceeds the maximum size.
    pub fn process_expression(
        &mut self,
        expr: &IntermediateExpression,
    ) -> Result<Expression, crate::error::CompilerError> {
        match expr {
            IntermediateExpression::BinaryOp {
                op_code,
                left,
                right,
            } => Ok(Expression::BinaryOp {
                op_code: *op_code,
                left: Box::new(self.process_expression(left)?),
                right: Box::new(self.process_expression(right)?),
            }),
            IntermediateExpression::LogicalOp {
                op_code,
                left,
                right,
            } => Ok(Expression::LogicalOp {
                op_code: *op_code,
                left: Box::new(self.process_expression(left)?),
                right: right
                    .as_ref()
                    .map(|r| self.process_expression(r).map(Box::new))
                    .transpose()?,
            }),
            IntermediateExpression::Property(prop_path) => {
                let prop_index = self.add(prop_path)?;
                Ok(Expression::Property { prop_index })
            }
            IntermediateExpression::Literal(value) => {
                // If value is a string, add to table and replace with index
                if let serde_json::Value::String(s) = value {
                    let str_index = self.add(s)?;
                    Ok(Expression::Literal {
                        value: serde_json::Value::Number(str_index.into()),
                    })
                } else {
                    // Numbers and booleans stay as-is
                    Ok(Expression::Literal {
                        value: value.clone(),
                    })
                }
            }
            IntermediateExpression::Func { func_code, args } => {
                let processed_args: Result<Vec<Expression>, _> = args
                    .iter()
                    .map(|arg| self.process_expression(arg))
                    .collect();
                Ok(Expression::Func {
                    func_code: *func_code,
                    args: processed_args?,
                })
            }
        }
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}
