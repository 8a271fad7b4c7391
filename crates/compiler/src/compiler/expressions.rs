//! Expression parser for flag condition expressions.
//!
//! Parses expression strings into `IntermediateExpression` AST nodes: six
//! comparison operators, `AND`/`OR`/`NOT`, dotted identifiers, and
//! string/number/boolean literals. Function calls are not part of this
//! grammar; see `IntermediateExpression::Func`'s doc comment.

use crate::ast::{BinaryOp, LogicalOp};
use crate::error::{CompilationError, CompilerError};

/// Intermediate expression type used during parsing.
/// Properties and string literals use strings initially, which are then
/// converted to string table indices by the string table processor.
#[derive(Debug, Clone, PartialEq)]
pub enum IntermediateExpression {
    /// binary_op: [0, op_code, left, right]
    BinaryOp {
        op_code: u8,
        left: Box<IntermediateExpression>,
        right: Box<IntermediateExpression>,
    },
    /// logical_op: [1, op_code, left, right?] (NOT has no right)
    LogicalOp {
        op_code: u8,
        left: Box<IntermediateExpression>,
        right: Option<Box<IntermediateExpression>>,
    },
    /// property: [2, prop_path] (prop_path is string, will be converted to index)
    Property(String),
    /// literal: [3, value] (value may be string, will be converted to index if string)
    Literal(serde_json::Value),
    /// func: [4, func_code, args[]]
    ///
    /// Reserved. No grammar production below ever constructs this variant;
    /// it exists so artifacts stay decodable by a future parser that adds
    /// function calls without changing the wire shape of `Expression`.
    #[allow(dead_code)]
    Func {
        func_code: u8,
        args: Vec<IntermediateExpression>,
    },
}

/// Token types for the lexer
#[derive(Debug, Clone, PartialEq)]
enum TokenType {
    Identifier(String),
    String(String),
    Number(f64),
    Boolean(bool),
    Operator(String),
    LeftParen,
    RightParen,
    Eof,
}

/// Token with position information
#[derive(Debug, Clone)]
struct Token {
    token_type: TokenType,
    position: usize,
}

/// Expression parser using recursive descent
pub struct ExpressionParser {
    tokens: Vec<Token>,
    current: usize,
}

impl ExpressionParser {
    /// Create a new expression parser
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            current: 0,
        }
    }

    /// Parse an expression string into an intermediate Expression.
    /// The result will be processed by StringTable to convert strings to indices.
    pub fn parse(&mut self, expr: &str) -> Result<IntermediateExpression, CompilerError> {
        self.tokens = Self::tokenize(expr)?;
        self.current = 0;
        let result = self.parse_logical_or()?;
        if !self.is_at_end() {
            let token = self.peek();
            return Err(CompilerError::Compilation(
                CompilationError::ExpressionParsing(format!(
                    "Unexpected token at position {}: {:?}",
                    token.position, token.token_type
                )),
            ));
        }
        Ok(result)
    }

    /// Tokenize the input string into tokens
    fn tokenize(expr: &str) -> Result<Vec<Token>, CompilerError> {
        let mut tokens = Vec::new();
        let mut i = 0;
        let chars: Vec<char> = expr.chars().collect();

        while i < chars.len() {
            let char = chars[i];

            // Skip whitespace
            if char.is_whitespace() {
                i += 1;
                continue;
            }

            // String literals (single or double quotes)
            if char == '\'' || char == '"' {
                let quote = char;
                i += 1; // Skip opening quote
                let start_pos = i;
                let mut value = String::new();
                while i < chars.len() && chars[i] != quote {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        i += 1;
                        value.push(chars[i]);
                    } else {
                        value.push(chars[i]);
                    }
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(CompilerError::Compilation(
                        CompilationError::ExpressionParsing(format!(
                            "Unterminated string literal at position {}",
                            start_pos - 1
                        )),
                    ));
                }
                tokens.push(Token {
                    token_type: TokenType::String(value),
                    position: start_pos - 1,
                });
                i += 1; // Skip closing quote
                continue;
            }

            // Numbers
            if char.is_ascii_digit() {
                let start_pos = i;
                let mut value = String::new();
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    value.push(chars[i]);
                    i += 1;
                }
                // Parse as f64 first to handle both integers and floats, and avoid overflow issues
                let num = value.parse::<f64>().map_err(|e| {
                    CompilerError::Compilation(CompilationError::ExpressionParsing(format!(
                        "Invalid number at position {}: {}",
                        start_pos, e
                    )))
                })?;
                tokens.push(Token {
                    token_type: TokenType::Number(num),
                    position: start_pos,
                });
                continue;
            }

            // Two-character operators
            if i + 1 < chars.len() {
                let two_char = format!("{}{}", chars[i], chars[i + 1]);
                match two_char.as_str() {
                    "==" => {
                        tokens.push(Token {
                            token_type: TokenType::Operator("==".to_string()),
                            position: i,
                        });
                        i += 2;
                        continue;
                    }
                    "!=" => {
                        tokens.push(Token {
                            token_type: TokenType::Operator("!=".to_string()),
                            position: i,
                        });
                        i += 2;
                        continue;
                    }
                    ">=" => {
                        tokens.push(Token {
                            token_type: TokenType::Operator(">=".to_string()),
                            position: i,
                        });
                        i += 2;
                        continue;
                    }
                    "<=" => {
                        tokens.push(Token {
                            token_type: TokenType::Operator("<=".to_string()),
                            position: i,
                        });
                        i += 2;
                        continue;
                    }
                    _ => {}
                }
            }

            // Single-character operators
            match char {
                '>' => {
                    tokens.push(Token {
                        token_type: TokenType::Operator(">".to_string()),
                        position: i,
                    });
                    i += 1;
                    continue;
                }
                '<' => {
                    tokens.push(Token {
                        token_type: TokenType::Operator("<".to_string()),
                        position: i,
                    });
                    i += 1;
                    continue;
                }
                '(' => {
                    tokens.push(Token {
                        token_type: TokenType::LeftParen,
                        position: i,
                    });
                    i += 1;
                    continue;
                }
                ')' => {
                    tokens.push(Token {
                        token_type: TokenType::RightParen,
                        position: i,
                    });
                    i += 1;
                    continue;
                }
                _ => {}
            }

            // Identifiers and keywords
            if char.is_ascii_alphabetic() || char == '_' {
                let start_pos = i;
                let mut value = String::new();
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    value.push(chars[i]);
                    i += 1;
                }

                // Check for boolean literals
                match value.as_str() {
                    "true" => {
                        tokens.push(Token {
                            token_type: TokenType::Boolean(true),
                            position: start_pos,
                        });
                    }
                    "false" => {
                        tokens.push(Token {
                            token_type: TokenType::Boolean(false),
                            position: start_pos,
                        });
                    }
                    _ => {
                        tokens.push(Token {
                            token_type: TokenType::Identifier(value),
                            position: start_pos,
                        });
                    }
                }
                continue;
            }

            return Err(CompilerError::Compilation(
                CompilationError::ExpressionParsing(format!(
                    "Unexpected character at position {}: {}",
                    i, char
                )),
            ));
        }

        tokens.push(Token {
            token_type: TokenType::Eof,
            position: i,
        });
        Ok(tokens)
    }

    /// Check if we're at the end of tokens
    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || matches!(self.peek().token_type, TokenType::Eof)
    }

    /// Peek at the current token without advancing
    fn peek(&self) -> &Token {
        if self.current < self.tokens.len() {
            &self.tokens[self.current]
        } else {
            &self.tokens[self.tokens.len() - 1]
        }
    }

    /// Advance to the next token
    fn advance(&mut self) -> &Token {
        if self.current < self.tokens.len() {
            let token = &self.tokens[self.current];
            self.current += 1;
            token
        } else {
            &self.tokens[self.tokens.len() - 1]
        }
    }

    /// Parse logical OR (lowest precedence)
    fn parse_logical_or(&mut self) -> Result<IntermediateExpression, CompilerError> {
        let mut left = self.parse_logical_and()?;

        while self.check_identifier("OR") {
            self.advance(); // consume OR
            let right = self.parse_logical_and()?;
            left = IntermediateExpression::LogicalOp {
                op_code: LogicalOp::Or as u8,
                left: Box::new(left),
                right: Some(Box::new(right)),
            };
        }

        Ok(left)
    }

    /// Parse logical AND
    fn parse_logical_and(&mut self) -> Result<IntermediateExpression, CompilerError> {
        let mut left = self.parse_logical_not()?;

        while self.check_identifier("AND") {
            self.advance(); // consume AND
            let right = self.parse_logical_not()?;
            left = IntermediateExpression::LogicalOp {
                op_code: LogicalOp::And as u8,
                left: Box::new(left),
                right: Some(Box::new(right)),
            };
        }

        Ok(left)
    }

    /// Parse logical NOT
    fn parse_logical_not(&mut self) -> Result<IntermediateExpression, CompilerError> {
        if self.check_identifier("NOT") {
            self.advance(); // consume NOT
            let operand = self.parse_logical_not()?;
            Ok(IntermediateExpression::LogicalOp {
                op_code: LogicalOp::Not as u8,
                left: Box::new(operand),
                right: None,
            })
        } else {
            self.parse_comparison()
        }
    }

    /// Parse a comparison. Chained comparisons (`a == b == c`) are rejected:
    /// after consuming one operator this returns, leaving any further
    /// operator token for the caller to reject as a trailing token.
    fn parse_comparison(&mut self) -> Result<IntermediateExpression, CompilerError> {
        let left = self.parse_primary()?;

        if let TokenType::Operator(ref op) = self.peek().token_type {
            let op_code = match op.as_str() {
                "==" => Some(BinaryOp::Eq as u8),
                "!=" => Some(BinaryOp::Ne as u8),
                ">" => Some(BinaryOp::Gt as u8),
                "<" => Some(BinaryOp::Lt as u8),
                ">=" => Some(BinaryOp::Gte as u8),
                "<=" => Some(BinaryOp::Lte as u8),
                _ => None,
            };

            if let Some(code) = op_code {
                self.advance(); // consume operator
                let right = self.parse_primary()?;
                return Ok(IntermediateExpression::BinaryOp {
                    op_code: code,
                    left: Box::new(left),
                    right: Box::new(right),
                });
            }
        }

        Ok(left)
    }

    /// Parse primary expressions (literals, properties, parentheses)
    fn parse_primary(&mut self) -> Result<IntermediateExpression, CompilerError> {
        let position = self.peek().position;

        match &self.peek().token_type {
            TokenType::Boolean(b) => {
                let value = *b;
                self.advance(); // consume token
                Ok(IntermediateExpression::Literal(serde_json::Value::Bool(
                    value,
                )))
            }
            TokenType::String(s) => {
                let value = s.clone();
                self.advance(); // consume token
                Ok(IntermediateExpression::Literal(serde_json::Value::String(
                    value,
                )))
            }
            TokenType::Number(n) => {
                let num = *n;
                self.advance(); // consume token
                                // Convert to integer if it's a whole number and fits in i64, otherwise keep as float
                if num.fract() == 0.0 && num >= (i64::MIN as f64) && num <= (i64::MAX as f64) {
                    Ok(IntermediateExpression::Literal(serde_json::Value::Number(
                        serde_json::Number::from(num as i64),
                    )))
                } else {
                    Ok(IntermediateExpression::Literal(serde_json::Value::Number(
                        serde_json::Number::from_f64(num).ok_or_else(|| {
                            CompilerError::Compilation(CompilationError::ExpressionParsing(
                                format!("Invalid number at position {}", position),
                            ))
                        })?,
                    )))
                }
            }
            TokenType::Identifier(ident) => {
                let value = ident.clone();
                self.advance(); // consume identifier
                                // Property access (e.g., user.role, context.environment, or role, environment)
                                // Note: user. and context. prefixes are accepted for backward compatibility
                                // but will be normalized (stripped) during string table processing
                Ok(IntermediateExpression::Property(value))
            }
            TokenType::LeftParen => {
                self.advance(); // consume '('
                let expr = self.parse_logical_or()?;
                if !self.check_token_type(&TokenType::RightParen) {
                    return Err(CompilerError::Compilation(
                        CompilationError::ExpressionParsing(format!(
                            "Expected ')' at position {}",
                            self.peek().position
                        )),
                    ));
                }
                self.advance(); // consume ')'
                Ok(expr)
            }
            _ => {
                let position = self.peek().position;
                let token_type = format!("{:?}", self.peek().token_type);
                Err(CompilerError::Compilation(
                    CompilationError::ExpressionParsing(format!(
                        "Unexpected token at position {}: {}",
                        position, token_type
                    )),
                ))
            }
        }
    }

    /// Check if current token is an identifier with the given value
    fn check_identifier(&self, value: &str) -> bool {
        matches!(&self.peek().token_type, TokenType::Identifier(s) if s == value)
    }

    /// Check if current token matches the given token type
    fn check_token_type(&self, token_type: &TokenType) -> bool {
        std::mem::discriminant(&self.peek().token_type) == std::mem::discriminant(token_type)
    }
}

impl Default for ExpressionParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an expression string into an intermediate Expression.
/// The result should be processed by StringTable.processExpression() to convert
/// strings to string table indices.
///
/// # Arguments
///
/// * `expr` - Expression string (e.g., "user.role == 'admin'" or "role == 'admin'")
///   Note: user. and context. prefixes are accepted but will be normalized during compilation
///
/// # Returns
///
/// Intermediate Expression (with strings, not indices)
///
/// # Errors
///
/// Returns `CompilerError::Parse` if expression is invalid
pub fn parse_expression(expr: &str) -> Result<IntermediateExpression, CompilerError> {
    let mut parser = ExpressionParser::new();
    parser.parse(expr.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_comparison() {
        let result = parse_expression("user.role == 'admin'").unwrap();
        match result {
            IntermediateExpression::BinaryOp {
                op_code,
                left,
                right,
            } => {
                assert_eq!(op_code, BinaryOp::Eq as u8);
                match *left {
                    IntermediateExpression::Property(ref prop) => {
                        assert_eq!(prop, "user.role");
                    }
                    _ => panic!("Expected Property"),
                }
                match *right {
                    IntermediateExpression::Literal(serde_json::Value::String(ref s)) => {
                        assert_eq!(s, "admin");
                    }
                    _ => panic!("Expected String literal"),
                }
            }
            _ => panic!("Expected BinaryOp"),
        }
    }

    #[test]
    fn test_parse_logical_and() {
        let result =
            parse_expression("user.role == 'admin' AND environment == 'production'").unwrap();
        match result {
            IntermediateExpression::LogicalOp { op_code, right, .. } => {
                assert_eq!(op_code, LogicalOp::And as u8);
                assert!(right.is_some());
            }
            _ => panic!("Expected LogicalOp"),
        }
    }

    #[test]
    fn test_parse_logical_or() {
        let result = parse_expression("user.role == 'admin' OR user.role == 'moderator'").unwrap();
        match result {
            IntermediateExpression::LogicalOp { op_code, .. } => {
                assert_eq!(op_code, LogicalOp::Or as u8);
            }
            _ => panic!("Expected LogicalOp"),
        }
    }

    #[test]
    fn test_parse_logical_not() {
        let result = parse_expression("NOT user.role == 'guest'").unwrap();
        match result {
            IntermediateExpression::LogicalOp { op_code, right, .. } => {
                assert_eq!(op_code, LogicalOp::Not as u8);
                assert!(right.is_none());
            }
            _ => panic!("Expected LogicalOp with NOT"),
        }
    }

    #[test]
    fn test_parse_parentheses() {
        let result = parse_expression(
            "(user.role == 'admin' AND environment == 'production') OR user.role == 'moderator'",
        )
        .unwrap();
        match result {
            IntermediateExpression::LogicalOp { op_code, .. } => {
                assert_eq!(op_code, LogicalOp::Or as u8);
            }
            _ => panic!("Expected LogicalOp"),
        }
    }

    #[test]
    fn test_parse_number_literal() {
        let result = parse_expression("user.account_age_days > 30").unwrap();
        match result {
            IntermediateExpression::BinaryOp { op_code, right, .. } => {
                assert_eq!(op_code, BinaryOp::Gt as u8);
                match *right {
                    IntermediateExpression::Literal(serde_json::Value::Number(n)) => {
                        assert_eq!(n.as_i64(), Some(30));
                    }
                    _ => panic!("Expected Number literal"),
                }
            }
            _ => panic!("Expected BinaryOp"),
        }
    }

    #[test]
    fn test_parse_float_literal() {
        let result = parse_expression("user.score > 30.5").unwrap();
        match result {
            IntermediateExpression::BinaryOp { right, .. } => match *right {
                IntermediateExpression::Literal(serde_json::Value::Number(n)) => {
                    assert!((n.as_f64().unwrap() - 30.5).abs() < f64::EPSILON);
                }
                _ => panic!("Expected Number literal"),
            },
            _ => panic!("Expected BinaryOp"),
        }
    }

    #[test]
    fn test_parse_boolean_literal() {
        let result = parse_expression("true").unwrap();
        match result {
            IntermediateExpression::Literal(serde_json::Value::Bool(b)) => {
                assert!(b);
            }
            _ => panic!("Expected Boolean literal"),
        }
    }

    #[test]
    fn test_parse_complex_expression() {
        let result = parse_expression(
            "user.role == 'admin' AND (environment == 'production' OR environment == 'staging')",
        )
        .unwrap();
        match result {
            IntermediateExpression::LogicalOp { op_code, .. } => {
                assert_eq!(op_code, LogicalOp::And as u8);
            }
            _ => panic!("Expected LogicalOp"),
        }
    }

    #[test]
    fn test_parse_all_comparison_operators() {
        let ops = vec![
            ("==", BinaryOp::Eq),
            ("!=", BinaryOp::Ne),
            (">", BinaryOp::Gt),
            ("<", BinaryOp::Lt),
            (">=", BinaryOp::Gte),
            ("<=", BinaryOp::Lte),
        ];

        for (op_str, op_enum) in ops {
            let expr = format!("user.score {} 100", op_str);
            let result = parse_expression(&expr).unwrap();
            match result {
                IntermediateExpression::BinaryOp { op_code, .. } => {
                    assert_eq!(op_code, op_enum as u8, "Failed for operator: {}", op_str);
                }
                _ => panic!("Expected BinaryOp for operator: {}", op_str),
            }
        }
    }

    #[test]
    fn test_parse_error_unterminated_string() {
        let result = parse_expression("user.role == 'admin");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_error_unexpected_token() {
        let result = parse_expression("user.role == 'admin' AND");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_error_missing_closing_paren() {
        let result = parse_expression("(user.role == 'admin'");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_error_chained_comparison() {
        // "a == b == c" parses "a == b" and then errors on the trailing "== c".
        let result = parse_expression("a == b == c");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_string_escaping() {
        // Test escaped single quote
        let result = parse_expression("user.name == 'it\\'s a test'").unwrap();
        match result {
            IntermediateExpression::BinaryOp { right, .. } => match *right {
                IntermediateExpression::Literal(serde_json::Value::String(s)) => {
                    assert_eq!(s, "it's a test");
                }
                _ => panic!("Expected string literal"),
            },
            _ => panic!("Expected BinaryOp"),
        }

        // Test escaped backslash
        let result = parse_expression("'path\\\\to\\\\file'").unwrap();
        match result {
            IntermediateExpression::Literal(serde_json::Value::String(s)) => {
                assert_eq!(s, "path\\to\\file");
            }
            _ => panic!("Expected string literal"),
        }
    }

    #[test]
    fn test_parse_empty_string() {
        let result = parse_expression("user.name == ''").unwrap();
        match result {
            IntermediateExpression::BinaryOp { right, .. } => match *right {
                IntermediateExpression::Literal(serde_json::Value::String(s)) => {
                    assert_eq!(s, "");
                }
                _ => panic!("Expected empty string literal"),
            },
            _ => panic!("Expected BinaryOp"),
        }
    }

    #[test]
    fn test_parse_deep_property_access() {
        let result = parse_expression("user.profile.settings.theme == 'dark'").unwrap();
        match result {
            IntermediateExpression::BinaryOp { left, .. } => match *left {
                IntermediateExpression::Property(prop) => {
                    assert_eq!(prop, "user.profile.settings.theme");
                }
                _ => panic!("Expected Property"),
            },
            _ => panic!("Expected BinaryOp"),
        }
    }

    #[test]
    fn test_parse_complex_precedence() {
        // Test that AND has higher precedence than OR
        let result = parse_expression(
            "user.role == 'admin' OR user.role == 'moderator' AND environment == 'production'",
        )
        .unwrap();
        // Should parse as: (user.role == 'admin') OR ((user.role == 'moderator') AND (environment == 'production'))
        match result {
            IntermediateExpression::LogicalOp { op_code, .. } => {
                assert_eq!(op_code, LogicalOp::Or as u8);
            }
            _ => panic!("Expected LogicalOp with OR"),
        }
    }

    #[test]
    fn test_parse_parentheses_override_precedence() {
        // Test that parentheses override operator precedence
        let result = parse_expression(
            "(user.role == 'admin' OR user.role == 'moderator') AND environment == 'production'",
        )
        .unwrap();
        // Should parse as: ((user.role == 'admin') OR (user.role == 'moderator')) AND (environment == 'production')
        match result {
            IntermediateExpression::LogicalOp { op_code, .. } => {
                assert_eq!(op_code, LogicalOp::And as u8);
            }
            _ => panic!("Expected LogicalOp with AND"),
        }
    }

    // Behavior tests: verify parsed expressions can be compiled end-to-end
    // through the string table, not just that they have the right shape.

    #[test]
    fn test_parse_and_compile_simple_comparison() {
        use crate::compiler::string_table::StringTable;

        let expr = parse_expression("user.role == 'admin'").unwrap();
        let mut string_table = StringTable::new();
        let compiled = string_table.process_expression(&expr).unwrap();

        match compiled {
            crate::ast::Expression::BinaryOp { .. } => {}
            _ => panic!("Expected BinaryOp after compilation"),
        }
    }

    #[test]
    fn test_parse_and_compile_logical_and() {
        use crate::compiler::string_table::StringTable;

        let expr =
            parse_expression("user.role == 'admin' AND environment == 'production'").unwrap();
        let mut string_table = StringTable::new();
        let compiled = string_table.process_expression(&expr).unwrap();

        match compiled {
            crate::ast::Expression::LogicalOp { .. } => {}
            _ => panic!("Expected LogicalOp after compilation"),
        }
    }

    #[test]
    fn test_parse_and_compile_logical_not() {
        use crate::compiler::string_table::StringTable;

        let expr = parse_expression("NOT user.role == 'guest'").unwrap();
        let mut string_table = StringTable::new();
        let compiled = string_table.process_expression(&expr).unwrap();

        match compiled {
            crate::ast::Expression::LogicalOp { .. } => {}
            _ => panic!("Expected LogicalOp after compilation"),
        }
    }

    #[test]
    fn test_parse_and_compile_parentheses() {
        use crate::compiler::string_table::StringTable;

        let expr = parse_expression(
            "(user.role == 'admin' AND environment == 'production') OR user.role == 'moderator'",
        )
        .unwrap();
        let mut string_table = StringTable::new();
        let compiled = string_table.process_expression(&expr).unwrap();

        match compiled {
            crate::ast::Expression::LogicalOp { .. } => {}
            _ => panic!("Expected LogicalOp after compilation"),
        }
    }
}
