/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * AST types for compiled flag artifacts.
 *
 * Expression and Rule are sum types internally (plain Rust enums) but are
 * encoded on the wire as tagged positional arrays rather than serde's default
 * externally-tagged map encoding, so that a MessagePack reader in any
 * language can decode them without knowing Rust variant names. Variation and
 * the rollout/serve payloads have no alternate shapes per variant, so an
 * ordinary derive is sufficient - the tuple encoding rmp-serde already uses
 * for plain structs gives the same positional layout for free. Artifact is
 * the one named map on the wire and is hand-rolled on both sides; its
 * Deserialize reads fields back by key rather than by declaration order,
 * which is what actually fixes the original round-trip bug where an
 * artifact with `segments` omitted and `sig` present shifted every later
 * field by one slot under positional decoding.
 */

pub mod guards;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator codes used by `Expression::BinaryOp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq = 0,
    Ne = 1,
    Gt = 2,
    Lt = 3,
    Gte = 4,
    Lte = 5,
}

/// Logical operator codes used by `Expression::LogicalOp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And = 0,
    Or = 1,
    Not = 2,
}

/// Compiled expression tree. String literals and property paths have
/// already been replaced with string table indices by this point.
///
/// Wire shape: a positional array `[tag, ...]`, tag 0 = `BinaryOp`,
/// 1 = `LogicalOp`, 2 = `Property`, 3 = `Literal`, 4 = `Func`.
///
/// `Func` is a reserved variant. No grammar production ever constructs one;
/// it exists so a decoder built against a later, richer grammar stays
/// forward-compatible with artifacts compiled by this one.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    BinaryOp {
        op_code: u8,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    LogicalOp {
        op_code: u8,
        left: Box<Expression>,
        right: Option<Box<Expression>>,
    },
    Property {
        prop_index: u32,
    },
    Literal {
        value: serde_json::Value,
    },
    Func {
        func_code: u8,
        args: Vec<Expression>,
    },
}

impl Serialize for Expression {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Expression::BinaryOp {
                op_code,
                left,
                right,
            } => (0u8, op_code, left, right).serialize(serializer),
            Expression::LogicalOp {
                op_code,
                left,
                right,
            } => (1u8, op_code, left, right).serialize(serializer),
            Expression::Property { prop_index } => (2u8, prop_index).serialize(serializer),
            Expression::Literal { value } => (3u8, value).serialize(serializer),
            Expression::Func { func_code, args } => (4u8, func_code, args).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ExpressionVisitor;

        impl<'de> Visitor<'de> for ExpressionVisitor {
            type Value = Expression;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an expression array [tag, ...]")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Expression, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let tag: u8 = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::custom("missing expression tag"))?;

                match tag {
                    0 => {
                        let op_code: u8 = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::custom("binary_op missing op_code"))?;
                        let left: Expression = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::custom("binary_op missing left"))?;
                        let right: Expression = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::custom("binary_op missing right"))?;
                        Ok(Expression::BinaryOp {
                            op_code,
                            left: Box::new(left),
                            right: Box::new(right),
                        })
                    }
                    1 => {
                        let op_code: u8 = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::custom("logical_op missing op_code"))?;
                        let left: Expression = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::custom("logical_op missing left"))?;
                        let right: Option<Expression> = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::custom("logical_op missing right slot"))?;
                        Ok(Expression::LogicalOp {
                            op_code,
                            left: Box::new(left),
                            right: right.map(Box::new),
                        })
                    }
                    2 => {
                        let prop_index: u32 = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::custom("property missing prop_index"))?;
                        Ok(Expression::Property { prop_index })
                    }
                    3 => {
                        let value: serde_json::Value = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::custom("literal missing value"))?;
                        Ok(Expression::Literal { value })
                    }
                    4 => {
                        let func_code: u8 = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::custom("func missing func_code"))?;
                        let args: Vec<Expression> = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::custom("func missing args"))?;
                        Ok(Expression::Func { func_code, args })
                    }
                    other => Err(de::Error::custom(format!(
                        "unknown expression tag: {other}"
                    ))),
                }
            }
        }

        deserializer.deserialize_seq(ExpressionVisitor)
    }
}

/// Serve rule payload. A single variant today (a string table index); kept
/// as an enum so a richer payload (e.g. a structured value) can be added
/// later without changing the `Rule` wire shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServePayload {
    Number(u32),
}

impl Serialize for ServePayload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ServePayload::Number(n) => n.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ServePayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let n = u32::deserialize(deserializer)?;
        Ok(ServePayload::Number(n))
    }
}

/// A single weighted variation. Wire shape: `[var_index, percentage]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    pub var_index: u32,
    pub percentage: u8,
}

/// Rollout target value, mirroring `ServePayload`'s forward-compatibility shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutValue {
    Number(u32),
}

impl Serialize for RolloutValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RolloutValue::Number(n) => n.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for RolloutValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let n = u32::deserialize(deserializer)?;
        Ok(RolloutValue::Number(n))
    }
}

/// Rollout rule payload. Wire shape: `[value_index, percentage]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutPayload {
    pub value_index: RolloutValue,
    pub percentage: u8,
}

/// A single compiled rule for a flag.
///
/// Wire shape: a positional array `[tag, when, payload]`, tag 0 = `SERVE`,
/// 1 = `VARIATIONS`, 2 = `ROLLOUT`. `when` is `null` when the rule has no
/// guard expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    ServeWithoutWhen(ServePayload),
    ServeWithWhen(Expression, ServePayload),
    VariationsWithoutWhen(Vec<Variation>),
    VariationsWithWhen(Expression, Vec<Variation>),
    RolloutWithoutWhen(RolloutPayload),
    RolloutWithWhen(Expression, RolloutPayload),
}

impl Serialize for Rule {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Rule::ServeWithoutWhen(payload) => {
                (0u8, None::<&Expression>, payload).serialize(serializer)
            }
            Rule::ServeWithWhen(when, payload) => {
                (0u8, Some(when), payload).serialize(serializer)
            }
            Rule::VariationsWithoutWhen(variations) => {
                (1u8, None::<&Expression>, variations).serialize(serializer)
            }
            Rule::VariationsWithWhen(when, variations) => {
                (1u8, Some(when), variations).serialize(serializer)
            }
            Rule::RolloutWithoutWhen(payload) => {
                (2u8, None::<&Expression>, payload).serialize(serializer)
            }
            Rule::RolloutWithWhen(when, payload) => {
                (2u8, Some(when), payload).serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Rule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RuleVisitor;

        impl<'de> Visitor<'de> for RuleVisitor {
            type Value = Rule;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a rule array [tag, when, payload]")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Rule, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let tag: u8 = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::custom("missing rule tag"))?;
                let when: Option<Expression> = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::custom("missing rule when slot"))?;

                match tag {
                    0 => {
                        let payload: ServePayload = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::custom("serve rule missing payload"))?;
                        Ok(match when {
                            Some(expr) => Rule::ServeWithWhen(expr, payload),
                            None => Rule::ServeWithoutWhen(payload),
                        })
                    }
                    1 => {
                        let variations: Vec<Variation> = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::custom("variations rule missing payload"))?;
                        Ok(match when {
                            Some(expr) => Rule::VariationsWithWhen(expr, variations),
                            None => Rule::VariationsWithoutWhen(variations),
                        })
                    }
                    2 => {
                        let payload: RolloutPayload = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::custom("rollout rule missing payload"))?;
                        Ok(match when {
                            Some(expr) => Rule::RolloutWithWhen(expr, payload),
                            None => Rule::RolloutWithoutWhen(payload),
                        })
                    }
                    other => Err(de::Error::custom(format!("unknown rule tag: {other}"))),
                }
            }
        }

        deserializer.deserialize_seq(RuleVisitor)
    }
}

/// A compiled flag/deployment artifact: the unit produced by [`crate::compile`]
/// and consumed by [`crate::serialize`].
///
/// Wire shape: a MessagePack map with fixed key names `v`, `env`, `strs`,
/// `flags`, `flagNames`, `segments`, `sig`. `segments` and `sig` are omitted
/// entirely from the map when absent rather than written as `null`, so a
/// reader's field lookup never has to distinguish "absent" from "present but
/// null". Deserializing by key (not by positional index) is what actually
/// fixes the original round-trip bug: a derive-based struct map in this
/// formatter reads fields back by the order they were declared rather than
/// the order they appear on the wire, so an artifact with `segments` omitted
/// and `sig` present shifted every later field by one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub version: String,
    pub environment: String,
    pub string_table: Vec<String>,
    pub flags: Vec<Vec<Rule>>,
    pub flag_names: Vec<u32>,
    pub segments: Option<Vec<(u32, Expression)>>,
    pub signature: Option<Vec<u8>>,
}

impl Serialize for Artifact {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        let len = 5 + usize::from(self.segments.is_some()) + usize::from(self.signature.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("v", &self.version)?;
        map.serialize_entry("env", &self.environment)?;
        map.serialize_entry("strs", &self.string_table)?;
        map.serialize_entry("flags", &self.flags)?;
        map.serialize_entry("flagNames", &self.flag_names)?;
        if let Some(segments) = &self.segments {
            map.serialize_entry("segments", segments)?;
        }
        if let Some(signature) = &self.signature {
            map.serialize_entry("sig", serde_bytes::Bytes::new(signature))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Artifact {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ArtifactVisitor;

        impl<'de> Visitor<'de> for ArtifactVisitor {
            type Value = Artifact;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an artifact map")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Artifact, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut version: Option<String> = None;
                let mut environment: Option<String> = None;
                let mut string_table: Option<Vec<String>> = None;
                let mut flags: Option<Vec<Vec<Rule>>> = None;
                let mut flag_names: Option<Vec<u32>> = None;
                let mut segments: Option<Vec<(u32, Expression)>> = None;
                let mut signature: Option<Vec<u8>> = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "v" => version = Some(map.next_value()?),
                        "env" => environment = Some(map.next_value()?),
                        "strs" => string_table = Some(map.next_value()?),
                        "flags" => flags = Some(map.next_value()?),
                        "flagNames" => flag_names = Some(map.next_value()?),
                        "segments" => segments = Some(map.next_value()?),
                        "sig" => {
                            let bytes: serde_bytes::ByteBuf = map.next_value()?;
                            signature = Some(bytes.into_vec());
                        }
                        _ => {
                            let _ignored: de::IgnoredAny = map.next_value()?;
                        }
                    }
                }

                Ok(Artifact {
                    version: version.ok_or_else(|| de::Error::missing_field("v"))?,
                    environment: environment.ok_or_else(|| de::Error::missing_field("env"))?,
                    string_table: string_table
                        .ok_or_else(|| de::Error::missing_field("strs"))?,
                    flags: flags.ok_or_else(|| de::Error::missing_field("flags"))?,
                    flag_names: flag_names
                        .ok_or_else(|| de::Error::missing_field("flagNames"))?,
                    segments,
                    signature,
                })
            }
        }

        deserializer.deserialize_map(ArtifactVisitor)
    }
}
