// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Typed parameter values
//!
//! An `Attribute` holds exactly one of the five value kinds a component
//! parameter can take. The serialized form uses the single-letter keys of
//! the component parameter records (`s`, `ss`, `i64`, `f`, `b`).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{ExportError, ExportResult};

/// A single typed parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attribute {
    /// String value
    #[serde(rename = "s")]
    Str(String),
    /// Ordered list of strings
    #[serde(rename = "ss")]
    StrList(Vec<String>),
    /// 64-bit integer
    #[serde(rename = "i64")]
    Int(i64),
    /// 64-bit float
    #[serde(rename = "f")]
    Float(f64),
    /// Boolean flag
    #[serde(rename = "b")]
    Bool(bool),
}

impl Attribute {
    /// Name of the populated variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::StrList(_) => "string list",
            Self::Int(_) => "int64",
            Self::Float(_) => "float64",
            Self::Bool(_) => "bool",
        }
    }

    /// False only for NaN or infinite floats
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Float(f) => f.is_finite(),
            _ => true,
        }
    }

    fn wrong(&self, expected: &'static str) -> ExportError {
        ExportError::AttributeType {
            expected,
            found: self.kind(),
        }
    }

    pub fn as_str(&self) -> ExportResult<&str> {
        match self {
            Self::Str(s) => Ok(s),
            other => Err(other.wrong("string")),
        }
    }

    pub fn as_str_list(&self) -> ExportResult<&[String]> {
        match self {
            Self::StrList(ss) => Ok(ss),
            other => Err(other.wrong("string list")),
        }
    }

    pub fn as_i64(&self) -> ExportResult<i64> {
        match self {
            Self::Int(i) => Ok(*i),
            other => Err(other.wrong("int64")),
        }
    }

    pub fn as_f64(&self) -> ExportResult<f64> {
        match self {
            Self::Float(f) => Ok(*f),
            other => Err(other.wrong("float64")),
        }
    }

    pub fn as_bool(&self) -> ExportResult<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(other.wrong("bool")),
        }
    }

    /// Column names carried by a column-selecting attribute.
    ///
    /// Both a single string and a string list name columns; any other kind
    /// cannot select columns.
    pub fn column_names(&self) -> ExportResult<Vec<&str>> {
        match self {
            Self::Str(s) => Ok(vec![s.as_str()]),
            Self::StrList(ss) => Ok(ss.iter().map(String::as_str).collect()),
            other => Err(other.wrong("string or string list")),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{:?}", s),
            Self::StrList(ss) => write!(f, "[{}]", ss.join(", ")),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Attribute {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<Vec<String>> for Attribute {
    fn from(ss: Vec<String>) -> Self {
        Self::StrList(ss)
    }
}

impl From<i64> for Attribute {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Attribute {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Attribute {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
