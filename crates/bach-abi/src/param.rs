//! ABI parameter descriptions

use std::fmt;

use serde::{Deserialize, Serialize};

/// One ABI parameter: its type string, optional name and, for tuple types,
/// its components.
///
/// Deserializes from the Solidity JSON ABI parameter shape. An empty JSON
/// `name` is treated as unnamed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Parameter {
    /// ABI type string, e.g. `uint256`, `bytes4[]`, `tuple[2]`
    #[serde(rename = "type")]
    pub ty: String,
    /// Parameter name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tuple components; present iff `ty` is `tuple` or a tuple array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Parameter>>,
    /// Event parameters only: stored in a topic rather than in data
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub indexed: bool,
    /// Solidity source type, kept for fidelity with compiler output
    #[serde(
        default,
        rename = "internalType",
        skip_serializing_if = "Option::is_none"
    )]
    pub internal_type: Option<String>,
}

impl Parameter {
    /// Unnamed parameter of type `ty`
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            ..Default::default()
        }
    }

    /// Named parameter of type `ty`
    pub fn named(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ty).with_name(name)
    }

    /// Tuple (or tuple array, e.g. `tuple[]`) parameter
    pub fn tuple(ty: impl Into<String>, components: Vec<Parameter>) -> Self {
        Self {
            ty: ty.into(),
            components: Some(components),
            ..Default::default()
        }
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark as an indexed event parameter
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// The name, if present and non-empty
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Canonical type as used in signatures: tuples expanded to
    /// `(c1,c2,...)`, `uint`/`int` widened to 256 bits.
    pub fn canonical_type(&self) -> String {
        if let Some(suffix) = self.ty.strip_prefix("tuple") {
            let inner: Vec<String> = self
                .components
                .iter()
                .flatten()
                .map(Parameter::canonical_type)
                .collect();
            return format!("({}){}", inner.join(","), suffix);
        }
        let split = self.ty.find('[').unwrap_or(self.ty.len());
        let (base, suffix) = self.ty.split_at(split);
        match base {
            "uint" => format!("uint256{suffix}"),
            "int" => format!("int256{suffix}"),
            _ => self.ty.clone(),
        }
    }
}

/// Formats as `type name`, or just `type` when unnamed
impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_type())?;
        if self.indexed {
            write!(f, " indexed")?;
        }
        if let Some(name) = self.name() {
            write!(f, " {name}")?;
        }
        Ok(())
    }
}

/// Join parameters as `type name, type name`
pub(crate) fn format_params(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
