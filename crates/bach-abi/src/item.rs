//! ABI items (functions, events, errors, ...) and ABI documents

use std::fmt;
use std::ops::Deref;

use bach_crypto::keccak256;
use bach_primitives::H256;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::param::Parameter;
use crate::value::Value;

/// Kind of an ABI item, the JSON `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Contract function
    Function,
    /// Log event
    Event,
    /// Custom error
    Error,
    /// Constructor
    Constructor,
    /// Fallback function
    Fallback,
    /// Receive function
    Receive,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemKind::Function => "function",
            ItemKind::Event => "event",
            ItemKind::Error => "error",
            ItemKind::Constructor => "constructor",
            ItemKind::Fallback => "fallback",
            ItemKind::Receive => "receive",
        };
        f.write_str(s)
    }
}

/// One entry of a contract ABI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiItem {
    /// Item kind
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Item name (absent for constructor, fallback and receive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Input parameters
    #[serde(default)]
    pub inputs: Vec<Parameter>,
    /// Output parameters (functions only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<Parameter>,
    /// Anonymous event: no signature hash in topic 0
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub anonymous: bool,
    /// `pure`, `view`, `nonpayable` or `payable`
    #[serde(
        default,
        rename = "stateMutability",
        skip_serializing_if = "Option::is_none"
    )]
    pub state_mutability: Option<String>,
    /// Other same-named items, attached by the resolver when it could not
    /// settle on one overload
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overloads: Vec<AbiItem>,
}

impl AbiItem {
    fn new(kind: ItemKind, name: Option<String>, inputs: Vec<Parameter>) -> Self {
        Self {
            kind,
            name,
            inputs,
            outputs: Vec::new(),
            anonymous: false,
            state_mutability: None,
            overloads: Vec::new(),
        }
    }

    /// Function item
    pub fn function(
        name: impl Into<String>,
        inputs: Vec<Parameter>,
        outputs: Vec<Parameter>,
    ) -> Self {
        let mut item = Self::new(ItemKind::Function, Some(name.into()), inputs);
        item.outputs = outputs;
        item
    }

    /// Event item
    pub fn event(name: impl Into<String>, inputs: Vec<Parameter>) -> Self {
        Self::new(ItemKind::Event, Some(name.into()), inputs)
    }

    /// Error item
    pub fn error(name: impl Into<String>, inputs: Vec<Parameter>) -> Self {
        Self::new(ItemKind::Error, Some(name.into()), inputs)
    }

    /// Constructor item
    pub fn constructor(inputs: Vec<Parameter>) -> Self {
        Self::new(ItemKind::Constructor, None, inputs)
    }

    /// Mark an event as anonymous
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// The name, if present and non-empty
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(Parameter::canonical_type).collect();
        format!("{}({})", self.name().unwrap_or_default(), types.join(","))
    }

    /// Attach the signature hash so repeated encodes skip rehashing
    pub fn prepare(self) -> PreparedItem {
        let hash = keccak256(self.signature().as_bytes());
        PreparedItem { item: self, hash }
    }
}

/// Access to an item and its signature hash
///
/// Implemented by [`AbiItem`], which hashes on every call, and by
/// [`PreparedItem`], which returns its stored hash.
pub trait SignatureHash {
    /// The underlying item
    fn item(&self) -> &AbiItem;

    /// Keccak-256 of the canonical signature
    fn signature_hash(&self) -> H256 {
        keccak256(self.item().signature().as_bytes())
    }

    /// First 4 bytes of the signature hash
    fn selector(&self) -> [u8; 4] {
        let hash = self.signature_hash();
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&hash.as_bytes()[..4]);
        selector
    }
}

impl SignatureHash for AbiItem {
    fn item(&self) -> &AbiItem {
        self
    }
}

/// An item with its signature hash computed once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedItem {
    item: AbiItem,
    hash: H256,
}

impl PreparedItem {
    /// Stored signature hash
    pub fn hash(&self) -> H256 {
        self.hash
    }

    /// Drop the cached hash
    pub fn into_inner(self) -> AbiItem {
        self.item
    }
}

impl SignatureHash for PreparedItem {
    fn item(&self) -> &AbiItem {
        &self.item
    }

    fn signature_hash(&self) -> H256 {
        self.hash
    }
}

impl Deref for PreparedItem {
    type Target = AbiItem;

    fn deref(&self) -> &AbiItem {
        &self.item
    }
}

/// A contract ABI: an ordered list of items, names may repeat
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Abi(Vec<AbiItem>);

impl Abi {
    /// Wrap a list of items
    pub fn new(items: Vec<AbiItem>) -> Self {
        Abi(items)
    }

    /// Parse a Solidity JSON ABI
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize back to JSON ABI
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Items of one kind, in declaration order
    pub fn of_kind(&self, kind: ItemKind) -> impl Iterator<Item = &AbiItem> {
        self.0.iter().filter(move |item| item.kind == kind)
    }

    /// The constructor, if declared
    pub fn constructor(&self) -> Option<&AbiItem> {
        self.of_kind(ItemKind::Constructor).next()
    }

    /// Resolve an item by name or selector; see [`crate::extract`]
    pub fn extract(&self, key: &str, args: Option<&[Value]>) -> Result<AbiItem> {
        crate::resolve::extract(&self.0, key, args)
    }

    /// Consume into the item list
    pub fn into_items(self) -> Vec<AbiItem> {
        self.0
    }
}

impl Deref for Abi {
    type Target = [AbiItem];

    fn deref(&self) -> &[AbiItem] {
        &self.0
    }
}

impl From<Vec<AbiItem>> for Abi {
    fn from(items: Vec<AbiItem>) -> Self {
        Abi(items)
    }
}

impl FromIterator<AbiItem> for Abi {
    fn from_iter<T: IntoIterator<Item = AbiItem>>(iter: T) -> Self {
        Abi(iter.into_iter().collect())
    }
}
