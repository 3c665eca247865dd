//! ABI item lookup and overload resolution

use bach_primitives::bytes;

use crate::error::{AbiError, Result};
use crate::item::{AbiItem, ItemKind, SignatureHash};
use crate::param::Parameter;
use crate::ty::{ParamType, TupleField};
use crate::value::Value;

/// Find an item by name or by selector, choosing an overload by argument
/// shape.
///
/// A `0x` hex key is matched against function and error selectors (its
/// first 4 bytes) and against full event signature hashes. Any other key is
/// matched against item names.
///
/// With several candidates:
/// - no arguments selects the first candidate without inputs;
/// - otherwise every candidate whose inputs accept `args` is considered in
///   declaration order, and a later match replaces an earlier one unless
///   the two are ambiguous for these arguments, which is an error;
/// - with no match, the first candidate is returned with the others
///   attached as [`AbiItem::overloads`].
pub fn extract(abi: &[AbiItem], key: &str, args: Option<&[Value]>) -> Result<AbiItem> {
    let candidates = find_candidates(abi, key);

    match candidates.as_slice() {
        [] => {
            return Err(AbiError::ItemNotFound {
                name: key.to_string(),
            })
        }
        [item] => return Ok((*item).clone()),
        _ => {}
    }

    let args = args.unwrap_or_default();
    if args.is_empty() {
        if let Some(item) = candidates.iter().find(|c| c.inputs.is_empty()) {
            return Ok((*item).clone());
        }
    } else if let Some(item) = match_overload(&candidates, args)? {
        return Ok(item.clone());
    }

    tracing::debug!(
        key,
        candidates = candidates.len(),
        "no overload matches arguments, using first declaration"
    );
    let mut first = candidates[0].clone();
    first.overloads = candidates[1..].iter().map(|c| (*c).clone()).collect();
    Ok(first)
}

fn find_candidates<'a>(abi: &'a [AbiItem], key: &str) -> Vec<&'a AbiItem> {
    if !bytes::is_hex(key) {
        return abi.iter().filter(|item| item.name() == Some(key)).collect();
    }
    let Ok(raw) = bytes::from_hex(key) else {
        return Vec::new();
    };
    abi.iter()
        .filter(|item| match item.kind {
            ItemKind::Function | ItemKind::Error => {
                raw.len() >= 4 && raw[..4] == item.selector()
            }
            ItemKind::Event => raw.as_slice() == item.signature_hash().as_bytes(),
            _ => false,
        })
        .collect()
}

fn match_overload<'a>(
    candidates: &[&'a AbiItem],
    args: &[Value],
) -> Result<Option<&'a AbiItem>> {
    let mut matched: Option<&'a AbiItem> = None;
    for &candidate in candidates {
        if candidate.inputs.len() != args.len() {
            continue;
        }
        let accepts = candidate
            .inputs
            .iter()
            .zip(args)
            .all(|(param, arg)| is_arg_of_type(arg, param));
        if !accepts {
            continue;
        }
        if let Some(previous) = matched {
            let args: Vec<Option<&Value>> = args.iter().map(Some).collect();
            if let Some((type_a, type_b)) =
                ambiguous_types(&classify(&candidate.inputs), &classify(&previous.inputs), &args)
            {
                tracing::debug!(
                    candidate = %candidate.signature(),
                    previous = %previous.signature(),
                    "ambiguous overloads"
                );
                return Err(AbiError::ItemAmbiguity {
                    candidate_a: candidate.signature(),
                    type_a,
                    candidate_b: previous.signature(),
                    type_b,
                });
            }
        }
        tracing::trace!(signature = %candidate.signature(), "overload accepts arguments");
        matched = Some(candidate);
    }
    Ok(matched)
}

/// Whether `arg` has a runtime shape that `param` accepts
pub fn is_arg_of_type(arg: &Value, param: &Parameter) -> bool {
    if param.ty == "function" {
        return matches!(arg, Value::String(_));
    }
    ParamType::from_param(param).is_ok_and(|ty| accepts(&ty, arg))
}

fn accepts(ty: &ParamType, arg: &Value) -> bool {
    match ty {
        ParamType::Address => arg.is_address_shaped(),
        ParamType::Bool => matches!(arg, Value::Bool(_)),
        ParamType::String => matches!(arg, Value::String(_)),
        ParamType::Uint(_) | ParamType::Int(_) => arg.is_number(),
        ParamType::Bytes | ParamType::FixedBytes(_) => match arg {
            Value::Bytes(_) | Value::Address(_) => true,
            Value::String(s) => bytes::is_hex(s),
            _ => false,
        },
        ParamType::Array(inner) | ParamType::FixedArray(inner, _) => match arg {
            Value::Array(items) => items.iter().all(|item| accepts(inner, item)),
            _ => false,
        },
        ParamType::Tuple(fields) => fields.iter().enumerate().all(|(i, field)| {
            field_arg(arg, field, i).is_some_and(|item| accepts(&field.kind, item))
        }),
    }
}

/// Component `i` of a tuple-like value: by name for a named field of a
/// `Struct`, by position otherwise
fn field_arg<'v>(arg: &'v Value, field: &TupleField, i: usize) -> Option<&'v Value> {
    match (arg, &field.name) {
        (Value::Struct(entries), Some(name)) => {
            entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
        }
        (Value::Struct(entries), None) => entries.get(i).map(|(_, v)| v),
        (Value::Tuple(items) | Value::Array(items), _) => items.get(i),
        _ => None,
    }
}

fn classify(params: &[Parameter]) -> Vec<Option<ParamType>> {
    params.iter().map(|p| ParamType::from_param(p).ok()).collect()
}

/// First position where the two input lists would accept the same argument
/// but encode it differently
fn ambiguous_types(
    source: &[Option<ParamType>],
    target: &[Option<ParamType>],
    args: &[Option<&Value>],
) -> Option<(String, String)> {
    source
        .iter()
        .zip(target)
        .enumerate()
        .find_map(|(i, pair)| match pair {
            (Some(a), Some(b)) => conflict(a, b, args.get(i).copied().flatten()),
            _ => None,
        })
}

fn conflict(a: &ParamType, b: &ParamType, arg: Option<&Value>) -> Option<(String, String)> {
    let address_arg = || arg.is_some_and(Value::is_address_shaped);
    let ambiguous = match (a, b) {
        (ParamType::Tuple(fa), ParamType::Tuple(fb)) => {
            let nested: Vec<Option<&Value>> = fa
                .iter()
                .enumerate()
                .map(|(i, field)| arg.and_then(|arg| field_arg(arg, field, i)))
                .collect();
            let fa: Vec<_> = fa.iter().map(|f| Some(f.kind.clone())).collect();
            let fb: Vec<_> = fb.iter().map(|f| Some(f.kind.clone())).collect();
            return ambiguous_types(&fa, &fb, &nested);
        }
        (ParamType::Address, ParamType::FixedBytes(20))
        | (ParamType::FixedBytes(20), ParamType::Address) => true,
        (ParamType::Address, ParamType::String | ParamType::Bytes)
        | (ParamType::String | ParamType::Bytes, ParamType::Address) => address_arg(),
        _ => false,
    };
    ambiguous.then(|| (a.to_string(), b.to_string()))
}
