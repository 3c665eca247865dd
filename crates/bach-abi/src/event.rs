//! Event log encoding and decoding
//!
//! Indexed parameters live in log topics, one word each, after the
//! signature hash in topic 0 (absent for anonymous events). The remaining
//! parameters are ABI-encoded in the log data.

use bach_crypto::keccak256;
use bach_primitives::bytes::{self, WORD_SIZE};
use bach_primitives::H256;

use crate::decode::{decode_types, Decoded};
use crate::encode::prepare;
use crate::error::{AbiError, Result};
use crate::item::{AbiItem, ItemKind, SignatureHash};
use crate::param::{format_params, Parameter};
use crate::ty::ParamType;
use crate::value::Value;

/// A raw log entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Log {
    /// Topics, signature hash first unless the event is anonymous
    pub topics: Vec<H256>,
    /// ABI-encoded non-indexed parameters
    pub data: Vec<u8>,
}

/// One position of a log filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    /// Wildcard, matches any topic
    Any,
    /// Matches exactly this topic
    Exact(H256),
    /// Matches any of these topics
    OneOf(Vec<H256>),
}

/// Filter values for indexed parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventArgs {
    /// By position among the indexed parameters; `None` is a wildcard
    Positional(Vec<Option<Value>>),
    /// By parameter name; missing names are wildcards
    Named(Vec<(String, Value)>),
}

/// A decoded log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLog {
    /// Event name
    pub event: String,
    /// Parameter values. Dynamic indexed parameters hold the topic itself as
    /// `Value::Bytes`, since only their hash is logged.
    pub args: Decoded,
}

fn ensure_event(item: &AbiItem) -> Result<()> {
    if item.kind != ItemKind::Event {
        return Err(AbiError::UnexpectedItemKind {
            expected: ItemKind::Event,
            actual: item.kind,
        });
    }
    Ok(())
}

/// Build log filter topics for `event`
///
/// The result always has one entry per indexed parameter, preceded by the
/// signature hash unless the event is anonymous. A value given as
/// `Value::Array` is an OR of its elements.
pub fn encode_event_topics<E>(event: &E, args: Option<&EventArgs>) -> Result<Vec<Topic>>
where
    E: SignatureHash + ?Sized,
{
    let item = event.item();
    ensure_event(item)?;

    let mut topics = Vec::new();
    if !item.anonymous {
        topics.push(Topic::Exact(event.signature_hash()));
    }

    for (i, param) in item.inputs.iter().filter(|p| p.indexed).enumerate() {
        let value = match args {
            None => None,
            Some(EventArgs::Positional(values)) => values.get(i).and_then(Option::as_ref),
            Some(EventArgs::Named(entries)) => param
                .name()
                .and_then(|name| entries.iter().find(|(n, _)| n == name))
                .map(|(_, v)| v),
        };
        let topic = match value {
            None => Topic::Any,
            Some(Value::Array(alternatives)) => Topic::OneOf(
                alternatives
                    .iter()
                    .map(|v| encode_topic(param, v))
                    .collect::<Result<_>>()?,
            ),
            Some(v) => Topic::Exact(encode_topic(param, v)?),
        };
        topics.push(topic);
    }
    Ok(topics)
}

/// Encode one indexed value as it appears in a topic
fn encode_topic(param: &Parameter, value: &Value) -> Result<H256> {
    let ty = ParamType::from_param(param)?;
    let invalid = || AbiError::InvalidValue {
        ty: ty.to_string(),
        value: value.to_string(),
    };
    match &ty {
        ParamType::String => Ok(keccak256(value.as_str().ok_or_else(invalid)?.as_bytes())),
        ParamType::Bytes => Ok(keccak256(&value.as_bytes().ok_or_else(invalid)?)),
        ty if ty.is_compound() => Err(AbiError::FilterTypeNotSupported {
            ty: param.ty.clone(),
        }),
        ty => {
            // scalar slots are exactly one word
            let encoded = prepare(ty, value)?.encoded;
            let mut word = [0u8; WORD_SIZE];
            word.copy_from_slice(&encoded);
            Ok(H256::from_bytes(word))
        }
    }
}

/// Decode a log against `event`
pub fn decode_event_log<E>(event: &E, log: &Log) -> Result<DecodedLog>
where
    E: SignatureHash + ?Sized,
{
    let item = event.item();
    ensure_event(item)?;
    let signature = item.signature();
    let mut topics = log.topics.iter();

    if !item.anonymous {
        let expected = event.signature_hash();
        match topics.next() {
            Some(topic) if *topic == expected => {}
            actual => {
                tracing::debug!(event = %signature, "topic 0 is not the event signature hash");
                return Err(AbiError::SelectorTopicMismatch {
                    event: signature,
                    expected: expected.to_hex(),
                    actual: actual.map_or_else(|| "none".to_string(), H256::to_hex),
                });
            }
        }
    }

    let mut slots: Vec<Option<Value>> = vec![None; item.inputs.len()];
    let mut data_params = Vec::new();
    let mut data_slots = Vec::new();

    for (i, param) in item.inputs.iter().enumerate() {
        if !param.indexed {
            data_params.push(param.clone());
            data_slots.push(i);
            continue;
        }
        let topic = topics.next().ok_or_else(|| AbiError::TopicsMismatch {
            event: signature.clone(),
            parameter: param.name().map_or_else(|| i.to_string(), str::to_string),
        })?;
        let ty = ParamType::from_param(param)?;
        let value = if ty.is_dynamic() || ty.is_compound() {
            // only the hash of the value was logged
            Value::Bytes(topic.as_bytes().to_vec())
        } else {
            decode_types(std::slice::from_ref(&ty), topic.as_bytes())?
                .pop()
                .ok_or_else(|| AbiError::TopicsMismatch {
                    event: signature.clone(),
                    parameter: i.to_string(),
                })?
        };
        tracing::trace!(event = %signature, index = i, "decoded indexed parameter");
        slots[i] = Some(value);
    }

    if !data_params.is_empty() {
        let types = data_params
            .iter()
            .map(ParamType::from_param)
            .collect::<Result<Vec<_>>>()?;
        let required: usize = types.iter().map(ParamType::head_size).sum();
        let mismatch = || AbiError::DataMismatch {
            event: signature.clone(),
            parameters: format_params(&data_params),
            size: log.data.len(),
        };
        if log.data.len() < required {
            return Err(mismatch());
        }
        let values = decode_types(&types, &log.data).map_err(|e| match e {
            AbiError::DataTooShort { .. } => mismatch(),
            other => other,
        })?;
        for (slot, value) in data_slots.into_iter().zip(values) {
            slots[slot] = Some(value);
        }
    }

    let values: Vec<Value> = slots.into_iter().flatten().collect();
    let args = if item.inputs.iter().all(|p| p.name().is_none()) {
        Decoded::Positional(values)
    } else {
        Decoded::Named(crate::decode::key_by_name(&item.inputs, values))
    };
    Ok(DecodedLog {
        event: item.name().unwrap_or_default().to_string(),
        args,
    })
}

/// Decode a log by locating its event in `abi` through topic 0
pub fn decode_log(abi: &[AbiItem], log: &Log) -> Result<DecodedLog> {
    let topic = log.topics.first().ok_or(AbiError::MissingSignatureTopic {
        size: log.data.len(),
    })?;
    let event = crate::resolve::extract(abi, &bytes::to_hex(topic.as_bytes()), None)?;
    decode_event_log(&event, log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bach_primitives::{Address, U256};

    fn transfer() -> AbiItem {
        AbiItem::event(
            "Transfer",
            vec![
                Parameter::named("address", "from").indexed(),
                Parameter::named("address", "to").indexed(),
                Parameter::named("uint256", "value"),
            ],
        )
    }

    fn addr(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last;
        Address::from_bytes(bytes)
    }

    #[test]
    fn test_decode_transfer() {
        let event = transfer();
        let log = Log {
            topics: vec![
                event.signature_hash(),
                H256::from_bytes(addr(1).to_word()),
                H256::from_bytes(addr(2).to_word()),
            ],
            data: bytes::usize_word(1).to_vec(),
        };
        let decoded = decode_event_log(&event, &log).unwrap();
        assert_eq!(decoded.event, "Transfer");
        assert_eq!(decoded.args.get("from"), Some(&Value::Address(addr(1))));
        assert_eq!(decoded.args.get("to"), Some(&Value::Address(addr(2))));
        assert_eq!(decoded.args.get("value"), Some(&Value::Uint(U256::one())));
    }

    #[test]
    fn test_decode_selector_mismatch() {
        let log = Log {
            topics: vec![H256::ZERO],
            data: vec![],
        };
        let err = decode_event_log(&transfer(), &log).unwrap_err();
        assert!(matches!(err, AbiError::SelectorTopicMismatch { .. }));
    }

    #[test]
    fn test_decode_missing_topic() {
        let event = transfer();
        let log = Log {
            topics: vec![event.signature_hash(), H256::ZERO],
            data: bytes::usize_word(1).to_vec(),
        };
        let err = decode_event_log(&event, &log).unwrap_err();
        assert!(matches!(err, AbiError::TopicsMismatch { ref parameter, .. } if parameter == "to"));
    }

    #[test]
    fn test_decode_data_mismatch() {
        let event = transfer();
        let log = Log {
            topics: vec![event.signature_hash(), H256::ZERO, H256::ZERO],
            data: vec![],
        };
        let err = decode_event_log(&event, &log).unwrap_err();
        match err {
            AbiError::DataMismatch {
                parameters, size, ..
            } => {
                assert_eq!(parameters, "uint256 value");
                assert_eq!(size, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_unnamed_positional() {
        let event = AbiItem::event(
            "Ping",
            vec![Parameter::new("uint8").indexed(), Parameter::new("bool")],
        );
        let log = Log {
            topics: vec![event.signature_hash(), H256::from_bytes(bytes::usize_word(7))],
            data: bytes::usize_word(1).to_vec(),
        };
        let decoded = decode_event_log(&event, &log).unwrap();
        assert_eq!(
            decoded.args,
            Decoded::Positional(vec![Value::Uint(U256::from(7)), Value::Bool(true)])
        );
    }

    #[test]
    fn test_decode_dynamic_indexed_is_hash() {
        let event = AbiItem::event("Named", vec![Parameter::named("string", "label").indexed()]);
        let hash = keccak256(b"alice");
        let log = Log {
            topics: vec![event.signature_hash(), hash],
            data: vec![],
        };
        let decoded = decode_event_log(&event, &log).unwrap();
        assert_eq!(
            decoded.args.get("label"),
            Some(&Value::Bytes(hash.as_bytes().to_vec()))
        );
    }

    #[test]
    fn test_anonymous_event() {
        let event = AbiItem::event(
            "Anon",
            vec![Parameter::named("uint256", "id").indexed()],
        )
        .anonymous();
        let log = Log {
            topics: vec![H256::from_bytes(bytes::usize_word(5))],
            data: vec![],
        };
        let decoded = decode_event_log(&event, &log).unwrap();
        assert_eq!(decoded.args.get("id"), Some(&Value::Uint(U256::from(5))));

        let topics = encode_event_topics(&event, None).unwrap();
        assert_eq!(topics, vec![Topic::Any]);
    }

    #[test]
    fn test_encode_topics_or_filter() {
        let event = transfer();
        let args = EventArgs::Named(vec![(
            "from".into(),
            Value::Array(vec![Value::Address(addr(1)), Value::Address(addr(2))]),
        )]);
        let topics = encode_event_topics(&event, Some(&args)).unwrap();
        assert_eq!(topics.len(), 3);
        assert_eq!(topics[0], Topic::Exact(event.signature_hash()));
        assert_eq!(
            topics[1],
            Topic::OneOf(vec![
                H256::from_bytes(addr(1).to_word()),
                H256::from_bytes(addr(2).to_word()),
            ])
        );
        assert_eq!(topics[2], Topic::Any);
    }

    #[test]
    fn test_encode_topics_hashes_strings() {
        let event = AbiItem::event("Named", vec![Parameter::named("string", "label").indexed()]);
        let args = EventArgs::Positional(vec![Some(Value::from("alice"))]);
        let topics = encode_event_topics(&event, Some(&args)).unwrap();
        assert_eq!(topics[1], Topic::Exact(keccak256(b"alice")));
    }

    #[test]
    fn test_encode_topics_rejects_arrays() {
        let event = AbiItem::event("Batch", vec![Parameter::named("uint256[]", "ids").indexed()]);
        let args = EventArgs::Positional(vec![Some(Value::Uint(U256::one()))]);
        let err = encode_event_topics(&event, Some(&args)).unwrap_err();
        assert!(matches!(err, AbiError::FilterTypeNotSupported { ref ty } if ty == "uint256[]"));
    }

    #[test]
    fn test_non_event_rejected() {
        let item = AbiItem::function("foo", vec![], vec![]);
        assert!(matches!(
            encode_event_topics(&item, None),
            Err(AbiError::UnexpectedItemKind { .. })
        ));
    }

    #[test]
    fn test_decode_log_from_abi() {
        let abi = vec![AbiItem::function("transfer", vec![], vec![]), transfer()];
        let event = transfer();
        let log = Log {
            topics: vec![
                event.signature_hash(),
                H256::from_bytes(addr(1).to_word()),
                H256::from_bytes(addr(2).to_word()),
            ],
            data: bytes::usize_word(9).to_vec(),
        };
        let decoded = decode_log(&abi, &log).unwrap();
        assert_eq!(decoded.event, "Transfer");
        assert_eq!(decoded.args.get("value"), Some(&Value::Uint(U256::from(9))));
    }

    #[test]
    fn test_decode_log_without_topics() {
        let log = Log {
            topics: vec![],
            data: vec![0; 32],
        };
        let err = decode_log(&[transfer()], &log).unwrap_err();
        assert!(matches!(err, AbiError::MissingSignatureTopic { size: 32 }));
    }
}
