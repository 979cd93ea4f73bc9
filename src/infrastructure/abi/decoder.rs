//! Call decoder implementation using alloy-dyn-abi

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::U256;

use crate::domain::abi::{CallDecoder, DecodeError, DecodedArg, FunctionCall, FunctionSignature};

/// Call decoder implementation using alloy-dyn-abi
#[derive(Debug, Clone, Copy)]
pub struct AlloyCallDecoder {
    strict: bool,
}

impl AlloyCallDecoder {
    /// Strict decoder: argument bytes must be consumed exactly
    pub fn new() -> Self {
        Self { strict: true }
    }

    /// Decoder that tolerates trailing bytes after the encoded arguments
    ///
    /// The arguments themselves must still be canonically encoded.
    pub fn lenient() -> Self {
        Self { strict: false }
    }

    pub fn with_strict(strict: bool) -> Self {
        Self { strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

impl Default for AlloyCallDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CallDecoder for AlloyCallDecoder {
    fn decode_calldata(
        &self,
        function: &FunctionSignature,
        data: &[u8],
    ) -> Result<FunctionCall, DecodeError> {
        let Some((selector, args_data)) = data.split_first_chunk::<4>() else {
            return Err(DecodeError::ShortCalldata { len: data.len() });
        };

        if *selector != function.selector {
            return Err(DecodeError::SelectorMismatch {
                actual: *selector,
                expected: function.selector,
            });
        }

        let decoded_values = if function.inputs.is_empty() {
            Vec::new()
        } else {
            let decoded = function
                .params_type()
                .abi_decode_params(args_data)
                .map_err(|source| DecodeError::MalformedEncoding {
                    signature: function.signature.clone(),
                    source,
                })?;

            match decoded {
                DynSolValue::Tuple(values) => values,
                other => vec![other],
            }
        };

        check_width(&decoded_values).map_err(|reason| DecodeError::NonCanonical {
            signature: function.signature.clone(),
            reason,
        })?;

        let encoded = DynSolValue::Tuple(decoded_values.clone()).abi_encode_params();
        if encoded.len() > args_data.len() || (self.strict && encoded.len() != args_data.len()) {
            return Err(DecodeError::LengthMismatch {
                signature: function.signature.clone(),
                expected: encoded.len(),
                actual: args_data.len(),
            });
        }

        // The decoder reads addresses, booleans and offsets leniently; the
        // canonical encoding of what it produced must be the payload itself
        if let Some(offset) = encoded.iter().zip(args_data).position(|(a, b)| a != b) {
            return Err(DecodeError::NonCanonical {
                signature: function.signature.clone(),
                reason: format!("argument byte {offset} differs from its canonical encoding"),
            });
        }

        let arguments = function
            .param_names()
            .into_iter()
            .zip(&function.inputs)
            .zip(decoded_values)
            .map(|((name, param), value)| DecodedArg {
                name,
                kind: param.kind.clone(),
                value,
            })
            .collect();

        Ok(FunctionCall {
            selector: function.selector,
            function_name: function.name.clone(),
            signature: function.signature.clone(),
            arguments,
        })
    }
}

/// Reject integers that do not fit their declared width and fixed bytes
/// with data past their size. Re-encoding writes these words unchanged.
fn check_width(values: &[DynSolValue]) -> Result<(), String> {
    values.iter().try_for_each(|value| match value {
        DynSolValue::Uint(v, bits) if v.bit_len() > *bits => {
            Err(format!("{v} does not fit uint{bits}"))
        }
        DynSolValue::Int(v, bits) if *bits < 256 => {
            let raw = v.into_raw();
            let magnitude: U256 = if v.is_negative() { !raw } else { raw };
            if magnitude.bit_len() >= *bits {
                Err(format!("{v} does not fit int{bits}"))
            } else {
                Ok(())
            }
        }
        DynSolValue::FixedBytes(word, size)
            if word.as_slice()[(*size).min(32)..].iter().any(|b| *b != 0) =>
        {
            Err(format!("bytes{size} has data past its size"))
        }
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            check_width(items)
        }
        _ => Ok(()),
    })
}

/// Format a DynSolValue for display
pub fn format_dyn_sol_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => {
            let bytes = &word.as_slice()[..(*size).min(32)];
            format!("0x{}", hex::encode(bytes))
        }
        DynSolValue::Address(addr) => addr.to_checksum(None),
        DynSolValue::Function(func) => format!("0x{}", hex::encode(func.as_slice())),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::String(s) => format!("\"{}\"", s),
        DynSolValue::Array(arr) | DynSolValue::FixedArray(arr) => {
            let items: Vec<String> = arr.iter().map(format_dyn_sol_value).collect();
            format!("[{}]", items.join(", "))
        }
        DynSolValue::Tuple(fields) => {
            let items: Vec<String> = fields.iter().map(format_dyn_sol_value).collect();
            format!("({})", items.join(", "))
        }
        #[allow(unreachable_patterns)]
        _ => format!("{:?}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::{
        ContractInterface, DecodedCall, InterfaceRegistry, ParamSpec, RawTransaction,
        UnknownReason,
    };
    use alloy_primitives::{address, Address, Bytes, U256};

    const TOKEN: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

    // transfer(0x1234567890123456789012345678901234567890, 1000)
    const TRANSFER_CALLDATA: &str = "a9059cbb000000000000000000000000123456789012345678901234567890123456789000000000000000000000000000000000000000000000000000000000000003e8";

    fn make_transfer_function() -> FunctionSignature {
        FunctionSignature::new(
            "transfer",
            vec![
                ParamSpec::new("to", "address").unwrap(),
                ParamSpec::new("amount", "uint256").unwrap(),
            ],
        )
    }

    fn make_registry() -> InterfaceRegistry {
        let mut registry = InterfaceRegistry::new();
        registry.insert(
            TOKEN,
            ContractInterface::from_functions(
                Some("Token".to_string()),
                [
                    make_transfer_function(),
                    FunctionSignature::new(
                        "setGreeting",
                        vec![ParamSpec::new("_newGreeting", "string").unwrap()],
                    ),
                    FunctionSignature::new("withdraw", vec![]),
                ],
            ),
        );
        registry
    }

    #[test]
    fn test_decode_transfer() {
        let function = make_transfer_function();
        let calldata = hex::decode(TRANSFER_CALLDATA).unwrap();

        let result = AlloyCallDecoder::new()
            .decode_calldata(&function, &calldata)
            .unwrap();

        assert_eq!(result.function_name, "transfer");
        assert_eq!(result.arguments.len(), 2);
        assert_eq!(result.arguments[0].name, "to");
        assert_eq!(result.arguments[0].kind, "address");
        assert_eq!(
            result.arguments[0].value,
            DynSolValue::Address(address!("0x1234567890123456789012345678901234567890"))
        );
        assert_eq!(result.arguments[1].name, "amount");
        assert_eq!(
            result.arguments[1].value,
            DynSolValue::Uint(U256::from(1000), 256)
        );
    }

    #[test]
    fn test_selector_mismatch() {
        let function = make_transfer_function();
        let calldata = hex::decode("deadbeef").unwrap();

        let result = AlloyCallDecoder::new().decode_calldata(&function, &calldata);
        assert!(matches!(result, Err(DecodeError::SelectorMismatch { .. })));
        assert!(result.unwrap_err().to_string().contains("selector mismatch"));
    }

    #[test]
    fn test_empty_calldata_is_no_call() {
        let registry = make_registry();
        let decoder = AlloyCallDecoder::new();

        let tx = RawTransaction::new(Some(TOKEN), Vec::new());
        assert_eq!(decoder.decode(&tx, &registry).unwrap(), DecodedCall::NoCall);

        // Contract creation with no data, and unknown destination
        let tx = RawTransaction::new(None, Vec::new());
        assert_eq!(decoder.decode(&tx, &registry).unwrap(), DecodedCall::NoCall);
        let tx = RawTransaction::new(Some(Address::ZERO), Vec::new());
        assert_eq!(decoder.decode(&tx, &registry).unwrap(), DecodedCall::NoCall);
    }

    #[test]
    fn test_decode_via_registry() {
        let registry = make_registry();
        let tx = RawTransaction::new(Some(TOKEN), hex::decode(TRANSFER_CALLDATA).unwrap());

        let decoded = AlloyCallDecoder::new().decode(&tx, &registry).unwrap();
        let call = decoded.function().expect("transfer should match");
        assert_eq!(call.selector_hex(), "0xa9059cbb");
        assert_eq!(call.arg_names(), vec!["to", "amount"]);
    }

    #[test]
    fn test_unknown_destination() {
        let registry = make_registry();
        let tx = RawTransaction::new(
            Some(Address::repeat_byte(0x42)),
            hex::decode(TRANSFER_CALLDATA).unwrap(),
        );

        let decoded = AlloyCallDecoder::new().decode(&tx, &registry).unwrap();
        assert_eq!(
            decoded,
            DecodedCall::Unknown {
                selector: Bytes::from_static(&[0xa9, 0x05, 0x9c, 0xbb]),
                reason: UnknownReason::NoInterface,
            }
        );
    }

    #[test]
    fn test_contract_creation_is_unknown() {
        let registry = make_registry();
        let tx = RawTransaction::new(None, hex::decode("6080604052348015600e575f5ffd5b50").unwrap());

        let decoded = AlloyCallDecoder::new().decode(&tx, &registry).unwrap();
        assert_eq!(decoded.selector(), Some(&[0x60, 0x80, 0x60, 0x40][..]));
        assert!(decoded.is_unknown());
    }

    #[test]
    fn test_unknown_selector() {
        let registry = make_registry();
        let tx = RawTransaction::new(
            Some(TOKEN),
            hex::decode("deadbeef0000000000000000000000000000000000000000000000000000000000000001")
                .unwrap(),
        );

        let decoded = AlloyCallDecoder::new().decode(&tx, &registry).unwrap();
        assert_eq!(
            decoded,
            DecodedCall::Unknown {
                selector: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
                reason: UnknownReason::SelectorNotFound,
            }
        );
        assert!(decoded.function().is_none());
    }

    #[test]
    fn test_short_calldata() {
        let registry = make_registry();
        let tx = RawTransaction::new(Some(TOKEN), vec![0xa9, 0x05]);

        let result = AlloyCallDecoder::new().decode(&tx, &registry);
        assert!(matches!(result, Err(DecodeError::ShortCalldata { len: 2 })));
    }

    #[test]
    fn test_short_calldata_to_unknown_destination() {
        let registry = make_registry();
        let decoder = AlloyCallDecoder::new();

        for to in [Some(Address::repeat_byte(0x99)), None] {
            let tx = RawTransaction::new(to, vec![0x12, 0x34]);
            let decoded = decoder.decode(&tx, &registry).unwrap();
            assert_eq!(
                decoded,
                DecodedCall::Unknown {
                    selector: Bytes::from_static(&[0x12, 0x34]),
                    reason: UnknownReason::NoInterface,
                }
            );
            assert_eq!(decoded.selector(), Some(&[0x12, 0x34][..]));
        }
    }

    #[test]
    fn test_truncated_arguments() {
        let registry = make_registry();
        let mut calldata = hex::decode(TRANSFER_CALLDATA).unwrap();
        calldata.truncate(4 + 40);
        let tx = RawTransaction::new(Some(TOKEN), calldata);

        let result = AlloyCallDecoder::new().decode(&tx, &registry);
        assert!(matches!(result, Err(DecodeError::MalformedEncoding { .. })));
    }

    #[test]
    fn test_offset_out_of_bounds() {
        let registry = make_registry();
        // setGreeting(string) with the string offset pointing far past the buffer
        let calldata = hex::decode(concat!(
            "a4136862",
            "0000000000000000000000000000000000000000000000000000000000001000",
            "0000000000000000000000000000000000000000000000000000000000000002",
            "6869000000000000000000000000000000000000000000000000000000000000",
        ))
        .unwrap();
        let tx = RawTransaction::new(Some(TOKEN), calldata);

        let result = AlloyCallDecoder::new().decode(&tx, &registry);
        assert!(matches!(result, Err(DecodeError::MalformedEncoding { .. })));
    }

    #[test]
    fn test_decode_dynamic_string() {
        let registry = make_registry();
        let calldata = hex::decode(concat!(
            "a4136862",
            "0000000000000000000000000000000000000000000000000000000000000020",
            "0000000000000000000000000000000000000000000000000000000000000002",
            "6869000000000000000000000000000000000000000000000000000000000000",
        ))
        .unwrap();
        let tx = RawTransaction::new(Some(TOKEN), calldata);

        let decoded = AlloyCallDecoder::new().decode(&tx, &registry).unwrap();
        let call = decoded.function().unwrap();
        assert_eq!(call.function_name, "setGreeting");
        assert_eq!(call.arguments[0].name, "_newGreeting");
        assert_eq!(call.arguments[0].value, DynSolValue::String("hi".to_string()));
    }

    #[test]
    fn test_trailing_bytes_strict_and_lenient() {
        let registry = make_registry();
        let mut calldata = hex::decode(TRANSFER_CALLDATA).unwrap();
        calldata.extend_from_slice(&[0xca, 0xfe]);
        let tx = RawTransaction::new(Some(TOKEN), calldata);

        let strict = AlloyCallDecoder::new().decode(&tx, &registry);
        assert!(matches!(
            strict,
            Err(DecodeError::LengthMismatch {
                expected: 64,
                actual: 66,
                ..
            })
        ));

        let lenient = AlloyCallDecoder::lenient().decode(&tx, &registry).unwrap();
        assert_eq!(lenient.function().unwrap().function_name, "transfer");
    }

    fn make_mixed_function() -> FunctionSignature {
        FunctionSignature::new(
            "f",
            vec![
                ParamSpec::new("a", "address").unwrap(),
                ParamSpec::new("b", "bool").unwrap(),
                ParamSpec::new("c", "uint8").unwrap(),
            ],
        )
    }

    fn mixed_calldata(address_word: &str, bool_word: &str, uint8_word: &str) -> Vec<u8> {
        let mut calldata = make_mixed_function().selector.to_vec();
        for word in [address_word, bool_word, uint8_word] {
            calldata.extend(hex::decode(word).unwrap());
        }
        calldata
    }

    const ADDRESS_WORD: &str = "0000000000000000000000001111111111111111111111111111111111111111";
    const TRUE_WORD: &str = "0000000000000000000000000000000000000000000000000000000000000001";
    const SEVEN_WORD: &str = "0000000000000000000000000000000000000000000000000000000000000007";

    #[test]
    fn test_canonical_mixed_words_decode() {
        let calldata = mixed_calldata(ADDRESS_WORD, TRUE_WORD, SEVEN_WORD);

        let call = AlloyCallDecoder::new()
            .decode_calldata(&make_mixed_function(), &calldata)
            .unwrap();
        assert_eq!(call.arguments[1].value, DynSolValue::Bool(true));
        assert_eq!(call.arguments[2].value, DynSolValue::Uint(U256::from(7), 8));
    }

    #[test]
    fn test_dirty_address_padding_rejected() {
        let calldata = mixed_calldata(
            "0000000000000000000000ff1111111111111111111111111111111111111111",
            TRUE_WORD,
            SEVEN_WORD,
        );

        let result = AlloyCallDecoder::new().decode_calldata(&make_mixed_function(), &calldata);
        assert!(matches!(result, Err(DecodeError::NonCanonical { .. })));
    }

    #[test]
    fn test_bool_other_than_zero_or_one_rejected() {
        let calldata = mixed_calldata(
            ADDRESS_WORD,
            "0000000000000000000000000000000000000000000000000000000000000002",
            SEVEN_WORD,
        );

        let result = AlloyCallDecoder::new().decode_calldata(&make_mixed_function(), &calldata);
        assert!(matches!(result, Err(DecodeError::NonCanonical { .. })));
    }

    #[test]
    fn test_uint_wider_than_type_rejected() {
        let calldata = mixed_calldata(
            ADDRESS_WORD,
            TRUE_WORD,
            "00000000000000000000000000000000000000000000000000000000000001ff",
        );

        // Also rejected when trailing bytes are tolerated
        for decoder in [AlloyCallDecoder::new(), AlloyCallDecoder::lenient()] {
            let err = decoder
                .decode_calldata(&make_mixed_function(), &calldata)
                .unwrap_err();
            assert!(matches!(err, DecodeError::NonCanonical { .. }));
            assert!(err.to_string().contains("511 does not fit uint8"));
        }
    }

    #[test]
    fn test_int_outside_width_rejected() {
        let function = FunctionSignature::new("g", vec![ParamSpec::new("x", "int8").unwrap()]);
        let decoder = AlloyCallDecoder::new();

        let mut minus_one = function.selector.to_vec();
        minus_one.extend([0xff; 32]);
        let call = decoder.decode_calldata(&function, &minus_one).unwrap();
        match &call.arguments[0].value {
            DynSolValue::Int(value, 8) => assert_eq!(value.to_string(), "-1"),
            other => panic!("unexpected value {other:?}"),
        }

        // 0xff in the low byte only is 255, not -1
        let mut wide = function.selector.to_vec();
        wide.extend([0u8; 31]);
        wide.push(0xff);
        let result = decoder.decode_calldata(&function, &wide);
        assert!(matches!(result, Err(DecodeError::NonCanonical { .. })));
    }

    #[test]
    fn test_non_standard_offset_rejected() {
        let registry = make_registry();
        // setGreeting(string) with the tail moved one word further out
        let calldata = hex::decode(concat!(
            "a4136862",
            "0000000000000000000000000000000000000000000000000000000000000040",
            "0000000000000000000000000000000000000000000000000000000000000000",
            "0000000000000000000000000000000000000000000000000000000000000002",
            "6869000000000000000000000000000000000000000000000000000000000000",
        ))
        .unwrap();
        let tx = RawTransaction::new(Some(TOKEN), calldata);

        let result = AlloyCallDecoder::lenient().decode(&tx, &registry);
        assert!(matches!(result, Err(DecodeError::NonCanonical { .. })));
    }

    #[test]
    fn test_decode_no_params() {
        let registry = make_registry();
        // withdraw()
        let tx = RawTransaction::new(Some(TOKEN), hex::decode("3ccfd60b").unwrap());

        let decoded = AlloyCallDecoder::new().decode(&tx, &registry).unwrap();
        let call = decoded.function().unwrap();
        assert_eq!(call.signature, "withdraw()");
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn test_format_value() {
        let addr = Address::from([0x12; 20]);
        let formatted = format_dyn_sol_value(&DynSolValue::Address(addr));
        assert!(formatted.starts_with("0x"));
        assert_eq!(formatted.len(), 42);

        let value = DynSolValue::Uint(U256::from(1000000), 256);
        assert_eq!(format_dyn_sol_value(&value), "1000000");

        assert_eq!(format_dyn_sol_value(&DynSolValue::Bool(true)), "true");

        let value = DynSolValue::String("hello".to_string());
        assert_eq!(format_dyn_sol_value(&value), "\"hello\"");

        let value = DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(1), 8),
            DynSolValue::Array(vec![DynSolValue::Bool(false)]),
        ]);
        assert_eq!(format_dyn_sol_value(&value), "(1, [false])");

        let value = DynSolValue::Bytes(vec![0xab, 0xcd]);
        assert_eq!(format_dyn_sol_value(&value), "0xabcd");
    }
}
