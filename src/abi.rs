//! Minimal ABI codec for the contract surface the proposal scripts touch.
//!
//! Arguments are a tagged union ([`AbiValue`]) checked against the parsed
//! function signature before any calldata is produced, so an argument-count
//! or argument-type mistake fails at assembly time instead of at call time.
//!
//! Only the types the scripts actually use are supported: `address`,
//! `uint256` (and narrower uints, encoded identically), `bool`, and dynamic
//! arrays of the first two.

use alloy_primitives::{keccak256, Address, U256};
use thiserror::Error;

/// Errors raised while parsing signatures or encoding/decoding values.
#[derive(Debug, Error)]
pub enum AbiError {
    /// Signature is not of the form `name(type,type,...)`.
    #[error("Malformed function signature: {0}")]
    MalformedSignature(String),

    /// Unsupported Solidity type in a signature.
    #[error("Unsupported ABI type: {0}")]
    UnsupportedType(String),

    /// Argument count does not match the signature.
    #[error("Expected {expected} arguments, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    /// Argument type does not match the signature.
    #[error("Argument {index} should be {expected}, got {got}")]
    TypeMismatch {
        index: usize,
        expected: AbiType,
        got: AbiType,
    },

    /// Return data is too short for the expected shape.
    #[error("Return data too short: need {need} bytes, have {have}")]
    ShortData { need: usize, have: usize },

    /// Decoded string is not valid UTF-8.
    #[error("Returned string is not valid UTF-8")]
    InvalidUtf8,

    /// An offset or length word exceeds any plausible payload size.
    #[error("Return data offset or length out of range: {0}")]
    LengthOutOfRange(U256),
}

/// The subset of Solidity types used by the governance scripts.
///
/// `string`/`bytes` and their arrays exist for the governor's `propose`
/// signature; proposal actions themselves only use the first five.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiType {
    Address,
    Uint256,
    Bool,
    AddressArray,
    Uint256Array,
    String,
    Bytes,
    StringArray,
    BytesArray,
}

impl AbiType {
    /// Parse a single Solidity type token (e.g. `"address[]"`).
    pub fn parse(s: &str) -> Result<Self, AbiError> {
        match s {
            "address" => Ok(Self::Address),
            "bool" => Ok(Self::Bool),
            "string" => Ok(Self::String),
            "bytes" => Ok(Self::Bytes),
            "address[]" => Ok(Self::AddressArray),
            "uint256[]" => Ok(Self::Uint256Array),
            "string[]" => Ok(Self::StringArray),
            "bytes[]" => Ok(Self::BytesArray),
            // Narrower uints are right-padded to a full word anyway.
            t if is_uint_type(t) => Ok(Self::Uint256),
            t => Err(AbiError::UnsupportedType(t.to_string())),
        }
    }

    /// Whether encoded values of this type live in the tail section.
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Self::Address | Self::Uint256 | Self::Bool)
    }
}

/// `uint` or `uintN` with N a multiple of 8 in 8..=256.
fn is_uint_type(s: &str) -> bool {
    match s.strip_prefix("uint") {
        Some("") => true,
        Some(width) => matches!(width.parse::<u32>(), Ok(n) if n % 8 == 0 && (8..=256).contains(&n)),
        None => false,
    }
}

impl std::fmt::Display for AbiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Address => "address",
            Self::Uint256 => "uint256",
            Self::Bool => "bool",
            Self::AddressArray => "address[]",
            Self::Uint256Array => "uint256[]",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::StringArray => "string[]",
            Self::BytesArray => "bytes[]",
        };
        f.write_str(s)
    }
}

/// A typed contract-call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Uint(U256),
    Bool(bool),
    AddressArray(Vec<Address>),
    UintArray(Vec<U256>),
    Str(String),
    Bytes(Vec<u8>),
    StrArray(Vec<String>),
    BytesArray(Vec<Vec<u8>>),
}

impl AbiValue {
    /// The ABI type this value encodes as.
    pub fn abi_type(&self) -> AbiType {
        match self {
            Self::Address(_) => AbiType::Address,
            Self::Uint(_) => AbiType::Uint256,
            Self::Bool(_) => AbiType::Bool,
            Self::AddressArray(_) => AbiType::AddressArray,
            Self::UintArray(_) => AbiType::Uint256Array,
            Self::Str(_) => AbiType::String,
            Self::Bytes(_) => AbiType::Bytes,
            Self::StrArray(_) => AbiType::StringArray,
            Self::BytesArray(_) => AbiType::BytesArray,
        }
    }

    /// Human-readable rendering for proposal printouts.
    pub fn display(&self) -> String {
        match self {
            Self::Address(a) => format!("{a}"),
            Self::Uint(v) => v.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::AddressArray(items) => {
                let inner: Vec<String> = items.iter().map(|a| format!("{a}")).collect();
                format!("[{}]", inner.join(", "))
            }
            Self::UintArray(items) => {
                let inner: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                format!("[{}]", inner.join(", "))
            }
            Self::Str(s) => format!("{s:?}"),
            Self::Bytes(b) => format!("0x{}", hex::encode(b)),
            Self::StrArray(items) => format!("{items:?}"),
            Self::BytesArray(items) => {
                let inner: Vec<String> = items.iter().map(|b| format!("0x{}", hex::encode(b))).collect();
                format!("[{}]", inner.join(", "))
            }
        }
    }
}

/// A function signature parsed into its name and parameter types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub params: Vec<AbiType>,
    canonical: String,
}

impl Signature {
    /// Parse a canonical signature string like `transfer(address,uint256)`.
    pub fn parse(sig: &str) -> Result<Self, AbiError> {
        let open = sig
            .find('(')
            .ok_or_else(|| AbiError::MalformedSignature(sig.to_string()))?;
        if !sig.ends_with(')') || open == 0 {
            return Err(AbiError::MalformedSignature(sig.to_string()));
        }
        let name = &sig[..open];
        let inner = &sig[open + 1..sig.len() - 1];
        let params = if inner.is_empty() {
            Vec::new()
        } else {
            inner
                .split(',')
                .map(|t| AbiType::parse(t.trim()))
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(Self {
            name: name.to_string(),
            params,
            canonical: sig.to_string(),
        })
    }

    /// The canonical string form, as hashed for the selector.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// First 4 bytes of keccak256 of the canonical signature.
    pub fn selector(&self) -> [u8; 4] {
        function_selector(&self.canonical)
    }

    /// Check `args` against the parameter list.
    pub fn validate(&self, args: &[AbiValue]) -> Result<(), AbiError> {
        if args.len() != self.params.len() {
            return Err(AbiError::ArityMismatch {
                expected: self.params.len(),
                got: args.len(),
            });
        }
        for (index, (value, expected)) in args.iter().zip(&self.params).enumerate() {
            if value.abi_type() != *expected {
                return Err(AbiError::TypeMismatch {
                    index,
                    expected: *expected,
                    got: value.abi_type(),
                });
            }
        }
        Ok(())
    }
}

/// Compute the Solidity function selector (first 4 bytes of keccak256(signature)).
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

fn word_of_u256(v: U256) -> [u8; 32] {
    v.to_be_bytes::<32>()
}

fn word_of_address(addr: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..32].copy_from_slice(addr.as_slice());
    word
}

fn word_of_bool(b: bool) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[31] = b as u8;
    word
}

fn padded_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = word_of_u256(U256::from(data.len())).to_vec();
    out.extend_from_slice(data);
    let rem = data.len() % 32;
    if rem != 0 {
        out.extend(std::iter::repeat(0u8).take(32 - rem));
    }
    out
}

/// Encode the tail section of a dynamic value (everything after its offset).
fn encode_tail(value: &AbiValue) -> Vec<u8> {
    match value {
        AbiValue::Address(_) | AbiValue::Uint(_) | AbiValue::Bool(_) => Vec::new(),
        AbiValue::AddressArray(items) => {
            let mut out = word_of_u256(U256::from(items.len())).to_vec();
            for item in items {
                out.extend_from_slice(&word_of_address(*item));
            }
            out
        }
        AbiValue::UintArray(items) => {
            let mut out = word_of_u256(U256::from(items.len())).to_vec();
            for item in items {
                out.extend_from_slice(&word_of_u256(*item));
            }
            out
        }
        AbiValue::Str(s) => padded_bytes(s.as_bytes()),
        AbiValue::Bytes(b) => padded_bytes(b),
        // Arrays of dynamic elements: length word, then per-element offsets
        // relative to the start of the element area, then element tails.
        AbiValue::StrArray(items) => {
            let tails: Vec<Vec<u8>> = items.iter().map(|s| padded_bytes(s.as_bytes())).collect();
            encode_dynamic_element_array(&tails)
        }
        AbiValue::BytesArray(items) => {
            let tails: Vec<Vec<u8>> = items.iter().map(|b| padded_bytes(b)).collect();
            encode_dynamic_element_array(&tails)
        }
    }
}

fn encode_dynamic_element_array(tails: &[Vec<u8>]) -> Vec<u8> {
    let mut out = word_of_u256(U256::from(tails.len())).to_vec();
    let mut offset = tails.len() * 32;
    for tail in tails {
        out.extend_from_slice(&word_of_u256(U256::from(offset)));
        offset += tail.len();
    }
    for tail in tails {
        out.extend_from_slice(tail);
    }
    out
}

/// Encode a validated argument list with standard head/tail layout.
pub fn encode_args(args: &[AbiValue]) -> Vec<u8> {
    let head_len = args.len() * 32;
    let mut head = Vec::with_capacity(head_len);
    let mut tail: Vec<u8> = Vec::new();

    for value in args {
        match value {
            AbiValue::Address(a) => head.extend_from_slice(&word_of_address(*a)),
            AbiValue::Uint(v) => head.extend_from_slice(&word_of_u256(*v)),
            AbiValue::Bool(b) => head.extend_from_slice(&word_of_bool(*b)),
            dynamic => {
                let offset = U256::from(head_len + tail.len());
                head.extend_from_slice(&word_of_u256(offset));
                tail.extend_from_slice(&encode_tail(dynamic));
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Encode a full call: selector plus encoded arguments, validated first.
pub fn encode_call(signature: &Signature, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    signature.validate(args)?;
    let mut out = Vec::with_capacity(4 + args.len() * 32);
    out.extend_from_slice(&signature.selector());
    out.extend_from_slice(&encode_args(args));
    Ok(out)
}

fn read_word(data: &[u8], offset: usize) -> Result<[u8; 32], AbiError> {
    let end = offset + 32;
    if data.len() < end {
        return Err(AbiError::ShortData {
            need: end,
            have: data.len(),
        });
    }
    let mut word = [0u8; 32];
    word.copy_from_slice(&data[offset..end]);
    Ok(word)
}

/// Decode a single `uint256` return value.
pub fn decode_u256(data: &[u8]) -> Result<U256, AbiError> {
    Ok(U256::from_be_bytes(read_word(data, 0)?))
}

/// Decode a single `address` return value (left-padded with zeros).
pub fn decode_address(data: &[u8]) -> Result<Address, AbiError> {
    let word = read_word(data, 0)?;
    Ok(Address::from_slice(&word[12..32]))
}

/// Decode a single `bool` return value.
pub fn decode_bool(data: &[u8]) -> Result<bool, AbiError> {
    Ok(read_word(data, 0)?[31] != 0)
}

fn decode_usize(data: &[u8], offset: usize) -> Result<usize, AbiError> {
    let v = U256::from_be_bytes(read_word(data, offset)?);
    // A garbled response can carry an arbitrary word here; anything past the
    // payload itself can never be a valid offset or length.
    if v > U256::from(data.len()) {
        return Err(AbiError::LengthOutOfRange(v));
    }
    Ok(v.to::<u64>() as usize)
}

fn decode_address_array_at(data: &[u8], offset: usize) -> Result<Vec<Address>, AbiError> {
    let len = decode_usize(data, offset)?;
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let word = read_word(data, offset + 32 + i * 32)?;
        out.push(Address::from_slice(&word[12..32]));
    }
    Ok(out)
}

fn decode_u256_array_at(data: &[u8], offset: usize) -> Result<Vec<U256>, AbiError> {
    let len = decode_usize(data, offset)?;
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        out.push(U256::from_be_bytes(read_word(data, offset + 32 + i * 32)?));
    }
    Ok(out)
}

/// Decode a single `address[]` return value.
pub fn decode_address_array(data: &[u8]) -> Result<Vec<Address>, AbiError> {
    let offset = decode_usize(data, 0)?;
    decode_address_array_at(data, offset)
}

/// Decode a single `uint256[]` return value.
pub fn decode_u256_array(data: &[u8]) -> Result<Vec<U256>, AbiError> {
    let offset = decode_usize(data, 0)?;
    decode_u256_array_at(data, offset)
}

/// Decode an `(address[], uint256[])` pair, the `getAPRs()` return shape.
pub fn decode_address_and_u256_arrays(
    data: &[u8],
) -> Result<(Vec<Address>, Vec<U256>), AbiError> {
    let first = decode_usize(data, 0)?;
    let second = decode_usize(data, 32)?;
    Ok((
        decode_address_array_at(data, first)?,
        decode_u256_array_at(data, second)?,
    ))
}

/// Decode a single `string` return value.
pub fn decode_string(data: &[u8]) -> Result<String, AbiError> {
    let offset = decode_usize(data, 0)?;
    let len = decode_usize(data, offset)?;
    let start = offset + 32;
    let end = start + len;
    if data.len() < end {
        return Err(AbiError::ShortData {
            need: end,
            have: data.len(),
        });
    }
    String::from_utf8(data[start..end].to_vec()).map_err(|_| AbiError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_selector_matches_known_values() {
        assert_eq!(function_selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(function_selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
        let sig = Signature::parse("transfer(address,uint256)").unwrap();
        assert_eq!(sig.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_signature_parsing() {
        let sig = Signature::parse("setAllAvailableTokensAndWrappers(address[],address[],address[],address[])")
            .unwrap();
        assert_eq!(sig.name, "setAllAvailableTokensAndWrappers");
        assert_eq!(sig.params, vec![AbiType::AddressArray; 4]);

        let sig = Signature::parse("apply_smart_wallet_checker()").unwrap();
        assert!(sig.params.is_empty());

        assert!(Signature::parse("no parens").is_err());
        assert!(Signature::parse("f(tuple)").is_err());
    }

    #[test]
    fn test_validation_rejects_wrong_shape() {
        let sig = Signature::parse("transfer(address,uint256)").unwrap();
        let addr = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");

        let err = sig.validate(&[AbiValue::Address(addr)]).unwrap_err();
        assert!(matches!(err, AbiError::ArityMismatch { expected: 2, got: 1 }));

        let err = sig
            .validate(&[AbiValue::Uint(U256::from(1)), AbiValue::Address(addr)])
            .unwrap_err();
        assert!(matches!(err, AbiError::TypeMismatch { index: 0, .. }));
    }

    #[test]
    fn test_encode_static_args() {
        let sig = Signature::parse("transfer(address,uint256)").unwrap();
        let to = address!("fb3bd022d5dacf95ee28a6b07825d4ff9c5b3814");
        let amount = U256::from(150_000u64) * U256::from(1_000_000u64);
        let data = encode_call(&sig, &[AbiValue::Address(to), AbiValue::Uint(amount)]).unwrap();

        assert_eq!(data.len(), 4 + 64);
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(&data[16..36], to.as_slice());
        assert_eq!(U256::from_be_slice(&data[36..68]), amount);
    }

    #[test]
    fn test_encode_dynamic_args_head_tail() {
        // claimIdle(address[] holders, address[] idleTokens)
        let sig = Signature::parse("claimIdle(address[],address[])").unwrap();
        let a = address!("fb3bd022d5dacf95ee28a6b07825d4ff9c5b3814");
        let b = address!("5274891bec421b39d23760c04a6755ecb444797c");
        let args = [
            AbiValue::AddressArray(vec![a]),
            AbiValue::AddressArray(vec![b, a]),
        ];
        let data = encode_call(&sig, &args).unwrap();
        let body = &data[4..];

        // head: two offsets, tail: [len 1, a] then [len 2, b, a]
        assert_eq!(U256::from_be_slice(&body[0..32]), U256::from(64));
        assert_eq!(U256::from_be_slice(&body[32..64]), U256::from(128));
        assert_eq!(U256::from_be_slice(&body[64..96]), U256::from(1));
        assert_eq!(&body[96 + 12..128], a.as_slice());
        assert_eq!(U256::from_be_slice(&body[128..160]), U256::from(2));
    }

    #[test]
    fn test_decode_round_shapes() {
        let addrs = vec![
            address!("875773784af8135ea0ef43b5a374aad105c5d39e"),
            address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
        ];
        let encoded = encode_args(&[AbiValue::AddressArray(addrs.clone())]);
        assert_eq!(decode_address_array(&encoded).unwrap(), addrs);

        let pair = encode_args(&[
            AbiValue::AddressArray(addrs.clone()),
            AbiValue::UintArray(vec![U256::from(7), U256::from(9)]),
        ]);
        let (tokens, aprs) = decode_address_and_u256_arrays(&pair).unwrap();
        assert_eq!(tokens, addrs);
        assert_eq!(aprs, vec![U256::from(7), U256::from(9)]);
    }

    #[test]
    fn test_encode_string_and_bytes_array() {
        let encoded = encode_args(&[AbiValue::Str("abc".into())]);
        assert_eq!(encoded.len(), 96);
        assert_eq!(U256::from_be_slice(&encoded[0..32]), U256::from(32));
        assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::from(3));
        assert_eq!(&encoded[64..67], b"abc");

        // bytes[] as used by the governor's propose calldata
        let encoded = encode_args(&[AbiValue::BytesArray(vec![vec![0x01], vec![0x02, 0x03]])]);
        assert_eq!(U256::from_be_slice(&encoded[0..32]), U256::from(32));
        assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::from(2));
        assert_eq!(U256::from_be_slice(&encoded[64..96]), U256::from(64));
        assert_eq!(U256::from_be_slice(&encoded[96..128]), U256::from(128));
        assert_eq!(U256::from_be_slice(&encoded[128..160]), U256::from(1));
        assert_eq!(encoded[160], 0x01);
        assert_eq!(U256::from_be_slice(&encoded[192..224]), U256::from(2));
    }

    #[test]
    fn test_decode_string() {
        // "IdleUSDC" encoded as a returned string
        let mut data = Vec::new();
        data.extend_from_slice(&U256::from(32).to_be_bytes::<32>());
        data.extend_from_slice(&U256::from(8).to_be_bytes::<32>());
        let mut text = [0u8; 32];
        text[..8].copy_from_slice(b"IdleUSDC");
        data.extend_from_slice(&text);
        assert_eq!(decode_string(&data).unwrap(), "IdleUSDC");
    }

    #[test]
    fn test_decode_short_data_errors() {
        assert!(matches!(decode_u256(&[0u8; 16]), Err(AbiError::ShortData { .. })));
    }

    #[test]
    fn test_parse_rejects_malformed_uint_widths() {
        for bad in ["uintx", "uint2x", "uint0", "uint12", "uint264", "uint1"] {
            assert!(
                matches!(AbiType::parse(bad), Err(AbiError::UnsupportedType(_))),
                "{bad} should not parse"
            );
        }
        assert_eq!(AbiType::parse("uint").unwrap(), AbiType::Uint256);
        assert_eq!(AbiType::parse("uint8").unwrap(), AbiType::Uint256);
        assert_eq!(AbiType::parse("uint256").unwrap(), AbiType::Uint256);
    }

    #[test]
    fn test_decode_rejects_oversized_offset_word() {
        // First word far beyond any payload: must error, not panic.
        let data = [0xffu8; 64];
        assert!(matches!(
            decode_address_array(&data),
            Err(AbiError::LengthOutOfRange(_))
        ));
        assert!(matches!(
            decode_string(&data),
            Err(AbiError::LengthOutOfRange(_))
        ));
    }
}
