/// Error types for state decoding, addresses, configuration and node access
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid base64 in {field}: {source}")]
    InvalidBase64 {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },
    #[error("unknown value tag: {0}")]
    UnknownTag(u64),
    #[error("state value has neither an `action` nor a `type` field")]
    MissingTag,
    #[error("tag {tag} requires a `{field}` field")]
    MissingValue { tag: u64, field: &'static str },
    #[error("malformed state document: {0}")]
    Malformed(String),
    #[error("integer wider than 64 bits ({0} significant bytes)")]
    IntegerOverflow(usize),
    #[error("range {start}..{end} is out of bounds for {len} bytes")]
    OutOfRange { start: usize, end: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must be 58 characters, got {0}")]
    InvalidLength(usize),
    #[error("invalid base32 character: {0:?}")]
    InvalidCharacter(char),
    #[error("address checksum mismatch")]
    ChecksumMismatch,
    #[error("public key must be 32 bytes, got {0}")]
    InvalidPublicKey(usize),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("node returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid response format: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Address(#[from] AddressError),
}
