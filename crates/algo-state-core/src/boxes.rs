/// Decoded box storage entries
use crate::address::encode_address_bytes;
use crate::decoder::{decode_base64, decode_uint_be, str_or_hex};
use crate::error::{AddressError, DecodeError};
use crate::types::BoxResponse;
use serde::Serialize;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxEntry {
    #[serde(serialize_with = "hex_bytes")]
    pub name: Vec<u8>,
    #[serde(serialize_with = "hex_bytes")]
    pub value: Vec<u8>,
}

impl BoxEntry {
    pub fn from_response(response: &BoxResponse) -> Result<Self, DecodeError> {
        Ok(Self {
            name: decode_base64(&response.name, "box name")?,
            value: decode_base64(&response.value, "box value")?,
        })
    }

    /// Box name read as an account address (boxes keyed by account)
    pub fn name_as_address(&self) -> Result<String, AddressError> {
        encode_address_bytes(&self.name)
    }

    pub fn name_text(&self) -> String {
        str_or_hex(&self.name)
    }

    /// Slice of the box value
    pub fn bytes(&self, range: Range<usize>) -> Result<&[u8], DecodeError> {
        self.value
            .get(range.clone())
            .ok_or(DecodeError::OutOfRange {
                start: range.start,
                end: range.end,
                len: self.value.len(),
            })
    }

    /// Big-endian integer stored in a slice of the box value
    pub fn uint(&self, range: Range<usize>) -> Result<u64, DecodeError> {
        decode_uint_be(self.bytes(range)?)
    }
}

fn hex_bytes<T, S>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: serde::Serializer,
{
    serializer.serialize_str(&hex::encode(bytes.as_ref()))
}
