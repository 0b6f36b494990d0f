/// Algorand address encoding
///
/// An address is the unpadded RFC 4648 base32 form of a 32-byte public key
/// followed by the last 4 bytes of its SHA-512/256 digest.
use crate::error::AddressError;
use sha2::{Digest, Sha512_256};

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const PUBLIC_KEY_LEN: usize = 32;
const CHECKSUM_LEN: usize = 4;
const ADDRESS_LEN: usize = 58;
const APP_ID_PREFIX: &[u8] = b"appID";

/// Encode a public key as an address
pub fn encode_address(public_key: &[u8; PUBLIC_KEY_LEN]) -> String {
    let mut payload = Vec::with_capacity(PUBLIC_KEY_LEN + CHECKSUM_LEN);
    payload.extend_from_slice(public_key);
    payload.extend_from_slice(&checksum(public_key));
    base32_encode(&payload)
}

/// Encode an arbitrary byte slice that must hold a public key
pub fn encode_address_bytes(bytes: &[u8]) -> Result<String, AddressError> {
    let public_key: [u8; PUBLIC_KEY_LEN] = bytes
        .try_into()
        .map_err(|_| AddressError::InvalidPublicKey(bytes.len()))?;
    Ok(encode_address(&public_key))
}

/// Decode an address back to its public key, verifying the checksum
pub fn decode_address(address: &str) -> Result<[u8; PUBLIC_KEY_LEN], AddressError> {
    if address.len() != ADDRESS_LEN {
        return Err(AddressError::InvalidLength(address.len()));
    }
    let payload = base32_decode(address)?;

    let mut public_key = [0u8; PUBLIC_KEY_LEN];
    public_key.copy_from_slice(&payload[..PUBLIC_KEY_LEN]);
    if payload[PUBLIC_KEY_LEN..PUBLIC_KEY_LEN + CHECKSUM_LEN] != checksum(&public_key) {
        return Err(AddressError::ChecksumMismatch);
    }
    Ok(public_key)
}

/// Escrow account address of an application
pub fn application_address(app_id: u64) -> String {
    let mut hasher = Sha512_256::new();
    hasher.update(APP_ID_PREFIX);
    hasher.update(app_id.to_be_bytes());
    let mut public_key = [0u8; PUBLIC_KEY_LEN];
    public_key.copy_from_slice(&hasher.finalize());
    encode_address(&public_key)
}

fn checksum(public_key: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha512_256::digest(public_key);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    out
}

fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits = 0;

    for byte in data {
        buffer = (buffer << 8) | u32::from(*byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

fn base32_decode(text: &str) -> Result<Vec<u8>, AddressError> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0;

    for c in text.chars() {
        let index = ALPHABET
            .iter()
            .position(|a| *a as char == c)
            .ok_or(AddressError::InvalidCharacter(c))?;
        buffer = (buffer << 5) | index as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }
    Ok(out)
}
