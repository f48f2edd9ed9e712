// SPDX-License-Identifier: MIT
//
// QKD Toolkit: BB84 Key Distribution Simulator
// Copyright (c) 2025 QKD Toolkit Contributors

//! Cryptographic utilities for key compression and rendering

use crate::{protocol::Bit, Error, Result, SHA256_BITS};
use sha2::{Digest, Sha256};

/// Compress a bit sequence to `target_length` bits through SHA-256
///
/// The bits are rendered as an ASCII string of '0'/'1' characters, hashed, and the digest
/// is read MSB-first as a 256-bit number. Requests longer than the digest yield 256 bits.
pub fn sha256_hash_bits(bits: &[Bit], target_length: usize) -> Vec<Bit> {
    let digest = Sha256::digest(bits_to_string(bits).as_bytes());
    bytes_to_bits(&digest)
        .into_iter()
        .take(target_length.min(SHA256_BITS))
        .collect()
}

/// Render bits as a string of '0'/'1' characters
pub fn bits_to_string(bits: &[Bit]) -> String {
    bits.iter()
        .map(|&bit| if bit & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// Parse a string of '0'/'1' characters back into bits
pub fn parse_bits(s: &str) -> Result<Vec<Bit>> {
    s.chars()
        .map(|c| match c {
            '0' => Ok(0),
            '1' => Ok(1),
            other => Err(Error::Validation(format!("Invalid key character '{}'", other))),
        })
        .collect()
}

/// Pack bits MSB-first into bytes, zero-padding the final byte
pub fn bits_to_bytes(bits: &[Bit]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | ((bit & 1) << (7 - i)))
        })
        .collect()
}

/// Expand bytes MSB-first into bits
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<Bit> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |i| (byte >> i) & 1))
        .collect()
}

/// Encode bytes to hexadecimal string
pub fn encode_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Encode bytes to base64 string
pub fn encode_base64(data: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_length() {
        let bits = vec![1, 0, 1, 1, 0, 0, 1];
        assert_eq!(sha256_hash_bits(&bits, 128).len(), 128);
        assert_eq!(sha256_hash_bits(&bits, 5).len(), 5);
        assert_eq!(sha256_hash_bits(&bits, 1000).len(), SHA256_BITS);
        assert!(sha256_hash_bits(&bits, 0).is_empty());
    }

    #[test]
    fn test_hash_matches_digest_of_bit_string() {
        // SHA-256("") = e3b0c442...
        let bits = sha256_hash_bits(&[], 16);
        assert_eq!(encode_hex(&bits_to_bytes(&bits)), "e3b0");

        let expected = Sha256::digest(b"01");
        let bits = sha256_hash_bits(&[0, 1], SHA256_BITS);
        assert_eq!(bits_to_bytes(&bits), expected.to_vec());
    }

    #[test]
    fn test_hash_is_deterministic_and_prefix_stable() {
        let bits = vec![0, 1, 1, 0, 1, 0, 0, 1, 1, 1];
        let long = sha256_hash_bits(&bits, 128);
        let short = sha256_hash_bits(&bits, 64);
        assert_eq!(long, sha256_hash_bits(&bits, 128));
        assert_eq!(&long[..64], short.as_slice());
        assert_ne!(long, sha256_hash_bits(&[1, 1, 1, 0, 1, 0, 0, 1, 1, 1], 128));
    }

    #[test]
    fn test_bit_packing() {
        assert_eq!(bits_to_bytes(&[1, 0, 0, 0, 0, 0, 0, 1]), vec![0x81]);
        assert_eq!(bits_to_bytes(&[1, 1]), vec![0xC0]);
        assert_eq!(bytes_to_bits(&[0xA5]), vec![1, 0, 1, 0, 0, 1, 0, 1]);
        assert!(bits_to_bytes(&[]).is_empty());
    }

    #[test]
    fn test_bit_strings() {
        assert_eq!(bits_to_string(&[1, 0, 1]), "101");
        assert_eq!(parse_bits("0110").unwrap(), vec![0, 1, 1, 0]);
        assert!(matches!(parse_bits("01a"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_hex_encoding() {
        assert_eq!(encode_hex(b"hello"), "68656c6c6f");
    }

    #[test]
    fn test_base64_encoding() {
        assert_eq!(encode_base64(&[0xC0]), "wA==");
    }
}
