//! 250-bit identifiers derived from SHA-256 digests.

use std::fmt::Write as _;

use sha2::{Digest, Sha256};

/// Number of leading bits cleared so every identifier fits in 250 bits.
const TOP_BYTE_MASK: u8 = 0x03;

/// Fixed-width 250-bit identifier stored big-endian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Felt([u8; 32]);

impl Felt {
    /// Builds an identifier from big-endian bytes, clearing the top six bits.
    #[must_use]
    pub fn from_be_bytes(mut bytes: [u8; 32]) -> Self {
        if let Some(first) = bytes.first_mut() {
            *first &= TOP_BYTE_MASK;
        }
        Self(bytes)
    }

    /// SHA-256 of `input` truncated to 250 bits.
    #[must_use]
    pub fn truncated_digest(input: &[u8]) -> Self {
        let digest = Sha256::digest(input);
        let mut bytes = [0_u8; 32];
        bytes.copy_from_slice(digest.as_slice());
        Self::from_be_bytes(bytes)
    }

    /// Selector identifying an entry point by name.
    #[must_use]
    pub fn selector(name: &str) -> Self {
        Self::truncated_digest(name.as_bytes())
    }

    /// Big-endian bytes of the identifier.
    #[must_use]
    pub const fn to_be_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Lower-case hexadecimal with a `0x` prefix and no leading zeros.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut text = String::from("0x");
        let mut significant = self.0.iter().skip_while(|byte| **byte == 0);
        match significant.next() {
            None => text.push('0'),
            Some(first) => {
                let _ = write!(text, "{first:x}");
                for byte in significant {
                    let _ = write!(text, "{byte:02x}");
                }
            }
        }
        text
    }

    /// Base-ten rendering.
    #[must_use]
    pub fn to_decimal(&self) -> String {
        let mut value = self.0;
        let mut digits = Vec::new();
        while value.iter().any(|byte| *byte != 0) {
            let mut remainder = 0_u16;
            for byte in &mut value {
                let accumulator = (remainder << 8) | u16::from(*byte);
                *byte = u8::try_from(accumulator.div_euclid(10)).unwrap_or(u8::MAX);
                remainder = accumulator.rem_euclid(10);
            }
            digits.push(char::from(b'0' + u8::try_from(remainder).unwrap_or(0)));
        }
        if digits.is_empty() {
            return "0".to_owned();
        }
        digits.iter().rev().collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn small(value: u64) -> Felt {
        let mut bytes = [0_u8; 32];
        if let Some(tail) = bytes.get_mut(24..) {
            tail.copy_from_slice(&value.to_be_bytes());
        }
        Felt::from_be_bytes(bytes)
    }

    #[rstest]
    #[case(0, "0x0", "0")]
    #[case(255, "0xff", "255")]
    #[case(256, "0x100", "256")]
    #[case(1_000_000, "0xf4240", "1000000")]
    fn renders_small_values(#[case] value: u64, #[case] hex: &str, #[case] decimal: &str) {
        let felt = small(value);
        assert_eq!(felt.to_hex(), hex);
        assert_eq!(felt.to_decimal(), decimal);
    }

    #[rstest]
    fn masks_to_250_bits() {
        let felt = Felt::from_be_bytes([0xff; 32]);
        assert_eq!(felt.to_hex(), format!("0x3{}", "f".repeat(62)));
        assert_eq!(
            felt.to_decimal(),
            "1809251394333065553493296640760748560207343510400633813116524750123642650623"
        );
    }

    #[rstest]
    fn digest_is_deterministic_and_truncated() {
        let first = Felt::truncated_digest(b"artifact");
        let second = Felt::truncated_digest(b"artifact");
        assert_eq!(first, second);
        assert!(first.to_be_bytes()[0] <= TOP_BYTE_MASK);
        assert_ne!(first, Felt::truncated_digest(b"artefact"));
    }

    #[rstest]
    fn selectors_differ_by_name() {
        assert_ne!(Felt::selector("increase_balance"), Felt::selector("get_balance"));
    }
}
