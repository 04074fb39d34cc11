// Pure validation helpers shared by every pattern. They never panic and never
// mutate; callers decide whether a failure aborts the campaign or triggers a
// resample.

use crate::ktp_error::ValidationError;
use crate::ktp_params::{is_supported_key_len, BASE3_ALPHABET, BLOCK_LEN};

/// Key must be an AES key size and, when `expected` is given, exactly that long.
pub fn validate_key(key: &[u8], expected: Option<usize>) -> Result<(), ValidationError> {
    if !is_supported_key_len(key.len()) {
        return Err(ValidationError::KeyLength(key.len()));
    }
    if let Some(expected) = expected {
        if expected != key.len() {
            return Err(ValidationError::KeyTargetMismatch { expected, actual: key.len() });
        }
    }
    Ok(())
}

pub fn validate_text(text: &[u8]) -> Result<(), ValidationError> {
    if text.len() != BLOCK_LEN {
        return Err(ValidationError::TextLength(text.len()));
    }
    Ok(())
}

#[inline]
pub fn is_base3_hex_char(c: u8) -> bool {
    BASE3_ALPHABET.contains(&c)
}

fn check_base3_hex(bytes: &[u8]) -> Result<(), ValidationError> {
    let encoded = hex::encode(bytes);
    match encoded.bytes().position(|c| !is_base3_hex_char(c)) {
        Some(position) => Err(ValidationError::ForbiddenChar {
            ch: encoded.as_bytes()[position] as char,
            position,
        }),
        None => Ok(()),
    }
}

/// Plaintext must be one block whose lowercase hex uses only `01245689a`.
pub fn validate_base3_text(text: &[u8]) -> Result<(), ValidationError> {
    validate_text(text)?;
    check_base3_hex(text)
}

/// Unpack a base-3-safe byte string into ternary digits, most significant first.
/// Each nibble `n` carries the trit pair `(n >> 2, n & 3)`.
pub fn to_trits(bytes: &[u8]) -> Result<Vec<u8>, ValidationError> {
    check_base3_hex(bytes)?;

    let mut trits = Vec::with_capacity(bytes.len() * 4);
    for &b in bytes {
        for nibble in [b >> 4, b & 0x0f] {
            trits.push(nibble >> 2);
            trits.push(nibble & 0x03);
        }
    }
    Ok(trits)
}

/// Inverse of [`to_trits`]: four trits per byte.
pub fn from_trits(trits: &[u8]) -> Result<Vec<u8>, ValidationError> {
    if trits.len() % 4 != 0 {
        return Err(ValidationError::TritCount(trits.len()));
    }
    if let Some(position) = trits.iter().position(|&t| t > 2) {
        return Err(ValidationError::TritRange { digit: trits[position], position });
    }

    Ok(trits
        .chunks_exact(4)
        .map(|t| (t[0] << 6) | (t[1] << 4) | (t[2] << 2) | t[3])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ktp_params::{BASE3_INTERLEAVED_128, BASE3_KEY};

    #[test]
    fn key_lengths() {
        for len in [16usize, 24, 32] {
            assert!(validate_key(&vec![0u8; len], None).is_ok());
        }
        for len in [0usize, 1, 15, 17, 23, 31, 33, 64] {
            assert_eq!(validate_key(&vec![0u8; len], None), Err(ValidationError::KeyLength(len)));
        }
    }

    #[test]
    fn key_must_match_target() {
        assert_eq!(
            validate_key(&[0u8; 16], Some(24)),
            Err(ValidationError::KeyTargetMismatch { expected: 24, actual: 16 })
        );
        assert!(validate_key(&[0u8; 24], Some(24)).is_ok());
    }

    #[test]
    fn text_length() {
        assert!(validate_text(&[0u8; 16]).is_ok());
        assert_eq!(validate_text(&[0u8; 8]), Err(ValidationError::TextLength(8)));
    }

    #[test]
    fn base3_accepts_constants() {
        assert!(validate_base3_text(&BASE3_INTERLEAVED_128).is_ok());
        assert!(validate_base3_text(&BASE3_KEY[..16]).is_ok());
        assert!(validate_base3_text(&[0u8; 16]).is_ok());
    }

    #[test]
    fn base3_reports_first_forbidden_char() {
        let mut text = [0x11u8; 16];
        text[3] = 0x1b;
        assert_eq!(
            validate_base3_text(&text),
            Err(ValidationError::ForbiddenChar { ch: 'b', position: 7 })
        );

        text[3] = 0x31;
        assert_eq!(
            validate_base3_text(&text),
            Err(ValidationError::ForbiddenChar { ch: '3', position: 6 })
        );
    }

    #[test]
    fn trit_packing() {
        // 0x5a = nibbles 5, a = trits (1,1) (2,2)
        assert_eq!(to_trits(&[0x5a]).unwrap(), vec![1, 1, 2, 2]);
        assert_eq!(to_trits(&[0x02, 0x80]).unwrap(), vec![0, 0, 0, 2, 2, 0, 0, 0]);
        assert_eq!(from_trits(&[1, 1, 2, 2]).unwrap(), vec![0x5a]);

        let trits = to_trits(&BASE3_INTERLEAVED_128).unwrap();
        assert_eq!(trits.len(), 64);
        assert!(trits.iter().all(|&t| t <= 2));
        assert_eq!(from_trits(&trits).unwrap(), BASE3_INTERLEAVED_128.to_vec());
    }

    #[test]
    fn trit_errors() {
        assert_eq!(from_trits(&[0, 1, 2]), Err(ValidationError::TritCount(3)));
        assert_eq!(
            from_trits(&[0, 1, 3, 0]),
            Err(ValidationError::TritRange { digit: 3, position: 2 })
        );
        assert!(matches!(to_trits(&[0x0f]), Err(ValidationError::ForbiddenChar { ch: 'f', .. })));
    }
}
