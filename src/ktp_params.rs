// Constants for the key/text patterns: AES key sizes, block size and the
// hard-coded key/plaintext tables of each variant.

/// Plaintext block length (AES block).
pub const BLOCK_LEN: usize = 16;

pub const AES128_KEY_LEN: usize = 16;
pub const AES192_KEY_LEN: usize = 24;
pub const AES256_KEY_LEN: usize = 32;

pub const SUPPORTED_KEY_LENS: [usize; 3] = [AES128_KEY_LEN, AES192_KEY_LEN, AES256_KEY_LEN];

/// Key length used when no target is bound.
pub const DEFAULT_KEY_LEN: usize = AES128_KEY_LEN;

pub type Block = [u8; BLOCK_LEN];

pub const ZERO_BLOCK: Block = [0u8; BLOCK_LEN];

// ----------------------------------------------------------------------------
// Basic / DPA: FIPS-197 + SP 800-38A example keys
// ----------------------------------------------------------------------------

pub const BASIC_KEY_128: [u8; 16] = [
    0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c,
];

pub const BASIC_KEY_192: [u8; 24] = [
    0x8e, 0x73, 0xb0, 0xf7, 0xda, 0x0e, 0x64, 0x52, 0xc8, 0x10, 0xf3, 0x2b, 0x80, 0x90, 0x79, 0xe5,
    0x62, 0xf8, 0xea, 0xd2, 0x52, 0x2c, 0x6b, 0x7b,
];

pub const BASIC_KEY_256: [u8; 32] = [
    0x60, 0x3d, 0xeb, 0x10, 0x15, 0xca, 0x71, 0xbe, 0x2b, 0x73, 0xae, 0xf0, 0x85, 0x7d, 0x77, 0x81,
    0x1f, 0x35, 0x2c, 0x07, 0x3b, 0x61, 0x08, 0xd7, 0x2d, 0x98, 0x10, 0xa3, 0x09, 0x14, 0xdf, 0xf4,
];

pub const BASIC_TEXT: Block = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
];

// ----------------------------------------------------------------------------
// TVLA fixed-vs-random (Goodwin et al. 2011 test vectors)
// ----------------------------------------------------------------------------

pub const TVLA_KEY_128: [u8; 16] = [
    0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0,
];

pub const TVLA_KEY_192: [u8; 24] = [
    0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0,
    0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0x01,
];

pub const TVLA_KEY_256: [u8; 32] = [
    0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0,
    0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0x01, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0, 0x12,
];

pub const TVLA_FIXED_TEXT_128: Block = [
    0xda, 0x39, 0xa3, 0xee, 0x5e, 0x6b, 0x4b, 0x0d, 0x32, 0x55, 0xbf, 0xef, 0x95, 0x60, 0x18, 0x90,
];

pub const TVLA_FIXED_TEXT_192: Block = [
    0xda, 0x39, 0xa3, 0xee, 0x5e, 0x6b, 0x4b, 0x0d, 0x32, 0x55, 0xbf, 0xef, 0x95, 0x60, 0x18, 0x88,
];

pub const TVLA_FIXED_TEXT_256: Block = [
    0xda, 0x39, 0xa3, 0xee, 0x5e, 0x6b, 0x4b, 0x0d, 0x32, 0x55, 0xbf, 0xef, 0x95, 0x60, 0x18, 0x95,
];

/// Key for the random-group AES chain pt_{i+1} = AES(K_gen, pt_i).
pub const TVLA_GEN_KEY: [u8; 16] = [
    0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf1, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xe0, 0xf0,
];

// ----------------------------------------------------------------------------
// TVLA base3: every nibble in {0,1,2,4,5,6,8,9,a}
// ----------------------------------------------------------------------------

/// Hex digits that pack two ternary digits into one nibble.
pub const BASE3_ALPHABET: &[u8; 9] = b"01245689a";

/// Campaign key, truncated to the key length.
pub const BASE3_KEY: [u8; 32] = [
    0x00, 0x11, 0x22, 0x44, 0x55, 0x66, 0x88, 0x99, 0xaa, 0x01, 0x24, 0x56, 0x89, 0xa0, 0x12, 0x45,
    0x68, 0x9a, 0x00, 0x11, 0x22, 0x44, 0x55, 0x66, 0x88, 0x99, 0xaa, 0x01, 0x24, 0x56, 0x89, 0xa0,
];

pub const BASE3_INTERLEAVED_128: Block = [
    0x11, 0x01, 0x21, 0x08, 0x99, 0xa4, 0x55, 0x46, 0xaa, 0xa1, 0x00, 0x21, 0x45, 0x64, 0x45, 0x46,
];

pub const BASE3_INTERLEAVED_192: Block = [
    0x11, 0x01, 0x21, 0x08, 0x99, 0xa4, 0x55, 0x46, 0xaa, 0xa1, 0x00, 0x21, 0x45, 0x64, 0x45, 0x02,
];

pub const BASE3_INTERLEAVED_256: Block = [
    0x11, 0x01, 0x21, 0x08, 0x99, 0xa4, 0x55, 0x46, 0xaa, 0xa1, 0x00, 0x21, 0x45, 0x64, 0x45, 0x8a,
];

#[inline]
pub fn is_supported_key_len(len: usize) -> bool {
    SUPPORTED_KEY_LENS.contains(&len)
}
