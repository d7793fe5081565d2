//! Single-key AES-256-GCM primitive with PBKDF2 key derivation.
//!
//! The AES key is PBKDF2-HMAC-SHA256(passphrase, salt = IV bytes) and the
//! GCM nonce is the IV bytes themselves. Nonces of 1 to [`MAX_IV_LEN`] bytes
//! are accepted: 96-bit nonces are used directly, anything else is GHASHed
//! into the initial counter block. Output is base64(ciphertext || tag).

use crate::error::{CryptoError, CryptoResult};
use aes_gcm::aead::consts;
use aes_gcm::aead::generic_array::{ArrayLength, GenericArray};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::Sha256;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 10_000;

/// AES-256 key size in bytes.
pub const KEY_SIZE: usize = 32;

/// GCM authentication tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// Longest IV (in bytes) accepted as a GCM nonce.
pub const MAX_IV_LEN: usize = 256;

#[derive(Zeroize, ZeroizeOnDrop)]
struct DerivedKey([u8; KEY_SIZE]);

#[derive(Clone, Copy)]
enum Direction {
    Seal,
    Open,
}

/// AES-256-GCM bound to one (passphrase, IV) pair.
pub struct Cipher {
    key: DerivedKey,
    iv: Vec<u8>,
}

impl Cipher {
    /// Derives the key for `passphrase` salted with `iv`.
    ///
    /// Fails with [`CryptoError::Configuration`] if either input is blank.
    pub fn new(passphrase: &str, iv: &str) -> CryptoResult<Self> {
        if passphrase.trim().is_empty() || iv.trim().is_empty() {
            return Err(CryptoError::Configuration(
                "passphrase and iv must both be set".to_string(),
            ));
        }
        if iv.len() > MAX_IV_LEN {
            return Err(CryptoError::InvalidIvLength {
                actual: iv.len(),
                max: MAX_IV_LEN,
            });
        }

        let mut key = DerivedKey([0u8; KEY_SIZE]);
        pbkdf2::pbkdf2_hmac::<Sha256>(
            passphrase.as_bytes(),
            iv.as_bytes(),
            PBKDF2_ITERATIONS,
            &mut key.0,
        );

        Ok(Self {
            key,
            iv: iv.as_bytes().to_vec(),
        })
    }

    /// Encrypts `plaintext` and returns base64(ciphertext || tag).
    pub fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        let sealed = self
            .apply(Direction::Seal, plaintext.as_bytes())
            .map_err(|e| CryptoError::Cipher(format!("error while encrypting text: {e}")))?;
        Ok(STANDARD.encode(sealed))
    }

    /// Decrypts a value produced by [`Cipher::encrypt`].
    pub fn decrypt(&self, encrypted: &str) -> CryptoResult<String> {
        let raw = STANDARD
            .decode(encrypted)
            .map_err(|e| CryptoError::Cipher(format!("ciphertext is not valid base64: {e}")))?;
        if raw.len() < TAG_SIZE {
            return Err(CryptoError::Cipher(format!(
                "ciphertext too short: {} bytes",
                raw.len()
            )));
        }

        let opened = self.apply(Direction::Open, &raw).map_err(|e| {
            CryptoError::Cipher(format!(
                "error while decrypting text (wrong key or tampered data): {e}"
            ))
        })?;
        String::from_utf8(opened)
            .map_err(|e| CryptoError::Cipher(format!("plaintext is not valid UTF-8: {e}")))
    }

    fn apply(&self, direction: Direction, data: &[u8]) -> Result<Vec<u8>, String> {
        macro_rules! by_nonce_len {
            ($key:expr, $iv:expr; $($len:literal => $size:ident),+ $(,)?) => {
                match $iv.len() {
                    $($len => run::<consts::$size>(direction, $key, $iv, data),)+
                    other => Err(format!("unsupported nonce length {other}")),
                }
            };
        }

        let key = &self.key.0;
        let iv = self.iv.as_slice();
        by_nonce_len!(key, iv;
            1 => U1, 2 => U2, 3 => U3, 4 => U4, 5 => U5, 6 => U6, 7 => U7, 8 => U8, 9 => U9,
            10 => U10, 11 => U11, 12 => U12, 13 => U13, 14 => U14, 15 => U15, 16 => U16,
            17 => U17, 18 => U18, 19 => U19, 20 => U20, 21 => U21, 22 => U22, 23 => U23,
            24 => U24, 25 => U25, 26 => U26, 27 => U27, 28 => U28, 29 => U29, 30 => U30,
            31 => U31, 32 => U32, 33 => U33, 34 => U34, 35 => U35, 36 => U36, 37 => U37,
            38 => U38, 39 => U39, 40 => U40, 41 => U41, 42 => U42, 43 => U43, 44 => U44,
            45 => U45, 46 => U46, 47 => U47, 48 => U48, 49 => U49, 50 => U50, 51 => U51,
            52 => U52, 53 => U53, 54 => U54, 55 => U55, 56 => U56, 57 => U57, 58 => U58,
            59 => U59, 60 => U60, 61 => U61, 62 => U62, 63 => U63, 64 => U64, 65 => U65,
            66 => U66, 67 => U67, 68 => U68, 69 => U69, 70 => U70, 71 => U71, 72 => U72,
            73 => U73, 74 => U74, 75 => U75, 76 => U76, 77 => U77, 78 => U78, 79 => U79,
            80 => U80, 81 => U81, 82 => U82, 83 => U83, 84 => U84, 85 => U85, 86 => U86,
            87 => U87, 88 => U88, 89 => U89, 90 => U90, 91 => U91, 92 => U92, 93 => U93,
            94 => U94, 95 => U95, 96 => U96, 97 => U97, 98 => U98, 99 => U99, 100 => U100,
            101 => U101, 102 => U102, 103 => U103, 104 => U104, 105 => U105, 106 => U106,
            107 => U107, 108 => U108, 109 => U109, 110 => U110, 111 => U111, 112 => U112,
            113 => U113, 114 => U114, 115 => U115, 116 => U116, 117 => U117, 118 => U118,
            119 => U119, 120 => U120, 121 => U121, 122 => U122, 123 => U123, 124 => U124,
            125 => U125, 126 => U126, 127 => U127, 128 => U128, 129 => U129, 130 => U130,
            131 => U131, 132 => U132, 133 => U133, 134 => U134, 135 => U135, 136 => U136,
            137 => U137, 138 => U138, 139 => U139, 140 => U140, 141 => U141, 142 => U142,
            143 => U143, 144 => U144, 145 => U145, 146 => U146, 147 => U147, 148 => U148,
            149 => U149, 150 => U150, 151 => U151, 152 => U152, 153 => U153, 154 => U154,
            155 => U155, 156 => U156, 157 => U157, 158 => U158, 159 => U159, 160 => U160,
            161 => U161, 162 => U162, 163 => U163, 164 => U164, 165 => U165, 166 => U166,
            167 => U167, 168 => U168, 169 => U169, 170 => U170, 171 => U171, 172 => U172,
            173 => U173, 174 => U174, 175 => U175, 176 => U176, 177 => U177, 178 => U178,
            179 => U179, 180 => U180, 181 => U181, 182 => U182, 183 => U183, 184 => U184,
            185 => U185, 186 => U186, 187 => U187, 188 => U188, 189 => U189, 190 => U190,
            191 => U191, 192 => U192, 193 => U193, 194 => U194, 195 => U195, 196 => U196,
            197 => U197, 198 => U198, 199 => U199, 200 => U200, 201 => U201, 202 => U202,
            203 => U203, 204 => U204, 205 => U205, 206 => U206, 207 => U207, 208 => U208,
            209 => U209, 210 => U210, 211 => U211, 212 => U212, 213 => U213, 214 => U214,
            215 => U215, 216 => U216, 217 => U217, 218 => U218, 219 => U219, 220 => U220,
            221 => U221, 222 => U222, 223 => U223, 224 => U224, 225 => U225, 226 => U226,
            227 => U227, 228 => U228, 229 => U229, 230 => U230, 231 => U231, 232 => U232,
            233 => U233, 234 => U234, 235 => U235, 236 => U236, 237 => U237, 238 => U238,
            239 => U239, 240 => U240, 241 => U241, 242 => U242, 243 => U243, 244 => U244,
            245 => U245, 246 => U246, 247 => U247, 248 => U248, 249 => U249, 250 => U250,
            251 => U251, 252 => U252, 253 => U253, 254 => U254, 255 => U255, 256 => U256,
        )
    }
}

fn run<N: ArrayLength<u8>>(
    direction: Direction,
    key: &[u8; KEY_SIZE],
    iv: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, String> {
    let cipher = AesGcm::<Aes256, N>::new_from_slice(key).map_err(|e| e.to_string())?;
    let nonce = GenericArray::<u8, N>::from_slice(iv);
    let result = match direction {
        Direction::Seal => cipher.encrypt(nonce, data),
        Direction::Open => cipher.decrypt(nonce, data),
    };
    result.map_err(|e| e.to_string())
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher")
            .field("iv_len", &self.iv.len())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_with_national_id_iv() {
        let cipher = Cipher::new("passord", "12345678910").unwrap();
        let encrypted = cipher.encrypt("hello").unwrap();
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), "hello");
    }

    #[test]
    fn output_is_ciphertext_plus_tag() {
        let cipher = Cipher::new("pw", "owner").unwrap();
        let encrypted = cipher.encrypt("abc").unwrap();
        let raw = STANDARD.decode(encrypted).unwrap();
        assert_eq!(raw.len(), 3 + TAG_SIZE);
    }

    #[test]
    fn twelve_byte_iv_uses_direct_nonce_path() {
        let cipher = Cipher::new("pw", "123456789012").unwrap();
        let encrypted = cipher.encrypt("twelve").unwrap();
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), "twelve");
    }

    #[test]
    fn max_length_iv_is_accepted() {
        let iv = "x".repeat(MAX_IV_LEN);
        let cipher = Cipher::new("pw", &iv).unwrap();
        let encrypted = cipher.encrypt("long nonce").unwrap();
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), "long nonce");
    }

    #[test]
    fn oversized_iv_is_rejected() {
        let iv = "x".repeat(MAX_IV_LEN + 1);
        let err = Cipher::new("pw", &iv).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidIvLength { actual: 257, max: 256 }));
    }

    #[test]
    fn matches_reference_output() {
        let cipher = Cipher::new("pw1", "12345678910").unwrap();
        assert_eq!(cipher.encrypt("hello").unwrap(), "1mjLQnvR0AM7xDFv4TxRjXFkMu+G");

        let cipher = Cipher::new("pw2", "123456789012").unwrap();
        assert_eq!(cipher.encrypt("twelve").unwrap(), "lThqOd44zlD9XSFiZbyx3miK61pfDQ==");
    }

    #[test]
    fn long_iv_matches_reference_output() {
        let iv = "x".repeat(100);
        let cipher = Cipher::new("pw1", &iv).unwrap();
        let encrypted = cipher.encrypt("hello").unwrap();
        assert_eq!(encrypted, "FtVeUX6RxRD11wFPvbimty2GOTI4");
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), "hello");
    }

    #[test]
    fn blank_inputs_are_configuration_errors() {
        assert!(matches!(
            Cipher::new("", "owner"),
            Err(CryptoError::Configuration(_))
        ));
        assert!(matches!(
            Cipher::new("pw", "   "),
            Err(CryptoError::Configuration(_))
        ));
    }

    #[test]
    fn debug_does_not_leak_key() {
        let cipher = Cipher::new("pw", "owner").unwrap();
        assert!(format!("{cipher:?}").contains("REDACTED"));
    }
}
