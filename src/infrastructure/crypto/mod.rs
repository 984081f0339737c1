use aes::Aes256;
use base64::Engine as _;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha512;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

pub const PBKDF2_ITERATIONS: u32 = 999;
const IV_LEN: usize = 16;
const SALT_LEN: usize = 256;
const KEY_LEN: usize = 32;
const OBJECT_PREFIX: &str = "data=";

/// JSON carried (base64 encoded) in the `encData` field.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    ciphertext: String,
    iv: String,
    salt: String,
    iterations: u32,
}

/// AES-256-CBC with a PBKDF2-SHA512 key derived per message from a random salt.
#[derive(Clone)]
pub struct PayloadCipher {
    secret: String,
}

impl PayloadCipher {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn derive_key(&self, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha512>(self.secret.as_bytes(), salt, iterations, &mut key);
        key
    }

    pub fn encrypt(&self, plaintext: &str) -> anyhow::Result<String> {
        let mut iv = [0u8; IV_LEN];
        let mut salt = [0u8; SALT_LEN];
        let mut rng = rand::thread_rng();
        rng.fill_bytes(&mut iv);
        rng.fill_bytes(&mut salt);

        let key = self.derive_key(&salt, PBKDF2_ITERATIONS);
        let ct = Aes256CbcEnc::new_from_slices(&key, &iv)
            .map_err(|e| anyhow::anyhow!("cipher init: {}", e))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        let b64 = base64::engine::general_purpose::STANDARD;
        let envelope = Envelope {
            ciphertext: b64.encode(ct),
            iv: hex::encode(iv),
            salt: hex::encode(salt),
            iterations: PBKDF2_ITERATIONS,
        };
        Ok(b64.encode(serde_json::to_vec(&envelope)?))
    }

    pub fn decrypt(&self, encoded: &str) -> anyhow::Result<String> {
        let b64 = base64::engine::general_purpose::STANDARD;
        let raw = b64
            .decode(encoded.trim())
            .map_err(|e| anyhow::anyhow!("b64 decode envelope: {}", e))?;
        let envelope: Envelope = serde_json::from_slice(&raw)?;
        // Only envelopes sealed at the fixed key cost are accepted.
        if envelope.iterations != PBKDF2_ITERATIONS {
            anyhow::bail!("unsupported iteration count {}", envelope.iterations);
        }
        let iv = hex::decode(&envelope.iv).map_err(|e| anyhow::anyhow!("hex iv: {}", e))?;
        let salt = hex::decode(&envelope.salt).map_err(|e| anyhow::anyhow!("hex salt: {}", e))?;
        let ct = b64
            .decode(&envelope.ciphertext)
            .map_err(|e| anyhow::anyhow!("b64 decode ct: {}", e))?;

        let key = self.derive_key(&salt, PBKDF2_ITERATIONS);
        let pt = Aes256CbcDec::new_from_slices(&key, &iv)
            .map_err(|e| anyhow::anyhow!("cipher init: {}", e))?
            .decrypt_padded_vec_mut::<Pkcs7>(&ct)
            .map_err(|_| anyhow::anyhow!("decrypt failed"))?;
        Ok(String::from_utf8(pt)?)
    }

    pub fn encrypt_object(&self, value: &serde_json::Value) -> anyhow::Result<String> {
        let json = serde_json::to_string(value)?;
        self.encrypt(&format!("{OBJECT_PREFIX}{json}"))
    }

    pub fn decrypt_to_object(&self, encoded: &str) -> anyhow::Result<serde_json::Value> {
        let text = self.decrypt(encoded)?;
        let json = text.strip_prefix(OBJECT_PREFIX).unwrap_or(&text);
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decrypts_what_it_encrypts() {
        let cipher = PayloadCipher::new("k3y");
        let enc = cipher.encrypt("hola mundo").unwrap();
        assert_ne!(enc, "hola mundo");
        assert_eq!(cipher.decrypt(&enc).unwrap(), "hola mundo");
    }

    #[test]
    fn envelope_shape() {
        let cipher = PayloadCipher::new("k3y");
        let enc = cipher.encrypt("x").unwrap();
        let raw = base64::engine::general_purpose::STANDARD
            .decode(enc)
            .unwrap();
        let env: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(env["iterations"], 999);
        assert_eq!(env["iv"].as_str().unwrap().len(), IV_LEN * 2);
        assert_eq!(env["salt"].as_str().unwrap().len(), SALT_LEN * 2);
    }

    #[test]
    fn every_message_gets_fresh_salt_and_iv() {
        let cipher = PayloadCipher::new("k3y");
        assert_ne!(cipher.encrypt("same").unwrap(), cipher.encrypt("same").unwrap());
    }

    #[test]
    fn wrong_key_fails() {
        let enc = PayloadCipher::new("right").encrypt("payload text").unwrap();
        let res = PayloadCipher::new("wrong").decrypt(&enc);
        assert!(res.is_err() || res.unwrap() != "payload text");
    }

    #[test]
    fn objects_carry_data_prefix() {
        let cipher = PayloadCipher::new("k3y");
        let value = json!({"email": "ana@example.com", "n": 3});
        let enc = cipher.encrypt_object(&value).unwrap();
        assert!(cipher.decrypt(&enc).unwrap().starts_with("data="));
        assert_eq!(cipher.decrypt_to_object(&enc).unwrap(), value);

        let bare = cipher.encrypt(r#"{"a":1}"#).unwrap();
        assert_eq!(cipher.decrypt_to_object(&bare).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn foreign_iteration_counts_are_refused() {
        let cipher = PayloadCipher::new("k3y");
        let b64 = base64::engine::general_purpose::STANDARD;
        let enc = cipher.encrypt("payload").unwrap();
        let mut env: serde_json::Value =
            serde_json::from_slice(&b64.decode(enc).unwrap()).unwrap();
        env["iterations"] = json!(3_000_000u32);
        let tampered = b64.encode(serde_json::to_vec(&env).unwrap());

        let started = std::time::Instant::now();
        let err = cipher.decrypt(&tampered).unwrap_err();
        assert!(err.to_string().contains("iteration"));
        assert!(started.elapsed() < std::time::Duration::from_secs(1));

        env["iterations"] = json!(u32::MAX);
        let tampered = b64.encode(serde_json::to_vec(&env).unwrap());
        assert!(cipher.decrypt(&tampered).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let cipher = PayloadCipher::new("k3y");
        assert!(cipher.decrypt("not base64 !!").is_err());
        assert!(cipher.decrypt_to_object("e30=").is_err());
    }
}
