use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use anyhow::{Context, Result};
use rand::RngCore;
use std::fs;
use std::path::Path;

const KEY_FILE: &str = "encryption.key";
const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;

/// AES-256-GCM sealing with a key kept beside the state it protects.
///
/// Sealed layout: 12-byte random nonce followed by the ciphertext.
pub struct Vault {
    cipher: Aes256Gcm,
}

impl Vault {
    /// Load `<state_dir>/encryption.key`, creating it (mode 0600) on first use.
    pub fn open(state_dir: &Path) -> Result<Self> {
        let key = load_or_create_key(state_dir)?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| anyhow::anyhow!("Failed to create cipher: {}", e))?;
        Ok(Self { cipher })
    }

    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut sealed = vec![0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut sealed);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&sealed), plaintext)
            .map_err(|e| anyhow::anyhow!("Encryption failed: {}", e))?;

        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    pub fn unseal(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < NONCE_SIZE {
            anyhow::bail!("Invalid sealed data: too short");
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| anyhow::anyhow!("Decryption failed: {}", e))
    }
}

fn load_or_create_key(state_dir: &Path) -> Result<Vec<u8>> {
    let key_path = state_dir.join(KEY_FILE);

    if key_path.exists() {
        let key = fs::read(&key_path).context("Failed to read encryption key")?;
        if key.len() != KEY_SIZE {
            anyhow::bail!("Invalid encryption key size");
        }
        return Ok(key);
    }

    let mut key = vec![0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut key);

    fs::create_dir_all(state_dir)
        .with_context(|| format!("Failed to create directory {:?}", state_dir))?;
    fs::write(&key_path, &key).context("Failed to write encryption key")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&key_path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(key)
}
