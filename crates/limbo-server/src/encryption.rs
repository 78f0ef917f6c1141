use rsa::pkcs8::EncodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use thiserror::Error;

const KEY_BITS: usize = 1024;
const VERIFY_TOKEN_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("failed to generate server key pair: {0}")]
    KeyGeneration(rsa::Error),
    #[error("failed to encode public key: {0}")]
    PublicKey(String),
    #[error("could not decrypt client response: {0}")]
    Decrypt(rsa::Error),
    #[error("verify token mismatch")]
    TokenMismatch,
    #[error("shared secret must be 16 bytes, got {0}")]
    BadSecretLength(usize),
}

/// The server's RSA key pair, generated once at startup.
pub struct ServerKeys {
    private: RsaPrivateKey,
    public_der: Vec<u8>,
}

impl ServerKeys {
    pub fn generate() -> Result<Self, EncryptionError> {
        let mut rng = rand::thread_rng();
        let private =
            RsaPrivateKey::new(&mut rng, KEY_BITS).map_err(EncryptionError::KeyGeneration)?;
        let public_der = RsaPublicKey::from(&private)
            .to_public_key_der()
            .map_err(|e| EncryptionError::PublicKey(e.to_string()))?
            .as_bytes()
            .to_vec();
        Ok(Self {
            private,
            public_der,
        })
    }

    /// X.509 SubjectPublicKeyInfo, as sent in Encryption Request.
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_der
    }

    /// Check the echoed verify token and recover the AES shared secret.
    pub fn decrypt_response(
        &self,
        encrypted_secret: &[u8],
        encrypted_token: &[u8],
        expected_token: &[u8],
    ) -> Result<[u8; 16], EncryptionError> {
        let token = self
            .private
            .decrypt(Pkcs1v15Encrypt, encrypted_token)
            .map_err(EncryptionError::Decrypt)?;
        if token != expected_token {
            return Err(EncryptionError::TokenMismatch);
        }
        let secret = self
            .private
            .decrypt(Pkcs1v15Encrypt, encrypted_secret)
            .map_err(EncryptionError::Decrypt)?;
        secret
            .as_slice()
            .try_into()
            .map_err(|_| EncryptionError::BadSecretLength(secret.len()))
    }

    #[cfg(test)]
    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey::from(&self.private)
    }
}

impl std::fmt::Debug for ServerKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerKeys").finish_non_exhaustive()
    }
}

pub fn verify_token() -> Vec<u8> {
    rand::random::<[u8; VERIFY_TOKEN_LEN]>().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_response_roundtrip() {
        let keys = ServerKeys::generate().unwrap();
        assert!(!keys.public_key_der().is_empty());

        let public = keys.public_key();
        let mut rng = rand::thread_rng();
        let secret = [9u8; 16];
        let token = verify_token();
        let enc_secret = public.encrypt(&mut rng, Pkcs1v15Encrypt, &secret).unwrap();
        let enc_token = public.encrypt(&mut rng, Pkcs1v15Encrypt, &token).unwrap();

        assert_eq!(
            keys.decrypt_response(&enc_secret, &enc_token, &token).unwrap(),
            secret
        );
        assert!(matches!(
            keys.decrypt_response(&enc_secret, &enc_token, &[0, 0, 0, 0]),
            Err(EncryptionError::TokenMismatch)
        ));
    }
}
