use crate::frame::{CompressionSettings, FrameCodec, FrameError};
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;
use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// Manual AES-128-CFB8 cipher that supports streaming (byte-at-a-time).
/// The protocol keeps one cipher state per direction for the whole connection.
struct Cfb8Cipher {
    cipher: Aes128,
    iv: [u8; 16],
}

impl Cfb8Cipher {
    fn new(key: &[u8; 16], iv: &[u8; 16]) -> Self {
        let cipher = Aes128::new(key.into());
        Self { cipher, iv: *iv }
    }

    fn encrypt(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            let mut block = aes::Block::from(self.iv);
            self.cipher.encrypt_block(&mut block);
            *byte ^= block[0];
            // Shift IV left by 1, append ciphertext byte
            self.iv.copy_within(1.., 0);
            self.iv[15] = *byte;
        }
    }

    fn decrypt(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            let mut block = aes::Block::from(self.iv);
            self.cipher.encrypt_block(&mut block);
            let ciphertext = *byte;
            *byte ^= block[0];
            self.iv.copy_within(1.., 0);
            self.iv[15] = ciphertext;
        }
    }
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection closed by peer")]
    Closed,
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A framed protocol connection over any byte stream, with optional
/// compression and encryption.
pub struct Connection<S> {
    stream: S,
    read_buf: BytesMut,
    codec: FrameCodec,
    encryptor: Option<Cfb8Cipher>,
    decryptor: Option<Cfb8Cipher>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, codec: FrameCodec) -> Self {
        Self {
            stream,
            read_buf: BytesMut::with_capacity(4096),
            codec,
            encryptor: None,
            decryptor: None,
        }
    }

    /// Enable AES-CFB8 encryption with the given shared secret.
    /// Key and IV are both the shared secret.
    pub fn enable_encryption(&mut self, shared_secret: &[u8; 16]) {
        let mut decryptor = Cfb8Cipher::new(shared_secret, shared_secret);
        // Anything already buffered arrived after the switch.
        decryptor.decrypt(&mut self.read_buf);
        self.encryptor = Some(Cfb8Cipher::new(shared_secret, shared_secret));
        self.decryptor = Some(decryptor);
    }

    pub fn enable_compression(&mut self, settings: CompressionSettings) {
        self.codec.enable_compression(settings);
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryptor.is_some()
    }

    pub fn codec(&self) -> &FrameCodec {
        &self.codec
    }

    /// Read one frame payload (packet id + body).
    ///
    /// Cancel-safe: bytes are only moved into the buffer once a read
    /// completes, so this can sit in a `select!` next to timers.
    pub async fn read_frame(&mut self) -> Result<BytesMut, ConnectionError> {
        loop {
            if let Some((length, payload)) = self.codec.decode_frame(&mut self.read_buf)? {
                trace!("Read frame len={} payload={}", length, payload.len());
                return Ok(payload);
            }
            let mut tmp = [0u8; 4096];
            let n = self.stream.read(&mut tmp).await?;
            if n == 0 {
                self.codec.check_eof(&self.read_buf)?;
                return Err(ConnectionError::Closed);
            }
            let data = &mut tmp[..n];
            if let Some(ref mut decryptor) = self.decryptor {
                decryptor.decrypt(data);
            }
            self.read_buf.extend_from_slice(data);
        }
    }

    /// Frame and write one packet payload (packet id + body).
    pub async fn write_frame(&mut self, payload: &[u8]) -> Result<(), ConnectionError> {
        let mut frame = self.codec.encode_frame(payload)?;
        if let Some(ref mut encryptor) = self.encryptor {
            encryptor.encrypt(&mut frame);
        }
        self.stream.write_all(&frame).await?;
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<(), ConnectionError> {
        self.stream.flush().await?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), ConnectionError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[test]
    fn test_cfb8_streaming_matches_one_shot() {
        let key = [7u8; 16];
        let plain: Vec<u8> = (0..100u8).collect();

        let mut one_shot = plain.clone();
        Cfb8Cipher::new(&key, &key).encrypt(&mut one_shot);

        let mut streamed = plain.clone();
        let mut cipher = Cfb8Cipher::new(&key, &key);
        let (a, b) = streamed.split_at_mut(37);
        cipher.encrypt(a);
        cipher.encrypt(b);
        assert_eq!(streamed, one_shot);
        assert_ne!(one_shot, plain);

        let mut decrypted = one_shot;
        Cfb8Cipher::new(&key, &key).decrypt(&mut decrypted);
        assert_eq!(decrypted, plain);
    }

    #[tokio::test]
    async fn test_frames_over_duplex() {
        let (client, server) = duplex(1024);
        let mut client = Connection::new(client, FrameCodec::default());
        let mut server = Connection::new(server, FrameCodec::default());

        client.write_frame(&[0x00, 1, 2]).await.unwrap();
        client.write_frame(&[0x01]).await.unwrap();
        assert_eq!(server.read_frame().await.unwrap().to_vec(), vec![0x00, 1, 2]);
        assert_eq!(server.read_frame().await.unwrap().to_vec(), vec![0x01]);
    }

    #[tokio::test]
    async fn test_encrypted_compressed_frames() {
        let (client, server) = duplex(64 * 1024);
        let mut client = Connection::new(client, FrameCodec::default());
        let mut server = Connection::new(server, FrameCodec::default());
        let secret = [3u8; 16];
        let settings = CompressionSettings {
            threshold: 16,
            level: 6,
        };
        for conn in [&mut client, &mut server] {
            conn.enable_encryption(&secret);
            conn.enable_compression(settings);
        }

        let big = vec![5u8; 4000];
        server.write_frame(&big).await.unwrap();
        server.write_frame(&[0x02, 9]).await.unwrap();
        assert_eq!(client.read_frame().await.unwrap().to_vec(), big);
        assert_eq!(client.read_frame().await.unwrap().to_vec(), vec![0x02, 9]);
    }

    #[tokio::test]
    async fn test_peer_close_between_frames_and_mid_frame() {
        let (client, server) = duplex(1024);
        let mut server = Connection::new(server, FrameCodec::default());
        drop(client);
        assert!(matches!(server.read_frame().await, Err(ConnectionError::Closed)));

        let (mut client, server) = duplex(1024);
        let mut server = Connection::new(server, FrameCodec::default());
        client.write_all(&[5, 0, 1]).await.unwrap();
        drop(client);
        assert!(matches!(
            server.read_frame().await,
            Err(ConnectionError::Frame(FrameError::Truncated))
        ));
    }
}
