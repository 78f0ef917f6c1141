use crate::codec::{peek_varint, varint_len, write_varint};
use bytes::{Buf, BytesMut};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read as _, Write as _};
use thiserror::Error;

/// Largest frame a vanilla client will send or accept (3-byte VarInt).
pub const DEFAULT_MAX_FRAME_LEN: usize = (1 << 21) - 1;

/// Errors at the framing layer. All of them leave the byte stream in an
/// unknown position, so the connection cannot continue.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame of {size} bytes exceeds the {max} byte ceiling")]
    FrameTooLarge { size: usize, max: usize },
    #[error("stream ended in the middle of a frame")]
    Truncated,
    #[error("malformed length prefix")]
    BadVarint,
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),
    #[error("compression failed: {0}")]
    CompressionFailed(std::io::Error),
}

/// Negotiated compression parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSettings {
    /// Payloads at least this long are compressed.
    pub threshold: usize,
    /// zlib level, 0-9.
    pub level: u32,
}

/// Splits a byte stream into length-prefixed frames and back.
///
/// Before compression is negotiated a frame is `VarInt(len) ++ payload`.
/// Afterwards it is `VarInt(len) ++ VarInt(data_len) ++ body`, where a
/// `data_len` of 0 means the body is the raw payload and anything else is the
/// size of the zlib-inflated body.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    compression: Option<CompressionSettings>,
    max_frame_len: usize,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}

impl FrameCodec {
    pub fn new(max_frame_len: usize) -> Self {
        Self {
            compression: None,
            max_frame_len,
        }
    }

    pub fn enable_compression(&mut self, settings: CompressionSettings) {
        self.compression = Some(settings);
    }

    pub fn compression(&self) -> Option<CompressionSettings> {
        self.compression
    }

    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }

    /// Take one complete frame off the front of `buf`.
    ///
    /// Returns `Ok(None)` and leaves `buf` untouched when more bytes are
    /// needed. On success the frame's declared length and its (decompressed)
    /// payload are returned and the frame bytes are consumed.
    pub fn decode_frame(&self, buf: &mut BytesMut) -> Result<Option<(usize, BytesMut)>, FrameError> {
        let Some((length, prefix_len)) = peek_varint(buf).map_err(|_| FrameError::BadVarint)? else {
            return Ok(None);
        };
        if length < 0 {
            return Err(FrameError::BadVarint);
        }
        let length = length as usize;
        // Checked against the declared length, before anything is buffered for it.
        if length > self.max_frame_len {
            return Err(FrameError::FrameTooLarge {
                size: length,
                max: self.max_frame_len,
            });
        }
        if buf.len() < prefix_len + length {
            return Ok(None);
        }

        buf.advance(prefix_len);
        let mut frame = buf.split_to(length);

        if self.compression.is_none() {
            return Ok(Some((length, frame)));
        }

        let (data_len, data_len_size) = peek_varint(&frame)
            .map_err(|_| FrameError::BadVarint)?
            .ok_or(FrameError::Truncated)?;
        frame.advance(data_len_size);
        if data_len < 0 {
            return Err(FrameError::BadVarint);
        }
        if data_len == 0 {
            return Ok(Some((length, frame)));
        }

        let data_len = data_len as usize;
        if data_len > self.max_frame_len {
            return Err(FrameError::FrameTooLarge {
                size: data_len,
                max: self.max_frame_len,
            });
        }
        let mut inflated = Vec::with_capacity(data_len);
        ZlibDecoder::new(&frame[..])
            .take(data_len as u64 + 1)
            .read_to_end(&mut inflated)
            .map_err(|e| FrameError::DecompressionFailed(e.to_string()))?;
        if inflated.len() != data_len {
            return Err(FrameError::DecompressionFailed(format!(
                "declared {} bytes, inflated to {}",
                data_len,
                inflated.len()
            )));
        }
        Ok(Some((length, BytesMut::from(&inflated[..]))))
    }

    /// Wrap one packet payload (id + body) into a frame.
    pub fn encode_frame(&self, payload: &[u8]) -> Result<BytesMut, FrameError> {
        let mut body = BytesMut::with_capacity(payload.len() + 5);
        match self.compression {
            Some(settings) if payload.len() >= settings.threshold => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(settings.level));
                encoder
                    .write_all(payload)
                    .map_err(FrameError::CompressionFailed)?;
                let compressed = encoder.finish().map_err(FrameError::CompressionFailed)?;
                write_varint(&mut body, payload.len() as i32);
                body.extend_from_slice(&compressed);
            }
            Some(_) => {
                write_varint(&mut body, 0);
                body.extend_from_slice(payload);
            }
            None => body.extend_from_slice(payload),
        }

        if body.len() > self.max_frame_len {
            return Err(FrameError::FrameTooLarge {
                size: body.len(),
                max: self.max_frame_len,
            });
        }

        let mut frame = BytesMut::with_capacity(varint_len(body.len() as i32) + body.len());
        write_varint(&mut frame, body.len() as i32);
        frame.extend_from_slice(&body);
        Ok(frame)
    }

    /// Called when the peer closes the stream: leftover bytes mean a frame was cut short.
    pub fn check_eof(&self, buf: &BytesMut) -> Result<(), FrameError> {
        if buf.is_empty() {
            Ok(())
        } else {
            Err(FrameError::Truncated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compressed(threshold: usize) -> FrameCodec {
        let mut codec = FrameCodec::default();
        codec.enable_compression(CompressionSettings { threshold, level: 6 });
        codec
    }

    #[test]
    fn test_uncompressed_roundtrip() {
        let codec = FrameCodec::default();
        let mut stream = codec.encode_frame(&[0x00, 1, 2, 3]).unwrap();
        assert_eq!(stream[0], 4);
        let (length, payload) = codec.decode_frame(&mut stream).unwrap().unwrap();
        assert_eq!(length, 4);
        assert_eq!(payload.to_vec(), vec![0x00, 1, 2, 3]);
        assert!(stream.is_empty());
    }

    #[test]
    fn test_compression_threshold_boundaries() {
        let codec = compressed(64);
        for size in [1usize, 63, 64, 65, 5000] {
            let payload: Vec<u8> = (0..size).map(|i| (i % 7) as u8).collect();
            let mut stream = codec.encode_frame(&payload).unwrap();
            let (_, decoded) = codec.decode_frame(&mut stream).unwrap().unwrap();
            assert_eq!(decoded.to_vec(), payload, "size {}", size);
        }
    }

    #[test]
    fn test_below_threshold_is_marked_uncompressed() {
        let codec = compressed(64);
        let frame = codec.encode_frame(&[9, 9, 9]).unwrap();
        // length, data_len = 0, raw payload
        assert_eq!(frame.to_vec(), vec![4, 0, 9, 9, 9]);
    }

    #[test]
    fn test_partial_frame_waits_for_more() {
        let codec = FrameCodec::default();
        let full = codec.encode_frame(&[1, 2, 3, 4, 5]).unwrap();
        let mut partial = BytesMut::from(&full[..3]);
        assert!(codec.decode_frame(&mut partial).unwrap().is_none());
        assert_eq!(partial.len(), 3);
        partial.extend_from_slice(&full[3..]);
        assert!(codec.decode_frame(&mut partial).unwrap().is_some());
    }

    #[test]
    fn test_two_frames_in_one_read() {
        let codec = FrameCodec::default();
        let mut stream = codec.encode_frame(&[1]).unwrap();
        stream.extend_from_slice(&codec.encode_frame(&[2, 2]).unwrap());
        assert_eq!(codec.decode_frame(&mut stream).unwrap().unwrap().1.to_vec(), vec![1]);
        assert_eq!(codec.decode_frame(&mut stream).unwrap().unwrap().1.to_vec(), vec![2, 2]);
        assert!(codec.decode_frame(&mut stream).unwrap().is_none());
    }

    #[test]
    fn test_oversized_declaration_rejected_before_buffering() {
        let codec = FrameCodec::new(1024);
        let mut stream = BytesMut::new();
        write_varint(&mut stream, 1_000_000);
        // Only the prefix has arrived; the ceiling is enforced anyway.
        assert!(matches!(
            codec.decode_frame(&mut stream),
            Err(FrameError::FrameTooLarge { size: 1_000_000, max: 1024 })
        ));
    }

    #[test]
    fn test_overlong_length_prefix() {
        let codec = FrameCodec::default();
        let mut stream = BytesMut::from(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01][..]);
        assert!(matches!(codec.decode_frame(&mut stream), Err(FrameError::BadVarint)));
    }

    #[test]
    fn test_corrupt_zlib_body() {
        let codec = compressed(0);
        let mut stream = BytesMut::from(&[5, 10, 1, 2, 3, 4][..]);
        assert!(matches!(
            codec.decode_frame(&mut stream),
            Err(FrameError::DecompressionFailed(_))
        ));
    }

    #[test]
    fn test_declared_size_mismatch() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[7u8; 10]).unwrap();
        let deflated = encoder.finish().unwrap();

        let mut body = BytesMut::new();
        write_varint(&mut body, 20);
        body.extend_from_slice(&deflated);
        let mut stream = BytesMut::new();
        write_varint(&mut stream, body.len() as i32);
        stream.extend_from_slice(&body);

        assert!(matches!(
            compressed(0).decode_frame(&mut stream),
            Err(FrameError::DecompressionFailed(_))
        ));
    }

    #[test]
    fn test_eof_mid_frame_is_truncated() {
        let codec = FrameCodec::default();
        assert!(codec.check_eof(&BytesMut::new()).is_ok());
        assert!(matches!(
            codec.check_eof(&BytesMut::from(&[3, 0][..])),
            Err(FrameError::Truncated)
        ));
    }
}
