//! Trusting a proxy's view of who the player is.

use bytes::BytesMut;
use hmac::{Hmac, Mac};
use limbo_protocol_core::{read_bool, read_string, read_uuid, read_varint, CodecError};
use limbo_types::ProfileProperty;
use sha2::Sha256;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;
use uuid::Uuid;

const BUNGEE_GUARD_PROPERTY: &str = "bungeeguard-token";

pub const VELOCITY_CHANNEL: &str = "velocity:player_info";
/// The plain forwarding format, without chat signing keys.
const VELOCITY_MODERN_DEFAULT: i32 = 1;
const VELOCITY_SIGNATURE_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum ForwardingError {
    #[error("handshake carries no forwarded player data")]
    Missing,
    #[error("malformed forwarded {field}")]
    Malformed { field: &'static str },
    #[error("proxy did not present a valid BungeeGuard token")]
    InvalidToken,
    #[error("forwarded player data has an invalid signature")]
    InvalidSignature,
    #[error("client version cannot carry forwarded player data")]
    Unsupported,
}

/// Identity vouched for by the proxy, used in place of the socket peer.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardedIdentity {
    pub address: SocketAddr,
    pub uuid: Uuid,
    /// Set when the proxy also vouches for the player's name.
    pub name: Option<String>,
    pub properties: Vec<ProfileProperty>,
}

/// Where a proxy put the player data.
#[derive(Debug, Clone, Copy)]
pub enum ForwardingData<'a> {
    /// The handshake's server address field.
    Handshake(&'a str),
    /// The payload of a login plugin response.
    QueryResponse(&'a [u8]),
}

/// A login plugin request to send after Login Start.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginQuery {
    pub channel: &'static str,
    pub data: Vec<u8>,
}

/// Turns what the proxy sent into a trusted identity during Login.
pub trait ForwardingHook: Send + Sync {
    /// The question to ask the proxy before the identity can be read, for
    /// schemes that do not ride on the handshake.
    fn login_query(&self) -> Option<LoginQuery> {
        None
    }

    fn forward(
        &self,
        data: ForwardingData<'_>,
        peer: SocketAddr,
    ) -> Result<ForwardedIdentity, ForwardingError>;
}

/// BungeeCord "ip forward": `host\0ip\0uuid[\0properties]` in the
/// handshake address.
#[derive(Debug, Default)]
pub struct LegacyForwarding;

impl ForwardingHook for LegacyForwarding {
    fn forward(
        &self,
        data: ForwardingData<'_>,
        peer: SocketAddr,
    ) -> Result<ForwardedIdentity, ForwardingError> {
        let ForwardingData::Handshake(handshake_address) = data else {
            return Err(ForwardingError::Missing);
        };
        let parts: Vec<&str> = handshake_address.split('\0').collect();
        if parts.len() < 3 {
            return Err(ForwardingError::Missing);
        }

        let ip: IpAddr = parts[1]
            .parse()
            .map_err(|_| ForwardingError::Malformed { field: "address" })?;
        let uuid = Uuid::parse_str(parts[2])
            .map_err(|_| ForwardingError::Malformed { field: "uuid" })?;
        let properties = match parts.get(3) {
            Some(json) if !json.is_empty() => serde_json::from_str(json)
                .map_err(|_| ForwardingError::Malformed { field: "properties" })?,
            _ => Vec::new(),
        };

        Ok(ForwardedIdentity {
            address: SocketAddr::new(ip, peer.port()),
            uuid,
            name: None,
            properties,
        })
    }
}

/// Legacy forwarding plus a shared secret smuggled in as a profile property.
#[derive(Debug)]
pub struct BungeeGuard {
    tokens: Vec<String>,
}

impl BungeeGuard {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }
}

impl ForwardingHook for BungeeGuard {
    fn forward(
        &self,
        data: ForwardingData<'_>,
        peer: SocketAddr,
    ) -> Result<ForwardedIdentity, ForwardingError> {
        let mut identity = LegacyForwarding.forward(data, peer)?;
        let mut token = None;
        identity.properties.retain(|p| {
            if p.name == BUNGEE_GUARD_PROPERTY {
                token = Some(p.value.clone());
                false
            } else {
                true
            }
        });
        match token {
            Some(token) if self.tokens.contains(&token) => Ok(identity),
            _ => Err(ForwardingError::InvalidToken),
        }
    }
}

/// Velocity "modern" forwarding: the proxy answers a login plugin request
/// with player data signed by HMAC-SHA256 under a shared secret.
pub struct VelocityForwarding {
    secret: Vec<u8>,
}

impl VelocityForwarding {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn verify<'a>(&self, payload: &'a [u8]) -> Result<&'a [u8], ForwardingError> {
        if payload.len() < VELOCITY_SIGNATURE_LEN {
            return Err(ForwardingError::Malformed { field: "signature" });
        }
        let (signature, body) = payload.split_at(VELOCITY_SIGNATURE_LEN);
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| ForwardingError::InvalidSignature)?;
        mac.update(body);
        mac.verify_slice(signature)
            .map_err(|_| ForwardingError::InvalidSignature)?;
        Ok(body)
    }
}

impl std::fmt::Debug for VelocityForwarding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VelocityForwarding").finish_non_exhaustive()
    }
}

fn malformed(field: &'static str) -> impl Fn(CodecError) -> ForwardingError {
    move |_| ForwardingError::Malformed { field }
}

fn read_properties(buf: &mut BytesMut) -> Result<Vec<ProfileProperty>, CodecError> {
    let count = read_varint(buf)?;
    let mut properties = Vec::with_capacity(count.clamp(0, 16) as usize);
    for _ in 0..count {
        let name = read_string(buf, 32767)?;
        let value = read_string(buf, 32767)?;
        let signature = if read_bool(buf)? {
            Some(read_string(buf, 32767)?)
        } else {
            None
        };
        properties.push(ProfileProperty {
            name,
            value,
            signature,
        });
    }
    Ok(properties)
}

impl ForwardingHook for VelocityForwarding {
    fn login_query(&self) -> Option<LoginQuery> {
        Some(LoginQuery {
            channel: VELOCITY_CHANNEL,
            data: vec![VELOCITY_MODERN_DEFAULT as u8],
        })
    }

    fn forward(
        &self,
        data: ForwardingData<'_>,
        peer: SocketAddr,
    ) -> Result<ForwardedIdentity, ForwardingError> {
        let ForwardingData::QueryResponse(payload) = data else {
            return Err(ForwardingError::Missing);
        };
        let mut buf = BytesMut::from(self.verify(payload)?);

        let version = read_varint(&mut buf).map_err(malformed("version"))?;
        if version < VELOCITY_MODERN_DEFAULT {
            return Err(ForwardingError::Malformed { field: "version" });
        }
        let ip: IpAddr = read_string(&mut buf, 255)
            .map_err(malformed("address"))?
            .parse()
            .map_err(|_| ForwardingError::Malformed { field: "address" })?;
        let uuid = read_uuid(&mut buf).map_err(malformed("uuid"))?;
        let name = read_string(&mut buf, 16).map_err(malformed("name"))?;
        let properties = read_properties(&mut buf).map_err(malformed("properties"))?;

        Ok(ForwardedIdentity {
            address: SocketAddr::new(ip, peer.port()),
            uuid,
            name: Some(name),
            properties,
        })
    }
}
