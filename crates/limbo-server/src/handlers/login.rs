use super::{configuration, unexpected, Action, Awaiting, SessionData};
use crate::context::ServerContext;
use crate::encryption;
use crate::error::SessionError;
use crate::forwarding::{ForwardedIdentity, ForwardingData, ForwardingError};
use limbo_protocol_core::{ConnectionState, InternalPacket, ProtocolError};
use limbo_types::{GameProfile, TextComponent};
use tracing::{debug, info};

const MAX_NAME_LEN: usize = 16;

pub fn handle(
    ctx: &ServerContext,
    data: &mut SessionData,
    packet: InternalPacket,
) -> Result<Vec<Action>, SessionError> {
    match (packet, std::mem::take(&mut data.awaiting)) {
        (InternalPacket::LoginStart { name, uuid }, Awaiting::Nothing) if data.profile.is_none() => {
            info!("Login Start from: {} ({})", name, uuid);
            login_start(ctx, data, name)
        }
        (
            InternalPacket::LoginPluginResponse {
                message_id,
                data: payload,
            },
            Awaiting::ForwardingResponse {
                message_id: expected,
                name,
            },
        ) if message_id == expected => {
            let hook = ctx.forwarding.as_ref().ok_or(ProtocolError::UnexpectedPacket {
                state: ConnectionState::Login,
                packet: "LoginPluginResponse",
            })?;
            // A client without a proxy in front answers that it did not
            // understand the request.
            let payload = payload.ok_or(ForwardingError::Missing)?;
            let identity = hook.forward(ForwardingData::QueryResponse(&payload), data.peer)?;
            data.profile = Some(forwarded_profile(data, name, identity));
            request_encryption_or_finish(ctx, data)
        }
        (
            InternalPacket::EncryptionResponse {
                shared_secret,
                verify_token,
            },
            Awaiting::EncryptionResponse {
                verify_token: expected,
            },
        ) => {
            let keys = ctx
                .keys
                .as_ref()
                .ok_or(ProtocolError::UnexpectedPacket {
                    state: ConnectionState::Login,
                    packet: "EncryptionResponse",
                })?;
            let secret = keys.decrypt_response(&shared_secret, &verify_token, &expected)?;
            debug!("Encryption enabled for {}", data.display_name());
            let mut actions = vec![Action::EnableEncryption(secret)];
            actions.extend(finish_login(ctx, data)?);
            Ok(actions)
        }
        (InternalPacket::LoginAcknowledged, Awaiting::LoginAcknowledged) => {
            debug!("Login acknowledged by {}", data.display_name());
            let mut actions = vec![Action::Transition(ConnectionState::Configuration)];
            actions.extend(configuration::enter(ctx, data)?);
            Ok(actions)
        }
        (other, _) => Err(unexpected(ConnectionState::Login, other).into()),
    }
}

fn login_start(
    ctx: &ServerContext,
    data: &mut SessionData,
    name: String,
) -> Result<Vec<Action>, SessionError> {
    if name.is_empty()
        || name.chars().count() > MAX_NAME_LEN
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ProtocolError::Rejected(format!("Invalid player name {:?}", name)).into());
    }

    match ctx.try_join() {
        Some(slot) => data.slot = Some(slot),
        None => {
            info!("Refusing {}: server is full", name);
            return Ok(vec![Action::Disconnect(TextComponent::colored(
                "The server is full",
                "red",
            ))]);
        }
    }

    let Some(hook) = &ctx.forwarding else {
        data.profile = Some(GameProfile::offline(name));
        return request_encryption_or_finish(ctx, data);
    };

    match hook.login_query() {
        Some(query) => {
            if !ctx.protocol.features(data.version).login_plugin {
                return Err(ForwardingError::Unsupported.into());
            }
            let message_id = i32::from(rand::random::<u16>());
            debug!("Asking proxy about {} on {}", name, query.channel);
            data.awaiting = Awaiting::ForwardingResponse { message_id, name };
            Ok(vec![Action::Send(InternalPacket::LoginPluginRequest {
                message_id,
                channel: query.channel.to_string(),
                data: query.data,
            })])
        }
        None => {
            let address = ForwardingData::Handshake(&data.handshake_address);
            let identity = hook.forward(address, data.peer)?;
            data.profile = Some(forwarded_profile(data, name, identity));
            request_encryption_or_finish(ctx, data)
        }
    }
}

/// The profile the proxy vouched for. Its name wins over the client's.
fn forwarded_profile(
    data: &mut SessionData,
    name: String,
    identity: ForwardedIdentity,
) -> GameProfile {
    let name = identity.name.unwrap_or(name);
    debug!("{} forwarded as {} from {}", name, identity.uuid, identity.address);
    data.address = identity.address;
    GameProfile {
        uuid: identity.uuid,
        name,
        properties: identity.properties,
    }
}

/// Ask for an encryption response when encryption is on, otherwise finish.
fn request_encryption_or_finish(
    ctx: &ServerContext,
    data: &mut SessionData,
) -> Result<Vec<Action>, SessionError> {
    match &ctx.keys {
        Some(keys) => {
            let verify_token = encryption::verify_token();
            data.awaiting = Awaiting::EncryptionResponse {
                verify_token: verify_token.clone(),
            };
            Ok(vec![Action::Send(InternalPacket::EncryptionRequest {
                server_id: String::new(),
                public_key: keys.public_key_der().to_vec(),
                verify_token,
            })])
        }
        None => finish_login(ctx, data),
    }
}

/// Compression switch, Login Success, then either wait for the client's
/// acknowledgement or move straight on.
fn finish_login(ctx: &ServerContext, data: &mut SessionData) -> Result<Vec<Action>, SessionError> {
    let profile = data
        .profile
        .clone()
        .ok_or(ProtocolError::Rejected("login finished without a profile".into()))?;

    let mut actions = Vec::new();
    if let Some(compression) = ctx.settings.compression {
        actions.push(Action::Send(InternalPacket::SetCompression {
            threshold: compression.threshold as i32,
        }));
        actions.push(Action::EnableCompression(compression));
    }
    actions.push(Action::Send(InternalPacket::LoginSuccess { profile }));

    if ctx.protocol.features(data.version).configuration_state {
        data.awaiting = Awaiting::LoginAcknowledged;
    } else {
        actions.push(Action::Transition(ConnectionState::Configuration));
        actions.extend(configuration::enter(ctx, data)?);
    }
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::handlers::tests::{test_context, test_data};
    use crate::config::ForwardingMode;
    use bytes::BytesMut;
    use hmac::{Hmac, Mac};
    use limbo_protocol_core::{write_string, write_uuid, write_varint};
    use limbo_protocol_core::{CompressionSettings, ProtocolVersion};
    use sha2::Sha256;
    use uuid::Uuid;

    fn login_start(name: &str) -> InternalPacket {
        InternalPacket::LoginStart {
            name: name.into(),
            uuid: Uuid::nil(),
        }
    }

    fn sent(actions: &[Action]) -> Vec<&'static str> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::Send(p) => Some(p.name()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_modern_login_waits_for_ack() {
        let ctx = test_context();
        let mut data = test_data(ProtocolVersion::V1_21);
        let actions = handle(&ctx, &mut data, login_start("Steve")).unwrap();
        assert_eq!(sent(&actions), vec!["LoginSuccess"]);
        assert_eq!(data.awaiting, Awaiting::LoginAcknowledged);
        let profile = data.profile.clone().unwrap();
        assert_eq!(profile, GameProfile::offline("Steve"));

        let actions = handle(&ctx, &mut data, InternalPacket::LoginAcknowledged).unwrap();
        assert_eq!(actions[0], Action::Transition(ConnectionState::Configuration));
        assert_eq!(sent(&actions)[0], "ServerBrand");
    }

    #[test]
    fn test_legacy_login_goes_straight_to_play() {
        let ctx = test_context();
        let mut data = test_data(ProtocolVersion::V1_8);
        let actions = handle(&ctx, &mut data, login_start("Alex")).unwrap();
        let transitions: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                Action::Transition(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(
            transitions,
            vec![ConnectionState::Configuration, ConnectionState::Play]
        );
        assert_eq!(&sent(&actions)[..2], &["LoginSuccess", "JoinGame"]);
    }

    #[test]
    fn test_compression_precedes_success() {
        let mut settings = ServerConfig::default().into_settings().unwrap();
        settings.view_distance = 0;
        settings.compression = Some(CompressionSettings {
            threshold: 64,
            level: 6,
        });
        let ctx = ServerContext::new(settings).unwrap();
        let mut data = test_data(ProtocolVersion::V1_21);
        let actions = handle(&ctx, &mut data, login_start("Steve")).unwrap();
        assert_eq!(
            actions[0],
            Action::Send(InternalPacket::SetCompression { threshold: 64 })
        );
        assert!(matches!(actions[1], Action::EnableCompression(_)));
        assert!(matches!(actions[2], Action::Send(InternalPacket::LoginSuccess { .. })));
    }

    #[test]
    fn test_bad_names_rejected() {
        let ctx = test_context();
        for name in ["", "seventeen_letters", "bad name", "ümlaut"] {
            let mut data = test_data(ProtocolVersion::V1_21);
            assert!(
                matches!(
                    handle(&ctx, &mut data, login_start(name)),
                    Err(SessionError::Protocol(ProtocolError::Rejected(_)))
                ),
                "{:?} accepted",
                name
            );
        }
    }

    #[test]
    fn test_full_server_disconnects() {
        let mut settings = ServerConfig::default().into_settings().unwrap();
        settings.max_players = 1;
        settings.view_distance = 0;
        let ctx = ServerContext::new(settings).unwrap();

        let mut first = test_data(ProtocolVersion::V1_21);
        handle(&ctx, &mut first, login_start("Steve")).unwrap();
        assert!(first.slot.is_some());
        assert_eq!(ctx.online(), 1);

        // The slot is held from Login Start, before the player reaches Play.
        let mut second = test_data(ProtocolVersion::V1_21);
        let actions = handle(&ctx, &mut second, login_start("Alex")).unwrap();
        assert!(matches!(&actions[..], [Action::Disconnect(_)]));
        assert!(second.profile.is_none());
        assert!(second.slot.is_none());

        drop(first);
        assert_eq!(ctx.online(), 0);
        let mut third = test_data(ProtocolVersion::V1_21);
        handle(&ctx, &mut third, login_start("Alex")).unwrap();
        assert!(third.slot.is_some());
    }

    #[test]
    fn test_ack_without_login_is_unexpected() {
        let ctx = test_context();
        let mut data = test_data(ProtocolVersion::V1_21);
        assert!(matches!(
            handle(&ctx, &mut data, InternalPacket::LoginAcknowledged),
            Err(SessionError::Protocol(ProtocolError::UnexpectedPacket { .. }))
        ));
    }

    #[test]
    fn test_forwarded_identity_replaces_profile() {
        let mut settings = ServerConfig::default().into_settings().unwrap();
        settings.view_distance = 0;
        settings.forwarding_mode = ForwardingMode::Legacy;
        let ctx = ServerContext::new(settings).unwrap();
        let uuid = Uuid::new_v4();
        let mut data = test_data(ProtocolVersion::V1_21);
        data.handshake_address = format!("localhost\u{0}10.0.0.7\u{0}{}", uuid.simple());
        handle(&ctx, &mut data, login_start("Steve")).unwrap();
        assert_eq!(data.profile.as_ref().unwrap().uuid, uuid);
        assert_eq!(data.address.ip().to_string(), "10.0.0.7");

        let mut data = test_data(ProtocolVersion::V1_21);
        data.handshake_address = "localhost".into();
        assert!(matches!(
            handle(&ctx, &mut data, login_start("Steve")),
            Err(SessionError::Forwarding(_))
        ));
    }

    fn velocity_context(secret: &str) -> ServerContext {
        let mut settings = ServerConfig::default().into_settings().unwrap();
        settings.view_distance = 0;
        settings.forwarding_mode = ForwardingMode::Velocity;
        settings.forwarding_secret = secret.into();
        ServerContext::new(settings).unwrap()
    }

    fn signed_player_info(secret: &str, uuid: Uuid, name: &str) -> Vec<u8> {
        let mut body = BytesMut::new();
        write_varint(&mut body, 1);
        write_string(&mut body, "203.0.113.4");
        write_uuid(&mut body, &uuid);
        write_string(&mut body, name);
        write_varint(&mut body, 0);
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(&body);
        let mut payload = mac.finalize().into_bytes().to_vec();
        payload.extend_from_slice(&body);
        payload
    }

    fn plugin_request_id(actions: &[Action]) -> i32 {
        match actions {
            [Action::Send(InternalPacket::LoginPluginRequest {
                message_id,
                channel,
                data,
            })] => {
                assert_eq!(channel, "velocity:player_info");
                assert_eq!(data, &vec![1]);
                *message_id
            }
            other => panic!("expected a login plugin request, got {:?}", other),
        }
    }

    #[test]
    fn test_velocity_login_uses_signed_identity() {
        let ctx = velocity_context("s3cret");
        let mut data = test_data(ProtocolVersion::V1_21);
        let actions = handle(&ctx, &mut data, login_start("Steve")).unwrap();
        let message_id = plugin_request_id(&actions);
        assert!(data.profile.is_none());

        let uuid = Uuid::new_v4();
        let response = InternalPacket::LoginPluginResponse {
            message_id,
            data: Some(signed_player_info("s3cret", uuid, "Notch")),
        };
        let actions = handle(&ctx, &mut data, response).unwrap();
        assert_eq!(sent(&actions), vec!["LoginSuccess"]);
        let profile = data.profile.clone().unwrap();
        assert_eq!(profile.uuid, uuid);
        assert_eq!(profile.name, "Notch");
        assert_eq!(data.address.ip().to_string(), "203.0.113.4");
    }

    #[test]
    fn test_velocity_login_rejects_forgery() {
        let ctx = velocity_context("s3cret");
        let mut data = test_data(ProtocolVersion::V1_21);
        let message_id = plugin_request_id(&handle(&ctx, &mut data, login_start("Steve")).unwrap());
        let response = InternalPacket::LoginPluginResponse {
            message_id,
            data: Some(signed_player_info("guessed", Uuid::new_v4(), "Steve")),
        };
        assert!(matches!(
            handle(&ctx, &mut data, response),
            Err(SessionError::Forwarding(ForwardingError::InvalidSignature))
        ));
        assert!(data.profile.is_none());
    }

    #[test]
    fn test_velocity_login_without_proxy() {
        let ctx = velocity_context("s3cret");
        let mut data = test_data(ProtocolVersion::V1_21);
        let message_id = plugin_request_id(&handle(&ctx, &mut data, login_start("Steve")).unwrap());
        let response = InternalPacket::LoginPluginResponse {
            message_id,
            data: None,
        };
        assert!(matches!(
            handle(&ctx, &mut data, response),
            Err(SessionError::Forwarding(ForwardingError::Missing))
        ));

        let mut old = test_data(ProtocolVersion::V1_12_2);
        assert!(matches!(
            handle(&ctx, &mut old, login_start("Steve")),
            Err(SessionError::Forwarding(ForwardingError::Unsupported))
        ));
    }

    #[test]
    fn test_velocity_response_with_wrong_id_is_unexpected() {
        let ctx = velocity_context("s3cret");
        let mut data = test_data(ProtocolVersion::V1_21);
        let message_id = plugin_request_id(&handle(&ctx, &mut data, login_start("Steve")).unwrap());
        let response = InternalPacket::LoginPluginResponse {
            message_id: message_id.wrapping_add(1),
            data: Some(signed_player_info("s3cret", Uuid::new_v4(), "Steve")),
        };
        assert!(matches!(
            handle(&ctx, &mut data, response),
            Err(SessionError::Protocol(ProtocolError::UnexpectedPacket { .. }))
        ));
    }
}
