use super::{unexpected, Action, SessionData};
use crate::context::ServerContext;
use crate::error::SessionError;
use limbo_protocol_core::{ConnectionState, InternalPacket, ProtocolError, ProtocolVersion};
use limbo_types::TextComponent;
use tracing::debug;

/// Handshake `next_state` of a client arriving through a Transfer packet.
const TRANSFER_INTENT: i32 = 3;

pub fn handle(
    ctx: &ServerContext,
    data: &mut SessionData,
    packet: InternalPacket,
) -> Result<Vec<Action>, SessionError> {
    let InternalPacket::Handshake {
        protocol_version,
        server_address,
        server_port,
        next_state,
    } = packet
    else {
        return Err(unexpected(ConnectionState::Handshake, packet).into());
    };

    let intent = ConnectionState::from_handshake_next(next_state)
        .ok_or(ProtocolError::InvalidIntent(next_state))?;
    let version = ProtocolVersion(protocol_version);
    debug!(
        "Handshake from {}: protocol={}, address={}:{}, next_state={}",
        data.peer,
        protocol_version,
        server_address.split('\0').next().unwrap_or_default(),
        server_port,
        intent
    );

    data.intent = Some(intent);
    data.client_protocol = protocol_version;
    data.handshake_address = server_address;

    let supported = ctx.protocol.supports(version);
    if supported {
        data.version = version;
    }

    match intent {
        ConnectionState::Login if !supported => {
            debug!("Rejecting {} with unsupported protocol {}", data.peer, protocol_version);
            Ok(vec![Action::Disconnect(unsupported_reason(ctx, version))])
        }
        ConnectionState::Login
            if next_state == TRANSFER_INTENT && !ctx.settings.accept_transfers =>
        {
            debug!("Rejecting transfer from {}", data.peer);
            Ok(vec![Action::Disconnect(TextComponent::colored(
                "This server does not accept transfers",
                "red",
            ))])
        }
        ConnectionState::Status if !ctx.settings.reply_to_status => {
            debug!("Ignoring status request from {}", data.peer);
            Ok(vec![Action::Close])
        }
        _ => Ok(vec![Action::Transition(intent)]),
    }
}

fn unsupported_reason(ctx: &ServerContext, version: ProtocolVersion) -> TextComponent {
    let name = |v: Option<ProtocolVersion>| {
        v.and_then(ProtocolVersion::release_name)
            .unwrap_or("?")
            .to_string()
    };
    TextComponent::colored(
        format!(
            "Unsupported client version ({}). Please use {} to {}.",
            version.number(),
            name(ctx.protocol.oldest()),
            name(ctx.protocol.newest())
        ),
        "red",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::handlers::tests::test_context;

    fn handshake(protocol_version: i32, next_state: i32) -> InternalPacket {
        InternalPacket::Handshake {
            protocol_version,
            server_address: "localhost".into(),
            server_port: 25565,
            next_state,
        }
    }

    fn data() -> SessionData {
        SessionData::new("127.0.0.1:5000".parse().unwrap(), ProtocolVersion::V1_21)
    }

    #[test]
    fn test_supported_login() {
        let ctx = test_context();
        let mut data = data();
        let actions = handle(&ctx, &mut data, handshake(47, 2)).unwrap();
        assert_eq!(actions, vec![Action::Transition(ConnectionState::Login)]);
        assert_eq!(data.version, ProtocolVersion::V1_8);
    }

    #[test]
    fn test_unsupported_status_keeps_newest_layout() {
        let ctx = test_context();
        let mut data = data();
        let actions = handle(&ctx, &mut data, handshake(477, 1)).unwrap();
        assert_eq!(actions, vec![Action::Transition(ConnectionState::Status)]);
        assert_eq!(data.version, ProtocolVersion::V1_21);
        assert_eq!(data.client_protocol, 477);
    }

    #[test]
    fn test_unsupported_login_is_refused() {
        let ctx = test_context();
        let mut data = data();
        let actions = handle(&ctx, &mut data, handshake(477, 2)).unwrap();
        assert!(matches!(&actions[..], [Action::Disconnect(_)]));
        assert_eq!(data.intent, Some(ConnectionState::Login));
    }

    #[test]
    fn test_bad_intent_and_wrong_packet() {
        let ctx = test_context();
        assert!(matches!(
            handle(&ctx, &mut data(), handshake(767, 9)),
            Err(SessionError::Protocol(ProtocolError::InvalidIntent(9)))
        ));
        assert!(matches!(
            handle(&ctx, &mut data(), InternalPacket::StatusRequest),
            Err(SessionError::Protocol(ProtocolError::UnexpectedPacket { .. }))
        ));
    }

    #[test]
    fn test_transfers_follow_the_switch() {
        let ctx = test_context();
        let actions = handle(&ctx, &mut data(), handshake(767, 3)).unwrap();
        match &actions[..] {
            [Action::Disconnect(reason)] => assert!(reason.to_plain().contains("transfers")),
            other => panic!("expected a disconnect, got {:?}", other),
        }

        let mut settings = ServerConfig::default().into_settings().unwrap();
        settings.view_distance = 0;
        settings.accept_transfers = true;
        let ctx = ServerContext::new(settings).unwrap();
        let actions = handle(&ctx, &mut data(), handshake(767, 3)).unwrap();
        assert_eq!(actions, vec![Action::Transition(ConnectionState::Login)]);
    }

    #[test]
    fn test_status_can_be_switched_off() {
        let mut settings = ServerConfig::default().into_settings().unwrap();
        settings.view_distance = 0;
        settings.reply_to_status = false;
        let ctx = ServerContext::new(settings).unwrap();
        let actions = handle(&ctx, &mut data(), handshake(767, 1)).unwrap();
        assert_eq!(actions, vec![Action::Close]);
        let actions = handle(&ctx, &mut data(), handshake(767, 2)).unwrap();
        assert_eq!(actions, vec![Action::Transition(ConnectionState::Login)]);
    }
}
