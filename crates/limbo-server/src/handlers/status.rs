use super::{unexpected, Action, SessionData};
use crate::context::ServerContext;
use crate::error::SessionError;
use limbo_protocol_core::{ConnectionState, InternalPacket, ProtocolVersion};
use serde_json::json;
use tracing::debug;

pub fn handle(
    ctx: &ServerContext,
    data: &mut SessionData,
    packet: InternalPacket,
) -> Result<Vec<Action>, SessionError> {
    match packet {
        InternalPacket::StatusRequest if !data.status_answered => {
            debug!("Status request from {}", data.peer);
            data.status_answered = true;
            Ok(vec![Action::Send(InternalPacket::StatusResponse {
                json: status_json(ctx, data),
            })])
        }
        InternalPacket::PingRequest { payload } => Ok(vec![
            Action::Send(InternalPacket::PongResponse { payload }),
            Action::Close,
        ]),
        other => Err(unexpected(ConnectionState::Status, other).into()),
    }
}

/// Server list entry. A supported client sees its own version echoed back;
/// anyone else sees the supported range and the newest protocol number, so
/// the list marks the server as incompatible.
fn status_json(ctx: &ServerContext, data: &SessionData) -> String {
    let client = ProtocolVersion(data.client_protocol);
    let (name, protocol) = match client.release_name() {
        Some(name) if ctx.protocol.supports(client) => (name.to_string(), client.number()),
        _ => {
            let name = |v: Option<ProtocolVersion>| {
                v.and_then(ProtocolVersion::release_name).unwrap_or("?")
            };
            (
                format!("{} - {}", name(ctx.protocol.oldest()), name(ctx.protocol.newest())),
                data.version.number(),
            )
        }
    };

    let mut status = json!({
        "version": { "name": name, "protocol": protocol },
        "players": {
            "max": ctx.settings.max_players,
            "online": ctx.online(),
            "sample": [],
        },
        "description": ctx.settings.motd,
    });
    if let Some(favicon) = &ctx.settings.favicon {
        status["favicon"] = json!(favicon);
    }
    status.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::tests::{test_context, test_data};
    use limbo_protocol_core::ProtocolError;

    fn response(actions: Vec<Action>) -> serde_json::Value {
        match &actions[..] {
            [Action::Send(InternalPacket::StatusResponse { json })] => {
                serde_json::from_str(json).unwrap()
            }
            other => panic!("expected a status response, got {:?}", other),
        }
    }

    #[test]
    fn test_supported_client_sees_its_version() {
        let ctx = test_context();
        let mut data = test_data(ProtocolVersion::V1_8);
        data.client_protocol = 47;
        let json = response(handle(&ctx, &mut data, InternalPacket::StatusRequest).unwrap());
        assert_eq!(json["version"]["protocol"], 47);
        assert_eq!(json["version"]["name"], "1.8.x");
        assert_eq!(json["players"]["max"], 100);
        assert_eq!(json["players"]["online"], 0);
        assert_eq!(json["description"]["text"], ctx.settings.motd.text);
        assert!(json.get("favicon").is_none());
    }

    #[test]
    fn test_favicon_is_listed() {
        let mut settings = crate::config::ServerConfig::default().into_settings().unwrap();
        settings.view_distance = 0;
        settings.favicon = Some("data:image/png;base64,AAAA".into());
        let ctx = ServerContext::new(settings).unwrap();
        let mut data = test_data(ProtocolVersion::V1_21);
        let json = response(handle(&ctx, &mut data, InternalPacket::StatusRequest).unwrap());
        assert_eq!(json["favicon"], "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_second_status_request_is_unexpected() {
        let ctx = test_context();
        let mut data = test_data(ProtocolVersion::V1_21);
        handle(&ctx, &mut data, InternalPacket::StatusRequest).unwrap();
        assert!(matches!(
            handle(&ctx, &mut data, InternalPacket::StatusRequest),
            Err(SessionError::Protocol(ProtocolError::UnexpectedPacket {
                packet: "StatusRequest",
                ..
            }))
        ));
        // A ping is still answered.
        let actions = handle(&ctx, &mut data, InternalPacket::PingRequest { payload: 1 }).unwrap();
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn test_unsupported_client_sees_range() {
        let ctx = test_context();
        let mut data = test_data(ProtocolVersion::V1_21);
        data.client_protocol = 477;
        let json = response(handle(&ctx, &mut data, InternalPacket::StatusRequest).unwrap());
        assert_eq!(json["version"]["protocol"], 767);
        assert_eq!(json["version"]["name"], "1.8.x - 1.21-1.21.1");
    }

    #[test]
    fn test_ping_closes() {
        let ctx = test_context();
        let mut data = test_data(ProtocolVersion::V1_21);
        let actions = handle(&ctx, &mut data, InternalPacket::PingRequest { payload: 42 }).unwrap();
        assert_eq!(
            actions,
            vec![
                Action::Send(InternalPacket::PongResponse { payload: 42 }),
                Action::Close
            ]
        );
    }

    #[test]
    fn test_unknown_is_fatal() {
        let ctx = test_context();
        let mut data = test_data(ProtocolVersion::V1_21);
        let packet = InternalPacket::Unknown {
            packet_id: 0x09,
            data: vec![],
        };
        assert!(matches!(
            handle(&ctx, &mut data, packet),
            Err(SessionError::Protocol(ProtocolError::UnknownPacket { id: 0x09, .. }))
        ));
    }
}
