use super::{play, unexpected, Action, Awaiting, SessionData};
use crate::context::ServerContext;
use crate::error::SessionError;
use limbo_protocol_core::{ConnectionState, InternalPacket};
use tracing::debug;

/// First packets after entering Configuration, from Login or from Play.
///
/// Versions without a configuration phase pass straight through to Play.
pub fn enter(ctx: &ServerContext, data: &mut SessionData) -> Result<Vec<Action>, SessionError> {
    let features = ctx.protocol.features(data.version);
    if !features.configuration_state {
        let mut actions = vec![Action::Transition(ConnectionState::Play)];
        actions.extend(play::join(ctx, data));
        return Ok(actions);
    }

    let mut actions = vec![Action::Send(InternalPacket::ServerBrand {
        brand: ctx.settings.brand.clone(),
    })];
    if features.known_packs {
        actions.push(Action::Send(InternalPacket::RequestKnownPacks));
        data.awaiting = Awaiting::KnownPacks;
    } else {
        actions.extend(send_registries(data));
    }
    Ok(actions)
}

pub fn handle(
    ctx: &ServerContext,
    data: &mut SessionData,
    packet: InternalPacket,
) -> Result<Vec<Action>, SessionError> {
    match packet {
        InternalPacket::ClientInformation {
            locale,
            view_distance,
        } => {
            debug!("Client info: locale={}, view_distance={}", locale, view_distance);
            data.locale = Some(locale);
            Ok(Vec::new())
        }
        InternalPacket::PluginMessage { channel, data: body } => {
            debug!("Plugin message: {} ({} bytes)", channel, body.len());
            Ok(Vec::new())
        }
        InternalPacket::KnownPacksResponse { packs } if data.awaiting == Awaiting::KnownPacks => {
            debug!("Client knows {} packs", packs.len());
            Ok(send_registries(data))
        }
        InternalPacket::FinishConfigurationAck
            if data.awaiting == Awaiting::FinishConfigurationAck =>
        {
            debug!("Configuration finished for {}", data.display_name());
            data.awaiting = Awaiting::Nothing;
            let mut actions = vec![Action::Transition(ConnectionState::Play)];
            actions.extend(play::join(ctx, data));
            Ok(actions)
        }
        InternalPacket::Unknown { packet_id, .. } => {
            debug!("Ignoring config packet id=0x{:02X}", packet_id);
            Ok(Vec::new())
        }
        other => Err(unexpected(ConnectionState::Configuration, other).into()),
    }
}

fn send_registries(data: &mut SessionData) -> Vec<Action> {
    data.awaiting = Awaiting::FinishConfigurationAck;
    vec![
        Action::Send(InternalPacket::Registries),
        Action::Send(InternalPacket::FinishConfiguration),
    ]
}
