use super::commands::Command;
use super::{teleport_to_spawn, unexpected, Action, Awaiting, SessionData};
use crate::context::ServerContext;
use crate::error::SessionError;
use limbo_protocol_core::{ConnectionState, InternalPacket};
use limbo_types::TextComponent;
use tracing::{debug, info, trace};

/// How far below the dimension floor a falling player gets before being
/// caught, when no boundary is configured.
const DEFAULT_FALL_MARGIN: f64 = 64.0;

/// Everything a client needs to leave the loading screen, in send order.
pub fn join(ctx: &ServerContext, data: &mut SessionData) -> Vec<Action> {
    let settings = &ctx.settings;
    let metadata = ctx.world.metadata();
    let entity_id = *data.entity_id.get_or_insert_with(|| ctx.next_entity_id());
    let features = ctx.protocol.features(data.version);

    let mut packets = vec![
        InternalPacket::JoinGame {
            entity_id,
            game_mode: metadata.game_mode,
            hardcore: metadata.hardcore,
            dimension: metadata.dimension,
            max_players: settings.max_players.min(i32::MAX as u32) as i32,
            view_distance: settings.view_distance,
            simulation_distance: settings.view_distance,
            reduced_debug_info: false,
            is_flat: metadata.is_flat,
            hashed_seed: 0,
        },
        InternalPacket::SpawnPosition {
            position: metadata.spawn.block_pos(),
            angle: metadata.spawn_yaw,
        },
        teleport_to_spawn(ctx, data),
    ];

    // Modern clients already got the brand during Configuration.
    if !features.configuration_state {
        packets.push(InternalPacket::ServerBrand {
            brand: settings.brand.clone(),
        });
    }
    if let Some(welcome) = &settings.welcome_message {
        packets.push(InternalPacket::SystemMessage {
            content: welcome.clone(),
        });
    }

    // A negative time of day stops the daylight cycle.
    packets.push(InternalPacket::UpdateTime {
        world_age: 0,
        time_of_day: -metadata.time_of_day.max(1),
    });

    if let Some(content) = &settings.action_bar {
        packets.push(InternalPacket::ActionBar {
            content: content.clone(),
        });
    }
    if let Some((header, footer)) = &settings.tab_list {
        packets.push(InternalPacket::TabList {
            header: header.clone(),
            footer: footer.clone(),
        });
    }
    if let Some(title) = &settings.title {
        packets.push(InternalPacket::Title {
            title: title.title.clone(),
            subtitle: title.subtitle.clone(),
            fade_in: title.fade_in,
            stay: title.stay,
            fade_out: title.fade_out,
        });
    }
    if let Some(bar) = &settings.boss_bar {
        packets.push(InternalPacket::BossBar {
            uuid: ctx.boss_bar_id,
            title: bar.title.clone(),
            health: bar.health,
            color: bar.color,
            division: bar.division,
        });
    }

    let center = ctx.spawn_chunks.center();
    packets.push(InternalPacket::StartWaitingForChunks);
    packets.push(InternalPacket::SetCenterChunk {
        chunk_x: center.x,
        chunk_z: center.z,
    });
    for (pos, column) in ctx.spawn_chunks.columns() {
        packets.push(InternalPacket::ChunkData {
            chunk_x: pos.x,
            chunk_z: pos.z,
            column: column.clone(),
        });
    }

    packets.into_iter().map(Action::Send).collect()
}

pub fn handle(
    ctx: &ServerContext,
    data: &mut SessionData,
    packet: InternalPacket,
) -> Result<Vec<Action>, SessionError> {
    match packet {
        InternalPacket::ChatMessage { message } => {
            let name = data.display_name();
            info!("<{}> {}", name, message);
            Ok(vec![Action::Send(InternalPacket::SystemMessage {
                content: TextComponent::plain(format!("<{}> {}", name, message)),
            })])
        }
        InternalPacket::ChatCommand { command } => Ok(run_command(ctx, data, &command)),
        InternalPacket::PlayerMove { position, .. } => {
            data.position = position;
            let floor = ctx
                .settings
                .min_y
                .unwrap_or(ctx.world.metadata().min_y() as f64 - DEFAULT_FALL_MARGIN);
            if position.y < floor {
                debug!("{} fell below y={}, returning to spawn", data.display_name(), floor);
                return Ok(vec![Action::Send(teleport_to_spawn(ctx, data))]);
            }
            Ok(Vec::new())
        }
        InternalPacket::ConfirmTeleport { teleport_id } => {
            trace!("{} confirmed teleport {}", data.display_name(), teleport_id);
            Ok(Vec::new())
        }
        InternalPacket::ClientAbilities { flying } => {
            data.flying = flying && data.allow_flying;
            Ok(Vec::new())
        }
        InternalPacket::ClientInformation { locale, .. } => {
            data.locale = Some(locale);
            Ok(Vec::new())
        }
        InternalPacket::PluginMessage { channel, .. } => {
            debug!("Plugin message: {}", channel);
            Ok(Vec::new())
        }
        InternalPacket::ConfigurationAcknowledged
            if data.awaiting == Awaiting::ConfigurationAcknowledged =>
        {
            data.awaiting = Awaiting::Nothing;
            let mut actions = vec![Action::Transition(ConnectionState::Configuration)];
            actions.extend(super::configuration::enter(ctx, data)?);
            Ok(actions)
        }
        InternalPacket::Unknown { packet_id, .. } => {
            trace!("Ignoring play packet id=0x{:02X}", packet_id);
            Ok(Vec::new())
        }
        other => Err(unexpected(ConnectionState::Play, other).into()),
    }
}

fn error_message(text: impl Into<String>) -> Vec<Action> {
    vec![Action::Send(InternalPacket::SystemMessage {
        content: TextComponent::colored(text, "red"),
    })]
}

fn abilities(data: &SessionData) -> Action {
    Action::Send(InternalPacket::PlayerAbilities {
        allow_flying: data.allow_flying,
        flying: data.flying,
        flying_speed: data.flying_speed,
    })
}

fn run_command(ctx: &ServerContext, data: &mut SessionData, input: &str) -> Vec<Action> {
    info!("{} issued command: /{}", data.display_name(), input);
    let command = match Command::parse(input, &ctx.settings.commands) {
        Ok(command) => command,
        Err(e) => return error_message(e.to_string()),
    };

    let features = ctx.protocol.features(data.version);
    match command {
        Command::Spawn => vec![Action::Send(teleport_to_spawn(ctx, data))],
        Command::Fly => {
            data.allow_flying = !data.allow_flying;
            if !data.allow_flying {
                data.flying = false;
            }
            vec![abilities(data)]
        }
        Command::FlySpeed(speed) => {
            data.flying_speed = speed;
            vec![abilities(data)]
        }
        Command::Transfer { host, port } if features.transfer => {
            info!("Transferring {} to {}:{}", data.display_name(), host, port);
            vec![Action::Send(InternalPacket::Transfer { host, port })]
        }
        Command::Transfer { .. } => error_message("Transfers need Minecraft 1.20.5 or newer"),
        Command::Reconfigure if features.reconfiguration => {
            data.awaiting = Awaiting::ConfigurationAcknowledged;
            vec![Action::Send(InternalPacket::StartConfiguration)]
        }
        Command::Reconfigure => error_message("Reconfiguring needs Minecraft 1.20.2 or newer"),
    }
}
