use crate::config::{ForwardingMode, Settings, WorldType};
use crate::encryption::ServerKeys;
use crate::forwarding::{BungeeGuard, ForwardingHook, LegacyForwarding, VelocityForwarding};
use anyhow::Context;
use limbo_protocol_core::Protocol;
use limbo_protocol_versions::build_protocol;
use limbo_world::{FlatWorld, SpawnChunks, VoidWorld, WorldSnapshot};
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// State shared read-only by every session, plus two counters.
pub struct ServerContext {
    pub settings: Settings,
    pub protocol: Protocol,
    pub world: Arc<dyn WorldSnapshot>,
    pub spawn_chunks: SpawnChunks,
    pub forwarding: Option<Box<dyn ForwardingHook>>,
    pub keys: Option<ServerKeys>,
    /// The one boss bar everybody sees.
    pub boss_bar_id: Uuid,
    online: Arc<AtomicUsize>,
    next_entity_id: AtomicI32,
}

impl ServerContext {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let protocol = build_protocol(&settings.supported_versions)
            .context("building packet tables")?;

        let world: Arc<dyn WorldSnapshot> = match settings.world_type {
            WorldType::Flat => Arc::new(FlatWorld::classic(settings.world.clone())),
            WorldType::Void => Arc::new(VoidWorld::new(settings.world.clone())),
        };
        let spawn_chunks = SpawnChunks::build(world.as_ref(), settings.view_distance);

        let forwarding: Option<Box<dyn ForwardingHook>> = match settings.forwarding_mode {
            ForwardingMode::None => None,
            ForwardingMode::Legacy => Some(Box::new(LegacyForwarding)),
            ForwardingMode::BungeeGuard => {
                Some(Box::new(BungeeGuard::new(settings.forwarding_tokens.clone())))
            }
            ForwardingMode::Velocity => Some(Box::new(VelocityForwarding::new(
                settings.forwarding_secret.as_bytes(),
            ))),
        };

        let keys = if settings.encryption {
            info!("Generating server key pair");
            Some(ServerKeys::generate()?)
        } else {
            None
        };

        Ok(Self {
            settings,
            protocol,
            world,
            spawn_chunks,
            forwarding,
            keys,
            boss_bar_id: Uuid::new_v4(),
            online: Arc::new(AtomicUsize::new(0)),
            next_entity_id: AtomicI32::new(1),
        })
    }

    pub fn online(&self) -> usize {
        self.online.load(Ordering::Relaxed)
    }

    pub fn next_entity_id(&self) -> i32 {
        self.next_entity_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Take one of the `max_players` slots, held until the guard drops.
    /// `None` when the server is full.
    pub fn try_join(&self) -> Option<OnlineGuard> {
        let max = self.settings.max_players as usize;
        self.online
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < max).then_some(count + 1)
            })
            .ok()?;
        Some(OnlineGuard {
            online: self.online.clone(),
        })
    }
}

#[derive(Debug)]
pub struct OnlineGuard {
    online: Arc<AtomicUsize>,
}

impl Drop for OnlineGuard {
    fn drop(&mut self) {
        self.online.fetch_sub(1, Ordering::AcqRel);
    }
}
