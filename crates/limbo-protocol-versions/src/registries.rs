//! Synchronized game registries: the data-driven content a client needs
//! before it can render any world.

use limbo_nbt::{nbt_compound, nbt_list, NbtValue};
use limbo_protocol_core::{ProtocolVersion, RegistryEntry, WirePacket};
use limbo_types::Dimension;

struct SyncedRegistry {
    id: &'static str,
    /// First version that expects this registry from the server.
    since: ProtocolVersion,
    entries: fn(ProtocolVersion) -> Vec<RegistryEntry>,
}

const REGISTRIES: &[SyncedRegistry] = &[
    SyncedRegistry {
        id: "minecraft:dimension_type",
        since: ProtocolVersion::V1_20,
        entries: dimension_types,
    },
    SyncedRegistry {
        id: "minecraft:worldgen/biome",
        since: ProtocolVersion::V1_20,
        entries: biomes,
    },
    SyncedRegistry {
        id: "minecraft:chat_type",
        since: ProtocolVersion::V1_20,
        entries: chat_types,
    },
    SyncedRegistry {
        id: "minecraft:trim_pattern",
        since: ProtocolVersion::V1_20,
        entries: empty,
    },
    SyncedRegistry {
        id: "minecraft:trim_material",
        since: ProtocolVersion::V1_20,
        entries: empty,
    },
    SyncedRegistry {
        id: "minecraft:wolf_variant",
        since: ProtocolVersion::V1_20_5,
        entries: wolf_variants,
    },
    SyncedRegistry {
        id: "minecraft:painting_variant",
        since: ProtocolVersion::V1_21,
        entries: painting_variants,
    },
    SyncedRegistry {
        id: "minecraft:damage_type",
        since: ProtocolVersion::V1_20,
        entries: damage_types,
    },
    SyncedRegistry {
        id: "minecraft:banner_pattern",
        since: ProtocolVersion::V1_20_5,
        entries: empty,
    },
    SyncedRegistry {
        id: "minecraft:enchantment",
        since: ProtocolVersion::V1_21,
        entries: empty,
    },
    SyncedRegistry {
        id: "minecraft:jukebox_song",
        since: ProtocolVersion::V1_21,
        entries: empty,
    },
];

fn registries_for(version: ProtocolVersion) -> impl Iterator<Item = &'static SyncedRegistry> {
    REGISTRIES.iter().filter(move |r| version.at_least(r.since))
}

/// One Registry Data packet per registry the version knows (1.20.5+).
pub fn registry_data_packets(version: ProtocolVersion) -> Vec<WirePacket> {
    registries_for(version)
        .map(|registry| WirePacket::RegistryData {
            registry_id: registry.id.to_string(),
            entries: (registry.entries)(version),
        })
        .collect()
}

/// All registries folded into the single compound used by 1.20 - 1.20.4:
/// `{ <id>: { type: <id>, value: [{ name, id, element }] } }`.
pub fn registry_codec(version: ProtocolVersion) -> NbtValue {
    let mut codec = NbtValue::Compound(Vec::new());
    for registry in registries_for(version) {
        let value = (registry.entries)(version)
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                nbt_compound! {
                    "name" => NbtValue::String(entry.id),
                    "id" => NbtValue::Int(index as i32),
                    "element" => entry.data.unwrap_or(NbtValue::Compound(Vec::new()))
                }
            })
            .collect();
        codec.push(
            registry.id,
            nbt_compound! {
                "type" => NbtValue::string(registry.id),
                "value" => NbtValue::List(value)
            },
        );
    }
    codec
}

fn empty(_version: ProtocolVersion) -> Vec<RegistryEntry> {
    Vec::new()
}

fn dimension_type(dimension: Dimension) -> NbtValue {
    match dimension {
        Dimension::Overworld => nbt_compound! {
            "has_skylight" => NbtValue::Byte(1),
            "has_ceiling" => NbtValue::Byte(0),
            "ultrawarm" => NbtValue::Byte(0),
            "natural" => NbtValue::Byte(1),
            "coordinate_scale" => NbtValue::Double(1.0),
            "bed_works" => NbtValue::Byte(1),
            "respawn_anchor_works" => NbtValue::Byte(0),
            "min_y" => NbtValue::Int(dimension.min_y()),
            "height" => NbtValue::Int(dimension.height()),
            "logical_height" => NbtValue::Int(dimension.height()),
            "infiniburn" => NbtValue::string("#minecraft:infiniburn_overworld"),
            "effects" => NbtValue::string("minecraft:overworld"),
            "ambient_light" => NbtValue::Float(0.0),
            "piglin_safe" => NbtValue::Byte(0),
            "has_raids" => NbtValue::Byte(1),
            "monster_spawn_light_level" => NbtValue::Int(0),
            "monster_spawn_block_light_limit" => NbtValue::Int(0)
        },
        Dimension::Nether => nbt_compound! {
            "fixed_time" => NbtValue::Long(18000),
            "has_skylight" => NbtValue::Byte(0),
            "has_ceiling" => NbtValue::Byte(1),
            "ultrawarm" => NbtValue::Byte(1),
            "natural" => NbtValue::Byte(0),
            "coordinate_scale" => NbtValue::Double(8.0),
            "bed_works" => NbtValue::Byte(0),
            "respawn_anchor_works" => NbtValue::Byte(1),
            "min_y" => NbtValue::Int(dimension.min_y()),
            "height" => NbtValue::Int(dimension.height()),
            "logical_height" => NbtValue::Int(128),
            "infiniburn" => NbtValue::string("#minecraft:infiniburn_nether"),
            "effects" => NbtValue::string("minecraft:the_nether"),
            "ambient_light" => NbtValue::Float(0.1),
            "piglin_safe" => NbtValue::Byte(1),
            "has_raids" => NbtValue::Byte(0),
            "monster_spawn_light_level" => NbtValue::Int(7),
            "monster_spawn_block_light_limit" => NbtValue::Int(15)
        },
        Dimension::End => nbt_compound! {
            "fixed_time" => NbtValue::Long(6000),
            "has_skylight" => NbtValue::Byte(0),
            "has_ceiling" => NbtValue::Byte(0),
            "ultrawarm" => NbtValue::Byte(0),
            "natural" => NbtValue::Byte(0),
            "coordinate_scale" => NbtValue::Double(1.0),
            "bed_works" => NbtValue::Byte(0),
            "respawn_anchor_works" => NbtValue::Byte(0),
            "min_y" => NbtValue::Int(dimension.min_y()),
            "height" => NbtValue::Int(dimension.height()),
            "logical_height" => NbtValue::Int(dimension.height()),
            "infiniburn" => NbtValue::string("#minecraft:infiniburn_end"),
            "effects" => NbtValue::string("minecraft:the_end"),
            "ambient_light" => NbtValue::Float(0.0),
            "piglin_safe" => NbtValue::Byte(0),
            "has_raids" => NbtValue::Byte(1),
            "monster_spawn_light_level" => NbtValue::Int(0),
            "monster_spawn_block_light_limit" => NbtValue::Int(0)
        },
    }
}

/// Entries are in `Dimension::registry_index` order.
fn dimension_types(_version: ProtocolVersion) -> Vec<RegistryEntry> {
    Dimension::ALL
        .iter()
        .map(|&dimension| RegistryEntry {
            id: dimension.identifier().into(),
            data: Some(dimension_type(dimension)),
        })
        .collect()
}

/// Plains only; chunk sections reference biome index 0.
fn biomes(_version: ProtocolVersion) -> Vec<RegistryEntry> {
    vec![RegistryEntry {
        id: "minecraft:plains".into(),
        data: Some(nbt_compound! {
            "has_precipitation" => NbtValue::Byte(1),
            "temperature" => NbtValue::Float(0.8),
            "downfall" => NbtValue::Float(0.4),
            "effects" => nbt_compound! {
                "fog_color" => NbtValue::Int(12638463),
                "water_color" => NbtValue::Int(4159204),
                "water_fog_color" => NbtValue::Int(329011),
                "sky_color" => NbtValue::Int(7907327),
                "mood_sound" => nbt_compound! {
                    "sound" => NbtValue::string("minecraft:ambient.cave"),
                    "tick_delay" => NbtValue::Int(6000),
                    "offset" => NbtValue::Double(2.0),
                    "block_search_extent" => NbtValue::Int(8)
                }
            }
        }),
    }]
}

fn chat_decoration(translation_key: &str) -> NbtValue {
    nbt_compound! {
        "translation_key" => NbtValue::string(translation_key),
        "parameters" => nbt_list![NbtValue::string("sender"), NbtValue::string("content")]
    }
}

fn chat_types(_version: ProtocolVersion) -> Vec<RegistryEntry> {
    vec![RegistryEntry {
        id: "minecraft:chat".into(),
        data: Some(nbt_compound! {
            "chat" => chat_decoration("chat.type.text"),
            "narration" => chat_decoration("chat.type.text.narrate")
        }),
    }]
}

struct DamageType {
    id: &'static str,
    message_id: &'static str,
    scaling: &'static str,
    exhaustion: f32,
    effects: Option<&'static str>,
    death_message_type: Option<&'static str>,
    since: ProtocolVersion,
}

const fn damage(id: &'static str, message_id: &'static str, exhaustion: f32) -> DamageType {
    DamageType {
        id,
        message_id,
        scaling: "when_caused_by_living_non_player",
        exhaustion,
        effects: None,
        death_message_type: None,
        since: ProtocolVersion::V1_20,
    }
}

impl DamageType {
    const fn always_scaled(mut self) -> Self {
        self.scaling = "always";
        self
    }

    const fn effects(mut self, effects: &'static str) -> Self {
        self.effects = Some(effects);
        self
    }

    const fn death_message(mut self, kind: &'static str) -> Self {
        self.death_message_type = Some(kind);
        self
    }

    const fn since(mut self, version: ProtocolVersion) -> Self {
        self.since = version;
        self
    }

    fn entry(&self) -> RegistryEntry {
        let mut data = nbt_compound! {
            "message_id" => NbtValue::string(self.message_id),
            "scaling" => NbtValue::string(self.scaling),
            "exhaustion" => NbtValue::Float(self.exhaustion)
        };
        if let Some(effects) = self.effects {
            data.push("effects", NbtValue::string(effects));
        }
        if let Some(kind) = self.death_message_type {
            data.push("death_message_type", NbtValue::string(kind));
        }
        RegistryEntry {
            id: format!("minecraft:{}", self.id),
            data: Some(data),
        }
    }
}

const DAMAGE_TYPES: &[DamageType] = &[
    damage("arrow", "arrow", 0.1),
    damage("bad_respawn_point", "badRespawnPoint", 0.1)
        .always_scaled()
        .death_message("intentional_game_design"),
    damage("cactus", "cactus", 0.1),
    damage("campfire", "inFire", 0.1)
        .effects("burning")
        .since(ProtocolVersion::V1_21),
    damage("cramming", "cramming", 0.0),
    damage("dragon_breath", "dragonBreath", 0.0),
    damage("drown", "drown", 0.0).effects("drowning"),
    damage("dry_out", "dryout", 0.1),
    damage("explosion", "explosion", 0.1).always_scaled(),
    damage("fall", "fall", 0.0).death_message("fall_variants"),
    damage("falling_anvil", "anvil", 0.1),
    damage("falling_block", "fallingBlock", 0.1),
    damage("falling_stalactite", "fallingStalactite", 0.1),
    damage("fireball", "fireball", 0.1).effects("burning"),
    damage("fireworks", "fireworks", 0.1),
    damage("fly_into_wall", "flyIntoWall", 0.0),
    damage("freeze", "freeze", 0.0).effects("freezing"),
    damage("generic", "generic", 0.0),
    damage("generic_kill", "genericKill", 0.0),
    damage("hot_floor", "hotFloor", 0.1).effects("burning"),
    damage("in_fire", "inFire", 0.1).effects("burning"),
    damage("in_wall", "inWall", 0.0),
    damage("indirect_magic", "indirectMagic", 0.0),
    damage("lava", "lava", 0.1).effects("burning"),
    damage("lightning_bolt", "lightningBolt", 0.1),
    damage("magic", "magic", 0.0),
    damage("mob_attack", "mob", 0.1),
    damage("mob_attack_no_aggro", "mob", 0.1),
    damage("mob_projectile", "mob", 0.1),
    damage("on_fire", "onFire", 0.0).effects("burning"),
    damage("out_of_world", "outOfWorld", 0.0),
    damage("outside_border", "outsideBorder", 0.0),
    damage("player_attack", "player", 0.1),
    damage("player_explosion", "explosion.player", 0.1).always_scaled(),
    damage("sonic_boom", "sonic_boom", 0.0).always_scaled(),
    damage("spit", "mob", 0.1).since(ProtocolVersion::V1_20_5),
    damage("stalagmite", "stalagmite", 0.0),
    damage("starve", "starve", 0.0),
    damage("sting", "sting", 0.1),
    damage("sweet_berry_bush", "sweetBerryBush", 0.1).effects("poking"),
    damage("thorns", "thorns", 0.1).effects("thorns"),
    damage("thrown", "thrown", 0.1),
    damage("trident", "trident", 0.1),
    damage("unattributed_fireball", "onFire", 0.1).effects("burning"),
    damage("wind_charge", "mob", 0.1).since(ProtocolVersion::V1_20_5),
    damage("wither", "wither", 0.0),
    damage("wither_skull", "witherSkull", 0.1),
];

fn damage_types(version: ProtocolVersion) -> Vec<RegistryEntry> {
    DAMAGE_TYPES
        .iter()
        .filter(|d| version.at_least(d.since))
        .map(DamageType::entry)
        .collect()
}

fn wolf_variants(_version: ProtocolVersion) -> Vec<RegistryEntry> {
    vec![RegistryEntry {
        id: "minecraft:pale".into(),
        data: Some(nbt_compound! {
            "wild_texture" => NbtValue::string("minecraft:textures/entity/wolf/wolf.png"),
            "tame_texture" => NbtValue::string("minecraft:textures/entity/wolf/wolf_tame.png"),
            "angry_texture" => NbtValue::string("minecraft:textures/entity/wolf/wolf_angry.png"),
            "biomes" => NbtValue::string("minecraft:plains")
        }),
    }]
}

fn painting_variants(_version: ProtocolVersion) -> Vec<RegistryEntry> {
    vec![RegistryEntry {
        id: "minecraft:kebab".into(),
        data: Some(nbt_compound! {
            "asset_id" => NbtValue::string("minecraft:kebab"),
            "width" => NbtValue::Int(1),
            "height" => NbtValue::Int(1)
        }),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(version: ProtocolVersion) -> Vec<String> {
        registry_data_packets(version)
            .into_iter()
            .map(|packet| match packet {
                WirePacket::RegistryData { registry_id, .. } => registry_id,
                other => panic!("unexpected {:?}", other.kind()),
            })
            .collect()
    }

    #[test]
    fn test_registries_are_filtered_by_version() {
        let v766 = ids(ProtocolVersion::V1_20_5);
        let v767 = ids(ProtocolVersion::V1_21);
        assert!(v766.contains(&"minecraft:wolf_variant".to_string()));
        assert!(!v766.contains(&"minecraft:painting_variant".to_string()));
        assert!(v767.contains(&"minecraft:jukebox_song".to_string()));
        assert_eq!(v767.len(), REGISTRIES.len());
        assert!(ids(ProtocolVersion::V1_8).is_empty());
    }

    #[test]
    fn test_dimension_types_follow_registry_index() {
        let entries = dimension_types(ProtocolVersion::V1_21);
        for dimension in Dimension::ALL {
            assert_eq!(
                entries[dimension.registry_index() as usize].id,
                dimension.identifier()
            );
        }
    }

    #[test]
    fn test_damage_types_added_later_are_filtered() {
        let has = |version, id: &str| {
            damage_types(version)
                .iter()
                .any(|e| e.id == format!("minecraft:{}", id))
        };
        assert!(!has(ProtocolVersion::V1_20, "wind_charge"));
        assert!(has(ProtocolVersion::V1_20_5, "wind_charge"));
        assert!(!has(ProtocolVersion::V1_20_5, "campfire"));
        assert!(has(ProtocolVersion::V1_21, "campfire"));
    }

    #[test]
    fn test_codec_shape() {
        let codec = registry_codec(ProtocolVersion::V1_20_2);
        let dimensions = codec.get("minecraft:dimension_type").unwrap();
        assert_eq!(
            dimensions.get("type"),
            Some(&NbtValue::String("minecraft:dimension_type".into()))
        );
        let Some(NbtValue::List(values)) = dimensions.get("value") else {
            panic!("value is not a list");
        };
        assert_eq!(values.len(), 3);
        assert_eq!(values[1].get("id"), Some(&NbtValue::Int(1)));
        assert!(codec.get("minecraft:wolf_variant").is_none());
    }
}
