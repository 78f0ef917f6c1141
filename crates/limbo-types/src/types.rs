use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A block position in the world (x, y, z integers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Encode as a 64-bit long (1.14+ layout).
    /// x: 26 bits, z: 26 bits, y: 12 bits
    pub fn encode(&self) -> u64 {
        ((self.x as u64 & 0x3FFFFFF) << 38)
            | ((self.z as u64 & 0x3FFFFFF) << 12)
            | (self.y as u64 & 0xFFF)
    }

    /// Encode as a 64-bit long (pre-1.14 layout).
    /// x: 26 bits, y: 12 bits, z: 26 bits
    pub fn encode_legacy(&self) -> u64 {
        ((self.x as u64 & 0x3FFFFFF) << 38)
            | ((self.y as u64 & 0xFFF) << 26)
            | (self.z as u64 & 0x3FFFFFF)
    }

    pub fn decode(val: u64) -> Self {
        let x = sign_extend((val >> 38) as i32, 26);
        let z = sign_extend(((val >> 12) & 0x3FFFFFF) as i32, 26);
        let y = sign_extend((val & 0xFFF) as i32, 12);
        Self { x, y, z }
    }

    pub fn decode_legacy(val: u64) -> Self {
        let x = sign_extend((val >> 38) as i32, 26);
        let y = sign_extend(((val >> 26) & 0xFFF) as i32, 12);
        let z = sign_extend((val & 0x3FFFFFF) as i32, 26);
        Self { x, y, z }
    }

    pub fn chunk_pos(&self) -> ChunkPos {
        ChunkPos {
            x: self.x >> 4,
            z: self.z >> 4,
        }
    }
}

fn sign_extend(value: i32, bits: u32) -> i32 {
    if value >= 1 << (bits - 1) {
        value - (1 << bits)
    } else {
        value
    }
}

/// A chunk position (x, z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn distance_squared(&self, other: &ChunkPos) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dz * dz
    }
}

/// A 3D position with double precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3d {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn chunk_pos(&self) -> ChunkPos {
        self.block_pos().chunk_pos()
    }

    pub fn block_pos(&self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

/// A player's game profile (UUID + name + properties).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameProfile {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub properties: Vec<ProfileProperty>,
}

impl GameProfile {
    /// Profile for a player that has not been authenticated by anyone.
    pub fn offline(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            uuid: offline_uuid(&name),
            name,
            properties: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileProperty {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Offline-mode UUID: version 3 layout over the MD5 of `OfflinePlayer:<name>`,
/// matching what vanilla servers and proxies derive.
pub fn offline_uuid(name: &str) -> Uuid {
    use md5::{Digest, Md5};
    let digest = Md5::digest(format!("OfflinePlayer:{}", name).as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest);
    bytes[6] = (bytes[6] & 0x0f) | 0x30;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    Uuid::from_bytes(bytes)
}

/// Text component for chat messages (simplified JSON text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextComponent {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub underlined: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub strikethrough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub obfuscated: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub extra: Vec<TextComponent>,
}

impl TextComponent {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            bold: None,
            italic: None,
            underlined: None,
            strikethrough: None,
            obfuscated: None,
            extra: Vec::new(),
        }
    }

    pub fn colored(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            ..Self::plain(text)
        }
    }

    pub fn with_extra(mut self, component: TextComponent) -> Self {
        self.extra.push(component);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.extra.iter().all(TextComponent::is_empty)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"text":""}"#.to_string())
    }

    /// Flatten to plain text, dropping formatting.
    pub fn to_plain(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.extra {
            out.push_str(&child.to_plain());
        }
        out
    }
}

/// Game mode enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum GameMode {
    Survival = 0,
    Creative = 1,
    Adventure = 2,
    Spectator = 3,
}

impl GameMode {
    pub fn id(self) -> u8 {
        self as u8
    }
}

/// The three vanilla dimensions a limbo world can pretend to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Overworld,
    #[serde(alias = "the_nether")]
    Nether,
    #[serde(alias = "the_end")]
    End,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Overworld, Dimension::Nether, Dimension::End];

    pub fn identifier(self) -> &'static str {
        match self {
            Dimension::Overworld => "minecraft:overworld",
            Dimension::Nether => "minecraft:the_nether",
            Dimension::End => "minecraft:the_end",
        }
    }

    /// Numeric dimension id used before dimensions became registry entries.
    pub fn legacy_id(self) -> i32 {
        match self {
            Dimension::Overworld => 0,
            Dimension::Nether => -1,
            Dimension::End => 1,
        }
    }

    /// Index into the dimension type registry sent to the client.
    pub fn registry_index(self) -> i32 {
        match self {
            Dimension::Overworld => 0,
            Dimension::Nether => 1,
            Dimension::End => 2,
        }
    }

    pub fn min_y(self) -> i32 {
        match self {
            Dimension::Overworld => -64,
            Dimension::Nether | Dimension::End => 0,
        }
    }

    pub fn height(self) -> i32 {
        match self {
            Dimension::Overworld => 384,
            Dimension::Nether | Dimension::End => 256,
        }
    }

    pub fn has_skylight(self) -> bool {
        self != Dimension::Nether
    }
}

/// Boss bar colors, in protocol order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BossBarColor {
    Pink,
    Blue,
    Red,
    Green,
    Yellow,
    Purple,
    White,
}

impl BossBarColor {
    pub fn id(self) -> i32 {
        self as i32
    }
}

/// Boss bar notch styles, in protocol order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossBarDivision {
    None,
    Notches6,
    Notches10,
    Notches12,
    Notches20,
}

impl BossBarDivision {
    pub fn id(self) -> i32 {
        self as i32
    }
}

/// Block states a limbo world is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockState {
    Air,
    Stone,
    Granite,
    PolishedGranite,
    Diorite,
    PolishedDiorite,
    Andesite,
    PolishedAndesite,
    GrassBlock,
    Dirt,
    CoarseDirt,
    Cobblestone,
    OakPlanks,
}

impl BlockState {
    pub fn is_air(self) -> bool {
        self == BlockState::Air
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockState::Air => "minecraft:air",
            BlockState::Stone => "minecraft:stone",
            BlockState::Granite => "minecraft:granite",
            BlockState::PolishedGranite => "minecraft:polished_granite",
            BlockState::Diorite => "minecraft:diorite",
            BlockState::PolishedDiorite => "minecraft:polished_diorite",
            BlockState::Andesite => "minecraft:andesite",
            BlockState::PolishedAndesite => "minecraft:polished_andesite",
            BlockState::GrassBlock => "minecraft:grass_block",
            BlockState::Dirt => "minecraft:dirt",
            BlockState::CoarseDirt => "minecraft:coarse_dirt",
            BlockState::Cobblestone => "minecraft:cobblestone",
            BlockState::OakPlanks => "minecraft:oak_planks",
        }
    }
}
