use crate::placeholders::expand_placeholders;
use anyhow::{bail, Context};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use limbo_protocol_core::{CompressionSettings, ProtocolVersion, DEFAULT_MAX_FRAME_LEN};
use limbo_protocol_versions::SUPPORTED_VERSIONS;
use limbo_types::{
    parse_mini_message, BossBarColor, BossBarDivision, Dimension, GameMode, TextComponent, Vec3d,
};
use limbo_world::WorldMetadata;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// `config/server.toml` as written by the operator.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_players")]
    pub max_players: u32,
    #[serde(default = "default_motd")]
    pub motd: String,
    #[serde(default = "default_brand")]
    pub brand: String,
    #[serde(default)]
    pub welcome_message: Option<String>,
    #[serde(default)]
    pub action_bar: Option<String>,
    /// Let 1.20.5+ clients arrive through a Transfer packet.
    #[serde(default)]
    pub accept_transfers: bool,
    #[serde(default)]
    pub server_list: ServerListConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub forwarding: ForwardingConfig,
    #[serde(default)]
    pub tab_list: Option<TabListConfig>,
    #[serde(default)]
    pub boss_bar: Option<BossBarConfig>,
    #[serde(default)]
    pub title: Option<TitleConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ProtocolConfig {
    /// Protocol numbers to accept; empty means every version with tables.
    #[serde(default)]
    pub supported_versions: Vec<i32>,
    /// Negative disables compression.
    #[serde(default = "default_compression_threshold")]
    pub compression_threshold: i32,
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
    #[serde(default = "default_max_frame_length")]
    pub max_frame_length: usize,
    #[serde(default = "default_keep_alive_interval")]
    pub keep_alive_interval_secs: u64,
    #[serde(default = "default_keep_alive_timeout")]
    pub keep_alive_timeout_secs: u64,
    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,
    #[serde(default = "default_login_timeout")]
    pub login_timeout_secs: u64,
    #[serde(default)]
    pub encryption: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldType {
    Flat,
    Void,
}

#[derive(Debug, Deserialize)]
pub struct SpawnConfig {
    #[serde(default)]
    pub x: f64,
    #[serde(default = "default_spawn_y")]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
}

#[derive(Debug, Deserialize)]
pub struct WorldConfig {
    #[serde(rename = "type", default = "default_world_type")]
    pub world_type: WorldType,
    #[serde(default = "default_dimension")]
    pub dimension: Dimension,
    #[serde(default)]
    pub spawn: SpawnConfig,
    #[serde(default = "default_game_mode")]
    pub game_mode: GameMode,
    #[serde(default)]
    pub hardcore: bool,
    #[serde(default = "default_view_distance")]
    pub view_distance: i32,
    #[serde(default = "default_time_of_day")]
    pub time_of_day: i64,
    /// Players falling below this Y are sent back to spawn.
    #[serde(default)]
    pub min_y: Option<f64>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardingMode {
    #[default]
    None,
    Legacy,
    BungeeGuard,
    Velocity,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForwardingConfig {
    #[serde(default)]
    pub mode: ForwardingMode,
    /// Accepted BungeeGuard tokens.
    #[serde(default)]
    pub tokens: Vec<String>,
    /// Velocity's `forwarding.secret`.
    #[serde(default)]
    pub secret: String,
}

#[derive(Debug, Deserialize)]
pub struct ServerListConfig {
    /// A 64x64 PNG. Skipped when the file does not exist.
    #[serde(default = "default_server_icon")]
    pub server_icon: PathBuf,
    /// When off, status pings get no answer and the server looks offline.
    #[serde(default = "default_true")]
    pub reply_to_status: bool,
}

/// Names players type for each command, without the slash. An empty name
/// turns the command off.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    pub spawn: String,
    pub fly: String,
    pub fly_speed: String,
    pub transfer: String,
    pub reconfigure: String,
}

#[derive(Debug, Deserialize)]
pub struct TabListConfig {
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub footer: String,
}

#[derive(Debug, Deserialize)]
pub struct BossBarConfig {
    pub text: String,
    #[serde(default = "default_health")]
    pub health: f32,
    #[serde(default = "default_boss_bar_color")]
    pub color: BossBarColor,
    #[serde(default = "default_boss_bar_division")]
    pub division: BossBarDivision,
}

#[derive(Debug, Deserialize)]
pub struct TitleConfig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default = "default_fade_in")]
    pub fade_in: i32,
    #[serde(default = "default_stay")]
    pub stay: i32,
    #[serde(default = "default_fade_out")]
    pub fade_out: i32,
}

fn default_true() -> bool {
    true
}

fn default_server_icon() -> PathBuf {
    PathBuf::from("server-icon.png")
}

fn default_bind() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    25565
}

fn default_max_players() -> u32 {
    100
}

fn default_motd() -> String {
    "A Limbo Server".into()
}

fn default_brand() -> String {
    "limbo".into()
}

fn default_compression_threshold() -> i32 {
    256
}

fn default_compression_level() -> u32 {
    6
}

fn default_max_frame_length() -> usize {
    DEFAULT_MAX_FRAME_LEN
}

fn default_keep_alive_interval() -> u64 {
    15
}

fn default_keep_alive_timeout() -> u64 {
    30
}

fn default_write_timeout() -> u64 {
    10
}

fn default_login_timeout() -> u64 {
    30
}

fn default_world_type() -> WorldType {
    WorldType::Flat
}

fn default_dimension() -> Dimension {
    Dimension::Overworld
}

fn default_spawn_y() -> f64 {
    -60.0
}

fn default_game_mode() -> GameMode {
    GameMode::Adventure
}

fn default_view_distance() -> i32 {
    2
}

fn default_time_of_day() -> i64 {
    6000
}

fn default_health() -> f32 {
    1.0
}

fn default_boss_bar_color() -> BossBarColor {
    BossBarColor::Purple
}

fn default_boss_bar_division() -> BossBarDivision {
    BossBarDivision::None
}

fn default_fade_in() -> i32 {
    10
}

fn default_stay() -> i32 {
    70
}

fn default_fade_out() -> i32 {
    20
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            supported_versions: Vec::new(),
            compression_threshold: default_compression_threshold(),
            compression_level: default_compression_level(),
            max_frame_length: default_max_frame_length(),
            keep_alive_interval_secs: default_keep_alive_interval(),
            keep_alive_timeout_secs: default_keep_alive_timeout(),
            write_timeout_secs: default_write_timeout(),
            login_timeout_secs: default_login_timeout(),
            encryption: false,
        }
    }
}

impl Default for ServerListConfig {
    fn default() -> Self {
        Self {
            server_icon: default_server_icon(),
            reply_to_status: true,
        }
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            spawn: "spawn".into(),
            fly: "fly".into(),
            fly_speed: "flyspeed".into(),
            transfer: "transfer".into(),
            reconfigure: "reconfigure".into(),
        }
    }
}

impl CommandsConfig {
    fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        let names = [
            &self.spawn,
            &self.fly,
            &self.fly_speed,
            &self.transfer,
            &self.reconfigure,
        ];
        for name in names.into_iter().filter(|n| !n.is_empty()) {
            if name.contains(|c: char| c.is_whitespace() || c == '/') {
                bail!("commands: {:?} must be a single word without a slash", name);
            }
            if !seen.insert(name) {
                bail!("commands: {:?} is used for two commands", name);
            }
        }
        Ok(())
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: default_spawn_y(),
            z: 0.0,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_type: default_world_type(),
            dimension: default_dimension(),
            spawn: SpawnConfig::default(),
            game_mode: default_game_mode(),
            hardcore: false,
            view_distance: default_view_distance(),
            time_of_day: default_time_of_day(),
            min_y: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            max_players: default_max_players(),
            motd: default_motd(),
            brand: default_brand(),
            welcome_message: None,
            action_bar: None,
            accept_transfers: false,
            server_list: ServerListConfig::default(),
            commands: CommandsConfig::default(),
            protocol: ProtocolConfig::default(),
            world: WorldConfig::default(),
            forwarding: ForwardingConfig::default(),
            tab_list: None,
            boss_bar: None,
            title: None,
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Self::from_toml(&contents, |name| std::env::var(name).ok())
                .with_context(|| format!("parsing {}", path.display()))
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parse a config file after substituting `${NAME}` placeholders with
    /// `lookup(NAME)`.
    pub fn from_toml(
        contents: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let expanded = expand_placeholders(contents, lookup)?;
        Ok(toml::from_str(&expanded)?)
    }

    /// Validate and freeze into the values sessions read.
    pub fn into_settings(self) -> anyhow::Result<Settings> {
        let supported_versions = if self.protocol.supported_versions.is_empty() {
            SUPPORTED_VERSIONS.to_vec()
        } else {
            let mut versions: Vec<ProtocolVersion> = self
                .protocol
                .supported_versions
                .iter()
                .map(|&v| ProtocolVersion(v))
                .collect();
            versions.sort();
            versions.dedup();
            versions
        };

        if self.protocol.keep_alive_interval_secs == 0 {
            bail!("protocol.keep_alive_interval_secs must be positive");
        }
        if self.protocol.keep_alive_timeout_secs < self.protocol.keep_alive_interval_secs {
            bail!("protocol.keep_alive_timeout_secs must not be shorter than the interval");
        }
        if self.protocol.compression_level > 9 {
            bail!("protocol.compression_level must be between 0 and 9");
        }
        if self.world.view_distance < 0 {
            bail!("world.view_distance must not be negative");
        }
        if self.forwarding.mode == ForwardingMode::BungeeGuard && self.forwarding.tokens.is_empty()
        {
            bail!("forwarding.mode = \"bungee_guard\" needs at least one token");
        }
        if self.forwarding.mode == ForwardingMode::Velocity && self.forwarding.secret.is_empty() {
            bail!("forwarding.mode = \"velocity\" needs a secret");
        }
        self.commands.validate()?;

        let compression = usize::try_from(self.protocol.compression_threshold)
            .ok()
            .map(|threshold| CompressionSettings {
                threshold,
                level: self.protocol.compression_level,
            });

        let spawn = Vec3d::new(self.world.spawn.x, self.world.spawn.y, self.world.spawn.z);
        let world = WorldMetadata {
            dimension: self.world.dimension,
            spawn,
            spawn_yaw: self.world.spawn.yaw,
            spawn_pitch: self.world.spawn.pitch,
            game_mode: self.world.game_mode,
            hardcore: self.world.hardcore,
            time_of_day: self.world.time_of_day,
            is_flat: matches!(self.world.world_type, WorldType::Flat),
        };

        let title = match self.title {
            Some(t) if t.title.is_some() || t.subtitle.is_some() => Some(TitleSettings {
                title: optional_text("title.title", t.title)?,
                subtitle: optional_text("title.subtitle", t.subtitle)?,
                fade_in: t.fade_in,
                stay: t.stay,
                fade_out: t.fade_out,
            }),
            _ => None,
        };
        let tab_list = match self.tab_list {
            Some(t) => Some((
                text("tab_list.header", &t.header)?,
                text("tab_list.footer", &t.footer)?,
            )),
            None => None,
        };
        let boss_bar = match self.boss_bar {
            Some(b) => Some(BossBarSettings {
                title: text("boss_bar.text", &b.text)?,
                health: b.health.clamp(0.0, 1.0),
                color: b.color,
                division: b.division,
            }),
            None => None,
        };
        let favicon = load_favicon(&self.server_list.server_icon)?;

        Ok(Settings {
            bind: self.bind,
            port: self.port,
            max_players: self.max_players,
            motd: text("motd", &self.motd)?,
            brand: self.brand,
            welcome_message: optional_text("welcome_message", self.welcome_message)?,
            action_bar: optional_text("action_bar", self.action_bar)?,
            favicon,
            reply_to_status: self.server_list.reply_to_status,
            accept_transfers: self.accept_transfers,
            commands: self.commands,
            supported_versions,
            compression,
            max_frame_length: self.protocol.max_frame_length,
            keep_alive_interval: Duration::from_secs(self.protocol.keep_alive_interval_secs),
            keep_alive_timeout: Duration::from_secs(self.protocol.keep_alive_timeout_secs),
            write_timeout: Duration::from_secs(self.protocol.write_timeout_secs),
            login_timeout: Duration::from_secs(self.protocol.login_timeout_secs),
            encryption: self.protocol.encryption,
            world_type: self.world.world_type,
            world,
            view_distance: self.world.view_distance,
            min_y: self.world.min_y,
            forwarding_mode: self.forwarding.mode,
            forwarding_tokens: self.forwarding.tokens,
            forwarding_secret: self.forwarding.secret,
            tab_list,
            boss_bar,
            title,
        })
    }
}

/// Config text is MiniMessage markup.
fn text(field: &str, value: &str) -> anyhow::Result<TextComponent> {
    parse_mini_message(value).with_context(|| format!("{} is not valid MiniMessage", field))
}

fn optional_text(field: &str, value: Option<String>) -> anyhow::Result<Option<TextComponent>> {
    value.map(|v| text(field, &v)).transpose()
}

/// The status response's `favicon` value, or `None` without an icon file.
fn load_favicon(path: &Path) -> anyhow::Result<Option<String>> {
    if path.as_os_str().is_empty() || !path.exists() {
        return Ok(None);
    }
    let bytes =
        std::fs::read(path).with_context(|| format!("reading server icon {}", path.display()))?;
    encode_favicon(&bytes)
        .map(Some)
        .with_context(|| format!("loading server icon {}", path.display()))
}

fn encode_favicon(bytes: &[u8]) -> anyhow::Result<String> {
    if !bytes.starts_with(&PNG_SIGNATURE) {
        bail!("not a PNG image");
    }
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
}

#[derive(Debug, Clone)]
pub struct BossBarSettings {
    pub title: TextComponent,
    pub health: f32,
    pub color: BossBarColor,
    pub division: BossBarDivision,
}

#[derive(Debug, Clone)]
pub struct TitleSettings {
    pub title: Option<TextComponent>,
    pub subtitle: Option<TextComponent>,
    pub fade_in: i32,
    pub stay: i32,
    pub fade_out: i32,
}

/// Validated, immutable configuration shared by every session.
#[derive(Debug)]
pub struct Settings {
    pub bind: String,
    pub port: u16,
    pub max_players: u32,
    pub motd: TextComponent,
    pub brand: String,
    pub welcome_message: Option<TextComponent>,
    pub action_bar: Option<TextComponent>,
    /// `data:image/png;base64,...`
    pub favicon: Option<String>,
    pub reply_to_status: bool,
    pub accept_transfers: bool,
    pub commands: CommandsConfig,
    pub supported_versions: Vec<ProtocolVersion>,
    /// `None` leaves compression off.
    pub compression: Option<CompressionSettings>,
    pub max_frame_length: usize,
    pub keep_alive_interval: Duration,
    pub keep_alive_timeout: Duration,
    pub write_timeout: Duration,
    /// Upper bound on how long a client may sit silent before Play.
    pub login_timeout: Duration,
    pub encryption: bool,
    pub world_type: WorldType,
    pub world: WorldMetadata,
    pub view_distance: i32,
    pub min_y: Option<f64>,
    pub forwarding_mode: ForwardingMode,
    pub forwarding_tokens: Vec<String>,
    pub forwarding_secret: String,
    pub tab_list: Option<(TextComponent, TextComponent)>,
    pub boss_bar: Option<BossBarSettings>,
    pub title: Option<TitleSettings>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ServerConfig::default().into_settings().unwrap();
        assert_eq!(settings.port, 25565);
        assert_eq!(settings.supported_versions, SUPPORTED_VERSIONS.to_vec());
        assert_eq!(settings.compression.map(|c| c.threshold), Some(256));
        assert!(!settings.encryption);
        assert_eq!(settings.forwarding_mode, ForwardingMode::None);
        assert!(settings.title.is_none());
    }

    #[test]
    fn test_parse_full_file() {
        let config: ServerConfig = toml::from_str(
            r#"
            port = 30000
            motd = "Hold tight"
            welcome_message = "Welcome!"

            [protocol]
            supported_versions = [767, 47]
            compression_threshold = -1
            encryption = true

            [world]
            type = "void"
            dimension = "the_end"
            game_mode = "spectator"
            min_y = -10.0
            spawn = { x = 8.5, y = 100.0, z = 8.5 }

            [forwarding]
            mode = "bungee_guard"
            tokens = ["secret"]

            [boss_bar]
            text = "Queue"
            color = "red"
            division = "notches10"

            [title]
            subtitle = "please wait"
            "#,
        )
        .unwrap();
        let settings = config.into_settings().unwrap();
        assert_eq!(settings.port, 30000);
        assert_eq!(
            settings.supported_versions,
            vec![ProtocolVersion::V1_8, ProtocolVersion::V1_21]
        );
        assert!(settings.compression.is_none());
        assert!(settings.encryption);
        assert!(matches!(settings.world_type, WorldType::Void));
        assert_eq!(settings.world.dimension, Dimension::End);
        assert_eq!(settings.world.game_mode, GameMode::Spectator);
        assert_eq!(settings.world.spawn, Vec3d::new(8.5, 100.0, 8.5));
        assert_eq!(settings.min_y, Some(-10.0));
        assert_eq!(settings.forwarding_mode, ForwardingMode::BungeeGuard);
        assert_eq!(settings.boss_bar.unwrap().color, BossBarColor::Red);
        let title = settings.title.unwrap();
        assert!(title.title.is_none());
        assert_eq!(
            title.subtitle.map(|s| s.to_plain()).as_deref(),
            Some("please wait")
        );
    }

    #[test]
    fn test_bungee_guard_needs_tokens() {
        let config: ServerConfig = toml::from_str("[forwarding]\nmode = \"bungee_guard\"").unwrap();
        assert!(config.into_settings().is_err());
    }

    #[test]
    fn test_velocity_needs_secret() {
        let config: ServerConfig = toml::from_str("[forwarding]\nmode = \"velocity\"").unwrap();
        assert!(config.into_settings().is_err());
        let config: ServerConfig =
            toml::from_str("[forwarding]\nmode = \"velocity\"\nsecret = \"abc\"").unwrap();
        let settings = config.into_settings().unwrap();
        assert_eq!(settings.forwarding_mode, ForwardingMode::Velocity);
        assert_eq!(settings.forwarding_secret, "abc");
    }

    #[test]
    fn test_texts_are_mini_message() {
        let config: ServerConfig = toml::from_str(
            r#"
            motd = "<gold>Limbo</gold> <gray>waiting room"
            action_bar = "<b>Queued</b>"

            [tab_list]
            header = "<aqua>Header"
            footer = "plain footer"

            [boss_bar]
            text = "<red><st>Queue</st></red>"
            "#,
        )
        .unwrap();
        let settings = config.into_settings().unwrap();
        assert_eq!(settings.motd.to_plain(), "Limbo waiting room");
        assert_eq!(settings.motd.extra[0].color.as_deref(), Some("gold"));
        assert_eq!(settings.motd.extra[2].color.as_deref(), Some("gray"));
        assert_eq!(settings.action_bar.unwrap().extra[0].bold, Some(true));
        let (header, footer) = settings.tab_list.unwrap();
        assert_eq!(header.extra[0].color.as_deref(), Some("aqua"));
        assert_eq!(footer.to_plain(), "plain footer");
        let bar = settings.boss_bar.unwrap().title;
        assert_eq!(bar.extra[0].strikethrough, Some(true));
        assert_eq!(bar.extra[0].color.as_deref(), Some("red"));
    }

    #[test]
    fn test_bad_markup_fails_loading() {
        let config: ServerConfig = toml::from_str(r#"motd = "Fish &nbsp; chips""#).unwrap();
        let err = config.into_settings().unwrap_err();
        assert!(format!("{:#}", err).contains("motd"));
    }

    #[test]
    fn test_server_icon() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(b"rest of the image");
        let path = std::env::temp_dir().join(format!("limbo-icon-{}.png", std::process::id()));
        std::fs::write(&path, &png).unwrap();

        let mut config = ServerConfig::default();
        config.server_list.server_icon = path.clone();
        let favicon = config.into_settings().unwrap().favicon.unwrap();
        assert!(favicon.starts_with("data:image/png;base64,iVBORw0KGgo"));
        assert_eq!(
            STANDARD
                .decode(favicon.trim_start_matches("data:image/png;base64,"))
                .unwrap(),
            png
        );

        std::fs::write(&path, b"GIF89a").unwrap();
        let mut config = ServerConfig::default();
        config.server_list.server_icon = path.clone();
        assert!(config.into_settings().is_err());
        std::fs::remove_file(&path).unwrap();

        let mut config = ServerConfig::default();
        config.server_list.server_icon = path;
        assert!(config.into_settings().unwrap().favicon.is_none());
    }

    #[test]
    fn test_status_and_transfer_switches() {
        let settings = ServerConfig::default().into_settings().unwrap();
        assert!(settings.reply_to_status);
        assert!(!settings.accept_transfers);

        let config: ServerConfig = toml::from_str(
            r#"
            accept_transfers = true

            [server_list]
            reply_to_status = false
            "#,
        )
        .unwrap();
        let settings = config.into_settings().unwrap();
        assert!(!settings.reply_to_status);
        assert!(settings.accept_transfers);
    }

    #[test]
    fn test_env_placeholders() {
        let env = |name: &str| match name {
            "LIMBO_PORT" => Some("30001".to_string()),
            "LIMBO_SECRET" => Some("from-env".to_string()),
            _ => None,
        };
        let config = ServerConfig::from_toml(
            r#"
            port = ${LIMBO_PORT}
            motd = "costs \${5}"

            [forwarding]
            mode = "velocity"
            secret = "${LIMBO_SECRET}"
            "#,
            env,
        )
        .unwrap();
        assert_eq!(config.port, 30001);
        assert_eq!(config.motd, "costs ${5}");
        assert_eq!(config.forwarding.secret, "from-env");

        let err = ServerConfig::from_toml("port = ${LIMBO_MISSING}", env).unwrap_err();
        assert!(err.to_string().contains("LIMBO_MISSING"));
    }

    #[test]
    fn test_sample_config_loads() {
        let sample = include_str!("../../../config/server.toml");
        let config = ServerConfig::from_toml(sample, |_| None).unwrap();
        let settings = config.into_settings().unwrap();
        assert_eq!(settings.motd.to_plain(), "A Limbo Server");
        assert_eq!(settings.commands, CommandsConfig::default());
    }

    #[test]
    fn test_command_names() {
        let config: ServerConfig = toml::from_str(
            r#"
            [commands]
            fly = "soar"
            transfer = ""
            "#,
        )
        .unwrap();
        let settings = config.into_settings().unwrap();
        assert_eq!(settings.commands.fly, "soar");
        assert_eq!(settings.commands.spawn, "spawn");
        assert!(settings.commands.transfer.is_empty());

        for bad in ["fly = \"spawn\"", "fly = \"go up\"", "fly = \"/fly\""] {
            let config: ServerConfig = toml::from_str(&format!("[commands]\n{}", bad)).unwrap();
            assert!(config.into_settings().is_err(), "{} accepted", bad);
        }
    }
}
