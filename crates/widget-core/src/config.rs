use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, ensure};

use crate::error::{ConfigResult, ExtractSnafu, InvalidValueSnafu};
use crate::message::{DEFAULT_ACKNOWLEDGEMENT, DEFAULT_GREETING};

pub const DEFAULT_REPLY_DELAY_MS: u64 = 1000;
/// Identifier of the guarded attachment point.
pub const CHAT_ROOT_ID: &str = "chat-root";
/// Identifier of the always-present host attachment point.
pub const PRIMARY_ROOT_ID: &str = "root";
pub const CONFIG_DIRECTORY_NAME: &str = "chat-widget";
pub const CONFIG_FILE_NAME: &str = "widget.json";
pub const ENV_PREFIX: &str = "CHAT_WIDGET_";

/// How the conversation panel is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationMode {
    /// Centered overlay over a dimmed backdrop.
    #[default]
    Modal,
    /// Panel anchored above the launcher button.
    Popover,
}

impl PresentationMode {
    /// Whether closing hands focus back to what held it before opening.
    pub fn restores_focus(self) -> bool {
        matches!(self, Self::Modal)
    }
}

/// When the guarded widget mounts without an explicit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoMount {
    /// While the bootstrap initializes.
    Immediate,
    /// Once the host reports it is ready.
    #[default]
    OnReady,
    /// Only through the mount entry point.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub reply_delay_ms: u64,
    pub clear_on_close: bool,
    pub presentation: PresentationMode,
    pub greeting: String,
    pub acknowledgement: String,
    pub reserved_id: String,
    pub primary_id: String,
    pub auto_mount: AutoMount,
    pub render_primary: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: DEFAULT_REPLY_DELAY_MS,
            clear_on_close: false,
            presentation: PresentationMode::Modal,
            greeting: DEFAULT_GREETING.to_string(),
            acknowledgement: DEFAULT_ACKNOWLEDGEMENT.to_string(),
            reserved_id: CHAT_ROOT_ID.to_string(),
            primary_id: PRIMARY_ROOT_ID.to_string(),
            auto_mount: AutoMount::OnReady,
            render_primary: false,
        }
    }
}

impl WidgetConfig {
    /// Anchored popover that discards the transcript on close.
    pub fn popover() -> Self {
        Self {
            presentation: PresentationMode::Popover,
            clear_on_close: true,
            ..Self::default()
        }
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    /// Layers defaults, an optional JSON file, then `CHAT_WIDGET_*` env vars.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Json::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load_from(path: Option<&Path>) -> ConfigResult<Self> {
        let config = Self::figment(path)
            .extract::<Self>()
            .context(ExtractSnafu {
                stage: "extract-widget-config",
                path: path.map(Path::to_path_buf),
            })?;
        config.normalized().validated()
    }

    pub fn normalized(mut self) -> Self {
        self.reserved_id = self.reserved_id.trim().to_string();
        self.primary_id = self.primary_id.trim().to_string();
        self
    }

    pub fn validated(self) -> ConfigResult<Self> {
        ensure!(
            self.reply_delay_ms > 0,
            InvalidValueSnafu {
                stage: "validate-widget-config",
                field: "reply_delay_ms",
                details: "reply delay must be positive",
            }
        );
        ensure!(
            !self.reserved_id.is_empty(),
            InvalidValueSnafu {
                stage: "validate-widget-config",
                field: "reserved_id",
                details: "reserved attachment id must not be blank",
            }
        );
        ensure!(
            self.reserved_id != self.primary_id,
            InvalidValueSnafu {
                stage: "validate-widget-config",
                field: "primary_id",
                details: format!("`{}` is already the reserved attachment id", self.primary_id),
            }
        );
        ensure!(
            !self.greeting.trim().is_empty(),
            InvalidValueSnafu {
                stage: "validate-widget-config",
                field: "greeting",
                details: "greeting must not be blank",
            }
        );
        ensure!(
            !self.acknowledgement.trim().is_empty(),
            InvalidValueSnafu {
                stage: "validate-widget-config",
                field: "acknowledgement",
                details: "acknowledgement must not be blank",
            }
        );
        Ok(self)
    }
}

/// Shared, swappable widget configuration.
pub struct WidgetSettingsStore {
    config: Arc<ArcSwap<WidgetConfig>>,
    config_path: PathBuf,
}

impl WidgetSettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(CONFIG_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".chat-widget"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(CONFIG_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let config = Self::load_or_default(&config_path);
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config(&self) -> Arc<WidgetConfig> {
        self.config.load_full()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Re-reads the file; keeps the current config if it no longer parses.
    pub fn reload(&self) -> ConfigResult<()> {
        let config = WidgetConfig::load_from(Some(&self.config_path))?;
        self.config.store(Arc::new(config));
        tracing::info!("reloaded widget config from {:?}", self.config_path);
        Ok(())
    }

    pub fn replace(&self, config: WidgetConfig) -> ConfigResult<()> {
        let config = config.normalized().validated()?;
        self.config.store(Arc::new(config));
        Ok(())
    }

    fn load_or_default(path: &Path) -> WidgetConfig {
        if !path.exists() {
            tracing::info!("widget config not found at {:?}, using defaults", path);
        }

        match WidgetConfig::load_from(Some(path)) {
            Ok(config) => config,
            Err(error) => {
                tracing::warn!("{}. using default widget config", error);
                WidgetConfig::default()
            }
        }
    }
}
