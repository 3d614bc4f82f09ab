use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::{AutoMount, WidgetConfig};
use crate::controller::{ControllerPolicy, WidgetController};
use crate::timer::{Clock, SystemClock};

/// Attachment identifiers already claimed in the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountRegistry {
    attached: BTreeSet<String>,
}

impl MountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.attached.contains(id)
    }

    /// Claims `id`; returns false when it was already claimed.
    pub fn register(&mut self, id: impl Into<String>) -> bool {
        self.attached.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.attached.iter().map(String::as_str)
    }
}

/// Where a widget instance is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentPoint {
    pub id: String,
    /// True for the registry-guarded point, false for the always-rendered one.
    pub guarded: bool,
}

/// A controller bound to its attachment point, ready for the host to render.
pub struct MountedWidget {
    pub attachment: AttachmentPoint,
    pub controller: WidgetController,
}

pub enum MountOutcome {
    Mounted(MountedWidget),
    /// The reserved point already exists; nothing was created.
    AlreadyMounted { id: String },
}

impl MountOutcome {
    pub fn is_mounted(&self) -> bool {
        matches!(self, Self::Mounted(_))
    }

    pub fn into_mounted(self) -> Option<MountedWidget> {
        match self {
            Self::Mounted(widget) => Some(widget),
            Self::AlreadyMounted { .. } => None,
        }
    }
}

/// Creates widget instances for a host while keeping the guarded one unique.
pub struct Bootstrap {
    config: WidgetConfig,
    clock: Arc<dyn Clock>,
    registry: MountRegistry,
    initialized: bool,
}

impl Bootstrap {
    pub fn new(config: WidgetConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(config: WidgetConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            registry: MountRegistry::new(),
            initialized: false,
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn registry(&self) -> &MountRegistry {
        &self.registry
    }

    pub fn is_mounted(&self) -> bool {
        self.registry.contains(&self.config.reserved_id)
    }

    /// Mounts the guarded widget unless its reserved point already exists.
    pub fn mount(&mut self) -> MountOutcome {
        let id = self.config.reserved_id.clone();
        if self.registry.contains(&id) {
            tracing::warn!(attachment = %id, "Chat widget is already mounted.");
            return MountOutcome::AlreadyMounted { id };
        }

        self.registry.register(id.clone());
        tracing::info!(attachment = %id, "mounted chat widget");
        MountOutcome::Mounted(self.bind(id, true))
    }

    /// Runs the module-load path once.
    ///
    /// Yields the always-rendered primary instance when enabled, followed by the
    /// guarded instance when mounting is immediate.
    pub fn initialize(&mut self) -> Vec<MountedWidget> {
        if self.initialized {
            tracing::debug!("chat widget bootstrap already initialized");
            return Vec::new();
        }
        self.initialized = true;

        let mut widgets = Vec::new();
        if self.config.render_primary {
            let id = self.config.primary_id.clone();
            tracing::info!(attachment = %id, "rendering primary chat widget");
            widgets.push(self.bind(id, false));
        }
        if self.config.auto_mount == AutoMount::Immediate {
            widgets.extend(self.mount().into_mounted());
        }
        widgets
    }

    /// Host-ready signal; mounts when configured to wait for it.
    pub fn document_ready(&mut self) -> Option<MountedWidget> {
        if self.config.auto_mount != AutoMount::OnReady {
            return None;
        }
        self.mount().into_mounted()
    }

    fn bind(&self, id: String, guarded: bool) -> MountedWidget {
        let controller =
            WidgetController::new(ControllerPolicy::from(&self.config), self.clock.clone());
        MountedWidget {
            attachment: AttachmentPoint { id, guarded },
            controller,
        }
    }
}
