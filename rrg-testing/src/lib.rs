mod platform;

use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use log::info;
use rrg_location::{Fix, LocationHelper, LocationRequestConfig, LocationUi, UiMessage};
use serde::{Deserialize, Serialize};

pub use platform::SimPlatform;

pub mod prelude {
    pub use anyhow::{Context, anyhow, bail};
    pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;
}

pub use prelude::*;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SimServices {
    #[default]
    Connected,
    Resolvable,
    Unavailable,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SimSettings {
    #[default]
    Satisfied,
    ResolutionRequired,
    Unavailable,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
/// Permission state on the simulated device, and what the user does when prompted
pub enum SimPermission {
    /// Already granted, no prompt
    #[default]
    Granted,
    /// Grants when prompted
    Grant,
    /// Denies when prompted, can be asked again
    Deny,
    /// Denies and checks "never ask again"
    DenyForever,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
/// Scripted behavior for the simulated device
pub struct Scenario {
    pub services: SimServices,
    pub settings: SimSettings,
    /// Whether the user fixes their settings when prompted
    pub resolve_settings: bool,
    pub permission: SimPermission,
    /// Accuracy of the fix the platform already knows about, if there is one
    pub last_known_accuracy: Option<f64>,
    /// Accuracies of the fixes the update stream delivers, in order, `null` for none reported
    pub fixes: Vec<Option<f64>>,
    /// Hit cancel on the progress indicator after this many fixes are delivered
    pub cancel_after: Option<usize>,
    /// Make fix requests fail like a revoked permission would
    pub fail_requests: bool,
    pub config: LocationRequestConfig,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            services: SimServices::default(),
            settings: SimSettings::default(),
            resolve_settings: true,
            permission: SimPermission::default(),
            last_known_accuracy: None,
            fixes: vec![],
            cancel_after: None,
            fail_requests: false,
            config: LocationRequestConfig::default(),
        }
    }
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        serde_json::from_str(&raw).context("Failed to parse scenario")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Something the helper did to the screen
pub enum UiEvent {
    ShowProgress,
    DismissProgress,
    Toast(String),
    SearchText(String),
    ClearSearch,
    SettingsRedirect(i32),
    ServicesError(i32, i32),
    CloseScreen,
}

#[derive(Default, Clone)]
pub struct ConsoleUi(Arc<Mutex<Vec<UiEvent>>>);

impl ConsoleUi {
    fn push(&self, event: UiEvent) {
        info!("UI: {event:?}");
        if let Ok(mut events) = self.0.lock() {
            events.push(event);
        }
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.0.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl LocationUi for ConsoleUi {
    fn show_progress(&self) {
        self.push(UiEvent::ShowProgress);
    }

    fn dismiss_progress(&self) {
        self.push(UiEvent::DismissProgress);
    }

    fn toast(&self, msg: UiMessage) {
        self.push(UiEvent::Toast(msg.text().to_string()));
    }

    fn set_search_text(&self, msg: UiMessage) {
        self.push(UiEvent::SearchText(msg.text().to_string()));
    }

    fn clear_search(&self) {
        self.push(UiEvent::ClearSearch);
    }

    fn show_settings_redirect(&self, request_code: i32) {
        self.push(UiEvent::SettingsRedirect(request_code));
    }

    fn show_services_error(&self, error_code: i32, request_code: i32) {
        self.push(UiEvent::ServicesError(error_code, request_code));
    }

    fn close_screen(&self) {
        self.push(UiEvent::CloseScreen);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// What happened over a simulated run
pub struct SimReport {
    pub accepted: Option<Fix>,
    pub gps_mode: bool,
    pub subscriptions: u32,
    pub permission_prompts: u32,
    pub settings_prompts: u32,
    /// Fixes that were sent to an active subscription
    pub delivered: usize,
    pub ui: Vec<UiEvent>,
}

type SimHelper = LocationHelper<SimPlatform, ConsoleUi>;

/// Let the helper's main loop drain everything it's been sent. Time must be paused, sleeping
/// only advances the clock once every other task is idle.
async fn settle(config: &LocationRequestConfig) {
    tokio::time::sleep(Duration::from_millis(config.fastest_interval_ms.max(1) as u64)).await;
}

/// Run a scenario from start to finish. Must be called on a current-thread runtime as the
/// clock gets paused.
pub async fn run_scenario(scenario: Scenario) -> Result<SimReport> {
    tokio::time::pause();

    let ui = ConsoleUi::default();
    let helper: Arc<SimHelper> = Arc::new(LocationHelper::new(
        scenario.config.clone(),
        SimPlatform::new(&scenario),
        ui.clone(),
    ));
    let platform = helper.platform();

    let main_loop = tokio::spawn({
        let helper = helper.clone();
        async move { helper.main_loop().await }
    });

    info!("Starting location updates");
    helper.start_location_updates().await;
    settle(&scenario.config).await;

    let mut delivered = 0;
    for (i, accuracy) in scenario.fixes.iter().enumerate() {
        if platform.push_fix(*accuracy) {
            delivered += 1;
        } else {
            info!("Fix {i} ({accuracy:?}m) has no subscriber");
        }
        settle(&scenario.config).await;

        if scenario.cancel_after == Some(i + 1) {
            info!("Cancelling acquisition");
            helper.cancel().await;
        }
    }

    let state = helper.clone_state().await;

    helper.quit();
    main_loop.await.context("Helper main loop panicked")?;

    Ok(SimReport {
        accepted: state.current,
        gps_mode: state.gps_mode,
        subscriptions: platform.total_subscriptions(),
        permission_prompts: platform.permission_prompts(),
        settings_prompts: platform.settings_prompts(),
        delivered,
        ui: ui.events(),
    })
}
