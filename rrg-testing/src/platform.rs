use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicU32, Ordering},
};

use chrono::Utc;
use log::{debug, info};
use rrg_location::{
    EventSender, Fix, LocationPermission, LocationPlatform, LocationRequestConfig, PlatformEvent,
    ServicesStatus, SettingsStatus, WatchId,
};

use crate::{Scenario, SimPermission, SimServices, SimSettings, prelude::*};

// Error codes the real services report for "update required" and "invalid"
const SERVICE_VERSION_UPDATE_REQUIRED: i32 = 2;
const SERVICE_INVALID: i32 = 9;

const SIM_LAT: f64 = 37.7749;
const SIM_LONG: f64 = -122.4194;

/// A fake device driven by a [Scenario]
pub struct SimPlatform {
    services: SimServices,
    settings: SimSettings,
    resolve_settings: bool,
    answer: SimPermission,
    last_known: Option<Fix>,
    fail_requests: bool,
    settings_resolved: AtomicBool,
    granted: AtomicBool,
    denied_forever: AtomicBool,
    next_watch: AtomicU32,
    total_watches: AtomicU32,
    permission_prompts: AtomicU32,
    settings_prompts: AtomicU32,
    watch: Mutex<Option<(WatchId, EventSender)>>,
}

fn sim_fix(accuracy: Option<f64>) -> Fix {
    Fix {
        lat: SIM_LAT,
        long: SIM_LONG,
        accuracy,
        heading: None,
        timestamp: Utc::now(),
    }
}

impl SimPlatform {
    pub fn new(scenario: &Scenario) -> Self {
        Self {
            services: scenario.services,
            settings: scenario.settings,
            resolve_settings: scenario.resolve_settings,
            answer: scenario.permission,
            last_known: scenario.last_known_accuracy.map(|acc| sim_fix(Some(acc))),
            fail_requests: scenario.fail_requests,
            settings_resolved: AtomicBool::new(false),
            granted: AtomicBool::new(scenario.permission == SimPermission::Granted),
            denied_forever: AtomicBool::new(false),
            next_watch: AtomicU32::new(1),
            total_watches: AtomicU32::new(0),
            permission_prompts: AtomicU32::new(0),
            settings_prompts: AtomicU32::new(0),
            watch: Mutex::new(None),
        }
    }

    /// Deliver a fix on the running subscription, returns false if there isn't one
    pub fn push_fix(&self, accuracy: Option<f64>) -> bool {
        let Ok(watch) = self.watch.lock() else {
            return false;
        };
        match watch.as_ref() {
            Some((id, tx)) => {
                debug!("Delivering fix ({accuracy:?}m) on watch {id}");
                tx.send(PlatformEvent::Fix(*id, sim_fix(accuracy))).is_ok()
            }
            None => false,
        }
    }

    pub fn total_subscriptions(&self) -> u32 {
        self.total_watches.load(Ordering::SeqCst)
    }

    pub fn permission_prompts(&self) -> u32 {
        self.permission_prompts.load(Ordering::SeqCst)
    }

    pub fn settings_prompts(&self) -> u32 {
        self.settings_prompts.load(Ordering::SeqCst)
    }
}

impl LocationPlatform for SimPlatform {
    async fn services_status(&self) -> ServicesStatus {
        match self.services {
            SimServices::Connected => ServicesStatus::Connected,
            SimServices::Resolvable => ServicesStatus::Resolvable(SERVICE_VERSION_UPDATE_REQUIRED),
            SimServices::Unavailable => ServicesStatus::Unavailable(SERVICE_INVALID),
        }
    }

    async fn check_settings(&self, config: &LocationRequestConfig) -> SettingsStatus {
        debug!(
            "Checking settings for {:?} every {}ms",
            config.priority, config.interval_ms
        );
        if self.settings_resolved.load(Ordering::SeqCst) {
            return SettingsStatus::Satisfied;
        }
        match self.settings {
            SimSettings::Satisfied => SettingsStatus::Satisfied,
            SimSettings::ResolutionRequired => SettingsStatus::ResolutionRequired,
            SimSettings::Unavailable => SettingsStatus::Unavailable,
        }
    }

    async fn start_settings_resolution(&self, request_code: i32, events: EventSender) -> Result {
        self.settings_prompts.fetch_add(1, Ordering::SeqCst);
        info!(
            "Settings prompt shown, user {}",
            if self.resolve_settings { "accepts" } else { "declines" }
        );
        self.settings_resolved
            .store(self.resolve_settings, Ordering::SeqCst);
        events
            .send(PlatformEvent::SettingsResolution {
                request_code,
                resolved: self.resolve_settings,
            })
            .context("Helper stopped listening")
    }

    async fn has_permissions(&self, _perms: &[LocationPermission]) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    async fn request_permissions(
        &self,
        request_code: i32,
        rationale: &str,
        perms: &[LocationPermission],
        events: EventSender,
    ) {
        self.permission_prompts.fetch_add(1, Ordering::SeqCst);
        info!("Permission prompt shown: {rationale}");

        let granted = matches!(self.answer, SimPermission::Granted | SimPermission::Grant);
        self.granted.store(granted, Ordering::SeqCst);
        self.denied_forever
            .store(self.answer == SimPermission::DenyForever, Ordering::SeqCst);

        let (granted, denied) = if granted {
            (perms.to_vec(), vec![])
        } else {
            (vec![], perms.to_vec())
        };

        events
            .send(PlatformEvent::PermissionsResult {
                request_code,
                granted,
                denied,
            })
            .ok();
    }

    async fn permanently_denied(&self, _perms: &[LocationPermission]) -> bool {
        self.denied_forever.load(Ordering::SeqCst)
    }

    async fn last_location(&self, _config: &LocationRequestConfig) -> Result<Option<Fix>> {
        if self.fail_requests {
            bail!("Simulated permission revocation");
        }
        Ok(self.last_known)
    }

    async fn request_location_updates(
        &self,
        _config: &LocationRequestConfig,
        events: EventSender,
    ) -> Result<WatchId> {
        if self.fail_requests {
            bail!("Simulated permission revocation");
        }
        let id = self.next_watch.fetch_add(1, Ordering::SeqCst);
        self.total_watches.fetch_add(1, Ordering::SeqCst);
        let mut watch = self
            .watch
            .lock()
            .map_err(|_| anyhow!("Watch lock poisoned"))?;
        *watch = Some((id, events));
        Ok(id)
    }

    async fn remove_location_updates(&self, id: WatchId) {
        if let Ok(mut watch) = self.watch.lock() {
            if watch.as_ref().is_some_and(|(w, _)| *w == id) {
                *watch = None;
            }
        }
    }
}
