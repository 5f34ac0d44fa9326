use std::sync::{Arc, Mutex};

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rrg_location::{
    EventSender, Fix, LocationPermission, LocationPlatform, LocationRequestConfig, PlatformEvent,
    ServicesStatus, SettingsStatus, WatchId, prelude::Result,
};
use tauri::{AppHandle, plugin::PermissionState};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons};
use tauri_plugin_geolocation::{
    GeolocationExt, PermissionStatus, PermissionType, Position, PositionOptions, WatchEvent,
};

/// Longest we'll wait on the platform for a last-known fix
const LAST_KNOWN_TIMEOUT_MS: u32 = 1000;
/// Timeout for each fix in an update stream
const WATCH_TIMEOUT_MS: u32 = 10000;

/// Location through the geolocation plugin, which wraps the OS's fused provider on mobile
pub struct TauriLocationPlatform(AppHandle);

impl TauriLocationPlatform {
    pub fn new(app: AppHandle) -> Self {
        Self(app)
    }
}

fn position_options(config: &LocationRequestConfig, timeout: u32, maximum_age: u32) -> PositionOptions {
    PositionOptions {
        enable_high_accuracy: config.high_accuracy(),
        timeout,
        maximum_age,
    }
}

fn fix_from_position(pos: Position) -> Fix {
    let coords = pos.coords;
    Fix {
        lat: coords.latitude,
        long: coords.longitude,
        accuracy: Some(coords.accuracy),
        heading: coords.heading,
        timestamp: DateTime::from_timestamp_millis(pos.timestamp as i64).unwrap_or_else(Utc::now),
    }
}

fn permission_type(perm: LocationPermission) -> PermissionType {
    match perm {
        LocationPermission::Fine => PermissionType::Location,
        LocationPermission::Coarse => PermissionType::CoarseLocation,
    }
}

fn permission_state(status: &PermissionStatus, perm: LocationPermission) -> &PermissionState {
    match perm {
        LocationPermission::Fine => &status.location,
        LocationPermission::Coarse => &status.coarse_location,
    }
}

fn is_granted(status: &PermissionStatus, perm: LocationPermission) -> bool {
    matches!(permission_state(status, perm), PermissionState::Granted)
}

/// An update from a watch before it's been tagged with the watch's id
enum WatchUpdate {
    Fix(Fix),
    Error(String),
}

impl WatchUpdate {
    fn tagged(self, id: WatchId) -> PlatformEvent {
        match self {
            Self::Fix(fix) => PlatformEvent::Fix(id, fix),
            Self::Error(why) => PlatformEvent::FixError(id, why),
        }
    }
}

enum WatchTag {
    /// Still waiting on the plugin to hand back the id
    Pending(Vec<WatchUpdate>),
    Known(WatchId),
}

/// Forwards updates from a watch to the helper. The plugin can start delivering positions
/// before `watch_position` returns the id, those are held until [WatchTagger::assign].
struct WatchTagger {
    events: EventSender,
    tag: Mutex<WatchTag>,
}

impl WatchTagger {
    fn new(events: EventSender) -> Self {
        Self {
            events,
            tag: Mutex::new(WatchTag::Pending(vec![])),
        }
    }

    fn send(&self, event: PlatformEvent) {
        if self.events.send(event).is_err() {
            debug!("Helper gone, dropping location update");
        }
    }

    fn deliver(&self, update: WatchUpdate) {
        let Ok(mut tag) = self.tag.lock() else {
            warn!("Watch tag lock poisoned, dropping location update");
            return;
        };
        match &mut *tag {
            WatchTag::Pending(held) => held.push(update),
            WatchTag::Known(id) => self.send(update.tagged(*id)),
        }
    }

    fn assign(&self, id: WatchId) {
        let Ok(mut tag) = self.tag.lock() else {
            warn!("Watch tag lock poisoned, can't tag watch {id}");
            return;
        };
        if let WatchTag::Pending(held) = std::mem::replace(&mut *tag, WatchTag::Known(id)) {
            if !held.is_empty() {
                debug!("Forwarding {} early update(s) for watch {id}", held.len());
            }
            for update in held {
                self.send(update.tagged(id));
            }
        }
    }
}

/// The plugin rejects permission checks when the device's location toggle is off
fn services_disabled(why: &impl std::fmt::Display) -> bool {
    why.to_string().to_ascii_lowercase().contains("disabled")
}

impl LocationPlatform for TauriLocationPlatform {
    async fn services_status(&self) -> ServicesStatus {
        // The plugin ships its own provider, there's no separate service to connect to
        ServicesStatus::Connected
    }

    async fn check_settings(&self, config: &LocationRequestConfig) -> SettingsStatus {
        debug!("Checking location settings for {:?}", config.priority);
        match self.0.geolocation().check_permissions() {
            Ok(_) => SettingsStatus::Satisfied,
            Err(why) if services_disabled(&why) => SettingsStatus::ResolutionRequired,
            Err(why) => {
                warn!("Location settings check failed: {why:?}");
                SettingsStatus::Unavailable
            }
        }
    }

    async fn start_settings_resolution(&self, request_code: i32, events: EventSender) -> Result {
        let app = self.0.clone();
        self.0
            .dialog()
            .message("Turn on your device's location, then press OK to continue.")
            .title("Location is off")
            .buttons(MessageDialogButtons::OkCancel)
            .show(move |confirmed| {
                let resolved = confirmed && app.geolocation().check_permissions().is_ok();
                if events
                    .send(PlatformEvent::SettingsResolution {
                        request_code,
                        resolved,
                    })
                    .is_err()
                {
                    debug!("Helper gone, dropping settings resolution");
                }
            });
        Ok(())
    }

    async fn has_permissions(&self, perms: &[LocationPermission]) -> bool {
        match self.0.geolocation().check_permissions() {
            Ok(status) => perms.iter().all(|p| is_granted(&status, *p)),
            Err(why) => {
                warn!("Couldn't check location permissions: {why:?}");
                false
            }
        }
    }

    async fn request_permissions(
        &self,
        request_code: i32,
        rationale: &str,
        perms: &[LocationPermission],
        events: EventSender,
    ) {
        info!("Requesting location permissions: {rationale}");
        let app = self.0.clone();
        let perms = perms.to_vec();

        // The prompt blocks until the user answers, the answer comes back as an event
        tauri::async_runtime::spawn_blocking(move || {
            let types = perms.iter().copied().map(permission_type).collect();
            let (granted, denied) = match app.geolocation().request_permissions(Some(types)) {
                Ok(status) => perms.iter().copied().partition(|p| is_granted(&status, *p)),
                Err(why) => {
                    warn!("Permission request failed: {why:?}");
                    (vec![], perms.clone())
                }
            };
            if events
                .send(PlatformEvent::PermissionsResult {
                    request_code,
                    granted,
                    denied,
                })
                .is_err()
            {
                debug!("Helper gone, dropping permission result");
            }
        });
    }

    async fn permanently_denied(&self, perms: &[LocationPermission]) -> bool {
        match self.0.geolocation().check_permissions() {
            Ok(status) => perms
                .iter()
                .any(|p| matches!(permission_state(&status, *p), PermissionState::Denied)),
            Err(_) => false,
        }
    }

    async fn last_location(&self, config: &LocationRequestConfig) -> Result<Option<Fix>> {
        let app = self.0.clone();
        let options = position_options(config, LAST_KNOWN_TIMEOUT_MS, config.max_last_known_age_ms);
        let res = tauri::async_runtime::spawn_blocking(move || {
            app.geolocation().get_current_position(Some(options))
        })
        .await
        .context("Last location task failed")?;

        match res {
            Ok(pos) => Ok(Some(fix_from_position(pos))),
            Err(why) if why.to_string().to_ascii_lowercase().contains("permission") => {
                bail!("Not allowed to get location: {why}")
            }
            Err(why) => {
                debug!("No last known location: {why:?}");
                Ok(None)
            }
        }
    }

    async fn request_location_updates(
        &self,
        config: &LocationRequestConfig,
        events: EventSender,
    ) -> Result<WatchId> {
        let options = position_options(config, WATCH_TIMEOUT_MS, 0);
        let tagger = Arc::new(WatchTagger::new(events));

        let id = self
            .0
            .geolocation()
            .watch_position(options, {
                let tagger = tagger.clone();
                move |event| {
                    tagger.deliver(match event {
                        WatchEvent::Position(pos) => WatchUpdate::Fix(fix_from_position(pos)),
                        WatchEvent::Error(why) => WatchUpdate::Error(why),
                    })
                }
            })
            .context("Failed to watch position")?;

        tagger.assign(id);
        Ok(id)
    }

    async fn remove_location_updates(&self, id: WatchId) {
        if let Err(why) = self.0.geolocation().clear_watch(id) {
            warn!("Failed to clear location watch {id}: {why:?}");
        }
    }
}
