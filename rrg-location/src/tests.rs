use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicU32, Ordering},
};

use anyhow::bail;
use chrono::Utc;

use crate::{
    Fix, LocationPermission, LocationPlatform, LocationRequestConfig, LocationUi, PlatformEvent,
    ServicesStatus, SettingsStatus, UiMessage, WatchId,
    platform::EventSender,
    prelude::*,
};

pub fn mk_fix(accuracy: Option<f64>) -> Fix {
    Fix {
        lat: 42.3601,
        long: -71.0589,
        accuracy,
        heading: None,
        timestamp: Utc::now(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What the fake user does when prompted for permissions
pub enum PermissionAnswer {
    Grant,
    Deny,
    DenyForever,
}

pub struct MockPlatform {
    pub services: ServicesStatus,
    pub settings: SettingsStatus,
    /// Whether the user fixes their settings when prompted
    pub resolve_settings: bool,
    pub granted: AtomicBool,
    pub answer: PermissionAnswer,
    pub last_known: Option<Fix>,
    /// Fail last location and subscription requests like a revoked permission would
    pub fail_requests: bool,
    pub(crate) settings_resolved: AtomicBool,
    pub(crate) denied_forever: AtomicBool,
    pub(crate) next_watch: AtomicU32,
    pub(crate) total_watches: AtomicU32,
    pub(crate) permission_requests: AtomicU32,
    pub(crate) resolution_requests: AtomicU32,
    pub(crate) watches: Mutex<Vec<(WatchId, EventSender)>>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self {
            services: ServicesStatus::Connected,
            settings: SettingsStatus::Satisfied,
            resolve_settings: true,
            granted: AtomicBool::new(true),
            answer: PermissionAnswer::Grant,
            last_known: None,
            fail_requests: false,
            settings_resolved: AtomicBool::new(false),
            denied_forever: AtomicBool::new(false),
            next_watch: AtomicU32::new(1),
            total_watches: AtomicU32::new(0),
            permission_requests: AtomicU32::new(0),
            resolution_requests: AtomicU32::new(0),
            watches: Mutex::new(Vec::new()),
        }
    }
}

impl MockPlatform {
    pub fn with_permission_answer(answer: PermissionAnswer) -> Self {
        Self {
            granted: AtomicBool::new(false),
            answer,
            ..Default::default()
        }
    }

    /// Deliver a fix to the newest subscription, returns false if nobody is subscribed
    pub fn push_fix(&self, fix: Fix) -> bool {
        let watches = self.watches.lock().unwrap();
        if let Some((id, tx)) = watches.last() {
            tx.send(PlatformEvent::Fix(*id, fix)).is_ok()
        } else {
            false
        }
    }

    pub fn active_subscriptions(&self) -> usize {
        self.watches.lock().unwrap().len()
    }

    pub fn total_subscriptions(&self) -> u32 {
        self.total_watches.load(Ordering::SeqCst)
    }

    pub fn permission_requests(&self) -> u32 {
        self.permission_requests.load(Ordering::SeqCst)
    }

    pub fn resolution_requests(&self) -> u32 {
        self.resolution_requests.load(Ordering::SeqCst)
    }
}

impl LocationPlatform for MockPlatform {
    async fn services_status(&self) -> ServicesStatus {
        self.services
    }

    async fn check_settings(&self, _config: &LocationRequestConfig) -> SettingsStatus {
        if self.settings_resolved.load(Ordering::SeqCst) {
            SettingsStatus::Satisfied
        } else {
            self.settings
        }
    }

    async fn start_settings_resolution(&self, request_code: i32, events: EventSender) -> Result {
        self.resolution_requests.fetch_add(1, Ordering::SeqCst);
        self.settings_resolved
            .store(self.resolve_settings, Ordering::SeqCst);
        events
            .send(PlatformEvent::SettingsResolution {
                request_code,
                resolved: self.resolve_settings,
            })
            .context("Helper went away")
    }

    async fn has_permissions(&self, _perms: &[LocationPermission]) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    async fn request_permissions(
        &self,
        request_code: i32,
        _rationale: &str,
        perms: &[LocationPermission],
        events: EventSender,
    ) {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        let event = match self.answer {
            PermissionAnswer::Grant => {
                self.granted.store(true, Ordering::SeqCst);
                PlatformEvent::PermissionsResult {
                    request_code,
                    granted: perms.to_vec(),
                    denied: vec![],
                }
            }
            PermissionAnswer::Deny | PermissionAnswer::DenyForever => {
                self.denied_forever.store(
                    self.answer == PermissionAnswer::DenyForever,
                    Ordering::SeqCst,
                );
                PlatformEvent::PermissionsResult {
                    request_code,
                    granted: vec![],
                    denied: perms.to_vec(),
                }
            }
        };
        events.send(event).ok();
    }

    async fn permanently_denied(&self, _perms: &[LocationPermission]) -> bool {
        self.denied_forever.load(Ordering::SeqCst)
    }

    async fn last_location(&self, _config: &LocationRequestConfig) -> Result<Option<Fix>> {
        if self.fail_requests {
            bail!("Location permission revoked");
        }
        Ok(self.last_known)
    }

    async fn request_location_updates(
        &self,
        _config: &LocationRequestConfig,
        events: EventSender,
    ) -> Result<WatchId> {
        if self.fail_requests {
            bail!("Location permission revoked");
        }
        let id = self.next_watch.fetch_add(1, Ordering::SeqCst);
        self.total_watches.fetch_add(1, Ordering::SeqCst);
        self.watches.lock().unwrap().push((id, events));
        Ok(id)
    }

    async fn remove_location_updates(&self, id: WatchId) {
        self.watches.lock().unwrap().retain(|(w, _)| *w != id);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    ShowProgress,
    DismissProgress,
    Toast(UiMessage),
    SetSearch(UiMessage),
    ClearSearch,
    SettingsRedirect(i32),
    ServicesError(i32, i32),
    CloseScreen,
}

#[derive(Default)]
pub struct RecordingUi {
    calls: Mutex<Vec<UiCall>>,
}

impl RecordingUi {
    fn record(&self, call: UiCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<UiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &UiCall) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }
}

impl LocationUi for RecordingUi {
    fn show_progress(&self) {
        self.record(UiCall::ShowProgress);
    }

    fn dismiss_progress(&self) {
        self.record(UiCall::DismissProgress);
    }

    fn toast(&self, msg: UiMessage) {
        self.record(UiCall::Toast(msg));
    }

    fn set_search_text(&self, msg: UiMessage) {
        self.record(UiCall::SetSearch(msg));
    }

    fn clear_search(&self) {
        self.record(UiCall::ClearSearch);
    }

    fn show_settings_redirect(&self, request_code: i32) {
        self.record(UiCall::SettingsRedirect(request_code));
    }

    fn show_services_error(&self, error_code: i32, request_code: i32) {
        self.record(UiCall::ServicesError(error_code, request_code));
    }

    fn close_screen(&self) {
        self.record(UiCall::CloseScreen);
    }
}
