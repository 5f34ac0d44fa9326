use log::{debug, error, info, warn};
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::{
    fix::Fix,
    permissions::{
        DEFAULT_SETTINGS_REQ_CODE, LocationPermission, PERMISSIONS, RC_LOCATION_PERM,
        REQUEST_CHECK_SETTINGS, SERVICES_RESOLUTION_REQUEST_CODE,
    },
    platform::{
        EventReceiver, EventSender, LocationPlatform, PlatformEvent, ServicesStatus,
        SettingsStatus, WatchId, event_channel,
    },
    settings::LocationRequestConfig,
    ui::{LocationUi, UiMessage},
};

#[derive(Debug, Clone, Default, PartialEq)]
/// Everything the helper tracks about the current acquisition
pub struct AcquisitionState {
    /// The last fix we accepted
    pub current: Option<Fix>,
    /// Whether the user is searching around their own location instead of a typed one
    pub gps_mode: bool,
    /// Whether an incoming fix should be looked at
    pub awaiting_fix: bool,
    /// The update stream we're subscribed to, if any
    pub subscription: Option<WatchId>,
}

/// Gets a single good-enough fix for the screen hosting it. Talks to the device through
/// [LocationPlatform] and reports progress through [LocationUi].
///
/// Platform callbacks come in as [PlatformEvent]s and are handled one at a time by
/// [LocationHelper::main_loop], which should be running for as long as the screen is alive.
pub struct LocationHelper<P: LocationPlatform, U: LocationUi> {
    state: Mutex<AcquisitionState>,
    config: RwLock<LocationRequestConfig>,
    platform: P,
    ui: U,
    events: (EventSender, Mutex<EventReceiver>),
    cancel: CancellationToken,
}

impl<P: LocationPlatform, U: LocationUi> LocationHelper<P, U> {
    pub fn new(config: LocationRequestConfig, platform: P, ui: U) -> Self {
        let (tx, rx) = event_channel();
        Self {
            state: Mutex::new(AcquisitionState::default()),
            config: RwLock::new(config),
            platform,
            ui,
            events: (tx, Mutex::new(rx)),
            cancel: CancellationToken::new(),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Get a sender hosts can use to forward platform results (permission prompts, settings
    /// dialogs) to the helper
    pub fn event_sender(&self) -> EventSender {
        self.events.0.clone()
    }

    /// The last accepted fix, if any
    pub async fn get_location(&self) -> Option<Fix> {
        self.state.lock().await.current
    }

    pub async fn uses_gps(&self) -> bool {
        self.state.lock().await.gps_mode
    }

    pub async fn clone_state(&self) -> AcquisitionState {
        self.state.lock().await.clone()
    }

    pub async fn clone_config(&self) -> LocationRequestConfig {
        self.config.read().await.clone()
    }

    /// Replace the request config, takes effect on the next acquisition
    pub async fn update_config(&self, config: LocationRequestConfig) {
        *self.config.write().await = config;
    }

    /// Begin getting a fix, starting with checking device settings
    pub async fn start_location_updates(&self) {
        let mut state = self.state.lock().await;
        self.check_settings(&mut state).await;
    }

    /// Stop listening for fixes when the screen goes to the background, keeps the current fix
    pub async fn pause_and_save_location_updates(&self) {
        let mut state = self.state.lock().await;
        self.ui.dismiss_progress();
        self.stop_location_updates(&mut state).await;
    }

    /// Forget the current fix and stop listening for new ones
    pub async fn dismiss_location_updater(&self) {
        let mut state = self.state.lock().await;
        self.dismiss(&mut state).await;
    }

    /// The user hit cancel on the progress indicator
    pub async fn cancel(&self) {
        let mut state = self.state.lock().await;
        self.dismiss(&mut state).await;
        state.gps_mode = false;
    }

    /// A fix was delivered, returns whether it was accepted
    pub async fn on_location_changed(&self, fix: Fix) -> bool {
        let mut state = self.state.lock().await;
        self.handle_fix(&mut state, fix).await
    }

    /// The user granted location permissions from a prompt
    pub async fn on_permissions_granted(&self, request_code: i32, perms: &[LocationPermission]) {
        debug!("Permissions granted: {request_code}:{}", perms.len());
        if request_code != RC_LOCATION_PERM {
            return;
        }
        let mut state = self.state.lock().await;
        self.request_location(&mut state).await;
    }

    /// The user denied location permissions from a prompt
    pub async fn on_permissions_denied(&self, request_code: i32, perms: &[LocationPermission]) {
        debug!("Permissions denied: {request_code}:{}", perms.len());
        if request_code != RC_LOCATION_PERM {
            return;
        }
        let _state = self.state.lock().await;
        if self.platform.permanently_denied(perms).await {
            info!("Location permission permanently denied, directing user to settings");
            self.ui.show_settings_redirect(DEFAULT_SETTINGS_REQ_CODE);
        }
    }

    /// The settings resolution flow finished, restart acquisition if the user fixed their
    /// settings
    pub async fn on_settings_resolution_result(&self, request_code: i32, resolved: bool) {
        if request_code != REQUEST_CHECK_SETTINGS {
            return;
        }
        let mut state = self.state.lock().await;
        if resolved {
            info!("Location settings resolved, restarting");
            self.check_settings(&mut state).await;
        } else {
            info!("User declined to change location settings");
            state.gps_mode = false;
        }
    }

    async fn check_settings(&self, state: &mut AcquisitionState) {
        let config = self.clone_config().await;
        match self.platform.check_settings(&config).await {
            SettingsStatus::Satisfied => self.request_location(state).await,
            SettingsStatus::ResolutionRequired => {
                info!("Location settings need changing, prompting user");
                if let Err(why) = self
                    .platform
                    .start_settings_resolution(REQUEST_CHECK_SETTINGS, self.event_sender())
                    .await
                {
                    warn!("Couldn't start settings resolution: {why:?}");
                }
            }
            SettingsStatus::Unavailable => {
                warn!("Location settings can't satisfy the request");
                self.ui.toast(UiMessage::SettingsInadequate);
            }
        }
    }

    async fn request_location(&self, state: &mut AcquisitionState) {
        match self.platform.services_status().await {
            ServicesStatus::Resolvable(code) => {
                warn!("Location services unavailable ({code}), user can resolve");
                self.ui
                    .show_services_error(code, SERVICES_RESOLUTION_REQUEST_CODE);
            }
            ServicesStatus::Unavailable(code) => {
                error!("Location services unavailable ({code}), closing screen");
                self.ui.close_screen();
            }
            ServicesStatus::Connected => {
                if self.platform.has_permissions(&PERMISSIONS).await {
                    self.acquire(state).await;
                } else {
                    info!("Location permissions missing, requesting");
                    self.platform
                        .request_permissions(
                            RC_LOCATION_PERM,
                            UiMessage::PermissionRequired.text(),
                            &PERMISSIONS,
                            self.event_sender(),
                        )
                        .await;
                }
            }
        }
    }

    async fn acquire(&self, state: &mut AcquisitionState) {
        let config = self.clone_config().await;

        self.ui.show_progress();
        state.gps_mode = true;
        state.awaiting_fix = true;

        match self.platform.last_location(&config).await {
            Ok(Some(fix)) => {
                debug!("Using last known fix");
                self.handle_fix(state, fix).await;
            }
            Ok(None) => {
                if let Some(old) = state.subscription.take() {
                    self.platform.remove_location_updates(old).await;
                }
                match self
                    .platform
                    .request_location_updates(&config, self.event_sender())
                    .await
                {
                    Ok(id) => {
                        debug!("Subscribed to location updates ({id})");
                        state.subscription = Some(id);
                    }
                    Err(why) => self.abandon_gps(state, why),
                }
            }
            Err(why) => self.abandon_gps(state, why),
        }
    }

    fn abandon_gps(&self, state: &mut AcquisitionState, why: anyhow::Error) {
        warn!("Couldn't request a fix, disabling GPS: {why:?}");
        state.gps_mode = false;
        state.awaiting_fix = false;
        self.ui.dismiss_progress();
    }

    async fn handle_fix(&self, state: &mut AcquisitionState, fix: Fix) -> bool {
        if !state.awaiting_fix {
            debug!("Not waiting for a fix, ignoring");
            return false;
        }

        let threshold = self.config.read().await.accuracy_threshold_meters;
        if !fix.accurate_within(threshold) {
            debug!("Rejecting fix with accuracy {:?}", fix.accuracy);
            return false;
        }

        info!("Location acquired: {:?}m", fix.accuracy);
        state.current = Some(fix);
        state.awaiting_fix = false;
        self.ui.dismiss_progress();
        self.ui.toast(UiMessage::LocationAcquired);
        self.ui.set_search_text(UiMessage::CurrentLocation);
        if let Some(id) = state.subscription.take() {
            self.platform.remove_location_updates(id).await;
        }
        true
    }

    async fn stop_location_updates(&self, state: &mut AcquisitionState) {
        state.awaiting_fix = false;
        if let Some(id) = state.subscription.take() {
            if self.platform.is_connected().await {
                self.platform.remove_location_updates(id).await;
            } else {
                debug!("Services disconnected, subscription {id} already gone");
            }
        }
    }

    async fn dismiss(&self, state: &mut AcquisitionState) {
        state.current = None;
        self.ui.dismiss_progress();
        self.stop_location_updates(state).await;
        self.ui.clear_search();
    }

    async fn consume_event(&self, event: PlatformEvent) {
        match event {
            PlatformEvent::Fix(id, fix) => {
                let mut state = self.state.lock().await;
                if state.subscription != Some(id) {
                    debug!("Dropping fix from stale subscription {id}");
                    return;
                }
                self.handle_fix(&mut state, fix).await;
            }
            PlatformEvent::FixError(id, why) => {
                warn!("Location updates ({id}) reported an error: {why}");
            }
            PlatformEvent::PermissionsResult {
                request_code,
                granted,
                denied,
            } => {
                if denied.is_empty() {
                    self.on_permissions_granted(request_code, &granted).await;
                } else {
                    self.on_permissions_denied(request_code, &denied).await;
                }
            }
            PlatformEvent::SettingsResolution {
                request_code,
                resolved,
            } => {
                self.on_settings_resolution_result(request_code, resolved)
                    .await;
            }
        }
    }

    /// Stop [LocationHelper::main_loop], call when the hosting screen is destroyed
    pub fn quit(&self) {
        self.cancel.cancel();
    }

    /// Handle platform events until [LocationHelper::quit] is called, stops any running
    /// subscription on the way out
    pub async fn main_loop(&self) {
        let mut rx = self.events.1.lock().await;

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    break;
                }

                event = rx.recv() => {
                    match event {
                        Some(event) => self.consume_event(event).await,
                        None => break,
                    }
                }
            }
        }

        let mut state = self.state.lock().await;
        self.stop_location_updates(&mut state).await;
    }

    /// Handle every event that's already queued, without waiting for more
    #[cfg(test)]
    async fn process_pending(&self) {
        loop {
            let event = self.events.1.lock().await.try_recv();
            match event {
                Ok(event) => self.consume_event(event).await,
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tests::{MockPlatform, PermissionAnswer, RecordingUi, UiCall, mk_fix};
    use tokio::{task::yield_now, test};

    type TestHelper = LocationHelper<MockPlatform, RecordingUi>;

    fn mk_helper(platform: MockPlatform) -> TestHelper {
        LocationHelper::new(LocationRequestConfig::default(), platform, RecordingUi::default())
    }

    #[test]
    async fn test_inaccurate_fix_never_accepted() {
        let helper = mk_helper(MockPlatform::default());

        helper.start_location_updates().await;
        assert!(helper.platform.push_fix(mk_fix(Some(200.0))));
        assert!(helper.platform.push_fix(mk_fix(Some(1500.0))));
        assert!(helper.platform.push_fix(mk_fix(None)));
        helper.process_pending().await;

        assert_eq!(helper.get_location().await, None);
        assert_eq!(helper.ui.count(&UiCall::Toast(UiMessage::LocationAcquired)), 0);
        assert_eq!(helper.ui.count(&UiCall::SetSearch(UiMessage::CurrentLocation)), 0);
        assert_eq!(helper.platform.active_subscriptions(), 1);
        assert!(helper.clone_state().await.awaiting_fix);
    }

    #[test]
    async fn test_accurate_fix_accepted_once() {
        let helper = mk_helper(MockPlatform::default());

        helper.start_location_updates().await;
        assert!(helper.ui.calls().contains(&UiCall::ShowProgress));

        let first = mk_fix(Some(35.0));
        assert!(helper.platform.push_fix(mk_fix(Some(400.0))));
        assert!(helper.platform.push_fix(first));
        helper.process_pending().await;

        assert_eq!(helper.get_location().await, Some(first));
        assert!(helper.uses_gps().await);
        assert_eq!(helper.ui.count(&UiCall::Toast(UiMessage::LocationAcquired)), 1);
        assert_eq!(helper.ui.count(&UiCall::SetSearch(UiMessage::CurrentLocation)), 1);
        assert_eq!(helper.ui.calls().last(), Some(&UiCall::SetSearch(UiMessage::CurrentLocation)));
        assert_eq!(helper.platform.active_subscriptions(), 0);

        // Subscription is gone, a late delivery has nowhere to go and a direct one is ignored
        assert!(!helper.platform.push_fix(mk_fix(Some(5.0))));
        assert!(!helper.on_location_changed(mk_fix(Some(5.0))).await);
        assert_eq!(helper.get_location().await, Some(first));
        assert_eq!(helper.ui.count(&UiCall::Toast(UiMessage::LocationAcquired)), 1);
    }

    #[test]
    async fn test_stale_subscription_dropped() {
        let helper = mk_helper(MockPlatform::default());

        helper.start_location_updates().await;
        let stale = helper.clone_state().await.subscription.expect("Not subscribed");

        helper.pause_and_save_location_updates().await;
        helper.start_location_updates().await;

        helper
            .event_sender()
            .send(PlatformEvent::Fix(stale, mk_fix(Some(10.0))))
            .expect("Failed to send");
        helper.process_pending().await;

        assert_eq!(helper.get_location().await, None);
        assert!(helper.clone_state().await.awaiting_fix);
    }

    #[test]
    async fn test_cancel_mid_acquisition() {
        let helper = mk_helper(MockPlatform::default());

        helper.start_location_updates().await;
        assert!(helper.uses_gps().await);

        helper.cancel().await;

        let state = helper.clone_state().await;
        assert_eq!(state.current, None);
        assert!(!state.gps_mode);
        assert!(!state.awaiting_fix);
        assert_eq!(state.subscription, None);
        assert_eq!(helper.platform.active_subscriptions(), 0);
        assert!(helper.ui.calls().contains(&UiCall::ClearSearch));

        assert!(!helper.on_location_changed(mk_fix(Some(10.0))).await);
        assert_eq!(helper.get_location().await, None);
    }

    #[test]
    async fn test_cancel_clears_accepted_fix() {
        let platform = MockPlatform {
            last_known: Some(mk_fix(Some(12.0))),
            ..Default::default()
        };
        let helper = mk_helper(platform);

        helper.start_location_updates().await;
        assert!(helper.get_location().await.is_some());

        helper.cancel().await;

        assert_eq!(helper.get_location().await, None);
        assert!(!helper.uses_gps().await);
    }

    #[test]
    async fn test_last_known_fix_skips_subscription() {
        let last = mk_fix(Some(20.0));
        let platform = MockPlatform {
            last_known: Some(last),
            ..Default::default()
        };
        let helper = mk_helper(platform);

        helper.start_location_updates().await;

        assert_eq!(helper.get_location().await, Some(last));
        assert_eq!(helper.platform.total_subscriptions(), 0);
        assert_eq!(helper.ui.count(&UiCall::DismissProgress), 1);
    }

    #[test]
    async fn test_inaccurate_last_known_fix_skips_subscription() {
        let platform = MockPlatform {
            last_known: Some(mk_fix(Some(900.0))),
            ..Default::default()
        };
        let helper = mk_helper(platform);

        helper.start_location_updates().await;

        assert_eq!(helper.get_location().await, None);
        assert_eq!(helper.platform.total_subscriptions(), 0);

        // Still waiting with the indicator up until the user cancels
        let state = helper.clone_state().await;
        assert!(state.awaiting_fix);
        assert!(state.gps_mode);
        assert_eq!(state.subscription, None);
        assert_eq!(helper.ui.calls(), vec![UiCall::ShowProgress]);

        helper.cancel().await;
        assert!(!helper.clone_state().await.awaiting_fix);
        assert!(helper.ui.calls().contains(&UiCall::DismissProgress));
    }

    #[test]
    async fn test_configured_threshold_applies() {
        let config = LocationRequestConfig {
            accuracy_threshold_meters: 50.0,
            ..Default::default()
        };
        let helper = LocationHelper::new(config, MockPlatform::default(), RecordingUi::default());

        helper.start_location_updates().await;
        // Good enough for the default threshold but not this one
        assert!(helper.platform.push_fix(mk_fix(Some(120.0))));
        assert!(helper.platform.push_fix(mk_fix(Some(50.0))));
        helper.process_pending().await;

        assert_eq!(helper.get_location().await, None);
        assert_eq!(helper.platform.active_subscriptions(), 1);

        let fix = mk_fix(Some(30.0));
        assert!(helper.platform.push_fix(fix));
        helper.process_pending().await;

        assert_eq!(helper.get_location().await, Some(fix));
        assert_eq!(helper.platform.active_subscriptions(), 0);
    }

    #[test]
    async fn test_permanent_denial_redirects_to_settings() {
        let platform = MockPlatform::with_permission_answer(PermissionAnswer::DenyForever);
        let helper = mk_helper(platform);

        helper.start_location_updates().await;
        helper.process_pending().await;

        assert_eq!(
            helper.ui.calls(),
            vec![UiCall::SettingsRedirect(DEFAULT_SETTINGS_REQ_CODE)]
        );
        assert_eq!(helper.platform.permission_requests(), 1);
        assert!(!helper.uses_gps().await);
    }

    #[test]
    async fn test_temporary_denial_does_not_redirect() {
        let platform = MockPlatform::with_permission_answer(PermissionAnswer::Deny);
        let helper = mk_helper(platform);

        helper.start_location_updates().await;
        helper.process_pending().await;

        assert!(helper.ui.calls().is_empty());
        assert_eq!(helper.platform.permission_requests(), 1);

        // Re-triggering asks again
        helper.start_location_updates().await;
        helper.process_pending().await;
        assert_eq!(helper.platform.permission_requests(), 2);
    }

    #[test]
    async fn test_grant_continues_acquisition() {
        let platform = MockPlatform::with_permission_answer(PermissionAnswer::Grant);
        let helper = mk_helper(platform);

        helper.start_location_updates().await;
        assert!(!helper.uses_gps().await);

        helper.process_pending().await;

        assert!(helper.uses_gps().await);
        assert_eq!(helper.platform.active_subscriptions(), 1);
        assert!(helper.ui.calls().contains(&UiCall::ShowProgress));
    }

    #[test]
    async fn test_permission_result_wrong_code_ignored() {
        let helper = mk_helper(MockPlatform::default());

        helper
            .on_permissions_granted(RC_LOCATION_PERM + 1, &PERMISSIONS)
            .await;
        helper
            .on_permissions_denied(RC_LOCATION_PERM + 1, &PERMISSIONS)
            .await;

        assert!(helper.ui.calls().is_empty());
        assert_eq!(helper.platform.total_subscriptions(), 0);
    }

    #[test]
    async fn test_settings_unavailable_toasts() {
        let platform = MockPlatform {
            settings: SettingsStatus::Unavailable,
            ..Default::default()
        };
        let helper = mk_helper(platform);

        helper.start_location_updates().await;

        assert_eq!(
            helper.ui.calls(),
            vec![UiCall::Toast(UiMessage::SettingsInadequate)]
        );
        assert!(!helper.uses_gps().await);
        assert_eq!(helper.platform.total_subscriptions(), 0);
    }

    #[test]
    async fn test_settings_resolution_restarts() {
        let platform = MockPlatform {
            settings: SettingsStatus::ResolutionRequired,
            resolve_settings: true,
            ..Default::default()
        };
        let helper = mk_helper(platform);

        helper.start_location_updates().await;
        assert_eq!(helper.platform.resolution_requests(), 1);
        assert!(!helper.uses_gps().await);

        helper.process_pending().await;

        assert!(helper.uses_gps().await);
        assert_eq!(helper.platform.active_subscriptions(), 1);
    }

    #[test]
    async fn test_settings_resolution_declined() {
        let platform = MockPlatform {
            settings: SettingsStatus::ResolutionRequired,
            resolve_settings: false,
            ..Default::default()
        };
        let helper = mk_helper(platform);

        helper.start_location_updates().await;
        helper.process_pending().await;

        assert!(!helper.uses_gps().await);
        assert_eq!(helper.platform.total_subscriptions(), 0);
        assert_eq!(helper.platform.resolution_requests(), 1);
    }

    #[test]
    async fn test_settings_resolution_wrong_code_ignored() {
        let helper = mk_helper(MockPlatform::default());

        helper
            .on_settings_resolution_result(REQUEST_CHECK_SETTINGS + 1, true)
            .await;

        assert!(helper.ui.calls().is_empty());
        assert_eq!(helper.platform.total_subscriptions(), 0);
    }

    #[test]
    async fn test_unresolvable_services_close_screen() {
        let platform = MockPlatform {
            services: ServicesStatus::Unavailable(9),
            ..Default::default()
        };
        let helper = mk_helper(platform);

        helper.start_location_updates().await;

        assert_eq!(helper.ui.calls(), vec![UiCall::CloseScreen]);
    }

    #[test]
    async fn test_resolvable_services_show_error() {
        let platform = MockPlatform {
            services: ServicesStatus::Resolvable(2),
            ..Default::default()
        };
        let helper = mk_helper(platform);

        helper.start_location_updates().await;

        assert_eq!(
            helper.ui.calls(),
            vec![UiCall::ServicesError(2, SERVICES_RESOLUTION_REQUEST_CODE)]
        );
        assert_eq!(helper.platform.permission_requests(), 0);
    }

    #[test]
    async fn test_request_failure_disables_gps() {
        let platform = MockPlatform {
            fail_requests: true,
            ..Default::default()
        };
        let helper = mk_helper(platform);

        helper.start_location_updates().await;

        let state = helper.clone_state().await;
        assert!(!state.gps_mode);
        assert!(!state.awaiting_fix);
        assert_eq!(state.subscription, None);
        assert_eq!(
            helper.ui.calls(),
            vec![UiCall::ShowProgress, UiCall::DismissProgress]
        );
    }

    #[test]
    async fn test_pause_keeps_fix() {
        let last = mk_fix(Some(50.0));
        let platform = MockPlatform {
            last_known: Some(last),
            ..Default::default()
        };
        let helper = mk_helper(platform);

        helper.start_location_updates().await;
        helper.pause_and_save_location_updates().await;

        assert_eq!(helper.get_location().await, Some(last));
        assert!(helper.uses_gps().await);
    }

    #[test]
    async fn test_dismiss_keeps_gps_mode() {
        let helper = mk_helper(MockPlatform::default());

        helper.start_location_updates().await;
        helper.dismiss_location_updater().await;

        let state = helper.clone_state().await;
        assert_eq!(state.current, None);
        assert!(state.gps_mode);
        assert_eq!(helper.platform.active_subscriptions(), 0);
        assert!(helper.ui.calls().contains(&UiCall::ClearSearch));
    }

    #[test]
    async fn test_main_loop() {
        let helper = Arc::new(mk_helper(MockPlatform::default()));

        let handle = tokio::spawn({
            let helper = helper.clone();
            async move { helper.main_loop().await }
        });
        yield_now().await;

        helper.start_location_updates().await;
        let fix = mk_fix(Some(80.0));
        assert!(helper.platform.push_fix(mk_fix(Some(300.0))));
        assert!(helper.platform.push_fix(fix));

        while helper.get_location().await.is_none() {
            yield_now().await;
        }
        assert_eq!(helper.get_location().await, Some(fix));

        helper.quit();
        handle.await.expect("Main loop panicked");
        assert_eq!(helper.platform.active_subscriptions(), 0);
    }

    #[test]
    async fn test_quit_stops_subscription() {
        let helper = Arc::new(mk_helper(MockPlatform::default()));

        helper.start_location_updates().await;
        assert_eq!(helper.platform.active_subscriptions(), 1);

        let handle = tokio::spawn({
            let helper = helper.clone();
            async move { helper.main_loop().await }
        });
        helper.quit();
        handle.await.expect("Main loop panicked");

        assert_eq!(helper.platform.active_subscriptions(), 0);
        assert!(!helper.clone_state().await.awaiting_fix);
    }
}
