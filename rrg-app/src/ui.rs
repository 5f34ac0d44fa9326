use log::{info, warn};
use rrg_location::{LocationUi, UiMessage};
use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};
use tauri_plugin_opener::OpenerExt;
use tauri_specta::Event;

/// Opens this app's page in the system settings on iOS
const IOS_APP_SETTINGS_URL: &str = "app-settings:";

/// Where to send the user to change this app's permissions. Android resolves a `package:` URI
/// to the app's details page, iOS has its own scheme for it.
fn app_settings_url(os: &str, identifier: &str) -> String {
    match os {
        "android" => format!("package:{identifier}"),
        _ => IOS_APP_SETTINGS_URL.to_string(),
    }
}

/// The "getting location" indicator should be shown or hidden, the indicator's cancel button
/// should call `cancel_location`
#[derive(Serialize, Deserialize, Clone, Debug, specta::Type, tauri_specta::Event)]
pub struct ProgressUpdate {
    pub visible: bool,
    pub message: Option<String>,
}

/// The search box's text should change, `null` clears it
#[derive(Serialize, Deserialize, Clone, Debug, specta::Type, tauri_specta::Event)]
pub struct SearchTextUpdate(Option<String>);

/// Show a short message to the user
#[derive(Serialize, Deserialize, Clone, Debug, specta::Type, tauri_specta::Event)]
pub struct Toast(String);

/// Location can't be used on this device, leave the screen that needs it
#[derive(Serialize, Deserialize, Clone, Default, Debug, specta::Type, tauri_specta::Event)]
pub struct CloseScreen;

pub struct TauriLocationUi(AppHandle);

impl TauriLocationUi {
    pub fn new(app: AppHandle) -> Self {
        Self(app)
    }

    fn emit<E: Event + Serialize + Clone>(&self, event: E) {
        if let Err(why) = event.emit(&self.0) {
            warn!(
                "Error sending {} to UI: {why:?}",
                std::any::type_name::<E>()
            );
        }
    }
}

impl LocationUi for TauriLocationUi {
    fn show_progress(&self) {
        self.emit(ProgressUpdate {
            visible: true,
            message: Some(UiMessage::GettingLocation.text().to_string()),
        });
    }

    fn dismiss_progress(&self) {
        self.emit(ProgressUpdate {
            visible: false,
            message: None,
        });
    }

    fn toast(&self, msg: UiMessage) {
        self.emit(Toast(msg.text().to_string()));
    }

    fn set_search_text(&self, msg: UiMessage) {
        self.emit(SearchTextUpdate(Some(msg.text().to_string())));
    }

    fn clear_search(&self) {
        self.emit(SearchTextUpdate(None));
    }

    fn show_settings_redirect(&self, request_code: i32) {
        info!("Showing settings redirect ({request_code})");
        let app = self.0.clone();
        let url = app_settings_url(std::env::consts::OS, &self.0.config().identifier);
        self.0
            .dialog()
            .message(UiMessage::PermissionRationale.text())
            .title(UiMessage::SettingsDialogTitle.text())
            .buttons(MessageDialogButtons::OkCancel)
            .show(move |confirmed| {
                if confirmed {
                    if let Err(why) = app.opener().open_url(&url, None::<&str>) {
                        warn!("Couldn't open app settings ({url}): {why:?}");
                    }
                }
            });
    }

    fn show_services_error(&self, error_code: i32, request_code: i32) {
        info!("Showing services error {error_code} ({request_code})");
        self.0
            .dialog()
            .message(format!(
                "Location services need attention before we can find you (error {error_code})."
            ))
            .kind(MessageDialogKind::Error)
            .show(|_| {});
    }

    fn close_screen(&self) {
        self.emit(CloseScreen);
    }
}
