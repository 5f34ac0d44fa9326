use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::info;
use rrg_test_shared::{Scenario, SimPermission, SimServices, SimSettings, prelude::*, run_scenario};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ServicesValue {
    Connected,
    Resolvable,
    Unavailable,
}

impl From<ServicesValue> for SimServices {
    fn from(value: ServicesValue) -> Self {
        match value {
            ServicesValue::Connected => SimServices::Connected,
            ServicesValue::Resolvable => SimServices::Resolvable,
            ServicesValue::Unavailable => SimServices::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SettingsValue {
    Satisfied,
    ResolutionRequired,
    Unavailable,
}

impl From<SettingsValue> for SimSettings {
    fn from(value: SettingsValue) -> Self {
        match value {
            SettingsValue::Satisfied => SimSettings::Satisfied,
            SettingsValue::ResolutionRequired => SimSettings::ResolutionRequired,
            SettingsValue::Unavailable => SimSettings::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PermissionValue {
    Granted,
    Grant,
    Deny,
    DenyForever,
}

impl From<PermissionValue> for SimPermission {
    fn from(value: PermissionValue) -> Self {
        match value {
            PermissionValue::Granted => SimPermission::Granted,
            PermissionValue::Grant => SimPermission::Grant,
            PermissionValue::Deny => SimPermission::Deny,
            PermissionValue::DenyForever => SimPermission::DenyForever,
        }
    }
}

/// Run the location helper against a simulated device and report what it did
#[derive(Parser)]
struct Cli {
    /// Load the whole scenario from a JSON file, other flags are ignored
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// State of the device's location services
    #[arg(long, value_enum, default_value = "connected")]
    services: ServicesValue,

    /// Outcome of checking device location settings
    #[arg(long, value_enum, default_value = "satisfied")]
    settings: SettingsValue,

    /// Decline the settings prompt instead of fixing settings
    #[arg(long)]
    decline_settings: bool,

    /// Permission state, and what the user does when prompted
    #[arg(long, value_enum, default_value = "granted")]
    permission: PermissionValue,

    /// Accuracy in meters of a last-known fix the device already has
    #[arg(long)]
    last_known: Option<f64>,

    /// Accuracies in meters of fixes the device streams, in order
    #[arg(long, value_delimiter = ',')]
    fixes: Vec<f64>,

    /// Hit cancel after this many fixes were delivered
    #[arg(long)]
    cancel_after: Option<usize>,

    /// Make fix requests fail like a revoked permission
    #[arg(long)]
    fail_requests: bool,

    /// Accept fixes with an accuracy below this many meters
    #[arg(long)]
    threshold: Option<f64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn scenario(&self) -> Result<Scenario> {
        if let Some(path) = &self.scenario {
            return Scenario::from_file(path);
        }

        let mut scenario = Scenario {
            services: self.services.into(),
            settings: self.settings.into(),
            resolve_settings: !self.decline_settings,
            permission: self.permission.into(),
            last_known_accuracy: self.last_known,
            fixes: self.fixes.iter().copied().map(Some).collect(),
            cancel_after: self.cancel_after,
            fail_requests: self.fail_requests,
            ..Default::default()
        };

        if let Some(threshold) = self.threshold {
            if threshold <= 0.0 {
                bail!("Threshold must be positive");
            }
            scenario.config.accuracy_threshold_meters = threshold;
        }

        Ok(scenario)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    colog::init();

    let cli = Cli::parse();
    let scenario = cli.scenario().context("Invalid scenario")?;

    info!("Running scenario: {scenario:?}");
    let report = run_scenario(scenario).await?;

    if cli.json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{out}");
        return Ok(());
    }

    for event in report.ui.iter() {
        println!("ui: {event:?}");
    }
    match report.accepted {
        Some(fix) => println!(
            "accepted: ({}, {}) within {:?}m",
            fix.lat, fix.long, fix.accuracy
        ),
        None => println!("accepted: none"),
    }
    println!("gps mode: {}", report.gps_mode);
    println!(
        "subscriptions: {}, fixes delivered: {}",
        report.subscriptions, report.delivered
    );
    println!(
        "permission prompts: {}, settings prompts: {}",
        report.permission_prompts, report.settings_prompts
    );

    Ok(())
}
