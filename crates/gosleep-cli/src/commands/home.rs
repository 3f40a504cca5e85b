use clap::Subcommand;
use gosleep_core::{Config, GeofenceSettings};

use super::{ensure_unlocked, reschedule_after_settings_change, CmdResult};

#[derive(Subcommand)]
pub enum HomeAction {
    /// Show the configured home network and location
    Show,
    /// Set the home Wi-Fi network
    Wifi {
        /// Network name
        ssid: String,
    },
    /// Forget the home Wi-Fi network
    ClearWifi,
    /// Set the home location
    Location {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Geofence radius in metres
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Forget the home location
    ClearLocation,
}

pub fn run(action: HomeAction) -> CmdResult {
    let mut config = Config::load()?;
    let mut settings = config.settings.clone();

    match action {
        HomeAction::Show => {
            let json = serde_json::json!({
                "wifi_ssid": settings.home_wifi_ssid,
                "geofence": settings.home_geofence,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
            return Ok(());
        }
        HomeAction::Wifi { ssid } => settings.home_wifi_ssid = Some(ssid),
        HomeAction::ClearWifi => settings.home_wifi_ssid = None,
        HomeAction::Location { lat, lon, radius } => {
            let mut fence = GeofenceSettings::new(lat, lon);
            if let Some(radius) = radius {
                fence = fence.with_radius(radius);
            }
            settings.home_geofence = Some(fence);
        }
        HomeAction::ClearLocation => settings.home_geofence = None,
    }

    ensure_unlocked(&config)?;
    settings.validate()?;
    config.settings = settings;
    config.save()?;
    reschedule_after_settings_change(&config)?;
    println!("ok");
    Ok(())
}
