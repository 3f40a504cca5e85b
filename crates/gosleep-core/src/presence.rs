//! Presence and charging signals.
//!
//! Both are transient observations sampled at decision time. Nothing in
//! here is persisted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::settings::{GeofenceSettings, Settings};

const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// How the device is plugged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlugType {
    Ac,
    Usb,
    Wireless,
}

impl fmt::Display for PlugType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlugType::Ac => "ac",
            PlugType::Usb => "usb",
            PlugType::Wireless => "wireless",
        })
    }
}

impl FromStr for PlugType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ac" | "mains" => Ok(PlugType::Ac),
            "usb" | "usb_c" | "usb-c" | "usb_pd" => Ok(PlugType::Usb),
            "wireless" | "qi" => Ok(PlugType::Wireless),
            other => Err(format!("unknown plug type: {other}")),
        }
    }
}

/// Battery state as reported by the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargingState {
    pub is_charging: bool,
    #[serde(default)]
    pub plug: Option<PlugType>,
}

impl ChargingState {
    pub fn unplugged() -> Self {
        Self::default()
    }

    pub fn plugged(plug: PlugType) -> Self {
        Self {
            is_charging: true,
            plug: Some(plug),
        }
    }

    /// A full battery on the charger reports "not charging" but is still
    /// plugged in, so either signal counts.
    pub fn is_plugged_in(&self) -> bool {
        self.is_charging || self.plug.is_some()
    }
}

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in metres (haversine).
    pub fn distance_m(&self, other: &Coordinates) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

impl GeofenceSettings {
    pub fn center(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn contains(&self, point: &Coordinates) -> bool {
        self.center().distance_m(point) <= self.radius_m
    }
}

/// What the device could observe about where it is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresenceObservation {
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub location: Option<Coordinates>,
}

/// Strip the double quotes some platforms wrap SSIDs in.
pub fn normalize_ssid(raw: &str) -> &str {
    raw.trim().trim_matches('"')
}

/// At home when the current network is the home network, or the last
/// known location is inside the home geofence. With neither configured
/// the user is never considered at home.
pub fn is_at_home(settings: &Settings, observed: &PresenceObservation) -> bool {
    let wifi_match = match (&settings.home_wifi_ssid, &observed.ssid) {
        (Some(home), Some(current)) => normalize_ssid(home) == normalize_ssid(current),
        _ => false,
    };
    let geofence_match = match (&settings.home_geofence, &observed.location) {
        (Some(fence), Some(here)) => fence.contains(here),
        _ => false,
    };
    wifi_match || geofence_match
}
