//! Presentation preferences
//!
//! Read once at startup and never written back. The page can embed a JSON
//! object in `<script id="balancerio-settings" type="application/json">`;
//! natively the same JSON comes from `BALANCERIO_SETTINGS`. Missing fields
//! take their defaults.

use serde::{Deserialize, Serialize};

use crate::consts::CELEBRATION_MS;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === HUD ===
    /// Show "weight x distance = moment" under occupied cells
    pub show_moment_labels: bool,
    /// Show the sliding balance indicator above the lever
    pub show_indicator: bool,

    // === Feedback ===
    /// Celebration overlay animation length (ms)
    pub celebration_ms: u32,
    /// Scale of the piece that follows a finger during touch drags
    pub touch_ghost_scale: f32,

    // === Accessibility ===
    /// Reduced motion (no beam easing, no celebration animation)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_moment_labels: true,
            show_indicator: true,

            celebration_ms: CELEBRATION_MS,
            touch_ghost_scale: 1.2,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Element id of the inline settings block (used only in wasm32)
    #[allow(dead_code)]
    const ELEMENT_ID: &'static str = "balancerio-settings";
    /// Environment variable consulted by the native build
    pub const ENV_VAR: &'static str = "BALANCERIO_SETTINGS";

    /// Parse settings JSON, falling back to defaults on error
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring malformed settings: {}", e);
                Self::default()
            }
        }
    }

    /// Beam easing transition (CSS), honouring reduced motion
    pub fn beam_transition(&self) -> &'static str {
        if self.reduced_motion {
            "none"
        } else {
            "transform 0.5s cubic-bezier(0.34, 1.56, 0.64, 1)"
        }
    }

    /// Effective celebration length (0 when reduced motion is on)
    pub fn effective_celebration_ms(&self) -> u32 {
        if self.reduced_motion {
            0
        } else {
            self.celebration_ms
        }
    }

    /// Load settings from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::ELEMENT_ID))
            .and_then(|el| el.text_content());

        match json {
            Some(json) if !json.trim().is_empty() => {
                log::info!("Loaded settings from page");
                Self::from_json(&json)
            }
            _ => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from the environment (native)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        match std::env::var(Self::ENV_VAR) {
            Ok(json) => Self::from_json(&json),
            Err(_) => Self::default(),
        }
    }
}
