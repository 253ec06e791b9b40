//! Player preferences
//!
//! Audio and accessibility are persisted as separate records, apart from
//! progression data. Setters clamp; the host saves after changing them.

use serde::{Deserialize, Serialize};

use crate::persistence::Record;

/// Colours the host swaps under the colour-blind palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub shield: &'static str,
    pub alien_bullet: &'static str,
    pub power_up_spread: &'static str,
    pub power_up_rapid: &'static str,
    pub power_up_shield: &'static str,
    pub power_up_multiplier: &'static str,
}

pub const STANDARD_PALETTE: ColorPalette = ColorPalette {
    shield: "#00ff00",
    alien_bullet: "#ff0000",
    power_up_spread: "#00ffff",
    power_up_rapid: "#ff0000",
    power_up_shield: "#00ff00",
    power_up_multiplier: "#ffff00",
};

/// Avoids red/green pairs
pub const COLORBLIND_PALETTE: ColorPalette = ColorPalette {
    shield: "#0088ff",
    alien_bullet: "#ff8800",
    power_up_spread: "#00ffff",
    power_up_rapid: "#ff8800",
    power_up_shield: "#0088ff",
    power_up_multiplier: "#cc00ff",
};

/// Audio preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        }
    }
}

impl Record for Settings {
    const KEY: &'static str = "space-invaders-settings";
}

fn clamp_volume(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

impl Settings {
    pub fn set_master_volume(&mut self, value: f32) {
        self.master_volume = clamp_volume(value);
    }

    pub fn set_sfx_volume(&mut self, value: f32) {
        self.sfx_volume = clamp_volume(value);
    }

    pub fn set_music_volume(&mut self, value: f32) {
        self.music_volume = clamp_volume(value);
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Volume actually applied to sound effects
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.sfx_volume * self.master_volume
        }
    }

    /// Volume actually applied to music
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.music_volume * self.master_volume
        }
    }
}

/// Accessibility preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilitySettings {
    pub high_contrast: bool,
    pub colorblind: bool,
    /// Minimize shake, flashes and particles
    pub reduced_motion: bool,
}

impl Record for AccessibilitySettings {
    const KEY: &'static str = "space-invaders-accessibility";
}

impl AccessibilitySettings {
    pub fn palette(&self) -> ColorPalette {
        if self.colorblind {
            COLORBLIND_PALETTE
        } else {
            STANDARD_PALETTE
        }
    }

    /// Screen shake scale (0 disables it)
    pub fn shake_intensity(&self) -> f32 {
        if self.reduced_motion { 0.0 } else { 1.0 }
    }

    pub fn show_particles(&self) -> bool {
        !self.reduced_motion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{KeyValueStore, MemoryStore, NullStore};

    #[test]
    fn test_volumes_clamp() {
        let mut settings = Settings::default();
        settings.set_master_volume(1.5);
        settings.set_sfx_volume(-0.2);
        settings.set_music_volume(f32::NAN);
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.sfx_volume, 0.0);
        assert_eq!(settings.music_volume, 0.0);
    }

    #[test]
    fn test_effective_volumes() {
        let mut settings = Settings::default();
        assert!((settings.effective_sfx_volume() - 0.8).abs() < 1e-6);
        assert!((settings.effective_music_volume() - 0.56).abs() < 1e-6);
        settings.toggle_mute();
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert_eq!(settings.effective_music_volume(), 0.0);
    }

    #[test]
    fn test_partial_record_keeps_defaults() {
        let mut store = MemoryStore::new();
        store.set(Settings::KEY, r#"{ "muted": true }"#).unwrap();
        let settings = Settings::load_from(&store);
        assert!(settings.muted);
        assert_eq!(settings.master_volume, 0.8);

        assert_eq!(Settings::load_from(&NullStore), Settings::default());
    }

    #[test]
    fn test_reduced_motion() {
        let mut a11y = AccessibilitySettings::default();
        assert_eq!(a11y.shake_intensity(), 1.0);
        assert!(a11y.show_particles());
        a11y.reduced_motion = true;
        assert_eq!(a11y.shake_intensity(), 0.0);
        assert!(!a11y.show_particles());
    }

    #[test]
    fn test_palette_and_persistence() {
        let mut store = MemoryStore::new();
        let a11y = AccessibilitySettings {
            colorblind: true,
            ..AccessibilitySettings::default()
        };
        assert_eq!(a11y.palette().shield, "#0088ff");
        assert!(a11y.save_to(&mut store));
        let loaded = AccessibilitySettings::load_from(&store);
        assert_eq!(loaded, a11y);
        assert_eq!(AccessibilitySettings::default().palette(), STANDARD_PALETTE);
    }
}
