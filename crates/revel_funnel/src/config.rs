//! Funnel configuration
//!
//! Numeric tuning for the page lives in `funnel.toml` so designers can
//! adjust scrub feel, autoplay cadence, and the layout breakpoint without
//! touching code. Every field has a default matching the shipped page.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level funnel configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FunnelConfig {
    /// Viewport width in px separating the desktop and mobile variants
    #[serde(default = "default_breakpoint")]
    pub breakpoint_px: f32,
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub widgets: WidgetsConfig,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            breakpoint_px: default_breakpoint(),
            transition: TransitionConfig::default(),
            reveal: RevealConfig::default(),
            widgets: WidgetsConfig::default(),
        }
    }
}

fn default_breakpoint() -> f32 {
    768.0
}

/// Pinned hero-to-offer transition tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransitionConfig {
    /// Scrub smoothing on desktop, in seconds
    #[serde(default = "default_desktop_scrub")]
    pub desktop_scrub: f32,
    /// Faster response on mobile
    #[serde(default = "default_mobile_scrub")]
    pub mobile_scrub: f32,
    /// Hero zoom at the end of the transition (desktop)
    #[serde(default = "default_hero_scale")]
    pub desktop_hero_scale: f32,
    /// Reduced zoom on mobile to avoid pixelation
    #[serde(default = "default_mobile_hero_scale")]
    pub mobile_hero_scale: f32,
    /// Peak blur in px applied to the outgoing hero (desktop only)
    #[serde(default = "default_hero_blur")]
    pub desktop_hero_blur: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            desktop_scrub: default_desktop_scrub(),
            mobile_scrub: default_mobile_scrub(),
            desktop_hero_scale: default_hero_scale(),
            mobile_hero_scale: default_mobile_hero_scale(),
            desktop_hero_blur: default_hero_blur(),
        }
    }
}

fn default_desktop_scrub() -> f32 {
    0.5
}

fn default_mobile_scrub() -> f32 {
    0.2
}

fn default_hero_scale() -> f32 {
    1.3
}

fn default_mobile_hero_scale() -> f32 {
    1.1
}

fn default_hero_blur() -> f32 {
    12.0
}

/// Per-section reveal tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RevealConfig {
    /// Entrance slide distance in px
    #[serde(default = "default_reveal_distance")]
    pub distance_px: f32,
    /// Viewport fraction at which reveals start ("top 75%")
    #[serde(default = "default_reveal_start")]
    pub start_fraction: f32,
    #[serde(default = "default_reveal_duration")]
    pub duration_ms: f32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            distance_px: default_reveal_distance(),
            start_fraction: default_reveal_start(),
            duration_ms: default_reveal_duration(),
        }
    }
}

fn default_reveal_distance() -> f32 {
    50.0
}

fn default_reveal_start() -> f32 {
    0.75
}

fn default_reveal_duration() -> f32 {
    1000.0
}

/// Widget timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WidgetsConfig {
    /// Testimonial deck autoplay interval in ms
    #[serde(default = "default_autoplay")]
    pub autoplay_interval_ms: f32,
    /// Guests marquee drift in px/s
    #[serde(default = "default_marquee_speed")]
    pub marquee_speed: f32,
    #[serde(default = "default_type_ms")]
    pub typewriter_type_ms: f32,
    #[serde(default = "default_delete_ms")]
    pub typewriter_delete_ms: f32,
    #[serde(default = "default_hold_ms")]
    pub typewriter_hold_ms: f32,
}

impl Default for WidgetsConfig {
    fn default() -> Self {
        Self {
            autoplay_interval_ms: default_autoplay(),
            marquee_speed: default_marquee_speed(),
            typewriter_type_ms: default_type_ms(),
            typewriter_delete_ms: default_delete_ms(),
            typewriter_hold_ms: default_hold_ms(),
        }
    }
}

fn default_autoplay() -> f32 {
    4500.0
}

fn default_marquee_speed() -> f32 {
    60.0
}

fn default_type_ms() -> f32 {
    100.0
}

fn default_delete_ms() -> f32 {
    50.0
}

fn default_hold_ms() -> f32 {
    2000.0
}

impl FunnelConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse funnel config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FunnelConfig::default();
        assert_eq!(config.breakpoint_px, 768.0);
        assert_eq!(config.transition.desktop_scrub, 0.5);
        assert_eq!(config.transition.mobile_scrub, 0.2);
        assert_eq!(config.widgets.autoplay_interval_ms, 4500.0);
    }

    #[test]
    fn test_parse_partial_overrides() {
        let config = FunnelConfig::parse(
            r#"
            breakpoint_px = 1024

            [transition]
            desktop_scrub = 0.8

            [widgets]
            autoplay_interval_ms = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.breakpoint_px, 1024.0);
        assert_eq!(config.transition.desktop_scrub, 0.8);
        // Unspecified fields keep their defaults
        assert_eq!(config.transition.mobile_scrub, 0.2);
        assert_eq!(config.widgets.autoplay_interval_ms, 5000.0);
        assert_eq!(config.widgets.typewriter_type_ms, 100.0);
    }

    #[test]
    fn test_parse_empty_is_default() {
        let config = FunnelConfig::parse("").unwrap();
        assert_eq!(config.reveal.start_fraction, 0.75);
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(FunnelConfig::parse("breakpoint_px = \"wide\"").is_err());
    }
}
