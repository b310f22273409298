use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Constants for the label space-allocation engine. Defaults match the
/// office drawing template the estimates were calibrated against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Characters per wrapped description line.
    pub line_width_chars: usize,
    /// Vertical metres one description line occupies.
    pub line_unit_height: f64,
    /// Deduction applied once per label to the estimated height.
    pub line_margin: f64,
    /// Per-layer floor margin added on top of the estimated text height.
    pub fixed_margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_width_chars: 35,
            line_unit_height: 0.45,
            line_margin: 0.1,
            fixed_margin: 0.1,
        }
    }
}

/// Sheet placement of the borehole tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub origin_x: f64,
    pub origin_y: f64,
    /// Horizontal distance between consecutive boring sticks.
    pub track_gap: f64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 100.0,
            track_gap: 15.0,
        }
    }
}

/// Title block above each track: hole id and ground elevation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub rule_offset_x: f64,
    pub rule_height: f64,
    pub rule_reach: f64,
    pub text_offset_x: f64,
    pub title_offset_y: f64,
    pub title_text_height: f64,
    pub elevation_offset_y: f64,
    pub elevation_text_height: f64,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            rule_offset_x: 0.1,
            rule_height: 2.45,
            rule_reach: 4.95,
            text_offset_x: 0.18,
            title_offset_y: 2.67,
            title_text_height: 0.65,
            elevation_offset_y: 1.6,
            elevation_text_height: 0.45,
        }
    }
}

/// Vertical depth scale: two rails with a hatched block every other metre.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub rail_width: f64,
    pub block_step: f64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            rail_width: 0.2,
            block_step: 2.0,
        }
    }
}

/// Per-layer depth tick geometry, including the bend used when allocation
/// moved a boundary away from its physical depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthLineConfig {
    pub reach: f64,
    pub break_x: f64,
    pub straighten_x: f64,
    pub text_offset_x: f64,
    pub text_offset_y: f64,
    pub text_height: f64,
}

impl Default for DepthLineConfig {
    fn default() -> Self {
        Self {
            reach: 2.72,
            break_x: 1.35,
            straighten_x: 1.45,
            text_offset_x: 0.15,
            text_offset_y: 0.07,
            text_height: 0.35,
        }
    }
}

/// Geology/interpretation description column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionConfig {
    pub offset_x: f64,
    pub column_width: f64,
    pub char_height: f64,
}

impl Default for DescriptionConfig {
    fn default() -> Self {
        Self {
            offset_x: 1.55,
            column_width: 8.0,
            char_height: 0.25,
        }
    }
}

/// Penetration readings column to the right of the scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NsptConfig {
    pub offset_x: f64,
    pub offset_y: f64,
    pub text_height: f64,
}

impl Default for NsptConfig {
    fn default() -> Self {
        Self {
            offset_x: 0.57,
            offset_y: 0.12,
            text_height: 0.35,
        }
    }
}

/// Water-table marker and label.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterLevelConfig {
    pub marker_offset_x: f64,
    pub text_offset_x_wet: f64,
    pub text_offset_x_dry: f64,
    pub text_offset_y: f64,
    pub text_height: f64,
}

impl Default for WaterLevelConfig {
    fn default() -> Self {
        Self {
            marker_offset_x: 2.9136,
            text_offset_x_wet: 2.86,
            text_offset_x_dry: 2.76,
            text_offset_y: 0.48,
            text_height: 0.25,
        }
    }
}

/// "PROFUNDIDADE FINAL" note under the track.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalDepthConfig {
    pub offset_x: f64,
    pub offset_y: f64,
    pub text_height: f64,
}

impl Default for FinalDepthConfig {
    fn default() -> Self {
        Self {
            offset_x: 5.72,
            offset_y: 0.87,
            text_height: 0.35,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub sheet: SheetConfig,
    pub header: HeaderConfig,
    pub scale: ScaleConfig,
    pub depth_line: DepthLineConfig,
    pub description: DescriptionConfig,
    pub nspt: NsptConfig,
    pub water_level: WaterLevelConfig,
    pub final_depth: FinalDepthConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub theme: Theme,
}

/// Load a config file on top of the defaults. Files are JSON5, so partial
/// overrides and commented templates both work; absent fields keep their
/// default value.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config: Config = json5::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_template_constants() {
        let config = Config::default();
        assert_eq!(config.layout.line_width_chars, 35);
        assert_eq!(config.layout.line_unit_height, 0.45);
        assert_eq!(config.render.sheet.track_gap, 15.0);
        assert_eq!(config.render.depth_line.reach, 2.72);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let parsed: Config = json5::from_str(
            "{ layout: { line_width_chars: 40 }, render: { sheet: { track_gap: 20 } } }",
        )
        .unwrap();
        assert_eq!(parsed.layout.line_width_chars, 40);
        assert_eq!(parsed.layout.line_unit_height, 0.45);
        assert_eq!(parsed.render.sheet.track_gap, 20.0);
        assert_eq!(parsed.render.sheet.origin_y, 100.0);
    }

    #[test]
    fn missing_config_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.render.description.column_width, 8.0);
    }
}
