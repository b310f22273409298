use serde::{Deserialize, Serialize};

/// AutoCAD color index values used by the classic palette.
pub const ACI_RED: i16 = 1;
pub const ACI_YELLOW: i16 = 2;

/// Colors and text style for the emitted drawing, as AutoCAD color indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub scale_color: i16,
    pub title_color: i16,
    pub final_depth_color: i16,
    pub water_shape_color: i16,
    pub water_text_color: i16,
    pub depth_line_color: i16,
    pub description_color: i16,
    pub text_style: String,
    pub font_file: String,
}

impl Theme {
    /// The palette the office templates use: red scale rails and water
    /// marker, yellow annotation layers, Arial throughout.
    pub fn classic() -> Self {
        Self {
            scale_color: ACI_RED,
            title_color: ACI_YELLOW,
            final_depth_color: ACI_YELLOW,
            water_shape_color: ACI_RED,
            water_text_color: ACI_YELLOW,
            depth_line_color: ACI_YELLOW,
            description_color: ACI_YELLOW,
            text_style: "arialText".to_string(),
            font_file: "arial.ttf".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
