//! Configuration persistence for stencil-editor settings

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Serializable color representation (components in 0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for ClassColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl ClassColor {
    pub const WHITE: ClassColor = ClassColor {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Convert to RGBA bytes with the given alpha
    pub fn to_rgba_u8(self, alpha: u8) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            alpha,
        ]
    }

    fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let i = (h * 6.0).floor();
        let f = h * 6.0 - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match (i as i32).rem_euclid(6) {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self { r, g, b }
    }
}

/// One color per class label, spread evenly around the hue wheel in
/// detector order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassPalette {
    colors: HashMap<String, ClassColor>,
}

impl ClassPalette {
    pub fn new(labels: &[String]) -> Self {
        let n = labels.len().max(1) as f32;
        let colors = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), ClassColor::from_hsv(i as f32 / n, 0.7, 1.0)))
            .collect();
        Self { colors }
    }

    /// Color for a label; unknown labels are white
    pub fn color(&self, label: &str) -> ClassColor {
        self.colors.get(label).copied().unwrap_or_default()
    }
}

/// Fixed command keys; every other printable key toggles class visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub save: char,
    pub undo: char,
    pub delete_point: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            save: 's',
            undo: 'z',
            delete_point: 'd',
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Detector confidence used for the first extraction (0.0-1.0)
    pub initial_confidence: f32,
    /// Traced polygons with a smaller area are discarded
    pub min_area: f32,
    /// Square side the working image is resized to before detection
    pub detector_input_size: u32,
    /// Pointer must be strictly closer than this to grab a vertex
    pub handle_hit_radius: f32,
    /// Confidence changes at or below this do not trigger re-extraction
    pub confidence_epsilon: f32,
    /// Preview size relative to the full-resolution overlay
    pub preview_scale: f32,
    /// Delay between polls of the input loop
    pub poll_interval_ms: u64,
    /// Where the binary stencil mask is written on save
    pub mask_path: PathBuf,
    /// Where the colorized overlay is written on save
    pub overlay_path: PathBuf,
    /// Where the freehand touched-up mask is written
    pub edited_mask_path: PathBuf,
    pub keys: KeyBindings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            initial_confidence: 0.6,
            min_area: 100.0,
            detector_input_size: 640,
            handle_hit_radius: 10.0,
            confidence_epsilon: 1e-3,
            preview_scale: 0.5,
            poll_interval_ms: 50,
            mask_path: PathBuf::from("mask_dynamic.png"),
            overlay_path: PathBuf::from("overlay_dynamic_final.png"),
            edited_mask_path: PathBuf::from("mask_edited.png"),
            keys: KeyBindings::default(),
        }
    }
}

impl EditorConfig {
    /// Directory name under the user config dir
    pub const ID: &'static str = "stencil-editor";

    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from `path` (or the default location), falling back
    /// to defaults if the file is missing or invalid
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => {
                    log::debug!("Loaded config from {}", path.display());
                    config
                }
                Err(err) => {
                    log::warn!("Error parsing config {}, using defaults: {}", path.display(), err);
                    Self::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                log::warn!("Could not read config {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_is_stable_and_distinct() {
        let labels: Vec<String> = ["roof", "window", "door"].iter().map(|s| s.to_string()).collect();
        let palette = ClassPalette::new(&labels);
        assert_ne!(palette.color("roof"), palette.color("window"));
        assert_ne!(palette.color("window"), palette.color("door"));
        assert_eq!(palette.color("roof"), ClassPalette::new(&labels).color("roof"));
        assert_eq!(palette.color("unknown"), ClassColor::WHITE);
    }

    #[test]
    fn test_first_label_is_red_hue() {
        let palette = ClassPalette::new(&["roof".to_string()]);
        let [r, g, b, a] = palette.color("roof").to_rgba_u8(255);
        assert_eq!((r, a), (255, 255));
        assert_eq!(g, b);
        assert!(g > 70 && g < 80);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "min_area": 250.0 }"#).unwrap();
        let config = EditorConfig::load(Some(&path));
        assert_eq!(config.min_area, 250.0);
        assert_eq!(config.initial_confidence, 0.6);
        assert_eq!(config.keys, KeyBindings::default());
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(EditorConfig::load(Some(&path)), EditorConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = EditorConfig {
            preview_scale: 0.25,
            ..EditorConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(EditorConfig::load(Some(&path)), config);
    }
}
