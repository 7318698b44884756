use crate::foundation::core::{Bitrate, FrameRate, Rgba8};
use crate::foundation::error::{ExportError, ExportResult};
use crate::text::format::{FormatMode, UnitFormat, UnitPolicy};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Frame rates offered for export.
pub const SUPPORTED_FPS: [u32; 4] = [6, 12, 24, 30];
/// Bitrates (Mbps) offered for export.
pub const SUPPORTED_BITRATES_MBPS: [u32; 3] = [5, 10, 20];
/// Maximum separator length in characters.
pub const MAX_SEPARATOR_CHARS: usize = 3;

/// Text drop shadow.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShadowConfig {
    /// Whether the shadow is drawn at all.
    pub enabled: bool,
    /// Shadow colour.
    pub color: Rgba8,
    /// Blur radius in pixels (canvas `shadowBlur` convention).
    pub blur: f32,
    /// Horizontal offset in pixels.
    pub offset_x: f32,
    /// Vertical offset in pixels.
    pub offset_y: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Rgba8::rgba(0, 0, 0, 204),
            blur: 10.0,
            offset_x: 2.0,
            offset_y: 2.0,
        }
    }
}

/// Composite operator used for the text draw.
///
/// Values use the canvas `globalCompositeOperation` spelling; `none` means the default
/// `source-over`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum BlendMode {
    #[default]
    None,
    SourceOver,
    SourceIn,
    SourceOut,
    SourceAtop,
    DestinationOver,
    DestinationIn,
    DestinationOut,
    DestinationAtop,
    Lighter,
    Copy,
    Xor,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

/// How the background image is scaled into the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundFit {
    /// Fill the canvas, cropping the overflowing axis.
    #[default]
    Cover,
    /// Fit entirely inside the canvas, letterboxing the short axis.
    Contain,
}

/// Where the countdown text is anchored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionMode {
    /// Canvas centre.
    #[default]
    Center,
    /// Offset inward from [`VisualConfig::corner`].
    Custom,
}

/// Canvas corner used by [`PositionMode::Custom`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Corner {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Immutable snapshot of every setting that affects an export.
///
/// Serialized as JSON with `snake_case` keys and kebab-case enum values; every field is optional
/// in the document and defaults to the application defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisualConfig {
    /// Font family name. Quote characters are stripped before use.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: u32,
    /// Text fill colour.
    pub font_color: Rgba8,
    /// Text drop shadow.
    pub shadow: ShadowConfig,
    /// Composite operator for the text draw.
    pub blend_mode: BlendMode,
    /// Classic unit tokens or a plain number of seconds.
    pub format_mode: FormatMode,
    /// Hours unit policy.
    pub hour_format: UnitFormat,
    /// Minutes unit policy.
    pub minute_format: UnitFormat,
    /// Seconds unit policy.
    pub second_format: UnitFormat,
    /// Token separator (at most three characters).
    pub separator: String,
    /// Countdown length in whole seconds.
    pub total_seconds: u32,
    /// Seconds of unchanged initial value shown before the countdown starts.
    pub start_delay_seconds: u32,
    /// Base fill drawn under everything.
    pub background_color: Rgba8,
    /// Optional background image path.
    pub background_image: Option<PathBuf>,
    /// Background image scaling.
    pub background_fit: BackgroundFit,
    /// Text anchoring mode.
    pub position_mode: PositionMode,
    /// Anchor corner in custom mode.
    pub corner: Corner,
    /// Horizontal inset from the corner in custom mode.
    pub offset_x: u32,
    /// Vertical inset from the corner in custom mode.
    pub offset_y: u32,
    /// Export frame rate.
    pub fps: u32,
    /// Export bitrate in Mbps.
    pub bitrate_mbps: u32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_owned(),
            font_size: 144,
            font_color: Rgba8::rgb(0, 0, 0),
            shadow: ShadowConfig::default(),
            blend_mode: BlendMode::None,
            format_mode: FormatMode::Classic,
            hour_format: UnitFormat::Auto,
            minute_format: UnitFormat::TwoDigits,
            second_format: UnitFormat::TwoDigits,
            separator: ":".to_owned(),
            total_seconds: 60,
            start_delay_seconds: 0,
            background_color: Rgba8::rgb(255, 255, 255),
            background_image: None,
            background_fit: BackgroundFit::Cover,
            position_mode: PositionMode::Center,
            corner: Corner::TopLeft,
            offset_x: 50,
            offset_y: 50,
            fps: 12,
            bitrate_mbps: 5,
        }
    }
}

impl VisualConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ExportResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ExportError::validation(format!("parse countdown config JSON: {e}")))
    }

    /// Parse a config from a JSON string.
    pub fn from_json_str(s: &str) -> ExportResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| ExportError::validation(format!("parse countdown config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    ///
    /// A relative `background_image` is resolved against the config file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> ExportResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ExportError::validation(format!("open countdown config '{}': {e}", path.display()))
        })?;
        let mut cfg = Self::from_reader(BufReader::new(f))?;

        if let Some(img) = cfg.background_image.as_mut()
            && img.is_relative()
            && let Some(dir) = path.parent()
        {
            *img = dir.join(&*img);
        }
        Ok(cfg)
    }

    /// Pretty-printed JSON document.
    pub fn to_json_pretty(&self) -> ExportResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ExportError::validation(format!("serialize countdown config: {e}")))
    }

    /// Check every field against the ranges the exporter supports.
    pub fn validate(&self) -> ExportResult<()> {
        if self.clean_font_family().trim().is_empty() {
            return Err(ExportError::validation("font_family must not be empty"));
        }
        if !(12..=500).contains(&self.font_size) {
            return Err(ExportError::validation(format!(
                "font_size must be in 12..=500, got {}",
                self.font_size
            )));
        }
        if !(0.0..=50.0).contains(&self.shadow.blur) {
            return Err(ExportError::validation(format!(
                "shadow.blur must be in 0..=50, got {}",
                self.shadow.blur
            )));
        }
        for (name, v) in [
            ("shadow.offset_x", self.shadow.offset_x),
            ("shadow.offset_y", self.shadow.offset_y),
        ] {
            if !(-50.0..=50.0).contains(&v) {
                return Err(ExportError::validation(format!(
                    "{name} must be in -50..=50, got {v}"
                )));
            }
        }
        if self.separator.chars().count() > MAX_SEPARATOR_CHARS {
            return Err(ExportError::validation(format!(
                "separator must be at most {MAX_SEPARATOR_CHARS} characters, got {:?}",
                self.separator
            )));
        }
        if !(1..=86_400).contains(&self.total_seconds) {
            return Err(ExportError::validation(format!(
                "total_seconds must be in 1..=86400, got {}",
                self.total_seconds
            )));
        }
        if self.start_delay_seconds > 3_600 {
            return Err(ExportError::validation(format!(
                "start_delay_seconds must be in 0..=3600, got {}",
                self.start_delay_seconds
            )));
        }
        if !SUPPORTED_FPS.contains(&self.fps) {
            return Err(ExportError::validation(format!(
                "fps must be one of {SUPPORTED_FPS:?}, got {}",
                self.fps
            )));
        }
        if !SUPPORTED_BITRATES_MBPS.contains(&self.bitrate_mbps) {
            return Err(ExportError::validation(format!(
                "bitrate_mbps must be one of {SUPPORTED_BITRATES_MBPS:?}, got {}",
                self.bitrate_mbps
            )));
        }
        Ok(())
    }

    /// Font family with every `"` and `'` removed.
    pub fn clean_font_family(&self) -> String {
        self.font_family.replace(['"', '\''], "")
    }

    /// Per-unit policy assembled from the three unit fields.
    pub fn unit_policy(&self) -> UnitPolicy {
        UnitPolicy {
            hours: self.hour_format,
            minutes: self.minute_format,
            seconds: self.second_format,
        }
    }

    /// Export frame rate.
    pub fn frame_rate(&self) -> ExportResult<FrameRate> {
        FrameRate::new(self.fps)
    }

    /// Export bitrate.
    pub fn bitrate(&self) -> ExportResult<Bitrate> {
        Bitrate::from_mbps(self.bitrate_mbps)
    }

    /// Exact number of frames an export of this config produces.
    pub fn total_frames(&self) -> u64 {
        (u64::from(self.start_delay_seconds) + u64::from(self.total_seconds)) * u64::from(self.fps)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
