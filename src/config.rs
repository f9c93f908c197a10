use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use crate::baseline::{ChannelStats, HealthyBaseline};
use crate::errors::{HeatmapError, Result};

/// Run-level configuration for the CLI
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub input_path: String,
    pub output_base_dir: String,

    /// Diagnosis label applied to every input (as produced by the upstream classifier)
    #[serde(default = "default_diagnosis_label")]
    pub diagnosis_label: String,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,

    /// Write a JSON report next to every overlay
    #[serde(default = "default_write_reports")]
    pub write_reports: bool,

    #[serde(default)]
    pub heatmap: HeatmapParams,
}

/// All tuning constants of the heatmap pipeline.
///
/// Every section falls back to its defaults when missing from the TOML file,
/// so a config only needs to name the values it changes.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct HeatmapParams {
    /// Longest side of the working raster in pixels
    pub max_working_size: u32,
    /// Seed for the jitter/noise generator. `None` draws from entropy.
    pub seed: Option<u64>,
    pub segmentation: SegmentationParams,
    pub baseline: BaselineParams,
    pub deviation: DeviationParams,
    pub spot: SpotParams,
    pub contrast: ContrastParams,
    pub cluster: ClusterParams,
    pub fusion: FusionParams,
    pub suppression: SuppressionParams,
    pub smoothing: SmoothingParams,
    pub normalization: NormalizationParams,
    pub severity: SeverityParams,
    pub overlay: OverlayParams,
}

/// Hue bands and thresholds of the leaf/background classifier
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SegmentationParams {
    pub green_hue: [f32; 2],
    pub green_min_saturation: f32,
    pub green_value_range: [f32; 2],
    pub brown_hue: [f32; 2],
    pub brown_min_saturation: f32,
    pub brown_value_range: [f32; 2],
    pub yellow_green_hue: [f32; 2],
    pub yellow_green_min_saturation: f32,
    /// Lab a* range treated as greenish/neutral chroma (exclusive)
    pub neutral_a_range: [f32; 2],
    pub dark_value: f32,
    pub bright_value: f32,
    pub extreme_value_factor: f32,
    pub washed_out_saturation: f32,
    /// Washed-out pixels are penalised when their value is outside this range
    pub washed_out_value_range: [f32; 2],
    pub washed_out_factor: f32,
    pub score_threshold: f32,
    /// Score for a hue inside the green band, plus bonuses for saturation and value
    pub green_band_score: f32,
    pub green_saturation_bonus: f32,
    pub green_value_bonus: f32,
    /// Lesions and senescent tissue still belong to the leaf
    pub brown_band_score: f32,
    pub brown_value_bonus: f32,
    pub yellow_green_score: f32,
    pub neutral_chroma_score: f32,
    pub open_radius: u8,
    pub close_radius: u8,
    pub fill_radius: u8,
}

/// Sample selection for the healthy-tissue baseline
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BaselineParams {
    pub hue: [f32; 2],
    pub min_saturation: f32,
    pub value_range: [f32; 2],
    pub min_samples: usize,
    pub fallback: HealthyBaseline,
}

/// Channel weights (H, S, V, a*, b*) of the color-deviation signal
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DeviationParams {
    pub weights: [f32; 5],
    pub divisor: f32,
}

/// Lesion color signatures, one section per diagnosis branch
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpotParams {
    /// Hues below this are outside the healthy band
    pub healthy_hue_low: f32,
    /// Hues above this are outside the healthy band
    pub healthy_hue_high: f32,
    pub off_band_bonus: f32,
    pub early: EarlyBlightSpotParams,
    pub late: LateBlightSpotParams,
    pub generic: GenericSpotParams,
}

/// Dark concentric rings, tan lesion body and a chlorotic halo
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EarlyBlightSpotParams {
    pub ring_hue: [f32; 2],
    pub ring_value: [f32; 2],
    /// Ring score is `(ring_value_ceiling - v) * ring_gain`
    pub ring_value_ceiling: f32,
    pub ring_gain: f32,
    pub tan_hue: [f32; 2],
    pub tan_min_saturation: f32,
    pub tan_value: [f32; 2],
    pub tan_score: f32,
    pub halo_hue: [f32; 2],
    pub halo_min_saturation: f32,
    pub halo_min_value: f32,
    pub halo_score: f32,
    /// Both a* and b* must exceed these for the warm-chroma score
    pub warm_min_a: f32,
    pub warm_min_b: f32,
    pub warm_score: f32,
}

/// Near-black necrosis and water-soaked, desaturated tissue
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LateBlightSpotParams {
    pub necrosis_value: [f32; 2],
    /// Necrosis score is `(necrosis_value_ceiling - v) * necrosis_gain`
    pub necrosis_value_ceiling: f32,
    pub necrosis_gain: f32,
    pub water_soaked_saturation: [f32; 2],
    pub water_soaked_hue: [f32; 2],
    pub water_soaked_score: f32,
    pub black_max_value: f32,
    pub black_max_saturation: f32,
    pub black_score: f32,
    /// Hue band wrapping through 0: `h >= red_hue_from || h <= red_hue_to`
    pub red_hue_from: f32,
    pub red_hue_to: f32,
    pub red_score: f32,
}

/// Broad brown/yellow heuristic for any other disease label
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GenericSpotParams {
    pub brown_hue: [f32; 2],
    pub brown_min_saturation: f32,
    pub brown_score: f32,
    pub dark_brown_max_value: f32,
    pub dark_brown_bonus: f32,
    /// Exclusive value range of the darkness score
    pub dark_value: [f32; 2],
    /// Darkness score is `(dark_value_ceiling - v) * dark_gain`
    pub dark_value_ceiling: f32,
    pub dark_gain: f32,
    pub yellow_hue: [f32; 2],
    pub yellow_min_saturation: f32,
    pub yellow_score: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ContrastParams {
    pub half_window: u32,
    pub min_neighbors: usize,
    pub std_gain: f32,
    pub range_gain: f32,
}

/// Scales of the (L*, a*, b*) distance from the baseline mean
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClusterParams {
    pub scale: [f32; 3],
    pub gain: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FusionParams {
    pub deviation_weight: f32,
    pub spot_weight: f32,
    pub contrast_weight: f32,
    pub cluster_weight: f32,
}

/// Multipliers for colors that fire the fused signal without being disease
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SuppressionParams {
    pub shadow_max_value: f32,
    pub shadow_max_saturation: f32,
    pub shadow_factor: f32,
    pub green_hue: [f32; 2],
    pub green_min_saturation: f32,
    pub green_min_value: f32,
    pub green_factor: f32,
    pub glare_min_value: f32,
    pub glare_max_saturation: f32,
    pub glare_factor: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SmoothingParams {
    pub radii: [usize; 3],
    pub blend: [f32; 3],
    pub sigma_divisor: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct NormalizationParams {
    /// Values at or below this are ignored when measuring the range
    pub min_activation: f32,
    pub logistic_gain: f32,
    pub logistic_center: f32,
    /// Range of the random activation assigned to leaf pixels of a healthy leaf
    pub healthy_activation: [f32; 2],
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SeverityParams {
    pub thresholds: [f32; 3],
    pub threshold_weights: [f64; 3],
    pub top_fraction: f64,
    pub top_weight: f64,
    pub exponent: f64,
    pub clamp: [f64; 2],
    pub healthy_range: [f64; 2],
    /// Activation above which a pixel counts towards lesion coverage
    pub lesion_threshold: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct OverlayParams {
    pub alpha: f32,
    /// Per-channel multipliers for non-leaf pixels
    pub background_tint: [f32; 3],
}

fn default_diagnosis_label() -> String {
    "Early Blight".to_string()
}

fn default_parallel() -> bool {
    true
}

fn default_write_reports() -> bool {
    true
}

impl Default for HeatmapParams {
    fn default() -> Self {
        Self {
            max_working_size: 600,
            seed: None,
            segmentation: SegmentationParams::default(),
            baseline: BaselineParams::default(),
            deviation: DeviationParams::default(),
            spot: SpotParams::default(),
            contrast: ContrastParams::default(),
            cluster: ClusterParams::default(),
            fusion: FusionParams::default(),
            suppression: SuppressionParams::default(),
            smoothing: SmoothingParams::default(),
            normalization: NormalizationParams::default(),
            severity: SeverityParams::default(),
            overlay: OverlayParams::default(),
        }
    }
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            green_hue: [40.0, 160.0],
            green_min_saturation: 0.15,
            green_value_range: [0.15, 0.95],
            brown_hue: [5.0, 55.0],
            brown_min_saturation: 0.15,
            brown_value_range: [0.1, 0.8],
            yellow_green_hue: [50.0, 85.0],
            yellow_green_min_saturation: 0.2,
            neutral_a_range: [-50.0, 25.0],
            dark_value: 0.08,
            bright_value: 0.97,
            extreme_value_factor: 0.1,
            washed_out_saturation: 0.08,
            washed_out_value_range: [0.3, 0.7],
            washed_out_factor: 0.2,
            score_threshold: 0.4,
            green_band_score: 0.4,
            green_saturation_bonus: 0.2,
            green_value_bonus: 0.2,
            brown_band_score: 0.5,
            brown_value_bonus: 0.2,
            yellow_green_score: 0.4,
            neutral_chroma_score: 0.3,
            open_radius: 2,
            close_radius: 5,
            fill_radius: 3,
        }
    }
}

impl Default for BaselineParams {
    fn default() -> Self {
        Self {
            hue: [60.0, 150.0],
            min_saturation: 0.2,
            value_range: [0.2, 0.9],
            min_samples: 50,
            fallback: HealthyBaseline {
                hue: ChannelStats::new(100.0, 20.0),
                saturation: ChannelStats::new(0.4, 0.15),
                value: ChannelStats::new(0.5, 0.15),
                lightness: ChannelStats::new(45.0, 15.0),
                a: ChannelStats::new(-15.0, 10.0),
                b: ChannelStats::new(25.0, 12.0),
            },
        }
    }
}

impl Default for DeviationParams {
    fn default() -> Self {
        Self {
            weights: [0.25, 0.15, 0.15, 0.30, 0.15],
            divisor: 3.0,
        }
    }
}

impl Default for SpotParams {
    fn default() -> Self {
        Self {
            healthy_hue_low: 50.0,
            healthy_hue_high: 155.0,
            off_band_bonus: 0.2,
            early: EarlyBlightSpotParams::default(),
            late: LateBlightSpotParams::default(),
            generic: GenericSpotParams::default(),
        }
    }
}

impl Default for EarlyBlightSpotParams {
    fn default() -> Self {
        Self {
            ring_hue: [10.0, 45.0],
            ring_value: [0.1, 0.4],
            ring_value_ceiling: 0.45,
            ring_gain: 2.0,
            tan_hue: [20.0, 50.0],
            tan_min_saturation: 0.25,
            tan_value: [0.3, 0.65],
            tan_score: 0.6,
            halo_hue: [45.0, 65.0],
            halo_min_saturation: 0.3,
            halo_min_value: 0.5,
            halo_score: 0.4,
            warm_min_a: 5.0,
            warm_min_b: 20.0,
            warm_score: 0.3,
        }
    }
}

impl Default for LateBlightSpotParams {
    fn default() -> Self {
        Self {
            necrosis_value: [0.08, 0.35],
            necrosis_value_ceiling: 0.4,
            necrosis_gain: 1.8,
            water_soaked_saturation: [0.1, 0.4],
            water_soaked_hue: [15.0, 60.0],
            water_soaked_score: 0.5,
            black_max_value: 0.2,
            black_max_saturation: 0.3,
            black_score: 0.7,
            red_hue_from: 280.0,
            red_hue_to: 20.0,
            red_score: 0.25,
        }
    }
}

impl Default for GenericSpotParams {
    fn default() -> Self {
        Self {
            brown_hue: [10.0, 50.0],
            brown_min_saturation: 0.2,
            brown_score: 0.5,
            dark_brown_max_value: 0.5,
            dark_brown_bonus: 0.3,
            dark_value: [0.08, 0.35],
            dark_value_ceiling: 0.4,
            dark_gain: 1.5,
            yellow_hue: [45.0, 70.0],
            yellow_min_saturation: 0.3,
            yellow_score: 0.35,
        }
    }
}

impl Default for ContrastParams {
    fn default() -> Self {
        Self {
            half_window: 3,
            min_neighbors: 8,
            std_gain: 8.0,
            range_gain: 2.0,
        }
    }
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            scale: [50.0, 60.0, 60.0],
            gain: 1.5,
        }
    }
}

impl Default for FusionParams {
    fn default() -> Self {
        Self {
            deviation_weight: 0.25,
            spot_weight: 0.35,
            contrast_weight: 0.15,
            cluster_weight: 0.25,
        }
    }
}

impl Default for SuppressionParams {
    fn default() -> Self {
        Self {
            shadow_max_value: 0.12,
            shadow_max_saturation: 0.15,
            shadow_factor: 0.3,
            green_hue: [80.0, 140.0],
            green_min_saturation: 0.5,
            green_min_value: 0.3,
            green_factor: 0.4,
            glare_min_value: 0.92,
            glare_max_saturation: 0.2,
            glare_factor: 0.2,
        }
    }
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            radii: [3, 8, 15],
            blend: [0.25, 0.5, 0.25],
            sigma_divisor: 2.5,
        }
    }
}

impl Default for NormalizationParams {
    fn default() -> Self {
        Self {
            min_activation: 0.02,
            logistic_gain: 6.0,
            logistic_center: 0.5,
            healthy_activation: [0.05, 0.15],
        }
    }
}

impl Default for SeverityParams {
    fn default() -> Self {
        Self {
            thresholds: [0.25, 0.45, 0.65],
            threshold_weights: [0.15, 0.25, 0.35],
            top_fraction: 0.05,
            top_weight: 0.25,
            exponent: 0.85,
            clamp: [0.05, 0.95],
            healthy_range: [0.02, 0.05],
            lesion_threshold: 0.4,
        }
    }
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            alpha: 0.55,
            background_tint: [0.3, 0.3, 0.4],
        }
    }
}

fn check_range(name: &str, range: [f32; 2]) -> Result<()> {
    if range[0] > range[1] {
        return Err(HeatmapError::Config(format!(
            "{} must be ordered [low, high], got [{}, {}]",
            name, range[0], range[1]
        )));
    }
    Ok(())
}

impl HeatmapParams {
    /// Reject parameter sets the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_working_size == 0 {
            return Err(HeatmapError::Config(
                "max_working_size must be > 0".to_string(),
            ));
        }

        let seg = &self.segmentation;
        check_range("segmentation.green_hue", seg.green_hue)?;
        check_range("segmentation.green_value_range", seg.green_value_range)?;
        check_range("segmentation.brown_hue", seg.brown_hue)?;
        check_range("segmentation.brown_value_range", seg.brown_value_range)?;
        check_range("segmentation.yellow_green_hue", seg.yellow_green_hue)?;
        check_range("segmentation.neutral_a_range", seg.neutral_a_range)?;
        check_range("segmentation.washed_out_value_range", seg.washed_out_value_range)?;

        let early = &self.spot.early;
        check_range("spot.early.ring_hue", early.ring_hue)?;
        check_range("spot.early.ring_value", early.ring_value)?;
        check_range("spot.early.tan_hue", early.tan_hue)?;
        check_range("spot.early.tan_value", early.tan_value)?;
        check_range("spot.early.halo_hue", early.halo_hue)?;
        let late = &self.spot.late;
        check_range("spot.late.necrosis_value", late.necrosis_value)?;
        check_range("spot.late.water_soaked_saturation", late.water_soaked_saturation)?;
        check_range("spot.late.water_soaked_hue", late.water_soaked_hue)?;
        let generic = &self.spot.generic;
        check_range("spot.generic.brown_hue", generic.brown_hue)?;
        check_range("spot.generic.dark_value", generic.dark_value)?;
        check_range("spot.generic.yellow_hue", generic.yellow_hue)?;

        check_range("baseline.hue", self.baseline.hue)?;
        check_range("baseline.value_range", self.baseline.value_range)?;
        if !self.baseline.fallback.has_positive_spread() {
            return Err(HeatmapError::Config(
                "baseline.fallback standard deviations must all be > 0".to_string(),
            ));
        }

        if self.deviation.divisor <= 0.0 {
            return Err(HeatmapError::Config(
                "deviation.divisor must be > 0.0".to_string(),
            ));
        }

        if self.contrast.half_window == 0 {
            return Err(HeatmapError::Config(
                "contrast.half_window must be > 0".to_string(),
            ));
        }

        if self.cluster.scale.iter().any(|s| *s <= 0.0) {
            return Err(HeatmapError::Config(
                "cluster.scale entries must be > 0.0".to_string(),
            ));
        }

        if self.fusion.total_weight() <= 0.0 {
            return Err(HeatmapError::Config(
                "fusion weights must sum to > 0.0".to_string(),
            ));
        }

        check_range("suppression.green_hue", self.suppression.green_hue)?;

        if self.smoothing.radii.iter().any(|r| *r == 0) {
            return Err(HeatmapError::Config(
                "smoothing.radii must all be > 0".to_string(),
            ));
        }
        if self.smoothing.sigma_divisor <= 0.0 {
            return Err(HeatmapError::Config(
                "smoothing.sigma_divisor must be > 0.0".to_string(),
            ));
        }

        check_range(
            "normalization.healthy_activation",
            self.normalization.healthy_activation,
        )?;

        let sev = &self.severity;
        if sev.top_fraction <= 0.0 || sev.top_fraction > 1.0 {
            return Err(HeatmapError::Config(
                "severity.top_fraction must be in (0.0, 1.0]".to_string(),
            ));
        }
        if sev.clamp[0] > sev.clamp[1] || sev.healthy_range[0] > sev.healthy_range[1] {
            return Err(HeatmapError::Config(
                "severity.clamp and severity.healthy_range must be ordered [low, high]".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.overlay.alpha) {
            return Err(HeatmapError::Config(
                "overlay.alpha must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }
}

impl FusionParams {
    pub fn total_weight(&self) -> f32 {
        self.deviation_weight + self.spot_weight + self.contrast_weight + self.cluster_weight
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: "./input".to_string(),
            output_base_dir: "./output".to_string(),
            diagnosis_label: default_diagnosis_label(),
            use_parallel: true,
            write_reports: true,
            heatmap: HeatmapParams::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            HeatmapError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| HeatmapError::ConfigLoad {
            source: e,
            path: path.to_path_buf(),
        })?;

        Ok(config)
    }

    /// Validate configuration and create the output directories
    pub fn validate(&self) -> Result<()> {
        let input_path = PathBuf::from(&self.input_path);
        if !input_path.exists() {
            return Err(HeatmapError::InvalidPath(input_path));
        }

        if self.diagnosis_label.trim().is_empty() {
            return Err(HeatmapError::Config(
                "diagnosis_label must not be empty".to_string(),
            ));
        }

        self.heatmap.validate()?;

        let overlay_dir = PathBuf::from(&self.output_base_dir).join("overlays");
        fs::create_dir_all(&overlay_dir).map_err(|e| {
            HeatmapError::Io(io::Error::new(
                ErrorKind::Other,
                format!("Failed to create overlay output directory: {}", e),
            ))
        })?;

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            HeatmapError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        assert!(HeatmapParams::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let text = r#"
            input_path = "leaves"
            output_base_dir = "out"

            [heatmap]
            seed = 7

            [heatmap.overlay]
            alpha = 0.7

            [heatmap.segmentation]
            brown_band_score = 0.6

            [heatmap.spot.early]
            tan_score = 0.5

            [heatmap.spot.late]
            red_hue_from = 300.0
        "#;
        let config: Config = toml::from_str(text).unwrap();
        assert_eq!(config.heatmap.seed, Some(7));
        assert_eq!(config.heatmap.overlay.alpha, 0.7);
        assert_eq!(config.heatmap.overlay.background_tint, [0.3, 0.3, 0.4]);
        assert_eq!(config.heatmap.smoothing.radii, [3, 8, 15]);
        assert_eq!(config.heatmap.segmentation.brown_band_score, 0.6);
        assert_eq!(config.heatmap.segmentation.green_band_score, 0.4);
        assert_eq!(config.heatmap.segmentation.neutral_chroma_score, 0.3);
        assert_eq!(config.heatmap.spot.early.tan_score, 0.5);
        assert_eq!(config.heatmap.spot.early.ring_hue, [10.0, 45.0]);
        assert_eq!(config.heatmap.spot.late.red_hue_from, 300.0);
        assert_eq!(config.heatmap.spot.late.black_score, 0.7);
        assert_eq!(config.heatmap.spot.generic, GenericSpotParams::default());
        assert_eq!(config.heatmap.spot.off_band_bonus, 0.2);
        assert_eq!(config.diagnosis_label, "Early Blight");
        assert!(config.use_parallel);
    }

    #[test]
    fn rejects_inverted_spot_band() {
        let mut params = HeatmapParams::default();
        params.spot.late.water_soaked_hue = [60.0, 15.0];
        assert!(matches!(params.validate(), Err(HeatmapError::Config(_))));
    }

    #[test]
    fn rejects_zero_blur_radius() {
        let mut params = HeatmapParams::default();
        params.smoothing.radii = [3, 0, 15];
        assert!(matches!(params.validate(), Err(HeatmapError::Config(_))));
    }

    #[test]
    fn rejects_alpha_out_of_range() {
        let mut params = HeatmapParams::default();
        params.overlay.alpha = 1.5;
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_inverted_hue_band() {
        let mut params = HeatmapParams::default();
        params.baseline.hue = [150.0, 60.0];
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_zero_fusion_weights() {
        let mut params = HeatmapParams::default();
        params.fusion = FusionParams {
            deviation_weight: 0.0,
            spot_weight: 0.0,
            contrast_weight: 0.0,
            cluster_weight: 0.0,
        };
        assert!(params.validate().is_err());
    }
}
