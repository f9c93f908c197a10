// src/lib.rs - Library interface for LeafSaliency

pub mod baseline;
pub mod color_space;
pub mod config;
pub mod diagnosis;
pub mod errors;
pub mod field;
pub mod fusion;
pub mod image_io;
pub mod image_utils;
pub mod morphology;
pub mod normalize;
pub mod output;
pub mod overlay;
pub mod pipeline;
pub mod segmentation;
pub mod severity;
pub mod signals;
pub mod smoothing;

// Re-export commonly used types and functions
pub use errors::{HeatmapError, Result};
pub use config::{Config, HeatmapParams};
pub use diagnosis::Diagnosis;
pub use field::{LeafMask, ScalarField};
pub use image_io::{
    InputImage,
    check_unique_output_names,
    decode_image,
    get_image_files_in_dir,
    load_image,
    load_image_under,
    output_name,
    save_image,
};
pub use output::{ScanRecord, write_report_json, write_severity_csv};

// Re-export the pipeline entry points
pub use pipeline::{
    analyze,
    analyze_with_rng,
    generate_heatmap,
    generate_heatmap_from_bytes,
    process_image,
    HeatmapAnalysis,
    HeatmapResult,
};

// Re-export individual stages
pub use baseline::{estimate_baseline, BaselineEstimate, ChannelStats, HealthyBaseline};
pub use color_space::{rgb_to_hsv, rgb_to_lab, Hsv, Lab, PixelColors};
pub use fusion::{fuse_signals, suppress_false_positives};
pub use normalize::normalize;
pub use overlay::{composite_overlay, value_to_jet_color};
pub use segmentation::segment;
pub use severity::{lesion_coverage, score_severity, severity_from_activations};
pub use signals::{compute_signals, SignalMaps};
pub use smoothing::{gaussian_blur, multi_scale_smooth};
