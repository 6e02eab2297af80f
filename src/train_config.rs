//! Detector training configuration.
//!
//! Serializes to the JSON form of an mmdetection config (mmcv's
//! `Config.fromfile` accepts `.json`). It layers training hyperparameters
//! on top of a cascade R-CNN base config and a dataset config; this crate
//! only writes the file and never trains.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PrepError;

pub const DEFAULT_BASE_DIR: &str = "/workdir/configs/mmdetection";

const BASE_CONFIGS: [&str; 2] = ["detectors_cascade_rcnn_r50_1x_coco.py", "dataset.py"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(rename = "_base_")]
    pub base: Vec<String>,
    pub model: ModelOverrides,
    pub optimizer: Optimizer,
    pub optimizer_config: OptimizerConfig,
    pub lr_config: LrConfig,
    pub total_epochs: u32,
    pub evaluation: Evaluation,
    pub log_config: LogConfig,
    pub fp16: Fp16,
    pub custom_hooks: Vec<Hook>,
    pub dist_params: DistParams,
    pub log_level: String,
    pub load_from: Option<String>,
    pub resume_from: Option<String>,
    pub workflow: Vec<(String, u32)>,
    pub checkpoint_config: CheckpointConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelOverrides {
    pub backbone: BackboneOverrides,
    pub test_cfg: TestCfg,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackboneOverrides {
    pub norm_cfg: NormCfg,
    pub norm_eval: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormCfg {
    #[serde(rename = "type")]
    pub kind: String,
    pub requires_grad: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestCfg {
    pub rcnn: RcnnTestCfg,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RcnnTestCfg {
    pub score_thr: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Optimizer {
    #[serde(rename = "type")]
    pub kind: String,
    pub lr: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub grad_clip: GradClip,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradClip {
    pub max_norm: f64,
    pub norm_type: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LrConfig {
    pub policy: String,
    pub warmup: String,
    pub warmup_iters: u32,
    pub warmup_ratio: f64,
    pub min_lr_ratio: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub interval: u32,
    pub iou_thr: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    pub interval: u32,
    pub hooks: Vec<Hook>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hook {
    #[serde(rename = "type")]
    pub kind: String,
}

impl Hook {
    fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fp16 {
    pub loss_scale: LossScale,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LossScale {
    pub mode: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistParams {
    pub backend: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckpointConfig {
    pub interval: u32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            base: base_paths(DEFAULT_BASE_DIR),
            model: ModelOverrides {
                backbone: BackboneOverrides {
                    norm_cfg: NormCfg {
                        kind: "SyncBN".to_string(),
                        requires_grad: true,
                    },
                    norm_eval: false,
                },
                test_cfg: TestCfg {
                    rcnn: RcnnTestCfg { score_thr: 1e-4 },
                },
            },
            optimizer: Optimizer {
                kind: "Adam".to_string(),
                lr: 4e-5,
            },
            optimizer_config: OptimizerConfig {
                grad_clip: GradClip {
                    max_norm: 35.0,
                    norm_type: 2,
                },
            },
            lr_config: LrConfig {
                policy: "CosineAnnealing".to_string(),
                warmup: "linear".to_string(),
                warmup_iters: 1000,
                warmup_ratio: 1.0 / 5.0,
                min_lr_ratio: 1e-8,
            },
            total_epochs: 50,
            evaluation: Evaluation {
                interval: 2,
                iou_thr: 0.4,
            },
            log_config: LogConfig {
                interval: 50,
                hooks: vec![Hook::new("TextLoggerHook"), Hook::new("TensorboardLoggerHook")],
            },
            fp16: Fp16 {
                loss_scale: LossScale {
                    mode: "dynamic".to_string(),
                },
            },
            custom_hooks: vec![Hook::new("NumClassCheckHook")],
            dist_params: DistParams {
                backend: "nccl".to_string(),
            },
            log_level: "INFO".to_string(),
            load_from: None,
            resume_from: None,
            workflow: vec![("train".to_string(), 1)],
            checkpoint_config: CheckpointConfig { interval: 1 },
        }
    }
}

fn base_paths(base_dir: &str) -> Vec<String> {
    let base_dir = base_dir.trim_end_matches('/');
    BASE_CONFIGS
        .iter()
        .map(|name| format!("{base_dir}/{name}"))
        .collect()
}

impl TrainingConfig {
    /// Points `_base_` at config files under `base_dir`.
    pub fn with_base_dir(mut self, base_dir: &str) -> Self {
        self.base = base_paths(base_dir);
        self
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        if self.optimizer.lr.is_nan() || self.optimizer.lr <= 0.0 {
            return Err(PrepError::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.optimizer.lr
            )));
        }
        if self.total_epochs == 0 {
            return Err(PrepError::InvalidConfig(
                "total_epochs must be positive".to_string(),
            ));
        }
        if self.evaluation.interval == 0 || self.checkpoint_config.interval == 0 {
            return Err(PrepError::InvalidConfig(
                "evaluation and checkpoint intervals must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, PrepError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), PrepError> {
        let mut json = self.to_json_string()?;
        json.push('\n');
        fs::write(path, json).map_err(PrepError::Io)
    }
}
