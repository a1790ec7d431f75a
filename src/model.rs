use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use tch::{kind::Kind, CModule, Device, Tensor};

use crate::catalog;
use crate::schema::{FeatureVector, FEATURE_COUNT};

pub const CLASSIFIER_FILE: &str = "crop_classifier.pt";
pub const SCALER_FILE: &str = "scaler.json";
pub const LABEL_ENCODER_FILE: &str = "label_encoder.json";

#[derive(Deserialize)]
struct ScalerJson {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

#[derive(Deserialize)]
struct LabelEncoderJson {
    classes: Vec<String>,
}

/// The three artifacts loaded once at startup and shared read-only across
/// requests: TorchScript classifier, fitted standard-scaler parameters, and
/// the index -> group-label encoding.
pub struct ModelBundle {
    classifier: CModule,
    device: Device,
    mean: Vec<f64>,
    scale: Vec<f64>,
    classes: Vec<String>,
}

impl ModelBundle {
    /// Load all three artifacts from `dir`, failing fast on any missing file,
    /// shape mismatch, or a model class absent from the enrichment catalog.
    pub fn load(dir: &Path) -> Result<Self> {
        let scaler_path = dir.join(SCALER_FILE);
        let scaler_txt = fs::read_to_string(&scaler_path)
            .with_context(|| format!("failed to read scaler at {}", scaler_path.display()))?;
        let scaler: ScalerJson =
            serde_json::from_str(&scaler_txt).with_context(|| "failed to parse scaler.json")?;
        if scaler.mean.len() != FEATURE_COUNT || scaler.scale.len() != FEATURE_COUNT {
            bail!(
                "scaler dimensions mismatch: mean[{}] scale[{}], expected {}",
                scaler.mean.len(),
                scaler.scale.len(),
                FEATURE_COUNT
            );
        }
        if scaler.scale.iter().any(|s| *s == 0.0) {
            bail!("scaler has a zero scale entry");
        }

        let encoder_path = dir.join(LABEL_ENCODER_FILE);
        let encoder_txt = fs::read_to_string(&encoder_path)
            .with_context(|| format!("failed to read label encoder at {}", encoder_path.display()))?;
        let encoder: LabelEncoderJson = serde_json::from_str(&encoder_txt)
            .with_context(|| "failed to parse label_encoder.json")?;
        if encoder.classes.is_empty() {
            bail!("label encoder has no classes");
        }

        // The catalog's keys must cover every label the model can emit;
        // otherwise enrichment would be silently empty for that label.
        let missing = missing_from_catalog(&encoder.classes);
        if !missing.is_empty() {
            bail!("catalog has no entry for model classes: {}", missing.join(", "));
        }

        let device = Device::Cpu;
        let classifier_path = dir.join(CLASSIFIER_FILE);
        let classifier = CModule::load_on_device(&classifier_path, device)
            .with_context(|| format!("failed to load TorchScript {}", classifier_path.display()))?;

        // Probe output shape with a dummy forward — expect [1, C] logits with
        // C matching the encoder's class count.
        let dummy = Tensor::zeros([1, FEATURE_COUNT as i64], (Kind::Float, device));
        let out = classifier.forward_ts(&[dummy])?;
        let sz = out.size();
        if sz.len() != 2 || sz[0] != 1 {
            bail!("unexpected classifier output size: {:?}", sz);
        }
        if sz[1] != encoder.classes.len() as i64 {
            bail!(
                "classifier emits {} classes but label encoder has {}",
                sz[1],
                encoder.classes.len()
            );
        }

        Ok(Self {
            classifier,
            device,
            mean: scaler.mean,
            scale: scaler.scale,
            classes: encoder.classes,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// One forward pass on zeros so the first real request does not pay the
    /// TorchScript JIT cost.
    pub fn warmup(&self) -> Result<()> {
        self.predict(&FeatureVector([0.0; FEATURE_COUNT]))?;
        Ok(())
    }

    /// Scale, forward, softmax, and rank: returns every (label, probability)
    /// pair in descending probability order. Probabilities sum to 1 within
    /// floating-point tolerance.
    pub fn predict(&self, features: &FeatureVector) -> Result<Vec<(String, f64)>> {
        let scaled = standardize(features.as_slice(), &self.mean, &self.scale);
        let scaled_f32: Vec<f32> = scaled.iter().map(|v| *v as f32).collect();

        let input = Tensor::from_slice(&scaled_f32)
            .reshape([1, FEATURE_COUNT as i64])
            .to_device(self.device);

        let logits = self.classifier.forward_ts(&[input])?;
        let sz = logits.size();
        if sz.len() != 2 || sz[0] != 1 || sz[1] != self.classes.len() as i64 {
            bail!("unexpected logits shape: {:?}", sz);
        }

        let probs_t = logits.softmax(1, Kind::Double).reshape([-1]);
        let probs = Vec::<f64>::try_from(&probs_t)
            .with_context(|| "failed to extract probabilities")?;

        let ranked = rank_descending(&probs)
            .into_iter()
            .map(|i| (self.classes[i].clone(), probs[i]))
            .collect();
        Ok(ranked)
    }
}

/// Standard-scaler transform: (x - mean) / scale, elementwise.
pub fn standardize(x: &[f64], mean: &[f64], scale: &[f64]) -> Vec<f64> {
    x.iter()
        .zip(mean.iter().zip(scale.iter()))
        .map(|(v, (m, s))| (v - m) / s)
        .collect()
}

/// Class indices sorted by descending probability. Stable sort, so ties keep
/// the encoder's natural class order.
pub fn rank_descending(probs: &[f64]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..probs.len()).collect();
    idx.sort_by(|&a, &b| probs[b].partial_cmp(&probs[a]).unwrap_or(Ordering::Equal));
    idx
}

/// Model classes the enrichment catalog does not cover.
pub fn missing_from_catalog(classes: &[String]) -> Vec<String> {
    classes
        .iter()
        .filter(|c| !catalog::known_groups().any(|g| g == c.as_str()))
        .cloned()
        .collect()
}
