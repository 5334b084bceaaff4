//! Candle-based inference backend for the sentence embedder and the NER tagger.
//!
//! Pure-Rust ML runtime using candle with Metal GPU acceleration on macOS.
//! Provides [`BertEmbedder`] for sentence embeddings (BGE-small/base/large)
//! and [`TokenClassifier`] for BIO-tagged named entity recognition.

use std::path::PathBuf;

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::{Encoding, PaddingParams, PaddingStrategy, Tokenizer};

/// Paths to downloaded model files from HuggingFace Hub.
pub struct ModelFiles {
    pub config_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub weights_path: PathBuf,
}

/// Download model files from HuggingFace Hub.
///
/// Uses `hf_hub::api::sync::Api` which caches at `~/.cache/huggingface/hub/`
/// unless `cache_dir` is given. Call from `spawn_blocking`: this is synchronous I/O.
pub fn download_model(repo_id: &str, cache_dir: Option<&str>) -> Result<ModelFiles> {
    let api = match cache_dir {
        Some(dir) => hf_hub::api::sync::ApiBuilder::new()
            .with_cache_dir(PathBuf::from(dir))
            .build(),
        None => hf_hub::api::sync::Api::new(),
    }
    .context("Failed to initialize HuggingFace Hub API")?;
    let repo = api.model(repo_id.to_string());

    let config_path = repo
        .get("config.json")
        .context("Failed to download config.json")?;
    let tokenizer_path = repo
        .get("tokenizer.json")
        .context("Failed to download tokenizer.json")?;
    let weights_path = repo
        .get("model.safetensors")
        .context("Failed to download model.safetensors")?;

    Ok(ModelFiles {
        config_path,
        tokenizer_path,
        weights_path,
    })
}

/// Select the best available compute device.
///
/// Tries Metal (macOS) or CUDA if the corresponding feature is enabled, and
/// falls back to CPU when the GPU backend lacks a layer-norm kernel.
pub fn select_device() -> Device {
    #[cfg(target_os = "macos")]
    {
        if let Ok(device) = Device::new_metal(0) {
            if probe_layer_norm(&device) {
                tracing::info!("Using Metal GPU for inference");
                return device;
            }
            tracing::warn!("Metal GPU available but layer-norm not supported, falling back to CPU");
        }
    }
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            if probe_layer_norm(&device) {
                tracing::info!("Using CUDA GPU for inference");
                return device;
            }
            tracing::warn!("CUDA GPU available but layer-norm not supported, falling back to CPU");
        }
    }
    tracing::info!("Using CPU for inference");
    Device::Cpu
}

/// Probe whether a device supports layer-norm (required by BERT).
#[cfg(any(target_os = "macos", feature = "cuda"))]
fn probe_layer_norm(device: &Device) -> bool {
    use candle_nn::{LayerNorm, Module};

    (|| -> candle_core::Result<()> {
        let weight = Tensor::ones(4, DType::F32, device)?;
        let bias = Tensor::zeros(4, DType::F32, device)?;
        let ln = LayerNorm::new(weight, bias, 1e-5);
        let input = Tensor::randn(0f32, 1.0, (1, 4), device)?;
        let _ = ln.forward(&input)?;
        Ok(())
    })()
    .is_ok()
}

fn load_tokenizer(path: &std::path::Path) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::from_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::BatchLongest,
        ..Default::default()
    }));
    Ok(tokenizer)
}

/// Batched BERT inputs built from tokenizer encodings.
struct BatchInputs {
    input_ids: Tensor,
    attention_mask: Tensor,
    token_type_ids: Tensor,
}

fn batch_inputs(encodings: &[Encoding], device: &Device) -> Result<BatchInputs> {
    let batch_size = encodings.len();
    let max_len = encodings
        .iter()
        .map(|e| e.get_ids().len())
        .max()
        .unwrap_or(0);

    let flatten = |f: fn(&Encoding) -> &[u32]| -> Vec<u32> {
        encodings.iter().flat_map(|e| f(e).to_vec()).collect()
    };

    Ok(BatchInputs {
        input_ids: Tensor::from_vec(flatten(Encoding::get_ids), (batch_size, max_len), device)?,
        attention_mask: Tensor::from_vec(
            flatten(Encoding::get_attention_mask),
            (batch_size, max_len),
            device,
        )?,
        token_type_ids: Tensor::from_vec(
            flatten(Encoding::get_type_ids),
            (batch_size, max_len),
            device,
        )?,
    })
}

/// BERT-based sentence embedder using candle.
///
/// Mean pooling over token hidden states followed by L2 normalization.
/// Compatible with BGE-small/base/large-en-v1.5 models.
pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    hidden_size: usize,
}

impl BertEmbedder {
    /// Load a BERT embedding model from downloaded files.
    pub fn new(files: &ModelFiles, device: Device) -> Result<Self> {
        let config_str =
            std::fs::read_to_string(&files.config_path).context("Failed to read model config")?;
        let config: BertConfig =
            serde_json::from_str(&config_str).context("Failed to parse BERT config")?;
        let tokenizer = load_tokenizer(&files.tokenizer_path)?;

        // SAFETY: mmap'd safetensors file, safe as long as the file is not modified
        // while the model is in use.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&files.weights_path], DType::F32, &device)
                .context("Failed to load model weights")?
        };
        let hidden_size = config.hidden_size;
        let model = BertModel::load(vb, &config).context("Failed to construct BERT model")?;

        Ok(Self {
            model,
            tokenizer,
            device,
            hidden_size,
        })
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Embed a batch of texts, one unit-length vector per input.
    pub fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let str_refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        let encodings = self
            .tokenizer
            .encode_batch(str_refs, true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;
        let inputs = batch_inputs(&encodings, &self.device)?;

        // [batch, seq_len, hidden_size]
        let output = self.model.forward(
            &inputs.input_ids,
            &inputs.token_type_ids,
            Some(&inputs.attention_mask),
        )?;

        // Mean pooling: mask padding tokens, sum, divide by token count
        let mask_f32 = inputs.attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = output.broadcast_mul(&mask_f32)?.sum(1)?;
        let counts = mask_f32.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?;

        let norms = pooled.sqr()?.sum_keepdim(1)?.sqrt()?;
        let normalized = pooled.broadcast_div(&norms)?;

        normalized
            .to_vec2::<f32>()
            .context("Failed to convert embeddings to Vec")
    }
}

/// A named entity span recognised by the [`TokenClassifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedEntity {
    /// Entity text as it appears in the input
    pub text: String,
    /// Entity type without the BIO prefix (PER, LOC, ORG, MISC)
    pub label: String,
    /// Average confidence across the span's tokens
    pub score: f32,
    pub start: usize,
    pub end: usize,
}

/// Token-level BERT classifier for BIO-tagged named entity recognition.
///
/// Compatible with BERT NER checkpoints such as dslim/bert-base-NER.
pub struct TokenClassifier {
    model: BertModel,
    classifier_weight: Tensor,
    classifier_bias: Tensor,
    tokenizer: Tokenizer,
    device: Device,
    labels: Vec<String>,
}

impl TokenClassifier {
    /// Load a token classifier from downloaded model files.
    ///
    /// BERT weights live under `bert.*`, the linear head under `classifier.*`.
    pub fn new(files: &ModelFiles, device: Device) -> Result<Self> {
        let config_str = std::fs::read_to_string(&files.config_path)
            .context("Failed to read token classifier config")?;
        let config: BertConfig =
            serde_json::from_str(&config_str).context("Failed to parse BERT config")?;
        let config_json: serde_json::Value =
            serde_json::from_str(&config_str).context("Failed to parse config as JSON")?;
        let labels = parse_id2label(&config_json)?;
        let num_labels = labels.len();

        let tokenizer = load_tokenizer(&files.tokenizer_path)?;

        // SAFETY: mmap'd safetensors file, safe as long as the file is not modified.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&files.weights_path], DType::F32, &device)
                .context("Failed to load NER weights")?
        };

        let classifier_weight = vb
            .pp("classifier")
            .get((num_labels, config.hidden_size), "weight")
            .context("Failed to load classifier.weight")?;
        let classifier_bias = vb
            .pp("classifier")
            .get(num_labels, "bias")
            .context("Failed to load classifier.bias")?;
        let model = BertModel::load(vb.pp("bert"), &config)
            .context("Failed to construct BERT model for NER")?;

        Ok(Self {
            model,
            classifier_weight,
            classifier_bias,
            tokenizer,
            device,
            labels,
        })
    }

    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    /// Extract entity spans from one text.
    pub fn extract(&self, text: &str) -> Result<Vec<RecognizedEntity>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("NER tokenization failed: {}", e))?;
        let inputs = batch_inputs(std::slice::from_ref(&encoding), &self.device)?;

        let hidden_states = self.model.forward(
            &inputs.input_ids,
            &inputs.token_type_ids,
            Some(&inputs.attention_mask),
        )?;

        // hidden @ W^T + b -> [1, seq_len, num_labels]
        let logits = hidden_states
            .broadcast_matmul(&self.classifier_weight.t()?)?
            .broadcast_add(&self.classifier_bias)?;
        let probs = candle_nn::ops::softmax(&logits, 2)?.to_vec3::<f32>()?;
        let token_probs = probs.into_iter().next().unwrap_or_default();

        let tags: Vec<Option<(String, f32)>> = token_probs
            .iter()
            .enumerate()
            .map(|(idx, probs)| {
                if encoding.get_special_tokens_mask().get(idx).copied() != Some(0) {
                    return None;
                }
                let (best_idx, best_prob) = probs
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| a.total_cmp(b))?;
                Some((self.labels.get(best_idx)?.clone(), *best_prob))
            })
            .collect();

        Ok(merge_bio_tags(&tags, encoding.get_offsets(), text))
    }
}

/// Read `id2label` from a HuggingFace config into index order.
fn parse_id2label(config_json: &serde_json::Value) -> Result<Vec<String>> {
    let id2label = config_json
        .get("id2label")
        .and_then(|v| v.as_object())
        .context("config.json missing id2label mapping")?;

    let mut entries: Vec<(usize, String)> = id2label
        .iter()
        .filter_map(|(k, v)| Some((k.parse().ok()?, v.as_str()?.to_string())))
        .collect();
    entries.sort_by_key(|(idx, _)| *idx);

    if entries.is_empty() {
        anyhow::bail!("id2label is empty, cannot determine label count");
    }
    Ok(entries.into_iter().map(|(_, label)| label).collect())
}

/// Open span being accumulated while walking BIO tags.
struct OpenSpan {
    label: String,
    start: usize,
    end: usize,
    scores: Vec<f32>,
}

impl OpenSpan {
    fn close(self, text: &str, out: &mut Vec<RecognizedEntity>) {
        let Some(surface) = text.get(self.start..self.end) else {
            return;
        };
        let surface = surface.trim();
        if surface.is_empty() {
            return;
        }
        let score = self.scores.iter().sum::<f32>() / self.scores.len() as f32;
        out.push(RecognizedEntity {
            text: surface.to_string(),
            label: self.label,
            score,
            start: self.start,
            end: self.end,
        });
    }
}

/// Merge per-token BIO tags into entity spans.
///
/// `None` tags mark special tokens and close any open span. Orphan `I-` tags
/// open a new span.
pub(crate) fn merge_bio_tags(
    tags: &[Option<(String, f32)>],
    offsets: &[(usize, usize)],
    text: &str,
) -> Vec<RecognizedEntity> {
    let mut entities = Vec::new();
    let mut open: Option<OpenSpan> = None;

    for (idx, tag) in tags.iter().enumerate() {
        let Some((tag, prob)) = tag else {
            if let Some(span) = open.take() {
                span.close(text, &mut entities);
            }
            continue;
        };
        let Some(&(tok_start, tok_end)) = offsets.get(idx) else {
            continue;
        };

        let continues = tag.strip_prefix("I-").and_then(|kind| {
            open.as_ref()
                .filter(|span| span.label == kind)
                .map(|_| kind)
        });
        if continues.is_some() {
            if let Some(span) = open.as_mut() {
                span.end = tok_end;
                span.scores.push(*prob);
            }
            continue;
        }

        if let Some(span) = open.take() {
            span.close(text, &mut entities);
        }
        if let Some(kind) = tag.strip_prefix("B-").or_else(|| tag.strip_prefix("I-")) {
            open = Some(OpenSpan {
                label: kind.to_string(),
                start: tok_start,
                end: tok_end,
                scores: vec![*prob],
            });
        }
    }

    if let Some(span) = open {
        span.close(text, &mut entities);
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(label: &str) -> Option<(String, f32)> {
        Some((label.to_string(), 0.9))
    }

    #[test]
    fn test_merge_bio_tags_joins_continuations() {
        let text = "Ada Lovelace met Babbage";
        let tags = vec![
            None,
            tag("B-PER"),
            tag("I-PER"),
            tag("O"),
            tag("B-PER"),
            None,
        ];
        let offsets = vec![(0, 0), (0, 3), (4, 12), (13, 16), (17, 24), (0, 0)];
        let entities = merge_bio_tags(&tags, &offsets, text);
        let names: Vec<&str> = entities.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(names, vec!["Ada Lovelace", "Babbage"]);
        assert!(entities.iter().all(|e| e.label == "PER"));
    }

    #[test]
    fn test_merge_bio_tags_orphan_inside_starts_span() {
        let text = "in Paris today";
        let tags = vec![tag("O"), tag("I-LOC"), tag("O")];
        let offsets = vec![(0, 2), (3, 8), (9, 14)];
        let entities = merge_bio_tags(&tags, &offsets, text);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "Paris");
        assert_eq!(entities[0].label, "LOC");
    }

    #[test]
    fn test_merge_bio_tags_label_change_splits() {
        let text = "Acme Paris";
        let tags = vec![tag("B-ORG"), tag("I-LOC")];
        let offsets = vec![(0, 4), (5, 10)];
        let entities = merge_bio_tags(&tags, &offsets, text);
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].label, "ORG");
        assert_eq!(entities[1].label, "LOC");
    }

    #[test]
    fn test_parse_id2label_orders_by_index() {
        let json = serde_json::json!({
            "id2label": { "2": "B-PER", "0": "O", "1": "B-LOC" }
        });
        let labels = parse_id2label(&json).expect("labels");
        assert_eq!(labels, vec!["O", "B-LOC", "B-PER"]);
    }

    #[test]
    fn test_parse_id2label_missing_is_error() {
        assert!(parse_id2label(&serde_json::json!({})).is_err());
    }
}
