use std::sync::Arc;

use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};

use super::*;
use crate::batch::TripletCollator;
use crate::config::{ComputeTarget, ModelConfig};
use crate::dataset::{Label, TripletExample};
use crate::tokenizer::WhitespaceTokenizer;

const VOCAB_SIZE: usize = 2048;
const EMBEDDING_DIM: usize = 12;
const HIDDEN_SIZE: usize = 8;

fn test_config() -> ModelConfig {
    ModelConfig::default()
        .with_hidden_size(HIDDEN_SIZE)
        .with_max_length(8)
        .with_compute_target(ComputeTarget::Cpu)
}

fn fresh_vb(varmap: &VarMap) -> VarBuilder<'_> {
    VarBuilder::from_varmap(varmap, DType::F32, &Device::Cpu)
}

fn random_model() -> TripletClassifier {
    TripletClassifier::random(VOCAB_SIZE, EMBEDDING_DIM, &test_config(), &Device::Cpu).unwrap()
}

fn collator() -> TripletCollator {
    TripletCollator::new(
        Arc::new(WhitespaceTokenizer::new(VOCAB_SIZE as u32)),
        8,
        Device::Cpu,
    )
}

fn sample_batch() -> crate::batch::TripletBatch {
    collator()
        .collate(&[
            TripletExample::new("cat sat", "cat sits", "dog ran", Label::B),
            TripletExample::new("the quick brown fox", "a slow dog", "the quick fox", Label::C),
            TripletExample::new("", "x", "y z", Label::B),
        ])
        .unwrap()
}

fn assert_close(left: &[f32], right: &[f32], tolerance: f32) {
    assert_eq!(left.len(), right.len());
    for (l, r) in left.iter().zip(right) {
        assert!((l - r).abs() <= tolerance, "{l} != {r} (tolerance {tolerance})");
    }
}

// ==================== Pooling ====================

#[test]
fn test_pooling_single_real_position() {
    let xs = Tensor::new(&[[[0.5f32, -2.0], [9.0, 9.0], [-9.0, -9.0]]], &Device::Cpu).unwrap();
    let mask = Tensor::new(&[[1f32, 0.0, 0.0]], &Device::Cpu).unwrap();

    let mean = masked_mean(&xs, &mask).unwrap().to_vec2::<f32>().unwrap();
    let max = masked_max(&xs, &mask).unwrap().to_vec2::<f32>().unwrap();

    assert_close(&mean[0], &[0.5, -2.0], 1e-6);
    assert_close(&max[0], &[0.5, -2.0], 1e-6);
}

#[test]
fn test_pooling_ignores_padding() {
    let xs = Tensor::new(
        &[[[1.0f32, -1.0], [3.0, -3.0], [100.0, 100.0]]],
        &Device::Cpu,
    )
    .unwrap();
    let mask = Tensor::new(&[[1f32, 1.0, 0.0]], &Device::Cpu).unwrap();

    let mean = masked_mean(&xs, &mask).unwrap().to_vec2::<f32>().unwrap();
    let max = masked_max(&xs, &mask).unwrap().to_vec2::<f32>().unwrap();

    assert_close(&mean[0], &[2.0, -2.0], 1e-6);
    assert_close(&max[0], &[3.0, -1.0], 1e-6);
}

#[test]
fn test_replace_masked() {
    let xs = Tensor::new(&[[[1.0f32], [2.0]]], &Device::Cpu).unwrap();
    let mask = Tensor::new(&[[1f32, 0.0]], &Device::Cpu).unwrap();

    let replaced = replace_masked(&xs, &mask, -7.0)
        .unwrap()
        .flatten_all()
        .unwrap()
        .to_vec1::<f32>()
        .unwrap();
    assert_eq!(replaced, vec![1.0, -7.0]);
}

// ==================== Attention ====================

#[test]
fn test_masked_softmax_zeroes_padding() {
    let scores = Tensor::new(&[[[1.0f32, 2.0, 30.0], [0.0, 0.0, 0.0]]], &Device::Cpu).unwrap();
    let mask = Tensor::new(&[[1f32, 1.0, 0.0]], &Device::Cpu).unwrap();

    let weights = masked_softmax(&scores, &mask).unwrap().to_vec3::<f32>().unwrap();

    for row in &weights[0] {
        assert_eq!(row[2], 0.0);
        assert!((row.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }
    assert_close(&weights[0][1], &[0.5, 0.5, 0.0], 1e-6);
}

#[test]
fn test_soft_align_shapes_and_padding() {
    let a = Tensor::randn(0f32, 1.0, (2, 3, 4), &Device::Cpu).unwrap();
    let b = Tensor::randn(0f32, 1.0, (2, 5, 4), &Device::Cpu).unwrap();
    let a_mask = Tensor::new(&[[1f32, 1.0, 0.0], [1.0, 1.0, 1.0]], &Device::Cpu).unwrap();
    let b_mask = Tensor::new(
        &[[1f32, 0.0, 0.0, 0.0, 0.0], [1.0, 1.0, 1.0, 1.0, 0.0]],
        &Device::Cpu,
    )
    .unwrap();

    let (attended_a, attended_b) = soft_align(&a, &a_mask, &b, &b_mask).unwrap();
    assert_eq!(attended_a.dims(), &[2, 3, 4]);
    assert_eq!(attended_b.dims(), &[2, 5, 4]);

    // Row 0 of `b` has a single real position, so every real `a` position attends to it.
    let attended_a = attended_a.to_vec3::<f32>().unwrap();
    let b_rows = b.to_vec3::<f32>().unwrap();
    assert_close(&attended_a[0][0], &b_rows[0][0], 1e-5);
    assert_close(&attended_a[0][1], &b_rows[0][0], 1e-5);
    assert_close(&attended_a[0][2], &[0.0; 4], 0.0);

    let attended_b = attended_b.to_vec3::<f32>().unwrap();
    assert_close(&attended_b[1][4], &[0.0; 4], 0.0);
}

// ==================== Encoder ====================

#[test]
fn test_bilstm_rejects_odd_width() {
    let varmap = VarMap::new();
    assert!(MaskedBiLstm::new(4, 7, fresh_vb(&varmap)).is_err());
}

#[test]
fn test_bilstm_padding_invariance() {
    let varmap = VarMap::new();
    let lstm = MaskedBiLstm::new(4, 6, fresh_vb(&varmap)).unwrap();
    assert_eq!(lstm.output_dim(), 6);

    let real = Tensor::randn(0f32, 1.0, (1, 3, 4), &Device::Cpu).unwrap();
    let short_mask = Tensor::ones((1, 3), DType::F32, &Device::Cpu).unwrap();

    // Same three tokens followed by two padded positions holding noise.
    let noise = Tensor::randn(0f32, 1.0, (1, 2, 4), &Device::Cpu).unwrap();
    let padded = Tensor::cat(&[&real, &noise], 1).unwrap();
    let long_mask = Tensor::new(&[[1f32, 1.0, 1.0, 0.0, 0.0]], &Device::Cpu).unwrap();

    let short = lstm.forward(&real, &short_mask).unwrap();
    let long = lstm.forward(&padded, &long_mask).unwrap();
    assert_eq!(short.dims(), &[1, 3, 6]);
    assert_eq!(long.dims(), &[1, 5, 6]);

    let short = short.to_vec3::<f32>().unwrap();
    let long = long.to_vec3::<f32>().unwrap();
    for t in 0..3 {
        assert_close(&short[0][t], &long[0][t], 1e-5);
    }
    for t in 3..5 {
        assert_close(&long[0][t], &[0.0; 6], 0.0);
    }
}

// ==================== Siamese encoder ====================

#[test]
fn test_siamese_output_width() {
    let varmap = VarMap::new();
    let encoder = SiameseEncoder::new(EMBEDDING_DIM, HIDDEN_SIZE, fresh_vb(&varmap)).unwrap();
    assert_eq!(encoder.hidden_size(), HIDDEN_SIZE);
    assert_eq!(encoder.output_dim(), 4 * HIDDEN_SIZE);

    let emb_a = Tensor::randn(0f32, 1.0, (2, 5, EMBEDDING_DIM), &Device::Cpu).unwrap();
    let emb_b = Tensor::randn(0f32, 1.0, (2, 5, EMBEDDING_DIM), &Device::Cpu).unwrap();
    let mask_a = Tensor::new(&[[1f32, 1.0, 1.0, 0.0, 0.0], [1.0, 1.0, 1.0, 1.0, 1.0]], &Device::Cpu)
        .unwrap();
    let mask_b = Tensor::new(&[[1f32, 1.0, 0.0, 0.0, 0.0], [1.0, 1.0, 1.0, 1.0, 0.0]], &Device::Cpu)
        .unwrap();

    let v = encoder.encode_pair(&emb_a, &emb_b, &mask_a, &mask_b).unwrap();
    assert_eq!(v.dims(), &[2, 4 * HIDDEN_SIZE]);
}

// ==================== Head ====================

#[test]
fn test_output_mode_parse() {
    for mode in [
        OutputMode::Prob,
        OutputMode::Logits,
        OutputMode::Loss,
        OutputMode::Evaluate,
    ] {
        assert_eq!(mode.to_string().parse::<OutputMode>().unwrap(), mode);
    }

    assert!(matches!(
        "probability".parse::<OutputMode>(),
        Err(ModelError::InvalidConfig { .. })
    ));
    assert!(!OutputMode::Prob.requires_labels());
    assert!(!OutputMode::Logits.requires_labels());
    assert!(OutputMode::Loss.requires_labels());
    assert!(OutputMode::Evaluate.requires_labels());
}

#[test]
fn test_head_identical_vectors_give_same_logits() {
    let varmap = VarMap::new();
    let head = ClassifierHead::new(HIDDEN_SIZE, 0.1, fresh_vb(&varmap)).unwrap();

    let v1 = Tensor::randn(0f32, 1.0, (1, 4 * HIDDEN_SIZE), &Device::Cpu).unwrap();
    let v2 = Tensor::randn(0f32, 1.0, (1, 4 * HIDDEN_SIZE), &Device::Cpu).unwrap();

    // Only the difference reaches the head; biases start at zero.
    let zero_a = head.logits(&v1, &v1, false).unwrap().to_vec2::<f32>().unwrap();
    let zero_b = head.logits(&v2, &v2, false).unwrap().to_vec2::<f32>().unwrap();
    assert_close(&zero_a[0], &zero_b[0], 1e-6);
}

#[test]
fn test_head_missing_labels() {
    let varmap = VarMap::new();
    let head = ClassifierHead::new(HIDDEN_SIZE, 0.0, fresh_vb(&varmap)).unwrap();
    let v = Tensor::zeros((1, 4 * HIDDEN_SIZE), DType::F32, &Device::Cpu).unwrap();

    for mode in [OutputMode::Loss, OutputMode::Evaluate] {
        let err = head.classify(&v, &v, mode, None, false).unwrap_err();
        assert!(matches!(err, ModelError::MissingLabels { mode: m } if m == mode));
    }
    assert!(head.classify(&v, &v, OutputMode::Prob, None, false).is_ok());
}

// ==================== Classifier ====================

#[test]
fn test_classifier_rejects_odd_hidden_size() {
    let config = test_config().with_hidden_size(7);
    let result = TripletClassifier::random(VOCAB_SIZE, EMBEDDING_DIM, &config, &Device::Cpu);
    assert!(matches!(result, Err(ModelError::InvalidConfig { .. })));
}

#[test]
fn test_prob_rows_sum_to_one() {
    let model = random_model();
    let batch = sample_batch();

    let output = model.forward_batch(&batch, OutputMode::Prob).unwrap();
    assert_eq!(output.mode(), OutputMode::Prob);

    let prob = output.prob().unwrap();
    assert_eq!(prob.dims(), &[3, 2]);
    for row in prob.to_vec2::<f32>().unwrap() {
        assert!(row.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!((row.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn test_logits_softmax_matches_prob() {
    let model = random_model();
    let batch = sample_batch();

    let logits = model.forward_batch(&batch, OutputMode::Logits).unwrap();
    let prob = model.forward_batch(&batch, OutputMode::Prob).unwrap();

    let from_logits = probabilities(logits.logits().unwrap())
        .unwrap()
        .to_vec2::<f32>()
        .unwrap();
    let prob = prob.prob().unwrap().to_vec2::<f32>().unwrap();

    for (l, p) in from_logits.iter().zip(&prob) {
        assert_close(l, p, 1e-6);
    }
}

#[test]
fn test_inference_is_deterministic() {
    let model = random_model();
    let batch = sample_batch();

    let first = model.forward_batch(&batch, OutputMode::Logits).unwrap();
    let second = model.forward_batch(&batch, OutputMode::Logits).unwrap();

    assert_eq!(
        first.logits().unwrap().to_vec2::<f32>().unwrap(),
        second.logits().unwrap().to_vec2::<f32>().unwrap()
    );
}

#[test]
fn test_loss_is_finite_scalar() {
    let model = random_model();
    let output = model.forward_batch(&sample_batch(), OutputMode::Loss).unwrap();

    let loss = output.loss().unwrap();
    assert!(loss.dims().is_empty());
    let value = loss.to_scalar::<f32>().unwrap();
    assert!(value.is_finite());
    assert!(value > 0.0);
}

#[test]
fn test_evaluate_returns_all_outputs() {
    let model = random_model();
    let output = model
        .forward_batch(&sample_batch(), OutputMode::Evaluate)
        .unwrap();

    assert_eq!(output.mode(), OutputMode::Evaluate);
    assert_eq!(output.logits().unwrap().dims(), &[3, 2]);
    assert_eq!(output.prob().unwrap().dims(), &[3, 2]);
    assert!(output.loss().unwrap().dims().is_empty());
}

#[test]
fn test_forward_without_labels() {
    let model = random_model();
    let batch = sample_batch();

    let err = model
        .forward(&batch.a, &batch.b, &batch.c, None, OutputMode::Loss, false)
        .unwrap_err();
    assert!(matches!(err, ModelError::MissingLabels { mode: OutputMode::Loss }));

    let output = model
        .forward(&batch.a, &batch.b, &batch.c, None, OutputMode::Prob, false)
        .unwrap();
    assert_eq!(output.prob().unwrap().dims(), &[3, 2]);
}

#[test]
fn test_swapping_b_and_c_negates_logits() {
    let model = random_model();
    let batch = sample_batch();

    let forward = model
        .forward(&batch.a, &batch.b, &batch.c, None, OutputMode::Logits, false)
        .unwrap();
    let swapped = model
        .forward(&batch.a, &batch.c, &batch.b, None, OutputMode::Logits, false)
        .unwrap();

    // Freshly initialised biases are zero and tanh is odd, so the head is antisymmetric.
    let forward = forward.logits().unwrap().to_vec2::<f32>().unwrap();
    let swapped = swapped.logits().unwrap().to_vec2::<f32>().unwrap();
    for (f, s) in forward.iter().zip(&swapped) {
        let negated: Vec<f32> = s.iter().map(|v| -v).collect();
        assert_close(f, &negated, 1e-5);
    }
}

// ==================== Loading ====================

#[test]
fn test_load_missing_directory() {
    let result = TripletClassifier::load("/nonexistent/triplet/model", &test_config(), &Device::Cpu);
    assert!(matches!(result, Err(ModelError::ModelNotFound { .. })));
}

#[test]
fn test_load_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let result = TripletClassifier::load(dir.path(), &test_config(), &Device::Cpu);
    assert!(matches!(result, Err(ModelError::ModelLoadFailed { .. })));

    std::fs::write(dir.path().join("config.json"), backbone_config_json()).unwrap();
    let result = TripletClassifier::load(dir.path(), &test_config(), &Device::Cpu);
    assert!(matches!(result, Err(ModelError::ModelLoadFailed { .. })));
}

fn backbone_config_json() -> String {
    serde_json::json!({
        "vocab_size": VOCAB_SIZE,
        "hidden_size": EMBEDDING_DIM,
        "num_hidden_layers": 1,
        "num_attention_heads": 2,
        "intermediate_size": 24,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.1,
        "max_position_embeddings": 64,
        "type_vocab_size": 2,
        "initializer_range": 0.02,
        "layer_norm_eps": 1e-12,
        "pad_token_id": 0,
        "model_type": "bert"
    })
    .to_string()
}

#[test]
fn test_load_round_trip_from_safetensors() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config();

    let varmap = VarMap::new();
    let vb = fresh_vb(&varmap);
    let embeddings = WordEmbeddings::new(
        VOCAB_SIZE,
        EMBEDDING_DIM,
        vb.pp("bert.embeddings.word_embeddings"),
    )
    .unwrap();
    let original = TripletClassifier::new(Arc::new(embeddings), &config, vb).unwrap();

    varmap.save(dir.path().join("model.safetensors")).unwrap();
    std::fs::write(dir.path().join("config.json"), backbone_config_json()).unwrap();

    let loaded = TripletClassifier::load(dir.path(), &config, &Device::Cpu).unwrap();
    assert_eq!(loaded.hidden_size(), HIDDEN_SIZE);

    let batch = sample_batch();
    let expected = original.forward_batch(&batch, OutputMode::Prob).unwrap();
    let actual = loaded.forward_batch(&batch, OutputMode::Prob).unwrap();

    let expected = expected.prob().unwrap().to_vec2::<f32>().unwrap();
    let actual = actual.prob().unwrap().to_vec2::<f32>().unwrap();
    for (e, a) in expected.iter().zip(&actual) {
        assert_close(e, a, 1e-6);
    }
}

#[test]
fn test_word_embeddings_missing_table() {
    let dir = tempfile::tempdir().unwrap();
    let varmap = VarMap::new();
    let vb = fresh_vb(&varmap);
    let config = test_config();
    let embeddings = WordEmbeddings::new(VOCAB_SIZE, EMBEDDING_DIM, vb.pp("unrelated")).unwrap();
    TripletClassifier::new(Arc::new(embeddings), &config, vb).unwrap();

    varmap.save(dir.path().join("model.safetensors")).unwrap();
    std::fs::write(dir.path().join("config.json"), backbone_config_json()).unwrap();

    let result = TripletClassifier::load(dir.path(), &config, &Device::Cpu);
    assert!(matches!(result, Err(ModelError::ModelLoadFailed { .. })));
}

// ==================== Device ====================

#[test]
fn test_select_cpu_device() {
    let device = select_device(ComputeTarget::Cpu).unwrap();
    assert!(device.is_cpu());
}

#[test]
fn test_select_auto_device() {
    assert!(select_device(ComputeTarget::Auto).is_ok());
}
