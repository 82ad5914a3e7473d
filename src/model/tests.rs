//! Inference service tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::ArrayView2;

use super::*;
use crate::features::{Decision, FailureLabel, FeatureRecord, MachineType, RawFeatureRecord};

fn scaler() -> Scaler {
    Scaler::new(ScalerParams::Standard {
        mean: vec![0.5, 300.0, 310.0, 1538.8, 40.0, 108.0],
        scale: vec![0.67, 2.0, 1.5, 179.3, 10.0, 63.7],
    })
    .unwrap()
}

/// High torque and high wear push towards failure
fn classifier() -> LogisticRegression {
    LogisticRegression::new(LogisticRegressionParams {
        model_type: "logistic_regression".to_string(),
        coefficients: vec![0.0, 0.0, 0.0, 0.0, 2.0, 1.5],
        intercept: -4.0,
        threshold: 0.5,
        feature_names: None,
    })
    .unwrap()
}

fn service() -> InferenceService {
    InferenceService::new(scaler(), Box::new(classifier())).unwrap()
}

fn scenario() -> FeatureRecord {
    FeatureRecord {
        machine_type: MachineType::Low,
        air_temperature: 298.1,
        process_temperature: 308.6,
        rotational_speed: 1551.0,
        torque: 42.8,
        tool_wear: 0.0,
    }
}

fn worn_out() -> FeatureRecord {
    FeatureRecord {
        machine_type: MachineType::High,
        torque: 70.0,
        tool_wear: 240.0,
        ..scenario()
    }
}

/// Counts calls so tests can prove the classifier was never reached
struct CountingClassifier {
    calls: Arc<AtomicUsize>,
}

impl Classifier for CountingClassifier {
    fn kind(&self) -> &'static str {
        "counting"
    }

    fn dimension(&self) -> usize {
        6
    }

    fn predict(&self, scaled: ArrayView2<'_, f64>) -> Result<Vec<Decision>, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Decision { label: FailureLabel::Normal, probability: None }; scaled.nrows()])
    }
}

#[test]
fn test_encode_type_via_service() {
    assert_eq!(InferenceService::encode_type("L"), Ok(0));
    assert_eq!(InferenceService::encode_type("M"), Ok(1));
    assert_eq!(InferenceService::encode_type("H"), Ok(2));
    assert_eq!(
        InferenceService::encode_type("X"),
        Err(InferenceError::UnrecognizedCategory("X".to_string()))
    );
}

#[test]
fn test_scenario_produces_binary_label() {
    let result = service().predict_one(&scenario()).unwrap();

    assert_eq!(result.record.to_vector(), [0.0, 298.1, 308.6, 1551.0, 42.8, 0.0]);
    assert!(result.prediction == 0 || result.prediction == 1);
    assert_eq!(result.label, FailureLabel::Normal);
    let p = result.failure_probability.unwrap();
    assert!(p.is_finite() && (0.0..=1.0).contains(&p));
}

#[test]
fn test_worn_tool_predicts_failure() {
    let result = service().predict_one(&worn_out()).unwrap();
    assert_eq!(result.label, FailureLabel::Failure);
    assert_eq!(result.prediction, 1);
}

#[test]
fn test_single_and_batch_of_one_agree() {
    let svc = service();
    for record in [scenario(), worn_out()] {
        let single = svc.predict_one(&record).unwrap();
        let batch = svc.predict_many(&[record]).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(single.label, batch[0].label);
        assert_eq!(single.failure_probability, batch[0].failure_probability);
    }
}

#[test]
fn test_predict_many_preserves_order() {
    let svc = service();
    let records = vec![scenario(), worn_out(), scenario(), worn_out(), worn_out()];

    let results = svc.predict_many(&records).unwrap();

    assert_eq!(results.len(), records.len());
    for (i, (result, record)) in results.iter().zip(&records).enumerate() {
        assert_eq!(&result.record, record, "row {} out of order", i);
        assert_eq!(result.label, svc.predict_one(record).unwrap().label);
    }
    let labels: Vec<u8> = results.iter().map(|r| r.prediction).collect();
    assert_eq!(labels, vec![0, 1, 0, 1, 1]);
}

#[test]
fn test_predict_many_empty() {
    assert!(service().predict_many(&[]).unwrap().is_empty());
}

#[test]
fn test_non_finite_record_fails_whole_batch() {
    let broken = FeatureRecord { air_temperature: f64::INFINITY, ..scenario() };

    let err = service().predict_many(&[scenario(), broken]).unwrap_err();
    match err {
        InferenceError::InvalidRow { row, source } => {
            assert_eq!(row, 2);
            assert!(matches!(*source, InferenceError::NonNumericField { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(matches!(
        service().predict_one(&broken),
        Err(InferenceError::NonNumericField { .. })
    ));
}

#[test]
fn test_unrecognized_category_never_reaches_classifier() {
    let calls = Arc::new(AtomicUsize::new(0));
    let svc = InferenceService::new(
        scaler(),
        Box::new(CountingClassifier { calls: Arc::clone(&calls) }),
    )
    .unwrap();

    let raw = RawFeatureRecord::from_cells(["X", "298.1", "308.6", "1551", "42.8", "0"]);
    assert_eq!(
        svc.predict_raw(&raw).unwrap_err(),
        InferenceError::UnrecognizedCategory("X".to_string())
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let valid = RawFeatureRecord::from_cells(["L", "298.1", "308.6", "1551", "42.8", "0"]);
    assert!(svc.predict_raw(&valid).is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_status_counts_predictions() {
    let svc = service();
    svc.predict_one(&scenario()).unwrap();
    svc.predict_many(&[scenario(), worn_out()]).unwrap();
    svc.record_batch();

    let status = svc.status();
    assert!(status.model_loaded);
    assert_eq!(status.predictions, 3);
    assert_eq!(status.failures_predicted, 1);
    assert_eq!(status.batches, 1);
    assert_eq!(status.classifier, "logistic_regression");
}

#[test]
fn test_rejects_mismatched_classifier_dimension() {
    struct Wide;
    impl Classifier for Wide {
        fn kind(&self) -> &'static str {
            "wide"
        }
        fn dimension(&self) -> usize {
            8
        }
        fn predict(&self, _: ArrayView2<'_, f64>) -> Result<Vec<Decision>, InferenceError> {
            Ok(Vec::new())
        }
    }

    assert!(matches!(
        InferenceService::new(scaler(), Box::new(Wide)),
        Err(InferenceError::ArtifactLoadFailure { .. })
    ));
}

#[test]
fn test_feature_matrix_layout() {
    let matrix = service::feature_matrix(&[scenario(), worn_out()]);
    assert_eq!(matrix.shape(), &[2, 6]);
    assert_eq!(matrix[[0, 3]], 1551.0);
    assert_eq!(matrix[[1, 0]], 2.0);
    assert_eq!(matrix[[1, 5]], 240.0);
}
