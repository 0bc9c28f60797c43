use revend_base::Tensor;
use revend_classify::{Classifier, ClassifyError, Detection, Detector};
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Returns canned detections and counts calls.
struct CannedDetector {
    detections: Vec<Detection>,
    calls: usize,
}

impl Detector for CannedDetector {
    fn detect(&mut self, _frame: &Tensor<u8>) -> Result<Vec<Detection>, ClassifyError> {
        self.calls += 1;
        Ok(self.detections.clone())
    }
}

struct BrokenDetector;

impl Detector for BrokenDetector {
    fn detect(&mut self, _frame: &Tensor<u8>) -> Result<Vec<Detection>, ClassifyError> {
        Err(ClassifyError::Backend("session poisoned".to_string()))
    }
}

/// Records the thread inference ran on.
struct ThreadRecorder {
    ran_on: Option<ThreadId>,
}

impl Detector for ThreadRecorder {
    fn detect(&mut self, _frame: &Tensor<u8>) -> Result<Vec<Detection>, ClassifyError> {
        self.ran_on = Some(thread::current().id());
        Ok(vec![])
    }
}

struct PanickingDetector;

impl Detector for PanickingDetector {
    fn detect(&mut self, _frame: &Tensor<u8>) -> Result<Vec<Detection>, ClassifyError> {
        panic!("model crashed");
    }
}

fn frame() -> Arc<Tensor<u8>> {
    Arc::new(Tensor::image(4, 4, 3, vec![0u8; 48]).unwrap())
}

#[test]
fn test_defaults_target_bottle() {
    let classifier = Classifier::new(CannedDetector {
        detections: vec![],
        calls: 0,
    });
    assert_eq!(classifier.target_class_id(), 44);
    assert!((classifier.min_score() - 0.3).abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_bottle_detected() {
    let classifier = Classifier::new(CannedDetector {
        detections: vec![
            Detection { class_id: 1, score: 0.95 },
            Detection { class_id: 44, score: 0.41 },
        ],
        calls: 0,
    });
    assert!(classifier.classify(frame()).await.unwrap());
}

#[tokio::test]
async fn test_low_confidence_bottle_ignored() {
    let classifier = Classifier::new(CannedDetector {
        detections: vec![Detection { class_id: 44, score: 0.2 }],
        calls: 0,
    });
    assert!(!classifier.classify(frame()).await.unwrap());
}

#[tokio::test]
async fn test_custom_target_and_threshold() {
    let classifier = Classifier::new(CannedDetector {
        detections: vec![Detection { class_id: 47, score: 0.6 }],
        calls: 0,
    })
    .with_target_class(47)
    .with_min_score(0.5);
    assert!(classifier.classify(frame()).await.unwrap());
}

#[tokio::test]
async fn test_one_inference_per_call() {
    let classifier = Classifier::new(CannedDetector {
        detections: vec![],
        calls: 0,
    });
    classifier.classify(frame()).await.unwrap();
    classifier.classify(frame()).await.unwrap();
    assert_eq!(classifier.detector().lock().unwrap().calls, 2);
}

#[tokio::test]
async fn test_boxed_detector() {
    let boxed: Box<dyn Detector + Send> = Box::new(CannedDetector {
        detections: vec![Detection { class_id: 44, score: 0.9 }],
        calls: 0,
    });
    let classifier = Classifier::new(boxed);
    assert!(classifier.classify(frame()).await.unwrap());
}

#[tokio::test]
async fn test_backend_error_propagates() {
    let classifier = Classifier::new(BrokenDetector);
    match classifier.classify(frame()).await {
        Err(ClassifyError::Backend(msg)) => assert!(msg.contains("poisoned")),
        other => panic!("expected Backend error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_inference_runs_off_the_runtime_thread() {
    let classifier = Classifier::new(ThreadRecorder { ran_on: None });
    classifier.classify(frame()).await.unwrap();

    let ran_on = classifier.detector().lock().unwrap().ran_on;
    assert!(ran_on.is_some());
    assert_ne!(ran_on, Some(thread::current().id()));
}

#[tokio::test]
async fn test_detector_panic_is_backend_error() {
    let classifier = Classifier::new(PanickingDetector);
    match classifier.classify(frame()).await {
        Err(ClassifyError::Backend(msg)) => assert!(msg.contains("inference task failed")),
        other => panic!("expected Backend error, got {:?}", other),
    }

    // the poisoned lock keeps failing cleanly instead of panicking again
    assert!(matches!(
        classifier.classify(frame()).await,
        Err(ClassifyError::Backend(_))
    ));
}

#[cfg(feature = "onnx")]
#[test]
fn test_onnx_missing_model() {
    assert!(revend_classify::OnnxDetector::new("/nonexistent/model.onnx").is_err());
}
