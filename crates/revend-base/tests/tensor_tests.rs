use revend_base::{Tensor, TensorError};

#[test]
fn test_image_frame_shape() {
    let frame = Tensor::image(2, 3, 3, vec![0u8; 18]).unwrap();
    assert_eq!(frame.shape, vec![2, 3, 3]);
    assert_eq!(frame.hwc().unwrap(), (2, 3, 3));
}

#[test]
fn test_image_frame_short_buffer() {
    let result = Tensor::image(480, 640, 3, vec![0u8; 640 * 480]);
    assert!(matches!(
        result,
        Err(TensorError::ShapeMismatch { expected: 921600, got: 307200 })
    ));
}

#[test]
fn test_shape_overflow() {
    let result = Tensor::<u8>::new(vec![usize::MAX, 2], vec![]);
    assert!(matches!(result, Err(TensorError::ShapeOverflow)));
}

#[test]
fn test_hwc_rejects_flat_tensor() {
    let tensor = Tensor::new(vec![6], vec![1u8; 6]).unwrap();
    match tensor.hwc() {
        Err(TensorError::NotAnImage(shape)) => assert_eq!(shape, vec![6]),
        other => panic!("expected NotAnImage, got {:?}", other),
    }
}

#[test]
fn test_zeros() {
    let tensor = Tensor::<u8>::zeros(vec![4, 4, 3]).unwrap();
    assert_eq!(tensor.len(), 48);
    assert!(tensor.data.iter().all(|&v| v == 0));
    assert_eq!(tensor.ndim(), 3);
}

#[test]
fn test_debug_omits_pixels() {
    let tensor = Tensor::image(1, 2, 3, vec![7u8; 6]).unwrap();
    let debug = format!("{:?}", tensor);
    assert!(debug.contains("shape"));
    assert!(!debug.contains("7, 7"));
}
