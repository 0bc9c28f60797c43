use crate::CameraError;
use revend_base::Tensor;

/// Decode one MJPEG frame into an RGB HWC tensor.
///
/// Grayscale or alpha JPEGs are expanded to three channels so the classifier
/// always sees the same layout.
pub fn decode_mjpeg(data: &[u8]) -> Result<Tensor<u8>, CameraError> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)?.to_rgb8();
    let (width, height) = img.dimensions();
    Ok(Tensor::image(height as usize, width as usize, 3, img.into_raw())?)
}

/// Convert packed YUYV 4:2:2 (`[Y0, U, Y1, V, ...]`) to an RGB HWC tensor using BT.601.
///
/// Returns `None` when `data` holds fewer than `width * height * 2` bytes.
pub fn yuyv_to_rgb(data: &[u8], width: u32, height: u32) -> Option<Tensor<u8>> {
    let pixel_count = (width as usize) * (height as usize);
    let expected_len = pixel_count * 2;
    if data.len() < expected_len {
        return None;
    }

    let mut rgb = Vec::with_capacity(pixel_count * 3);
    for chunk in data[..expected_len].chunks_exact(4) {
        let u = chunk[1] as f32 - 128.0;
        let v = chunk[3] as f32 - 128.0;
        for y in [chunk[0] as f32, chunk[2] as f32] {
            rgb.push((y + 1.402 * v).clamp(0.0, 255.0) as u8);
            rgb.push((y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8);
            rgb.push((y + 1.772 * u).clamp(0.0, 255.0) as u8);
        }
    }

    Tensor::image(height as usize, width as usize, 3, rgb).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuyv_neutral_chroma_is_gray() {
        // U = V = 128 leaves only luma
        let data = [50u8, 128, 200, 128];
        let frame = yuyv_to_rgb(&data, 2, 1).unwrap();
        assert_eq!(frame.shape, vec![1, 2, 3]);
        assert_eq!(frame.data, vec![50, 50, 50, 200, 200, 200]);
    }

    #[test]
    fn test_yuyv_short_buffer() {
        assert!(yuyv_to_rgb(&[0u8; 6], 2, 2).is_none());
    }

    #[test]
    fn test_decode_mjpeg_rejects_garbage() {
        match decode_mjpeg(&[0xde, 0xad, 0xbe, 0xef]) {
            Err(CameraError::Decode(_)) => {}
            other => panic!("expected Decode error, got {:?}", other),
        }
    }
}
