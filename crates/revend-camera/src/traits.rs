use crate::CameraError;
use revend_base::Tensor;

/// Source of camera frames for the session worker.
///
/// Frames are `Tensor<u8>` in HWC layout `[height, width, 3]`, RGB order.
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    /// Return the most recent frame, waiting only if none has been captured yet.
    async fn next_frame(&mut self) -> Result<Tensor<u8>, CameraError>;
}
