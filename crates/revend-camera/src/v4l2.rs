use crate::convert::{decode_mjpeg, yuyv_to_rgb};
use crate::{CameraConfig, CameraError, FrameSource};
use revend_base::Tensor;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

type FrameResult = Result<Tensor<u8>, CameraError>;

#[derive(Debug, Clone, Copy)]
enum PixelLayout {
    Mjpeg,
    Yuyv { width: u32, height: u32 },
}

/// USB webcam capture through V4L2.
///
/// A dedicated thread owns the device and pushes decoded frames into a
/// bounded channel; `next_frame` drains that channel so callers always get the
/// newest frame rather than a queued one.
pub struct V4l2Camera {
    config: CameraConfig,
    layout: PixelLayout,
    device: Option<Device>,
    receiver: Option<mpsc::Receiver<FrameResult>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for V4l2Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Camera")
            .field("config", &self.config)
            .field("layout", &self.layout)
            .field("started", &self.receiver.is_some())
            .finish()
    }
}

/// Open `config.device()` and negotiate MJPEG, falling back to YUYV.
fn open_device(config: &CameraConfig) -> Result<(Device, PixelLayout), CameraError> {
    let device = Device::with_path(config.device())?;

    let requested = Format::new(config.width(), config.height(), FourCC::new(b"MJPG"));
    let mut format = Capture::set_format(&device, &requested)?;

    let layout = if format.fourcc == FourCC::new(b"MJPG") {
        PixelLayout::Mjpeg
    } else {
        let requested = Format::new(config.width(), config.height(), FourCC::new(b"YUYV"));
        format = Capture::set_format(&device, &requested)?;
        if format.fourcc != FourCC::new(b"YUYV") {
            return Err(CameraError::Device(format!(
                "{} supports neither MJPEG nor YUYV",
                config.device()
            )));
        }
        PixelLayout::Yuyv {
            width: format.width,
            height: format.height,
        }
    };

    let params = v4l::video::capture::Parameters::with_fps(config.fps());
    Capture::set_params(&device, &params)?;

    log::info!(
        "opened {} at {}x{} ({:?})",
        config.device(),
        format.width,
        format.height,
        layout
    );
    Ok((device, layout))
}

impl V4l2Camera {
    /// Open the configured device. Capture starts on the first `next_frame`.
    ///
    /// # Errors
    ///
    /// Returns `CameraError::Device` if the device cannot be opened or accepts
    /// neither pixel format.
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        let (device, layout) = open_device(&config)?;
        Ok(Self {
            config,
            layout,
            device: Some(device),
            receiver: None,
            thread_handle: None,
        })
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    fn ensure_started(&mut self) -> Result<(), CameraError> {
        if self.receiver.is_some() {
            return Ok(());
        }

        // a previous capture thread consumed the device; reopen it
        let device = match self.device.take() {
            Some(device) => device,
            None => {
                let (device, layout) = open_device(&self.config)?;
                self.layout = layout;
                device
            }
        };

        let buffer_count = self.config.buffer_count();
        let layout = self.layout;
        let (tx, rx) = mpsc::channel(buffer_count as usize);

        let handle = thread::spawn(move || {
            if let Err(e) = capture_loop(device, layout, &tx, buffer_count) {
                log::error!("capture thread stopped: {e}");
                let _ = tx.blocking_send(Err(e));
            }
        });

        self.receiver = Some(rx);
        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop the capture thread so the next `next_frame` reopens the device.
    fn stop_capture(&mut self) {
        // closing the channel makes the capture thread's next send fail
        drop(self.receiver.take());
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl FrameSource for V4l2Camera {
    async fn next_frame(&mut self) -> Result<Tensor<u8>, CameraError> {
        self.ensure_started()?;

        let receiver = self
            .receiver
            .as_mut()
            .ok_or_else(|| CameraError::Channel("receiver not initialized".to_string()))?;

        let next = receiver.recv().await;
        let Some(mut latest) = next else {
            self.stop_capture();
            return Err(CameraError::Channel("capture thread exited".to_string()));
        };

        while let Ok(newer) = receiver.try_recv() {
            latest = newer;
        }

        latest
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        self.stop_capture();
    }
}

fn capture_loop(
    device: Device,
    layout: PixelLayout,
    tx: &mpsc::Sender<FrameResult>,
    buffer_count: u32,
) -> Result<(), CameraError> {
    let mut stream = MmapStream::with_buffers(&device, Type::VideoCapture, buffer_count)?;

    loop {
        let (data, _metadata) = CaptureStream::next(&mut stream)?;

        let frame = match layout {
            PixelLayout::Mjpeg => decode_mjpeg(data),
            PixelLayout::Yuyv { width, height } => yuyv_to_rgb(data, width, height).ok_or_else(|| {
                CameraError::Stream(format!(
                    "YUYV frame too short: {} bytes for {}x{}",
                    data.len(),
                    width,
                    height
                ))
            }),
        };

        if tx.blocking_send(frame).is_err() {
            return Ok(());
        }
    }
}
