use crate::{Config, Session, SessionError, Status};
use revend_base::Tensor;
use revend_camera::FrameSource;
use revend_classify::{Classifier, Detector};
use revend_serial::{Inbound, Outbound, Transport};
use revend_voucher::{VoucherResult, VoucherService};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;

const FRAME_RETRY_DELAY: Duration = Duration::from_millis(100);

/// What one loop iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cycle {
    /// The camera had no frame and the link had nothing to act on.
    FrameUnavailable,
    NoInput,
    /// A line failed to decode and was dropped.
    Malformed,
    /// A line that is not a protocol token.
    Ignored(String),
    Handled(Inbound),
}

/// Retry schedule for the voucher request issued at the end of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoucherPolicy {
    pub retries: u32,
    pub backoff: Duration,
}

impl Default for VoucherPolicy {
    fn default() -> Self {
        Self {
            retries: 0,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Drives the scan session from controller tokens and camera frames.
///
/// Single consumer: the worker owns the session, the link and the camera, so
/// session state needs no locking. Observers read `Status` and frame snapshots
/// through watch channels.
pub struct Worker<T, F, D, V> {
    transport: T,
    frames: F,
    classifier: Classifier<D>,
    voucher: V,
    session: Session,
    /// An object signal arrived while the camera had no frame.
    object_deferred: bool,
    seconds_per_object: u64,
    policy: VoucherPolicy,
    status_tx: watch::Sender<Status>,
    frame_tx: watch::Sender<Option<Arc<Tensor<u8>>>>,
}

impl<T, F, D, V> Worker<T, F, D, V>
where
    T: Transport,
    F: FrameSource,
    D: Detector + Send + 'static,
    V: VoucherService,
{
    pub fn new(config: &Config, transport: T, frames: F, detector: D, voucher: V) -> Self {
        let classifier = Classifier::new(detector)
            .with_target_class(config.target_class_id)
            .with_min_score(config.min_score_threshold);
        let policy = VoucherPolicy {
            retries: config.voucher_retries,
            backoff: config.voucher_backoff(),
        };
        let (status_tx, _) = watch::channel(Status::default());
        let (frame_tx, _) = watch::channel(None);

        Self {
            transport,
            frames,
            classifier,
            voucher,
            session: Session::new(),
            object_deferred: false,
            seconds_per_object: config.seconds_per_object,
            policy,
            status_tx,
            frame_tx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn subscribe_status(&self) -> watch::Receiver<Status> {
        self.status_tx.subscribe()
    }

    /// Latest captured frame, shared read-only with whoever displays it.
    pub fn subscribe_frames(&self) -> watch::Receiver<Option<Arc<Tensor<u8>>>> {
        self.frame_tx.subscribe()
    }

    /// Run until cancelled or the controller link fails.
    ///
    /// Consumes the worker so the serial link is released on return.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), SessionError> {
        log::info!("session worker started");
        loop {
            let cycle = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::info!("session worker stopping");
                    return Ok(());
                }
                cycle = self.step() => cycle,
            };

            match cycle {
                Ok(Cycle::FrameUnavailable) => sleep(FRAME_RETRY_DELAY).await,
                Ok(_) => tokio::task::yield_now().await,
                Err(e) => {
                    log::error!("session worker stopped: {e}");
                    return Err(e);
                }
            }
        }
    }

    /// One loop iteration: grab a frame, poll the link once, act on any token.
    ///
    /// The link is polled even when the camera fails, so a lost controller is
    /// noticed and scan start/end still work. An object signal that arrives
    /// without a frame is held until a frame is available, or dropped if
    /// another token arrives first.
    pub async fn step(&mut self) -> Result<Cycle, SessionError> {
        let frame = match self.frames.next_frame().await {
            Ok(frame) => {
                let frame = Arc::new(frame);
                self.frame_tx.send_replace(Some(Arc::clone(&frame)));
                Some(frame)
            }
            Err(e) => {
                log::warn!("frame unavailable: {e}");
                None
            }
        };

        let line = match self.transport.try_read_line() {
            Ok(line) => line,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                log::warn!("dropping line: {e}");
                return Ok(Cycle::Malformed);
            }
        };

        let token = match line {
            Some(line) => {
                let Some(token) = Inbound::parse(&line) else {
                    log::debug!("ignoring line {:?}", line);
                    return Ok(Cycle::Ignored(line));
                };
                if std::mem::take(&mut self.object_deferred) {
                    log::debug!("deferred object signal superseded by {:?}", token);
                }
                token
            }
            None if frame.is_none() => return Ok(Cycle::FrameUnavailable),
            None if std::mem::take(&mut self.object_deferred) => Inbound::ObjectPresent,
            None => return Ok(Cycle::NoInput),
        };

        self.handle(token, frame).await?;
        Ok(Cycle::Handled(token))
    }

    /// Apply one token. `frame` is the frame captured in the same iteration.
    pub async fn handle(
        &mut self,
        token: Inbound,
        frame: Option<Arc<Tensor<u8>>>,
    ) -> Result<(), SessionError> {
        match token {
            Inbound::BeginScan => {
                self.session.begin();
                log::info!("scan started");
            }
            Inbound::EndScan => {
                let Some(count) = self.session.end() else {
                    log::debug!("end scan while idle, ignored");
                    return Ok(());
                };
                log::info!("scan ended with {} bottles", count);
                // observers see Idle while the voucher request is in flight
                self.publish_status();
                if count > 0 {
                    self.settle(count).await?;
                }
                return Ok(());
            }
            Inbound::ObjectPresent => {
                if !self.session.is_active() {
                    log::debug!("object signal while idle, ignored");
                    return Ok(());
                }
                let Some(frame) = frame else {
                    log::warn!("object signal without a frame, waiting for the camera");
                    self.object_deferred = true;
                    return Ok(());
                };
                let present = match self.classifier.classify(frame).await {
                    Ok(present) => present,
                    Err(e) => {
                        log::warn!("classification failed, treating as no bottle: {e}");
                        false
                    }
                };
                if let Some(ack) = self.session.record(present) {
                    match ack {
                        Outbound::BottleDetected => {
                            log::info!("bottle detected, count {}", self.session.count())
                        }
                        _ => log::info!("no bottle detected"),
                    }
                    self.send(&ack).await?;
                }
            }
        }
        self.publish_status();
        Ok(())
    }

    /// Request a voucher for `count` bottles and forward the code.
    ///
    /// Failure is logged and nothing is sent; the controller times out on its own.
    async fn settle(&mut self, count: u32) -> Result<(), SessionError> {
        let seconds = u64::from(count).saturating_mul(self.seconds_per_object);
        match self.request_voucher(seconds).await {
            Ok(code) => {
                log::info!("voucher {} issued for {}s", code, seconds);
                self.send(&Outbound::VoucherCode(code)).await
            }
            Err(e) => {
                log::error!("no voucher for {}s: {e}", seconds);
                Ok(())
            }
        }
    }

    async fn request_voucher(&self, seconds: u64) -> VoucherResult {
        let mut delay = self.policy.backoff;
        let mut attempt = 0;
        loop {
            match self.voucher.issue_voucher(seconds).await {
                Ok(code) => return Ok(code),
                Err(e) if attempt < self.policy.retries => {
                    attempt += 1;
                    log::warn!(
                        "voucher attempt {} failed: {e}; retrying in {:?}",
                        attempt,
                        delay
                    );
                    sleep(delay).await;
                    delay = delay.saturating_mul(2);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send(&mut self, message: &Outbound) -> Result<(), SessionError> {
        self.transport.write_line(message.as_line()).await?;
        Ok(())
    }

    fn publish_status(&self) {
        self.status_tx.send_replace(self.session.status());
    }
}
