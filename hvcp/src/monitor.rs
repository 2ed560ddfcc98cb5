//! Background detection monitor
//!
//! Brings the sensor up (version probe, then configuration), then runs
//! the detection loop, publishing [`Event`]s to an mpsc channel the
//! embedding host drains. The monitor owns the device for its lifetime,
//! which keeps command invocations serialized on the link.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, info, warn};

use hvcp_core::{CameraAngle, ExecutionFlags, ImageOption, RetryPolicy, RollAngle, YawAngle};
use hvcp_types::{DetectionSize, ExecutionResult, ThresholdValues};

use crate::device::Device;
use crate::error::Result;
use crate::event::Event;

/// Sensor settings applied at bring-up
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub camera_angle: CameraAngle,
    pub thresholds: ThresholdValues,
    pub detection_size: DetectionSize,
    pub yaw: YawAngle,
    pub roll: RollAngle,

    /// Sleep between detection executions
    pub execution_interval: Duration,

    /// Capture one half-QVGA image on the first execution after
    /// bring-up, for visual verification of the mount. The bytes are
    /// logged and discarded; only the first pass pays the cost.
    pub debug_image: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            camera_angle: CameraAngle::Deg0,
            thresholds: ThresholdValues::default(),
            detection_size: DetectionSize::default(),
            yaw: YawAngle::Deg30,
            roll: RollAngle::Deg15,
            execution_interval: Duration::from_millis(500),
            debug_image: false,
        }
    }
}

/// Detection monitor over one sensor link
pub struct Monitor {
    device: Device,
    config: MonitorConfig,
    events: mpsc::Sender<Event>,
    first_pass_image: bool,
}

impl Monitor {
    pub fn new(device: Device, config: MonitorConfig, events: mpsc::Sender<Event>) -> Self {
        let first_pass_image = config.debug_image;

        Self {
            device,
            config,
            events,
            first_pass_image,
        }
    }

    /// Probe the sensor and apply the configured settings.
    ///
    /// Runs with a fast-fail retry policy: at bring-up the sensor should
    /// already be responsive, and a quick failure lets the host reset
    /// sooner rather than later. The steady-state policy is restored
    /// before returning, success or not.
    pub async fn bring_up(&mut self) -> Result<()> {
        let steady = self.device.retry_policy();
        self.device.set_retry_policy(RetryPolicy::fast_fail());

        let result = self.apply_setup().await;

        self.device.set_retry_policy(steady);
        result
    }

    async fn apply_setup(&mut self) -> Result<()> {
        let version = self.device.get_version().await?;
        info!("Sensor on {} initialized: {}", self.device.port_name(), version);

        self.emit(Event::Initialized(version)).await;

        self.device.set_camera_angle(self.config.camera_angle).await?;
        self.device.set_threshold_values(&self.config.thresholds).await?;
        self.device.set_detection_size(&self.config.detection_size).await?;
        self.device.set_face_angle(self.config.yaw, self.config.roll).await?;

        debug!("Sensor configured: {} {}", self.config.thresholds, self.config.detection_size);

        Ok(())
    }

    /// Run one detection execution, emitting a detection event on matches
    pub async fn poll_once(&mut self) -> Result<Option<ExecutionResult>> {
        let flags = ExecutionFlags::BODY_DETECTION | ExecutionFlags::FACE_DETECTION;

        let result = if self.first_pass_image {
            self.first_pass_image = false;

            let mut dump = Vec::new();
            let result = self
                .device
                .execute_with_image(flags, ImageOption::QvgaHalf, &mut dump)
                .await?;

            if let Some(image) = &result.image {
                debug!(
                    "First-pass image: {}x{}, {} bytes{}",
                    image.width,
                    image.height,
                    dump.len(),
                    if image.complete { "" } else { " (incomplete)" }
                );
            }

            result
        } else {
            self.device.execute(flags).await?
        };

        if result.detections() > 0 {
            debug!("Detection: {}", result);
            self.emit(Event::Detection(result.clone())).await;
            Ok(Some(result))
        } else {
            Ok(None)
        }
    }

    /// Bring the sensor up and poll until the event receiver goes away.
    ///
    /// Execution failures are logged and the loop continues; the whole
    /// link is only as broken as the host decides it is (restart policy
    /// belongs to the embedding environment, not here).
    pub async fn run(mut self) -> Result<()> {
        self.bring_up().await?;

        loop {
            if self.events.is_closed() {
                info!("Event receiver dropped, stopping monitor");
                return Ok(());
            }

            if let Err(e) = self.poll_once().await {
                warn!("Execution failed: {}", e);
            }

            time::sleep(self.config.execution_interval).await;
        }
    }

    async fn emit(&self, event: Event) {
        if self.events.send(event).await.is_err() {
            warn!("Event receiver dropped, event discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hvcp_core::{ResponseHeader, SYNC_CODE};
    use hvcp_transport::MockTransport;
    use pretty_assertions::assert_eq;

    fn ok_response(payload: &[u8]) -> Vec<u8> {
        let mut response = ResponseHeader {
            sync_code: SYNC_CODE,
            status: 0x00,
            payload_length: payload.len() as u32,
        }
        .encode()
        .to_vec();
        response.extend_from_slice(payload);
        response
    }

    fn version_response() -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(b"HVC-P\0\0\0\0\0\0\0");
        payload.extend_from_slice(&[1, 0, 0]);
        payload.extend_from_slice(&[0; 4]);
        ok_response(&payload)
    }

    fn scripted_bring_up(mock: &MockTransport) {
        mock.push_response(&version_response());
        for _ in 0..4 {
            mock.push_response(&ok_response(&[])); // four set commands
        }
    }

    #[tokio::test]
    async fn test_bring_up_emits_initialized_and_restores_policy() {
        let mock = MockTransport::new();
        scripted_bring_up(&mock);

        let steady = RetryPolicy::new(7, Duration::from_millis(1));
        let device = Device::new(mock.clone()).with_retry_policy(steady);
        let (tx, mut rx) = mpsc::channel(4);
        let mut monitor = Monitor::new(device, MonitorConfig::default(), tx);

        monitor.bring_up().await.unwrap();

        match rx.try_recv().unwrap() {
            Event::Initialized(info) => assert_eq!(info.model, "HVC-P"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(monitor.device.retry_policy(), steady);
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn test_bring_up_restores_policy_on_failure() {
        let mock = MockTransport::new();
        // no response: the version probe fast-fails

        let steady = RetryPolicy::new(7, Duration::from_millis(1));
        let device = Device::new(mock.clone()).with_retry_policy(steady);
        let (tx, _rx) = mpsc::channel(4);
        let mut monitor = Monitor::new(device, MonitorConfig::default(), tx);

        assert!(monitor.bring_up().await.is_err());
        // single immediate check, no retry
        assert_eq!(mock.availability_polls(), 1);
        assert_eq!(monitor.device.retry_policy(), steady);
    }

    #[tokio::test]
    async fn test_poll_once_emits_on_detection() {
        let mock = MockTransport::new();
        let mut payload = vec![1, 0, 1, 0]; // body=1 face=1
        payload.extend_from_slice(&[0; 8]); // one body block
        mock.push_response(&ok_response(&payload));

        let device = Device::new(mock.clone());
        let (tx, mut rx) = mpsc::channel(4);
        let mut monitor = Monitor::new(device, MonitorConfig::default(), tx);

        let result = monitor.poll_once().await.unwrap().unwrap();
        assert_eq!(result.detections(), 2);

        match rx.try_recv().unwrap() {
            Event::Detection(result) => {
                assert_eq!(result.body_count, 1);
                assert_eq!(result.face_count, 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_poll_once_silent_without_matches() {
        let mock = MockTransport::new();
        // hands alone do not trigger the event
        mock.push_response(&ok_response(&[0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]));

        let device = Device::new(mock.clone());
        let (tx, mut rx) = mpsc::channel(4);
        let mut monitor = Monitor::new(device, MonitorConfig::default(), tx);

        let result = monitor.poll_once().await.unwrap();
        assert!(result.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_first_pass_image_used_once() {
        let mock = MockTransport::new();

        // first execute: image requested
        let mut payload = vec![0, 0, 1, 0];
        payload.extend_from_slice(&[2, 0, 1, 0]); // 2x1 image
        payload.extend_from_slice(&[1, 2]);
        mock.push_response(&ok_response(&payload));

        // second execute: no image
        mock.push_response(&ok_response(&[0, 0, 1, 0]));

        let device = Device::new(mock.clone());
        let (tx, _rx) = mpsc::channel(4);
        let config = MonitorConfig {
            debug_image: true,
            ..Default::default()
        };
        let mut monitor = Monitor::new(device, config, tx);

        let first = monitor.poll_once().await.unwrap().unwrap();
        assert!(first.image.is_some());

        let second = monitor.poll_once().await.unwrap().unwrap();
        assert!(second.image.is_none());

        let written = mock.written();
        // image option byte: QVGA-half on the first frame, none on the second
        assert_eq!(written[6], 0x02);
        assert_eq!(written[13], 0x00);
    }
}
