//! High-level sensor interface
//!
//! [`Device`] owns the transport handle and the retry policy, and runs
//! one command at a time: the protocol has no request identifiers, so a
//! second in-flight command would make responses ambiguous. Exclusive
//! `&mut self` access enforces that single-outstanding-command rule.

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::AsyncWrite;
use tokio::time;
use tracing::{debug, trace};

use hvcp_core::{
    wire, CameraAngle, ExecutionFlags, Frame, ImageOption, Opcode, PollVerdict, PollWait,
    ResponseHeader, RetryPolicy, RollAngle, YawAngle,
};
use hvcp_transport::Transport;
use hvcp_types::{DetectionSize, ExecutionResult, FaceAngle, ThresholdValues, VersionInfo};

use crate::decode;
use crate::error::{Error, Result};

/// HVC-P vision sensor
///
/// High-level interface for driving the sensor over a byte-stream link.
///
/// # Examples
///
/// ```no_run
/// use hvcp::Device;
/// use hvcp_transport::SerialTransport;
///
/// #[tokio::main]
/// async fn main() -> hvcp::Result<()> {
///     let transport = SerialTransport::open("/dev/ttyUSB0", 921_600)?;
///     let mut device = Device::new(transport);
///
///     let version = device.get_version().await?;
///     println!("Sensor: {}", version);
///
///     Ok(())
/// }
/// ```
pub struct Device {
    transport: Box<dyn Transport>,
    retry: RetryPolicy,
}

impl Device {
    /// Create a device over an open transport
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            retry: RetryPolicy::default(),
        }
    }

    /// Set the retry policy at construction
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Current retry policy
    ///
    /// `RetryPolicy` is `Copy`; callers tightening the policy for a
    /// fast-fail probe keep the returned value to restore afterwards.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Replace the retry policy
    pub fn set_retry_policy(&mut self, retry: RetryPolicy) {
        self.retry = retry;
    }

    /// Link name for logging
    pub fn port_name(&self) -> String {
        self.transport.port_name()
    }

    /// Get sensor model and firmware version
    pub async fn get_version(&mut self) -> Result<VersionInfo> {
        self.run_command(Opcode::GetVersion, Bytes::new()).await?;
        decode::version(self.transport.as_mut()).await
    }

    /// Set the camera mount angle
    pub async fn set_camera_angle(&mut self, angle: CameraAngle) -> Result<()> {
        let payload = Bytes::copy_from_slice(&[angle as u8]);
        self.run_set(Opcode::SetCameraAngle, payload).await
    }

    /// Get the camera mount angle
    pub async fn get_camera_angle(&mut self) -> Result<CameraAngle> {
        self.run_command(Opcode::GetCameraAngle, Bytes::new()).await?;
        decode::camera_angle(self.transport.as_mut()).await
    }

    /// Set detection thresholds
    ///
    /// Values are validated before any I/O.
    pub async fn set_threshold_values(&mut self, values: &ThresholdValues) -> Result<()> {
        values.validate()?;

        let mut payload = BytesMut::with_capacity(8);
        for value in [values.body, values.hand, values.face, values.recognition] {
            put_u16_lsb_msb(&mut payload, value);
        }

        self.run_set(Opcode::SetThresholdValues, payload.freeze()).await
    }

    /// Get detection thresholds
    pub async fn get_threshold_values(&mut self) -> Result<ThresholdValues> {
        self.run_command(Opcode::GetThresholdValues, Bytes::new()).await?;
        decode::threshold_values(self.transport.as_mut()).await
    }

    /// Set min/max detection sizes
    ///
    /// Values are validated before any I/O.
    pub async fn set_detection_size(&mut self, sizes: &DetectionSize) -> Result<()> {
        sizes.validate()?;

        let mut payload = BytesMut::with_capacity(12);
        for value in [
            sizes.min_body,
            sizes.max_body,
            sizes.min_hand,
            sizes.max_hand,
            sizes.min_face,
            sizes.max_face,
        ] {
            put_u16_lsb_msb(&mut payload, value);
        }

        self.run_set(Opcode::SetDetectionSize, payload.freeze()).await
    }

    /// Get min/max detection sizes
    pub async fn get_detection_size(&mut self) -> Result<DetectionSize> {
        self.run_command(Opcode::GetDetectionSize, Bytes::new()).await?;
        decode::detection_size(self.transport.as_mut()).await
    }

    /// Set face angle detection ranges
    pub async fn set_face_angle(&mut self, yaw: YawAngle, roll: RollAngle) -> Result<()> {
        let payload = Bytes::copy_from_slice(&[yaw as u8, roll as u8]);
        self.run_set(Opcode::SetFaceAngle, payload).await
    }

    /// Get face angle detection ranges
    pub async fn get_face_angle(&mut self) -> Result<FaceAngle> {
        self.run_command(Opcode::GetFaceAngle, Bytes::new()).await?;
        decode::face_angle(self.transport.as_mut()).await
    }

    /// Run detection without an image capture
    pub async fn execute(&mut self, flags: ExecutionFlags) -> Result<ExecutionResult> {
        let header = self
            .run_command(Opcode::Execute, execute_payload(flags, ImageOption::None))
            .await?;

        decode::execution(
            self.transport.as_mut(),
            header.payload_length,
            &self.retry,
            None,
        )
        .await
    }

    /// Run detection and stream the requested image into `sink`
    ///
    /// The sink receives image bytes incrementally, in wire order. On a
    /// shortfall the result is still returned with its counts; the
    /// attached [`hvcp_types::ImageCapture`] reports the delivered byte
    /// count and `complete = false`, and the sink holds exactly that
    /// prefix.
    pub async fn execute_with_image<S>(
        &mut self,
        flags: ExecutionFlags,
        image: ImageOption,
        sink: &mut S,
    ) -> Result<ExecutionResult>
    where
        S: AsyncWrite + Unpin + Send,
    {
        let header = self
            .run_command(Opcode::Execute, execute_payload(flags, image))
            .await?;

        let sink: Option<&mut (dyn AsyncWrite + Unpin + Send)> = if image.requests_image() {
            Some(sink)
        } else {
            None
        };

        decode::execution(
            self.transport.as_mut(),
            header.payload_length,
            &self.retry,
            sink,
        )
        .await
    }

    // Executor internals

    /// Write one frame and read back a validated response header.
    ///
    /// On `BadSync` or `DeviceError` the declared payload is left
    /// undrained: the protocol offers no way to resynchronize short of
    /// letting the next command time out, so flushing here would only
    /// hide the desync.
    async fn run_command(&mut self, opcode: Opcode, payload: Bytes) -> Result<ResponseHeader> {
        let frame = Frame::new(opcode, payload)?;
        let data = frame.encode();

        debug!("Executing {}", opcode);
        trace!("Command frame: {}", hex::encode(&data));

        let written = self.transport.write(&data).await?;
        if written < data.len() {
            // the link may hold a partial frame now; re-sending risks
            // double execution on the device
            return Err(Error::ShortWrite {
                written,
                expected: data.len(),
            });
        }

        self.wait_for_data().await?;

        let header = self.read_header().await?;
        trace!("{}", header);

        header.validate()?;

        Ok(header)
    }

    /// Set-command wrapper: a validated header is the whole response
    async fn run_set(&mut self, opcode: Opcode, payload: Bytes) -> Result<()> {
        self.run_command(opcode, payload).await?;
        Ok(())
    }

    /// Poll for availability within the retry budget
    async fn wait_for_data(&mut self) -> Result<()> {
        let mut wait = PollWait::new(&self.retry);

        loop {
            let available = self.transport.available().await?;

            match wait.tick(available) {
                PollVerdict::Ready => return Ok(()),
                PollVerdict::TimedOut => {
                    return Err(Error::Timeout {
                        polls: wait.polls(),
                    });
                }
                // cooperative yield so the host scheduler is not starved
                PollVerdict::Waiting => time::sleep(self.retry.poll_interval).await,
            }
        }
    }

    /// Read exactly one response header off the transport
    async fn read_header(&mut self) -> Result<ResponseHeader> {
        let mut buf = [0u8; ResponseHeader::SIZE];
        let mut read = 0;

        while read < buf.len() {
            let n = self.transport.read(&mut buf[read..]).await?;

            if n == 0 {
                return Err(Error::ShortHeader { read });
            }

            read += n;
        }

        Ok(ResponseHeader::decode(&buf)?)
    }
}

/// EXECUTE payload: flags(u16 LE) | image option(1)
fn execute_payload(flags: ExecutionFlags, image: ImageOption) -> Bytes {
    let mut payload = BytesMut::with_capacity(3);
    put_u16_lsb_msb(&mut payload, flags.bits());
    payload.put_u8(image as u8);
    payload.freeze()
}

fn put_u16_lsb_msb(buf: &mut BytesMut, value: u16) {
    let (lsb, msb) = wire::u16_to_lsb_msb(value);
    buf.put_u8(lsb);
    buf.put_u8(msb);
}
