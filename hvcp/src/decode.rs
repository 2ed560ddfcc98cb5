//! Per-command response decoders
//!
//! One decoder per response shape. Field order and width are part of the
//! wire contract: every decoder reads exactly the fields listed, in the
//! listed order, packing multi-byte values with the LSB/MSB rule. The
//! fixed-shape decoders do not cross-check the declared payload length
//! (response shape is opcode-determined); the execute decoder carries the
//! declared length as an explicit budget because its image tail is
//! variable.

use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace, warn};

use hvcp_core::constants::{DETECTION_BLOCK_SIZE, IMAGE_READ_BUFFER, IMAGE_READ_SLEEP_MS};
use hvcp_core::{wire, CameraAngle, RetryPolicy};
use hvcp_transport::Transport;
use hvcp_types::{
    DetectionSize, ExecutionResult, FaceAngle, ImageCapture, ThresholdValues, VersionInfo,
};

use crate::error::{Error, Result};

/// Read exactly `buf.len()` bytes off the transport
pub(crate) async fn read_exact(transport: &mut dyn Transport, buf: &mut [u8]) -> Result<()> {
    let mut read = 0;

    while read < buf.len() {
        let n = transport.read(&mut buf[read..]).await?;

        if n == 0 {
            return Err(Error::ShortRead {
                expected: buf.len(),
                actual: read,
            });
        }

        read += n;
    }

    Ok(())
}

/// GET_VERSION payload: model(12) | major(1) | minor(1) | release(1) | revision(4)
pub(crate) async fn version(transport: &mut dyn Transport) -> Result<VersionInfo> {
    let mut model = [0u8; 12];
    let mut versions = [0u8; 3];
    let mut revision = [0u8; 4];

    read_exact(transport, &mut model).await?;
    read_exact(transport, &mut versions).await?;
    read_exact(transport, &mut revision).await?;

    let model = String::from_utf8_lossy(&model)
        .trim_end_matches(['\0', ' '])
        .to_string();

    Ok(VersionInfo {
        model,
        major: versions[0],
        minor: versions[1],
        release: versions[2],
        revision,
    })
}

/// GET_CAMERA_ANGLE payload: angle(1)
pub(crate) async fn camera_angle(transport: &mut dyn Transport) -> Result<CameraAngle> {
    let mut buf = [0u8; 1];
    read_exact(transport, &mut buf).await?;

    Ok(CameraAngle::try_from(buf[0])?)
}

/// GET_THRESHOLD_VALUES payload: body(2) | hand(2) | face(2) | recognition(2)
pub(crate) async fn threshold_values(transport: &mut dyn Transport) -> Result<ThresholdValues> {
    let mut buf = [0u8; 8];
    read_exact(transport, &mut buf).await?;

    Ok(ThresholdValues {
        body: wire::u16_at(&buf, 0),
        hand: wire::u16_at(&buf, 2),
        face: wire::u16_at(&buf, 4),
        recognition: wire::u16_at(&buf, 6),
    })
}

/// GET_DETECTION_SIZE payload: min/max body | min/max hand | min/max face (2 bytes each)
pub(crate) async fn detection_size(transport: &mut dyn Transport) -> Result<DetectionSize> {
    let mut buf = [0u8; 12];
    read_exact(transport, &mut buf).await?;

    Ok(DetectionSize {
        min_body: wire::u16_at(&buf, 0),
        max_body: wire::u16_at(&buf, 2),
        min_hand: wire::u16_at(&buf, 4),
        max_hand: wire::u16_at(&buf, 6),
        min_face: wire::u16_at(&buf, 8),
        max_face: wire::u16_at(&buf, 10),
    })
}

/// GET_FACE_ANGLE payload: yaw(1) | roll(1)
pub(crate) async fn face_angle(transport: &mut dyn Transport) -> Result<FaceAngle> {
    let mut buf = [0u8; 2];
    read_exact(transport, &mut buf).await?;

    Ok(FaceAngle {
        yaw: buf[0],
        roll: buf[1],
    })
}

/// EXECUTE payload: counts sub-header, opaque detection blocks, optional image
///
/// Sub-header is body(1) | hand(1) | face(1) | reserved(1). The body and
/// hand metadata blocks that follow are not modeled, but their bytes must
/// still come off the wire to keep the stream aligned for the next
/// command. The image drain runs only when the caller requested an image;
/// with no image option the decoder stops after the metadata, whatever
/// the declared length says.
pub(crate) async fn execution(
    transport: &mut dyn Transport,
    payload_length: u32,
    retry: &RetryPolicy,
    sink: Option<&mut (dyn AsyncWrite + Unpin + Send)>,
) -> Result<ExecutionResult> {
    let mut budget = payload_length as usize;

    let mut sub = [0u8; 4];
    read_exact(transport, &mut sub).await?;
    budget = budget.saturating_sub(sub.len());

    let body_count = sub[0];
    let hand_count = sub[1];
    let face_count = sub[2];
    // sub[3] reserved

    debug!(
        "Detections: body={} hand={} face={}",
        body_count, hand_count, face_count
    );

    let block_bytes =
        ((body_count as usize + hand_count as usize) * DETECTION_BLOCK_SIZE).min(budget);
    discard(transport, block_bytes).await?;
    budget -= block_bytes;

    let image = match sink {
        Some(sink) => Some(drain_image(transport, budget, retry, sink).await?),
        None => None,
    };

    Ok(ExecutionResult {
        body_count,
        hand_count,
        face_count,
        image,
    })
}

/// Read and drop `count` bytes of opaque detection metadata
async fn discard(transport: &mut dyn Transport, count: usize) -> Result<()> {
    let mut scratch = [0u8; DETECTION_BLOCK_SIZE];
    let mut remaining = count;

    while remaining > 0 {
        let want = remaining.min(scratch.len());
        read_exact(transport, &mut scratch[..want]).await?;
        remaining -= want;
    }

    Ok(())
}

/// Stream the variable-length image payload into the caller's sink.
///
/// Dimensions first (width, height as u16 LE), then `width * height`
/// bytes delivered in order as they arrive, chunked so the image is never
/// fully buffered here. Starved polls past the retry ceiling end the
/// drain in a degraded state: the result still carries the counts, the
/// sink holds the exact delivered prefix, and `complete` is false.
async fn drain_image(
    transport: &mut dyn Transport,
    budget: usize,
    retry: &RetryPolicy,
    sink: &mut (dyn AsyncWrite + Unpin + Send),
) -> Result<ImageCapture> {
    let mut dims = [0u8; 4];
    read_exact(transport, &mut dims).await?;

    let width = wire::u16_at(&dims, 0);
    let height = wire::u16_at(&dims, 2);

    let expected = (width as usize * height as usize).min(budget.saturating_sub(dims.len()));
    debug!("Image drain: {}x{}, {} bytes expected", width, height, expected);

    let ceiling = retry.max_wait_polls.max(1);
    let mut chunk = [0u8; IMAGE_READ_BUFFER];
    let mut remaining = expected;
    let mut delivered = 0usize;
    let mut starved = 0u32;
    let mut complete = true;

    while remaining > 0 {
        let available = transport.available().await?;

        if available == 0 {
            starved += 1;

            if starved > ceiling {
                warn!(
                    "Image drain starved after {} bytes, {} outstanding",
                    delivered, remaining
                );
                complete = false;
                break;
            }

            tokio::time::sleep(Duration::from_millis(IMAGE_READ_SLEEP_MS)).await;
            continue;
        }

        let want = available.min(remaining).min(chunk.len());
        let n = transport.read(&mut chunk[..want]).await?;

        if n == 0 {
            complete = false;
            break;
        }

        sink.write_all(&chunk[..n]).await.map_err(Error::Sink)?;
        trace!("Image chunk: {} bytes, {} remaining", n, remaining - n);

        delivered += n;
        remaining -= n;
        starved = 0;
    }

    Ok(ImageCapture {
        width,
        height,
        bytes_written: delivered,
        complete,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hvcp_transport::MockTransport;
    use pretty_assertions::assert_eq;

    fn version_payload() -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(b"HVC-P\0\0\0\0\0\0\0");
        payload.extend_from_slice(&[1, 2, 3]);
        payload.extend_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD]);
        payload
    }

    #[tokio::test]
    async fn test_version_decode() {
        let mock = MockTransport::new();
        mock.push_response(&version_payload());

        let mut transport = mock.clone();
        let info = version(&mut transport).await.unwrap();

        assert_eq!(info.model, "HVC-P");
        assert_eq!((info.major, info.minor, info.release), (1, 2, 3));
        assert_eq!(info.revision, [0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn test_version_short_payload() {
        let mock = MockTransport::new();
        mock.push_response(&[0u8; 10]);

        let mut transport = mock.clone();
        let result = version(&mut transport).await;

        assert!(matches!(
            result,
            Err(Error::ShortRead { expected: 12, actual: 10 })
        ));
    }

    #[tokio::test]
    async fn test_threshold_values_decode() {
        let mock = MockTransport::new();
        // body=100, hand=200, face=300, recognition=400, LSB first
        mock.push_response(&[100, 0, 200, 0, 44, 1, 144, 1]);

        let mut transport = mock.clone();
        let values = threshold_values(&mut transport).await.unwrap();

        assert_eq!(values.body, 100);
        assert_eq!(values.hand, 200);
        assert_eq!(values.face, 300);
        assert_eq!(values.recognition, 400);
    }

    #[tokio::test]
    async fn test_detection_size_decode() {
        let mock = MockTransport::new();
        let mut payload = Vec::new();
        for value in [30u16, 8192, 40, 4096, 64, 1024] {
            let (lsb, msb) = wire::u16_to_lsb_msb(value);
            payload.extend_from_slice(&[lsb, msb]);
        }
        mock.push_response(&payload);

        let mut transport = mock.clone();
        let sizes = detection_size(&mut transport).await.unwrap();

        assert_eq!(sizes.min_body, 30);
        assert_eq!(sizes.max_body, 8192);
        assert_eq!(sizes.min_hand, 40);
        assert_eq!(sizes.max_hand, 4096);
        assert_eq!(sizes.min_face, 64);
        assert_eq!(sizes.max_face, 1024);
    }

    #[tokio::test]
    async fn test_face_angle_decode() {
        let mock = MockTransport::new();
        mock.push_response(&[0x01, 0x00]);

        let mut transport = mock.clone();
        let angle = face_angle(&mut transport).await.unwrap();

        assert_eq!(angle, FaceAngle { yaw: 0x01, roll: 0x00 });
    }

    #[tokio::test]
    async fn test_camera_angle_rejects_unknown() {
        let mock = MockTransport::new();
        mock.push_response(&[0x07]);

        let mut transport = mock.clone();
        assert!(camera_angle(&mut transport).await.is_err());
    }

    #[tokio::test]
    async fn test_execution_drains_metadata_blocks() {
        let mock = MockTransport::new();
        let mut payload = vec![2, 1, 1, 0]; // body=2 hand=1 face=1
        payload.extend_from_slice(&vec![0x55; 3 * DETECTION_BLOCK_SIZE]);
        mock.push_response(&payload);

        let mut transport = mock.clone();
        let retry = RetryPolicy::default();
        let result = execution(&mut transport, payload.len() as u32, &retry, None)
            .await
            .unwrap();

        assert_eq!(result.body_count, 2);
        assert_eq!(result.hand_count, 1);
        assert_eq!(result.face_count, 1);
        assert_eq!(result.image, None);
        // blocks came off the wire so the next command stays aligned
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn test_execution_without_image_never_drains() {
        let mock = MockTransport::new();
        // declared length says more bytes follow the counts
        let mut payload = vec![0, 0, 0, 0];
        payload.extend_from_slice(&[0xEE; 8]);
        mock.push_response(&payload);

        let mut transport = mock.clone();
        let retry = RetryPolicy::default();
        let result = execution(&mut transport, payload.len() as u32, &retry, None)
            .await
            .unwrap();

        assert_eq!(result.image, None);
        // the trailing bytes were never touched
        assert_eq!(mock.remaining(), 8);
        assert_eq!(mock.availability_polls(), 0);
    }

    #[tokio::test]
    async fn test_image_drain_chunked_delivery() {
        let mock = MockTransport::new();
        let mut payload = vec![0, 0, 1, 0]; // one face, no body/hand blocks
        payload.extend_from_slice(&[2, 0, 2, 0]); // 2x2 image
        payload.extend_from_slice(&[10, 20, 30, 40]);
        mock.push_response(&payload);
        // availability restored between two 2-byte chunks
        mock.script_availability([2, 2]);

        let mut transport = mock.clone();
        let retry = RetryPolicy::default();
        let mut sink = Vec::new();
        let result = execution(
            &mut transport,
            payload.len() as u32,
            &retry,
            Some(&mut sink),
        )
        .await
        .unwrap();

        let image = result.image.unwrap();
        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(image.bytes_written, 4);
        assert!(image.complete);
        assert_eq!(sink, vec![10, 20, 30, 40]);
        assert_eq!(mock.availability_polls(), 2);
    }

    #[tokio::test]
    async fn test_image_drain_shortfall_degrades() {
        let mock = MockTransport::new();
        let mut payload = vec![1, 0, 1, 0]; // body=1 face=1
        payload.extend_from_slice(&[0x00; DETECTION_BLOCK_SIZE]);
        payload.extend_from_slice(&[4, 0, 4, 0]); // 4x4 = 16 expected
        payload.extend_from_slice(&[7u8; 10]); // only 10 delivered
        let declared = payload.len() as u32 + 6; // device promised 16

        mock.push_response(&payload);

        let mut transport = mock.clone();
        let retry = RetryPolicy::new(2, Duration::from_millis(1));
        let mut sink = Vec::new();
        let result = execution(&mut transport, declared, &retry, Some(&mut sink))
            .await
            .unwrap();

        // counts survive the shortfall
        assert_eq!(result.body_count, 1);
        assert_eq!(result.face_count, 1);

        let image = result.image.unwrap();
        assert!(!image.complete);
        assert_eq!(image.bytes_written, 10);
        assert_eq!(sink, vec![7u8; 10]);
    }

    #[tokio::test]
    async fn test_image_drain_zero_dimensions() {
        let mock = MockTransport::new();
        let mut payload = vec![0, 0, 0, 0];
        payload.extend_from_slice(&[0, 0, 0, 0]); // 0x0 image
        mock.push_response(&payload);

        let mut transport = mock.clone();
        let retry = RetryPolicy::default();
        let mut sink = Vec::new();
        let result = execution(
            &mut transport,
            payload.len() as u32,
            &retry,
            Some(&mut sink),
        )
        .await
        .unwrap();

        let image = result.image.unwrap();
        assert_eq!(image.bytes_written, 0);
        assert!(image.complete);
        assert!(sink.is_empty());
        // straight to done, no availability polls
        assert_eq!(mock.availability_polls(), 0);
    }
}
