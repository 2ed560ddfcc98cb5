//! Scripted in-memory transport
//!
//! Simulates the sensor side of the link for driver tests: response bytes
//! are queued up front, availability answers can be scripted per poll, and
//! writes are captured for inspection. Clones share state so a test can
//! hand the transport to a driver and still observe what happened.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{Result, Transport};

#[derive(Debug, Default)]
struct Inner {
    /// Bytes the simulated device has "sent", consumed by reads
    pending: VecDeque<u8>,

    /// Scripted answers for `available()`. When exhausted, availability
    /// falls back to the real pending byte count.
    availability: VecDeque<usize>,

    /// Cap on bytes accepted per write call (short-write simulation)
    write_limit: Option<usize>,

    /// Cap on bytes returned per read call
    read_limit: Option<usize>,

    /// Everything the driver wrote, in order
    written: Vec<u8>,

    /// Number of `available()` calls observed
    availability_polls: usize,
}

/// Shared-state mock transport for tests
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the driver to read
    pub fn push_response(&self, bytes: &[u8]) {
        self.inner.lock().pending.extend(bytes.iter().copied());
    }

    /// Script the next `available()` answers, consumed one per poll
    pub fn script_availability(&self, answers: impl IntoIterator<Item = usize>) {
        self.inner.lock().availability.extend(answers);
    }

    /// Accept at most `limit` bytes per write call
    pub fn set_write_limit(&self, limit: usize) {
        self.inner.lock().write_limit = Some(limit);
    }

    /// Return at most `limit` bytes per read call
    pub fn set_read_limit(&self, limit: usize) {
        self.inner.lock().read_limit = Some(limit);
    }

    /// Bytes the driver has written so far
    pub fn written(&self) -> Vec<u8> {
        self.inner.lock().written.clone()
    }

    /// Response bytes not yet consumed by the driver
    pub fn remaining(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Number of `available()` calls the driver has made
    pub fn availability_polls(&self) -> usize {
        self.inner.lock().availability_polls
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn write(&mut self, data: &[u8]) -> Result<usize> {
        let mut inner = self.inner.lock();

        let accepted = match inner.write_limit {
            Some(limit) => data.len().min(limit),
            None => data.len(),
        };

        inner.written.extend_from_slice(&data[..accepted]);
        Ok(accepted)
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut inner = self.inner.lock();

        let mut max = buf.len();
        if let Some(limit) = inner.read_limit {
            max = max.min(limit);
        }

        let mut n = 0;
        while n < max {
            match inner.pending.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }

        Ok(n)
    }

    async fn available(&mut self) -> Result<usize> {
        let mut inner = self.inner.lock();
        inner.availability_polls += 1;

        match inner.availability.pop_front() {
            Some(n) => Ok(n),
            None => Ok(inner.pending.len()),
        }
    }

    fn port_name(&self) -> String {
        "mock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_read_consumes_pending() {
        let mock = MockTransport::new();
        mock.push_response(&[1, 2, 3, 4]);

        let mut transport = mock.clone();
        let mut buf = [0u8; 3];
        let n = transport.read(&mut buf).await.unwrap();

        assert_eq!(n, 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(mock.remaining(), 1);
    }

    #[tokio::test]
    async fn test_scripted_availability_then_fallback() {
        let mock = MockTransport::new();
        mock.push_response(&[0xAA; 5]);
        mock.script_availability([0, 2]);

        let mut transport = mock.clone();
        assert_eq!(transport.available().await.unwrap(), 0);
        assert_eq!(transport.available().await.unwrap(), 2);
        assert_eq!(transport.available().await.unwrap(), 5);
        assert_eq!(mock.availability_polls(), 3);
    }

    #[tokio::test]
    async fn test_write_limit_reports_short_write() {
        let mock = MockTransport::new();
        mock.set_write_limit(2);

        let mut transport = mock.clone();
        let n = transport.write(&[9, 8, 7, 6]).await.unwrap();

        assert_eq!(n, 2);
        assert_eq!(mock.written(), vec![9, 8]);
    }
}
