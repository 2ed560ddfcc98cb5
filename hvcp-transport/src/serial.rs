//! Serial transport

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, trace};

use crate::{error::*, Transport};

/// Default HVC-P baud rate
pub const DEFAULT_BAUD_RATE: u32 = 921_600;

/// Serial transport over a UART link to the sensor
///
/// 8 data bits, no parity, one stop bit, no flow control, per the sensor
/// datasheet.
pub struct SerialTransport {
    path: String,
    stream: SerialStream,
}

impl SerialTransport {
    /// Open a serial port to the sensor
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use hvcp_transport::SerialTransport;
    ///
    /// # fn main() -> hvcp_transport::Result<()> {
    /// let transport = SerialTransport::open("/dev/ttyUSB0", 921_600)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl Into<String>, baud_rate: u32) -> Result<Self> {
        let path = path.into();

        debug!("Opening serial port {} at {} baud", path, baud_rate);

        let stream = tokio_serial::new(path.as_str(), baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| Error::InvalidPort(format!("{}: {}", path, e)))?;

        Ok(Self { path, stream })
    }

    /// Discard anything buffered on the link.
    ///
    /// Used at bring-up: responses to commands sent before a host restart
    /// may still be flowing in and would desynchronize the first command.
    pub fn flush_input(&self) -> Result<()> {
        self.stream
            .clear(tokio_serial::ClearBuffer::Input)
            .map_err(Error::Serial)?;
        Ok(())
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn write(&mut self, data: &[u8]) -> Result<usize> {
        trace!("TX {} bytes: {}", data.len(), hex::encode(&data[..data.len().min(16)]));

        let written = self.stream.write(data).await?;
        self.stream.flush().await?;

        Ok(written)
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.stream.read(buf).await?;

        trace!("RX {} bytes: {}", n, hex::encode(&buf[..n.min(16)]));

        Ok(n)
    }

    async fn available(&mut self) -> Result<usize> {
        let n = self.stream.bytes_to_read().map_err(Error::Serial)?;
        Ok(n as usize)
    }

    fn port_name(&self) -> String {
        self.path.clone()
    }
}
