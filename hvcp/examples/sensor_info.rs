//! Query sensor version and current settings

use hvcp::Device;
use hvcp_transport::SerialTransport;

#[tokio::main]
async fn main() -> hvcp::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let port = std::env::var("HVC_PORT").unwrap_or_else(|_| "/dev/ttyUSB0".to_string());

    let transport = SerialTransport::open(&port, 921_600)?;
    let mut device = Device::new(transport);

    let version = device.get_version().await?;
    println!("Sensor: {}", version);

    let thresholds = device.get_threshold_values().await?;
    println!("{}", thresholds);

    let sizes = device.get_detection_size().await?;
    println!("{}", sizes);

    let angle = device.get_face_angle().await?;
    println!("{}", angle);

    Ok(())
}
