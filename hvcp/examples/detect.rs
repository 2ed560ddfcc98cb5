//! Continuous body/face detection with event output

use hvcp::{Device, Event, Monitor, MonitorConfig};
use hvcp_transport::SerialTransport;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> hvcp::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let port = std::env::var("HVC_PORT").unwrap_or_else(|_| "/dev/ttyUSB0".to_string());

    let transport = SerialTransport::open(&port, 921_600)?;
    transport.flush_input()?;

    let device = Device::new(transport);

    let (tx, mut rx) = mpsc::channel(16);
    let monitor = Monitor::new(device, MonitorConfig::default(), tx);

    tokio::spawn(monitor.run());

    while let Some(event) = rx.recv().await {
        match event {
            Event::Initialized(version) => println!("Sensor up: {}", version),
            Event::Detection(result) => println!("{}", result),
        }
    }

    Ok(())
}
