mod line_reader;

use embassy_time::{with_timeout, Duration};
use esp_println::println;

use super::super::{
    config::{
        channels::{PEER_RX, UPLINK_TX},
        SERIAL_POLL_MS,
    },
    types::SerialUart,
};
use line_reader::{LineAccumulator, LinePush};

/// Bridges the peer channel and UART0: every surfaced datagram payload goes
/// out the wire verbatim, and every complete input line is queued for uplink
/// to the latched peer.
#[embassy_executor::task]
pub(crate) async fn serial_bridge_task(mut uart: SerialUart) {
    let mut lines = LineAccumulator::new();
    let mut rx = [0u8; 1];

    loop {
        while let Ok(datagram) = PEER_RX.try_receive() {
            let _ = uart_write_all(&mut uart, datagram.payload()).await;
            let _ = uart_write_all(&mut uart, b"\r\n").await;
        }

        if let Ok(Ok(1)) =
            with_timeout(Duration::from_millis(SERIAL_POLL_MS), uart.read_async(&mut rx)).await
        {
            match lines.push(rx[0]) {
                LinePush::Frame(frame) => {
                    if UPLINK_TX.try_send(frame).is_err() {
                        println!("serial: uplink queue full; line dropped");
                    }
                }
                LinePush::TooLong => {
                    println!("serial: input line too long; discarding until terminator");
                }
                LinePush::Pending => {}
            }
        }
    }
}

async fn uart_write_all(uart: &mut SerialUart, mut bytes: &[u8]) -> bool {
    while !bytes.is_empty() {
        match uart.write_async(bytes).await {
            Ok(0) => return false,
            Ok(written) => bytes = &bytes[written..],
            Err(_) => return false,
        }
    }
    true
}
