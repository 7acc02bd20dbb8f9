//! Timeline UART transmit task
//!
//! Writes each timeline entry as a postcard COBS frame. Frames are
//! zero-terminated, so a host can resynchronise on any zero byte.

use defmt::*;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use cablecar_core::timeline::MAX_ENTRY_FRAME_LEN;

use crate::channels::TIMELINE_CHANNEL;

#[embassy_executor::task]
pub async fn timeline_tx_task(mut tx: BufferedUartTx<'static, UART0>) {
    info!("Timeline TX task started");

    loop {
        let entry = TIMELINE_CHANNEL.receive().await;

        let mut buf = [0u8; MAX_ENTRY_FRAME_LEN];
        let frame = match entry.encode_cobs(&mut buf) {
            Ok(frame) => frame,
            Err(_) => {
                warn!("Failed to encode timeline entry");
                continue;
            }
        };

        if let Err(e) = tx.write_all(frame).await {
            warn!("Failed to send timeline frame: {:?}", e);
        } else {
            trace!("Timeline frame sent ({} bytes)", frame.len());
        }
    }
}
