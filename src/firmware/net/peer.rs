use embassy_futures::select::{select, Either};
use embassy_net::{
    udp::{PacketMetadata, UdpSocket},
    IpEndpoint, Stack,
};
use embassy_time::Instant;
use esp_println::println;

use super::super::{
    config::{
        channels::{PEER_RX, UPLINK_TX},
        UDP_LOCAL_PORT, UDP_REMOTE_PORT,
    },
    types::{Datagram, DATAGRAM_MAX},
};
use super::diag;

// Room for a full MTU-sized datagram before truncation to the surfaced
// payload capacity.
const RX_FRAME_MAX: usize = 1536;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LatchOutcome {
    Latched,
    Kept,
    Ignored,
}

/// First-writer-wins peer selection. The first sender observed becomes the
/// destination for every future uplink send; nothing un-latches it short of
/// a restart.
pub(crate) struct PeerLatch {
    peer: Option<IpEndpoint>,
}

impl PeerLatch {
    pub(crate) const fn new() -> Self {
        Self { peer: None }
    }

    pub(crate) fn peer(&self) -> Option<IpEndpoint> {
        self.peer
    }

    // Check and set happen with no await between them, so the executor's
    // run-to-completion guarantee keeps the latch race-free.
    pub(crate) fn observe(&mut self, sender: IpEndpoint) -> LatchOutcome {
        match self.peer {
            None => {
                self.peer = Some(sender);
                LatchOutcome::Latched
            }
            Some(latched) if latched == sender => LatchOutcome::Kept,
            Some(_) => LatchOutcome::Ignored,
        }
    }
}

/// Owns the rendezvous UDP socket. Bound as soon as the stack exists, before
/// the wireless link is necessarily healthy; inbound traffic just pends until
/// the association comes up.
pub(super) async fn run_peer_channel(stack: Stack<'static>) {
    let started_at = Instant::now();
    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buffer = [0u8; RX_FRAME_MAX];
    let mut tx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_buffer = [0u8; RX_FRAME_MAX];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );

    if let Err(err) = socket.bind(UDP_LOCAL_PORT) {
        println!("peer: udp bind port={} err={:?}", UDP_LOCAL_PORT, err);
        return;
    }
    println!(
        "peer: udp ready local_port={} rendezvous_port={}",
        UDP_LOCAL_PORT, UDP_REMOTE_PORT
    );

    let mut latch = PeerLatch::new();
    let mut frame = [0u8; RX_FRAME_MAX];

    loop {
        match select(socket.recv_from(&mut frame), UPLINK_TX.receive()).await {
            Either::First(Ok((len, meta))) => {
                match latch.observe(meta.endpoint) {
                    LatchOutcome::Latched => {
                        println!("peer: latched {}", meta.endpoint);
                        diag::emit_peer_latched(meta.endpoint, started_at);
                    }
                    LatchOutcome::Kept => {}
                    LatchOutcome::Ignored => {
                        println!("peer: datagram from non-latched sender {}", meta.endpoint);
                    }
                }
                if len > DATAGRAM_MAX {
                    println!("peer: datagram truncated len={} max={}", len, DATAGRAM_MAX);
                }
                // Every payload is surfaced regardless of latch outcome,
                // zero-length included.
                if PEER_RX.try_send(Datagram::from_slice(&frame[..len])).is_err() {
                    println!("peer: rx queue full; datagram dropped");
                }
            }
            Either::First(Err(err)) => {
                println!("peer: recv err={:?}", err);
            }
            Either::Second(uplink) => match latch.peer() {
                Some(peer) => {
                    if let Err(err) = socket.send_to(uplink.bytes(), peer).await {
                        println!("peer: send err={:?}", err);
                    }
                }
                None => {
                    println!("peer: no peer latched; uplink dropped");
                }
            },
        }
    }
}
