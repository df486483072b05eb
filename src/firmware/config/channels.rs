use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};

use super::super::types::{Datagram, UplinkFrame};

pub(crate) static PEER_RX: Channel<CriticalSectionRawMutex, Datagram, 4> = Channel::new();
pub(crate) static UPLINK_TX: Channel<CriticalSectionRawMutex, UplinkFrame, 4> = Channel::new();
