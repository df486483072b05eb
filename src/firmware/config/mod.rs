pub(crate) mod channels;

use super::types::StationApplyPolicy;

pub(crate) const UART_BAUD: u32 = 115_200;
pub(crate) const SERIAL_POLL_MS: u64 = 10;

// Both sides of the rendezvous agree on this port before a peer is latched.
pub(crate) const UDP_LOCAL_PORT: u16 = 5555;
pub(crate) const UDP_REMOTE_PORT: u16 = 5555;

// Internal-capability heap for the Wi-Fi stack; the application itself
// allocates nothing.
pub(crate) const WIFI_HEAP_BYTES: usize = 72 * 1024;

pub(crate) const STATION_STORE_MAGIC: u32 = 0x4B4E_4C55;
pub(crate) const STATION_STORE_VERSION: u8 = 1;
pub(crate) const STATION_STORE_RECORD_LEN: usize = 104;

pub(crate) const STATION_APPLY_POLICY: StationApplyPolicy = StationApplyPolicy::SkipWhenMatching;
