mod peer;
mod wifi;

pub(crate) use peer::{Datagram, UplinkFrame, DATAGRAM_MAX, UPLINK_LINE_MAX};
pub(crate) use wifi::{
    LinkPolicy, StationApplyPolicy, StationCredentials, WIFI_PASSWORD_MAX, WIFI_SSID_MAX,
};

use esp_hal::{uart::Uart, Async};

pub(crate) type SerialUart = Uart<'static, Async>;
