mod diag;
mod peer;
mod state;
mod station;
mod supervisor;

use embassy_net::{Runner, Stack, StackResources};
use esp_hal::rng::Rng;
use esp_radio::wifi::{InternalWifiError, WifiController, WifiDevice, WifiError};
use static_cell::StaticCell;

use super::types::{LinkPolicy, StationCredentials};

pub(crate) use station::{apply_station_credentials, configured_credentials};
pub(crate) use station::store::StationConfigStore;

pub(crate) struct NetRuntime {
    pub(crate) controller: WifiController<'static>,
    pub(crate) runner: Runner<'static, WifiDevice<'static>>,
    pub(crate) stack: Stack<'static>,
}

/// Boot-time wiring of the radio and the IP stack. Any failure here is fatal:
/// the caller logs the message and halts instead of limping on without a
/// network.
pub(crate) fn setup(
    wifi: esp_hal::peripherals::WIFI<'static>,
) -> Result<NetRuntime, &'static str> {
    static RADIO_CTRL: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
    static STACK_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();

    let radio_ctrl = esp_radio::init().map_err(|err| {
        esp_println::println!("net: esp_radio::init err={:?}", err);
        "net: esp_radio::init failed"
    })?;
    let radio_ctrl = RADIO_CTRL.init(radio_ctrl);
    let (controller, ifaces) =
        esp_radio::wifi::new(radio_ctrl, wifi, station::wifi_runtime_config()).map_err(|err| {
            match err {
                WifiError::InvalidArguments => "net: wifi init failed invalid_args",
                WifiError::Unsupported => "net: wifi init failed unsupported",
                WifiError::NotInitialized => "net: wifi init failed not_initialized",
                WifiError::InternalError(InternalWifiError::NoMem) => "net: wifi init failed no_mem",
                _ => "net: wifi init failed other",
            }
        })?;

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    let (stack, runner) = embassy_net::new(
        ifaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        STACK_RESOURCES.init(StackResources::<3>::new()),
        seed,
    );

    Ok(NetRuntime {
        controller,
        runner,
        stack,
    })
}

#[embassy_executor::task]
pub(crate) async fn station_task(
    controller: WifiController<'static>,
    credentials: Option<StationCredentials>,
    policy: LinkPolicy,
) {
    station::run_station(controller, credentials, policy).await;
}

#[embassy_executor::task]
pub(crate) async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

#[embassy_executor::task]
pub(crate) async fn link_monitor_task(stack: Stack<'static>, policy: LinkPolicy) {
    supervisor::run_link_monitor(stack, policy).await;
}

#[embassy_executor::task]
pub(crate) async fn peer_channel_task(stack: Stack<'static>) {
    peer::run_peer_channel(stack).await;
}
