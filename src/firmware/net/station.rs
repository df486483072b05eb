pub(crate) mod store;

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use embassy_time::{Duration, Timer};
use esp_println::println;
use esp_radio::wifi::{
    event::{self, EventExt},
    AuthMethod, ClientConfig, Config as WifiRuntimeConfig, ModeConfig, ScanMethod, WifiController,
    WifiEvent,
};

use super::super::{
    config::STATION_APPLY_POLICY,
    types::{LinkPolicy, StationApplyPolicy, StationCredentials},
};
use super::state::AssocStatus;
use store::StationConfigStore;

const WIFI_RX_QUEUE_SIZE: usize = 3;
const WIFI_TX_QUEUE_SIZE: usize = 2;
const WIFI_STATIC_RX_BUF_NUM: u8 = 4;
const WIFI_DYNAMIC_RX_BUF_NUM: u16 = 8;
const WIFI_DYNAMIC_TX_BUF_NUM: u16 = 8;
const WIFI_RX_BA_WIN: u8 = 3;

/// True while the station holds an association, maintained by the radio event
/// watchers below and sampled by the link monitor.
pub(super) static STA_ASSOCIATED: AtomicBool = AtomicBool::new(false);
/// Raw reason code of the most recent disconnect, 0 when none has happened
/// since the last successful association.
pub(super) static LAST_DISCONNECT_REASON: AtomicU8 = AtomicU8::new(0);
static WATCHERS_INSTALLED: AtomicBool = AtomicBool::new(false);

pub(crate) fn configured_credentials() -> Option<StationCredentials> {
    let ssid = option_env!("UDPLINK_WIFI_SSID").or(option_env!("SSID"))?;
    let password = option_env!("UDPLINK_WIFI_PASSWORD")
        .or(option_env!("PASSWORD"))
        .unwrap_or("");
    StationCredentials::from_parts(ssid.as_bytes(), password.as_bytes()).ok()
}

pub(super) fn wifi_runtime_config() -> WifiRuntimeConfig {
    WifiRuntimeConfig::default()
        .with_rx_queue_size(WIFI_RX_QUEUE_SIZE)
        .with_tx_queue_size(WIFI_TX_QUEUE_SIZE)
        .with_static_rx_buf_num(WIFI_STATIC_RX_BUF_NUM)
        .with_dynamic_rx_buf_num(WIFI_DYNAMIC_RX_BUF_NUM)
        .with_dynamic_tx_buf_num(WIFI_DYNAMIC_TX_BUF_NUM)
        .with_ampdu_rx_enable(false)
        .with_ampdu_tx_enable(false)
        .with_rx_ba_win(WIFI_RX_BA_WIN)
}

/// Decides whether the persisted station record gets rewritten at boot.
pub(crate) fn should_rewrite(
    stored: Option<StationCredentials>,
    desired: StationCredentials,
    policy: StationApplyPolicy,
) -> bool {
    match policy {
        StationApplyPolicy::RewriteAlways => true,
        StationApplyPolicy::SkipWhenMatching => stored != Some(desired),
    }
}

/// Applies the compile-time credentials to the persistent store, honoring the
/// shipped rewrite policy. Returns true when flash was written.
pub(crate) fn apply_station_credentials(
    store: &mut StationConfigStore<'_>,
    desired: StationCredentials,
) -> bool {
    let stored = store.load();
    if !should_rewrite(stored, desired, STATION_APPLY_POLICY) {
        return false;
    }
    store.save(desired);
    true
}

/// Keeps the station associated. `connect_async` is one-shot, so staying on
/// the network is an application loop: connect, wait for the disconnect
/// event, back off one fixed interval, try again.
pub(super) async fn run_station(
    mut controller: WifiController<'static>,
    credentials: Option<StationCredentials>,
    policy: LinkPolicy,
) {
    install_station_event_watchers();

    let active = match credentials {
        Some(value) => value,
        None => {
            println!("station: no credentials configured; radio left idle");
            return;
        }
    };

    let mode = match mode_config_from_credentials(active) {
        Some(mode) => mode,
        None => {
            println!("station: credentials invalid utf8 or length");
            return;
        }
    };

    if let Err(err) = controller.set_config(&mode) {
        println!("station: config err={:?}", err);
        return;
    }

    let backoff = Duration::from_millis(policy.rejoin_backoff_ms as u64);

    loop {
        match controller.is_started() {
            Ok(true) => {}
            Ok(false) => {
                if let Err(err) = controller.start_async().await {
                    println!("station: start err={:?}", err);
                    Timer::after(backoff).await;
                    continue;
                }
            }
            Err(err) => {
                println!("station: status err={:?}", err);
                Timer::after(backoff).await;
                continue;
            }
        }

        match controller.connect_async().await {
            Ok(()) => {
                controller.wait_for_event(WifiEvent::StaDisconnected).await;
                println!("station: link lost; rejoining");
            }
            Err(err) => {
                println!("station: connect err={:?}", err);
            }
        }
        Timer::after(backoff).await;
    }
}

fn install_station_event_watchers() {
    if WATCHERS_INSTALLED.swap(true, Ordering::Relaxed) {
        return;
    }

    event::StaConnected::update_handler(|event| {
        STA_ASSOCIATED.store(true, Ordering::Relaxed);
        LAST_DISCONNECT_REASON.store(0, Ordering::Relaxed);
        let ssid_len = (event.ssid_len() as usize).min(event.ssid().len());
        let ssid = core::str::from_utf8(&event.ssid()[..ssid_len]).unwrap_or("<non_utf8>");
        println!(
            "station: event sta_connected ssid={} channel={}",
            ssid,
            event.channel()
        );
    });

    event::StaDisconnected::update_handler(|event| {
        let reason = event.reason();
        STA_ASSOCIATED.store(false, Ordering::Relaxed);
        LAST_DISCONNECT_REASON.store(reason, Ordering::Relaxed);
        println!(
            "station: event sta_disconnected reason={} ({}) rssi={}",
            reason,
            disconnect_reason_label(reason),
            event.rssi()
        );
    });
}

fn mode_config_from_credentials(credentials: StationCredentials) -> Option<ModeConfig> {
    let ssid = core::str::from_utf8(credentials.ssid_bytes()).ok()?;
    let password = core::str::from_utf8(credentials.password_bytes()).ok()?;
    let auth_method = if password.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::Wpa2Personal
    };
    let client = ClientConfig::default()
        .with_ssid(ssid.into())
        .with_password(password.into())
        .with_auth_method(auth_method)
        .with_scan_method(ScanMethod::AllChannels);
    Some(ModeConfig::Client(client))
}

/// Maps a raw disconnect reason code onto the association status buckets the
/// classifier understands. 0 means no disconnect has been recorded.
pub(super) fn status_from_reason(reason: u8) -> Option<AssocStatus> {
    match reason {
        0 => None,
        202 | 204 => Some(AssocStatus::WrongPassword),
        201 | 210 | 211 | 212 => Some(AssocStatus::ApNotFound),
        _ => Some(AssocStatus::ConnectFailed),
    }
}

fn disconnect_reason_label(reason: u8) -> &'static str {
    match reason {
        2 => "auth_expire",
        200 => "beacon_timeout",
        201 => "no_ap_found",
        202 => "auth_fail",
        203 => "assoc_fail",
        204 => "handshake_timeout",
        205 => "connection_fail",
        210 => "no_ap_found_compatible_security",
        211 => "no_ap_found_authmode_threshold",
        212 => "no_ap_found_rssi_threshold",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(ssid: &[u8], password: &[u8]) -> StationCredentials {
        StationCredentials::from_parts(ssid, password).expect("valid credentials")
    }

    #[test]
    fn reason_zero_means_no_status() {
        assert_eq!(status_from_reason(0), None);
    }

    #[test]
    fn auth_reasons_map_to_wrong_password() {
        assert_eq!(status_from_reason(202), Some(AssocStatus::WrongPassword));
        assert_eq!(status_from_reason(204), Some(AssocStatus::WrongPassword));
    }

    #[test]
    fn no_ap_reasons_map_to_ap_not_found() {
        for reason in [201, 210, 211, 212] {
            assert_eq!(status_from_reason(reason), Some(AssocStatus::ApNotFound));
        }
    }

    #[test]
    fn remaining_reasons_map_to_generic_connect_failure() {
        for reason in [2, 8, 200, 203, 205] {
            assert_eq!(status_from_reason(reason), Some(AssocStatus::ConnectFailed));
        }
    }

    #[test]
    fn skip_when_matching_leaves_identical_record_alone() {
        let desired = credentials(b"lab-net", b"hunter22");
        assert!(!should_rewrite(
            Some(desired),
            desired,
            StationApplyPolicy::SkipWhenMatching
        ));
    }

    #[test]
    fn skip_when_matching_rewrites_missing_or_differing_records() {
        let desired = credentials(b"lab-net", b"hunter22");
        assert!(should_rewrite(
            None,
            desired,
            StationApplyPolicy::SkipWhenMatching
        ));
        let other = credentials(b"lab-net", b"changed");
        assert!(should_rewrite(
            Some(other),
            desired,
            StationApplyPolicy::SkipWhenMatching
        ));
    }

    #[test]
    fn rewrite_always_ignores_the_stored_record() {
        let desired = credentials(b"lab-net", b"hunter22");
        assert!(should_rewrite(
            Some(desired),
            desired,
            StationApplyPolicy::RewriteAlways
        ));
    }

    #[test]
    fn shipped_policy_is_skip_when_matching() {
        assert_eq!(STATION_APPLY_POLICY, StationApplyPolicy::SkipWhenMatching);
    }
}
