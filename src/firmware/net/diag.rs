use embassy_net::IpEndpoint;
use embassy_time::Instant;
use esp_println::println;

use super::state::LinkState;

pub(super) fn emit_link_event(
    from: LinkState,
    to: LinkState,
    trigger: &'static str,
    started_at: Instant,
) {
    let at_ms = started_at.elapsed().as_millis() as u32;
    println!(
        "NET_EVENT {{\"from\":\"{}\",\"to\":\"{}\",\"trigger\":\"{}\",\"at_ms\":{}}}",
        from.as_str(),
        to.as_str(),
        trigger,
        at_ms
    );
}

pub(super) fn emit_peer_latched(endpoint: IpEndpoint, started_at: Instant) {
    let at_ms = started_at.elapsed().as_millis() as u32;
    println!(
        "NET_EVENT {{\"event\":\"peer_latched\",\"peer\":\"{}\",\"at_ms\":{}}}",
        endpoint, at_ms
    );
}
