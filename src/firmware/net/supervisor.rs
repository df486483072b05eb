use core::sync::atomic::Ordering;

use embassy_net::Stack;
use embassy_time::{Duration, Instant, Ticker};
use esp_println::println;

use super::super::types::LinkPolicy;
use super::{
    diag,
    state::{AssocStatus, LinkFault, LinkState},
    station,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LinkCheck {
    pub(crate) state: LinkState,
    pub(crate) fault: Option<LinkFault>,
}

/// Pure classification of a sampled association status. Stateless: the result
/// depends only on the status passed in, never on what a previous tick saw.
pub(crate) fn classify_association(status: AssocStatus) -> LinkCheck {
    match status {
        AssocStatus::GotIp { addr: Some(_) } => LinkCheck {
            state: LinkState::Connected,
            fault: None,
        },
        AssocStatus::GotIp { addr: None } => LinkCheck {
            state: LinkState::ConnectingError,
            fault: Some(LinkFault::InconsistentAddressState),
        },
        AssocStatus::WrongPassword => LinkCheck {
            state: LinkState::ConnectingError,
            fault: Some(LinkFault::CredentialRejected),
        },
        AssocStatus::ApNotFound => LinkCheck {
            state: LinkState::ConnectingError,
            fault: Some(LinkFault::NetworkNotFound),
        },
        AssocStatus::ConnectFailed => LinkCheck {
            state: LinkState::ConnectingError,
            fault: Some(LinkFault::AssociationFailed),
        },
        AssocStatus::Idle | AssocStatus::Associating => LinkCheck {
            state: LinkState::Connecting,
            fault: None,
        },
    }
}

/// Holds the single process-wide link state between ticks. Owned by the
/// monitor task; nothing else mutates it.
pub(crate) struct LinkMonitor {
    state: LinkState,
}

pub(crate) struct LinkObservation {
    pub(crate) previous: LinkState,
    pub(crate) status: AssocStatus,
    pub(crate) check: LinkCheck,
}

impl LinkObservation {
    pub(crate) fn changed(&self) -> bool {
        self.previous != self.check.state
    }

    pub(crate) fn trigger(&self) -> &'static str {
        match self.check.fault {
            Some(fault) => fault.as_str(),
            None => self.status.as_str(),
        }
    }
}

impl LinkMonitor {
    pub(crate) const fn new() -> Self {
        Self {
            state: LinkState::Connecting,
        }
    }

    pub(crate) fn state(&self) -> LinkState {
        self.state
    }

    pub(crate) fn observe(&mut self, status: AssocStatus) -> LinkObservation {
        let check = classify_association(status);
        let previous = self.state;
        self.state = check.state;
        LinkObservation {
            previous,
            status,
            check,
        }
    }
}

fn sample_association(stack: Stack<'static>) -> AssocStatus {
    if station::STA_ASSOCIATED.load(Ordering::Relaxed) {
        if stack.is_config_up() {
            return AssocStatus::GotIp {
                addr: stack.config_v4().map(|config| config.address.address()),
            };
        }
        return AssocStatus::Associating;
    }

    let reason = station::LAST_DISCONNECT_REASON.load(Ordering::Relaxed);
    station::status_from_reason(reason).unwrap_or(AssocStatus::Idle)
}

fn log_link_check(status: AssocStatus, check: LinkCheck) {
    match (check.state, status) {
        (LinkState::Connected, AssocStatus::GotIp { addr: Some(addr) }) => {
            println!("link: wifi connected addr={}", addr);
        }
        (LinkState::Connected, _) => {
            println!("link: wifi connected");
        }
        (LinkState::ConnectingError, _) => match check.fault {
            Some(LinkFault::CredentialRejected) => {
                println!("link: wifi connecting error, wrong password");
            }
            Some(LinkFault::NetworkNotFound) => {
                println!("link: wifi connecting error, ap not found");
            }
            Some(LinkFault::InconsistentAddressState) => {
                println!("link: wifi connected, address is null");
            }
            _ => println!("link: wifi connecting fail"),
        },
        (LinkState::Connecting, _) => {
            println!("link: wifi connecting...");
        }
    }
}

/// Periodic health check. The `Ticker` owns the re-arm contract: it fires
/// every `check_interval_ms` for the lifetime of the process and is never
/// cancelled.
pub(super) async fn run_link_monitor(stack: Stack<'static>, policy: LinkPolicy) {
    let started_at = Instant::now();
    let mut monitor = LinkMonitor::new();
    let mut ticker = Ticker::every(Duration::from_millis(policy.check_interval_ms as u64));

    loop {
        ticker.next().await;
        let status = sample_association(stack);
        let observation = monitor.observe(status);
        log_link_check(status, observation.check);
        if observation.changed() {
            diag::emit_link_event(
                observation.previous,
                monitor.state(),
                observation.trigger(),
                started_at,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use embassy_net::Ipv4Address;

    use super::*;

    fn got_ip() -> AssocStatus {
        AssocStatus::GotIp {
            addr: Some(Ipv4Address::new(192, 168, 4, 17)),
        }
    }

    #[test]
    fn classifies_assigned_address_as_connected() {
        let check = classify_association(got_ip());
        assert_eq!(check.state, LinkState::Connected);
        assert_eq!(check.fault, None);
    }

    #[test]
    fn classifies_null_address_as_inconsistent_error() {
        let check = classify_association(AssocStatus::GotIp { addr: None });
        assert_eq!(check.state, LinkState::ConnectingError);
        assert_eq!(check.fault, Some(LinkFault::InconsistentAddressState));
    }

    #[test]
    fn classifies_each_failure_with_its_own_fault() {
        let wrong = classify_association(AssocStatus::WrongPassword);
        assert_eq!(wrong.state, LinkState::ConnectingError);
        assert_eq!(wrong.fault, Some(LinkFault::CredentialRejected));

        let missing = classify_association(AssocStatus::ApNotFound);
        assert_eq!(missing.state, LinkState::ConnectingError);
        assert_eq!(missing.fault, Some(LinkFault::NetworkNotFound));

        let failed = classify_association(AssocStatus::ConnectFailed);
        assert_eq!(failed.state, LinkState::ConnectingError);
        assert_eq!(failed.fault, Some(LinkFault::AssociationFailed));
    }

    #[test]
    fn classifies_idle_and_associating_as_connecting() {
        assert_eq!(
            classify_association(AssocStatus::Idle).state,
            LinkState::Connecting
        );
        assert_eq!(
            classify_association(AssocStatus::Associating).state,
            LinkState::Connecting
        );
    }

    #[test]
    fn monitor_walks_boot_sequence_to_connected() {
        let mut monitor = LinkMonitor::new();
        assert_eq!(monitor.state(), LinkState::Connecting);

        let first = monitor.observe(AssocStatus::Idle);
        assert_eq!(first.check.state, LinkState::Connecting);
        assert!(!first.changed());

        let second = monitor.observe(AssocStatus::Associating);
        assert_eq!(second.check.state, LinkState::Connecting);
        assert!(!second.changed());

        let third = monitor.observe(got_ip());
        assert_eq!(third.check.state, LinkState::Connected);
        assert!(third.changed());
        assert_eq!(monitor.state(), LinkState::Connected);
    }

    #[test]
    fn monitor_recovers_from_error_on_next_good_status() {
        let mut monitor = LinkMonitor::new();

        let rejected = monitor.observe(AssocStatus::WrongPassword);
        assert_eq!(rejected.check.state, LinkState::ConnectingError);
        assert!(rejected.changed());
        assert_eq!(rejected.trigger(), "credential_rejected");

        // Recovery depends only on the next sampled status, not on history.
        let recovered = monitor.observe(got_ip());
        assert_eq!(recovered.check.state, LinkState::Connected);
        assert!(recovered.changed());
        assert_eq!(recovered.trigger(), "got_ip");
    }

    #[test]
    fn classification_ignores_prior_state() {
        let mut monitor = LinkMonitor::new();
        monitor.observe(AssocStatus::ApNotFound);
        let after_error = monitor.observe(AssocStatus::Idle);
        assert_eq!(after_error.check.state, LinkState::Connecting);
        assert_eq!(after_error.check.fault, None);
    }
}
