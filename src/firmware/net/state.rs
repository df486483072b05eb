use embassy_net::Ipv4Address;

/// Logical link state, recomputed from scratch on every health-check tick.
/// The value is replaced wholesale; nothing increments or decays it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LinkState {
    Connecting,
    ConnectingError,
    Connected,
}

impl LinkState {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::ConnectingError => "ConnectingError",
            Self::Connected => "Connected",
        }
    }
}

/// Association status as sampled from the radio and IP stack. This is the
/// classification input; it carries no history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AssocStatus {
    Idle,
    Associating,
    WrongPassword,
    ApNotFound,
    ConnectFailed,
    GotIp { addr: Option<Ipv4Address> },
}

impl AssocStatus {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Associating => "associating",
            Self::WrongPassword => "wrong_password",
            Self::ApNotFound => "ap_not_found",
            Self::ConnectFailed => "connect_failed",
            Self::GotIp { .. } => "got_ip",
        }
    }
}

/// Why a tick landed in `ConnectingError`. Observe-only: every fault is
/// surfaced the same way, and recovery stays with the rejoin loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LinkFault {
    CredentialRejected,
    NetworkNotFound,
    AssociationFailed,
    InconsistentAddressState,
}

impl LinkFault {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::CredentialRejected => "credential_rejected",
            Self::NetworkNotFound => "network_not_found",
            Self::AssociationFailed => "association_failed",
            Self::InconsistentAddressState => "inconsistent_address_state",
        }
    }
}
