pub(crate) const DATAGRAM_MAX: usize = 512;
pub(crate) const UPLINK_LINE_MAX: usize = 192;

/// One inbound UDP payload on its way to the serial consumer. Zero-length
/// payloads are legal and surfaced as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Datagram {
    payload: heapless::Vec<u8, DATAGRAM_MAX>,
}

impl Datagram {
    pub(crate) fn from_slice(bytes: &[u8]) -> Self {
        let take = bytes.len().min(DATAGRAM_MAX);
        let mut payload = heapless::Vec::new();
        let _ = payload.extend_from_slice(&bytes[..take]);
        Self { payload }
    }

    pub(crate) fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// One complete serial input line queued for transmission to the latched peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct UplinkFrame {
    bytes: heapless::Vec<u8, UPLINK_LINE_MAX>,
}

impl UplinkFrame {
    pub(crate) fn from_slice(line: &[u8]) -> Self {
        let take = line.len().min(UPLINK_LINE_MAX);
        let mut bytes = heapless::Vec::new();
        let _ = bytes.extend_from_slice(&line[..take]);
        Self { bytes }
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datagram_preserves_payload_verbatim() {
        let datagram = Datagram::from_slice(&[0x00, 0xFF, b'A', 0x7F]);
        assert_eq!(datagram.payload(), &[0x00, 0xFF, b'A', 0x7F]);
    }

    #[test]
    fn datagram_surfaces_zero_length_payload() {
        let datagram = Datagram::from_slice(&[]);
        assert!(datagram.payload().is_empty());
    }

    #[test]
    fn datagram_truncates_at_capacity() {
        let oversized = [0xABu8; DATAGRAM_MAX + 100];
        let datagram = Datagram::from_slice(&oversized);
        assert_eq!(datagram.payload().len(), DATAGRAM_MAX);
        assert_eq!(datagram.payload(), &oversized[..DATAGRAM_MAX]);
    }

    #[test]
    fn uplink_frame_keeps_line_bytes() {
        let frame = UplinkFrame::from_slice(b"AT+SEND=1");
        assert_eq!(frame.bytes(), b"AT+SEND=1");
    }
}
