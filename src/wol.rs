//! Wake-on-LAN magic packet construction and transmission.
//!
//! A magic packet is six `0xff` synchronization bytes followed by the
//! target's hardware address repeated sixteen times, sent as a single
//! UDP broadcast datagram. There is no response on the wire; success
//! only means the local send call went through.

use std::fmt;
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use std::str::FromStr;

use thiserror::Error;

/// Number of octets in an Ethernet hardware address.
pub const MAC_LEN: usize = 6;

/// Longest MAC string the parser accepts, separators included.
pub const MAX_MAC_STR_LEN: usize = 31;

/// Total magic packet size: synchronization bytes plus 16 MAC repetitions.
pub const MAGIC_PACKET_LEN: usize = 6 + 16 * MAC_LEN;

/// Standard WoL port (UDP discard).
pub const DEFAULT_PORT: u16 = 9;

const SYNCHRONIZATION_SCHEME: [u8; 6] = [0xff; 6];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacParseError {
    #[error("empty MAC address")]
    Empty,
    #[error("MAC address longer than {MAX_MAC_STR_LEN} characters")]
    TooLong,
    #[error("expected 12 hex digits, found {0}")]
    DigitCount(usize),
    #[error("characters after the 12th hex digit")]
    TrailingInput,
    #[error("invalid hex pair {0:?}")]
    InvalidOctet(String),
}

#[derive(Debug, Error)]
pub enum WakeError {
    #[error("malformed MAC address: {0}")]
    MalformedMac(#[from] MacParseError),
    #[error("could not open broadcast socket: {0}")]
    Endpoint(#[source] io::Error),
    #[error("sending magic packet failed: {0}")]
    Send(#[source] io::Error),
    #[error("short send: {sent} of 102 bytes")]
    SendIncomplete { sent: usize },
}

/// A 6-octet hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddress([u8; MAC_LEN]);

impl MacAddress {
    pub fn octets(&self) -> [u8; MAC_LEN] {
        self.0
    }
}

impl From<[u8; MAC_LEN]> for MacAddress {
    fn from(octets: [u8; MAC_LEN]) -> Self {
        MacAddress(octets)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

impl FromStr for MacAddress {
    type Err = MacParseError;

    /// Accepts colon-, hyphen-, or space-separated notation as well as a
    /// bare run of 12 hex digits. Separators are stripped one character at
    /// a time, so mixed or repeated separators are fine. Anything left over
    /// after the 12th digit is rejected.
    fn from_str(s: &str) -> Result<Self, MacParseError> {
        if s.is_empty() {
            return Err(MacParseError::Empty);
        }
        if s.len() > MAX_MAC_STR_LEN {
            return Err(MacParseError::TooLong);
        }

        let mut cleaned = Vec::with_capacity(2 * MAC_LEN);
        for b in s.bytes() {
            if b == b':' || b == b'-' || b == b' ' {
                continue;
            }
            if cleaned.len() == 2 * MAC_LEN {
                return Err(MacParseError::TrailingInput);
            }
            cleaned.push(b);
        }
        if cleaned.len() != 2 * MAC_LEN {
            return Err(MacParseError::DigitCount(cleaned.len()));
        }

        let mut octets = [0u8; MAC_LEN];
        for (i, pair) in cleaned.chunks_exact(2).enumerate() {
            match ((pair[0] as char).to_digit(16), (pair[1] as char).to_digit(16)) {
                (Some(hi), Some(lo)) => octets[i] = (hi * 16 + lo) as u8,
                _ => {
                    return Err(MacParseError::InvalidOctet(
                        String::from_utf8_lossy(pair).into_owned(),
                    ))
                }
            }
        }
        Ok(MacAddress(octets))
    }
}

/// The 102-byte payload. Fully determined by the MAC address.
pub struct MagicPacket([u8; MAGIC_PACKET_LEN]);

impl MagicPacket {
    pub fn new(mac: &MacAddress) -> MagicPacket {
        let mut data = [0u8; MAGIC_PACKET_LEN];
        data[..6].copy_from_slice(&SYNCHRONIZATION_SCHEME);
        for chunk in data[6..].chunks_exact_mut(MAC_LEN) {
            chunk.copy_from_slice(&mac.octets());
        }
        MagicPacket(data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// One-shot broadcast send. The real implementation talks UDP; tests
/// substitute a recording fake to keep packets off the network.
pub trait Transport {
    /// Sends a single datagram with the broadcast flag set and returns how
    /// many bytes the network stack accepted.
    fn send_broadcast(&mut self, payload: &[u8], dest: SocketAddrV4) -> Result<usize, WakeError>;
}

/// Sends from an ephemeral UDP socket that lives only for the one call.
/// Nothing is cached or shared between invocations.
pub struct UdpTransport;

impl Transport for UdpTransport {
    fn send_broadcast(&mut self, payload: &[u8], dest: SocketAddrV4) -> Result<usize, WakeError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(WakeError::Endpoint)?;
        socket.set_broadcast(true).map_err(WakeError::Endpoint)?;
        socket.send_to(payload, dest).map_err(WakeError::Send)
    }
}

/// Parses `mac`, builds the magic packet, and broadcasts it exactly once.
/// Returns the parsed address so callers don't have to parse again.
///
/// An unparsable `broadcast` string falls back to `255.255.255.255` rather
/// than failing the call; a `port` of 0 selects the standard port 9. No
/// network activity happens if the MAC does not parse.
pub fn wake(mac: &str, broadcast: Option<&str>, port: u16) -> Result<MacAddress, WakeError> {
    wake_via(&mut UdpTransport, mac, broadcast, port)
}

pub fn wake_via<T: Transport>(
    transport: &mut T,
    mac: &str,
    broadcast: Option<&str>,
    port: u16,
) -> Result<MacAddress, WakeError> {
    let mac: MacAddress = mac.parse()?;
    let packet = MagicPacket::new(&mac);

    let addr = broadcast
        .and_then(|s| s.parse::<Ipv4Addr>().ok())
        .unwrap_or(Ipv4Addr::BROADCAST);
    let port = if port == 0 { DEFAULT_PORT } else { port };

    let sent = transport.send_broadcast(packet.as_bytes(), SocketAddrV4::new(addr, port))?;
    if sent != MAGIC_PACKET_LEN {
        return Err(WakeError::SendIncomplete { sent });
    }
    Ok(mac)
}
