//! Connectionless UDP protocol: packet framing, transport, queries and rcon.

pub mod packet;
pub mod query;
pub mod rcon;
pub mod transport;

pub use query::QueryClient;
pub use rcon::RconClient;

/// Protocol generation of a monitored server.
///
/// Two wire layouts exist for the player-list response: the current one
/// (protocol 49) is a key-value sequence, the old one (protocol 48) is a
/// flat repeating group. The generation also selects the log-line prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVariant {
    Old,
    Current,
}

impl ProtocolVariant {
    pub fn from_number(n: u16) -> Option<Self> {
        match n {
            48 => Some(Self::Old),
            49 => Some(Self::Current),
            _ => None,
        }
    }

    /// The numeric identifier sent in netinfo requests.
    pub fn number(self) -> u16 {
        match self {
            Self::Old => 48,
            Self::Current => 49,
        }
    }

    /// The fixed prefix the server puts in front of every log line.
    pub fn log_prefix(self) -> &'static str {
        match self {
            Self::Old => "log L",
            Self::Current => "log",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_numbers() {
        assert_eq!(ProtocolVariant::from_number(48), Some(ProtocolVariant::Old));
        assert_eq!(
            ProtocolVariant::from_number(49),
            Some(ProtocolVariant::Current)
        );
        assert_eq!(ProtocolVariant::from_number(50), None);
        assert_eq!(ProtocolVariant::Old.number(), 48);
        assert_eq!(ProtocolVariant::Current.number(), 49);
    }

    #[test]
    fn test_log_prefixes() {
        assert_eq!(ProtocolVariant::Current.log_prefix(), "log");
        assert_eq!(ProtocolVariant::Old.log_prefix(), "log L");
    }
}
