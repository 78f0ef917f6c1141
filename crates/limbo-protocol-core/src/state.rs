use crate::error::ProtocolError;
use std::fmt;

/// The state of a Minecraft protocol connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConnectionState {
    Handshake,
    Status,
    Login,
    Configuration,
    Play,
    Closed,
}

impl ConnectionState {
    /// Map the `next_state` field of a handshake to the state it requests.
    /// 3 is the 1.20.5+ "transfer" intent, which is a login.
    pub fn from_handshake_next(next: i32) -> Option<Self> {
        match next {
            1 => Some(ConnectionState::Status),
            2 | 3 => Some(ConnectionState::Login),
            _ => None,
        }
    }

    /// Whether `next` may follow `self`. The table is exhaustive; anything
    /// not listed is illegal.
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Handshake, Status)
                | (Handshake, Login)
                | (Login, Configuration)
                | (Configuration, Play)
                | (Play, Configuration)
                | (Handshake, Closed)
                | (Status, Closed)
                | (Login, Closed)
                | (Configuration, Closed)
                | (Play, Closed)
        )
    }

    /// Validated transition.
    pub fn transition(self, next: ConnectionState) -> Result<ConnectionState, ProtocolError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ProtocolError::IllegalTransition { from: self, to: next })
        }
    }

    pub fn is_closed(self) -> bool {
        self == ConnectionState::Closed
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Handshake => "handshake",
            ConnectionState::Status => "status",
            ConnectionState::Login => "login",
            ConnectionState::Configuration => "configuration",
            ConnectionState::Play => "play",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}
