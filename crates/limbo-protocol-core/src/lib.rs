pub mod adapter;
pub mod codec;
pub mod connection;
pub mod error;
pub mod frame;
pub mod packets;
pub mod protocol;
pub mod registry;
pub mod state;
pub mod version;

pub use adapter::*;
pub use codec::*;
pub use connection::{Connection, ConnectionError};
pub use error::*;
pub use frame::*;
pub use packets::*;
pub use protocol::Protocol;
pub use registry::*;
pub use state::*;
pub use version::*;
