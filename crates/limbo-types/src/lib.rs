mod mini_message;
mod types;

pub use mini_message::{parse_mini_message, MiniMessageError};
pub use types::*;
