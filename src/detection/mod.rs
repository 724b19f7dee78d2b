// Detection domain — marker tracker notifications and the tracked flag.

pub mod bridge;
pub mod error;
pub mod signal;
