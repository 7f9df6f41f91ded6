//! Command gateway to the IssueDeck backend process.
//!
//! The backend performs every GitHub and persistence operation; this crate
//! defines the command surface as the [`Gateway`] trait and ships an HTTP
//! transport for it.

pub mod client;
pub mod gateway;

pub use client::HttpGateway;
pub use gateway::{commands, Gateway, GatewayResult};
