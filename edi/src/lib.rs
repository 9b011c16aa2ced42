// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! EDI protocol core for the social-insurance authorities.
//!
//! The exchange is a binary, length-framed, optionally encrypted and signed
//! request-response protocol over long-lived TCP sessions. This crate owns
//! the byte-exact message codec, the framing engine with its protocol state
//! machine, the single-session client with reconnect-and-retry, and the
//! bounded per-authority connection pool.

mod client;
mod errors;
pub mod message;
mod pool;
mod protocol;

pub use self::client::{ConnectionConfig, EdiClient};
pub use self::errors::Error;
pub use self::message::{
    Body, DocumentType, Header, InsuranceType, Message, MessageType, ResponseFields,
};
pub use self::pool::{ClientPool, PooledClient};
pub use self::protocol::{Protocol, ProtocolConfig, ProtocolState};
