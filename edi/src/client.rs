// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Single-session EDI client: dial with backoff, one exchange at a time,
//! reconnect-and-retry on session failures.

use std::time::Duration;

use futures::future::BoxFuture;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::errors::Error;
use crate::message::Message;
use crate::protocol::{Protocol, ProtocolState};

/// Server endpoint settings for one authority.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// One TCP session with an authority endpoint.
///
/// Exclusive access is structural: every operation takes `&mut self`, and
/// the pool hands a session to at most one caller at a time.
pub struct EdiClient {
    config: ConnectionConfig,
    protocol: Protocol,
    stream: Option<TcpStream>,
}

impl EdiClient {
    pub fn new(config: ConnectionConfig, protocol: Protocol) -> Self {
        Self {
            config,
            protocol,
            stream: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn state(&self) -> ProtocolState {
        self.protocol.state()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// A session is returnable to the pool only when it is connected and
    /// not poisoned by an aborted or failed exchange.
    pub fn is_reusable(&self) -> bool {
        self.is_connected()
            && !matches!(
                self.protocol.state(),
                ProtocolState::Error | ProtocolState::Transmitting
            )
    }

    /// Establish the connection, backing off `retry_delay * attempt` after
    /// each failed attempt, up to `max_retries` attempts.
    pub async fn connect(&mut self) -> Result<(), Error> {
        if self.is_connected() {
            return Ok(());
        }
        self.protocol.set_state(ProtocolState::Connecting);
        let address = format!("{}:{}", self.config.host, self.config.port);
        let mut last_error = String::new();

        for attempt in 1..=self.config.max_retries {
            info!(%address, attempt, "connecting to EDI server");
            match timeout(self.config.timeout, TcpStream::connect(&address)).await {
                Ok(Ok(stream)) => {
                    self.stream = Some(stream);
                    self.protocol.set_state(ProtocolState::Connected);
                    info!(%address, "connected to EDI server");
                    return Ok(());
                }
                Ok(Err(e)) => last_error = e.to_string(),
                Err(_) => last_error = format!("connect timed out after {:?}", self.config.timeout),
            }
            warn!(%address, attempt, error = %last_error, "connection attempt failed");
            sleep(self.config.retry_delay * attempt).await;
        }

        self.protocol.set_state(ProtocolState::Error);
        Err(Error::ConnectFailed {
            attempts: self.config.max_retries,
            last: last_error,
        })
    }

    /// Close the connection. Never fails; a half-dead socket is dropped.
    pub async fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            use tokio::io::AsyncWriteExt;
            if let Err(e) = stream.shutdown().await {
                debug!(error = %e, "error during disconnect");
            }
            info!("disconnected from EDI server");
        }
        self.protocol.set_state(ProtocolState::Disconnected);
    }

    /// Send one message and await its response.
    ///
    /// Any failure, timeout or cancellation leaves the session in the
    /// `Error`/`Transmitting` poisoned states so the pool discards it.
    pub async fn send(&mut self, message: &mut Message) -> Result<(Message, bool), Error> {
        if self.stream.is_none() {
            return Err(Error::NotConnected);
        }
        self.protocol.begin_exchange()?;

        let result = self.exchange(message).await;
        match &result {
            Ok((response, signature_valid)) => {
                info!(
                    message_id = %response.header.message_id,
                    signature_valid,
                    "response received"
                );
                self.protocol.set_state(ProtocolState::Authenticated);
            }
            Err(e) => {
                warn!(error = %e, "send/receive failed");
                self.protocol.set_state(ProtocolState::Error);
            }
        }
        result
    }

    async fn exchange(&mut self, message: &mut Message) -> Result<(Message, bool), Error> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        self.protocol.write_message(stream, message).await?;
        debug!(message_id = %message.header.message_id, "message sent");
        self.protocol.read_message(stream).await
    }

    /// Send with automatic reconnect between attempts. Non-retryable
    /// failures and exhausted attempts surface the last error.
    pub async fn send_with_retry(
        &mut self,
        message: &mut Message,
        max_retries: Option<u32>,
    ) -> Result<(Message, bool), Error> {
        let retries = max_retries.unwrap_or(self.config.max_retries).max(1);
        let mut last_error = Error::NotConnected;

        for attempt in 1..=retries {
            if !self.is_connected() {
                if let Err(e) = self.connect().await {
                    last_error = e;
                    continue;
                }
            }
            match self.send(message).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    warn!(attempt, error = %e, "send attempt failed");
                    last_error = e;
                    self.disconnect().await;
                    if attempt < retries {
                        sleep(self.config.retry_delay * attempt).await;
                    }
                }
            }
        }
        Err(last_error)
    }

    /// Run a closure inside a connected session, disconnecting on every
    /// exit path.
    pub async fn session<T>(
        &mut self,
        f: impl for<'a> FnOnce(&'a mut Self) -> BoxFuture<'a, Result<T, Error>>,
    ) -> Result<T, Error> {
        self.connect().await?;
        let result = f(self).await;
        self.disconnect().await;
        result
    }
}
