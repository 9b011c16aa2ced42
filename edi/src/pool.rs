// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Bounded per-authority connection pool.
//!
//! At most `size` sessions exist at once. Waiters are served first-in
//! first-out by the semaphore; a released session that is no longer
//! reusable is discarded and its slot freed for a fresh connection.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, info};

use crate::client::{ConnectionConfig, EdiClient};
use crate::errors::Error;
use crate::protocol::Protocol;

type ProtocolFactory = Box<dyn Fn() -> Result<Protocol, Error> + Send + Sync>;

pub struct ClientPool {
    config: ConnectionConfig,
    protocol_factory: ProtocolFactory,
    size: usize,
    permits: Semaphore,
    idle: Mutex<Vec<EdiClient>>,
    created: AtomicUsize,
}

impl ClientPool {
    pub fn new(
        config: ConnectionConfig,
        protocol_factory: impl Fn() -> Result<Protocol, Error> + Send + Sync + 'static,
        size: usize,
    ) -> Self {
        Self {
            config,
            protocol_factory: Box::new(protocol_factory),
            size: size.max(1),
            permits: Semaphore::new(size.max(1)),
            idle: Mutex::new(Vec::new()),
            created: AtomicUsize::new(0),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of live sessions, idle or handed out. Never exceeds `size`.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().expect("pool lock").len()
    }

    /// Acquire a connected session, creating one if the bound allows,
    /// otherwise waiting FIFO for a release. The returned guard gives the
    /// caller exclusive use and returns the session on drop, including on
    /// cancellation.
    pub async fn acquire(&self) -> Result<PooledClient<'_>, Error> {
        let permit = self.permits.acquire().await.map_err(|_| Error::PoolClosed)?;

        let existing = self.idle.lock().expect("pool lock").pop();
        let client = match existing {
            Some(client) => client,
            None => {
                // Holding a permit bounds concurrent creations to `size`.
                self.created.fetch_add(1, Ordering::SeqCst);
                match self.create_client().await {
                    Ok(client) => client,
                    Err(e) => {
                        self.created.fetch_sub(1, Ordering::SeqCst);
                        return Err(e);
                    }
                }
            }
        };

        Ok(PooledClient {
            pool: self,
            client: Some(client),
            _permit: permit,
        })
    }

    async fn create_client(&self) -> Result<EdiClient, Error> {
        let protocol = (self.protocol_factory)()?;
        let mut client = EdiClient::new(self.config.clone(), protocol);
        client.connect().await?;
        debug!(created = self.created(), "pool session created");
        Ok(client)
    }

    /// Run a closure with an acquired session; the slot is released on
    /// every exit path, including cancellation of the returned future.
    pub async fn with_client<'a, T, F, Fut>(&'a self, f: F) -> Result<T, Error>
    where
        F: FnOnce(PooledClient<'a>) -> Fut,
        Fut: std::future::Future<Output = Result<T, Error>> + 'a,
    {
        let client = self.acquire().await?;
        f(client).await
    }

    /// Drain and disconnect every idle session and refuse new acquisitions.
    pub async fn close(&self) {
        self.permits.close();
        let drained: Vec<EdiClient> = {
            let mut idle = self.idle.lock().expect("pool lock");
            idle.drain(..).collect()
        };
        for mut client in drained {
            client.disconnect().await;
            self.created.fetch_sub(1, Ordering::SeqCst);
        }
        info!("connection pool closed");
    }

    fn release(&self, client: EdiClient) {
        if client.is_reusable() && !self.permits.is_closed() {
            self.idle.lock().expect("pool lock").push(client);
        } else {
            // Dropping the client closes its socket.
            self.created.fetch_sub(1, Ordering::SeqCst);
            debug!(created = self.created(), "pool session discarded");
        }
    }
}

/// Exclusive handle to a pooled session. Deref to [`EdiClient`].
pub struct PooledClient<'a> {
    pool: &'a ClientPool,
    client: Option<EdiClient>,
    _permit: SemaphorePermit<'a>,
}

impl std::fmt::Debug for PooledClient<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledClient").finish_non_exhaustive()
    }
}

impl Deref for PooledClient<'_> {
    type Target = EdiClient;

    fn deref(&self) -> &EdiClient {
        self.client.as_ref().expect("client present until drop")
    }
}

impl DerefMut for PooledClient<'_> {
    fn deref_mut(&mut self) -> &mut EdiClient {
        self.client.as_mut().expect("client present until drop")
    }
}

impl Drop for PooledClient<'_> {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.pool.release(client);
        }
    }
}
