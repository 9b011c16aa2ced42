// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Test fixtures shared across the workspace: an in-process mock authority
//! server speaking the EDI wire protocol, and RSA key material written to
//! temporary files.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::debug;

use kedi_edi::{Body, Header, Message, MessageType, Protocol, ProtocolConfig};

/// Behavior knobs for [`MockAuthority`].
#[derive(Clone)]
pub struct MockOptions {
    /// Server-side protocol settings; must mirror the client's for
    /// encrypted or signed exchanges.
    pub protocol: ProtocolConfig,
    pub response_code: String,
    pub response_message: String,
    pub response_data: Option<Vec<u8>>,
    /// Close this many connections immediately after accept, then serve.
    pub fail_first_connections: usize,
    /// Hold each response for this long before answering.
    pub response_delay: Option<Duration>,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            protocol: ProtocolConfig::plaintext(),
            response_code: "0000".to_string(),
            response_message: "Success".to_string(),
            response_data: None,
            fail_first_connections: 0,
            response_delay: None,
        }
    }
}

impl MockOptions {
    pub fn with_code(code: &str, message: &str) -> Self {
        Self {
            response_code: code.to_string(),
            response_message: message.to_string(),
            ..Self::default()
        }
    }
}

/// An in-process authority endpoint bound to a loopback port.
pub struct MockAuthority {
    pub addr: SocketAddr,
    /// Connections accepted so far.
    pub connections: Arc<AtomicUsize>,
    /// Messages answered so far.
    pub served: Arc<AtomicUsize>,
    /// Every request message received, in arrival order.
    pub requests: Arc<Mutex<Vec<Message>>>,
    handle: JoinHandle<()>,
}

impl MockAuthority {
    pub async fn spawn(options: MockOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let connections = Arc::new(AtomicUsize::new(0));
        let served = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let conn_counter = connections.clone();
        let served_counter = served.clone();
        let request_log = requests.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let n = conn_counter.fetch_add(1, Ordering::SeqCst);
                if n < options.fail_first_connections {
                    drop(stream);
                    continue;
                }
                let options = options.clone();
                let served = served_counter.clone();
                let requests = request_log.clone();
                tokio::spawn(async move {
                    let _ = serve_connection(stream, options, served, requests).await;
                });
            }
        });

        Self {
            addr,
            connections,
            served,
            requests,
            handle,
        }
    }

    /// The last request received, if any.
    pub fn last_request(&self) -> Option<Message> {
        self.requests.lock().expect("request log").last().cloned()
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

impl Drop for MockAuthority {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    options: MockOptions,
    served: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Message>>>,
) -> Result<(), kedi_edi::Error> {
    let protocol = Protocol::new(options.protocol.clone())?;
    loop {
        let (request, _) = protocol.read_message(&mut stream).await?;
        debug!(message_id = %request.header.message_id, "mock authority received");
        requests.lock().expect("request log").push(request.clone());

        if let Some(delay) = options.response_delay {
            tokio::time::sleep(delay).await;
        }

        let message_type = if matches!(options.response_code.as_str(), "0000" | "00" | "0") {
            MessageType::Success
        } else {
            MessageType::Error
        };
        let mut response = Message {
            header: Header {
                message_id: request.header.message_id.clone(),
                message_type,
                sender_id: request.header.sender_id.clone(),
                insurance_type: request.header.insurance_type,
                ..Header::default()
            },
            body: Body::response(
                &options.response_code,
                &options.response_message,
                options.response_data.as_deref(),
            )?,
            response: Default::default(),
        };

        let framed = protocol.frame(&mut response)?;
        stream.write_all(&framed).await?;
        stream.flush().await?;
        served.fetch_add(1, Ordering::SeqCst);
    }
}

/// RSA key material written to a temporary directory: `(dir, private key
/// path, public key path)`. The directory guard must outlive the paths.
pub fn rsa_key_fixture() -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
    use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey};

    let key = rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 1024).expect("generate key");
    let dir = tempfile::tempdir().expect("tempdir");

    let private_path = dir.path().join("edi.key");
    let private_pem = key.to_pkcs8_pem(Default::default()).expect("encode key");
    std::fs::write(&private_path, private_pem.as_bytes()).expect("write key");

    let public_path = dir.path().join("edi.pub");
    let public_pem = rsa::RsaPublicKey::from(&key)
        .to_public_key_pem(Default::default())
        .expect("encode public key");
    std::fs::write(&public_path, public_pem).expect("write public key");

    (dir, private_path, public_path)
}
