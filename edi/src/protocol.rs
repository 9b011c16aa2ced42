// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Framing engine: encrypt-then-sign composition, streaming reads and the
//! per-session protocol state machine.
//!
//! Frame layout: `header(100) || u32 BE payload_len || payload`. When
//! signing is on, the pre-encryption payload is
//! `u32 BE body_len || body || u32 BE sig_len || sig`; when encryption is
//! on, the payload is PKCS#7 padded and ARIA-CBC encrypted. A signature
//! mismatch on parse is reported through the returned flag, never by
//! discarding the body.

use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, warn};

use kedi_crypto::{generate_iv, AriaCbc, EdiSigner, Pkcs7, BLOCK_SIZE};

use crate::errors::Error;
use crate::message::{Message, DEFAULT_MAX_BODY, HEADER_SIZE, LENGTH_PREFIX_SIZE};

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolState {
    Disconnected,
    Connecting,
    Connected,
    Authenticating,
    Authenticated,
    Transmitting,
    Error,
}

/// Protocol-level configuration for one session.
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    pub encryption_enabled: bool,
    pub encryption_key: Option<Vec<u8>>,
    /// Fixed IV; a random one is drawn when encryption is on and this is
    /// unset.
    pub encryption_iv: Option<Vec<u8>>,
    pub signing_enabled: bool,
    pub private_key_path: Option<PathBuf>,
    pub certificate_path: Option<PathBuf>,
    /// Bare verification key for peers that publish one without a
    /// certificate.
    pub public_key_path: Option<PathBuf>,
    pub timeout: Duration,
    pub max_body: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            encryption_enabled: true,
            encryption_key: None,
            encryption_iv: None,
            signing_enabled: true,
            private_key_path: None,
            certificate_path: None,
            public_key_path: None,
            timeout: Duration::from_secs(30),
            max_body: DEFAULT_MAX_BODY,
        }
    }
}

impl ProtocolConfig {
    /// Plaintext, unsigned configuration for development endpoints.
    pub fn plaintext() -> Self {
        Self {
            encryption_enabled: false,
            signing_enabled: false,
            ..Self::default()
        }
    }
}

/// Framing engine and state machine for one session.
pub struct Protocol {
    config: ProtocolConfig,
    state: ProtocolState,
    cipher: Option<AriaCbc>,
    signer: Option<EdiSigner>,
    padding: Pkcs7,
}

impl Protocol {
    pub fn new(config: ProtocolConfig) -> Result<Self, Error> {
        let cipher = match (config.encryption_enabled, &config.encryption_key) {
            (true, Some(key)) => {
                let iv = match &config.encryption_iv {
                    Some(iv) => iv.clone(),
                    None => generate_iv(BLOCK_SIZE),
                };
                let cipher = AriaCbc::with_iv(key, &iv)?;
                debug!("ARIA cipher initialized");
                Some(cipher)
            }
            _ => None,
        };

        let signer = if config.signing_enabled {
            let mut signer = EdiSigner::from_files(
                config.private_key_path.as_deref(),
                config.certificate_path.as_deref(),
                None,
            )?;
            if let Some(path) = &config.public_key_path {
                signer.load_public_key_file(path)?;
            }
            debug!(
                has_key = signer.has_signing_key(),
                has_certificate = signer.has_certificate(),
                "signer initialized"
            );
            Some(signer)
        } else {
            None
        };

        let padding = Pkcs7::new(BLOCK_SIZE)?;
        Ok(Self {
            config,
            state: ProtocolState::Disconnected,
            cipher,
            signer,
            padding,
        })
    }

    pub fn state(&self) -> ProtocolState {
        self.state
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// State transitions are driven by the session client on connect and
    /// send/receive boundaries.
    pub fn set_state(&mut self, state: ProtocolState) {
        self.state = state;
    }

    /// Enter `Transmitting`. A session carries at most one outstanding
    /// exchange; a second concurrent frame/parse pair is refused.
    pub fn begin_exchange(&mut self) -> Result<(), Error> {
        if self.state == ProtocolState::Transmitting {
            return Err(Error::Protocol(
                "session already has an exchange in flight".into(),
            ));
        }
        self.state = ProtocolState::Transmitting;
        Ok(())
    }

    /// Frame a message for transmission, setting its security flags.
    pub fn frame(&self, message: &mut Message) -> Result<Vec<u8>, Error> {
        let body = message.body.to_bytes()?;
        if body.len() > self.config.max_body {
            return Err(Error::OversizeBody {
                len: body.len(),
                max: self.config.max_body,
            });
        }
        debug!(size = body.len(), "body serialized");

        // Sign the plaintext body. A configured signer without key material
        // degrades to unsigned frames, matching pre-accreditation setups.
        let signature = match &self.signer {
            Some(signer) if signer.has_signing_key() => match signer.sign_raw(&body) {
                Ok(sig) => sig,
                Err(e) => {
                    warn!(error = %e, "signing failed; sending unsigned");
                    Vec::new()
                }
            },
            _ => Vec::new(),
        };

        let mut payload = if signature.is_empty() {
            body
        } else {
            let mut framed =
                Vec::with_capacity(2 * LENGTH_PREFIX_SIZE + body.len() + signature.len());
            framed.extend_from_slice(&(body.len() as u32).to_be_bytes());
            framed.extend_from_slice(&body);
            framed.extend_from_slice(&(signature.len() as u32).to_be_bytes());
            framed.extend_from_slice(&signature);
            framed
        };

        if let Some(cipher) = &self.cipher {
            let padded = self.padding.pad(&payload);
            payload = cipher.encrypt(&padded)?;
            debug!(encrypted_size = payload.len(), "payload encrypted");
        }

        message.header.encrypted = self.cipher.is_some();
        message.header.signed = !signature.is_empty();

        let mut out = Vec::with_capacity(HEADER_SIZE + LENGTH_PREFIX_SIZE + payload.len());
        out.extend_from_slice(&message.header.encode()?);
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    /// Parse a received frame. Returns the message and whether its
    /// signature verified; an unverifiable signature surfaces the body
    /// with `false` rather than failing.
    pub fn parse(&self, data: &[u8]) -> Result<(Message, bool), Error> {
        if data.len() < HEADER_SIZE + LENGTH_PREFIX_SIZE {
            return Err(Error::ShortMessage { len: data.len() });
        }
        let header = crate::message::Header::decode(&data[..HEADER_SIZE])?;

        let len_bytes: [u8; LENGTH_PREFIX_SIZE] = data
            [HEADER_SIZE..HEADER_SIZE + LENGTH_PREFIX_SIZE]
            .try_into()
            .expect("fixed prefix width");
        let payload_len = u32::from_be_bytes(len_bytes) as usize;
        if payload_len > self.config.max_body {
            return Err(Error::OversizeBody {
                len: payload_len,
                max: self.config.max_body,
            });
        }
        let payload_start = HEADER_SIZE + LENGTH_PREFIX_SIZE;
        if data.len() < payload_start + payload_len {
            return Err(Error::ShortMessage { len: data.len() });
        }
        let mut payload = data[payload_start..payload_start + payload_len].to_vec();

        if header.encrypted {
            if let Some(cipher) = &self.cipher {
                let decrypted = cipher.decrypt(&payload)?;
                payload = self.padding.unpad(&decrypted)?;
                debug!(size = payload.len(), "payload decrypted");
            }
        }

        let mut signature_valid = true;
        let body_bytes = if header.signed {
            let (body, signature) = split_signed_payload(&payload)?;
            signature_valid = self
                .signer
                .as_ref()
                .map(|s| s.verify_raw(&body, &signature))
                .unwrap_or(false);
            debug!(valid = signature_valid, "signature verified");
            body
        } else {
            payload
        };

        let body = crate::message::Body::from_bytes(&body_bytes);
        let response = crate::message::ResponseFields::from_body(&body);
        Ok((
            Message {
                header,
                body,
                response,
            },
            signature_valid,
        ))
    }

    /// Read one message from a stream: exactly the header, then the length
    /// prefix, then the declared payload, each under the configured
    /// per-operation timeout.
    pub async fn read_message<R>(&self, reader: &mut R) -> Result<(Message, bool), Error>
    where
        R: AsyncRead + Unpin,
    {
        let mut header = [0u8; HEADER_SIZE];
        self.timed_read(reader, &mut header).await?;

        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        self.timed_read(reader, &mut prefix).await?;
        let payload_len = u32::from_be_bytes(prefix) as usize;
        if payload_len > self.config.max_body {
            return Err(Error::OversizeBody {
                len: payload_len,
                max: self.config.max_body,
            });
        }

        let mut payload = vec![0u8; payload_len];
        self.timed_read(reader, &mut payload).await?;

        let mut frame = Vec::with_capacity(HEADER_SIZE + LENGTH_PREFIX_SIZE + payload_len);
        frame.extend_from_slice(&header);
        frame.extend_from_slice(&prefix);
        frame.extend_from_slice(&payload);
        self.parse(&frame)
    }

    /// Frame and write one message under the configured timeout.
    pub async fn write_message<W>(&self, writer: &mut W, message: &mut Message) -> Result<(), Error>
    where
        W: AsyncWrite + Unpin,
    {
        let framed = self.frame(message)?;
        timeout(self.config.timeout, async {
            writer.write_all(&framed).await?;
            writer.flush().await
        })
        .await
        .map_err(|_| Error::Timeout(self.config.timeout))??;
        debug!(size = framed.len(), "message written");
        Ok(())
    }

    async fn timed_read<R>(&self, reader: &mut R, buf: &mut [u8]) -> Result<(), Error>
    where
        R: AsyncRead + Unpin,
    {
        timeout(self.config.timeout, reader.read_exact(buf))
            .await
            .map_err(|_| Error::Timeout(self.config.timeout))??;
        Ok(())
    }
}

/// Split `u32 body_len || body || u32 sig_len || sig`.
fn split_signed_payload(payload: &[u8]) -> Result<(Vec<u8>, Vec<u8>), Error> {
    let too_short = || Error::Protocol("signed payload shorter than its length prefixes".into());
    if payload.len() < LENGTH_PREFIX_SIZE {
        return Err(too_short());
    }
    let body_len = u32::from_be_bytes(payload[..4].try_into().expect("4 bytes")) as usize;
    let sig_len_start = LENGTH_PREFIX_SIZE + body_len;
    if payload.len() < sig_len_start + LENGTH_PREFIX_SIZE {
        return Err(too_short());
    }
    let body = payload[LENGTH_PREFIX_SIZE..sig_len_start].to_vec();
    let sig_len = u32::from_be_bytes(
        payload[sig_len_start..sig_len_start + LENGTH_PREFIX_SIZE]
            .try_into()
            .expect("4 bytes"),
    ) as usize;
    let sig_start = sig_len_start + LENGTH_PREFIX_SIZE;
    if payload.len() < sig_start + sig_len {
        return Err(too_short());
    }
    Ok((body, payload[sig_start..sig_start + sig_len].to_vec()))
}
