//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! TLS 1.3 client (RFC 8446): record layer framing, the handshake state
//! machine, and the public `Open`/`Read`/`Write`/`Close` surface. Offers
//! exactly one cipher suite (`TLS_CHACHA20_POLY1305_SHA256`) and two
//! key-share groups (secp256r1, secp384r1); the server picks one. No
//! certificate chain validation (non-goal, see DESIGN.md) — SNI is sent,
//! `Certificate`/`CertificateVerify` messages are absorbed into the
//! transcript but not checked against a trust store.

extern crate alloc;
use alloc::vec::Vec;

use crate::ecdh::CurveId;
use crate::tls::cipher::Cipher;
use crate::tls::handshake_hash::HandshakeHash;
use crate::tls::record_crypto::RecordCrypto;
use crate::{bare_err, bare_error, BareResult, ErrorKind, Read, Write};

const CONTENT_CHANGE_CIPHER_SPEC: u8 = 20;
const CONTENT_ALERT: u8 = 21;
const CONTENT_HANDSHAKE: u8 = 22;
const CONTENT_APPLICATION_DATA: u8 = 23;

const HS_CLIENT_HELLO: u8 = 1;
const HS_SERVER_HELLO: u8 = 2;
const HS_ENCRYPTED_EXTENSIONS: u8 = 8;
const HS_CERTIFICATE: u8 = 11;
const HS_CERTIFICATE_VERIFY: u8 = 15;
const HS_FINISHED: u8 = 20;

const GROUP_SECP256R1: u16 = 0x0017;
const GROUP_SECP384R1: u16 = 0x0018;
const CIPHER_SUITE_CHACHA20_POLY1305_SHA256: u16 = 0x1303;

/// Reads and writes TLS 1.3 records over a generic `Read + Write`
/// transport (normally a `TcpSocket`).
pub struct TlsClient<T: Read + Write> {
    transport: T,
    record: Option<RecordCrypto>,
    application: bool,
    /// Buffered bytes of a record already read off the wire but not yet
    /// consumed by the handshake message reader.
    pending: Vec<u8>,
}

fn record_header(content_type: u8, len: u16) -> [u8; 5] {
    let mut h = [0u8; 5];
    h[0] = content_type;
    h[1] = 0x03;
    h[2] = 0x03;
    h[3..5].copy_from_slice(&len.to_be_bytes());
    h
}

impl<T: Read + Write> TlsClient<T> {
    /// Performs the full TLS 1.3 handshake with `host` as SNI over
    /// `transport`, returning a client ready for application data.
    pub fn open(transport: T, host: &str) -> BareResult<Self> {
        let mut client = TlsClient {
            transport,
            record: None,
            application: false,
            pending: Vec::new(),
        };

        let mut cipher = Cipher::new()?;
        let mut hash = HandshakeHash::new();

        let client_hello = build_client_hello(&cipher, host)?;
        client.send_plaintext(CONTENT_HANDSHAKE, &client_hello)?;
        hash.update(&client_hello);

        let server_hello = client.read_handshake_message_plaintext(HS_SERVER_HELLO)?;
        hash.update(&server_hello);
        let (curve, peer_key) = parse_server_hello(&server_hello)?;
        crate::debug_log!("[tls] ServerHello parsed, group {}", curve as u8);

        cipher.derive_handshake_secret(curve, &peer_key)?;
        let ch_sh_hash = hash.snapshot();
        let (client_hs, server_hs) = cipher.handshake_traffic_keys(&ch_sh_hash)?;
        client.record = Some(RecordCrypto::new(client_hs.key, client_hs.iv, server_hs.key, server_hs.iv));

        loop {
            let (msg_type, body) = client.read_handshake_message_encrypted()?;
            match msg_type {
                HS_ENCRYPTED_EXTENSIONS | HS_CERTIFICATE | HS_CERTIFICATE_VERIFY => {
                    hash.update(&full_message(msg_type, &body));
                }
                HS_FINISHED => {
                    let before_sf = hash.snapshot();
                    cipher.verify_server_finished(&before_sf, &body)?;
                    hash.update(&full_message(msg_type, &body));
                    break;
                }
                _ => return bare_err(ErrorKind::TlsUnexpectedPacket, "unexpected handshake message before Finished"),
            }
        }

        let sf_hash = hash.snapshot();
        let client_finished_mac = cipher.client_finished_mac(&sf_hash)?;
        let (client_ap, server_ap) = cipher.application_traffic_keys(&sf_hash)?;

        let client_finished = full_message(HS_FINISHED, &client_finished_mac);
        client.send_plaintext(CONTENT_CHANGE_CIPHER_SPEC, &[0x01])?;
        client.send_encrypted(CONTENT_HANDSHAKE, &client_finished)?;
        hash.update(&client_finished);

        client.record = Some(RecordCrypto::new(client_ap.key, client_ap.iv, server_ap.key, server_ap.iv));
        client.application = true;
        crate::debug_log!("[tls] handshake complete for {}", host);

        Ok(client)
    }

    fn send_plaintext(&mut self, content_type: u8, body: &[u8]) -> BareResult<()> {
        let header = record_header(content_type, body.len() as u16);
        self.transport.write_all(&header)?;
        self.transport.write_all(body)?;
        Ok(())
    }

    fn send_encrypted(&mut self, content_type: u8, body: &[u8]) -> BareResult<()> {
        let mut inner = Vec::with_capacity(body.len() + 1);
        inner.extend_from_slice(body);
        inner.push(content_type);

        let record = self.record.as_mut().expect("record keys installed");
        let aad_len = (inner.len() + 16) as u16;
        let aad = record_header(CONTENT_APPLICATION_DATA, aad_len);
        let sealed = record.encode(&aad, &inner);

        self.transport.write_all(&aad)?;
        self.transport.write_all(&sealed)?;
        Ok(())
    }

    /// Reads one full record off the wire and, if keys are installed,
    /// decrypts it, returning `(inner_content_type, plaintext)`.
    fn read_record(&mut self) -> BareResult<(u8, Vec<u8>)> {
        let mut header = [0u8; 5];
        self.transport.read_exact(&mut header)?;
        let content_type = header[0];
        let len = u16::from_be_bytes([header[3], header[4]]) as usize;

        let mut payload = alloc::vec![0u8; len];
        self.transport.read_exact(&mut payload)?;

        match &mut self.record {
            None => Ok((content_type, payload)),
            Some(record) => {
                if content_type == CONTENT_CHANGE_CIPHER_SPEC {
                    return self.read_record();
                }
                if content_type != CONTENT_APPLICATION_DATA {
                    return bare_err(ErrorKind::TlsUnexpectedPacket, "expected opaque application_data record type");
                }
                let plaintext = record.decode(&header, &payload)?;
                let content_end = plaintext
                    .iter()
                    .rposition(|&b| b != 0)
                    .ok_or_else(|| bare_error(ErrorKind::TlsUnexpectedPacket, "empty inner plaintext"))?;
                let inner_type = plaintext[content_end];
                Ok((inner_type, plaintext[..content_end].to_vec()))
            }
        }
    }

    /// Reads handshake messages before any keys are installed (only
    /// `ServerHello` is ever read this way).
    fn read_handshake_message_plaintext(&mut self, expect_type: u8) -> BareResult<Vec<u8>> {
        loop {
            let (content_type, data) = self.read_record()?;
            if content_type == CONTENT_ALERT {
                return bare_err(ErrorKind::TlsAlertReceived, "received TLS alert");
            }
            if content_type != CONTENT_HANDSHAKE {
                continue;
            }
            self.pending.extend_from_slice(&data);
            if let Some(msg) = self.take_pending_message(expect_type)? {
                return Ok(msg);
            }
        }
    }

    /// Reads handshake messages once handshake traffic keys are installed
    /// (`EncryptedExtensions` through `Finished`).
    fn read_handshake_message_encrypted(&mut self) -> BareResult<(u8, Vec<u8>)> {
        loop {
            let (content_type, data) = self.read_record()?;
            if content_type == CONTENT_ALERT {
                return bare_err(ErrorKind::TlsAlertReceived, "received TLS alert");
            }
            if content_type != CONTENT_HANDSHAKE {
                continue;
            }
            self.pending.extend_from_slice(&data);
            if self.pending.len() < 4 {
                continue;
            }
            let msg_type = self.pending[0];
            let body_len = u24_from_be(&self.pending[1..4]);
            if self.pending.len() < 4 + body_len {
                continue;
            }
            let body = self.pending[4..4 + body_len].to_vec();
            self.pending.drain(..4 + body_len);
            return Ok((msg_type, body));
        }
    }

    fn take_pending_message(&mut self, expect_type: u8) -> BareResult<Option<Vec<u8>>> {
        if self.pending.len() < 4 {
            return Ok(None);
        }
        let msg_type = self.pending[0];
        let body_len = u24_from_be(&self.pending[1..4]);
        if self.pending.len() < 4 + body_len {
            return Ok(None);
        }
        if msg_type != expect_type {
            return bare_err(ErrorKind::TlsUnexpectedPacket, "unexpected handshake message type");
        }
        let full = self.pending[..4 + body_len].to_vec();
        self.pending.drain(..4 + body_len);
        Ok(Some(full))
    }

    pub fn is_valid(&self) -> bool {
        self.record.is_some()
    }

    pub fn is_secure(&self) -> bool {
        self.application
    }

    pub fn close(mut self) -> BareResult<()> {
        // `close_notify` alert, best-effort: the transport may already be
        // gone by the time a caller decides to close.
        let _ = self.send_encrypted(CONTENT_ALERT, &[0x01, 0x00]);
        Ok(())
    }
}

impl<T: Read + Write> Read for TlsClient<T> {
    fn read(&mut self, buf: &mut [u8]) -> BareResult<usize> {
        loop {
            let (content_type, data) = self.read_record()?;
            match content_type {
                CONTENT_APPLICATION_DATA => {
                    let n = core::cmp::min(buf.len(), data.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    return Ok(n);
                }
                CONTENT_ALERT => return bare_err(ErrorKind::TlsAlertReceived, "received TLS alert"),
                _ => continue,
            }
        }
    }
}

impl<T: Read + Write> Write for TlsClient<T> {
    fn write(&mut self, buf: &[u8]) -> BareResult<usize> {
        self.send_encrypted(CONTENT_APPLICATION_DATA, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> BareResult<()> {
        self.transport.flush()
    }
}

fn full_message(msg_type: u8, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + body.len());
    out.push(msg_type);
    out.extend_from_slice(&u24_to_be(body.len()));
    out.extend_from_slice(body);
    out
}

fn u24_to_be(v: usize) -> [u8; 3] {
    [((v >> 16) & 0xff) as u8, ((v >> 8) & 0xff) as u8, (v & 0xff) as u8]
}

fn u24_from_be(b: &[u8]) -> usize {
    ((b[0] as usize) << 16) | ((b[1] as usize) << 8) | (b[2] as usize)
}

/// Builds the `ClientHello` handshake message: random, the one cipher
/// suite this runtime speaks, and extensions for SNI, `supported_versions`
/// (TLS 1.3 only), `supported_groups`/`key_share` (secp256r1, secp384r1)
/// and a minimal `signature_algorithms` list (required by RFC 8446 even
/// though this client never validates a certificate).
fn build_client_hello(cipher: &Cipher, host: &str) -> BareResult<Vec<u8>> {
    let mut random = [0u8; 32];
    if !crate::entropy::Entropy::get_array(&mut random) {
        return bare_err(ErrorKind::EccInitFailed, "entropy source failed for client random");
    }

    let mut p256_key = [0u8; 65];
    let mut p384_key = [0u8; 97];
    cipher.public_key(CurveId::P256, &mut p256_key)?;
    cipher.public_key(CurveId::P384, &mut p384_key)?;

    let mut body = Vec::new();
    body.extend_from_slice(&[0x03, 0x03]); // legacy_version: TLS 1.2
    body.extend_from_slice(&random);
    body.push(0); // legacy_session_id
    body.extend_from_slice(&2u16.to_be_bytes()); // cipher_suites length
    body.extend_from_slice(&CIPHER_SUITE_CHACHA20_POLY1305_SHA256.to_be_bytes());
    body.push(1); // legacy_compression_methods length
    body.push(0); // null compression

    let mut extensions = Vec::new();

    // server_name
    let mut sni = Vec::new();
    sni.push(0); // name_type: host_name
    sni.extend_from_slice(&(host.len() as u16).to_be_bytes());
    sni.extend_from_slice(host.as_bytes());
    push_extension(&mut extensions, 0x0000, &{
        let mut list = Vec::new();
        list.extend_from_slice(&(sni.len() as u16).to_be_bytes());
        list.extend_from_slice(&sni);
        list
    });

    // supported_groups
    push_extension(&mut extensions, 0x000a, &{
        let mut v = Vec::new();
        v.extend_from_slice(&4u16.to_be_bytes());
        v.extend_from_slice(&GROUP_SECP256R1.to_be_bytes());
        v.extend_from_slice(&GROUP_SECP384R1.to_be_bytes());
        v
    });

    // signature_algorithms: ecdsa_secp256r1_sha256, ecdsa_secp384r1_sha384
    push_extension(&mut extensions, 0x000d, &{
        let mut v = Vec::new();
        v.extend_from_slice(&4u16.to_be_bytes());
        v.extend_from_slice(&0x0403u16.to_be_bytes());
        v.extend_from_slice(&0x0503u16.to_be_bytes());
        v
    });

    // supported_versions: TLS 1.3 only
    push_extension(&mut extensions, 0x002b, &[0x02, 0x03, 0x04]);

    // key_share
    push_extension(&mut extensions, 0x0033, &{
        let mut entries = Vec::new();
        entries.extend_from_slice(&GROUP_SECP256R1.to_be_bytes());
        entries.extend_from_slice(&(p256_key.len() as u16).to_be_bytes());
        entries.extend_from_slice(&p256_key);
        entries.extend_from_slice(&GROUP_SECP384R1.to_be_bytes());
        entries.extend_from_slice(&(p384_key.len() as u16).to_be_bytes());
        entries.extend_from_slice(&p384_key);

        let mut v = Vec::new();
        v.extend_from_slice(&(entries.len() as u16).to_be_bytes());
        v.extend_from_slice(&entries);
        v
    });

    body.extend_from_slice(&(extensions.len() as u16).to_be_bytes());
    body.extend_from_slice(&extensions);

    Ok(full_message(HS_CLIENT_HELLO, &body))
}

fn push_extension(out: &mut Vec<u8>, ext_type: u16, data: &[u8]) {
    out.extend_from_slice(&ext_type.to_be_bytes());
    out.extend_from_slice(&(data.len() as u16).to_be_bytes());
    out.extend_from_slice(data);
}

/// Parses a `ServerHello` handshake message (the full `HandshakeType ||
/// length || body`), returning the negotiated curve and the server's
/// `key_share` public key.
fn parse_server_hello(msg: &[u8]) -> BareResult<(CurveId, Vec<u8>)> {
    if msg.len() < 4 || msg[0] != HS_SERVER_HELLO {
        return bare_err(ErrorKind::TlsUnexpectedPacket, "not a ServerHello");
    }
    let mut pos = 4usize;
    pos += 2; // legacy_version
    pos += 32; // random
    if pos >= msg.len() {
        return bare_err(ErrorKind::TlsUnexpectedPacket, "truncated ServerHello");
    }
    let session_id_len = msg[pos] as usize;
    pos += 1 + session_id_len;

    if pos + 2 > msg.len() {
        return bare_err(ErrorKind::TlsUnexpectedPacket, "truncated ServerHello cipher suite");
    }
    let cipher_suite = u16::from_be_bytes([msg[pos], msg[pos + 1]]);
    if cipher_suite != CIPHER_SUITE_CHACHA20_POLY1305_SHA256 {
        return bare_err(ErrorKind::TlsBadCipherSuite, "server selected an unsupported cipher suite");
    }
    pos += 2;
    pos += 1; // legacy_compression_method

    if pos + 2 > msg.len() {
        return bare_err(ErrorKind::TlsUnexpectedPacket, "truncated ServerHello extensions length");
    }
    let ext_len = u16::from_be_bytes([msg[pos], msg[pos + 1]]) as usize;
    pos += 2;
    let ext_end = pos + ext_len;
    if ext_end > msg.len() {
        return bare_err(ErrorKind::TlsUnexpectedPacket, "truncated ServerHello extensions");
    }

    while pos + 4 <= ext_end {
        let ext_type = u16::from_be_bytes([msg[pos], msg[pos + 1]]);
        let ext_data_len = u16::from_be_bytes([msg[pos + 2], msg[pos + 3]]) as usize;
        let data_start = pos + 4;
        let data_end = data_start + ext_data_len;
        if data_end > ext_end {
            return bare_err(ErrorKind::TlsUnexpectedPacket, "truncated ServerHello extension");
        }
        if ext_type == 0x0033 {
            let data = &msg[data_start..data_end];
            if data.len() < 4 {
                return bare_err(ErrorKind::TlsUnexpectedPacket, "truncated key_share extension");
            }
            let group = u16::from_be_bytes([data[0], data[1]]);
            let key_len = u16::from_be_bytes([data[2], data[3]]) as usize;
            let key = data[4..4 + key_len].to_vec();
            let curve = match group {
                GROUP_SECP256R1 => CurveId::P256,
                GROUP_SECP384R1 => CurveId::P384,
                _ => return bare_err(ErrorKind::TlsUnexpectedPacket, "unsupported key_share group"),
            };
            return Ok((curve, key));
        }
        pos = data_end;
    }

    bare_err(ErrorKind::TlsUnexpectedPacket, "ServerHello missing key_share extension")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u24_roundtrip() {
        assert_eq!(u24_from_be(&u24_to_be(0)), 0);
        assert_eq!(u24_from_be(&u24_to_be(1)), 1);
        assert_eq!(u24_from_be(&u24_to_be(0xabcdef)), 0xabcdef);
    }

    #[test]
    fn client_hello_starts_with_handshake_type_and_length() {
        let cipher = Cipher::new().unwrap();
        let hello = build_client_hello(&cipher, "example.com").unwrap();
        assert_eq!(hello[0], HS_CLIENT_HELLO);
        let len = u24_from_be(&hello[1..4]);
        assert_eq!(hello.len(), 4 + len);
    }

    #[test]
    fn parse_server_hello_extracts_key_share() {
        let server_cipher = Cipher::new().unwrap();
        let mut server_pub = [0u8; 65];
        server_cipher.public_key(CurveId::P256, &mut server_pub).unwrap();

        let mut body = Vec::new();
        body.extend_from_slice(&[0x03, 0x03]);
        body.extend_from_slice(&[0x11; 32]);
        body.push(0);
        body.extend_from_slice(&CIPHER_SUITE_CHACHA20_POLY1305_SHA256.to_be_bytes());
        body.push(0);

        let mut extensions = Vec::new();
        push_extension(&mut extensions, 0x0033, &{
            let mut v = Vec::new();
            v.extend_from_slice(&GROUP_SECP256R1.to_be_bytes());
            v.extend_from_slice(&(server_pub.len() as u16).to_be_bytes());
            v.extend_from_slice(&server_pub);
            v
        });
        body.extend_from_slice(&(extensions.len() as u16).to_be_bytes());
        body.extend_from_slice(&extensions);

        let msg = full_message(HS_SERVER_HELLO, &body);
        let (curve, key) = parse_server_hello(&msg).unwrap();
        assert!(matches!(curve, CurveId::P256));
        assert_eq!(key, server_pub.to_vec());
    }
}
