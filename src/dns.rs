//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! DNS-over-HTTPS resolver (RFC 8484 wire format, RFC 1035 message
//! layout). Queries Cloudflare first, then Google, over a raw DNS wire
//! message POSTed to `/dns-query`; on a double failure for AAAA, retries
//! once with A. Bootstrap resolver addresses are IP literals so resolving
//! them never recurses back into DNS.

extern crate alloc;
use alloc::vec::Vec;

use core::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::http::Http;
use crate::net::socket::TcpSocket;
use crate::tls::client::TlsClient;
use crate::{bare_err, BareResult, ErrorKind};

const CLOUDFLARE_IP: Ipv4Addr = Ipv4Addr::new(1, 1, 1, 1);
const GOOGLE_IP: Ipv4Addr = Ipv4Addr::new(8, 8, 8, 8);
const CLOUDFLARE_HOST: &str = "cloudflare-dns.com";
const GOOGLE_HOST: &str = "dns.google";
const DOH_PATH: &str = "/dns-query";
const MAX_ANCOUNT: u16 = 20;
const MAX_QDCOUNT: u16 = 10;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A,
    AAAA,
}

impl RecordType {
    fn code(self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::AAAA => 28,
        }
    }
}

pub struct Dns;

impl Dns {
    /// Resolves `host` to an `IpAddr`, trying Cloudflare then Google for
    /// `record_type`; if both fail for `AAAA`, retries the whole sequence
    /// with `A`.
    pub fn resolve(host: &str, record_type: RecordType) -> BareResult<IpAddr> {
        if let Ok(addr) = Self::try_resolvers(host, record_type) {
            return Ok(addr);
        }
        if record_type == RecordType::AAAA {
            return Self::try_resolvers(host, RecordType::A);
        }
        bare_err(ErrorKind::DnsResolveFailed, "all DoH resolvers failed")
    }

    fn try_resolvers(host: &str, record_type: RecordType) -> BareResult<IpAddr> {
        if let Ok(addr) = Self::query_over(CLOUDFLARE_IP, CLOUDFLARE_HOST, host, record_type) {
            return Ok(addr);
        }
        crate::debug_log!("[dns] cloudflare-dns.com failed for {host}, trying dns.google");
        Self::query_over(GOOGLE_IP, GOOGLE_HOST, host, record_type)
    }

    fn query_over(resolver_ip: Ipv4Addr, resolver_host: &str, host: &str, record_type: RecordType) -> BareResult<IpAddr> {
        let query = build_query(host, record_type)?;

        let addr = SocketAddr::new(IpAddr::V4(resolver_ip), 443);
        let socket = TcpSocket::connect(addr).map_err(|_| {
            crate::bare_error(ErrorKind::DnsConnectFailed, "connect to DoH resolver failed")
        })?;
        let tls = TlsClient::open(socket, resolver_host).map_err(|_| {
            crate::bare_error(ErrorKind::DnsConnectFailed, "TLS handshake with DoH resolver failed")
        })?;

        let response = Http::post(tls, resolver_host, DOH_PATH, "application/dns-message", &query)
            .map_err(|_| crate::bare_error(ErrorKind::DnsSendFailed, "DoH request failed"))?;

        parse_answer(&response.body, record_type)
    }
}

/// RFC 1035 section 4.1: 12-byte header, one question, no other sections.
fn build_query(host: &str, record_type: RecordType) -> BareResult<Vec<u8>> {
    let mut msg = Vec::with_capacity(12 + host.len() + 2 + 4);

    msg.extend_from_slice(&0x24a1u16.to_be_bytes()); // Id
    msg.extend_from_slice(&0x0100u16.to_be_bytes()); // QR=0, RD=1
    msg.extend_from_slice(&1u16.to_be_bytes()); // QDCOUNT
    msg.extend_from_slice(&0u16.to_be_bytes()); // ANCOUNT
    msg.extend_from_slice(&0u16.to_be_bytes()); // NSCOUNT
    msg.extend_from_slice(&0u16.to_be_bytes()); // ARCOUNT

    for label in host.split('.') {
        if label.len() > 63 {
            return bare_err(ErrorKind::DnsQueryFailed, "DNS label longer than 63 bytes");
        }
        msg.push(label.len() as u8);
        msg.extend_from_slice(label.as_bytes());
    }
    msg.push(0); // root label

    msg.extend_from_slice(&record_type.code().to_be_bytes()); // QTYPE
    msg.extend_from_slice(&1u16.to_be_bytes()); // QCLASS = IN

    Ok(msg)
}

/// Skips a possibly-compressed DNS name starting at `pos`, returning the
/// offset just past it. Compression pointers only need to be skipped, not
/// followed, since no field here needs the decoded name.
fn skip_name(msg: &[u8], mut pos: usize) -> BareResult<usize> {
    loop {
        if pos >= msg.len() {
            return bare_err(ErrorKind::DnsParseFailed, "name runs past end of message");
        }
        let len = msg[pos];
        if len == 0 {
            return Ok(pos + 1);
        }
        if len & 0xc0 == 0xc0 {
            return Ok(pos + 2);
        }
        pos += 1 + len as usize;
    }
}

fn parse_answer(msg: &[u8], record_type: RecordType) -> BareResult<IpAddr> {
    if msg.len() < 12 {
        return bare_err(ErrorKind::DnsParseFailed, "response shorter than DNS header");
    }
    let qdcount = u16::from_be_bytes([msg[4], msg[5]]);
    let ancount = u16::from_be_bytes([msg[6], msg[7]]);
    if qdcount > MAX_QDCOUNT || ancount > MAX_ANCOUNT {
        return bare_err(ErrorKind::DnsParseFailed, "QDCOUNT/ANCOUNT outside sane bounds");
    }

    let mut pos = 12usize;
    for _ in 0..qdcount {
        pos = skip_name(msg, pos)?;
        pos += 4; // QTYPE + QCLASS
    }

    for _ in 0..ancount {
        pos = skip_name(msg, pos)?;
        if pos + 10 > msg.len() {
            return bare_err(ErrorKind::DnsParseFailed, "truncated resource record header");
        }
        let rtype = u16::from_be_bytes([msg[pos], msg[pos + 1]]);
        let rdlength = u16::from_be_bytes([msg[pos + 8], msg[pos + 9]]) as usize;
        let rdata_start = pos + 10;
        let rdata_end = rdata_start + rdlength;
        if rdata_end > msg.len() {
            return bare_err(ErrorKind::DnsParseFailed, "truncated resource record data");
        }

        if rtype == record_type.code() {
            let rdata = &msg[rdata_start..rdata_end];
            return match record_type {
                RecordType::A if rdata.len() == 4 => {
                    Ok(IpAddr::V4(Ipv4Addr::new(rdata[0], rdata[1], rdata[2], rdata[3])))
                }
                RecordType::AAAA if rdata.len() == 16 => {
                    let mut octets = [0u8; 16];
                    octets.copy_from_slice(rdata);
                    Ok(IpAddr::V6(Ipv6Addr::from(octets)))
                }
                _ => bare_err(ErrorKind::DnsParseFailed, "RDATA length mismatch for record type"),
            };
        }
        pos = rdata_end;
    }

    bare_err(ErrorKind::DnsResponseFailed, "no matching A/AAAA record in response")
}
