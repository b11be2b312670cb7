//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! TCP socket wrapping the raw syscalls in `libc`. Generalized from the
//! IPv4-only original to IPv4/IPv6 via `core::net::SocketAddr`, and given
//! the runtime's connect/receive/send timeouts via `poll(2)` rather than
//! `SO_RCVTIMEO`/`SO_SNDTIMEO`, since those socket-option constants aren't
//! part of the raw syscall surface in `libc.rs`.

use core::ffi::c_void;
use core::mem::size_of;
use core::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::{bare_err, BareResult, ErrorKind, Read, Write};
use crate::libc;

/// Connect timeout (spec: 5s).
pub const CONNECT_TIMEOUT_MS: i32 = 5_000;
/// Read timeout (spec: 5 minutes).
pub const RECEIVE_TIMEOUT_MS: i32 = 5 * 60 * 1_000;
/// Write timeout (spec: 1 minute).
pub const SEND_TIMEOUT_MS: i32 = 60 * 1_000;

pub struct TcpSocket {
    fd: i32,
}

impl TcpSocket {
    /// Opens a TCP connection to `addr`, failing with `SocketTimeout` if the
    /// three-way handshake doesn't complete within `CONNECT_TIMEOUT_MS`.
    pub fn connect(addr: SocketAddr) -> BareResult<Self> {
        let domain = if addr.is_ipv4() { libc::AF_INET } else { libc::AF_INET6 };
        let fd = unsafe { libc::socket(domain, libc::SOCK_STREAM | libc::SOCK_CLOEXEC, 0) };
        if fd < 0 {
            return bare_err(ErrorKind::SocketCreate, "libc::socket failed");
        }
        set_tcp_fastopen(fd);

        let res = match addr {
            SocketAddr::V4(a) => {
                let c_addr = sockaddr_in_from(&a.ip(), a.port());
                unsafe {
                    libc::connect(fd, &c_addr as *const _ as *const libc::sockaddr, size_of::<libc::sockaddr_in>() as libc::socklen_t)
                }
            }
            SocketAddr::V6(a) => {
                let c_addr = sockaddr_in6_from(&a.ip(), a.port());
                unsafe {
                    libc::connect(fd, &c_addr as *const _ as *const libc::sockaddr, size_of::<libc::sockaddr_in6>() as libc::socklen_t)
                }
            }
        };
        if res == -1 {
            unsafe { libc::close(fd) };
            return bare_err(ErrorKind::SocketConnect, "connect failed");
        }

        let sock = TcpSocket { fd };
        sock.poll_ready(libc::POLLOUT, CONNECT_TIMEOUT_MS)?;
        Ok(sock)
    }

    fn poll_ready(&self, events: i16, timeout_ms: i32) -> BareResult<()> {
        let mut pfd = libc::pollfd {
            fd: self.fd,
            events,
            revents: 0,
        };
        let n = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        if n == 0 {
            return bare_err(ErrorKind::SocketTimeout, "poll timed out");
        }
        if n < 0 {
            return bare_err(ErrorKind::SocketRead, "poll failed");
        }
        Ok(())
    }
}

impl Drop for TcpSocket {
    fn drop(&mut self) {
        unsafe {
            libc::shutdown(self.fd, libc::SHUT_RDWR);
            libc::close(self.fd);
        }
    }
}

impl Read for TcpSocket {
    fn read(&mut self, buf: &mut [u8]) -> BareResult<usize> {
        self.poll_ready(libc::POLLIN, RECEIVE_TIMEOUT_MS)?;
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr() as *mut c_void, buf.len()) };
        if n < 0 {
            bare_err(ErrorKind::SocketRead, "syscall read error")
        } else {
            Ok(n as usize)
        }
    }
}

impl Write for TcpSocket {
    fn write(&mut self, buf: &[u8]) -> BareResult<usize> {
        self.poll_ready(libc::POLLOUT, SEND_TIMEOUT_MS)?;
        let n = unsafe { libc::write(self.fd, buf.as_ptr() as *const c_void, buf.len()) };
        if n < 0 {
            bare_err(ErrorKind::SocketWrite, "syscall write error")
        } else {
            Ok(n as usize)
        }
    }

    fn flush(&mut self) -> BareResult<()> {
        Ok(())
    }
}

fn set_tcp_fastopen(fd: i32) {
    let optval: core::ffi::c_int = 1;
    unsafe {
        libc::setsockopt(
            fd,
            libc::IPPROTO_TCP,
            libc::TCP_FASTOPEN,
            &optval as *const _ as *const c_void,
            size_of::<i32>() as u32,
        );
    }
}

fn sockaddr_in_from(ip: &Ipv4Addr, port: u16) -> libc::sockaddr_in {
    libc::sockaddr_in {
        sin_family: libc::AF_INET as libc::sa_family_t,
        sin_port: port.to_be(),
        sin_addr: libc::in_addr { s_addr: u32::from_ne_bytes(ip.octets()) },
        sin_zero: [0u8; 8],
    }
}

fn sockaddr_in6_from(ip: &Ipv6Addr, port: u16) -> libc::sockaddr_in6 {
    libc::sockaddr_in6 {
        sin6_family: libc::AF_INET6 as libc::sa_family_t,
        sin6_port: port.to_be(),
        sin6_flowinfo: 0,
        sin6_addr: libc::in6_addr { s6_addr: ip.octets() },
        sin6_scope_id: 0,
    }
}

/// Builds a `SocketAddr` from a resolved `IpAddr` and port, the shape every
/// caller (`TlsClient::open`, `Dns::resolve`'s bootstrap addresses) needs.
pub fn socket_addr(ip: IpAddr, port: u16) -> SocketAddr {
    SocketAddr::new(ip, port)
}
