//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King

extern crate alloc;
use alloc::boxed::Box;
use alloc::string::String;

/// Full error taxonomy for the runtime (transport, crypto, TLS, DNS, HTTP, WebSocket).
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // Transport failures
    SocketCreate = 1,
    SocketBind,
    SocketConnect,
    SocketRead,
    SocketWrite,
    SocketTimeout,

    // Cryptographic failures
    EccInitFailed,
    EccExportKeyFailed,
    EccSharedSecretFailed,
    ChaCha20DecodeFailed,

    // TLS protocol failures
    TlsUnexpectedPacket,
    TlsBadCipherSuite,
    TlsVerifyFinished,
    TlsAlertReceived,
    TlsUnsupportedVersion,

    // DNS failures
    DnsConnectFailed,
    DnsSendFailed,
    DnsResponseFailed,
    DnsParseFailed,
    DnsQueryFailed,
    DnsResolveFailed,

    // HTTP failures
    HttpBadStatus,
    HttpBadHeader,
    HttpParseUrlFailed,

    // WebSocket failures
    WsNotConnected,
    WsCreateFailed,
    WsTransportFailed,
    WsHandshakeFailed,
    WsWriteFailed,
    WsReceiveFailed,
    WsInvalidFrame,
    WsFrameTooLarge,
    WsAllocFailed,
    WsConnectionClosed,
    WsDnsFailed,

    // Generic I/O
    UnexpectedEof,
    FormatError,
    Other,
}

impl ErrorKind {
    pub fn as_string(&self) -> &'static str {
        match self {
            ErrorKind::SocketCreate => "SocketCreate",
            ErrorKind::SocketBind => "SocketBind",
            ErrorKind::SocketConnect => "SocketConnect",
            ErrorKind::SocketRead => "SocketRead",
            ErrorKind::SocketWrite => "SocketWrite",
            ErrorKind::SocketTimeout => "SocketTimeout",
            ErrorKind::EccInitFailed => "EccInitFailed",
            ErrorKind::EccExportKeyFailed => "EccExportKeyFailed",
            ErrorKind::EccSharedSecretFailed => "EccSharedSecretFailed",
            ErrorKind::ChaCha20DecodeFailed => "ChaCha20DecodeFailed",
            ErrorKind::TlsUnexpectedPacket => "TlsUnexpectedPacket",
            ErrorKind::TlsBadCipherSuite => "TlsBadCipherSuite",
            ErrorKind::TlsVerifyFinished => "TlsVerifyFinished",
            ErrorKind::TlsAlertReceived => "TlsAlertReceived",
            ErrorKind::TlsUnsupportedVersion => "TlsUnsupportedVersion",
            ErrorKind::DnsConnectFailed => "DnsConnectFailed",
            ErrorKind::DnsSendFailed => "DnsSendFailed",
            ErrorKind::DnsResponseFailed => "DnsResponseFailed",
            ErrorKind::DnsParseFailed => "DnsParseFailed",
            ErrorKind::DnsQueryFailed => "DnsQueryFailed",
            ErrorKind::DnsResolveFailed => "DnsResolveFailed",
            ErrorKind::HttpBadStatus => "HttpBadStatus",
            ErrorKind::HttpBadHeader => "HttpBadHeader",
            ErrorKind::HttpParseUrlFailed => "HttpParseUrlFailed",
            ErrorKind::WsNotConnected => "WsNotConnected",
            ErrorKind::WsCreateFailed => "WsCreateFailed",
            ErrorKind::WsTransportFailed => "WsTransportFailed",
            ErrorKind::WsHandshakeFailed => "WsHandshakeFailed",
            ErrorKind::WsWriteFailed => "WsWriteFailed",
            ErrorKind::WsReceiveFailed => "WsReceiveFailed",
            ErrorKind::WsInvalidFrame => "WsInvalidFrame",
            ErrorKind::WsFrameTooLarge => "WsFrameTooLarge",
            ErrorKind::WsAllocFailed => "WsAllocFailed",
            ErrorKind::WsConnectionClosed => "WsConnectionClosed",
            ErrorKind::WsDnsFailed => "WsDnsFailed",
            ErrorKind::UnexpectedEof => "UnexpectedEof",
            ErrorKind::FormatError => "FormatError",
            ErrorKind::Other => "Other",
        }
    }

    /// Transient errors may succeed on retry; everything else is fatal for
    /// the affected session (spec section on user-visible behavior).
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::DnsResolveFailed | ErrorKind::SocketTimeout)
    }
}

pub type BareResult<T> = Result<T, BareError>;

/// A tagged error with context and an optional cause chain.
pub struct BareError {
    pub kind: ErrorKind,
    pub context: &'static str,
    pub cause: Option<Box<BareError>>,
}

pub fn bare_error(kind: ErrorKind, context: &'static str) -> BareError {
    BareError {
        kind,
        context,
        cause: None,
    }
}

pub fn bare_err<T>(kind: ErrorKind, context: &'static str) -> BareResult<T> {
    Err(bare_error(kind, context))
}

impl BareError {
    pub fn wrap(kind: ErrorKind, context: &'static str, cause: BareError) -> BareError {
        BareError {
            kind,
            context,
            cause: Some(Box::new(cause)),
        }
    }

    pub fn as_string(&self) -> String {
        let mut out = String::with_capacity(64);
        out.push_str(self.kind.as_string());
        out.push_str(": ");
        out.push_str(self.context);
        let mut next = self.cause.as_deref();
        while let Some(c) = next {
            out.push_str(" <- ");
            out.push_str(c.kind.as_string());
            out.push_str(": ");
            out.push_str(c.context);
            next = c.cause.as_deref();
        }
        out
    }

    #[cfg(debug_assertions)]
    pub fn debug_print(&self) {
        use crate::{common::utils::zclean, libc};
        use alloc::ffi::CString;
        let mut s = self.as_string();
        let c_s = CString::new(zclean(&mut s)).unwrap();
        unsafe {
            libc::write(2, c_s.as_ptr().cast(), c_s.count_bytes());
        }
    }

    #[cfg(not(debug_assertions))]
    pub fn debug_print(&self) {}
}

pub trait Context<T, E> {
    /// Wrap the error value with additional context.
    fn context(self, context: &'static str) -> Result<T, BareError>;
}

impl<T, E> Context<T, E> for Result<T, E>
where
    E: Into<BareError>,
{
    fn context(self, context: &'static str) -> BareResult<T> {
        match self {
            Ok(ok) => Ok(ok),
            Err(error) => {
                let mut err: BareError = error.into();
                err.context = context;
                Err(err)
            }
        }
    }
}
