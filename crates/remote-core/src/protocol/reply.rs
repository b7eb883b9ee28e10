//! Host→client replies.
//!
//! The host answers with bare literals.  Only `AUTHORIZED` and `FORBIDDEN`
//! carry meaning for the client's authorization state; `Bad token` and
//! `Bad request` are sent just before the host drops a connection and are
//! surfaced to the user only through the log.

use std::fmt;

/// One host→client text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerReply {
    /// The session may now drive the host's input.
    Authorized,
    /// The command was refused because the session is not authorized.
    Forbidden,
    /// The `API_KEY` credential was wrong; the host closes the connection.
    BadToken,
    /// A frame could not be processed; the host closes the connection.
    BadRequest,
    /// Any other text.  Not part of the reply vocabulary.
    Other(String),
}

impl ServerReply {
    pub const AUTHORIZED: &'static str = "AUTHORIZED";
    pub const FORBIDDEN: &'static str = "FORBIDDEN";
    pub const BAD_TOKEN: &'static str = "Bad token";
    pub const BAD_REQUEST: &'static str = "Bad request";

    /// Classifies a received message.  Matching is exact: no trimming, no
    /// case folding.
    pub fn from_text(text: &str) -> Self {
        match text {
            Self::AUTHORIZED => ServerReply::Authorized,
            Self::FORBIDDEN => ServerReply::Forbidden,
            Self::BAD_TOKEN => ServerReply::BadToken,
            Self::BAD_REQUEST => ServerReply::BadRequest,
            other => ServerReply::Other(other.to_string()),
        }
    }

    /// Returns the literal sent on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            ServerReply::Authorized => Self::AUTHORIZED,
            ServerReply::Forbidden => Self::FORBIDDEN,
            ServerReply::BadToken => Self::BAD_TOKEN,
            ServerReply::BadRequest => Self::BAD_REQUEST,
            ServerReply::Other(text) => text,
        }
    }
}

impl fmt::Display for ServerReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
