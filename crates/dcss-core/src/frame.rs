//! Frame and direction types for the control-bus line protocol.
//!
//! The bus speaks a space-delimited text protocol, one frame per line.
//! Every frame begins with a message name of the form `<direction>_<verb>`,
//! where the direction prefix encodes which logical path the frame travels
//! (see [`Direction`]). A [`Frame`] is the decoded form of one such line:
//! the message name plus its argument text.
//!
//! Frames are transient -- they are dropped after the call that observes
//! them, except where a component folds fields into longer-lived state.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Logical path a frame travels between the bus and its peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// GUI peer to bus.
    Gtos,
    /// Bus to GUI peer.
    Stog,
    /// Bus to hardware peer.
    Stoh,
    /// Hardware peer to bus.
    Htos,
    /// Bus connection control (pre-login prompts).
    Stoc,
}

impl Direction {
    /// The wire spelling of this direction prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Gtos => "gtos",
            Direction::Stog => "stog",
            Direction::Stoh => "stoh",
            Direction::Htos => "htos",
            Direction::Stoc => "stoc",
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "gtos" => Ok(Direction::Gtos),
            "stog" => Ok(Direction::Stog),
            "stoh" => Ok(Direction::Stoh),
            "htos" => Ok(Direction::Htos),
            "stoc" => Ok(Direction::Stoc),
            other => Err(Error::Parse(format!("unknown direction prefix: {other}"))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which outgoing framing a line is written with.
///
/// The bus historically uses two distinct byte layouts for outgoing lines:
/// login/handshake frames use one, command and string-set frames use the
/// other. The layouts themselves are a transport concern; this enum only
/// selects which one a call site wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameVariant {
    /// Handshake framing, used for the login identity frame.
    Handshake,
    /// Command framing, used for operations, string sets, and reports.
    Command,
}

/// One decoded protocol line.
///
/// Stores the line verbatim (trimmed of surrounding whitespace) so that
/// callers waiting on a completion frame receive exactly the text the bus
/// sent, and exposes the `(message_name, argument_text)` split on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    raw: String,
}

impl Frame {
    /// Decode one line into a frame. Surrounding whitespace and line
    /// terminators are stripped.
    pub fn new(line: impl Into<String>) -> Self {
        let line = line.into();
        Frame {
            raw: line.trim().to_string(),
        }
    }

    /// The message name: the first token of the line.
    pub fn name(&self) -> &str {
        self.raw.split_whitespace().next().unwrap_or("")
    }

    /// The argument text: everything after the message name.
    pub fn args(&self) -> &str {
        match self.raw.find(char::is_whitespace) {
            Some(at) => self.raw[at..].trim_start(),
            None => "",
        }
    }

    /// The full line as received.
    pub fn text(&self) -> &str {
        &self.raw
    }

    /// Consume the frame, yielding the full line.
    pub fn into_text(self) -> String {
        self.raw
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
