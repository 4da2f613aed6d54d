//! Application boundary of the link dispatcher.
//!
//! A handler receives the text of each I frame on an established link and
//! answers with optional output and a disconnect request. Handlers never see
//! the connection table.

/// Answer of a [`SessionHandler`] to one line of input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReply {
    /// Close the link after this line
    pub disconnect: bool,

    /// Text to send back; empty for none
    pub response: String,
}

impl SessionReply {
    /// Reply with text and keep the link up
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            disconnect: false,
            response: response.into(),
        }
    }

    /// Ask the dispatcher to disconnect
    pub fn disconnect() -> Self {
        Self {
            disconnect: true,
            response: String::new(),
        }
    }
}

/// Callback invoked for every I frame of an established link
#[cfg_attr(test, mockall::automock)]
pub trait SessionHandler: Send {
    /// Handle one line of input
    ///
    /// # Arguments
    ///
    /// * `callsign` - Remote callsign (without SSID)
    /// * `text` - Info field with CR/LF removed, one char per octet
    ///
    /// The response is sent back with the same mapping: each char becomes
    /// one octet, and chars above U+00FF are sent as `?`.
    ///
    /// # Errors
    ///
    /// An error drops the datagram without reply; the link stays up.
    fn handle(&mut self, callsign: &str, text: &str) -> anyhow::Result<SessionReply>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_constructors() {
        assert_eq!(
            SessionReply::text("ok\r"),
            SessionReply { disconnect: false, response: "ok\r".to_string() }
        );
        assert!(SessionReply::disconnect().disconnect);
        assert!(SessionReply::disconnect().response.is_empty());
        assert_eq!(SessionReply::default(), SessionReply::text(""));
    }
}
