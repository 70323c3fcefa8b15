//! OSC payload classification.
//!
//! The parser hands over the payload as opaque bytes; classification
//! splits at the first `;` and interprets the handful of codes the engine
//! understands. Everything else passes through raw.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;

/// Semantic classification of an OSC payload.
#[derive(Debug, Clone, PartialEq)]
pub enum OscCommand {
    /// OSC 0 / OSC 2
    Title(String),
    /// OSC 1
    IconTitle(String),
    /// OSC 8. `uri: None` closes the open hyperlink.
    Hyperlink {
        id: Option<String>,
        uri: Option<String>,
    },
    /// OSC 52 with a decodable base64 payload.
    Clipboard { clipboard: String, data: String },
    /// Anything the engine does not interpret.
    Other { command: String, payload: Vec<u8> },
}

pub fn classify(payload: &[u8]) -> OscCommand {
    let (command, rest) = split_once(payload, b';');
    let command = String::from_utf8_lossy(command).to_string();
    let rest = rest.unwrap_or(b"");
    match command.as_str() {
        "0" | "2" => OscCommand::Title(String::from_utf8_lossy(rest).to_string()),
        "1" => OscCommand::IconTitle(String::from_utf8_lossy(rest).to_string()),
        "8" => classify_hyperlink(rest),
        "52" => classify_clipboard(rest),
        _ => OscCommand::Other {
            command,
            payload: rest.to_vec(),
        },
    }
}

/// OSC 8 payload: `params;URI`, where `params` is a `:`-separated list of
/// `key=value` pairs. An empty URI closes the link.
fn classify_hyperlink(rest: &[u8]) -> OscCommand {
    let (params, uri) = split_once(rest, b';');
    let uri = uri
        .map(|u| String::from_utf8_lossy(u).to_string())
        .unwrap_or_default();
    if uri.is_empty() {
        return OscCommand::Hyperlink { id: None, uri: None };
    }
    let id = String::from_utf8_lossy(params)
        .split(':')
        .find_map(|kv| kv.strip_prefix("id=").map(str::to_string))
        .filter(|v| !v.is_empty());
    OscCommand::Hyperlink { id, uri: Some(uri) }
}

/// OSC 52 payload: `Pc;Pd` with Pd base64-encoded text. Queries (`?`) and
/// undecodable payloads pass through raw for the embedder to judge.
fn classify_clipboard(rest: &[u8]) -> OscCommand {
    let (clipboard, data) = split_once(rest, b';');
    let raw = || OscCommand::Other {
        command: "52".to_string(),
        payload: rest.to_vec(),
    };
    let Some(data) = data else {
        return raw();
    };
    match BASE64_STANDARD.decode(data) {
        Ok(decoded) => OscCommand::Clipboard {
            clipboard: String::from_utf8_lossy(clipboard).to_string(),
            data: String::from_utf8_lossy(&decoded).to_string(),
        },
        Err(_) => raw(),
    }
}

fn split_once(bytes: &[u8], sep: u8) -> (&[u8], Option<&[u8]>) {
    match bytes.iter().position(|&b| b == sep) {
        Some(i) => (&bytes[..i], Some(&bytes[i + 1..])),
        None => (bytes, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_codes() {
        assert_eq!(
            classify(b"0;hello"),
            OscCommand::Title("hello".to_string())
        );
        assert_eq!(classify(b"2;there"), OscCommand::Title("there".to_string()));
        assert_eq!(
            classify(b"1;icon"),
            OscCommand::IconTitle("icon".to_string())
        );
        // Titles may themselves contain semicolons
        assert_eq!(classify(b"0;a;b"), OscCommand::Title("a;b".to_string()));
    }

    #[test]
    fn hyperlink_open_with_id() {
        assert_eq!(
            classify(b"8;id=42;https://example.com"),
            OscCommand::Hyperlink {
                id: Some("42".to_string()),
                uri: Some("https://example.com".to_string()),
            }
        );
        assert_eq!(
            classify(b"8;;https://example.com"),
            OscCommand::Hyperlink {
                id: None,
                uri: Some("https://example.com".to_string()),
            }
        );
    }

    #[test]
    fn hyperlink_close() {
        assert_eq!(
            classify(b"8;;"),
            OscCommand::Hyperlink { id: None, uri: None }
        );
    }

    #[test]
    fn clipboard_decodes_base64() {
        // "aGVsbG8=" is "hello"
        assert_eq!(
            classify(b"52;c;aGVsbG8="),
            OscCommand::Clipboard {
                clipboard: "c".to_string(),
                data: "hello".to_string(),
            }
        );
    }

    #[test]
    fn clipboard_query_passes_through_raw() {
        assert_eq!(
            classify(b"52;c;?"),
            OscCommand::Other {
                command: "52".to_string(),
                payload: b"c;?".to_vec(),
            }
        );
    }

    #[test]
    fn unknown_codes_pass_through_raw() {
        assert_eq!(
            classify(b"133;A"),
            OscCommand::Other {
                command: "133".to_string(),
                payload: b"A".to_vec(),
            }
        );
        assert_eq!(
            classify(b"junk"),
            OscCommand::Other {
                command: "junk".to_string(),
                payload: vec![],
            }
        );
    }
}
