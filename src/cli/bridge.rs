//! NDJSON host channel over stdio.
//!
//! The host is the parent process. Each message is one JSON object per line:
//! outbound messages are written to stdout, inbound messages are read from
//! stdin. When stdin is a terminal there is no host.
//!
//! ## Protocol
//!
//! ### Outbound Messages (stdout)
//! ```json
//! {"type": "ui-lifecycle-iframe-ready"}
//! {"type": "ui-size-change", "payload": {"height": 640, "width": 360}}
//! {"type": "prompt", "messageId": "…", "payload": {"prompt": "…"}}
//! {"type": "link", "messageId": "…", "payload": {"url": "…"}}
//! ```
//!
//! ### Inbound Messages (stdin)
//! ```json
//! {"type": "ui-message-response", "messageId": "…", "payload": {"response": {}}}
//! {"type": "ui-message-response", "messageId": "…", "payload": {"error": "…"}}
//! {"type": "ui-lifecycle-iframe-render-data", "payload": {"renderData": {}}}
//! ```

use crate::messaging::{ChannelError, HostChannel, InboundMessage, InboundStream, OutboundMessage};
use std::io::{BufRead, BufReader, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Host channel speaking NDJSON on stdin/stdout.
pub struct StdioChannel {
    attached: bool,
    inbound_taken: AtomicBool,
}

impl StdioChannel {
    /// Channel whose host is present unless stdin is a terminal.
    pub fn new() -> Self {
        Self::with_host(!std::io::stdin().is_terminal())
    }

    /// Channel with an explicit host presence.
    pub fn with_host(attached: bool) -> Self {
        Self {
            attached,
            inbound_taken: AtomicBool::new(false),
        }
    }

    /// Claim the inbound side. Only the first claim succeeds.
    fn claim_inbound(&self) -> bool {
        !self.inbound_taken.swap(true, Ordering::SeqCst)
    }
}

impl Default for StdioChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl HostChannel for StdioChannel {
    fn has_host(&self) -> bool {
        self.attached
    }

    fn post(&self, message: &OutboundMessage) -> Result<(), ChannelError> {
        let json = encode_line(message)?;
        let stdout = std::io::stdout();
        let mut writer = stdout.lock();
        writeln!(writer, "{}", json)?;
        writer.flush()?;
        Ok(())
    }

    fn take_inbound(&self) -> Option<InboundStream> {
        if !self.claim_inbound() {
            return None;
        }

        let (tx, rx) = mpsc::unbounded_channel();

        // Blocking stdin reads stay off the async runtime.
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            let reader = BufReader::new(stdin.lock());

            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        let Some(message) = decode_line(&line) else {
                            continue;
                        };
                        if tx.send(message).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read from host");
                        break;
                    }
                }
            }
            debug!("Host closed stdin");
        });

        Some(rx)
    }
}

/// Encode one outbound message as a single NDJSON line (without newline).
pub fn encode_line(message: &OutboundMessage) -> Result<String, ChannelError> {
    Ok(serde_json::to_string(message)?)
}

/// Decode one NDJSON line. Blank and malformed lines yield `None`.
pub fn decode_line(line: &str) -> Option<InboundMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str(line) {
        Ok(message) => Some(message),
        Err(e) => {
            warn!(error = %e, "Ignoring malformed host message");
            None
        }
    }
}
