//! Messaging between an embedded UI and its host frame.
//!
//! The host and the UI share nothing but an untyped message channel. This
//! module layers a small protocol on top of it:
//!
//! - **Lifecycle**: one-way `ready` and `size-change` notifications
//! - **Requests**: `tool` / `prompt` / `link` messages answered by exactly one
//!   correlated response, with timeout and cancellation
//! - **Render data**: a one-shot push from the host that may land before the
//!   UI asks for it
//!
//! ## Architecture
//!
//! ```text
//!        host frame
//!     ▲            │
//!     │ post       │ inbound
//! ┌───┴────────────▼────────────────────────────┐
//! │              HostChannel                    │
//! └───▲────────────┬────────────────────────────┘
//!     │            │ dispatch
//! ┌───┴────────────▼────────────────────────────┐
//! │ BusClient                                   │
//! │   PendingRequests   (correlation ID → entry)│
//! │   EarlyArrivalQueue (render-data pushes)    │
//! │   MessageBus        (broadcast to listeners)│
//! └───▲────────────▲────────────────────────────┘
//!     │            │
//! LifecycleAnnouncer   page code (send_request / wait_for_render_data)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use mcp_ui_bridge::messaging::{BusClient, ContentExtent, LifecycleAnnouncer, Request, RequestOptions};
//!
//! let client = BusClient::connect(channel, config)?;
//! LifecycleAnnouncer::new(&client).mount(ContentExtent::new(640, 360));
//!
//! let story = client.wait_for_render_data(&Json::<StoryData>::new(), RequestOptions::new()).await?;
//! let answer = client.send_request(Request::prompt("Summarize"), RequestOptions::new()).await?;
//! ```

mod bus;
mod channel;
mod client;
mod compat;
mod error;
mod lifecycle;
mod queue;
mod registry;
mod signal;
mod types;

pub use bus::{BusError, MessageBus, MessageReceiver, MessageSender, DEFAULT_BUS_CAPACITY};
pub use channel::{HostChannel, InboundStream, MemoryChannel, MemoryHost};
pub use client::{BusClient, RequestOptions};
pub use compat::{adapt_for_host, tool_call_as_prompt};
pub use error::{BridgeError, ChannelError};
pub use lifecycle::LifecycleAnnouncer;
pub use queue::EarlyArrivalQueue;
pub use registry::{PendingEntry, PendingRequests, Settlement};
pub use signal::{AbortController, AbortReason, AbortSignal};
pub use types::*;
