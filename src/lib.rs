//! MCP UI Bridge Library
//!
//! Messaging between an embedded UI resource and the host frame that embeds
//! it: lifecycle announcements, correlated request/response with timeout and
//! cancellation, and a one-shot render-data push that may arrive early.
//!
//! ## Main Components
//!
//! - [`messaging`] - Host channel, bus client, lifecycle announcer
//! - [`schema`] - Validation of untyped host payloads
//! - [`story`] - The story render data the host pushes
//! - [`config`] - Timeouts and other settings
//! - [`cli`] - NDJSON stdio host channel and the `uibridge` commands
//!
//! ## Quick Start
//!
//! ```ignore
//! use mcp_ui_bridge::{BridgeConfig, BusClient, Json, MemoryChannel, RequestOptions, StoryData};
//!
//! let (channel, host) = MemoryChannel::pair();
//! let client = BusClient::connect(Arc::new(channel), BridgeConfig::default())?;
//! let story = client
//!     .wait_for_render_data(&Json::<StoryData>::new(), RequestOptions::new())
//!     .await?;
//! ```

pub mod cli;
pub mod config;
pub mod messaging;
pub mod schema;
pub mod story;

// Re-export commonly used types
pub use config::{BridgeConfig, ConfigError, XdgDirs};
pub use messaging::{
    AbortController, AbortReason, AbortSignal, BridgeError, BusClient, ChannelError,
    ContentExtent, HostChannel, InboundMessage, LifecycleAnnouncer, MemoryChannel, MemoryHost,
    OutboundMessage, Request, RequestOptions,
};
pub use schema::{FnSchema, Json, Schema, ValidationError};
pub use story::{Slide, StoryData};
