//! Command execution for the `uibridge` binary.

use super::bridge::StdioChannel;
use crate::config::BridgeConfig;
use crate::messaging::{
    BusClient, ContentExtent, HostChannel, LifecycleAnnouncer, Request, RequestOptions,
};
use crate::schema::Json;
use crate::story::StoryData;
use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Default content extents announced on mount.
pub const DEFAULT_HEIGHT: u32 = 640;
pub const DEFAULT_WIDTH: u32 = 360;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Wait for the host's render data and print a story summary
    Render {
        /// Content height announced to the host
        #[arg(long, default_value_t = DEFAULT_HEIGHT)]
        height: u32,

        /// Content width announced to the host
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: u32,
    },

    /// Send a prompt to the host and print its response
    Prompt {
        /// Prompt text
        text: String,
    },

    /// Ask the host to open a link
    Link {
        /// URL to open
        url: String,
    },

    /// Ask the host to call a tool
    Tool {
        /// Tool name
        name: String,

        /// Tool parameters as a JSON object
        #[arg(long, default_value = "{}")]
        params: String,
    },
}

/// Run `command` against the host on stdio and print the result to stderr.
pub async fn run(command: Command, config: BridgeConfig) -> Result<()> {
    let channel = Arc::new(StdioChannel::new());
    debug!(has_host = channel.has_host(), "Connecting to host");

    let client = BusClient::connect(channel, config)?;
    let output = execute(&client, command).await?;

    eprintln!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Mount, perform `command`, and return its JSON result.
pub async fn execute(client: &BusClient, command: Command) -> Result<Value> {
    let mut announcer = LifecycleAnnouncer::new(client);

    match command {
        Command::Render { height, width } => {
            let extent = ContentExtent::new(height, width);
            announcer.mount(extent);

            let story = client
                .wait_for_render_data(&Json::<StoryData>::new(), RequestOptions::new())
                .await
                .context("Failed to receive render data")?;
            info!(title = %story.title, slides = story.slides.len(), "Received story");

            // Story replaced: the host re-measures the frame.
            announcer.content_changed(extent);
            Ok(story.summary())
        }
        Command::Prompt { text } => {
            announcer.mount(default_extent());
            send(client, Request::prompt(text)).await
        }
        Command::Link { url } => {
            announcer.mount(default_extent());
            send(client, Request::link(url)).await
        }
        Command::Tool { name, params } => {
            let params: Map<String, Value> =
                serde_json::from_str(&params).context("--params must be a JSON object")?;
            announcer.mount(default_extent());
            send(client, Request::tool(name, params)).await
        }
    }
}

fn default_extent() -> ContentExtent {
    ContentExtent::new(DEFAULT_HEIGHT, DEFAULT_WIDTH)
}

async fn send(client: &BusClient, request: Request) -> Result<Value> {
    let kind = request.kind();
    client
        .send_request(request, RequestOptions::new())
        .await
        .with_context(|| format!("{kind} request failed"))
}
