pub mod poll;

use log::info;
use serenity::model::channel::Message;
use serenity::prelude::*;

use crate::registry::PollRegistry;

const START_POLLS_COMMAND: &str = "!poll";
const STOP_POLLS_COMMAND: &str = "!stoppoll";

/// Route an inbound message to a command handler. Commands are matched on
/// exact message text.
pub async fn handle_message(
    registry: &PollRegistry,
    ctx: &Context,
    msg: &Message,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match msg.content.as_str() {
        START_POLLS_COMMAND => {
            info!("Received {} from {}", START_POLLS_COMMAND, msg.author.name);
            poll::start_polls(registry, ctx, msg).await?;
        }
        STOP_POLLS_COMMAND => {
            info!("Received {} from {}", STOP_POLLS_COMMAND, msg.author.name);
            poll::stop_polls(registry, ctx, msg).await?;
        }
        _ => {}
    }
    Ok(())
}
