use chrono::Utc;
use log::{error, warn};
use serenity::model::application::component::ButtonStyle;
use serenity::model::channel::Message;
use serenity::model::id::ChannelId;
use serenity::prelude::*;

use crate::error::PollError;
use crate::models::{Outcome, Poll};
use crate::registry::PollRegistry;

/// The fixed batch created by the start command.
const POLL_BATCH: [(&str, &str); 3] = [
    ("poll1", "Match 1"),
    ("poll2", "Match 2"),
    ("poll3", "Match 3"),
];

/// Create the fixed poll batch in the invoking channel. The batch is
/// all-or-nothing: if any id is still registered from an earlier round,
/// nothing is created and the channel is told to stop the running polls
/// first.
pub async fn start_polls(
    registry: &PollRegistry,
    ctx: &Context,
    msg: &Message,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let now = Utc::now();
    let batch: Vec<Poll> = POLL_BATCH
        .iter()
        .map(|(id, title)| Poll::new(*id, *title, msg.channel_id, now))
        .collect();

    match registry.create_batch(batch).await {
        Ok(()) => {}
        Err(PollError::DuplicateKey(id)) => {
            warn!("Poll batch refused, id {} is still registered", id);
            msg.channel_id
                .say(
                    &ctx.http,
                    "Polls are already running. Use !stoppoll to finish them first.",
                )
                .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    for (poll_id, title) in POLL_BATCH {
        announce_poll(ctx, msg.channel_id, poll_id, title).await?;
    }
    Ok(())
}

/// Post the poll embed with its three vote buttons.
async fn announce_poll(
    ctx: &Context,
    channel_id: ChannelId,
    poll_id: &str,
    title: &str,
) -> Result<(), serenity::Error> {
    channel_id
        .send_message(&ctx.http, |message| {
            message
                .embed(|embed| {
                    embed
                        .title(format!("Poll: {}", title))
                        .description("Click the buttons below to vote!")
                        .color(0x0099FF)
                })
                .components(|components| {
                    components.create_action_row(|row| {
                        for outcome in Outcome::ALL {
                            row.create_button(|button| {
                                button
                                    .custom_id(format!("vote_{}_{}", outcome.token(), poll_id))
                                    .label(format!("{} {}", outcome.emoji(), outcome.label()))
                                    .style(ButtonStyle::Primary)
                            });
                        }
                        row
                    })
                })
        })
        .await?;
    Ok(())
}

/// Close all open polls, post the results summary, then clear the registry.
pub async fn stop_polls(
    registry: &PollRegistry,
    ctx: &Context,
    msg: &Message,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Closing here also retires each poll's voting window, so the expiry
    // sweep has nothing left to announce after the reset.
    for (poll_id, title, channel_id) in registry.close_all().await {
        if let Err(e) = channel_id
            .say(&ctx.http, format!("Poll \"{}\" has ended!", title))
            .await
        {
            error!("Failed to announce end of poll {}: {}", poll_id, e);
        }
    }

    let report = registry.report().await;
    msg.channel_id.say(&ctx.http, report).await?;

    registry.reset_all().await;
    Ok(())
}
