use log::{info, warn};
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::*;

use crate::error::PollError;
use crate::models::Outcome;
use crate::registry::PollRegistry;

/// Apply a vote button press and acknowledge the voter. All replies are
/// ephemeral; rejections are only ever shown to the voter.
pub async fn handle_vote(
    registry: &PollRegistry,
    ctx: &Context,
    component: &MessageComponentInteraction,
    poll_id: &str,
    outcome: Outcome,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let voter = component.user.id;

    let reply = match registry.record_vote(poll_id, voter, outcome).await {
        Ok(()) => {
            info!(
                "User {} voted {:?} in poll {}",
                voter, outcome, poll_id
            );
            format!(
                "{} voted for {} ({})!",
                component.user.name,
                outcome.label(),
                outcome.emoji()
            )
        }
        Err(PollError::DuplicateVote(_)) => "You have already voted in this poll!".to_string(),
        Err(PollError::PollClosed(_)) => "This poll has ended.".to_string(),
        Err(PollError::UnknownPoll(_)) => {
            // Stale button from a poll that was reset away.
            warn!("Vote for unknown poll {}", poll_id);
            "This poll is no longer running.".to_string()
        }
        Err(e) => return Err(e.into()),
    };

    component
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| message.content(reply).ephemeral(true))
        })
        .await?;

    Ok(())
}
