mod vote;

use log::{error, warn};
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::prelude::*;

use crate::models::Outcome;
use crate::registry::PollRegistry;

/// Interaction entry point, called from the gateway event handler.
pub async fn handle_interaction(registry: &PollRegistry, ctx: &Context, interaction: Interaction) {
    let result = match interaction {
        Interaction::MessageComponent(component) => {
            handle_component(registry, ctx, &component).await
        }
        _ => {
            warn!("Unhandled interaction type: {:?}", interaction.kind());
            Ok(())
        }
    };

    if let Err(why) = result {
        error!("Interaction handler error: {:?}", why);
    }
}

/// Route a component interaction based on its custom id. Buttons can outlive
/// the polls they belong to, so anything unparseable is acknowledged rather
/// than crashing the dispatcher.
async fn handle_component(
    registry: &PollRegistry,
    ctx: &Context,
    component: &MessageComponentInteraction,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let custom_id = &component.data.custom_id;

    match parse_vote_custom_id(custom_id) {
        Some((outcome, poll_id)) => {
            vote::handle_vote(registry, ctx, component, poll_id, outcome).await?;
        }
        None => {
            warn!("Unhandled component custom_id: {}", custom_id);
            component
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| {
                            message.content("Unknown button action.").ephemeral(true)
                        })
                })
                .await?;
        }
    }

    Ok(())
}

/// Parse a `vote_{1|x|2}_{pollId}` custom id.
fn parse_vote_custom_id(custom_id: &str) -> Option<(Outcome, &str)> {
    let rest = custom_id.strip_prefix("vote_")?;
    let (token, poll_id) = rest.split_once('_')?;
    let outcome = Outcome::from_token(token)?;
    if poll_id.is_empty() {
        return None;
    }
    Some((outcome, poll_id))
}
