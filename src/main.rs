mod api;
mod commands;
mod config;
mod error;
mod handlers;
mod models;
mod registry;
mod tasks;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use api::{DrawsClient, GameType};
use config::Config;
use log::{error, info};
use registry::PollRegistry;
use serenity::async_trait;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;

struct Bot {
    registry: Arc<PollRegistry>,
    draws: Arc<DrawsClient>,
    sweeper_started: AtomicBool,
}

#[async_trait]
impl EventHandler for Bot {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        // Clone Arc for the handler and run it concurrently
        let registry = Arc::clone(&self.registry);
        let ctx_clone = ctx.clone();
        tokio::spawn(async move {
            if let Err(why) = commands::handle_message(&registry, &ctx_clone, &msg).await {
                error!("Command handler error: {:?}", why);
            }
        });
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let registry = Arc::clone(&self.registry);
        let ctx_clone = ctx.clone();
        tokio::spawn(async move {
            handlers::handle_interaction(&registry, &ctx_clone, interaction).await;
        });
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        // Log the upcoming events for the current draw. A fetch failure
        // only ends this task.
        let draws = Arc::clone(&self.draws);
        tokio::spawn(async move {
            match draws.get_draws(GameType::Stryktipset).await {
                Ok(response) => {
                    if let Some(draw) = response.draws.first() {
                        info!("Draw {} events:", draw.draw_number);
                        for event in &draw.events {
                            info!("  {}. {}", event.event_number, event.event_description);
                        }
                    } else {
                        info!("No current draws returned");
                    }
                }
                Err(e) => error!("Failed to fetch draws: {}", e),
            }
        });

        // --- Start Background Task for Closing Polls ---
        // `ready` fires again on reconnect; only one sweep is ever started.
        if !self.sweeper_started.swap(true, Ordering::SeqCst) {
            let registry = Arc::clone(&self.registry);
            let ctx_clone = ctx.clone();
            tokio::spawn(async move {
                tasks::sweeper::close_expired_polls_task(registry, ctx_clone).await;
            });
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    // Load configuration from the environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return;
        }
    };

    let registry = Arc::new(PollRegistry::new());
    let draws = Arc::new(DrawsClient::new(config.api_token));

    // Define intents
    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    // Build client
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(Bot {
            registry,
            draws,
            sweeper_started: AtomicBool::new(false),
        })
        .await
        .expect("Err creating client");

    // Start client
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }
}
