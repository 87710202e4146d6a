use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use log::{error, info};
use serenity::prelude::*;
use tokio::time::interval;

use crate::registry::PollRegistry;

const CHECK_INTERVAL_SECONDS: u64 = 5;

/// Background sweep that retires polls whose voting window has elapsed and
/// announces the end of each one. Runs for the lifetime of the process; a
/// registry reset simply leaves it nothing to close.
pub async fn close_expired_polls_task(registry: Arc<PollRegistry>, ctx: Context) {
    info!("Starting background task to close expired polls...");
    let mut interval = interval(StdDuration::from_secs(CHECK_INTERVAL_SECONDS));

    loop {
        interval.tick().await;

        let closed = registry.close_expired(Utc::now()).await;
        for (poll_id, title, channel_id) in closed {
            info!("Poll {} reached the end of its voting window", poll_id);
            if let Err(e) = channel_id
                .say(&ctx.http, format!("Poll \"{}\" has ended!", title))
                .await
            {
                error!("Failed to announce end of poll {}: {}", poll_id, e);
            }
        }
    }
}
