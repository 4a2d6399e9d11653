//! Serenity gateway adapter: turns Discord events into [`ChatEvent`]s and
//! sends the resulting [`Response`]s back.

use anyhow::{Context as _, Result};
use botiano_core::{Botiano, ButtonRow, ChatEvent, MessageEvent, Response, SelectionEvent};
use serenity::all::{
    ButtonStyle, Client, Context, CreateActionRow, CreateButton, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage, EventHandler, GatewayIntents, Interaction,
    Message, Ready,
};
use serenity::async_trait;
use tracing::{debug, error, info};

pub struct Handler {
    bot: Botiano,
}

impl Handler {
    pub fn new(bot: Botiano) -> Self {
        Self { bot }
    }
}

pub fn action_rows(rows: &[ButtonRow]) -> Vec<CreateActionRow> {
    rows.iter()
        .map(|row| {
            CreateActionRow::Buttons(
                row.iter()
                    .map(|button| {
                        CreateButton::new(button.custom_id.clone())
                            .label(button.label.clone())
                            .style(ButtonStyle::Primary)
                    })
                    .collect(),
            )
        })
        .collect()
}

async fn deliver(ctx: &Context, msg: &Message, response: Response) -> serenity::Result<()> {
    match response {
        Response::Reply(reply) => {
            let builder = CreateMessage::new()
                .content(reply.content)
                .components(action_rows(&reply.rows))
                .reference_message(msg);
            msg.channel_id.send_message(&ctx.http, builder).await?;
        }
        Response::Send(parts) => {
            for part in parts {
                msg.channel_id.say(&ctx.http, part).await?;
            }
        }
    }
    Ok(())
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "Connected to Discord");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let bot_id = ctx.cache.current_user().id;
        let event = ChatEvent::Message(MessageEvent {
            author_name: msg.author.name.clone(),
            author_is_bot: msg.author.bot,
            content: msg.content.clone(),
            mentions_bot: msg.mentions_user_id(bot_id),
        });

        let Some(response) = self.bot.handle(event).await else {
            return;
        };
        debug!(channel = %msg.channel_id, "Replying to message");
        if let Err(err) = deliver(&ctx, &msg, response).await {
            error!(error = %err, channel = %msg.channel_id, "Failed to send reply");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Component(component) = interaction else {
            return;
        };
        let Some(selection) =
            SelectionEvent::from_custom_id(&component.data.custom_id, component.user.name.clone())
        else {
            return;
        };

        let Some(Response::Reply(reply)) = self.bot.handle(ChatEvent::Selection(selection)).await
        else {
            return;
        };
        let message = CreateInteractionResponseMessage::new()
            .content(reply.content)
            .ephemeral(reply.ephemeral);
        if let Err(err) = component
            .create_response(&ctx.http, CreateInteractionResponse::Message(message))
            .await
        {
            error!(error = %err, "Failed to answer suggestion selection");
        }
    }
}

/// Runs the gateway client until it stops or Ctrl+C is received.
pub async fn run(token: &str, bot: Botiano) -> Result<()> {
    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(token, intents)
        .event_handler(Handler::new(bot))
        .await
        .context("build discord client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
            shard_manager.shutdown_all().await;
        }
    });

    client.start().await.context("discord gateway")
}
