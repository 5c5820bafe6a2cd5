// src/services/webhook.rs

//! Webhook notifications for catalog additions.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;
use crate::models::{ChangeSet, Domain, NotificationConfig};

/// Webhook request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub username: String,
    pub avatar_url: Option<String>,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// One page of additions for one domain, addressed to one webhook.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationJob {
    pub target_url: String,
    pub domain: Domain,
    /// Zero-based page within the domain
    pub page: usize,
    pub payload: WebhookPayload,
}

/// Split a change set into webhook jobs of at most `page_size` lines each.
///
/// Domains are emitted in a fixed order (items, effects, paint kits).
pub fn render_jobs(changes: &ChangeSet, config: &NotificationConfig, target_url: &str) -> Vec<NotificationJob> {
    let items: Vec<String> = changes
        .new_items
        .iter()
        .map(|item| format!("`{}`: {}", item.defindex, item.name))
        .collect();
    let effects: Vec<String> = changes
        .new_effects
        .iter()
        .map(|effect| format!("`{}`: {}", effect.id, effect.name))
        .collect();
    let paint_kits: Vec<String> = changes
        .new_paint_kits
        .iter()
        .map(|kit| match kit.related_defindex {
            Some(defindex) => format!("`{}`: {} (War Paint `{}`)", kit.id, kit.name, defindex),
            None => format!("`{}`: {}", kit.id, kit.name),
        })
        .collect();

    let footer = format!("Schema update • {}", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    let page_size = config.page_size.max(1);

    let mut jobs = Vec::new();
    for (domain, lines) in [
        (Domain::Items, items),
        (Domain::Effects, effects),
        (Domain::PaintKits, paint_kits),
    ] {
        let pages = lines.len().div_ceil(page_size);
        for (page, chunk) in lines.chunks(page_size).enumerate() {
            let mut title = format!("New {}", domain_title(domain));
            if pages > 1 {
                title.push_str(&format!(" ({}/{})", page + 1, pages));
            }

            jobs.push(NotificationJob {
                target_url: target_url.to_string(),
                domain,
                page,
                payload: WebhookPayload {
                    username: config.username.clone(),
                    avatar_url: config.avatar_url.clone(),
                    embeds: vec![Embed {
                        title,
                        description: chunk.join("\n"),
                        color: config.embed_color,
                        footer: EmbedFooter {
                            text: footer.clone(),
                        },
                    }],
                },
            });
        }
    }
    jobs
}

fn domain_title(domain: Domain) -> &'static str {
    match domain {
        Domain::Items => "items",
        Domain::Effects => "particle effects",
        Domain::PaintKits => "paint kits",
    }
}

/// Something that can deliver a rendered job.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, job: &NotificationJob) -> Result<(), DeliveryError>;
}

#[async_trait]
impl<T: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<T> {
    async fn deliver(&self, job: &NotificationJob) -> Result<(), DeliveryError> {
        (**self).deliver(job).await
    }
}

/// Body of a 429 response.
#[derive(Debug, Deserialize)]
struct RateLimitBody {
    retry_after: Option<f64>,
}

/// Posts jobs to their webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
}

impl WebhookClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationSink for WebhookClient {
    async fn deliver(&self, job: &NotificationJob) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&job.target_url)
            .json(&job.payload)
            .send()
            .await
            .map_err(DeliveryError::permanent)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let header_delay = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_seconds);
            let body_delay = response
                .json::<RateLimitBody>()
                .await
                .ok()
                .and_then(|body| body.retry_after)
                .and_then(seconds_to_duration);

            return Err(DeliveryError::RateLimited {
                retry_after: body_delay.or(header_delay),
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::permanent(format!("{status}: {}", body.trim())))
    }
}

fn parse_seconds(value: &str) -> Option<Duration> {
    value.trim().parse::<f64>().ok().and_then(seconds_to_duration)
}

fn seconds_to_duration(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds).ok()
}
