use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use backend_domain::ports::AlertService;
use backend_domain::{AlertSettings, Detection};

const MAX_ALERT_LINES: usize = 8;
const DEFAULT_TEMPLATE: &str = r#"{"content":"Raid alert on {server}: {total} detection(s)\n{lines}"}"#;

/// Posts detection batches to a webhook (Discord-style JSON by default).
#[derive(Default)]
pub struct WebhookAlertService;

impl WebhookAlertService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertService for WebhookAlertService {
    fn spawn_alerts(&self, settings: AlertSettings, server_id: String, detections: Vec<Detection>) {
        if detections.is_empty() {
            return;
        }
        if resolve_alert_url(&settings).is_err() {
            warn!(
                "{} detection(s) on {} not delivered: alert webhook url not configured",
                detections.len(),
                server_id
            );
            return;
        }
        tokio::spawn(async move {
            match send_alerts(&settings, &server_id, &detections).await {
                Ok(()) => info!("alert delivered for {} ({} detections)", server_id, detections.len()),
                Err(err) => warn!("alert webhook failed: {}", err),
            }
        });
    }

    async fn check_alert_target(&self, settings: &AlertSettings) -> Result<()> {
        check_alert_target(settings).await
    }
}

pub async fn check_alert_target(settings: &AlertSettings) -> Result<()> {
    let url = resolve_alert_url(settings)?;
    let response = build_client(settings)?.get(&url).send().await?;
    if !response.status().is_success() {
        anyhow::bail!("alert webhook responded {}", response.status());
    }
    Ok(())
}

async fn send_alerts(settings: &AlertSettings, server_id: &str, detections: &[Detection]) -> Result<()> {
    let url = resolve_alert_url(settings)?;
    let template = settings
        .webhook_template
        .as_deref()
        .unwrap_or(DEFAULT_TEMPLATE);
    let payload = build_payload(server_id, detections, template);

    build_client(settings)?
        .post(&url)
        .header("Content-Type", "application/json")
        .body(payload)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

fn build_client(settings: &AlertSettings) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_seconds.max(3)))
        .build()?)
}

fn resolve_alert_url(settings: &AlertSettings) -> Result<String> {
    match &settings.webhook_url {
        Some(url) if !url.trim().is_empty() => Ok(url.trim().to_string()),
        _ => anyhow::bail!("alert webhook url not configured"),
    }
}

fn alert_line(detection: &Detection) -> String {
    format!(
        "[{}] {} {}",
        detection.risk_level(),
        detection.kind(),
        detection.summary()
    )
}

// Substituted values land inside a JSON string literal in the template.
fn escape_json_fragment(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

fn build_payload(server_id: &str, detections: &[Detection], template: &str) -> String {
    let mut lines = detections
        .iter()
        .take(MAX_ALERT_LINES)
        .map(alert_line)
        .collect::<Vec<_>>();
    if detections.len() > MAX_ALERT_LINES {
        lines.push(format!("...and {} more", detections.len() - MAX_ALERT_LINES));
    }
    template
        .replace("{server}", &escape_json_fragment(server_id))
        .replace("{total}", &detections.len().to_string())
        .replace("{lines}", &escape_json_fragment(&lines.join("\n")))
}
