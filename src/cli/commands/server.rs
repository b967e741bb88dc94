use anyhow::Context;
use serde_json::{json, Value};

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

pub async fn ping(base_url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = format!("{}/health", base_url.trim_end_matches('/'));

    let response = reqwest::get(&url)
        .await
        .with_context(|| format!("failed to reach {}", url))?;
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        anyhow::bail!("{} responded {}", url, status);
    }

    let data = body.get("data").cloned().unwrap_or(Value::Null);
    output_success(
        &output_format,
        &format!("{} is healthy", base_url),
        Some(json!({ "url": url, "health": data })),
    )
}
