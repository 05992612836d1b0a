//! Recommend command implementation.

use super::output;
use crate::cli::args::OutputFormat;
use crate::core::recommend::Recommender;
use crate::models::config::{AiConfig, AiProvider, Config};
use crate::services::anthropic::AnthropicClient;
use crate::services::ollama::{OllamaClient, OllamaConfig};
use crate::services::TextGenerator;
use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

/// Build the configured recommendation backend.
pub fn build_generator(ai: &AiConfig) -> crate::Result<Arc<dyn TextGenerator>> {
    let generator: Arc<dyn TextGenerator> = match ai.provider {
        AiProvider::Anthropic => Arc::new(AnthropicClient::from_config(ai)?),
        AiProvider::Ollama => Arc::new(OllamaClient::new(OllamaConfig::from(ai))?),
    };
    Ok(generator)
}

/// Execute recommend command.
pub async fn execute_recommend(
    config: &Config,
    description: &str,
    format: OutputFormat,
) -> Result<()> {
    let description = description.trim();
    if description.is_empty() {
        anyhow::bail!(crate::Error::EmptyDescription);
    }

    let generator = build_generator(&config.ai)?;
    let gateway = super::gateway(config)?;
    let recommender = Recommender::new(generator, gateway);

    let pb = super::spinner("Getting recommendations...");
    let recommendations = recommender.recommend(description).await;
    pb.finish_and_clear();
    let recommendations = recommendations?;

    tracing::debug!(
        "Recommended: {}",
        recommendations
            .iter()
            .map(|r| r.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let pb = ProgressBar::new(recommendations.len() as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:30.cyan/blue}] {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(format!("Found 0 of {}", recommendations.len()));

    let report = recommender
        .resolve(&recommendations, |_, status| {
            pb.inc(1);
            pb.set_message(format!("Found {} of {}", status.found, status.total));
        })
        .await;
    pb.finish_and_clear();

    if report.items.is_empty() {
        println!(
            "{}",
            "None of the recommended titles could be found in our database. \
             Try a different description."
                .yellow()
        );
        return Ok(());
    }

    let liked = super::open_liked(config);
    if format != OutputFormat::Json {
        println!("{}", "Recommendations".bold().cyan());
        println!();
    }
    output::print_items(&report.items, &|id| liked.is_liked(id), format)?;

    if report.status.skipped > 0 && format != OutputFormat::Json {
        println!();
        println!(
            "{}",
            format!(
                "Note: {} recommendation(s) were not found in our database and have been skipped.",
                report.status.skipped
            )
            .dimmed()
        );
    }
    Ok(())
}
