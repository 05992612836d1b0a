//! Details command implementation.

use super::output;
use crate::models::config::Config;
use crate::models::media::DetailResult;
use crate::services::SearchGateway;
use anyhow::Result;
use colored::Colorize;

/// Execute details command.
pub async fn execute_details(config: &Config, imdb_id: &str) -> Result<()> {
    let gateway = super::gateway(config)?;

    let pb = super::spinner("Loading details...");
    let result = gateway.fetch_details_by_id(imdb_id.trim()).await;
    pb.finish_and_clear();

    match result {
        DetailResult::Found(details) => {
            let liked = super::open_liked(config);
            output::print_details(&details, liked.is_liked(&details.item.imdb_id));
        }
        DetailResult::Failed(message) => {
            println!("{}", message.red());
        }
    }
    Ok(())
}
