use std::time::Duration;

use crate::error::{AppError, Result};

/// Where raw fixture text comes from. One call per ingest cycle, returning
/// an ordered sequence of multi-line blocks, one per observed fixture. A
/// failure here aborts only that ingest attempt — the existing dataset
/// stays untouched until the next scheduled window.
pub trait BlockSource: Send + Sync {
    fn fetch_blocks(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

/// Fetches the source page as plain text and splits it into blank-line
/// separated blocks. Deliberately thin: session handling and page
/// navigation live outside this system.
pub struct HttpBlockSource {
    url: String,
    client: reqwest::Client,
}

impl HttpBlockSource {
    pub fn new(url: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { url, client })
    }
}

impl BlockSource for HttpBlockSource {
    async fn fetch_blocks(&self) -> Result<Vec<String>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::Source(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AppError::Source(format!("source returned {}", resp.status())));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| AppError::Source(e.to_string()))?;

        Ok(split_blocks(&body))
    }
}

/// Splits raw page text into fixture blocks on blank lines, trimming each
/// line and dropping empty blocks.
pub fn split_blocks(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|chunk| {
            chunk
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|b| !b.is_empty())
        .collect()
}

/// Fixed in-memory source for tests and offline replay.
pub struct StaticBlockSource {
    blocks: Vec<String>,
}

impl StaticBlockSource {
    pub fn new(blocks: Vec<String>) -> Self {
        Self { blocks }
    }
}

impl BlockSource for StaticBlockSource {
    async fn fetch_blocks(&self) -> Result<Vec<String>> {
        Ok(self.blocks.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_blank_lines_and_trims() {
        let text = "Arsenal\n Chelsea \n2.10\n\n\nLiverpool\nEverton\n1.80\n";
        let blocks = split_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "Arsenal\nChelsea\n2.10");
        assert_eq!(blocks[1], "Liverpool\nEverton\n1.80");
    }

    #[test]
    fn empty_input_yields_no_blocks() {
        assert!(split_blocks("").is_empty());
        assert!(split_blocks("\n\n\n").is_empty());
    }
}
