use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use std::io::{Read, Write};
use std::path::Path;

pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("playmart")
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Download a file to the given path, streaming through a progress bar
    pub fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to start download: {}", url))?
            .error_for_status()
            .with_context(|| format!("Download rejected: {}", url))?;

        let total_size = response.content_length().unwrap_or(0);

        let pb = ProgressBar::new(total_size);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg:30} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
                .unwrap()
                .progress_chars("=>-"),
        );
        pb.set_message(file_label(url));

        let mut file =
            std::fs::File::create(dest).context("Failed to create destination file")?;

        let mut downloaded: u64 = 0;
        let mut buffer = [0u8; 8192];
        let mut reader = response;

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .context("Failed to read from response")?;

            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read])
                .context("Failed to write to file")?;

            downloaded += bytes_read as u64;
            pb.set_position(downloaded);
        }

        pb.finish_with_message(format!("{}: downloaded", file_label(url)));
        Ok(downloaded)
    }
}

/// Short label for progress output: the URL's file name, if it has one
fn file_label(url: &str) -> String {
    url.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(url)
        .to_string()
}
