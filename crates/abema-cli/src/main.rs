//! CLI entry point for the ABEMA metadata extractor.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use abema_core::{AbemaScraper, render_yaml};
use anyhow::{Context, Result, bail};
use clap::Parser;
use tempfile::NamedTempFile;
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<()> {
    info!(url = %args.url, "starting extraction");

    let scraper = AbemaScraper::with_config(args.client_config(), args.scraper_config())
        .context("failed to initialise HTTP client")?;
    let include_synopsis = !args.no_synopsis;

    // Nothing is written unless the run completes
    let document = until_interrupted(
        scraper.extract_all(&args.url, include_synopsis),
        tokio::signal::ctrl_c(),
    )
    .await?;

    let yaml = render_yaml(&document, &args.output_options())?;
    write_output(&args.output, &yaml)?;

    if !args.quiet {
        println!("Extraction finished: {}", args.output.display());
        println!("Series   : {}", document.title());
        println!("Episodes : {}", document.total_episodes());
        println!(
            "Synopses : {}",
            if include_synopsis { "fetched" } else { "skipped" }
        );
    }

    Ok(())
}

/// Races `work` against `signal`
///
/// A signal future that fails (no handler could be installed) disables the
/// interrupt branch instead of ending the run.
async fn until_interrupted<T>(
    work: impl Future<Output = abema_core::Result<T>>,
    signal: impl Future<Output = std::io::Result<()>>,
) -> Result<T> {
    tokio::select! {
        result = work => Ok(result?),
        Ok(()) = signal => bail!("interrupted by user, no output written"),
    }
}

/// Writes `contents` to `path` through a temporary file in the same directory
///
/// The destination is either left untouched or fully replaced.
fn write_output(path: &Path, contents: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    file.write_all(contents.as_bytes())
        .context("failed to write output")?;
    file.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use abema_core::{Episode, OutputOptions, SeriesDocument};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_until_interrupted_returns_finished_work() {
        let value = until_interrupted(async { Ok(7) }, std::future::pending())
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_until_interrupted_stops_on_signal() {
        let result: Result<()> =
            until_interrupted(std::future::pending(), async { Ok(()) }).await;
        let message = result.unwrap_err().to_string();
        assert!(message.contains("interrupted"), "{message}");
    }

    #[tokio::test]
    async fn test_until_interrupted_ignores_failed_signal_handler() {
        let work = async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            Ok("done")
        };
        let signal = async { Err(std::io::Error::other("no signal handler")) };

        assert_eq!(until_interrupted(work, signal).await.unwrap(), "done");
    }

    #[tokio::test]
    async fn test_until_interrupted_propagates_work_error() {
        let work = async { Err::<(), _>(abema_core::AbemaError::InvalidUrl("gone".to_string())) };
        let result = until_interrupted(work, std::future::pending()).await;
        assert!(result.unwrap_err().to_string().contains("gone"));
    }

    #[test]
    fn test_write_output_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episodes.yaml");

        write_output(&path, "series_title: テスト\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "series_title: テスト\n");
    }

    #[test]
    fn test_write_output_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episodes.yaml");
        std::fs::write(&path, "old contents that are longer than the new ones").unwrap();

        write_output(&path, "new\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
        // No temporary files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_output_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("episodes.yaml");

        assert!(write_output(&path, "x").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_rendered_document_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episodes.yaml");
        let document = SeriesDocument::new(
            "Test Series",
            "https://abema.tv/video/title/test-series",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            vec![Episode::new(1, "はじめての冒険")],
        );
        let options = OutputOptions {
            synopsis_placeholder: Some("あらすじなし".to_string()),
            header: true,
        };

        write_output(&path, &render_yaml(&document, &options).unwrap()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Test Series"));
        assert!(written.contains("title: はじめての冒険"));
        assert!(written.contains("synopsis: あらすじなし"));
    }
}
