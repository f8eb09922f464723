use std::time::Duration;

use kling::WaitOptions;
use kling::blocking::KlingClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kling=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <task_id> [timeout_seconds]", args[0]);
        std::process::exit(1);
    }

    let timeout = match args.get(2) {
        Some(raw) => raw.parse()?,
        None => 600,
    };
    let options = WaitOptions::new(Duration::from_secs(5), Some(Duration::from_secs(timeout)))?;

    let client = KlingClient::from_env()?;
    match client.text_to_video().wait_for_completion(&args[1], &options) {
        Ok(task) => {
            let urls: Vec<&str> = task
                .result()
                .map(|r| r.videos.iter().map(|v| v.url.as_str()).collect())
                .unwrap_or_default();
            println!("Task {} succeeded: {:?}", task.id(), urls);
        }
        Err(e) if e.is_retryable() => {
            println!("Still running after {timeout}s, try again later: {e}");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
