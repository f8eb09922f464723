use kling::KlingClient;
use kling::models::{AspectRatio, TextToVideoRequest, VideoDuration, VideoMode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kling=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <prompt> [aspect_ratio]", args[0]);
        eprintln!("\nExample:");
        eprintln!("  {} \"a lighthouse in a storm, cinematic\" 16:9", args[0]);
        std::process::exit(1);
    }

    let aspect_ratio = match args.get(2).map(String::as_str) {
        Some("9:16") => AspectRatio::Portrait,
        Some("1:1") => AspectRatio::Square,
        _ => AspectRatio::Landscape,
    };

    let client = KlingClient::from_env()?;

    let mut request = TextToVideoRequest::new(&args[1]);
    request.mode = Some(VideoMode::Std);
    request.duration = Some(VideoDuration::Five);
    request.aspect_ratio = Some(aspect_ratio);

    let jobs = client.text_to_video();
    let submission = jobs.create(&request).await?;
    println!("Submitted task {}", submission.task_id());

    let task = jobs
        .wait_for_submission(&submission, client.wait_options())
        .await?;

    println!("Task {} finished as {}", task.id(), task.status());
    if let Some(result) = task.result() {
        for video in &result.videos {
            println!("  {} ({}s)", video.url, video.duration.as_deref().unwrap_or("?"));
        }
    }

    Ok(())
}
