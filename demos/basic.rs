//! Basic usage: chat, streaming, model listing and image generation.
//!
//! Run with:
//! ```bash
//! export WAYGPT_PROJECT_KEY="sk_live_..."
//! cargo run --example basic
//! ```

use futures::StreamExt;
use std::io::Write;
use waygpt::{ChatCompletionRequest, ImageGenerationRequest, Message, WayGptClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    // Base URL and project key come from WAYGPT_API_URL / WAYGPT_PROJECT_KEY
    let client = WayGptClient::from_env()?;

    println!("=== Models ===");
    for model in client.models().await? {
        println!("- {model}");
    }

    println!("\n=== Chat ===");
    let request = ChatCompletionRequest::new(vec![
        Message::system("Answer in one short sentence."),
        Message::user("What is the capital of France?"),
    ])
    .with_temperature(0.7)
    .with_max_tokens(100);

    let response = client.chat_completion(request).await?;
    println!("{}", response["choices"][0]["message"]["content"]);
    if let Some(usage) = response.get("usage") {
        println!("Usage: {usage}");
    }

    println!("\n=== Streaming ===");
    let mut stream = client
        .chat_completion_stream(ChatCompletionRequest::new(vec![Message::user(
            "Write a haiku about Rust programming.",
        )]))
        .await?;

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                if let Some(text) = chunk.content_delta() {
                    print!("{text}");
                    std::io::stdout().flush()?;
                }
            }
            Err(e) => {
                eprintln!("\nStream error: {e}");
                break;
            }
        }
    }
    println!();

    println!("\n=== Image ===");
    match client
        .image_generation(ImageGenerationRequest::new("A lighthouse at dawn, watercolor"))
        .await
    {
        Ok(images) => println!("{images:#}"),
        // Image generation may be disabled for the project
        Err(e) => eprintln!("Image generation failed ({:?}): {e}", e.status_code),
    }

    Ok(())
}
