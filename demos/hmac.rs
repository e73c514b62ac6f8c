//! HMAC-signed requests.
//!
//! Run with:
//! ```bash
//! export WAYGPT_PROJECT_KEY="sk_live_..."
//! export WAYGPT_PROJECT_ID="your-project-id"
//! export WAYGPT_HMAC_SECRET="your-hmac-secret"
//! cargo run --example hmac
//! ```

use waygpt::{ChatCompletionRequest, ClientOptions, Message, WayGptClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Project id and secret are read from the environment
    let client = WayGptClient::new(ClientOptions::new().with_signing(true))?;
    println!(
        "Signing requests for project {}",
        client.config().project_id().unwrap_or_default()
    );

    let request = ChatCompletionRequest::new(vec![Message::user("Hello from a signed request!")]);

    match client.chat_completion(request).await {
        Ok(response) => {
            println!("{}", response["choices"][0]["message"]["content"]);
        }
        Err(e) if e.is_unauthorized() => {
            eprintln!("Signature rejected: {e}");
            eprintln!("Check WAYGPT_PROJECT_ID, WAYGPT_HMAC_SECRET and the server clock.");
            return Err(e.into());
        }
        Err(e) => {
            eprintln!("Error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}
