//! Management API: login, projects and use cases, then a use-case driven chat.
//!
//! Run with:
//! ```bash
//! export WAYGPT_EMAIL="you@example.com"
//! export WAYGPT_PASSWORD="..."
//! export WAYGPT_PROJECT_KEY="sk_live_..."   # optional, for the final chat
//! cargo run --example client_api
//! ```

use serde_json::json;
use waygpt::{
    ChatCompletionRequest, ManagementClient, Message, NewUseCase, UseCaseKind, UseCaseUpdate,
    WayGptClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let email = std::env::var("WAYGPT_EMAIL").expect("WAYGPT_EMAIL environment variable must be set");
    let password =
        std::env::var("WAYGPT_PASSWORD").expect("WAYGPT_PASSWORD environment variable must be set");

    let management = ManagementClient::from_env()?;
    let token = management.login(&email, &password).await?;
    println!("Logged in, token valid for {}s", token.expires_in());
    let jwt = token.token();

    println!("\n=== Projects ===");
    let projects = management.list_projects(jwt).await?;
    for project in &projects {
        println!("- {} ({})", project["name"], project["id"]);
    }

    let project_id = match projects.first().and_then(|p| p["id"].as_str()) {
        Some(id) => id.to_string(),
        None => {
            let created = management.create_project(jwt, "Demo project").await?;
            println!("Created project {}", created["id"]);
            created["id"].as_str().unwrap_or_default().to_string()
        }
    };

    let settings = management.get_project(jwt, &project_id).await?;
    println!("Settings: {settings:#}");

    println!("\n=== Use cases ===");
    let use_case = management
        .create_use_case(
            jwt,
            &project_id,
            &NewUseCase::new("demo_support", "Demo support chat")
                .with_kind(UseCaseKind::Chat)
                .with_config(json!({
                    "system_prompt": "You are a friendly support agent. Answer briefly."
                })),
        )
        .await?;
    let use_case_id = use_case["id"].as_str().unwrap_or_default().to_string();
    println!("Created use case {use_case_id}");

    management
        .update_use_case(
            jwt,
            &project_id,
            &use_case_id,
            &UseCaseUpdate::new().with_name("Demo support chat (v2)"),
        )
        .await?;

    let fetched = management.get_use_case(jwt, &project_id, &use_case_id).await?;
    println!("Fetched: {}", fetched["name"]);

    // Chat through the use case when a project key is available
    if let Ok(client) = WayGptClient::from_env() {
        let response = client
            .chat_completion(
                ChatCompletionRequest::new(vec![Message::user("How do I reset my password?")])
                    .with_use_case("demo_support"),
            )
            .await?;
        println!("\n=== Chat via use case ===");
        println!("{}", response["choices"][0]["message"]["content"]);
    }

    management.delete_use_case(jwt, &project_id, &use_case_id).await?;
    println!("\nDeleted use case {use_case_id}");

    Ok(())
}
