use satchel::adapters::UnsupportedPushPlatform;
use satchel::api::Client;
use satchel::config::ClientConfig;
use satchel::push::SubscriptionManager;

mod cli;

#[tokio::main]
async fn main() {
    let code = match cli::run() {
        cli::RunOutcome::Exit(code) => code,
        cli::RunOutcome::Check(config) => run_check(config).await,
    };
    std::process::exit(code);
}

async fn run_check(config: ClientConfig) -> i32 {
    let client = match Client::new(&config) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("error: {err}");
            return 2;
        }
    };

    match client.app_settings().await {
        Ok(settings) => {
            println!("server:  {}", client.base_url());
            println!("app:     {}", settings.app_name);
            println!("ai:      {}", enabled_label(settings.ai_enabled));
            println!("push:    {}", enabled_label(settings.push_enabled));
            let manager = SubscriptionManager::new(client, UnsupportedPushPlatform);
            let status = manager.status().await;
            println!(
                "local push: permission {:?}, subscription {}",
                status.permission,
                if status.subscribed { "present" } else { "none" }
            );
            0
        }
        Err(err) => {
            eprintln!("failed to reach {}: {err}", client.base_url());
            1
        }
    }
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}
