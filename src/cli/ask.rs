//! One-shot "ask" command: a single turn in a fresh session.

use std::error::Error;

use crate::core::chat_client::ChatClient;
use crate::core::config::ResolvedSettings;
use crate::core::controller::{ConversationController, TurnOutcome};
use crate::core::http::build_client;
use crate::ui::transcript::{print_trace, write_lines};
use crate::utils::logging::LoggingState;

pub async fn run_ask(
    settings: ResolvedSettings,
    prompt: String,
    log_file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    if prompt.trim().is_empty() {
        eprintln!("Usage: ragchat ask <question>");
        std::process::exit(1);
    }

    let http = build_client(settings.request_timeout)?;
    let client = ChatClient::new(http, settings.base_url);
    let mut controller =
        ConversationController::new(client).with_logging(LoggingState::new(log_file));

    match controller.submit(&prompt, settings.web_search).await {
        TurnOutcome::Completed { response, trace } => {
            write_lines(&mut std::io::stdout().lock(), &[response, String::new()])?;
            print_trace(&trace)?;
            Ok(())
        }
        TurnOutcome::Failed { error, message } => {
            eprintln!("❌ {message}");
            eprintln!("   {error}");
            std::process::exit(1);
        }
        TurnOutcome::Ignored => Ok(()),
    }
}
