//! Interactive line-based chat loop.
//!
//! Each line is either a slash command or a message. A message runs a whole
//! turn before the next line is read, so turns never overlap.

use std::error::Error;
use std::io::Write;
use std::path::Path;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::settings::helpers::{format_bool, parse_bool};
use crate::cli::upload::upload_and_report;
use crate::core::chat_client::{ChatBackend, ChatClient};
use crate::core::config::ResolvedSettings;
use crate::core::controller::{ConversationController, TurnOutcome};
use crate::core::http::build_client;
use crate::core::upload::DocumentUploadClient;
use crate::ui::transcript::{print_history, print_message, print_trace};
use crate::utils::logging::LoggingState;

const CHAT_HELP: &str = "Chat commands:
  /help                Show this help
  /websearch [on|off]  Show or toggle web search
  /upload <path>       Upload a PDF to the knowledge base
  /log [file]          Start transcript logging, or pause/resume it
  /session             Show the session id
  /quit                Leave the chat";

#[derive(Debug, PartialEq, Eq)]
pub enum ChatInput {
    Empty,
    Message(String),
    Help,
    WebSearch(Option<String>),
    Upload(Option<String>),
    Log(Option<String>),
    Session,
    Quit,
    Unknown(String),
}

pub fn parse_input(line: &str) -> ChatInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ChatInput::Empty;
    }
    let Some(command_line) = trimmed.strip_prefix('/') else {
        return ChatInput::Message(trimmed.to_string());
    };

    let (command, rest) = match command_line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, Some(rest.trim().to_string())),
        None => (command_line, None),
    };
    let rest = rest.filter(|value| !value.is_empty());

    match command.to_lowercase().as_str() {
        "help" | "?" => ChatInput::Help,
        "websearch" | "web" => ChatInput::WebSearch(rest),
        "upload" => ChatInput::Upload(rest),
        "log" => ChatInput::Log(rest),
        "session" => ChatInput::Session,
        "quit" | "exit" | "q" => ChatInput::Quit,
        other => ChatInput::Unknown(other.to_string()),
    }
}

pub async fn run_chat(
    settings: ResolvedSettings,
    log_file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let http = build_client(settings.request_timeout)?;
    let uploads = DocumentUploadClient::new(http.clone(), settings.base_url.clone());
    let chat = ChatClient::new(http, settings.base_url.clone());

    let mut controller = ConversationController::new(chat).with_logging(LoggingState::new(log_file));
    controller.set_web_search_enabled(settings.web_search);

    println!("🤖 Agent chat ({})", settings.base_url);
    println!(
        "Web search: {}. Type /help for commands.",
        format_bool(controller.web_search_enabled())
    );
    println!();
    print_history(controller.messages())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse_input(&line) {
            ChatInput::Empty => {}
            ChatInput::Quit => break,
            ChatInput::Help => println!("{CHAT_HELP}"),
            ChatInput::Session => println!("Session: {}", controller.session_id()),
            ChatInput::WebSearch(value) => handle_web_search(&mut controller, value.as_deref()),
            ChatInput::Upload(Some(path)) => {
                upload_and_report(&uploads, Path::new(&path)).await;
            }
            ChatInput::Upload(None) => {
                eprintln!("⚠️  Please provide a PDF file: /upload <path>");
            }
            ChatInput::Log(arg) => handle_log(&mut controller, arg),
            ChatInput::Unknown(command) => {
                eprintln!("❓ Unknown command: /{command}. Type /help for commands.");
            }
            ChatInput::Message(text) => run_turn(&mut controller, &text).await?,
        }
    }

    Ok(())
}

async fn run_turn<B: ChatBackend>(
    controller: &mut ConversationController<B>,
    text: &str,
) -> Result<(), Box<dyn Error>> {
    let web_search = controller.web_search_enabled();
    let Some(pending) = controller.begin_turn(text, web_search) else {
        return Ok(());
    };

    eprintln!("Thinking...");
    let outcome = controller.resolve_turn(pending).await;

    if let Some(reply) = controller.messages().last() {
        print_message(reply)?;
    }
    match outcome {
        TurnOutcome::Completed { trace, .. } => print_trace(&trace)?,
        TurnOutcome::Failed { error, .. } => eprintln!("❌ {error}"),
        TurnOutcome::Ignored => {}
    }
    println!();
    Ok(())
}

fn handle_web_search<B: ChatBackend>(controller: &mut ConversationController<B>, value: Option<&str>) {
    let Some(value) = value else {
        println!(
            "Web search: {}",
            format_bool(controller.web_search_enabled())
        );
        return;
    };
    match parse_bool(value) {
        Some(enabled) => {
            controller.set_web_search_enabled(enabled);
            println!("🌐 Web search {}", format_bool(enabled));
        }
        None => eprintln!("❌ Invalid boolean value: {value}. Use 'on' or 'off'."),
    }
}

fn handle_log<B: ChatBackend>(controller: &mut ConversationController<B>, arg: Option<String>) {
    let result = match arg {
        Some(path) => controller.logging_mut().set_log_file(path),
        None => controller.logging_mut().toggle_logging(),
    };
    match result {
        Ok(message) => println!("{message}"),
        Err(err) => eprintln!("❌ {err}"),
    }
}
