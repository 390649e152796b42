//! Interactive chat loop.

use std::path::Path;
use std::sync::Arc;

use buddy_chat::{ChatController, ChatError, SessionStore, StoreEvent, TurnOutcome};
use buddy_client::{BackendClient, ClientError, ResumeUpload};
use buddy_core::{ChatMessage, ChatRole, ChatSession};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

const HELP: &str = "\
Commands:
  /new            start a new chat
  /list           list chats
  /switch <n>     switch to chat number n
  /reset          clear the current chat
  /delete         delete the current chat
  /resume <path>  upload a PDF resume
  /jd <text>      provide a job description
  /help           show this help
  /quit           exit";

/// A parsed line of REPL input.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Message(&'a str),
    New,
    List,
    Switch(usize),
    Reset,
    Delete,
    Resume(&'a str),
    JobDescription(&'a str),
    Help,
    Quit,
    Empty,
    Unknown(&'a str),
}

impl<'a> Input<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Input::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Input::Message(line);
        };
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };
        match (name, arg) {
            ("new", _) => Input::New,
            ("list", _) => Input::List,
            ("switch", n) => n.parse().map(Input::Switch).unwrap_or(Input::Unknown(line)),
            ("reset", _) => Input::Reset,
            ("delete", _) => Input::Delete,
            ("resume", path) if !path.is_empty() => Input::Resume(path),
            ("jd", text) if !text.is_empty() => Input::JobDescription(text),
            ("help", _) => Input::Help,
            ("quit" | "exit", _) => Input::Quit,
            _ => Input::Unknown(line),
        }
    }
}

/// Run the REPL until `/quit` or end of input.
pub async fn run(
    store: SessionStore,
    backend: BackendClient,
    config: buddy_chat::ChatConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut events = store.subscribe();
    let controller = ChatController::new(store, Arc::new(backend), config);

    // Typing indicator, driven by store events.
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(StoreEvent::MessageAppended { pending: true, .. }) => {
                    println!("  Interview Buddy is typing...");
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    });

    print_history(&controller).await;
    println!("Type a message, or /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Input::parse(&line) {
            Input::Empty => {}
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::Message(text) => send(&controller, text).await,
            Input::New => {
                let session = controller.create_session().await;
                println!("Started {}", session.title);
                print_history(&controller).await;
            }
            Input::List => {
                let store = controller.store();
                let store = store.lock().await;
                print_sessions(store.sessions(), store.current_session_id());
            }
            Input::Switch(n) => {
                let id = {
                    let store = controller.store();
                    let store = store.lock().await;
                    n.checked_sub(1)
                        .and_then(|i| store.sessions().get(i))
                        .map(|s| s.id.clone())
                };
                let selected = match id {
                    Some(id) => controller.select_session(&id).await,
                    None => false,
                };
                if selected {
                    print_history(&controller).await;
                } else {
                    println!("No chat number {n}. Use /list to see chats.");
                }
            }
            Input::Reset => match controller.reset_current_session().await {
                Ok(()) => print_history(&controller).await,
                Err(e) => println!("Error: {e}"),
            },
            Input::Delete => {
                let current = controller.store().lock().await.current_session_id().cloned();
                if let Some(id) = current {
                    controller.delete_session(&id).await;
                    println!("Chat deleted.");
                    print_history(&controller).await;
                }
            }
            Input::Resume(path) => match ResumeUpload::from_path(Path::new(path)).await {
                Ok(upload) => {
                    report_upload(controller.upload_resume(upload).await, "Resume upload failed")
                }
                Err(e) => println!("Error: {e}"),
            },
            Input::JobDescription(text) => report_upload(
                controller.upload_job_description(text).await,
                "Job description upload failed",
            ),
            Input::Unknown(input) => println!("Unknown command: {input}. Try /help."),
        }
    }
    Ok(())
}

async fn send(controller: &ChatController<BackendClient>, text: &str) {
    match controller.send_message(text).await {
        Ok(TurnOutcome::Delivered {
            session_id,
            message_id,
        }) => {
            let store = controller.store();
            let store = store.lock().await;
            let reply = store
                .session(&session_id)
                .and_then(|s| s.messages.iter().find(|m| m.id == message_id));
            if let Some(message) = reply {
                print_message(message);
            }
        }
        Ok(TurnOutcome::Discarded { .. }) => {}
        Err(e) => println!("Error: {e}"),
    }
}

fn report_upload(result: Result<String, ChatError>, fallback: &str) {
    match result {
        Ok(reply) => println!("Interview Buddy: {reply}"),
        Err(ChatError::Backend(e @ ClientError::Backend { .. })) => {
            println!("Error: {}", e.detail_or(fallback))
        }
        Err(e) => println!("Error: {e}"),
    }
}

async fn print_history(controller: &ChatController<BackendClient>) {
    let store = controller.store();
    let store = store.lock().await;
    if let Some(session) = store.current_session() {
        println!("--- {} ---", session.title);
        for message in &session.messages {
            print_message(message);
        }
    }
}

fn print_message(message: &ChatMessage) {
    let speaker = match message.role {
        ChatRole::User => "You",
        ChatRole::Assistant => "Interview Buddy",
    };
    println!("{speaker}: {}", message.content);
}

/// Print a numbered session table, marking the current one.
pub fn print_sessions(sessions: &[ChatSession], current: Option<&buddy_core::SessionId>) {
    println!("Chats ({}):", sessions.len());
    println!("{:<4}  {:<20}  {:<8}  {}", "#", "TITLE", "MESSAGES", "CREATED");
    println!("{}", "-".repeat(60));

    for (i, session) in sessions.iter().enumerate() {
        let marker = if Some(&session.id) == current { "*" } else { " " };
        let created = session
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M");
        println!(
            "{marker}{:<3}  {:<20}  {:<8}  {}",
            i + 1,
            session.title,
            session.messages.len(),
            created
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(Input::parse("  hello there "), Input::Message("hello there"));
        assert_eq!(Input::parse("   "), Input::Empty);
    }

    #[test]
    fn test_commands() {
        assert_eq!(Input::parse("/new"), Input::New);
        assert_eq!(Input::parse("/list"), Input::List);
        assert_eq!(Input::parse("/switch 2"), Input::Switch(2));
        assert_eq!(Input::parse("/reset"), Input::Reset);
        assert_eq!(Input::parse("/delete"), Input::Delete);
        assert_eq!(Input::parse("/quit"), Input::Quit);
        assert_eq!(Input::parse("/resume ~/cv.pdf"), Input::Resume("~/cv.pdf"));
        assert_eq!(
            Input::parse("/jd Senior Rust engineer, distributed systems"),
            Input::JobDescription("Senior Rust engineer, distributed systems")
        );
    }

    #[test]
    fn test_malformed_commands_are_unknown() {
        assert_eq!(Input::parse("/switch two"), Input::Unknown("/switch two"));
        assert_eq!(Input::parse("/resume"), Input::Unknown("/resume"));
        assert_eq!(Input::parse("/dance"), Input::Unknown("/dance"));
    }
}
