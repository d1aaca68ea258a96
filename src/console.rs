//! Interactive console front end.
//!
//! A thin REPL over the [`SupportAgent`] and [`KnowledgeBase`]: commands
//! manage the knowledge base and session, and any other input is treated
//! as a chat turn.

use std::path::PathBuf;
use std::sync::Arc;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::agent::{MessageRole, SupportAgent};
use crate::knowledge::{DEFAULT_SEARCH_K, KnowledgeBase};

const HELP_TEXT: &str = "\
Available commands:

Chat:
  <message>            chat with the support agent
  clear                clear conversation history
  history              show conversation history

Knowledge base:
  upload <path>        ingest a document (.txt, .md, .pdf, .csv)
  search <query>       search the knowledge base
  kb_info              show knowledge base information
  clear_kb             clear the knowledge base

System:
  status               show agent and knowledge base status
  help                 show this help message
  quit | exit          leave the console
";

/// Run the console loop until `quit`/`exit` or end of input.
pub async fn run(agent: &mut SupportAgent, knowledge: &Arc<KnowledgeBase>) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("Customer support agent ready. Type 'help' for commands.");

    loop {
        let line = match editor.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        editor.add_history_entry(input)?;

        let (command, argument) = match input.split_once(char::is_whitespace) {
            Some((head, rest)) => (head.to_ascii_lowercase(), rest.trim()),
            None => (input.to_ascii_lowercase(), ""),
        };

        match command.as_str() {
            "quit" | "exit" => break,
            "help" => print!("{HELP_TEXT}"),
            "status" => show_status(agent, knowledge).await,
            "clear" => {
                agent.clear();
                println!("Conversation history cleared.");
            }
            "history" => show_history(agent),
            "kb_info" => {
                let stats = knowledge.stats().await;
                println!(
                    "Knowledge base: {} chunks stored in {}",
                    stats.total_chunks,
                    stats.storage_location.display()
                );
            }
            "clear_kb" => {
                if knowledge.reset().await {
                    println!("Knowledge base cleared.");
                } else {
                    println!("Failed to clear knowledge base.");
                }
            }
            "upload" if !argument.is_empty() => upload(knowledge, argument).await,
            "search" if !argument.is_empty() => search(knowledge, argument).await,
            _ => {
                let answer = agent.process_message(input).await;
                println!("agent> {answer}");
            }
        }
    }

    println!("Goodbye.");
    Ok(())
}

async fn upload(knowledge: &Arc<KnowledgeBase>, path: &str) {
    let path = PathBuf::from(path);
    if !path.exists() {
        println!("File not found: {}", path.display());
        return;
    }
    if knowledge.ingest(std::slice::from_ref(&path)).await {
        println!("Document uploaded.");
    } else {
        println!("Failed to upload document.");
    }
}

async fn search(knowledge: &Arc<KnowledgeBase>, query: &str) {
    let results = knowledge.search(query, DEFAULT_SEARCH_K).await;
    if results.is_empty() {
        println!("No relevant results found.");
        return;
    }
    println!("Found {} result(s):", results.len());
    for (i, result) in results.iter().enumerate() {
        let preview: String = result.chars().take(200).collect();
        println!("{}. {preview}", i + 1);
    }
}

async fn show_status(agent: &SupportAgent, knowledge: &Arc<KnowledgeBase>) {
    let status = agent.status();
    let stats = knowledge.stats().await;
    println!("Agent:");
    println!("  model:             {}", status.model);
    println!("  temperature:       {}", status.temperature);
    println!("  max output tokens: {}", status.max_output_tokens);
    println!("  memory length:     {}", status.memory_length);
    println!("  tools available:   {}", status.tool_count);
    println!("Knowledge base:");
    println!("  chunks:            {}", stats.total_chunks);
    println!("  storage:           {}", stats.storage_location.display());
}

fn show_history(agent: &SupportAgent) {
    let history = agent.history();
    if history.is_empty() {
        println!("No conversation history.");
        return;
    }
    for (i, message) in history.iter().enumerate() {
        let who = match message.role {
            MessageRole::User => "you",
            MessageRole::Agent => "agent",
        };
        println!("{}. {who}: {}", i + 1, message.content);
    }
}
