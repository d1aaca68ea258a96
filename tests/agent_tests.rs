//! Conversation agent tests driven by a scripted in-process chat model.

use std::collections::VecDeque;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use support_rag::agent::{APOLOGY_MESSAGE, MAX_TOOL_ROUNDS, MessageRole, SupportAgent};
use support_rag::chunking::RecursiveChunker;
use support_rag::disk::DiskVectorStore;
use support_rag::embedding::EmbeddingProvider;
use support_rag::error::{Result, SupportError};
use support_rag::knowledge::KnowledgeBase;
use support_rag::model::{ChatModel, Content, FunctionCall, FunctionDeclaration, Part};
use support_rag::tool::{NO_RESULTS_SENTINEL, ToolRegistry};

const DIM: usize = 16;

/// Word-bucket embedder; deterministic stand-in for the real provider.
struct BagOfWordsEmbedder;

#[async_trait]
impl EmbeddingProvider for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; DIM];
        for word in text.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % DIM as u64) as usize] += 1.0;
        }
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

enum Step {
    Reply(Content),
    Fail,
}

/// A chat model that replays a fixed script of replies and failures.
struct ScriptedModel {
    steps: Mutex<VecDeque<Step>>,
}

impl ScriptedModel {
    fn new(steps: Vec<Step>) -> Self {
        Self { steps: Mutex::new(steps.into_iter().collect()) }
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted-model"
    }

    async fn generate(
        &self,
        _system_instruction: &str,
        _contents: &[Content],
        _tools: &[FunctionDeclaration],
    ) -> Result<Content> {
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(content)) => Ok(content),
            Some(Step::Fail) | None => Err(SupportError::Model {
                provider: "scripted".to_string(),
                message: "simulated model failure".to_string(),
            }),
        }
    }
}

fn tool_call(name: &str, args: serde_json::Value) -> Content {
    Content {
        role: support_rag::model::Role::Model,
        parts: vec![Part::FunctionCall {
            function_call: FunctionCall { name: name.to_string(), args },
        }],
    }
}

async fn empty_knowledge_base(dir: &tempfile::TempDir) -> Arc<KnowledgeBase> {
    let store = Arc::new(DiskVectorStore::open(dir.path(), DIM).await.unwrap());
    Arc::new(KnowledgeBase::new(
        store,
        Arc::new(BagOfWordsEmbedder),
        Arc::new(RecursiveChunker::new(120, 20)),
        dir.path(),
    ))
}

fn agent_with(model: ScriptedModel, tools: ToolRegistry) -> SupportAgent {
    SupportAgent::new(Arc::new(model), tools, 0.7, 4000)
}

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn search_tool_retrieves_at_most_two_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let knowledge = empty_knowledge_base(&dir).await;

    let paths: Vec<_> = (0..3)
        .map(|i| {
            write_file(&dir, &format!("note{i}.txt"), &format!("vpn gateway reconnect hint {i}"))
        })
        .collect();
    assert!(knowledge.ingest(&paths).await);

    let tools = ToolRegistry::support_tools(knowledge);
    let out = tools.dispatch("search_knowledge_base", json!({"query": "vpn gateway"})).await.unwrap();

    let body = out.strip_prefix("Found relevant information:\n").unwrap();
    assert_eq!(body.split("\n\n").count(), 2);
}

#[tokio::test]
async fn search_tool_on_empty_kb_returns_sentinel_and_turn_completes() {
    let dir = tempfile::tempdir().unwrap();
    let knowledge = empty_knowledge_base(&dir).await;
    let tools = ToolRegistry::support_tools(knowledge.clone());

    // The tool itself reports the sentinel when nothing is ingested.
    let sentinel =
        tools.dispatch("search_knowledge_base", json!({"query": "warp drive"})).await.unwrap();
    assert_eq!(sentinel, NO_RESULTS_SENTINEL);

    // A turn that calls the tool still finishes with a final answer.
    let model = ScriptedModel::new(vec![
        Step::Reply(tool_call("search_knowledge_base", json!({"query": "warp drive"}))),
        Step::Reply(Content::model_text("I could not find anything about that.")),
    ]);
    let mut agent = agent_with(model, ToolRegistry::support_tools(knowledge));

    let answer = agent.process_message("tell me about warp drives").await;
    assert_eq!(answer, "I could not find anything about that.");

    let history = agent.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, MessageRole::User);
    assert_eq!(history[1].role, MessageRole::Agent);
    assert_eq!(history[1].content, answer);
}

#[tokio::test]
async fn model_failure_yields_apology_recorded_in_history() {
    let dir = tempfile::tempdir().unwrap();
    let knowledge = empty_knowledge_base(&dir).await;
    let model = ScriptedModel::new(vec![Step::Fail]);
    let mut agent = agent_with(model, ToolRegistry::support_tools(knowledge));

    let answer = agent.process_message("hello?").await;
    assert_eq!(answer, APOLOGY_MESSAGE);

    let last = agent.history().last().unwrap();
    assert_eq!(last.role, MessageRole::Agent);
    assert_eq!(last.content, APOLOGY_MESSAGE);
}

#[tokio::test]
async fn unknown_tool_request_fails_the_turn_with_apology() {
    let dir = tempfile::tempdir().unwrap();
    let knowledge = empty_knowledge_base(&dir).await;
    let model = ScriptedModel::new(vec![Step::Reply(tool_call("teleport_customer", json!({})))]);
    let mut agent = agent_with(model, ToolRegistry::support_tools(knowledge));

    let answer = agent.process_message("beam me up").await;
    assert_eq!(answer, APOLOGY_MESSAGE);
}

#[tokio::test]
async fn runaway_tool_loop_is_capped() {
    let dir = tempfile::tempdir().unwrap();
    let knowledge = empty_knowledge_base(&dir).await;

    // A model that never stops requesting tools exhausts the round cap.
    let steps: Vec<Step> = (0..MAX_TOOL_ROUNDS + 1)
        .map(|_| Step::Reply(tool_call("provide_solution_steps", json!({"problem": "loops"}))))
        .collect();
    let model = ScriptedModel::new(steps);
    let mut agent = agent_with(model, ToolRegistry::support_tools(knowledge));

    let answer = agent.process_message("fix my loops").await;
    assert_eq!(answer, APOLOGY_MESSAGE);
}

#[tokio::test]
async fn tool_results_are_followed_by_a_final_answer() {
    let dir = tempfile::tempdir().unwrap();
    let knowledge = empty_knowledge_base(&dir).await;
    let model = ScriptedModel::new(vec![
        Step::Reply(tool_call(
            "create_support_ticket",
            json!({"issue": "cannot log in", "priority": "high"}),
        )),
        Step::Reply(Content::model_text("I created a high-priority ticket for your login issue.")),
    ]);
    let mut agent = agent_with(model, ToolRegistry::support_tools(knowledge));

    let answer = agent.process_message("I cannot log in, please open a ticket").await;
    assert!(answer.contains("ticket"));
    assert_eq!(agent.history().len(), 2);
}

#[tokio::test]
async fn clear_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let knowledge = empty_knowledge_base(&dir).await;
    let model = ScriptedModel::new(vec![Step::Reply(Content::model_text("hi there"))]);
    let mut agent = agent_with(model, ToolRegistry::support_tools(knowledge));

    agent.process_message("hi").await;
    assert!(!agent.history().is_empty());

    agent.clear();
    assert!(agent.history().is_empty());

    agent.clear();
    assert!(agent.history().is_empty());
}

#[tokio::test]
async fn status_reflects_configuration_and_state() {
    let dir = tempfile::tempdir().unwrap();
    let knowledge = empty_knowledge_base(&dir).await;
    let model = ScriptedModel::new(vec![Step::Reply(Content::model_text("hello"))]);
    let mut agent = agent_with(model, ToolRegistry::support_tools(knowledge));

    let status = agent.status();
    assert_eq!(status.model, "scripted-model");
    assert_eq!(status.temperature, 0.7);
    assert_eq!(status.max_output_tokens, 4000);
    assert_eq!(status.memory_length, 0);
    assert_eq!(status.tool_count, 5);

    agent.process_message("hi").await;
    assert_eq!(agent.status().memory_length, 2);
}
