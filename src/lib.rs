//! Retrieval-augmented customer support agent.
//!
//! This crate combines a document ingestion pipeline (load → chunk →
//! embed → store) with a tool-calling conversation loop. The
//! [`KnowledgeBase`] manages the persistent vector collection, the
//! [`ToolRegistry`] exposes a fixed set of support actions to the
//! language model, and the [`SupportAgent`] drives per-session
//! conversations that may invoke those tools.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use support_rag::{
//!     Config, DiskVectorStore, GeminiChatModel, GeminiEmbeddingProvider,
//!     KnowledgeBase, RecursiveChunker, SupportAgent, ToolRegistry,
//! };
//!
//! let config = Config::from_env()?;
//! let embedder = Arc::new(GeminiEmbeddingProvider::new(&config.api_key)?);
//! let store = Arc::new(DiskVectorStore::open(&config.persist_dir, embedder.dimensions()).await?);
//! let knowledge = Arc::new(KnowledgeBase::new(
//!     store,
//!     embedder,
//!     Arc::new(RecursiveChunker::default()),
//!     &config.persist_dir,
//! ));
//!
//! let model = GeminiChatModel::new(&config.api_key, &config.model)?;
//! let tools = ToolRegistry::support_tools(knowledge.clone());
//! let mut agent = SupportAgent::new(Arc::new(model), tools, config.temperature, config.max_output_tokens);
//!
//! knowledge.ingest(&[faq_path]).await;
//! let answer = agent.process_message("How do I reset my password?").await;
//! ```

pub mod agent;
pub mod chunking;
pub mod config;
pub mod console;
pub mod disk;
pub mod document;
pub mod embedding;
pub mod error;
pub mod gemini;
pub mod knowledge;
pub mod loader;
pub mod model;
pub mod tool;
pub mod vectorstore;

pub use agent::{AgentStatus, ChatMessage, MessageRole, SupportAgent};
pub use chunking::{Chunker, FixedSizeChunker, RecursiveChunker};
pub use config::Config;
pub use disk::DiskVectorStore;
pub use document::{Chunk, Document, DocumentFormat, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{Result, SupportError};
pub use gemini::{GeminiChatModel, GeminiEmbeddingProvider};
pub use knowledge::{KnowledgeBase, KnowledgeBaseStats};
pub use model::{ChatModel, Content, FunctionCall, FunctionDeclaration, FunctionResponse, Part};
pub use tool::{Tool, ToolRegistry};
pub use vectorstore::VectorStore;
