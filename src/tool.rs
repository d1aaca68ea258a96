//! Support tools and the registry that dispatches them.
//!
//! Tools are described to the language model as function declarations; the
//! model selects them by name at runtime. [`ToolRegistry`] is an explicit
//! dispatch table, so a request for an unregistered name is a
//! [`SupportError::UnknownTool`] rather than a silent no-op.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;

use crate::error::{Result, SupportError};
use crate::knowledge::{DEFAULT_SEARCH_K, KnowledgeBase};
use crate::model::FunctionDeclaration;

/// Sentinel returned when a knowledge search matches nothing.
pub const NO_RESULTS_SENTINEL: &str = "No relevant information found in the knowledge base.";

/// A named callable action exposed to the language model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model dispatches on.
    fn name(&self) -> &str;

    /// Natural-language purpose shown to the model.
    fn description(&self) -> &str;

    /// JSON schema of the tool's arguments.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the model-supplied arguments.
    async fn execute(&self, args: Value) -> Result<String>;
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| SupportError::Tool(format!("missing required '{key}' parameter")))
}

/// A name → handler dispatch table for the fixed tool set.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the standard customer-support tool set, wiring the knowledge
    /// base into the search tool explicitly.
    pub fn support_tools(knowledge: Arc<KnowledgeBase>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SearchKnowledgeBaseTool::new(knowledge)));
        registry.register(Arc::new(GetCustomerInfoTool));
        registry.register(Arc::new(CreateSupportTicketTool));
        registry.register(Arc::new(EscalateIssueTool));
        registry.register(Arc::new(ProvideSolutionStepsTool));
        registry
    }

    /// Register a tool. A later registration under the same name replaces
    /// the earlier one in both the dispatch table and the declarations.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        if let Some(&index) = self.by_name.get(tool.name()) {
            self.tools[index] = tool;
        } else {
            self.by_name.insert(tool.name().to_string(), self.tools.len());
            self.tools.push(tool);
        }
    }

    /// Function declarations for every registered tool, in registration order.
    pub fn declarations(&self) -> Vec<FunctionDeclaration> {
        self.tools
            .iter()
            .map(|tool| FunctionDeclaration {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute the named tool with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns [`SupportError::UnknownTool`] if no tool is registered under
    /// `name`; otherwise whatever error the tool body raises.
    pub async fn dispatch(&self, name: &str, args: Value) -> Result<String> {
        let tool = self
            .by_name
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| SupportError::UnknownTool(name.to_string()))?;

        info!(tool = name, "dispatching tool");
        tool.execute(args).await
    }
}

// ── search_knowledge_base ──────────────────────────────────────────

/// Retrieval tool over the knowledge base.
pub struct SearchKnowledgeBaseTool {
    knowledge: Arc<KnowledgeBase>,
}

impl SearchKnowledgeBaseTool {
    /// Create the tool over an explicit knowledge base handle.
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }
}

#[async_trait]
impl Tool for SearchKnowledgeBaseTool {
    fn name(&self) -> &str {
        "search_knowledge_base"
    }

    fn description(&self) -> &str {
        "Search the knowledge base for customer support information"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to find relevant support information"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let query = required_str(&args, "query")?;
        let results = self.knowledge.search(query, DEFAULT_SEARCH_K).await;
        if results.is_empty() {
            Ok(NO_RESULTS_SENTINEL.to_string())
        } else {
            Ok(format!("Found relevant information:\n{}", results.join("\n\n")))
        }
    }
}

// ── get_customer_info ──────────────────────────────────────────────

/// CRM lookup stub; a real deployment integrates the actual CRM here.
pub struct GetCustomerInfoTool;

#[async_trait]
impl Tool for GetCustomerInfoTool {
    fn name(&self) -> &str {
        "get_customer_info"
    }

    fn description(&self) -> &str {
        "Get customer info from the CRM system"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "customer_id": {
                    "type": "string",
                    "description": "The customer's identifier"
                }
            },
            "required": ["customer_id"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let customer_id = required_str(&args, "customer_id")?;
        Ok(format!(
            "Customer ID {customer_id}: Basic customer information retrieved. \
             For detailed info, please check the CRM system."
        ))
    }
}

// ── create_support_ticket ──────────────────────────────────────────

/// Ticket creation stub.
///
/// Ticket identifiers are derived from a hash of the issue text modulo
/// 10000 and are not globally unique; the eventual ticketing integration
/// must mint its own identifiers.
pub struct CreateSupportTicketTool;

fn ticket_id(issue: &str) -> String {
    let mut hasher = DefaultHasher::new();
    issue.hash(&mut hasher);
    format!("TKT-{:04}", hasher.finish() % 10000)
}

#[async_trait]
impl Tool for CreateSupportTicketTool {
    fn name(&self) -> &str {
        "create_support_ticket"
    }

    fn description(&self) -> &str {
        "Create a support ticket for a customer issue"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "issue": {
                    "type": "string",
                    "description": "Description of the customer's issue"
                },
                "priority": {
                    "type": "string",
                    "description": "Ticket priority (low, medium, high); defaults to medium"
                }
            },
            "required": ["issue"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let issue = required_str(&args, "issue")?;
        let priority = args.get("priority").and_then(|v| v.as_str()).unwrap_or("medium");
        Ok(format!(
            "Support ticket created: {}\nIssue: {issue}\nPriority: {priority}\nStatus: Open",
            ticket_id(issue)
        ))
    }
}

// ── escalate_issue ─────────────────────────────────────────────────

/// Escalation acknowledgement carrying the call-time timestamp.
pub struct EscalateIssueTool;

#[async_trait]
impl Tool for EscalateIssueTool {
    fn name(&self) -> &str {
        "escalate_issue"
    }

    fn description(&self) -> &str {
        "Escalate a customer issue to higher priority"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "issue": {
                    "type": "string",
                    "description": "Description of the issue being escalated"
                },
                "reason": {
                    "type": "string",
                    "description": "Why the issue needs escalation"
                }
            },
            "required": ["issue", "reason"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let issue = required_str(&args, "issue")?;
        let reason = required_str(&args, "reason")?;
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        Ok(format!(
            "Issue escalated successfully.\nIssue: {issue}\nReason: {reason}\n\
             Escalation timestamp: {timestamp}"
        ))
    }
}

// ── provide_solution_steps ─────────────────────────────────────────

/// Generic troubleshooting template parameterized by the problem text.
pub struct ProvideSolutionStepsTool;

#[async_trait]
impl Tool for ProvideSolutionStepsTool {
    fn name(&self) -> &str {
        "provide_solution_steps"
    }

    fn description(&self) -> &str {
        "Provide solution steps for a customer problem"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "problem": {
                    "type": "string",
                    "description": "The problem to provide steps for"
                }
            },
            "required": ["problem"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let problem = required_str(&args, "problem")?;
        Ok(format!(
            "Here are the steps to resolve: {problem}\n\
             1. First, try the basic troubleshooting\n\
             2. If that doesn't work, check the advanced options\n\
             3. Contact support if the issue persists"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ticket_ids_are_deterministic_per_issue() {
        let tool = CreateSupportTicketTool;
        let first = tool.execute(json!({"issue": "login broken"})).await.unwrap();
        let second = tool.execute(json!({"issue": "login broken"})).await.unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("Support ticket created: TKT-"));
        assert!(first.contains("Priority: medium"));
        assert!(first.ends_with("Status: Open"));
    }

    #[tokio::test]
    async fn ticket_priority_can_be_overridden() {
        let tool = CreateSupportTicketTool;
        let out = tool.execute(json!({"issue": "outage", "priority": "high"})).await.unwrap();
        assert!(out.contains("Priority: high"));
    }

    #[tokio::test]
    async fn missing_required_argument_is_a_tool_error() {
        let tool = CreateSupportTicketTool;
        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, SupportError::Tool(_)));
    }

    #[tokio::test]
    async fn escalation_carries_a_timestamp() {
        let tool = EscalateIssueTool;
        let out = tool
            .execute(json!({"issue": "refund stuck", "reason": "customer is a VIP"}))
            .await
            .unwrap();
        assert!(out.starts_with("Issue escalated successfully."));
        assert!(out.contains("Escalation timestamp: "));
    }

    #[tokio::test]
    async fn solution_steps_echo_the_problem() {
        let tool = ProvideSolutionStepsTool;
        let out = tool.execute(json!({"problem": "printer offline"})).await.unwrap();
        assert!(out.starts_with("Here are the steps to resolve: printer offline"));
        assert!(out.contains("3. Contact support if the issue persists"));
    }

    #[tokio::test]
    async fn unknown_tool_dispatch_is_an_error() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(GetCustomerInfoTool));

        let err = registry.dispatch("no_such_tool", json!({})).await.unwrap_err();
        assert!(matches!(err, SupportError::UnknownTool(name) if name == "no_such_tool"));
    }

    struct CannedTool {
        name: &'static str,
        reply: &'static str,
    }

    #[async_trait]
    impl Tool for CannedTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "canned reply"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _args: Value) -> Result<String> {
            Ok(self.reply.to_string())
        }
    }

    #[tokio::test]
    async fn reregistering_a_name_replaces_the_earlier_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CannedTool { name: "echo", reply: "first" }));
        registry.register(Arc::new(CannedTool { name: "echo", reply: "second" }));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.declarations().len(), 1);
        assert_eq!(registry.dispatch("echo", json!({})).await.unwrap(), "second");
    }

    #[test]
    fn declarations_follow_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(GetCustomerInfoTool));
        registry.register(Arc::new(EscalateIssueTool));

        let declarations = registry.declarations();
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0].name, "get_customer_info");
        assert_eq!(declarations[1].name, "escalate_issue");
        assert_eq!(declarations[1].parameters["required"], json!(["issue", "reason"]));
    }
}
