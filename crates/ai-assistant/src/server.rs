//! Tool dispatch: argument validation and defaulting, prompt construction,
//! the backend call, and normalization of every failure into a protocol
//! error. This is the only part of the system with decision logic.

use indoc::formatdoc;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorCode, ErrorData, Implementation,
    JsonObject, ListToolsResult, PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::catalog::tool_catalog;
use crate::config::Config;
use crate::prompts;
use crate::providers::{OpenRouterProvider, ProviderError};

/// The five tools, as a closed set. Dispatch is an exhaustive match, so
/// adding a tool makes the compiler point at every site that needs updating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Pair,
    Review,
    Brainstorm,
    ReviewPerformance,
    ReviewSecurity,
}

impl ToolKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pair" => Some(Self::Pair),
            "review" => Some(Self::Review),
            "brainstorm" => Some(Self::Brainstorm),
            "review_performance" => Some(Self::ReviewPerformance),
            "review_security" => Some(Self::ReviewSecurity),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pair => "pair",
            Self::Review => "review",
            Self::Brainstorm => "brainstorm",
            Self::ReviewPerformance => "review_performance",
            Self::ReviewSecurity => "review_security",
        }
    }
}

/// Per-call failure. Everything here is normalized to a single protocol
/// error shape at the handler boundary; nothing propagates unnormalized.
#[derive(Error, Debug)]
pub enum CallError {
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArgument { tool: &'static str, reason: String },

    #[error("Model '{alias}' not available. Available models: {available}")]
    UnknownModel { alias: String, available: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Arguments recognized on every tool in addition to its own schema.
/// `temperature` only takes effect for `pair`; the other tools use a fixed
/// value reflecting their character.
#[derive(Debug, Deserialize)]
struct CommonParams {
    model: Option<String>,
    temperature: Option<f64>,
}

pub struct AssistantServer {
    config: Config,
    provider: OpenRouterProvider,
    tools: Vec<Tool>,
}

impl AssistantServer {
    pub fn new(config: Config, provider: OpenRouterProvider) -> Self {
        let tools = tool_catalog(&config);
        Self {
            config,
            provider,
            tools,
        }
    }

    /// Handles one `tools/call` request: resolve the tool name, dispatch,
    /// and wrap the outcome for the protocol. Every failure leaves here as
    /// an [`ErrorData`]; nothing propagates unnormalized.
    pub async fn handle_call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        let requested_model = arguments
            .as_ref()
            .and_then(|args| args.get("model"))
            .and_then(Value::as_str)
            .unwrap_or(&self.config.default_model)
            .to_string();
        tracing::info!("Tool called: {} with model: {}", name, requested_model);

        let kind = ToolKind::from_name(name).ok_or_else(|| {
            ErrorData::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("Tool '{}' not found", name),
                None,
            )
        })?;

        match self.dispatch(kind, arguments).await {
            Ok(text) => {
                tracing::info!(
                    "Tool {} completed successfully using model {}",
                    name,
                    requested_model
                );
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => {
                tracing::error!("Error in tool {}: {}", name, e);
                Err(normalize(e))
            }
        }
    }

    /// Runs one tool call end to end: apply defaults, resolve the model,
    /// build the prompt, call the backend. Public so tests can drive calls
    /// without a protocol transport.
    pub async fn dispatch(
        &self,
        kind: ToolKind,
        arguments: Option<JsonObject>,
    ) -> Result<String, CallError> {
        let args = Value::Object(arguments.unwrap_or_default());
        let common: CommonParams = parse_args(kind, &args)?;

        let alias = common
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);
        let model = self
            .config
            .resolve(alias)
            .ok_or_else(|| CallError::UnknownModel {
                alias: alias.to_string(),
                available: self.config.model_list(),
            })?;

        let (prompt, temperature) = match kind {
            ToolKind::Pair => {
                let pair_args: prompts::PairArgs = parse_args(kind, &args)?;
                require_non_empty(kind, "prompt", &pair_args.prompt)?;
                let temperature = common.temperature.unwrap_or(prompts::PAIR_TEMPERATURE);
                (prompts::pair(&pair_args), temperature)
            }
            ToolKind::Review => {
                let review_args: prompts::ReviewArgs = parse_args(kind, &args)?;
                require_non_empty(kind, "code", &review_args.code)?;
                (prompts::review(&review_args), prompts::REVIEW_TEMPERATURE)
            }
            ToolKind::Brainstorm => {
                let brainstorm_args: prompts::BrainstormArgs = parse_args(kind, &args)?;
                require_non_empty(kind, "topic", &brainstorm_args.topic)?;
                (
                    prompts::brainstorm(&brainstorm_args),
                    prompts::BRAINSTORM_TEMPERATURE,
                )
            }
            ToolKind::ReviewPerformance => {
                let review_args: prompts::ReviewArgs = parse_args(kind, &args)?;
                require_non_empty(kind, "code", &review_args.code)?;
                (
                    prompts::review_performance(&review_args),
                    prompts::REVIEW_PERFORMANCE_TEMPERATURE,
                )
            }
            ToolKind::ReviewSecurity => {
                let review_args: prompts::ReviewArgs = parse_args(kind, &args)?;
                require_non_empty(kind, "code", &review_args.code)?;
                (
                    prompts::review_security(&review_args),
                    prompts::REVIEW_SECURITY_TEMPERATURE,
                )
            }
        };

        let text = self.provider.generate(&prompt, model, temperature).await?;
        Ok(text)
    }
}

fn parse_args<T: DeserializeOwned>(kind: ToolKind, args: &Value) -> Result<T, CallError> {
    serde_json::from_value(args.clone()).map_err(|e| CallError::InvalidArgument {
        tool: kind.name(),
        reason: e.to_string(),
    })
}

fn require_non_empty(kind: ToolKind, name: &'static str, value: &str) -> Result<(), CallError> {
    if value.trim().is_empty() {
        return Err(CallError::InvalidArgument {
            tool: kind.name(),
            reason: format!("'{}' must be a non-empty string", name),
        });
    }
    Ok(())
}

fn normalize(error: CallError) -> ErrorData {
    ErrorData::new(ErrorCode::INTERNAL_ERROR, error.to_string(), None)
}

impl ServerHandler for AssistantServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = formatdoc! {"
            AI assistant tools backed by configurable OpenRouter models.

            Use pair for free-form collaboration, review for a comprehensive
            code review, brainstorm to explore ideas, and review_performance /
            review_security for focused analysis. Every tool takes an optional
            model argument; configured models: {models}.",
            models = self.config.model_list(),
        };

        let mut server_info = Implementation::default();
        server_info.name = "ai-assistant".to_string();
        server_info.version = env!("CARGO_PKG_VERSION").to_owned();
        server_info.title = None;
        server_info.description = None;
        server_info.icons = None;
        server_info.website_url = None;

        let mut info = ServerInfo::default();
        info.server_info = server_info;
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.instructions = Some(instructions);
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        tracing::debug!("list_tools called");
        Ok(ListToolsResult {
            tools: self.tools.clone(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.handle_call(&request.name, request.arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelEntry;
    use std::collections::BTreeMap;

    fn test_config() -> Config {
        let mut models = BTreeMap::new();
        models.insert(
            "Gemini".to_string(),
            ModelEntry {
                model_id: "google/gemini-2.5-pro".to_string(),
                max_tokens: 4096,
                supports_images: false,
            },
        );
        Config {
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            default_model: "Gemini".to_string(),
            models,
        }
    }

    fn test_server() -> AssistantServer {
        let provider =
            OpenRouterProvider::with_host("http://localhost:9".to_string(), "test-key".to_string())
                .expect("provider should build");
        AssistantServer::new(test_config(), provider)
    }

    #[test]
    fn test_tool_kind_round_trips_all_names() {
        for name in [
            "pair",
            "review",
            "brainstorm",
            "review_performance",
            "review_security",
        ] {
            let kind = ToolKind::from_name(name).expect("known tool");
            assert_eq!(kind.name(), name);
        }
        assert!(ToolKind::from_name("write_poetry").is_none());
    }

    #[test]
    fn test_unknown_model_error_message() {
        let err = CallError::UnknownModel {
            alias: "NoSuchModel".to_string(),
            available: "Claude, Gemini".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Model 'NoSuchModel' not available. Available models: Claude, Gemini"
        );
    }

    #[test]
    fn test_normalize_uses_internal_error_code() {
        let err = CallError::InvalidArgument {
            tool: "review",
            reason: "missing field `code`".to_string(),
        };
        let data = normalize(err);
        assert_eq!(data.code, ErrorCode::INTERNAL_ERROR);
        assert!(data.message.contains("review"));
        assert!(data.message.contains("missing field"));
    }

    #[test]
    fn test_server_creation() {
        let server = test_server();
        assert_eq!(server.tools.len(), 5);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_method_not_found() {
        let server = test_server();
        let err = server
            .handle_call("write_poetry", None)
            .await
            .expect_err("unknown tool must be rejected");
        assert_eq!(err.code, ErrorCode::METHOD_NOT_FOUND);
        assert_eq!(err.message, "Tool 'write_poetry' not found");
    }

    #[test]
    fn test_get_info() {
        let server = test_server();
        let info = server.get_info();
        assert_eq!(info.server_info.name, "ai-assistant");
        assert_eq!(info.server_info.version, "1.0.0");
        assert!(info.capabilities.tools.is_some());
        let instructions = info.instructions.expect("instructions should be set");
        assert!(instructions.contains("Gemini"));
    }
}
