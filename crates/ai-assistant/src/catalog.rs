//! Static tool catalog, computed once at server construction.

use rmcp::model::Tool;
use rmcp::object;
use serde_json::{json, Value};

use crate::config::Config;

/// The `model` property is shared by every tool: its description enumerates
/// the configured aliases and its default is the configured default alias.
fn model_property(config: &Config) -> Value {
    json!({
        "type": "string",
        "description": format!("Model to use: {}", config.model_list()),
        "default": config.default_model,
    })
}

pub fn tool_catalog(config: &Config) -> Vec<Tool> {
    vec![
        Tool::new(
            "pair",
            "Collaborate with AI on any topic - ask questions, brainstorm ideas, or work through problems together".to_string(),
            object!({
                "type": "object",
                "properties": {
                    "prompt": {
                        "type": "string",
                        "description": "Your question or topic to discuss"
                    },
                    "model": model_property(config),
                    "temperature": {
                        "type": "number",
                        "description": "Response creativity (0.0-1.0)",
                        "default": 0.5
                    }
                },
                "required": ["prompt"]
            }),
        ),
        Tool::new(
            "review",
            "Get comprehensive code review with actionable feedback".to_string(),
            object!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "Code to review"
                    },
                    "context": {
                        "type": "string",
                        "description": "Additional context about the code",
                        "default": ""
                    },
                    "model": model_property(config)
                },
                "required": ["code"]
            }),
        ),
        Tool::new(
            "brainstorm",
            "Brainstorm creative solutions and explore ideas".to_string(),
            object!({
                "type": "object",
                "properties": {
                    "topic": {
                        "type": "string",
                        "description": "Topic to brainstorm about"
                    },
                    "constraints": {
                        "type": "string",
                        "description": "Any constraints or requirements",
                        "default": ""
                    },
                    "model": model_property(config)
                },
                "required": ["topic"]
            }),
        ),
        Tool::new(
            "review_performance",
            "Analyze code for performance issues and optimization opportunities".to_string(),
            object!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "Code to analyze for performance"
                    },
                    "context": {
                        "type": "string",
                        "description": "Context about expected usage patterns",
                        "default": ""
                    },
                    "model": model_property(config)
                },
                "required": ["code"]
            }),
        ),
        Tool::new(
            "review_security",
            "Security-focused code review to identify vulnerabilities".to_string(),
            object!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "Code to analyze for security issues"
                    },
                    "context": {
                        "type": "string",
                        "description": "Security context or requirements",
                        "default": ""
                    },
                    "model": model_property(config)
                },
                "required": ["code"]
            }),
        ),
    ]
}
