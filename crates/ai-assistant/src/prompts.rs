//! Prompt templates for the five tools.
//!
//! Each tool has a pure builder function taking its argument struct and
//! returning the full prompt string, plus a fixed sampling temperature.
//! The numbered analysis dimensions in each template are a contract with
//! callers; responses are expected to follow them.

use indoc::formatdoc;
use serde::Deserialize;

/// `pair` is the only tool whose temperature a caller may override.
pub const PAIR_TEMPERATURE: f64 = 0.5;
pub const REVIEW_TEMPERATURE: f64 = 0.3;
pub const BRAINSTORM_TEMPERATURE: f64 = 0.7;
pub const REVIEW_PERFORMANCE_TEMPERATURE: f64 = 0.3;
pub const REVIEW_SECURITY_TEMPERATURE: f64 = 0.2;

#[derive(Debug, Deserialize)]
pub struct PairArgs {
    pub prompt: String,
}

/// Shared by `review`, `review_performance` and `review_security`; the three
/// tools take the same arguments and differ only in template.
#[derive(Debug, Deserialize)]
pub struct ReviewArgs {
    pub code: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Deserialize)]
pub struct BrainstormArgs {
    pub topic: String,
    #[serde(default)]
    pub constraints: String,
}

/// Free-form collaboration: the caller's prompt goes to the model as-is.
pub fn pair(args: &PairArgs) -> String {
    args.prompt.clone()
}

pub fn review(args: &ReviewArgs) -> String {
    let context = if args.context.is_empty() {
        "No additional context provided"
    } else {
        args.context.as_str()
    };
    formatdoc! {r#"
        Please provide a comprehensive code review for the following code.

        Context: {context}

        Code to review:
        ```
        {code}
        ```

        Please analyze:
        1. Code quality and readability
        2. Potential bugs or issues
        3. Performance considerations
        4. Security concerns
        5. Best practices and improvements
        6. Overall architecture and design

        Provide specific, actionable feedback with examples where appropriate."#,
        code = args.code,
    }
}

/// The constraints section is omitted entirely when no constraints are given.
pub fn brainstorm(args: &BrainstormArgs) -> String {
    let constraints = if args.constraints.is_empty() {
        String::new()
    } else {
        format!("Constraints/Requirements: {}\n\n", args.constraints)
    };
    formatdoc! {r#"
        Let's brainstorm creative ideas and solutions for: {topic}

        {constraints}Please provide:
        1. Multiple creative approaches or solutions
        2. Pros and cons of each approach
        3. Unconventional or innovative ideas
        4. Practical implementation considerations
        5. Potential challenges and how to address them

        Be creative and think outside the box!"#,
        topic = args.topic,
    }
}

pub fn review_performance(args: &ReviewArgs) -> String {
    let context = if args.context.is_empty() {
        "General purpose usage"
    } else {
        args.context.as_str()
    };
    formatdoc! {r#"
        Please analyze the following code for performance issues and optimization opportunities.

        Usage context: {context}

        Code to analyze:
        ```
        {code}
        ```

        Please identify:
        1. Performance bottlenecks
        2. Time complexity analysis
        3. Space complexity concerns
        4. Optimization opportunities
        5. Caching strategies
        6. Algorithm improvements
        7. Resource usage concerns

        Provide specific recommendations with code examples where applicable."#,
        code = args.code,
    }
}

pub fn review_security(args: &ReviewArgs) -> String {
    let context = if args.context.is_empty() {
        "Standard security requirements"
    } else {
        args.context.as_str()
    };
    formatdoc! {r#"
        Please perform a security-focused review of the following code.

        Security context: {context}

        Code to analyze:
        ```
        {code}
        ```

        Please identify:
        1. Security vulnerabilities (injection, XSS, etc.)
        2. Authentication/authorization issues
        3. Data validation concerns
        4. Cryptographic weaknesses
        5. Information disclosure risks
        6. OWASP Top 10 considerations
        7. Security best practices violations

        Provide specific vulnerabilities with severity levels and remediation recommendations."#,
        code = args.code,
    }
}
