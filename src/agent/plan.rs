//! Prompts and plan parsing for the agent runner.

use crate::errors::AgentError;
use crate::util::strip_code_fences;

pub fn planning_prompt(goal: &str) -> String {
    format!(
        "You are an autonomous AI agent. Break the following goal down into 3 to 5 concrete, \
actionable steps.\n\
Goal: \"{goal}\"\n\n\
Return ONLY a JSON array of strings with the step descriptions, without any Markdown formatting.\n\
Example: [\"Research topic X\", \"Compare Y and Z\", \"Write a summary\"]"
    )
}

pub fn execution_prompt(goal: &str, task: &str, context: &str) -> String {
    let context = if context.is_empty() { "(none yet)" } else { context };
    format!(
        "You are an autonomous AI agent carrying out one step of a larger goal.\n\
Main goal: \"{goal}\"\n\
Current task: \"{task}\"\n\n\
Context from previous steps:\n{context}\n\n\
Complete the current task. Give a concise, concrete answer (at most 3 sentences) that summarizes \
what you found or did."
    )
}

/// Parse the planner's reply into step descriptions, in model order.
pub fn parse_plan(response: &str) -> Result<Vec<String>, AgentError> {
    let cleaned = strip_code_fences(response);
    let steps: Vec<String> =
        serde_json::from_str(&cleaned).map_err(|e| AgentError::PlanParse(e.to_string()))?;
    if steps.is_empty() {
        return Err(AgentError::EmptyPlan);
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let steps = parse_plan(r#"["Research A", "Research B", "Compare"]"#).unwrap();
        assert_eq!(steps, vec!["Research A", "Research B", "Compare"]);
    }

    #[test]
    fn test_parse_fenced_array() {
        let steps = parse_plan("```json\n[\"one\", \"two\"]\n```").unwrap();
        assert_eq!(steps, vec!["one", "two"]);
    }

    #[test]
    fn test_parse_rejects_prose() {
        let err = parse_plan("Sure! Here are the steps: 1. research").unwrap_err();
        assert!(matches!(err, AgentError::PlanParse(_)));
        assert!(err.to_string().starts_with("Invalid plan generated"));
    }

    #[test]
    fn test_parse_rejects_object_and_non_strings() {
        assert!(matches!(parse_plan(r#"{"steps": ["a"]}"#), Err(AgentError::PlanParse(_))));
        assert!(matches!(parse_plan("[1, 2]"), Err(AgentError::PlanParse(_))));
    }

    #[test]
    fn test_parse_rejects_empty_array() {
        assert!(matches!(parse_plan("[]"), Err(AgentError::EmptyPlan)));
    }

    #[test]
    fn test_prompts_carry_goal_task_and_context() {
        assert!(planning_prompt("Compare 3 competitors").contains("\"Compare 3 competitors\""));
        let prompt = execution_prompt("G", "T", "- Task: A\n  Result: B");
        assert!(prompt.contains("Main goal: \"G\""));
        assert!(prompt.contains("Current task: \"T\""));
        assert!(prompt.contains("- Task: A\n  Result: B"));
        assert!(execution_prompt("G", "T", "").contains("(none yet)"));
    }
}
