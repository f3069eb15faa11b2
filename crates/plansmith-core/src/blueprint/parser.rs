//! Provider output parser with structural validation.
//!
//! Parses the text a provider produced into a [`BlueprintResponse`] and
//! validates:
//! - The text contains a JSON object (prose or code fences around it are
//!   tolerated).
//! - Every goal, phase, milestone, task and subtask has a non-empty title.
//!
//! Numeric and enumerated fields are not validated here; unusable values
//! were already dropped during deserialization and the schedule normalizer
//! supplies defaults.

use super::types::BlueprintResponse;
use crate::provider::ProviderError;

/// Parse and validate provider output.
pub fn parse_blueprint_response(text: &str) -> Result<BlueprintResponse, ProviderError> {
    let json = extract_json(text).ok_or_else(|| {
        ProviderError::Malformed(format!(
            "no JSON object found in provider output ({} bytes)",
            text.len()
        ))
    })?;

    let response: BlueprintResponse =
        serde_json::from_str(json).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    validate(&response)?;
    Ok(response)
}

/// Return the first balanced `{ ... }` object in `text`.
///
/// Braces inside JSON strings are ignored, so prose after the object (even
/// prose containing braces) is not swallowed.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn validate(response: &BlueprintResponse) -> Result<(), ProviderError> {
    for (g, goal) in response.goals.iter().enumerate() {
        require_title(&goal.title, || format!("goals[{g}]"))?;
        for (p, phase) in goal.phases.iter().enumerate() {
            require_title(&phase.title, || format!("goals[{g}].phases[{p}]"))?;
            for (m, milestone) in phase.milestones.iter().enumerate() {
                require_title(&milestone.title, || {
                    format!("goals[{g}].phases[{p}].milestones[{m}]")
                })?;
                for (t, task) in milestone.tasks.iter().enumerate() {
                    require_title(&task.title, || {
                        format!("goals[{g}].phases[{p}].milestones[{m}].tasks[{t}]")
                    })?;
                    for (s, subtask) in task.subtasks.iter().enumerate() {
                        require_title(&subtask.title, || {
                            format!(
                                "goals[{g}].phases[{p}].milestones[{m}].tasks[{t}].subtasks[{s}]"
                            )
                        })?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn require_title(title: &str, path: impl FnOnce() -> String) -> Result<(), ProviderError> {
    if title.trim().is_empty() {
        return Err(ProviderError::Contract(format!("{} has an empty title", path())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_object() {
        let response = parse_blueprint_response(
            r#"{"goals": [{"title": "Learn Rust", "archetype": "skill_acquisition"}]}"#,
        )
        .expect("should parse");
        assert_eq!(response.goals.len(), 1);
        assert_eq!(response.goals[0].archetype.as_deref(), Some("skill_acquisition"));
    }

    #[test]
    fn parse_fenced_object_with_prose() {
        let text = "Here is your plan:\n```json\n{\"goals\": [{\"title\": \"Meditate daily\"}]}\n```\nGood luck!";
        let response = parse_blueprint_response(text).expect("should parse");
        assert_eq!(response.goals[0].title, "Meditate daily");
    }

    #[test]
    fn trailing_braced_prose_is_ignored() {
        let text = r#"{"goals": [{"title": "Run a 10k"}]} Note: {see above}"#;
        let response = parse_blueprint_response(text).expect("should parse");
        assert_eq!(response.goals.len(), 1);
        assert_eq!(response.goals[0].title, "Run a 10k");
    }

    #[test]
    fn braces_inside_strings_do_not_end_the_object() {
        let text = r#"Plan: {"goals": [{"title": "Learn {Rust} \"fast\"", "notes": "}"}]} done"#;
        let response = parse_blueprint_response(text).expect("should parse");
        assert_eq!(response.goals[0].title, r#"Learn {Rust} "fast""#);
    }

    #[test]
    fn unclosed_object_is_malformed() {
        let err = parse_blueprint_response(r#"{"goals": [{"title": "x"}"#).unwrap_err();
        assert!(
            matches!(err, ProviderError::Malformed(_)),
            "expected Malformed, got: {err}"
        );
    }

    #[test]
    fn missing_goals_is_empty() {
        let response = parse_blueprint_response("{}").expect("should parse");
        assert!(response.goals.is_empty());
    }

    #[test]
    fn rejects_text_without_json() {
        let err = parse_blueprint_response("no plan today").unwrap_err();
        assert!(
            matches!(err, ProviderError::Malformed(_)),
            "expected Malformed, got: {err}"
        );
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_blueprint_response(r#"{"goals": [}"#).unwrap_err();
        assert!(
            matches!(err, ProviderError::Malformed(_)),
            "expected Malformed, got: {err}"
        );
    }

    #[test]
    fn rejects_empty_goal_title() {
        let err = parse_blueprint_response(r#"{"goals": [{"title": "  "}]}"#).unwrap_err();
        assert!(
            matches!(err, ProviderError::Contract(ref msg) if msg.starts_with("goals[0]")),
            "expected Contract, got: {err}"
        );
    }

    #[test]
    fn rejects_untitled_task_with_full_path() {
        let text = r#"{"goals": [{
            "title": "Ship a side project",
            "phases": [{"title": "Build", "milestones": [{"title": "MVP", "tasks": [
                {"title": "Sketch"}, {"description": "no title"}
            ]}]}]
        }]}"#;
        let err = parse_blueprint_response(text).unwrap_err();
        match err {
            ProviderError::Contract(msg) => {
                assert!(
                    msg.contains("goals[0].phases[0].milestones[0].tasks[1]"),
                    "unexpected path: {msg}"
                );
            }
            other => panic!("expected Contract, got: {other}"),
        }
    }

    #[test]
    fn rejects_empty_string_subtask() {
        let text = r#"{"goals": [{"title": "g", "phases": [{"title": "p", "milestones": [
            {"title": "m", "tasks": [{"title": "t", "subtasks": [""]}]}
        ]}]}]}"#;
        let err = parse_blueprint_response(text).unwrap_err();
        assert!(matches!(err, ProviderError::Contract(_)), "got: {err}");
    }
}
