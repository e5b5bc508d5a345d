//! Renders the control flow of an automation document as a Graphviz dot graph,
//! to visualize when and how branching occurs.

use serde_json::Value;
use snafu::{OptionExt, ResultExt, Snafu};

/// Converts the JSON content of an automation document into a dot digraph of its
/// `mainSteps`, with edges for `nextStep`, `isEnd`, and `onFailure` handling.
/// Failure edges are drawn in red unless the step sets `isCritical` to false.
pub fn convert_document_to_dot_graph(doc_content: &str) -> Result<String> {
    let doc: Value = serde_json::from_str(doc_content).context(ParseDocument)?;
    let description = doc
        .get("description")
        .and_then(Value::as_str)
        .context(MissingField {
            field: "description",
        })?;
    let steps = doc
        .get("mainSteps")
        .and_then(Value::as_array)
        .context(MissingField { field: "mainSteps" })?;

    let mut graph = Vec::new();
    graph.push(format!("// {}", description));
    graph.push("digraph {".to_string());
    graph.push("    Start [label=Start]".to_string());
    graph.push("    End [label=End]".to_string());

    // steps without an explicit next step fall through to the step that follows
    // them in the document; the edge is created when that step is reached
    let mut pending_edge: Option<(String, String)> = None;

    for (index, step) in steps.iter().enumerate() {
        let name = step
            .get("name")
            .and_then(Value::as_str)
            .context(MissingField {
                field: "mainSteps[].name",
            })?;
        if let Some((previous_step, label)) = pending_edge.take() {
            graph.push(format!("    {} -> {} [label={}]", previous_step, name, label));
        }

        if index == 0 {
            graph.push(format!("    Start -> {}", name));
        } else if index == steps.len() - 1 {
            graph.push(format!("    {} -> End [label=onSuccess]", name));
            graph.push(format!("    {} -> End [label=onFailure]", name));
            break;
        }

        if let Some(next_step) = step.get("nextStep").and_then(Value::as_str) {
            graph.push(format!("    {} -> {} [label=onSuccess]", name, next_step));
        } else if let Some(is_end) = step.get("isEnd") {
            if is_true(is_end) {
                graph.push(format!("    {} -> End [label=onSuccess]", name));
            }
        } else {
            pending_edge = Some((name.to_string(), "onSuccess".to_string()));
        }

        match step.get("onFailure").and_then(Value::as_str) {
            Some("Abort") => {
                graph.push(format!("    {} -> End [label=onFailure color=\"red\"]", name));
            }
            Some("Continue") => {
                if let Some(next_step) = step.get("nextStep").and_then(Value::as_str) {
                    graph.push(format!(
                        "    {} -> {} [label={}]",
                        name,
                        next_step,
                        failure_label(step)
                    ));
                } else {
                    pending_edge =
                        Some((name.to_string(), "onFailure color=\"red\"".to_string()));
                }
            }
            Some(target_step) => {
                graph.push(format!(
                    "    {} -> {} [label={}]",
                    name,
                    target_step.trim_start_matches("step:"),
                    failure_label(step)
                ));
            }
            None => {
                graph.push(format!("    {} -> End [label=onFailure color=\"red\"]", name));
            }
        }
    }

    graph.push("}".to_string());
    Ok(graph.join("\n"))
}

// documents write booleans both ways, as JSON booleans and as strings
fn is_true(value: &Value) -> bool {
    value == &Value::Bool(true) || value.as_str() == Some("true")
}

fn is_false(value: &Value) -> bool {
    value == &Value::Bool(false) || value.as_str() == Some("false")
}

fn failure_label(step: &Value) -> &'static str {
    match step.get("isCritical") {
        Some(is_critical) if is_false(is_critical) => "onFailure",
        _ => "onFailure color=\"red\"",
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for this module.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Document is missing field {}", field))]
    MissingField { field: &'static str },

    #[snafu(display("Failed to parse document: {}", source))]
    ParseDocument { source: serde_json::Error },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}

#[cfg(test)]
mod tests {
    use super::convert_document_to_dot_graph;

    #[test]
    fn straight_line_document() {
        let doc = r#"{
            "description": "Linear flow",
            "mainSteps": [
                { "name": "first" },
                { "name": "second" },
                { "name": "last" }
            ]
        }"#;
        let graph = convert_document_to_dot_graph(doc).unwrap();
        let expected = "\
// Linear flow
digraph {
    Start [label=Start]
    End [label=End]
    Start -> first
    first -> End [label=onFailure color=\"red\"]
    first -> second [label=onSuccess]
    second -> End [label=onFailure color=\"red\"]
    second -> last [label=onSuccess]
    last -> End [label=onSuccess]
    last -> End [label=onFailure]
}";
        assert_eq!(graph, expected);
    }

    #[test]
    fn next_step_and_abort() {
        let doc = r#"{
            "description": "Branching flow",
            "mainSteps": [
                { "name": "check", "nextStep": "apply", "onFailure": "Abort" },
                { "name": "apply", "onFailure": "step:rollback" },
                { "name": "rollback" }
            ]
        }"#;
        let graph = convert_document_to_dot_graph(doc).unwrap();
        let expected = "\
// Branching flow
digraph {
    Start [label=Start]
    End [label=End]
    Start -> check
    check -> apply [label=onSuccess]
    check -> End [label=onFailure color=\"red\"]
    apply -> rollback [label=onFailure color=\"red\"]
    apply -> rollback [label=onSuccess]
    rollback -> End [label=onSuccess]
    rollback -> End [label=onFailure]
}";
        assert_eq!(graph, expected);
    }

    #[test]
    fn non_critical_failure_edge_is_not_red() {
        let doc = r#"{
            "description": "Tolerant flow",
            "mainSteps": [
                { "name": "try", "isCritical": "false", "onFailure": "step:cleanup", "isEnd": "true" },
                { "name": "cleanup" }
            ]
        }"#;
        let graph = convert_document_to_dot_graph(doc).unwrap();
        assert!(graph.contains("try -> cleanup [label=onFailure]"));
        assert!(graph.contains("try -> End [label=onSuccess]"));
    }

    #[test]
    fn missing_main_steps_is_an_error() {
        let doc = r#"{ "description": "No steps" }"#;
        let error = convert_document_to_dot_graph(doc).unwrap_err();
        assert!(error.to_string().contains("mainSteps"));
    }
}
