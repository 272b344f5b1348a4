//! BPMN 2.0 synthesis for processes Holmes returns without a template.

use std::fmt::Write;

use serde_json::Value;

use crate::ProcessTemplate;

const STEP_COLLECTIONS: [&str; 3] = ["steps", "tasks", "activities"];
const STEP_NAME_FIELDS: [&str; 3] = ["name", "title", "task_name"];

/// One step of a synthesized diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BpmnStep {
    /// Step label.
    pub name: String,
}

impl BpmnStep {
    /// Creates a step.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Extracts ordered steps from raw process data.
    ///
    /// Reads the first array found under `steps`, `tasks` or `activities`.
    /// Entries may be plain strings or objects with a `name`, `title` or
    /// `task_name` field; anything else is skipped.
    #[must_use]
    pub fn from_process_data(data: &Value) -> Vec<Self> {
        let Some(entries) = STEP_COLLECTIONS
            .iter()
            .find_map(|field| data.get(field).and_then(Value::as_array))
        else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(name) => Some(name.as_str()),
                Value::Object(object) => STEP_NAME_FIELDS
                    .iter()
                    .find_map(|field| object.get(*field).and_then(Value::as_str)),
                _ => None,
            })
            .filter(|name| !name.trim().is_empty())
            .map(Self::new)
            .collect()
    }
}

impl ProcessTemplate {
    /// Returns BPMN XML, synthesizing it from raw process data when Holmes
    /// had no template.
    #[must_use]
    pub fn into_xml(self, process_id: &str) -> String {
        match self {
            Self::Xml(xml) => xml,
            Self::Raw(data) => {
                let name = ["name", "identifier"]
                    .iter()
                    .find_map(|field| data.get(*field).and_then(Value::as_str))
                    .unwrap_or(process_id);
                synthesize_bpmn(process_id, name, &BpmnStep::from_process_data(&data))
            }
        }
    }
}

/// Builds a linear BPMN document: start, one task per step, end.
#[must_use]
pub fn synthesize_bpmn(process_id: &str, process_name: &str, steps: &[BpmnStep]) -> String {
    let mut nodes = Vec::with_capacity(steps.len() + 2);
    nodes.push("StartEvent_1".to_owned());
    nodes.extend((1..=steps.len()).map(|index| format!("Task_{index}")));
    nodes.push("EndEvent_1".to_owned());

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        xml,
        "<bpmn:definitions xmlns:bpmn=\"http://www.omg.org/spec/BPMN/20100524/MODEL\" \
         id=\"Definitions_{id}\" targetNamespace=\"http://bpmn.io/schema/bpmn\">",
        id = escape_xml(process_id)
    );
    let _ = writeln!(
        xml,
        "  <bpmn:process id=\"Process_{id}\" name=\"{name}\" isExecutable=\"false\">",
        id = escape_xml(process_id),
        name = escape_xml(process_name)
    );
    xml.push_str("    <bpmn:startEvent id=\"StartEvent_1\" name=\"Start\" />\n");
    for (index, step) in steps.iter().enumerate() {
        let _ = writeln!(
            xml,
            "    <bpmn:task id=\"Task_{number}\" name=\"{name}\" />",
            number = index + 1,
            name = escape_xml(&step.name)
        );
    }
    xml.push_str("    <bpmn:endEvent id=\"EndEvent_1\" name=\"End\" />\n");
    for (index, pair) in nodes.windows(2).enumerate() {
        if let [source, target] = pair {
            let _ = writeln!(
                xml,
                "    <bpmn:sequenceFlow id=\"Flow_{number}\" sourceRef=\"{source}\" targetRef=\"{target}\" />",
                number = index + 1
            );
        }
    }
    xml.push_str("  </bpmn:process>\n");
    xml.push_str("</bpmn:definitions>\n");
    xml
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{BpmnStep, synthesize_bpmn};
    use crate::ProcessTemplate;

    #[test]
    fn synthesized_diagram_chains_start_tasks_and_end() {
        let xml = synthesize_bpmn(
            "P1",
            "Auditoria BIM",
            &[BpmnStep::new("Upload"), BpmnStep::new("Review")],
        );

        assert!(xml.contains("<bpmn:startEvent id=\"StartEvent_1\""));
        assert!(xml.contains("<bpmn:task id=\"Task_2\" name=\"Review\" />"));
        assert!(xml.contains("sourceRef=\"StartEvent_1\" targetRef=\"Task_1\""));
        assert!(xml.contains("sourceRef=\"Task_1\" targetRef=\"Task_2\""));
        assert!(xml.contains("sourceRef=\"Task_2\" targetRef=\"EndEvent_1\""));
        assert_eq!(xml.matches("<bpmn:sequenceFlow").count(), 3);
    }

    #[test]
    fn empty_process_connects_start_to_end() {
        let xml = synthesize_bpmn("P1", "Empty", &[]);
        assert!(xml.contains("sourceRef=\"StartEvent_1\" targetRef=\"EndEvent_1\""));
        assert_eq!(xml.matches("<bpmn:task ").count(), 0);
    }

    #[test]
    fn step_names_are_escaped() {
        let xml = synthesize_bpmn("P1", "A & B", &[BpmnStep::new("<Check \"quotes\">")]);
        assert!(xml.contains("name=\"A &amp; B\""));
        assert!(xml.contains("name=\"&lt;Check &quot;quotes&quot;&gt;\""));
    }

    #[test]
    fn raw_template_is_synthesized_from_steps() {
        let template = ProcessTemplate::Raw(json!({
            "name": "Auditoria BIM",
            "steps": [{"name": "Upload"}, "Review", {"id": 3}, {"title": "Approve"}]
        }));
        let xml = template.into_xml("P1");

        assert!(xml.contains("name=\"Auditoria BIM\""));
        assert!(xml.contains("<bpmn:task id=\"Task_3\" name=\"Approve\" />"));
        assert_eq!(xml.matches("<bpmn:task ").count(), 3);
    }

    #[test]
    fn xml_template_passes_through() {
        let template = ProcessTemplate::Xml("<bpmn:definitions/>".to_owned());
        assert_eq!(template.into_xml("P1"), "<bpmn:definitions/>");
    }
}
