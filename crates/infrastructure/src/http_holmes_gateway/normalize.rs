use serde_json::Value;

use easyholmes_domain::{HistoryEvent, HistoryPage, Process, ProcessTemplate};

/// Accepts `{processes: [...]}` or a bare array.
pub(super) fn normalize_process_list(value: Value) -> Result<Vec<Process>, serde_json::Error> {
    let processes = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(mut object) => object.remove("processes").unwrap_or(Value::Null),
        other => other,
    };

    match processes {
        Value::Null => Ok(Vec::new()),
        other => serde_json::from_value(other),
    }
}

/// Accepts a page object (missing `histories` is an empty page) or a bare
/// event array.
pub(super) fn normalize_history_page(value: Value) -> Result<HistoryPage, serde_json::Error> {
    match value {
        Value::Null => Ok(HistoryPage::default()),
        Value::Array(_) => Ok(HistoryPage {
            histories: serde_json::from_value::<Vec<HistoryEvent>>(value)?,
            ..HistoryPage::default()
        }),
        other => serde_json::from_value(other),
    }
}

const TEMPLATE_FIELDS: [&str; 4] = ["xml", "template", "bpmn", "bpmn_xml"];

/// XML bodies, JSON strings holding XML and objects with an XML field are
/// templates. Anything else is raw process data.
pub(super) fn normalize_template(body: &str) -> ProcessTemplate {
    if looks_like_xml(body) {
        return ProcessTemplate::Xml(body.trim().to_owned());
    }

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return ProcessTemplate::Raw(Value::String(body.to_owned()));
    };

    if let Some(xml) = value.as_str().filter(|text| looks_like_xml(text)) {
        return ProcessTemplate::Xml(xml.trim().to_owned());
    }

    let embedded = TEMPLATE_FIELDS.iter().find_map(|field| {
        value
            .get(field)
            .and_then(Value::as_str)
            .filter(|text| looks_like_xml(text))
    });
    match embedded {
        Some(xml) => ProcessTemplate::Xml(xml.trim().to_owned()),
        None => ProcessTemplate::Raw(value),
    }
}

fn looks_like_xml(text: &str) -> bool {
    text.trim_start().starts_with('<')
}
