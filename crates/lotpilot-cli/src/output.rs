use serde_json::Value;

use lotpilot_core::Envelope;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let rendered = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{rendered}");
        }
        OutputFormat::Text => render_text(envelope),
    }

    Ok(())
}

fn render_text(envelope: &Envelope<Value>) {
    match summary_line(&envelope.data) {
        Some(line) => println!("{line}"),
        None => println!("{}", envelope.data),
    }

    for warning in &envelope.meta.warnings {
        eprintln!("warning: {warning}");
    }
    for error in &envelope.errors {
        eprintln!("error: {} ({})", error.message, error.code);
    }
}

/// Pick the one line a human wants from each flow's payload.
fn summary_line(data: &Value) -> Option<String> {
    if let Some(text) = data.get("responseText").and_then(Value::as_str) {
        return Some(text.to_owned());
    }

    if let Some(recommendations) = data.get("recommendations").and_then(Value::as_array) {
        if recommendations.is_empty() {
            return Some(String::from("No recommendations available."));
        }
        let lines: Vec<String> = recommendations
            .iter()
            .filter_map(|rec| {
                let name = rec.get("lotName").and_then(Value::as_str)?;
                let reason = rec.get("reason").and_then(Value::as_str)?;
                Some(format!("- {name}: {reason}"))
            })
            .collect();
        return Some(lines.join("\n"));
    }

    if let Some(availability) = data.get("predictedAvailability").and_then(Value::as_f64) {
        let confidence = data
            .get("confidence")
            .and_then(Value::as_str)
            .unwrap_or("low");
        return Some(format!(
            "Predicted availability: {:.0}% (confidence: {confidence})",
            availability * 100.0
        ));
    }

    None
}
