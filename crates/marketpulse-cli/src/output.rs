use marketpulse_core::Envelope;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Text => print!("{}", render_text(envelope)?),
    }

    Ok(())
}

pub fn render_text(envelope: &Envelope<Value>) -> Result<String, CliError> {
    let mut out = String::new();
    let meta = &envelope.meta;
    let sources = meta
        .source_chain
        .iter()
        .map(|source| source.as_str())
        .collect::<Vec<_>>()
        .join(",");

    out.push_str(&format!("request_id  : {}\n", meta.request_id));
    out.push_str(&format!("generated_at: {}\n", meta.generated_at));
    out.push_str(&format!("sources     : {sources}\n"));
    out.push_str(&format!("latency_ms  : {}\n", meta.latency_ms));
    out.push_str(&format!("cache       : {}\n", meta.cache.cache_control()));

    if !meta.warnings.is_empty() {
        out.push_str("warnings:\n");
        for warning in &meta.warnings {
            out.push_str(&format!("  - {warning}\n"));
        }
    }

    out.push_str("data:\n");
    for line in serde_json::to_string_pretty(&envelope.data)?.lines() {
        out.push_str(&format!("  {line}\n"));
    }

    if !envelope.errors.is_empty() {
        out.push_str("errors:\n");
        for error in &envelope.errors {
            out.push_str(&format!("  - {}: {}\n", error.code, error.message));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketpulse_core::{CachePolicy, EnvelopeError, EnvelopeMeta, ProviderId};
    use serde_json::json;

    #[test]
    fn text_output_lists_meta_data_and_errors() {
        let meta = EnvelopeMeta::new(
            "req-00000001",
            vec![ProviderId::Godaddy],
            4,
            CachePolicy::AVAILABILITY,
        )
        .expect("meta");
        let error = EnvelopeError::new("source.invalid_request", "bad domain").expect("error");
        let envelope =
            Envelope::with_errors(meta, json!({"available": true}), vec![error]).expect("envelope");

        let text = render_text(&envelope).expect("text");

        assert!(text.contains("sources     : godaddy"));
        assert!(text.contains("public, s-maxage=300, stale-while-revalidate=600"));
        assert!(text.contains("\"available\": true"));
        assert!(text.contains("- source.invalid_request: bad domain"));
    }
}
