use anyhow::Result;
use mimic_config::Config;
use mimic_core::RedactionResult;
use mimic_engine::Redactor;
use tracing::debug;

use crate::cli::RedactArgs;
use crate::commands::read_input;

pub async fn handle(args: RedactArgs, mut config: Config) -> Result<()> {
    args.settings.apply(&mut config);
    let text = read_input(args.input.as_deref()).await?;
    debug!(dictionary = %config.dictionary, bytes = text.len(), "Redacting input");

    let redactor = Redactor::from_location(config.dictionary.clone())
        .with_preferences(config.preferences.clone());

    let results = match args.variants {
        Some(count) => {
            redactor
                .redact_variants(&text, &config.redaction, count.max(1), args.format)
                .await?
        }
        None => vec![redactor.redact_as(args.format, &text, &config.redaction).await?],
    };

    if results.iter().any(RedactionResult::is_degraded) {
        eprintln!("Note: input could not be parsed as structured data, processed as Plain Text");
    }

    print!("{}", render(&results, &args)?);
    Ok(())
}

fn variant_marker(index: usize, result: &RedactionResult) -> String {
    format!("----- variant {} ({}) -----", index + 1, result.format)
}

fn render(results: &[RedactionResult], args: &RedactArgs) -> Result<String> {
    if args.json {
        let mut json = if results.len() == 1 && args.variants.is_none() {
            serde_json::to_string_pretty(&results[0])?
        } else {
            serde_json::to_string_pretty(results)?
        };
        json.push('\n');
        return Ok(json);
    }

    let mut out = String::new();
    if args.show_input {
        if let Some(first) = results.first() {
            out.push_str(&first.input);
            out.push_str("\n\n");
        }
    }

    let numbered = results.len() > 1 || args.variants.is_some();
    for (index, result) in results.iter().enumerate() {
        if numbered {
            out.push_str(&variant_marker(index, result));
            out.push('\n');
        }
        out.push_str(&result.output);
        if !result.output.ends_with('\n') && !result.output.is_empty() {
            out.push('\n');
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SettingsArgs;
    use mimic_core::FormatLabel;

    fn args(json: bool, variants: Option<usize>) -> RedactArgs {
        RedactArgs {
            input: None,
            format: None,
            variants,
            json,
            show_input: false,
            settings: SettingsArgs::default(),
        }
    }

    fn result(output: &str) -> RedactionResult {
        RedactionResult::new("{\"a\": 1}", output, FormatLabel::Json)
    }

    #[test]
    fn test_render_single() {
        let out = render(&[result("{\"a\": 7}")], &args(false, None)).unwrap();
        assert_eq!(out, "{\"a\": 7}\n");
    }

    #[test]
    fn test_render_variants_with_markers() {
        let out = render(&[result("x"), result("y\n")], &args(false, Some(2))).unwrap();
        assert_eq!(
            out,
            "----- variant 1 (JSON) -----\nx\n----- variant 2 (JSON) -----\ny\n"
        );
    }

    #[test]
    fn test_render_json() {
        let out = render(&[result("{}")], &args(true, None)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["format"], "JSON");
        assert_eq!(value["output"], "{}");

        let out = render(&[result("a"), result("b")], &args(true, Some(2))).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_render_empty() {
        let out = render(&[RedactionResult::empty()], &args(false, None)).unwrap();
        assert!(out.is_empty());
    }
}
