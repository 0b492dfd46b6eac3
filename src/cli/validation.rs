use crate::cli::args::CliArgs;
use crate::filter::{SearchField, StatusFilter};
use crate::output::OutputFormat;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.field.as_deref() {
        raw.parse::<SearchField>()
            .map_err(|e| format!("invalid --field '{raw}': {e}"))?;
    }
    if let Some(raw) = args.status.as_deref() {
        raw.parse::<StatusFilter>()
            .map_err(|e| format!("invalid --status '{raw}': {e}"))?;
    }
    if let Some(page) = args.page {
        if page == 0 {
            return Err("invalid page, expected positive integer".to_string());
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive number of seconds".to_string());
        }
    }
    if let Some(raw) = args.output_format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text, json or xml"
            ));
        }
        if args.output.is_none() {
            return Err("--output-format requires --output".to_string());
        }
    }
    if args.url.is_some() && args.input_file.is_some() {
        return Err("use either --url or --input-file, not both".to_string());
    }
    Ok(())
}
