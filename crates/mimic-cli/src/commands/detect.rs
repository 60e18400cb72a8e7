use anyhow::Result;
use mimic_config::Config;
use mimic_core::DetectOptions;

use crate::cli::DetectArgs;
use crate::commands::read_input;

pub async fn handle(args: DetectArgs, config: &Config) -> Result<()> {
    let text = read_input(args.input.as_deref()).await?;
    let options = DetectOptions {
        csv_has_header: config.redaction.csv_has_header && !args.no_header,
    };
    let label = mimic_engine::detect_format(&text, options);
    if label.as_str().is_empty() {
        println!("(empty)");
    } else {
        println!("{}", label);
    }
    Ok(())
}
