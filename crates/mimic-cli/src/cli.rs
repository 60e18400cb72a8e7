use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mimic_config::Config;
use mimic_core::{FormatLabel, parse_list};

#[derive(Parser)]
#[command(name = "mimic")]
#[command(about = "Replace sensitive values in structured text with plausible fakes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "MIMIC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Redact a document (file or stdin) and print the result
    Redact(RedactArgs),

    /// Print the detected format of a document
    Detect(DetectArgs),

    /// Inspect or reset the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct RedactArgs {
    /// Input file; reads stdin when omitted or `-`
    pub input: Option<PathBuf>,

    /// Treat the input as this format instead of detecting it
    /// (json, xml, yaml, csv, csv-no-header, form, request, response, text)
    #[arg(long)]
    pub format: Option<FormatLabel>,

    /// Produce N independent redactions of the same input
    #[arg(long, value_name = "N")]
    pub variants: Option<usize>,

    /// Print results as JSON objects with input, output and format
    #[arg(long)]
    pub json: bool,

    /// Also print the display-formatted input before the output
    #[arg(long)]
    pub show_input: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Input file; reads stdin when omitted or `-`
    pub input: Option<PathBuf>,

    /// Label CSV input as having no header row
    #[arg(long)]
    pub no_header: bool,
}

/// Per-invocation overrides of the configured redaction settings.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Comma-separated field names to leave untouched (repeatable)
    #[arg(long, value_name = "FIELDS")]
    pub protect: Vec<String>,

    /// Comma-separated words to never substitute (repeatable)
    #[arg(long, value_name = "WORDS")]
    pub ignore: Vec<String>,

    /// CSV input has no header row
    #[arg(long)]
    pub no_header: bool,

    /// Sort JSON object keys in input and output
    #[arg(long)]
    pub sort_keys: bool,

    /// Redact URL paths in HTTP request lines
    #[arg(long)]
    pub redact_path: bool,

    /// Redact query, form and multipart parameter names
    #[arg(long)]
    pub redact_param_names: bool,

    /// Leave the Host header as is
    #[arg(long)]
    pub keep_host: bool,

    /// Leave URL query strings as is
    #[arg(long)]
    pub keep_query: bool,

    /// Leave Cookie and Set-Cookie headers as is
    #[arg(long)]
    pub keep_cookies: bool,

    /// Leave CSRF tokens as is
    #[arg(long)]
    pub keep_csrf: bool,

    /// Dictionary location (builtin:, file path or http(s) URL)
    #[arg(long, value_name = "LOCATION")]
    pub dictionary: Option<String>,
}

impl SettingsArgs {
    /// Layer these flags on top of `config`. Lists are appended, toggles
    /// only ever move away from the configured value when given.
    pub fn apply(&self, config: &mut Config) {
        let redaction = &mut config.redaction;
        redaction
            .protected_fields
            .extend(self.protect.iter().flat_map(|item| parse_list(item)));
        redaction
            .ignored_words
            .extend(self.ignore.iter().flat_map(|item| parse_list(item)));

        if self.no_header {
            redaction.csv_has_header = false;
        }
        if self.redact_path {
            redaction.redact_url_path = true;
        }
        if self.redact_param_names {
            redaction.redact_param_names = true;
        }
        if self.keep_host {
            redaction.redact_host = false;
        }
        if self.keep_query {
            redaction.redact_query_string = false;
        }
        if self.keep_cookies {
            redaction.redact_cookies = false;
        }
        if self.keep_csrf {
            redaction.redact_csrf = false;
        }
        if self.sort_keys {
            config.preferences.sort_keys = true;
        }
        if let Some(dictionary) = &self.dictionary {
            config.dictionary = dictionary.clone();
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the config file location
    Path,

    /// Print the effective configuration
    Show,

    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
