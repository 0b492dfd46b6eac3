use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "truckfinder",
    version,
    about = "search and page through San Francisco food truck permits",
    long_about = "Truckfinder downloads the San Francisco mobile food facility permit dataset once and lets you search it by applicant or address, filter it by permit status and page through the results.\n\nExamples:\n  truckfinder\n  truckfinder --search taco --status approved --once\n  truckfinder --field address --search 'Market St' -o trucks.json\n  truckfinder --input-file ./permits.json\n\nTip: Use --config to persist settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'u',
        long = "u",
        visible_alias = "url",
        value_name = "URL",
        help_heading = "Input",
        help = "Dataset URL returning a JSON array of permits."
    )]
    pub url: Option<String>,

    #[arg(
        short = 'i',
        long = "if",
        visible_alias = "input-file",
        value_name = "FILE",
        help_heading = "Input",
        help = "Read permits from a local JSON file instead of the network."
    )]
    pub input_file: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.truckfinder/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a default config file to the config path if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'f',
        long = "fld",
        visible_alias = "field",
        value_name = "FIELD",
        help_heading = "Query",
        help = "Field to search: applicant or address."
    )]
    pub field: Option<String>,

    #[arg(
        short = 's',
        long = "q",
        visible_alias = "search",
        value_name = "TEXT",
        help_heading = "Query",
        help = "Initial search text (case-insensitive substring)."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'S',
        long = "st",
        visible_alias = "status",
        value_name = "STATUS",
        help_heading = "Query",
        help = "Permit status filter: approved, requested, expired or all."
    )]
    pub status: Option<String>,

    #[arg(
        short = 'p',
        long = "pg",
        visible_alias = "page",
        value_name = "N",
        help_heading = "Query",
        help = "Initial page number (1-based)."
    )]
    pub page: Option<usize>,

    #[arg(
        long = "once",
        help_heading = "Query",
        help = "Print one page for the given query and exit instead of starting the interactive view."
    )]
    pub once: bool,

    #[arg(
        short = 'x',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'A',
        long = "ua",
        visible_alias = "user-agent",
        value_name = "AGENT",
        help_heading = "HTTP",
        help = "User-Agent header sent with the dataset request."
    )]
    pub user_agent: Option<String>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write every matching permit to FILE and exit."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'O',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Export format: text, json or xml (inferred from the file extension by default)."
    )]
    pub output_format: Option<String>,
}
