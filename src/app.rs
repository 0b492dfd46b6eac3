use std::io::Write;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::cli::args::CliArgs;
use crate::cli::commands::{parse_command, Command, HELP_TEXT};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::fetch::{
    DataSource, FileSource, HttpOptions, HttpSource, DEFAULT_DATA_URL, DEFAULT_USER_AGENT,
};
use crate::filter::{SearchField, StatusFilter};
use crate::output::{self, OutputFormat};
use crate::state::{Action, Flow, QueryState, Screen, Session};
use crate::view;

fn print_banner() {
    const BANNER: &str = r#"
  _                   _     __ _           _
 | |_ _ __ _   _  ___| | __/ _(_)_ __   __| | ___ _ __
 | __| '__| | | |/ __| |/ / |_| | '_ \ / _` |/ _ \ '__|
 | |_| |  | |_| | (__|   <|  _| | | | | (_| |  __/ |
  \__|_|   \__,_|\___|_|\_\_| |_|_| |_|\__,_|\___|_|
"#;
    print!("{}", BANNER);
    println!(
        "       v{} - San Francisco food truck permits",
        env!("CARGO_PKG_VERSION")
    );
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn render_custom_help() -> String {
    let cmd = CliArgs::command();
    let mut out = format!(
        "{} {}\n",
        cmd.get_name(),
        cmd.get_version().unwrap_or_default()
    );
    if let Some(long_about) = cmd.get_long_about().or(cmd.get_about()) {
        out.push_str(&format!("{long_about}\n"));
    }
    out.push_str(&format!("\nUsage: {} [OPTIONS]\n", cmd.get_name()));

    // headings in first-seen order
    let mut sections: Vec<(&str, Vec<&clap::Arg>)> = Vec::new();
    for arg in cmd.get_arguments().filter(|a| !a.is_hide_set()) {
        let heading = arg.get_help_heading().unwrap_or("Options");
        match sections.iter().position(|(h, _)| *h == heading) {
            Some(i) => sections[i].1.push(arg),
            None => sections.push((heading, vec![arg])),
        }
    }

    for (heading, args) in sections {
        out.push_str(&format!("\n{heading}:\n"));
        for arg in args {
            let mut names: Vec<String> = Vec::new();
            if let Some(short) = arg.get_short() {
                names.push(format!("-{short}"));
            }
            if let Some(long) = arg.get_long() {
                names.push(format!("--{long}"));
            }
            for alias in arg.get_visible_aliases().unwrap_or_default() {
                let alias = format!("--{alias}");
                if !names.contains(&alias) {
                    names.push(alias);
                }
            }
            let mut flags = names.join(", ");
            if arg.get_action().takes_values() {
                let value_name = arg
                    .get_value_names()
                    .and_then(|names| names.first())
                    .map(|name| name.as_str())
                    .unwrap_or("VALUE");
                flags.push_str(&format!(" <{value_name}>"));
            }
            let help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
            out.push_str(&format!("  {flags}\n          {}\n", help.trim()));
        }
    }

    out.push_str(&format!("\nInteractive {HELP_TEXT}\n"));
    out
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum SourceConfig {
    Url(String),
    File(String),
}

#[derive(Clone, Debug)]
struct RunConfig {
    source: SourceConfig,
    timeout: u64,
    proxy: Option<String>,
    user_agent: String,
    search_field: SearchField,
    search: String,
    status: StatusFilter,
    page: usize,
    once: bool,
    output: Option<String>,
    output_format: OutputFormat,
    no_color: bool,
    verbose: u8,
}

impl RunConfig {
    fn initial_query(&self) -> QueryState {
        QueryState::new(self.search_field, self.search.clone(), self.status)
    }

    fn data_source(&self) -> Result<DataSource, String> {
        match &self.source {
            SourceConfig::File(path) => Ok(DataSource::File(FileSource::new(path))),
            SourceConfig::Url(url) => {
                let options = HttpOptions {
                    timeout_seconds: self.timeout,
                    proxy: self.proxy.as_deref(),
                    user_agent: &self.user_agent,
                };
                HttpSource::new(url.clone(), options)
                    .map(DataSource::Http)
                    .map_err(|e| e.to_string())
            }
        }
    }
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let source = match (args.url, args.input_file) {
        (Some(url), _) => SourceConfig::Url(url.trim().to_string()),
        (None, Some(path)) => SourceConfig::File(config::expand_tilde_string(&path)),
        (None, None) => match (cfg.url, cfg.input_file) {
            (Some(_), Some(_)) => {
                return Err("config sets both url and input_file, keep only one".to_string())
            }
            (_, Some(path)) => SourceConfig::File(config::expand_tilde_string(&path)),
            (Some(url), None) => SourceConfig::Url(url.trim().to_string()),
            (None, None) => SourceConfig::Url(DEFAULT_DATA_URL.to_string()),
        },
    };

    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout == 0 {
        return Err("invalid timeout, expected positive number of seconds".to_string());
    }
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());
    let user_agent = args
        .user_agent
        .or(cfg.user_agent)
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    let search_field = match args.field.or(cfg.field) {
        Some(raw) => raw
            .parse::<SearchField>()
            .map_err(|e| format!("invalid field '{raw}': {e}"))?,
        None => SearchField::default(),
    };
    let status = match args.status.or(cfg.status) {
        Some(raw) => raw
            .parse::<StatusFilter>()
            .map_err(|e| format!("invalid status '{raw}': {e}"))?,
        None => StatusFilter::default(),
    };

    let output = args.output.map(|p| config::expand_tilde_string(&p));
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw).ok_or_else(|| {
            format!("invalid output format '{raw}', expected text, json or xml")
        })?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    Ok(RunConfig {
        source,
        timeout,
        proxy,
        user_agent,
        search_field,
        search: args.search.unwrap_or_default(),
        status,
        page: args.page.unwrap_or(1),
        once: args.once || output.is_some(),
        output,
        output_format,
        no_color,
        verbose: args.verbose,
    })
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over -v
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn loading_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::with_template(":: {spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(view::LOADING_MESSAGE);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn load_session(run: &RunConfig) -> Result<Session, String> {
    let source = run.data_source()?;
    info!("loading permits from {}", source.describe());

    let mut session = Session::new(run.initial_query());
    let pb = loading_spinner();
    session.load(&source).await;
    pb.finish_and_clear();

    if run.page > 1 {
        session.dispatch(Action::GoToPage(run.page));
    }
    Ok(session)
}

fn redraw(session: &Session) {
    println!();
    println!(
        "{}",
        view::render_screen(&session.screen(), session.search_pending())
    );
    print!("{} ", ">".bold());
    let _ = std::io::stdout().flush();
}

fn spawn_input_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel::<String>(64);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("failed to read input: {e}");
                    break;
                }
            }
        }
    });
    rx
}

/// Runs the event loop for one session until the user reloads or quits.
async fn interact(session: &mut Session, input: &mut mpsc::Receiver<String>) -> Flow {
    redraw(session);
    loop {
        tokio::select! {
            Some(settled) = session.next_settled() => {
                if session.apply_settled(settled) {
                    redraw(session);
                }
            }
            line = input.recv() => {
                let Some(line) = line else {
                    debug!("input closed");
                    return Flow::Quit;
                };
                match parse_command(&line) {
                    Ok(Command::Help) => {
                        println!("{HELP_TEXT}");
                        redraw(session);
                    }
                    Ok(Command::Redraw) => redraw(session),
                    Ok(Command::Action(action)) => match session.dispatch(action) {
                        Flow::Continue => redraw(session),
                        flow => return flow,
                    },
                    Err(e) => {
                        println!("{}", e.red());
                        redraw(session);
                    }
                }
            }
        }
    }
}

async fn run_once(run: &RunConfig) -> Result<(), String> {
    let session = load_session(run).await?;
    let screen = session.screen();
    println!("{}", view::render_screen(&screen, false));

    let Screen::Ready(listing) = screen else {
        return Err(crate::state::LOAD_ERROR_MESSAGE.to_string());
    };
    if let Some(path) = run.output.as_deref() {
        output::write_export(path, run.output_format, &listing.matches)
            .await
            .map_err(|e| e.to_string())?;
        format_kv_line("Exported", &format!("{} permits to {path}", listing.matches.len()));
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.once {
        return run_once(&run).await;
    }

    print_banner();
    match &run.source {
        SourceConfig::Url(url) => format_kv_line("Source", url),
        SourceConfig::File(path) => format_kv_line("Source", path),
    }
    format_kv_line("Help", "type 'help' for commands");

    let mut input = spawn_input_reader();
    loop {
        let mut session = load_session(&run).await?;
        match interact(&mut session, &mut input).await {
            Flow::Reload => {
                info!("reloading permits");
                continue;
            }
            Flow::Quit | Flow::Continue => break,
        }
    }
    println!();
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", render_custom_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                print!("{}", CliArgs::command().render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));

    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "unable to determine a config path, pass --config".to_string())?;
        if config::ensure_default_config_file(&path)? {
            format_kv_line("Config", &format!("wrote {}", path.display()));
        } else {
            format_kv_line("Config", &format!("{} already exists", path.display()));
        }
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    init_logging(run.verbose);
    if run.no_color {
        colored::control::set_override(false);
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    let result = rt.block_on(run_async(run));
    // the stdin reader may still be parked on a blocking read
    rt.shutdown_background();
    result
}
