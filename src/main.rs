//! Command-line front end for **ddc-switcher**.
//!
//! Every command probes the bus first, because `ddcutil` display numbers
//! are only valid for the current hardware configuration.

use clap::{Parser, Subcommand};
use ddc_switcher::config::{config_dir, Config};
use ddc_switcher::monitor::{InputCode, Monitor, Position};
use ddc_switcher::runner::ProcessRunner;
use ddc_switcher::store::{JsonFileStore, MemoryStore};
use ddc_switcher::switcher::{DisplaySwitcher, RejectReason, SwitchAll, SwitchOutcome};
use ddc_switcher::traits::{CommandRunner, SettingsStore};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "ddc-switcher", version, about = "Switch monitor inputs over DDC/CI")]
struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/ddc-switcher/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Settings document holding per-monitor preferences.
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Keep preferences in memory only; nothing is read or written.
    #[arg(long, global = true)]
    no_persist: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// List attached monitors.
    List {
        /// Query each monitor's active input first.
        #[arg(long)]
        refresh: bool,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// List the inputs that can be selected.
    Inputs,
    /// Switch one monitor to an input (name or code).
    Switch {
        input: String,
        /// Identity key, label or display number.  Defaults to the first
        /// listed monitor.
        #[arg(long)]
        monitor: Option<String>,
        /// Wait for the monitor to settle and report what it shows.
        #[arg(long)]
        confirm: bool,
    },
    /// Switch every attached monitor to an input.
    SwitchAll { input: String },
    /// Query every monitor's active input.
    Refresh,
    /// Set where a monitor sits: left, center, right or unset.
    SetPosition { monitor: String, position: String },
    /// Restrict a monitor to the given inputs; none means all.
    SetUsable { monitor: String, inputs: Vec<String> },
}

//  Main

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.clone());

    if cli.no_persist {
        info!("preferences kept in memory only");
        return run(cli, config, MemoryStore::new()).await;
    }
    let path = cli
        .state
        .clone()
        .or_else(|| config.state_file.clone())
        .unwrap_or_else(|| config_dir().join("settings.json"));
    info!("preferences stored in {}", path.display());
    run(cli, config, JsonFileStore::new(path)).await
}

/// Load the config from `path` or the default location, falling back to
/// compiled-in defaults.
fn load_config(path: Option<PathBuf>) -> Config {
    let explicit = path.is_some();
    let path = path.unwrap_or_else(|| config_dir().join("config.json"));
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) if explicit || path.exists() => {
            error!("{}; using defaults", e);
            Config::default()
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

async fn run<S: SettingsStore>(cli: Cli, config: Config, store: S) -> ExitCode {
    let switcher = DisplaySwitcher::new(ProcessRunner::new(), store, config);

    if let Cmd::Inputs = cli.command {
        for source in switcher.config().inputs.iter() {
            println!("{}  {}", source.code, source.name);
        }
        return ExitCode::SUCCESS;
    }

    switcher.rescan().await;

    match cli.command {
        Cmd::Inputs => ExitCode::SUCCESS,
        Cmd::List { refresh, json } => {
            if refresh {
                switcher.refresh_active_inputs().await;
            }
            print_monitors(&switcher, json)
        }
        Cmd::Refresh => {
            switcher.refresh_active_inputs().await;
            print_monitors(&switcher, false)
        }
        Cmd::Switch {
            input,
            monitor,
            confirm,
        } => {
            let Some(code) = parse_input(&switcher, &input) else {
                return ExitCode::FAILURE;
            };
            let target = match monitor {
                Some(query) => match find_monitor(&switcher, &query) {
                    Some(m) => Some(m),
                    None => return ExitCode::FAILURE,
                },
                None => switcher.list_monitors().into_iter().next(),
            };
            let Some(target) = target else {
                return report_all(&switcher, code, switcher.switch_all(code));
            };
            let outcome = switcher.switch_input(&target.key, code);
            if !report(&switcher, &target.label, code, outcome) {
                return ExitCode::FAILURE;
            }
            if confirm {
                let now = switcher.confirm_switch(&target.key).await;
                println!("{}: now on {}", target.label, input_name(&switcher, now));
            }
            ExitCode::SUCCESS
        }
        Cmd::SwitchAll { input } => {
            let Some(code) = parse_input(&switcher, &input) else {
                return ExitCode::FAILURE;
            };
            report_all(&switcher, code, switcher.switch_all(code))
        }
        Cmd::SetPosition { monitor, position } => {
            let Some(target) = find_monitor(&switcher, &monitor) else {
                return ExitCode::FAILURE;
            };
            let position = Position::parse(&position);
            switcher.set_position(&target.key, position);
            println!("{}: position {}", target.label, position);
            ExitCode::SUCCESS
        }
        Cmd::SetUsable { monitor, inputs } => {
            let Some(target) = find_monitor(&switcher, &monitor) else {
                return ExitCode::FAILURE;
            };
            let mut codes = Vec::with_capacity(inputs.len());
            for input in &inputs {
                let Some(code) = parse_input(&switcher, input) else {
                    return ExitCode::FAILURE;
                };
                codes.push(code);
            }
            switcher.set_usable_inputs(&target.key, codes);
            if inputs.is_empty() {
                println!("{}: all inputs usable", target.label);
            } else {
                println!("{}: usable inputs {}", target.label, inputs.join(", "));
            }
            ExitCode::SUCCESS
        }
    }
}

//  Helpers

fn parse_input<R, S>(switcher: &DisplaySwitcher<R, S>, input: &str) -> Option<InputCode>
where
    R: CommandRunner,
    S: SettingsStore,
{
    let code = switcher.config().inputs.lookup(input);
    if code.is_none() {
        error!("unknown input {:?} (see `ddc-switcher inputs`)", input);
    }
    code
}

fn find_monitor<R, S>(switcher: &DisplaySwitcher<R, S>, query: &str) -> Option<Monitor>
where
    R: CommandRunner,
    S: SettingsStore,
{
    let found = switcher.find(query);
    if found.is_none() {
        error!("no attached monitor matches {:?}", query);
    }
    found
}

fn input_name<R, S>(switcher: &DisplaySwitcher<R, S>, code: Option<InputCode>) -> String
where
    R: CommandRunner,
    S: SettingsStore,
{
    match code {
        Some(code) => match switcher.config().inputs.name_of(code) {
            Some(name) => format!("{} ({})", name, code),
            None => code.to_string(),
        },
        None => "unknown".into(),
    }
}

fn print_monitors<R, S>(switcher: &DisplaySwitcher<R, S>, json: bool) -> ExitCode
where
    R: CommandRunner,
    S: SettingsStore,
{
    let monitors = switcher.list_monitors();
    if json {
        return match serde_json::to_string_pretty(&monitors) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("cannot serialise monitor list: {}", e);
                ExitCode::FAILURE
            }
        };
    }
    if monitors.is_empty() {
        println!("no monitors detected");
    }
    for m in &monitors {
        println!(
            "{:>3}  {:<28} {:<32} {}",
            m.record.id,
            m.label,
            m.key,
            input_name(switcher, m.current_input)
        );
    }
    ExitCode::SUCCESS
}

/// Print the outcome of one switch.  Returns whether it was issued.
fn report<R, S>(
    switcher: &DisplaySwitcher<R, S>,
    label: &str,
    code: InputCode,
    outcome: SwitchOutcome,
) -> bool
where
    R: CommandRunner,
    S: SettingsStore,
{
    let input = input_name(switcher, Some(code));
    match outcome {
        SwitchOutcome::Issued => {
            println!("{}: switching to {}", label, input);
            true
        }
        SwitchOutcome::Rejected(reason) => {
            let why = match reason {
                RejectReason::UnknownMonitor => "monitor is not attached",
                RejectReason::UnrecognizedInput => "input is not in the catalogue",
                RejectReason::NotUsable => "input is not usable on this monitor",
            };
            println!("{}: not switching to {}: {}", label, input, why);
            false
        }
        SwitchOutcome::LaunchFailed => {
            error!("{}: could not start ddcutil", label);
            false
        }
    }
}

fn report_all<R, S>(
    switcher: &DisplaySwitcher<R, S>,
    code: InputCode,
    result: SwitchAll,
) -> ExitCode
where
    R: CommandRunner,
    S: SettingsStore,
{
    let issued = match result {
        SwitchAll::Untargeted(outcome) => report(switcher, "default display", code, outcome),
        SwitchAll::PerMonitor(outcomes) => {
            let labels: Vec<(String, String)> = switcher
                .list_monitors()
                .into_iter()
                .map(|m| (m.key, m.label))
                .collect();
            let mut any = false;
            for (key, outcome) in outcomes {
                let label = labels
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map_or(key.as_str(), |(_, l)| l.as_str());
                any |= report(switcher, label, code, outcome);
            }
            any
        }
    };
    if issued {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
