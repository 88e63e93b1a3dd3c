use super::print::{
    print_messages, print_notification, print_notifications, print_products, print_summary,
};
use super::setup::{
    get_command_help, get_grouped_help, get_version, split_words, Cli, ShellCommand, ShellLine,
    TopCommand,
};
use clap::Parser;
use std::collections::HashSet;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use stockroom::api::{CmdMessage, CmdResult, StockroomApi};
use stockroom::commands::filter::describe;
use stockroom::config::StockroomConfig;
use stockroom::error::{Result, StockroomError};
use stockroom::export::{ExportFormat, ExportOptions};
use stockroom::model::{CriteriaPatch, ProductDraft};
use stockroom::store::memory::InMemoryStore;
use stockroom::timer::SystemClock;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "STOCKROOM_LOG";
const DEFAULT_EXPORT_NAME: &str = "filtered-products";
const DEFAULT_REPORT_NAME: &str = "inventory-report";

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    match cli.command.unwrap_or(TopCommand::Shell) {
        TopCommand::Config { save } => handle_config(config, save, cli.config.as_deref()),
        TopCommand::Shell => run_shell(config, !cli.no_sample),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("stockroom=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<StockroomConfig> {
    let mut config = match &cli.config {
        Some(path) => StockroomConfig::load_file(path)?,
        None => match StockroomConfig::default_dir() {
            Some(dir) => StockroomConfig::load(dir)?,
            None => StockroomConfig::default(),
        },
    };
    if let Some(ms) = cli.debounce_ms {
        config.debounce_ms = ms;
    }
    Ok(config)
}

fn handle_config(config: StockroomConfig, save: bool, file: Option<&Path>) -> Result<()> {
    let api = StockroomApi::new(InMemoryStore::new(), config, SystemClock::new());
    let Some(config) = api.config().config else {
        return Ok(());
    };
    println!("{}", serde_json::to_string_pretty(&config)?);

    if save {
        let path = match (file, StockroomConfig::default_dir()) {
            (Some(path), _) => {
                config.save_file(path)?;
                path.to_path_buf()
            }
            (None, Some(dir)) => config.save(dir)?,
            (None, None) => {
                return Err(StockroomError::Config(
                    "no config directory available".to_string(),
                ));
            }
        };
        print_messages(&[CmdMessage::success(format!(
            "Config saved to {}",
            path.display()
        ))]);
    }
    Ok(())
}

enum Flow {
    Continue,
    Quit,
}

struct Shell {
    api: StockroomApi<InMemoryStore>,
    seen: HashSet<String>,
}

fn run_shell(config: StockroomConfig, load_sample: bool) -> Result<()> {
    let interactive = io::stdin().is_terminal() && console::Term::stdout().is_term();
    if !console::Term::stdout().is_term() {
        colored::control::set_override(false);
    }

    let mut shell = Shell {
        api: StockroomApi::new(InMemoryStore::new(), config, SystemClock::new()),
        seen: HashSet::new(),
    };
    if load_sample {
        shell.api.schedule_sample_load();
    }
    if interactive {
        println!("stockroom {} - type 'help' for commands", get_version());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("stockroom> ");
            io::stdout().flush()?;
        }
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };

        shell.api.tick();
        let flow = shell.execute(&line);
        shell.api.tick();
        shell.print_new_notifications();

        if let Flow::Quit = flow {
            break;
        }
    }
    Ok(())
}

impl Shell {
    fn execute(&mut self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Flow::Continue;
        }

        let words = match split_words(line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("Error: {}", e);
                return Flow::Continue;
            }
        };
        let command = match ShellLine::parse_words(&words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                let _ = e.print();
                return Flow::Continue;
            }
        };
        tracing::debug!(?command, "shell command");
        self.dispatch(command)
    }

    fn dispatch(&mut self, command: ShellCommand) -> Flow {
        let api = &mut self.api;
        let outcome = match command {
            ShellCommand::Add {
                name,
                description,
                price,
                quantity,
            } => api.add_product(ProductDraft {
                name,
                description,
                price,
                quantity,
            }),
            ShellCommand::Delete { id } => api.delete_product(id),
            ShellCommand::List => {
                handle_list(api);
                return Flow::Continue;
            }
            ShellCommand::Summary => {
                handle_summary(api);
                return Flow::Continue;
            }
            ShellCommand::Filter(args) => api.update_filter(&args.to_patch()),
            ShellCommand::Search { term } => {
                api.update_filter(&CriteriaPatch::default().search(term.join(" ")))
            }
            ShellCommand::Clear => api.clear_filters(),
            ShellCommand::Export {
                format,
                no_headers,
                out,
            } => {
                let mut options = ExportOptions::new(format)
                    .with_filename(out.unwrap_or_else(|| DEFAULT_EXPORT_NAME.to_string()));
                if no_headers && format == ExportFormat::Csv {
                    options = options.without_headers();
                }
                api.export(&options)
            }
            ShellCommand::Report { out } => {
                api.report(Some(out.as_deref().unwrap_or(DEFAULT_REPORT_NAME)))
            }
            ShellCommand::Notifications => {
                let current = api.notifications();
                print_notifications(&current);
                self.seen.extend(current.into_iter().map(|n| n.id));
                return Flow::Continue;
            }
            ShellCommand::Dismiss { id, all } => match (id, all) {
                (_, true) => Ok(api.dismiss_all()),
                (Some(id), false) => api.dismiss(&id),
                (None, false) => Ok(CmdResult::default()),
            },
            ShellCommand::Help { command } => {
                handle_help(command.as_deref());
                return Flow::Continue;
            }
            ShellCommand::Quit => return Flow::Quit,
        };

        // Failures are already in the notification center.
        if let Ok(result) = outcome {
            print_messages(&result.messages);
        }
        Flow::Continue
    }

    fn print_new_notifications(&mut self) {
        let current = self.api.notifications();
        for n in &current {
            if self.seen.insert(n.id.clone()) {
                print_notification(n);
            }
        }
        let live: HashSet<&str> = current.iter().map(|n| n.id.as_str()).collect();
        self.seen.retain(|id| live.contains(id.as_str()));
    }
}

fn handle_list(api: &StockroomApi<InMemoryStore>) {
    let result = api.list();
    print_products(&result.listed_products);
    if let Some(summary) = &result.summary {
        print_summary(summary);
    }
    print_messages(&result.messages);
}

fn handle_summary(api: &StockroomApi<InMemoryStore>) {
    if let Some(summary) = api.summary() {
        print_summary(&summary);
    }
    println!("{}", describe(api.criteria().current()));
}

fn handle_help(command: Option<&str>) {
    match command {
        None => print!("{}", get_grouped_help()),
        Some(name) => match get_command_help(name) {
            Some(help) => print!("{}", help),
            None => {
                eprintln!("Unknown command: {}", name);
                eprintln!();
                print!("{}", get_grouped_help());
            }
        },
    }
}
