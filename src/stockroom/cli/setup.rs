use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use stockroom::export::ExportFormat;
use stockroom::model::{CriteriaPatch, SortField, SortOrder};

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
pub fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "stockroom", bin_name = "stockroom", version = get_version())]
#[command(about = "In-memory inventory manager with a live filter view", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<TopCommand>,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "FILE", global = true, help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Quiet time before the view is recomputed, in milliseconds
    #[arg(long, value_name = "MS", global = true, help_heading = "Options")]
    pub debounce_ms: Option<u64>,

    /// Start with an empty inventory instead of the sample products
    #[arg(long, global = true, help_heading = "Options")]
    pub no_sample: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopCommand {
    /// Start the interactive shell (default)
    Shell,
    /// Print the effective configuration as JSON
    Config {
        /// Also write it to the config file (the --config file, if given)
        #[arg(long)]
        save: bool,
    },
}

/// One line typed into the shell.
#[derive(Parser, Debug)]
#[command(
    name = "stockroom",
    no_binary_name = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

impl ShellLine {
    pub fn parse_words<I, T>(words: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(words)
    }
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ShellCommand {
    /// Add a product
    #[command(alias = "new", display_order = 1)]
    Add {
        #[arg(long)]
        name: Option<String>,

        #[arg(long, short = 'd')]
        description: Option<String>,

        #[arg(long, allow_negative_numbers = true)]
        price: Option<f64>,

        #[arg(long, alias = "qty", allow_negative_numbers = true)]
        quantity: Option<i64>,
    },

    /// Delete a product by id
    #[command(alias = "rm", display_order = 2)]
    Delete { id: u64 },

    /// Show the filtered product list
    #[command(alias = "ls", display_order = 3)]
    List,

    /// Show how many products the filters hide
    #[command(display_order = 4)]
    Summary,

    /// Change filters and sorting
    #[command(alias = "f", display_order = 10)]
    Filter(FilterArgs),

    /// Set the search term (no term clears it)
    #[command(display_order = 11)]
    Search {
        #[arg(trailing_var_arg = true, num_args = 0..)]
        term: Vec<String>,
    },

    /// Reset all filters and sorting
    #[command(display_order = 12)]
    Clear,

    /// Export the shown products to a file
    #[command(display_order = 20)]
    Export {
        /// csv or json
        format: ExportFormat,

        /// Leave out the CSV header row
        #[arg(long)]
        no_headers: bool,

        /// Output file name (default: filtered-products.<ext>)
        #[arg(long, short = 'o', value_name = "FILE")]
        out: Option<String>,
    },

    /// Write an inventory report over all products
    #[command(display_order = 21)]
    Report {
        /// Output file name (default: inventory-report.json)
        #[arg(long, short = 'o', value_name = "FILE")]
        out: Option<String>,
    },

    /// List current notifications
    #[command(alias = "toasts", display_order = 30)]
    Notifications,

    /// Dismiss a notification by id (or id prefix)
    #[command(display_order = 31)]
    Dismiss {
        #[arg(required_unless_present = "all")]
        id: Option<String>,

        #[arg(long, conflicts_with = "id")]
        all: bool,
    },

    /// Print help for the shell or a command
    #[command(display_order = 32)]
    Help { command: Option<String> },

    /// Leave the shell
    #[command(alias = "exit", display_order = 33)]
    Quit,
}

#[derive(Args, Debug, Default, PartialEq)]
pub struct FilterArgs {
    /// Match name or description (case-insensitive)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    #[arg(long, value_name = "X", allow_negative_numbers = true)]
    pub min_price: Option<f64>,

    #[arg(long, conflicts_with = "min_price")]
    pub no_min_price: bool,

    #[arg(long, value_name = "X", allow_negative_numbers = true)]
    pub max_price: Option<f64>,

    #[arg(long, conflicts_with = "max_price")]
    pub no_max_price: bool,

    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub min_qty: Option<f64>,

    #[arg(long, conflicts_with = "min_qty")]
    pub no_min_qty: bool,

    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub max_qty: Option<f64>,

    #[arg(long, conflicts_with = "max_qty")]
    pub no_max_qty: bool,

    /// name, price, quantity or id
    #[arg(long)]
    pub sort: Option<SortField>,

    /// asc or desc
    #[arg(long)]
    pub order: Option<SortOrder>,
}

impl FilterArgs {
    pub fn to_patch(&self) -> CriteriaPatch {
        CriteriaPatch {
            search_term: self.search.clone(),
            min_price: bound(self.min_price, self.no_min_price),
            max_price: bound(self.max_price, self.no_max_price),
            min_quantity: bound(self.min_qty, self.no_min_qty),
            max_quantity: bound(self.max_qty, self.no_max_qty),
            sort_by: self.sort,
            sort_order: self.order,
        }
    }
}

fn bound(value: Option<f64>, unset: bool) -> Option<Option<f64>> {
    if unset {
        Some(None)
    } else {
        value.map(Some)
    }
}

/// Command group definitions for help output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Products,
    Filters,
    Data,
    Misc,
}

impl CommandGroup {
    pub fn heading(&self) -> &'static str {
        match self {
            CommandGroup::Products => "Product Commands:",
            CommandGroup::Filters => "Filter Commands:",
            CommandGroup::Data => "Data Commands:",
            CommandGroup::Misc => "Miscellaneous:",
        }
    }

    pub fn for_command(name: &str) -> Option<Self> {
        match name {
            "add" | "delete" | "list" | "summary" => Some(CommandGroup::Products),
            "filter" | "search" | "clear" => Some(CommandGroup::Filters),
            "export" | "report" => Some(CommandGroup::Data),
            "notifications" | "dismiss" | "help" | "quit" => Some(CommandGroup::Misc),
            _ => None,
        }
    }

    pub fn all() -> &'static [CommandGroup] {
        &[
            CommandGroup::Products,
            CommandGroup::Filters,
            CommandGroup::Data,
            CommandGroup::Misc,
        ]
    }
}

/// Grouped overview of the shell commands
pub fn get_grouped_help() -> String {
    render_grouped_help(&ShellLine::command())
}

fn render_grouped_help(cmd: &clap::Command) -> String {
    let subcommands: Vec<_> = cmd.get_subcommands().collect();

    let mut output = String::new();
    output.push_str(&format!("stockroom {}\n", get_version()));
    output.push_str("Type a command, or 'help <command>' for its options.\n");

    for group in CommandGroup::all() {
        let group_cmds: Vec<_> = subcommands
            .iter()
            .filter(|sc| {
                !sc.is_hide_set() && CommandGroup::for_command(sc.get_name()) == Some(*group)
            })
            .collect();

        if !group_cmds.is_empty() {
            output.push('\n');
            output.push_str(&format!("{}\n", group.heading()));
            for sc in group_cmds {
                let about = sc.get_about().map(|s| s.to_string()).unwrap_or_default();
                output.push_str(&format!("  {:<14} {}\n", sc.get_name(), about));
            }
        }
    }
    output
}

/// Help for a single shell command, or `None` if there is no such command.
pub fn get_command_help(name: &str) -> Option<String> {
    let mut cmd = ShellLine::command();
    cmd.build();
    let help = cmd
        .get_subcommands_mut()
        .find(|sc| sc.get_name() == name || sc.get_all_aliases().any(|a| a == name))
        .map(|sc| sc.render_help().to_string());
    help
}

/// Splits a shell line into words. Single and double quotes group words,
/// backslash escapes the next character outside single quotes.
pub fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some('\''), '\'') | (Some('"'), '"') => quote = None,
            (Some('"'), '\\') | (None, '\\') => match chars.next() {
                Some(escaped) => {
                    current.push(escaped);
                    in_word = true;
                }
                None => return Err("line ends with a backslash".to_string()),
            },
            (Some(_), _) => current.push(c),
            (None, '\'') | (None, '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, _) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("unclosed {} quote", q));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
