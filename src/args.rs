//! These structs provide the CLI interface for the budget CLI.

use crate::model::{Amount, Category, ExpenseId, ExpenseUpdates, NewExpense, YearMonth};
use crate::transfer::ExportFormat;
use crate::view::{CategoryFilter, ViewMode};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing::level_filters::LevelFilter;

/// budget: A command-line tool for tracking personal expenses.
///
/// Expenses are kept in a JSON file in the budget home directory. Each report looks at one month
/// at a time and can be narrowed to one category or a search term. The breakdown command shows
/// how the month's spending is divided between categories.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. By default the data directory is $HOME/budget;
    /// pass --budget-home or set BUDGET_HOME to put it somewhere else.
    Init(InitArgs),
    /// Record a new expense.
    Add(AddArgs),
    /// Change fields of an existing expense.
    Update(UpdateArgs),
    /// Delete an expense by id.
    Delete(DeleteArgs),
    /// List the month's expenses, newest first.
    List(ViewArgs),
    /// Show the month's totals.
    Summary(ViewArgs),
    /// Show how the month's spending divides between categories.
    Breakdown(BreakdownArgs),
    /// Write all expenses to a JSON or CSV file.
    Export(ExportArgs),
    /// Replace all expenses with those in a JSON export file.
    Import(ImportArgs),
    /// Delete all expenses.
    Clear(ClearArgs),
    /// Show how much data is stored.
    Info,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where expense data and configuration is held. Defaults to ~/budget
    #[arg(long, env = "BUDGET_HOME", default_value_t = default_budget_home())]
    budget_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, budget_home: PathBuf) -> Self {
        Self {
            log_level,
            budget_home: budget_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn budget_home(&self) -> &DisplayPath {
        &self.budget_home
    }
}

/// Args for the `budget init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// How many backups to keep before each kind of destructive operation.
    #[arg(long, default_value_t = 5)]
    backup_copies: u32,

    /// The largest expense data file, in bytes, that will be written. Defaults to 5 MiB.
    #[arg(long, conflicts_with = "no_quota")]
    quota_bytes: Option<u64>,

    /// Do not limit the size of the expense data file.
    #[arg(long)]
    no_quota: bool,
}

impl InitArgs {
    pub fn new(backup_copies: u32, quota_bytes: Option<u64>) -> Self {
        Self {
            backup_copies,
            quota_bytes,
            no_quota: quota_bytes.is_none(),
        }
    }

    pub fn backup_copies(&self) -> u32 {
        self.backup_copies
    }

    /// The configured quota, `None` when there is no limit.
    pub fn quota_bytes(&self) -> Option<u64> {
        if self.no_quota {
            return None;
        }
        Some(self.quota_bytes.unwrap_or(crate::config::DEFAULT_QUOTA_BYTES))
    }
}

/// Args for the `budget add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The amount spent, e.g. 24.58 or $1,500.00
    #[arg(long)]
    amount: Amount,

    /// What the expense was for.
    #[arg(long, default_value = "")]
    description: String,

    /// The date of the expense as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// One of: housing, utilities, groceries, dining, transportation, subscriptions, healthcare,
    /// shopping, entertainment, other
    #[arg(long, default_value_t = Category::Other)]
    category: Category,

    /// Mark the expense as recurring.
    #[arg(long)]
    recurring: bool,

    /// How often a recurring expense repeats. Defaults to monthly.
    #[arg(long)]
    frequency: Option<String>,

    /// Free-form notes.
    #[arg(long)]
    notes: Option<String>,

    /// Use this id instead of generating one. It must not already be in use.
    #[arg(long)]
    id: Option<String>,
}

impl AddArgs {
    pub fn new(amount: Amount, description: impl Into<String>, category: Category) -> Self {
        Self {
            amount,
            description: description.into(),
            date: None,
            category,
            recurring: false,
            frequency: None,
            notes: None,
            id: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_recurring(mut self, frequency: Option<String>) -> Self {
        self.recurring = true;
        self.frequency = frequency;
        self
    }

    /// Builds the expense to add. `today` is used when no date was given.
    pub fn new_expense(&self, today: NaiveDate) -> NewExpense {
        NewExpense {
            id: self.id.as_deref().map(ExpenseId::from),
            date: self.date.unwrap_or(today),
            description: self.description.clone(),
            amount: self.amount,
            category: self.category.key().to_string(),
            recurring: self.recurring,
            frequency: self.frequency.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Args for the `budget update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    /// The id of the expense to change.
    id: String,

    #[arg(long)]
    amount: Option<Amount>,

    #[arg(long)]
    description: Option<String>,

    /// The new date as YYYY-MM-DD.
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    category: Option<Category>,

    /// Whether the expense recurs: true or false.
    #[arg(long)]
    recurring: Option<bool>,

    #[arg(long)]
    frequency: Option<String>,

    #[arg(long)]
    notes: Option<String>,
}

impl UpdateArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            amount: None,
            description: None,
            date: None,
            category: None,
            recurring: None,
            frequency: None,
            notes: None,
        }
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn id(&self) -> ExpenseId {
        ExpenseId::new(&self.id)
    }

    pub fn updates(&self) -> ExpenseUpdates {
        ExpenseUpdates {
            date: self.date,
            description: self.description.clone(),
            amount: self.amount,
            category: self.category.map(|c| c.key().to_string()),
            recurring: self.recurring,
            frequency: self.frequency.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Args for the `budget delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the expense to delete.
    id: String,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> ExpenseId {
        ExpenseId::new(&self.id)
    }
}

/// Selects which expenses a report looks at.
#[derive(Debug, Default, Parser, Clone)]
pub struct ViewArgs {
    /// The month to show as YYYY-MM. Defaults to the current month.
    #[arg(long)]
    month: Option<YearMonth>,

    /// Move this many months forward, or backward when negative, from --month.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    shift: i32,

    /// Only show this category key, or "all".
    #[arg(long)]
    category: Option<CategoryFilter>,

    /// Only show expenses whose description, amount or category name contains this text.
    #[arg(long)]
    search: Option<String>,
}

impl ViewArgs {
    pub fn new(month: YearMonth) -> Self {
        Self {
            month: Some(month),
            ..Self::default()
        }
    }

    pub fn with_shift(mut self, shift: i32) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn month(&self) -> Option<YearMonth> {
        self.month
    }

    pub fn shift(&self) -> i32 {
        self.shift
    }

    pub fn category(&self) -> Option<&CategoryFilter> {
        self.category.as_ref()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

/// Args for the `budget breakdown` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct BreakdownArgs {
    #[clap(flatten)]
    view_args: ViewArgs,

    /// How the breakdown is meant to be displayed.
    #[arg(long, value_enum, default_value_t = ViewMode::Treemap)]
    view: ViewMode,
}

impl BreakdownArgs {
    pub fn new(view_args: ViewArgs, view: ViewMode) -> Self {
        Self { view_args, view }
    }

    pub fn view_args(&self) -> &ViewArgs {
        &self.view_args
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }
}

/// Args for the `budget export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The file format.
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,

    /// The file or directory to write to. When a directory is given, or nothing, the file is
    /// named budget-tracker-<milliseconds>.<format>.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(format: ExportFormat, output: Option<PathBuf>) -> Self {
        Self { format, output }
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// Args for the `budget import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// A JSON file written by `budget export`.
    file: PathBuf,

    /// Confirm that all current expenses will be replaced.
    #[arg(long)]
    yes: bool,
}

impl ImportArgs {
    pub fn new(file: impl Into<PathBuf>, yes: bool) -> Self {
        Self {
            file: file.into(),
            yes,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// Args for the `budget clear` command.
#[derive(Debug, Parser, Clone)]
pub struct ClearArgs {
    /// Confirm that all expenses will be deleted.
    #[arg(long)]
    yes: bool,
}

impl ClearArgs {
    pub fn new(yes: bool) -> Self {
        Self { yes }
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

fn default_budget_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("budget"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --budget-home or BUDGET_HOME instead of relying on the default \
                budget home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("budget")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
