// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use std::path::PathBuf;

use student_registry::{
    registry_from, Config, SearchMode, SortDirection, SortKey, Student, StudentRegistry,
};

#[derive(Parser)]
#[command(name = "student-registry")]
#[command(about = "Manage an in-memory list of student records", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed the registry from this CSV file (id,name,class,grade)
    #[arg(long, global = true, value_name = "CSV")]
    seed: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal UI (default)
    Ui,

    /// Print the students matching a search, optionally sorted
    #[command(alias = "ls")]
    List(ListArgs),
}

#[derive(clap::Args)]
struct ListArgs {
    /// Case-insensitive substring to search for
    #[arg(short, long, default_value = "")]
    query: String,

    /// Field the query matches against
    #[arg(long, value_enum)]
    by: Option<SearchField>,

    /// Column to sort on
    #[arg(long, value_enum)]
    sort: Option<SortColumn>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SearchField {
    Name,
    Class,
    All,
}

impl From<SearchField> for SearchMode {
    fn from(field: SearchField) -> Self {
        match field {
            SearchField::Name => SearchMode::ByName,
            SearchField::Class => SearchMode::ByClass,
            SearchField::All => SearchMode::All,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortColumn {
    Name,
    Class,
    Grade,
}

impl From<SortColumn> for SortKey {
    fn from(column: SortColumn) -> Self {
        match column {
            SortColumn::Name => SortKey::Name,
            SortColumn::Class => SortKey::Class,
            SortColumn::Grade => SortKey::Grade,
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let interactive = !matches!(cli.command, Some(Commands::List(_)));

    // Logs share the terminal with the TUI, so they stay off there unless asked for.
    let default_filter = match (cli.debug, interactive) {
        (true, _) => "debug",
        (false, true) => "off",
        (false, false) => "warn",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let config = resolve_config(&cli)?;
    let registry = registry_from(config.seed_csv.as_deref())?;

    match cli.command {
        Some(Commands::List(args)) => run_list(&registry, &config, &args),
        Some(Commands::Ui) | None => run_ui_mode(registry, &config),
    }
}

/// Config file values, with `--seed` taking precedence over `seed_csv`.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(seed) = &cli.seed {
        config.seed_csv = Some(seed.clone());
    }
    Ok(config)
}

/// Rows `list` prints: search results, sorted when `--sort` is given.
fn list_view(registry: &StudentRegistry, args: &ListArgs, config: &Config) -> Vec<Student> {
    let mode = args.by.map(SearchMode::from).unwrap_or(config.default_search_mode);
    let found = registry.search(&args.query, mode);

    match args.sort {
        Some(column) => {
            let direction = if args.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            student_registry::sort(&found, column.into(), direction)
        }
        None => found,
    }
}

fn run_list(registry: &StudentRegistry, config: &Config, args: &ListArgs) -> Result<()> {
    let students = list_view(registry, args, config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&students)?);
    } else {
        print_table(&students);
    }

    Ok(())
}

fn print_table(students: &[Student]) {
    if students.is_empty() {
        println!("No students found");
        return;
    }

    println!("{:<16} {:<30} {:<10} {:<5}", "ID", "NAME", "CLASS", "GRADE");
    for s in students {
        println!("{:<16} {:<30} {:<10} {:<5}", s.id, s.name, s.class, s.grade);
    }
    println!("\nTotal Students: {}", students.len());
}

#[cfg(feature = "tui")]
fn run_ui_mode(registry: StudentRegistry, config: &Config) -> Result<()> {
    let mut app = student_registry::App::new(registry, config);
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_registry: StudentRegistry, _config: &Config) -> Result<()> {
    anyhow::bail!("TUI mode not available; rebuild with `--features tui` or use `list`")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn roster() -> StudentRegistry {
        StudentRegistry::from_seed(vec![
            Student::new("1", "Sofia", "1st Year", "B"),
            Student::new("2", "Yuki", "3rd Year", "A"),
            Student::new("3", "Ann", "5th", "A"),
            Student::new("4", "Diego", "2nd Year", "B+"),
        ])
        .unwrap()
    }

    fn list_args(argv: &[&str]) -> ListArgs {
        let cli = Cli::try_parse_from(argv.iter().copied()).unwrap();
        match cli.command {
            Some(Commands::List(args)) => args,
            _ => panic!("expected list subcommand"),
        }
    }

    fn names(students: &[Student]) -> Vec<&str> {
        students.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_list_by_defaults_to_config_mode() {
        let args = list_args(&["student-registry", "list", "-q", "year"]);
        let config = Config {
            default_search_mode: SearchMode::ByClass,
            ..Config::default()
        };

        let view = list_view(&roster(), &args, &config);

        assert_eq!(names(&view), vec!["Sofia", "Yuki", "Diego"]);

        // Default config searches names, where "year" matches nobody.
        assert!(list_view(&roster(), &args, &Config::default()).is_empty());
    }

    #[test]
    fn test_list_by_flag_overrides_config() {
        let args = list_args(&["student-registry", "list", "--by", "name", "-q", "ann"]);
        let config = Config {
            default_search_mode: SearchMode::ByClass,
            ..Config::default()
        };

        assert_eq!(names(&list_view(&roster(), &args, &config)), vec!["Ann"]);
    }

    #[test]
    fn test_list_sort_and_desc() {
        let args = list_args(&[
            "student-registry", "list", "--by", "class", "-q", "year", "--sort", "name", "--desc",
        ]);

        let view = list_view(&roster(), &args, &Config::default());

        assert_eq!(names(&view), vec!["Yuki", "Sofia", "Diego"]);
    }

    #[test]
    fn test_list_by_all_ignores_query() {
        let args = list_args(&["student-registry", "list", "--by", "all", "-q", "zzz"]);
        assert_eq!(list_view(&roster(), &args, &Config::default()).len(), 4);
    }

    #[test]
    fn test_desc_requires_sort() {
        assert!(Cli::try_parse_from(["student-registry", "list", "--desc"]).is_err());
    }

    #[test]
    fn test_seed_flag_wins_over_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "seed_csv = \"from_file.csv\"").unwrap();
        let config_arg = path.to_str().unwrap();

        let cli = Cli::try_parse_from(["student-registry", "-c", config_arg, "list"]).unwrap();
        assert_eq!(
            resolve_config(&cli).unwrap().seed_csv,
            Some(dir.path().join("from_file.csv"))
        );

        let cli = Cli::try_parse_from([
            "student-registry", "-c", config_arg, "--seed", "/tmp/override.csv", "list",
        ])
        .unwrap();
        assert_eq!(
            resolve_config(&cli).unwrap().seed_csv,
            Some(PathBuf::from("/tmp/override.csv"))
        );
    }
}
