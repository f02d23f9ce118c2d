//! # apotheca
//!
//! Command line front end for the sale ledger. Every sale command prints the
//! JSON result envelope on stdout and exits non-zero when `success` is false.
//!
//! ## Usage
//! ```bash
//! # Populate an empty database with pharmacy items
//! apotheca seed --count 50
//!
//! # Record a sale
//! apotheca create 2025-01-15T10:30:00Z '[{"itemId":1,"quantity":2,"price":"10.00"}]'
//!
//! # Page through January
//! apotheca sales --page 1 --limit 10 --start 2025-01-01 --end 2025-01-31
//!
//! # Monthly revenue
//! apotheca revenue 2025
//! ```
//!
//! Configuration comes from the environment (see `AppConfig`); `--db`
//! overrides `APOTHECA_DB_PATH`.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use apotheca_actions::{
    create_sale_action, delete_sale_action, get_sale_action, init_tracing, list_sales_action,
    revenue_by_month_action, update_sale_action, AppConfig, AppState, FormData, Session,
};
use apotheca_core::ServiceResponse;
use apotheca_db::seed::{max_seed_items, seed_items};
use chrono::{Datelike, Utc};
use serde::Serialize;
use tracing::info;

const USAGE: &str = "\
Apotheca sales ledger

Usage: apotheca [OPTIONS] <COMMAND> [ARGS]

Commands:
  seed [--count <N>]                     Add demo items to an empty database
  items [--limit <N>]                    List items
  sales [--page <N>] [--limit <N>]
        [--start <DAY>] [--end <DAY>]    List sales, newest first
  sale <ID>                              Show one sale
  create <DATE> <ITEMS_JSON>             Record a sale
  update <ID> <DATE> <ITEMS_JSON>        Replace a sale's date and lines
  delete <ID>                            Delete a sale, restoring stock
  revenue [YEAR]                         Monthly revenue (default: this year)
  status                                 Database health and migrations

Options:
  -d, --db <PATH>     Database file path (default: ./apotheca.db)
  -u, --user <ID>     Act as this user (needed when APOTHECA_REQUIRE_AUTH is set)
  -h, --help          Show this help message";

/// Parsed command line.
#[derive(Debug, Default)]
struct Cli {
    db_path: Option<PathBuf>,
    user: Option<String>,
    count: Option<usize>,
    page: Option<String>,
    limit: Option<String>,
    start: Option<String>,
    end: Option<String>,
    help: bool,
    positional: Vec<String>,
}

impl Cli {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut cli = Cli::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| args.next().ok_or_else(|| format!("{flag} needs a value"));
            match arg.as_str() {
                "--db" | "-d" => cli.db_path = Some(PathBuf::from(value(&arg)?)),
                "--user" | "-u" => cli.user = Some(value(&arg)?),
                "--count" | "-c" => {
                    let raw = value(&arg)?;
                    cli.count = Some(raw.parse().map_err(|_| format!("invalid count '{raw}'"))?);
                }
                "--page" | "-p" => cli.page = Some(value(&arg)?),
                "--limit" | "-l" => cli.limit = Some(value(&arg)?),
                "--start" => cli.start = Some(value(&arg)?),
                "--end" => cli.end = Some(value(&arg)?),
                "--help" | "-h" => cli.help = true,
                _ => cli.positional.push(arg),
            }
        }
        Ok(cli)
    }

    fn arg(&self, idx: usize) -> Option<&str> {
        self.positional.get(idx).map(String::as_str)
    }

    fn session(&self) -> Session {
        match &self.user {
            Some(user) => Session::user(user.clone()),
            None => Session::anonymous(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = match Cli::parse(env::args().skip(1)) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("error: {msg}\n\n{USAGE}");
            return Ok(ExitCode::from(2));
        }
    };

    let Some(command) = cli.arg(0).map(str::to_string) else {
        println!("{USAGE}");
        return Ok(if cli.help { ExitCode::SUCCESS } else { ExitCode::from(2) });
    };
    if cli.help {
        println!("{USAGE}");
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = AppConfig::from_env()?;
    if let Some(path) = &cli.db_path {
        config.db_path = path.clone();
    }
    init_tracing(config.log_filter.as_deref());

    info!(command = %command, db = %config.db_path.display(), "apotheca starting");
    let state = AppState::connect(config).await?;
    let session = cli.session();

    let code = match command.as_str() {
        "seed" => {
            let count = cli.count.unwrap_or_else(max_seed_items);
            let report = seed_items(state.db(), count).await?;
            if report.existing > 0 {
                println!("Database already has {} items, skipping seed.", report.existing);
                println!("Delete the database file to regenerate.");
            } else {
                println!("Seeded {} items.", report.inserted);
            }
            ExitCode::SUCCESS
        }
        "items" => {
            let limit = match cli.limit.as_deref().map(str::parse::<u32>) {
                None => 50,
                Some(Ok(limit)) => limit,
                Some(Err(_)) => return usage_error("--limit must be a positive integer"),
            };
            let items = state.db().items().list(limit).await?;
            println!("{}", serde_json::to_string_pretty(&items)?);
            ExitCode::SUCCESS
        }
        "sales" => {
            let form: FormData = [
                ("page", &cli.page),
                ("limit", &cli.limit),
                ("startDate", &cli.start),
                ("endDate", &cli.end),
            ]
            .into_iter()
            .filter_map(|(name, value)| value.clone().map(|v| (name, v)))
            .collect();
            print(&list_sales_action(&state, &session, &form).await)?
        }
        "sale" | "delete" => {
            let Some(id) = cli.arg(1) else {
                return usage_error(&format!("{command} needs a sale id"));
            };
            let form = FormData::new().with("id", id);
            if command == "sale" {
                print(&get_sale_action(&state, &session, &form).await)?
            } else {
                print(&delete_sale_action(&state, &session, &form).await)?
            }
        }
        "create" => {
            let (Some(date), Some(items)) = (cli.arg(1), cli.arg(2)) else {
                return usage_error("create needs <DATE> <ITEMS_JSON>");
            };
            let form = FormData::new().with("date", date).with("saleItems", items);
            print(&create_sale_action(&state, &session, &form).await)?
        }
        "update" => {
            let (Some(id), Some(date), Some(items)) = (cli.arg(1), cli.arg(2), cli.arg(3)) else {
                return usage_error("update needs <ID> <DATE> <ITEMS_JSON>");
            };
            let form = FormData::new()
                .with("id", id)
                .with("date", date)
                .with("saleItems", items);
            print(&update_sale_action(&state, &session, &form).await)?
        }
        "revenue" => {
            let year = cli
                .arg(1)
                .map(str::to_string)
                .unwrap_or_else(|| Utc::now().year().to_string());
            let form = FormData::new().with("year", year);
            print(&revenue_by_month_action(&state, &session, &form).await)?
        }
        "status" => {
            #[derive(Serialize)]
            struct Status {
                healthy: bool,
                migrations: apotheca_db::MigrationStatus,
            }
            let status = Status {
                healthy: state.db().health_check().await,
                migrations: state.db().migration_status().await?,
            };
            println!("{}", serde_json::to_string_pretty(&status)?);
            ExitCode::SUCCESS
        }
        other => return usage_error(&format!("unknown command '{other}'")),
    };

    state.db().close().await;
    Ok(code)
}

/// Prints the envelope; failure envelopes map to exit code 1.
fn print<T: Serialize>(resp: &ServiceResponse<T>) -> Result<ExitCode, serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(resp)?);
    Ok(if resp.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn usage_error(msg: &str) -> Result<ExitCode, Box<dyn std::error::Error>> {
    eprintln!("error: {msg}\n\n{USAGE}");
    Ok(ExitCode::from(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse(args.iter().map(|a| a.to_string())).unwrap()
    }

    #[test]
    fn test_parse_flags_and_positionals() {
        let cli = parse(&["--db", "/tmp/a.db", "sales", "--page", "2", "--start", "2025-01-01"]);
        assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/a.db")));
        assert_eq!(cli.arg(0), Some("sales"));
        assert_eq!(cli.page.as_deref(), Some("2"));
        assert_eq!(cli.start.as_deref(), Some("2025-01-01"));
        assert!(cli.end.is_none());
    }

    #[test]
    fn test_missing_flag_value_is_an_error() {
        assert!(Cli::parse(["seed".to_string(), "--count".to_string()]).is_err());
        assert!(Cli::parse(["seed".to_string(), "--count".to_string(), "lots".to_string()]).is_err());
    }

    #[test]
    fn test_session_from_user_flag() {
        assert!(parse(&["-u", "till-1", "sales"]).session().is_authenticated());
        assert!(!parse(&["sales"]).session().is_authenticated());
    }
}
