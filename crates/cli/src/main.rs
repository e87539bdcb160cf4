use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dashboard::forms::{MotionForm, PointForm, PointKind, SpeechForm};
use dashboard::render::{event_line, render_analytics, render_committee_index, render_dashboard};
use dashboard::upload;
use mun_api::Config;
use mun_core::db::{self, DbPool};
use mun_core::schema::{MotionStatus, NewCommittee, NewEvent};
use mun_core::stats::{self, SortDirection, SortField, SortOrder};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mun-tracker")]
#[command(about = "Model UN committee event tracker", long_about = None)]
struct Cli {
    /// SQLite database file (overrides config and MUN_DATABASE)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Export JSON Schemas of the wire records
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
    Committee {
        #[command(subcommand)]
        command: CommitteeCommands,
    },
    Roster {
        #[command(subcommand)]
        command: RosterCommands,
    },
    /// Record an event
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },
    /// Print delegate participation for a committee
    Stats {
        committee: String,
        #[arg(long, default_value = "totalParticipation")]
        sort: SortField,
        #[arg(long, default_value = "desc")]
        direction: SortDirection,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    Export {
        /// Output directory (default: ./schemas)
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum CommitteeCommands {
    Create {
        name: String,
        #[arg(long)]
        password: String,
    },
    List,
    /// Print a committee's roster and event history
    Show { id: String },
    Delete {
        id: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum RosterCommands {
    /// Replace a committee's portfolios from a JSON array file
    Import { committee: String, file: PathBuf },
}

#[derive(Subcommand)]
enum EventCommands {
    Speech {
        committee: String,
        #[arg(long, default_value = "")]
        portfolio: String,
        #[arg(long, default_value = "")]
        duration: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Point of information
    Poi {
        committee: String,
        #[arg(long, default_value = "")]
        raiser: String,
        #[arg(long, default_value = "")]
        target: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Point of order
    Poo {
        committee: String,
        #[arg(long, default_value = "")]
        raiser: String,
        #[arg(long, default_value = "")]
        target: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Motion {
        committee: String,
        #[arg(long, default_value = "")]
        raiser: String,
        #[arg(long = "type", default_value = "")]
        motion_type: String,
        #[arg(long, default_value = "pending")]
        status: MotionStatus,
        #[arg(long, default_value = "")]
        description: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(config.as_deref(), cli.db.as_deref()),
        Commands::Schema { command } => match command {
            SchemaCommands::Export { out_dir } => schema_export(out_dir),
        },
        Commands::Committee { command } => committee(open_pool(cli.db.as_deref())?, command),
        Commands::Roster { command } => match command {
            RosterCommands::Import { committee, file } => {
                roster_import(open_pool(cli.db.as_deref())?, &committee, &file)
            }
        },
        Commands::Event { command } => event(open_pool(cli.db.as_deref())?, command),
        Commands::Stats {
            committee,
            sort,
            direction,
        } => print_stats(
            open_pool(cli.db.as_deref())?,
            &committee,
            SortOrder::new(sort, direction),
        ),
    }
}

fn load_config(config: Option<&Path>, db: Option<&Path>) -> Result<Config> {
    let mut config = Config::load(config)?;
    if let Some(db) = db {
        config.database_path = db.display().to_string();
    }
    Ok(config)
}

fn open_pool(db: Option<&Path>) -> Result<DbPool> {
    let config = load_config(None, db)?;
    let pool = db::open(&config.database_path, config.pool_size)
        .with_context(|| format!("opening database {}", config.database_path))?;
    Ok(pool)
}

fn serve(config: Option<&Path>, db: Option<&Path>) -> Result<()> {
    let config = load_config(config, db)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;
    runtime.block_on(mun_api::run_server(config))
}

fn schema_export(out_dir: PathBuf) -> Result<()> {
    fs::create_dir_all(&out_dir)?;

    let schemas = [
        ("Committee", schema_for!(mun_core::schema::Committee)),
        ("CommitteeSummary", schema_for!(mun_core::schema::CommitteeSummary)),
        ("Portfolio", schema_for!(mun_core::schema::Portfolio)),
        ("Event", schema_for!(mun_core::schema::Event)),
        ("DelegateStats", schema_for!(mun_core::stats::DelegateStats)),
        ("Analytics", schema_for!(mun_core::stats::Analytics)),
    ];
    for (name, schema) in &schemas {
        let json = serde_json::to_string_pretty(schema)?;
        fs::write(out_dir.join(format!("{name}.schema.json")), json)?;
    }

    println!("Exported {} schemas to {}", schemas.len(), out_dir.display());
    Ok(())
}

fn committee(pool: DbPool, command: CommitteeCommands) -> Result<()> {
    let conn = pool.get()?;
    match command {
        CommitteeCommands::Create { name, password } => {
            let input = NewCommittee::new(Some(&name), Some(&password))?;
            let committee = db::create_committee(&conn, &input.name, &input.password)?;
            info!(committee_id = %committee.id, "Committee created");
            println!("{}", committee.id);
        }
        CommitteeCommands::List => {
            println!("{}", render_committee_index(&db::list_committees(&conn)?));
        }
        CommitteeCommands::Show { id } => {
            let Some(found) = db::get_committee(&conn, &id)? else {
                bail!("Committee {id} not found");
            };
            let events = db::list_events(&conn, &id)?;
            println!("{}", render_dashboard(&found, &events));
        }
        CommitteeCommands::Delete { id, password } => {
            if !db::delete_committee(&conn, &id, &password)? {
                bail!("Invalid password or committee not found");
            }
            info!(committee_id = %id, "Committee deleted");
        }
    }
    Ok(())
}

fn roster_import(pool: DbPool, committee: &str, file: &Path) -> Result<()> {
    let names = upload::read_roster_file(file)?;
    let mut conn = pool.get()?;
    db::replace_portfolios(&mut conn, committee, &names)?;
    println!("Imported {} portfolios", names.len());
    Ok(())
}

fn event(pool: DbPool, command: EventCommands) -> Result<()> {
    let (committee, new_event) = match command {
        EventCommands::Speech {
            committee,
            portfolio,
            duration,
            description,
        } => {
            let form = SpeechForm {
                portfolio,
                duration,
                description,
            };
            (committee, form.submit().context("A speech needs --portfolio")?)
        }
        EventCommands::Poi {
            committee,
            raiser,
            target,
            description,
        } => (
            committee,
            point(PointKind::Information, raiser, target, description)?,
        ),
        EventCommands::Poo {
            committee,
            raiser,
            target,
            description,
        } => (
            committee,
            point(PointKind::Order, raiser, target, description)?,
        ),
        EventCommands::Motion {
            committee,
            raiser,
            motion_type,
            status,
            description,
        } => {
            let form = MotionForm {
                raiser,
                motion_type,
                status,
                description,
            };
            (
                committee,
                form.submit().context("A motion needs --raiser and --type")?,
            )
        }
    };

    let conn = pool.get()?;
    let recorded = db::add_event(&conn, &committee, new_event)?;
    println!("{} {}", recorded.kind.label(), event_line(&recorded));
    Ok(())
}

fn point(kind: PointKind, raiser: String, target: String, description: String) -> Result<NewEvent> {
    let form = PointForm {
        kind,
        raiser,
        target,
        description,
    };
    form.submit().context("A point needs --raiser and --target")
}

fn print_stats(pool: DbPool, committee: &str, order: SortOrder) -> Result<()> {
    let conn = pool.get()?;
    let Some(found) = db::get_committee(&conn, committee)? else {
        bail!("Committee {committee} not found");
    };
    let events = db::list_events(&conn, committee)?;
    let analytics = stats::analyze(&events, &found.portfolios, order);
    println!("{}", render_analytics(&analytics, found.portfolios.len(), order));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn schema_export_writes_one_file_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("schemas");

        schema_export(out_dir.clone()).unwrap();

        let raw = fs::read_to_string(out_dir.join("Event.schema.json")).unwrap();
        let schema: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(schema["title"], "Event");
        assert!(schema["properties"]["committeeId"].is_object());
        for name in ["Committee", "CommitteeSummary", "Portfolio", "DelegateStats", "Analytics"] {
            assert!(out_dir.join(format!("{name}.schema.json")).exists());
        }
    }
}
