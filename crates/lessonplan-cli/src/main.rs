mod config;
mod generate_cmd;
mod serve_cmd;
mod setup;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lessonplan_db::pool;
use lessonplan_db::queries::lesson_plans;

use config::{CliOverrides, LessonplanConfig};
use generate_cmd::GenerateArgs;
use setup::Service;

#[derive(Parser)]
#[command(name = "lessonplan", about = "AI-assisted, BNCC-aligned lesson plan generator")]
struct Cli {
    /// Config file path (defaults to ~/.config/lessonplan/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a lessonplan config file skeleton
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create the lesson plan database and run migrations (postgres store)
    DbInit,
    /// Serve the lesson plan HTTP endpoint
    Serve {
        /// Address to bind (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides PORT env var)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate one lesson plan and print it as JSON
    Generate {
        /// Lesson topic
        #[arg(long)]
        topic: String,
        /// Grade level, e.g. "7º ano"
        #[arg(long)]
        grade_level: String,
        /// School subject
        #[arg(long)]
        subject: String,
        /// Classroom context (defaults to a standard classroom)
        #[arg(long)]
        learning_context: Option<String>,
        /// Lesson length in minutes (at least 15)
        #[arg(long)]
        duration_minutes: Option<String>,
        /// Authorization value forwarded to the store
        #[arg(long)]
        credential: Option<String>,
    },
}

/// Execute the `lessonplan init` command: write config file.
fn cmd_init(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config::config_path);

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    config::save_config(&path, &config::ConfigFile::skeleton())?;

    println!("Config written to {}", path.display());
    println!();
    println!("Next: set gemini.api_key, then either");
    println!("  store.supabase_url and store.supabase_anon_key (rpc backend), or");
    println!("  store.backend = \"postgres\" and run `lessonplan db-init`.");

    Ok(())
}

/// Execute the `lessonplan db-init` command: create database and run migrations.
async fn cmd_db_init(resolved: &LessonplanConfig) -> anyhow::Result<()> {
    println!("Initializing lessonplan database...");

    // 1. Create the database if it does not exist.
    pool::ensure_database_exists(&resolved.db_config).await?;

    // 2. Connect to the target database.
    let db_pool = pool::create_pool(&resolved.db_config).await?;

    // 3. Run migrations.
    pool::run_migrations(&db_pool).await?;

    // 4. Report.
    let count = lesson_plans::count_lesson_plans(&db_pool).await?;
    println!("Database ready. lesson_plans: {count} rows");

    db_pool.close().await;

    println!("lessonplan db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init { force } => {
            cmd_init(cli.config.clone(), force)?;
        }
        Commands::DbInit => {
            let resolved = LessonplanConfig::resolve(config_path, CliOverrides::default())?;
            cmd_db_init(&resolved).await?;
        }
        Commands::Serve { bind, port } => {
            let overrides = CliOverrides {
                bind: bind.as_deref(),
                port,
            };
            let resolved = LessonplanConfig::resolve(config_path, overrides)?;
            let service = Service::connect(&resolved).await?;
            let result = serve_cmd::run_serve(
                service.pipeline.clone(),
                &resolved.server.bind,
                resolved.server.port,
            )
            .await;
            service.close().await;
            result?;
        }
        Commands::Generate {
            topic,
            grade_level,
            subject,
            learning_context,
            duration_minutes,
            credential,
        } => {
            let resolved = LessonplanConfig::resolve(config_path, CliOverrides::default())?;
            let args = GenerateArgs {
                topic,
                grade_level,
                subject,
                learning_context,
                duration_minutes,
                credential,
            };
            generate_cmd::run_generate(&resolved, args).await?;
        }
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "lessonplan",
            "--config",
            "/tmp/lp.toml",
            "generate",
            "--topic",
            "Fotossíntese",
            "--grade-level",
            "7º ano",
            "--subject",
            "Ciências",
            "--duration-minutes",
            "50",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/lp.toml")));
        match cli.command {
            Commands::Generate {
                topic,
                grade_level,
                duration_minutes,
                learning_context,
                ..
            } => {
                assert_eq!(topic, "Fotossíntese");
                assert_eq!(grade_level, "7º ano");
                assert_eq!(duration_minutes.as_deref(), Some("50"));
                assert!(learning_context.is_none());
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::try_parse_from(["lessonplan", "serve", "--port", "9001"]).unwrap();
        match cli.command {
            Commands::Serve { bind, port } => {
                assert!(bind.is_none());
                assert_eq!(port, Some(9001));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");

        cmd_init(Some(path.clone()), false).unwrap();
        assert!(path.exists());

        let err = cmd_init(Some(path.clone()), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        cmd_init(Some(path), true).unwrap();
    }
}
