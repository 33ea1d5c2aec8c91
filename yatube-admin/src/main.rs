use std::process;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

const UNIQUE_VIOLATION: &str = "23505";
const TITLE_MAX_CHARS: usize = 200;
const SLUG_MAX_CHARS: usize = 50;

#[derive(Debug, Parser)]
#[command(name = "yatube-admin", version, about = "Администрирование сообществ Yatube")]
struct Cli {
    /// Строка подключения к Postgres (по умолчанию берётся из DATABASE_URL).
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Операции с группами (сообществами).
    Group {
        #[command(subcommand)]
        action: GroupCommand,
    },
}

#[derive(Debug, Subcommand)]
enum GroupCommand {
    /// Создание группы.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        slug: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Список групп.
    List,
    /// Удаление группы. Посты группы остаются, но теряют привязку к ней.
    Delete {
        #[arg(long)]
        slug: String,
    },
}

#[derive(Debug, FromRow)]
struct GroupRow {
    id: i64,
    title: String,
    slug: String,
    description: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging();

    let database_url = resolve_database_url(cli.database_url)?;
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await
        .context("не удалось подключиться к базе данных")?;

    match cli.command {
        Command::Group { action } => match action {
            GroupCommand::Create {
                title,
                slug,
                description,
            } => {
                let (title, slug) = validate_group(&title, &slug)?;
                let id = create_group(&pool, &title, &slug, &description).await?;
                info!(group_id = id, slug = %slug, "group created");
                println!("Группа создана: id={id}, slug={slug}");
            }
            GroupCommand::List => {
                let groups = list_groups(&pool).await?;
                print_groups(&groups);
            }
            GroupCommand::Delete { slug } => {
                delete_group(&pool, slug.trim()).await?;
                info!(slug = %slug, "group deleted");
                println!("Группа удалена: slug={slug}");
            }
        },
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn,sqlx=warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn resolve_database_url(flag: Option<String>) -> Result<String> {
    let url = match flag {
        Some(url) => url,
        None => std::env::var("DATABASE_URL")
            .context("укажите --database-url или переменную DATABASE_URL")?,
    };
    let url = url.trim().to_string();
    if url.is_empty() {
        bail!("строка подключения к базе данных пуста");
    }
    Ok(url)
}

/// Same rules the web application applies when it loads a group.
fn validate_group(title: &str, slug: &str) -> Result<(String, String)> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > TITLE_MAX_CHARS {
        bail!("название группы должно содержать от 1 до {TITLE_MAX_CHARS} символов");
    }

    let slug = slug.trim();
    let valid_slug = !slug.is_empty()
        && slug.len() <= SLUG_MAX_CHARS
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid_slug {
        bail!("slug может содержать только латиницу, цифры, '-' и '_' (до {SLUG_MAX_CHARS} символов)");
    }

    Ok((title.to_string(), slug.to_string()))
}

async fn create_group(pool: &PgPool, title: &str, slug: &str, description: &str) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO groups (title, slug, description) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(title)
    .bind(slug)
    .bind(description)
    .fetch_one(pool)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            anyhow!("группа со slug '{slug}' уже существует")
        } else {
            anyhow::Error::new(err).context("не удалось создать группу")
        }
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION))
}

async fn list_groups(pool: &PgPool) -> Result<Vec<GroupRow>> {
    sqlx::query_as::<_, GroupRow>(
        "SELECT id, title, slug, description FROM groups ORDER BY title, id",
    )
    .fetch_all(pool)
    .await
    .context("не удалось получить список групп")
}

async fn delete_group(pool: &PgPool, slug: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM groups WHERE slug = $1")
        .bind(slug)
        .execute(pool)
        .await
        .context("не удалось удалить группу")?;

    if result.rows_affected() == 0 {
        bail!("группа со slug '{slug}' не найдена");
    }
    Ok(())
}

fn print_groups(groups: &[GroupRow]) {
    println!("Групп: {}", groups.len());
    for group in groups {
        println!("- [{}] {} ({})", group.id, group.title, group.slug);
        if !group.description.is_empty() {
            println!("    {}", group.description);
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn validate_group_trims_input() {
        let (title, slug) = validate_group("  Котики  ", " cats ").expect("must be valid");
        assert_eq!(title, "Котики");
        assert_eq!(slug, "cats");
    }

    #[test]
    fn validate_group_rejects_bad_slugs() {
        assert!(validate_group("Title", "").is_err());
        assert!(validate_group("Title", "with space").is_err());
        assert!(validate_group("Title", "котики").is_err());
        assert!(validate_group("Title", &"a".repeat(51)).is_err());
    }

    #[test]
    fn validate_group_rejects_blank_title() {
        assert!(validate_group("   ", "slug").is_err());
    }

    #[test]
    fn flag_wins_over_environment() {
        let url = resolve_database_url(Some(" postgres://localhost/yatube ".to_string()))
            .expect("flag must be used");
        assert_eq!(url, "postgres://localhost/yatube");
    }

    #[test]
    fn group_create_arguments_parse() {
        let cli = Cli::try_parse_from([
            "yatube-admin",
            "group",
            "create",
            "--title",
            "Котики",
            "--slug",
            "cats",
        ])
        .expect("arguments must parse");

        match cli.command {
            Command::Group {
                action:
                    GroupCommand::Create {
                        title,
                        slug,
                        description,
                    },
            } => {
                assert_eq!(title, "Котики");
                assert_eq!(slug, "cats");
                assert!(description.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
