//! # Newsletter Brands CLI
//!
//! Operator entry point: apply migrations, check the database and resolve
//! senders by hand.
//! Command output is JSON on stdout; logs go to stderr.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use sea_orm::TransactionTrait;
use serde_json::json;

use newsletter_brands::{
    config::ConfigLoader,
    db,
    identity::{extract_identity, parse_from_header},
    resolver::{BrandResolver, ResolutionPlan},
    telemetry::init_tracing,
};

#[derive(Debug, Parser)]
#[command(name = "newsletter-brands", version, about = "Newsletter brand resolution")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending database migrations
    Migrate,
    /// Verify the database is reachable
    Check,
    /// Resolve a sender to its brand, creating the brand if needed
    Resolve(ResolveArgs),
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// Sender address
    #[arg(long, conflicts_with = "from")]
    email: Option<String>,

    /// Sender display name
    #[arg(long, default_value = "", conflicts_with = "from")]
    name: String,

    /// Raw `From:` header, e.g. `"Acme News" <news@acme.io>`
    #[arg(long)]
    from: Option<String>,

    /// Print what resolution would do without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new().load().context("loading configuration")?;
    init_tracing(&config).context("initializing tracing")?;

    tracing::debug!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted) = config.redacted_json() {
        tracing::debug!(config = %redacted, "Effective configuration");
    }

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;

    match cli.cmd {
        Command::Migrate => {
            db::run_migrations(&db).await?;
            println!("{}", json!({ "status": "migrated" }));
        }
        Command::Check => {
            db::health_check(&db).await?;
            println!("{}", json!({ "status": "ok" }));
        }
        Command::Resolve(args) => {
            let (name, email) = match (args.from, args.email) {
                (Some(from), _) => parse_from_header(&from),
                (None, Some(email)) => (args.name, email),
                (None, None) => bail!("either --email or --from is required"),
            };

            let resolver = BrandResolver::new(config.resolver.clone());
            let txn = db.begin().await.context("beginning transaction")?;

            if args.dry_run {
                let identity = extract_identity(&email, &name);
                let plan = resolver.plan(&txn, &identity).await?;
                txn.rollback().await.context("rolling back dry run")?;

                let output = match plan {
                    ResolutionPlan::Existing(brand) => json!({
                        "action": "existing",
                        "brand_id": brand.brand_id,
                        "name": brand.name,
                        "slug": brand.slug,
                        "domain": brand.domain,
                    }),
                    ResolutionPlan::Create { identity, slug } => json!({
                        "action": "create",
                        "name": identity.name,
                        "slug": slug,
                        "domain": identity.domain,
                    }),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                let resolved = resolver.resolve_with_retry(&txn, &email, &name).await?;
                txn.commit().await.context("committing resolution")?;
                println!("{}", serde_json::to_string_pretty(&resolved)?);
            }
        }
    }

    Ok(())
}
