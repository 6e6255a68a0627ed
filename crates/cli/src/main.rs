use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use onemalad_core::config::AppConfig;
use onemalad_core::remote::RemoteBackend;
use onemalad_core::schema::{ActivityCategory, IssueCategory, IssueStatus, VolunteerStatus};
use onemalad_core::stats::WardIssueStats;
use onemalad_core::storage;
use onemalad_core::store::Record;
use onemalad_core::validate::{IssueForm, VolunteerForm};
use onemalad_core::{clock, sample, AppContext};
use schemars::schema_for;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "onemalad")]
#[command(about = "OneMalad civic engagement CLI", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export canonical JSON Schemas to the ./schemas directory
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
    /// Copy the bundled sample activities and events into the remote store
    Seed,
    /// Print a synced collection as JSON
    List {
        /// issues, activities, events, volunteers, banners or ward-updates
        collection: String,
    },
    /// Sign up a volunteer
    Volunteer {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        ward: Option<u32>,
        #[arg(long = "interest", value_parser = parse_enum::<ActivityCategory>)]
        interests: Vec<ActivityCategory>,
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Volunteer status changes
    ActivateVolunteer {
        #[arg(long)]
        id: String,
    },
    /// Issue reporting and tracking
    Issue {
        #[command(subcommand)]
        command: IssueCommands,
    },
    /// "I Support" toggle for a ward corporator
    Support {
        #[arg(long)]
        ward: u32,
        #[arg(long)]
        user: String,
    },
    /// Issue counters for one ward
    WardStats {
        #[arg(long)]
        ward: u32,
    },
    /// Static site files
    Site {
        #[command(subcommand)]
        command: SiteCommands,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Export JSON Schema files for canonical types
    Export {
        /// Output directory (default: ./schemas)
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum IssueCommands {
    /// Report a new issue
    Report {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, value_parser = parse_enum::<IssueCategory>)]
        category: IssueCategory,
        #[arg(long)]
        ward: u32,
        #[arg(long)]
        location: String,
        #[arg(long)]
        user_name: String,
        #[arg(long)]
        user_email: String,
        /// Image files to upload (at most 4)
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    /// Move an issue to another status
    Status {
        #[arg(long)]
        id: String,
        #[arg(long, value_parser = parse_enum::<IssueStatus>)]
        status: IssueStatus,
    },
    /// Resolve an issue with an optional response and proof photos
    Resolve {
        #[arg(long)]
        id: String,
        #[arg(long)]
        response: Option<String>,
        #[arg(long = "proof")]
        proofs: Vec<PathBuf>,
    },
    /// Add one upvote
    Upvote {
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand)]
enum SiteCommands {
    /// Write sitemap.xml, robots.txt and manifest.json
    Build {
        #[arg(long, default_value = "public")]
        out_dir: PathBuf,
    },
}

/// Tracing targets are crate names: the binary crate is `onemalad`.
const DEFAULT_LOG_FILTER: &str = "onemalad=info,onemalad_core=info";

fn parse_enum<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.replace('-', "_")))
        .map_err(|_| format!("unknown value `{value}`"))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    run_with_context(AppContext::from_config(config)?, cli.command)
}

fn run_with_context(ctx: AppContext, command: Commands) -> Result<()> {
    let handle = ctx.sync.init();
    let result = dispatch_command(&ctx, command);
    ctx.deliver_pending();
    handle.teardown();
    result
}

fn dispatch_command(ctx: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Seed => seed(ctx),
        Commands::List { collection } => list(ctx, &collection),
        Commands::Volunteer {
            name,
            phone,
            email,
            ward,
            interests,
            message,
        } => {
            let form = VolunteerForm {
                name,
                phone,
                email,
                ward_number: ward,
                interests,
                message,
            };
            let record = form.validate()?;
            let id = ctx.dispatcher.add_volunteer(record)?;
            println!("Thank you for volunteering! ({id})");
            Ok(())
        }
        Commands::ActivateVolunteer { id } => {
            ctx.dispatcher.update_volunteer_status(&id, VolunteerStatus::Active)?;
            println!("Volunteer {id} is now active");
            Ok(())
        }
        Commands::Issue { command } => issue(ctx, command),
        Commands::Support { ward, user } => {
            let supported = ctx.supports.toggle(ward, &user)?;
            let count = ctx.supports.count(ward)?;
            let verb = if supported { "supports" } else { "no longer supports" };
            println!("{user} {verb} ward {ward} ({count} supporters)");
            Ok(())
        }
        Commands::WardStats { ward } => {
            let stats = WardIssueStats::for_ward(&ctx.store.get().issues, ward);
            println!(
                "Ward {ward}: {} pending, {} in progress, {} resolved of {} ({}% resolved)",
                stats.pending,
                stats.in_progress,
                stats.resolved,
                stats.total,
                stats.resolution_percent()
            );
            Ok(())
        }
        Commands::Schema { command } => match command {
            SchemaCommands::Export { out_dir } => schema_export(out_dir),
        },
        Commands::Site { command } => match command {
            SiteCommands::Build { out_dir } => {
                site::build_site(&out_dir, &ctx.config.site.base_url, clock::today())?;
                println!("Wrote site files to {}", out_dir.display());
                Ok(())
            }
        },
    }
}

fn issue(ctx: &AppContext, command: IssueCommands) -> Result<()> {
    match command {
        IssueCommands::Report {
            title,
            description,
            category,
            ward,
            location,
            user_name,
            user_email,
            images,
        } => {
            let mut form = IssueForm {
                title,
                description,
                category,
                ward_number: ward,
                location,
                latitude: None,
                longitude: None,
                image_urls: Vec::new(),
                user_name,
                user_email,
            };
            form.check(images.len())?;
            form.image_urls = upload_files(ctx, &images)?;
            let id = ctx.dispatcher.add_issue(form.validate()?)?;
            println!("Reported issue {id}");
        }
        IssueCommands::Status { id, status } => {
            ctx.dispatcher.update_issue_status(&id, status)?;
            println!("Issue status updated to {}", status.to_string().replace('_', " "));
        }
        IssueCommands::Resolve {
            id,
            response,
            proofs,
        } => {
            let proof_urls = upload_files(ctx, &proofs)?;
            ctx.dispatcher.resolve_issue(&id, response, proof_urls)?;
            println!("Issue marked as resolved");
        }
        IssueCommands::Upvote { id } => {
            let upvotes = ctx.dispatcher.upvote_issue(&id)?;
            println!("Issue {id} has {upvotes} upvotes");
        }
    }
    Ok(())
}

fn upload_files(ctx: &AppContext, paths: &[PathBuf]) -> Result<Vec<String>> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        files.push((name, fs::read(path)?));
    }
    Ok(storage::upload_issue_images(&ctx.objects, &files)?)
}

fn seed(ctx: &AppContext) -> Result<()> {
    let Some(documents) = &ctx.documents else {
        bail!("seeding needs a configured remote backend");
    };
    let snapshot = sample::sample_snapshot()?;
    for activity in &snapshot.activities {
        documents.set(
            onemalad_core::schema::Activity::COLLECTION,
            &activity.id,
            serde_json::to_value(activity)?,
        )?;
    }
    for event in &snapshot.events {
        documents.set(
            onemalad_core::schema::CommunityEvent::COLLECTION,
            &event.id,
            serde_json::to_value(event)?,
        )?;
    }
    info!(
        activities = snapshot.activities.len(),
        events = snapshot.events.len(),
        "seeded remote store"
    );
    println!(
        "Seeded {} activities and {} events",
        snapshot.activities.len(),
        snapshot.events.len()
    );
    Ok(())
}

fn list(ctx: &AppContext, collection: &str) -> Result<()> {
    let snapshot = ctx.store.get();
    match collection {
        "issues" => print_json(&snapshot.issues),
        "activities" => print_json(&snapshot.activities),
        "events" => print_json(&snapshot.events),
        "volunteers" => print_json(&snapshot.volunteers),
        "banners" => print_json(&snapshot.banners),
        "ward-updates" => print_json(&snapshot.ward_updates),
        "impact-stats" => print_json(&snapshot.impact_stats),
        other => bail!("unknown collection: {other}"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn schema_export(out_dir: PathBuf) -> Result<()> {
    fs::create_dir_all(&out_dir)?;

    let schemas = [
        ("Issue", schema_for!(onemalad_core::schema::Issue)),
        ("Activity", schema_for!(onemalad_core::schema::Activity)),
        ("CommunityEvent", schema_for!(onemalad_core::schema::CommunityEvent)),
        ("Volunteer", schema_for!(onemalad_core::schema::Volunteer)),
        ("Banner", schema_for!(onemalad_core::schema::Banner)),
        ("WardUpdate", schema_for!(onemalad_core::schema::WardUpdate)),
        ("UserProfile", schema_for!(onemalad_core::schema::UserProfile)),
    ];
    for (name, schema) in schemas {
        let json = serde_json::to_string_pretty(&schema)?;
        fs::write(out_dir.join(format!("{name}.schema.json")), json)?;
    }

    println!("Exported schemas to {}", out_dir.display());
    Ok(())
}
