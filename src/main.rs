use anyhow::Context;
use clap::{Parser, Subcommand};
use juantap::bootstrap::{self, AppContext};
use juantap::config::Config;
use juantap::domain::ports::TemplateApi;
use juantap::infrastructure::observability;
use juantap::services::{EntitlementTracker, MutationOutcome, TOP_TEMPLATES_PER_PAGE};
use juantap::TrackerEvent;
use tokio::sync::broadcast;

#[derive(Parser)]
#[command(name = "juantap", about = "Track template entitlements and usage")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the entitlement and usage of a template
    Status { slug: String },
    /// Save a free template
    Save { slug: String },
    /// Remove a free template from the saved list
    Unsave { slug: String },
    /// Mark a saved or bought template as used
    Use { slug: String },
    /// Mark a template as no longer used
    Unuse { slug: String },
    /// Save a free template or start the purchase of a premium one
    Get { slug: String },
    /// Print the public link of a template
    Share { slug: String },
    /// Show the admin dashboard summary
    Stats,
    /// List templates ranked by unlocks
    Top {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    let _guard = observability::init(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;
    tracing::debug!("Configuration loaded");

    let ctx = bootstrap::build_app_context(&config)?;

    match cli.command {
        Command::Stats => show_stats(&ctx).await,
        Command::Top { page } => show_top(&ctx, page).await,
        Command::Status { slug } => {
            let tracker = mount(&ctx, &slug).await?;
            print_status(&tracker);
            Ok(())
        }
        Command::Share { slug } => {
            let tracker = mount(&ctx, &slug).await?;
            println!("{}", tracker.share(&ctx.public_url));
            Ok(())
        }
        Command::Save { slug } => run(&ctx, &slug, Action::Save).await,
        Command::Unsave { slug } => run(&ctx, &slug, Action::Unsave).await,
        Command::Use { slug } => run(&ctx, &slug, Action::Use).await,
        Command::Unuse { slug } => run(&ctx, &slug, Action::Unuse).await,
        Command::Get { slug } => run(&ctx, &slug, Action::Get).await,
    }
}

enum Action {
    Save,
    Unsave,
    Use,
    Unuse,
    Get,
}

async fn mount(ctx: &AppContext, slug: &str) -> anyhow::Result<EntitlementTracker> {
    let template = ctx
        .api
        .get_template(&ctx.session, slug)
        .await
        .with_context(|| format!("Failed to load template {}", slug))?;

    let tracker = EntitlementTracker::mount(template, ctx.session.clone(), ctx.deps.clone());
    tracker.load().await;
    Ok(tracker)
}

async fn run(ctx: &AppContext, slug: &str, action: Action) -> anyhow::Result<()> {
    let mut notices = ctx.deps.events.subscribe();
    let tracker = mount(ctx, slug).await?;

    let controller = tracker.controller();
    let outcome = match action {
        Action::Save => controller.save().await,
        Action::Unsave => controller.unsave().await,
        Action::Use => controller.mark_used().await,
        Action::Unuse => controller.mark_unused().await,
        Action::Get => tracker.get_template().await,
    };

    print_notices(&mut notices);
    print_status(&tracker);

    match outcome {
        MutationOutcome::Failed { notice, .. } => anyhow::bail!("{}", notice),
        MutationOutcome::Skipped(reason) => {
            tracing::info!("Nothing to do for {}: {:?}", slug, reason);
            Ok(())
        }
        MutationOutcome::Confirmed | MutationOutcome::AwaitingPayment => Ok(()),
    }
}

fn print_status(tracker: &EntitlementTracker) {
    let template = tracker.template();
    let snapshot = tracker.snapshot();
    let panel = tracker.action_panel();

    println!("{} ({}, {})", template.name, template.slug, template.category);
    match snapshot.entitlement {
        Some(entitlement) => println!("  entitlement: {}", entitlement),
        None => println!("  entitlement: unknown"),
    }
    println!("  usage:       {}", snapshot.usage);
    println!("  action:      {} ({})", panel.primary_label, panel.caption);
    if let Some(toggle) = panel.usage_toggle {
        println!("  usage:       {}", toggle.label);
    }
}

fn print_notices(events: &mut broadcast::Receiver<TrackerEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            TrackerEvent::NoticeRaised { notice, .. } => println!("{}", notice),
            TrackerEvent::SessionExpired { .. } => {
                eprintln!("Set JUANTAP_TOKEN to a valid access token")
            }
            _ => {}
        }
    }
}

async fn show_stats(ctx: &AppContext) -> anyhow::Result<()> {
    let summary = ctx.stats.dashboard_summary(&ctx.session).await;
    let na = || "N/A".to_string();

    println!("Total users:      {}", summary.total_users.map_or_else(na, |n| n.to_string()));
    println!("Total templates:  {}", summary.total_templates.map_or_else(na, |n| n.to_string()));
    println!("Revenue:          {}", summary.revenue.map_or_else(na, |r| format!("PHP {:.2}", r)));
    println!("Pending payments: {}", summary.pending_payments.map_or_else(na, |n| n.to_string()));
    Ok(())
}

async fn show_top(ctx: &AppContext, page: usize) -> anyhow::Result<()> {
    let board = ctx.stats.top_templates(&ctx.session).await;
    if board.is_empty() {
        println!("No template stats available");
        return Ok(());
    }

    let page = board.page(page);
    for ranked in &page.items {
        println!(
            "{:>3}. {:<30} {:<8} unlocks {:>5}  saves {:>5}  PHP {:>10.2}  {:?}",
            ranked.rank,
            ranked.stat.name,
            ranked.stat.category.to_string(),
            ranked.stat.unlocks(),
            ranked.stat.saves(),
            ranked.stat.revenue,
            ranked.stat.trend,
        );
    }
    println!(
        "Page {} of {} ({} per page)",
        page.page, page.total_pages, TOP_TEMPLATES_PER_PAGE
    );
    Ok(())
}
