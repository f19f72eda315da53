use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lifeclock::cli::{Cli, Commands, ThemeChoice, WatchArgs};
use lifeclock::clock::SystemClock;
use lifeclock::config::Config;
use lifeclock::insights::{self, GeminiClient, InsightState};
use lifeclock::render::{self, Screen};
use lifeclock::session::{Session, Snapshot};
use lifeclock::store::Store;
use lifeclock::theme::{self, Explicit, Stored, SystemPreference, Theme};
use lifeclock::{age, input, live, panel, svg};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so they never tear the panel on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(ms) = cli.tick_ms {
        config.tick = Duration::from_millis(ms);
    }

    let store = Store::new(config.state_file.clone());
    let stored_theme = store.load().await?.theme;
    let theme = theme::resolve(&[
        &Explicit(cli.theme),
        &Stored(stored_theme),
        &SystemPreference::from_env(),
    ]);

    match cli.command {
        Some(Commands::Start { date, time, watch }) => {
            let birth = input::parse_birth(&date, &time, &Local, &Local::now())?;
            store.set_birth(&birth).await?;
            info!(birth = %birth, "birth instant stored");
            run_watch(&config, birth, theme, watch).await
        }
        Some(Commands::Watch { watch }) => {
            let birth = stored_birth(&store).await?;
            run_watch(&config, birth, theme, watch).await
        }
        None => {
            let birth = stored_birth(&store).await?;
            run_watch(&config, birth, theme, WatchArgs::default()).await
        }
        Some(Commands::Reset) => {
            store.clear_birth().await?;
            println!("Birth date cleared.");
            Ok(())
        }
        Some(Commands::Insights) => {
            let birth = stored_birth(&store).await?;
            let years = age::age_breakdown(&birth, &Local::now()).years;
            let client = insights_client(&config);
            let state = insights::fetch_insights(client.as_ref(), birth.date_naive(), years).await;
            for item in state.items().unwrap_or_default() {
                println!("[{}] {}", panel::category_label(item.category), item.title);
                println!("    {}", item.content);
            }
            Ok(())
        }
        Some(Commands::Snapshot { out }) => {
            let birth = stored_birth(&store).await?;
            let mut session = Session::new();
            session.start(birth);
            let Snapshot::Running(frame) = session.tick(&Local::now()) else {
                anyhow::bail!("session did not start");
            };

            fs::create_dir_all(&out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            fs::write(out.join("dark_mode.svg"), svg::generate_svg(&frame, Theme::Dark))?;
            fs::write(out.join("light_mode.svg"), svg::generate_svg(&frame, Theme::Light))?;

            println!("Generated dark_mode.svg and light_mode.svg successfully.");
            Ok(())
        }
        Some(Commands::Theme { choice }) => {
            let chosen = match choice {
                ThemeChoice::Dark => Theme::Dark,
                ThemeChoice::Light => Theme::Light,
                ThemeChoice::Toggle => theme.toggled(),
            };
            store.set_theme(chosen).await?;
            println!("Theme set to {chosen}.");
            Ok(())
        }
    }
}

async fn stored_birth(store: &Store) -> Result<DateTime<Local>> {
    store.load_birth(&Local).await?.context(
        "No birth date stored; run `lifeclock start --date YYYY-MM-DD --time HH:MM` first",
    )
}

fn insights_client(config: &Config) -> Option<GeminiClient> {
    match GeminiClient::new(&config.insights) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("insights unavailable: {e:#}");
            None
        }
    }
}

async fn run_watch(
    config: &Config,
    birth: DateTime<Local>,
    theme: Theme,
    args: WatchArgs,
) -> Result<()> {
    let handle = live::spawn(SystemClock, config.tick);
    let mut snapshots = handle.subscribe();
    handle.start(birth);

    let insights_rx = args.insights.then(|| {
        let years = age::age_breakdown(&birth, &Local::now()).years;
        insights::spawn_fetch(insights_client(config), birth.date_naive(), years)
    });

    let screen = Screen::new(!args.json);
    screen.enter()?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let result: Result<()> = async {
        loop {
            tokio::select! {
                _ = &mut ctrl_c => break,
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = snapshots.borrow_and_update().clone();

                    if args.json {
                        println!("{}", render::json_line(&snapshot)?);
                        continue;
                    }

                    let insight_state = insights_rx
                        .as_ref()
                        .map(|rx| rx.borrow().clone())
                        .unwrap_or(InsightState::NotRequested);
                    screen.draw(&render::render_snapshot(&snapshot, theme, &insight_state))?;

                    if snapshot.frame().is_some_and(|f| f.celebrate) {
                        print!("\x07");
                    }
                }
            }
        }
        Ok(())
    }
    .await;

    screen.leave()?;
    handle.join().await;
    result
}
