#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

use anyhow::{Context, Result};
use clap::Parser;
use mapty::app::{App, Command, Outcome, State};
use mapty::config::AppConfig;
use mapty::form::FormInput;
use mapty::geo::FixedPosition;
use mapty::storage::SqliteStore;
use mapty::types::{Activity, Coords, WorkoutType};
use mapty::view::{ConsoleNotifier, HtmlList, RecordingMap};
use mapty::{cli, utils};

#[macro_use]
extern crate mapty;

type CliApp = App<SqliteStore, RecordingMap, HtmlList, ConsoleNotifier>;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let config = AppConfig {
        map_zoom: cli.zoom,
        elevation_rule: cli.elevation_rule,
        ..AppConfig::default()
    };
    let store = SqliteStore::open(&cli.store)
        .with_context(|| format!("opening store: {}", cli.store.display()))?;
    dlog!("mode=boot store={}", cli.store.display());

    let mut app: CliApp = App::new(
        config,
        store,
        RecordingMap::new(),
        HtmlList::new(),
        ConsoleNotifier,
    );
    let position = cli.lat.zip(cli.lng).map(|(lat, lng)| Coords::new(lat, lng));
    app.boot(&mut FixedPosition(position));

    match cli.cmd {
        cli::Cmd::Add(add) => add_workout(&mut app, add),
        cli::Cmd::List { html } => {
            print_list(&app, html);
            Ok(())
        }
        cli::Cmd::Focus { id } => {
            if app.state() == State::LocationUnavailable {
                anyhow::bail!("Map is unavailable; pass --lat and --lng.");
            }
            match app.dispatch(Command::SelectWorkout(id.as_str().into())) {
                Outcome::Focused(_) => {
                    if let Some(view) = &app.map().view {
                        println!("{}\tzoom={}", view.center, view.zoom);
                    }
                    Ok(())
                }
                _ => anyhow::bail!("No workout with id {id}."),
            }
        }
        cli::Cmd::Reset => {
            app.dispatch(Command::Reset);
            tracing::info!(store = %cli.store.display(), "store cleared");
            Ok(())
        }
    }
}

fn add_workout(app: &mut CliApp, add: cli::AddCmd) -> Result<()> {
    if app.state() == State::LocationUnavailable {
        anyhow::bail!("Map is unavailable; pass --lat and --lng to place workouts.");
    }

    let (kind, base, cadence, elevation) = match add {
        cli::AddCmd::Running { base, cadence } => (WorkoutType::Running, base, cadence, String::new()),
        cli::AddCmd::Cycling { base, elevation } => {
            (WorkoutType::Cycling, base, String::new(), elevation)
        }
    };
    let at = utils::parse_coords(&base.at)?;

    app.dispatch(Command::MapClicked(at));
    app.dispatch(Command::TypeChanged(kind));
    let outcome = app.dispatch(Command::Submit(FormInput {
        kind,
        distance: base.distance,
        duration: base.duration,
        cadence,
        elevation,
    }));

    match outcome {
        Outcome::Created { id, restore_after } => {
            dlog!("form display restores in {restore_after:?}");
            app.dispatch(Command::RestoreFormDisplay);
            if let Some(content) = app.map().open_popups().last() {
                println!("{content}");
            }
            println!("{id}");
            Ok(())
        }
        Outcome::Rejected(e) => Err(e).context("workout rejected"),
        other => anyhow::bail!("unexpected outcome: {other:?}"),
    }
}

fn print_list(app: &CliApp, html: bool) {
    if html {
        println!("{}", app.list().to_html());
        return;
    }

    // Same order as on screen: newest first.
    for w in app.workouts().iter().rev() {
        let metric = match w.activity {
            Activity::Running { cadence, pace } => {
                format!("{} min/km\t{cadence} spm", utils::to_fixed1(pace))
            }
            Activity::Cycling { elevation, speed } => {
                format!("{} km/h\t{elevation} m", utils::to_fixed1(speed))
            }
        };
        println!(
            "{}\t{}\t{} km\t{} min\t{metric}",
            w.id, w.description, w.distance, w.duration
        );
    }
}
