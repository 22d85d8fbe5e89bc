#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Result, bail};
use clap::Parser;
use pinlog::cli::{self, Cmd};
use pinlog::controller::{Controller, LocateOutcome, Persistence, SubmitOutcome};
use pinlog::kv::{KeyValueStore, MemoryKv, SqliteKv};
use pinlog::terminal::{self, FixedPosition, PrintedList, TextForm, TextMap};
use pinlog::types::WorkoutId;
use pinlog::{gpx, utils};
use std::io;

#[macro_use]
extern crate pinlog;

fn open_kv(cli: &cli::Cli) -> Result<Box<dyn KeyValueStore>> {
    if cli.memory {
        dlog!("store=memory");
        return Ok(Box::new(MemoryKv::new()));
    }
    dlog!("store=sqlite path={}", cli.db.display());
    Ok(Box::new(SqliteKv::open(&cli.db)?))
}

fn session(kv: Box<dyn KeyValueStore>, form: &TextForm, echo: bool) -> Controller {
    Controller::new(
        Box::new(TextMap::default()),
        Box::new(form.handle()),
        Box::new(PrintedList::new(io::stdout(), echo)),
        kv,
    )
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let kv = open_kv(&cli)?;
    let form = TextForm::new();

    match cli.cmd.unwrap_or(Cmd::List) {
        Cmd::List => {
            let controller = session(kv, &form, true);
            if controller.workouts().is_empty() {
                tracing::info!("no workouts yet");
            }
            Ok(())
        }
        Cmd::Add {
            workout_type,
            at,
            distance,
            duration,
            cadence,
            elevation,
        } => {
            form.set_type(workout_type);
            form.set("distance", &distance)?;
            form.set("duration", &duration)?;
            form.set("cadence", &cadence)?;
            form.set("elevation", &elevation)?;

            let mut controller = session(kv, &form, true);
            let mut geo = FixedPosition(cli.position.or(Some(at)));
            if let LocateOutcome::Unavailable(e) = controller.locate(&mut geo) {
                bail!("Location could not be found: {e}");
            }

            controller.map_clicked(at);
            controller.toggle_type(workout_type);
            match controller.submit() {
                SubmitOutcome::Added { id, persistence } => {
                    if persistence == Persistence::MemoryOnly && !cli.memory {
                        tracing::warn!(%id, "workout was not saved");
                    }
                    dlog!("added id={id}");
                    Ok(())
                }
                SubmitOutcome::Rejected(r) => bail!("Inputs have to be valid: {r}"),
                SubmitOutcome::NotAccepting => bail!("map did not accept the click at {at}"),
            }
        }
        Cmd::Select { id } => {
            let mut controller = session(kv, &form, false);
            controller.locate(&mut FixedPosition(cli.position));
            match controller.select(&WorkoutId::from(id.as_str())) {
                Some(w) => {
                    println!("{}", utils::format_entry(w));
                    Ok(())
                }
                None => bail!("No workout with id {id}"),
            }
        }
        Cmd::Reset => {
            let mut controller = session(kv, &form, false);
            let count = controller.workouts().len();
            controller.reset()?;
            tracing::info!(deleted = count, "all workouts deleted");
            Ok(())
        }
        Cmd::ExportGpx { path } => {
            let controller = session(kv, &form, false);
            gpx::export_gpx(controller.workouts(), &path)?;
            Ok(())
        }
        Cmd::Shell => {
            let controller = session(kv, &form, false);
            let mut geo = FixedPosition(cli.position);
            terminal::run_shell(controller, &form, &mut geo, io::stdin().lock(), io::stdout())
        }
    }
}
