//! Bridge movement driver.
//!
//! Lists candidate rotations for a field, prints the rounds of a generated
//! sector, and optionally plays the sector through validation.

mod config;
mod render;

use std::path::PathBuf;

use anyhow::Error;
use bridge_movement::{RotationRegistry, Sector, Tournament};
use config::{SectorOverrides, load_sector_config};
use log::{error, info, warn};
use pico_args::Arguments;

const HELP: &str = "\
Generate and validate duplicate bridge movements

USAGE:
  bm_cli [OPTIONS]
  bm_cli --list --pairs N [--min-boards N] [--max-boards N] [--min-per-group N]

OPTIONS:
  --config           FILE   JSON sector description (missing fields take defaults)
  --name             NAME   Sector name                 [default: A]
  --movement         KIND   mitchell or howell          [default: env BM_MOVEMENT or mitchell]
  --pairs            N      Number of pairs             [default: env BM_PAIRS or 10]
  --boards-per-group N      Boards in each group        [default: 3]
  --relays           N      Relay tables                [default: 0]
  --rounds           N      Rounds to play              [default: full schedule]
  --switch-round     N      Mitchell switch round, 0 disables

FLAGS:
  --list                    List candidate rotations instead of generating
  --json                    Print rounds as JSON
  --validate                Play the sector and report the first violation
  -h, --help                Print help information

ENVIRONMENT:
  BM_MOVEMENT               Default movement kind
  BM_PAIRS                  Default number of pairs
  RUST_LOG                  Log filter [default: info]
";

struct Args {
    list: bool,
    json: bool,
    validate: bool,
    config: Option<PathBuf>,
    overrides: SectorOverrides,
    min_boards: u32,
    max_boards: u32,
    min_per_group: u32,
}

fn parse_args() -> Result<Args, Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        list: pargs.contains("--list"),
        json: pargs.contains("--json"),
        validate: pargs.contains("--validate"),
        config: pargs.opt_value_from_str("--config")?,
        overrides: SectorOverrides {
            name: pargs.opt_value_from_str("--name")?,
            movement: pargs.opt_value_from_str("--movement")?,
            num_pairs: pargs.opt_value_from_str("--pairs")?,
            boards_per_group: pargs.opt_value_from_str("--boards-per-group")?,
            relay_tables: pargs.opt_value_from_str("--relays")?,
            rounds: pargs.opt_value_from_str("--rounds")?,
            switch_round: pargs.opt_value_from_str("--switch-round")?,
        }
        .with_env(),
        min_boards: pargs.opt_value_from_str("--min-boards")?.unwrap_or(18),
        max_boards: pargs.opt_value_from_str("--max-boards")?.unwrap_or(30),
        min_per_group: pargs.opt_value_from_str("--min-per-group")?.unwrap_or(2),
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        warn!("Ignoring unknown arguments: {remaining:?}");
    }
    Ok(args)
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let args = parse_args()?;

    if args.list {
        let registry = RotationRegistry::with_builtin();
        let pairs = args.overrides.num_pairs.unwrap_or(10);
        let candidates = registry.possible_rotations(
            pairs,
            args.min_boards,
            args.max_boards,
            args.min_per_group,
        );
        if candidates.is_empty() {
            warn!(
                "No rotation fits {pairs} pairs on {}-{} boards",
                args.min_boards, args.max_boards
            );
        }
        print!("{}", render::candidates_text(&candidates));
        return Ok(());
    }

    let config = load_sector_config(args.config.as_deref(), args.overrides)?;
    let sector = Sector::from_config(&config)?;
    info!(
        "Sector {} has {} pairs over {} rounds",
        sector.name(),
        config.num_pairs,
        sector.planned_rounds()
    );

    if args.json {
        println!("{}", render::rounds_json(&config, &sector)?);
    } else {
        print!("{}", render::rounds_text(&sector));
    }

    if args.validate {
        let total_boards = sector.board_numbers().max().unwrap_or(0);
        let mut tournament = Tournament::new(total_boards);
        tournament.add_sector(sector)?;
        tournament.start()?;
        match tournament.run_to_completion() {
            Ok(rounds) => info!("All {rounds} rounds validated"),
            Err(e) => {
                error!("Validation failed: {e}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
