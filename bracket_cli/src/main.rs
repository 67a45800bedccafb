//! Command-line front end for generating and advancing brackets.
//!
//! Brackets are stored as JSON files in the persisted tournament record
//! shape, so every command is a load, an engine call and a save.

use std::path::PathBuf;

use anyhow::{Error, bail};
use bracket_cli::{commands, config::CliConfig, logging};
use bracket_engine::{BracketFormat, EntrantId, GrandFinalPolicy, MatchId};
use pico_args::Arguments;
use tracing::info;

const HELP: &str = "\
Generate and run single- or double-elimination brackets

USAGE:
  bracket generate --entrants FILE --format single|double [--seed N] [--grand-final reset|single] [--out FILE]
  bracket report   --state FILE --match ID (--scores P1:P2 | --winner 0|1 | --winner-id ID)
  bracket show     --state FILE

OPTIONS:
  --entrants     FILE     JSON array of {\"id\", \"name\", \"nickname\"}
  --format       FORMAT   single or double
  --seed         N        Shuffle seed  [default: env BRACKET_SEED or random]
  --grand-final  POLICY   reset or single  [default: env BRACKET_GRAND_FINAL or reset]
  --out          FILE     Write the bracket here instead of stdout
  --state        FILE     Bracket state file
  --match        ID       Match to report
  --scores       P1:P2    Final score, higher score wins
  --winner       SLOT     Winner by slot
  --winner-id    ID       Winner by entrant id

FLAGS:
  -h, --help              Print help information

ENVIRONMENT:
  BRACKET_GRAND_FINAL     Grand final policy (reset or single)
  BRACKET_MAX_ENTRANTS    Largest roster accepted  [default: 1024]
  BRACKET_SEED            Shuffle seed
  RUST_LOG                Log filter  [default: info,bracket_engine=debug]
";

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    logging::init();

    match pargs.subcommand()?.as_deref() {
        Some("generate") => run_generate(&mut pargs)?,
        Some("report") => run_report(&mut pargs)?,
        Some("show") => run_show(&mut pargs)?,
        Some(other) => bail!("Unknown command '{other}'. Run with --help for usage"),
        None => {
            print!("{HELP}");
            return Ok(());
        }
    }

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        tracing::warn!("Ignored arguments: {remaining:?}");
    }
    Ok(())
}

fn run_generate(pargs: &mut Arguments) -> Result<(), Error> {
    let entrants: PathBuf = pargs.value_from_str("--entrants")?;
    let format: BracketFormat = pargs.value_from_str("--format")?;
    let seed: Option<u64> = pargs.opt_value_from_str("--seed")?;
    let grand_final: Option<GrandFinalPolicy> = pargs.opt_value_from_str("--grand-final")?;
    let out: Option<PathBuf> = pargs.opt_value_from_str("--out")?;

    let config = CliConfig::from_env(grand_final, seed)?;
    let entrants = commands::load_entrants(&entrants)?;
    info!("Loaded {} entrants", entrants.len());

    let state = commands::generate(&config, entrants, format)?;
    match out {
        Some(path) => {
            commands::save_state(&path, &state)?;
            info!("Bracket written to {}", path.display());
        }
        None => println!("{}", state.to_json()?),
    }
    Ok(())
}

fn run_report(pargs: &mut Arguments) -> Result<(), Error> {
    let state: PathBuf = pargs.value_from_str("--state")?;
    let match_id: MatchId = pargs.value_from_str("--match")?;
    let scores: Option<String> = pargs.opt_value_from_str("--scores")?;
    let winner: Option<String> = pargs.opt_value_from_str("--winner")?;
    let winner_id: Option<EntrantId> = pargs.opt_value_from_str("--winner-id")?;

    let report = commands::match_report(scores.as_deref(), winner.as_deref(), winner_id)?;
    let updated = commands::report(&state, match_id, report)?;
    print!("{}", commands::render(&updated));
    Ok(())
}

fn run_show(pargs: &mut Arguments) -> Result<(), Error> {
    let state: PathBuf = pargs.value_from_str("--state")?;
    let state = commands::load_state(&state)?;
    print!("{}", commands::render(&state));
    Ok(())
}
