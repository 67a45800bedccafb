//! Command implementations for the `bracket` binary.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Error, bail};
use bracket_engine::{
    BracketEngine, BracketFormat, BracketState, Entrant, EntrantId, MatchId, MatchReport, Segment,
    Slot,
};
use rand::{SeedableRng, rngs::StdRng};
use serde::Deserialize;
use tracing::info;

use crate::config::CliConfig;

/// One record of the entrants file.
#[derive(Debug, Clone, Deserialize)]
pub struct EntrantRecord {
    pub id: EntrantId,
    pub name: String,
    pub nickname: String,
}

impl From<EntrantRecord> for Entrant {
    fn from(record: EntrantRecord) -> Self {
        Entrant::new(record.id, record.name, record.nickname)
    }
}

/// Errors that can occur while parsing result arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Scores not in `P1:P2` form.
    #[error("Invalid scores '{0}'. Expected two numbers like '2:1'")]
    InvalidScores(String),
    /// Winner slot other than 0 or 1.
    #[error("Invalid winner slot '{0}'. Use 0 or 1")]
    InvalidSlot(String),
    /// More than one or none of --scores, --winner, --winner-id.
    #[error("Give exactly one of --scores, --winner or --winner-id")]
    AmbiguousResult,
}

/// Parse a `P1:P2` score pair.
///
/// # Examples
///
/// ```
/// use bracket_cli::commands::parse_scores;
///
/// assert_eq!(parse_scores("3:1"), Ok((3, 1)));
/// assert!(parse_scores("3-1").is_err());
/// ```
pub fn parse_scores(input: &str) -> Result<(u32, u32), ParseError> {
    let invalid = || ParseError::InvalidScores(input.to_string());
    let (p1, p2) = input.trim().split_once(':').ok_or_else(invalid)?;
    let p1 = p1.trim().parse().map_err(|_| invalid())?;
    let p2 = p2.trim().parse().map_err(|_| invalid())?;
    Ok((p1, p2))
}

/// Build a match report from the result arguments of `bracket report`.
pub fn match_report(
    scores: Option<&str>,
    winner: Option<&str>,
    winner_id: Option<EntrantId>,
) -> Result<MatchReport, ParseError> {
    match (scores, winner, winner_id) {
        (Some(scores), None, None) => {
            let (p1, p2) = parse_scores(scores)?;
            Ok(MatchReport::Scores { p1, p2 })
        }
        (None, Some(slot), None) => match slot.trim() {
            "0" => Ok(MatchReport::Winner(0)),
            "1" => Ok(MatchReport::Winner(1)),
            other => Err(ParseError::InvalidSlot(other.to_string())),
        },
        (None, None, Some(id)) => Ok(MatchReport::WinnerId(id)),
        _ => Err(ParseError::AmbiguousResult),
    }
}

/// Read a JSON array of `{"id", "name", "nickname"}` records.
pub fn load_entrants(path: &Path) -> Result<Vec<Entrant>, Error> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read entrants from {}", path.display()))?;
    let records: Vec<EntrantRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid entrants file {}", path.display()))?;
    Ok(records.into_iter().map(Entrant::from).collect())
}

pub fn load_state(path: &Path) -> Result<BracketState, Error> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read bracket state from {}", path.display()))?;
    BracketState::from_json(&raw)
        .with_context(|| format!("Invalid bracket state in {}", path.display()))
}

pub fn save_state(path: &Path, state: &BracketState) -> Result<(), Error> {
    let json = state.to_json()?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write bracket state to {}", path.display()))
}

/// Generate a bracket, shuffling with the configured seed when there is one.
pub fn generate(
    config: &CliConfig,
    entrants: Vec<Entrant>,
    format: BracketFormat,
) -> Result<BracketState, Error> {
    let engine = BracketEngine::new(config.engine.clone());
    let state = match config.seed {
        Some(seed) => engine.generate(entrants, format, &mut StdRng::seed_from_u64(seed))?,
        None => engine.generate(entrants, format, &mut rand::rng())?,
    };
    info!(
        "Generated {} bracket with {} entrants and {} matches",
        format,
        state.entrant_count(),
        state.len()
    );
    Ok(state)
}

/// Apply a result to the state stored at `path` and write it back.
pub fn report(path: &Path, match_id: MatchId, report: MatchReport) -> Result<BracketState, Error> {
    let mut state = load_state(path)?;
    if state.match_by_id(match_id).is_none() {
        bail!("Match {match_id} does not exist in {}", path.display());
    }
    state.advance(match_id, report)?;
    save_state(path, &state)?;

    info!("Recorded result for match {match_id}");
    if let Some(champion) = state.champion() {
        info!("Champion: {champion}");
    }
    Ok(state)
}

fn segment_title(segment: Segment) -> &'static str {
    match segment {
        Segment::Winners => "Winners",
        Segment::Losers => "Losers",
        Segment::GrandFinal => "Grand Final",
    }
}

fn render_slot(slot: &Slot) -> String {
    match slot {
        Slot::Filled {
            entrant,
            score: Some(score),
        } => format!("{} [{score}]", entrant.short_name),
        Slot::Filled { entrant, .. } => entrant.short_name.clone(),
        other => other.to_string(),
    }
}

/// Plain-text view of a bracket, one line per match grouped by round.
pub fn render(state: &BracketState) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} elimination, {} entrants, current round: {}",
        state.format(),
        state.entrant_count(),
        state.current_round_name()
    );

    let mut segment = None;
    for round in state.rounds() {
        if segment != Some(round.segment) {
            segment = Some(round.segment);
            let _ = writeln!(out, "\n== {} ==", segment_title(round.segment));
        }
        let _ = writeln!(out, "{}", round.name);
        for m in round.match_ids.iter().filter_map(|&id| state.match_by_id(id)) {
            let [first, second] = m.slots();
            let status = match m.winner() {
                Some(winner) => format!(" -> {}", winner.short_name),
                None if m.is_ready() => " (ready)".to_string(),
                None => String::new(),
            };
            let _ = writeln!(
                out,
                "  #{:<3} {} vs {}{}",
                m.id(),
                render_slot(first),
                render_slot(second),
                status
            );
        }
    }

    if let Some(champion) = state.champion() {
        let _ = writeln!(out, "\nChampion: {champion}");
    }
    out
}
