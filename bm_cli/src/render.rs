//! Text and JSON views of a generated sector.

use bridge_movement::{
    Sector, SectorConfig, Seat,
    movement::RoundState,
    rotation::{RegisteredRotation, RotationParams},
};
use serde::Serialize;
use std::fmt::Write;

#[derive(Serialize)]
struct SectorView<'a> {
    config: &'a SectorConfig,
    rounds: &'a [RoundState],
}

/// Sector configuration and every round as pretty JSON
pub fn rounds_json(config: &SectorConfig, sector: &Sector) -> serde_json::Result<String> {
    let rounds = sector.movement().map(|m| m.rounds()).unwrap_or_default();
    serde_json::to_string_pretty(&SectorView { config, rounds })
}

/// One block per round, one line per table
pub fn rounds_text(sector: &Sector) -> String {
    let mut out = String::new();
    let Some(movement) = sector.movement() else {
        return out;
    };

    for (idx, state) in movement.rounds().iter().enumerate() {
        let _ = writeln!(out, "Round {}", idx + 1);
        for table in sector.tables() {
            let id = table.id();
            let name = table.to_string();
            let queue = state.boards.get(&id);
            let groups: Vec<String> = queue
                .into_iter()
                .flatten()
                .map(ToString::to_string)
                .collect();

            match (state.pair_at(Seat::ns(id)), state.pair_at(Seat::ew(id))) {
                (Some(ns), Some(ew)) => {
                    let _ = writeln!(
                        out,
                        "  {name:>4}: {ns:>3} v {ew:<3} {}",
                        groups.join(" ")
                    );
                }
                (Some(pair), None) | (None, Some(pair)) => {
                    let _ = writeln!(out, "  {name:>4}: {pair:>3} sits out");
                }
                (None, None) if !groups.is_empty() => {
                    let _ = writeln!(out, "  {name:>4}: holds {}", groups.join(" "));
                }
                (None, None) => {}
            }
        }
    }
    out
}

/// Table of candidate rotations
pub fn candidates_text(candidates: &[(&RegisteredRotation, RotationParams)]) -> String {
    let mut out = String::new();
    for (entry, params) in candidates {
        let _ = writeln!(
            out,
            "{:<10} {params} ({} boards)",
            entry.name,
            params.total_boards()
        );
    }
    out
}
