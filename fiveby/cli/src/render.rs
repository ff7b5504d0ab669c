//! Plain-text rendering of snapshots and argument parsing helpers

use std::fmt::Write;

use fiveby_core::resolver::{format_locks, HIDDEN_PLACEHOLDER};
use fiveby_core::schema::snapshot::GameResult;
use fiveby_core::schema::HealthResponse;
use fiveby_core::{
    interpret, CellIndex, CellSnapshot, LineIndex, PlayerSnapshot, SessionSnapshot,
    TurnActionResolver,
};

const LOCKED_MARK: char = '#';

/// Parse a cell given as `r2c3` (1-based) or a raw index `0`..`24`
pub fn parse_cell(input: &str) -> Result<CellIndex, String> {
    let input = input.trim().to_ascii_lowercase();
    if let Some(rest) = input.strip_prefix('r') {
        let (row, col) = rest
            .split_once('c')
            .ok_or_else(|| format!("expected r<row>c<col>, got {input}"))?;
        return Ok(CellIndex::from_row_col(parse_line(row)?, parse_line(col)?));
    }
    let index: u8 = input
        .parse()
        .map_err(|_| format!("expected r<row>c<col> or 0-24, got {input}"))?;
    CellIndex::try_from(index)
}

/// Parse a 1-based row or column number
pub fn parse_line(input: &str) -> Result<LineIndex, String> {
    let number: u8 = input
        .trim()
        .parse()
        .map_err(|_| format!("expected a line number 1-5, got {input}"))?;
    number
        .checked_sub(1)
        .ok_or_else(|| "line numbers start at 1".to_string())
        .and_then(LineIndex::try_from)
}

fn cell_glyph(cell: &CellSnapshot) -> char {
    match cell.letter {
        Some(letter) if cell.revealed => letter.as_char(),
        _ if cell.locked => LOCKED_MARK,
        _ => HIDDEN_PLACEHOLDER,
    }
}

/// A player's grid with row and column labels
pub fn render_grid(player: &PlayerSnapshot) -> String {
    let mut out = String::from("     c1 c2 c3 c4 c5\n");
    for row in LineIndex::all() {
        let _ = write!(out, "  r{} ", row.get() + 1);
        for col in LineIndex::all() {
            let glyph = player
                .cell(CellIndex::from_row_col(row, col))
                .map_or('?', cell_glyph);
            let _ = write!(out, "  {glyph}");
        }
        out.push('\n');
    }
    out
}

/// Full session view: header, both grids, last event, result
pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Session {}", snapshot.session_id);

    if let Some(result) = snapshot.winner() {
        let line = match result {
            GameResult::Winner(number) => snapshot.player(number).map_or_else(
                || format!("Player {number} wins"),
                |player| format!("{} wins", player.display_name()),
            ),
            GameResult::Tie => "Tie game".to_string(),
        };
        let _ = writeln!(out, "Game over. {line}.");
    } else if let Some(active) = snapshot.active_player() {
        let _ = writeln!(out, "{} to move.", active.display_name());
    }

    for player in &snapshot.players {
        let _ = writeln!(
            out,
            "\n{} (player {}) score {} revealed {}/25",
            player.display_name(),
            player.player_number,
            player.score,
            player.revealed_count()
        );
        out.push_str(&render_grid(player));
        let _ = writeln!(out, "  Locked: {}", format_locks(&player.locked_cells()));
    }

    if let Some(event) = &snapshot.last_event {
        let _ = writeln!(out, "\nLast: {}", interpret(event).summary());
    }
    out
}

/// What the player to move may do
pub fn render_actions(resolver: &TurnActionResolver<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Player {} options:", resolver.player_number());

    let answer = resolver.can_answer();
    if answer.eligible {
        if let Some(question) = resolver.pending_question() {
            let _ = writeln!(
                out,
                "  Answer pending {} question for {}: {}",
                question.topic,
                question.cell_index.position_label(),
                question.question_text
            );
        }
    }

    let askable = resolver.askable_cells();
    let _ = writeln!(out, "  Askable cells: {}", askable.len());
    let guessable = resolver.guessable_cells();
    let _ = writeln!(out, "  Letter guesses: {}", guessable.len());

    let words: Vec<String> = resolver
        .word_targets()
        .into_iter()
        .filter(|target| target.eligibility.eligible)
        .map(|target| format!("{} {}", target.label(), target.pattern))
        .collect();
    if words.is_empty() {
        out.push_str("  Word guesses: none\n");
    } else {
        let _ = writeln!(out, "  Word guesses: {}", words.join(", "));
    }
    out
}

/// One line for `health`
pub fn render_health(health: &HealthResponse) -> String {
    let verdict = if health.is_healthy() { "healthy" } else { "degraded" };
    format!(
        "{}: {} (status {}, db {})",
        health.service, verdict, health.status, health.db.status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_cell_forms() {
        assert_eq!(parse_cell("r1c1").unwrap().get(), 0);
        assert_eq!(parse_cell("R2C3").unwrap().get(), 7);
        assert_eq!(parse_cell("24").unwrap().get(), 24);
        assert!(parse_cell("25").is_err());
        assert!(parse_cell("r0c1").is_err());
        assert!(parse_cell("r6c1").is_err());
        assert!(parse_cell("middle").is_err());
    }

    #[test]
    fn test_parse_line_is_one_based() {
        assert_eq!(parse_line("1").unwrap().get(), 0);
        assert_eq!(parse_line(" 5 ").unwrap().get(), 4);
        assert!(parse_line("0").is_err());
    }
}
