use crate::types::*;
use std::collections::BTreeMap;

pub const INVALID_BRACKET_MESSAGE: &str = "Invalid bracket data.";

// ── View tree ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct BracketView {
  pub rounds: Vec<RoundView>,
  pub total_rounds: usize,
  pub error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RoundView {
  pub round_number: i64,
  pub label: String,
  pub matches: Vec<MatchCell>,
}

#[derive(Clone, Debug)]
pub struct MatchCell {
  pub match_id: Option<u64>,
  pub player1: String,
  pub player2: String,
  pub winner: Option<String>,
  pub clickable: bool,
  pub has_result: bool,
}

impl MatchCell {
  pub fn versus_line(&self) -> String {
    format!("{} vs {}", self.player1, self.player2)
  }

  pub fn result_line(&self) -> String {
    match &self.winner {
      Some(winner) => format!("🏆 {winner}"),
      None => String::new(),
    }
  }
}

impl BracketView {
  pub fn rounds_rendered(&self) -> usize {
    self.rounds.len()
  }

  pub fn progress_ratio(&self) -> f64 {
    if self.total_rounds == 0 {
      return 0.0;
    }
    self.rounds_rendered() as f64 / self.total_rounds as f64
  }

  pub fn progress_percent(&self) -> u32 {
    (self.progress_ratio() * 100.0).round() as u32
  }

  pub fn find_cell(&self, match_id: u64) -> Option<&MatchCell> {
    self
      .rounds
      .iter()
      .flat_map(|round| round.matches.iter())
      .find(|cell| cell.match_id == Some(match_id))
  }

  pub fn find_cell_mut(&mut self, match_id: u64) -> Option<&mut MatchCell> {
    self
      .rounds
      .iter_mut()
      .flat_map(|round| round.matches.iter_mut())
      .find(|cell| cell.match_id == Some(match_id))
  }

  /// Patches one cell after a recorded result. Labels and round counts are
  /// left alone until the next full reload.
  pub fn apply_winner(&mut self, match_id: u64, winner: &str) -> bool {
    let Some(cell) = self.find_cell_mut(match_id) else {
      return false;
    };
    cell.winner = Some(winner.to_string());
    cell.has_result = true;
    true
  }
}

// ── Rendering ──────────────────────────────────────────────────────────

pub fn display_name(slot: Option<&Opponent>) -> String {
  match slot {
    Some(opponent) => {
      if let Some(name) = opponent.name.as_ref() {
        name.clone()
      } else if opponent.id.is_some() {
        "TBD".to_string()
      } else {
        "BYE".to_string()
      }
    }
    None => "BYE".to_string(),
  }
}

pub fn winner_name(matched: &BracketMatch) -> Option<String> {
  if opponent_won(matched.opponent1.as_ref()) {
    return Some(display_name(matched.opponent1.as_ref()));
  }
  if opponent_won(matched.opponent2.as_ref()) {
    return Some(display_name(matched.opponent2.as_ref()));
  }
  None
}

fn opponent_won(slot: Option<&Opponent>) -> bool {
  slot.and_then(|opponent| opponent.result.as_deref()) == Some("win")
}

fn is_concrete(name: &str) -> bool {
  name != "TBD" && name != "BYE"
}

/// Label for the bucket at `position` (0-based, earliest round first) out
/// of `total` buckets. Purely positional: the last bucket is always the
/// final no matter what its raw round number is.
pub fn round_label(position: usize, total: usize) -> String {
  match total.saturating_sub(position) {
    1 => "Final".to_string(),
    2 => "Semi-finals".to_string(),
    3 => "Quarter-finals".to_string(),
    _ => format!("Round {}", position + 1),
  }
}

pub fn render(document: &BracketDocument) -> BracketView {
  let Some(raw_matches) = document.matches.as_array() else {
    return BracketView {
      rounds: Vec::new(),
      total_rounds: 0,
      error: Some(INVALID_BRACKET_MESSAGE.to_string()),
    };
  };

  let mut buckets: BTreeMap<i64, Vec<BracketMatch>> = BTreeMap::new();
  for raw in raw_matches {
    let parsed = serde_json::from_value::<BracketMatch>(raw.clone()).unwrap_or_default();
    buckets.entry(parsed.round.unwrap_or(1)).or_default().push(parsed);
  }

  let total_rounds = buckets.len();
  let rounds = buckets
    .into_iter()
    .enumerate()
    .map(|(position, (round_number, matches))| RoundView {
      round_number,
      label: round_label(position, total_rounds),
      matches: matches.iter().map(build_cell).collect(),
    })
    .collect();

  BracketView {
    rounds,
    total_rounds,
    error: None,
  }
}

fn build_cell(matched: &BracketMatch) -> MatchCell {
  let player1 = display_name(matched.opponent1.as_ref());
  let player2 = display_name(matched.opponent2.as_ref());
  let clickable = is_concrete(&player1) && is_concrete(&player2);
  let has_result = matched
    .opponent1
    .as_ref()
    .and_then(|opponent| opponent.result.as_ref())
    .is_some()
    || matched
      .opponent2
      .as_ref()
      .and_then(|opponent| opponent.result.as_ref())
      .is_some();
  MatchCell {
    match_id: matched.id,
    player1,
    player2,
    winner: winner_name(matched),
    clickable,
    has_result,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::{json, Value};

  fn make_document(matches: Value) -> BracketDocument {
    serde_json::from_value(json!({
      "stages": [{ "id": 1, "name": "Main" }],
      "participants": [],
      "matches": matches,
    }))
    .unwrap()
  }

  fn make_match(id: u64, round: i64, opponent1: Value, opponent2: Value) -> Value {
    json!({ "id": id, "round": round, "opponent1": opponent1, "opponent2": opponent2 })
  }

  fn named(id: u64, name: &str) -> Value {
    json!({ "id": id, "name": name })
  }

  #[test]
  fn test_matches_partition_into_round_buckets() {
    let document = make_document(json!([
      make_match(1, 1, named(1, "Alice"), named(2, "Bob")),
      make_match(2, 1, named(3, "Carol"), named(4, "Dan")),
      make_match(3, 2, json!({ "id": null }), json!({ "id": null })),
    ]));
    let view = render(&document);
    assert!(view.error.is_none());
    assert_eq!(view.total_rounds, 2);
    assert_eq!(view.rounds[0].matches.len(), 2);
    assert_eq!(view.rounds[1].matches.len(), 1);
  }

  #[test]
  fn test_rounds_sort_numerically_not_lexically() {
    let document = make_document(json!([
      make_match(1, 10, named(1, "A"), named(2, "B")),
      make_match(2, 1, named(3, "C"), named(4, "D")),
      make_match(3, 2, named(5, "E"), named(6, "F")),
    ]));
    let view = render(&document);
    let order: Vec<i64> = view.rounds.iter().map(|round| round.round_number).collect();
    assert_eq!(order, vec![1, 2, 10]);
  }

  #[test]
  fn test_round_absent_defaults_to_one() {
    let document = make_document(json!([
      json!({ "id": 1, "opponent1": named(1, "A"), "opponent2": named(2, "B") }),
      make_match(2, 2, named(3, "C"), named(4, "D")),
    ]));
    let view = render(&document);
    assert_eq!(view.rounds[0].round_number, 1);
    assert_eq!(view.rounds[0].matches.len(), 1);
  }

  #[test]
  fn test_round_labels_are_positional() {
    assert_eq!(round_label(0, 1), "Final");
    assert_eq!(round_label(0, 2), "Semi-finals");
    assert_eq!(round_label(1, 2), "Final");
    assert_eq!(round_label(0, 3), "Quarter-finals");
    assert_eq!(round_label(0, 4), "Round 1");
    assert_eq!(round_label(1, 4), "Quarter-finals");
    assert_eq!(round_label(2, 6), "Round 3");
    assert_eq!(round_label(5, 6), "Final");
  }

  #[test]
  fn test_labels_follow_position_not_round_number() {
    // Rounds 1 and 3 with nothing in between still label positionally.
    let document = make_document(json!([
      make_match(1, 1, named(1, "A"), named(2, "B")),
      make_match(2, 3, named(3, "C"), named(4, "D")),
    ]));
    let view = render(&document);
    assert_eq!(view.rounds[0].label, "Semi-finals");
    assert_eq!(view.rounds[1].label, "Final");
  }

  #[test]
  fn test_display_name_rules() {
    assert_eq!(display_name(None), "BYE");
    let no_id: Opponent = serde_json::from_value(json!({})).unwrap();
    assert_eq!(display_name(Some(&no_id)), "BYE");
    let id_only: Opponent = serde_json::from_value(json!({ "id": 7 })).unwrap();
    assert_eq!(display_name(Some(&id_only)), "TBD");
    let full: Opponent = serde_json::from_value(json!({ "id": 7, "name": "Alice" })).unwrap();
    assert_eq!(display_name(Some(&full)), "Alice");
  }

  #[test]
  fn test_clickable_requires_two_concrete_names() {
    let document = make_document(json!([
      make_match(1, 1, named(1, "Alice"), named(2, "Bob")),
      make_match(2, 1, named(3, "Carol"), json!({ "id": 4 })),
      make_match(3, 1, named(5, "Eve"), json!(null)),
    ]));
    let view = render(&document);
    let cells = &view.rounds[0].matches;
    assert!(cells[0].clickable);
    assert!(!cells[1].clickable, "TBD opponent must stay inert");
    assert!(!cells[2].clickable, "BYE opponent must stay inert");
  }

  #[test]
  fn test_invalid_matches_renders_error_view() {
    for matches in [json!(null), json!("nope"), json!({ "0": {} }), json!(42)] {
      let document = make_document(matches);
      let view = render(&document);
      assert_eq!(view.error.as_deref(), Some(INVALID_BRACKET_MESSAGE));
      assert!(view.rounds.is_empty(), "no partial tree on invalid input");
      assert_eq!(view.progress_percent(), 0);
    }
    let missing: BracketDocument =
      serde_json::from_value(json!({ "stages": [], "participants": [] })).unwrap();
    let view = render(&missing);
    assert_eq!(view.error.as_deref(), Some(INVALID_BRACKET_MESSAGE));
  }

  #[test]
  fn test_garbage_match_entries_render_as_byes() {
    let document = make_document(json!(["junk", make_match(1, 1, named(1, "A"), named(2, "B"))]));
    let view = render(&document);
    assert!(view.error.is_none());
    let cells = &view.rounds[0].matches;
    assert_eq!(cells[0].versus_line(), "BYE vs BYE");
    assert!(!cells[0].clickable);
    assert!(cells[1].clickable);
  }

  #[test]
  fn test_single_match_renders_final_with_no_winner() {
    let document = make_document(json!([
      make_match(1, 1, named(1, "A"), named(2, "B")),
    ]));
    let view = render(&document);
    assert_eq!(view.total_rounds, 1);
    assert_eq!(view.rounds[0].label, "Final");
    let cell = &view.rounds[0].matches[0];
    assert_eq!(cell.versus_line(), "A vs B");
    assert_eq!(cell.result_line(), "");
    assert!(cell.clickable);
    assert!(!cell.has_result);
  }

  #[test]
  fn test_prewon_cell_shows_trophy_winner() {
    let document = make_document(json!([
      make_match(1, 1, json!({ "id": 1, "name": "A", "result": "win" }), named(2, "B")),
    ]));
    let view = render(&document);
    let cell = &view.rounds[0].matches[0];
    assert_eq!(cell.winner.as_deref(), Some("A"));
    assert_eq!(cell.result_line(), "🏆 A");
    assert!(cell.has_result);
  }

  #[test]
  fn test_loss_result_sets_has_result_without_winner() {
    let document = make_document(json!([
      make_match(1, 1, json!({ "id": 1, "name": "A", "result": "loss" }), named(2, "B")),
    ]));
    let view = render(&document);
    let cell = &view.rounds[0].matches[0];
    assert!(cell.winner.is_none());
    assert!(cell.has_result);
  }

  #[test]
  fn test_apply_winner_patches_only_one_cell() {
    let document = make_document(json!([
      make_match(1, 1, named(1, "A"), named(2, "B")),
      make_match(2, 1, named(3, "C"), named(4, "D")),
    ]));
    let mut view = render(&document);
    assert!(view.apply_winner(1, "A"));
    assert_eq!(view.rounds[0].matches[0].winner.as_deref(), Some("A"));
    assert!(view.rounds[0].matches[0].has_result);
    assert!(view.rounds[0].matches[1].winner.is_none());
    assert!(!view.rounds[0].matches[1].has_result);
    assert!(!view.apply_winner(99, "A"));
  }

  #[test]
  fn test_progress_covers_rendered_rounds() {
    let document = make_document(json!([
      make_match(1, 1, named(1, "A"), named(2, "B")),
      make_match(2, 2, json!(null), json!(null)),
    ]));
    let view = render(&document);
    assert_eq!(view.rounds_rendered(), 2);
    assert!((view.progress_ratio() - 1.0).abs() < f64::EPSILON);
    assert_eq!(view.progress_percent(), 100);

    let empty = make_document(json!([]));
    let view = render(&empty);
    assert_eq!(view.progress_percent(), 0);
    assert!(view.error.is_none());
  }
}
