use crate::bracket::{BracketView, MatchCell};
use crate::types::{PlayerProfile, RECORDED_FLASH_MS};
use std::collections::HashMap;

// ── Per-cell state machine ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchUiState {
  Idle,
  ConfirmingLaunch,
  AwaitingWinner,
  Recorded,
}

#[derive(Clone, Debug)]
pub enum Prompt {
  ConfirmLaunch {
    match_id: u64,
    player1: String,
    player2: String,
  },
  PickWinner {
    match_id: u64,
    player1: String,
    player2: String,
    selected: usize,
  },
  ConfirmReset,
  PlayerProfile {
    username: String,
    profile: Option<PlayerProfile>,
  },
}

impl Prompt {
  pub fn match_id(&self) -> Option<u64> {
    match self {
      Prompt::ConfirmLaunch { match_id, .. } | Prompt::PickWinner { match_id, .. } => {
        Some(*match_id)
      }
      _ => None,
    }
  }
}

/// Owns the single prompt slot. At most one prompt is open process-wide;
/// opening a new one releases whatever was open before.
#[derive(Debug, Default)]
pub struct PromptCoordinator {
  current: Option<Prompt>,
}

impl PromptCoordinator {
  pub fn open(&mut self, prompt: Prompt) {
    self.current = Some(prompt);
  }

  pub fn close(&mut self) -> Option<Prompt> {
    self.current.take()
  }

  pub fn current(&self) -> Option<&Prompt> {
    self.current.as_ref()
  }

  pub fn current_mut(&mut self) -> Option<&mut Prompt> {
    self.current.as_mut()
  }

  pub fn is_open(&self) -> bool {
    self.current.is_some()
  }
}

#[derive(Debug, Default)]
pub struct MatchWorkflows {
  states: HashMap<u64, MatchUiState>,
  flash_until_ms: HashMap<u64, u64>,
}

impl MatchWorkflows {
  pub fn new() -> Self {
    MatchWorkflows::default()
  }

  /// Rebuilds cell states for a freshly rendered view. Every prior state
  /// is dropped: a full reload replaces workflow state wholesale.
  pub fn reset_from_view(&mut self, view: &BracketView) {
    self.states.clear();
    self.flash_until_ms.clear();
    for round in &view.rounds {
      for cell in &round.matches {
        if cell.clickable {
          if let Some(match_id) = cell.match_id {
            self.states.insert(match_id, MatchUiState::Idle);
          }
        }
      }
    }
  }

  pub fn clear(&mut self) {
    self.states.clear();
    self.flash_until_ms.clear();
  }

  pub fn state(&self, match_id: u64) -> Option<MatchUiState> {
    self.states.get(&match_id).copied()
  }

  pub fn tracked(&self) -> usize {
    self.states.len()
  }

  /// Activation of a cell. A cell that already carries a result goes
  /// straight to winner selection so an operator can re-declare it; a
  /// fresh cell gets the launch confirmation first.
  pub fn activate(
    &mut self,
    cell: &MatchCell,
    prompts: &mut PromptCoordinator,
  ) -> Result<(), String> {
    if !cell.clickable {
      return Err("Match is not ready: both players must be known.".to_string());
    }
    let match_id = cell.match_id.ok_or_else(|| "Match has no id.".to_string())?;
    let state = self
      .states
      .get(&match_id)
      .copied()
      .unwrap_or(MatchUiState::Idle);
    let next = if cell.has_result || state == MatchUiState::AwaitingWinner {
      prompts.open(Prompt::PickWinner {
        match_id,
        player1: cell.player1.clone(),
        player2: cell.player2.clone(),
        selected: 0,
      });
      MatchUiState::AwaitingWinner
    } else {
      prompts.open(Prompt::ConfirmLaunch {
        match_id,
        player1: cell.player1.clone(),
        player2: cell.player2.clone(),
      });
      MatchUiState::ConfirmingLaunch
    };
    self.states.insert(match_id, next);
    Ok(())
  }

  /// Confirms the launch prompt. The cell stays in `ConfirmingLaunch`
  /// until the server answers the start request.
  pub fn begin_launch(&mut self, match_id: u64) -> Result<(), String> {
    let state = self
      .states
      .get(&match_id)
      .copied()
      .ok_or_else(|| "Match is no longer tracked.".to_string())?;
    if state != MatchUiState::ConfirmingLaunch {
      return Err("Match is not awaiting launch confirmation.".to_string());
    }
    Ok(())
  }

  pub fn dismiss(&mut self, match_id: u64) {
    if let Some(state) = self.states.get_mut(&match_id) {
      if matches!(
        *state,
        MatchUiState::ConfirmingLaunch | MatchUiState::AwaitingWinner
      ) {
        *state = MatchUiState::Idle;
      }
    }
  }

  pub fn launch_succeeded(&mut self, match_id: u64) -> Result<(), String> {
    let state = self
      .states
      .get_mut(&match_id)
      .ok_or_else(|| "Match is no longer tracked.".to_string())?;
    *state = MatchUiState::AwaitingWinner;
    Ok(())
  }

  pub fn launch_failed(&mut self, match_id: u64) {
    if let Some(state) = self.states.get_mut(&match_id) {
      *state = MatchUiState::Idle;
    }
  }

  pub fn result_recorded(&mut self, match_id: u64, now_ms: u64) -> Result<(), String> {
    let state = self
      .states
      .get_mut(&match_id)
      .ok_or_else(|| "Match is no longer tracked.".to_string())?;
    *state = MatchUiState::Recorded;
    self.flash_until_ms.insert(match_id, now_ms + RECORDED_FLASH_MS);
    Ok(())
  }

  /// Transient emphasis on a freshly recorded cell; reads false again
  /// once the flash window has elapsed.
  pub fn is_flashing(&self, match_id: u64, now_ms: u64) -> bool {
    self
      .flash_until_ms
      .get(&match_id)
      .is_some_and(|deadline| now_ms < *deadline)
  }
}
