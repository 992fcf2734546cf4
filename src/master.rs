//! The game master: owns the universe and drives the round loop.
//!
//! A game moves through four phases:
//!
//! ```text
//! Initialized --(every bot has a player)--> Ready --(play)--> Running --> Finished
//! ```
//!
//! Within a round, bots move one at a time in ascending id order. Each
//! player is asked for its move on a snapshot of the universe, bounded by
//! the configured timeout; any failure is turned into a forced `Stop` plus a
//! [`Event::PlayerFailure`]. Viewers see every round once it is committed.

mod result;
mod worker;

pub use result::{FailureRecord, GameOutcome, GameResult};

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{GameError, LayoutError, RegistrationError};
use crate::game::{
    assert_invariants, BotId, Event, FailureCause, Move, TeamId, Universe, NUMBER_TEAMS,
};
use crate::player::Player;
use crate::viewer::Viewer;
use worker::{panic_message, PlayerWorker};

/// Configuration for a single game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Number of rounds before the game ends.
    pub game_time: u32,
    /// Time budget for one `get_move` call. `None` waits forever.
    pub player_timeout: Option<Duration>,
    /// Team names, by id.
    pub team_names: [String; NUMBER_TEAMS],
    /// End the game as soon as a team has nothing left to eat.
    pub stop_when_food_exhausted: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_time: 300,
            player_timeout: Some(Duration::from_secs(3)),
            team_names: ["team 0".to_string(), "team 1".to_string()],
            stop_when_food_exhausted: true,
        }
    }
}

/// Lifecycle phase of a [`GameMaster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for players.
    Initialized,
    /// Every bot has a player.
    Ready,
    /// At least one round was played.
    Running,
    /// No more rounds will be played.
    Finished,
}

/// Orchestrates one game.
pub struct GameMaster {
    universe: Universe,
    config: GameConfig,
    players: Vec<Option<PlayerWorker>>,
    viewers: Vec<Box<dyn Viewer>>,
    phase: GamePhase,
    next_round: u32,
    failures: Vec<FailureRecord>,
}

impl GameMaster {
    /// Create a game on `layout_text` with `number_bots` bots, lasting
    /// `game_time` rounds. Other settings take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if the layout is invalid for `number_bots`.
    pub fn new(layout_text: &str, number_bots: usize, game_time: u32) -> Result<Self, LayoutError> {
        let config = GameConfig {
            game_time,
            ..GameConfig::default()
        };
        Self::with_config(layout_text, number_bots, config)
    }

    /// Create a game with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if the layout is invalid for `number_bots`.
    pub fn with_config(
        layout_text: &str,
        number_bots: usize,
        config: GameConfig,
    ) -> Result<Self, LayoutError> {
        let universe = Universe::create(layout_text, number_bots)?;
        Ok(Self::from_universe(universe, config))
    }

    /// Create a game on an existing universe.
    #[must_use]
    pub fn from_universe(mut universe: Universe, config: GameConfig) -> Self {
        for (team, name) in config.team_names.iter().enumerate() {
            universe.set_team_name(team, name);
        }
        let players = (0..universe.bots().len()).map(|_| None).collect();
        Self {
            universe,
            config,
            players,
            viewers: Vec::new(),
            phase: GamePhase::Initialized,
            next_round: 0,
            failures: Vec::new(),
        }
    }

    /// Register `player` to control `bot`.
    ///
    /// # Errors
    ///
    /// Fails if the player does not implement [`Player::get_move`], the bot
    /// does not exist, the bot already has a player, or the worker thread
    /// cannot be started.
    pub fn register_player<P: Player + 'static>(
        &mut self,
        player: P,
        bot: BotId,
    ) -> Result<(), RegistrationError> {
        if !player.is_implemented() {
            return Err(RegistrationError::NotImplemented {
                capability: "Player::get_move",
            });
        }
        let number_bots = self.players.len();
        let slot = self
            .players
            .get_mut(bot)
            .ok_or(RegistrationError::BotOutOfRange { bot, number_bots })?;
        if slot.is_some() {
            return Err(RegistrationError::AlreadyRegistered(bot));
        }
        *slot = Some(PlayerWorker::spawn(Box::new(player), bot)?);
        debug!(bot, "player registered");

        if self.phase == GamePhase::Initialized && self.missing_players().is_empty() {
            self.phase = GamePhase::Ready;
        }
        Ok(())
    }

    /// Append `viewer` to the broadcast list.
    ///
    /// # Errors
    ///
    /// Fails if the viewer does not implement [`Viewer::observe`].
    pub fn register_viewer<V: Viewer + 'static>(&mut self, viewer: V) -> Result<(), RegistrationError> {
        if !viewer.is_implemented() {
            return Err(RegistrationError::NotImplemented {
                capability: "Viewer::observe",
            });
        }
        self.viewers.push(Box::new(viewer));
        Ok(())
    }

    /// Rename a team. Unknown team ids are ignored.
    pub fn set_team_name(&mut self, team: TeamId, name: &str) {
        if let Some(slot) = self.config.team_names.get_mut(team) {
            name.clone_into(slot);
        }
        self.universe.set_team_name(team, name);
    }

    /// The current game state.
    #[must_use]
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// The game configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Index of the next round to be played.
    #[must_use]
    pub fn next_round(&self) -> u32 {
        self.next_round
    }

    /// Bots that still have no player, ascending.
    #[must_use]
    pub fn missing_players(&self) -> Vec<BotId> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_none())
            .map(|(bot, _)| bot)
            .collect()
    }

    /// Play rounds until the game finishes.
    ///
    /// A game that starts with a team having nothing to eat finishes
    /// without playing a turn.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotReady`] without touching the universe if some
    /// bot has no player, or [`GameError::Finished`] if the game is over.
    pub fn play(&mut self) -> Result<GameResult, GameError> {
        self.check_playable()?;
        info!(
            bots = self.players.len(),
            rounds = self.config.game_time,
            teams = ?self.config.team_names,
            "game started"
        );
        while self.phase != GamePhase::Finished {
            if self.next_round >= self.config.game_time || self.food_stop() {
                self.finish();
                break;
            }
            self.play_round(self.next_round)?;
        }
        Ok(self.result())
    }

    /// Play round `round`: one turn per bot in ascending id order, then one
    /// broadcast to every viewer. Returns the round's events.
    ///
    /// Afterwards the next round is `round + 1`. The game finishes once that
    /// reaches the round limit, or early when a team has run out of food to
    /// eat (the remaining turns of the round are skipped).
    ///
    /// # Errors
    ///
    /// Same as [`GameMaster::play`].
    pub fn play_round(&mut self, round: u32) -> Result<Vec<Event>, GameError> {
        self.check_playable()?;
        self.phase = GamePhase::Running;

        let mut events = Vec::new();
        let mut turns = 0;
        let mut exhausted = false;

        for bot in 0..self.players.len() {
            self.universe.set_clock(round, turns);
            let mv = self.request_move(round, bot, &mut events);
            debug!(round, bot, %mv, "turn");

            let turn_events = self.universe.apply_move(bot, mv);
            for event in &turn_events {
                if let Event::IllegalMove { bot, attempted } = event {
                    warn!(round, bot, %attempted, "illegal move, bot stays put");
                }
            }
            events.extend(turn_events);
            turns += 1;

            if self.food_stop() {
                exhausted = true;
                break;
            }
        }

        assert_invariants(&self.universe);
        debug!(round, turns, scores = ?self.universe.scores(), "round complete");
        self.notify_viewers(round, turns, &events);

        self.next_round = round.saturating_add(1);
        if exhausted || self.next_round >= self.config.game_time {
            self.finish();
        }
        Ok(events)
    }

    /// Summary of the game so far.
    #[must_use]
    pub fn result(&self) -> GameResult {
        GameResult {
            outcome: GameOutcome::from_universe(&self.universe),
            scores: self.universe.scores(),
            rounds_played: self.next_round,
            food_left: self.universe.food().len(),
            team_names: self.universe.teams().iter().map(|t| t.name.clone()).collect(),
            failures: self.failures.clone(),
        }
    }

    fn food_stop(&self) -> bool {
        self.config.stop_when_food_exhausted && self.universe.is_food_exhausted()
    }

    fn check_playable(&self) -> Result<(), GameError> {
        if self.phase == GamePhase::Finished {
            return Err(GameError::Finished);
        }
        let missing = self.missing_players();
        if !missing.is_empty() {
            return Err(GameError::NotReady { missing });
        }
        Ok(())
    }

    /// Ask `bot`'s player for a move, forcing `Stop` on any failure.
    fn request_move(&mut self, round: u32, bot: BotId, events: &mut Vec<Event>) -> Move {
        let snapshot = Arc::new(self.universe.clone());
        let timeout = self.config.player_timeout;
        let result = match self.players.get_mut(bot).and_then(Option::as_mut) {
            Some(worker) => worker.request_move(snapshot, timeout),
            None => Err(FailureCause::Disconnected),
        };
        match result {
            Ok(mv) => mv,
            Err(cause) => {
                warn!(round, bot, %cause, "player failed, forcing stop");
                self.failures.push(FailureRecord {
                    round,
                    bot,
                    cause: cause.clone(),
                });
                events.push(Event::PlayerFailure { bot, cause });
                Move::Stop
            }
        }
    }

    /// Hand the committed round to every viewer, in registration order.
    fn notify_viewers(&mut self, round: u32, turns: u32, events: &[Event]) {
        let universe = &self.universe;
        for (index, viewer) in self.viewers.iter_mut().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                viewer.observe(round, turns, universe, events)
            }));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(viewer = index, round, error = %format!("{err:#}"), "viewer failed"),
                Err(payload) => {
                    warn!(viewer = index, round, panic = %panic_message(&*payload), "viewer panicked");
                }
            }
        }
    }

    fn finish(&mut self) {
        self.phase = GamePhase::Finished;
        let result = self.result();
        info!(
            rounds = result.rounds_played,
            scores = ?result.scores,
            food_left = result.food_left,
            "{}",
            result.finished_line()
        );
    }
}

impl fmt::Debug for GameMaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameMaster")
            .field("phase", &self.phase)
            .field("next_round", &self.next_round)
            .field("players", &self.players.len())
            .field("viewers", &self.viewers.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::SMALL_LAYOUT;
    use crate::player::{ScriptedPlayer, StoppingPlayer};
    use crate::viewer::DevNullViewer;

    fn small(game_time: u32) -> GameMaster {
        GameMaster::new(SMALL_LAYOUT, 2, game_time).unwrap()
    }

    #[test]
    fn test_phases() {
        let mut gm = small(2);
        assert_eq!(gm.phase(), GamePhase::Initialized);
        gm.register_player(StoppingPlayer, 0).unwrap();
        assert_eq!(gm.phase(), GamePhase::Initialized);
        gm.register_player(StoppingPlayer, 1).unwrap();
        assert_eq!(gm.phase(), GamePhase::Ready);
        gm.play_round(0).unwrap();
        assert_eq!(gm.phase(), GamePhase::Running);
        gm.play_round(1).unwrap();
        assert_eq!(gm.phase(), GamePhase::Finished);
        assert_eq!(gm.play_round(2), Err(GameError::Finished));
        assert_eq!(gm.play(), Err(GameError::Finished));
    }

    #[test]
    fn test_registration_errors() {
        let mut gm = small(1);
        assert_eq!(
            gm.register_player(StoppingPlayer, 2),
            Err(RegistrationError::BotOutOfRange {
                bot: 2,
                number_bots: 2
            })
        );
        gm.register_player(StoppingPlayer, 0).unwrap();
        assert_eq!(
            gm.register_player(StoppingPlayer, 0),
            Err(RegistrationError::AlreadyRegistered(0))
        );
        gm.register_viewer(DevNullViewer).unwrap();
    }

    #[test]
    fn test_not_ready() {
        let mut gm = small(10);
        gm.register_player(StoppingPlayer, 1).unwrap();
        let before = gm.universe().clone();
        assert_eq!(gm.play(), Err(GameError::NotReady { missing: vec![0] }));
        assert_eq!(
            gm.play_round(0),
            Err(GameError::NotReady { missing: vec![0] })
        );
        assert_eq!(gm.universe(), &before);
        assert_eq!(gm.phase(), GamePhase::Initialized);
    }

    #[test]
    fn test_zero_game_time_finishes_immediately() {
        let mut gm = small(0);
        gm.register_player(StoppingPlayer, 0).unwrap();
        gm.register_player(StoppingPlayer, 1).unwrap();
        let result = gm.play().unwrap();
        assert_eq!(result.rounds_played, 0);
        assert_eq!(gm.phase(), GamePhase::Finished);
    }

    #[test]
    fn test_no_enemy_food_finishes_before_first_turn() {
        // team 0 has nothing to collect in the right half
        let mut gm = GameMaster::new("######\n#0. 1#\n######", 2, 10).unwrap();
        gm.register_player(ScriptedPlayer::new(vec![Move::East]), 0).unwrap();
        gm.register_player(StoppingPlayer, 1).unwrap();
        let before = gm.universe().clone();
        let result = gm.play().unwrap();
        assert_eq!(result.rounds_played, 0);
        assert!(result.failures.is_empty());
        assert_eq!(gm.universe(), &before);
        assert_eq!(gm.phase(), GamePhase::Finished);
    }

    #[test]
    fn test_failure_forces_stop() {
        let mut gm = small(3);
        gm.register_player(ScriptedPlayer::new(vec![Move::East]), 0).unwrap();
        gm.register_player(StoppingPlayer, 1).unwrap();
        gm.play_round(0).unwrap();
        let events = gm.play_round(1).unwrap();
        assert!(events.contains(&Event::PlayerFailure {
            bot: 0,
            cause: FailureCause::Error("script exhausted".to_string()),
        }));
        assert_eq!(gm.universe().bot(0).unwrap().position.x, 2);
        assert_eq!(gm.result().failures.len(), 1);
        assert_eq!(gm.result().failures[0].round, 1);
    }

    #[test]
    fn test_team_names() {
        let config = GameConfig {
            team_names: ["red".to_string(), "blue".to_string()],
            ..GameConfig::default()
        };
        let mut gm = GameMaster::with_config(SMALL_LAYOUT, 2, config).unwrap();
        assert_eq!(gm.universe().team(0).unwrap().name, "red");
        gm.set_team_name(1, "green");
        assert_eq!(gm.result().team_names, vec!["red", "green"]);
        assert_eq!(gm.config().team_names[1], "green");
    }
}
