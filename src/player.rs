//! The Player capability: agents that choose a bot's move each turn.
//!
//! A player sees the game only through a [`BotView`], a read-only window on
//! a snapshot of the universe. Implementations must override both
//! [`Player::get_move`] and [`Player::is_implemented`]; the game master
//! refuses players that keep the placeholder.
//!
//! ```
//! use mazectf::game::Move;
//! use mazectf::player::{BotView, Player};
//!
//! struct GoEast;
//!
//! impl Player for GoEast {
//!     fn get_move(&mut self, view: &BotView<'_>) -> anyhow::Result<Move> {
//!         Ok(if view.legal_moves().contains(&Move::East) { Move::East } else { Move::Stop })
//!     }
//!
//!     fn is_implemented(&self) -> bool {
//!         true
//!     }
//! }
//! ```

mod agents;

pub use agents::{FoodEaterPlayer, NqRandomPlayer, RandomPlayer, ScriptedPlayer, StoppingPlayer};

use crate::error::NotImplemented;
use crate::game::{Bot, BotId, Maze, Move, Position, Team, Universe};

/// Names accepted by [`builtin`].
pub const BUILTIN_PLAYERS: [&str; 4] = ["stopping", "random", "nq_random", "food_eater"];

/// Create a built-in player by name, seeding the random ones with `seed`.
#[must_use]
pub fn builtin(name: &str, seed: u64) -> Option<Box<dyn Player>> {
    let player: Box<dyn Player> = match name {
        "stopping" => Box::new(StoppingPlayer),
        "random" => Box::new(RandomPlayer::new(seed)),
        "nq_random" => Box::new(NqRandomPlayer::new(seed)),
        "food_eater" => Box::new(FoodEaterPlayer),
        _ => return None,
    };
    Some(player)
}

/// An agent controlling one bot.
///
/// Players run on their own worker thread, hence `Send`.
pub trait Player: Send {
    /// Choose the next move for the bot described by `view`.
    ///
    /// Errors and panics are isolated by the game master: the bot is forced
    /// to stop for that turn and a failure event is recorded.
    ///
    /// # Errors
    ///
    /// The placeholder always fails with [`NotImplemented`].
    fn get_move(&mut self, _view: &BotView<'_>) -> anyhow::Result<Move> {
        Err(NotImplemented("Player::get_move").into())
    }

    /// Marker that this type supplies its own [`Player::get_move`].
    ///
    /// Registration rejects players that return `false` here.
    fn is_implemented(&self) -> bool {
        false
    }
}

impl<P: Player + ?Sized> Player for Box<P> {
    fn get_move(&mut self, view: &BotView<'_>) -> anyhow::Result<Move> {
        (**self).get_move(view)
    }

    fn is_implemented(&self) -> bool {
        (**self).is_implemented()
    }
}

/// Read-only view of the universe from one bot's perspective.
#[derive(Debug, Clone, Copy)]
pub struct BotView<'a> {
    universe: &'a Universe,
    bot: &'a Bot,
    team: &'a Team,
    enemy: &'a Team,
}

impl<'a> BotView<'a> {
    /// View `universe` as bot `bot`. Returns `None` for unknown bots.
    #[must_use]
    pub fn new(universe: &'a Universe, bot: BotId) -> Option<Self> {
        let bot = universe.bot(bot)?;
        let team = universe.team(bot.team)?;
        let enemy = universe.team(Universe::enemy_team(bot.team))?;
        Some(Self {
            universe,
            bot,
            team,
            enemy,
        })
    }

    /// The whole universe snapshot.
    #[must_use]
    pub fn universe(&self) -> &'a Universe {
        self.universe
    }

    /// The wall grid.
    #[must_use]
    pub fn maze(&self) -> &'a Maze {
        self.universe.maze()
    }

    /// The bot being controlled.
    #[must_use]
    pub fn me(&self) -> &'a Bot {
        self.bot
    }

    /// Current position of the controlled bot.
    #[must_use]
    pub fn position(&self) -> Position {
        self.bot.position
    }

    /// The controlled bot's team.
    #[must_use]
    pub fn team(&self) -> &'a Team {
        self.team
    }

    /// The opposing team.
    #[must_use]
    pub fn enemy_team(&self) -> &'a Team {
        self.enemy
    }

    /// Teammates, excluding the controlled bot.
    pub fn team_bots(&self) -> impl Iterator<Item = &'a Bot> + 'a {
        let me = self.bot;
        self.universe
            .bots()
            .iter()
            .filter(move |b| b.team == me.team && b.id != me.id)
    }

    /// Bots of the opposing team.
    pub fn enemy_bots(&self) -> impl Iterator<Item = &'a Bot> + 'a {
        let team = self.bot.team;
        self.universe.bots().iter().filter(move |b| b.team != team)
    }

    /// Moves that do not run into a wall, `Stop` included.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<Move> {
        self.maze().legal_moves(self.bot.position)
    }

    /// Pellets this bot's team can still eat.
    #[must_use]
    pub fn enemy_food(&self) -> Vec<Position> {
        self.universe.enemy_food(self.bot.team).collect()
    }

    /// Pellets in this bot's home zone, which the enemy is after.
    #[must_use]
    pub fn team_food(&self) -> Vec<Position> {
        self.universe.enemy_food(self.enemy.id).collect()
    }

    /// Check if `pos` lies in this bot's home zone.
    #[must_use]
    pub fn in_home_zone(&self, pos: Position) -> bool {
        self.team.zone.contains(pos)
    }

    /// Check if the controlled bot is currently an invader.
    #[must_use]
    pub fn is_invader(&self) -> bool {
        !self.in_home_zone(self.bot.position)
    }

    /// Round being played.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.universe.round()
    }
}
