//! The mutable game state and the move resolution rules.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::LayoutError;
use crate::game::{Event, Layout, Maze, Move, Position, Zone};

/// Bot identifier, equal to its index in [`Universe::bots`].
pub type BotId = usize;

/// Team identifier, equal to its index in [`Universe::teams`].
pub type TeamId = usize;

/// Number of teams in a game.
pub const NUMBER_TEAMS: usize = 2;

/// A single bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bot {
    /// Stable identifier.
    pub id: BotId,
    /// Owning team.
    pub team: TeamId,
    /// Current cell.
    pub position: Position,
    /// Spawn cell, returned to when eaten.
    pub initial_position: Position,
}

/// A team: its bots, its score and the zone it defends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    /// Stable identifier.
    pub id: TeamId,
    /// Display name, used in the final result line.
    pub name: String,
    /// Owned bots, ascending.
    pub bots: Vec<BotId>,
    /// Pellets collected so far.
    pub score: u32,
    /// Half of the maze this team defends.
    pub zone: Zone,
}

/// Things that can be queried with [`Universe::has_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A wall cell.
    Wall,
    /// A pellet.
    Food,
    /// Any bot, of either team.
    Bot,
}

/// The complete game state.
///
/// Two universes compare equal when maze, food, every bot's current and
/// initial position, and every team's score match. The round and turn
/// counters are ignored.
#[derive(Debug, Clone)]
pub struct Universe {
    maze: Maze,
    food: BTreeSet<Position>,
    initial_food: usize,
    bots: Vec<Bot>,
    teams: Vec<Team>,
    round: u32,
    turn: u32,
}

impl Universe {
    /// Create a universe from layout text with `number_bots` bots.
    ///
    /// Bot `i` joins team `i % 2`; team 0 defends the first half of the maze
    /// along its long axis, team 1 the second.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if the layout is malformed or fewer than two
    /// bots are requested.
    pub fn create(layout_text: &str, number_bots: usize) -> Result<Self, LayoutError> {
        if number_bots < NUMBER_TEAMS {
            return Err(LayoutError::TooFewBots(number_bots));
        }
        let layout = Layout::parse(layout_text, number_bots)?;
        Ok(Self::from_layout(layout))
    }

    /// Create a universe from an already parsed layout.
    #[must_use]
    pub fn from_layout(layout: Layout) -> Self {
        let Layout { maze, food, bots } = layout;

        let bots: Vec<Bot> = bots
            .into_iter()
            .enumerate()
            .map(|(id, position)| Bot {
                id,
                team: id % NUMBER_TEAMS,
                position,
                initial_position: position,
            })
            .collect();

        let teams = maze
            .zones()
            .into_iter()
            .enumerate()
            .map(|(id, zone)| Team {
                id,
                name: format!("team {id}"),
                bots: bots.iter().filter(|b| b.team == id).map(|b| b.id).collect(),
                score: 0,
                zone,
            })
            .collect();

        Self {
            initial_food: food.len(),
            maze,
            food,
            bots,
            teams,
            round: 0,
            turn: 0,
        }
    }

    /// The wall grid.
    #[must_use]
    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// Cells currently holding a pellet.
    #[must_use]
    pub fn food(&self) -> &BTreeSet<Position> {
        &self.food
    }

    /// Number of pellets at creation.
    #[must_use]
    pub fn initial_food(&self) -> usize {
        self.initial_food
    }

    /// All bots, indexed by id.
    #[must_use]
    pub fn bots(&self) -> &[Bot] {
        &self.bots
    }

    /// Get a bot by id.
    #[must_use]
    pub fn bot(&self, id: BotId) -> Option<&Bot> {
        self.bots.get(id)
    }

    /// All teams, indexed by id.
    #[must_use]
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Get a team by id.
    #[must_use]
    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(id)
    }

    /// Scores of all teams, indexed by team id.
    #[must_use]
    pub fn scores(&self) -> Vec<u32> {
        self.teams.iter().map(|t| t.score).collect()
    }

    /// Round currently being played.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Turn within the current round.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// The opponent of `team`.
    #[must_use]
    pub const fn enemy_team(team: TeamId) -> TeamId {
        (team + 1) % NUMBER_TEAMS
    }

    /// Check for a wall, pellet or bot at `pos`.
    #[must_use]
    pub fn has_at(&self, entity: Entity, pos: Position) -> bool {
        match entity {
            Entity::Wall => self.maze.is_wall(pos),
            Entity::Food => self.food.contains(&pos),
            Entity::Bot => self.bots.iter().any(|b| b.position == pos),
        }
    }

    /// Bots standing on `pos`, ascending by id.
    pub fn bots_at(&self, pos: Position) -> impl Iterator<Item = &Bot> {
        self.bots.iter().filter(move |b| b.position == pos)
    }

    /// The team whose zone contains `pos`.
    #[must_use]
    pub fn zone_owner(&self, pos: Position) -> TeamId {
        self.teams
            .iter()
            .find(|t| t.zone.contains(pos))
            .map_or(NUMBER_TEAMS - 1, |t| t.id)
    }

    /// Check if a bot is currently inside the enemy zone.
    #[must_use]
    pub fn is_invader(&self, bot: BotId) -> bool {
        self.bots
            .get(bot)
            .is_some_and(|b| self.zone_owner(b.position) != b.team)
    }

    /// Pellets `team` can still collect: those lying in the enemy zone.
    pub fn enemy_food(&self, team: TeamId) -> impl Iterator<Item = Position> + '_ {
        self.food
            .iter()
            .copied()
            .filter(move |&pos| self.zone_owner(pos) != team)
    }

    /// Check if some team has nothing left to collect.
    #[must_use]
    pub fn is_food_exhausted(&self) -> bool {
        self.teams
            .iter()
            .any(|team| self.enemy_food(team.id).next().is_none())
    }

    /// Apply `mv` to `bot` and resolve the consequences.
    ///
    /// A move into a wall leaves the bot where it is and is resolved as
    /// `Stop`; a bot that does not move triggers nothing. Landing on enemy
    /// bots sends whichever side is the invader back to its spawn. A bot
    /// that survives on a pellet in the enemy zone eats it and scores for
    /// its team. Unknown bot ids produce no events.
    pub fn apply_move(&mut self, bot: BotId, mv: Move) -> Vec<Event> {
        let mut events = Vec::new();
        let Some(mover) = self.bots.get(bot) else {
            return events;
        };
        let from = mover.position;
        let team = mover.team;

        let target = match from.step(mv) {
            Some(target) if self.maze.is_floor(target) => target,
            _ => {
                debug!(bot, %mv, %from, "illegal move");
                events.push(Event::IllegalMove { bot, attempted: mv });
                from
            }
        };

        // a bot that stays put interacts with nothing
        if target == from {
            return events;
        }
        self.bots[bot].position = target;
        events.push(Event::BotMoved {
            bot,
            from,
            to: target,
        });

        let owner = self.zone_owner(target);
        let enemies: Vec<BotId> = self
            .bots_at(target)
            .filter(|b| b.team != team)
            .map(|b| b.id)
            .collect();

        if owner == team {
            for eaten in enemies {
                self.respawn(eaten);
                events.push(Event::BotEaten { eaten, eater: bot });
            }
        } else if let Some(&eater) = enemies.iter().find(|&&e| self.bots[e].team == owner) {
            self.respawn(bot);
            events.push(Event::BotEaten { eaten: bot, eater });
            return events;
        }

        if owner != team && self.food.remove(&target) {
            events.push(Event::FoodEaten {
                position: target,
                team,
            });
            let score = self.score_point(team);
            events.push(Event::TeamScored { team, score });
        }

        events
    }

    /// Add one point to `team`, returning the new total.
    fn score_point(&mut self, team: TeamId) -> u32 {
        let Some(team) = self.teams.get_mut(team) else {
            return 0;
        };
        team.score += 1;
        team.score
    }

    fn respawn(&mut self, bot: BotId) {
        if let Some(b) = self.bots.get_mut(bot) {
            b.position = b.initial_position;
        }
    }

    pub(crate) fn set_clock(&mut self, round: u32, turn: u32) {
        self.round = round;
        self.turn = turn;
    }

    pub(crate) fn set_team_name(&mut self, team: TeamId, name: &str) {
        if let Some(team) = self.teams.get_mut(team) {
            name.clone_into(&mut team.name);
        }
    }
}

impl PartialEq for Universe {
    fn eq(&self, other: &Self) -> bool {
        self.maze == other.maze
            && self.food == other.food
            && self.bots == other.bots
            && self.scores() == other.scores()
    }
}

impl Eq for Universe {}

impl fmt::Display for Universe {
    /// Render in the layout grammar with bots at their current positions.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.maze.render_with(&self.food, |pos| {
            self.bots_at(pos)
                .next()
                .and_then(|b| char::from_digit(u32::try_from(b.id).ok()?, 10))
        });
        f.write_str(&text)
    }
}
