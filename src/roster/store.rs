// Roster store
// Owns the working lineup order and the at-bat counters.
use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::models::{AtBatAdjustment, PlayerId, PlayerRecord};
use crate::error::NotFoundError;

#[derive(Debug, Clone, Default)]
pub struct RosterStore {
    players: Vec<PlayerRecord>,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the working order from freshly loaded records and an optional saved order.
    ///
    /// Saved ids come first, in saved order; ids the roster no longer has are dropped.
    /// Records the saved order does not mention are appended in their original order.
    pub fn initialize(records: Vec<PlayerRecord>, saved_order: Option<&[PlayerId]>) -> Self {
        let saved = match saved_order {
            Some(ids) if !ids.is_empty() => ids,
            _ => {
                debug!("No saved order, using {} players in source order", records.len());
                return Self { players: records };
            }
        };

        let mut remaining: Vec<Option<PlayerRecord>> = records.into_iter().map(Some).collect();
        let mut players = Vec::with_capacity(remaining.len());
        let mut placed = HashSet::with_capacity(remaining.len());

        for id in saved {
            if !placed.insert(*id) {
                continue;
            }
            match remaining
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|p| p.id == *id))
                .and_then(Option::take)
            {
                Some(player) => players.push(player),
                None => debug!(id, "Saved order mentions a player no longer on the roster"),
            }
        }

        let appended = remaining.iter().flatten().count();
        players.extend(remaining.into_iter().flatten());

        info!(
            players = players.len(),
            appended, "Applied saved lineup order"
        );
        Self { players }
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn ordered_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn find_by_id(&self, id: PlayerId) -> Result<&PlayerRecord, NotFoundError> {
        self.players.iter().find(|p| p.id == id).ok_or_else(|| {
            warn!(id, "Player not found");
            NotFoundError::Player(id)
        })
    }

    fn find_by_id_mut(&mut self, id: PlayerId) -> Result<&mut PlayerRecord, NotFoundError> {
        self.players.iter_mut().find(|p| p.id == id).ok_or_else(|| {
            warn!(id, "Player not found");
            NotFoundError::Player(id)
        })
    }

    /// Move the player at `from` so it ends up at `to`.
    ///
    /// Returns `Ok(false)` when the indices are equal and nothing moved.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<bool, NotFoundError> {
        let len = self.players.len();
        for index in [from, to] {
            if index >= len {
                warn!(from, to, len, "Reorder index out of range");
                return Err(NotFoundError::Index { index, len });
            }
        }
        if from == to {
            debug!(from, "Reorder onto the same slot");
            return Ok(false);
        }

        let moved = self.players.remove(from);
        self.players.insert(to, moved);
        debug!(from, to, order = ?self.ordered_ids(), "Reordered lineup");
        Ok(true)
    }

    /// Manual +/- on a player's at-bat count.
    ///
    /// Returns `Ok(false)` for a decrease at zero, which changes nothing.
    pub fn adjust_at_bats(
        &mut self,
        id: PlayerId,
        direction: AtBatAdjustment,
    ) -> Result<bool, NotFoundError> {
        let player = self.find_by_id_mut(id)?;
        match direction {
            AtBatAdjustment::Increase => {
                player.times_batted = player.times_batted.saturating_add(1);
            }
            AtBatAdjustment::Decrease => {
                if player.times_batted == 0 {
                    debug!(id, name = %player.name, "Already at 0 at-bats, cannot decrease further");
                    return Ok(false);
                }
                player.times_batted -= 1;
            }
        }
        info!(id, name = %player.name, at_bats = player.times_batted, "Adjusted at-bats");
        Ok(true)
    }

    /// Counts one at-bat for a player whose song actually started.
    pub fn record_at_bat(&mut self, id: PlayerId) -> Result<u32, NotFoundError> {
        let player = self.find_by_id_mut(id)?;
        player.times_batted = player.times_batted.saturating_add(1);
        info!(id, name = %player.name, at_bats = player.times_batted, "Times batted");
        Ok(player.times_batted)
    }

    pub fn reset_at_bats(&mut self) {
        for player in &mut self.players {
            player.times_batted = 0;
        }
        info!("Reset all at-bat counts");
    }
}
