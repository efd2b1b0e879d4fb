//! The duel manager: session directory and challenge front door.
//!
//! Owns one [`DuelHandle`] per live session. The manager is where
//! challenges are validated and minted; everything after accept lives
//! in the session's own actor.

use std::collections::HashMap;
use std::sync::Arc;

use duello_presence::Fabric;
use duello_protocol::{DuelKind, GameId, Identity, ServerEvent};
use rand::Rng;

use crate::variants::build_logic;
use crate::{
    Directory, DuelCommand, DuelConfig, DuelError, DuelHandle, Move, Participants, spawn_duel,
};

/// Mints a short lowercase-hex session id.
fn generate_game_id() -> GameId {
    const HEX: &[u8] = b"0123456789abcdef";
    let mut rng = rand::rng();
    let id: String = (0..8)
        .map(|_| HEX[rng.random_range(0..HEX.len())] as char)
        .collect();
    GameId::new(id)
}

/// Tracks all live duel sessions.
pub struct DuelManager {
    duels: HashMap<GameId, DuelHandle>,
    fabric: Fabric,
    directory: Arc<dyn Directory>,
    config: DuelConfig,
}

impl DuelManager {
    /// Creates a manager wired to the given fabric and directory.
    pub fn new(fabric: Fabric, directory: Arc<dyn Directory>, config: DuelConfig) -> Self {
        Self {
            duels: HashMap::new(),
            fabric,
            directory,
            config,
        }
    }

    /// Issues a challenge, spawning a pending session.
    ///
    /// Both parties are notified: the challenger gets the minted id,
    /// the target gets the challenge decorated with the challenger's
    /// profile.
    pub async fn challenge(
        &mut self,
        from: Identity,
        target: Identity,
        kind: DuelKind,
        stakes: String,
    ) -> Result<GameId, DuelError> {
        if from == target {
            return Err(DuelError::SelfChallenge);
        }
        if !self.fabric.is_registered(&target).await {
            return Err(DuelError::TargetOffline(target));
        }

        let mut id = generate_game_id();
        while self.duels.contains_key(&id) {
            id = generate_game_id();
        }

        let handle = spawn_duel(
            id.clone(),
            stakes.clone(),
            Participants {
                a: from.clone(),
                b: target.clone(),
            },
            build_logic(kind),
            self.fabric.clone(),
            Arc::clone(&self.directory),
            self.config.clone(),
        );
        self.duels.insert(id.clone(), handle);

        let profile = self.directory.profile_lookup(&from);
        let (from_name, from_avatar) = match profile {
            Some(p) => (p.display_name, p.avatar),
            None => (from.to_string(), None),
        };

        self.fabric
            .send(
                &target,
                ServerEvent::ChallengeIncoming {
                    game_id: id.clone(),
                    kind,
                    from: from.clone(),
                    from_name,
                    from_avatar,
                    stakes,
                },
            )
            .await;
        self.fabric
            .send(&from, ServerEvent::ChallengeSent { game_id: id.clone() })
            .await;

        tracing::info!(%id, %kind, challenger = %from, challenged = %target, "challenge issued");
        Ok(id)
    }

    /// Routes an accept/decline to its session.
    pub fn respond(
        &mut self,
        from: Identity,
        game_id: &GameId,
        accepted: bool,
    ) -> Result<(), DuelError> {
        self.route(game_id, DuelCommand::Respond { from, accepted })
    }

    /// Routes an in-game move to its session.
    pub fn handle_move(
        &mut self,
        from: Identity,
        game_id: &GameId,
        mv: Move,
    ) -> Result<(), DuelError> {
        self.route(game_id, DuelCommand::Move { from, mv })
    }

    fn route(&mut self, game_id: &GameId, command: DuelCommand) -> Result<(), DuelError> {
        let handle = self
            .duels
            .get(game_id)
            .ok_or_else(|| DuelError::NotFound(game_id.clone()))?;
        if handle.send(command) {
            Ok(())
        } else {
            // The actor already exited; clean up eagerly.
            self.duels.remove(game_id);
            Err(DuelError::NotFound(game_id.clone()))
        }
    }

    /// Drops handles whose sessions have ended. Returns how many were
    /// removed.
    pub fn reap_finished(&mut self) -> usize {
        let before = self.duels.len();
        self.duels.retain(|_, handle| !handle.is_finished());
        let removed = before - self.duels.len();
        if removed > 0 {
            tracing::debug!(removed, live = self.duels.len(), "reaped finished duels");
        }
        removed
    }

    /// Tells every live session to exit, then forgets them all.
    pub fn shutdown_all(&mut self) {
        for handle in self.duels.values() {
            handle.send(DuelCommand::Shutdown);
        }
        self.duels.clear();
    }

    /// Number of tracked sessions (including finished-but-unreaped).
    pub fn len(&self) -> usize {
        self.duels.len()
    }

    /// Whether no sessions are tracked.
    pub fn is_empty(&self) -> bool {
        self.duels.is_empty()
    }
}
