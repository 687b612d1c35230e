use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    codes::RoomCodeGenerator,
    lifecycle::RoundLifecycle,
    models::{PlayerModel, RoomModel, RoomSettings, MAX_ROOM_PLAYERS, MAX_STAKE},
    repository::{CreateRoomResult, RoomRepository, SharedRoom},
    types::{CreateRoomRequest, CreateRoomResponse, JoinRoomResponse, RoomSummary},
};
use crate::event::{EventBus, RoomEvent};
use crate::shared::{AppError, ConnectionId};

/// Fresh codes tried before giving up on a create.
const MAX_CODE_ATTEMPTS: usize = 32;

/// What attaching a connection did to the room
#[derive(Debug, Clone)]
pub struct AttachOutcome {
    /// Room state right after the attach
    pub room: RoomModel,
    pub became_host: bool,
    /// The player was already a member; only their connection changed
    pub reconnected: bool,
}

/// What detaching a player did to the room
#[derive(Debug, Clone)]
pub struct DetachOutcome {
    pub player: PlayerModel,
    pub new_host: Option<PlayerModel>,
    /// The room emptied and has been destroyed
    pub room_deleted: bool,
}

/// Session registry: room lifecycle, membership and host succession
pub struct RoomService {
    repository: Arc<dyn RoomRepository>,
    code_generator: Arc<dyn RoomCodeGenerator>,
    rounds: Arc<dyn RoundLifecycle>,
    event_bus: EventBus,
}

impl RoomService {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        code_generator: Arc<dyn RoomCodeGenerator>,
        rounds: Arc<dyn RoundLifecycle>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            repository,
            code_generator,
            rounds,
            event_bus,
        }
    }

    /// Creates a room under a code no live room holds, and opens its round
    #[instrument(skip(self))]
    pub async fn create_room(
        &self,
        request: CreateRoomRequest,
    ) -> Result<CreateRoomResponse, AppError> {
        if request.max_players < 2 || request.max_players > MAX_ROOM_PLAYERS {
            return Err(AppError::InvalidConfig(format!(
                "max players must be between 2 and {}",
                MAX_ROOM_PLAYERS
            )));
        }
        if request.stake < 0 {
            return Err(AppError::InvalidConfig(
                "stake cannot be negative".to_string(),
            ));
        }
        if request.stake > MAX_STAKE {
            return Err(AppError::InvalidConfig(format!(
                "stake cannot exceed {}",
                MAX_STAKE
            )));
        }
        let settings = request
            .settings
            .unwrap_or_else(|| RoomSettings::for_game_type(request.game_type));
        settings.validate(request.game_type)?;

        let room_name = match request.room_name.trim() {
            "" => format!("{}'s room", request.host_name),
            name => name.to_string(),
        };

        let mut created = None;
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = self.code_generator.generate().await;
            let room = RoomModel::new(
                code.clone(),
                room_name.clone(),
                request.host_name.clone(),
                request.game_type,
                request.stake,
                request.max_players as usize,
                settings.clone(),
            );
            match self.repository.create_room(room).await {
                CreateRoomResult::Created(handle) => {
                    created = Some((code, handle));
                    break;
                }
                CreateRoomResult::CodeTaken => {
                    debug!(room_code = %code, attempt = attempt, "Room code collision, retrying");
                }
            }
        }
        let Some((code, handle)) = created else {
            warn!("Could not find a free room code");
            return Err(AppError::Internal);
        };

        if let Err(e) = self
            .rounds
            .initialize_round(&code, request.game_type, request.stake, settings)
            .await
        {
            warn!(room_code = %code, error = %e, "Round setup failed, discarding room");
            handle.lock().await.closed = true;
            self.repository.remove_closed_room(&code, &handle).await;
            return Err(e);
        }

        let room = handle.lock().await;
        info!(
            room_code = %room.code,
            room_id = %room.id,
            game_type = %room.game_type,
            max_players = room.max_players,
            "Room created successfully"
        );

        Ok(CreateRoomResponse {
            success: true,
            room_code: room.code.clone(),
            room_id: room.id.clone(),
            player_id: room.creator_id.clone(),
        })
    }

    /// Checks a room can take another player and hands out an identity.
    /// Membership itself starts at `attach_player`.
    #[instrument(skip(self))]
    pub async fn join_room(
        &self,
        room_code: &str,
        player_name: &str,
    ) -> Result<JoinRoomResponse, AppError> {
        if player_name.trim().is_empty() {
            return Err(AppError::BadRequest("player name is required".to_string()));
        }

        let handle = self.live_room(room_code).await?;
        let room = handle.lock().await;
        if room.closed {
            return Err(AppError::RoomNotFound);
        }
        if room.started {
            return Err(AppError::GameAlreadyStarted);
        }
        if room.is_full() {
            return Err(AppError::RoomFull);
        }

        let player_id = Uuid::new_v4().to_string();
        debug!(room_code = %room_code, player_id = %player_id, "Seat reserved");

        Ok(JoinRoomResponse {
            success: true,
            room_code: room.code.clone(),
            player_id,
            player_name: player_name.to_string(),
        })
    }

    /// Registers a player's live connection. The first player into an
    /// empty room becomes host.
    #[instrument(skip(self))]
    pub async fn attach_player(
        &self,
        room_code: &str,
        player_id: &str,
        player_name: &str,
        connection: ConnectionId,
    ) -> Result<AttachOutcome, AppError> {
        let handle = self.live_room(room_code).await?;
        let mut room = handle.lock().await;
        if room.closed {
            return Err(AppError::RoomNotFound);
        }

        if let Some(existing) = room.player_mut(player_id) {
            existing.connection = Some(connection);
            debug!(room_code = %room_code, player_id = %player_id, "Player reconnected");
            return Ok(AttachOutcome {
                room: room.clone(),
                became_host: false,
                reconnected: true,
            });
        }

        if room.started {
            return Err(AppError::GameAlreadyStarted);
        }
        if room.is_full() {
            return Err(AppError::RoomFull);
        }

        let became_host = room.add_player(PlayerModel::new(
            player_id.to_string(),
            player_name.to_string(),
            connection,
        ));

        info!(
            room_code = %room_code,
            player_id = %player_id,
            player_count = room.player_count(),
            became_host = became_host,
            "Player attached to room"
        );

        self.event_bus
            .emit_to_room_except(
                room_code,
                RoomEvent::PlayerJoined {
                    player_id: player_id.to_string(),
                    player_name: player_name.to_string(),
                    player_count: room.player_count(),
                },
                player_id,
            )
            .await;

        Ok(AttachOutcome {
            room: room.clone(),
            became_host,
            reconnected: false,
        })
    }

    /// Removes a player, passing host on if needed. An emptied room is
    /// destroyed and its code released.
    #[instrument(skip(self))]
    pub async fn detach_player(
        &self,
        room_code: &str,
        player_id: &str,
    ) -> Result<DetachOutcome, AppError> {
        self.detach(room_code, player_id, None)
            .await?
            .ok_or(AppError::PlayerNotInRoom)
    }

    /// Like `detach_player`, but only if the player is still attached
    /// through `connection`. A stale connection closing after its player
    /// reconnected elsewhere leaves the room untouched (`Ok(None)`).
    #[instrument(skip(self))]
    pub async fn detach_connection(
        &self,
        room_code: &str,
        player_id: &str,
        connection: ConnectionId,
    ) -> Result<Option<DetachOutcome>, AppError> {
        self.detach(room_code, player_id, Some(connection)).await
    }

    async fn detach(
        &self,
        room_code: &str,
        player_id: &str,
        connection: Option<ConnectionId>,
    ) -> Result<Option<DetachOutcome>, AppError> {
        let handle = self.live_room(room_code).await?;

        let (removed, emptied) = {
            let mut room = handle.lock().await;
            if room.closed {
                return Err(AppError::RoomNotFound);
            }
            let current = room
                .player(player_id)
                .ok_or(AppError::PlayerNotInRoom)?
                .connection;
            if connection.is_some() && current != connection {
                debug!(room_code = %room_code, player_id = %player_id, "Stale connection, player kept");
                return Ok(None);
            }
            let removed = room
                .remove_player(player_id)
                .ok_or(AppError::PlayerNotInRoom)?;

            self.event_bus
                .emit_to_room(
                    room_code,
                    RoomEvent::PlayerLeft {
                        player_id: removed.player.id.clone(),
                        player_name: removed.player.name.clone(),
                        player_count: room.player_count(),
                    },
                )
                .await;

            if let Some(new_host) = &removed.new_host {
                info!(
                    room_code = %room_code,
                    old_host = %player_id,
                    new_host = %new_host.id,
                    "Host reassigned"
                );
                self.event_bus
                    .emit_to_room(
                        room_code,
                        RoomEvent::NewHost {
                            player_id: new_host.id.clone(),
                            player_name: new_host.name.clone(),
                        },
                    )
                    .await;
            }

            let emptied = room.is_empty();
            if emptied {
                room.closed = true;
            }
            (removed, emptied)
        };

        if emptied {
            self.destroy_room(room_code, &handle).await;
        }

        info!(
            room_code = %room_code,
            player_id = %player_id,
            room_deleted = emptied,
            "Player detached from room"
        );

        Ok(Some(DetachOutcome {
            player: removed.player,
            new_host: removed.new_host,
            room_deleted: emptied,
        }))
    }

    /// Snapshot of rooms that can still be joined
    #[instrument(skip(self))]
    pub async fn list_available_rooms(&self) -> Vec<RoomSummary> {
        let mut available = Vec::new();
        for handle in self.repository.list_rooms().await {
            let room = handle.lock().await;
            if !room.closed && room.is_available() {
                available.push(RoomSummary::from(&*room));
            }
        }

        debug!(room_count = available.len(), "Available rooms listed");
        available
    }

    /// Point lookup; `None` when no live room has the code
    pub async fn get_room(&self, room_code: &str) -> Option<RoomModel> {
        let handle = self.repository.get_room(room_code).await?;
        let room = handle.lock().await;
        (!room.closed).then(|| room.clone())
    }

    pub async fn is_host(&self, room_code: &str, player_id: &str) -> Result<bool, AppError> {
        let handle = self.live_room(room_code).await?;
        let room = handle.lock().await;
        Ok(!room.closed && room.is_host(player_id))
    }

    /// Flags the room as playing so no one else can join
    #[instrument(skip(self))]
    pub async fn mark_started(&self, room_code: &str) -> Result<(), AppError> {
        let handle = self.live_room(room_code).await?;
        let mut room = handle.lock().await;
        if room.closed {
            return Err(AppError::RoomNotFound);
        }
        if room.started {
            return Err(AppError::GameAlreadyStarted);
        }
        room.started = true;
        Ok(())
    }

    /// Reopens a room whose round failed to start
    pub async fn clear_started(&self, room_code: &str) {
        if let Some(handle) = self.repository.get_room(room_code).await {
            handle.lock().await.started = false;
        }
    }

    /// Adds a round payout to the player's running score
    pub async fn credit_score(
        &self,
        room_code: &str,
        player_id: &str,
        amount: i64,
    ) -> Result<i64, AppError> {
        let handle = self.live_room(room_code).await?;
        let mut room = handle.lock().await;
        let player = room
            .player_mut(player_id)
            .ok_or(AppError::PlayerNotInRoom)?;
        player.score += amount;
        Ok(player.score)
    }

    /// Destroys rooms that have sat empty for at least `idle_for`.
    /// Returns how many were removed.
    #[instrument(skip(self))]
    pub async fn remove_idle_rooms(&self, idle_for: Duration) -> usize {
        let now = Utc::now();
        let mut removed = 0;

        for handle in self.repository.list_rooms().await {
            let code = {
                let mut room = handle.lock().await;
                let age = (now - room.created_at).to_std().unwrap_or_default();
                if room.closed || !room.is_empty() || age < idle_for {
                    continue;
                }
                room.closed = true;
                room.code.clone()
            };

            self.destroy_room(&code, &handle).await;
            info!(room_code = %code, "Removed idle room");
            removed += 1;
        }

        removed
    }

    pub async fn room_count(&self) -> usize {
        self.repository.room_count().await
    }

    async fn live_room(&self, room_code: &str) -> Result<SharedRoom, AppError> {
        self.repository
            .get_room(room_code)
            .await
            .ok_or(AppError::RoomNotFound)
    }

    // The room must already be marked closed and unlocked. Its code stays
    // taken until the round and channel are gone, so a new room under the
    // same code can never lose them to this teardown.
    async fn destroy_room(&self, room_code: &str, handle: &SharedRoom) {
        self.rounds.teardown_round(room_code).await;
        self.event_bus.remove_room(room_code).await;
        if self.repository.remove_closed_room(room_code, handle).await {
            info!(room_code = %room_code, "Room destroyed, code released");
        }
    }
}
