#![allow(dead_code)]

use std::sync::Arc;

use bingo::{
    room::{
        codes::PetNameCodeGenerator, models::RoomSettings, repository::InMemoryRoomRepository,
        types::CreateRoomRequest,
    },
    AppState, ConnectionId, EventBus, GameService, GameType, MessageHandler, RoomService,
    ServerConfig, WebsocketReceiveHandler,
};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub state: AppState,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub input_handler: WebsocketReceiveHandler,
    pub room_code: String,
    /// (player id, connection) in join order; the first one is host
    pub players: Vec<(String, ConnectionId)>,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    game_type: GameType,
    stake: i64,
    max_players: i64,
    settings: Option<RoomSettings>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            game_type: GameType::Classic75,
            stake: 0,
            max_players: 8,
            settings: None,
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice", "bob"])
    }

    pub fn with_three_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "charlie"])
    }

    pub fn with_game_type(mut self, game_type: GameType) -> Self {
        self.game_type = game_type;
        self
    }

    pub fn with_stake(mut self, stake: i64) -> Self {
        self.stake = stake;
        self
    }

    pub fn with_max_players(mut self, max_players: i64) -> Self {
        self.max_players = max_players;
        self
    }

    pub fn with_settings(mut self, settings: RoomSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub async fn build(self) -> TestSetup {
        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let state = build_state(mock_conn_manager.clone());

        let created = state
            .room_service
            .create_room(CreateRoomRequest {
                host_name: self
                    .players
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "host".to_string()),
                room_name: String::new(),
                max_players: self.max_players,
                game_type: self.game_type,
                stake: self.stake,
                settings: self.settings,
            })
            .await
            .unwrap();
        state.subscribe_room(&created.room_code).await;

        let input_handler = WebsocketReceiveHandler::new(state.clone());
        let mut setup = TestSetup {
            state,
            mock_conn_manager,
            input_handler,
            room_code: created.room_code,
            players: vec![],
        };

        for player in &self.players {
            setup.connect(player).await;
        }
        setup.mock_conn_manager.clear_messages().await;
        setup
    }
}

/// Production wiring with the mock in place of live sockets
pub fn build_state(connection_manager: Arc<MockConnectionManager>) -> AppState {
    let config = ServerConfig::default();
    let event_bus = EventBus::new(config.event_channel_capacity);
    let game_service = Arc::new(GameService::new(event_bus.clone()));
    let room_service = Arc::new(RoomService::new(
        Arc::new(InMemoryRoomRepository::new()),
        Arc::new(PetNameCodeGenerator::new()),
        game_service.clone(),
        event_bus.clone(),
    ));

    AppState::new(
        room_service,
        game_service,
        connection_manager,
        event_bus,
        config,
    )
}

impl TestSetup {
    /// Opens a connection for `player` and joins it to the room
    pub async fn connect(&mut self, player: &str) -> ConnectionId {
        let connection = ConnectionId::new();
        self.players.push((player.to_string(), connection));
        self.send_join(connection, player).await;
        connection
    }

    pub fn connection_of(&self, player: &str) -> ConnectionId {
        self.players
            .iter()
            .rev()
            .find(|(id, _)| id == player)
            .map(|(_, connection)| *connection)
            .unwrap_or_else(|| panic!("{} has no connection", player))
    }

    /// Closes a player's connection the way the socket loop does
    pub async fn disconnect(&mut self, player: &str) {
        let connection = self.connection_of(player);
        self.input_handler.handle_disconnect(connection).await;
        self.players.retain(|(_, c)| *c != connection);
        super::actions::settle().await;
    }
}
