use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use futures::future::join_all;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tower::ServiceExt;

use bingo::{
    app, room::types::CreateRoomRequest, websockets::MessageType, ConnectionId, GameType,
    MessageHandler,
};

mod utils;

use utils::setup::build_state;
use utils::*;

fn create_request(host: &str, max_players: i64) -> CreateRoomRequest {
    CreateRoomRequest {
        host_name: host.to_string(),
        room_name: String::new(),
        max_players,
        game_type: GameType::Classic75,
        stake: 0,
        settings: None,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_concurrent_room_creation_yields_distinct_codes() {
    let state = build_state(Arc::new(MockConnectionManager::new()));

    let created = join_all((0..25).map(|i| {
        let room_service = state.room_service.clone();
        async move {
            room_service
                .create_room(create_request(&format!("host-{}", i), 4))
                .await
                .unwrap()
                .room_code
        }
    }))
    .await;

    let distinct: HashSet<_> = created.iter().collect();
    assert_eq!(distinct.len(), created.len());
    assert_eq!(state.room_service.room_count().await, 25);
}

#[tokio::test]
async fn test_joiner_gets_room_state_and_others_are_notified() {
    let mut setup = TestSetupBuilder::new().with_two_players().build().await;

    let charlie = setup.connect("charlie").await;

    let state_msg = setup
        .mock_conn_manager
        .get_messages_for(charlie)
        .await
        .first()
        .cloned()
        .unwrap();
    let state_msg: Value = serde_json::from_str(&state_msg).unwrap();
    assert_eq!(state_msg["type"], "roomState");
    assert_eq!(state_msg["payload"]["room"]["hostId"], "alice");
    assert_eq!(
        state_msg["payload"]["room"]["players"]
            .as_array()
            .unwrap()
            .len(),
        3
    );

    MessageAssertion::for_players(&setup, vec!["alice", "bob"])
        .received_message_type(MessageType::PlayerJoined)
        .await
        .with_player("charlie")
        .with_player_count(3);
}

#[tokio::test]
async fn test_chat_reaches_every_player_including_sender() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    setup.send_chat("bob", "  good luck  ").await;

    MessageAssertion::for_all_players(&setup)
        .received_message_type(MessageType::Chat)
        .await
        .with_message("good luck");
}

#[tokio::test]
async fn test_host_leaving_hands_over_exactly_once() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    setup.send_leave("alice").await;

    let remaining = MessageAssertion::for_players(&setup, vec!["bob", "charlie"]);
    for player in ["bob", "charlie"] {
        assert_eq!(
            remaining
                .count_message_type(player, MessageType::PlayerLeft)
                .await,
            1
        );
        assert_eq!(
            remaining
                .count_message_type(player, MessageType::NewHost)
                .await,
            1
        );
    }
    remaining
        .last_of_type("charlie", MessageType::NewHost)
        .await
        .unwrap()
        .with_player("bob");

    let room = setup
        .state
        .room_service
        .get_room(&setup.room_code)
        .await
        .unwrap();
    assert!(room.is_host("bob"));
    assert_eq!(room.players.iter().filter(|p| p.is_host).count(), 1);

    MessageAssertion::for_players(&setup, vec!["alice"])
        .received_no_messages()
        .await;
}

#[tokio::test]
async fn test_non_host_leaving_keeps_host() {
    let mut setup = TestSetupBuilder::new().with_three_players().build().await;

    setup.disconnect("charlie").await;

    let assertion = MessageAssertion::for_all_players(&setup);
    assert_eq!(
        assertion.count_message_type("alice", MessageType::NewHost).await,
        0
    );
    assertion
        .last_of_type("bob", MessageType::PlayerLeft)
        .await
        .unwrap()
        .with_player("charlie")
        .with_player_count(2);
}

#[tokio::test]
async fn test_last_player_out_deletes_room_and_round() {
    let mut setup = TestSetupBuilder::new().with_two_players().build().await;
    let code = setup.room_code.clone();

    setup.disconnect("alice").await;
    setup.disconnect("bob").await;

    assert!(setup.state.room_service.get_room(&code).await.is_none());
    assert!(setup.state.game_service.get_game(&code).await.is_none());
    assert!(!setup.state.event_bus.has_room(&code).await);

    let response = app(setup.state.clone())
        .oneshot(
            Request::builder()
                .uri(format!("/room/{}", code))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_full_room_rejects_extra_join() {
    let setup = TestSetupBuilder::new()
        .with_two_players()
        .with_max_players(2)
        .build()
        .await;

    let late = ConnectionId::new();
    setup.send_join(late, "charlie").await;

    let reply: Value =
        serde_json::from_str(&setup.mock_conn_manager.get_messages_for(late).await[0]).unwrap();
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["payload"]["message"], "Room is full");

    MessageAssertion::for_all_players(&setup)
        .received_no_messages()
        .await;
}

#[tokio::test]
async fn test_reconnect_replaces_connection_without_losing_seat() {
    let mut setup = TestSetupBuilder::new().with_two_players().build().await;
    let old = setup.connection_of("alice");

    let new = setup.connect("alice").await;
    assert_ne!(old, new);

    // The stale socket closing afterwards must not evict the player.
    setup.input_handler.handle_disconnect(old).await;

    let room = setup
        .state
        .room_service
        .get_room(&setup.room_code)
        .await
        .unwrap();
    assert_eq!(room.player_count(), 2);
    assert!(room.is_host("alice"));
    assert_eq!(room.player("alice").unwrap().connection, Some(new));
}

#[tokio::test]
async fn test_http_lobby_flow() {
    let state = build_state(Arc::new(MockConnectionManager::new()));
    let router = app(state.clone());

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/room")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"hostName": "alice", "maxPlayers": 4, "gameType": "90-ball", "stake": 10})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let code = created["roomCode"].as_str().unwrap().to_string();
    assert!(state.event_bus.has_room(&code).await);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/room/{}/join", code))
                .header("content-type", "application/json")
                .body(Body::from(json!({"playerName": "bob"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let joined = body_json(response).await;
    assert_eq!(joined["playerName"], "bob");
    assert_ne!(joined["playerId"], created["playerId"]);

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/rooms").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let rooms = body_json(response).await;
    assert_eq!(rooms.as_array().unwrap().len(), 1);
    assert_eq!(rooms[0]["code"], code.as_str());
    assert_eq!(rooms[0]["gameType"], "90-ball");

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
