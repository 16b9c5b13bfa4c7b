use crate::{
    client::{Client, PlayerAction},
    error::{ErrorKind, GameError},
    game::{Mode, PlayerId},
    session::SessionManager,
};
use futures_util::{select, FutureExt, SinkExt, StreamExt, TryStreamExt};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;

#[derive(Error, Debug, PartialEq)]
enum WsError {
    #[error("violation of the application-layer protocol")]
    ProtocolError,
}

pub async fn accept_connection(stream: TcpStream, manager: &SessionManager) {
    log::info!("Accepted new connection");

    let Ok(stream) = tokio_tungstenite::accept_async(stream).await else {
        log::error!("Error occured during websocket handshake");
        return;
    };
    let (mut write, read) = stream.split();
    let mut read = read.fuse();

    let mut client = Client::new(manager);

    loop {
        select! {
            msg = read.try_next() => {
                let Ok(Some(Message::Text(msg))) = msg else {
                    break;
                };
                let Ok(msg) = serde_json::from_str::<Value>(&msg) else {
                    log::error!("Invalid JSON received: {}", &msg);
                    break;
                };
                let Ok(req) = parse_request(&msg) else {
                    log::error!("Invalid message received: {}", &msg);
                    break;
                };
                let reply = match process_request(req, &mut client) {
                    Ok(Some(reply)) => format_reply(reply),
                    Ok(None) => continue,
                    Err(err) => format_error(&err),
                };
                write.send(Message::Text(reply.to_string())).await.ok();
            },
            message = client.next_message().fuse() => {
                let Some(message) = message else {
                    log::info!("Connection replaced by a newer one");
                    break;
                };
                if write.send(Message::Text(message.to_string())).await.is_err() {
                    log::error!("Could not send websockets message");
                    break;
                }
            }
        }
    }

    client.leave();
}

/// A message sent by a game client to the server.
#[derive(Debug, PartialEq)]
enum Request {
    CreateGame { players: Vec<PlayerId>, mode: Mode },
    Join { game_id: String, player: Option<PlayerId> },
    Action(PlayerAction),
    GetState,
}

/// A message sent by the server to a game client.
enum Response {
    GameCreated { game_id: String },
    GameJoined { game_id: String, player_id: Option<PlayerId> },
    State(Value),
}

/// Parses a websockets message from the client.
fn parse_request(req: &Value) -> Result<Request, WsError> {
    match req["type"].as_str().unwrap_or("") {
        "create_game" => {
            let players = serde_json::from_value(req["players"].clone()).map_err(|_| WsError::ProtocolError)?;
            let mode = match &req["mode"] {
                Value::Null => Mode::Standard,
                mode => serde_json::from_value(mode.clone()).map_err(|_| WsError::ProtocolError)?,
            };
            Ok(Request::CreateGame { players, mode })
        }
        "join" => {
            let game_id = req["gameId"]
                .as_str()
                .ok_or(WsError::ProtocolError)?
                .to_ascii_uppercase();
            let player = req["playerId"].as_str().map(PlayerId::from);
            Ok(Request::Join { game_id, player })
        }
        "action" => {
            let action = serde_json::from_value(req["action"].clone()).map_err(|_| WsError::ProtocolError)?;
            Ok(Request::Action(action))
        }
        "get_state" => Ok(Request::GetState),
        _ => Err(WsError::ProtocolError),
    }
}

/// Processes a request from the client.
fn process_request(req: Request, client: &mut Client) -> Result<Option<Response>, GameError> {
    match req {
        Request::CreateGame { players, mode } => {
            let game_id = client.create_game(players, mode)?;
            Ok(Some(Response::GameCreated { game_id }))
        }
        Request::Join { game_id, player } => {
            client.join(&game_id, player.clone())?;
            Ok(Some(Response::GameJoined { game_id, player_id: player }))
        }
        Request::Action(action) => {
            client.player_action(action)?;
            Ok(None)
        }
        Request::GetState => Ok(Some(Response::State(client.get_state()?))),
    }
}

/// Formats a reply to the client to be sent over websockets.
fn format_reply(res: Response) -> Value {
    match res {
        Response::GameCreated { game_id } => json!({
            "type": "game_created",
            "gameId": game_id
        }),
        Response::GameJoined { game_id, player_id } => json!({
            "type": "game_joined",
            "gameId": game_id,
            "playerId": player_id
        }),
        Response::State(state) => json!({
            "type": "state",
            "state": state
        }),
    }
}

/// Formats an error for the connection that caused it.
fn format_error(err: &GameError) -> Value {
    let message = match err.kind() {
        ErrorKind::Configuration | ErrorKind::ResourceExhaustion => {
            log::error!("Request failed: {}", err);
            "the game could not process this request".to_string()
        }
        _ => err.to_string(),
    };
    json!({
        "type": "error",
        "error": message
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_parsed() {
        let req = parse_request(&json!({ "type": "create_game", "players": ["A", "B"], "mode": "XL" })).unwrap();
        assert_eq!(
            req,
            Request::CreateGame { players: vec!["A".into(), "B".into()], mode: Mode::Extended }
        );

        let req = parse_request(&json!({ "type": "join", "gameId": "abcd", "playerId": "A" })).unwrap();
        assert_eq!(req, Request::Join { game_id: "ABCD".into(), player: Some("A".into()) });

        let req = parse_request(&json!({ "type": "action", "action": { "type": "cast_vote", "vote": true } })).unwrap();
        assert_eq!(req, Request::Action(PlayerAction::CastVote { vote: true }));
    }

    #[test]
    fn malformed_requests_are_rejected() {
        assert_eq!(parse_request(&json!({ "type": "join" })), Err(WsError::ProtocolError));
        assert_eq!(parse_request(&json!({ "type": "board_next" })), Err(WsError::ProtocolError));
        assert_eq!(
            parse_request(&json!({ "type": "action", "action": { "type": "cast_vote" } })),
            Err(WsError::ProtocolError)
        );
    }

    #[test]
    fn errors_reveal_nothing_about_configuration() {
        let reply = format_error(&GameError::InsufficientCards { requested: 3, available: 1 });
        assert_eq!(reply["error"], "the game could not process this request");
        let reply = format_error(&GameError::AlreadyVoted);
        assert_eq!(reply["error"], "this player has already voted");
    }
}
