use std::sync::Arc;
use std::time::Instant;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::accept_async;
use tracing::{debug, info, warn};
use tungstenite::Message;
use uuid::Uuid;

use crate::state::{ClientMessage, ServerMessage, SharedSimState, VIEWER_QUEUE};

/// Accept viewers forever. The listener is bound by the caller so a bind
/// failure surfaces at startup.
pub async fn serve_viewers(listener: TcpListener, state: Arc<Mutex<SharedSimState>>) {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "websocket listening");
    }

    loop {
        let (raw, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_viewer(raw, state).await {
                debug!(%peer, error = %e, "viewer handshake failed");
            }
        });
    }
}

async fn handle_viewer(
    raw: TcpStream,
    state: Arc<Mutex<SharedSimState>>,
) -> Result<(), tungstenite::Error> {
    let ws = accept_async(raw).await?;
    let (mut write, mut read) = ws.split();

    // -------------------------------
    // 1) Outgoing channel + send loop
    // -------------------------------
    let (tx, mut rx) = mpsc::channel::<String>(VIEWER_QUEUE);
    let viewer_id = Uuid::new_v4().to_string();

    // Queued before registering, so no broadcast can get ahead of it.
    let welcome = serde_json::to_string(&ServerMessage::Welcome {
        viewer_id: &viewer_id,
    })
    .map_err(|e| tungstenite::Error::Io(std::io::Error::other(e)))?;
    let _ = tx.try_send(welcome);

    state.lock().await.register_client(viewer_id.clone(), tx.clone());
    info!(viewer = %viewer_id, "viewer connected");

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // -------------------------------
    // 2) Receive loop
    // -------------------------------
    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                debug!(viewer = %viewer_id, error = %e, "read failed");
                break;
            }
        };

        let text = match msg {
            Message::Text(t) => t,
            Message::Close(_) => break,
            _ => continue,
        };

        match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::Pointer { x, y }) => {
                state.lock().await.update_pointer(x, y, Instant::now());
            }
            Ok(ClientMessage::Ping) => {
                // Dropped when the queue is full.
                if let Ok(pong) = serde_json::to_string(&ServerMessage::Pong) {
                    let _ = tx.try_send(pong);
                }
            }
            Err(e) => {
                debug!(viewer = %viewer_id, error = %e, "ignoring malformed message");
            }
        }
    }

    info!(viewer = %viewer_id, "viewer disconnected");
    state.lock().await.remove_client(&viewer_id);
    drop(tx);
    send_task.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SpriteHandle;
    use crate::drift::{SimulationConfig, Vec2};
    use crate::physics::SimulationWorld;
    use crate::render::{Color, DrawList, RenderStyle};
    use crate::state::FrameMessage;
    use std::time::Duration;
    use tokio_tungstenite::connect_async;

    fn shared_state() -> Arc<Mutex<SharedSimState>> {
        Arc::new(Mutex::new(SharedSimState::with_arena(
            [800.0, 600.0],
            Duration::from_secs(3),
        )))
    }

    #[tokio::test]
    async fn viewer_gets_welcome_pong_and_steers() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = shared_state();
        tokio::spawn(serve_viewers(listener, Arc::clone(&state)));

        let (mut ws, _) = connect_async(format!("ws://{addr}")).await.unwrap();

        let welcome = ws.next().await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(welcome.to_text().unwrap()).unwrap();
        assert_eq!(json["type"], "welcome");
        assert!(json["viewer_id"].as_str().is_some());

        ws.send(Message::Text(r#"{"type":"ping"}"#.into())).await.unwrap();
        let pong = ws.next().await.unwrap().unwrap();
        assert_eq!(pong.to_text().unwrap(), r#"{"type":"pong"}"#);

        ws.send(Message::Text(r#"{"type":"pointer","x":42,"y":24}"#.into()))
            .await
            .unwrap();
        // Pointer handling is async; a second ping round-trip orders it.
        ws.send(Message::Text(r#"{"type":"ping"}"#.into())).await.unwrap();
        let _ = ws.next().await.unwrap().unwrap();

        let latest = state.lock().await.pointer.latest().unwrap();
        assert_eq!(latest.position.x, 42.0);
        assert_eq!(latest.position.y, 24.0);
        assert_eq!(state.lock().await.clients.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn welcome_precedes_frames_under_live_broadcast() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = shared_state();
        tokio::spawn(serve_viewers(listener, Arc::clone(&state)));

        let broadcaster = {
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                let mut world = SimulationWorld::new(SimulationConfig::default());
                let sprite = SpriteHandle::solid("car", Color::rgb(255, 0, 0), [28, 14]);
                let mut list = DrawList::default();
                loop {
                    let report = world.step(Vec2::new(700.0, 300.0), 1.0 / 60.0);
                    world.render(&mut list, &RenderStyle::default(), &sprite);
                    let frame = FrameMessage::new(
                        world.tick,
                        &world.vehicle,
                        Vec2::new(700.0, 300.0),
                        &report,
                        world.trail.buffer(),
                        &list,
                    );
                    state.lock().await.broadcast_frame(&frame);
                    tokio::task::yield_now().await;
                }
            })
        };

        for _ in 0..100 {
            let (mut ws, _) = connect_async(format!("ws://{addr}")).await.unwrap();
            let first = ws.next().await.unwrap().unwrap();
            let json: serde_json::Value = serde_json::from_str(first.to_text().unwrap()).unwrap();
            assert_eq!(json["type"], "welcome");
            let _ = ws.close(None).await;
        }

        broadcaster.abort();
    }
}
