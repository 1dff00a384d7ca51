use actix_web::{HttpRequest, HttpResponse, web};
use actix_ws::Message;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::auth::jwt::SessionKeys;
use crate::auth::middleware::AuthenticatedUser;
use crate::feed::Subscription;
use crate::models::jobs::{Job, JobFilter};
use crate::store::{DataStore, StoreMode};

/// Query params for the WebSocket handshake endpoint.
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub token: String,
    pub brand_id: Option<String>,
}

/// Messages the server pushes to feed clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    /// The complete job list; replaces whatever the client had.
    Jobs { jobs: Vec<Job> },
    /// The store's current mode, sent on connect and on every change.
    Mode { mode: StoreMode },
}

/// GET /api/jobs/ws?token=<session>&brand_id=<optional>
///
/// Upgrades to a WebSocket streaming job-list replacements. The token comes
/// in the query since browsers can't set headers on the handshake.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<FeedQuery>,
    keys: web::Data<SessionKeys>,
    store: web::Data<DataStore>,
) -> Result<HttpResponse, actix_web::Error> {
    let user = AuthenticatedUser::from_token(&query.token, keys.get_ref())?;

    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;

    let store = store.into_inner();
    let (tx, rx) = mpsc::unbounded_channel();
    let filter = JobFilter {
        brand_id: query.brand_id.clone(),
    };
    let subscription = store.subscribe_jobs(filter, move |jobs| {
        let _ = tx.send(FeedMessage::Jobs { jobs });
    });

    actix_web::rt::spawn(run_feed_session(
        session,
        msg_stream,
        rx,
        subscription,
        store.mode_events(),
        user.uid,
    ));

    Ok(response)
}

async fn run_feed_session(
    mut session: actix_ws::Session,
    mut msg_stream: actix_ws::MessageStream,
    mut rx: mpsc::UnboundedReceiver<FeedMessage>,
    subscription: Subscription,
    mut modes: watch::Receiver<StoreMode>,
    uid: String,
) {
    debug!(uid, subscription = %subscription.id(), "Job feed opened");

    let initial = FeedMessage::Mode {
        mode: *modes.borrow_and_update(),
    };
    if send(&mut session, &initial).await.is_ok() {
        loop {
            tokio::select! {
                Some(msg) = msg_stream.next() => {
                    match msg {
                        Ok(Message::Ping(bytes)) => {
                            if session.pong(&bytes).await.is_err() {
                                break;
                            }
                        }
                        Ok(Message::Close(_)) | Err(_) => break,
                        _ => {}
                    }
                }
                Some(update) = rx.recv() => {
                    if send(&mut session, &update).await.is_err() {
                        break;
                    }
                }
                Ok(()) = modes.changed() => {
                    let mode = *modes.borrow_and_update();
                    if send(&mut session, &FeedMessage::Mode { mode }).await.is_err() {
                        break;
                    }
                }
                else => break,
            }
        }
    }

    subscription.unsubscribe();
    debug!(uid, "Job feed closed");
    let _ = session.close(None).await;
}

async fn send(session: &mut actix_ws::Session, msg: &FeedMessage) -> Result<(), actix_ws::Closed> {
    match serde_json::to_string(msg) {
        Ok(json) => session.text(json).await,
        Err(e) => {
            warn!(error = %e, "Failed to serialize feed message");
            Ok(())
        }
    }
}
