//! Realtime insert notifications.
//!
//! [`RealtimeFeed`] speaks the Phoenix channel protocol over a websocket:
//! join a `postgres_changes` INSERT subscription, heartbeat every 30 s, and
//! forward decoded rows. [`poll_inserts`] is the fallback that re-queries rows
//! newer than a cursor. Both deliver rows over an mpsc channel that
//! [`LiveList`] folds into a list with id-based dedup.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use fmg_config::BackendConfig;
use fmg_core::entities::{DiscussionMessage, Draft, Invoice, Meeting, Project, Revision};
use fmg_core::merge::{Identified, merge_inserts};
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::client::TokenSource;
use crate::error::BackendError;
use crate::retry::RetryConfig;

/// Phoenix heartbeat period expected by the realtime server.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

const CHANNEL_CAPACITY: usize = 256;

/// One Phoenix channel frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoenixMessage {
    pub topic: String,
    pub event: String,
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub msg_ref: Option<String>,
}

/// Which table's inserts to receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub schema: String,
    pub table: String,
    /// PostgREST-style row filter, e.g. `project_id=eq.<id>`.
    pub filter: Option<String>,
}

impl Subscription {
    #[must_use]
    pub fn table(table: &str) -> Self {
        Self {
            schema: "public".into(),
            table: table.into(),
            filter: None,
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn topic(&self) -> String {
        format!("realtime:{}:{}", self.schema, self.table)
    }

    /// The `phx_join` frame for this subscription.
    #[must_use]
    pub fn join_message(&self, access_token: &str, msg_ref: u64) -> PhoenixMessage {
        let mut change = json!({
            "event": "INSERT",
            "schema": self.schema,
            "table": self.table,
        });
        if let Some(filter) = &self.filter {
            change["filter"] = Value::String(filter.clone());
        }
        PhoenixMessage {
            topic: self.topic(),
            event: "phx_join".into(),
            payload: json!({
                "config": {
                    "broadcast": { "self": false },
                    "presence": { "key": "" },
                    "postgres_changes": [change],
                },
                "access_token": access_token,
            }),
            msg_ref: Some(msg_ref.to_string()),
        }
    }
}

#[must_use]
pub fn heartbeat_message(msg_ref: u64) -> PhoenixMessage {
    PhoenixMessage {
        topic: "phoenix".into(),
        event: "heartbeat".into(),
        payload: json!({}),
        msg_ref: Some(msg_ref.to_string()),
    }
}

/// The inserted record carried by a frame, if it is an INSERT for `table`.
#[must_use]
pub fn decode_insert(frame: &PhoenixMessage, table: &str) -> Option<Value> {
    let data = match frame.event.as_str() {
        "postgres_changes" => frame.payload.get("data")?,
        "INSERT" => &frame.payload,
        _ => return None,
    };
    let kind = data.get("type").or_else(|| data.get("eventType"))?.as_str()?;
    if kind != "INSERT" || data.get("table").and_then(Value::as_str) != Some(table) {
        return None;
    }
    data.get("record").or_else(|| data.get("new")).cloned()
}

/// Connection settings for a [`RealtimeFeed`].
#[derive(Clone)]
pub struct RealtimeConfig {
    /// Websocket endpoint including `apikey` and `vsn` parameters.
    pub url: String,
    /// Used as the channel `access_token` when no session is attached.
    pub api_key: String,
    pub session: Option<Arc<dyn TokenSource>>,
    pub subscription: Subscription,
    pub heartbeat: Duration,
    /// Reconnect delays; `max_attempts` is ignored (the feed reconnects until stopped).
    pub reconnect: RetryConfig,
}

impl RealtimeConfig {
    #[must_use]
    pub fn from_backend(config: &BackendConfig, subscription: Subscription) -> Self {
        Self {
            url: config.realtime_url(),
            api_key: config.anon_key.clone(),
            session: None,
            subscription,
            heartbeat: HEARTBEAT_INTERVAL,
            reconnect: RetryConfig {
                max_attempts: u32::MAX,
                base_delay: Duration::from_millis(500),
                max_delay: Duration::from_secs(30),
            },
        }
    }

    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn TokenSource>) -> Self {
        self.session = Some(session);
        self
    }
}

/// Background websocket subscription. Aborted on drop.
pub struct RealtimeFeed {
    task: JoinHandle<()>,
}

enum Disconnect {
    ServerClosed,
    ReceiverGone,
}

impl RealtimeFeed {
    /// Connect in the background and stream inserted rows of type `T`.
    ///
    /// Rows that fail to decode as `T` are logged and skipped.
    #[must_use]
    pub fn spawn<T>(config: RealtimeConfig) -> (Self, mpsc::Receiver<T>)
    where
        T: DeserializeOwned + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let task = tokio::spawn(run_feed(config, tx));
        (Self { task }, rx)
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for RealtimeFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_feed<T>(config: RealtimeConfig, tx: mpsc::Sender<T>)
where
    T: DeserializeOwned + Send + 'static,
{
    let topic = config.subscription.topic();
    let mut attempt = 0u32;
    loop {
        match connect_async(config.url.as_str()).await {
            Ok((ws, _)) => {
                tracing::info!(%topic, "realtime connected");
                attempt = 0;
                match pump(&config, ws, &tx).await {
                    Ok(Disconnect::ReceiverGone) => return,
                    Ok(Disconnect::ServerClosed) => tracing::info!(%topic, "realtime connection closed"),
                    Err(error) => tracing::warn!(%topic, %error, "realtime connection failed"),
                }
            }
            Err(error) => tracing::warn!(%topic, %error, "realtime connect failed"),
        }
        if tx.is_closed() {
            return;
        }
        let delay = config.reconnect.delay_for(attempt);
        attempt = attempt.saturating_add(1);
        tracing::debug!(%topic, ?delay, attempt, "realtime reconnecting");
        tokio::time::sleep(delay).await;
    }
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn pump<T>(config: &RealtimeConfig, ws: Socket, tx: &mpsc::Sender<T>) -> Result<Disconnect, BackendError>
where
    T: DeserializeOwned,
{
    let (mut write, mut read) = ws.split();
    let token = match &config.session {
        Some(session) => session.bearer_token().await?,
        None => config.api_key.clone(),
    };
    let mut next_ref = 1u64;
    send_frame(&mut write, &config.subscription.join_message(&token, next_ref)).await?;

    let mut heartbeat = tokio::time::interval(config.heartbeat);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
    heartbeat.tick().await;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                next_ref += 1;
                send_frame(&mut write, &heartbeat_message(next_ref)).await?;
            }
            () = tx.closed() => return Ok(Disconnect::ReceiverGone),
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let frame: PhoenixMessage = match serde_json::from_str(&text) {
                        Ok(frame) => frame,
                        Err(error) => {
                            tracing::debug!(%error, "ignoring non-Phoenix frame");
                            continue;
                        }
                    };
                    if frame.event == "phx_reply" && frame.payload["status"] == "error" {
                        return Err(BackendError::Realtime(format!("join rejected: {}", frame.payload["response"])));
                    }
                    let Some(record) = decode_insert(&frame, &config.subscription.table) else {
                        continue;
                    };
                    match serde_json::from_value::<T>(record) {
                        Ok(row) => {
                            if tx.send(row).await.is_err() {
                                return Ok(Disconnect::ReceiverGone);
                            }
                        }
                        Err(error) => tracing::warn!(%error, table = %config.subscription.table, "undecodable realtime row"),
                    }
                }
                Some(Ok(Message::Close(_))) | None => return Ok(Disconnect::ServerClosed),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(BackendError::Realtime(e.to_string())),
            },
        }
    }
}

async fn send_frame<W>(write: &mut W, frame: &PhoenixMessage) -> Result<(), BackendError>
where
    W: futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let text = serde_json::to_string(frame).map_err(|e| BackendError::Realtime(e.to_string()))?;
    write
        .send(Message::Text(text))
        .await
        .map_err(|e| BackendError::Realtime(e.to_string()))
}

/// Rows ordered by creation time, for polling cursors.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

macro_rules! impl_timestamped {
    ($($ty:ty => $field:ident),* $(,)?) => {
        $(impl Timestamped for $ty {
            fn timestamp(&self) -> DateTime<Utc> {
                self.$field
            }
        })*
    };
}

impl_timestamped!(
    DiscussionMessage => created_at,
    Draft => created_at,
    Invoice => issued_at,
    Meeting => created_at,
    Project => created_at,
    Revision => created_at,
);

/// Poll `fetch(cursor)` every `interval` and forward each row.
///
/// The cursor starts at `since` and advances to the newest row seen. Fetch
/// errors are logged and the next tick tries again. Stops when the receiver
/// is dropped.
pub fn poll_inserts<T, F, Fut>(
    interval: Duration,
    since: Option<DateTime<Utc>>,
    mut fetch: F,
    tx: mpsc::Sender<T>,
) -> JoinHandle<()>
where
    T: Timestamped + Send + 'static,
    F: FnMut(Option<DateTime<Utc>>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<T>, BackendError>> + Send,
{
    tokio::spawn(async move {
        let mut cursor = since;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = tx.closed() => return,
            }
            let rows = match fetch(cursor).await {
                Ok(rows) => rows,
                Err(error) => {
                    tracing::warn!(%error, "poll fetch failed");
                    continue;
                }
            };
            for row in rows {
                let ts = row.timestamp();
                cursor = Some(cursor.map_or(ts, |c| c.max(ts)));
                if tx.send(row).await.is_err() {
                    return;
                }
            }
        }
    })
}

/// A list kept current by a realtime or polling channel.
pub struct LiveList<T> {
    rows: Vec<T>,
    rx: mpsc::Receiver<T>,
}

impl<T: Identified> LiveList<T> {
    #[must_use]
    pub fn new(initial: Vec<T>, rx: mpsc::Receiver<T>) -> Self {
        Self { rows: initial, rx }
    }

    #[must_use]
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Wait for the next row and merge it. `None` once the feed has ended;
    /// otherwise whether the row was new.
    pub async fn recv(&mut self) -> Option<bool> {
        let row = self.rx.recv().await?;
        Some(merge_inserts(&mut self.rows, [row]) == 1)
    }

    /// Merge every row already queued without waiting. Returns how many were new.
    pub fn drain(&mut self) -> usize {
        let mut added = 0;
        while let Ok(row) = self.rx.try_recv() {
            added += merge_inserts(&mut self.rows, [row]);
        }
        added
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<T> {
        self.rows
    }
}
