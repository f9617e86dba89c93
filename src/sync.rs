use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::model::TimerConfig;
use crate::config::validate::{safe_json_parse_with, validate_config};

pub const DEFAULT_CHANNEL_NAME: &str = "hawktimer-channel";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Start,
    Pause,
    Reset,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Pause => "pause",
            Command::Reset => "reset",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimerUpdate {
    pub command: Command,
    pub config: TimerConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum SyncMessage {
    #[serde(rename = "TIMER_UPDATE")]
    TimerUpdate(TimerUpdate),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to encode sync message: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub const DIRECT_CHANNEL: &str = "direct";
pub const BROADCAST_CHANNEL: &str = "broadcast";

pub trait Transport {
    fn name(&self) -> &'static str;
    fn send(&mut self, frame: &str) -> usize;
}

#[derive(Debug, Default)]
pub struct DirectTransport {
    target: Option<Sender<String>>,
}

impl DirectTransport {
    pub fn attach(&mut self, target: Sender<String>) {
        self.target = Some(target);
    }
}

impl Transport for DirectTransport {
    fn name(&self) -> &'static str {
        DIRECT_CHANNEL
    }

    fn send(&mut self, frame: &str) -> usize {
        let Some(target) = &self.target else {
            return 0;
        };
        if target.send(frame.to_string()).is_ok() {
            1
        } else {
            debug!("direct surface closed, detaching");
            self.target = None;
            0
        }
    }
}

#[derive(Debug, Clone)]
pub struct BroadcastTransport {
    name: String,
    subscribers: Arc<Mutex<Vec<Sender<String>>>>,
}

impl BroadcastTransport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn subscribe(&self) -> Receiver<String> {
        let (tx, rx) = channel();
        match self.subscribers.lock() {
            Ok(mut subscribers) => subscribers.push(tx),
            Err(_) => warn!(channel = %self.name, "broadcast subscriber list poisoned"),
        }
        rx
    }
}

impl Transport for BroadcastTransport {
    fn name(&self) -> &'static str {
        BROADCAST_CHANNEL
    }

    fn send(&mut self, frame: &str) -> usize {
        let Ok(mut subscribers) = self.subscribers.lock() else {
            warn!(channel = %self.name, "broadcast subscriber list poisoned");
            return 0;
        };
        subscribers.retain(|tx| tx.send(frame.to_string()).is_ok());
        debug!(channel = %self.name, reached = subscribers.len(), "broadcast frame");
        subscribers.len()
    }
}

#[derive(Debug, Clone)]
pub struct Delivery {
    pub frame: String,
    pub direct: usize,
    pub broadcast: usize,
}

#[derive(Debug)]
pub struct SyncSender<D = DirectTransport, B = BroadcastTransport> {
    direct: D,
    broadcast: B,
}

impl SyncSender {
    pub fn new(broadcast: BroadcastTransport) -> Self {
        Self::with_transports(DirectTransport::default(), broadcast)
    }
}

impl<B: Transport> SyncSender<DirectTransport, B> {
    pub fn attach_direct(&mut self, target: Sender<String>) {
        self.direct.attach(target);
    }
}

impl<D: Transport, B: Transport> SyncSender<D, B> {
    pub fn with_transports(direct: D, broadcast: B) -> Self {
        Self { direct, broadcast }
    }

    pub fn send(&mut self, command: Command, config: &TimerConfig) -> Result<Delivery, SyncError> {
        let frame = encode_frame(command, config)?;
        let direct = self.direct.send(&frame);
        let broadcast = self.broadcast.send(&frame);
        debug!(
            command = command.as_str(),
            direct_channel = self.direct.name(),
            direct,
            broadcast_channel = self.broadcast.name(),
            broadcast,
            "sent timer update"
        );
        Ok(Delivery {
            frame,
            direct,
            broadcast,
        })
    }
}

pub fn encode_frame(command: Command, config: &TimerConfig) -> Result<String, SyncError> {
    let message = SyncMessage::TimerUpdate(TimerUpdate {
        command,
        config: config.clone(),
    });
    Ok(serde_json::to_string(&message)?)
}

pub fn decode_frame(frame: &str) -> Option<TimerUpdate> {
    safe_json_parse_with(frame, decode_message)
}

fn decode_message(value: &Value) -> Option<TimerUpdate> {
    if value.get("type").and_then(Value::as_str) != Some("TIMER_UPDATE") {
        return None;
    }
    let payload = value.get("payload")?;
    let command = serde_json::from_value::<Command>(payload.get("command")?.clone()).ok()?;
    let config = validate_config(payload.get("config")?)?;
    Some(TimerUpdate { command, config })
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Paused,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Paused => "paused",
        }
    }
}

const MAX_PENDING_COPIES: usize = 32;

/// Both channels carry the same updates in order. An applied update is pending on
/// every other channel until its copy arrives there; a newer arrival drops it.
#[derive(Debug)]
pub struct SurfaceState {
    phase: Phase,
    config: Option<TimerConfig>,
    last: Option<TimerUpdate>,
    pending: HashMap<String, VecDeque<TimerUpdate>>,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self::listening(&[DIRECT_CHANNEL, BROADCAST_CHANNEL])
    }
}

impl SurfaceState {
    pub fn listening(channels: &[&str]) -> Self {
        Self {
            phase: Phase::Idle,
            config: None,
            last: None,
            pending: channels
                .iter()
                .map(|name| (name.to_string(), VecDeque::new()))
                .collect(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> Option<&TimerConfig> {
        self.config.as_ref()
    }

    pub fn apply(&mut self, channel: &str, update: TimerUpdate) -> bool {
        let pending = self.pending.entry(channel.to_string()).or_default();
        if let Some(found) = pending.iter().position(|copy| *copy == update) {
            pending.drain(..=found);
            return false;
        }
        pending.clear();
        if self.last.as_ref() == Some(&update) {
            return false;
        }

        for (name, queue) in &mut self.pending {
            if name != channel {
                if queue.len() == MAX_PENDING_COPIES {
                    queue.pop_front();
                }
                queue.push_back(update.clone());
            }
        }
        self.phase = match update.command {
            Command::Start => Phase::Running,
            Command::Pause => Phase::Paused,
            Command::Reset => Phase::Idle,
        };
        self.config = Some(update.config.clone());
        self.last = Some(update);
        true
    }

    pub fn apply_frame(&mut self, channel: &str, frame: &str) -> bool {
        match decode_frame(frame) {
            Some(update) => self.apply(channel, update),
            None => {
                debug!(channel, "ignored malformed sync frame");
                false
            }
        }
    }

    pub fn drain(&mut self, channel: &str, rx: &Receiver<String>) -> usize {
        rx.try_iter()
            .filter(|frame| self.apply_frame(channel, frame))
            .count()
    }
}
