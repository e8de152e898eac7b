// Collaborator seams: where metadata comes from and where results go

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use super::errors::LookupError;
use super::models::{ClassifiedResult, VideoId};

/// Trait for metadata API implementations
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Name of the source (for logging)
    fn name(&self) -> &'static str;

    /// Fetch the raw, unclassified metadata body for a video
    async fn fetch(&self, id: &VideoId) -> Result<serde_json::Value, LookupError>;
}

/// Receives everything the UI needs to render a lookup
pub trait Presenter: Send + Sync {
    fn on_loading(&self, in_progress: bool);

    fn on_result(&self, result: &ClassifiedResult);

    fn on_error(&self, message: &str);
}

/// Presentation update, as sent by `ChannelPresenter`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum LookupEvent {
    Loading(bool),
    Result(ClassifiedResult),
    Error(String),
}

/// Presenter that forwards updates over a channel, for UIs that poll
pub struct ChannelPresenter {
    tx: UnboundedSender<LookupEvent>,
}

impl ChannelPresenter {
    pub fn new() -> (Self, UnboundedReceiver<LookupEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }

    fn emit(&self, event: LookupEvent) {
        // The UI may have gone away; nothing left to notify then
        let _ = self.tx.send(event);
    }
}

impl Presenter for ChannelPresenter {
    fn on_loading(&self, in_progress: bool) {
        self.emit(LookupEvent::Loading(in_progress));
    }

    fn on_result(&self, result: &ClassifiedResult) {
        self.emit(LookupEvent::Result(result.clone()));
    }

    fn on_error(&self, message: &str) {
        self.emit(LookupEvent::Error(message.to_string()));
    }
}
