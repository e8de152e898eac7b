// Lookup orchestration: resolve -> fetch -> classify, one cycle at a time
//
// Every submission gets a sequence number. Submitting again aborts the
// in-flight fetch, and a result that still arrives for an older sequence
// number is dropped, so the presenter only ever sees the latest cycle.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::errors::{LookupError, LookupResult};
use super::format_selector::FormatSelector;
use super::models::{ClassifiedResult, VideoId};
use super::resolver::IdentifierResolver;
use super::traits::{MetadataSource, Presenter};

/// Where the current cycle stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupState {
    Idle,
    Resolving {
        seq: u64,
    },
    Fetching {
        seq: u64,
        video_id: VideoId,
    },
    Done {
        seq: u64,
        outcome: Result<ClassifiedResult, LookupError>,
    },
}

impl LookupState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Fetching { .. })
    }
}

/// Fetch and classify metadata for an already-resolved ID
pub async fn fetch_classified(
    source: &dyn MetadataSource,
    id: &VideoId,
) -> LookupResult<ClassifiedResult> {
    let body = source.fetch(id).await?;
    FormatSelector::classify_value(&body)
}

/// One complete cycle without session bookkeeping
pub async fn lookup(source: &dyn MetadataSource, url: &str) -> LookupResult<ClassifiedResult> {
    let id = IdentifierResolver::new().resolve(url)?;
    fetch_classified(source, &id).await
}

struct SessionState {
    latest: u64,
    current: LookupState,
    in_flight: Option<JoinHandle<()>>,
}

/// Drives lookups for one user and reports them to a presenter.
///
/// Presenter callbacks run while the session lock is held, so a presenter
/// must not call back into the session.
pub struct LookupSession {
    source: Arc<dyn MetadataSource>,
    presenter: Arc<dyn Presenter>,
    resolver: IdentifierResolver,
    state: Arc<Mutex<SessionState>>,
}

impl LookupSession {
    pub fn new(source: Arc<dyn MetadataSource>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            source,
            presenter,
            resolver: IdentifierResolver::new(),
            state: Arc::new(Mutex::new(SessionState {
                latest: 0,
                current: LookupState::Idle,
                in_flight: None,
            })),
        }
    }

    pub fn with_resolver(mut self, resolver: IdentifierResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Start a new cycle, superseding any cycle still in flight.
    /// Returns the cycle's sequence number; lookup failures go to the
    /// presenter, not to the caller.
    ///
    /// Fails with `LookupError::Config` outside a Tokio runtime, leaving
    /// the session untouched.
    pub fn submit(&self, url: &str) -> LookupResult<u64> {
        let runtime = Handle::try_current().map_err(|e| {
            LookupError::Config(format!("Lookup submitted outside a Tokio runtime: {}", e))
        })?;

        let mut guard = lock(&self.state);
        guard.latest += 1;
        let seq = guard.latest;
        let was_loading = guard.current.is_loading();

        if let Some(previous) = guard.in_flight.take() {
            if !previous.is_finished() {
                debug!(seq, "Aborting superseded lookup");
            }
            previous.abort();
        }

        guard.current = LookupState::Resolving { seq };

        let video_id = match self.resolver.resolve(url) {
            Ok(id) => id,
            Err(e) => {
                warn!(seq, error = %e, "Rejected lookup input");
                self.presenter.on_error(&e.user_message());
                if was_loading {
                    self.presenter.on_loading(false);
                }
                guard.current = LookupState::Done { seq, outcome: Err(e) };
                return Ok(seq);
            }
        };

        info!(seq, video_id = %video_id, source = self.source.name(), "Starting lookup");
        guard.current = LookupState::Fetching {
            seq,
            video_id: video_id.clone(),
        };
        self.presenter.on_loading(true);

        let source = Arc::clone(&self.source);
        let presenter = Arc::clone(&self.presenter);
        let state = Arc::clone(&self.state);
        guard.in_flight = Some(runtime.spawn(async move {
            let outcome = fetch_classified(source.as_ref(), &video_id).await;
            publish(&state, presenter.as_ref(), seq, outcome);
        }));

        Ok(seq)
    }

    /// Abort the in-flight cycle, if any, and return to idle
    pub fn cancel(&self) {
        let mut guard = lock(&self.state);
        if let Some(handle) = guard.in_flight.take() {
            handle.abort();
        }
        if guard.current.is_loading() {
            guard.latest += 1;
            debug!(latest = guard.latest, "Lookup cancelled");
            guard.current = LookupState::Idle;
            self.presenter.on_loading(false);
        }
    }

    /// Snapshot of the current result slot
    pub fn state(&self) -> LookupState {
        lock(&self.state).current.clone()
    }

    pub fn latest_seq(&self) -> u64 {
        lock(&self.state).latest
    }
}

impl Drop for LookupSession {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.state).in_flight.take() {
            handle.abort();
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn publish(
    state: &Mutex<SessionState>,
    presenter: &dyn Presenter,
    seq: u64,
    outcome: LookupResult<ClassifiedResult>,
) {
    let mut guard = lock(state);
    if guard.latest != seq {
        debug!(seq, latest = guard.latest, "Discarding stale lookup result");
        return;
    }

    match &outcome {
        Ok(result) => {
            info!(
                seq,
                video = result.video_formats.len(),
                audio = result.audio_formats.len(),
                "Lookup finished"
            );
            presenter.on_result(result);
        }
        Err(e) => {
            warn!(seq, error = %e, "Lookup failed");
            presenter.on_error(&e.user_message());
        }
    }
    presenter.on_loading(false);

    guard.current = LookupState::Done { seq, outcome };
    guard.in_flight = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::traits::{ChannelPresenter, LookupEvent};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    const SLOW_ID: &str = "slowslowslo";

    struct FakeSource;

    #[async_trait]
    impl MetadataSource for FakeSource {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn fetch(&self, id: &VideoId) -> Result<Value, LookupError> {
            match id.as_str() {
                SLOW_ID => {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    Ok(json!({ "title": "slow" }))
                }
                "failfailfai" => Err(LookupError::http_status(
                    429,
                    Some("Too many requests".to_string()),
                )),
                "noshapenosh" => Ok(json!({ "formats": [] })),
                other => Ok(json!({
                    "title": other,
                    "formats": [{ "qualityLabel": "720p", "url": "u1" }],
                    "adaptiveFormats": [{ "mimeType": "audio/mp4", "url": "u2" }]
                })),
            }
        }
    }

    fn session() -> (LookupSession, UnboundedReceiver<LookupEvent>) {
        let (presenter, rx) = ChannelPresenter::new();
        (LookupSession::new(Arc::new(FakeSource), Arc::new(presenter)), rx)
    }

    async fn next(rx: &mut UnboundedReceiver<LookupEvent>) -> LookupEvent {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("presenter event")
            .expect("channel open")
    }

    #[tokio::test]
    async fn test_successful_cycle() {
        let (session, mut rx) = session();
        let seq = session.submit("https://youtu.be/dQw4w9WgXcQ?t=30").unwrap();
        assert_eq!(seq, 1);

        assert_eq!(next(&mut rx).await, LookupEvent::Loading(true));
        match next(&mut rx).await {
            LookupEvent::Result(result) => {
                assert_eq!(result.title, "dQw4w9WgXcQ");
                assert_eq!(result.video_formats.len(), 1);
                assert_eq!(result.audio_formats.len(), 1);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(next(&mut rx).await, LookupEvent::Loading(false));

        assert!(matches!(session.state(), LookupState::Done { seq: 1, outcome: Ok(_) }));
    }

    #[tokio::test]
    async fn test_invalid_input_never_loads() {
        let (session, mut rx) = session();
        session.submit("not a url").unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            LookupEvent::Error("Could not extract a valid YouTube video ID from the URL.".into())
        );
        assert!(rx.try_recv().is_err());
        assert!(matches!(
            session.state(),
            LookupState::Done { outcome: Err(LookupError::InvalidUrl(_)), .. }
        ));
    }

    #[tokio::test]
    async fn test_transport_and_shape_failures() {
        let (session, mut rx) = session();

        session.submit("https://www.youtube.com/watch?v=failfailfai").unwrap();
        assert_eq!(next(&mut rx).await, LookupEvent::Loading(true));
        assert_eq!(next(&mut rx).await, LookupEvent::Error("Too many requests".into()));
        assert_eq!(next(&mut rx).await, LookupEvent::Loading(false));

        session.submit("https://www.youtube.com/watch?v=noshapenosh").unwrap();
        assert_eq!(next(&mut rx).await, LookupEvent::Loading(true));
        assert_eq!(
            next(&mut rx).await,
            LookupEvent::Error(LookupError::UnexpectedShape.user_message())
        );
        assert_eq!(next(&mut rx).await, LookupEvent::Loading(false));
        assert!(matches!(
            session.state(),
            LookupState::Done { seq: 2, outcome: Err(LookupError::UnexpectedShape) }
        ));
    }

    #[tokio::test]
    async fn test_latest_submission_wins() {
        let (session, mut rx) = session();
        session.submit("https://youtu.be/slowslowslo").unwrap();
        session.submit("https://youtu.be/dQw4w9WgXcQ").unwrap();

        assert_eq!(next(&mut rx).await, LookupEvent::Loading(true));
        assert_eq!(next(&mut rx).await, LookupEvent::Loading(true));
        match next(&mut rx).await {
            LookupEvent::Result(result) => assert_eq!(result.title, "dQw4w9WgXcQ"),
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(next(&mut rx).await, LookupEvent::Loading(false));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(rx.try_recv().is_err(), "superseded cycle must stay silent");
        assert!(matches!(session.state(), LookupState::Done { seq: 2, .. }));
    }

    #[tokio::test]
    async fn test_invalid_input_clears_superseded_loading() {
        let (session, mut rx) = session();
        session.submit("https://youtu.be/slowslowslo").unwrap();
        session.submit("nope").unwrap();

        assert_eq!(next(&mut rx).await, LookupEvent::Loading(true));
        assert!(matches!(next(&mut rx).await, LookupEvent::Error(_)));
        assert_eq!(next(&mut rx).await, LookupEvent::Loading(false));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_returns_to_idle() {
        let (session, mut rx) = session();
        session.submit("https://youtu.be/slowslowslo").unwrap();
        assert!(session.state().is_loading());

        session.cancel();
        assert_eq!(next(&mut rx).await, LookupEvent::Loading(true));
        assert_eq!(next(&mut rx).await, LookupEvent::Loading(false));
        assert_eq!(session.state(), LookupState::Idle);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(rx.try_recv().is_err());

        // A new submission is accepted right away
        session.submit("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(next(&mut rx).await, LookupEvent::Loading(true));
        assert!(matches!(next(&mut rx).await, LookupEvent::Result(_)));
        assert_eq!(session.latest_seq(), 3);
    }

    #[test]
    fn test_submit_outside_runtime_is_config_error() {
        let (session, mut rx) = session();
        let err = session.submit("https://youtu.be/dQw4w9WgXcQ").unwrap_err();

        assert!(matches!(err, LookupError::Config(_)));
        assert_eq!(session.latest_seq(), 0);
        assert_eq!(session.state(), LookupState::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_lookup_without_session() {
        let result = lookup(&FakeSource, "https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .await
            .unwrap();
        assert_eq!(result.video_formats[0].label.as_deref(), Some("720p"));

        let err = lookup(&FakeSource, "not a url").await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidUrl(_)));
    }
}
