pub mod lookup;

pub use lookup::{
    lookup, resolve, ApiConfig, ChannelPresenter, ClassifiedResult, DownloadOption, FormatSelector,
    IdentifierResolver, LookupError, LookupEvent, LookupResult, LookupSession, LookupState,
    MetadataSource, Presenter, RawMetadata, UrlShape, VideoId, YtStreamClient,
};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default `youtube_options=info` filter and
/// `LOG_FORMAT=json` switches to JSON lines. Returns `false` when a
/// subscriber was already installed, which is not an error.
pub fn init_logging() -> bool {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("youtube_options=info"));

    let result = if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(env_filter)
            .try_init()
    };

    result.is_ok()
}
