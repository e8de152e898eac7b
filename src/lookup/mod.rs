// Lookup module - link resolution, metadata fetch and format classification

pub mod client;
pub mod config;
pub mod errors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod resolver;
pub mod traits;

pub use client::YtStreamClient;
pub use config::ApiConfig;
pub use errors::{LookupError, LookupResult};
pub use format_selector::FormatSelector;
pub use models::{ClassifiedResult, DownloadOption, RawMetadata, StreamDescriptor, Thumbnail, VideoId};
pub use orchestrator::{fetch_classified, lookup, LookupSession, LookupState};
pub use resolver::{resolve, IdentifierResolver, UrlShape};
pub use traits::{ChannelPresenter, LookupEvent, MetadataSource, Presenter};
