pub mod auth;
pub mod bot;
pub mod config;
pub mod delivery;
pub mod downloader;
pub mod metrics;
pub mod origin;
pub mod pipeline;
pub mod registry;
pub mod status;
pub mod telegram;
pub mod testing;

pub use auth::{
    create_authenticator, AdminKeyAuthenticator, AuthError, AuthRequest, Authenticator, Identity,
    NoneAuthenticator,
};
pub use bot::{parse_command, BotCommand, CommandListener, UpdateSource};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    OriginConfig, SanitizedConfig, TelegramConfig,
};
pub use delivery::{
    DeliveryError, DeliveryOutcome, DeliverySink, Messenger, MessengerError, SentMessage,
    TextFormat,
};
pub use downloader::{DownloadArtifact, DownloadError, DownloaderConfig, Materializer, YtDlpMaterializer};
pub use origin::{
    extract_completed, CompletionEntry, MediaResolver, OriginClient, PageSource, Resolution,
    TransportError, UnresolvableReason,
};
pub use pipeline::{
    CheckError, CheckOutcome, CheckPipeline, CheckReport, EntryOutcome, EntryReport,
    PipelineConfig, RegistryLinkError,
};
pub use registry::{Batch, Channel, Registry, RegistryError, RegistryReader, SqliteRegistry};
pub use telegram::TelegramClient;
