//! Application state.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use yv_ai::{AiConfig, OpenAiClient, SpeechToText, Summarizer, UnconfiguredAi};
use yv_cache::{Cache, MemoryCache, RedisCache};
use yv_feed::{FeedAssembler, FeedConfig, Listings};
use yv_media::{check_ffmpeg, FfmpegToolkit, MediaConfig, MediaToolkit};
use yv_models::{Clock, SystemClock};
use yv_pipeline::{PipelineConfig, UploadPipeline};
use yv_storage::{FsObjectStore, FsStoreConfig, ObjectStore, R2Config, R2ObjectStore};
use yv_store::{SqliteStore, Store, StoreConfig};

use crate::auth::TokenVerifier;
use crate::config::ApiConfig;
use crate::services::{
    AccountService, ChannelService, EngagementService, PaymentService, PlaylistService,
    VideoService,
};

/// External backends the state is assembled from.
pub struct Backends {
    pub store: Arc<dyn Store>,
    pub cache: Arc<dyn Cache>,
    pub objects: Arc<dyn ObjectStore>,
    pub media: Arc<dyn MediaToolkit>,
    pub speech: Arc<dyn SpeechToText>,
    pub summarizer: Arc<dyn Summarizer>,
    pub clock: Arc<dyn Clock>,
    /// Directory served under `/media` when blobs live on local disk
    pub media_root: Option<PathBuf>,
}

impl Backends {
    /// Backends selected by environment variables.
    pub async fn from_env(config: &ApiConfig) -> anyhow::Result<Self> {
        let store = SqliteStore::connect(&StoreConfig::from_env()).await?;

        let cache: Arc<dyn Cache> = match &config.redis_url {
            Some(url) => {
                let redis = RedisCache::new(url, "youview")?;
                if let Err(e) = redis.ping().await {
                    warn!("Redis not reachable yet: {}", e);
                }
                info!("Using Redis cache");
                Arc::new(redis)
            }
            None => {
                info!("Using in-process cache");
                Arc::new(MemoryCache::new())
            }
        };

        let (objects, media_root): (Arc<dyn ObjectStore>, _) = if R2Config::is_configured() {
            info!("Using R2 object storage");
            (Arc::new(R2ObjectStore::from_env()?), None)
        } else {
            let fs = FsObjectStore::new(FsStoreConfig::from_env());
            info!("Using local object storage at {}", fs.root().display());
            let root = fs.root().to_path_buf();
            (Arc::new(fs), Some(root))
        };

        if let Err(e) = check_ffmpeg() {
            warn!("Uploads will fail until FFmpeg is installed: {}", e);
        }
        let media = Arc::new(FfmpegToolkit::new(MediaConfig::from_env()));

        let ai_config = AiConfig::from_env();
        let (speech, summarizer): (Arc<dyn SpeechToText>, Arc<dyn Summarizer>) =
            if ai_config.is_configured() {
                let client = Arc::new(OpenAiClient::new(&ai_config)?);
                (client.clone(), client)
            } else {
                info!("No AI provider configured, summaries disabled");
                (Arc::new(UnconfiguredAi), Arc::new(UnconfiguredAi))
            };

        Ok(Self {
            store: Arc::new(store),
            cache,
            objects,
            media,
            speech,
            summarizer,
            clock: Arc::new(SystemClock),
            media_root,
        })
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn Store>,
    pub objects: Arc<dyn ObjectStore>,
    pub media_root: Option<PathBuf>,
    pub tokens: Arc<TokenVerifier>,
    pub feed: Arc<FeedAssembler<dyn Store, dyn Cache>>,
    pub listings: Listings<dyn Store>,
    pub pipeline: Arc<UploadPipeline<dyn Store>>,
    pub videos: VideoService,
    pub engagement: EngagementService,
    pub playlists: PlaylistService,
    pub channels: ChannelService,
    pub accounts: AccountService,
    pub payments: PaymentService,
}

impl AppState {
    /// Create new application state from the environment.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let backends = Backends::from_env(&config).await?;
        let pipeline_config = PipelineConfig::from_env();
        tokio::fs::create_dir_all(&pipeline_config.work_dir).await?;
        Ok(Self::build(
            config,
            backends,
            FeedConfig::from_env(),
            pipeline_config,
        ))
    }

    /// Wire services over the given backends.
    pub fn build(
        config: ApiConfig,
        backends: Backends,
        feed_config: FeedConfig,
        pipeline_config: PipelineConfig,
    ) -> Self {
        let Backends {
            store,
            cache,
            objects,
            media,
            speech,
            summarizer,
            clock,
            media_root,
        } = backends;

        let listings = Listings::new(Arc::clone(&store), feed_config.clone());
        let feed = FeedAssembler::new(Arc::clone(&store), cache, feed_config);
        let pipeline = UploadPipeline::new(
            media,
            Arc::clone(&objects),
            speech,
            summarizer,
            Arc::clone(&store),
            pipeline_config,
        );

        let videos = VideoService::new(Arc::clone(&store), Arc::clone(&objects));
        let engagement =
            EngagementService::new(Arc::clone(&store), videos.clone(), Arc::clone(&clock));
        let playlists = PlaylistService::new(Arc::clone(&store), videos.clone());
        let channels = ChannelService::new(Arc::clone(&store), listings.clone());
        let accounts = AccountService::new(Arc::clone(&store), Arc::clone(&objects));
        let payments = PaymentService::new(
            Arc::clone(&store),
            config.stripe_webhook_secret.clone(),
            clock,
        );
        let tokens = TokenVerifier::new(config.jwt_secret.as_deref(), config.jwt_issuer.as_deref());

        Self {
            config,
            store,
            objects,
            media_root,
            tokens: Arc::new(tokens),
            feed: Arc::new(feed),
            listings,
            pipeline: Arc::new(pipeline),
            videos,
            engagement,
            playlists,
            channels,
            accounts,
            payments,
        }
    }
}
