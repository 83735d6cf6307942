//! Business logic behind the handlers.

pub mod account;
pub mod channel;
pub mod engagement;
pub mod payments;
pub mod playlists;
pub mod videos;

pub use account::AccountService;
pub use channel::{ChannelPage, ChannelService, SearchResults};
pub use engagement::{EngagementService, SubscriptionState};
pub use payments::{verify_signature, PaymentService, SignatureError, WebhookOutcome};
pub use playlists::{PlaylistService, PlaylistToggle};
pub use videos::{NewThumbnail, VideoService, WatchPage};
