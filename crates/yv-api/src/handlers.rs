//! Request handlers.

pub mod channels;
pub mod comments;
pub mod feed;
pub mod form;
pub mod health;
pub mod me;
pub mod playlists;
pub mod videos;
pub mod webhook;

pub use health::*;

use serde::Deserialize;
use yv_models::parse_cursor;

/// `?cursor=` of the listing endpoints. Anything unparsable starts at the top.
#[derive(Debug, Default, Deserialize)]
pub struct CursorQuery {
    pub cursor: Option<String>,
}

impl CursorQuery {
    pub fn cursor(&self) -> Option<i64> {
        parse_cursor(self.cursor.as_deref())
    }
}
