//! Table definitions. Applied idempotently at startup.

/// Statements run in order by [`crate::SqliteStore`] on connect.
pub(crate) const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL DEFAULT '',
        last_name TEXT NOT NULL DEFAULT '',
        bio TEXT NOT NULL DEFAULT '',
        profile_picture_url TEXT NOT NULL DEFAULT '',
        is_premium INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS videos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL REFERENCES users (id) ON DELETE RESTRICT,
        title TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 255),
        description TEXT NOT NULL DEFAULT '',
        video_url TEXT NOT NULL,
        thumbnail_url TEXT NOT NULL DEFAULT '',
        preview_url TEXT NOT NULL DEFAULT '',
        duration TEXT NOT NULL DEFAULT '00:00:00',
        privacy INTEGER NOT NULL DEFAULT 0 CHECK (privacy IN (0, 1, 2)),
        ai_summary TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_videos_owner ON videos (owner_id, id)",
    r#"
    CREATE TABLE IF NOT EXISTS watch_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL REFERENCES users (id) ON DELETE RESTRICT,
        video_id INTEGER NOT NULL REFERENCES videos (id) ON DELETE RESTRICT,
        watched_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_watch_history_user_video ON watch_history (user_id, video_id, id)",
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        video_id INTEGER NOT NULL REFERENCES videos (id) ON DELETE RESTRICT,
        author_id TEXT NOT NULL REFERENCES users (id) ON DELETE RESTRICT,
        parent_id INTEGER REFERENCES comments (id) ON DELETE RESTRICT,
        content TEXT NOT NULL CHECK (length(trim(content)) > 0),
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_comments_video ON comments (video_id, id)",
    "CREATE INDEX IF NOT EXISTS ix_comments_parent ON comments (parent_id)",
    r#"
    CREATE TABLE IF NOT EXISTS reactions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL REFERENCES users (id) ON DELETE RESTRICT,
        video_id INTEGER REFERENCES videos (id) ON DELETE RESTRICT,
        comment_id INTEGER REFERENCES comments (id) ON DELETE RESTRICT,
        is_like INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        CHECK ((video_id IS NULL) <> (comment_id IS NULL))
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS ux_reactions_user_video ON reactions (user_id, video_id) WHERE video_id IS NOT NULL",
    "CREATE UNIQUE INDEX IF NOT EXISTS ux_reactions_user_comment ON reactions (user_id, comment_id) WHERE comment_id IS NOT NULL",
    "CREATE INDEX IF NOT EXISTS ix_reactions_video ON reactions (video_id)",
    "CREATE INDEX IF NOT EXISTS ix_reactions_comment ON reactions (comment_id)",
    r#"
    CREATE TABLE IF NOT EXISTS subscriptions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        follower_id TEXT NOT NULL REFERENCES users (id) ON DELETE RESTRICT,
        creator_id TEXT NOT NULL REFERENCES users (id) ON DELETE RESTRICT,
        created_at TEXT NOT NULL,
        UNIQUE (follower_id, creator_id),
        CHECK (follower_id <> creator_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_subscriptions_creator ON subscriptions (creator_id)",
    r#"
    CREATE TABLE IF NOT EXISTS playlists (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL REFERENCES users (id) ON DELETE RESTRICT,
        name TEXT NOT NULL CHECK (length(name) BETWEEN 1 AND 255),
        description TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS playlist_videos (
        playlist_id INTEGER NOT NULL REFERENCES playlists (id) ON DELETE RESTRICT,
        video_id INTEGER NOT NULL REFERENCES videos (id) ON DELETE RESTRICT,
        added_at TEXT NOT NULL,
        PRIMARY KEY (playlist_id, video_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_playlist_videos_video ON playlist_videos (video_id)",
];
