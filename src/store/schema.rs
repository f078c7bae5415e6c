pub const SCHEMA: &str = r#"
-- Path-addressable containers; a User namespace is owned by exactly one account
CREATE TABLE IF NOT EXISTS namespaces (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    path TEXT NOT NULL UNIQUE,

    -- No foreign key: bootstrap inserts the root namespace before its owner
    owner_id INTEGER,
    type TEXT NOT NULL DEFAULT 'User',

    visibility_level INTEGER NOT NULL DEFAULT 0,  -- 0 private, 10 internal, 20 public
    shared_runners_enabled INTEGER NOT NULL DEFAULT 1,
    project_creation_level INTEGER NOT NULL DEFAULT 20,
    organization_id INTEGER NOT NULL DEFAULT 1,

    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    encrypted_password TEXT NOT NULL DEFAULT '',  -- argon2id hash with embedded salt
    admin INTEGER NOT NULL DEFAULT 0,
    confirmed_at TEXT,                            -- NULL = awaiting confirmation
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY,
    namespace_id INTEGER NOT NULL REFERENCES namespaces(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    path TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),

    UNIQUE(namespace_id, path)
);

-- Only the digest is stored; the raw value is shown once at creation
CREATE TABLE IF NOT EXISTS personal_access_tokens (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    scopes INTEGER NOT NULL DEFAULT 0,  -- bitmask, see types::Scopes
    token_digest TEXT NOT NULL,
    token_lookup TEXT NOT NULL,
    revoked INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT NOT NULL,
    last_used_at TEXT
);

-- Named id generators; next_value is what the next insert receives
CREATE TABLE IF NOT EXISTS id_sequences (
    name TEXT PRIMARY KEY,
    next_value INTEGER NOT NULL DEFAULT 1
);

INSERT OR IGNORE INTO id_sequences (name, next_value) VALUES
    ('namespaces_id_seq', 1),
    ('users_id_seq', 1),
    ('projects_id_seq', 1),
    ('personal_access_tokens_id_seq', 1);

CREATE UNIQUE INDEX IF NOT EXISTS idx_tokens_lookup ON personal_access_tokens(token_lookup);
CREATE INDEX IF NOT EXISTS idx_tokens_user ON personal_access_tokens(user_id);
CREATE INDEX IF NOT EXISTS idx_namespaces_owner ON namespaces(owner_id);
CREATE INDEX IF NOT EXISTS idx_projects_namespace ON projects(namespace_id);
"#;
