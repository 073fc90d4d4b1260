pub const SCHEMA_V1: &str = r#"
BEGIN;

-- Profile: one row per user, primary key supplied by the caller on first save.
CREATE TABLE
    IF NOT EXISTS user_basic (
        user_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        gender TEXT CHECK (gender IN ('M', 'F')),
        birth_date DATE,
        email TEXT,
        phone TEXT,
        address TEXT,
        register_time DATETIME DEFAULT CURRENT_TIMESTAMP
    );

-- Schedule items, removed together with their owner.
CREATE TABLE
    IF NOT EXISTS personal_schedule (
        event_id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        start_time DATETIME NOT NULL,
        end_time DATETIME,
        location TEXT,
        description TEXT,
        status TEXT CHECK (
            status IN ('pending', 'in_progress', 'completed', 'cancelled')
        ) DEFAULT 'pending',
        priority TEXT CHECK (
            priority IN (
                'not important',
                'not so important',
                'a little important',
                'important',
                'very important'
            )
        ),
        category TEXT CHECK (
            category IN ('work', 'study', 'life', 'health', 'social', 'other')
        ),
        FOREIGN KEY (user_id) REFERENCES user_basic (user_id) ON DELETE CASCADE
    );

CREATE INDEX
    IF NOT EXISTS idx_personal_schedule_owner_start
    ON personal_schedule (user_id, start_time);

------------------------------------------------------------------
-- user_version = 1
PRAGMA user_version = 1;

COMMIT;
"#;
