//! SQL schema definitions.
//!
//! These tables belong to the catalog, order and settings modules; the
//! revenue engine only reads them.

/// Complete schema for the v1 database.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Catalog: users, categories, courses
-- ============================================================

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    full_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    avatar_url TEXT,
    role TEXT NOT NULL CHECK (role IN ('student', 'instructor', 'staff', 'admin')),
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);

CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS courses (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    thumbnail_url TEXT,
    creator_id TEXT NOT NULL REFERENCES users(id),
    category_id TEXT REFERENCES categories(id),
    rating REAL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_courses_creator ON courses(creator_id);

-- ============================================================
-- Orders & enrollments
-- ============================================================

CREATE TABLE IF NOT EXISTS orders (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    status TEXT NOT NULL CHECK (status IN ('pending', 'completed', 'cancelled', 'refunded')),
    total_price TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    completed_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_orders_completed ON orders(status, completed_at);

CREATE TABLE IF NOT EXISTS order_items (
    order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    course_id TEXT NOT NULL REFERENCES courses(id),
    price TEXT NOT NULL,
    PRIMARY KEY (order_id, course_id)
);

CREATE INDEX IF NOT EXISTS idx_order_items_course ON order_items(course_id);

CREATE TABLE IF NOT EXISTS enrollments (
    user_id TEXT NOT NULL REFERENCES users(id),
    course_id TEXT NOT NULL REFERENCES courses(id),
    status TEXT NOT NULL CHECK (status IN ('pending', 'completed', 'cancelled')),
    enrolled_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, course_id)
);

CREATE INDEX IF NOT EXISTS idx_enrollments_course ON enrollments(course_id, status);

-- ============================================================
-- Settings
-- ============================================================

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;
