/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Opaque session identifier. Always generated server-side (UUIDv7).
pub type SessionId = uuid::Uuid;

/// Generate a fresh session identifier.
///
/// UUIDv7 keeps ids roughly time-ordered, which keeps the primary key index
/// append-mostly.
pub fn new_session_id() -> SessionId {
    uuid::Uuid::now_v7()
}
