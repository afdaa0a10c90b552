pub mod json;
pub mod uuid;

pub use self::json::ValidatedJson;
pub use self::uuid::ValidatedUuid;
