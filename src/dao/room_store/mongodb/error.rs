//! Error types shared by the MongoDB storage implementation.

use thiserror::Error;

/// Convenient result alias returning [`MongoDaoError`] failures.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The MongoDB connection string could not be parsed.
    #[error("invalid MongoDB URI `{uri}`")]
    InvalidUri {
        /// Offending URI.
        uri: String,
        #[source]
        source: mongodb::error::Error,
    },
    /// The driver client could not be constructed.
    #[error("failed to build MongoDB client")]
    ClientConstruction {
        #[source]
        source: mongodb::error::Error,
    },
    /// The initial ping never succeeded.
    #[error("MongoDB did not answer the initial ping after {attempts} attempts")]
    InitialPing {
        /// Number of attempts made before giving up.
        attempts: u32,
        #[source]
        source: mongodb::error::Error,
    },
    /// A health-check ping failed on an established connection.
    #[error("MongoDB health ping failed")]
    HealthPing {
        #[source]
        source: mongodb::error::Error,
    },
    /// Index creation failed after connecting.
    #[error("failed to create index `{name}`")]
    CreateIndex {
        /// Index name.
        name: &'static str,
        #[source]
        source: mongodb::error::Error,
    },
    /// Writing a room document failed.
    #[error("failed to save room `{code}`")]
    SaveRoom {
        /// Room join code.
        code: String,
        #[source]
        source: mongodb::error::Error,
    },
    /// Reading a room document failed.
    #[error("failed to load room `{code}`")]
    FindRoom {
        /// Room join code.
        code: String,
        #[source]
        source: mongodb::error::Error,
    },
    /// A `$set` merge against a room document failed.
    #[error("failed to patch room `{code}`")]
    PatchRoom {
        /// Room join code.
        code: String,
        #[source]
        source: mongodb::error::Error,
    },
    /// Serialising a patch value into BSON failed.
    #[error("failed to encode patch field `{field}` for room `{code}`")]
    EncodePatch {
        /// Room join code.
        code: String,
        /// Dot-path of the field being encoded.
        field: &'static str,
        #[source]
        source: mongodb::bson::error::Error,
    },
    /// Reading or writing a profile document failed.
    #[error("failed to access profile `{player_id}`")]
    Profile {
        /// Owning player.
        player_id: String,
        #[source]
        source: mongodb::error::Error,
    },
}
