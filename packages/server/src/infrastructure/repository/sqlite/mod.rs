mod message;

pub use message::SqliteMessageRepository;
