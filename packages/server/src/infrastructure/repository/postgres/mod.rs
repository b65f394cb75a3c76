mod message;

pub use message::PostgresMessageRepository;
