mod message;

pub use message::InMemoryMessageRepository;
