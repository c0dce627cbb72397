pub mod contracts;
pub mod messages;
pub mod models;
pub mod schema;
pub mod users;

pub use contracts::ContractRepository;
pub use messages::MessageRepository;
pub use models::{Contact, ContractRecord, Message, User};
pub use users::UserRepository;
