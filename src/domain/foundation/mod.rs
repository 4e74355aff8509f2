//! Shared domain building blocks: ids, timestamps, statuses, errors.

mod errors;
mod ids;
mod message_kind;
mod priority;
mod rating;
mod session_status;
mod ticket_status;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{KnowledgeEntryId, MessageId, SessionId, TicketId, UserId};
pub use message_kind::MessageKind;
pub use priority::TicketPriority;
pub use rating::SatisfactionRating;
pub use session_status::SessionStatus;
pub use ticket_status::TicketStatus;
pub use timestamp::Timestamp;
