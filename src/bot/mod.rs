//! Bot front end - command routing and the update long-poll loop.

mod dispatcher;
mod router;

pub use dispatcher::UpdateDispatcher;
pub use router::{BotRouter, IncomingMessage, RouterSettings};
