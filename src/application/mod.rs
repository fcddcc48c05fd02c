mod client;
mod error;
mod factory;
mod operation;

pub use client::NotaryClient;
pub use error::{ErrorKind, NotaryError};
pub use factory::NotaryClientFactory;
pub use operation::{Entrypoint, PendingOperation};
