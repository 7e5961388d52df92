mod cancellation_token;

pub use self::cancellation_token::CancellationToken;
pub(crate) use self::cancellation_token::{Interruptible, Registration};
