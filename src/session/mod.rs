//! Authentication lifecycle: restore on startup, login, logout and the
//! forced logout that follows a 401.

mod intent;
mod reducer;
mod state;
mod store;
mod token;

pub use intent::SessionIntent;
pub use reducer::SessionReducer;
pub use state::{Session, SessionState};
pub use store::{SessionError, SessionStore};
pub use token::AuthToken;
