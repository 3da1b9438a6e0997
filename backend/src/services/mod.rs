pub mod account;
pub mod code;
pub mod users;

pub use account::AccountService;
pub use code::{CodeManager, IssuedCode, UserRef};
pub use users::{DeleteOutcome, UserService};
