//! The session controller and its public surface.

mod controller;
mod intent;
mod view;

pub use controller::SessionController;
pub use intent::SessionIntent;
pub use view::{ExitDialogView, SessionView, format_clock};
