// Library crate: the session layer, its channel implementations and the
// headless JSON command interface. The binary only wires them together.

pub mod build;
pub mod channel;
pub mod command;
pub mod fixtures;
pub mod harness;
pub mod i18n;
pub mod import;
pub mod render;
pub mod session;
pub mod state;
pub mod validation;
