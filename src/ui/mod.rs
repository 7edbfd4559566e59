//! Terminal widgets for the debate view

pub mod board;
pub mod commands;
pub mod composer;
pub mod status;

pub use board::PanelBoard;
pub use commands::{help_text, SlashCommand};
pub use composer::{Composer, ComposerResult, ComposerWidget};
pub use status::StatusBar;
