//! Game log event grammar and rendering.

pub mod events;

pub use events::EventGrammar;
