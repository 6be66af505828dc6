//! Terminal presentation: poll cards, result bars, and the results panel state.

pub mod render;

pub use render::{render_poll_list, render_results, PollBoard};
