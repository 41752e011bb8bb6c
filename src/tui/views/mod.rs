//! View state and rendering for each console tab.

mod mappings;
mod recording;
mod requests;
mod scenarios;

pub use mappings::MappingsView;
pub use recording::RecordingView;
pub use requests::{MatchedView, UnmatchedView};
pub use scenarios::ScenariosView;
