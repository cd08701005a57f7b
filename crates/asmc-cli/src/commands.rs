pub mod cluster;
pub mod extract;
pub mod merge_logos;

use crate::utils::progress::CliProgressHandler;

pub(crate) fn progress_handler(show_progress: bool) -> CliProgressHandler {
    if show_progress {
        CliProgressHandler::new()
    } else {
        CliProgressHandler::hidden()
    }
}
