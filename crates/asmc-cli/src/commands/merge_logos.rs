use super::progress_handler;
use crate::cli::MergeLogosArgs;
use crate::error::{CliError, Result};
use asmc::core::io::tables::write_rows_to_path;
use asmc::engine::progress::ProgressReporter;
use asmc::workflows::logo;

pub fn run(args: MergeLogosArgs, show_progress: bool) -> Result<()> {
    let handler = progress_handler(show_progress);
    let reporter = ProgressReporter::with_callback(handler.get_callback());

    let merged = logo::merge_files(&args.inputs, &reporter)?;
    write_rows_to_path(merged.to_rows(), &args.output).map_err(|e| CliError::output(&args.output, e))?;

    println!(
        "Merged {} logo table(s) over {} position(s) into {}",
        args.inputs.len(),
        merged.len(),
        args.output.display()
    );
    Ok(())
}
