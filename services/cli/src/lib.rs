mod cli;
mod commands;

use allcamp_analytics::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
