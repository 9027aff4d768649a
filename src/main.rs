mod args;
mod entry;
mod error;
mod http;
mod logger;
mod report;
mod scenario;

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
