mod entry;
mod system;

use harload::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
