use tokio::runtime::Runtime;

use crate::error::CliResult;

/// Each command drives its requests on a runtime of its own.
pub fn runtime() -> CliResult<Runtime> {
    Ok(Runtime::new()?)
}
