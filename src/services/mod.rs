//! Drive API services used by the deploy flow.

mod query;
mod upload;
pub(crate) mod mover;

pub use query::*;
pub use upload::*;

pub(crate) use upload::check_local_file;

use crate::auth::AccessToken;
use crate::errors::{DriveError, DriveResult};

pub(crate) fn require(value: &str, name: &str) -> DriveResult<()> {
    if value.is_empty() {
        Err(DriveError::missing(name))
    } else {
        Ok(())
    }
}

pub(crate) fn require_token(token: &AccessToken) -> DriveResult<()> {
    if token.is_empty() {
        Err(DriveError::missing("accessToken"))
    } else {
        Ok(())
    }
}
