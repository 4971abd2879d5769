use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::session::SessionUser;

/// Message returned by `privateData`
pub const PRIVATE_MESSAGE: &str = "This is private";

/// Output of `privateData`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PrivateDataOutput {
    #[schemars(description = "Always \"This is private\"")]
    pub message: String,
    #[schemars(description = "The user of the calling session")]
    pub user: SessionUser,
}
