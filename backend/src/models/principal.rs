use serde::Serialize;

use crate::types::UserId;
use crate::utils::jwt::Claims;

/// Caller identity resolved from a verified access token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
}

impl TryFrom<Claims> for Principal {
    type Error = uuid::Error;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Principal {
            user_id: claims.sub.parse()?,
            email: claims.email,
        })
    }
}
