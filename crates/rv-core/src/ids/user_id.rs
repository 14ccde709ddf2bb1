use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Identifier of an account.
///
/// The same value keys the auth user, the `profiles` row and the
/// `preferences` row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl_id!(UserId);
