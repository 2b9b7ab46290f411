//! Chat events as seen by the reconciliation engine

use crate::{Account, RoomId};
use serde::{Deserialize, Serialize};

/// A decoded inbound chat event
///
/// Transports map their wire frames onto this enum. Everything that is not a
/// room message or a member leaving is `Ignored`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatEvent {
    Message {
        room: RoomId,
        sender: Account,
        text: String,
    },
    MembershipDecrease {
        room: RoomId,
        account: Account,
    },
    Ignored,
}
