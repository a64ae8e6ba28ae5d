use serde_derive::{Deserialize, Serialize};

use crate::Height;

/// The light-client view the channel layer needs: how far the client has
/// followed the counterparty and whether it has been frozen for misbehaviour.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    pub latest_height: Height,
    pub frozen_height: Option<Height>,
}

impl ClientState {
    pub fn new(latest_height: Height) -> Self {
        Self {
            latest_height,
            frozen_height: None,
        }
    }

    pub fn latest_height(&self) -> Height {
        self.latest_height
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen_height.is_some()
    }

    pub fn with_frozen_height(self, h: Height) -> Self {
        Self {
            frozen_height: Some(h),
            ..self
        }
    }
}
