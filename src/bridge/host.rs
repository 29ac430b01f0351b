//! Lifecycle hooks for hosts that own a bridge.

use super::Bridge;
use crate::types::Result;

/// A host whose mount / unmount lifecycle drives its bridge.
pub trait ListenerHost {
    fn bridge_mut(&mut self) -> &mut Bridge;

    /// Called when the host mounts: subscribes all declared bindings.
    fn will_mount(&mut self) -> Result<()> {
        self.bridge_mut().activate()
    }

    /// Called when the host unmounts: releases every subscription.
    fn will_unmount(&mut self) {
        self.bridge_mut().deactivate()
    }
}
