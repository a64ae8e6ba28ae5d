//! Object capabilities.
//!
//! A [`Capability`] is an opaque, non-copyable handle. Only this crate can mint one, and the
//! host keeps a [`CapabilityStore`] mapping every capability name to the index of the handle
//! that owns it. Presenting a handle under a different name, or a handle that was released,
//! fails authentication.

use crate::prelude::*;

use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use core::{fmt, str::FromStr};

use crate::core::ics05_port::error::Error;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::core::ics24_host::Path;

#[derive(Debug, PartialEq, Eq)]
pub struct Capability {
    index: u64,
}

impl Capability {
    pub(crate) fn new(index: u64) -> Capability {
        Self { index }
    }

    pub fn index(&self) -> u64 {
        self.index
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ChannelCapability(Capability);

impl ChannelCapability {
    pub fn index(&self) -> u64 {
        self.0.index()
    }
}

impl From<Capability> for ChannelCapability {
    fn from(cap: Capability) -> Self {
        Self(cap)
    }
}

impl From<ChannelCapability> for Capability {
    fn from(cap: ChannelCapability) -> Self {
        cap.0
    }
}

impl AsRef<Capability> for ChannelCapability {
    fn as_ref(&self) -> &Capability {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CapabilityName(String);

impl CapabilityName {
    pub fn new(s: Cow<'_, str>) -> Result<Self, Error> {
        if !s.trim().is_empty() {
            Ok(Self(s.into_owned()))
        } else {
            Err(Error::invalid_capability_name())
        }
    }

    /// The name under which the capability for the channel end `(port_id, channel_id)` is
    /// registered.
    pub fn channel(port_id: &PortId, channel_id: &ChannelId) -> Self {
        Self(Path::ChannelCapability(port_id.clone(), channel_id.clone()).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CapabilityName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(Cow::Borrowed(s))
    }
}

/// Registry of the capabilities owned by a host, indexed by name.
#[derive(Clone, Debug, Default)]
pub struct CapabilityStore {
    next_index: u64,
    owners: BTreeMap<CapabilityName, u64>,
}

impl CapabilityStore {
    /// Create a new capability with the given name.
    /// Return an error if the capability was already taken.
    pub fn new_capability(&mut self, name: CapabilityName) -> Result<Capability, Error> {
        if self.owners.contains_key(&name) {
            return Err(Error::capability_already_taken(name.to_string()));
        }

        let index = self.next_index;
        self.next_index += 1;
        self.owners.insert(name, index);

        Ok(Capability::new(index))
    }

    /// Fetch the handle registered under `name`.
    pub fn get_capability(&self, name: &CapabilityName) -> Result<Capability, Error> {
        self.owners
            .get(name)
            .map(|index| Capability::new(*index))
            .ok_or_else(|| Error::capability_not_found(name.to_string()))
    }

    /// Succeeds iff `capability` is the handle registered under `name`.
    pub fn authenticate_capability(
        &self,
        name: &CapabilityName,
        capability: &Capability,
    ) -> Result<(), Error> {
        match self.owners.get(name) {
            Some(index) if *index == capability.index() => Ok(()),
            _ => Err(Error::unauthenticated(name.to_string())),
        }
    }

    /// Release a previously created capability. The handle is consumed.
    pub fn release_capability(
        &mut self,
        name: &CapabilityName,
        capability: Capability,
    ) -> Result<(), Error> {
        self.authenticate_capability(name, &capability)?;
        self.owners.remove(name);
        Ok(())
    }
}
