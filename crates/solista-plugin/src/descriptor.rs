//! Component descriptors and query filters.

use serde::{Deserialize, Serialize};

/// Coarse component category, mirroring the host's component types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// A sound-generating instrument ("music device").
    MusicDevice,
    Effect,
    Generator,
}

/// An available instrument plugin as reported by the host directory.
///
/// Immutable; produced by queries, consumed read-only by the UI. The icon
/// is not stored here; it is a host capability lookup
/// ([`PluginHost::icon`](crate::host::PluginHost::icon)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentDescriptor {
    /// Opaque host-specific identifier.
    pub uid: String,
    pub name: String,
    pub manufacturer: String,
    pub kind: ComponentKind,
    pub sub_type: u32,
    pub manufacturer_id: u32,
}

impl InstrumentDescriptor {
    /// Descriptor for an instrument with wildcard numeric fields, mostly
    /// useful in tests and simple hosts.
    pub fn instrument(uid: impl Into<String>, name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            manufacturer: manufacturer.into(),
            kind: ComponentKind::MusicDevice,
            sub_type: 0,
            manufacturer_id: 0,
        }
    }
}

/// Structural component match; zero (or `None`) means wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentFilter {
    pub kind: Option<ComponentKind>,
    pub sub_type: u32,
    pub manufacturer_id: u32,
}

impl ComponentFilter {
    /// Match everything.
    pub fn any() -> Self {
        Self::default()
    }

    /// Match every instrument ("music device"), any sub-type, any
    /// manufacturer. This is the filter the audition flow uses.
    pub fn instruments() -> Self {
        Self {
            kind: Some(ComponentKind::MusicDevice),
            sub_type: 0,
            manufacturer_id: 0,
        }
    }

    pub fn matches(&self, descriptor: &InstrumentDescriptor) -> bool {
        self.kind.map_or(true, |k| k == descriptor.kind)
            && (self.sub_type == 0 || self.sub_type == descriptor.sub_type)
            && (self.manufacturer_id == 0 || self.manufacturer_id == descriptor.manufacturer_id)
    }
}
