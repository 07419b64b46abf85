// SPDX-License-Identifier: Apache-2.0

//! Typed entity graph data model.
//!
//! A UVC device describes its internal topology as terminals and units
//! connected by source references. Entities are parsed once during device
//! attach and immutable afterward; `source_id` values are plain ids that
//! stay unresolved until the chain scanner walks the graph, since
//! descriptors may arrive in any order.

use crate::descriptor::terminal;

/// One terminal or unit from the Video Control interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Device-scoped unique id.
    pub id: u8,
    /// Name from a string descriptor, or a generated default.
    pub name: String,
    pub kind: EntityKind,
}

/// Entity variants, tagged by the descriptor subtype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    InputTerminal(InputTerminal),
    OutputTerminal(OutputTerminal),
    SelectorUnit(SelectorUnit),
    ProcessingUnit(ProcessingUnit),
    ExtensionUnit(ExtensionUnit),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputTerminal {
    /// Raw 16-bit terminal type code (high byte is always non-zero).
    pub terminal_type: u16,
    pub payload: InputTerminalKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputTerminalKind {
    Camera(CameraTerminal),
    MediaTransport(MediaTransportTerminal),
    /// Vendor-specific or otherwise unknown input terminal; no payload
    /// beyond the common fields.
    Vendor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraTerminal {
    /// Control capability bitmap, as declared (variable width).
    pub controls: Vec<u8>,
    pub focal_length_min: u16,
    pub focal_length_max: u16,
    pub ocular_focal_length: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTransportTerminal {
    pub controls: Vec<u8>,
    pub transport_modes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTerminal {
    pub terminal_type: u16,
    /// Single upstream entity reference.
    pub source_id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorUnit {
    /// Ordered upstream references; exactly one means pass-through.
    pub sources: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingUnit {
    pub source_id: u8,
    pub max_multiplier: u16,
    pub controls: Vec<u8>,
    /// Supported analog video standards bitmap.
    pub video_standards: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionUnit {
    pub guid: [u8; 16],
    pub num_controls: u8,
    /// Ordered upstream references.
    pub sources: Vec<u8>,
    pub controls: Vec<u8>,
    /// Parallel relative-vs-absolute bitmap, present only on vendor
    /// extension units synthesized by the quirk hook.
    pub control_types: Option<Vec<u8>>,
}

impl Entity {
    /// Whether this is an input terminal of any flavor.
    pub fn is_input_terminal(&self) -> bool {
        matches!(self.kind, EntityKind::InputTerminal(_))
    }

    /// Whether this is a streaming output terminal, the kind a video chain
    /// ends at.
    pub fn is_streaming_terminal(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::OutputTerminal(OutputTerminal {
                terminal_type: terminal::TT_STREAMING,
                ..
            })
        )
    }

    /// Whether this is a unit (as opposed to a terminal). The backward walk
    /// continues through units and stops at terminals.
    pub fn is_unit(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::SelectorUnit(_)
                | EntityKind::ProcessingUnit(_)
                | EntityKind::ExtensionUnit(_)
        )
    }

    /// Upstream references of this entity, in declared order.
    pub fn sources(&self) -> &[u8] {
        match &self.kind {
            EntityKind::InputTerminal(_) => &[],
            EntityKind::OutputTerminal(t) => std::slice::from_ref(&t.source_id),
            EntityKind::SelectorUnit(u) => &u.sources,
            EntityKind::ProcessingUnit(u) => std::slice::from_ref(&u.source_id),
            EntityKind::ExtensionUnit(u) => &u.sources,
        }
    }

    /// Whether any of this entity's sources references `id`.
    pub fn references(&self, id: u8) -> bool {
        self.sources().contains(&id)
    }

    /// Short tag used in chain traces ("IT 1", "PU 3", ...).
    pub fn tag(&self) -> &'static str {
        match &self.kind {
            EntityKind::InputTerminal(_) => "IT",
            EntityKind::OutputTerminal(_) => "OT",
            EntityKind::SelectorUnit(_) => "SU",
            EntityKind::ProcessingUnit(_) => "PU",
            EntityKind::ExtensionUnit(_) => "XU",
        }
    }
}

/// Find an entity by id. Entity order carries no meaning after parsing;
/// this linear scan is the only lookup the resolver needs.
pub fn entity_by_id(entities: &[Entity], id: u8) -> Option<&Entity> {
    entities.iter().find(|e| e.id == id)
}
