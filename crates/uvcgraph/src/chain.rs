// SPDX-License-Identifier: Apache-2.0

//! Video chain resolution.
//!
//! Walks the entity graph backward from each streaming output terminal to
//! the capture sources feeding it, picking up processing and extension
//! units along the way. Candidates are built in an accumulator and only
//! published once fully valid, so a rejected candidate leaves no trace.

use log::{debug, warn};

use crate::entity::{entity_by_id, Entity, EntityKind};
use crate::streaming::StreamingInterface;
use crate::Error;

/// A resolved capture path through the entity graph, borrowing from the
/// device it was scanned from.
#[derive(Debug, Clone)]
pub struct VideoChain<'a> {
    /// Input terminals feeding the chain. More than one only when a
    /// multi-input selector sits in the path.
    pub input_terminals: Vec<&'a Entity>,
    pub processing_unit: Option<&'a Entity>,
    /// Selector with more than one input; pass-through selectors are
    /// elided.
    pub selector_unit: Option<&'a Entity>,
    /// Extension units in traversal order, side branches included.
    pub extension_units: Vec<&'a Entity>,
    pub output_terminal: &'a Entity,
    pub streaming: &'a StreamingInterface,
}

impl std::fmt::Display for VideoChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for terminal in &self.input_terminals {
            write!(f, "{} {} -> ", terminal.tag(), terminal.id)?;
        }
        if let Some(selector) = self.selector_unit {
            write!(f, "{} {} -> ", selector.tag(), selector.id)?;
        }
        if let Some(unit) = self.processing_unit {
            write!(f, "{} {} -> ", unit.tag(), unit.id)?;
        }
        for unit in &self.extension_units {
            write!(f, "{} {} -> ", unit.tag(), unit.id)?;
        }
        write!(
            f,
            "{} {}",
            self.output_terminal.tag(),
            self.output_terminal.id
        )
    }
}

#[derive(Default)]
struct ChainBuilder<'a> {
    input_terminals: Vec<&'a Entity>,
    processing_unit: Option<&'a Entity>,
    selector_unit: Option<&'a Entity>,
    extension_units: Vec<&'a Entity>,
    visited: Vec<u8>,
}

impl<'a> ChainBuilder<'a> {
    fn finish(
        self,
        output_terminal: &'a Entity,
        streaming: &'a StreamingInterface,
    ) -> VideoChain<'a> {
        VideoChain {
            input_terminals: self.input_terminals,
            processing_unit: self.processing_unit,
            selector_unit: self.selector_unit,
            extension_units: self.extension_units,
            output_terminal,
            streaming,
        }
    }

    /// Classify and record one main-chain entity.
    fn record(&mut self, entity: &'a Entity) -> Result<(), Error> {
        match &entity.kind {
            EntityKind::InputTerminal(_) => self.input_terminals.push(entity),
            EntityKind::OutputTerminal(_) => {}
            EntityKind::ExtensionUnit(xu) => {
                if xu.sources.len() != 1 {
                    warn!("extension unit {} has {} sources", entity.id, xu.sources.len());
                    return Err(Error::BrokenTopology);
                }
                self.extension_units.push(entity);
            }
            EntityKind::ProcessingUnit(_) => {
                if self.processing_unit.is_some() {
                    warn!("second processing unit {} in chain", entity.id);
                    return Err(Error::BrokenTopology);
                }
                self.processing_unit = Some(entity);
            }
            EntityKind::SelectorUnit(su) => {
                // Single-input selectors are wiring, not a choice point.
                if su.sources.len() > 1 {
                    if self.selector_unit.is_some() {
                        warn!("second selector unit {} in chain", entity.id);
                        return Err(Error::BrokenTopology);
                    }
                    self.selector_unit = Some(entity);
                }
            }
        }
        Ok(())
    }

    /// Record extension units branching off `entity`, skipping the one the
    /// walk arrived from.
    fn scan_forward(
        &mut self,
        entities: &'a [Entity],
        entity: &'a Entity,
        prev: Option<&'a Entity>,
    ) -> Result<(), Error> {
        for candidate in entities {
            if let EntityKind::ExtensionUnit(xu) = &candidate.kind {
                if !candidate.references(entity.id) {
                    continue;
                }
                if prev.is_some_and(|p| std::ptr::eq(p, candidate)) {
                    continue;
                }
                if xu.sources.len() != 1 {
                    warn!(
                        "branch extension unit {} has {} sources",
                        candidate.id,
                        xu.sources.len()
                    );
                    return Err(Error::BrokenTopology);
                }
                self.extension_units.push(candidate);
            }
        }
        Ok(())
    }

    /// Resolve the entity feeding `entity`, or `None` when the walk is
    /// complete. Multi-input selectors resolve all their sources here and
    /// terminate the walk.
    fn step_backward(
        &mut self,
        entities: &'a [Entity],
        entity: &'a Entity,
    ) -> Result<Option<&'a Entity>, Error> {
        let source_id = match &entity.kind {
            EntityKind::InputTerminal(_) => return Ok(None),
            EntityKind::OutputTerminal(t) => t.source_id,
            EntityKind::ProcessingUnit(pu) => pu.source_id,
            EntityKind::ExtensionUnit(xu) => xu.sources[0],
            EntityKind::SelectorUnit(su) => match su.sources.as_slice() {
                [] => {
                    warn!("selector unit {} has no sources", entity.id);
                    return Err(Error::BrokenTopology);
                }
                [single] => *single,
                sources => {
                    for &id in sources {
                        let source = entity_by_id(entities, id)
                            .ok_or(Error::UnresolvedReference(id))?;
                        if !source.is_input_terminal() {
                            warn!(
                                "selector unit {} source {} is not an input terminal",
                                entity.id, id
                            );
                            return Err(Error::BrokenTopology);
                        }
                        self.record(source)?;
                        self.scan_forward(entities, source, Some(entity))?;
                    }
                    return Ok(None);
                }
            },
        };

        let source =
            entity_by_id(entities, source_id).ok_or(Error::UnresolvedReference(source_id))?;
        if self.visited.contains(&source.id) {
            warn!("entity {} appears twice in chain", source.id);
            return Err(Error::BrokenTopology);
        }
        Ok(Some(source))
    }
}

/// Resolve a chain candidate rooted at one output terminal.
fn build_chain<'a>(
    entities: &'a [Entity],
    output_terminal: &'a Entity,
) -> Result<ChainBuilder<'a>, Error> {
    let mut builder = ChainBuilder::default();
    let mut prev: Option<&'a Entity> = None;
    let mut current = output_terminal;

    loop {
        builder.visited.push(current.id);
        builder.record(current)?;
        // Branches attach to entities reached by following source ids;
        // nothing downstream of the output terminal belongs to the chain.
        if prev.is_some() {
            builder.scan_forward(entities, current, prev)?;
        }
        match builder.step_backward(entities, current)? {
            Some(next) => {
                prev = Some(current);
                current = next;
            }
            None => return Ok(builder),
        }
    }
}

/// Scan the entity graph for the device's video chain.
///
/// Output terminals are tried in entity order; the first that yields a
/// fully valid chain with a linked streaming interface wins. UVC allows
/// several independent chains per function, but devices with more than one
/// are not known to exist, so only the first is resolved.
pub fn scan_chain<'a>(
    entities: &'a [Entity],
    streams: &'a [StreamingInterface],
) -> Result<VideoChain<'a>, Error> {
    for terminal in entities.iter().filter(|e| e.is_streaming_terminal()) {
        let builder = match build_chain(entities, terminal) {
            Ok(builder) => builder,
            Err(err) => {
                warn!("chain from output terminal {} rejected: {}", terminal.id, err);
                continue;
            }
        };

        let Some(stream) = streams
            .iter()
            .find(|s| s.terminal_link == terminal.id)
        else {
            debug!(
                "no streaming interface links to output terminal {}",
                terminal.id
            );
            continue;
        };

        let chain = builder.finish(terminal, stream);
        debug!("resolved video chain: {}", chain);
        return Ok(chain);
    }

    Err(Error::NoValidChain)
}
