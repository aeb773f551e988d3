use super::catalog::ChainInterface;
use super::chains::{ChainTemplate, PlacedChain};
use super::config::SearchConfig;
use super::contacts::ContactGraphBuilder;
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::symmetry::{AsymmetricUnitCopy, SymmetryEnumerator, VisitedLog, is_redundant};
use crate::core::crystal::Crystal;
use crate::core::crystal::transform::SymmetryTransform;
use crate::core::utils::geometry::BoundingBox;
use itertools::Itertools;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};

#[derive(Debug, Default)]
struct SearchStats {
    explored: usize,
    culled: usize,
    redundant: usize,
    visited: usize,
}

/// How many chain pairs of one copy were in contact.
#[derive(Debug, Clone, Copy)]
struct Coverage {
    with_contacts: usize,
    total: usize,
}

impl Coverage {
    fn is_full(&self) -> bool {
        self.total > 0 && self.with_contacts == self.total
    }
}

/// Discovers every chain-chain contact of a crystal.
///
/// The search runs in three stages: chain pairs inside the deposited
/// asymmetric unit, then the other copies of the unit cell, then the copies
/// in neighboring cells. Copies whose boxes cannot reach the deposited unit
/// are culled, and a copy whose transform inverts an already fully explored
/// one is skipped, since it would only reproduce those interfaces seen from
/// the other side.
#[derive(Debug)]
pub struct InterfaceEnumerator<'a> {
    templates: Vec<Arc<ChainTemplate>>,
    crystal: Option<&'a Crystal>,
    search: &'a SearchConfig,
    builder: ContactGraphBuilder,
}

impl<'a> InterfaceEnumerator<'a> {
    /// A crystal with a placeholder cell is treated as no crystal.
    pub fn new(
        templates: Vec<ChainTemplate>,
        crystal: Option<&'a Crystal>,
        search: &'a SearchConfig,
    ) -> Self {
        Self {
            templates: templates.into_iter().map(Arc::new).collect(),
            crystal: crystal.filter(|c| !c.cell.is_dummy()),
            search,
            builder: ContactGraphBuilder::new(search.cutoff),
        }
    }

    pub fn templates(&self) -> &[Arc<ChainTemplate>] {
        &self.templates
    }

    /// Returns every chain pair in contact, possibly with structural
    /// duplicates.
    #[instrument(skip_all, name = "interface_enumeration")]
    pub fn enumerate(&self, reporter: &ProgressReporter) -> Result<Vec<ChainInterface>, EngineError> {
        let originals: Vec<PlacedChain> = self
            .templates
            .iter()
            .map(|t| PlacedChain::original(t.clone()))
            .collect();
        let mut found = Vec::new();
        let Some(reference_bounds) = BoundingBox::union_all(originals.iter().map(|c| c.bounds()))
        else {
            info!("No chains selected; nothing to enumerate.");
            return Ok(found);
        };

        for pair in originals.iter().combinations(2) {
            self.test_pair(pair[0], pair[1], &mut found);
        }
        info!(
            chains = originals.len(),
            interfaces = found.len(),
            "Searched the asymmetric unit."
        );

        let Some(crystal) = self.crystal else {
            info!("No crystal lattice; skipping symmetry search.");
            return Ok(found);
        };

        let enumerator = SymmetryEnumerator::new(crystal);
        let unit_cell = enumerator.expand_unit_cell(&self.templates)?;
        let mut log = VisitedLog::new();
        let mut stats = SearchStats::default();

        for copy in unit_cell.copies().iter().skip(1) {
            if self.skip_redundant(copy.transform(), &mut log, &mut stats) {
                continue;
            }
            let coverage = self.explore_copy(&originals, copy, &mut found);
            self.record_if_complete(copy.transform(), coverage, &mut log, &mut stats);
        }

        let translations = SymmetryEnumerator::neighboring_cells(self.search.shell_radius);
        reporter.report(Progress::TaskStart {
            total: (translations.len() * unit_cell.num_copies()) as u64,
        });
        for translation in &translations {
            if !enumerator.can_reach(&unit_cell, translation, self.search.cutoff) {
                stats.culled += unit_cell.num_copies();
                reporter.report(Progress::TaskIncrement {
                    amount: unit_cell.num_copies() as u64,
                });
                continue;
            }
            for copy in unit_cell.copies() {
                reporter.report(Progress::TaskIncrement { amount: 1 });

                let moved_bounds = enumerator.translated_bounds(copy, translation);
                if !reference_bounds.overlaps(&moved_bounds, self.search.cutoff) {
                    stats.culled += 1;
                    continue;
                }

                let transform = copy.transform().translated(translation, &crystal.cell);
                if self.skip_redundant(&transform, &mut log, &mut stats) {
                    continue;
                }

                let Some(moved) = enumerator.place_copy(&self.templates, transform) else {
                    continue;
                };
                if !reaches_any_chain(&originals, &moved, self.search.cutoff) {
                    stats.culled += 1;
                    continue;
                }

                let coverage = self.explore_copy(&originals, &moved, &mut found);
                self.record_if_complete(moved.transform(), coverage, &mut log, &mut stats);
            }
        }
        reporter.report(Progress::TaskFinish);

        info!(
            operators = unit_cell.num_copies(),
            translations = translations.len(),
            explored = stats.explored,
            culled = stats.culled,
            redundant = stats.redundant,
            visited = stats.visited,
            candidates = found.len(),
            "Finished symmetry search."
        );
        Ok(found)
    }

    fn test_pair(&self, first: &PlacedChain, second: &PlacedChain, found: &mut Vec<ChainInterface>) -> bool {
        if !first.bounds().overlaps(second.bounds(), self.search.cutoff) {
            return false;
        }
        let graph = self.builder.build_between(first.positions(), second.positions());
        trace!(
            first = %first.code(),
            second = %second.code(),
            operator_id = second.transform().operator_id(),
            contacts = graph.num_contacts(),
            "Tested chain pair."
        );
        if graph.is_empty() {
            return false;
        }
        found.push(ChainInterface::new(first.clone(), second.clone(), graph));
        true
    }

    /// Tests every deposited chain against every chain of `copy`.
    fn explore_copy(
        &self,
        originals: &[PlacedChain],
        copy: &AsymmetricUnitCopy,
        found: &mut Vec<ChainInterface>,
    ) -> Coverage {
        let mut with_contacts = 0;
        for first in originals {
            for second in copy.chains() {
                if self.test_pair(first, second, found) {
                    with_contacts += 1;
                }
            }
        }
        Coverage {
            with_contacts,
            total: originals.len() * copy.chains().len(),
        }
    }

    fn skip_redundant(
        &self,
        transform: &SymmetryTransform,
        log: &mut VisitedLog,
        stats: &mut SearchStats,
    ) -> bool {
        stats.explored += 1;
        if !self.search.redundancy_elimination {
            return false;
        }
        match is_redundant(transform, log) {
            Some(index) => {
                log.mark_partner_matched(index);
                stats.redundant += 1;
                debug!(
                    operator_id = transform.operator_id(),
                    translation = ?transform.translation().as_slice(),
                    "Skipping inverse of a fully explored transform."
                );
                true
            }
            None => false,
        }
    }

    /// Only a transform whose every chain pair produced contacts is logged;
    /// its inverse can then be skipped.
    fn record_if_complete(
        &self,
        transform: &SymmetryTransform,
        coverage: Coverage,
        log: &mut VisitedLog,
        stats: &mut SearchStats,
    ) {
        if !self.search.redundancy_elimination || !coverage.is_full() {
            return;
        }
        debug!(
            operator_id = transform.operator_id(),
            translation = ?transform.translation().as_slice(),
            pairs = coverage.total,
            "Transform fully explored."
        );
        log.record(transform.clone());
        stats.visited += 1;
    }
}

/// Whether some chain of `copy` comes within `cutoff` of some deposited
/// chain, judged by their boxes.
fn reaches_any_chain(originals: &[PlacedChain], copy: &AsymmetricUnitCopy, cutoff: f64) -> bool {
    copy.chains().iter().any(|placed| {
        originals
            .iter()
            .any(|original| original.bounds().overlaps(placed.bounds(), cutoff))
    })
}
