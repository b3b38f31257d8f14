// core/src/collection.rs
//
// Samling av spor: filoppdagelse + parallell analyse (én rayon-oppgave per spor).
// Hvert spor har sin egen resultatplass, så ingen låsing trengs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::SegmentConfig;
use crate::error::HfError;
use crate::igc::{IgcReader, TrackReader};
use crate::logical::{aggregate, LogicalPhase};
use crate::metrics;
use crate::models::Track;
use crate::phase::Phase;
use crate::segmentation::{segment_detailed, Transition};
use crate::stats::{collection_stats, summary_stats, track_stats, CollectionStats, SummaryStats, TrackStats};

/// Alt vi vet om ett analysert spor.
#[derive(Debug, Clone)]
pub struct TrackAnalysis {
    pub track: Track,
    pub phases: Vec<Phase>,
    pub logical_phases: Vec<LogicalPhase>,
    pub transitions: Vec<Transition>,
    pub stats: Option<TrackStats>,
}

/// Segmenterer, aggregerer og beregner statistikk for ett spor.
pub fn analyze_track(track: Track, cfg: &SegmentConfig) -> Result<TrackAnalysis, HfError> {
    let seg = segment_detailed(&track.series, cfg)?;
    if let Some(m) = metrics::global() {
        m.record_segmentation(&seg);
    }

    let logical_phases = aggregate(&seg.phases);
    let stats = track_stats(&track.series, &seg.phases);
    log::info!(
        "{}: {} samples -> {} phases, {} logical",
        track.name,
        track.series.len(),
        seg.phases.len(),
        logical_phases.len()
    );

    Ok(TrackAnalysis {
        track,
        phases: seg.phases,
        logical_phases,
        transitions: seg.transitions,
        stats,
    })
}

fn is_igc(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("igc"))
}

/// Symlenker følges ikke, så en løkke i mappetreet gir ingen duplikater.
fn walk_dir(dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                log::warn!("skipping entry under {}: {err}", dir.display());
                continue;
            }
        };
        if entry.file_type().is_file() && is_igc(entry.path()) {
            out.push(entry.into_path());
        }
    }
}

fn absolute(path: PathBuf) -> Option<PathBuf> {
    match fs::canonicalize(&path) {
        Ok(p) => Some(p),
        Err(err) => {
            log::warn!("cannot resolve {}: {err}", path.display());
            None
        }
    }
}

/// Filer tas som de er; mapper gjennomsøkes rekursivt etter `*.igc`.
/// Stiene kanoniseres, sorteres og dedupliseres.
pub fn discover_files(targets: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for target in targets {
        if target.is_file() {
            found.push(target.clone());
        } else if target.is_dir() {
            walk_dir(target, &mut found);
        } else {
            log::warn!("target {} does not exist", target.display());
        }
    }
    let mut out: Vec<PathBuf> = found.into_iter().filter_map(absolute).collect();
    out.sort();
    out.dedup();
    out
}

fn record_failure() {
    if let Some(m) = metrics::global() {
        m.record_failure();
    }
}

pub struct TrackCollection {
    readers: Vec<Box<dyn TrackReader>>,
    cfg: SegmentConfig,
    tracks: BTreeMap<PathBuf, TrackAnalysis>,
}

impl TrackCollection {
    pub fn new(cfg: SegmentConfig) -> Self {
        Self::with_readers(vec![Box::new(IgcReader)], cfg)
    }

    pub fn with_readers(readers: Vec<Box<dyn TrackReader>>, cfg: SegmentConfig) -> Self {
        Self { readers, cfg, tracks: BTreeMap::new() }
    }

    pub fn config(&self) -> &SegmentConfig {
        &self.cfg
    }

    fn process(&self, path: &Path) -> Result<TrackAnalysis> {
        let reader = self
            .readers
            .iter()
            .find(|r| r.can_handle(path))
            .ok_or_else(|| HfError::NoReader(path.to_path_buf()))?;
        let track = reader
            .read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        analyze_track(track, &self.cfg).with_context(|| format!("failed to analyse {}", path.display()))
    }

    /// Leser og analyserer alle oppdagede filer parallelt. En fil som feiler
    /// logges og hoppes over. Returnerer antall nye spor.
    pub fn load(&mut self, targets: &[PathBuf]) -> usize {
        let todo: Vec<PathBuf> = discover_files(targets)
            .into_iter()
            .filter(|p| !self.tracks.contains_key(p))
            .collect();

        let this = &*self;
        let results: Vec<(PathBuf, Result<TrackAnalysis>)> = todo
            .par_iter()
            .map(|path| (path.clone(), this.process(path)))
            .collect();

        let mut added = 0usize;
        for (path, res) in results {
            match res {
                Ok(analysis) => {
                    self.tracks.insert(path, analysis);
                    added += 1;
                }
                Err(err) => {
                    record_failure();
                    log::error!("{err:#}");
                }
            }
        }
        added
    }

    /// Én fil, sekvensielt. Allerede lastet fil er en no-op.
    pub fn add_file(&mut self, path: &Path) -> Result<()> {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if self.tracks.contains_key(&key) {
            return Ok(());
        }
        match self.process(&key) {
            Ok(analysis) => {
                self.tracks.insert(key, analysis);
                Ok(())
            }
            Err(err) => {
                record_failure();
                Err(err)
            }
        }
    }

    /// Legger inn et allerede innlest spor (f.eks. fra JSON).
    pub fn insert_track(&mut self, key: PathBuf, track: Track) -> Result<(), HfError> {
        let analysis = analyze_track(track, &self.cfg)?;
        self.tracks.insert(key, analysis);
        Ok(())
    }

    /// Slår opp både på nøkkelen slik den er og på kanonisk sti.
    pub fn get(&self, path: &Path) -> Option<&TrackAnalysis> {
        self.tracks
            .get(path)
            .or_else(|| fs::canonicalize(path).ok().and_then(|p| self.tracks.get(&p)))
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.tracks.keys()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn selected<'a>(&'a self, filter: Option<&'a [PathBuf]>) -> impl Iterator<Item = &'a [Phase]> + 'a {
        self.tracks
            .iter()
            .filter(move |(path, _)| filter.map_or(true, |f| f.contains(*path)))
            .map(|(_, a)| a.phases.as_slice())
    }

    pub fn collection_stats(&self, filter: Option<&[PathBuf]>) -> CollectionStats {
        collection_stats(self.selected(filter))
    }

    pub fn summary_stats(&self, filter: Option<&[PathBuf]>) -> SummaryStats {
        summary_stats(self.selected(filter))
    }
}
