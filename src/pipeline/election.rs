//! Senate election results: cleaning, two-party reclassification and
//! per-state summaries
//!
//! One source file holds one election year. Candidates are folded into a
//! binary Democrat/Republican model and summed per state into a signed
//! margin (`net_votes`, Republican minus Democrat).

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use super::error::{PipelineError, PipelineResult};
use super::key::StateYear;
use super::loader::{
    is_blank, load_string_table, parse_vote_count, require_columns, string_column,
    year_from_file_name,
};

pub const STATE_COLUMN: &str = "STATE ABBREVIATION";
pub const DISTRICT_COLUMN: &str = "D";
pub const CANDIDATE_COLUMN: &str = "CANDIDATE NAME";
pub const PARTY_COLUMN: &str = "PARTY";
pub const GENERAL_VOTES_COLUMN: &str = "GENERAL VOTES";
pub const COMBINED_TOTAL_COLUMN: &str = "COMBINED GE PARTY TOTALS (CT, NY, SC)";
pub const WINNER_COLUMN: &str = "GE WINNER INDICATOR";

/// The seven fields every election file must carry.
pub const ELECTION_COLUMNS: [&str; 7] = [
    STATE_COLUMN,
    DISTRICT_COLUMN,
    CANDIDATE_COLUMN,
    PARTY_COLUMN,
    GENERAL_VOTES_COLUMN,
    COMBINED_TOTAL_COLUMN,
    WINNER_COLUMN,
];

/// District marker of a Senate race.
const SENATE_TAG: &str = "S";
/// Value of the winner indicator for the general-election winner.
const WINNER_FLAG: &str = "W";
/// Working Families party, counted with the Democrats.
const WORKING_FAMILIES: &str = "WF";
/// Nonpartisan-ballot Democrat prefix.
const NONPARTISAN_DEMOCRAT: &str = "N(D)";
/// Declined to state. Starts with "D" but is not a Democrat.
const DECLINED_TO_STATE: &str = "DTS";

/// Binary party after reclassification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Party {
    D,
    R,
}

impl Party {
    /// Collapse a free-text party label into the two-party model.
    pub fn classify(label: &str) -> Party {
        let label = label.trim();
        if label == DECLINED_TO_STATE {
            return Party::R;
        }
        if label == WORKING_FAMILIES
            || label.starts_with(NONPARTISAN_DEMOCRAT)
            || label.starts_with('D')
        {
            Party::D
        } else {
            Party::R
        }
    }
}

/// Winning party of a state's Senate race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Winner {
    #[serde(rename = "DEM")]
    Dem,
    #[serde(rename = "REP")]
    Rep,
}

impl Winner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Winner::Dem => "DEM",
            Winner::Rep => "REP",
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate row as it appears in the source file.
#[derive(Debug, Clone, Default)]
pub struct ElectionRecord {
    pub state: Option<String>,
    pub district: Option<String>,
    pub candidate: Option<String>,
    pub party: Option<String>,
    pub general_votes: Option<String>,
    pub combined_total: Option<String>,
    pub winner: Option<String>,
}

impl ElectionRecord {
    /// A Senate candidate with a reported vote count and a party label.
    pub fn is_senate_candidate(&self) -> bool {
        !is_blank(self.general_votes.as_deref())
            && self
                .district
                .as_deref()
                .map(|d| d.contains(SENATE_TAG))
                .unwrap_or(false)
            && !is_blank(self.party.as_deref())
    }

    /// Combined party total when reported, otherwise the raw general votes.
    pub fn effective_votes(&self) -> Option<f64> {
        self.combined_total
            .as_deref()
            .and_then(parse_vote_count)
            .or_else(|| self.general_votes.as_deref().and_then(parse_vote_count))
    }

    pub fn is_winner(&self) -> bool {
        self.winner
            .as_deref()
            .map(|w| w.trim() == WINNER_FLAG)
            .unwrap_or(false)
    }
}

/// A cleaned candidate row.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedElectionRow {
    pub year: i32,
    pub state: String,
    pub candidate: String,
    pub party: Party,
    pub votes: Option<f64>,
    pub winner: bool,
}

/// Per-state, per-year result in wide form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectionSummary {
    pub key: StateYear,
    pub votes_r: Option<f64>,
    pub votes_d: Option<f64>,
    pub net_votes: Option<f64>,
    pub total_votes: f64,
    pub winner: Winner,
}

impl ElectionSummary {
    /// Both parties fielded a candidate, so the margin is defined.
    pub fn is_contested(&self) -> bool {
        self.net_votes.is_some()
    }
}

/// Read the seven required fields of an election file.
pub fn read_election_records(path: &Path) -> PipelineResult<Vec<ElectionRecord>> {
    let df = load_string_table(path)?;
    require_columns(&df, path, &ELECTION_COLUMNS)?;

    let states = string_column(&df, STATE_COLUMN)?;
    let districts = string_column(&df, DISTRICT_COLUMN)?;
    let candidates = string_column(&df, CANDIDATE_COLUMN)?;
    let parties = string_column(&df, PARTY_COLUMN)?;
    let general = string_column(&df, GENERAL_VOTES_COLUMN)?;
    let combined = string_column(&df, COMBINED_TOTAL_COLUMN)?;
    let winners = string_column(&df, WINNER_COLUMN)?;

    let records = (0..df.height())
        .map(|i| ElectionRecord {
            state: states[i].clone(),
            district: districts[i].clone(),
            candidate: candidates[i].clone(),
            party: parties[i].clone(),
            general_votes: general[i].clone(),
            combined_total: combined[i].clone(),
            winner: winners[i].clone(),
        })
        .collect();

    Ok(records)
}

/// Filter Senate candidates, reclassify parties and drop repeated
/// candidates (first occurrence wins).
pub fn normalize_records(year: i32, records: &[ElectionRecord]) -> Vec<NormalizedElectionRow> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut rows = Vec::new();
    let mut unparsed = 0usize;

    for record in records.iter().filter(|r| r.is_senate_candidate()) {
        let state = record.state.as_deref().unwrap_or("").trim().to_string();
        let candidate = record.candidate.as_deref().unwrap_or("").trim().to_string();

        if !seen.insert((state.clone(), candidate.clone())) {
            continue;
        }

        let votes = record.effective_votes();
        if votes.is_none() {
            unparsed += 1;
        }

        rows.push(NormalizedElectionRow {
            year,
            state,
            candidate,
            party: Party::classify(record.party.as_deref().unwrap_or("")),
            votes,
            winner: record.is_winner(),
        });
    }

    if unparsed > 0 {
        debug!("{} election row(s) in {} have no numeric vote count", unparsed, year);
    }

    rows
}

#[derive(Debug, Default)]
struct PartyTally {
    present: bool,
    votes: Option<f64>,
    winner: bool,
}

impl PartyTally {
    fn add(&mut self, row: &NormalizedElectionRow) {
        self.present = true;
        self.votes = match (self.votes, row.votes) {
            (Some(a), Some(b)) => Some(a + b),
            (a, b) => a.or(b),
        };
        self.winner |= row.winner;
    }
}

/// Sum votes per (year, state, party) and pivot into one row per state.
pub fn summarize(rows: &[NormalizedElectionRow]) -> Vec<ElectionSummary> {
    let mut tallies: BTreeMap<StateYear, [PartyTally; 2]> = BTreeMap::new();

    for row in rows {
        let entry = tallies
            .entry(StateYear::new(row.year, row.state.clone()))
            .or_default();
        let slot = match row.party {
            Party::D => 0,
            Party::R => 1,
        };
        entry[slot].add(row);
    }

    tallies
        .into_iter()
        .map(|(key, [dem, rep])| {
            let votes_d = if dem.present { dem.votes } else { None };
            let votes_r = if rep.present { rep.votes } else { None };
            let net_votes = match (votes_r, votes_d) {
                (Some(r), Some(d)) => Some(r - d),
                _ => None,
            };
            ElectionSummary {
                key,
                votes_r,
                votes_d,
                net_votes,
                total_votes: votes_r.unwrap_or(0.0) + votes_d.unwrap_or(0.0),
                winner: if rep.winner { Winner::Rep } else { Winner::Dem },
            }
        })
        .collect()
}

/// Build the state summaries of a single election file.
pub fn build_election_summary(path: &Path) -> PipelineResult<Vec<ElectionSummary>> {
    let year = year_from_file_name(path)?;
    let records = read_election_records(path)?;
    let rows = normalize_records(year, &records);
    debug!(
        "{}: {} source rows, {} Senate candidates",
        path.display(),
        records.len(),
        rows.len()
    );
    Ok(summarize(&rows))
}

/// Build and concatenate the summaries of every election file.
pub fn load_election_summaries(files: &[PathBuf]) -> PipelineResult<Vec<ElectionSummary>> {
    let mut by_key: BTreeMap<StateYear, ElectionSummary> = BTreeMap::new();

    for path in files {
        for summary in build_election_summary(path)? {
            if by_key.contains_key(&summary.key) {
                return Err(PipelineError::DuplicateKey {
                    key: summary.key.to_string(),
                });
            }
            by_key.insert(summary.key.clone(), summary);
        }
    }

    Ok(by_key.into_values().collect())
}
