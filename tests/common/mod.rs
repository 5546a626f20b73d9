//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

use senatax::pipeline::SourcePaths;

/// Header of an election results file, in source order.
pub const ELECTION_HEADER: [&str; 7] = [
    "STATE ABBREVIATION",
    "D",
    "CANDIDATE NAME",
    "PARTY",
    "GENERAL VOTES",
    "COMBINED GE PARTY TOTALS (CT, NY, SC)",
    "GE WINNER INDICATOR",
];

/// Structural columns of an income file plus three value fields.
pub const INCOME_HEADER: [&str; 9] = [
    "STATEFIPS", "STATE", "zipcode", "agi_stub", "N1", "A00100", "N02650", "A02650", "A00200",
];

pub const STATES: [&str; 24] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS",
];

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// Write a CSV file with every cell quoted.
pub fn write_csv<S: AsRef<str>>(path: &Path, header: &[&str], rows: &[Vec<S>]) -> PathBuf {
    let mut out = String::new();
    let head: Vec<String> = header.iter().map(|h| quote(h)).collect();
    writeln!(out, "{}", head.join(",")).unwrap();
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| quote(c.as_ref())).collect();
        writeln!(out, "{}", cells.join(",")).unwrap();
    }
    std::fs::write(path, out).unwrap();
    path.to_path_buf()
}

/// One election candidate row: state, district, name, party, votes,
/// combined total, winner flag.
pub fn candidate(
    state: &str,
    district: &str,
    name: &str,
    party: &str,
    votes: &str,
    combined: &str,
    winner: &str,
) -> Vec<String> {
    [state, district, name, party, votes, combined, winner]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn write_election_file(dir: &Path, file_name: &str, rows: &[Vec<String>]) -> PathBuf {
    write_csv(&dir.join(file_name), &ELECTION_HEADER, rows)
}

/// The two-candidate Ohio race used in several scenarios.
pub fn ohio_rows() -> Vec<Vec<String>> {
    vec![
        candidate("OH", "S", "Dem Candidate", "D", "100", "", ""),
        candidate("OH", "S", "Rep Candidate", "R", "150", "", "W"),
    ]
}

/// A fresh temporary directory with `elections/`, `income/` and a field map.
pub struct Fixture {
    pub dir: TempDir,
    pub elections: PathBuf,
    pub income: PathBuf,
    pub field_map: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let elections = dir.path().join("elections");
        let income = dir.path().join("income");
        std::fs::create_dir_all(&elections).unwrap();
        std::fs::create_dir_all(&income).unwrap();

        let field_map = dir.path().join("field_map.csv");
        write_csv(
            &field_map,
            &["code", "label"],
            &[
                vec!["N02650", "returns_total_income"],
                vec!["A02650", "total_income"],
                vec!["A00200", "wages"],
            ],
        );

        Fixture {
            dir,
            elections,
            income,
            field_map,
        }
    }

    pub fn paths(&self) -> SourcePaths {
        SourcePaths {
            elections_dir: self.elections.clone(),
            income_dir: self.income.clone(),
            field_map: self.field_map.clone(),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("output")
    }
}

fn with_thousands(value: f64) -> String {
    let digits = format!("{}", value.round() as i64);
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Income rows of one state: six state-level bracket rows (zip written as
/// "0" to exercise padding) and one zip-level row that must be ignored.
fn income_rows(state: &str, fips: usize, rng: &mut StdRng, extra: Option<&str>) -> (Vec<Vec<String>>, f64) {
    let mut rows = Vec::new();
    let mut total_hh = 0.0;
    let mut total_agi = 0.0;
    let size = 1000.0 + 500.0 * fips as f64;

    for bracket in 1..=6 {
        let b = bracket as f64;
        let households = (size * (7.0 - b) * (0.8 + 0.4 * rng.gen::<f64>())).round();
        let agi = (households * (15.0 + 25.0 * b) * (0.7 + 0.6 * rng.gen::<f64>())).round();
        let returns_total = (households * (0.9 + 0.1 * rng.gen::<f64>())).round();
        let total_income = (agi * (1.05 + 0.1 * rng.gen::<f64>())).round();
        let wages = (agi * (0.5 + 0.4 * rng.gen::<f64>())).round();
        total_hh += households;
        total_agi += agi;

        let mut row = vec![
            fips.to_string(),
            state.to_string(),
            "0".to_string(),
            bracket.to_string(),
            households.to_string(),
            agi.to_string(),
            returns_total.to_string(),
            total_income.to_string(),
            wages.to_string(),
        ];
        if extra.is_some() {
            row.push("1".to_string());
        }
        rows.push(row);
    }

    let mut zip_row = vec![
        fips.to_string(),
        state.to_string(),
        "35004".to_string(),
        "1".to_string(),
        "10".to_string(),
        "20".to_string(),
        "10".to_string(),
        "25".to_string(),
        "15".to_string(),
    ];
    if extra.is_some() {
        zip_row.push("1".to_string());
    }
    rows.push(zip_row);

    (rows, total_agi / total_hh)
}

/// Write a realistic multi-state, multi-year dataset into `fixture`.
///
/// The first year's income file carries an extra column that the other
/// years lack, so it must disappear in the column intersection.
pub fn write_synthetic_dataset(fixture: &Fixture, years: &[i32]) {
    for (y, year) in years.iter().enumerate() {
        let extra = (y == 0).then_some("N99999");
        let mut income = Vec::new();
        let mut elections = Vec::new();

        for (k, state) in STATES.iter().enumerate() {
            let mut rng = StdRng::seed_from_u64((*year as u64) * 100 + k as u64);
            let (rows, ratio) = income_rows(state, k + 1, &mut rng, extra);
            income.extend(rows);

            let dem = 150_000.0 + 3_000.0 * ratio * (0.6 + 0.8 * rng.gen::<f64>());
            let rep = 150_000.0 + 500_000.0 * rng.gen::<f64>();
            let (dem_flag, rep_flag) = if rep > dem { ("", "W") } else { ("W", "") };

            elections.push(candidate(
                state,
                "S",
                &format!("{state} Democrat"),
                "D",
                &with_thousands(dem),
                "",
                dem_flag,
            ));
            elections.push(candidate(
                state,
                "S",
                &format!("{state} Republican"),
                "R",
                &with_thousands(rep),
                "",
                rep_flag,
            ));
            // House races and unreported candidates are filtered out.
            elections.push(candidate(state, "01", "House Member", "D", "99,999", "", "W"));
            elections.push(candidate(state, "S", "Write In", "W(R)", "", "", ""));
        }

        let mut header: Vec<&str> = INCOME_HEADER.to_vec();
        if let Some(column) = extra {
            header.push(column);
        }
        write_csv(
            &fixture.income.join(format!("{year}zpallagi_{year}.csv")),
            &header,
            &income,
        );
        write_election_file(
            &fixture.elections,
            &format!("federalelections{year}_{year}.csv"),
            &elections,
        );
    }
}

/// Fixture holding the synthetic dataset for 2016 and 2018.
pub fn synthetic_fixture() -> Fixture {
    let fixture = Fixture::new();
    write_synthetic_dataset(&fixture, &[2016, 2018]);
    fixture
}
