//! Periodic population reports.
//!
//! Every `report_period` days a `Report` action hands the six population
//! counters to each registered [`ReportSink`]. A sink that fails is logged
//! and the simulation carries on.

use std::fs::{create_dir_all, File};
use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};

use csv::Writer;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::context::{Action, Context};
use crate::error::EpisimError;
use crate::parameters::ContextParametersExt;
use crate::people::PopulationCounts;

pub trait ReportSink {
    /// Records the counters as they stand at `time`.
    ///
    /// # Errors
    ///
    /// Returns an `EpisimError` if the sink cannot be written.
    fn record(&mut self, time: f64, counts: &PopulationCounts) -> Result<(), EpisimError>;
}

/// Writes one human-readable line per report.
pub struct ConsoleReport<W: Write> {
    writer: W,
}

impl ConsoleReport<Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        ConsoleReport::new(io::stdout())
    }
}

impl<W: Write> ConsoleReport<W> {
    pub fn new(writer: W) -> Self {
        ConsoleReport { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for ConsoleReport<W> {
    fn record(&mut self, time: f64, counts: &PopulationCounts) -> Result<(), EpisimError> {
        writeln!(
            self.writer,
            "at {time}, un = {}, lat = {}, inf = {}, bed = {}, rec = {}, dead = {}",
            counts.uninfected,
            counts.latent,
            counts.infectious,
            counts.bedridden,
            counts.recovered,
            counts.dead
        )?;
        Ok(())
    }
}

/// Where file reports go and whether an existing file may be replaced.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportOptions {
    pub file_prefix: String,
    pub output_dir: PathBuf,
    pub overwrite: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            file_prefix: String::new(),
            output_dir: PathBuf::from("."),
            overwrite: false,
        }
    }
}

impl ReportOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_prefix(&mut self, file_prefix: String) -> &mut Self {
        self.file_prefix = file_prefix;
        self
    }

    pub fn directory(&mut self, directory: PathBuf) -> &mut Self {
        self.output_dir = directory;
        self
    }

    pub fn overwrite(&mut self, overwrite: bool) -> &mut Self {
        self.overwrite = overwrite;
        self
    }

    /// Full path of the report file named `short_name`.
    #[must_use]
    pub fn path_for(&self, short_name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}{short_name}.csv", self.file_prefix))
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct CountsRow {
    pub time: f64,
    pub uninfected: usize,
    pub latent: usize,
    pub infectious: usize,
    pub bedridden: usize,
    pub recovered: usize,
    pub dead: usize,
}

impl CountsRow {
    fn new(time: f64, counts: &PopulationCounts) -> Self {
        CountsRow {
            time,
            uninfected: counts.uninfected,
            latent: counts.latent,
            infectious: counts.infectious,
            bedridden: counts.bedridden,
            recovered: counts.recovered,
            dead: counts.dead,
        }
    }
}

/// Writes a `counts.csv` file with one [`CountsRow`] per report.
pub struct CsvReport {
    writer: Writer<File>,
}

// Creates the file and all parent directories, unless the file exists and
// `overwrite` is off.
fn create_report_file(path: &Path, overwrite: bool) -> Result<File, EpisimError> {
    if !overwrite && path.exists() {
        return Err(EpisimError::ReportError(format!(
            "{} already exists; use overwrite to replace it",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

impl CsvReport {
    /// # Errors
    ///
    /// Returns an `EpisimError` if the file exists and `options.overwrite` is
    /// false, or if it cannot be created.
    pub fn create(options: &ReportOptions) -> Result<Self, EpisimError> {
        let path = options.path_for("counts");
        debug!("writing counts to {}", path.display());
        let file = create_report_file(&path, options.overwrite)?;
        Ok(CsvReport {
            writer: Writer::from_writer(file),
        })
    }
}

impl ReportSink for CsvReport {
    fn record(&mut self, time: f64, counts: &PopulationCounts) -> Result<(), EpisimError> {
        self.writer.serialize(CountsRow::new(time, counts))?;
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct ReportData {
    sinks: Vec<Box<dyn ReportSink>>,
}

pub trait ContextReportExt {
    fn add_report_sink(&mut self, sink: impl ReportSink + 'static);

    /// Plans the first report at `start`; each report plans the next one
    /// `report_period` days later.
    fn schedule_reports(&mut self, start: f64);
}

impl ContextReportExt for Context {
    fn add_report_sink(&mut self, sink: impl ReportSink + 'static) {
        self.report_data.sinks.push(Box::new(sink));
    }

    fn schedule_reports(&mut self, start: f64) {
        self.add_plan(start, Action::Report);
    }
}

pub(crate) fn report(context: &mut Context) {
    let time = context.get_current_time();
    let counts = context.population_counts;
    for sink in &mut context.report_data.sinks {
        if let Err(e) = sink.record(time, &counts) {
            error!("failed to write report at {time}: {e}");
        }
    }
    let next = time + context.get_parameters().report_period;
    context.add_plan(next, Action::Report);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::{LogNormalParams, Parameters};
    use crate::people::ContextPeopleExt;
    use crate::places::ContextPlacesExt;
    use crate::plan::ExecutionPhase;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct SharedReport(Rc<RefCell<Vec<(f64, PopulationCounts)>>>);

    impl ReportSink for SharedReport {
        fn record(&mut self, time: f64, counts: &PopulationCounts) -> Result<(), EpisimError> {
            self.0.borrow_mut().push((time, *counts));
            Ok(())
        }
    }

    struct FailingReport;

    impl ReportSink for FailingReport {
        fn record(&mut self, _: f64, _: &PopulationCounts) -> Result<(), EpisimError> {
            Err(EpisimError::ReportError("disk full".to_string()))
        }
    }

    #[test]
    fn console_line_format() {
        let mut report = ConsoleReport::new(Vec::new());
        let counts = PopulationCounts {
            uninfected: 5,
            latent: 1,
            infectious: 2,
            bedridden: 0,
            recovered: 3,
            dead: 1,
        };
        report.record(2.0, &counts).unwrap();
        let output = String::from_utf8(report.into_inner()).unwrap();
        assert_eq!(
            output,
            "at 2, un = 5, lat = 1, inf = 2, bed = 0, rec = 3, dead = 1\n"
        );
    }

    #[test]
    fn reports_repeat_every_period() {
        let mut context = Context::new();
        let mut parameters = Parameters::default();
        parameters.disease.latent = LogNormalParams::new(10.0, 0.0);
        context.set_parameters(parameters).unwrap();
        let home = context.add_home_with_transmissivity(1.0);
        let person = context.add_person(home);
        context.add_person(home);
        let shared = SharedReport::default();
        context.add_report_sink(shared.clone());
        // A failing sink does not stop the others.
        context.add_report_sink(FailingReport);
        context.schedule_reports(0.0);
        context.add_plan(0.5, Action::Infect(person));
        context.add_plan_with_phase(3.0, Action::Shutdown, ExecutionPhase::Last);
        context.execute();

        let rows = shared.0.borrow();
        let times: Vec<f64> = rows.iter().map(|(time, _)| *time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(rows[0].1.uninfected, 2);
        assert_eq!(rows[1].1.uninfected, 1);
        assert_eq!(rows[3].1.latent, 1);
        for (_, counts) in rows.iter() {
            assert_eq!(counts.total(), 2);
        }
        assert_eq!(context.get_person_count(), 2);
        assert!(context.get_infection_status(person).ever_infected());
    }

    #[test]
    fn csv_report_writes_rows() {
        let temp_dir = tempdir().unwrap();
        let mut options = ReportOptions::new();
        options
            .file_prefix("run1_".to_string())
            .directory(temp_dir.path().join("nested"));
        let mut report = CsvReport::create(&options).unwrap();
        let counts = PopulationCounts {
            uninfected: 9,
            latent: 1,
            ..PopulationCounts::default()
        };
        report.record(0.0, &counts).unwrap();
        report.record(1.0, &counts).unwrap();

        let path = temp_dir.path().join("nested").join("run1_counts.csv");
        let mut reader = csv::Reader::from_path(path).unwrap();
        let rows: Vec<CountsRow> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], CountsRow::new(1.0, &counts));
    }

    #[test]
    fn csv_report_respects_overwrite() {
        let temp_dir = tempdir().unwrap();
        let mut options = ReportOptions::new();
        options.directory(temp_dir.path().to_path_buf());
        std::fs::write(options.path_for("counts"), "keep me").unwrap();

        let result = CsvReport::create(&options);
        assert!(matches!(result, Err(EpisimError::ReportError(_))));
        assert_eq!(
            std::fs::read_to_string(options.path_for("counts")).unwrap(),
            "keep me"
        );

        options.overwrite(true);
        let mut report = CsvReport::create(&options).unwrap();
        report.record(0.0, &PopulationCounts::default()).unwrap();
        let contents = std::fs::read_to_string(options.path_for("counts")).unwrap();
        assert!(contents.starts_with("time,uninfected,latent"));
    }
}
