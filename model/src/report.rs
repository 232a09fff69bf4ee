use std::fmt;
use std::time::Duration;

use crate::config::{Settings, SynthesisTask};
use crate::emit::Emit;
use crate::mining::{mean_usefulness, FragmentCorpus};
use crate::program::Program;
use crate::traverse::StructuralSize;
use crate::types::NameStyle;

/// Which search features a run had switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    FrAngel,
    Fragments,
    Angelic,
    Baseline,
}

impl Algorithm {
    pub fn from_settings(settings: &Settings) -> Self {
        match (settings.mine_fragments, settings.angelic_conditions) {
            (true, true) => Algorithm::FrAngel,
            (true, false) => Algorithm::Fragments,
            (false, true) => Algorithm::Angelic,
            (false, false) => Algorithm::Baseline,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Algorithm::FrAngel => "FrAngel",
            Algorithm::Fragments => "Fragments",
            Algorithm::Angelic => "Angelic",
            Algorithm::Baseline => "Baseline",
        };
        f.write_str(s)
    }
}

/// Candidate programs generated and executed by the search loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchCounters {
    pub generated: usize,
    pub ran: usize,
    pub angelic_generated: usize,
    pub angelic_ran: usize,
    pub non_angelic_generated: usize,
    pub non_angelic_ran: usize,
}

/// Summary of one synthesis attempt.
#[derive(Debug, Clone)]
pub struct SynthesisReport {
    pub task: SynthesisTask,
    pub success: bool,
    pub elapsed: Duration,
    /// Fully qualified rendering; empty on failure.
    pub program: String,
    pub simple_program: String,
    pub program_size: usize,
    pub algorithm: Algorithm,
    pub remembered_programs: usize,
    pub fragments: usize,
    /// Mean usefulness of the corpus against the solution.
    pub fragment_usefulness: f64,
    pub counters: SearchCounters,
    verbose: u8,
}

impl SynthesisReport {
    pub fn new(
        task: &SynthesisTask,
        settings: &Settings,
        solution: Option<&Program>,
        elapsed: Duration,
        corpus: Option<&FragmentCorpus>,
        counters: SearchCounters,
    ) -> Self {
        let render = |style: NameStyle| solution.map(|p| p.render(style)).unwrap_or_default();
        let corpus = corpus.filter(|_| settings.mine_fragments);
        let fragment_usefulness = match (corpus, solution) {
            (Some(c), Some(p)) => mean_usefulness(c.fragments(), p, settings.verbose),
            _ => 0.0,
        };
        Self {
            task: task.clone(),
            success: solution.is_some(),
            elapsed,
            program: render(NameStyle::Qualified),
            simple_program: render(NameStyle::Simple),
            program_size: solution.map_or(0, |p| p.size()),
            algorithm: Algorithm::from_settings(settings),
            remembered_programs: corpus.map_or(0, |c| c.programs().len()),
            fragments: corpus.map_or(0, FragmentCorpus::len),
            fragment_usefulness,
            counters,
            verbose: settings.verbose,
        }
    }

    fn fmt_counters(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.verbose <= 1 {
            return Ok(());
        }
        let c = &self.counters;
        writeln!(f, "All programs:     generated {}, ran {}", c.generated, c.ran)?;
        writeln!(
            f,
            "Only non-angelic: generated {}, ran {}",
            c.non_angelic_generated, c.non_angelic_ran
        )?;
        writeln!(f, "Only angelic:     generated {}, ran {}", c.angelic_generated, c.angelic_ran)
    }
}

impl fmt::Display for SynthesisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.task.name)?;
        if let Some(group) = &self.task.group {
            writeln!(f, "Group: {group}")?;
        }
        writeln!(f, "Success: {}", self.success)?;
        writeln!(f, "Time: {:.3} sec", self.elapsed.as_secs_f64())?;
        writeln!(f, "# Examples: {}", self.task.num_examples)?;
        writeln!(f, "# Components: {}", self.task.num_components)?;
        if self.success {
            writeln!(f, "Program Size: {}", self.program_size)?;
            self.fmt_counters(f)?;
            writeln!(f, "{}", self.program)
        } else {
            self.fmt_counters(f)
        }
    }
}
