use crate::config::options::parse_index_list;
use crate::config::OverrideMode;
use crate::error::Result;
use std::collections::{BTreeSet, VecDeque};
use std::io::{BufRead, Write};
use tracing::debug;

use super::plan::OverrideCandidate;

/// Which override candidates were accepted, by 0-based position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decisions {
    accepted: BTreeSet<usize>,
}

impl Decisions {
    pub fn reject_all() -> Self {
        Self::default()
    }

    pub fn accept_all(total: usize) -> Self {
        Self {
            accepted: (0..total).collect(),
        }
    }

    /// Keep only indexes that point at an existing candidate.
    pub fn from_indexes(indexes: impl IntoIterator<Item = usize>, total: usize) -> Self {
        Self {
            accepted: indexes.into_iter().filter(|i| *i < total).collect(),
        }
    }

    pub fn is_accepted(&self, index: usize) -> bool {
        self.accepted.contains(&index)
    }

    pub fn accepted(&self) -> impl Iterator<Item = usize> + '_ {
        self.accepted.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

/// Answers the questions a run cannot decide on its own.
///
/// Questions arrive strictly in candidate order, one at a time.
pub trait DecisionResolver {
    /// Pick a mode when none was supplied up front.
    fn choose_mode(&mut self, candidates: &[OverrideCandidate]) -> Result<OverrideMode>;

    /// Confirm a single candidate; `number` is 1-based.
    fn confirm(&mut self, number: usize, candidate: &OverrideCandidate) -> Result<bool>;
}

/// Turn a mode (pre-supplied or asked for) into a decision set.
pub fn resolve_decisions(
    candidates: &[OverrideCandidate],
    mode: Option<&OverrideMode>,
    resolver: &mut dyn DecisionResolver,
) -> Result<Decisions> {
    if candidates.is_empty() {
        return Ok(Decisions::reject_all());
    }

    let mode = match mode {
        Some(mode) => mode.clone(),
        None => resolver.choose_mode(candidates)?,
    };
    debug!(?mode, candidates = candidates.len(), "resolving override candidates");

    let decisions = match mode {
        OverrideMode::AcceptAll => Decisions::accept_all(candidates.len()),
        OverrideMode::RejectAll => Decisions::reject_all(),
        OverrideMode::Select(indexes) => Decisions::from_indexes(indexes, candidates.len()),
        OverrideMode::ConfirmEach => {
            let mut accepted = BTreeSet::new();
            for (index, candidate) in candidates.iter().enumerate() {
                if resolver.confirm(index + 1, candidate)? {
                    accepted.insert(index);
                }
            }
            Decisions { accepted }
        }
    };
    Ok(decisions)
}

/// Pre-scripted answers, for non-interactive runs and tests.
#[derive(Debug, Clone)]
pub struct ScriptedResolver {
    mode: OverrideMode,
    answers: VecDeque<bool>,
}

impl Default for ScriptedResolver {
    fn default() -> Self {
        Self::new(OverrideMode::RejectAll)
    }
}

impl ScriptedResolver {
    pub fn new(mode: OverrideMode) -> Self {
        Self {
            mode,
            answers: VecDeque::new(),
        }
    }

    /// Answers handed out to `confirm` in order; exhausted answers read as "no".
    pub fn with_answers(mut self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.answers.extend(answers);
        self
    }
}

impl DecisionResolver for ScriptedResolver {
    fn choose_mode(&mut self, _candidates: &[OverrideCandidate]) -> Result<OverrideMode> {
        Ok(self.mode.clone())
    }

    fn confirm(&mut self, _number: usize, _candidate: &OverrideCandidate) -> Result<bool> {
        Ok(self.answers.pop_front().unwrap_or(false))
    }
}

/// Line-based terminal prompts. End of input reads as "no".
pub struct PromptResolver<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_lowercase())
    }
}

impl<R: BufRead, W: Write> DecisionResolver for PromptResolver<R, W> {
    fn choose_mode(&mut self, candidates: &[OverrideCandidate]) -> Result<OverrideMode> {
        writeln!(
            self.output,
            "\n{} override candidate(s): a=accept all, n=skip all, y=confirm each, s=select by number",
            candidates.len()
        )?;
        let answer = self.ask("Choose [a/n/y/s]: ")?;
        if answer == "s" {
            let list = self.ask("Numbers, comma separated (e.g. 1,3,8): ")?;
            return Ok(OverrideMode::Select(parse_index_list(&list)));
        }
        Ok(OverrideMode::parse(&answer))
    }

    fn confirm(&mut self, number: usize, candidate: &OverrideCandidate) -> Result<bool> {
        let question = format!(
            "[{}] {} ({}) overwrite? [y/N] ",
            number,
            candidate.key,
            candidate.changed_locales.join(", ")
        );
        Ok(self.ask(&question)? == "y")
    }
}
