//! Fragments harvested from programs that already solved a task.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::emit::{Emit, Emitter};
use crate::encoding::{Encode, Encoder, EncodingTable};
use crate::program::Program;
use crate::traverse::{fragments, StructuralSize};
use crate::tree::{Expression, Statement};
use crate::types::{NameStyle, Type};
use crate::usefulness::{expression_usefulness, statement_usefulness};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Fragment {
    Expr(Expression),
    Stmt(Statement),
}

impl Fragment {
    pub fn usefulness(&self, program: &Program) -> f64 {
        match self {
            Fragment::Expr(e) => expression_usefulness(e, program),
            Fragment::Stmt(s) => statement_usefulness(s, program),
        }
    }
}

impl StructuralSize for Fragment {
    fn size(&self) -> usize {
        match self {
            Fragment::Expr(e) => e.size(),
            Fragment::Stmt(s) => s.size(),
        }
    }
}

impl Encode for Fragment {
    fn encode(&self, e: &mut Encoder) {
        match self {
            Fragment::Expr(expr) => {
                e.tag('E');
                expr.encode(e);
            }
            Fragment::Stmt(s) => {
                e.tag('S');
                s.encode(e);
            }
        }
    }
}

impl Emit for Fragment {
    fn emit(&self, e: &mut Emitter) {
        match self {
            Fragment::Expr(expr) => expr.emit(e),
            Fragment::Stmt(s) => {
                // fragments are shown flush left whatever depth they were mined at
                let mut s = s.clone();
                s.indent = 0;
                s.emit(e);
            }
        }
    }
}

/// Programs remembered from earlier successes and the distinct fragments
/// harvested from them.
#[derive(Debug, Default)]
pub struct FragmentCorpus {
    programs: Vec<Program>,
    fragments: Vec<Fragment>,
    seen: HashSet<String>,
}

impl FragmentCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a copy of `program` and harvests its fragments. Fragments whose
    /// canonical encoding was already seen are dropped. Returns how many new
    /// fragments were added.
    pub fn remember(&mut self, program: &Program, table: &mut EncodingTable) -> usize {
        let harvested = fragments(program);
        let candidates = harvested
            .statements
            .into_iter()
            .map(|s| Fragment::Stmt(s.clone()))
            .chain(harvested.expressions.into_iter().map(|e| Fragment::Expr(e.clone())));
        let before = self.fragments.len();
        for fragment in candidates {
            if self.seen.insert(fragment.encoded(table)) {
                self.fragments.push(fragment);
            }
        }
        self.programs.push(program.clone());
        let added = self.fragments.len() - before;
        debug!(program = %program.name, added, total = self.fragments.len(), "remembered program");
        added
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Stmt(s) => Some(s),
            Fragment::Expr(_) => None,
        })
    }

    /// Expression fragments producing a value of `ty`.
    pub fn expressions_of_type<'a>(&'a self, ty: &'a Type) -> impl Iterator<Item = &'a Expression> {
        self.fragments.iter().filter_map(move |f| match f {
            Fragment::Expr(e) if e.ty() == *ty => Some(e),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Average usefulness of `fragments` against `program`; 0 when there are none.
pub fn mean_usefulness(fragments: &[Fragment], program: &Program, verbose: u8) -> f64 {
    if fragments.is_empty() {
        return 0.0;
    }
    let total: f64 = fragments
        .iter()
        .map(|f| {
            let u = f.usefulness(program);
            if verbose > 2 {
                trace!(usefulness = u, fragment = %f.render(NameStyle::Simple), "fragment usefulness");
            }
            u
        })
        .sum();
    total / fragments.len() as f64
}
