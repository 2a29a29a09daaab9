/// Instruction class relevant to witness matching. Everything the matcher
/// does not distinguish collapses into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Call,
    Branch,
    Return,
    Switch,
    Other,
}

/// Read-only view of the executor's position, passed to every query.
///
/// `previous` is the opcode of the prior step; Return waypoints may be
/// detected through it when the cursor has already advanced to the caller.
/// `branch_taken` is the direction chosen at a branch step, used by the
/// automaton monitor; `function` names the function a Return step leaves.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    pub file: &'a str,
    pub line: u64,
    pub column: u64,
    pub opcode: Opcode,
    pub callee: Option<&'a str>,
    pub function: Option<&'a str>,
    pub previous: Option<Opcode>,
    pub branch_taken: Option<bool>,
}

impl<'a> Cursor<'a> {
    pub fn new(file: &'a str, line: u64, column: u64, opcode: Opcode) -> Self {
        Cursor {
            file,
            line,
            column,
            opcode,
            callee: None,
            function: None,
            previous: None,
            branch_taken: None,
        }
    }

    pub fn with_callee(mut self, callee: &'a str) -> Self {
        self.callee = Some(callee);
        self
    }

    pub fn with_function(mut self, function: &'a str) -> Self {
        self.function = Some(function);
        self
    }

    pub fn with_previous(mut self, previous: Opcode) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn with_branch_taken(mut self, taken: bool) -> Self {
        self.branch_taken = Some(taken);
        self
    }
}
