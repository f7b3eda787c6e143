use super::info::AddressInfo;

//===========================================================================//

/// The kind of step requested by the debugger.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StepKind {
    /// Stop as soon as execution leaves the current source line, entering
    /// subroutine calls.
    In,
    /// Stop once execution leaves the current source line at the same or a
    /// shallower call depth.
    Over,
    /// Stop once the current subroutine returns.
    Out,
    /// Run until the program counter reaches the given address.
    ToAddress(u16),
}

//===========================================================================//

/// Per-request stepping state.  Created when a step begins and discarded
/// when the engine reports that it stopped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunFlags {
    kind: StepKind,
    start_depth: usize,
    start_line: Option<AddressInfo>,
    max_depth: usize,
    unmapped_steps: u64,
}

impl RunFlags {
    /// Begins a step of the given kind from the given call depth, inside the
    /// given source line (if the starting address maps to one).
    pub fn new(
        kind: StepKind,
        start_depth: usize,
        start_line: Option<AddressInfo>,
    ) -> RunFlags {
        RunFlags {
            kind,
            start_depth,
            start_line,
            max_depth: start_depth,
            unmapped_steps: 0,
        }
    }

    /// Returns the kind of step.
    pub fn kind(&self) -> StepKind {
        self.kind
    }

    /// Returns the call depth recorded when the step began.
    pub fn start_depth(&self) -> usize {
        self.start_depth
    }

    /// Returns the source line active when the step began.
    pub fn start_line(&self) -> Option<&AddressInfo> {
        self.start_line.as_ref()
    }

    /// Returns the deepest call depth observed during this step.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the address to run to, for [`StepKind::ToAddress`].
    pub fn stop_address(&self) -> Option<u16> {
        match self.kind {
            StepKind::ToAddress(addr) => Some(addr),
            _ => None,
        }
    }

    /// Returns true if `pc` lies outside the source line the step began in.
    pub fn left_start_line(&self, pc: u16) -> bool {
        self.start_line.as_ref().is_none_or(|line| !line.contains(pc))
    }

    /// Applies the step-kind policy after an instruction has executed.
    /// `depth` is the current call depth, or `None` when the backend cannot
    /// observe it (in which case depth conditions count as satisfied).  This
    /// says nothing about whether `pc` maps to a source line; the engine
    /// checks that separately.
    pub fn policy_satisfied(&mut self, pc: u16, depth: Option<usize>) -> bool {
        if let Some(depth) = depth {
            self.max_depth = self.max_depth.max(depth);
        }
        match self.kind {
            StepKind::In => self.left_start_line(pc),
            StepKind::Over => {
                depth.is_none_or(|depth| depth <= self.start_depth)
                    && self.left_start_line(pc)
            }
            StepKind::Out => match depth {
                None => true,
                Some(depth) => self.start_depth > 0 && depth < self.start_depth,
            },
            StepKind::ToAddress(addr) => pc == addr,
        }
    }

    /// Counts one more step that landed on an unmapped address, and returns
    /// true if that exceeds `budget`.
    pub fn note_unmapped_step(&mut self, budget: Option<u64>) -> bool {
        self.unmapped_steps += 1;
        budget.is_some_and(|budget| self.unmapped_steps > budget)
    }
}

//===========================================================================//


//===========================================================================//
