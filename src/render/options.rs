//! Output configuration for the C renderer

/// How GOSUB/RETURN are lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GosubStrategy {
    /// One shared `jmp_buf env`. A GOSUB issued before the previous one
    /// returned overwrites its return point, as in the BASIC dialects this
    /// targets.
    #[default]
    SharedSlot,
    /// A fixed-depth stack of `jmp_buf`s, so subroutines may nest.
    ReturnStack,
}

/// How a FOR loop decides to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopBound {
    /// `I != END`: runs forever if the step skips over the end value.
    #[default]
    Exact,
    /// `I <= END` for non-negative steps, `I >= END` otherwise.
    Relational,
}

/// Options controlling the generated C text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub gosub: GosubStrategy,
    pub loop_bound: LoopBound,
    /// Wrap the output in a complete translation unit with `main`.
    pub standalone: bool,
    /// Spaces per nesting level.
    pub indent: usize,
    /// Number of `jmp_buf`s declared for [`GosubStrategy::ReturnStack`].
    pub return_stack_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            gosub: GosubStrategy::default(),
            loop_bound: LoopBound::default(),
            standalone: false,
            indent: 4,
            return_stack_depth: 64,
        }
    }
}
