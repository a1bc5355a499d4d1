// AST (Abstract Syntax Tree) definitions for the BASIC translator

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    // Logical
    And,
    Or,
}

/// Prefix operators, including the built-in string functions which BASIC
/// applies without requiring parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Neg,  // -x
    Len,  // LEN x
    Asc,  // ASC x
    ChrS, // CHR$ x
}

/// Whether a computed jump transfers control or calls a subroutine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Goto,
    Gosub,
}

/// Destination of a GOTO/GOSUB: a line number (`100`) or a label (`*LOOP`).
/// Existence of the destination is never checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTarget {
    pub name: String,
    pub location: SourceLocation,
}

/// Integer literal, keeping the source spelling for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerLiteral {
    pub value: i64,
    pub literal: String,
    pub location: SourceLocation,
}

/// Variable reference; `indices` is non-empty for array element access
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub indices: Vec<Expression>,
    pub location: SourceLocation,
}

/// Invocation of a name that was never declared with DIM
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub function: String,
    pub arguments: Vec<Expression>,
    pub location: SourceLocation,
}

/// One array declared by a DIM statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimDeclaration {
    pub name: String,
    pub sizes: Vec<IntegerLiteral>,
    pub location: SourceLocation,
}

/// Raw DATA payload bound to the line that owns it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStatement {
    pub name: String,
    pub value: String,
    pub location: SourceLocation,
}

/// THEN/ELSE arm of an IF.
///
/// `Goto` is the abbreviated form (`THEN 100`, `ELSE *DONE`) with nothing
/// else following it on the line.
#[derive(Debug, Clone, PartialEq)]
pub enum Branch {
    Goto(JumpTarget),
    Block(Vec<Statement>),
}

/// Statement nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    LineNumber {
        name: String,
        data: Option<DataStatement>,
        location: SourceLocation,
    },
    Label {
        name: String,
        location: SourceLocation,
    },
    Dim {
        declarations: Vec<DimDeclaration>,
        location: SourceLocation,
    },
    If {
        condition: Expression,
        consequence: Branch,
        alternative: Option<Branch>,
        location: SourceLocation,
    },
    On {
        value: Expression,
        kind: JumpKind,
        targets: Vec<JumpTarget>,
        location: SourceLocation,
    },
    Goto {
        target: JumpTarget,
        location: SourceLocation,
    },
    Gosub {
        target: JumpTarget,
        location: SourceLocation,
    },
    Return {
        location: SourceLocation,
    },
    For {
        variable: String,
        begin: Expression,
        end: Expression,
        step: Expression,
        body: Vec<Statement>,
        location: SourceLocation,
    },
    Let {
        target: Identifier,
        value: Expression,
        location: SourceLocation,
    },
    Call(CallExpression),
}

impl Statement {
    /// Get the source location of this statement
    pub fn location(&self) -> &SourceLocation {
        match self {
            Statement::LineNumber { location, .. } => location,
            Statement::Label { location, .. } => location,
            Statement::Dim { location, .. } => location,
            Statement::If { location, .. } => location,
            Statement::On { location, .. } => location,
            Statement::Goto { location, .. } => location,
            Statement::Gosub { location, .. } => location,
            Statement::Return { location } => location,
            Statement::For { location, .. } => location,
            Statement::Let { location, .. } => location,
            Statement::Call(call) => &call.location,
        }
    }
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral(IntegerLiteral),
    StringLiteral(String, SourceLocation),
    Prefix {
        op: PrefixOp,
        operand: Box<Expression>,
        location: SourceLocation,
    },
    Infix {
        op: InfixOp,
        left: Box<Expression>,
        right: Box<Expression>,
        location: SourceLocation,
    },
    Call(CallExpression),
}

impl Expression {
    /// Get the source location of this expression
    pub fn location(&self) -> &SourceLocation {
        match self {
            Expression::Identifier(ident) => &ident.location,
            Expression::IntegerLiteral(lit) => &lit.location,
            Expression::StringLiteral(_, loc) => loc,
            Expression::Prefix { location, .. } => location,
            Expression::Infix { location, .. } => location,
            Expression::Call(call) => &call.location,
        }
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
