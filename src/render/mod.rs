//! C code generation
//!
//! Lowers the BASIC AST to C text. Every statement renders to one or more
//! complete C lines with no trailing newline; [`Renderer::render_program`]
//! joins them one per line.
//!
//! # Lowering
//!
//! - Line numbers and `*labels` become C labels. C labels may not start
//!   with a digit, so line `10` becomes `_10`.
//! - GOSUB saves a continuation with `setjmp` and jumps to the subroutine;
//!   RETURN goes back with `longjmp`. See [`GosubStrategy`].
//! - FOR becomes a C `for` over an `int` loop variable. See [`LoopBound`].
//! - ON becomes a `switch` with one 1-based `case` per target.
//! - Names nobody declared with DIM are called as external C functions.

mod options;

pub use options::{GosubStrategy, LoopBound, RenderOptions};

use crate::parser::ast::*;
use log::debug;

const SEPARATOR: &str = "// -----------------------------------";

/// Renders AST nodes to C source text.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a whole program, wrapped as a translation unit when the
    /// options ask for one.
    pub fn render_program(&self, program: &Program) -> String {
        let mut body = String::new();
        for statement in &program.statements {
            body.push_str(&self.render_statement(statement));
            body.push('\n');
        }
        debug!("rendered {} statement(s)", program.statements.len());
        self.finish(&body)
    }

    /// Wrap already rendered statements (one per line) according to
    /// [`RenderOptions::standalone`].
    pub fn finish(&self, body: &str) -> String {
        if !self.options.standalone {
            return body.to_string();
        }

        let mut out = String::from("#include <setjmp.h>\n");
        match self.options.gosub {
            GosubStrategy::SharedSlot => out.push_str("\njmp_buf env;\n"),
            GosubStrategy::ReturnStack => {
                out.push_str(&format!(
                    "#include <stdlib.h>\n\njmp_buf _ret_stack[{}];\nint _ret_sp = 0;\n",
                    self.options.return_stack_depth
                ));
            }
        }
        out.push_str("\nint main(void)\n{\n");
        out.push_str(&self.indent(body));
        out.push_str(&self.indent("return 0;\n"));
        out.push_str("}\n");
        out
    }

    pub fn render_statement(&self, statement: &Statement) -> String {
        match statement {
            Statement::LineNumber { name, data, .. } => match data {
                Some(data) => render_data(data),
                None => format!("{}:;", c_label(name)),
            },
            Statement::Label { name, .. } => format!("\n{}\n{}:;", SEPARATOR, c_label(name)),
            Statement::Dim { declarations, .. } => {
                let names: Vec<String> = declarations
                    .iter()
                    .map(|decl| {
                        let mut out = decl.name.clone();
                        for size in &decl.sizes {
                            out.push_str(&format!("[{}]", size.literal));
                        }
                        out
                    })
                    .collect();
                format!("int {};", names.join(", "))
            }
            Statement::If {
                condition,
                consequence,
                alternative,
                ..
            } => self.render_if(condition, consequence, alternative.as_ref()),
            Statement::On {
                value,
                kind,
                targets,
                ..
            } => self.render_on(value, *kind, targets),
            Statement::Goto { target, .. } => render_goto(target),
            Statement::Gosub { target, .. } => self.render_gosub(target),
            Statement::Return { .. } => {
                let jump = match self.options.gosub {
                    GosubStrategy::SharedSlot => "longjmp(env, 1);",
                    GosubStrategy::ReturnStack => {
                        "if (_ret_sp == 0) abort();\nlongjmp(_ret_stack[--_ret_sp], 1);"
                    }
                };
                format!("{}\n{}", jump, SEPARATOR)
            }
            Statement::For {
                variable,
                begin,
                end,
                step,
                body,
                ..
            } => {
                let end = self.render_expression(end);
                let step = self.render_expression(step);
                let condition = match self.options.loop_bound {
                    LoopBound::Exact => format!("{variable} != {end}"),
                    LoopBound::Relational => {
                        format!("{step} >= 0 ? {variable} <= {end} : {variable} >= {end}")
                    }
                };
                format!(
                    "for (int {} = {}; {}; {} += {}) {{\n{}}}",
                    variable,
                    self.render_expression(begin),
                    condition,
                    variable,
                    step,
                    self.render_block(body)
                )
            }
            Statement::Let { target, value, .. } => format!(
                "{} = {};",
                self.render_identifier(target),
                self.render_expression(value)
            ),
            Statement::Call(call) => format!("{};", self.render_call(call)),
        }
    }

    pub fn render_expression(&self, expression: &Expression) -> String {
        match expression {
            Expression::Identifier(ident) => self.render_identifier(ident),
            Expression::IntegerLiteral(lit) => lit.literal.clone(),
            Expression::StringLiteral(value, _) => format!("\"{}\"", escape(value)),
            Expression::Prefix { op, operand, .. } => {
                let operand = self.render_expression(operand);
                match op {
                    PrefixOp::Neg => format!("(-{operand})"),
                    PrefixOp::Len => format!("LEN({operand})"),
                    PrefixOp::Asc => format!("ASC({operand})"),
                    PrefixOp::ChrS => format!("CHR$({operand})"),
                }
            }
            Expression::Infix {
                op, left, right, ..
            } => format!(
                "({} {} {})",
                self.render_expression(left),
                c_operator(*op),
                self.render_expression(right)
            ),
            Expression::Call(call) => self.render_call(call),
        }
    }

    fn render_identifier(&self, ident: &Identifier) -> String {
        let mut out = ident.name.clone();
        for index in &ident.indices {
            out.push_str(&format!("[{}]", self.render_expression(index)));
        }
        out
    }

    fn render_call(&self, call: &CallExpression) -> String {
        let arguments: Vec<String> = call
            .arguments
            .iter()
            .map(|arg| self.render_expression(arg))
            .collect();
        format!("{}({})", call.function, arguments.join(", "))
    }

    fn render_if(
        &self,
        condition: &Expression,
        consequence: &Branch,
        alternative: Option<&Branch>,
    ) -> String {
        let mut out = format!("if ({})", self.render_expression(condition));
        match consequence {
            Branch::Goto(target) => {
                out.push(' ');
                out.push_str(&render_goto(target));
            }
            Branch::Block(statements) => {
                out.push_str(&format!(" {{\n{}}}", self.render_block(statements)));
            }
        }

        if let Some(alternative) = alternative {
            // `if (C) goto L;` is already a complete statement
            let lead = match consequence {
                Branch::Goto(_) => "\nelse",
                Branch::Block(_) => " else",
            };
            out.push_str(lead);
            match alternative {
                Branch::Goto(target) => {
                    out.push(' ');
                    out.push_str(&render_goto(target));
                }
                Branch::Block(statements) => {
                    out.push_str(&format!(" {{\n{}}}", self.render_block(statements)));
                }
            }
        }
        out
    }

    fn render_on(&self, value: &Expression, kind: JumpKind, targets: &[JumpTarget]) -> String {
        let mut out = format!("switch ({}) {{\n", self.render_expression(value));
        for (i, target) in targets.iter().enumerate() {
            out.push_str(&format!("case {}:\n", i + 1));
            let action = match kind {
                JumpKind::Goto => render_goto(target),
                JumpKind::Gosub => self.render_gosub(target),
            };
            out.push_str(&self.indent(&format!("{action}\nbreak;\n")));
        }
        out.push_str("default:\n");
        out.push_str(&self.indent("// nothing to do\nbreak;\n"));
        out.push('}');
        out
    }

    fn render_gosub(&self, target: &JumpTarget) -> String {
        let (guard, slot) = match self.options.gosub {
            GosubStrategy::SharedSlot => (String::new(), "env"),
            // a GOSUB that never returns must not run off the end of the stack
            GosubStrategy::ReturnStack => (
                format!(
                    "if (_ret_sp >= {}) abort();\n",
                    self.options.return_stack_depth
                ),
                "_ret_stack[_ret_sp++]",
            ),
        };
        format!(
            "{}if (setjmp({}) == 0) {{\n{}}}\n// return from longjmp()",
            guard,
            slot,
            self.indent(&format!("{}\n", render_goto(target)))
        )
    }

    /// Statements one per line, indented one level.
    fn render_block(&self, statements: &[Statement]) -> String {
        let mut body = String::new();
        for statement in statements {
            body.push_str(&self.render_statement(statement));
            body.push('\n');
        }
        self.indent(&body)
    }

    /// Indent every non-empty line of `text` by one level.
    fn indent(&self, text: &str) -> String {
        let pad = " ".repeat(self.options.indent);
        let mut out = String::with_capacity(text.len());
        for line in text.split_inclusive('\n') {
            if line != "\n" {
                out.push_str(&pad);
            }
            out.push_str(line);
        }
        out
    }
}

/// C label for a line number or label name.
pub fn c_label(name: &str) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name.to_string()
    }
}

fn render_goto(target: &JumpTarget) -> String {
    format!("goto {};", c_label(&target.name))
}

fn render_data(data: &DataStatement) -> String {
    let value = &data.value;
    // a single string literal passes through; anything else is quoted whole
    let quoted = value.len() >= 2
        && value.starts_with('"')
        && value.ends_with('"')
        && !value[1..value.len() - 1].contains('"');
    if quoted {
        format!("char *{} = {};", c_label(&data.name), value)
    } else {
        format!("char *{} = \"{}\";", c_label(&data.name), escape(value))
    }
}

fn c_operator(op: InfixOp) -> &'static str {
    match op {
        InfixOp::Add => "+",
        InfixOp::Sub => "-",
        InfixOp::Mul => "*",
        InfixOp::Div => "/",
        InfixOp::Eq => "==",
        InfixOp::Ne => "!=",
        InfixOp::Lt => "<",
        InfixOp::Gt => ">",
        InfixOp::And => "&&",
        InfixOp::Or => "||",
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn render_with(source: &str, options: RenderOptions) -> String {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "{source}: {:?}", errors);
        Renderer::new(options).render_program(&program)
    }

    fn render(source: &str) -> String {
        render_with(source, RenderOptions::default())
    }

    #[test]
    fn test_line_number_and_assignment() {
        assert_eq!(render("10 X = 5"), "_10:;\nX = 5;\n");
    }

    #[test]
    fn test_c_label() {
        assert_eq!(c_label("10"), "_10");
        assert_eq!(c_label("SUB"), "SUB");
    }

    #[test]
    fn test_dim() {
        assert_eq!(render("10 DIM A(3,4), B$(2)"), "_10:;\nint A[3][4], B$[2];\n");
    }

    #[test]
    fn test_array_assignment_and_read() {
        assert_eq!(
            render("10 DIM A(3,4)\n20 A(1, 2) = A(0, I) + 1"),
            "_10:;\nint A[3][4];\n_20:;\nA[1][2] = (A[0][I] + 1);\n"
        );
    }

    #[test]
    fn test_label_and_return() {
        assert_eq!(
            render("90 *GOGO:RETURN"),
            "_90:;\n\n// -----------------------------------\nGOGO:;\nlongjmp(env, 1);\n// -----------------------------------\n"
        );
    }

    #[test]
    fn test_goto_and_gosub() {
        assert_eq!(
            render("10 GOTO 100 : GOSUB *SUB"),
            "_10:;\ngoto _100;\nif (setjmp(env) == 0) {\n    goto SUB;\n}\n// return from longjmp()\n"
        );
    }

    #[test]
    fn test_if_forms() {
        assert_eq!(
            render("10 IF A = 1 OR B <> 2 THEN 30"),
            "_10:;\nif (((A == 1) || (B != 2))) goto _30;\n"
        );
        assert_eq!(
            render("10 IF A THEN 30 ELSE *DONE"),
            "_10:;\nif (A) goto _30;\nelse goto DONE;\n"
        );
        assert_eq!(
            render("10 IF A AND B THEN X = 1 : Y = 2 ELSE X = 3"),
            "_10:;\nif ((A && B)) {\n    X = 1;\n    Y = 2;\n} else {\n    X = 3;\n}\n"
        );
        assert_eq!(
            render("10 IF A THEN X = 1 ELSE 40"),
            "_10:;\nif (A) {\n    X = 1;\n} else goto _40;\n"
        );
    }

    #[test]
    fn test_nested_blocks_indent_every_line() {
        assert_eq!(
            render("10 IF A THEN GOSUB 100"),
            "_10:;\nif (A) {\n    if (setjmp(env) == 0) {\n        goto _100;\n    }\n    // return from longjmp()\n}\n"
        );
    }

    #[test]
    fn test_on_goto() {
        assert_eq!(
            render("200 ON N GOTO 10,*TWO"),
            "_200:;\nswitch (N) {\ncase 1:\n    goto _10;\n    break;\ncase 2:\n    goto TWO;\n    break;\ndefault:\n    // nothing to do\n    break;\n}\n"
        );
    }

    #[test]
    fn test_on_gosub() {
        assert_eq!(
            render("200 ON N GOSUB 10"),
            "_200:;\nswitch (N) {\ncase 1:\n    if (setjmp(env) == 0) {\n        goto _10;\n    }\n    // return from longjmp()\n    break;\ndefault:\n    // nothing to do\n    break;\n}\n"
        );
    }

    #[test]
    fn test_for_loops() {
        assert_eq!(
            render("300 FOR I=1 TO 10 STEP 2 : X=I : NEXT"),
            "_300:;\nfor (int I = 1; I != 10; I += 2) {\n    X = I;\n}\n"
        );
        assert_eq!(
            render("300 FOR I=1 TO 3 : NEXT"),
            "_300:;\nfor (int I = 1; I != 3; I += 1) {\n}\n"
        );
    }

    #[test]
    fn test_relational_loop_bound() {
        let options = RenderOptions {
            loop_bound: LoopBound::Relational,
            ..RenderOptions::default()
        };
        assert_eq!(
            render_with("300 FOR I=10 TO 1 STEP -3 : NEXT", options),
            "_300:;\nfor (int I = 10; (-3) >= 0 ? I <= 1 : I >= 1; I += (-3)) {\n}\n"
        );
    }

    #[test]
    fn test_return_stack() {
        let options = RenderOptions {
            gosub: GosubStrategy::ReturnStack,
            ..RenderOptions::default()
        };
        assert_eq!(
            render_with("10 GOSUB 100 : RETURN", options),
            "_10:;\nif (_ret_sp >= 64) abort();\nif (setjmp(_ret_stack[_ret_sp++]) == 0) {\n    goto _100;\n}\n// return from longjmp()\nif (_ret_sp == 0) abort();\nlongjmp(_ret_stack[--_ret_sp], 1);\n// -----------------------------------\n"
        );
    }

    #[test]
    fn test_return_stack_guards_both_ends() {
        let options = RenderOptions {
            gosub: GosubStrategy::ReturnStack,
            standalone: true,
            return_stack_depth: 16,
            ..RenderOptions::default()
        };
        let out = render_with("10 GOSUB 20\n20 GOTO 10", options);
        assert!(out.starts_with("#include <setjmp.h>\n#include <stdlib.h>\n\n"));
        assert!(out.contains(
            "    if (_ret_sp >= 16) abort();\n    if (setjmp(_ret_stack[_ret_sp++]) == 0) {\n"
        ));
    }

    #[test]
    fn test_data() {
        assert_eq!(
            render("1000 DATA ThisIsData:' this is data\n1100 DATA \"001122334455\""),
            "char *_1000 = \"ThisIsData\";\nchar *_1100 = \"001122334455\";\n"
        );
        assert_eq!(render("10 DATA a\"b"), "char *_10 = \"a\\\"b\";\n");
    }

    #[test]
    fn test_data_with_several_strings_is_quoted_whole() {
        assert_eq!(
            render("10 DATA \"A\",\"B\"\n20 DATA \"a\"b\""),
            concat!(
                r#"char *_10 = "\"A\",\"B\"";"#,
                "\n",
                r#"char *_20 = "\"a\"b\"";"#,
                "\n"
            )
        );
    }

    #[test]
    fn test_expressions() {
        assert_eq!(
            render("10 X = -LEN A$ * ASC \"A\" + CHR$(65)"),
            "_10:;\nX = (((-LEN(A$)) * ASC(\"A\")) + CHR$(65));\n"
        );
        assert_eq!(render("10 PSET X, RND(6)"), "_10:;\nPSET(X, RND(6));\n");
        assert_eq!(render("10 CLS"), "_10:;\nCLS();\n");
    }

    #[test]
    fn test_standalone_unit() {
        let options = RenderOptions {
            standalone: true,
            ..RenderOptions::default()
        };
        assert_eq!(
            render_with("10 X = 5\n20 *L:RETURN", options),
            "#include <setjmp.h>\n\njmp_buf env;\n\nint main(void)\n{\n    _10:;\n    X = 5;\n    _20:;\n\n    // -----------------------------------\n    L:;\n    longjmp(env, 1);\n    // -----------------------------------\n    return 0;\n}\n"
        );
    }

    #[test]
    fn test_standalone_return_stack_declarations() {
        let options = RenderOptions {
            standalone: true,
            gosub: GosubStrategy::ReturnStack,
            return_stack_depth: 8,
            ..RenderOptions::default()
        };
        let out = render_with("", options);
        assert!(out.contains("jmp_buf _ret_stack[8];\nint _ret_sp = 0;\n"));
        assert!(!out.contains("jmp_buf env;"));
    }
}
