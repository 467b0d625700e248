//! Formula expressions over tree branches.
//!
//! The grammar follows `TTree::Draw` formulas: arithmetic (`+ - * / %`),
//! comparisons (`== != < <= > >=`, with a lone `=` read as `==`), logic
//! (`&& || !`) and a set of math functions, also accepted under their `TMath::`
//! names. Booleans are `1.0`/`0.0`; any nonzero value is true.

use crate::error::{Result, RootError};

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Num(f64),
    Var(usize),
    Neg(Box<Node>),
    Not(Box<Node>),
    Bin(Op, Box<Node>, Box<Node>),
    Call(Func, Vec<Node>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl Op {
    /// Left binding power; higher binds tighter.
    fn power(self) -> u8 {
        match self {
            Op::Or => 1,
            Op::And => 2,
            Op::Eq | Op::Ne => 3,
            Op::Lt | Op::Le | Op::Gt | Op::Ge => 4,
            Op::Add | Op::Sub => 5,
            Op::Mul | Op::Div | Op::Rem => 6,
        }
    }

    fn apply(self, a: f64, b: f64) -> f64 {
        let truth = |c: bool| if c { 1.0 } else { 0.0 };
        match self {
            Op::Add => a + b,
            Op::Sub => a - b,
            Op::Mul => a * b,
            Op::Div => a / b,
            Op::Rem => a % b,
            Op::Eq => truth(a == b),
            Op::Ne => truth(a != b),
            Op::Lt => truth(a < b),
            Op::Le => truth(a <= b),
            Op::Gt => truth(a > b),
            Op::Ge => truth(a >= b),
            Op::And => truth(a != 0.0 && b != 0.0),
            Op::Or => truth(a != 0.0 || b != 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func {
    Abs,
    Sqrt,
    Log,
    Log10,
    Exp,
    Pow,
    Min,
    Max,
    Sin,
    Cos,
    Tan,
    Atan2,
}

impl Func {
    fn lookup(name: &str) -> Option<Self> {
        let f = match name.strip_prefix("TMath::").unwrap_or(name) {
            "abs" | "fabs" | "Abs" => Func::Abs,
            "sqrt" | "Sqrt" => Func::Sqrt,
            "log" | "Log" => Func::Log,
            "log10" | "Log10" => Func::Log10,
            "exp" | "Exp" => Func::Exp,
            "pow" | "Power" => Func::Pow,
            "min" | "Min" => Func::Min,
            "max" | "Max" => Func::Max,
            "sin" | "Sin" => Func::Sin,
            "cos" | "Cos" => Func::Cos,
            "tan" | "Tan" => Func::Tan,
            "atan2" | "ATan2" => Func::Atan2,
            _ => return None,
        };
        Some(f)
    }

    fn arity(self) -> usize {
        match self {
            Func::Pow | Func::Min | Func::Max | Func::Atan2 => 2,
            _ => 1,
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        match self {
            Func::Abs => args[0].abs(),
            Func::Sqrt => args[0].sqrt(),
            Func::Log => args[0].ln(),
            Func::Log10 => args[0].log10(),
            Func::Exp => args[0].exp(),
            Func::Pow => args[0].powf(args[1]),
            Func::Min => args[0].min(args[1]),
            Func::Max => args[0].max(args[1]),
            Func::Sin => args[0].sin(),
            Func::Cos => args[0].cos(),
            Func::Tan => args[0].tan(),
            Func::Atan2 => args[0].atan2(args[1]),
        }
    }
}

/// A parsed formula. Variables are resolved to column slots at compile time.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    root: Node,
    variables: Vec<String>,
}

impl CompiledExpr {
    /// Parse `input`.
    pub fn compile(input: &str) -> Result<Self> {
        let tokens = lex(input)?;
        if tokens.is_empty() {
            return Err(RootError::Expression("empty expression".into()));
        }
        let mut p = Parser { tokens: &tokens, pos: 0, variables: Vec::new() };
        let root = p.expr(0)?;
        if let Some(t) = p.tokens.get(p.pos) {
            return Err(RootError::Expression(format!("unexpected {t} in '{input}'")));
        }
        Ok(Self { root, variables: p.variables })
    }

    /// Branch names in order of first appearance.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Evaluate with `values[i]` bound to `variables()[i]`.
    pub fn eval_row(&self, values: &[f64]) -> f64 {
        eval(&self.root, values)
    }
}

fn eval(node: &Node, vals: &[f64]) -> f64 {
    match node {
        Node::Num(v) => *v,
        Node::Var(i) => vals[*i],
        Node::Neg(a) => -eval(a, vals),
        Node::Not(a) => {
            if eval(a, vals) == 0.0 {
                1.0
            } else {
                0.0
            }
        }
        Node::Bin(op, a, b) => op.apply(eval(a, vals), eval(b, vals)),
        Node::Call(f, args) => {
            let mut xs = [0.0; 2];
            for (x, a) in xs.iter_mut().zip(args) {
                *x = eval(a, vals);
            }
            f.apply(&xs[..args.len()])
        }
    }
}

// ── Lexer ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(f64),
    Ident(String),
    Op(Op),
    Minus,
    Bang,
    LParen,
    RParen,
    Comma,
}

impl std::fmt::Display for Tok {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tok::Num(v) => write!(f, "number {v}"),
            Tok::Ident(s) => write!(f, "identifier '{s}'"),
            Tok::Op(op) => write!(f, "operator {op:?}"),
            Tok::Minus => f.write_str("'-'"),
            Tok::Bang => f.write_str("'!'"),
            Tok::LParen => f.write_str("'('"),
            Tok::RParen => f.write_str("')'"),
            Tok::Comma => f.write_str("','"),
        }
    }
}

fn lex(input: &str) -> Result<Vec<Tok>> {
    let b = input.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < b.len() {
        let c = b[i];
        let next = b.get(i + 1).copied();
        let (tok, len) = match (c, next) {
            (c, _) if c.is_ascii_whitespace() => {
                i += 1;
                continue;
            }
            (b'&', Some(b'&')) => (Tok::Op(Op::And), 2),
            (b'|', Some(b'|')) => (Tok::Op(Op::Or), 2),
            (b'=', Some(b'=')) => (Tok::Op(Op::Eq), 2),
            (b'!', Some(b'=')) => (Tok::Op(Op::Ne), 2),
            (b'<', Some(b'=')) => (Tok::Op(Op::Le), 2),
            (b'>', Some(b'=')) => (Tok::Op(Op::Ge), 2),
            (b'=', _) => (Tok::Op(Op::Eq), 1),
            (b'<', _) => (Tok::Op(Op::Lt), 1),
            (b'>', _) => (Tok::Op(Op::Gt), 1),
            (b'+', _) => (Tok::Op(Op::Add), 1),
            (b'-', _) => (Tok::Minus, 1),
            (b'*', _) => (Tok::Op(Op::Mul), 1),
            (b'/', _) => (Tok::Op(Op::Div), 1),
            (b'%', _) => (Tok::Op(Op::Rem), 1),
            (b'!', _) => (Tok::Bang, 1),
            (b'(', _) => (Tok::LParen, 1),
            (b')', _) => (Tok::RParen, 1),
            (b',', _) => (Tok::Comma, 1),
            (c, _) if c.is_ascii_digit() || c == b'.' => {
                let len = number_len(&b[i..]);
                let text = &input[i..i + len];
                let v = text
                    .parse()
                    .map_err(|_| RootError::Expression(format!("invalid number '{text}'")))?;
                (Tok::Num(v), len)
            }
            (c, _) if c.is_ascii_alphabetic() || c == b'_' => {
                let len = ident_len(&b[i..]);
                (Tok::Ident(input[i..i + len].to_string()), len)
            }
            _ => {
                let ch = input[i..].chars().next().unwrap_or('?');
                return Err(RootError::Expression(format!(
                    "unexpected character '{ch}' at {i} in '{input}'"
                )));
            }
        };
        out.push(tok);
        i += len;
    }
    Ok(out)
}

fn number_len(b: &[u8]) -> usize {
    let mut n = 0;
    while n < b.len() {
        match b[n] {
            c if c.is_ascii_digit() || c == b'.' => n += 1,
            b'e' | b'E' => {
                n += 1;
                if matches!(b.get(n), Some(b'+' | b'-')) {
                    n += 1;
                }
            }
            _ => break,
        }
    }
    n
}

/// Identifiers may contain `::`, as in `TMath::Abs`.
fn ident_len(b: &[u8]) -> usize {
    let mut n = 0;
    while n < b.len() {
        if b[n].is_ascii_alphanumeric() || b[n] == b'_' {
            n += 1;
        } else if b[n] == b':' && b.get(n + 1) == Some(&b':') {
            n += 2;
        } else {
            break;
        }
    }
    n
}

// ── Parser ─────────────────────────────────────────────────────

struct Parser<'t> {
    tokens: &'t [Tok],
    pos: usize,
    variables: Vec<String>,
}

impl Parser<'_> {
    fn next(&mut self) -> Option<&Tok> {
        let t = self.tokens.get(self.pos);
        self.pos += usize::from(t.is_some());
        t
    }

    fn binary_op(&self) -> Option<Op> {
        match self.tokens.get(self.pos)? {
            Tok::Op(op) => Some(*op),
            Tok::Minus => Some(Op::Sub),
            _ => None,
        }
    }

    /// Precedence climbing: parse operators binding tighter than `min_power`.
    fn expr(&mut self, min_power: u8) -> Result<Node> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.binary_op() {
            if op.power() <= min_power {
                break;
            }
            self.pos += 1;
            let rhs = self.expr(op.power())?;
            lhs = Node::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Node> {
        match self.tokens.get(self.pos) {
            Some(Tok::Minus) => {
                self.pos += 1;
                Ok(Node::Neg(Box::new(self.unary()?)))
            }
            Some(Tok::Op(Op::Add)) => {
                self.pos += 1;
                self.unary()
            }
            Some(Tok::Bang) => {
                self.pos += 1;
                Ok(Node::Not(Box::new(self.unary()?)))
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<Node> {
        match self.next().cloned() {
            Some(Tok::Num(v)) => Ok(Node::Num(v)),
            Some(Tok::LParen) => {
                let inner = self.expr(0)?;
                self.close()?;
                Ok(inner)
            }
            Some(Tok::Ident(name)) if self.tokens.get(self.pos) == Some(&Tok::LParen) => {
                self.pos += 1;
                self.call(&name)
            }
            Some(Tok::Ident(name)) => {
                let slot = match self.variables.iter().position(|v| *v == name) {
                    Some(i) => i,
                    None => {
                        self.variables.push(name);
                        self.variables.len() - 1
                    }
                };
                Ok(Node::Var(slot))
            }
            Some(t) => Err(RootError::Expression(format!("unexpected {t}"))),
            None => Err(RootError::Expression("unexpected end of expression".into())),
        }
    }

    fn call(&mut self, name: &str) -> Result<Node> {
        let func = Func::lookup(name)
            .ok_or_else(|| RootError::Expression(format!("unknown function '{name}'")))?;
        let mut args = vec![self.expr(0)?];
        while self.tokens.get(self.pos) == Some(&Tok::Comma) {
            self.pos += 1;
            args.push(self.expr(0)?);
        }
        self.close()?;
        if args.len() != func.arity() {
            return Err(RootError::Expression(format!(
                "{name} takes {} argument(s), got {}",
                func.arity(),
                args.len()
            )));
        }
        Ok(Node::Call(func, args))
    }

    fn close(&mut self) -> Result<()> {
        match self.next() {
            Some(Tok::RParen) => Ok(()),
            Some(t) => Err(RootError::Expression(format!("expected ')', found {t}"))),
            None => Err(RootError::Expression("missing ')'".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_with(src: &str, vals: &[f64]) -> f64 {
        CompiledExpr::compile(src).unwrap().eval_row(vals)
    }

    #[test]
    fn precedence() {
        assert_eq!(eval_with("2 + 3 * 4", &[]), 14.0);
        assert_eq!(eval_with("(2 + 3) * 4", &[]), 20.0);
        assert_eq!(eval_with("10 - 4 - 3", &[]), 3.0);
        assert_eq!(eval_with("-2 * 3", &[]), -6.0);
        assert_eq!(eval_with("7 % 4", &[]), 3.0);
    }

    #[test]
    fn variables_in_first_appearance_order() {
        let e = CompiledExpr::compile("sqrt(mcmox*mcmox + mcmoy*mcmoy) > 1.0").unwrap();
        assert_eq!(e.variables(), ["mcmox", "mcmoy"]);
        assert_eq!(e.eval_row(&[3.0, 4.0]), 1.0);
        assert_eq!(e.eval_row(&[0.3, 0.4]), 0.0);
    }

    #[test]
    fn single_equals_compares() {
        let e = CompiledExpr::compile("(mcpdg)=13 && (sqrt(p*p) > 1.0)").unwrap();
        assert_eq!(e.eval_row(&[13.0, 2.0]), 1.0);
        assert_eq!(e.eval_row(&[-13.0, 2.0]), 0.0);
        assert_eq!(e.eval_row(&[13.0, 0.5]), 0.0);
    }

    #[test]
    fn abs_selects_both_charges() {
        let e = CompiledExpr::compile("abs(mcpdg)==13").unwrap();
        assert_eq!(e.eval_row(&[-13.0]), 1.0);
        assert_eq!(e.eval_row(&[11.0]), 0.0);
    }

    #[test]
    fn negative_values_are_true() {
        assert_eq!(eval_with("x && 1", &[-1.0]), 1.0);
        assert_eq!(eval_with("!x", &[0.0]), 1.0);
        assert_eq!(eval_with("!x", &[-2.0]), 0.0);
        assert_eq!(eval_with("x || 0", &[0.0]), 0.0);
    }

    #[test]
    fn tmath_names_and_functions() {
        assert_eq!(eval_with("TMath::Abs(x)", &[-3.0]), 3.0);
        assert_eq!(eval_with("pow(x, 2)", &[3.0]), 9.0);
        assert_eq!(eval_with("TMath::Power(2, 10)", &[]), 1024.0);
        assert_eq!(eval_with("max(a, b) - min(a, b)", &[3.0, 7.0]), 4.0);
        assert_eq!(eval_with("log10(1000)", &[]), 3.0);
        assert!((eval_with("atan2(1, 1)", &[]) - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn scaled_difference() {
        let e = CompiledExpr::compile("(vtxxx - mcvtx)*1000000").unwrap();
        assert_eq!(e.variables(), ["vtxxx", "mcvtx"]);
        assert!((e.eval_row(&[2.5e-6, 1.0e-6]) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn scientific_notation() {
        assert!((eval_with("1.5e2 + 3.0E-1", &[]) - 150.3).abs() < 1e-10);
        assert_eq!(eval_with("2e+3", &[]), 2000.0);
    }

    #[test]
    fn malformed_expressions_are_rejected() {
        for src in ["bogus-cut(", "", "a +", "sqrt(1, 2)", "nosuch(1)", "a # b", "(a"] {
            assert!(
                matches!(CompiledExpr::compile(src), Err(RootError::Expression(_))),
                "{src:?} should fail"
            );
        }
    }
}
