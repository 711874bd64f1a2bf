use std::collections::HashSet;

use arch::msg::{Msg, Msgs};
use vmt::command::{ArithOp, Segment};

use super::writer::VmWriter;
use crate::{
    check,
    error::Error,
    expect,
    grammer::{
        parsercore::TokenStream,
        token::{Keyword, Token, TokenKind},
    },
    optional,
    symbols::{Kind, SymbolTable},
    Compiled,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubKind {
    Constructor,
    Function,
    Method,
}

#[derive(Debug)]
struct Subroutine {
    /// `Class.name`
    name: String,
    kind: SubKind,
    void: bool,
}

/// Recursive descent over one class, emitting bytecode as it parses.
pub struct Engine<'a> {
    file: &'a str,
    source: &'a str,
    ts: TokenStream,
    symbols: SymbolTable,
    vm: VmWriter,
    msgs: Msgs,
    class: String,
    methods: HashSet<String>,
    sub: Option<Subroutine>,
    labels: usize,
}

fn is_subroutine_start(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::Keyword(Keyword::Constructor | Keyword::Function | Keyword::Method)
    )
}

fn binary_op(kind: &TokenKind) -> Option<char> {
    match kind {
        TokenKind::Symbol(ch) if "+-*/&|<>=".contains(*ch) => Some(*ch),
        _ => None,
    }
}

impl<'a> Engine<'a> {
    pub fn new(file: &'a str, source: &'a str, tokens: Vec<Token>) -> Self {
        Engine {
            file,
            source,
            ts: TokenStream::new(tokens),
            symbols: SymbolTable::new(),
            vm: VmWriter::new(),
            msgs: Msgs::new(),
            class: String::new(),
            methods: HashSet::new(),
            sub: None,
            labels: 0,
        }
    }

    pub fn run(mut self) -> Compiled {
        self.prescan();
        if let Err(err) = self.compile_class() {
            self.report(err, "class");
        }
        Compiled {
            class: self.class,
            commands: self.vm.into_commands(),
            msgs: self.msgs,
        }
    }

    /// Collect method names so calls ahead of a method's declaration resolve.
    fn prescan(&mut self) {
        while let Ok(token) = self.ts.advance() {
            if token.kind == TokenKind::Keyword(Keyword::Method) && self.ts.advance().is_ok() {
                if let Some(name) = self.ts.peek().and_then(Token::ident) {
                    self.methods.insert(name.to_string());
                }
            }
        }
        self.ts.reset();
    }
}

// ----------------------------------------------------------------------------
// Diagnostics
// ----------------------------------------------------------------------------

impl<'a> Engine<'a> {
    fn raw_line(&self, line: usize) -> &'a str {
        self.source.lines().nth(line.saturating_sub(1)).unwrap_or("")
    }

    fn report(&mut self, err: Error, kind: &str) {
        let line = err.line().unwrap_or_else(|| self.ts.line());
        let raw = self.raw_line(line);
        self.msgs
            .push(Msg::error(err.to_string(), self.file, line).kind(kind).raw(raw));
    }

    fn warn(&mut self, text: String, line: usize, kind: &str) {
        let raw = self.raw_line(line);
        self.msgs
            .push(Msg::warn(text, self.file, line).kind(kind).raw(raw));
    }

    /// Skip to the end of the broken statement or declaration.
    fn recover(&mut self) {
        self.ts.consume_until(|token| {
            matches!(token.kind, TokenKind::Symbol(';' | '}')) || is_subroutine_start(token)
        });
        optional!(self.ts, TokenKind::Symbol(';'));
    }

    /// Skip to the next subroutine, leaving the class-closing `}` in place.
    fn recover_subroutine(&mut self) {
        while self.ts.has_more() && !self.ts.check_if(is_subroutine_start) && !self.at_class_end() {
            self.ts.bump();
        }
    }

    /// A `}` closes the class unless another `}` or a subroutine follows it.
    fn at_class_end(&self) -> bool {
        self.ts.check_if(|token| token.kind == TokenKind::Symbol('}'))
            && !self.ts.peek_nth(1).is_some_and(|next| {
                next.kind == TokenKind::Symbol('}') || is_subroutine_start(next)
            })
    }

    fn in_function(&self) -> bool {
        self.sub
            .as_ref()
            .is_some_and(|sub| sub.kind == SubKind::Function)
    }

    fn next_label(&mut self) -> usize {
        let n = self.labels;
        self.labels += 1;
        n
    }
}

// ----------------------------------------------------------------------------
// Declarations
// ----------------------------------------------------------------------------

impl<'a> Engine<'a> {
    fn ident(&mut self) -> Result<(String, usize), Error> {
        let token = expect!(self.ts, TokenKind::Ident(_), "identifier")?;
        let line = token.line;
        match token.kind {
            TokenKind::Ident(name) => Ok((name, line)),
            _ => Err(Error::OutOfRange),
        }
    }

    fn compile_class(&mut self) -> Result<(), Error> {
        expect!(self.ts, TokenKind::Keyword(Keyword::Class), "`class`")?;
        let (name, _) = self.ident()?;
        self.class = name;
        self.symbols.start_class();
        expect!(self.ts, TokenKind::Symbol('{'), "`{`")?;

        while check!(self.ts, TokenKind::Keyword(Keyword::Static | Keyword::Field)) {
            if let Err(err) = self.compile_class_var_dec() {
                self.report(err, "classVarDec");
                self.recover();
            }
        }

        while let Some(token) = self.ts.peek() {
            if is_subroutine_start(token) {
                if let Err(err) = self.compile_subroutine() {
                    self.report(err, "subroutine");
                    self.recover_subroutine();
                }
            } else if self.at_class_end() {
                break;
            } else {
                let err = Error::Expected {
                    expected: "subroutine declaration",
                    found: token.kind.to_string(),
                    line: token.line,
                };
                self.report(err, "class");
                self.recover_subroutine();
            }
        }

        expect!(self.ts, TokenKind::Symbol('}'), "`}`")?;
        match self.ts.peek() {
            Some(token) => Err(Error::TrailingTokens(token.line)),
            None => Ok(()),
        }
    }

    fn compile_class_var_dec(&mut self) -> Result<(), Error> {
        let kind = match self.ts.advance()?.kind {
            TokenKind::Keyword(Keyword::Static) => Kind::Static,
            _ => Kind::Field,
        };
        let ty = self.compile_type()?;
        self.compile_var_names(&ty, kind)
    }

    fn compile_var_dec(&mut self) -> Result<(), Error> {
        expect!(self.ts, TokenKind::Keyword(Keyword::Var), "`var`")?;
        let ty = self.compile_type()?;
        self.compile_var_names(&ty, Kind::Var)
    }

    /// `name (',' name)* ';'`
    fn compile_var_names(&mut self, ty: &str, kind: Kind) -> Result<(), Error> {
        loop {
            let (name, line) = self.ident()?;
            self.define(name, ty, kind, line);
            if optional!(self.ts, TokenKind::Symbol(',')).is_none() {
                break;
            }
        }
        expect!(self.ts, TokenKind::Symbol(';'), "`;`")?;
        Ok(())
    }

    fn define(&mut self, name: String, ty: &str, kind: Kind, line: usize) {
        if self.symbols.is_defined_in_scope(&name, kind) {
            self.report(Error::Duplicate(name, line), "declaration");
            return;
        }
        self.symbols.define(&name, ty, kind);
    }

    fn compile_type(&mut self) -> Result<String, Error> {
        let token = self.ts.advance()?;
        match token.kind {
            TokenKind::Keyword(kw @ (Keyword::Int | Keyword::Char | Keyword::Boolean)) => {
                Ok(kw.to_string())
            }
            TokenKind::Ident(name) => Ok(name),
            kind => Err(Error::Expected {
                expected: "type",
                found: kind.to_string(),
                line: token.line,
            }),
        }
    }

    fn compile_subroutine(&mut self) -> Result<(), Error> {
        let head = self.ts.advance()?;
        let kind = match head.kind {
            TokenKind::Keyword(Keyword::Constructor) => SubKind::Constructor,
            TokenKind::Keyword(Keyword::Function) => SubKind::Function,
            _ => SubKind::Method,
        };
        let void = optional!(self.ts, TokenKind::Keyword(Keyword::Void)).is_some();
        if !void {
            self.compile_type()?;
        }
        let (name, _) = self.ident()?;

        self.symbols.start_subroutine();
        self.labels = 0;
        self.sub = Some(Subroutine {
            name: format!("{}.{}", self.class, name),
            kind,
            void,
        });
        match kind {
            SubKind::Method => {
                self.symbols.define("this", &self.class, Kind::Arg);
            }
            SubKind::Constructor => {
                self.report(
                    Error::Unsupported("object allocation in constructors", head.line),
                    "constructor",
                );
            }
            SubKind::Function => {}
        }

        expect!(self.ts, TokenKind::Symbol('('), "`(`")?;
        self.compile_parameter_list()?;
        expect!(self.ts, TokenKind::Symbol(')'), "`)`")?;
        self.compile_subroutine_body()
    }

    fn compile_parameter_list(&mut self) -> Result<(), Error> {
        if check!(self.ts, TokenKind::Symbol(')')) {
            return Ok(());
        }
        loop {
            let ty = self.compile_type()?;
            let (name, line) = self.ident()?;
            self.define(name, &ty, Kind::Arg, line);
            if optional!(self.ts, TokenKind::Symbol(',')).is_none() {
                return Ok(());
            }
        }
    }

    fn compile_subroutine_body(&mut self) -> Result<(), Error> {
        expect!(self.ts, TokenKind::Symbol('{'), "`{`")?;
        while check!(self.ts, TokenKind::Keyword(Keyword::Var)) {
            if let Err(err) = self.compile_var_dec() {
                self.report(err, "var");
                self.recover();
            }
        }

        let (name, kind) = match &self.sub {
            Some(sub) => (sub.name.clone(), sub.kind),
            None => return Err(Error::OutOfRange),
        };
        self.vm.function(&name, self.symbols.count(Kind::Var));
        if kind == SubKind::Method {
            self.vm.push(Segment::Argument, 0);
            self.vm.pop(Segment::Pointer, 0);
        }

        let returned = self.compile_statements();
        if !returned {
            let line = self.ts.line();
            self.warn(format!("Missing return at end of `{}`", name), line, "return");
            self.vm.push(Segment::Constant, 0);
            self.vm.ret();
        }
        expect!(self.ts, TokenKind::Symbol('}'), "`}`")?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Statements
// ----------------------------------------------------------------------------

impl<'a> Engine<'a> {
    /// Compile statements up to the closing `}`. Returns whether the last one was `return`.
    fn compile_statements(&mut self) -> bool {
        let mut returned = false;
        loop {
            let Some(token) = self.ts.peek() else { break };
            if token.kind == TokenKind::Symbol('}') || is_subroutine_start(token) {
                break;
            }
            let kind = token.kind.to_string();
            match self.compile_statement() {
                Ok(is_return) => returned = is_return,
                Err(err) => {
                    self.report(err, &kind);
                    self.recover();
                    returned = false;
                }
            }
        }
        returned
    }

    fn compile_statement(&mut self) -> Result<bool, Error> {
        let token = self.ts.peek().cloned().ok_or(Error::UnexpectedEof("statement"))?;
        match token.kind {
            TokenKind::Keyword(Keyword::Let) => self.compile_let()?,
            TokenKind::Keyword(Keyword::If) => self.compile_if()?,
            TokenKind::Keyword(Keyword::While) => self.compile_while()?,
            TokenKind::Keyword(Keyword::Do) => self.compile_do()?,
            TokenKind::Keyword(Keyword::Return) => {
                self.compile_return()?;
                return Ok(true);
            }
            kind => {
                return Err(Error::Expected {
                    expected: "statement",
                    found: kind.to_string(),
                    line: token.line,
                })
            }
        }
        Ok(false)
    }

    fn compile_block(&mut self) -> Result<(), Error> {
        expect!(self.ts, TokenKind::Symbol('{'), "`{`")?;
        self.compile_statements();
        expect!(self.ts, TokenKind::Symbol('}'), "`}`")?;
        Ok(())
    }

    fn compile_let(&mut self) -> Result<(), Error> {
        self.ts.advance()?;
        let (name, line) = self.ident()?;
        let var = self.variable(&name, line);

        if optional!(self.ts, TokenKind::Symbol('[')).is_some() {
            self.push_variable(var);
            self.compile_expression()?;
            expect!(self.ts, TokenKind::Symbol(']'), "`]`")?;
            self.vm.arith(ArithOp::Add);
            expect!(self.ts, TokenKind::Symbol('='), "`=`")?;
            self.compile_expression()?;
            expect!(self.ts, TokenKind::Symbol(';'), "`;`")?;
            self.vm.pop(Segment::Temp, 0);
            self.vm.pop(Segment::Pointer, 1);
            self.vm.push(Segment::Temp, 0);
            self.vm.pop(Segment::That, 0);
            return Ok(());
        }

        expect!(self.ts, TokenKind::Symbol('='), "`=`")?;
        self.compile_expression()?;
        expect!(self.ts, TokenKind::Symbol(';'), "`;`")?;
        if let Some((seg, idx)) = var {
            self.vm.pop(seg, idx);
        }
        Ok(())
    }

    fn compile_if(&mut self) -> Result<(), Error> {
        self.ts.advance()?;
        let n = self.next_label();
        expect!(self.ts, TokenKind::Symbol('('), "`(`")?;
        self.compile_expression()?;
        expect!(self.ts, TokenKind::Symbol(')'), "`)`")?;
        self.vm.arith(ArithOp::Not);
        self.vm.if_goto(format!("IF_ELSE{}", n));
        self.compile_block()?;
        self.vm.goto(format!("IF_END{}", n));
        self.vm.label(format!("IF_ELSE{}", n));
        if optional!(self.ts, TokenKind::Keyword(Keyword::Else)).is_some() {
            self.compile_block()?;
        }
        self.vm.label(format!("IF_END{}", n));
        Ok(())
    }

    fn compile_while(&mut self) -> Result<(), Error> {
        self.ts.advance()?;
        let n = self.next_label();
        self.vm.label(format!("WHILE_EXP{}", n));
        expect!(self.ts, TokenKind::Symbol('('), "`(`")?;
        self.compile_expression()?;
        expect!(self.ts, TokenKind::Symbol(')'), "`)`")?;
        self.vm.arith(ArithOp::Not);
        self.vm.if_goto(format!("WHILE_END{}", n));
        self.compile_block()?;
        self.vm.goto(format!("WHILE_EXP{}", n));
        self.vm.label(format!("WHILE_END{}", n));
        Ok(())
    }

    fn compile_do(&mut self) -> Result<(), Error> {
        self.ts.advance()?;
        self.compile_subroutine_call()?;
        expect!(self.ts, TokenKind::Symbol(';'), "`;`")?;
        self.vm.pop(Segment::Temp, 0);
        Ok(())
    }

    fn compile_return(&mut self) -> Result<(), Error> {
        let line = self.ts.advance()?.line;
        let (name, void) = self
            .sub
            .as_ref()
            .map_or((String::new(), false), |sub| (sub.name.clone(), sub.void));

        if check!(self.ts, TokenKind::Symbol(';')) {
            if !void {
                self.report(Error::MissingReturnValue(name, line), "return");
            }
            self.vm.push(Segment::Constant, 0);
        } else {
            if void {
                self.report(Error::ReturnFromVoid(name, line), "return");
            }
            self.compile_expression()?;
        }
        expect!(self.ts, TokenKind::Symbol(';'), "`;`")?;
        self.vm.ret();
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Expressions
// ----------------------------------------------------------------------------

impl<'a> Engine<'a> {
    /// Resolve a variable to its segment slot, reporting undeclared names.
    fn variable(&mut self, name: &str, line: usize) -> Option<(Segment, u16)> {
        match self.symbol(name, line) {
            Some((_, seg, idx)) => Some((seg, idx)),
            None => {
                self.report(Error::Undeclared(name.to_string(), line), "variable");
                None
            }
        }
    }

    /// Type and slot of `name`, if declared.
    fn symbol(&mut self, name: &str, line: usize) -> Option<(String, Segment, u16)> {
        let (ty, kind, index) = self
            .symbols
            .lookup(name)
            .map(|sym| (sym.ty.clone(), sym.kind, sym.index))?;
        if kind == Kind::Field && self.in_function() {
            self.report(Error::FieldInFunction(name.to_string(), line), "variable");
        }
        Some((ty, kind.segment(), index))
    }

    fn push_variable(&mut self, var: Option<(Segment, u16)>) {
        if let Some((seg, idx)) = var {
            self.vm.push(seg, idx);
        }
    }

    /// `term (op term)*`, strictly left to right.
    fn compile_expression(&mut self) -> Result<(), Error> {
        self.compile_term()?;
        while let Some(op) = self.ts.peek().and_then(|token| binary_op(&token.kind)) {
            self.ts.bump();
            self.compile_term()?;
            match op {
                '+' => self.vm.arith(ArithOp::Add),
                '-' => self.vm.arith(ArithOp::Sub),
                '*' => self.vm.call("Math.multiply", 2),
                '/' => self.vm.call("Math.divide", 2),
                '&' => self.vm.arith(ArithOp::And),
                '|' => self.vm.arith(ArithOp::Or),
                '<' => self.vm.arith(ArithOp::Lt),
                '>' => self.vm.arith(ArithOp::Gt),
                _ => self.vm.arith(ArithOp::Eq),
            }
        }
        Ok(())
    }

    fn compile_term(&mut self) -> Result<(), Error> {
        let token = self.ts.peek().cloned().ok_or(Error::UnexpectedEof("term"))?;
        match token.kind {
            TokenKind::Int(n) => {
                self.ts.bump();
                self.vm.push(Segment::Constant, n);
            }
            TokenKind::Str(s) => {
                self.ts.bump();
                self.compile_string(&s);
            }
            TokenKind::Keyword(Keyword::True) => {
                self.ts.bump();
                self.vm.push(Segment::Constant, 0);
                self.vm.arith(ArithOp::Not);
            }
            TokenKind::Keyword(Keyword::False | Keyword::Null) => {
                self.ts.bump();
                self.vm.push(Segment::Constant, 0);
            }
            TokenKind::Keyword(Keyword::This) => {
                self.ts.bump();
                self.report(Error::Unsupported("`this` as a term", token.line), "term");
                self.vm.push(Segment::Constant, 0);
            }
            TokenKind::Symbol('(') => {
                self.ts.bump();
                self.compile_expression()?;
                expect!(self.ts, TokenKind::Symbol(')'), "`)`")?;
            }
            TokenKind::Symbol(op @ ('-' | '~')) => {
                self.ts.bump();
                self.compile_term()?;
                self.vm.arith(if op == '-' { ArithOp::Neg } else { ArithOp::Not });
            }
            TokenKind::Ident(_) => self.compile_name_term()?,
            kind => {
                return Err(Error::Expected {
                    expected: "term",
                    found: kind.to_string(),
                    line: token.line,
                })
            }
        }
        Ok(())
    }

    /// `name`, `name[expr]`, or a subroutine call starting with `name`.
    fn compile_name_term(&mut self) -> Result<(), Error> {
        let start = self.ts.mark();
        let (name, line) = self.ident()?;
        let after_name = self.ts.mark();
        let follow = self.ts.advance()?;

        match follow.kind {
            TokenKind::Symbol('(' | '.') => {
                // re-read the name as the head of a call
                self.ts.restore(start);
                self.compile_subroutine_call()
            }
            TokenKind::Symbol('[') => {
                let var = self.variable(&name, line);
                self.push_variable(var);
                self.compile_expression()?;
                expect!(self.ts, TokenKind::Symbol(']'), "`]`")?;
                self.vm.arith(ArithOp::Add);
                self.vm.pop(Segment::Pointer, 1);
                self.vm.push(Segment::That, 0);
                Ok(())
            }
            _ => {
                self.ts.restore(after_name);
                let var = self.variable(&name, line);
                self.push_variable(var);
                Ok(())
            }
        }
    }

    fn compile_subroutine_call(&mut self) -> Result<(), Error> {
        let (name, line) = self.ident()?;
        let (func, mut args) = if optional!(self.ts, TokenKind::Symbol('.')).is_some() {
            let (sub, _) = self.ident()?;
            match self.symbol(&name, line) {
                Some((ty, seg, idx)) => {
                    self.vm.push(seg, idx);
                    (format!("{}.{}", ty, sub), 1)
                }
                None => (format!("{}.{}", name, sub), 0),
            }
        } else if self.methods.contains(&name) {
            if self.in_function() {
                self.report(Error::MethodFromFunction(name.clone(), line), "call");
            }
            self.vm.push(Segment::Pointer, 0);
            (format!("{}.{}", self.class, name), 1)
        } else {
            (format!("{}.{}", self.class, name), 0)
        };

        expect!(self.ts, TokenKind::Symbol('('), "`(`")?;
        args += self.compile_expression_list()?;
        expect!(self.ts, TokenKind::Symbol(')'), "`)`")?;
        self.vm.call(&func, args);
        Ok(())
    }

    fn compile_expression_list(&mut self) -> Result<u16, Error> {
        if check!(self.ts, TokenKind::Symbol(')')) {
            return Ok(0);
        }
        let mut count = 1;
        self.compile_expression()?;
        while optional!(self.ts, TokenKind::Symbol(',')).is_some() {
            self.compile_expression()?;
            count += 1;
        }
        Ok(count)
    }

    fn compile_string(&mut self, s: &str) {
        self.vm.push(Segment::Constant, s.chars().count() as u16);
        self.vm.call("String.new", 1);
        for ch in s.chars() {
            self.vm.push(Segment::Constant, ch as u16);
            self.vm.call("String.appendChar", 2);
        }
    }
}
